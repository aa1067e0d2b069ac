//! Minimap settings: the flat, persisted configuration object.
//!
//! Settings persist as a camelCase JSON object. Missing keys take their
//! defaults and unknown keys are ignored, so older and newer settings files
//! both load. The settings UI writes individual options through
//! [`MinimapSettings::set_option`], which parses the raw widget string.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BACKGROUND_COLOR, DEFAULT_FONT_COLOR, DEFAULT_FONT_SIZE, DEFAULT_GROUP_COLOR, DEFAULT_HEIGHT,
    DEFAULT_MARGIN, DEFAULT_NODE_COLOR, DEFAULT_OPACITY, DEFAULT_WIDTH, MAX_OPACITY, MIN_HEIGHT, MIN_OPACITY,
    MIN_WIDTH, OVERLAY_INSET_PX,
};
use crate::error::ConfigError;

/// What a click on a minimap node does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NavigationStrategy {
    /// Recenter the canvas on the node.
    Pan,
    /// Fit the canvas viewport to the node.
    Zoom,
    /// Do nothing.
    None,
}

impl FromStr for NavigationStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PAN" => Ok(Self::Pan),
            "ZOOM" => Ok(Self::Zoom),
            "NONE" => Ok(Self::None),
            _ => Err(ConfigError::InvalidValue { key: "navigationStrategy".into(), value: s.to_string() }),
        }
    }
}

/// Corner preset for the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl Corner {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Corner {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top-left" => Ok(Self::TopLeft),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-right" => Ok(Self::BottomRight),
            _ => Err(ConfigError::InvalidValue { key: "side".into(), value: s.to_string() }),
        }
    }
}

/// Where the overlay sits inside its container, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
}

/// All recognized minimap options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinimapSettings {
    /// Surface width in CSS pixels.
    pub width: f64,
    /// Surface height in CSS pixels.
    pub height: f64,
    /// World-space padding around the content.
    pub margin: f64,
    /// Label size in CSS pixels, independent of zoom.
    pub font_size: f64,
    pub font_color: String,
    pub background_color: String,
    pub group_color: String,
    pub node_color: String,
    /// Corner preset, used unless an explicit position is stored.
    pub side: Corner,
    pub enabled: bool,
    pub draw_active_viewport: bool,
    pub primary_navigation_strategy: NavigationStrategy,
    /// Used while the navigation modifier key is held.
    pub secondary_navigation_strategy: NavigationStrategy,
    pub minimap_opacity: f64,
    /// Free-form placement written by dragging the overlay.
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}

impl Default for MinimapSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            margin: DEFAULT_MARGIN,
            font_size: DEFAULT_FONT_SIZE,
            font_color: DEFAULT_FONT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            group_color: DEFAULT_GROUP_COLOR.to_string(),
            node_color: DEFAULT_NODE_COLOR.to_string(),
            side: Corner::default(),
            enabled: true,
            draw_active_viewport: true,
            primary_navigation_strategy: NavigationStrategy::Pan,
            secondary_navigation_strategy: NavigationStrategy::Zoom,
            minimap_opacity: DEFAULT_OPACITY,
            position_x: None,
            position_y: None,
        }
    }
}

impl MinimapSettings {
    /// Load persisted settings, filling gaps with defaults and clamping ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if `json` is not a settings object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.normalized())
    }

    /// Serialize for persistence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if serialization fails (non-finite numbers).
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Clamp every option into its supported range.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.width = finite_or(self.width, DEFAULT_WIDTH).max(MIN_WIDTH);
        self.height = finite_or(self.height, DEFAULT_HEIGHT).max(MIN_HEIGHT);
        self.margin = finite_or(self.margin, DEFAULT_MARGIN).max(0.0);
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            self.font_size = DEFAULT_FONT_SIZE;
        }
        self.minimap_opacity = finite_or(self.minimap_opacity, DEFAULT_OPACITY).clamp(MIN_OPACITY, MAX_OPACITY);
        self.position_x = self.position_x.filter(|v| v.is_finite());
        self.position_y = self.position_y.filter(|v| v.is_finite());
        self
    }

    /// Strategy for a click, given whether the navigation modifier is held.
    #[must_use]
    pub fn strategy(&self, modifier_held: bool) -> NavigationStrategy {
        if modifier_held { self.secondary_navigation_strategy } else { self.primary_navigation_strategy }
    }

    /// Apply one option as written by the settings UI.
    ///
    /// `key` is the persisted camelCase key. Empty `positionX`/`positionY`
    /// clear the stored position.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for unrecognized keys and
    /// [`ConfigError::InvalidValue`] when `raw` does not parse.
    pub fn set_option(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        match key {
            "width" => self.width = parse_f64(key, raw)?,
            "height" => self.height = parse_f64(key, raw)?,
            "margin" => self.margin = parse_f64(key, raw)?,
            "fontSize" => self.font_size = parse_f64(key, raw)?,
            "fontColor" => self.font_color = parse_color(key, raw)?,
            "backgroundColor" => self.background_color = parse_color(key, raw)?,
            "groupColor" => self.group_color = parse_color(key, raw)?,
            "nodeColor" => self.node_color = parse_color(key, raw)?,
            "side" => self.side = raw.parse()?,
            "enabled" => self.enabled = parse_bool(key, raw)?,
            "drawActiveViewport" => self.draw_active_viewport = parse_bool(key, raw)?,
            "primaryNavigationStrategy" => self.primary_navigation_strategy = parse_strategy(key, raw)?,
            "secondaryNavigationStrategy" => self.secondary_navigation_strategy = parse_strategy(key, raw)?,
            "minimapOpacity" => self.minimap_opacity = parse_f64(key, raw)?,
            "positionX" => self.position_x = parse_optional_f64(key, raw)?,
            "positionY" => self.position_y = parse_optional_f64(key, raw)?,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        *self = std::mem::take(self).normalized();
        Ok(())
    }

    /// Overlay rectangle inside a container of the given size.
    ///
    /// A stored `positionX`/`positionY` overrides the corner preset per axis.
    #[must_use]
    pub fn placement(&self, container_width: f64, container_height: f64) -> OverlayPlacement {
        let (corner_left, corner_top) = match self.side {
            Corner::TopLeft => (OVERLAY_INSET_PX, OVERLAY_INSET_PX),
            Corner::TopRight => (container_width - self.width - OVERLAY_INSET_PX, OVERLAY_INSET_PX),
            Corner::BottomLeft => (OVERLAY_INSET_PX, container_height - self.height - OVERLAY_INSET_PX),
            Corner::BottomRight => (
                container_width - self.width - OVERLAY_INSET_PX,
                container_height - self.height - OVERLAY_INSET_PX,
            ),
        };
        OverlayPlacement {
            left: self.position_x.unwrap_or(corner_left),
            top: self.position_y.unwrap_or(corner_top),
            width: self.width,
            height: self.height,
            opacity: self.minimap_opacity,
        }
    }
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

fn invalid(key: &str, raw: &str) -> ConfigError {
    ConfigError::InvalidValue { key: key.to_string(), value: raw.to_string() }
}

fn parse_f64(key: &str, raw: &str) -> Result<f64, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(key, raw)),
    }
}

fn parse_optional_f64(key: &str, raw: &str) -> Result<Option<f64>, ConfigError> {
    if raw.trim().is_empty() { Ok(None) } else { parse_f64(key, raw).map(Some) }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, raw)),
    }
}

fn parse_color(key: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { Err(invalid(key, raw)) } else { Ok(trimmed.to_string()) }
}

fn parse_strategy(key: &str, raw: &str) -> Result<NavigationStrategy, ConfigError> {
    raw.parse().map_err(|_| invalid(key, raw))
}
