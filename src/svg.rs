//! SVG markup surface.
//!
//! Renders a [`Scene`] as a standalone `<svg>` document. Shapes stay in world
//! coordinates; the `viewBox` attribute carries the world-to-minimap mapping
//! and `preserveAspectRatio="xMidYMid meet"` matches the centered uniform fit
//! of [`crate::bounds::BoundsModel`].

#[cfg(test)]
#[path = "svg_test.rs"]
mod svg_test;

use std::fmt::Write as _;

use crate::consts::{STROKE_WIDTH_PX, VIEWPORT_STROKE_COLOR};
use crate::error::MinimapError;
use crate::geometry::BoundingBox;
use crate::host::MinimapSurface;
use crate::scene::{RectShape, Scene};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// A [`MinimapSurface`] that keeps the rendered frame as SVG markup.
#[derive(Debug, Default, Clone)]
pub struct SvgSurface {
    /// Everything before the viewport indicator: header, background, shapes.
    body: String,
    /// The indicator element on its own, so ticks can replace just this part.
    indicator: String,
    detached: bool,
}

impl SvgSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current frame as a complete SVG document. Empty before the first draw.
    #[must_use]
    pub fn markup(&self) -> String {
        if self.body.is_empty() {
            return String::new();
        }
        format!("{}{}</svg>", self.body, self.indicator)
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

impl MinimapSurface for SvgSurface {
    fn draw_scene(&mut self, scene: &Scene) -> Result<(), MinimapError> {
        if self.detached {
            return Err(MinimapError::Surface("svg surface is detached".into()));
        }
        self.body = scene_body(scene)?;
        self.indicator = indicator_markup(scene)?;
        Ok(())
    }

    fn draw_viewport(&mut self, scene: &Scene) -> Result<(), MinimapError> {
        if self.detached {
            return Err(MinimapError::Surface("svg surface is detached".into()));
        }
        self.indicator = indicator_markup(scene)?;
        Ok(())
    }

    fn detach(&mut self) {
        self.body.clear();
        self.indicator.clear();
        self.detached = true;
    }
}

fn fmt_err(err: std::fmt::Error) -> MinimapError {
    MinimapError::Surface(format!("svg formatting failed: {err}"))
}

fn scene_body(scene: &Scene) -> Result<String, MinimapError> {
    let vb = scene.view_box();
    let (width, height) = scene.bounds().surface_size();
    let stroke = STROKE_WIDTH_PX / scene.bounds().scale();
    let mut out = String::new();

    write!(
        out,
        r#"<svg xmlns="{SVG_NS}" width="{width}" height="{height}" viewBox="{} {} {} {}" preserveAspectRatio="xMidYMid meet">"#,
        vb.min_x,
        vb.min_y,
        vb.width(),
        vb.height(),
    )
    .map_err(fmt_err)?;
    write!(
        out,
        r#"<rect class="minimap-background" x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
        vb.min_x,
        vb.min_y,
        vb.width(),
        vb.height(),
        escape(&scene.background),
    )
    .map_err(fmt_err)?;

    for rect in scene.groups() {
        write_rect(&mut out, rect, "minimap-group", scene)?;
    }
    for rect in scene.nodes() {
        write_rect(&mut out, rect, "minimap-node", scene)?;
    }
    for edge in scene.edges() {
        write!(
            out,
            r#"<path class="minimap-edge" data-edge-id="{}" d="{}" fill="none" stroke="{}" stroke-width="{stroke}"/>"#,
            escape(&edge.edge_id),
            edge.to_path_data(),
            escape(&scene.edge_color),
        )
        .map_err(fmt_err)?;
    }
    Ok(out)
}

fn write_rect(out: &mut String, rect: &RectShape, class: &str, scene: &Scene) -> Result<(), MinimapError> {
    let b = rect.bbox;
    write!(
        out,
        r#"<rect class="{class}" data-node-id="{}" x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
        escape(&rect.node_id),
        b.min_x,
        b.min_y,
        b.width(),
        b.height(),
        escape(&rect.fill),
    )
    .map_err(fmt_err)?;
    if let Some(label) = &rect.label {
        write!(
            out,
            r#"<text x="{}" y="{}" font-size="{}" fill="{}" dominant-baseline="hanging">{}</text>"#,
            b.min_x,
            b.min_y,
            scene.label_font_size,
            escape(&scene.font_color),
            escape(label),
        )
        .map_err(fmt_err)?;
    }
    Ok(())
}

fn indicator_markup(scene: &Scene) -> Result<String, MinimapError> {
    let mut out = String::new();
    match scene.viewport().filter(BoundingBox::is_valid) {
        Some(vp) => write!(
            out,
            r#"<rect class="minimap-viewport" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{VIEWPORT_STROKE_COLOR}" stroke-width="{}"/>"#,
            vp.min_x,
            vp.min_y,
            vp.width(),
            vp.height(),
            STROKE_WIDTH_PX / scene.bounds().scale(),
        )
        .map_err(fmt_err)?,
        None => out.push_str(r#"<rect class="minimap-viewport" visibility="hidden"/>"#),
    }
    Ok(out)
}

/// Escape text for use in XML attribute values and character data.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
