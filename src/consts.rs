//! Shared numeric constants and option defaults for the minimap crate.

// ── Option defaults ─────────────────────────────────────────────

pub const DEFAULT_WIDTH: f64 = 400.0;
pub const DEFAULT_HEIGHT: f64 = 300.0;
/// World-space padding around the content box.
pub const DEFAULT_MARGIN: f64 = 100.0;
pub const DEFAULT_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_FONT_COLOR: &str = "white";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#f3f0e9";
pub const DEFAULT_GROUP_COLOR: &str = "#bdd5de55";
pub const DEFAULT_NODE_COLOR: &str = "#c3d6d7";
pub const DEFAULT_OPACITY: f64 = 0.85;

// ── Limits ──────────────────────────────────────────────────────

pub const MIN_OPACITY: f64 = 0.1;
pub const MAX_OPACITY: f64 = 1.0;

/// Smallest overlay size reachable by resizing.
pub const MIN_WIDTH: f64 = 100.0;
pub const MIN_HEIGHT: f64 = 75.0;

// ── Overlay placement ───────────────────────────────────────────

/// Gap between a corner preset and the container edge, in CSS pixels.
pub const OVERLAY_INSET_PX: f64 = 16.0;

// ── Interaction ─────────────────────────────────────────────────

/// Pointer travel (client CSS pixels) below which a press-release counts as a click.
pub const CLICK_SLOP_PX: f64 = 3.0;

// ── Rendering ───────────────────────────────────────────────────

/// Stroke width of edges and the viewport indicator, in minimap pixels.
pub const STROKE_WIDTH_PX: f64 = 1.5;

/// Stroke color of the viewport indicator.
pub const VIEWPORT_STROKE_COLOR: &str = "#e0446a";

/// Stroke color of edge paths.
pub const EDGE_COLOR: &str = "#8a8a8a";
