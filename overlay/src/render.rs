//! Rendering: draws a minimap [`Scene`] onto two stacked 2D canvases.
//!
//! The base layer holds background, groups, nodes, edges and labels; the
//! indicator layer holds only the viewport rectangle, so a frame tick clears
//! and redraws one small layer instead of the whole minimap. This module is
//! the only place that touches [`CanvasRenderingContext2d`]; all fallible
//! calls propagate `JsValue` errors, converted to [`MinimapError`] at the
//! [`MinimapSurface`] boundary.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use canvas_minimap::MinimapError;
use canvas_minimap::config::OverlayPlacement;
use canvas_minimap::consts::{STROKE_WIDTH_PX, VIEWPORT_STROKE_COLOR};
use canvas_minimap::host::MinimapSurface;
use canvas_minimap::scene::Scene;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, Path2d};

use crate::dom::{ElementListener, apply_placement};
use crate::host::js_error;

/// One `<canvas>` and its 2D context.
pub struct CanvasLayer {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
}

impl CanvasLayer {
    fn resize(&self, width_css: f64, height_css: f64, dpr: f64) {
        let (w, h) = backing_size(width_css, height_css, dpr);
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
    }
}

/// Backing-store size in device pixels for a CSS size.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn backing_size(width_css: f64, height_css: f64, dpr: f64) -> (u32, u32) {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    ((width_css * dpr).round().max(1.0) as u32, (height_css * dpr).round().max(1.0) as u32)
}

/// CSS font shorthand for a label size in world units.
#[must_use]
pub fn label_font(size: f64) -> String {
    format!("{size}px sans-serif")
}

/// The overlay element: a positioned wrapper around the two canvas layers.
pub struct Canvas2dSurface {
    root: HtmlElement,
    base: CanvasLayer,
    indicator: CanvasLayer,
    dpr: f64,
    listeners: Vec<ElementListener>,
}

impl Canvas2dSurface {
    #[must_use]
    pub fn new(root: HtmlElement, base: CanvasLayer, indicator: CanvasLayer, dpr: f64, listeners: Vec<ElementListener>) -> Self {
        Self { root, base, indicator, dpr, listeners }
    }
}

impl MinimapSurface for Canvas2dSurface {
    fn draw_scene(&mut self, scene: &Scene) -> Result<(), MinimapError> {
        let (w, h) = scene.bounds().surface_size();
        self.base.resize(w, h, self.dpr);
        self.indicator.resize(w, h, self.dpr);
        draw_base(&self.base.ctx, scene, self.dpr).map_err(js_error)?;
        draw_indicator(&self.indicator.ctx, scene, self.dpr).map_err(js_error)
    }

    fn draw_viewport(&mut self, scene: &Scene) -> Result<(), MinimapError> {
        draw_indicator(&self.indicator.ctx, scene, self.dpr).map_err(js_error)
    }

    fn set_placement(&mut self, placement: &OverlayPlacement) -> Result<(), MinimapError> {
        apply_placement(&self.root, placement).map_err(js_error)
    }

    fn detach(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.remove();
        }
        self.root.remove();
    }
}

/// Reset to device pixels and clear the whole layer.
fn clear(ctx: &CanvasRenderingContext2d, scene: &Scene, dpr: f64) -> Result<(), JsValue> {
    let (w, h) = scene.bounds().surface_size();
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, w, h);
    Ok(())
}

/// Switch the context to world coordinates.
fn enter_world(ctx: &CanvasRenderingContext2d, scene: &Scene) -> Result<(), JsValue> {
    let bounds = scene.bounds();
    let origin = bounds.origin();
    let vb = bounds.view_box();
    ctx.translate(origin.x, origin.y)?;
    ctx.scale(bounds.scale(), bounds.scale())?;
    ctx.translate(-vb.min_x, -vb.min_y)
}

fn draw_base(ctx: &CanvasRenderingContext2d, scene: &Scene, dpr: f64) -> Result<(), JsValue> {
    clear(ctx, scene, dpr)?;
    let (w, h) = scene.bounds().surface_size();
    ctx.set_fill_style_str(&scene.background);
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.save();
    enter_world(ctx, scene)?;

    // Groups then nodes; `rects()` is already in that order.
    for rect in scene.rects() {
        let b = rect.bbox;
        ctx.set_fill_style_str(&rect.fill);
        ctx.fill_rect(b.min_x, b.min_y, b.width(), b.height());
    }

    ctx.set_stroke_style_str(&scene.edge_color);
    ctx.set_line_width(STROKE_WIDTH_PX / scene.bounds().scale());
    for edge in scene.edges() {
        let path = Path2d::new_with_path_string(&edge.to_path_data())?;
        ctx.stroke_with_path(&path);
    }

    ctx.set_fill_style_str(&scene.font_color);
    ctx.set_font(&label_font(scene.label_font_size));
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");
    for rect in scene.rects() {
        if let Some(label) = &rect.label {
            ctx.fill_text(label, rect.bbox.min_x, rect.bbox.min_y)?;
        }
    }

    ctx.restore();
    Ok(())
}

fn draw_indicator(ctx: &CanvasRenderingContext2d, scene: &Scene, dpr: f64) -> Result<(), JsValue> {
    clear(ctx, scene, dpr)?;
    let Some(vp) = scene.viewport() else {
        return Ok(());
    };
    ctx.save();
    enter_world(ctx, scene)?;
    ctx.set_stroke_style_str(VIEWPORT_STROKE_COLOR);
    ctx.set_line_width(STROKE_WIDTH_PX / scene.bounds().scale());
    ctx.stroke_rect(vp.min_x, vp.min_y, vp.width(), vp.height());
    ctx.restore();
    Ok(())
}
