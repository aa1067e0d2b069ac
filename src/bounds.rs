//! World-to-minimap coordinate model.
//!
//! The minimap shows a *view box* in world coordinates: the bounding box of all
//! nodes, padded by the configured margin and shifted by the user's own pan of
//! the minimap. The view box is fitted onto the fixed-size surface with one
//! uniform scale (the smaller of the two axis ratios) and centered, so content
//! is never stretched. Labels are sized in world units divided by that scale so
//! they keep a constant on-screen size.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use crate::config::MinimapSettings;
use crate::geometry::{BoundingBox, Vector2};
use crate::snapshot::CanvasSnapshot;

/// Exact bounding box of every node in `snapshot`.
///
/// Returns [`BoundingBox::EMPTY`] (invalid) when the canvas has no nodes.
#[must_use]
pub fn content_bbox(snapshot: &CanvasSnapshot) -> BoundingBox {
    if snapshot.nodes.is_empty() {
        return BoundingBox::EMPTY;
    }
    snapshot.nodes.values().fold(
        BoundingBox::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |acc, n| BoundingBox {
            min_x: acc.min_x.min(n.x),
            min_y: acc.min_y.min(n.y),
            max_x: acc.max_x.max(n.x + n.width),
            max_y: acc.max_y.max(n.y + n.height),
        },
    )
}

/// Derived mapping between world space and minimap-local space for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsModel {
    content: BoundingBox,
    view_box: BoundingBox,
    surface_width: f64,
    surface_height: f64,
    scale: f64,
    /// Minimap-local position of the view box's top-left corner.
    origin: Vector2,
}

impl BoundsModel {
    /// Compute the model for `snapshot` under `settings`.
    ///
    /// `view_offset` is the world-space pan the user applied to the minimap
    /// itself. When the padded content box is invalid the view box falls back to
    /// `(0, 0, width, height)` so the scale stays finite.
    #[must_use]
    pub fn compute(snapshot: &CanvasSnapshot, settings: &MinimapSettings, view_offset: Vector2) -> Self {
        let content = content_bbox(snapshot);
        // Zero-size content can still become valid once padded.
        let padded = content.expand(settings.margin);
        let base = if !snapshot.nodes.is_empty() && padded.is_valid() {
            padded
        } else {
            BoundingBox::new(0.0, 0.0, settings.width, settings.height)
        };
        Self::fit(content, base.translate(view_offset), settings.width, settings.height)
    }

    /// Fit `view_box` onto a `width` x `height` surface.
    #[must_use]
    pub fn fit(content: BoundingBox, view_box: BoundingBox, width: f64, height: f64) -> Self {
        let scale = if view_box.is_valid() && width > 0.0 && height > 0.0 {
            (width / view_box.width()).min(height / view_box.height())
        } else {
            1.0
        };
        let origin = Vector2::new(
            (width - view_box.width() * scale) / 2.0,
            (height - view_box.height() * scale) / 2.0,
        );
        Self { content, view_box, surface_width: width, surface_height: height, scale, origin }
    }

    /// Bounding box of the nodes alone (may be invalid).
    #[must_use]
    pub fn content(&self) -> BoundingBox {
        self.content
    }

    /// World-space region shown on the minimap.
    #[must_use]
    pub fn view_box(&self) -> BoundingBox {
        self.view_box
    }

    /// Uniform world-to-minimap scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn surface_size(&self) -> (f64, f64) {
        (self.surface_width, self.surface_height)
    }

    /// Minimap-local offset of the view box's top-left corner.
    #[must_use]
    pub fn origin(&self) -> Vector2 {
        self.origin
    }

    #[must_use]
    pub fn world_to_minimap(&self, world: Vector2) -> Vector2 {
        Vector2::new(
            (world.x - self.view_box.min_x) * self.scale + self.origin.x,
            (world.y - self.view_box.min_y) * self.scale + self.origin.y,
        )
    }

    #[must_use]
    pub fn minimap_to_world(&self, local: Vector2) -> Vector2 {
        Vector2::new(
            (local.x - self.origin.x) / self.scale + self.view_box.min_x,
            (local.y - self.origin.y) / self.scale + self.view_box.min_y,
        )
    }

    /// Map a world box into minimap-local space.
    #[must_use]
    pub fn box_to_minimap(&self, world: &BoundingBox) -> BoundingBox {
        let min = self.world_to_minimap(Vector2::new(world.min_x, world.min_y));
        let max = self.world_to_minimap(Vector2::new(world.max_x, world.max_y));
        BoundingBox::new(min.x, min.y, max.x, max.y)
    }

    /// Convert a minimap-pixel distance into world units.
    #[must_use]
    pub fn minimap_dist_to_world(&self, dist: f64) -> f64 {
        dist / self.scale
    }

    /// World-space font size that renders at `font_size` minimap pixels.
    #[must_use]
    pub fn label_font_size(&self, font_size: f64) -> f64 {
        font_size / self.scale
    }

    /// Minimap-local rectangle actually covered by the view box.
    #[must_use]
    pub fn rendered_extent(&self) -> BoundingBox {
        self.box_to_minimap(&self.view_box)
    }
}
