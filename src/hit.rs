//! Hit-testing over the rendered geometry of a scene.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geometry::Vector2;
use crate::scene::RectShape;

/// Find the rectangle under `world_pt`.
///
/// Containment is edge-inclusive. When several rectangles contain the point
/// (a node inside its group, overlapping nodes) the one whose top-left corner
/// is nearest to the point wins, by squared distance. Equal distances keep the
/// rectangle that comes first in `rects`.
#[must_use]
pub fn hit_test(rects: &[RectShape], world_pt: Vector2) -> Option<&RectShape> {
    let mut best: Option<(&RectShape, f64)> = None;
    for rect in rects.iter().filter(|r| r.bbox.contains(world_pt)) {
        let dist = rect.bbox.top_left().distance_squared(world_pt);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((rect, dist)),
        }
    }
    best.map(|(rect, _)| rect)
}
