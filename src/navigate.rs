//! Translate a minimap click into a host canvas navigation command.

#[cfg(test)]
#[path = "navigate_test.rs"]
mod navigate_test;

use crate::config::{MinimapSettings, NavigationStrategy};
use crate::geometry::{BoundingBox, Vector2};
use crate::hit::hit_test;
use crate::host::HostCanvas;
use crate::input::Modifiers;
use crate::scene::{RectShape, Scene};

/// A navigation request for the host canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationCommand {
    /// Recenter the host viewport on a world point.
    PanTo(Vector2),
    /// Fit the host viewport to a world box.
    ZoomTo(BoundingBox),
}

impl NavigationCommand {
    /// Command for navigating to `target` under `strategy`.
    #[must_use]
    pub fn for_target(target: &BoundingBox, strategy: NavigationStrategy) -> Option<Self> {
        match strategy {
            NavigationStrategy::Pan => Some(Self::PanTo(target.center())),
            NavigationStrategy::Zoom => Some(Self::ZoomTo(*target)),
            NavigationStrategy::None => None,
        }
    }
}

/// The rectangle under a minimap-local point, if any.
///
/// Points outside the area the view box is drawn on never hit anything.
#[must_use]
pub fn pick(scene: &Scene, local: Vector2) -> Option<&RectShape> {
    let bounds = scene.bounds();
    if !bounds.rendered_extent().contains(local) {
        return None;
    }
    hit_test(scene.rendered_geometry(), bounds.minimap_to_world(local))
}

/// Resolve a click at minimap-local `local` into a command.
///
/// Returns `None` for clicks outside the drawn area, clicks on empty space,
/// and the `NONE` strategy.
#[must_use]
pub fn resolve_click(
    scene: &Scene,
    local: Vector2,
    modifiers: Modifiers,
    settings: &MinimapSettings,
) -> Option<NavigationCommand> {
    let Some(target) = pick(scene, local) else {
        tracing::debug!(x = local.x, y = local.y, "minimap click hit nothing");
        return None;
    };
    let strategy = settings.strategy(modifiers.is_secondary());
    tracing::debug!(node = %target.node_id, ?strategy, "minimap click resolved");
    NavigationCommand::for_target(&target.bbox, strategy)
}

/// Issue `command` on the host canvas.
pub fn execute(command: NavigationCommand, canvas: &dyn HostCanvas) {
    match command {
        NavigationCommand::PanTo(center) => canvas.pan_to(center.x, center.y),
        NavigationCommand::ZoomTo(bbox) => canvas.zoom_to_bbox(bbox),
    }
}
