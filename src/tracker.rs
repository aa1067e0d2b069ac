//! Per-frame viewport indicator updates.
//!
//! The tracker runs on every host frame tick, so it only touches the
//! indicator: it never rebuilds the scene and skips the redraw entirely when
//! the host viewport has not moved since the last frame.

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tracker_test;

use crate::error::MinimapError;
use crate::geometry::BoundingBox;
use crate::host::MinimapSurface;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportTracker {
    enabled: bool,
    redraws: u64,
}

impl ViewportTracker {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled, redraws: 0 }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of indicator redraws issued so far.
    #[must_use]
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Indicator box for a host viewport. Invalid viewports clear it.
    #[must_use]
    pub fn indicator_for(&self, viewport: BoundingBox) -> Option<BoundingBox> {
        (self.enabled && viewport.is_valid()).then_some(viewport)
    }

    /// Update `scene`'s indicator from `viewport` and redraw it on `surface`
    /// if it changed. Returns whether a redraw happened.
    ///
    /// # Errors
    ///
    /// Propagates surface draw failures.
    pub fn track(
        &mut self,
        scene: &mut Scene,
        surface: &mut dyn MinimapSurface,
        viewport: BoundingBox,
    ) -> Result<bool, MinimapError> {
        if !self.enabled {
            return Ok(false);
        }
        if !scene.set_viewport(self.indicator_for(viewport)) {
            return Ok(false);
        }
        surface.draw_viewport(scene)?;
        self.redraws += 1;
        Ok(true)
    }
}
