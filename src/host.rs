//! Interfaces the minimap needs from its host application.
//!
//! The host canvas, the overlay DOM and settings persistence are external
//! collaborators. The core reaches them only through these traits; the
//! `overlay` crate implements them for the browser and the tests implement
//! them with in-memory fakes.

use std::rc::Rc;

use crate::config::OverlayPlacement;
use crate::error::MinimapError;
use crate::geometry::BoundingBox;
use crate::intercept::BehaviorTable;
use crate::scene::Scene;
use crate::snapshot::CanvasSnapshot;

/// A live host canvas.
pub trait HostCanvas {
    /// Current nodes, edges and viewport.
    fn snapshot(&self) -> CanvasSnapshot;

    /// World-space region visible in the host's main view.
    fn viewport_bbox(&self) -> BoundingBox;

    /// Recenter the host viewport on `(x, y)`.
    fn pan_to(&self, x: f64, y: f64);

    /// Fit the host viewport to `bbox`.
    fn zoom_to_bbox(&self, bbox: BoundingBox);

    /// The shared method table the host routes its mutation calls through.
    ///
    /// `None` when the host internals are not reachable; the minimap then only
    /// updates on explicit reloads.
    fn behavior_table(&self) -> Option<Rc<BehaviorTable>>;
}

/// A concrete renderer for [`Scene`]s.
pub trait MinimapSurface {
    /// Clear the surface and draw `scene` in full.
    ///
    /// # Errors
    ///
    /// Returns [`MinimapError::Surface`] when the backend rejects a draw call.
    fn draw_scene(&mut self, scene: &Scene) -> Result<(), MinimapError>;

    /// Redraw only the viewport indicator of `scene`.
    ///
    /// # Errors
    ///
    /// Returns [`MinimapError::Surface`] when the backend rejects a draw call.
    fn draw_viewport(&mut self, scene: &Scene) -> Result<(), MinimapError>;

    /// Move or resize the overlay element.
    ///
    /// # Errors
    ///
    /// Returns [`MinimapError::Surface`] when the element cannot be updated.
    fn set_placement(&mut self, _placement: &OverlayPlacement) -> Result<(), MinimapError> {
        Ok(())
    }

    /// Remove the overlay element. Called once, on teardown.
    fn detach(&mut self);
}

/// Handle for a pair of document-scoped pointer move/up listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The application hosting the minimap overlay.
pub trait OverlayHost {
    /// The canvas of the active view, if the active view is a canvas.
    fn active_canvas(&self) -> Option<Rc<dyn HostCanvas>>;

    /// Size of the element the overlay is positioned in, in CSS pixels.
    fn container_size(&self) -> (f64, f64);

    /// Create the overlay element at `placement`.
    ///
    /// # Errors
    ///
    /// Returns [`MinimapError::Surface`] when the element cannot be created.
    fn mount_surface(&self, placement: &OverlayPlacement) -> Result<Box<dyn MinimapSurface>, MinimapError>;

    /// Start routing document pointer move/up events to the minimap for a drag.
    fn listen_document_pointer(&self) -> ListenerId;

    /// Stop routing document pointer events for `id`.
    fn unlisten_document_pointer(&self, id: ListenerId);

    /// Persist the settings object.
    fn persist_settings(&self, json: &str);
}
