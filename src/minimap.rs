//! The minimap overlay instance and its lifecycle.
//!
//! DESIGN
//! ======
//! [`CanvasMinimap`] owns everything that lives while the overlay is shown:
//! the event bus, the interception guard on the host canvas, the bus
//! subscriptions, the mounted surface and the current scene. There is no
//! process-wide state; the plugin glue owns one instance.
//!
//! Lifecycle:
//!
//! ```text
//! Unloaded --setup--> Loaded --(enabled && canvas active)--> Active
//!    ^                                                          |
//!    +------------------------- unload -------------------------+
//! ```
//!
//! `setup_minimap` always unloads first, so every reload starts clean.
//! `unload_minimap` releases resources in reverse order of acquisition:
//! drag listeners, bus subscriptions, interception (restoring the host's
//! methods), then the surface.
//!
//! Mutable state sits in one `Rc<RefCell<Session>>`. Bus handlers hold it
//! weakly and use `try_borrow_mut`: a host call that re-enters the minimap
//! while it is already updating is skipped rather than nested. Navigation
//! calls into the host are only made after the session borrow is released.

#[cfg(test)]
#[path = "minimap_test.rs"]
mod minimap_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::bounds::BoundsModel;
use crate::config::{MinimapSettings, OverlayPlacement};
use crate::consts::{MIN_HEIGHT, MIN_WIDTH};
use crate::error::MinimapError;
use crate::events::{CanvasEvent, CanvasEventKind, EventBus, SubscriptionId};
use crate::geometry::{BoundingBox, Vector2};
use crate::host::{HostCanvas, MinimapSurface, OverlayHost};
use crate::input::{Button, DragState, DragTarget, Modifiers};
use crate::intercept::{BusEventSource, InterceptGuard};
use crate::navigate::{self, NavigationCommand};
use crate::scene::{render_scene, Scene};
use crate::snapshot::CanvasSnapshot;
use crate::tracker::ViewportTracker;

/// Where the overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Nothing mounted, nothing intercepted.
    Unloaded,
    /// Set up, but disabled or no canvas is active.
    Loaded,
    /// Mounted on an active canvas and tracking it.
    Active,
}

/// Resources held while the overlay is mounted on a canvas.
struct ActiveOverlay {
    canvas: Rc<dyn HostCanvas>,
    surface: Box<dyn MinimapSurface>,
    scene: Option<Scene>,
    tracker: ViewportTracker,
    placement: OverlayPlacement,
    guard: Option<InterceptGuard>,
    subscriptions: Vec<SubscriptionId>,
}

impl ActiveOverlay {
    fn render(&mut self, snapshot: &CanvasSnapshot, settings: &MinimapSettings, view_offset: Vector2) -> Result<(), MinimapError> {
        let scene = build_scene(snapshot, settings, view_offset, &self.tracker)?;
        self.surface.draw_scene(&scene)?;
        self.scene = Some(scene);
        Ok(())
    }

    fn track(&mut self, viewport: BoundingBox) -> Result<bool, MinimapError> {
        let Self { scene, surface, tracker, .. } = self;
        match scene.as_mut() {
            Some(scene) => tracker.track(scene, surface.as_mut(), viewport),
            None => Ok(false),
        }
    }

    fn scale(&self) -> f64 {
        self.scene.as_ref().map_or(1.0, |s| s.bounds().scale())
    }
}

struct Session {
    state: LifecycleState,
    settings: MinimapSettings,
    /// World-space pan of the minimap's own view.
    view_offset: Vector2,
    drag: DragState,
    overlay: Option<ActiveOverlay>,
}

impl Session {
    fn rebuild(&mut self) -> Result<(), MinimapError> {
        let Some(overlay) = self.overlay.as_mut() else {
            return Ok(());
        };
        let snapshot = overlay.canvas.snapshot();
        overlay.render(&snapshot, &self.settings, self.view_offset)
    }

    fn tick(&mut self) -> Result<(), MinimapError> {
        let Some(overlay) = self.overlay.as_mut() else {
            return Ok(());
        };
        if !overlay.tracker.is_enabled() {
            return Ok(());
        }
        let viewport = overlay.canvas.viewport_bbox();
        overlay.track(viewport)?;
        Ok(())
    }
}

fn build_scene(
    snapshot: &CanvasSnapshot,
    settings: &MinimapSettings,
    view_offset: Vector2,
    tracker: &ViewportTracker,
) -> Result<Scene, MinimapError> {
    let bounds = BoundsModel::compute(snapshot, settings, view_offset);
    let mut scene = render_scene(snapshot, &bounds, settings)?;
    scene.set_viewport(tracker.indicator_for(snapshot.viewport));
    Ok(scene)
}

/// Run `update` on the session unless it is gone or already being updated.
fn with_session(
    session: &Weak<RefCell<Session>>,
    update: impl FnOnce(&mut Session) -> Result<(), MinimapError>,
) -> Result<(), MinimapError> {
    let Some(session) = session.upgrade() else {
        return Ok(());
    };
    let Ok(mut guard) = session.try_borrow_mut() else {
        tracing::debug!("minimap busy; skipping re-entrant update");
        return Ok(());
    };
    update(&mut guard)
}

/// A canvas minimap overlay.
pub struct CanvasMinimap {
    host: Rc<dyn OverlayHost>,
    bus: Rc<EventBus>,
    session: Rc<RefCell<Session>>,
}

impl std::fmt::Debug for CanvasMinimap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasMinimap")
            .field("state", &self.state())
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl CanvasMinimap {
    #[must_use]
    pub fn new(host: Rc<dyn OverlayHost>, settings: MinimapSettings) -> Self {
        Self {
            host,
            bus: Rc::new(EventBus::new()),
            session: Rc::new(RefCell::new(Session {
                state: LifecycleState::Unloaded,
                settings: settings.normalized(),
                view_offset: Vector2::ZERO,
                drag: DragState::Idle,
                overlay: None,
            })),
        }
    }

    // --- Plugin hooks ---

    /// Plugin activation.
    ///
    /// # Errors
    ///
    /// See [`Self::setup_minimap`].
    pub fn activate(&self) -> Result<(), MinimapError> {
        self.setup_minimap()
    }

    /// Plugin deactivation.
    pub fn deactivate(&self) {
        self.unload_minimap();
    }

    /// The host switched its active view.
    ///
    /// # Errors
    ///
    /// See [`Self::setup_minimap`].
    pub fn on_active_view_change(&self) -> Result<(), MinimapError> {
        self.reload_minimap()
    }

    // --- Lifecycle ---

    /// Mount the overlay on the active canvas, if enabled and one is active.
    ///
    /// Always unloads first. Being disabled or having no canvas is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be mounted or the first render
    /// fails. A failed first render leaves the overlay mounted.
    pub fn setup_minimap(&self) -> Result<(), MinimapError> {
        self.unload_minimap();
        let settings = {
            let mut session = self.session.borrow_mut();
            session.state = LifecycleState::Loaded;
            session.settings.clone()
        };

        if !settings.enabled {
            tracing::debug!("minimap disabled; not mounting");
            return Ok(());
        }
        let Some(canvas) = self.host.active_canvas() else {
            tracing::debug!("no active canvas; not mounting minimap");
            return Ok(());
        };

        let (container_w, container_h) = self.host.container_size();
        let placement = settings.placement(container_w, container_h);
        let surface = self.host.mount_surface(&placement)?;

        let guard = match canvas.behavior_table() {
            Some(table) => InterceptGuard::install(&table, Rc::new(BusEventSource::new(&self.bus))),
            None => {
                tracing::debug!("host canvas exposes no behavior table; not intercepting");
                None
            }
        };
        let subscriptions = self.subscribe_handlers();

        let mut session = self.session.borrow_mut();
        session.overlay = Some(ActiveOverlay {
            canvas,
            surface,
            scene: None,
            tracker: ViewportTracker::new(settings.draw_active_viewport),
            placement,
            guard,
            subscriptions,
        });
        session.state = LifecycleState::Active;
        tracing::info!(width = placement.width, height = placement.height, side = %settings.side, "minimap overlay mounted");
        session.rebuild()
    }

    /// Tear the overlay down and release everything it holds.
    pub fn unload_minimap(&self) {
        let (overlay, drag) = {
            let mut session = self.session.borrow_mut();
            session.state = LifecycleState::Unloaded;
            session.view_offset = Vector2::ZERO;
            (session.overlay.take(), std::mem::take(&mut session.drag))
        };

        if let Some(listener) = drag.listener() {
            self.host.unlisten_document_pointer(listener);
        }
        let Some(mut overlay) = overlay else {
            return;
        };
        for id in overlay.subscriptions.drain(..) {
            self.bus.unsubscribe(id);
        }
        drop(overlay.guard.take());
        overlay.surface.detach();
        tracing::info!("minimap overlay unloaded");
    }

    /// Unload, then set up again.
    ///
    /// # Errors
    ///
    /// See [`Self::setup_minimap`].
    pub fn reload_minimap(&self) -> Result<(), MinimapError> {
        self.setup_minimap()
    }

    /// Flip `enabled`, persist, and reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or the reload fails.
    pub fn toggle(&self) -> Result<(), MinimapError> {
        let mut settings = self.settings();
        settings.enabled = !settings.enabled;
        tracing::info!(enabled = settings.enabled, "minimap toggled");
        self.update_settings(settings)
    }

    // --- Settings ---

    #[must_use]
    pub fn settings(&self) -> MinimapSettings {
        self.session.borrow().settings.clone()
    }

    /// Replace the settings, persist them, and reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or the reload fails.
    pub fn update_settings(&self, settings: MinimapSettings) -> Result<(), MinimapError> {
        self.session.borrow_mut().settings = settings.normalized();
        self.persist_settings()?;
        self.reload_minimap()
    }

    fn persist_settings(&self) -> Result<(), MinimapError> {
        let json = self.session.borrow().settings.to_json()?;
        self.host.persist_settings(&json);
        Ok(())
    }

    // --- Rendering ---

    /// Render `snapshot` with the current settings onto `surface`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid edge sides or a failing surface.
    pub fn render_minimap(&self, surface: &mut dyn MinimapSurface, snapshot: &CanvasSnapshot) -> Result<Scene, MinimapError> {
        let (settings, view_offset) = {
            let session = self.session.borrow();
            (session.settings.clone(), session.view_offset)
        };
        let tracker = ViewportTracker::new(settings.draw_active_viewport);
        let scene = build_scene(snapshot, &settings, view_offset, &tracker)?;
        surface.draw_scene(&scene)?;
        Ok(scene)
    }

    /// Update the viewport indicator from `snapshot`'s viewport.
    ///
    /// Returns whether the indicator was redrawn; `false` when nothing is mounted.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to draw.
    pub fn render_canvas_viewport(&self, snapshot: &CanvasSnapshot) -> Result<bool, MinimapError> {
        match self.session.borrow_mut().overlay.as_mut() {
            Some(overlay) => overlay.track(snapshot.viewport),
            None => Ok(false),
        }
    }

    // --- Pointer input ---

    /// Start a drag. Returns `false` if the press was ignored.
    ///
    /// `local` is the press position in minimap pixels, `client` in document pixels.
    pub fn pointer_down(&self, target: DragTarget, local: Vector2, client: Vector2, button: Button, modifiers: Modifiers) -> bool {
        if button != Button::Primary {
            return false;
        }
        let (placement, view_offset) = {
            let session = self.session.borrow();
            match &session.overlay {
                Some(overlay) if !session.drag.is_active() => (overlay.placement, session.view_offset),
                _ => return false,
            }
        };
        let listener = self.host.listen_document_pointer();
        self.session.borrow_mut().drag = DragState::begin(target, local, client, modifiers, placement, view_offset, listener);
        true
    }

    /// Document pointer-move during a drag.
    ///
    /// # Errors
    ///
    /// Returns an error if re-rendering or repositioning the surface fails.
    pub fn pointer_move(&self, client: Vector2) -> Result<(), MinimapError> {
        let container = self.host.container_size();
        let mut session = self.session.borrow_mut();
        if session.drag.advance(client).is_none() {
            return Ok(());
        }
        let (Some(total), DragState::Dragging { target, moved, start, start_offset, .. }) = (session.drag.total_delta(), session.drag)
        else {
            return Ok(());
        };

        match target {
            DragTarget::View => {
                if !moved {
                    return Ok(());
                }
                let scale = session.overlay.as_ref().map_or(1.0, ActiveOverlay::scale);
                session.view_offset = start_offset - total * (1.0 / scale);
                session.rebuild()
            }
            DragTarget::Overlay => {
                session.settings.position_x = Some(start.left + total.x);
                session.settings.position_y = Some(start.top + total.y);
                place_overlay(&mut session, container)
            }
            DragTarget::Resize => {
                session.settings.width = (start.width + total.x).max(MIN_WIDTH);
                session.settings.height = (start.height + total.y).max(MIN_HEIGHT);
                session.settings.position_x = Some(start.left);
                session.settings.position_y = Some(start.top);
                place_overlay(&mut session, container)?;
                session.rebuild()
            }
        }
    }

    /// Document pointer-up ending a drag.
    ///
    /// A short drag on the view counts as a click and navigates the host
    /// canvas. Overlay moves and resizes are persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the final move fails or the settings cannot be
    /// serialized. The drag ends either way.
    pub fn pointer_up(&self, client: Vector2) -> Result<(), MinimapError> {
        let last_move = self.pointer_move(client);
        let drag = std::mem::take(&mut self.session.borrow_mut().drag);
        let DragState::Dragging { target, press_local, modifiers, listener, .. } = drag else {
            return last_move;
        };
        self.host.unlisten_document_pointer(listener);
        last_move?;

        if drag.is_click() {
            self.click(press_local, modifiers);
            return Ok(());
        }
        match target {
            DragTarget::Overlay | DragTarget::Resize => self.persist_settings(),
            DragTarget::View => Ok(()),
        }
    }

    /// Resolve a click at minimap-local `local` and navigate the host canvas.
    ///
    /// Returns the command that was issued, if any.
    pub fn click(&self, local: Vector2, modifiers: Modifiers) -> Option<NavigationCommand> {
        let (command, canvas) = {
            let session = self.session.borrow();
            let overlay = session.overlay.as_ref()?;
            let scene = overlay.scene.as_ref()?;
            let command = navigate::resolve_click(scene, local, modifiers, &session.settings)?;
            (command, Rc::clone(&overlay.canvas))
        };
        // The host may call back into the minimap from here.
        navigate::execute(command, canvas.as_ref());
        Some(command)
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.session.borrow().state
    }

    /// The scene currently on the surface.
    #[must_use]
    pub fn scene(&self) -> Option<Scene> {
        self.session.borrow().overlay.as_ref().and_then(|o| o.scene.clone())
    }

    /// Whether host methods are currently wrapped by this overlay.
    #[must_use]
    pub fn is_intercepting(&self) -> bool {
        self.session.borrow().overlay.as_ref().is_some_and(|o| o.guard.is_some())
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.borrow().drag.is_active()
    }

    #[must_use]
    pub fn view_offset(&self) -> Vector2 {
        self.session.borrow().view_offset
    }

    #[must_use]
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    fn subscribe_handlers(&self) -> Vec<SubscriptionId> {
        CanvasEventKind::ALL
            .into_iter()
            .map(|kind| {
                let session = Rc::downgrade(&self.session);
                self.bus.subscribe(kind, move |event: &CanvasEvent| {
                    if let CanvasEvent::Moved { node_id: Some(id) } = event {
                        tracing::trace!(node = %id, "canvas node moved");
                    }
                    match event.kind() {
                        CanvasEventKind::Tick => with_session(&session, Session::tick),
                        _ => with_session(&session, Session::rebuild),
                    }
                })
            })
            .collect()
    }
}

impl Drop for CanvasMinimap {
    fn drop(&mut self) {
        if self.session.try_borrow().is_ok_and(|s| s.state != LifecycleState::Unloaded) {
            self.unload_minimap();
        }
    }
}

fn place_overlay(session: &mut Session, (container_w, container_h): (f64, f64)) -> Result<(), MinimapError> {
    let placement = session.settings.placement(container_w, container_h);
    let Some(overlay) = session.overlay.as_mut() else {
        return Ok(());
    };
    overlay.placement = placement;
    overlay.surface.set_placement(&placement)
}
