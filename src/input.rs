//! Input model: modifier keys, mouse buttons, and the drag state machine.
//!
//! A pointer-down on the minimap starts a drag of one of three targets: the
//! minimap's internal view, the overlay element itself, or its resize grip.
//! `DragState` carries everything needed between pointer-down and pointer-up:
//! the press position (for click detection), the last position (for
//! incremental deltas), the overlay placement at press time (for absolute
//! move/resize), and the document listener registered for the drag.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::config::OverlayPlacement;
use crate::consts::CLICK_SLOP_PX;
use crate::geometry::Vector2;
use crate::host::ListenerId;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    /// Whether the navigation modifier (Ctrl, or Cmd on macOS) is held.
    #[must_use]
    pub fn is_secondary(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Secondary,
}

/// What a drag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// Pans the minimap's internal view. Short drags count as clicks.
    View,
    /// Moves the overlay element inside its container.
    Overlay,
    /// Resizes the overlay element from its bottom-right grip.
    Resize,
}

/// Gesture state between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    Dragging {
        target: DragTarget,
        /// Minimap-local position of the press, used to resolve a click.
        press_local: Vector2,
        /// Client-space position of the press.
        origin: Vector2,
        /// Client-space position of the previous pointer event.
        last: Vector2,
        /// Set once the pointer has travelled further than the click slop.
        moved: bool,
        /// Modifiers held at press time.
        modifiers: Modifiers,
        /// Overlay placement at press time.
        start: OverlayPlacement,
        /// Minimap view offset at press time.
        start_offset: Vector2,
        listener: ListenerId,
    },
}

impl DragState {
    #[must_use]
    pub fn begin(
        target: DragTarget,
        press_local: Vector2,
        client: Vector2,
        modifiers: Modifiers,
        start: OverlayPlacement,
        start_offset: Vector2,
        listener: ListenerId,
    ) -> Self {
        Self::Dragging {
            target,
            press_local,
            origin: client,
            last: client,
            moved: false,
            modifiers,
            start,
            start_offset,
            listener,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    #[must_use]
    pub fn target(&self) -> Option<DragTarget> {
        match self {
            Self::Dragging { target, .. } => Some(*target),
            Self::Idle => None,
        }
    }

    #[must_use]
    pub fn listener(&self) -> Option<ListenerId> {
        match self {
            Self::Dragging { listener, .. } => Some(*listener),
            Self::Idle => None,
        }
    }

    /// Move the pointer to `client`, returning the delta from the previous
    /// position. `None` when idle.
    pub fn advance(&mut self, client: Vector2) -> Option<Vector2> {
        match self {
            Self::Dragging { origin, last, moved, .. } => {
                let delta = client - *last;
                *last = client;
                if client.distance_squared(*origin) > CLICK_SLOP_PX * CLICK_SLOP_PX {
                    *moved = true;
                }
                Some(delta)
            }
            Self::Idle => None,
        }
    }

    /// Client-space travel since the press.
    #[must_use]
    pub fn total_delta(&self) -> Option<Vector2> {
        match self {
            Self::Dragging { origin, last, .. } => Some(*last - *origin),
            Self::Idle => None,
        }
    }

    /// Whether releasing now should count as a click rather than a drag.
    #[must_use]
    pub fn is_click(&self) -> bool {
        matches!(self, Self::Dragging { target: DragTarget::View, moved: false, .. })
    }
}
