//! Typed, synchronous publish/subscribe channel for canvas notifications.
//!
//! DESIGN
//! ======
//! The bus is an explicit object owned by the overlay and shared by `Rc`; there
//! is no global registry. Dispatch is single-threaded and synchronous: `publish`
//! returns only after every subscriber for that event kind has run, in
//! registration order. The handler list is snapshotted before dispatch so a
//! handler may subscribe or unsubscribe while the bus is dispatching. A handler
//! that returns `Err` is logged and skipped; it never stops the remaining
//! handlers or later dispatches.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::MinimapError;
use crate::snapshot::NodeId;

/// The four notifications the host canvas produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanvasEventKind {
    /// A node was moved.
    Moved,
    /// The canvas was marked dirty and needs a redraw.
    Dirty,
    /// The host viewport was panned or zoomed.
    ViewportChanged,
    /// One animation frame elapsed.
    Tick,
}

impl CanvasEventKind {
    pub const ALL: [Self; 4] = [Self::Moved, Self::Dirty, Self::ViewportChanged, Self::Tick];
}

/// A notification published on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// A node was moved. Carries the node id when the host passed one.
    Moved { node_id: Option<NodeId> },
    Dirty,
    ViewportChanged,
    Tick,
}

impl CanvasEvent {
    #[must_use]
    pub fn kind(&self) -> CanvasEventKind {
        match self {
            Self::Moved { .. } => CanvasEventKind::Moved,
            Self::Dirty => CanvasEventKind::Dirty,
            Self::ViewportChanged => CanvasEventKind::ViewportChanged,
            Self::Tick => CanvasEventKind::Tick,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&CanvasEvent) -> Result<(), MinimapError>>;

struct Subscription {
    id: SubscriptionId,
    kind: CanvasEventKind,
    handler: Handler,
}

/// In-process event bus carrying [`CanvasEvent`]s.
#[derive(Default)]
pub struct EventBus {
    subscriptions: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.borrow().len())
            .finish_non_exhaustive()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every event of `kind`.
    pub fn subscribe<F>(&self, kind: CanvasEventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&CanvasEvent) -> Result<(), MinimapError> + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.subscriptions.borrow_mut().push(Subscription { id, kind, handler: Rc::new(handler) });
        id
    }

    /// Remove a subscription. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscriptions.borrow_mut();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Deliver `event` to every subscriber of its kind, in registration order.
    ///
    /// Returns the number of handlers that ran successfully.
    pub fn publish(&self, event: &CanvasEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<(SubscriptionId, Handler)> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| (s.id, Rc::clone(&s.handler)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in handlers {
            match handler(event) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(?kind, subscription = id.0, error = %e, "canvas event subscriber failed"),
            }
        }
        delivered
    }

    /// Number of live subscriptions for `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: CanvasEventKind) -> usize {
        self.subscriptions.borrow().iter().filter(|s| s.kind == kind).count()
    }

    /// Total number of live subscriptions across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.borrow().is_empty()
    }
}
