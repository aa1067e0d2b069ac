//! Interception of the host canvas's internal mutation methods.
//!
//! DESIGN
//! ======
//! The host canvas exposes no subscription API for moves, dirty marks,
//! viewport changes or frame ticks. It does route those calls through a
//! shared, name-keyed method table ([`BehaviorTable`]). [`InterceptGuard`]
//! decorates the four relevant entries: each wrapper runs the original
//! unmodified, then reports the call to a [`CanvasEventSource`].
//!
//! Installation is idempotent per table (the `patched` flag blocks a second
//! wrap) and scoped: dropping the guard puts the exact original entries back.
//! The bookkeeping lives in [`ScopedPatch`], generic over [`PatchTarget`], so
//! the browser's prototype patch restores the same way.
//! A method the host no longer defines is skipped with a warning, so a host
//! upgrade that renames internals degrades to "no live updates" instead of
//! failing.

#[cfg(test)]
#[path = "intercept_test.rs"]
mod intercept_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::events::{CanvasEvent, CanvasEventKind, EventBus};

/// A host method body. Arguments are opaque and forwarded untouched.
pub type HostMethodFn = Rc<dyn Fn(&Value)>;

/// The four host canvas methods the minimap observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostMethod {
    MarkMoved,
    MarkDirty,
    MarkViewportChanged,
    RequestFrame,
}

impl HostMethod {
    pub const ALL: [Self; 4] = [Self::MarkMoved, Self::MarkDirty, Self::MarkViewportChanged, Self::RequestFrame];

    /// Name of the method on the host canvas.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MarkMoved => "markMoved",
            Self::MarkDirty => "markDirty",
            Self::MarkViewportChanged => "markViewportChanged",
            Self::RequestFrame => "requestFrame",
        }
    }

    /// The bus event emitted after this method runs.
    #[must_use]
    pub fn event_kind(self) -> CanvasEventKind {
        match self {
            Self::MarkMoved => CanvasEventKind::Moved,
            Self::MarkDirty => CanvasEventKind::Dirty,
            Self::MarkViewportChanged => CanvasEventKind::ViewportChanged,
            Self::RequestFrame => CanvasEventKind::Tick,
        }
    }
}

/// The host canvas's shared method table.
#[derive(Default)]
pub struct BehaviorTable {
    methods: RefCell<HashMap<String, HostMethodFn>>,
    patched: Cell<bool>,
}

impl std::fmt::Debug for BehaviorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.methods.borrow().keys().cloned().collect();
        names.sort();
        f.debug_struct("BehaviorTable").field("methods", &names).field("patched", &self.patched.get()).finish()
    }
}

impl BehaviorTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or replace a method.
    pub fn define<F>(&self, name: &str, body: F)
    where
        F: Fn(&Value) + 'static,
    {
        self.set(name, Rc::new(body));
    }

    /// Store `body` under `name`, replacing any previous entry.
    pub fn set(&self, name: &str, body: HostMethodFn) {
        self.methods.borrow_mut().insert(name.to_string(), body);
    }

    /// Current body stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<HostMethodFn> {
        self.methods.borrow().get(name).map(Rc::clone)
    }

    /// Remove a method, returning its body.
    pub fn remove(&self, name: &str) -> Option<HostMethodFn> {
        self.methods.borrow_mut().remove(name)
    }

    /// Call a method the way the host does. Returns `false` if it is undefined.
    ///
    /// The table is not borrowed while the body runs, so a body may invoke
    /// other methods.
    pub fn invoke(&self, name: &str, args: &Value) -> bool {
        let Some(body) = self.get(name) else {
            return false;
        };
        body(args);
        true
    }

    /// Whether an [`InterceptGuard`] currently owns this table.
    #[must_use]
    pub fn is_patched(&self) -> bool {
        self.patched.get()
    }
}

/// Capability interface receiving intercepted host calls.
pub trait CanvasEventSource {
    /// A node moved. `args` are the host's call arguments.
    fn on_moved(&self, args: &Value);
    fn on_dirty(&self);
    fn on_viewport_changed(&self);
    fn on_tick(&self);
}

/// Report one call of `method` to `source`.
pub fn notify(source: &dyn CanvasEventSource, method: HostMethod, args: &Value) {
    match method {
        HostMethod::MarkMoved => source.on_moved(args),
        HostMethod::MarkDirty => source.on_dirty(),
        HostMethod::MarkViewportChanged => source.on_viewport_changed(),
        HostMethod::RequestFrame => source.on_tick(),
    }
}

/// [`CanvasEventSource`] that publishes onto an [`EventBus`].
///
/// Holds the bus weakly: once the overlay drops its bus, any wrapper still
/// installed on the host forwards calls and publishes nothing.
#[derive(Debug, Clone)]
pub struct BusEventSource {
    bus: Weak<EventBus>,
}

impl BusEventSource {
    #[must_use]
    pub fn new(bus: &Rc<EventBus>) -> Self {
        Self { bus: Rc::downgrade(bus) }
    }

    fn publish(&self, event: &CanvasEvent) {
        if let Some(bus) = self.bus.upgrade() {
            bus.publish(event);
        }
    }
}

/// Extract a node id from `markMoved` arguments: either the bare id string or
/// a node object carrying an `id` field.
#[must_use]
pub fn moved_node_id(args: &Value) -> Option<String> {
    match args {
        Value::String(id) => Some(id.clone()),
        Value::Object(map) => map.get("id").and_then(Value::as_str).map(str::to_string),
        Value::Array(items) => items.first().and_then(moved_node_id),
        _ => None,
    }
}

impl CanvasEventSource for BusEventSource {
    fn on_moved(&self, args: &Value) {
        self.publish(&CanvasEvent::Moved { node_id: moved_node_id(args) });
    }

    fn on_dirty(&self) {
        self.publish(&CanvasEvent::Dirty);
    }

    fn on_viewport_changed(&self) {
        self.publish(&CanvasEvent::ViewportChanged);
    }

    fn on_tick(&self) {
        self.publish(&CanvasEvent::Tick);
    }
}

/// A host object whose observed methods can be swapped for wrappers and back.
///
/// [`ScopedPatch`] drives the install/restore bookkeeping; implementors only
/// read and write single entries.
pub trait PatchTarget {
    /// A method body as the host stores it.
    type Method;
    /// State that must stay alive while a wrapper is installed.
    type Keepalive;
    type Error: std::fmt::Debug;

    /// Whether some patch already owns this target.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the marker cannot be read.
    fn is_marked(&self) -> Result<bool, Self::Error>;

    /// Set or clear the ownership marker.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the marker cannot be written.
    fn set_marked(&self, marked: bool) -> Result<(), Self::Error>;

    /// Current body of `method`; `None` when missing or not callable.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the entry cannot be read.
    fn lookup(&self, method: HostMethod) -> Result<Option<Self::Method>, Self::Error>;

    /// Replace `method` with a wrapper that runs `original`, then reports the
    /// call to `source`. On error the entry must be left as it was.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the wrapper cannot be built or stored.
    fn wrap(
        &self,
        method: HostMethod,
        original: &Self::Method,
        source: &Rc<dyn CanvasEventSource>,
    ) -> Result<Self::Keepalive, Self::Error>;

    /// Put `original` back under `method`.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the entry cannot be written.
    fn restore(&self, method: HostMethod, original: Self::Method) -> Result<(), Self::Error>;
}

/// Wrapped methods of one [`PatchTarget`], restored on drop.
///
/// Every method is recorded the moment its wrapper is in place, so an install
/// that fails partway still restores what it had already wrapped.
pub struct ScopedPatch<T: PatchTarget> {
    target: T,
    originals: Vec<(HostMethod, T::Method)>,
    keepalive: Vec<T::Keepalive>,
}

impl<T: PatchTarget> ScopedPatch<T> {
    /// Wrap the observed methods of `target`.
    ///
    /// Returns `Ok(None)` when `target` is already marked; the existing
    /// wrappers stay in place and nothing is wrapped twice. Missing methods are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns the first host error. Methods wrapped before it are restored
    /// and the marker is cleared before returning.
    pub fn install(target: T, source: &Rc<dyn CanvasEventSource>) -> Result<Option<Self>, T::Error> {
        if target.is_marked()? {
            tracing::debug!("host canvas already intercepted");
            return Ok(None);
        }

        let mut patch = Self {
            target,
            originals: Vec::with_capacity(HostMethod::ALL.len()),
            keepalive: Vec::with_capacity(HostMethod::ALL.len()),
        };
        patch.target.set_marked(true)?;
        for method in HostMethod::ALL {
            let Some(original) = patch.target.lookup(method)? else {
                tracing::warn!(method = method.name(), "host canvas method missing; live updates disabled for it");
                continue;
            };
            let keepalive = patch.target.wrap(method, &original, source)?;
            patch.originals.push((method, original));
            patch.keepalive.push(keepalive);
        }

        tracing::debug!(wrapped = patch.originals.len(), "host canvas interception installed");
        Ok(Some(patch))
    }

    /// Methods this patch wrapped.
    pub fn wrapped(&self) -> impl Iterator<Item = HostMethod> + '_ {
        self.originals.iter().map(|(m, _)| *m)
    }
}

impl<T: PatchTarget> Drop for ScopedPatch<T> {
    fn drop(&mut self) {
        for (method, original) in self.originals.drain(..).rev() {
            if let Err(err) = self.target.restore(method, original) {
                tracing::warn!(method = method.name(), error = ?err, "failed to restore host canvas method");
            }
        }
        if let Err(err) = self.target.set_marked(false) {
            tracing::warn!(error = ?err, "failed to clear host canvas patch marker");
        }
        // Wrappers are gone; their state can go too.
        self.keepalive.clear();
        tracing::debug!("host canvas interception removed");
    }
}

impl PatchTarget for Rc<BehaviorTable> {
    type Method = HostMethodFn;
    type Keepalive = ();
    type Error = Infallible;

    fn is_marked(&self) -> Result<bool, Infallible> {
        Ok(self.patched.get())
    }

    fn set_marked(&self, marked: bool) -> Result<(), Infallible> {
        self.patched.set(marked);
        Ok(())
    }

    fn lookup(&self, method: HostMethod) -> Result<Option<HostMethodFn>, Infallible> {
        Ok(self.get(method.name()))
    }

    fn wrap(&self, method: HostMethod, original: &HostMethodFn, source: &Rc<dyn CanvasEventSource>) -> Result<(), Infallible> {
        let inner = Rc::clone(original);
        let source = Rc::clone(source);
        self.set(
            method.name(),
            Rc::new(move |args: &Value| {
                inner(args);
                notify(source.as_ref(), method, args);
            }),
        );
        Ok(())
    }

    fn restore(&self, method: HostMethod, original: HostMethodFn) -> Result<(), Infallible> {
        self.set(method.name(), original);
        Ok(())
    }
}

/// Scoped interception of a [`BehaviorTable`].
///
/// Restores every wrapped method on drop.
pub struct InterceptGuard {
    patch: ScopedPatch<Rc<BehaviorTable>>,
}

impl std::fmt::Debug for InterceptGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let wrapped: Vec<HostMethod> = self.wrapped().collect();
        f.debug_struct("InterceptGuard").field("wrapped", &wrapped).finish_non_exhaustive()
    }
}

impl InterceptGuard {
    /// Wrap the observed methods of `table` so each call also reaches `source`.
    ///
    /// Returns `None` when the table is already patched; the existing wrappers
    /// stay in place and nothing is wrapped twice.
    #[must_use]
    pub fn install(table: &Rc<BehaviorTable>, source: Rc<dyn CanvasEventSource>) -> Option<Self> {
        match ScopedPatch::install(Rc::clone(table), &source) {
            Ok(patch) => patch.map(|patch| Self { patch }),
            Err(never) => match never {},
        }
    }

    /// Methods this guard wrapped.
    pub fn wrapped(&self) -> impl Iterator<Item = HostMethod> + '_ {
        self.patch.wrapped()
    }

    /// Restore the original methods now. Equivalent to dropping the guard.
    pub fn uninstall(self) {
        drop(self);
    }
}
