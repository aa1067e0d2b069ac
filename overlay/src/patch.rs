//! Interception of the live host canvas through its JS prototype.
//!
//! The browser-side counterpart of `canvas_minimap::intercept::InterceptGuard`.
//! Each observed method on the prototype is replaced by a small JS wrapper
//! that calls the original with the same `this` and arguments, then hands
//! the first argument to a Rust closure which reports the call to a
//! [`CanvasEventSource`]. A marker property on the prototype prevents a second
//! patch; dropping the patch puts the original functions back and clears the
//! marker. Install and restore bookkeeping is [`ScopedPatch`]'s; this module
//! only reads and writes prototype members.

use std::rc::Rc;

use canvas_minimap::intercept::{self, CanvasEventSource, HostMethod, PatchTarget, ScopedPatch};
use js_sys::{Function, Object, Reflect};
use serde_json::Value;
use wasm_bindgen::prelude::*;

const PATCH_MARKER: &str = "__canvasMinimapPatched";

/// Body of the JS factory `(original, notify) => wrapper`.
const WRAPPER_FACTORY: &str = "return function (...args) {\
    const result = original.apply(this, args);\
    notify(args.length > 0 ? args[0] : undefined);\
    return result;\
};";

type Notifier = Closure<dyn Fn(JsValue)>;

/// A canvas prototype object seen as a [`PatchTarget`].
struct Prototype {
    object: Object,
    /// JS factory `(original, notify) => wrapper`.
    factory: Function,
}

impl PatchTarget for Prototype {
    type Method = Function;
    type Keepalive = Notifier;
    type Error = JsValue;

    fn is_marked(&self) -> Result<bool, JsValue> {
        Ok(Reflect::get(&self.object, &JsValue::from_str(PATCH_MARKER))?.is_truthy())
    }

    fn set_marked(&self, marked: bool) -> Result<(), JsValue> {
        let key = JsValue::from_str(PATCH_MARKER);
        if marked {
            Reflect::set(&self.object, &key, &JsValue::TRUE)?;
        } else {
            Reflect::delete_property(&self.object, &key)?;
        }
        Ok(())
    }

    fn lookup(&self, method: HostMethod) -> Result<Option<Function>, JsValue> {
        let member = Reflect::get(&self.object, &JsValue::from_str(method.name()))?;
        Ok(member.dyn_ref::<Function>().cloned())
    }

    fn wrap(&self, method: HostMethod, original: &Function, source: &Rc<dyn CanvasEventSource>) -> Result<Notifier, JsValue> {
        let source = Rc::clone(source);
        let notifier: Notifier = Closure::new(move |arg: JsValue| {
            intercept::notify(source.as_ref(), method, &call_args(&arg));
        });
        let wrapper = self.factory.call2(&JsValue::NULL, original, notifier.as_ref().unchecked_ref())?;
        Reflect::set(&self.object, &JsValue::from_str(method.name()), &wrapper)?;
        Ok(notifier)
    }

    fn restore(&self, method: HostMethod, original: Function) -> Result<(), JsValue> {
        Reflect::set(&self.object, &JsValue::from_str(method.name()), &original)?;
        Ok(())
    }
}

/// Scoped patch of a host canvas prototype.
pub struct JsPrototypePatch {
    patch: ScopedPatch<Prototype>,
}

impl JsPrototypePatch {
    /// Wrap the observed methods of `target`.
    ///
    /// Returns `Ok(None)` if `target` already carries a patch. Members that
    /// are missing or not functions are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns the JS exception if reading or writing `target` throws. Any
    /// method wrapped before the exception is restored first.
    pub fn install(target: &Object, source: Rc<dyn CanvasEventSource>) -> Result<Option<Self>, JsValue> {
        let prototype = Prototype {
            object: target.clone(),
            factory: Function::new_with_args("original, notify", WRAPPER_FACTORY),
        };
        let patch = ScopedPatch::install(prototype, &source)?;
        Ok(patch.map(|patch| Self { patch }))
    }

    /// Methods this patch wrapped.
    pub fn wrapped(&self) -> impl Iterator<Item = HostMethod> + '_ {
        self.patch.wrapped()
    }
}

/// Reduce a host call argument to the JSON the core understands: a bare id
/// string, or `{ "id": ... }` for node objects. Node objects are cyclic, so
/// they are never serialized whole.
fn call_args(arg: &JsValue) -> Value {
    if let Some(id) = arg.as_string() {
        return Value::String(id);
    }
    if !arg.is_object() {
        return Value::Null;
    }
    match Reflect::get(arg, &JsValue::from_str("id")) {
        Ok(id) => id.as_string().map_or(Value::Null, |id| serde_json::json!({ "id": id })),
        Err(_) => Value::Null,
    }
}
