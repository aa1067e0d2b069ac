//! [`HostCanvas`] over the live JS canvas object.

use std::rc::Rc;

use canvas_minimap::MinimapError;
use canvas_minimap::geometry::BoundingBox;
use canvas_minimap::host::HostCanvas;
use canvas_minimap::intercept::BehaviorTable;
use canvas_minimap::snapshot::CanvasSnapshot;
use js_sys::{Array, Function, JSON, Object, Reflect};
use wasm_bindgen::prelude::*;

/// The host's canvas object: `getData()`, `getViewportBBox()`, `panTo(x, y)`
/// and `zoomToBbox(bbox)`.
#[derive(Debug, Clone)]
pub struct JsCanvas {
    inner: JsValue,
}

impl JsCanvas {
    #[must_use]
    pub fn new(inner: JsValue) -> Self {
        Self { inner }
    }

    /// The prototype shared by every canvas of the host.
    #[must_use]
    pub fn prototype(&self) -> Object {
        Object::get_prototype_of(&self.inner)
    }

    fn call(&self, name: &str, args: &Array) -> Result<JsValue, JsValue> {
        let method: Function = Reflect::get(&self.inner, &JsValue::from_str(name))?.dyn_into()?;
        method.apply(&self.inner, args)
    }

    fn call_json(&self, name: &str) -> Result<String, JsValue> {
        let value = self.call(name, &Array::new())?;
        Ok(JSON::stringify(&value)?.into())
    }

    fn try_snapshot(&self) -> Result<CanvasSnapshot, MinimapError> {
        let json = self.call_json("getData").map_err(js_error)?;
        CanvasSnapshot::from_canvas_json(&json, self.viewport_bbox())
    }

    fn try_viewport(&self) -> Result<BoundingBox, MinimapError> {
        let json = self.call_json("getViewportBBox").map_err(js_error)?;
        Ok(serde_json::from_str(&json)?)
    }
}

pub(crate) fn js_error(err: JsValue) -> MinimapError {
    MinimapError::Surface(format!("{err:?}"))
}

impl HostCanvas for JsCanvas {
    fn snapshot(&self) -> CanvasSnapshot {
        self.try_snapshot().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to read host canvas data");
            CanvasSnapshot::new()
        })
    }

    fn viewport_bbox(&self) -> BoundingBox {
        self.try_viewport().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to read host viewport");
            BoundingBox::EMPTY
        })
    }

    fn pan_to(&self, x: f64, y: f64) {
        let args = Array::of2(&JsValue::from_f64(x), &JsValue::from_f64(y));
        if let Err(err) = self.call("panTo", &args) {
            tracing::warn!(error = ?err, "host panTo failed");
        }
    }

    fn zoom_to_bbox(&self, bbox: BoundingBox) {
        let arg = match serde_json::to_string(&bbox) {
            Ok(json) => JSON::parse(&json),
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode zoom target");
                return;
            }
        };
        let result = arg.and_then(|arg| self.call("zoomToBbox", &Array::of1(&arg)));
        if let Err(err) = result {
            tracing::warn!(error = ?err, "host zoomToBbox failed");
        }
    }

    /// The live host does not expose its method table to Rust; interception
    /// goes through [`crate::patch::JsPrototypePatch`] instead.
    fn behavior_table(&self) -> Option<Rc<BehaviorTable>> {
        None
    }
}
