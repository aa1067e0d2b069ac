//! Browser bindings for the canvas minimap.
//!
//! ARCHITECTURE
//! ============
//!
//! `canvas_minimap` owns every decision: bounds, scene building, hit-testing,
//! drag state, and the overlay lifecycle. This crate only implements its host
//! traits on top of the DOM and exposes the plugin hooks to JavaScript.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`host`] | [`host::JsCanvas`], the live canvas object as a `HostCanvas` |
//! | [`patch`] | Prototype patch that reports host mutations to the event bus |
//! | [`dom`] | Overlay elements, placement, pointer listeners, persistence |
//! | [`render`] | Two-layer 2D canvas surface |
//!
//! The host canvas internals are not a Rust method table, so the core's
//! interception guard never installs here. [`WebMinimap`] installs a
//! [`patch::JsPrototypePatch`] instead, after every lifecycle change that
//! leaves the overlay active, and drops it before the next one.

pub mod dom;
pub mod host;
pub mod patch;
pub mod render;

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use canvas_minimap::host::HostCanvas;
use canvas_minimap::intercept::BusEventSource;
use canvas_minimap::minimap::LifecycleState;
use canvas_minimap::svg::SvgSurface;
use canvas_minimap::{CanvasMinimap, MinimapError, MinimapSettings};
use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::dom::DomOverlayHost;
use crate::patch::JsPrototypePatch;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        tracing::debug!(error = %err, "console logger already initialized");
    }
}

fn to_js(err: impl Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// The minimap plugin as seen from JavaScript.
#[wasm_bindgen]
pub struct WebMinimap {
    minimap: Rc<CanvasMinimap>,
    host: Rc<DomOverlayHost>,
    patch: RefCell<Option<JsPrototypePatch>>,
}

#[wasm_bindgen]
impl WebMinimap {
    /// `active_canvas` returns the active canvas object or `null`;
    /// `persist` receives the settings JSON whenever it changes.
    ///
    /// # Errors
    ///
    /// Fails outside a browser window or when `settings_json` is malformed.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: HtmlElement,
        active_canvas: Function,
        persist: Function,
        settings_json: Option<String>,
    ) -> Result<WebMinimap, JsValue> {
        let settings = match settings_json.as_deref() {
            Some(json) if !json.trim().is_empty() => MinimapSettings::from_json(json).map_err(to_js)?,
            _ => MinimapSettings::default(),
        };
        let host = Rc::new(DomOverlayHost::new(container, active_canvas, persist)?);
        let minimap = Rc::new(CanvasMinimap::new(host.clone(), settings));
        host.attach(&minimap);
        Ok(Self { minimap, host, patch: RefCell::new(None) })
    }

    /// Plugin activation.
    ///
    /// # Errors
    ///
    /// Returns a JS `Error` when mounting or the first render fails.
    pub fn activate(&self) -> Result<(), JsValue> {
        self.lifecycle(CanvasMinimap::activate)
    }

    pub fn deactivate(&self) {
        self.patch.borrow_mut().take();
        self.minimap.deactivate();
    }

    /// # Errors
    ///
    /// Returns a JS `Error` when mounting or the first render fails.
    #[wasm_bindgen(js_name = setupMinimap)]
    pub fn setup_minimap(&self) -> Result<(), JsValue> {
        self.lifecycle(CanvasMinimap::setup_minimap)
    }

    /// # Errors
    ///
    /// Returns a JS `Error` when mounting or the first render fails.
    #[wasm_bindgen(js_name = reloadMinimap)]
    pub fn reload_minimap(&self) -> Result<(), JsValue> {
        self.lifecycle(CanvasMinimap::reload_minimap)
    }

    #[wasm_bindgen(js_name = unloadMinimap)]
    pub fn unload_minimap(&self) {
        self.patch.borrow_mut().take();
        self.minimap.unload_minimap();
    }

    /// # Errors
    ///
    /// Returns a JS `Error` when mounting or the first render fails.
    #[wasm_bindgen(js_name = onActiveViewChange)]
    pub fn on_active_view_change(&self) -> Result<(), JsValue> {
        self.lifecycle(CanvasMinimap::on_active_view_change)
    }

    /// # Errors
    ///
    /// Returns a JS `Error` when persisting or reloading fails.
    pub fn toggle(&self) -> Result<(), JsValue> {
        self.lifecycle(CanvasMinimap::toggle)
    }

    /// Apply one settings-UI change, persist, and reload.
    ///
    /// # Errors
    ///
    /// Returns a JS `Error` for unknown keys, unparsable values, or a failed reload.
    #[wasm_bindgen(js_name = setOption)]
    pub fn set_option(&self, key: &str, value: &str) -> Result<(), JsValue> {
        let mut settings = self.minimap.settings();
        settings.set_option(key, value).map_err(to_js)?;
        self.lifecycle(|minimap| minimap.update_settings(settings))
    }

    /// # Errors
    ///
    /// Returns a JS `Error` if the settings cannot be serialized.
    #[wasm_bindgen(js_name = settingsJson)]
    pub fn settings_json(&self) -> Result<String, JsValue> {
        self.minimap.settings().to_json().map_err(to_js)
    }

    /// Redraw the viewport indicator from the active canvas. Returns whether
    /// anything was drawn.
    ///
    /// # Errors
    ///
    /// Returns a JS `Error` if the indicator layer fails to draw.
    #[wasm_bindgen(js_name = renderCanvasViewport)]
    pub fn render_canvas_viewport(&self) -> Result<bool, JsValue> {
        let Some(canvas) = self.host.active_canvas_object() else {
            return Ok(false);
        };
        self.minimap.render_canvas_viewport(&canvas.snapshot()).map_err(to_js)
    }

    /// The active canvas rendered as a standalone SVG document, or an empty
    /// string when no canvas is active.
    ///
    /// # Errors
    ///
    /// Returns a JS `Error` for edges with invalid sides.
    #[wasm_bindgen(js_name = exportSvg)]
    pub fn export_svg(&self) -> Result<String, JsValue> {
        let Some(canvas) = self.host.active_canvas_object() else {
            return Ok(String::new());
        };
        let mut surface = SvgSurface::new();
        self.minimap.render_minimap(&mut surface, &canvas.snapshot()).map_err(to_js)?;
        Ok(surface.markup())
    }

    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.minimap.state() == LifecycleState::Active
    }
}

impl WebMinimap {
    /// Run a lifecycle operation with the prototype patch removed, then patch
    /// the active canvas again if the overlay came up.
    fn lifecycle(&self, op: impl FnOnce(&CanvasMinimap) -> Result<(), MinimapError>) -> Result<(), JsValue> {
        self.patch.borrow_mut().take();
        let result = op(self.minimap.as_ref());
        if self.minimap.state() == LifecycleState::Active {
            self.install_patch();
        }
        result.map_err(to_js)
    }

    fn install_patch(&self) {
        let Some(canvas) = self.host.active_canvas_object() else {
            return;
        };
        let source = Rc::new(BusEventSource::new(self.minimap.bus()));
        match JsPrototypePatch::install(&canvas.prototype(), source) {
            Ok(patch) => *self.patch.borrow_mut() = patch,
            Err(err) => tracing::warn!(error = ?err, "failed to patch host canvas; live updates disabled"),
        }
    }
}
