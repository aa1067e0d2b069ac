//! DOM side of the overlay: element creation, placement, and pointer wiring.
//!
//! [`DomOverlayHost`] implements [`OverlayHost`] for a container element
//! supplied by the plugin glue. It builds the overlay element tree on mount,
//! forwards pointer-down events on the overlay parts to the minimap, and owns
//! the document-level move/up listeners that exist only for the length of a
//! drag.

#[cfg(test)]
#[path = "dom_test.rs"]
mod dom_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use canvas_minimap::config::OverlayPlacement;
use canvas_minimap::geometry::Vector2;
use canvas_minimap::host::{HostCanvas, ListenerId, MinimapSurface, OverlayHost};
use canvas_minimap::input::{Button, DragTarget, Modifiers};
use canvas_minimap::{CanvasMinimap, MinimapError};
use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent, PointerEvent};

use crate::host::{JsCanvas, js_error};
use crate::render::{Canvas2dSurface, CanvasLayer};

type PointerCallback = Closure<dyn FnMut(PointerEvent)>;

/// An event listener that can be removed again.
pub struct ElementListener {
    target: EventTarget,
    event: &'static str,
    callback: PointerCallback,
}

impl ElementListener {
    fn add(target: &EventTarget, event: &'static str, callback: PointerCallback) -> Result<Self, JsValue> {
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self { target: target.clone(), event, callback })
    }

    pub fn remove(&self) {
        let removed = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        if let Err(err) = removed {
            tracing::warn!(event = self.event, error = ?err, "failed to remove listener");
        }
    }
}

/// CSS declarations positioning the overlay.
#[must_use]
pub fn placement_declarations(placement: &OverlayPlacement) -> [(&'static str, String); 5] {
    [
        ("left", format!("{}px", placement.left)),
        ("top", format!("{}px", placement.top)),
        ("width", format!("{}px", placement.width)),
        ("height", format!("{}px", placement.height)),
        ("opacity", placement.opacity.to_string()),
    ]
}

pub(crate) fn apply_placement(element: &HtmlElement, placement: &OverlayPlacement) -> Result<(), JsValue> {
    let style = element.style();
    for (property, value) in placement_declarations(placement) {
        style.set_property(property, &value)?;
    }
    Ok(())
}

/// Map a DOM `MouseEvent.button` code.
#[must_use]
pub fn button_from_code(code: i16) -> Button {
    match code {
        0 => Button::Primary,
        1 => Button::Middle,
        _ => Button::Secondary,
    }
}

fn modifiers_of(event: &MouseEvent) -> Modifiers {
    Modifiers { shift: event.shift_key(), ctrl: event.ctrl_key(), alt: event.alt_key(), meta: event.meta_key() }
}

fn client_point(event: &MouseEvent) -> Vector2 {
    Vector2::new(f64::from(event.client_x()), f64::from(event.client_y()))
}

/// Document move/up listener pair for one drag.
struct DragListeners {
    on_move: ElementListener,
    on_up: ElementListener,
}

impl DragListeners {
    fn remove(&self) {
        self.on_move.remove();
        self.on_up.remove();
    }
}

/// [`OverlayHost`] backed by the browser DOM.
pub struct DomOverlayHost {
    document: Document,
    container: HtmlElement,
    dpr: f64,
    /// JS callback returning the active canvas object, or `null`.
    active_canvas: Function,
    /// JS callback receiving the settings JSON to persist.
    persist: Function,
    minimap: RefCell<Weak<CanvasMinimap>>,
    drags: RefCell<HashMap<ListenerId, DragListeners>>,
    /// Removed listeners whose callbacks may still be on the JS stack.
    retired: RefCell<Vec<DragListeners>>,
    next_listener: Cell<u64>,
}

impl DomOverlayHost {
    /// # Errors
    ///
    /// Fails outside a browser window.
    pub fn new(container: HtmlElement, active_canvas: Function, persist: Function) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self {
            document,
            container,
            dpr: window.device_pixel_ratio(),
            active_canvas,
            persist,
            minimap: RefCell::new(Weak::new()),
            drags: RefCell::new(HashMap::new()),
            retired: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
        })
    }

    /// Route pointer input to `minimap`.
    pub fn attach(&self, minimap: &Rc<CanvasMinimap>) {
        *self.minimap.borrow_mut() = Rc::downgrade(minimap);
    }

    /// The active canvas object, if the active view is a canvas.
    #[must_use]
    pub fn active_canvas_object(&self) -> Option<JsCanvas> {
        match self.active_canvas.call0(&JsValue::NULL) {
            Ok(value) if value.is_object() => Some(JsCanvas::new(value)),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(error = ?err, "active canvas lookup failed");
                None
            }
        }
    }

    fn create_html(&self, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
        let element: HtmlElement = self.document.create_element(tag)?.dyn_into()?;
        element.set_class_name(class);
        Ok(element)
    }

    fn create_layer(&self, class: &str) -> Result<CanvasLayer, JsValue> {
        let canvas: HtmlCanvasElement = self.create_html("canvas", class)?.dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        Ok(CanvasLayer { canvas, ctx })
    }

    fn press_listener(&self, element: &HtmlElement, target: DragTarget) -> Result<ElementListener, JsValue> {
        let minimap = self.minimap.borrow().clone();
        let callback: PointerCallback = Closure::new(move |event: PointerEvent| {
            let Some(minimap) = minimap.upgrade() else {
                return;
            };
            let local = Vector2::new(f64::from(event.offset_x()), f64::from(event.offset_y()));
            let started = minimap.pointer_down(
                target,
                local,
                client_point(&event),
                button_from_code(event.button()),
                modifiers_of(&event),
            );
            if started {
                event.prevent_default();
                event.stop_propagation();
            }
        });
        ElementListener::add(element, "pointerdown", callback)
    }

    fn drag_listener(&self, event: &'static str, finish: bool) -> Result<ElementListener, JsValue> {
        let minimap = self.minimap.borrow().clone();
        let callback: PointerCallback = Closure::new(move |e: PointerEvent| {
            let Some(minimap) = minimap.upgrade() else {
                return;
            };
            let client = client_point(&e);
            let result = if finish { minimap.pointer_up(client) } else { minimap.pointer_move(client) };
            if let Err(err) = result {
                tracing::warn!(error = %err, "minimap drag update failed");
            }
        });
        ElementListener::add(&self.document, event, callback)
    }

    fn mount(&self, placement: &OverlayPlacement) -> Result<Canvas2dSurface, JsValue> {
        let root = self.create_html("div", "canvas-minimap")?;
        root.style().set_property("position", "absolute")?;
        apply_placement(&root, placement)?;

        let base = self.create_layer("canvas-minimap-base")?;
        let indicator = self.create_layer("canvas-minimap-viewport")?;
        indicator.canvas.style().set_property("pointer-events", "none")?;
        let handle = self.create_html("div", "canvas-minimap-handle")?;
        let grip = self.create_html("div", "canvas-minimap-resize")?;

        for child in [base.canvas.unchecked_ref::<HtmlElement>(), indicator.canvas.unchecked_ref(), &handle, &grip] {
            root.append_child(child)?;
        }

        let listeners = vec![
            self.press_listener(base.canvas.unchecked_ref(), DragTarget::View)?,
            self.press_listener(&handle, DragTarget::Overlay)?,
            self.press_listener(&grip, DragTarget::Resize)?,
        ];
        self.container.append_child(&root)?;
        Ok(Canvas2dSurface::new(root, base, indicator, self.dpr, listeners))
    }
}

impl OverlayHost for DomOverlayHost {
    fn active_canvas(&self) -> Option<Rc<dyn HostCanvas>> {
        self.active_canvas_object().map(|c| Rc::new(c) as Rc<dyn HostCanvas>)
    }

    fn container_size(&self) -> (f64, f64) {
        (f64::from(self.container.client_width()), f64::from(self.container.client_height()))
    }

    fn mount_surface(&self, placement: &OverlayPlacement) -> Result<Box<dyn MinimapSurface>, MinimapError> {
        let surface = self.mount(placement).map_err(js_error)?;
        Ok(Box::new(surface))
    }

    fn listen_document_pointer(&self) -> ListenerId {
        self.retired.borrow_mut().clear();
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);

        match (self.drag_listener("pointermove", false), self.drag_listener("pointerup", true)) {
            (Ok(on_move), Ok(on_up)) => {
                self.drags.borrow_mut().insert(id, DragListeners { on_move, on_up });
            }
            (on_move, on_up) => {
                for listener in [on_move, on_up].into_iter().flatten() {
                    listener.remove();
                }
                tracing::warn!(listener = id.0, "failed to register drag listeners");
            }
        }
        id
    }

    fn unlisten_document_pointer(&self, id: ListenerId) {
        let Some(listeners) = self.drags.borrow_mut().remove(&id) else {
            return;
        };
        listeners.remove();
        // The pointerup callback may be running right now; keep it alive
        // until the next drag starts.
        self.retired.borrow_mut().push(listeners);
    }

    fn persist_settings(&self, json: &str) {
        if let Err(err) = self.persist.call1(&JsValue::NULL, &JsValue::from_str(json)) {
            tracing::warn!(error = ?err, "failed to persist minimap settings");
        }
    }
}
