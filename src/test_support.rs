//! In-memory fakes of the host collaborators, shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use crate::config::OverlayPlacement;
use crate::error::MinimapError;
use crate::geometry::BoundingBox;
use crate::host::{HostCanvas, ListenerId, MinimapSurface, OverlayHost};
use crate::intercept::{BehaviorTable, HostMethod};
use crate::scene::Scene;
use crate::snapshot::{CanvasNode, CanvasSnapshot, NodeKind};

/// A navigation call the fake canvas received.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCall {
    PanTo(f64, f64),
    ZoomTo(BoundingBox),
}

/// Host canvas double with a real [`BehaviorTable`].
///
/// Each table method records its name when called. `pan_to`/`zoom_to_bbox`
/// update the viewport and then call `markViewportChanged` through the table,
/// the way the real host does.
pub struct FakeCanvas {
    pub snapshot: RefCell<CanvasSnapshot>,
    pub viewport: Cell<BoundingBox>,
    pub table: Option<Rc<BehaviorTable>>,
    pub calls: RefCell<Vec<HostCall>>,
    pub method_log: Rc<RefCell<Vec<String>>>,
    pub snapshots_taken: Cell<usize>,
    pub viewport_reads: Cell<usize>,
}

impl FakeCanvas {
    pub fn new(snapshot: CanvasSnapshot) -> Rc<Self> {
        let method_log = Rc::new(RefCell::new(Vec::new()));
        let table = Rc::new(BehaviorTable::new());
        for method in HostMethod::ALL {
            let log = Rc::clone(&method_log);
            let name = method.name();
            table.define(name, move |_args: &Value| log.borrow_mut().push(name.to_string()));
        }
        Rc::new(Self::build(snapshot, Some(table), method_log))
    }

    /// A canvas whose internals are not reachable.
    pub fn without_table(snapshot: CanvasSnapshot) -> Rc<Self> {
        Rc::new(Self::build(snapshot, None, Rc::new(RefCell::new(Vec::new()))))
    }

    fn build(snapshot: CanvasSnapshot, table: Option<Rc<BehaviorTable>>, method_log: Rc<RefCell<Vec<String>>>) -> Self {
        let viewport = snapshot.viewport;
        Self {
            snapshot: RefCell::new(snapshot),
            viewport: Cell::new(viewport),
            table,
            calls: RefCell::new(Vec::new()),
            method_log,
            snapshots_taken: Cell::new(0),
            viewport_reads: Cell::new(0),
        }
    }

    /// The behavior table. Panics if the canvas was built without one.
    pub fn table(&self) -> &Rc<BehaviorTable> {
        self.table.as_ref().expect("fake canvas has a behavior table")
    }

    /// Call a host method the way the host's own code would.
    pub fn fire(&self, method: HostMethod) {
        if let Some(table) = &self.table {
            table.invoke(method.name(), &Value::Null);
        }
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }
}

impl HostCanvas for FakeCanvas {
    fn snapshot(&self) -> CanvasSnapshot {
        self.snapshots_taken.set(self.snapshots_taken.get() + 1);
        let mut snap = self.snapshot.borrow().clone();
        snap.viewport = self.viewport.get();
        snap
    }

    fn viewport_bbox(&self) -> BoundingBox {
        self.viewport_reads.set(self.viewport_reads.get() + 1);
        self.viewport.get()
    }

    fn pan_to(&self, x: f64, y: f64) {
        self.calls.borrow_mut().push(HostCall::PanTo(x, y));
        let vp = self.viewport.get();
        let (hw, hh) = (vp.width() / 2.0, vp.height() / 2.0);
        self.viewport.set(BoundingBox::new(x - hw, y - hh, x + hw, y + hh));
        self.fire(HostMethod::MarkViewportChanged);
    }

    fn zoom_to_bbox(&self, bbox: BoundingBox) {
        self.calls.borrow_mut().push(HostCall::ZoomTo(bbox));
        self.viewport.set(bbox);
        self.fire(HostMethod::MarkViewportChanged);
    }

    fn behavior_table(&self) -> Option<Rc<BehaviorTable>> {
        self.table.clone()
    }
}

/// Everything a [`RecordingSurface`] was asked to do.
#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub scene_draws: usize,
    pub viewport_draws: usize,
    pub last_scene: Option<Scene>,
    pub placements: Vec<OverlayPlacement>,
    pub detached: bool,
}

/// Surface double that records draw calls into a shared log.
pub struct RecordingSurface {
    pub log: Rc<RefCell<SurfaceLog>>,
}

impl MinimapSurface for RecordingSurface {
    fn draw_scene(&mut self, scene: &Scene) -> Result<(), MinimapError> {
        let mut log = self.log.borrow_mut();
        log.scene_draws += 1;
        log.last_scene = Some(scene.clone());
        Ok(())
    }

    fn draw_viewport(&mut self, scene: &Scene) -> Result<(), MinimapError> {
        let mut log = self.log.borrow_mut();
        log.viewport_draws += 1;
        log.last_scene = Some(scene.clone());
        Ok(())
    }

    fn set_placement(&mut self, placement: &OverlayPlacement) -> Result<(), MinimapError> {
        self.log.borrow_mut().placements.push(*placement);
        Ok(())
    }

    fn detach(&mut self) {
        self.log.borrow_mut().detached = true;
    }
}

/// Overlay host double.
pub struct FakeOverlayHost {
    pub canvas: RefCell<Option<Rc<FakeCanvas>>>,
    pub container: Cell<(f64, f64)>,
    pub surfaces: RefCell<Vec<Rc<RefCell<SurfaceLog>>>>,
    pub listeners: RefCell<Vec<ListenerId>>,
    pub persisted: RefCell<Vec<String>>,
    pub fail_mount: Cell<bool>,
    next_listener: Cell<u64>,
}

impl FakeOverlayHost {
    pub fn new(canvas: Option<Rc<FakeCanvas>>) -> Rc<Self> {
        Rc::new(Self {
            canvas: RefCell::new(canvas),
            container: Cell::new((1200.0, 800.0)),
            surfaces: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            persisted: RefCell::new(Vec::new()),
            fail_mount: Cell::new(false),
            next_listener: Cell::new(1),
        })
    }

    /// Surfaces mounted and not yet detached.
    pub fn mounted_count(&self) -> usize {
        self.surfaces.borrow().iter().filter(|s| !s.borrow().detached).count()
    }

    /// Log of the most recently mounted surface.
    pub fn current_surface(&self) -> Rc<RefCell<SurfaceLog>> {
        Rc::clone(self.surfaces.borrow().last().expect("a surface was mounted"))
    }

    pub fn live_listeners(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl OverlayHost for FakeOverlayHost {
    fn active_canvas(&self) -> Option<Rc<dyn HostCanvas>> {
        self.canvas.borrow().as_ref().map(|c| Rc::clone(c) as Rc<dyn HostCanvas>)
    }

    fn container_size(&self) -> (f64, f64) {
        self.container.get()
    }

    fn mount_surface(&self, placement: &OverlayPlacement) -> Result<Box<dyn MinimapSurface>, MinimapError> {
        if self.fail_mount.get() {
            return Err(MinimapError::Surface("mount refused".into()));
        }
        let log = Rc::new(RefCell::new(SurfaceLog { placements: vec![*placement], ..SurfaceLog::default() }));
        self.surfaces.borrow_mut().push(Rc::clone(&log));
        Ok(Box::new(RecordingSurface { log }))
    }

    fn listen_document_pointer(&self) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push(id);
        id
    }

    fn unlisten_document_pointer(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|l| *l != id);
    }

    fn persist_settings(&self, json: &str) {
        self.persisted.borrow_mut().push(json.to_string());
    }
}

/// Group g1 at (0,0,200,200) containing n1 at (50,50,20,20).
pub fn group_with_node() -> CanvasSnapshot {
    CanvasSnapshot::from_parts(
        vec![
            CanvasNode::new("g1", NodeKind::Group, 0.0, 0.0, 200.0, 200.0),
            CanvasNode::new("n1", NodeKind::Text, 50.0, 50.0, 20.0, 20.0),
        ],
        vec![],
        BoundingBox::new(0.0, 0.0, 100.0, 80.0),
    )
}

/// Route `tracing` output through the test harness so warnings from a
/// failing test show up in its captured output.
pub fn init_tracing() {
    // Fails once a subscriber is installed, which is fine.
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init();
}
