//! Scene description produced by one minimap render pass.
//!
//! [`render_scene`] is a pure function of the canvas snapshot, the bounds model
//! and the settings. It returns a [`Scene`]: a flat tree of shape descriptors
//! in world coordinates plus the view box that maps them onto the surface.
//! Concrete surfaces (SVG markup, a 2D canvas context, test doubles) consume
//! the scene; none of them see the snapshot.
//!
//! Draw order is fixed: group rectangles, then node rectangles, then edge
//! paths, then the viewport indicator. The scene also carries the node-id
//! tagged rectangles used for hit-testing, so replacing the scene replaces
//! the hit-test geometry with it.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use crate::bounds::BoundsModel;
use crate::config::MinimapSettings;
use crate::error::MinimapError;
use crate::geometry::{BoundingBox, Vector2};
use crate::snapshot::{CanvasEdge, CanvasSnapshot, EdgeId, NodeId, Side};

/// Which layer a rectangle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Group containers, drawn underneath everything else.
    Group,
    /// Regular nodes, drawn above groups.
    Node,
}

/// A node or group rectangle, tagged with its source node id.
#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub node_id: NodeId,
    /// World-space extent.
    pub bbox: BoundingBox,
    pub fill: String,
    pub label: Option<String>,
    pub layer: Layer,
}

/// Direction an orthogonal link leaves its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOrientation {
    /// Leaves horizontally; control points share the x-midpoint.
    Horizontal,
    /// Leaves vertically; control points share the y-midpoint.
    Vertical,
}

/// A cubic link between two side midpoints, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath {
    pub edge_id: EdgeId,
    pub from: Vector2,
    pub to: Vector2,
    pub orientation: LinkOrientation,
}

impl EdgePath {
    /// The two Bézier control points of the link.
    #[must_use]
    pub fn control_points(&self) -> (Vector2, Vector2) {
        match self.orientation {
            LinkOrientation::Horizontal => {
                let mid_x = (self.from.x + self.to.x) / 2.0;
                (Vector2::new(mid_x, self.from.y), Vector2::new(mid_x, self.to.y))
            }
            LinkOrientation::Vertical => {
                let mid_y = (self.from.y + self.to.y) / 2.0;
                (Vector2::new(self.from.x, mid_y), Vector2::new(self.to.x, mid_y))
            }
        }
    }

    /// SVG path data (`M ... C ...`) for this link.
    #[must_use]
    pub fn to_path_data(&self) -> String {
        let (c1, c2) = self.control_points();
        format!(
            "M{},{}C{},{},{},{},{},{}",
            self.from.x, self.from.y, c1.x, c1.y, c2.x, c2.y, self.to.x, self.to.y
        )
    }
}

/// Everything a surface needs to draw one frame of the minimap.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    bounds: BoundsModel,
    pub background: String,
    pub font_color: String,
    /// Label size in world units (already divided by the scale).
    pub label_font_size: f64,
    pub edge_color: String,
    rects: Vec<RectShape>,
    edges: Vec<EdgePath>,
    viewport: Option<BoundingBox>,
}

impl Scene {
    #[must_use]
    pub fn bounds(&self) -> &BoundsModel {
        &self.bounds
    }

    #[must_use]
    pub fn view_box(&self) -> BoundingBox {
        self.bounds.view_box()
    }

    /// All rectangles in draw order: groups first, then nodes.
    #[must_use]
    pub fn rects(&self) -> &[RectShape] {
        &self.rects
    }

    pub fn groups(&self) -> impl Iterator<Item = &RectShape> {
        self.rects.iter().filter(|r| r.layer == Layer::Group)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RectShape> {
        self.rects.iter().filter(|r| r.layer == Layer::Node)
    }

    #[must_use]
    pub fn edges(&self) -> &[EdgePath] {
        &self.edges
    }

    /// Hit-test geometry for this frame. Never includes the viewport indicator.
    #[must_use]
    pub fn rendered_geometry(&self) -> &[RectShape] {
        &self.rects
    }

    /// World-space viewport indicator, `None` until the tracker fills it.
    #[must_use]
    pub fn viewport(&self) -> Option<BoundingBox> {
        self.viewport
    }

    /// Replace the viewport indicator. Returns `true` if it changed.
    pub fn set_viewport(&mut self, viewport: Option<BoundingBox>) -> bool {
        if self.viewport == viewport {
            return false;
        }
        self.viewport = viewport;
        true
    }
}

/// Builder for a [`Scene`].
///
/// Groups and nodes are kept apart so groups always end up beneath nodes no
/// matter the order they were added in.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    bounds: BoundsModel,
    background: String,
    font_color: String,
    label_font_size: f64,
    edge_color: String,
    groups: Vec<RectShape>,
    nodes: Vec<RectShape>,
    edges: Vec<EdgePath>,
}

impl SceneBuilder {
    #[must_use]
    pub fn new(bounds: BoundsModel) -> Self {
        Self {
            bounds,
            background: String::new(),
            font_color: String::new(),
            label_font_size: 0.0,
            edge_color: crate::consts::EDGE_COLOR.to_string(),
            groups: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn background(mut self, color: impl Into<String>) -> Self {
        self.background = color.into();
        self
    }

    /// Label color and on-screen size; the size is converted to world units.
    #[must_use]
    pub fn font(mut self, color: impl Into<String>, screen_size: f64) -> Self {
        self.font_color = color.into();
        self.label_font_size = self.bounds.label_font_size(screen_size);
        self
    }

    #[must_use]
    pub fn edge_color(mut self, color: impl Into<String>) -> Self {
        self.edge_color = color.into();
        self
    }

    #[must_use]
    pub fn group(mut self, node_id: impl Into<NodeId>, bbox: BoundingBox, fill: impl Into<String>, label: Option<String>) -> Self {
        self.groups.push(RectShape { node_id: node_id.into(), bbox, fill: fill.into(), label, layer: Layer::Group });
        self
    }

    #[must_use]
    pub fn node(mut self, node_id: impl Into<NodeId>, bbox: BoundingBox, fill: impl Into<String>, label: Option<String>) -> Self {
        self.nodes.push(RectShape { node_id: node_id.into(), bbox, fill: fill.into(), label, layer: Layer::Node });
        self
    }

    #[must_use]
    pub fn edge(mut self, path: EdgePath) -> Self {
        self.edges.push(path);
        self
    }

    #[must_use]
    pub fn build(self) -> Scene {
        let mut rects = self.groups;
        rects.extend(self.nodes);
        Scene {
            bounds: self.bounds,
            background: self.background,
            font_color: self.font_color,
            label_font_size: self.label_font_size,
            edge_color: self.edge_color,
            rects,
            edges: self.edges,
            viewport: None,
        }
    }
}

/// Route `edge` between its side midpoints.
///
/// Returns `Ok(None)` when either endpoint node is missing from the snapshot.
///
/// # Errors
///
/// Returns [`MinimapError::InvalidSide`] for an unrecognized side label.
pub fn route_edge(snapshot: &CanvasSnapshot, edge: &CanvasEdge) -> Result<Option<EdgePath>, MinimapError> {
    let from_side: Side = edge.from_side.parse()?;
    let to_side: Side = edge.to_side.parse()?;
    let (Some(from), Some(to)) = (snapshot.node(&edge.from_node), snapshot.node(&edge.to_node)) else {
        tracing::warn!(edge = %edge.id, from = %edge.from_node, to = %edge.to_node, "edge references missing node");
        return Ok(None);
    };
    let orientation = if from_side.is_horizontal() { LinkOrientation::Horizontal } else { LinkOrientation::Vertical };
    Ok(Some(EdgePath {
        edge_id: edge.id.clone(),
        from: from_side.midpoint(&from.bbox()),
        to: to_side.midpoint(&to.bbox()),
        orientation,
    }))
}

/// Build the complete scene for one frame.
///
/// # Errors
///
/// Returns [`MinimapError::InvalidSide`] if any edge declares an unknown side.
pub fn render_scene(snapshot: &CanvasSnapshot, bounds: &BoundsModel, settings: &MinimapSettings) -> Result<Scene, MinimapError> {
    let mut builder = SceneBuilder::new(*bounds)
        .background(settings.background_color.as_str())
        .font(settings.font_color.as_str(), settings.font_size);

    for group in snapshot.groups() {
        builder = builder.group(group.id.as_str(), group.bbox(), settings.group_color.as_str(), group.display_label().map(str::to_string));
    }
    for node in snapshot.regular_nodes() {
        builder = builder.node(node.id.as_str(), node.bbox(), settings.node_color.as_str(), node.display_label().map(str::to_string));
    }
    for edge in snapshot.edges.values() {
        if let Some(path) = route_edge(snapshot, edge)? {
            builder = builder.edge(path);
        }
    }

    let scene = builder.build();
    tracing::debug!(
        rects = scene.rects().len(),
        edges = scene.edges().len(),
        scale = scene.bounds().scale(),
        "minimap scene rendered"
    );
    Ok(scene)
}
