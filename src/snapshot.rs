//! Read-only snapshot of the host canvas: nodes, edges and the live viewport.
//!
//! The host owns the real canvas. Every render pass takes a fresh
//! [`CanvasSnapshot`] and never writes back into it. Node and edge maps are
//! ordered so that two renders of the same snapshot produce the same scene.
//!
//! Snapshots decode from the host's canvas document shape (`nodes` / `edges`
//! arrays with camelCase keys). Edge sides stay as the raw host strings and are
//! validated by the renderer through [`Side::from_str`].

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MinimapError;
use crate::geometry::{BoundingBox, Vector2};

/// Host-assigned node identifier.
pub type NodeId = String;

/// Host-assigned edge identifier.
pub type EdgeId = String;

/// The kind of a canvas node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Markdown text card.
    #[default]
    Text,
    /// Embedded vault file.
    File,
    /// Embedded web page.
    Link,
    /// Container that visually groups other nodes.
    Group,
    /// Any node type this version does not know about. Rendered as a regular node.
    #[serde(other)]
    Unknown,
}

/// A node as read from the host canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    /// Unique identifier within the canvas.
    pub id: NodeId,
    /// Node type discriminant.
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Left edge in world coordinates.
    pub x: f64,
    /// Top edge in world coordinates.
    pub y: f64,
    /// Width in world units.
    pub width: f64,
    /// Height in world units.
    pub height: f64,
    /// Explicit label (groups carry their title here).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Markdown body of a text node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Vault path of a file node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Target of a link node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CanvasNode {
    #[must_use]
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { id: id.into(), kind, x, y, width, height, label: None, text: None, file: None, url: None }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    /// World-space extent of the node.
    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_rect(self.x, self.y, self.width, self.height)
    }

    /// Text shown on the minimap for this node, if any.
    ///
    /// Prefers the explicit label, then the first non-empty line of a text
    /// node, then the file name of a file node, then the link target.
    #[must_use]
    pub fn display_label(&self) -> Option<&str> {
        if let Some(label) = self.label.as_deref().filter(|l| !l.trim().is_empty()) {
            return Some(label.trim());
        }
        match self.kind {
            NodeKind::Text => self
                .text
                .as_deref()
                .and_then(|t| t.lines().map(str::trim).find(|l| !l.is_empty()))
                .map(|l| l.trim_start_matches('#').trim_start()),
            NodeKind::File => self.file.as_deref().map(|f| f.rsplit('/').next().unwrap_or(f)),
            NodeKind::Link => self.url.as_deref(),
            NodeKind::Group | NodeKind::Unknown => None,
        }
    }
}

/// A directed connector between a side of one node and a side of another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasEdge {
    /// Unique identifier within the canvas.
    pub id: EdgeId,
    /// Source node id.
    pub from_node: NodeId,
    /// Exit side label on the source node, as reported by the host.
    pub from_side: String,
    /// Target node id.
    pub to_node: NodeId,
    /// Entry side label on the target node, as reported by the host.
    pub to_side: String,
}

impl CanvasEdge {
    #[must_use]
    pub fn new(
        id: impl Into<EdgeId>,
        from_node: impl Into<NodeId>,
        from_side: impl Into<String>,
        to_node: impl Into<NodeId>,
        to_side: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from_node: from_node.into(),
            from_side: from_side.into(),
            to_node: to_node.into(),
            to_side: to_side.into(),
        }
    }
}

/// The side of a node an edge leaves from or arrives at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Midpoint of this side of `node_box`: the center offset by half the
    /// width (left/right) or half the height (top/bottom).
    #[must_use]
    pub fn midpoint(self, node_box: &BoundingBox) -> Vector2 {
        let c = node_box.center();
        match self {
            Self::Left => Vector2::new(c.x - node_box.width() / 2.0, c.y),
            Self::Right => Vector2::new(c.x + node_box.width() / 2.0, c.y),
            Self::Top => Vector2::new(c.x, c.y - node_box.height() / 2.0),
            Self::Bottom => Vector2::new(c.x, c.y + node_box.height() / 2.0),
        }
    }

    /// Whether an edge leaving this side runs horizontally first.
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

impl FromStr for Side {
    type Err = MinimapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(MinimapError::InvalidSide { side: other.to_string() }),
        }
    }
}

/// Everything the minimap reads from the host canvas for one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasSnapshot {
    pub nodes: BTreeMap<NodeId, CanvasNode>,
    pub edges: BTreeMap<EdgeId, CanvasEdge>,
    /// World-space region visible in the host's main view.
    pub viewport: BoundingBox,
}

/// Wire shape of a host canvas document.
#[derive(Debug, Default, Deserialize)]
struct CanvasDocument {
    #[serde(default)]
    nodes: Vec<CanvasNode>,
    #[serde(default)]
    edges: Vec<CanvasEdge>,
}

impl CanvasSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from node and edge lists. Later duplicates replace earlier ones.
    #[must_use]
    pub fn from_parts(nodes: Vec<CanvasNode>, edges: Vec<CanvasEdge>, viewport: BoundingBox) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            edges: edges.into_iter().map(|e| (e.id.clone(), e)).collect(),
            viewport,
        }
    }

    /// Decode a host canvas document (`{"nodes": [...], "edges": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns [`MinimapError::Snapshot`] when the JSON is malformed or a node
    /// lacks its geometry.
    pub fn from_canvas_json(json: &str, viewport: BoundingBox) -> Result<Self, MinimapError> {
        let doc: CanvasDocument = serde_json::from_str(json)?;
        Ok(Self::from_parts(doc.nodes, doc.edges, viewport))
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&CanvasNode> {
        self.nodes.get(id)
    }

    /// Group nodes in id order.
    pub fn groups(&self) -> impl Iterator<Item = &CanvasNode> {
        self.nodes.values().filter(|n| n.is_group())
    }

    /// Non-group nodes in id order.
    pub fn regular_nodes(&self) -> impl Iterator<Item = &CanvasNode> {
        self.nodes.values().filter(|n| !n.is_group())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
