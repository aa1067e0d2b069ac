#![allow(clippy::float_cmp)]

use super::*;

fn node(id: &str, kind: NodeKind) -> CanvasNode {
    CanvasNode::new(id, kind, 0.0, 0.0, 100.0, 50.0)
}

// =============================================================
// NodeKind / CanvasNode
// =============================================================

#[test]
fn node_kind_default_is_text() {
    assert_eq!(NodeKind::default(), NodeKind::Text);
}

#[test]
fn only_group_kind_is_group() {
    assert!(node("g", NodeKind::Group).is_group());
    for kind in [NodeKind::Text, NodeKind::File, NodeKind::Link, NodeKind::Unknown] {
        assert!(!node("n", kind).is_group(), "{kind:?} should not be a group");
    }
}

#[test]
fn node_bbox_spans_extent() {
    let n = CanvasNode::new("n", NodeKind::Text, 10.0, 20.0, 30.0, 40.0);
    assert_eq!(n.bbox(), BoundingBox::new(10.0, 20.0, 40.0, 60.0));
}

#[test]
fn explicit_label_wins() {
    let mut n = node("n", NodeKind::Text).with_label("  Title  ");
    n.text = Some("body".into());
    assert_eq!(n.display_label(), Some("Title"));
}

#[test]
fn blank_label_falls_back_to_text() {
    let mut n = node("n", NodeKind::Text).with_label("   ");
    n.text = Some("\n\n# Heading\nmore".into());
    assert_eq!(n.display_label(), Some("Heading"));
}

#[test]
fn file_label_is_file_name() {
    let mut n = node("n", NodeKind::File);
    n.file = Some("folder/sub/Note.md".into());
    assert_eq!(n.display_label(), Some("Note.md"));
}

#[test]
fn link_label_is_url() {
    let mut n = node("n", NodeKind::Link);
    n.url = Some("https://example.com".into());
    assert_eq!(n.display_label(), Some("https://example.com"));
}

#[test]
fn unlabeled_group_has_no_label() {
    assert_eq!(node("g", NodeKind::Group).display_label(), None);
}

// =============================================================
// Side
// =============================================================

#[test]
fn side_parses_known_labels() {
    assert_eq!("left".parse::<Side>().expect("left"), Side::Left);
    assert_eq!("right".parse::<Side>().expect("right"), Side::Right);
    assert_eq!("top".parse::<Side>().expect("top"), Side::Top);
    assert_eq!("bottom".parse::<Side>().expect("bottom"), Side::Bottom);
}

#[test]
fn side_rejects_unknown_label() {
    let err = "middle".parse::<Side>().expect_err("middle is not a side");
    assert!(matches!(err, MinimapError::InvalidSide { ref side } if side == "middle"));
}

#[test]
fn side_parse_is_case_sensitive() {
    assert!("Left".parse::<Side>().is_err());
}

#[test]
fn side_midpoints_offset_from_center() {
    let b = BoundingBox::from_rect(0.0, 0.0, 100.0, 40.0);
    assert_eq!(Side::Left.midpoint(&b), Vector2::new(0.0, 20.0));
    assert_eq!(Side::Right.midpoint(&b), Vector2::new(100.0, 20.0));
    assert_eq!(Side::Top.midpoint(&b), Vector2::new(50.0, 0.0));
    assert_eq!(Side::Bottom.midpoint(&b), Vector2::new(50.0, 40.0));
}

#[test]
fn side_midpoint_is_idempotent() {
    let b = BoundingBox::from_rect(13.5, -7.25, 91.0, 33.0);
    for side in [Side::Left, Side::Right, Side::Top, Side::Bottom] {
        assert_eq!(side.midpoint(&b), side.midpoint(&b));
    }
}

#[test]
fn side_orientation() {
    assert!(Side::Left.is_horizontal());
    assert!(Side::Right.is_horizontal());
    assert!(!Side::Top.is_horizontal());
    assert!(!Side::Bottom.is_horizontal());
}

// =============================================================
// CanvasSnapshot
// =============================================================

#[test]
fn from_parts_keys_by_id() {
    let snap = CanvasSnapshot::from_parts(
        vec![node("b", NodeKind::Text), node("a", NodeKind::Group)],
        vec![CanvasEdge::new("e1", "a", "right", "b", "left")],
        BoundingBox::EMPTY,
    );
    assert_eq!(snap.nodes.len(), 2);
    assert_eq!(snap.edges.len(), 1);
    assert!(snap.node("a").is_some());
    assert!(snap.node("zzz").is_none());
}

#[test]
fn groups_and_regular_nodes_partition() {
    let snap = CanvasSnapshot::from_parts(
        vec![node("g1", NodeKind::Group), node("n1", NodeKind::Text), node("n2", NodeKind::File)],
        vec![],
        BoundingBox::EMPTY,
    );
    let groups: Vec<_> = snap.groups().map(|n| n.id.as_str()).collect();
    let regular: Vec<_> = snap.regular_nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(groups, vec!["g1"]);
    assert_eq!(regular, vec!["n1", "n2"]);
}

#[test]
fn empty_snapshot() {
    assert!(CanvasSnapshot::new().is_empty());
}

#[test]
fn decodes_host_canvas_document() {
    let json = r#"{
        "nodes": [
            {"id": "g1", "type": "group", "x": 0, "y": 0, "width": 200, "height": 200, "label": "Ideas"},
            {"id": "n1", "type": "text", "x": 50, "y": 50, "width": 20, "height": 20, "text": "hello", "color": "1"},
            {"id": "n2", "type": "whiteboard", "x": 300, "y": 0, "width": 10, "height": 10}
        ],
        "edges": [
            {"id": "e1", "fromNode": "n1", "fromSide": "right", "toNode": "n2", "toSide": "left", "label": "x"}
        ]
    }"#;
    let viewport = BoundingBox::new(0.0, 0.0, 800.0, 600.0);
    let snap = CanvasSnapshot::from_canvas_json(json, viewport).expect("decode");

    assert_eq!(snap.nodes.len(), 3);
    assert!(snap.node("g1").expect("g1").is_group());
    assert_eq!(snap.node("g1").expect("g1").display_label(), Some("Ideas"));
    assert_eq!(snap.node("n1").expect("n1").display_label(), Some("hello"));
    assert_eq!(snap.node("n2").expect("n2").kind, NodeKind::Unknown);
    let edge = snap.edges.get("e1").expect("e1");
    assert_eq!(edge.from_node, "n1");
    assert_eq!(edge.to_side, "left");
    assert_eq!(snap.viewport, viewport);
}

#[test]
fn decodes_document_without_edges() {
    let snap = CanvasSnapshot::from_canvas_json(r#"{"nodes": []}"#, BoundingBox::EMPTY).expect("decode");
    assert!(snap.is_empty());
    assert!(snap.edges.is_empty());
}

#[test]
fn rejects_node_without_geometry() {
    let err = CanvasSnapshot::from_canvas_json(r#"{"nodes": [{"id": "n"}]}"#, BoundingBox::EMPTY)
        .expect_err("missing x/y must fail");
    assert!(matches!(err, MinimapError::Snapshot(_)));
}
