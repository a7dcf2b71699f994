//! Integration tests: reducer → layout → verify positions.
//!
//! Exercises the `mm-core` pipeline the way an editor drives it: build a
//! map through actions, lay it out, check the geometry.

use mm_core::id::NodeId;
use mm_core::layout::{LayoutConfig, compute_layout};
use mm_core::model::{MindMap, Point, Timestamp};
use mm_core::reducer::{Action, reduce};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const CONFIG: LayoutConfig = LayoutConfig {
    level_width: 250.0,
    node_height: 80.0,
};

fn apply(map: Arc<MindMap>, action: Action) -> Arc<MindMap> {
    reduce(Some(&map), action, Timestamp::now()).expect("map stays open")
}

fn add(map: Arc<MindMap>, id: &str, parent: NodeId) -> Arc<MindMap> {
    apply(
        map,
        Action::AddNode {
            id: NodeId::intern(id),
            parent_id: parent,
            text: Some(id.to_string()),
        },
    )
}

/// root → A{A1, A2, A3}, B, C{C1}
fn sample() -> Arc<MindMap> {
    let map = Arc::new(MindMap::new("Sample", Timestamp(0)));
    let root = map.root_id;
    let map = add(map, "lp_a", root);
    let map = add(map, "lp_b", root);
    let map = add(map, "lp_c", root);
    let a = NodeId::intern("lp_a");
    let map = add(map, "lp_a1", a);
    let map = add(map, "lp_a2", a);
    let map = add(map, "lp_a3", a);
    add(map, "lp_c1", NodeId::intern("lp_c"))
}

// ─── End-to-end example ─────────────────────────────────────────────────

#[test]
fn create_add_twice_then_delete_first() {
    let map = Arc::new(MindMap::new("Test", Timestamp::now()));
    let root = map.root_id;
    assert_eq!(map.root().unwrap().text, "Central Idea");
    assert_eq!(compute_layout(&map, &CONFIG)[&root], Point::ORIGIN);

    let first = Action::add_child(root, None);
    let second = Action::add_child(root, None);
    let (first_id, second_id) = match (&first, &second) {
        (Action::AddNode { id: a, .. }, Action::AddNode { id: b, .. }) => (*a, *b),
        _ => unreachable!(),
    };
    let map = apply(apply(map, first), second);

    let layout = compute_layout(&map, &CONFIG);
    assert_eq!(layout[&root], Point::ORIGIN);
    assert_eq!(layout[&first_id], Point::new(250.0, -40.0));
    assert_eq!(layout[&second_id], Point::new(250.0, 40.0));
    assert_eq!(layout[&second_id].y - layout[&first_id].y, CONFIG.node_height);

    let map = apply(map, Action::DeleteNode { id: first_id });
    assert_eq!(map.len(), 2);
    let layout = compute_layout(&map, &CONFIG);
    assert_eq!(layout[&root], Point::ORIGIN);
    assert_eq!(layout[&second_id], Point::new(250.0, 0.0));
    assert!(!layout.contains_key(&first_id));
}

// ─── Ordering and bands ─────────────────────────────────────────────────

#[test]
fn siblings_follow_creation_order() {
    let map = sample();
    let layout = compute_layout(&map, &CONFIG);
    let ys: Vec<f64> = ["lp_a", "lp_b", "lp_c"]
        .iter()
        .map(|id| layout[&NodeId::intern(id)].y)
        .collect();
    assert!(ys[0] < ys[1] && ys[1] < ys[2], "got {ys:?}");
}

#[test]
fn child_bands_match_subtree_heights() {
    let map = sample();
    let layout = compute_layout(&map, &CONFIG);
    // Heights: A = 3 leaves, B = 1, C = 1 → total 5 * 80 = 400, start -200.
    // A band [-200, 40) → mid -80; B band [40, 120) → 80; C band [120, 200) → 160.
    assert_eq!(layout[&NodeId::intern("lp_a")].y, -80.0);
    assert_eq!(layout[&NodeId::intern("lp_b")].y, 80.0);
    assert_eq!(layout[&NodeId::intern("lp_c")].y, 160.0);
    assert_eq!(layout[&NodeId::intern("lp_c1")].y, 160.0);

    let a_kids: Vec<f64> = ["lp_a1", "lp_a2", "lp_a3"]
        .iter()
        .map(|id| layout[&NodeId::intern(id)].y)
        .collect();
    assert_eq!(a_kids, vec![-160.0, -80.0, 0.0]);
}

#[test]
fn depth_sets_x() {
    let map = sample();
    let layout = compute_layout(&map, &CONFIG);
    assert_eq!(layout[&map.root_id].x, 0.0);
    assert_eq!(layout[&NodeId::intern("lp_b")].x, 250.0);
    assert_eq!(layout[&NodeId::intern("lp_c1")].x, 500.0);
}

// ─── Determinism and centering ──────────────────────────────────────────

#[test]
fn layout_is_deterministic() {
    let map = sample();
    assert_eq!(compute_layout(&map, &CONFIG), compute_layout(&map, &CONFIG));

    // A structurally equal copy built from JSON lays out the same.
    let json = serde_json::to_string(&*map).unwrap();
    let copy: MindMap = serde_json::from_str(&json).unwrap();
    assert_eq!(compute_layout(&copy, &CONFIG), compute_layout(&map, &CONFIG));
}

#[test]
fn root_is_vertically_centered() {
    let mut map = Arc::new(MindMap::new("Deep", Timestamp(0)));
    let mut parent = map.root_id;
    for i in 0..6 {
        let id = format!("deep_{i}");
        map = add(map, &id, parent);
        map = add(map, &format!("deep_side_{i}"), parent);
        parent = NodeId::intern(&id);
    }
    let layout = compute_layout(&map, &CONFIG);
    assert_eq!(layout[&map.root_id].y, 0.0);
    assert_eq!(layout.len(), map.len());
}
