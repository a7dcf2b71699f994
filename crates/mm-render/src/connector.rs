//! Parent → child connector curves.
//!
//! Each connector is one cubic whose control points both sit on the
//! horizontal midpoint between the endpoints, giving the S-shaped elbow of
//! a right-angle tree.

use kurbo::BezPath;
use mm_core::id::NodeId;
use mm_core::layout::Layout;
use mm_core::model::{MindMap, Point};

/// Cubic from `from` to `to` with both control points at the mid-x.
pub fn connector(from: Point, to: Point) -> BezPath {
    let mid_x = from.x + (to.x - from.x) / 2.0;
    let mut path = BezPath::new();
    path.move_to((from.x, from.y));
    path.curve_to((mid_x, from.y), (mid_x, to.y), (to.x, to.y));
    path
}

/// Every parent/child pair where both ends have a position.
pub fn visible_edges(map: &MindMap, layout: &Layout) -> Vec<(NodeId, Point, Point)> {
    let mut edges: Vec<(NodeId, Point, Point)> = map
        .nodes
        .values()
        .filter_map(|node| {
            let parent = node.parent_id?;
            let start = *layout.get(&parent)?;
            let end = *layout.get(&node.id)?;
            Some((node.id, start, end))
        })
        .collect();
    edges.sort_by_key(|(id, ..)| *id);
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;
    use mm_core::layout::{LayoutConfig, compute_layout};
    use mm_core::model::Timestamp;
    use mm_core::reducer::{Action, reduce};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn control_points_at_horizontal_midpoint() {
        let path = connector(Point::new(0.0, 0.0), Point::new(250.0, -40.0));
        let els: Vec<PathEl> = path.elements().to_vec();
        assert_eq!(els.len(), 2);
        match els[1] {
            PathEl::CurveTo(c1, c2, end) => {
                assert_eq!((c1.x, c1.y), (125.0, 0.0));
                assert_eq!((c2.x, c2.y), (125.0, -40.0));
                assert_eq!((end.x, end.y), (250.0, -40.0));
            }
            other => panic!("expected CurveTo, got {other:?}"),
        }
    }

    #[test]
    fn edges_skip_unpositioned_nodes() {
        let map = Arc::new(mm_core::model::MindMap::new("e", Timestamp(0)));
        let root = map.root_id;
        let a = NodeId::intern("ce_a");
        let map = reduce(
            Some(&map),
            Action::AddNode { id: a, parent_id: root, text: None },
            Timestamp(1),
        )
        .unwrap();
        let map = reduce(
            Some(&map),
            Action::AddNode { id: NodeId::intern("ce_a1"), parent_id: a, text: None },
            Timestamp(2),
        )
        .unwrap();
        let map = reduce(Some(&map), Action::ToggleCollapse { id: a }, Timestamp(3)).unwrap();

        let layout = compute_layout(&map, &LayoutConfig::default());
        let edges = visible_edges(&map, &layout);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].0, a);
    }
}
