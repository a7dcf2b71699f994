//! Hit testing: world point → node lookup.
//!
//! Walks the draw order back to front so the node painted last (topmost)
//! wins when boxes overlap.

use mm_core::id::NodeId;
use mm_core::layout::Layout;
use mm_core::model::{Bounds, MindMap, Point};
use serde::{Deserialize, Serialize};

/// Size of the box drawn for each node, in world units.
///
/// A node's position is the middle of its left edge: the box spans
/// `[x, x + width]` horizontally and is centered on `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            width: 150.0,
            height: 48.0,
            corner_radius: 16.0,
        }
    }
}

impl NodeMetrics {
    pub fn node_box(&self, at: Point) -> Bounds {
        Bounds {
            min_x: at.x,
            min_y: at.y - self.height / 2.0,
            max_x: at.x + self.width,
            max_y: at.y + self.height / 2.0,
        }
    }
}

/// Find the topmost node whose box contains `world`.
/// Returns `None` on empty canvas.
pub fn hit_test(
    map: &MindMap,
    layout: &Layout,
    metrics: &NodeMetrics,
    world: Point,
) -> Option<NodeId> {
    crate::paint::draw_order(map, layout)
        .into_iter()
        .rev()
        .find(|id| {
            layout
                .get(id)
                .is_some_and(|&at| metrics.node_box(at).contains(world))
        })
}
