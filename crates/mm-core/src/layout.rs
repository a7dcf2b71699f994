//! Right-angle tree layout.
//!
//! Places the root at the origin and every descendant one `level_width`
//! further right per depth. Vertically each node owns a band as tall as its
//! subtree (leaves count one `node_height`, parents only the sum of their
//! children) and sits at the middle of that band.

use crate::id::NodeId;
use crate::model::{ChildIndex, MindMap, Point};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// Spacing constants for the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between consecutive depths.
    pub level_width: f64,
    /// Vertical space taken by one leaf.
    pub node_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            level_width: 250.0,
            node_height: 80.0,
        }
    }
}

/// Computed world position for every visible node.
pub type Layout = HashMap<NodeId, Point>;

/// Lay out the whole map.
///
/// Returns an empty layout when the root is missing. Children of collapsed
/// nodes get no position.
pub fn compute_layout(map: &MindMap, config: &LayoutConfig) -> Layout {
    let mut result = Layout::with_capacity(map.len());
    if !map.contains(map.root_id) {
        return result;
    }

    let mut pass = LayoutPass {
        map,
        config,
        index: map.child_index(),
        heights: HashMap::with_capacity(map.len()),
        on_path: HashSet::new(),
    };

    let total = pass.subtree_height(map.root_id);
    pass.place(map.root_id, 0, -total / 2.0, &mut result);
    result
}

struct LayoutPass<'a> {
    map: &'a MindMap,
    config: &'a LayoutConfig,
    index: ChildIndex,
    /// Memoized subtree heights for this pass.
    heights: HashMap<NodeId, f64>,
    /// Nodes on the current recursion path; guards against parent cycles.
    on_path: HashSet<NodeId>,
}

impl LayoutPass<'_> {
    /// Children that take part in layout: none below a collapsed node.
    fn visible_children(&self, id: NodeId) -> Vec<NodeId> {
        match self.map.get(id) {
            Some(node) if !node.is_collapsed => self
                .index
                .children(id)
                .iter()
                .copied()
                .filter(|c| !self.on_path.contains(c))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn subtree_height(&mut self, id: NodeId) -> f64 {
        if let Some(&h) = self.heights.get(&id) {
            return h;
        }

        self.on_path.insert(id);
        let children = self.visible_children(id);
        let height = if children.is_empty() {
            self.config.node_height
        } else {
            children.iter().map(|&c| self.subtree_height(c)).sum()
        };
        self.on_path.remove(&id);

        self.heights.insert(id, height);
        height
    }

    fn place(&mut self, id: NodeId, depth: usize, y_start: f64, out: &mut Layout) {
        if out.contains_key(&id) {
            return;
        }
        let height = self.subtree_height(id);
        out.insert(
            id,
            Point::new(depth as f64 * self.config.level_width, y_start + height / 2.0),
        );

        self.on_path.insert(id);
        let mut cursor = y_start;
        for child in self.visible_children(id) {
            let child_height = self.subtree_height(child);
            self.place(child, depth + 1, cursor, out);
            cursor += child_height;
        }
        self.on_path.remove(&id);
    }
}

/// Hash of everything layout depends on.
///
/// Text edits and stored-position moves leave it unchanged, so callers can
/// skip relayout when the fingerprint matches.
pub fn topology_fingerprint(map: &MindMap) -> u64 {
    let mut entries: Vec<(&str, Option<&str>, u64, bool)> = map
        .nodes
        .values()
        .map(|n| {
            (
                n.id.as_str(),
                n.parent_id.as_ref().map(|p| p.as_str()),
                n.order,
                n.is_collapsed,
            )
        })
        .collect();
    entries.sort_unstable();

    let mut hasher = DefaultHasher::new();
    map.root_id.as_str().hash(&mut hasher);
    entries.len().hash(&mut hasher);
    entries.hash(&mut hasher);
    hasher.finish()
}
