//! Core tree data model for mind maps.
//!
//! A map is a rooted tree stored as a flat `id → node` table with parent
//! pointers. Nodes sit behind `Arc` so that successive snapshots produced
//! by the reducer share every node they did not touch. Child lists are not
//! stored; `ChildIndex` derives them on demand in sibling order.

use crate::id::{MapId, NodeId};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Text given to the root of a freshly created map.
pub const ROOT_TEXT: &str = "Central Idea";

/// Text given to nodes added without explicit text.
pub const DEFAULT_NODE_TEXT: &str = "New Node";

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let channels: SmallVec<[u8; 4]> = match bytes.len() {
            3 | 4 => bytes
                .iter()
                .map(|&c| hex_val(c).map(|v| v * 17))
                .collect::<Option<_>>()?,
            6 | 8 => bytes
                .chunks(2)
                .map(|pair| Some(hex_val(pair[0])? << 4 | hex_val(pair[1])?))
                .collect::<Option<_>>()?,
            _ => return None,
        };

        let alpha = channels.get(3).copied().unwrap_or(255);
        Some(Self::rgba(
            channels[0] as f32 / 255.0,
            channels[1] as f32 / 255.0,
            channels[2] as f32 / 255.0,
            alpha as f32 / 255.0,
        ))
    }
}

// ─── Style ───────────────────────────────────────────────────────────────

/// Visual hints attached to a node. Never interpreted by layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Free-form size hint, e.g. `"text-lg"` or `"18px"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
}

impl NodeStyle {
    /// The style a brand-new root node starts with.
    pub fn root_default() -> Self {
        Self {
            background_color: Some("#3b82f6".into()),
            text_color: Some("#ffffff".into()),
            border_color: None,
            font_size: Some("text-xl".into()),
        }
    }
}

// ─── Time ────────────────────────────────────────────────────────────────

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Timestamp(millis)
    }

    /// The later of `self` and one tick past `previous`.
    /// Used so every mutation strictly advances `updated_at`.
    pub fn after(self, previous: Timestamp) -> Timestamp {
        Timestamp(self.0.max(previous.0 + 1))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// A 2-D point. World or screen space depending on context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty input.
    pub fn of_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(iter.fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// One labeled node of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub text: String,
    /// Stored world position. Free-form drags and auto-align both write here.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Whether `x`/`y` override the computed layout slot. Set by a move,
    /// cleared again whenever the tree's shape changes.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub placed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_collapsed: bool,
    /// Sibling display order. Lower sorts first; ties break on id.
    #[serde(default)]
    pub order: u64,
}

impl Node {
    pub fn new(id: NodeId, parent_id: Option<NodeId>, text: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            text: text.into(),
            x: 0.0,
            y: 0.0,
            placed: false,
            style: None,
            is_collapsed: false,
            order: 0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn sort_key(&self) -> (u64, NodeId) {
        (self.order, self.id)
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────────

/// Index-list entry describing one stored map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMetadata {
    pub id: MapId,
    pub title: String,
    pub updated_at: Timestamp,
}

/// One complete version of a map's tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
    pub id: MapId,
    pub title: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub root_id: NodeId,
    pub nodes: HashMap<NodeId, Arc<Node>>,
    /// Next value handed out as a sibling `order`.
    #[serde(default)]
    pub next_order: u64,
}

/// Structural problems found by [`MindMap::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("root node {0} is missing")]
    MissingRoot(NodeId),

    #[error("root node {0} has a parent")]
    RootHasParent(NodeId),

    #[error("node {0} has no parent but is not the root")]
    MultipleRoots(NodeId),

    #[error("node {node} references missing parent {parent}")]
    DanglingParent { node: NodeId, parent: NodeId },

    #[error("node stored under key {key} has id {id}")]
    IdMismatch { key: NodeId, id: NodeId },

    #[error("cycle through node {0}")]
    Cycle(NodeId),
}

impl MindMap {
    /// Create a map holding a single root node.
    pub fn new(title: impl Into<String>, now: Timestamp) -> Self {
        let root_id = NodeId::fresh();
        let mut root = Node::new(root_id, None, ROOT_TEXT);
        root.style = Some(NodeStyle::root_default());

        let mut nodes = HashMap::new();
        nodes.insert(root_id, Arc::new(root));

        Self {
            id: MapId::fresh(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            root_id,
            nodes,
            next_order: 1,
        }
    }

    pub fn metadata(&self) -> MapMetadata {
        MapMetadata {
            id: self.id.clone(),
            title: self.title.clone(),
            updated_at: self.updated_at,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).map(Arc::as_ref)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn root(&self) -> Option<&Node> {
        self.get(self.root_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent_id)
    }

    /// Hand every placed node back to the layout engine.
    ///
    /// Only nodes that were placed are copied; the rest stay shared.
    pub fn release_placements(&mut self) {
        for node in self.nodes.values_mut() {
            if node.placed {
                Arc::make_mut(node).placed = false;
            }
        }
    }

    /// Build the parent → children index in sibling order.
    pub fn child_index(&self) -> ChildIndex {
        ChildIndex::build(self)
    }

    /// Every node in the subtree rooted at `id`, including `id` itself.
    ///
    /// Rescans the whole node table until no new descendant turns up, so it
    /// stays correct without relying on any child index.
    pub fn subtree_ids(&self, id: NodeId) -> HashSet<NodeId> {
        let mut collected = HashSet::new();
        if !self.contains(id) {
            return collected;
        }
        collected.insert(id);
        loop {
            let before = collected.len();
            for node in self.nodes.values() {
                if let Some(parent) = node.parent_id
                    && collected.contains(&parent)
                {
                    collected.insert(node.id);
                }
            }
            if collected.len() == before {
                return collected;
            }
        }
    }

    /// Check whether `ancestor` lies on the parent chain of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let mut current = self.parent_of(descendant);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Check every tree-shape invariant.
    pub fn validate(&self) -> Result<(), ModelError> {
        let root = self
            .root()
            .ok_or(ModelError::MissingRoot(self.root_id))?;
        if root.parent_id.is_some() {
            return Err(ModelError::RootHasParent(self.root_id));
        }

        let mut graph: DiGraphMap<NodeId, ()> = DiGraphMap::with_capacity(self.nodes.len(), self.nodes.len());
        let mut keys: Vec<&NodeId> = self.nodes.keys().collect();
        keys.sort();
        for &key in &keys {
            let node = &self.nodes[key];
            if node.id != *key {
                return Err(ModelError::IdMismatch { key: *key, id: node.id });
            }
            graph.add_node(node.id);
            match node.parent_id {
                None if node.id != self.root_id => {
                    return Err(ModelError::MultipleRoots(node.id));
                }
                None => {}
                Some(parent) if !self.nodes.contains_key(&parent) => {
                    return Err(ModelError::DanglingParent {
                        node: node.id,
                        parent,
                    });
                }
                Some(parent) => {
                    graph.add_edge(parent, node.id, ());
                }
            }
        }

        toposort(&graph, None)
            .map(|_| ())
            .map_err(|cycle| ModelError::Cycle(cycle.node_id()))
    }
}

// ─── Child index ─────────────────────────────────────────────────────────

/// Parent → ordered children lookup, rebuilt from the flat node table.
///
/// Rebuilding costs one pass over the nodes plus a sort per sibling group,
/// which is fine at interactive sizes.
#[derive(Debug, Clone, Default)]
pub struct ChildIndex {
    children: HashMap<NodeId, SmallVec<[NodeId; 4]>>,
}

impl ChildIndex {
    pub fn build(map: &MindMap) -> Self {
        let mut grouped: HashMap<NodeId, SmallVec<[&Node; 4]>> = HashMap::new();
        for node in map.nodes.values() {
            if let Some(parent) = node.parent_id {
                grouped.entry(parent).or_default().push(node);
            }
        }

        let children = grouped
            .into_iter()
            .map(|(parent, mut kids)| {
                kids.sort_by_key(|n| n.sort_key());
                (parent, kids.iter().map(|n| n.id).collect())
            })
            .collect();

        Self { children }
    }

    /// Children of `id` in display order (empty for leaves and unknown ids).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(|c| c.as_slice()).unwrap_or(&[])
    }
}
