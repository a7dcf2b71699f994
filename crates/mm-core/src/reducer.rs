//! Mutation protocol: `(snapshot, action) → snapshot`.
//!
//! The reducer never edits its input. A successful action produces a new
//! `Arc<MindMap>` that shares every untouched node with the previous one; a
//! rejected action hands back the very same `Arc`, so callers can detect
//! "nothing happened" with `Arc::ptr_eq`.

use crate::id::NodeId;
use crate::model::{DEFAULT_NODE_TEXT, MindMap, Node, NodeStyle, Timestamp};
use std::sync::Arc;

/// Every state transition the tree model supports.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the whole snapshot.
    Load(MindMap),
    /// Drop the active map.
    Close,
    UpdateTitle(String),
    AddNode {
        id: NodeId,
        parent_id: NodeId,
        text: Option<String>,
    },
    UpdateNode {
        id: NodeId,
        text: Option<String>,
        style: Option<NodeStyle>,
    },
    /// Remove a node together with all of its descendants.
    DeleteNode { id: NodeId },
    MoveNode { id: NodeId, x: f64, y: f64 },
    ToggleCollapse { id: NodeId },
}

impl Action {
    /// `AddNode` under `parent_id` with a freshly minted id.
    pub fn add_child(parent_id: NodeId, text: Option<String>) -> Self {
        Action::AddNode {
            id: NodeId::fresh(),
            parent_id,
            text,
        }
    }

    pub fn set_text(id: NodeId, text: impl Into<String>) -> Self {
        Action::UpdateNode {
            id,
            text: Some(text.into()),
            style: None,
        }
    }

    /// Short label for logs and undo entries.
    pub fn describe(&self) -> &'static str {
        match self {
            Action::Load(_) => "load map",
            Action::Close => "close map",
            Action::UpdateTitle(_) => "rename map",
            Action::AddNode { .. } => "add node",
            Action::UpdateNode { .. } => "edit node",
            Action::DeleteNode { .. } => "delete node",
            Action::MoveNode { .. } => "move node",
            Action::ToggleCollapse { .. } => "toggle collapse",
        }
    }
}

/// Apply `action` to `state`, stamping successful mutations with `now`.
#[must_use]
pub fn reduce(state: Option<&Arc<MindMap>>, action: Action, now: Timestamp) -> Option<Arc<MindMap>> {
    let current = match action {
        Action::Load(map) => return Some(Arc::new(map)),
        Action::Close => return None,
        _ => match state {
            Some(map) => map,
            None => {
                log::debug!("{} ignored: no active map", action.describe());
                return None;
            }
        },
    };

    let label = action.describe();
    match apply(current, action) {
        Some(mut next) => {
            next.updated_at = now.after(current.updated_at);
            Some(Arc::new(next))
        }
        None => {
            log::debug!("{label} rejected on map {}", current.id);
            Some(Arc::clone(current))
        }
    }
}

/// Build the next snapshot, or `None` when the action does not apply.
///
/// Adding, deleting or collapsing changes the tree's shape, so every
/// placed node goes back to its layout slot.
fn apply(current: &MindMap, action: Action) -> Option<MindMap> {
    match action {
        // `reduce` answers these before a current snapshot exists.
        Action::Load(_) | Action::Close => unreachable!("lifecycle actions are handled by reduce"),

        Action::UpdateTitle(title) => {
            let mut next = current.clone();
            next.title = title;
            Some(next)
        }

        Action::AddNode {
            id,
            parent_id,
            text,
        } => {
            if !current.contains(parent_id) || current.contains(id) {
                return None;
            }
            let mut node = Node::new(
                id,
                Some(parent_id),
                text.unwrap_or_else(|| DEFAULT_NODE_TEXT.to_string()),
            );
            node.order = current.next_order;

            let mut next = current.clone();
            next.next_order += 1;
            next.nodes.insert(id, Arc::new(node));
            next.release_placements();
            Some(next)
        }

        Action::UpdateNode { id, text, style } => {
            let mut next = current.clone();
            let node = Arc::make_mut(next.nodes.get_mut(&id)?);
            if let Some(text) = text {
                node.text = text;
            }
            if let Some(style) = style {
                node.style = Some(style);
            }
            Some(next)
        }

        Action::DeleteNode { id } => {
            if id == current.root_id || !current.contains(id) {
                return None;
            }
            let doomed = current.subtree_ids(id);
            let mut next = current.clone();
            next.nodes.retain(|node_id, _| !doomed.contains(node_id));
            next.release_placements();
            Some(next)
        }

        Action::MoveNode { id, x, y } => {
            let mut next = current.clone();
            let node = Arc::make_mut(next.nodes.get_mut(&id)?);
            node.x = x;
            node.y = y;
            node.placed = true;
            Some(next)
        }

        Action::ToggleCollapse { id } => {
            let mut next = current.clone();
            let node = Arc::make_mut(next.nodes.get_mut(&id)?);
            node.is_collapsed = !node.is_collapsed;
            next.release_placements();
            Some(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fresh_map() -> Arc<MindMap> {
        Arc::new(MindMap::new("Test", Timestamp(100)))
    }

    fn add(state: &Arc<MindMap>, id: &str, parent: NodeId) -> Arc<MindMap> {
        let action = Action::AddNode {
            id: NodeId::intern(id),
            parent_id: parent,
            text: None,
        };
        reduce(Some(state), action, Timestamp(200)).unwrap()
    }

    #[test]
    fn load_and_close() {
        let map = MindMap::new("x", Timestamp(0));
        let loaded = reduce(None, Action::Load(map.clone()), Timestamp(1)).unwrap();
        assert_eq!(*loaded, map);
        assert!(reduce(Some(&loaded), Action::Close, Timestamp(2)).is_none());
    }

    #[test]
    fn actions_without_map_stay_closed() {
        let out = reduce(None, Action::UpdateTitle("t".into()), Timestamp(1));
        assert!(out.is_none());
    }

    #[test]
    fn add_node_defaults() {
        let state = fresh_map();
        let root = state.root_id;
        let next = add(&state, "r_child", root);

        let child = next.get(NodeId::intern("r_child")).unwrap();
        assert_eq!(child.text, DEFAULT_NODE_TEXT);
        assert_eq!(child.parent_id, Some(root));
        assert_eq!(child.position(), crate::model::Point::ORIGIN);
        assert_eq!(child.order, 1);
        assert_eq!(next.next_order, 2);
        assert_eq!(next.updated_at, Timestamp(200));
        // The input snapshot is untouched.
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn add_node_with_missing_parent_is_rejected() {
        let state = fresh_map();
        let next = add(&state, "r_orphan", NodeId::intern("r_nobody"));
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn add_node_with_duplicate_id_is_rejected() {
        let state = fresh_map();
        let root = state.root_id;
        let once = add(&state, "r_dup", root);
        let twice = add(&once, "r_dup", root);
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn untouched_nodes_are_shared() {
        let state = fresh_map();
        let root = state.root_id;
        let next = add(&state, "r_shared", root);
        assert!(Arc::ptr_eq(&state.nodes[&root], &next.nodes[&root]));
    }

    #[test]
    fn update_node_keeps_other_fields() {
        let state = fresh_map();
        let root = state.root_id;
        let next = reduce(Some(&state), Action::set_text(root, "Big idea"), Timestamp(300)).unwrap();
        let node = next.get(root).unwrap();
        assert_eq!(node.text, "Big idea");
        assert_eq!(node.style, state.get(root).unwrap().style);
    }

    #[test]
    fn update_missing_node_is_noop() {
        let state = fresh_map();
        let next = reduce(
            Some(&state),
            Action::set_text(NodeId::intern("r_ghost"), "boo"),
            Timestamp(300),
        )
        .unwrap();
        assert!(Arc::ptr_eq(&state, &next));
        assert_eq!(next.updated_at, Timestamp(100));
    }

    #[test]
    fn cascading_delete() {
        let state = fresh_map();
        let root = state.root_id;
        let a = NodeId::intern("cd_a");
        let s = add(&state, "cd_a", root);
        let s = add(&s, "cd_a1", a);
        let s = add(&s, "cd_a2", a);
        let s = add(&s, "cd_a1x", NodeId::intern("cd_a1"));
        let s = add(&s, "cd_b", root);

        let next = reduce(Some(&s), Action::DeleteNode { id: a }, Timestamp(400)).unwrap();
        assert_eq!(next.len(), 2);
        assert!(next.contains(root));
        assert!(next.contains(NodeId::intern("cd_b")));
        assert!(next.validate().is_ok());
    }

    #[test]
    fn root_cannot_be_deleted() {
        let state = fresh_map();
        let next = reduce(
            Some(&state),
            Action::DeleteNode { id: state.root_id },
            Timestamp(400),
        )
        .unwrap();
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn delete_is_idempotent() {
        let state = fresh_map();
        let root = state.root_id;
        let s = add(&state, "id_a", root);
        let action = Action::DeleteNode {
            id: NodeId::intern("id_a"),
        };
        let once = reduce(Some(&s), action.clone(), Timestamp(500)).unwrap();
        let twice = reduce(Some(&once), action, Timestamp(600)).unwrap();
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn move_and_collapse() {
        let state = fresh_map();
        let root = state.root_id;
        let moved = reduce(
            Some(&state),
            Action::MoveNode {
                id: root,
                x: 10.0,
                y: -20.0,
            },
            Timestamp(1),
        )
        .unwrap();
        assert_eq!(moved.get(root).unwrap().position(), crate::model::Point::new(10.0, -20.0));
        // Clock went backwards; updated_at still advances.
        assert_eq!(moved.updated_at, Timestamp(101));

        let folded = reduce(Some(&moved), Action::ToggleCollapse { id: root }, Timestamp(2)).unwrap();
        assert!(folded.get(root).unwrap().is_collapsed);
    }

    #[test]
    fn move_places_node_even_at_origin() {
        let state = fresh_map();
        let s = add(&state, "mo_a", state.root_id);
        let a = NodeId::intern("mo_a");
        let moved = reduce(Some(&s), Action::MoveNode { id: a, x: 0.0, y: 0.0 }, Timestamp(300)).unwrap();
        assert!(!Arc::ptr_eq(&s, &moved));
        let node = moved.get(a).unwrap();
        assert!(node.placed);
        assert_eq!(node.position(), crate::model::Point::ORIGIN);
    }

    #[test]
    fn shape_changes_release_placements() {
        let state = fresh_map();
        let root = state.root_id;
        let a = NodeId::intern("rp_a");
        let s = add(&state, "rp_a", root);
        let s = reduce(Some(&s), Action::MoveNode { id: a, x: 250.0, y: -40.0 }, Timestamp(300)).unwrap();
        assert!(s.get(a).unwrap().placed);

        let grown = add(&s, "rp_b", root);
        let a_after = grown.get(a).unwrap();
        assert!(!a_after.placed);
        // The coordinates stay; only the override is dropped.
        assert_eq!(a_after.position(), crate::model::Point::new(250.0, -40.0));

        let s = reduce(Some(&grown), Action::MoveNode { id: a, x: 1.0, y: 1.0 }, Timestamp(400)).unwrap();
        let pruned = reduce(Some(&s), Action::DeleteNode { id: NodeId::intern("rp_b") }, Timestamp(500)).unwrap();
        assert!(!pruned.get(a).unwrap().placed);

        let s = reduce(Some(&pruned), Action::MoveNode { id: a, x: 1.0, y: 1.0 }, Timestamp(600)).unwrap();
        let folded = reduce(Some(&s), Action::ToggleCollapse { id: root }, Timestamp(700)).unwrap();
        assert!(!folded.get(a).unwrap().placed);
    }

    #[test]
    fn text_edits_keep_placements() {
        let state = fresh_map();
        let a = NodeId::intern("tk_a");
        let s = add(&state, "tk_a", state.root_id);
        let s = reduce(Some(&s), Action::MoveNode { id: a, x: 5.0, y: 5.0 }, Timestamp(300)).unwrap();
        let s = reduce(Some(&s), Action::set_text(a, "renamed"), Timestamp(400)).unwrap();
        assert!(s.get(a).unwrap().placed);
    }

    #[test]
    fn same_action_on_equal_inputs_gives_equal_outputs() {
        let state = fresh_map();
        let twin = Arc::new((*state).clone());
        let action = Action::AddNode {
            id: NodeId::intern("pure_a"),
            parent_id: state.root_id,
            text: Some("x".into()),
        };
        let left = reduce(Some(&state), action.clone(), Timestamp(7)).unwrap();
        let right = reduce(Some(&twin), action, Timestamp(7)).unwrap();
        assert_eq!(*left, *right);
        assert_eq!(*state, *twin);
    }
}
