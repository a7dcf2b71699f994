//! Emitter: `MindMap` → outline text.
//!
//! Output parses back through `parse_outline` to the same titles, texts,
//! and topology. Ids, positions, and styles are not part of the format.

use crate::id::NodeId;
use crate::model::{ChildIndex, MindMap};
use std::fmt::Write;

/// Emit the map as an indented outline.
#[must_use]
pub fn emit_outline(map: &MindMap) -> String {
    let mut out = String::with_capacity(64 * map.len());
    let _ = writeln!(out, "# {}", single_line(&map.title));

    if map.root().is_none() {
        return out;
    }

    let index = map.child_index();
    // Explicit stack keeps deep trees off the call stack.
    let mut pending: Vec<(NodeId, usize)> = vec![(map.root_id, 0)];
    let mut emitted = 0usize;
    while let Some((id, depth)) = pending.pop() {
        let Some(node) = map.get(id) else { continue };
        emitted += 1;
        if emitted > map.len() {
            log::warn!("emit_outline: cycle detected in map {}", map.id);
            break;
        }
        indent(&mut out, depth);
        let _ = writeln!(out, "- {}", single_line(&node.text));
        push_children(&index, id, depth + 1, &mut pending);
    }
    out
}

fn push_children(index: &ChildIndex, id: NodeId, depth: usize, pending: &mut Vec<(NodeId, usize)>) {
    pending.extend(index.children(id).iter().rev().map(|&c| (c, depth)));
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// Line breaks would split an item in two.
fn single_line(text: &str) -> String {
    text.split(['\n', '\r'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
