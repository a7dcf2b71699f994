//! Parser for the plain-text outline format → `MindMap`.
//!
//! ```text
//! # Trip planning
//! - Central Idea
//!   - Packing
//!     - Passport
//!   - Route
//! ```
//!
//! An optional `# title` line comes first. Each item is `- text`, indented
//! two spaces per level. The first top-level item becomes the root; any
//! later top-level items are attached to the root as children. Blank lines
//! and further `#` lines are skipped.

use crate::id::NodeId;
use crate::model::{MindMap, Node, Timestamp};
use std::sync::Arc;
use winnow::ascii::{space0, till_line_ending};
use winnow::combinator::preceded;
use winnow::prelude::*;
use winnow::token::take_while;

/// Title used when the outline has no `# title` line.
pub const UNTITLED: &str = "Untitled";

const INDENT_WIDTH: usize = 2;

/// Parse an outline document into a new map.
#[must_use = "parsing result should be used"]
pub fn parse_outline(input: &str) -> Result<MindMap, String> {
    let mut title: Option<String> = None;
    let mut map: Option<MindMap> = None;
    // stack[d] = most recent item at text depth d
    let mut stack: Vec<NodeId> = Vec::new();

    for (line_no, raw) in input.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('#') {
            if title.is_none() && map.is_none() {
                let t = parse_title
                    .parse(trimmed)
                    .map_err(|e| format!("line {line_no}: title parse error: {e}"))?;
                title = Some(t.to_string());
            }
            continue;
        }

        let (indent, text) = parse_item
            .parse(raw.trim_end())
            .map_err(|e| format!("line {line_no}: expected `- text` item: {e}"))?;
        if indent % INDENT_WIDTH != 0 {
            return Err(format!(
                "line {line_no}: indentation must be a multiple of {INDENT_WIDTH} spaces"
            ));
        }
        let depth = indent / INDENT_WIDTH;

        let Some(map) = map.as_mut() else {
            if depth != 0 {
                return Err(format!("line {line_no}: first item must not be indented"));
            }
            let mut fresh = MindMap::new(
                title.clone().unwrap_or_else(|| UNTITLED.to_string()),
                Timestamp::now(),
            );
            let root_id = fresh.root_id;
            if let Some(root) = fresh.nodes.get_mut(&root_id) {
                Arc::make_mut(root).text = text.to_string();
            }
            stack.push(root_id);
            map = Some(fresh);
            continue;
        };

        if depth > stack.len() {
            return Err(format!(
                "line {line_no}: item is indented more than one level below its parent"
            ));
        }
        let parent = if depth == 0 {
            map.root_id
        } else {
            stack[depth - 1]
        };

        let mut node = Node::new(NodeId::fresh(), Some(parent), text);
        node.order = map.next_order;
        map.next_order += 1;
        let id = node.id;
        map.nodes.insert(id, Arc::new(node));

        stack.truncate(depth);
        stack.push(id);
    }

    map.ok_or_else(|| "outline contains no items".to_string())
}

fn parse_title<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    preceded(('#', space0), till_line_ending)
        .map(str::trim)
        .parse_next(input)
}

fn parse_item<'a>(input: &mut &'a str) -> ModalResult<(usize, &'a str)> {
    let indent = take_while(0.., ' ').map(|s: &str| s.len()).parse_next(input)?;
    let text = preceded(('-', space0), till_line_ending).parse_next(input)?;
    Ok((indent, text.trim_end()))
}
