//! Mind map → Vello drawing commands.
//!
//! Edges go down first, then node boxes in pre-order so children paint over
//! their parents. Everything is drawn in world space under the caller's
//! view transform.

use crate::connector::{connector, visible_edges};
use crate::hit::NodeMetrics;
use kurbo::{Affine, Rect, RoundedRect, Stroke};
use mm_core::id::NodeId;
use mm_core::layout::Layout;
use mm_core::model::{Color as HexColor, MindMap, Node, NodeStyle};
use peniko::{Color, Fill};
use vello::Scene;

/// Colors used when a node carries no style of its own.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub node_fill: Color,
    pub node_border: Color,
    pub selected_border: Color,
    pub edge: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            node_fill: Color::from_rgba8(30, 41, 59, 204),
            node_border: Color::from_rgb8(51, 65, 85),
            selected_border: Color::from_rgb8(6, 182, 212),
            edge: Color::from_rgba8(6, 182, 212, 153),
        }
    }
}

/// Everything `paint_map` needs besides the map itself.
pub struct PaintContext<'a> {
    pub layout: &'a Layout,
    pub metrics: &'a NodeMetrics,
    pub theme: &'a Theme,
    /// World → screen transform.
    pub view: Affine,
    pub selected: Option<NodeId>,
}

/// Nodes with a position, parents before children, siblings in order.
pub fn draw_order(map: &MindMap, layout: &Layout) -> Vec<NodeId> {
    let index = map.child_index();
    let mut order = Vec::with_capacity(layout.len());
    let mut pending = vec![map.root_id];
    while let Some(id) = pending.pop() {
        if !layout.contains_key(&id) || order.len() >= layout.len() {
            continue;
        }
        order.push(id);
        pending.extend(index.children(id).iter().rev().copied());
    }
    order
}

/// Paint the map into `scene`.
///
/// Call once per frame with a freshly-cleared `Scene`.
pub fn paint_map(scene: &mut Scene, map: &MindMap, ctx: &PaintContext<'_>) {
    let edge_stroke = Stroke::new(2.0);
    for (_, from, to) in visible_edges(map, ctx.layout) {
        scene.stroke(&edge_stroke, ctx.view, ctx.theme.edge, None, &connector(from, to));
    }

    for id in draw_order(map, ctx.layout) {
        if let (Some(node), Some(&at)) = (map.get(id), ctx.layout.get(&id)) {
            paint_node(scene, node, ctx.metrics.node_box(at), ctx, ctx.selected == Some(id));
        }
    }
}

fn paint_node(
    scene: &mut Scene,
    node: &Node,
    bounds: mm_core::model::Bounds,
    ctx: &PaintContext<'_>,
    selected: bool,
) {
    let rect = Rect::new(bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y);
    let shape = RoundedRect::from_rect(rect, ctx.metrics.corner_radius);
    let style = node.style.as_ref();

    let fill = style_color(style, |s| &s.background_color).unwrap_or(ctx.theme.node_fill);
    scene.fill(Fill::NonZero, ctx.view, fill, None, &shape);

    let (border, width) = if selected {
        (ctx.theme.selected_border, 3.0)
    } else {
        (
            style_color(style, |s| &s.border_color).unwrap_or(ctx.theme.node_border),
            1.0,
        )
    };
    scene.stroke(&Stroke::new(width), ctx.view, border, None, &shape);

    // Glyph shaping needs a font context; the host draws labels for now.
    log::trace!(
        "NODE {} {:?} at ({}, {})",
        node.id,
        node.text,
        bounds.min_x,
        bounds.min_y
    );
}

fn style_color(
    style: Option<&NodeStyle>,
    field: impl Fn(&NodeStyle) -> &Option<String>,
) -> Option<Color> {
    let hex = field(style?).as_deref()?;
    let c = HexColor::from_hex(hex)?;
    Some(Color::new([c.r, c.g, c.b, c.a]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_core::layout::{LayoutConfig, compute_layout};
    use mm_core::model::Timestamp;
    use mm_core::reducer::{Action, reduce};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn two_level_map() -> Arc<MindMap> {
        let map = Arc::new(MindMap::new("paint", Timestamp(0)));
        let root = map.root_id;
        let a = NodeId::intern("pt_a");
        let steps = [
            Action::AddNode { id: a, parent_id: root, text: None },
            Action::AddNode { id: NodeId::intern("pt_a1"), parent_id: a, text: None },
            Action::AddNode { id: NodeId::intern("pt_b"), parent_id: root, text: None },
        ];
        steps
            .into_iter()
            .fold(map, |m, act| reduce(Some(&m), act, Timestamp(1)).unwrap())
    }

    #[test]
    fn draw_order_is_preorder() {
        let map = two_level_map();
        let layout = compute_layout(&map, &LayoutConfig::default());
        let names: Vec<String> = draw_order(&map, &layout)
            .iter()
            .skip(1)
            .map(|id| id.as_str().to_string())
            .collect();
        assert_eq!(names, vec!["pt_a", "pt_a1", "pt_b"]);
    }

    #[test]
    fn paint_emits_commands() {
        let map = two_level_map();
        let layout = compute_layout(&map, &LayoutConfig::default());
        let mut scene = Scene::new();
        let ctx = PaintContext {
            layout: &layout,
            metrics: &NodeMetrics::default(),
            theme: &Theme::default(),
            view: Affine::IDENTITY,
            selected: Some(map.root_id),
        };
        paint_map(&mut scene, &map, &ctx);
        assert!(!scene.encoding().is_empty());
    }

    #[test]
    fn style_colors_override_theme() {
        let style = NodeStyle::root_default();
        let fill = style_color(Some(&style), |s| &s.background_color).unwrap();
        assert_eq!(fill.components, [59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0, 1.0]);
        assert!(style_color(Some(&style), |s| &s.border_color).is_none());
        assert!(style_color(None, |s| &s.text_color).is_none());
    }
}
