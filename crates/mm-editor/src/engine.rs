//! Editor engine: the active snapshot plus everything derived from it.
//!
//! The engine owns the current `Arc<MindMap>` and funnels every change
//! through the pure reducer. Around that it keeps:
//!
//! - **Layout**: memoized by topology fingerprint, so text edits and drags
//!   never trigger a relayout.
//! - **Interaction**: the gesture controller (viewport, selection, drag).
//! - **History**: snapshot undo/redo; drags and auto-align are one step each.
//!
//! A node is drawn at its stored position while it is placed (dragged or
//! auto-aligned since the tree last changed shape) and at its computed
//! layout slot otherwise. Nodes the layout hides (under a collapsed parent)
//! are not drawn at all.

use crate::commands::History;
use crate::config::EditorConfig;
use crate::input::{InputEvent, Modifiers};
use crate::interaction::{InteractionController, NodeHit};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::viewport::Viewport;
use kurbo::Size;
use mm_core::id::NodeId;
use mm_core::layout::{Layout, LayoutConfig, compute_layout, topology_fingerprint};
use mm_core::model::{Bounds, MindMap, NodeStyle, Point, Timestamp};
use mm_core::reducer::{Action, reduce};
use mm_render::{PaintContext, Scene, Theme, hit_test, paint_map};
use std::sync::Arc;

// ─── Layout cache ────────────────────────────────────────────────────────

/// Computed layout, reused until the tree's topology changes.
#[derive(Debug, Default)]
pub struct LayoutCache {
    fingerprint: Option<u64>,
    layout: Layout,
}

impl LayoutCache {
    pub fn get(&mut self, map: &MindMap, config: &LayoutConfig) -> &Layout {
        let fingerprint = topology_fingerprint(map);
        if self.fingerprint != Some(fingerprint) {
            self.layout = compute_layout(map, config);
            self.fingerprint = Some(fingerprint);
            log::debug!("relayout: {} positioned nodes", self.layout.len());
        }
        &self.layout
    }

    pub fn invalidate(&mut self) {
        self.fingerprint = None;
    }
}

/// Where each visible node is drawn.
///
/// A placed node's stored position wins over its layout slot, wherever it
/// was put.
pub fn display_positions(map: &MindMap, layout: &Layout) -> Layout {
    layout
        .iter()
        .map(|(&id, &slot)| {
            let at = match map.get(id) {
                Some(node) if node.placed => node.position(),
                _ => slot,
            };
            (id, at)
        })
        .collect()
}

/// Keyboard navigation target relative to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Parent,
    FirstChild,
    PreviousSibling,
    NextSibling,
}

// ─── Engine ──────────────────────────────────────────────────────────────

pub struct EditorEngine {
    config: EditorConfig,
    theme: Theme,
    map: Option<Arc<MindMap>>,
    layout: LayoutCache,
    controller: InteractionController,
    history: History,
    screen: Size,
    /// Node whose label is open in the host's text field.
    editing: Option<NodeId>,
}

impl EditorEngine {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            theme: Theme::default(),
            map: None,
            layout: LayoutCache::default(),
            controller: InteractionController::new(config.interaction),
            history: History::new(config.history_depth),
            screen: Size::new(800.0, 600.0),
            editing: None,
            config,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn map(&self) -> Option<&Arc<MindMap>> {
        self.map.as_ref()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn viewport(&self) -> &Viewport {
        self.controller.viewport()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.controller.selected()
    }

    pub fn editing(&self) -> Option<NodeId> {
        self.editing
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn screen_size(&self) -> Size {
        self.screen
    }

    pub fn set_screen_size(&mut self, size: Size) {
        self.screen = size;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Computed layout for the active map (empty without one).
    pub fn layout(&mut self) -> &Layout {
        match &self.map {
            Some(map) => self.layout.get(map, &self.config.layout),
            None => {
                self.layout.invalidate();
                self.layout.layout.clear();
                &self.layout.layout
            }
        }
    }

    /// World position every visible node is drawn at.
    pub fn positions(&mut self) -> Layout {
        match &self.map {
            Some(map) => display_positions(map, self.layout.get(map, &self.config.layout)),
            None => Layout::new(),
        }
    }

    /// The node drawn under a screen point.
    pub fn node_at(&mut self, screen: Point) -> Option<NodeHit> {
        let world = self.controller.viewport().screen_to_world(screen);
        let positions = self.positions();
        let map = self.map.as_ref()?;
        let id = hit_test(map, &positions, &self.config.metrics, world)?;
        Some(NodeHit {
            id,
            position: positions.get(&id).copied()?,
        })
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Make `map` the active map. History, gesture, and view start fresh;
    /// the root is selected.
    pub fn load(&mut self, map: MindMap) {
        let root = map.root_id;
        self.map = reduce(self.map.as_ref(), Action::Load(map), Timestamp::now());
        self.history.clear();
        self.layout.invalidate();
        self.editing = None;
        self.controller.reset_gesture();
        self.controller.select(Some(root));
        let screen = self.screen;
        self.controller.viewport_mut().reset(screen);
    }

    pub fn close(&mut self) {
        self.map = reduce(self.map.as_ref(), Action::Close, Timestamp::now());
        self.history.clear();
        self.editing = None;
        self.controller.reset_gesture();
        self.controller.select(None);
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply one action. Returns whether the map changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        self.dispatch_at(action, Timestamp::now())
    }

    pub fn dispatch_at(&mut self, action: Action, now: Timestamp) -> bool {
        let action = match action {
            Action::Load(map) => {
                self.load(map);
                return true;
            }
            Action::Close => {
                let had_map = self.map.is_some();
                self.close();
                return had_map;
            }
            other => other,
        };
        let Some(current) = self.map.clone() else {
            log::debug!("{} ignored: no active map", action.describe());
            return false;
        };
        let description = action.describe();
        match reduce(Some(&current), action, now) {
            Some(next) if !Arc::ptr_eq(&next, &current) => {
                self.history.record(&current, description);
                self.set_current(next);
                true
            }
            _ => false,
        }
    }

    fn set_current(&mut self, next: Arc<MindMap>) {
        if let Some(id) = self.controller.selected()
            && !next.contains(id)
        {
            self.controller.select(None);
        }
        if let Some(id) = self.editing
            && !next.contains(id)
        {
            self.editing = None;
        }
        self.map = Some(next);
    }

    pub fn set_title(&mut self, title: &str) -> bool {
        self.dispatch(Action::UpdateTitle(title.to_string()))
    }

    /// Add a child under the selection. The selection stays on the parent
    /// so repeated adds build a list of siblings.
    pub fn add_child_to_selected(&mut self) -> Option<NodeId> {
        let parent_id = self.controller.selected()?;
        let id = NodeId::fresh();
        self.dispatch(Action::AddNode {
            id,
            parent_id,
            text: None,
        })
        .then_some(id)
    }

    /// Delete the selected subtree and select its parent. The root is
    /// protected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.controller.selected() else {
            return false;
        };
        let Some(map) = &self.map else {
            return false;
        };
        if id == map.root_id {
            log::debug!("refusing to delete root {id}");
            return false;
        }
        let parent = map.parent_of(id);
        let changed = self.dispatch(Action::DeleteNode { id });
        if changed {
            self.controller.select(parent);
        }
        changed
    }

    pub fn toggle_collapse_selected(&mut self) -> bool {
        match self.controller.selected() {
            Some(id) => self.dispatch(Action::ToggleCollapse { id }),
            None => false,
        }
    }

    pub fn set_style(&mut self, id: NodeId, style: NodeStyle) -> bool {
        self.dispatch(Action::UpdateNode {
            id,
            text: None,
            style: Some(style),
        })
    }

    /// Open the selected node's label for editing.
    pub fn begin_edit(&mut self) -> Option<NodeId> {
        let id = self.controller.selected()?;
        self.editing = Some(id);
        Some(id)
    }

    pub fn commit_edit(&mut self, text: &str) -> bool {
        match self.editing.take() {
            Some(id) => self.dispatch(Action::set_text(id, text)),
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Write the computed layout back into stored positions as a single
    /// undo step.
    pub fn auto_align(&mut self) -> bool {
        let Some(map) = self.map.clone() else {
            return false;
        };
        let layout = self.layout.get(&map, &self.config.layout);
        let mut moves: Vec<(NodeId, Point)> = layout
            .iter()
            .filter(|(id, at)| map.get(**id).is_some_and(|n| !n.placed || n.position() != **at))
            .map(|(&id, &at)| (id, at))
            .collect();
        if moves.is_empty() {
            return false;
        }
        moves.sort_by_key(|(id, _)| *id);

        let now = Timestamp::now();
        self.history.begin_batch(&map, "auto-align");
        for (id, at) in moves {
            self.dispatch_at(Action::MoveNode { id, x: at.x, y: at.y }, now);
        }
        self.history.end_batch(self.map.as_ref());
        true
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let Some(current) = self.map.clone() else {
            return false;
        };
        if self.history.is_batching() {
            return false;
        }
        match self.history.undo(&current) {
            Some(entry) => {
                log::debug!("undo {}", entry.description);
                self.restore(entry.snapshot, &current);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let Some(current) = self.map.clone() else {
            return false;
        };
        if self.history.is_batching() {
            return false;
        }
        match self.history.redo(&current) {
            Some(entry) => {
                log::debug!("redo {}", entry.description);
                self.restore(entry.snapshot, &current);
                true
            }
            None => false,
        }
    }

    /// Reinstate a history snapshot, keeping `updated_at` moving forward.
    fn restore(&mut self, snapshot: Arc<MindMap>, current: &MindMap) {
        let mut map = Arc::unwrap_or_clone(snapshot);
        map.updated_at = Timestamp::now().after(current.updated_at);
        self.set_current(Arc::new(map));
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, id: Option<NodeId>) {
        let id = id.filter(|id| self.map.as_ref().is_some_and(|m| m.contains(*id)));
        self.controller.select(id);
    }

    /// Move the selection through the tree. With nothing selected, any
    /// direction selects the root.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let Some(map) = &self.map else {
            return false;
        };
        let Some(current) = self.controller.selected() else {
            self.controller.select(Some(map.root_id));
            return true;
        };
        let index = map.child_index();
        let target = match direction {
            Direction::Parent => map.parent_of(current),
            Direction::FirstChild => match map.get(current) {
                Some(node) if !node.is_collapsed => index.children(current).first().copied(),
                _ => None,
            },
            Direction::PreviousSibling | Direction::NextSibling => {
                map.parent_of(current).and_then(|parent| {
                    let siblings = index.children(parent);
                    let i = siblings.iter().position(|&s| s == current)?;
                    if direction == Direction::PreviousSibling {
                        i.checked_sub(1).map(|j| siblings[j])
                    } else {
                        siblings.get(i + 1).copied()
                    }
                })
            }
        };
        match target {
            Some(id) => {
                self.controller.select(Some(id));
                true
            }
            None => false,
        }
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_at_center(self.config.interaction.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_at_center(1.0 / self.config.interaction.zoom_step)
    }

    fn zoom_at_center(&mut self, factor: f64) -> bool {
        let center = Point::new(self.screen.width / 2.0, self.screen.height / 2.0);
        self.controller.zoom(factor, center)
    }

    /// Pan so the bounding box of all drawn nodes sits mid-screen.
    pub fn center_view(&mut self) -> bool {
        let positions = self.positions();
        let Some(bounds) = Bounds::of_points(positions.values().copied()) else {
            return false;
        };
        let screen = self.screen;
        self.controller.viewport_mut().center_on(bounds, screen);
        true
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route a pointer/touch/wheel event. Returns whether the map changed.
    ///
    /// A node drag is bracketed as one history batch.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let hit = event.press_position().and_then(|p| self.node_at(p));
        let was_dragging = self.controller.is_dragging_node();
        let actions = self.controller.handle(event, hit);
        let dragging = self.controller.is_dragging_node();

        if dragging
            && !was_dragging
            && let Some(map) = &self.map
        {
            self.history.begin_batch(map, "drag node");
        }
        let mut changed = false;
        for action in actions {
            changed |= self.dispatch(action);
        }
        if was_dragging && !dragging {
            self.history.end_batch(self.map.as_ref());
        }
        changed
    }

    /// Resolve and run a keyboard shortcut. Returns whether the key was
    /// bound. While a label is being edited the text field owns the keys.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        if self.editing.is_some() {
            return false;
        }
        match ShortcutMap::resolve(
            key,
            modifiers.ctrl,
            modifiers.shift,
            modifiers.alt,
            modifiers.meta,
        ) {
            Some(action) => {
                self.run(action);
                true
            }
            None => false,
        }
    }

    /// Run a shortcut action. Returns whether it had any effect.
    pub fn run(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::AddChild => self.add_child_to_selected().is_some(),
            ShortcutAction::DeleteSelected => self.delete_selected(),
            ShortcutAction::EditSelected => self.begin_edit().is_some(),
            ShortcutAction::ToggleCollapse => self.toggle_collapse_selected(),
            ShortcutAction::SelectParent => self.navigate(Direction::Parent),
            ShortcutAction::SelectFirstChild => self.navigate(Direction::FirstChild),
            ShortcutAction::SelectPreviousSibling => self.navigate(Direction::PreviousSibling),
            ShortcutAction::SelectNextSibling => self.navigate(Direction::NextSibling),
            ShortcutAction::Deselect => {
                let had = self.controller.selected().is_some();
                self.controller.select(None);
                had
            }
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::CenterView => self.center_view(),
            ShortcutAction::AutoAlign => self.auto_align(),
        }
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Paint the active map into `scene` under the current viewport.
    pub fn render(&mut self, scene: &mut Scene) {
        let positions = self.positions();
        let Some(map) = &self.map else {
            return;
        };
        let ctx = PaintContext {
            layout: &positions,
            metrics: &self.config.metrics,
            theme: &self.theme,
            view: self.controller.viewport().transform(),
            selected: self.controller.selected(),
        };
        paint_map(scene, map, &ctx);
    }
}
