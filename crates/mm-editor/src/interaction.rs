//! Gesture state machine for the canvas.
//!
//! Turns normalized input events into viewport changes and `MoveNode`
//! actions. Exactly one gesture is active at a time: the modes live in a
//! single `Gesture` enum, so "panning while dragging" cannot be expressed.
//!
//! | Event | Idle | Panning | DraggingNode | Pinching |
//! |-------|------|---------|--------------|----------|
//! | down on node | → Dragging | → Dragging | → Dragging | ignored |
//! | down on background | → Panning | → Panning | → Panning | ignored |
//! | move | — | pan | move node | — |
//! | two touches | → Pinching | → Pinching | → Pinching | zoom |
//! | up / touch end / cancel | — | → Idle | → Idle | → Idle |

use crate::config::InteractionConfig;
use crate::input::InputEvent;
use crate::viewport::Viewport;
use mm_core::id::NodeId;
use mm_core::model::Point;
use mm_core::reducer::Action;

/// The gesture in progress, with its anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    /// Background drag. `last` is the previous pointer position (screen).
    Panning { last: Point },
    /// Node drag. `position` is the node's current world position.
    DraggingNode {
        id: NodeId,
        last: Point,
        position: Point,
    },
    /// Two-finger zoom. `last_distance` is in screen pixels.
    Pinching { last_distance: f64 },
}

/// What the pointer landed on when a gesture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeHit {
    pub id: NodeId,
    /// World position the node is currently drawn at.
    pub position: Point,
}

pub struct InteractionController {
    config: InteractionConfig,
    viewport: Viewport,
    gesture: Gesture,
    selected: Option<NodeId>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            viewport: Viewport::default(),
            gesture: Gesture::Idle,
            selected: None,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    pub fn is_dragging_node(&self) -> bool {
        matches!(self.gesture, Gesture::DraggingNode { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.gesture, Gesture::Pinching { .. })
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<NodeId>) {
        self.selected = id;
    }

    /// Drop any gesture in progress and its anchors.
    pub fn reset_gesture(&mut self) {
        if self.gesture != Gesture::Idle {
            log::debug!("gesture {:?} → Idle", self.gesture);
        }
        self.gesture = Gesture::Idle;
    }

    /// Zoom around a screen point, honoring the configured scale range.
    pub fn zoom(&mut self, factor: f64, anchor: Point) -> bool {
        let (min_scale, max_scale) = self.config.scale_range();
        self.viewport.zoom_by(factor, anchor, min_scale, max_scale)
    }

    /// Feed one event through the state machine.
    ///
    /// `hit` is the node under the press position, if any. It is only
    /// consulted by events that start a gesture.
    pub fn handle(&mut self, event: &InputEvent, hit: Option<NodeHit>) -> Vec<Action> {
        match event {
            InputEvent::PointerDown { x, y, .. } => {
                self.press(Point::new(*x, *y), hit);
                vec![]
            }
            InputEvent::PointerMove { x, y, .. } => self.move_to(Point::new(*x, *y)),
            InputEvent::PointerUp { .. } | InputEvent::TouchEnd { .. } | InputEvent::Cancel => {
                self.reset_gesture();
                vec![]
            }
            InputEvent::TouchStart { touches } => {
                match touches.as_slice() {
                    [] => {}
                    [only] => self.press(*only, hit),
                    [a, b, ..] => {
                        log::debug!("gesture {:?} → Pinching", self.gesture);
                        self.gesture = Gesture::Pinching {
                            last_distance: a.distance(*b),
                        };
                    }
                }
                vec![]
            }
            InputEvent::TouchMove { touches } => match (self.gesture, touches.as_slice()) {
                (Gesture::Pinching { last_distance }, [a, b, ..]) => {
                    self.pinch(*a, *b, last_distance);
                    vec![]
                }
                (Gesture::Pinching { .. }, _) => {
                    self.reset_gesture();
                    vec![]
                }
                (_, [first, ..]) => self.move_to(*first),
                (_, []) => vec![],
            },
            InputEvent::Wheel {
                dx,
                dy,
                x,
                y,
                modifiers,
            } => {
                // ⌘/Ctrl zooms; otherwise the content scrolls against the delta.
                if modifiers.command() {
                    let factor = (-dy * self.config.wheel_zoom_sensitivity).exp();
                    self.zoom(factor, Point::new(*x, *y));
                } else {
                    self.viewport.pan_by(-dx, -dy);
                }
                vec![]
            }
        }
    }

    fn press(&mut self, at: Point, hit: Option<NodeHit>) {
        if self.is_pinching() {
            return;
        }
        self.gesture = match hit {
            Some(hit) => {
                self.selected = Some(hit.id);
                Gesture::DraggingNode {
                    id: hit.id,
                    last: at,
                    position: hit.position,
                }
            }
            None => {
                self.selected = None;
                Gesture::Panning { last: at }
            }
        };
        log::debug!("gesture → {:?}", self.gesture);
    }

    fn move_to(&mut self, at: Point) -> Vec<Action> {
        match self.gesture {
            Gesture::Panning { last } => {
                self.viewport.pan_by(at.x - last.x, at.y - last.y);
                self.gesture = Gesture::Panning { last: at };
                vec![]
            }
            Gesture::DraggingNode { id, last, position } => {
                if at == last {
                    return vec![];
                }
                let scale = self.viewport.scale;
                let next = Point::new(
                    position.x + (at.x - last.x) / scale,
                    position.y + (at.y - last.y) / scale,
                );
                log::trace!("drag {id} to ({}, {})", next.x, next.y);
                self.gesture = Gesture::DraggingNode {
                    id,
                    last: at,
                    position: next,
                };
                vec![Action::MoveNode {
                    id,
                    x: next.x,
                    y: next.y,
                }]
            }
            Gesture::Idle | Gesture::Pinching { .. } => vec![],
        }
    }

    fn pinch(&mut self, a: Point, b: Point, last_distance: f64) {
        let distance = a.distance(b);
        if last_distance > f64::EPSILON {
            let ratio = distance / last_distance;
            let factor = 1.0 + (ratio - 1.0) * self.config.pinch_sensitivity;
            self.zoom(factor, a.midpoint(b));
            log::trace!("pinch ×{factor:.3} → scale {:.3}", self.viewport.scale);
        }
        self.gesture = Gesture::Pinching {
            last_distance: distance,
        };
    }
}
