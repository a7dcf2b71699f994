//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and wheel events into a unified `InputEvent`
//! consumed by the interaction controller. All coordinates are screen space.

use mm_core::model::Point;
use smallvec::SmallVec;

/// Active touch points, in screen space. Two inline slots cover pinch.
pub type Touches = SmallVec<[Point; 2]>;

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button pressed.
    PointerDown { x: f64, y: f64, modifiers: Modifiers },

    PointerMove { x: f64, y: f64, modifiers: Modifiers },

    /// Mouse button released (or pointer left the surface).
    PointerUp { x: f64, y: f64 },

    /// Touch contact began. Carries every touch currently down.
    TouchStart { touches: Touches },

    TouchMove { touches: Touches },

    /// A touch lifted. Carries the touches that remain.
    TouchEnd { touches: Touches },

    /// Scroll wheel or trackpad. `x`/`y` is the pointer position.
    ///
    /// `dx`/`dy` are the raw deltas as the platform reports them (positive
    /// means scrolling right/down). Without ⌘/Ctrl the view pans by
    /// `(-dx, -dy)`, so hosts must not invert them first. With ⌘/Ctrl the
    /// scale is multiplied by `exp(-dy * wheel_zoom_sensitivity)`.
    Wheel {
        dx: f64,
        dy: f64,
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },

    /// The platform aborted the gesture.
    Cancel,
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    /// Screen position used for hit testing, if this event starts a gesture
    /// at a single point.
    pub fn press_position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. } => Some(Point::new(*x, *y)),
            Self::TouchStart { touches } if touches.len() == 1 => Some(touches[0]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn press_position_only_for_single_point_starts() {
        assert_eq!(
            InputEvent::pointer_down(3.0, 4.0).press_position(),
            Some(Point::new(3.0, 4.0))
        );
        let one = InputEvent::TouchStart {
            touches: smallvec![Point::new(1.0, 2.0)],
        };
        assert_eq!(one.press_position(), Some(Point::new(1.0, 2.0)));
        let two = InputEvent::TouchStart {
            touches: smallvec![Point::new(1.0, 2.0), Point::new(5.0, 6.0)],
        };
        assert_eq!(two.press_position(), None);
        assert_eq!(InputEvent::pointer_move(1.0, 1.0).press_position(), None);
    }

    #[test]
    fn command_modifier() {
        assert!(!Modifiers::NONE.command());
        assert!(
            Modifiers {
                meta: true,
                ..Modifiers::NONE
            }
            .command()
        );
        assert!(
            Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            }
            .command()
        );
    }
}
