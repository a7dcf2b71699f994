//! View transform between world space and screen space.
//!
//! `screen = world * scale + pan` and `world = (screen - pan) / scale`.
//! Pan deltas are applied in screen space; anything that moves nodes must
//! divide by `scale` first so motion tracks the pointer at every zoom level.

use kurbo::{Affine, Size, Vec2};
use mm_core::model::{Bounds, Point};

/// Pan offset (screen pixels) and zoom factor. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan: Point,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Point::ORIGIN,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.pan.x, p.y * self.scale + self.pan.y)
    }

    pub fn screen_to_world(&self, s: Point) -> Point {
        Point::new(
            (s.x - self.pan.x) / self.scale,
            (s.y - self.pan.y) / self.scale,
        )
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Multiply the scale by `factor`, clamped to `[min_scale, max_scale]`,
    /// keeping the world point under `anchor` (screen space) fixed.
    ///
    /// Returns whether the scale changed. Non-positive or non-finite
    /// factors are ignored, and so is a range that is empty or NaN.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point, min_scale: f64, max_scale: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        if min_scale.is_nan() || max_scale.is_nan() || min_scale > max_scale {
            log::debug!("zoom ignored: invalid scale range {min_scale}..{max_scale}");
            return false;
        }
        let next = (self.scale * factor).clamp(min_scale, max_scale);
        if next == self.scale {
            return false;
        }
        let world = self.screen_to_world(anchor);
        self.scale = next;
        self.pan = Point::new(anchor.x - world.x * next, anchor.y - world.y * next);
        true
    }

    /// Pan so the center of `bounds` lands in the middle of the screen.
    /// Scale is left alone.
    pub fn center_on(&mut self, bounds: Bounds, screen: Size) {
        let c = bounds.center();
        self.pan = Point::new(
            screen.width / 2.0 - c.x * self.scale,
            screen.height / 2.0 - c.y * self.scale,
        );
    }

    /// Put the world origin at the middle of the screen at scale 1.
    pub fn reset(&mut self, screen: Size) {
        self.scale = 1.0;
        self.pan = Point::new(screen.width / 2.0, screen.height / 2.0);
    }

    /// World → screen as an affine transform for the painter.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.pan.x, self.pan.y)) * Affine::scale(self.scale)
    }
}
