//! Axis-aligned rectangle math
//!
//! Screen space: origin top-left, y grows downward. A rectangle is its
//! top-left corner plus a size; edges are half-open so two rectangles that
//! merely touch do not overlap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Rectangle of `size` whose bottom edge sits on `bottom_y`
    pub fn standing_on(x: f32, bottom_y: f32, size: Vec2) -> Self {
        Self {
            min: Vec2::new(x, bottom_y - size.y),
            size,
        }
    }

    /// Rectangle of `size` centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Strict overlap test (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Grow every edge outward by `margin`
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect {
            min: self.min - Vec2::splat(margin),
            size: self.size + Vec2::splat(margin * 2.0),
        }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }
}
