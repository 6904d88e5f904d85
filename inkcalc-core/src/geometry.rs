//! Coordinate helpers shared by capture, rendering and overlays.

use serde::{Deserialize, Serialize};

/// A point in canvas-local coordinates (pixels from the canvas' top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a surface or container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The center of a box of this size anchored at the origin.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whole-pixel dimensions, at least 1x1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_pixels(&self) -> (u32, u32) {
        (
            self.width.max(1.0).round() as u32,
            self.height.max(1.0).round() as u32,
        )
    }
}

/// The canvas' bounding box in viewport (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasRect {
    /// Left edge in viewport coordinates.
    pub left: f32,
    /// Top edge in viewport coordinates.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl CanvasRect {
    /// Create a canvas rect.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Size of the rect.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Convert a pointer position in viewport coordinates to canvas-local ones.
///
/// The result is not clamped; points outside the canvas stay outside.
#[must_use]
pub fn to_canvas_local(client: Point, rect: &CanvasRect) -> Point {
    Point::new(client.x - rect.left, client.y - rect.top)
}
