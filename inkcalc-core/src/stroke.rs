//! Committed strokes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Point, Rgba, ToolMode};

/// Unique identifier for a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrokeId(Uuid);

impl StrokeId {
    /// Create a new unique stroke ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StrokeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StrokeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One continuous freehand path from pointer-down to pointer-up.
///
/// Strokes are immutable once committed: fields are read-only and the only
/// constructor is used by the capture engine (and tests).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    id: StrokeId,
    points: Vec<Point>,
    color: Rgba,
    width: f32,
    tool: ToolMode,
}

impl Stroke {
    /// Create a stroke with a fresh identifier.
    #[must_use]
    pub fn new(points: Vec<Point>, color: Rgba, width: f32, tool: ToolMode) -> Self {
        Self {
            id: StrokeId::new(),
            points,
            color,
            width,
            tool,
        }
    }

    /// Stroke identifier.
    #[must_use]
    pub const fn id(&self) -> StrokeId {
        self.id
    }

    /// Points in canvas-local coordinates, in capture order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Ink color. Ignored for erase strokes.
    #[must_use]
    pub const fn color(&self) -> Rgba {
        self.color
    }

    /// Line width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Whether the stroke paints or erases.
    #[must_use]
    pub const fn tool(&self) -> ToolMode {
        self.tool
    }
}
