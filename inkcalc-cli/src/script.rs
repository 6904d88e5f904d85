//! JSON input scripts.
//!
//! A script is an array of actions replayed in order, e.g.
//!
//! ```json
//! [
//!   { "action": "color", "value": "#ff0000" },
//!   { "action": "stroke", "points": [[10, 10], [60, 40]] },
//!   { "action": "run" },
//!   { "action": "drag", "overlay": 0, "x": 10, "y": 20 }
//! ]
//! ```
//!
//! Pointer coordinates are viewport (client) coordinates.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// One user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Pointer pressed.
    Down {
        /// Client X.
        x: f32,
        /// Client Y.
        y: f32,
    },
    /// Pointer moved.
    Move {
        /// Client X.
        x: f32,
        /// Client Y.
        y: f32,
    },
    /// Pointer released.
    Up,
    /// Pointer left the canvas.
    Leave,
    /// Shorthand for down, moves and up over a polyline.
    Stroke {
        /// Client coordinates as `[x, y]` pairs.
        points: Vec<[f32; 2]>,
    },
    /// Pick a color (switches back to drawing).
    Color {
        /// CSS-style color string.
        value: String,
    },
    /// Set the brush width.
    Width {
        /// Requested width; clamped to the brush range.
        value: f32,
    },
    /// Switch to the eraser.
    Eraser,
    /// Switch back to drawing.
    Pen,
    /// Undo the last drawing operation.
    Undo,
    /// Redo the last undone operation.
    Redo,
    /// Clear the strokes (undoable).
    Clear,
    /// Clear everything.
    Reset,
    /// Send the canvas for recognition.
    Run,
    /// The viewport changed size.
    Resize {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// Complete a drag of the n-th overlay.
    Drag {
        /// Index in overlay creation order.
        overlay: usize,
        /// Final x.
        x: f32,
        /// Final y.
        y: f32,
    },
}

/// Parse a script from JSON text.
///
/// # Errors
///
/// Returns an error if the text is not a JSON array of known actions.
pub fn parse_script(text: &str) -> anyhow::Result<Vec<Action>> {
    serde_json::from_str(text).context("Invalid input script")
}

/// Read and parse a script file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_script(path: &Path) -> anyhow::Result<Vec<Action>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let actions = parse_script(&text)
        .with_context(|| format!("Failed to parse script {}", path.display()))?;
    tracing::debug!("Loaded {} actions from {}", actions.len(), path.display());
    Ok(actions)
}
