//! The ordered collection of strokes currently on the canvas.

use serde::{Deserialize, Serialize};

use crate::{Stroke, StrokeId};

/// Strokes in paint order (oldest first).
///
/// Mutation is crate-private: strokes enter through the capture engine and
/// leave through history, clear and reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeStore {
    strokes: Vec<Stroke>,
}

impl StrokeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from strokes in paint order.
    #[must_use]
    pub fn from_strokes(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    /// Append a stroke on top.
    pub(crate) fn insert(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Remove a stroke by id, returning it if present.
    pub(crate) fn remove(&mut self, id: StrokeId) -> Option<Stroke> {
        let index = self.strokes.iter().position(|s| s.id() == id)?;
        Some(self.strokes.remove(index))
    }

    /// Remove every stroke, returning the prior contents.
    pub(crate) fn take_all(&mut self) -> Vec<Stroke> {
        std::mem::take(&mut self.strokes)
    }

    /// Replace the contents with a prior snapshot.
    pub(crate) fn restore(&mut self, strokes: Vec<Stroke>) {
        self.strokes = strokes;
    }

    /// Get a stroke by id.
    #[must_use]
    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id() == id)
    }

    /// Iterate strokes in paint order.
    pub fn iter(&self) -> std::slice::Iter<'_, Stroke> {
        self.strokes.iter()
    }

    /// Strokes in paint order.
    #[must_use]
    pub fn as_slice(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Number of strokes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Check if the canvas has no strokes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

impl<'a> IntoIterator for &'a StrokeStore {
    type Item = &'a Stroke;
    type IntoIter = std::slice::Iter<'a, Stroke>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
