//! Draggable result annotations.
//!
//! Overlays live in the overlay container's coordinate space, which is
//! independent of canvas pixels: resizing or repainting the canvas never moves
//! them. The only way to reposition one is [`OverlayManager::move_to`], driven
//! by drag completion.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CalcError, CalcResult, Size};

/// Unique identifier for an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayId(Uuid);

impl OverlayId {
    /// Create a new unique overlay ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position in overlay-container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X offset from the container's left edge.
    pub x: f32,
    /// Y offset from the container's top edge.
    pub y: f32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A recognized expression shown on top of the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Unique identifier.
    pub id: OverlayId,
    /// Markup handed to the typesetter.
    pub content: String,
    /// Current position.
    pub position: Position,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: u64,
}

/// Build overlay markup for a recognized expression and its result.
#[must_use]
pub fn markup_for(expr: &str, result: &str) -> String {
    format!("\\(\\LARGE{{{expr} = {result}}}\\)")
}

#[allow(clippy::cast_possible_truncation)]
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Lazy, restartable iteration over overlays in creation order.
///
/// Cloning the iterator restarts from the clone point, so a typesetter can walk
/// the list as many times as it needs.
#[derive(Debug, Clone)]
pub struct Overlays<'a> {
    inner: std::slice::Iter<'a, Overlay>,
}

impl<'a> Iterator for Overlays<'a> {
    type Item = &'a Overlay;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Overlays<'_> {}

/// Tracks every overlay and the container they are positioned in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayManager {
    overlays: Vec<Overlay>,
    container: Size,
    revision: u64,
}

impl OverlayManager {
    /// Create a manager for a container of the given size.
    #[must_use]
    pub fn new(container: Size) -> Self {
        Self {
            overlays: Vec::new(),
            container,
            revision: 0,
        }
    }

    /// Add an overlay and return its id.
    ///
    /// Without an explicit position the overlay is centered in the container.
    pub fn add(&mut self, content: impl Into<String>, position: Option<Position>) -> OverlayId {
        let position = position.unwrap_or_else(|| {
            let c = self.container.center();
            Position::new(c.x, c.y)
        });
        let overlay = Overlay {
            id: OverlayId::new(),
            content: content.into(),
            position,
            created_at: now_ms(),
        };
        let id = overlay.id;
        tracing::debug!("Overlay {id} added at ({}, {})", position.x, position.y);
        self.overlays.push(overlay);
        self.revision += 1;
        id
    }

    /// Move an overlay to a new position.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::NotFound`] if the id is unknown.
    pub fn move_to(&mut self, id: OverlayId, position: Position) -> CalcResult<()> {
        let overlay = self
            .overlays
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(CalcError::NotFound(id))?;
        overlay.position = position;
        self.revision += 1;
        Ok(())
    }

    /// Remove every overlay.
    pub fn remove_all(&mut self) {
        if !self.overlays.is_empty() {
            self.overlays.clear();
            self.revision += 1;
        }
    }

    /// Overlays in creation order.
    #[must_use]
    pub fn list(&self) -> Overlays<'_> {
        Overlays {
            inner: self.overlays.iter(),
        }
    }

    /// Get an overlay by id.
    #[must_use]
    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// Update the container used for default centering.
    ///
    /// Existing overlays keep their positions.
    pub fn set_container(&mut self, container: Size) {
        self.container = container;
    }

    /// Current container size.
    #[must_use]
    pub const fn container(&self) -> Size {
        self.container
    }

    /// Counter bumped on every change to the overlay list.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of overlays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// Check if there are no overlays.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}
