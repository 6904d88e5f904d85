//! Error types for engine operations.

use thiserror::Error;

use crate::OverlayId;

/// Result type for engine operations.
pub type CalcResult<T> = Result<T, CalcError>;

/// Errors that can occur in engine operations.
///
/// All of these are recoverable at the UI boundary. `EmptyHistory` and
/// `EmptyRedo` normally surface as disabled controls rather than messages.
#[derive(Debug, Error)]
pub enum CalcError {
    /// Undo was requested with nothing to undo.
    #[error("Nothing to undo")]
    EmptyHistory,

    /// Redo was requested with nothing to redo.
    #[error("Nothing to redo")]
    EmptyRedo,

    /// An overlay operation referenced an unknown overlay.
    #[error("Overlay not found: {0}")]
    NotFound(OverlayId),

    /// Brush settings were rejected.
    #[error("Invalid brush setting: {0}")]
    InvalidBrush(String),

    /// The recognition service could not be reached or answered with an error.
    #[error("Recognition service unavailable: {0}")]
    RecognitionUnavailable(String),

    /// The recognition service answered with a payload of the wrong shape.
    #[error("Malformed recognition response: {0}")]
    MalformedResponse(String),

    /// The canvas could not be encoded for transmission.
    #[error("Canvas snapshot failed: {0}")]
    Snapshot(String),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CalcError {
    /// Returns true for errors that should be shown to the user as a
    /// non-blocking notification.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::RecognitionUnavailable(_) | Self::MalformedResponse(_) | Self::Snapshot(_)
        )
    }
}
