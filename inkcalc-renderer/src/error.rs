//! Renderer error types.

use inkcalc_core::CalcError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The drawing surface could not be allocated.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Encoding the surface failed.
    #[error("Encoding failed: {0}")]
    Encode(String),
}

impl From<RenderError> for CalcError {
    fn from(err: RenderError) -> Self {
        CalcError::Snapshot(err.to_string())
    }
}
