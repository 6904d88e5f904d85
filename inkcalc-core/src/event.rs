//! Events emitted by the session for the host to act on.

use crate::{CalcError, Segment};

/// Something the host should react to after a session call.
///
/// The session queues these; the host drains them with
/// [`Session::drain_events`](crate::Session::drain_events) and forwards them
/// to the renderer and typesetter.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A live-stroke segment should be painted incrementally.
    SegmentAppended(Segment),
    /// The stroke store settled; the canvas needs a full repaint.
    RepaintRequested,
    /// The overlay list changed; overlay content must be re-typeset.
    OverlaysChanged,
    /// Variable bindings changed.
    BindingsChanged,
    /// A recognition request was dispatched.
    RecognitionStarted {
        /// Generation of the request.
        generation: u64,
    },
    /// A recognition batch was applied.
    RecognitionFinished {
        /// Generation of the request.
        generation: u64,
        /// Number of overlays created.
        overlays: usize,
    },
    /// A recognition request failed; drawing state is preserved.
    RecognitionFailed {
        /// Generation of the request.
        generation: u64,
        /// Human-readable reason, for a non-blocking notification.
        message: String,
    },
}

impl SessionEvent {
    pub(crate) fn failed(generation: u64, error: &CalcError) -> Self {
        Self::RecognitionFailed {
            generation,
            message: error.to_string(),
        }
    }
}
