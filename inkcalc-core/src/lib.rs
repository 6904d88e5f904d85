//! # InkCalc Core
//!
//! State engine for a handwritten-math canvas: strokes are captured and kept in
//! an undoable store, a snapshot is sent to a recognition service, and the
//! results come back as draggable overlays while assignments accumulate as
//! variable bindings.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                     Session                      │
//! ├──────────────────────────┬───────────────────────┤
//! │  Drawing                 │  Recognition          │
//! │  - BrushState            │  - RecognitionTicket  │
//! │  - StrokeCaptureEngine   │  - generation counter │
//! │  - StrokeStore           │  - OverlayManager     │
//! │  - HistoryStack          │  - VariableBindings   │
//! ├──────────────────────────┴───────────────────────┤
//! │  Events (repaint, typeset trigger) + Lifecycle    │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate performs I/O. Rendering lives in `inkcalc-renderer`
//! and the HTTP transport in `inkcalc-client`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bindings;
pub mod brush;
pub mod capture;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod lifecycle;
pub mod overlay;
pub mod recognition;
pub mod session;
pub mod store;
pub mod stroke;

pub use bindings::{BindingsSnapshot, VariableBindingStore};
pub use brush::{BrushState, Rgba, ToolMode, MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH};
pub use capture::{InProgressStroke, Segment, StrokeCaptureEngine};
pub use error::{CalcError, CalcResult};
pub use event::SessionEvent;
pub use geometry::{CanvasRect, Point, Size};
pub use history::{HistoryEntry, HistoryStack};
pub use lifecycle::{CanvasSnapshot, Collaborator, Mounted, Typesetter};
pub use overlay::{markup_for, Overlay, OverlayId, OverlayManager, Overlays, Position};
pub use recognition::{RecognitionEntry, RecognitionRequest, RecognitionResponse};
pub use session::{RecognitionOutcome, RecognitionTicket, Session, SessionHandle};
pub use store::StrokeStore;
pub use stroke::{Stroke, StrokeId};

/// Core crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
