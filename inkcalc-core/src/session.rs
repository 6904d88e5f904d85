//! Application state: one explicitly constructed object owning every store.
//!
//! The session is driven by input events (pointer, tools, undo/redo, drag
//! completion) and by the completion of the single outstanding recognition
//! request. Recognition is split in two phases so the caller can await the
//! transport without holding the session:
//!
//! ```text
//! begin_recognition() ──► ticket(generation, bindings)
//!        │                         │
//!        │        (await transport, lock released)
//!        ▼                         ▼
//! complete_recognition(ticket, result) ──► Applied | Stale | Err
//! ```
//!
//! `reset()` bumps the generation, so a response for an older ticket is
//! dropped without touching overlays or bindings.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::geometry::to_canvas_local;
use crate::{
    markup_for, BindingsSnapshot, BrushState, CalcResult, CanvasRect, HistoryEntry, HistoryStack,
    InProgressStroke, OverlayId, OverlayManager, Point, Position, RecognitionRequest,
    RecognitionResponse, Rgba, SessionEvent, Size, StrokeCaptureEngine, StrokeId, StrokeStore,
    ToolMode, VariableBindingStore,
};

/// Proof that a recognition request was dispatched for a given generation.
///
/// Not `Clone`: each ticket is completed or abandoned exactly once.
#[derive(Debug)]
pub struct RecognitionTicket {
    generation: u64,
    bindings: BindingsSnapshot,
}

impl RecognitionTicket {
    /// Generation this request belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Bindings captured when the request was dispatched.
    #[must_use]
    pub fn bindings(&self) -> &BindingsSnapshot {
        &self.bindings
    }

    /// Build the request body around an encoded canvas image.
    #[must_use]
    pub fn request(&self, image: String) -> RecognitionRequest {
        RecognitionRequest {
            image,
            dict_of_vars: self.bindings.clone(),
        }
    }
}

/// What happened to a completed recognition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// The batch was applied.
    Applied {
        /// Overlays created, in batch order.
        overlays: Vec<OverlayId>,
        /// Number of assignment entries applied.
        bindings_set: usize,
    },
    /// The response belonged to an older generation and was discarded.
    Stale,
}

/// The complete drawing and recognition state.
#[derive(Debug, Clone)]
pub struct Session {
    brush: BrushState,
    capture: StrokeCaptureEngine,
    strokes: StrokeStore,
    history: HistoryStack,
    overlays: OverlayManager,
    bindings: VariableBindingStore,
    viewport: Size,
    generation: u64,
    pending: Option<u64>,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Create an empty session for a canvas of the given size.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            brush: BrushState::default(),
            capture: StrokeCaptureEngine::new(),
            strokes: StrokeStore::new(),
            history: HistoryStack::new(),
            overlays: OverlayManager::new(viewport),
            bindings: VariableBindingStore::new(),
            viewport,
            generation: 0,
            pending: None,
            events: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Pointer input (viewport coordinates)

    /// Pointer pressed at a viewport position.
    pub fn pointer_down(&mut self, client: Point, rect: &CanvasRect) -> bool {
        self.begin_stroke(to_canvas_local(client, rect))
    }

    /// Pointer moved to a viewport position.
    pub fn pointer_move(&mut self, client: Point, rect: &CanvasRect) -> bool {
        self.extend_stroke(to_canvas_local(client, rect))
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) -> Option<StrokeId> {
        self.commit_stroke()
    }

    /// Pointer left the canvas; ends the stroke like a release.
    pub fn pointer_leave(&mut self) -> Option<StrokeId> {
        self.commit_stroke()
    }

    // ---------------------------------------------------------------------
    // Stroke capture (canvas-local coordinates)

    /// Start a stroke with the current brush.
    ///
    /// Refused while a recognition request is outstanding, so the canvas clear
    /// that follows a response never races in-progress drawing. The opening
    /// point is queued as a zero-length segment so a tap shows up as a dot.
    pub fn begin_stroke(&mut self, point: Point) -> bool {
        if self.pending.is_some() {
            tracing::debug!("Drawing disabled while recognition is pending");
            return false;
        }
        match self.capture.begin(point, &self.brush) {
            Some(dot) => {
                self.events.push(SessionEvent::SegmentAppended(dot));
                true
            }
            None => false,
        }
    }

    /// Extend the live stroke.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        match self.capture.extend(point) {
            Some(segment) => {
                self.events.push(SessionEvent::SegmentAppended(segment));
                true
            }
            None => false,
        }
    }

    /// Commit the live stroke.
    pub fn commit_stroke(&mut self) -> Option<StrokeId> {
        let id = self.capture.commit(&mut self.strokes, &mut self.history)?;
        self.events.push(SessionEvent::RepaintRequested);
        Some(id)
    }

    /// Throw away the live stroke.
    pub fn cancel_stroke(&mut self) {
        if self.capture.is_drawing() {
            self.capture.cancel();
            self.events.push(SessionEvent::RepaintRequested);
        }
    }

    // ---------------------------------------------------------------------
    // Tools

    /// Current brush.
    #[must_use]
    pub const fn brush(&self) -> &BrushState {
        &self.brush
    }

    /// Select a color (switches back to drawing).
    pub fn set_color(&mut self, color: Rgba) {
        self.brush.set_color(color);
    }

    /// Set the brush width; returns the clamped width applied.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::InvalidBrush`](crate::CalcError::InvalidBrush) for non-finite or non-positive widths.
    pub fn set_width(&mut self, width: f32) -> CalcResult<f32> {
        self.brush.set_width(width)
    }

    /// Switch between drawing and erasing.
    pub fn set_mode(&mut self, mode: ToolMode) {
        self.brush.set_mode(mode);
    }

    // ---------------------------------------------------------------------
    // History

    /// Undo the last drawing operation.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::EmptyHistory`](crate::CalcError::EmptyHistory) if there is nothing to undo.
    pub fn undo(&mut self) -> CalcResult<()> {
        self.history.undo(&mut self.strokes)?;
        self.events.push(SessionEvent::RepaintRequested);
        Ok(())
    }

    /// Redo the last undone operation.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::EmptyRedo`](crate::CalcError::EmptyRedo) if there is nothing to redo.
    pub fn redo(&mut self) -> CalcResult<()> {
        self.history.redo(&mut self.strokes)?;
        self.events.push(SessionEvent::RepaintRequested);
        Ok(())
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Clear every stroke as one undoable step. Overlays and bindings stay.
    pub fn clear_canvas(&mut self) {
        self.capture.cancel();
        self.clear_strokes_undoable();
        self.events.push(SessionEvent::RepaintRequested);
    }

    fn clear_strokes_undoable(&mut self) {
        if self.strokes.is_empty() {
            return;
        }
        let prior = self.strokes.take_all();
        self.history.push(HistoryEntry::Cleared(prior));
    }

    /// Clear strokes, history, overlays and bindings in one step.
    ///
    /// Any outstanding recognition response becomes stale.
    pub fn reset(&mut self) {
        self.capture.cancel();
        self.strokes.take_all();
        self.history.reset();
        self.overlays.remove_all();
        self.bindings.clear();
        self.generation += 1;
        if let Some(pending) = self.pending.take() {
            tracing::info!("Reset dropped pending recognition {pending}");
        }
        self.events.extend([
            SessionEvent::RepaintRequested,
            SessionEvent::OverlaysChanged,
            SessionEvent::BindingsChanged,
        ]);
        tracing::debug!("Session reset (generation {})", self.generation);
    }

    // ---------------------------------------------------------------------
    // Viewport and overlays

    /// The canvas viewport changed size.
    ///
    /// The overlay container follows, but existing overlays do not move.
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.overlays.set_container(viewport);
        self.events.push(SessionEvent::RepaintRequested);
    }

    /// Current viewport size.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Apply a completed drag gesture to an overlay.
    ///
    /// An unknown id is a logic error: it panics in debug builds and is logged
    /// and ignored otherwise.
    pub fn drag_overlay(&mut self, id: OverlayId, position: Position) {
        match self.overlays.move_to(id, position) {
            Ok(()) => self.events.push(SessionEvent::OverlaysChanged),
            Err(e) => {
                tracing::error!("Drag completion ignored: {e}");
                if cfg!(debug_assertions) {
                    panic!("drag completion for unknown overlay {id}");
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Recognition

    /// Dispatch a recognition request.
    ///
    /// Returns `None` if one is already outstanding. Otherwise commits any live
    /// stroke, advances the generation and captures the bindings.
    pub fn begin_recognition(&mut self) -> Option<RecognitionTicket> {
        if let Some(pending) = self.pending {
            tracing::debug!("Recognition {pending} already pending; run ignored");
            return None;
        }
        self.commit_stroke();
        self.generation += 1;
        self.pending = Some(self.generation);
        self.events.push(SessionEvent::RecognitionStarted {
            generation: self.generation,
        });
        tracing::debug!(
            "Recognition {} dispatched with {} strokes and {} bindings",
            self.generation,
            self.strokes.len(),
            self.bindings.len()
        );
        Some(RecognitionTicket {
            generation: self.generation,
            bindings: self.bindings.snapshot(),
        })
    }

    /// Apply the result of a recognition request.
    ///
    /// Stale tickets yield [`RecognitionOutcome::Stale`] and change nothing.
    /// On success every entry, in order, sets a binding (assignments only) and
    /// adds an overlay; the strokes are then cleared as one undoable step.
    ///
    /// # Errors
    ///
    /// Returns the transport or validation error unchanged. Strokes, overlays
    /// and bindings are untouched in that case.
    pub fn complete_recognition(
        &mut self,
        ticket: RecognitionTicket,
        result: CalcResult<RecognitionResponse>,
    ) -> CalcResult<RecognitionOutcome> {
        if self.pending != Some(ticket.generation) {
            tracing::debug!(
                "Dropping stale recognition response {} (current generation {})",
                ticket.generation,
                self.generation
            );
            return Ok(RecognitionOutcome::Stale);
        }
        self.pending = None;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let generation = ticket.generation;
                tracing::warn!("Recognition {generation} failed: {e}");
                self.events.push(SessionEvent::failed(generation, &e));
                return Err(e);
            }
        };

        let mut overlays = Vec::with_capacity(response.len());
        let mut bindings_set = 0;
        for entry in response.data {
            if entry.assign {
                self.bindings.set(entry.expr.clone(), entry.result.clone());
                bindings_set += 1;
            }
            let markup = markup_for(&entry.expr, &entry.result);
            overlays.push(self.overlays.add(markup, None));
        }

        self.clear_strokes_undoable();

        if bindings_set > 0 {
            self.events.push(SessionEvent::BindingsChanged);
        }
        if !overlays.is_empty() {
            self.events.push(SessionEvent::OverlaysChanged);
        }
        self.events.push(SessionEvent::RepaintRequested);
        self.events.push(SessionEvent::RecognitionFinished {
            generation: ticket.generation,
            overlays: overlays.len(),
        });
        tracing::info!(
            "Recognition {} applied: {} overlays, {bindings_set} bindings",
            ticket.generation,
            overlays.len()
        );

        Ok(RecognitionOutcome::Applied {
            overlays,
            bindings_set,
        })
    }

    /// Release a ticket without applying anything (e.g. the snapshot failed).
    pub fn abandon_recognition(&mut self, ticket: RecognitionTicket) {
        if self.pending == Some(ticket.generation) {
            self.pending = None;
            tracing::debug!("Recognition {} abandoned", ticket.generation);
        }
    }

    /// Check if a recognition request is outstanding.
    #[must_use]
    pub const fn is_recognizing(&self) -> bool {
        self.pending.is_some()
    }

    /// Current recognition generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    // ---------------------------------------------------------------------
    // Read access

    /// Committed strokes.
    #[must_use]
    pub const fn strokes(&self) -> &StrokeStore {
        &self.strokes
    }

    /// The live stroke, if one is being drawn.
    #[must_use]
    pub fn in_progress(&self) -> Option<&InProgressStroke> {
        self.capture.in_progress()
    }

    /// Drawing history.
    #[must_use]
    pub const fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Result overlays.
    #[must_use]
    pub const fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    /// Variable bindings.
    #[must_use]
    pub const fn bindings(&self) -> &VariableBindingStore {
        &self.bindings
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Size::new(800.0, 600.0))
    }
}

/// Shared handle to a session, used by the UI loop and the recognition client.
///
/// Guards must not be held across an await point. Poisoned locks are
/// recovered.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    /// Wrap a session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Read-lock the session.
    pub fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write-lock the session.
    pub fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a closure with mutable access to the session.
    pub fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut self.write())
    }
}

impl From<Session> for SessionHandle {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}
