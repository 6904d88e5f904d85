//! End-to-end recognition run against a shared session.

use std::sync::atomic::{AtomicU64, Ordering};

use inkcalc_core::{
    CalcResult, CanvasSnapshot, OverlayId, RecognitionOutcome, RecognitionResponse,
    RecognitionTicket, Session, SessionHandle,
};

use crate::error::ClientError;
use crate::transport::{HttpTransport, RecognitionConfig, RecognitionTransport};

/// Result of [`RecognitionClient::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A request was already outstanding; nothing was dispatched.
    Skipped,
    /// The response was applied to the session.
    Applied {
        /// Overlays created, in batch order.
        overlays: Vec<OverlayId>,
        /// Number of bindings set.
        bindings_set: usize,
    },
    /// The session was reset while the request was in flight.
    Stale,
}

impl From<RecognitionOutcome> for RunOutcome {
    fn from(outcome: RecognitionOutcome) -> Self {
        match outcome {
            RecognitionOutcome::Applied {
                overlays,
                bindings_set,
            } => Self::Applied {
                overlays,
                bindings_set,
            },
            RecognitionOutcome::Stale => Self::Stale,
        }
    }
}

/// Outstanding recognition that is abandoned if dropped before completion.
struct InFlight<'a> {
    session: &'a SessionHandle,
    ticket: Option<RecognitionTicket>,
}

impl<'a> InFlight<'a> {
    fn new(session: &'a SessionHandle, ticket: RecognitionTicket) -> Self {
        Self {
            session,
            ticket: Some(ticket),
        }
    }

    fn complete(
        mut self,
        result: CalcResult<RecognitionResponse>,
    ) -> CalcResult<RecognitionOutcome> {
        let Some(ticket) = self.ticket.take() else {
            return Ok(RecognitionOutcome::Stale);
        };
        let session = self.session;
        session.update(|s| s.complete_recognition(ticket, result))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            tracing::debug!("Recognition {} cancelled by caller", ticket.generation());
            self.session.update(|s| s.abandon_recognition(ticket));
        }
    }
}

/// Drives one recognition request at a time through a transport.
#[derive(Debug)]
pub struct RecognitionClient<T = HttpTransport> {
    transport: T,
    dispatched: AtomicU64,
}

impl RecognitionClient<HttpTransport> {
    /// Create a client talking HTTP to the configured service.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client fails to build.
    pub fn new(config: &RecognitionConfig) -> Result<Self, ClientError> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }
}

impl<T: RecognitionTransport> RecognitionClient<T> {
    /// Create a client over a custom transport.
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            dispatched: AtomicU64::new(0),
        }
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of requests handed to the transport so far.
    #[must_use]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Snapshot the canvas, send it with the current bindings and apply the
    /// answer.
    ///
    /// The host must have forwarded pending session events to the renderer
    /// before calling this, so the snapshot shows every committed stroke. The
    /// session lock is released while the transport is awaited.
    ///
    /// # Errors
    ///
    /// - [`CalcError::Snapshot`](inkcalc_core::CalcError::Snapshot) if the
    ///   canvas could not be encoded (nothing is sent).
    /// - [`CalcError::RecognitionUnavailable`](inkcalc_core::CalcError::RecognitionUnavailable)
    ///   on transport or HTTP status failure.
    /// - [`CalcError::MalformedResponse`](inkcalc_core::CalcError::MalformedResponse)
    ///   if the payload has the wrong shape.
    ///
    /// Strokes, overlays and bindings are unchanged on every error path. If the
    /// returned future is dropped mid-flight the session leaves the recognizing
    /// state and its response is never applied.
    pub async fn run(
        &self,
        session: &SessionHandle,
        snapshot: &dyn CanvasSnapshot,
    ) -> CalcResult<RunOutcome> {
        let Some(ticket) = session.update(Session::begin_recognition) else {
            return Ok(RunOutcome::Skipped);
        };
        let generation = ticket.generation();

        let image = match snapshot.encode_data_url() {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Canvas snapshot failed, recognition {generation} not sent: {e}");
                session.update(|s| s.abandon_recognition(ticket));
                return Err(e);
            }
        };

        let request = ticket.request(image);
        let in_flight = InFlight::new(session, ticket);
        self.dispatched.fetch_add(1, Ordering::Relaxed);

        let result = match self.transport.recognize(&request).await {
            Ok(value) => RecognitionResponse::from_value(value),
            Err(e) => Err(e.into()),
        };

        let outcome = in_flight.complete(result)?;
        Ok(outcome.into())
    }
}
