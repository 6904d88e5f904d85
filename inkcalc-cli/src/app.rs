//! Headless application loop: script actions in, renderer and typesetter out.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use inkcalc_client::{HttpTransport, RecognitionClient, RecognitionTransport, RunOutcome};
use inkcalc_core::{
    CanvasRect, Mounted, Point, Position, Rgba, Session, SessionEvent, SessionHandle, Size,
    ToolMode, Typesetter,
};
use inkcalc_renderer::{CanvasRenderer, RendererConfig};
use serde::Serialize;

use crate::collab::{LogTypesetter, ViewportListener};
use crate::script::Action;
use crate::CliConfig;

/// Overlay as reported in the run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySummary {
    /// Typesetter markup.
    pub content: String,
    /// Final position.
    pub position: Position,
}

/// Final state printed after a script run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Committed strokes left on the canvas.
    pub strokes: usize,
    /// Overlays in creation order.
    pub overlays: Vec<OverlaySummary>,
    /// Variable bindings.
    pub bindings: BTreeMap<String, String>,
    /// Non-blocking notifications raised during the run.
    pub notices: Vec<String>,
}

/// The InkCalc host.
pub struct InkCalcApp<T = HttpTransport> {
    session: SessionHandle,
    renderer: CanvasRenderer,
    client: RecognitionClient<T>,
    typesetter: Mounted<LogTypesetter>,
    viewport: Mounted<ViewportListener>,
    rect: CanvasRect,
    notices: Vec<String>,
}

impl InkCalcApp<HttpTransport> {
    /// Create an app talking to the configured recognition service.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a collaborator fails
    /// to attach.
    pub fn new(config: &CliConfig) -> Result<Self> {
        let client = RecognitionClient::new(&config.recognition)
            .context("Failed to create recognition client")?;
        Self::with_client(config, client)
    }
}

impl<T: RecognitionTransport> InkCalcApp<T> {
    /// Create an app over an existing recognition client.
    ///
    /// # Errors
    ///
    /// Returns an error if the background color is invalid, the surface cannot
    /// be allocated or a collaborator fails to attach.
    pub fn with_client(config: &CliConfig, client: RecognitionClient<T>) -> Result<Self> {
        let snapshot_background = config
            .background
            .as_deref()
            .map(str::parse::<Rgba>)
            .transpose()
            .context("Invalid --background color")?;

        #[allow(clippy::cast_precision_loss)] // Viewport dimensions fit in f32
        let viewport = Size::new(config.width as f32, config.height as f32);

        let renderer = CanvasRenderer::new(
            config.width,
            config.height,
            RendererConfig {
                snapshot_background,
                ..RendererConfig::default()
            },
        )?;

        Ok(Self {
            session: SessionHandle::new(Session::new(viewport)),
            renderer,
            client,
            typesetter: Mounted::mount(LogTypesetter::new())?,
            viewport: Mounted::mount(ViewportListener::new(viewport))?,
            rect: CanvasRect::new(0.0, 0.0, viewport.width, viewport.height),
            notices: Vec::new(),
        })
    }

    /// Replay every action in order.
    ///
    /// # Errors
    ///
    /// Returns an error only for script errors (e.g. dragging an overlay that
    /// does not exist); engine refusals become notices.
    pub async fn run_script(&mut self, actions: &[Action]) -> Result<()> {
        for (index, action) in actions.iter().enumerate() {
            self.apply(action)
                .await
                .with_context(|| format!("Script action {index} ({action:?}) failed"))?;
        }
        Ok(())
    }

    /// Apply one action and forward the resulting events.
    ///
    /// # Errors
    ///
    /// Returns an error if a drag names an overlay index that does not exist or
    /// the surface cannot be resized.
    pub async fn apply(&mut self, action: &Action) -> Result<()> {
        tracing::trace!("Applying {:?}", action);
        match action {
            Action::Down { x, y } => {
                let (rect, point) = (self.rect, Point::new(*x, *y));
                if !self.session.update(|s| s.pointer_down(point, &rect)) {
                    if self.session.read().is_recognizing() {
                        self.notice("Drawing is disabled while recognition is pending");
                    } else {
                        tracing::debug!("Pointer down ignored; stroke already in progress");
                    }
                }
            }
            Action::Move { x, y } => {
                let rect = self.rect;
                self.session
                    .update(|s| s.pointer_move(Point::new(*x, *y), &rect));
            }
            Action::Up => {
                self.session.update(Session::pointer_up);
            }
            Action::Leave => {
                self.session.update(Session::pointer_leave);
            }
            Action::Stroke { points } => {
                let rect = self.rect;
                let mut points = points.iter().map(|[x, y]| Point::new(*x, *y));
                self.session.update(|s| {
                    if let Some(first) = points.next() {
                        s.pointer_down(first, &rect);
                        for p in points {
                            s.pointer_move(p, &rect);
                        }
                        s.pointer_up();
                    }
                });
            }
            Action::Color { value } => match value.parse::<Rgba>() {
                Ok(color) => self.session.update(|s| s.set_color(color)),
                Err(e) => self.notice(&e.to_string()),
            },
            Action::Width { value } => {
                if let Err(e) = self.session.update(|s| s.set_width(*value)) {
                    self.notice(&e.to_string());
                }
            }
            Action::Eraser => self.session.update(|s| s.set_mode(ToolMode::Erase)),
            Action::Pen => self.session.update(|s| s.set_mode(ToolMode::Draw)),
            Action::Undo => {
                if let Err(e) = self.session.update(Session::undo) {
                    tracing::debug!("Undo ignored: {e}");
                }
            }
            Action::Redo => {
                if let Err(e) = self.session.update(Session::redo) {
                    tracing::debug!("Redo ignored: {e}");
                }
            }
            Action::Clear => self.session.update(Session::clear_canvas),
            Action::Reset => self.session.update(Session::reset),
            Action::Run => self.recognize().await,
            Action::Resize { width, height } => self.resize(*width, *height)?,
            Action::Drag { overlay, x, y } => {
                let id = self
                    .session
                    .read()
                    .overlays()
                    .list()
                    .nth(*overlay)
                    .map(|o| o.id)
                    .with_context(|| format!("No overlay at index {overlay}"))?;
                self.session
                    .update(|s| s.drag_overlay(id, Position::new(*x, *y)));
            }
        }
        self.pump();
        Ok(())
    }

    async fn recognize(&mut self) {
        // The snapshot must include everything drawn so far.
        self.pump();
        match self.client.run(&self.session, &self.renderer).await {
            Ok(RunOutcome::Skipped) => tracing::debug!("Run ignored; request already pending"),
            Ok(RunOutcome::Stale) => tracing::info!("Recognition response discarded after reset"),
            Ok(RunOutcome::Applied { overlays, .. }) => {
                tracing::info!("Recognition produced {} results", overlays.len());
            }
            Err(e) if e.is_user_visible() => self.notice(&e.to_string()),
            Err(e) => tracing::warn!("Recognition failed: {e}"),
        }
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        #[allow(clippy::cast_precision_loss)] // Viewport dimensions fit in f32
        let requested = Size::new(width as f32, height as f32);
        let Some(size) = self.viewport.observe(requested) else {
            return Ok(());
        };
        self.rect = CanvasRect::new(self.rect.left, self.rect.top, size.width, size.height);
        self.session.update(|s| s.resize(size));
        let session = self.session.read();
        self.renderer.resize(width, height, session.strokes())?;
        Ok(())
    }

    /// Forward queued session events to the renderer and typesetter.
    pub fn pump(&mut self) {
        let events = self.session.update(Session::drain_events);
        let session = self.session.read();
        for event in &events {
            self.renderer
                .apply(event, session.strokes(), session.in_progress());
            match event {
                SessionEvent::OverlaysChanged => {
                    self.typesetter.typeset(session.overlays().list());
                }
                SessionEvent::RecognitionFailed {
                    generation,
                    message,
                } => {
                    tracing::warn!("Recognition {generation} failed: {message}");
                }
                SessionEvent::RecognitionFinished {
                    generation,
                    overlays,
                } => {
                    tracing::debug!("Recognition {generation} finished with {overlays} overlays");
                }
                _ => {}
            }
        }
    }

    fn notice(&mut self, message: &str) {
        tracing::warn!("{message}");
        self.notices.push(message.to_string());
    }

    /// Write the canvas to a PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn export_png(&self, path: &Path) -> Result<()> {
        let png = self.renderer.encode_png()?;
        std::fs::write(path, &png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {} bytes to {}", png.len(), path.display());
        Ok(())
    }

    /// Snapshot of the final state.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let session = self.session.read();
        Summary {
            strokes: session.strokes().len(),
            overlays: session
                .overlays()
                .list()
                .map(|o| OverlaySummary {
                    content: o.content.clone(),
                    position: o.position,
                })
                .collect(),
            bindings: session
                .bindings()
                .snapshot()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            notices: self.notices.clone(),
        }
    }

    /// Shared session handle.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// The raster surface.
    #[must_use]
    pub fn renderer(&self) -> &CanvasRenderer {
        &self.renderer
    }

    /// The recognition client.
    #[must_use]
    pub fn client(&self) -> &RecognitionClient<T> {
        &self.client
    }

    /// The mounted typesetter.
    #[must_use]
    pub fn typesetter(&self) -> &LogTypesetter {
        &self.typesetter
    }
}
