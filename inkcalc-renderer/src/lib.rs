//! # InkCalc Renderer
//!
//! Software rasterizer for the drawing surface, built on tiny-skia.
//!
//! ```text
//! ┌──────────────┐  SegmentAppended   ┌────────────────┐  encode_png   ┌─────────┐
//! │   Session    │ ─────────────────▶ │ CanvasRenderer │ ────────────▶ │ PNG /   │
//! │ (core state) │  RepaintRequested  │   (Pixmap)     │  to_data_url  │ dataURL │
//! └──────────────┘ ─────────────────▶ └────────────────┘               └─────────┘
//! ```
//!
//! The pixmap is a cache of the stroke store, never the source of truth.
//! Resizing recreates the surface and replays every committed stroke.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod raster;

pub use error::{RenderError, RenderResult};
pub use export::PNG_DATA_URL_PREFIX;
pub use raster::DrawContext;

use inkcalc_core::{
    CalcResult, CanvasSnapshot, InProgressStroke, Rgba, Segment, SessionEvent, Size, StrokeStore,
};
use tiny_skia::{Color, Pixmap};

/// Configuration for the renderer.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Enable anti-aliasing.
    pub anti_aliasing: bool,
    /// Background composited under strokes when exporting.
    ///
    /// `None` keeps the surface transparent in snapshots.
    pub snapshot_background: Option<Rgba>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            anti_aliasing: true,
            snapshot_background: None,
        }
    }
}

/// Raster surface holding the visible strokes.
pub struct CanvasRenderer {
    config: RendererConfig,
    pixmap: Pixmap,
    context: DrawContext,
    frame_count: u64,
}

impl std::fmt::Debug for CanvasRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasRenderer")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

impl CanvasRenderer {
    /// Create a renderer with a transparent surface of the given pixel size.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    pub fn new(width: u32, height: u32, config: RendererConfig) -> RenderResult<Self> {
        let pixmap = allocate(width, height)?;
        let context = DrawContext::freehand(config.anti_aliasing);
        tracing::debug!("Created {}x{} canvas surface", width, height);
        Ok(Self {
            config,
            pixmap,
            context,
            frame_count: 0,
        })
    }

    /// Create a renderer sized to a viewport, rounded to the nearest whole pixel.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    pub fn for_viewport(viewport: Size, config: RendererConfig) -> RenderResult<Self> {
        let (w, h) = viewport.to_pixels();
        Self::new(w, h, config)
    }

    /// Clear the surface and redraw every committed stroke in order.
    pub fn repaint(&mut self, strokes: &StrokeStore) {
        self.pixmap.fill(Color::TRANSPARENT);
        for stroke in strokes {
            raster::paint_stroke(&mut self.pixmap, &self.context, stroke);
        }
        self.frame_count += 1;
        tracing::trace!(
            "Repainted {} strokes (frame {})",
            strokes.len(),
            self.frame_count
        );
    }

    /// Paint one segment of the live stroke without a full repaint.
    pub fn append_segment(&mut self, segment: &Segment) {
        raster::paint_segment(&mut self.pixmap, &self.context, segment);
    }

    /// Paint the whole live stroke on top of the current surface.
    pub fn paint_in_progress(&mut self, stroke: &InProgressStroke) {
        raster::paint_points(
            &mut self.pixmap,
            &self.context,
            stroke.points(),
            raster::Ink::from(stroke),
        );
    }

    /// Recreate the surface at a new size and replay the committed strokes.
    ///
    /// Strokes outside the new bounds are clipped, not discarded; growing the
    /// surface again reveals them.
    ///
    /// # Errors
    ///
    /// Returns an error if the new surface cannot be allocated. The old
    /// surface is kept in that case.
    pub fn resize(&mut self, width: u32, height: u32, strokes: &StrokeStore) -> RenderResult<()> {
        self.pixmap = allocate(width, height)?;
        self.context = DrawContext::freehand(self.config.anti_aliasing);
        self.repaint(strokes);
        tracing::debug!("Resized canvas surface to {}x{}", width, height);
        Ok(())
    }

    /// React to a session event.
    ///
    /// `live` is the stroke currently being captured, repainted on top after a
    /// full redraw so it is not lost.
    pub fn apply(
        &mut self,
        event: &SessionEvent,
        strokes: &StrokeStore,
        live: Option<&InProgressStroke>,
    ) {
        match event {
            SessionEvent::SegmentAppended(segment) => self.append_segment(segment),
            SessionEvent::RepaintRequested => {
                self.repaint(strokes);
                if let Some(live) = live {
                    self.paint_in_progress(live);
                }
            }
            _ => {}
        }
    }

    /// Encode the surface as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        export::encode_png(&self.pixmap, self.config.snapshot_background)
    }

    /// Encode the surface as a `data:image/png;base64,` URL.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_data_url(&self) -> RenderResult<String> {
        Ok(export::png_data_url(&self.encode_png()?))
    }

    /// Alpha of the pixel at `(x, y)`, or `None` if out of bounds.
    #[must_use]
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixmap.pixel(x, y).map(|p| p.alpha())
    }

    /// Number of non-transparent pixels on the surface.
    #[must_use]
    pub fn painted_pixels(&self) -> usize {
        let pixels = self.pixmap.pixels();
        pixels.iter().filter(|p| p.alpha() > 0).count()
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Number of full repaints performed.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl CanvasSnapshot for CanvasRenderer {
    fn encode_data_url(&self) -> CalcResult<String> {
        Ok(self.to_data_url()?)
    }
}

fn allocate(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| RenderError::Surface(format!("Failed to create {width}x{height} pixmap")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkcalc_core::{BrushState, HistoryStack, Point, StrokeCaptureEngine, ToolMode};

    fn store_with(points: &[Point], brush: &BrushState) -> StrokeStore {
        let mut store = StrokeStore::new();
        let mut history = HistoryStack::new();
        let mut capture = StrokeCaptureEngine::new();
        capture.begin(points[0], brush);
        for p in &points[1..] {
            capture.extend(*p);
        }
        capture.commit(&mut store, &mut history);
        store
    }

    fn horizontal_line() -> Vec<Point> {
        vec![
            Point::new(10.0, 50.0),
            Point::new(50.0, 50.0),
            Point::new(90.0, 50.0),
        ]
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let renderer = CanvasRenderer::new(100, 100, RendererConfig::default()).unwrap();
        assert_eq!(renderer.painted_pixels(), 0);
        assert_eq!(renderer.frame_count(), 0);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let renderer = CanvasRenderer::new(0, 0, RendererConfig::default()).unwrap();
        assert_eq!(renderer.width(), 1);
        assert_eq!(renderer.height(), 1);
    }

    #[test]
    fn test_repaint_draws_strokes() {
        let mut brush = BrushState::default();
        brush.set_width(6.0).unwrap();
        let store = store_with(&horizontal_line(), &brush);

        let mut renderer = CanvasRenderer::new(100, 100, RendererConfig::default()).unwrap();
        renderer.repaint(&store);

        assert_eq!(renderer.alpha_at(50, 50), Some(255));
        assert_eq!(renderer.alpha_at(50, 10), Some(0));
        assert_eq!(renderer.frame_count(), 1);
    }

    #[test]
    fn test_single_point_renders_dot() {
        let mut brush = BrushState::default();
        brush.set_width(10.0).unwrap();
        let store = store_with(&[Point::new(40.0, 40.0)], &brush);

        let mut renderer = CanvasRenderer::new(80, 80, RendererConfig::default()).unwrap();
        renderer.repaint(&store);

        assert_eq!(renderer.alpha_at(40, 40), Some(255));
        assert!(renderer.painted_pixels() > 0);
    }

    #[test]
    fn test_erase_clears_to_transparent() {
        let mut brush = BrushState::default();
        brush.set_width(6.0).unwrap();
        let mut store = store_with(&horizontal_line(), &brush);

        brush.set_mode(ToolMode::Erase);
        brush.set_width(12.0).unwrap();
        let erase = store_with(&horizontal_line(), &brush);
        store = StrokeStore::from_strokes(store.iter().chain(erase.iter()).cloned().collect());

        let mut renderer = CanvasRenderer::new(100, 100, RendererConfig::default()).unwrap();
        renderer.repaint(&store);

        assert_eq!(renderer.alpha_at(50, 50), Some(0));
        assert_eq!(renderer.painted_pixels(), 0);
    }

    #[test]
    fn test_append_segment_paints_incrementally() {
        let brush = BrushState::default();
        let mut capture = StrokeCaptureEngine::new();
        capture.begin(Point::new(10.0, 20.0), &brush);
        let segment = capture.extend(Point::new(60.0, 20.0)).unwrap();

        let mut renderer = CanvasRenderer::new(100, 100, RendererConfig::default()).unwrap();
        renderer.append_segment(&segment);

        assert!(renderer.alpha_at(35, 20).unwrap() > 0);
        assert_eq!(renderer.frame_count(), 0);
    }

    #[test]
    fn test_apply_repaint_keeps_live_stroke() {
        let brush = BrushState::default();
        let mut capture = StrokeCaptureEngine::new();
        capture.begin(Point::new(10.0, 20.0), &brush);
        capture.extend(Point::new(60.0, 20.0));

        let mut renderer = CanvasRenderer::new(100, 100, RendererConfig::default()).unwrap();
        renderer.apply(
            &SessionEvent::RepaintRequested,
            &StrokeStore::new(),
            capture.in_progress(),
        );

        assert!(renderer.alpha_at(35, 20).unwrap() > 0);
        assert_eq!(renderer.frame_count(), 1);
    }

    #[test]
    fn test_apply_paints_opening_dot() {
        let mut brush = BrushState::default();
        brush.set_width(10.0).unwrap();
        let mut capture = StrokeCaptureEngine::new();
        let dot = capture.begin(Point::new(50.0, 50.0), &brush).unwrap();

        let mut renderer = CanvasRenderer::new(100, 100, RendererConfig::default()).unwrap();
        renderer.apply(
            &SessionEvent::SegmentAppended(dot),
            &StrokeStore::new(),
            capture.in_progress(),
        );

        assert_eq!(renderer.alpha_at(50, 50), Some(255));
        assert_eq!(renderer.alpha_at(50, 60), Some(0));
    }

    #[test]
    fn test_snapshot_data_url() {
        let renderer = CanvasRenderer::new(16, 16, RendererConfig::default()).unwrap();
        let url = renderer.encode_data_url().unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));
        assert!(url.len() > PNG_DATA_URL_PREFIX.len());
    }
}
