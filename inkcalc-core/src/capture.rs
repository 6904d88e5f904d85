//! Turns pointer sequences into committed strokes.

use crate::{
    BrushState, HistoryEntry, HistoryStack, Point, Rgba, Stroke, StrokeId, StrokeStore, ToolMode,
};

/// A straight piece of the live stroke, painted incrementally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Previous point.
    pub from: Point,
    /// Newly appended point.
    pub to: Point,
    /// Color captured when the stroke began.
    pub color: Rgba,
    /// Width captured when the stroke began.
    pub width: f32,
    /// Tool captured when the stroke began.
    pub tool: ToolMode,
}

/// The stroke currently being drawn.
///
/// Brush settings are copied at `begin`, so changing the brush mid-stroke has
/// no effect on it.
#[derive(Debug, Clone, PartialEq)]
pub struct InProgressStroke {
    points: Vec<Point>,
    color: Rgba,
    width: f32,
    tool: ToolMode,
}

impl InProgressStroke {
    /// Points captured so far.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Color captured at begin.
    #[must_use]
    pub const fn color(&self) -> Rgba {
        self.color
    }

    /// Width captured at begin.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Tool captured at begin.
    #[must_use]
    pub const fn tool(&self) -> ToolMode {
        self.tool
    }
}

/// Capture state machine: idle, or drawing one stroke.
#[derive(Debug, Clone, Default)]
pub struct StrokeCaptureEngine {
    current: Option<InProgressStroke>,
}

impl StrokeCaptureEngine {
    /// Create an idle engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stroke at `point` with the current brush.
    ///
    /// Returns a zero-length segment at `point` so the host can paint the
    /// initial dot, or `None` (doing nothing) if a stroke is already in
    /// progress.
    pub fn begin(&mut self, point: Point, brush: &BrushState) -> Option<Segment> {
        if self.current.is_some() {
            tracing::debug!("begin ignored: stroke already in progress");
            return None;
        }
        let live = InProgressStroke {
            points: vec![point],
            color: brush.color(),
            width: brush.width(),
            tool: brush.mode(),
        };
        let dot = Segment {
            from: point,
            to: point,
            color: live.color,
            width: live.width,
            tool: live.tool,
        };
        self.current = Some(live);
        Some(dot)
    }

    /// Append a point to the live stroke.
    ///
    /// Returns the new segment for incremental painting, or `None` if idle.
    pub fn extend(&mut self, point: Point) -> Option<Segment> {
        let current = self.current.as_mut()?;
        let from = current.points.last().copied().unwrap_or(point);
        current.points.push(point);
        Some(Segment {
            from,
            to: point,
            color: current.color,
            width: current.width,
            tool: current.tool,
        })
    }

    /// Finalize the live stroke into `store` and record it in `history`.
    ///
    /// Returns the new stroke's id, or `None` if idle.
    pub fn commit(
        &mut self,
        store: &mut StrokeStore,
        history: &mut HistoryStack,
    ) -> Option<StrokeId> {
        let live = self.current.take()?;
        let stroke = Stroke::new(live.points, live.color, live.width, live.tool);
        let id = stroke.id();
        tracing::debug!(
            "Committed stroke {id} ({} points, {:?})",
            stroke.points().len(),
            stroke.tool()
        );
        store.insert(stroke.clone());
        history.push(HistoryEntry::StrokeAdded(stroke));
        Some(id)
    }

    /// Discard the live stroke without touching store or history.
    pub fn cancel(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("Live stroke cancelled");
        }
    }

    /// Check if a stroke is being drawn.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    /// The live stroke, if any.
    #[must_use]
    pub fn in_progress(&self) -> Option<&InProgressStroke> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_extend_commit() {
        let mut engine = StrokeCaptureEngine::new();
        let mut store = StrokeStore::new();
        let mut history = HistoryStack::new();
        let brush = BrushState::default();

        let dot = engine.begin(Point::new(1.0, 1.0), &brush).expect("dot");
        assert_eq!(dot.from, dot.to);
        let seg = engine.extend(Point::new(2.0, 3.0)).expect("segment");
        assert_eq!(seg.from, Point::new(1.0, 1.0));
        assert_eq!(seg.to, Point::new(2.0, 3.0));

        let id = engine.commit(&mut store, &mut history).expect("committed");
        assert!(!engine.is_drawing());
        let stroke = store.get(id).expect("in store");
        assert_eq!(stroke.points().len(), 2);
        assert!(history.can_undo());
    }

    #[test]
    fn test_begin_while_drawing_is_noop() {
        let mut engine = StrokeCaptureEngine::new();
        let brush = BrushState::default();
        assert!(engine.begin(Point::new(1.0, 1.0), &brush).is_some());
        assert!(engine.begin(Point::new(50.0, 50.0), &brush).is_none());
        let live = engine.in_progress().expect("live");
        assert_eq!(live.points(), &[Point::new(1.0, 1.0)]);
    }

    #[test]
    fn test_idle_operations_are_noops() {
        let mut engine = StrokeCaptureEngine::new();
        let mut store = StrokeStore::new();
        let mut history = HistoryStack::new();
        assert!(engine.extend(Point::new(1.0, 1.0)).is_none());
        assert!(engine.commit(&mut store, &mut history).is_none());
        assert!(store.is_empty());
        assert!(history.is_empty());
    }

    #[test]
    fn test_cancel_leaves_store_and_history() {
        let mut engine = StrokeCaptureEngine::new();
        let mut store = StrokeStore::new();
        let mut history = HistoryStack::new();
        engine.begin(Point::new(1.0, 1.0), &BrushState::default());
        engine.extend(Point::new(5.0, 5.0));
        engine.cancel();
        assert!(!engine.is_drawing());
        assert!(engine.commit(&mut store, &mut history).is_none());
        assert!(store.is_empty());
        assert!(history.is_empty());
    }

    #[test]
    fn test_brush_change_mid_stroke_not_applied() {
        let mut engine = StrokeCaptureEngine::new();
        let mut store = StrokeStore::new();
        let mut history = HistoryStack::new();
        let mut brush = BrushState::default();

        engine.begin(Point::new(0.0, 0.0), &brush);
        brush.set_color(Rgba::rgb(255, 0, 0));
        brush.set_mode(ToolMode::Erase);
        let seg = engine.extend(Point::new(4.0, 4.0)).expect("segment");
        assert_eq!(seg.color, Rgba::WHITE);
        assert_eq!(seg.tool, ToolMode::Draw);

        let id = engine.commit(&mut store, &mut history).expect("committed");
        let stroke = store.get(id).expect("stroke");
        assert_eq!(stroke.color(), Rgba::WHITE);
        assert_eq!(stroke.tool(), ToolMode::Draw);
    }

    #[test]
    fn test_commit_truncates_redo_tail() {
        let mut engine = StrokeCaptureEngine::new();
        let mut store = StrokeStore::new();
        let mut history = HistoryStack::new();
        let brush = BrushState::default();

        engine.begin(Point::new(0.0, 0.0), &brush);
        engine.commit(&mut store, &mut history);
        history.undo(&mut store).expect("undo");
        assert!(history.can_redo());

        engine.begin(Point::new(9.0, 9.0), &brush);
        engine.commit(&mut store, &mut history);
        assert!(!history.can_redo());
        assert_eq!(store.len(), 1);
    }
}
