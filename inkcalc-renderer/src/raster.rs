//! Stroke rasterization onto a tiny-skia pixmap.
//!
//! Draw strokes paint with their color. Erase strokes use
//! [`BlendMode::Clear`] over the stroked outline so the pixels underneath
//! become fully transparent rather than painted over.

use inkcalc_core::{InProgressStroke, Point, Rgba, Segment, Stroke, ToolMode};
use tiny_skia::{BlendMode, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

/// Drawing-context settings, re-established whenever the surface is recreated.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext {
    /// Cap applied to stroke ends.
    pub line_cap: LineCap,
    /// Join applied between segments.
    pub line_join: LineJoin,
    /// Whether edges are anti-aliased.
    pub anti_alias: bool,
}

impl DrawContext {
    /// Round caps and joins, as freehand ink expects.
    #[must_use]
    pub fn freehand(anti_alias: bool) -> Self {
        Self {
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            anti_alias,
        }
    }
}

/// Style shared by committed strokes, live strokes and single segments.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ink {
    pub color: Rgba,
    pub width: f32,
    pub tool: ToolMode,
}

impl From<&Stroke> for Ink {
    fn from(stroke: &Stroke) -> Self {
        Self {
            color: stroke.color(),
            width: stroke.width(),
            tool: stroke.tool(),
        }
    }
}

impl From<&InProgressStroke> for Ink {
    fn from(stroke: &InProgressStroke) -> Self {
        Self {
            color: stroke.color(),
            width: stroke.width(),
            tool: stroke.tool(),
        }
    }
}

impl From<&Segment> for Ink {
    fn from(segment: &Segment) -> Self {
        Self {
            color: segment.color,
            width: segment.width,
            tool: segment.tool,
        }
    }
}

fn paint_for(ink: Ink, ctx: &DrawContext) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.anti_alias = ctx.anti_alias;
    match ink.tool {
        ToolMode::Draw => {
            paint.set_color_rgba8(ink.color.r, ink.color.g, ink.color.b, ink.color.a);
        }
        ToolMode::Erase => {
            paint.set_color_rgba8(0, 0, 0, 255);
            paint.blend_mode = BlendMode::Clear;
        }
    }
    paint
}

/// Paint a polyline. A path that never leaves its first point renders as a dot.
pub(crate) fn paint_points(pixmap: &mut Pixmap, ctx: &DrawContext, points: &[Point], ink: Ink) {
    let Some(&first) = points.first() else {
        return;
    };
    let paint = paint_for(ink, ctx);

    if points.iter().all(|p| *p == first) {
        let Some(dot) = PathBuilder::from_circle(first.x, first.y, ink.width / 2.0) else {
            return;
        };
        pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        return;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in &points[1..] {
        pb.line_to(p.x, p.y);
    }
    let Some(path) = pb.finish() else {
        tracing::trace!("Skipping degenerate path with {} points", points.len());
        return;
    };

    let stroke = tiny_skia::Stroke {
        width: ink.width,
        line_cap: ctx.line_cap,
        line_join: ctx.line_join,
        ..tiny_skia::Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Paint one committed stroke.
pub(crate) fn paint_stroke(pixmap: &mut Pixmap, ctx: &DrawContext, stroke: &Stroke) {
    paint_points(pixmap, ctx, stroke.points(), Ink::from(stroke));
}

/// Paint one live-stroke segment.
pub(crate) fn paint_segment(pixmap: &mut Pixmap, ctx: &DrawContext, segment: &Segment) {
    paint_points(pixmap, ctx, &[segment.from, segment.to], Ink::from(segment));
}
