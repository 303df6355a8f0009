//! Per-kind drawing strategies.
//!
//! Each chart kind decides where a bucket starts and ends in pixels, how far
//! the tooltip is pushed sideways, and which primitives represent a series.

use strata_core::{Brush, Color, Paint, PatternId, Point, Primitive, Rect, StrokeStyle};

use crate::config::{ChartKind, ChartOptions, OneDimensionStroke};
use crate::interpolate::monotone_smooth;
use crate::interval_set::SelectionInterval;
use crate::scale::{LinearScale, Scale};

/// Series colors, cycled by series index.
pub const PALETTE: [Color; 6] = [
    Color::rgba(0.35, 0.65, 1.0, 0.85),
    Color::rgba(1.0, 0.62, 0.26, 0.85),
    Color::rgba(0.42, 0.82, 0.52, 0.85),
    Color::rgba(0.93, 0.38, 0.48, 0.85),
    Color::rgba(0.70, 0.52, 0.95, 0.85),
    Color::rgba(0.95, 0.85, 0.35, 0.85),
];

pub fn series_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// How a bucket relates to the selections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkSelection {
    #[default]
    None,
    /// Inside the in-progress selection.
    Current,
    /// Inside a committed selection.
    Committed,
}

/// One bucket resolved to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BucketMark {
    pub key: f64,
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
    pub selection: MarkSelection,
}

/// Paint inputs for one series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesPaint {
    pub color: Color,
    pub highlight: Color,
    /// Stripe pattern for committed selections.
    pub committed: Option<PatternId>,
    pub plot: Rect,
}

impl SeriesPaint {
    fn brush_for(&self, selection: MarkSelection) -> Brush {
        match selection {
            MarkSelection::None => Brush::Solid(self.color),
            MarkSelection::Current => Brush::Solid(self.highlight),
            MarkSelection::Committed => match self.committed {
                Some(id) => Brush::Pattern(id),
                None => Brush::Solid(self.highlight),
            },
        }
    }
}

pub trait ChartStrategy {
    fn kind(&self) -> ChartKind;

    fn start_position(&self, key: f64, x: &Scale, bucket_width: f64) -> f64;

    fn end_position(&self, key: f64, x: &Scale, bucket_width: f64) -> f64;

    fn tooltip_x_offset(&self, x: &Scale, bucket_width: f64) -> f64;

    fn plot_chart(
        &self,
        marks: &[BucketMark],
        y: &LinearScale,
        paint: &SeriesPaint,
    ) -> Vec<Primitive>;
}

/// Resolve sorted `(keys, values)` to marks, flagging selected buckets.
pub fn bucket_marks(
    strategy: &dyn ChartStrategy,
    keys: &[f64],
    values: &[f64],
    x: &Scale,
    bucket_width: f64,
    current: Option<SelectionInterval>,
    committed: &[SelectionInterval],
) -> Vec<BucketMark> {
    keys.iter()
        .zip(values)
        .map(|(&key, &value)| {
            let end = key + bucket_width;
            let selection = if current.is_some_and(|c| c.covers(key, end)) {
                MarkSelection::Current
            } else if committed.iter().any(|c| c.covers(key, end)) {
                MarkSelection::Committed
            } else {
                MarkSelection::None
            };
            BucketMark {
                key,
                value,
                x0: strategy.start_position(key, x, bucket_width),
                x1: strategy.end_position(key, x, bucket_width),
                selection,
            }
        })
        .collect()
}

/// Pixel row of the value baseline (zero when visible, else the domain floor).
pub fn baseline_px(y: &LinearScale) -> f64 {
    let d = y.domain();
    let base = if d.contains(0.0) {
        0.0
    } else {
        d.min.max(d.max.min(0.0))
    };
    y.map(base)
}

pub struct BarsStrategy {
    pub bar_weight: f64,
}

impl ChartStrategy for BarsStrategy {
    fn kind(&self) -> ChartKind {
        ChartKind::Bars
    }

    fn start_position(&self, key: f64, x: &Scale, bucket_width: f64) -> f64 {
        let (a, b) = x.bucket_span(key, bucket_width);
        a + (b - a) * (1.0 - self.bar_weight) * 0.5
    }

    fn end_position(&self, key: f64, x: &Scale, bucket_width: f64) -> f64 {
        let (a, b) = x.bucket_span(key, bucket_width);
        self.start_position(key, x, bucket_width) + (b - a) * self.bar_weight
    }

    fn tooltip_x_offset(&self, x: &Scale, bucket_width: f64) -> f64 {
        let step = match x.step_width() {
            Some(step) => step,
            None => {
                let (a, b) = x.bucket_span(x.domain().min, bucket_width);
                b - a
            }
        };
        step * self.bar_weight * 0.5
    }

    fn plot_chart(
        &self,
        marks: &[BucketMark],
        y: &LinearScale,
        paint: &SeriesPaint,
    ) -> Vec<Primitive> {
        let base = baseline_px(y);
        marks
            .iter()
            .map(|m| {
                let top = y.map(m.value);
                Primitive::Rect {
                    rect: Rect::new(m.x0, top.min(base), m.x1 - m.x0, (base - top).abs()),
                    paint: Paint::fill(paint.brush_for(m.selection)),
                }
            })
            .collect()
    }
}

pub struct AreaStrategy;

impl ChartStrategy for AreaStrategy {
    fn kind(&self) -> ChartKind {
        ChartKind::Area
    }

    fn start_position(&self, key: f64, x: &Scale, _bucket_width: f64) -> f64 {
        x.map(key)
    }

    fn end_position(&self, key: f64, x: &Scale, bucket_width: f64) -> f64 {
        x.map(key + bucket_width)
    }

    fn tooltip_x_offset(&self, _x: &Scale, _bucket_width: f64) -> f64 {
        0.0
    }

    fn plot_chart(
        &self,
        marks: &[BucketMark],
        y: &LinearScale,
        paint: &SeriesPaint,
    ) -> Vec<Primitive> {
        let (Some(first), Some(last)) = (marks.first(), marks.last()) else {
            return Vec::new();
        };
        let base = baseline_px(y);
        let mut outline = Vec::with_capacity(marks.len() * 2 + 2);
        outline.push(Point::new(first.x0, base));
        for m in marks {
            let top = y.map(m.value);
            outline.push(Point::new(m.x0, top));
            outline.push(Point::new(m.x1, top));
        }
        outline.push(Point::new(last.x1, base));

        let mut out = vec![Primitive::Path {
            points: outline,
            closed: true,
            paint: Paint::fill(paint.color.with_alpha(0.35)).with_stroke(paint.color, 1.5),
        }];
        for m in marks.iter().filter(|m| m.selection != MarkSelection::None) {
            let top = y.map(m.value);
            out.push(Primitive::Rect {
                rect: Rect::new(m.x0, top.min(base), m.x1 - m.x0, (base - top).abs()),
                paint: Paint::fill(paint.brush_for(m.selection)),
            });
        }
        out
    }
}

pub struct CurveStrategy {
    pub smoothed: bool,
}

impl ChartStrategy for CurveStrategy {
    fn kind(&self) -> ChartKind {
        ChartKind::Curve
    }

    fn start_position(&self, key: f64, x: &Scale, _bucket_width: f64) -> f64 {
        x.map(key)
    }

    fn end_position(&self, key: f64, x: &Scale, bucket_width: f64) -> f64 {
        x.map(key + bucket_width)
    }

    fn tooltip_x_offset(&self, _x: &Scale, _bucket_width: f64) -> f64 {
        0.0
    }

    fn plot_chart(
        &self,
        marks: &[BucketMark],
        y: &LinearScale,
        paint: &SeriesPaint,
    ) -> Vec<Primitive> {
        if marks.is_empty() {
            return Vec::new();
        }
        let points: Vec<Point> = marks
            .iter()
            .map(|m| Point::new((m.x0 + m.x1) * 0.5, y.map(m.value)))
            .collect();
        let line = if self.smoothed {
            monotone_smooth(&points)
        } else {
            points.clone()
        };

        let mut out = vec![Primitive::Path {
            points: line,
            closed: false,
            paint: Paint::stroke(paint.color, 2.0),
        }];
        for (m, p) in marks.iter().zip(&points) {
            if m.selection != MarkSelection::None {
                out.push(Primitive::Circle {
                    center: *p,
                    radius: 3.0,
                    paint: Paint::fill(paint.brush_for(m.selection)),
                });
            }
        }
        out
    }
}

pub struct OneDimensionStrategy {
    pub stroke: OneDimensionStroke,
}

impl OneDimensionStrategy {
    fn stroke_width(&self, x: &Scale, bucket_width: f64) -> f64 {
        let (a, b) = x.bucket_span(x.domain().min, bucket_width);
        self.stroke.width_for((b - a).abs())
    }
}

impl ChartStrategy for OneDimensionStrategy {
    fn kind(&self) -> ChartKind {
        ChartKind::OneDimension
    }

    fn start_position(&self, key: f64, x: &Scale, bucket_width: f64) -> f64 {
        let (a, b) = x.bucket_span(key, bucket_width);
        (a + b) * 0.5 - self.stroke_width(x, bucket_width) * 0.5
    }

    fn end_position(&self, key: f64, x: &Scale, bucket_width: f64) -> f64 {
        self.start_position(key, x, bucket_width) + self.stroke_width(x, bucket_width)
    }

    fn tooltip_x_offset(&self, x: &Scale, bucket_width: f64) -> f64 {
        self.stroke_width(x, bucket_width) * 0.5
    }

    /// One vertical stroke per bucket across the plot; opacity follows value.
    fn plot_chart(
        &self,
        marks: &[BucketMark],
        y: &LinearScale,
        paint: &SeriesPaint,
    ) -> Vec<Primitive> {
        let d = y.domain();
        let span = d.span();
        marks
            .iter()
            .map(|m| {
                let t = if span > 0.0 {
                    ((m.value - d.min) / span).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let color = match m.selection {
                    MarkSelection::None => paint.color.with_alpha(0.15 + 0.85 * t as f32),
                    _ => paint.highlight,
                };
                let cx = (m.x0 + m.x1) * 0.5;
                Primitive::Line {
                    from: Point::new(cx, paint.plot.y()),
                    to: Point::new(cx, paint.plot.bottom()),
                    stroke: StrokeStyle::new(color, m.x1 - m.x0),
                }
            })
            .collect()
    }
}

/// Strategy for a configured chart kind. Swimlanes lay out buckets like bars.
pub fn strategy_for(options: &ChartOptions) -> Box<dyn ChartStrategy> {
    match options.chart_kind {
        ChartKind::Bars | ChartKind::Swimlane => Box::new(BarsStrategy {
            bar_weight: options.bar_weight,
        }),
        ChartKind::Area => Box::new(AreaStrategy),
        ChartKind::Curve => Box::new(CurveStrategy {
            smoothed: options.is_smoothed_curve,
        }),
        ChartKind::OneDimension => Box::new(OneDimensionStrategy {
            stroke: options.one_dimension_stroke,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::BandScale;

    fn band15() -> Scale {
        let keys: Vec<f64> = (0..15).map(f64::from).collect();
        Scale::Band(BandScale::new(keys, 0.0, 500.0, 1.0))
    }

    fn paint() -> SeriesPaint {
        SeriesPaint {
            color: series_color(0),
            highlight: Color::WHITE,
            committed: Some(PatternId(7)),
            plot: Rect::new(0.0, 0.0, 500.0, 100.0),
        }
    }

    #[test]
    fn bars_are_centered_in_their_band() {
        let s = band15();
        let bars = BarsStrategy { bar_weight: 0.6 };
        let step = 500.0 / 15.0;
        let x0 = bars.start_position(2.0, &s, 1.0);
        let x1 = bars.end_position(2.0, &s, 1.0);
        assert!((x0 - (2.0 * step + 0.2 * step)).abs() < 1e-9);
        assert!((x1 - x0 - 0.6 * step).abs() < 1e-9);
        assert!((bars.tooltip_x_offset(&s, 1.0) - 0.3 * step).abs() < 1e-9);
    }

    #[test]
    fn marks_flag_current_before_committed() {
        let s = band15();
        let bars = BarsStrategy { bar_weight: 0.6 };
        let keys = [0.0, 1.0, 2.0, 3.0];
        let values = [1.0, 2.0, 3.0, 4.0];
        let marks = bucket_marks(
            &bars,
            &keys,
            &values,
            &s,
            1.0,
            Some(SelectionInterval::new(0.0, 2.0)),
            &[SelectionInterval::new(1.0, 4.0)],
        );
        let flags: Vec<_> = marks.iter().map(|m| m.selection).collect();
        assert_eq!(
            flags,
            vec![
                MarkSelection::Current,
                MarkSelection::Current,
                MarkSelection::Committed,
                MarkSelection::Committed,
            ]
        );
    }

    #[test]
    fn committed_bars_use_the_pattern() {
        let s = band15();
        let bars = BarsStrategy { bar_weight: 0.6 };
        let y = LinearScale::new(0.0, 10.0, 100.0, 0.0);
        let marks = bucket_marks(
            &bars,
            &[0.0],
            &[5.0],
            &s,
            1.0,
            None,
            &[SelectionInterval::new(0.0, 1.0)],
        );
        let prims = bars.plot_chart(&marks, &y, &paint());
        match &prims[0] {
            Primitive::Rect { rect, paint } => {
                assert_eq!(paint.fill, Some(Brush::Pattern(PatternId(7))));
                assert!((rect.height() - 50.0).abs() < 1e-9);
                assert!((rect.y() - 50.0).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn area_path_closes_on_baseline() {
        let s = Scale::Linear(LinearScale::new(0.0, 3.0, 0.0, 300.0));
        let y = LinearScale::new(0.0, 10.0, 100.0, 0.0);
        let area = AreaStrategy;
        let marks = bucket_marks(&area, &[0.0, 1.0, 2.0], &[1.0, 5.0, 2.0], &s, 1.0, None, &[]);
        let prims = area.plot_chart(&marks, &y, &paint());
        assert_eq!(prims.len(), 1);
        let Primitive::Path { points, closed, .. } = &prims[0] else {
            panic!("expected path");
        };
        assert!(*closed);
        assert_eq!(points.first(), Some(&Point::new(0.0, 100.0)));
        assert_eq!(points.last(), Some(&Point::new(300.0, 100.0)));
    }

    #[test]
    fn smoothed_curve_has_more_points() {
        let s = Scale::Linear(LinearScale::new(0.0, 4.0, 0.0, 400.0));
        let y = LinearScale::new(0.0, 10.0, 100.0, 0.0);
        let keys = [0.0, 1.0, 2.0, 3.0];
        let values = [1.0, 5.0, 2.0, 8.0];
        let plain = CurveStrategy { smoothed: false };
        let smooth = CurveStrategy { smoothed: true };
        let marks = bucket_marks(&plain, &keys, &values, &s, 1.0, None, &[]);
        let count = |prims: Vec<Primitive>| match &prims[0] {
            Primitive::Path { points, .. } => points.len(),
            _ => 0,
        };
        assert_eq!(count(plain.plot_chart(&marks, &y, &paint())), 4);
        assert!(count(smooth.plot_chart(&marks, &y, &paint())) > 4);
    }

    #[test]
    fn one_dimension_stroke_follows_bucket_width() {
        let s = Scale::Linear(LinearScale::new(0.0, 10.0, 0.0, 1000.0));
        let od = OneDimensionStrategy {
            stroke: OneDimensionStroke::default(),
        };
        // 100px buckets -> 1 + log10(100) = 3px.
        assert!((od.tooltip_x_offset(&s, 1.0) - 1.5).abs() < 1e-9);
        let x0 = od.start_position(0.0, &s, 1.0);
        assert!((x0 - 48.5).abs() < 1e-9);
    }
}
