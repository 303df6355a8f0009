//! Swimlane rows: label column, per-lane value ranges and bucket cells.

use strata_core::{Brush, Color, Paint, PatternId, Primitive, Rect, Size};

use crate::config::{ChartOptions, SwimlaneRepresentation};
use crate::data::SwimlaneCollection;
use crate::interval_set::SelectionInterval;
use crate::scale::{value_extent, Scale};
use crate::strategy::{series_color, MarkSelection};
use crate::view::Domain1D;

/// Width of the lane label column for a chart of `size`.
pub fn label_column_width(options: &ChartOptions, size: Size) -> f64 {
    let w = options
        .swimlane_labels_width
        .unwrap_or(size.width * options.swimlane_labels_fraction);
    w.clamp(0.0, size.width.max(0.0))
}

/// One laid-out lane.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneLayout {
    pub name: String,
    pub index: usize,
    /// Row inside the plot area.
    pub row: Rect,
    /// Label cell inside the label column.
    pub label_cell: Rect,
    pub keys: Vec<f64>,
    pub values: Vec<f64>,
    /// Range used to turn values into intensities.
    pub value_domain: Domain1D,
}

impl LaneLayout {
    pub fn intensity(&self, value: f64) -> f64 {
        let d = self.value_domain;
        if d.span() <= 0.0 {
            return 1.0;
        }
        ((value - d.min) / d.span()).clamp(0.0, 1.0)
    }
}

fn lane_domain(lo: f64, hi: f64) -> Domain1D {
    let d = value_extent(lo.min(0.0), hi);
    if d.span() > 0.0 {
        d
    } else {
        Domain1D::new(0.0, 1.0)
    }
}

/// Value range per lane: its own (`Column`) or the shared one (`Global`).
pub fn lane_value_domains(
    lanes: &SwimlaneCollection,
    representation: SwimlaneRepresentation,
) -> Vec<Domain1D> {
    let extents: Vec<Option<(f64, f64)>> =
        lanes.iter().map(|(_, s)| s.value_extent()).collect();
    match representation {
        SwimlaneRepresentation::Column => extents
            .iter()
            .map(|e| match e {
                Some((lo, hi)) => lane_domain(*lo, *hi),
                None => Domain1D::new(0.0, 1.0),
            })
            .collect(),
        SwimlaneRepresentation::Global => {
            let shared = extents
                .iter()
                .flatten()
                .copied()
                .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
                .map(|(lo, hi)| lane_domain(lo, hi))
                .unwrap_or(Domain1D::new(0.0, 1.0));
            vec![shared; extents.len()]
        }
    }
}

/// Split `plot` into one row per lane, with matching label cells to its left.
pub fn layout_lanes(
    lanes: &SwimlaneCollection,
    representation: SwimlaneRepresentation,
    plot: Rect,
    label_column: f64,
) -> Vec<LaneLayout> {
    let n = lanes.len();
    if n == 0 {
        return Vec::new();
    }
    let row_h = plot.height() / n as f64;
    let domains = lane_value_domains(lanes, representation);
    lanes
        .iter()
        .zip(domains)
        .enumerate()
        .map(|(index, ((name, series), value_domain))| {
            let y = plot.y() + row_h * index as f64;
            LaneLayout {
                name: name.to_string(),
                index,
                row: Rect::new(plot.x(), y, plot.width(), row_h),
                label_cell: Rect::new(plot.x() - label_column, y, label_column, row_h),
                keys: series.keys.clone(),
                values: series.values.clone(),
                value_domain,
            }
        })
        .collect()
}

/// Lane whose row (or label cell) covers `y`.
pub fn lane_at(lanes: &[LaneLayout], y: f64) -> Option<&LaneLayout> {
    lanes
        .iter()
        .find(|l| y >= l.row.y() && y < l.row.bottom())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LanePaint {
    pub highlight: Color,
    pub committed: Option<PatternId>,
    /// Dim the lane when other lanes are selected.
    pub dimmed: bool,
}

/// Bucket cells of one lane, tinted by intensity.
pub fn lane_primitives(
    lane: &LaneLayout,
    x: &Scale,
    bucket_width: f64,
    current: Option<SelectionInterval>,
    committed: &[SelectionInterval],
    paint: &LanePaint,
) -> Vec<Primitive> {
    let base = series_color(lane.index);
    let cell = lane.row.inset(0.0, 1.0);
    lane.keys
        .iter()
        .zip(&lane.values)
        .map(|(&key, &value)| {
            let (x0, x1) = x.bucket_span(key, bucket_width);
            let end = key + bucket_width;
            let selection = if current.is_some_and(|c| c.covers(key, end)) {
                MarkSelection::Current
            } else if committed.iter().any(|c| c.covers(key, end)) {
                MarkSelection::Committed
            } else {
                MarkSelection::None
            };
            let alpha = (0.15 + 0.85 * lane.intensity(value)) as f32;
            let alpha = if paint.dimmed { alpha * 0.35 } else { alpha };
            let brush = match (selection, paint.committed) {
                (MarkSelection::Current, _) => Brush::Solid(paint.highlight),
                (MarkSelection::Committed, Some(id)) => Brush::Pattern(id),
                (MarkSelection::Committed, None) => Brush::Solid(paint.highlight),
                (MarkSelection::None, _) => Brush::Solid(base.with_alpha(alpha)),
            };
            Primitive::Rect {
                rect: Rect::from_x_span(x0, x1, cell.y(), cell.height()),
                paint: Paint::fill(brush),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataPoint;
    use crate::scale::LinearScale;

    fn lanes() -> SwimlaneCollection {
        let pts = |kv: &[(f64, f64)]| -> Vec<DataPoint> {
            kv.iter().map(|&(k, v)| DataPoint::new(k, v)).collect()
        };
        vec![
            ("a", pts(&[(0.0, 1.0), (1.0, 2.0)])),
            ("b", pts(&[(0.0, 10.0), (2.0, 40.0), (3.0, 20.0)])),
            ("c", pts(&[(5.0, 3.0)])),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn label_column_prefers_explicit_width() {
        let mut o = ChartOptions::default();
        assert_eq!(label_column_width(&o, Size::new(500.0, 100.0)), 100.0);
        o.swimlane_labels_width = Some(80.0);
        assert_eq!(label_column_width(&o, Size::new(500.0, 100.0)), 80.0);
    }

    #[test]
    fn column_domains_are_per_lane() {
        let d = lane_value_domains(&lanes(), SwimlaneRepresentation::Column);
        assert_eq!(d[0], Domain1D::new(0.0, 2.0));
        assert_eq!(d[1], Domain1D::new(0.0, 40.0));
    }

    #[test]
    fn global_domain_is_shared() {
        let d = lane_value_domains(&lanes(), SwimlaneRepresentation::Global);
        assert!(d.iter().all(|x| *x == Domain1D::new(0.0, 40.0)));
    }

    #[test]
    fn rows_split_the_plot() {
        let plot = Rect::new(100.0, 0.0, 400.0, 90.0);
        let l = layout_lanes(&lanes(), SwimlaneRepresentation::Column, plot, 100.0);
        assert_eq!(l.len(), 3);
        assert_eq!(l[1].row, Rect::new(100.0, 30.0, 400.0, 30.0));
        assert_eq!(l[1].label_cell.x(), 0.0);
        assert_eq!(lane_at(&l, 65.0).map(|l| l.index), Some(2));
        assert_eq!(lane_at(&l, 95.0), None);
    }

    #[test]
    fn cells_span_buckets() {
        let plot = Rect::new(0.0, 0.0, 600.0, 90.0);
        let l = layout_lanes(&lanes(), SwimlaneRepresentation::Column, plot, 0.0);
        let x = Scale::Linear(LinearScale::new(0.0, 6.0, 0.0, 600.0));
        let paint = LanePaint {
            highlight: Color::WHITE,
            committed: None,
            dimmed: false,
        };
        let cells = lane_primitives(&l[1], &x, 1.0, None, &[], &paint);
        assert_eq!(cells.len(), 3);
        let Primitive::Rect { rect, .. } = &cells[1] else {
            panic!("expected rect");
        };
        assert_eq!(rect.x(), 200.0);
        assert_eq!(rect.width(), 100.0);
    }
}
