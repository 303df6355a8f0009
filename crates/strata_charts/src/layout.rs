//! Layout pipeline: data, domains, scales, axes.
//!
//! [`ChartLayoutEngine::layout`] is a pure function of its inputs plus the
//! label-density hysteresis state, so laying out the same data twice at the
//! same size yields the same [`ChartLayout`].

use strata_core::{Rect, Size, TextMeasure, TextStyle};

use crate::axis::{
    build_ticks, build_value_ticks, label_boxes, year_indicators, AxisSide, AxisTick,
    LabelDensityManager, XAxis, YAxis,
};
use crate::config::{ChartKind, ChartOptions};
use crate::data::{data_interval, merge_series, ChartData, DataType, Series, SwimlaneCollection};
use crate::format::format_compact;
use crate::interval_set::{IntervalSet, SelectionInterval};
use crate::scale::{value_extent, LinearScale, Scale, ScaleDomain, ScaleFactory, ScaleKind};
use crate::swimlane::{label_column_width, layout_lanes, LaneLayout};
use crate::time_format::{auto_format, format_time_label};
use crate::time_scale::TimeInterval;
use crate::view::{plot_rect, Domain1D};

// Cap on band keys synthesized to keep out-of-data selections visible.
const MAX_SYNTHETIC_KEYS: usize = 10_000;

const AVG_MONTH_MS: f64 = 30.436_875 * 86_400_000.0;
const MONTH_THRESHOLD_MS: f64 = 28.0 * 86_400_000.0;

/// Value (y) scales for the plotted series.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueScales {
    /// One series, or a shared axis.
    Single(LinearScale),
    /// Two overlaid series, each on its own axis.
    Dual {
        left: LinearScale,
        right: LinearScale,
    },
    /// Three or more series, each min-max normalized onto `[0, 1]`.
    Normalized(LinearScale),
}

impl ValueScales {
    pub fn for_series(&self, index: usize) -> &LinearScale {
        match self {
            ValueScales::Single(s) | ValueScales::Normalized(s) => s,
            ValueScales::Dual { left, right } => {
                if index == 0 {
                    left
                } else {
                    right
                }
            }
        }
    }

    pub fn primary(&self) -> &LinearScale {
        self.for_series(0)
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, ValueScales::Normalized(_))
    }
}

/// A series ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct PlottedSeries {
    pub id: Option<String>,
    pub keys: Vec<f64>,
    /// Values in the series' value scale (normalized when overlaying 3+ series).
    pub values: Vec<f64>,
    pub raw_values: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartLayout {
    pub size: Size,
    pub plot: Rect,
    pub label_column: f64,
    pub data_type: DataType,
    /// Bucket width in domain units.
    pub data_interval: f64,
    /// Key extent including the trailing bucket, before selections widen it.
    pub data_domain: Domain1D,
    pub x_scale: Scale,
    /// `None` for swimlanes, whose lanes carry their own value ranges.
    pub value_scales: Option<ValueScales>,
    pub series: Vec<PlottedSeries>,
    pub lanes: Vec<LaneLayout>,
    /// Sorted union of bucket keys across series or lanes.
    pub keys: Vec<f64>,
    pub x_axis: XAxis,
    pub y_axes: Vec<YAxis>,
    pub y_grid: Vec<AxisTick>,
    pub label_count: usize,
    pub tick_count: usize,
}

impl ChartLayout {
    pub fn x_domain(&self) -> Domain1D {
        self.x_scale.domain()
    }

    pub fn bucket_count(&self) -> usize {
        if self.lanes.is_empty() {
            self.series.iter().map(|s| s.keys.len()).sum()
        } else {
            self.lanes.iter().map(|l| l.keys.len()).sum()
        }
    }

    /// Pixel span of every key in [`ChartLayout::keys`].
    pub fn bucket_boundaries(&self) -> Vec<(f64, f64)> {
        self.keys
            .iter()
            .map(|&k| self.x_scale.bucket_span(k, self.data_interval))
            .collect()
    }
}

/// Inputs for one layout pass.
pub struct LayoutInput<'a> {
    pub data: &'a ChartData,
    pub options: &'a ChartOptions,
    /// Container size; fixed dimensions in `options` take precedence.
    pub container: Size,
    pub committed: &'a IntervalSet,
    pub current: Option<SelectionInterval>,
    pub measure: &'a dyn TextMeasure,
}

/// Fixed dimensions are honored verbatim; the container fills in the rest.
pub fn resolve_size(options: &ChartOptions, container: Size) -> Size {
    Size::new(
        options.chart_width.unwrap_or(container.width).max(0.0),
        options.chart_height.unwrap_or(container.height).max(0.0),
    )
}

/// Min-max normalize onto `[0, 1]`; a constant series maps to `0.5`.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = hi - lo;
    values
        .iter()
        .map(|&v| if span > 0.0 { (v - lo) / span } else { 0.5 })
        .collect()
}

fn value_domain<'a, I>(values: I, from_zero: bool) -> Domain1D
where
    I: IntoIterator<Item = &'a f64>,
{
    let (mut lo, mut hi) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if from_zero && lo.is_finite() {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    value_extent(lo, hi)
}

/// Time step between two labels of a band axis over `bucket_ms` buckets.
fn band_time_interval(bucket_ms: f64, stride: usize) -> TimeInterval {
    let ms = bucket_ms * stride.max(1) as f64;
    if ms < MONTH_THRESHOLD_MS {
        TimeInterval::Fixed(ms.round() as i64)
    } else {
        TimeInterval::Months(((ms / AVG_MONTH_MS).round() as u32).max(1))
    }
}

/// How x labels are rendered for a given label count.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelFormat {
    data_type: DataType,
    date_format: Option<String>,
    interval: Option<TimeInterval>,
}

impl LabelFormat {
    pub fn new(options: &ChartOptions, x: &Scale, count: usize, bucket_width: f64) -> Self {
        let interval = match (options.data_type, x) {
            (DataType::Numeric, _) => None,
            (DataType::Time, Scale::Time(t)) => t.tick_interval(count),
            (DataType::Time, Scale::Band(b)) => {
                let stride = b.len().div_ceil(count.max(1));
                Some(band_time_interval(bucket_width, stride))
            }
            (DataType::Time, Scale::Linear(_)) => None,
        };
        Self {
            data_type: options.data_type,
            date_format: options.date_format.clone(),
            interval,
        }
    }

    pub fn format(&self, v: f64) -> String {
        match self.data_type {
            DataType::Numeric => format_compact(v),
            DataType::Time => format_time_label(v, self.date_format.as_deref(), self.interval),
        }
    }

    /// True when temporal labels omit the year and need year markers.
    pub fn needs_year_indicators(&self) -> bool {
        if self.data_type != DataType::Time || self.date_format.is_some() {
            return false;
        }
        let fmt = auto_format(self.interval);
        !(fmt.contains("%Y") || fmt.contains("%y"))
    }
}

pub struct ChartLayoutEngine {
    density: LabelDensityManager,
}

impl ChartLayoutEngine {
    pub fn new(options: &ChartOptions) -> Self {
        Self {
            density: LabelDensityManager::new(
                options.x_labels,
                options.label_padding,
                options.label_horizontal_offset,
            ),
        }
    }

    pub fn label_density(&self) -> &LabelDensityManager {
        &self.density
    }

    /// Rebuild density state after the options changed.
    pub fn reconfigure(&mut self, options: &ChartOptions) {
        self.density = LabelDensityManager::new(
            options.x_labels,
            options.label_padding,
            options.label_horizontal_offset,
        );
    }

    /// Lay out `input`. Empty data yields `None`.
    pub fn layout(&mut self, input: &LayoutInput<'_>) -> Option<ChartLayout> {
        let options = input.options;
        if input.data.is_empty() {
            tracing::debug!("layout skipped: no data");
            return None;
        }

        let (series, lanes_data) = match input.data {
            ChartData::Series(points) => (merge_series(points), None),
            ChartData::Swimlanes(lanes) => (Vec::new(), Some(lanes)),
        };
        let swimlane = lanes_data.is_some() || options.chart_kind == ChartKind::Swimlane;

        let interval = match lanes_data {
            Some(lanes) => lanes.data_interval(options.data_type),
            None => data_interval(&series, options.data_type),
        };
        let keys = union_keys(&series, lanes_data);
        let (&first, &last) = (keys.first()?, keys.last()?);

        let data_domain = Domain1D::new(first, last + interval);
        let mut x_domain = data_domain;
        if let Some(sel) = input.committed.extent(input.current) {
            x_domain = x_domain.union(sel);
        }

        let size = resolve_size(options, input.container);
        let label_column = if swimlane {
            label_column_width(options, size)
        } else {
            0.0
        };
        let plot = plot_rect(size, &options.margins, label_column);
        let range = (plot.x(), plot.right());

        let continuous_kind = match options.data_type {
            DataType::Numeric => ScaleKind::Linear,
            DataType::Time => ScaleKind::Time,
        };
        let band = if !swimlane && options.chart_kind == ChartKind::Bars {
            band_keys(&keys, interval, x_domain)
        } else {
            None
        };
        let x_scale = match band {
            Some(keys) => ScaleFactory::build(
                ScaleDomain::Keys {
                    keys,
                    bucket_width: interval,
                },
                range,
                ScaleKind::Band,
            ),
            None => ScaleFactory::build(ScaleDomain::Extent(x_domain), range, continuous_kind),
        };

        let (value_scales, plotted, lanes, y_axes, y_grid) = match lanes_data {
            Some(lanes) => {
                let lanes =
                    layout_lanes(lanes, options.swimlane_representation, plot, label_column);
                (None, Vec::new(), lanes, Vec::new(), Vec::new())
            }
            None => {
                let (scales, plotted) = value_scales(&series, options, plot);
                let (axes, grid) = value_axes(&scales, options, plot);
                (Some(scales), plotted, Vec::new(), axes, grid)
            }
        };

        let x_axis = self.x_axis(&x_scale, options, plot, interval, input.measure);
        let label_count = self.density.label_count();
        let tick_count = self.density.tick_count(options.x_ticks);

        tracing::debug!(
            buckets = keys.len(),
            interval,
            x_min = x_domain.min,
            x_max = x_domain.max,
            plot_width = plot.width(),
            label_count,
            "layout complete"
        );

        Some(ChartLayout {
            size,
            plot,
            label_column,
            data_type: options.data_type,
            data_interval: interval,
            data_domain,
            x_scale,
            value_scales,
            series: plotted,
            lanes,
            keys,
            x_axis,
            y_axes,
            y_grid,
            label_count,
            tick_count,
        })
    }

    fn x_axis(
        &mut self,
        x: &Scale,
        options: &ChartOptions,
        plot: Rect,
        bucket_width: f64,
        measure: &dyn TextMeasure,
    ) -> XAxis {
        if plot.width() <= 0.0 {
            return XAxis::default();
        }
        let style = TextStyle::new(options.label_font_size);

        // Counts only decrease after the first pass, so this settles.
        for _ in 0..=self.density.requested() {
            let count = self.density.label_count();
            let fmt = LabelFormat::new(options, x, count, bucket_width);
            let labels = build_ticks(x, count, |v| fmt.format(v));
            let boxes = label_boxes(&labels, measure, &style);
            if self.density.update(plot.width(), &boxes) == count {
                break;
            }
        }

        let count = self.density.label_count();
        let fmt = LabelFormat::new(options, x, count, bucket_width);
        let labels = build_ticks(x, count, |v| fmt.format(v));
        let ticks = build_ticks(x, self.density.tick_count(options.x_ticks), |v| fmt.format(v));
        let year_indicators = if fmt.needs_year_indicators() {
            year_indicators(&labels, measure, &style)
        } else {
            Vec::new()
        };
        XAxis {
            ticks,
            labels,
            year_indicators,
        }
    }
}

fn union_keys(series: &[Series], lanes: Option<&SwimlaneCollection>) -> Vec<f64> {
    let mut keys: Vec<f64> = match lanes {
        Some(lanes) => lanes
            .iter()
            .flat_map(|(_, s)| s.keys.iter().copied())
            .collect(),
        None => series.iter().flat_map(|s| s.keys.iter().copied()).collect(),
    };
    keys.sort_by(|a, b| a.total_cmp(b));
    keys.dedup();
    keys
}

/// Key extent of `data` including the trailing bucket, or `None` when empty.
pub fn data_domain(data: &ChartData, data_type: DataType) -> Option<Domain1D> {
    let (keys, interval) = match data {
        ChartData::Series(points) => {
            let series = merge_series(points);
            (union_keys(&series, None), data_interval(&series, data_type))
        }
        ChartData::Swimlanes(lanes) => (
            union_keys(&[], Some(lanes)),
            lanes.data_interval(data_type),
        ),
    };
    Some(Domain1D::new(*keys.first()?, *keys.last()? + interval))
}

/// Bucket keys for a band axis, extended by synthetic buckets so the band
/// domain covers `x_domain`. `None` when that would take more than
/// `MAX_SYNTHETIC_KEYS` buckets on either side.
fn band_keys(keys: &[f64], interval: f64, x_domain: Domain1D) -> Option<Vec<f64>> {
    let (&first, &last) = (keys.first()?, keys.last()?);
    if interval.is_nan() || interval <= 0.0 {
        return Some(keys.to_vec());
    }
    let needed = |gap: f64| (gap / interval).ceil().max(0.0);
    let before = needed(first - x_domain.min);
    let after = needed(x_domain.max - (last + interval));
    if before.max(after) > MAX_SYNTHETIC_KEYS as f64 {
        tracing::warn!(
            limit = MAX_SYNTHETIC_KEYS,
            before,
            after,
            "selection reaches far outside the data; using a continuous x axis"
        );
        return None;
    }
    let (before, after) = (before as usize, after as usize);
    let mut out = Vec::with_capacity(before + keys.len() + after);
    out.extend((1..=before).rev().map(|i| first - i as f64 * interval));
    out.extend_from_slice(keys);
    out.extend((1..=after).map(|i| last + i as f64 * interval));
    Some(out)
}

fn value_scales(
    series: &[Series],
    options: &ChartOptions,
    plot: Rect,
) -> (ValueScales, Vec<PlottedSeries>) {
    let range = (plot.bottom(), plot.y());
    let linear = |d: Domain1D| LinearScale::new(d.min, d.max, range.0, range.1);
    let from_zero = options.y_axis_from_zero;

    let plotted_as_is = |s: &Series| PlottedSeries {
        id: s.id.clone(),
        keys: s.keys.clone(),
        values: s.values.clone(),
        raw_values: s.values.clone(),
    };

    match series {
        [a, b] => (
            ValueScales::Dual {
                left: linear(value_domain(&a.values, from_zero)),
                right: linear(value_domain(&b.values, from_zero)),
            },
            vec![plotted_as_is(a), plotted_as_is(b)],
        ),
        many if many.len() >= 3 => (
            ValueScales::Normalized(linear(Domain1D::new(0.0, 1.0))),
            many.iter()
                .map(|s| PlottedSeries {
                    values: normalize(&s.values),
                    ..plotted_as_is(s)
                })
                .collect(),
        ),
        _ => (
            ValueScales::Single(linear(value_domain(
                series.iter().flat_map(|s| s.values.iter()),
                from_zero,
            ))),
            series.iter().map(plotted_as_is).collect(),
        ),
    }
}

fn value_axes(
    scales: &ValueScales,
    options: &ChartOptions,
    plot: Rect,
) -> (Vec<YAxis>, Vec<AxisTick>) {
    let ticks = |s: &LinearScale, count: usize| {
        build_value_ticks(s.domain(), plot.y(), plot.height(), count, format_compact)
    };
    let primary = scales.primary();
    let mut axes = vec![YAxis {
        side: AxisSide::Left,
        ticks: ticks(primary, options.y_labels),
    }];
    if let ValueScales::Dual { right, .. } = scales {
        axes.push(YAxis {
            side: AxisSide::Right,
            ticks: ticks(right, options.y_labels),
        });
    }
    (axes, ticks(primary, options.y_ticks))
}
