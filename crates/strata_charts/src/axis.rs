//! Axis ticks, label boxes and label density.

use chrono::{Datelike, TimeZone, Utc};
use strata_core::{
    Color, DrawContext, Point, Rect, StrokeStyle, TextAnchor, TextMeasure, TextStyle,
};

use crate::scale::{LinearScale, Scale};
use crate::view::Domain1D;

// Fallback width used only when backend text measurement is unavailable.
const AVG_LABEL_CHAR_WIDTH_PX: f64 = 6.0;

pub fn label_width_px(measure: &dyn TextMeasure, label: &str, style: &TextStyle) -> f64 {
    let measured = measure
        .measure_text(label, style)
        .map(|size| size.width)
        .unwrap_or(label.chars().count() as f64 * AVG_LABEL_CHAR_WIDTH_PX);
    measured.max(10.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    pub px: f64,
    pub label: String,
}

/// Horizontal extent of one rendered label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelBox {
    pub left: f64,
    pub right: f64,
}

impl LabelBox {
    pub fn centered(px: f64, width: f64) -> Self {
        Self {
            left: px - width * 0.5,
            right: px + width * 0.5,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

/// Adjacent labels collide when `right(i) + padding >= left(i + 1)`.
pub fn has_overlap(boxes: &[LabelBox], padding: f64) -> bool {
    boxes
        .windows(2)
        .any(|w| w[0].right + padding >= w[1].left)
}

/// Two boxes share at least one point.
pub fn boxes_overlap(a: &LabelBox, b: &LabelBox) -> bool {
    a.right >= b.left && a.left <= b.right
}

pub fn label_boxes(
    ticks: &[AxisTick],
    measure: &dyn TextMeasure,
    style: &TextStyle,
) -> Vec<LabelBox> {
    ticks
        .iter()
        .map(|t| LabelBox::centered(t.px, label_width_px(measure, &t.label, style)))
        .collect()
}

/// Decides how many x labels fit without collisions.
///
/// Shrinking reacts to overlap; growing back only happens when the plot gets
/// wider than the width last seen, so repeated calls with a stable width keep
/// a stable count.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelDensityManager {
    requested: usize,
    padding: f64,
    horizontal_offset: f64,
    current: usize,
    last_width: Option<f64>,
}

impl LabelDensityManager {
    pub fn new(requested: usize, padding: f64, horizontal_offset: f64) -> Self {
        let requested = requested.max(1);
        Self {
            requested,
            padding,
            horizontal_offset,
            current: requested,
            last_width: None,
        }
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn label_count(&self) -> usize {
        self.current
    }

    /// Tick marks may be denser than labels; they only follow the label
    /// count when it exceeds the tick budget.
    pub fn tick_count(&self, tick_budget: usize) -> usize {
        tick_budget.max(self.current)
    }

    /// Reset when the configured budget changes.
    pub fn set_requested(&mut self, requested: usize) {
        let requested = requested.max(1);
        if requested != self.requested {
            self.requested = requested;
            self.current = requested;
            self.last_width = None;
        }
    }

    /// Feed the boxes rendered at the current count; returns the new count.
    pub fn update(&mut self, plot_width: f64, boxes: &[LabelBox]) -> usize {
        let overlap = has_overlap(boxes, self.padding);
        let grew =
            self.last_width.is_some_and(|w| plot_width > w) && self.current < self.requested;
        self.last_width = Some(plot_width);

        if !(overlap || grew) || boxes.is_empty() {
            return self.current;
        }

        let previous = self.current;
        let mean = boxes.iter().map(LabelBox::width).sum::<f64>() / previous as f64;
        let fit = (plot_width / (mean + self.horizontal_offset)).floor().max(1.0) as usize;
        self.current = if overlap {
            self.requested.min(fit).min(previous)
        } else {
            fit.max(previous).min(self.requested)
        }
        .max(1);

        if self.current != previous {
            tracing::debug!(
                previous,
                current = self.current,
                plot_width,
                mean_label_width = mean,
                "label count changed"
            );
        }
        self.current
    }
}

/// Ticks along `scale`, labelled with `formatter`.
pub fn build_ticks<F>(scale: &Scale, count: usize, formatter: F) -> Vec<AxisTick>
where
    F: Fn(f64) -> String,
{
    if count == 0 {
        return Vec::new();
    }
    let (r0, r1) = scale.range();
    if (r1 - r0).abs() <= 0.0 {
        return Vec::new();
    }
    scale
        .ticks(count)
        .into_iter()
        .map(|v| {
            let px = match scale.as_band() {
                Some(b) => b.index_of(v).and_then(|i| b.center(i)).unwrap_or(b.map(v)),
                None => scale.map(v),
            };
            AxisTick {
                value: v,
                px,
                label: formatter(v),
            }
        })
        .collect()
}

/// Value-axis ticks; larger values are visually higher.
pub fn build_value_ticks<F>(
    domain: Domain1D,
    plot_y: f64,
    plot_h: f64,
    tick_count: usize,
    formatter: F,
) -> Vec<AxisTick>
where
    F: Fn(f64) -> String,
{
    if tick_count == 0 || !domain.is_valid() || plot_h <= 0.0 {
        return Vec::new();
    }
    let s = LinearScale::new(domain.min, domain.max, plot_y + plot_h, plot_y);
    s.ticks(tick_count)
        .into_iter()
        .map(|v| AxisTick {
            value: v,
            px: s.map(v),
            label: formatter(v),
        })
        .collect()
}

/// Year markers under time labels whose format omits the year.
///
/// A marker is emitted at the first label of each year and dropped when it
/// would overlap the previous marker.
pub fn year_indicators(
    labels: &[AxisTick],
    measure: &dyn TextMeasure,
    style: &TextStyle,
) -> Vec<AxisTick> {
    let mut out: Vec<AxisTick> = Vec::new();
    let mut last_box: Option<LabelBox> = None;
    let mut last_year = None;
    for t in labels {
        let Some(dt) = Utc.timestamp_millis_opt(t.value.round() as i64).single() else {
            continue;
        };
        let year = dt.year();
        if last_year == Some(year) {
            continue;
        }
        last_year = Some(year);
        let label = year.to_string();
        let bx = LabelBox::centered(t.px, label_width_px(measure, &label, style));
        if last_box.is_some_and(|prev| boxes_overlap(&prev, &bx)) {
            continue;
        }
        last_box = Some(bx);
        out.push(AxisTick {
            value: t.value,
            px: t.px,
            label,
        });
    }
    out
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct XAxis {
    /// Tick marks (may be denser than labels).
    pub ticks: Vec<AxisTick>,
    pub labels: Vec<AxisTick>,
    pub year_indicators: Vec<AxisTick>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisSide {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct YAxis {
    pub side: AxisSide,
    pub ticks: Vec<AxisTick>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisStyle {
    pub line: Color,
    pub text: Color,
    pub font_size: f64,
}

pub fn draw_bottom_axis(ctx: &mut dyn DrawContext, axis: &XAxis, plot: Rect, style: &AxisStyle) {
    if plot.width() <= 0.0 {
        return;
    }
    let stroke = StrokeStyle::new(style.line, 1.0);
    let y = plot.bottom();
    ctx.draw_line(Point::new(plot.x(), y), Point::new(plot.right(), y), &stroke);
    for t in &axis.ticks {
        ctx.draw_line(Point::new(t.px, y), Point::new(t.px, y + 4.0), &stroke);
    }

    let text = TextStyle::new(style.font_size)
        .with_color(style.text)
        .with_anchor(TextAnchor::Middle);
    for t in &axis.labels {
        ctx.draw_text(&t.label, Point::new(t.px, y + 6.0), &text);
    }
    let year_y = y + 8.0 + style.font_size * 1.2;
    for t in &axis.year_indicators {
        ctx.draw_text(&t.label, Point::new(t.px, year_y), &text);
    }
}

pub fn draw_value_axis(ctx: &mut dyn DrawContext, axis: &YAxis, plot: Rect, style: &AxisStyle) {
    if plot.height() <= 0.0 {
        return;
    }
    let stroke = StrokeStyle::new(style.line, 1.0);
    let (x, dir, anchor) = match axis.side {
        AxisSide::Left => (plot.x(), -1.0, TextAnchor::End),
        AxisSide::Right => (plot.right(), 1.0, TextAnchor::Start),
    };
    ctx.draw_line(Point::new(x, plot.y()), Point::new(x, plot.bottom()), &stroke);

    let text = TextStyle::new(style.font_size)
        .with_color(style.text)
        .with_anchor(anchor);
    for t in &axis.ticks {
        ctx.draw_line(Point::new(x, t.px), Point::new(x + dir * 4.0, t.px), &stroke);
        ctx.draw_text(
            &t.label,
            Point::new(x + dir * 6.0, t.px - style.font_size * 0.5),
            &text,
        );
    }
}

#[cfg(test)]
mod tests {
    use strata_core::{PaintContext, Size};

    use super::*;
    use crate::scale::BandScale;

    struct NoMeasure;

    impl TextMeasure for NoMeasure {
        fn measure_text(&self, _text: &str, _style: &TextStyle) -> Option<Size> {
            None
        }
    }

    fn boxes(n: usize, width: f64, spacing: f64) -> Vec<LabelBox> {
        (0..n)
            .map(|i| LabelBox::centered(i as f64 * spacing, width))
            .collect()
    }

    #[test]
    fn overlap_uses_padding() {
        let b = [LabelBox::centered(0.0, 20.0), LabelBox::centered(24.0, 20.0)];
        assert!(!has_overlap(&b, 3.0));
        assert!(has_overlap(&b, 4.0));
    }

    #[test]
    fn true_overlap_needs_shared_extent() {
        let a = LabelBox { left: 0.0, right: 10.0 };
        let b = LabelBox { left: 20.0, right: 30.0 };
        assert!(!boxes_overlap(&a, &b));
        assert!(!boxes_overlap(&b, &a));
        assert!(boxes_overlap(&a, &LabelBox { left: 5.0, right: 8.0 }));
    }

    #[test]
    fn density_shrinks_on_overlap_and_recovers() {
        let mut m = LabelDensityManager::new(5, 4.0, 4.0);
        assert_eq!(m.update(500.0, &boxes(5, 40.0, 100.0)), 5);

        // 5 labels of 40px squeezed into 100px.
        let shrunk = m.update(100.0, &boxes(5, 40.0, 20.0));
        assert_eq!(shrunk, 2);
        // Same input again: same answer.
        assert_eq!(m.update(100.0, &boxes(2, 40.0, 50.0)), 2);
        assert_eq!(m.update(100.0, &boxes(2, 40.0, 50.0)), 2);

        assert_eq!(m.update(500.0, &boxes(2, 40.0, 250.0)), 5);
    }

    #[test]
    fn mean_width_divides_by_previous_count() {
        // Nice ticks can yield fewer labels than the count asked for.
        let mut m = LabelDensityManager::new(5, 4.0, 4.0);
        let shrunk = m.update(100.0, &boxes(3, 30.0, 20.0));
        // 90px over 5 labels is 18px each, so 100 / (18 + 4) fits 4.
        assert_eq!(shrunk, 4);
    }

    #[test]
    fn tick_count_follows_labels_only_above_budget() {
        let m = LabelDensityManager::new(5, 4.0, 4.0);
        assert_eq!(m.tick_count(9), 9);
        let m = LabelDensityManager::new(12, 4.0, 4.0);
        assert_eq!(m.tick_count(9), 12);
    }

    #[test]
    fn band_ticks_sit_on_band_centers() {
        let keys: Vec<f64> = (0..15).map(f64::from).collect();
        let s = Scale::Band(BandScale::new(keys, 0.0, 500.0, 1.0));
        let ticks = build_ticks(&s, 9, |v| format!("{v}"));
        assert!(ticks.len() <= 9);
        assert!((ticks[0].px - 500.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn value_ticks_grow_upwards() {
        let t = build_value_ticks(Domain1D::new(0.0, 10.0), 0.0, 100.0, 3, |v| format!("{v}"));
        assert!(t.first().unwrap().px > t.last().unwrap().px);
    }

    #[test]
    fn fallback_measurement_counts_chars() {
        let style = TextStyle::new(10.0);
        assert_eq!(label_width_px(&NoMeasure, "abcd", &style), 24.0);
        assert_eq!(label_width_px(&NoMeasure, "a", &style), 10.0);
    }

    #[test]
    fn year_indicators_mark_year_changes() {
        let ms = |y: i32, m: u32| {
            Utc.with_ymd_and_hms(y, m, 1, 0, 0, 0)
                .unwrap()
                .timestamp_millis() as f64
        };
        let labels: Vec<AxisTick> = [(2023, 10), (2023, 12), (2024, 2), (2024, 4)]
            .iter()
            .enumerate()
            .map(|(i, &(y, m))| AxisTick {
                value: ms(y, m),
                px: i as f64 * 100.0,
                label: String::new(),
            })
            .collect();
        let years = year_indicators(&labels, &NoMeasure, &TextStyle::new(10.0));
        let names: Vec<_> = years.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(names, vec!["2023", "2024"]);
    }

    #[test]
    fn bottom_axis_draws_labels() {
        let mut ctx = PaintContext::new();
        let axis = XAxis {
            ticks: vec![AxisTick {
                value: 0.0,
                px: 10.0,
                label: "0".into(),
            }],
            labels: vec![AxisTick {
                value: 0.0,
                px: 10.0,
                label: "0".into(),
            }],
            year_indicators: Vec::new(),
        };
        let style = AxisStyle {
            line: Color::WHITE,
            text: Color::WHITE,
            font_size: 10.0,
        };
        draw_bottom_axis(&mut ctx, &axis, Rect::new(0.0, 0.0, 100.0, 50.0), &style);
        assert_eq!(ctx.primitives().count(), 3);
    }
}
