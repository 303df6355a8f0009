//! The histogram widget: configuration, data, selections and rendering.

use anyhow::Context as _;
use strata_core::{
    Brush, Color, ContainerId, DrawContext, ListenerId, Listeners, Paint, PatternId,
    PointerEvent, PointerHandler, Point, Rect, Size, StrokeStyle, TextAnchor, TextMeasure,
    TextStyle,
};

use crate::axis::{draw_bottom_axis, draw_value_axis, AxisStyle};
use crate::brush::{BrushController, BrushStyle};
use crate::common::{draw_grid, fill_bg};
use crate::config::ChartOptions;
use crate::data::ChartData;
use crate::interaction::InteractionState;
use crate::interval_set::{is_stale, IntervalId, IntervalSet, SelectionInterval};
use crate::layout::{data_domain, resolve_size, ChartLayout, ChartLayoutEngine, LayoutInput};
use crate::pattern::{selection_stripes, PatternRegistry};
use crate::strategy::{bucket_marks, series_color, strategy_for, ChartStrategy, SeriesPaint};
use crate::swimlane::{lane_at, lane_primitives, LanePaint};
use crate::tooltip::{HoverEvent, HoverQuery, LaneHit, TooltipPositioner};
use crate::view::Domain1D;

/// Ordered committed selections, as reported to listeners.
pub type SelectionList = Vec<(IntervalId, SelectionInterval)>;

#[derive(Clone, Debug)]
pub struct HistogramChartStyle {
    pub bg: Color,
    pub grid: Color,
    pub axis: Color,
    pub text: Color,
    /// Fill for buckets inside the in-progress selection.
    pub highlight: Color,
    /// Stripe color for committed selections.
    pub selection: Color,
    pub crosshair: Color,
    pub brush: BrushStyle,
}

impl Default for HistogramChartStyle {
    fn default() -> Self {
        Self {
            bg: Color::rgba(0.08, 0.09, 0.11, 1.0),
            grid: Color::rgba(1.0, 1.0, 1.0, 0.08),
            axis: Color::rgba(1.0, 1.0, 1.0, 0.35),
            text: Color::rgba(1.0, 1.0, 1.0, 0.85),
            highlight: Color::rgba(1.0, 0.85, 0.35, 0.95),
            selection: Color::rgba(1.0, 0.85, 0.35, 0.9),
            crosshair: Color::rgba(1.0, 1.0, 1.0, 0.35),
            brush: BrushStyle::default(),
        }
    }
}

// Used when the host does not provide text metrics; label widths then fall
// back to a per-character estimate.
struct EstimatedText;

impl TextMeasure for EstimatedText {
    fn measure_text(&self, _text: &str, _style: &TextStyle) -> Option<Size> {
        None
    }
}

pub struct HistogramChartModel {
    options: ChartOptions,
    pub style: HistogramChartStyle,

    data: ChartData,
    container_size: Size,
    measure: Box<dyn TextMeasure>,

    engine: ChartLayoutEngine,
    layout: Option<ChartLayout>,
    strategy: Box<dyn ChartStrategy>,

    selections: IntervalSet,
    state: InteractionState,
    brush: Option<BrushController>,
    tooltip: TooltipPositioner,
    selected_lanes: Vec<String>,

    patterns: PatternRegistry,
    committed_pattern: PatternId,
    container: Option<ContainerId>,

    selection_listeners: Listeners<SelectionList>,
    swimlane_listeners: Listeners<Vec<String>>,
    data_length_listeners: Listeners<usize>,
}

impl HistogramChartModel {
    pub fn new(options: ChartOptions) -> anyhow::Result<Self> {
        options.validate().context("invalid chart options")?;

        let style = HistogramChartStyle::default();
        let mut patterns = PatternRegistry::new();
        let committed_pattern = patterns.register(selection_stripes(style.selection));
        let brush = options
            .is_histogram_selectable
            .then(|| BrushController::new(options.brush_variant, options.handle_size()));

        Ok(Self {
            engine: ChartLayoutEngine::new(&options),
            strategy: strategy_for(&options),
            tooltip: TooltipPositioner::new(
                options.tooltip_x_offset,
                options.tooltip_y_offset,
                options.tooltip_tolerance,
            ),
            options,
            style,
            data: ChartData::default(),
            container_size: Size::ZERO,
            measure: Box::new(EstimatedText),
            layout: None,
            selections: IntervalSet::new(),
            state: InteractionState::default(),
            brush,
            selected_lanes: Vec::new(),
            patterns,
            committed_pattern,
            container: None,
            selection_listeners: Listeners::new(),
            swimlane_listeners: Listeners::new(),
            data_length_listeners: Listeners::new(),
        })
    }

    /// Use backend text metrics for label density decisions.
    pub fn with_text_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn data(&self) -> &ChartData {
        &self.data
    }

    /// Current layout; `None` before the first plot or for empty data.
    pub fn layout(&self) -> Option<&ChartLayout> {
        self.layout.as_ref()
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.state
    }

    pub fn brush(&self) -> Option<&BrushController> {
        self.brush.as_ref()
    }

    pub fn brush_mut(&mut self) -> Option<&mut BrushController> {
        self.brush.as_mut()
    }

    pub fn current_selection(&self) -> Option<SelectionInterval> {
        self.state.current_selection
    }

    pub fn selections(&self) -> SelectionList {
        self.selections.all()
    }

    pub fn selected_swimlanes(&self) -> &[String] {
        &self.selected_lanes
    }

    pub fn on_hover<F>(&mut self, f: F) -> ListenerId
    where
        F: FnMut(&HoverEvent) + 'static,
    {
        self.tooltip.on_hover.subscribe(f)
    }

    pub fn on_selection_list_changed<F>(&mut self, f: F) -> ListenerId
    where
        F: FnMut(&SelectionList) + 'static,
    {
        self.selection_listeners.subscribe(f)
    }

    pub fn on_selected_swimlanes_changed<F>(&mut self, f: F) -> ListenerId
    where
        F: FnMut(&Vec<String>) + 'static,
    {
        self.swimlane_listeners.subscribe(f)
    }

    /// Number of plotted buckets, reported after every `plot`.
    pub fn on_data_length<F>(&mut self, f: F) -> ListenerId
    where
        F: FnMut(&usize) + 'static,
    {
        self.data_length_listeners.subscribe(f)
    }

    /// Replace the configuration and re-layout.
    pub fn configure(&mut self, options: ChartOptions) -> anyhow::Result<()> {
        options.validate().context("invalid chart options")?;

        self.strategy = strategy_for(&options);
        self.engine.reconfigure(&options);
        self.tooltip.x_offset = options.tooltip_x_offset;
        self.tooltip.y_offset = options.tooltip_y_offset;
        self.tooltip.tolerance = options.tooltip_tolerance;

        if options.is_histogram_selectable {
            if let Some(brush) = self.brush.as_mut() {
                brush.set_variant(options.brush_variant, options.handle_size());
            } else {
                self.brush = Some(BrushController::new(
                    options.brush_variant,
                    options.handle_size(),
                ));
            }
        } else {
            self.brush = None;
            self.state.current_selection = None;
        }

        let trim = !options.multiselectable && self.selections.len() > 1;
        self.options = options;
        if trim {
            let last = self.selections.intervals().last();
            self.selections.replace(last);
            self.emit_selections();
        }
        self.relayout();
        Ok(())
    }

    /// Full (re)layout for `data`. Plotting the same data twice yields the
    /// same layout.
    pub fn plot(&mut self, data: ChartData) {
        let previous = data_domain(&self.data, self.options.data_type);
        self.data = data;
        self.prune_selections(previous);
        self.relayout();
        let len = self.layout.as_ref().map_or(0, ChartLayout::bucket_count);
        if len == 0 {
            tracing::debug!("plot: no data");
        }
        self.data_length_listeners.emit(&len);
    }

    /// New container size; fixed dimensions in the options still win.
    pub fn resize(&mut self, container: Size) {
        self.container_size = container;
        self.relayout();
    }

    fn relayout(&mut self) {
        let input = LayoutInput {
            data: &self.data,
            options: &self.options,
            container: self.container_size,
            committed: &self.selections,
            current: self.state.current_selection,
            measure: self.measure.as_ref(),
        };
        self.layout = self.engine.layout(&input);

        match (self.brush.as_mut(), self.layout.as_ref()) {
            (Some(brush), Some(layout)) => {
                brush.bind(layout.plot);
                brush.sync_to_selection(&layout.x_scale, &self.state);
            }
            (Some(brush), None) => brush.clear(),
            _ => {}
        }
        if self.layout.is_none() {
            self.tooltip.leave(&mut self.state);
        }
    }

    /// Drop selections the refreshed data moved away from, and lane choices
    /// for lanes that are gone.
    fn prune_selections(&mut self, previous: Option<Domain1D>) {
        let domain = data_domain(&self.data, self.options.data_type);
        if let (Some(previous), Some(domain)) = (previous, domain) {
            if self
                .state
                .current_selection
                .is_some_and(|c| is_stale(c, previous, domain))
            {
                self.state.current_selection = None;
            }
            let removed = self.selections.prune(previous, domain);
            if !removed.is_empty() {
                tracing::debug!(count = removed.len(), "pruned selections outside the data");
                self.emit_selections();
            }
        }

        if let ChartData::Swimlanes(lanes) = &self.data {
            let before = self.selected_lanes.len();
            self.selected_lanes.retain(|name| lanes.index_of(name).is_some());
            if self.selected_lanes.len() != before {
                self.swimlane_listeners.emit(&self.selected_lanes);
            }
        }
    }

    fn emit_selections(&mut self) {
        let list = self.selections.all();
        self.selection_listeners.emit(&list);
    }

    /// Re-layout when the selections reach outside the data or the axis is
    /// still widened for selections that are gone.
    fn refresh_after_selection_change(&mut self) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let exceeds = self
            .selections
            .bounds_exceed_data(layout.data_domain, self.state.current_selection);
        if exceeds || layout.x_domain() != layout.data_domain {
            self.relayout();
        }
    }

    /// Commit the in-progress selection. Single-select mode replaces any
    /// committed selection.
    pub fn commit_selection(&mut self) -> Option<IntervalId> {
        if !self.options.is_histogram_selectable {
            return None;
        }
        let sel = self.state.current_selection.take()?;
        if !self.options.multiselectable {
            self.selections.clear();
        }
        let id = self.selections.add(sel);
        if let Some(brush) = self.brush.as_mut() {
            brush.clear();
        }
        tracing::debug!(%id, start = sel.start, end = sel.end, "selection committed");
        self.emit_selections();
        self.refresh_after_selection_change();
        Some(id)
    }

    pub fn remove_selection(&mut self, id: &IntervalId) -> bool {
        if self.selections.remove(id).is_none() {
            return false;
        }
        self.emit_selections();
        self.refresh_after_selection_change();
        true
    }

    pub fn clear_selections(&mut self) {
        if self.selections.is_empty() {
            return;
        }
        self.selections.clear();
        self.emit_selections();
        self.refresh_after_selection_change();
    }

    /// Replace committed selections with externally supplied intervals.
    pub fn set_selections<I>(&mut self, intervals: I)
    where
        I: IntoIterator<Item = SelectionInterval>,
    {
        let mut list: Vec<SelectionInterval> = intervals
            .into_iter()
            .filter(SelectionInterval::is_finite)
            .collect();
        if !self.options.multiselectable && list.len() > 1 {
            list = list.split_off(list.len() - 1);
        }
        self.selections.replace(list);
        self.emit_selections();
        self.refresh_after_selection_change();
    }

    /// Drop the in-progress selection without committing it.
    pub fn clear_current_selection(&mut self) {
        self.state.current_selection = None;
        if let Some(brush) = self.brush.as_mut() {
            brush.clear();
        }
        self.refresh_after_selection_change();
    }

    /// Toggle a lane in the selected-swimlanes set. Returns whether the lane
    /// is selected afterwards.
    pub fn toggle_swimlane(&mut self, name: &str) -> bool {
        let Some(layout) = self.layout.as_ref() else {
            return false;
        };
        if !layout.lanes.iter().any(|l| l.name == name) {
            return false;
        }
        let selected = match self.selected_lanes.iter().position(|n| n == name) {
            Some(pos) => {
                self.selected_lanes.remove(pos);
                false
            }
            None => {
                self.selected_lanes.push(name.to_string());
                self.selected_lanes
                    .sort_by_key(|n| layout.lanes.iter().position(|l| &l.name == n));
                true
            }
        };
        self.swimlane_listeners.emit(&self.selected_lanes);
        selected
    }

    fn update_hover(&mut self, pointer: Point) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let (keys, lane) = if layout.lanes.is_empty() {
            (layout.keys.as_slice(), None)
        } else {
            match lane_at(&layout.lanes, pointer.y) {
                Some(l) => (l.keys.as_slice(), Some(LaneHit { index: l.index })),
                None => {
                    self.tooltip.leave(&mut self.state);
                    return;
                }
            }
        };
        let query = HoverQuery {
            pointer,
            plot: layout.plot,
            scale: &layout.x_scale,
            keys,
            bucket_width: layout.data_interval,
            lane,
            strategy_offset: self
                .strategy
                .tooltip_x_offset(&layout.x_scale, layout.data_interval),
        };
        self.tooltip.hover(query, &mut self.state);
    }

    /// Draw the chart into a fresh container, replacing the previous one.
    pub fn render(&mut self, ctx: &mut dyn DrawContext) {
        if let Some(id) = self.container.take() {
            if let Err(err) = ctx.remove_container(id) {
                tracing::warn!(%err, "failed to remove previous chart container");
            }
        }
        self.patterns.sync(ctx);
        self.container = Some(ctx.create_container("strata-histogram"));

        let Some(layout) = self.layout.as_ref() else {
            let size = resolve_size(&self.options, self.container_size);
            fill_bg(ctx, size.width, size.height, self.style.bg);
            return;
        };
        let plot = layout.plot;
        fill_bg(ctx, layout.size.width, layout.size.height, self.style.bg);
        if plot.width() <= 0.0 || plot.height() <= 0.0 {
            return;
        }

        draw_grid(ctx, plot, &layout.x_axis.ticks, &layout.y_grid, self.style.grid);
        let axis_style = AxisStyle {
            line: self.style.axis,
            text: self.style.text,
            font_size: self.options.label_font_size,
        };
        for axis in &layout.y_axes {
            draw_value_axis(ctx, axis, plot, &axis_style);
        }
        draw_bottom_axis(ctx, &layout.x_axis, plot, &axis_style);

        let committed: Vec<SelectionInterval> = self.selections.intervals().collect();
        let current = self.state.current_selection;

        if let Some(scales) = &layout.value_scales {
            for (i, series) in layout.series.iter().enumerate() {
                let marks = bucket_marks(
                    self.strategy.as_ref(),
                    &series.keys,
                    &series.values,
                    &layout.x_scale,
                    layout.data_interval,
                    current,
                    &committed,
                );
                let paint = SeriesPaint {
                    color: series_color(i),
                    highlight: self.style.highlight,
                    committed: Some(self.committed_pattern),
                    plot,
                };
                for p in self.strategy.plot_chart(&marks, scales.for_series(i), &paint) {
                    ctx.draw(&p);
                }
            }
        }

        let label_style =
            TextStyle::new(self.options.label_font_size).with_anchor(TextAnchor::Start);
        for lane in &layout.lanes {
            let selected = self.selected_lanes.contains(&lane.name);
            let paint = LanePaint {
                highlight: self.style.highlight,
                committed: Some(self.committed_pattern),
                dimmed: !self.selected_lanes.is_empty() && !selected,
            };
            let cells = lane_primitives(
                lane,
                &layout.x_scale,
                layout.data_interval,
                current,
                &committed,
                &paint,
            );
            for p in &cells {
                ctx.draw(p);
            }
            if lane.label_cell.width() > 0.0 {
                let color = if selected {
                    self.style.highlight
                } else {
                    self.style.text
                };
                let origin = Point::new(
                    lane.label_cell.x() + 4.0,
                    lane.label_cell.center().y - self.options.label_font_size * 0.5,
                );
                ctx.draw_text(&lane.name, origin, &label_style.with_color(color));
            }
        }

        // Committed selection markers along the top edge.
        let marker = Paint::fill(Brush::Pattern(self.committed_pattern));
        for iv in &committed {
            let x0 = plot.clamp_x(layout.x_scale.map(iv.start));
            let x1 = plot.clamp_x(layout.x_scale.map(iv.end));
            ctx.draw_rect(Rect::from_x_span(x0, x1, plot.y(), 3.0), &marker);
        }

        if let Some(brush) = &self.brush {
            for p in brush.primitives(&self.style.brush) {
                ctx.draw(&p);
            }
        }

        if let (true, Some(key)) = (self.state.tooltip_visible, self.state.hovered_key) {
            let (x0, x1) = layout.x_scale.bucket_span(key, layout.data_interval);
            let x = plot.clamp_x((x0 + x1) * 0.5);
            ctx.draw_line(
                Point::new(x, plot.y()),
                Point::new(x, plot.bottom()),
                &StrokeStyle::new(self.style.crosshair, 1.0),
            );
        }
    }
}

impl PointerHandler for HistogramChartModel {
    fn on_pointer_down(&mut self, e: &PointerEvent) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let p = Point::new(e.x, e.y);
        if let Some(lane) = layout.lanes.iter().find(|l| l.label_cell.contains(p)) {
            let name = lane.name.clone();
            self.toggle_swimlane(&name);
            return;
        }
        if !layout.plot.contains(p) {
            return;
        }
        if let Some(brush) = self.brush.as_mut() {
            brush.start(e.x, e.y, &self.state);
        }
    }

    fn on_pointer_move(&mut self, e: &PointerEvent) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        if let Some(brush) = self.brush.as_mut() {
            if brush.is_active() {
                brush.move_to(e.x, &layout.x_scale, &mut self.state);
            }
        }
        self.update_hover(Point::new(e.x, e.y));
    }

    fn on_pointer_up(&mut self, _e: &PointerEvent) {
        let (Some(brush), Some(layout)) = (self.brush.as_mut(), self.layout.as_ref()) else {
            return;
        };
        if !brush.is_active() {
            return;
        }
        brush.end(&layout.x_scale, &mut self.state);
        let exceeds = self
            .selections
            .bounds_exceed_data(layout.data_domain, self.state.current_selection);
        if exceeds {
            self.relayout();
        }
    }

    fn on_pointer_leave(&mut self, _e: &PointerEvent) {
        self.tooltip.leave(&mut self.state);
    }

    fn on_double_click(&mut self, _e: &PointerEvent) {
        self.commit_selection();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use strata_core::{PaintContext, PointerEventKind};

    use super::*;
    use crate::data::DataPoint;

    fn model(options: ChartOptions) -> HistogramChartModel {
        let mut m = HistogramChartModel::new(options).unwrap();
        m.resize(Size::new(570.0, 200.0));
        m.plot(ChartData::Series(
            (0..10).map(|k| DataPoint::new(k as f64, 1.0 + k as f64)).collect(),
        ));
        m
    }

    fn drag(m: &mut HistogramChartModel, from: f64, to: f64) {
        m.dispatch(&PointerEvent::new(PointerEventKind::Down, from, 50.0));
        m.dispatch(&PointerEvent::new(PointerEventKind::Move, to, 50.0));
        m.dispatch(&PointerEvent::new(PointerEventKind::Up, to, 50.0));
    }

    #[test]
    fn invalid_options_fail_construction() {
        let o = ChartOptions {
            bar_weight: 2.0,
            ..ChartOptions::default()
        };
        assert!(HistogramChartModel::new(o).is_err());
    }

    #[test]
    fn single_select_replaces_committed() {
        let mut m = model(ChartOptions::default());
        drag(&mut m, 110.0, 210.0);
        m.commit_selection().unwrap();
        drag(&mut m, 310.0, 410.0);
        m.commit_selection().unwrap();
        assert_eq!(m.selections().len(), 1);
        assert_eq!(m.current_selection(), None);
    }

    #[test]
    fn multi_select_accumulates() {
        let mut m = model(ChartOptions {
            multiselectable: true,
            ..ChartOptions::default()
        });
        let lists = Rc::new(RefCell::new(Vec::new()));
        let sink = lists.clone();
        m.on_selection_list_changed(move |l: &SelectionList| sink.borrow_mut().push(l.len()));

        drag(&mut m, 110.0, 210.0);
        m.dispatch(&PointerEvent::new(PointerEventKind::DoubleClick, 150.0, 50.0));
        drag(&mut m, 310.0, 410.0);
        m.dispatch(&PointerEvent::new(PointerEventKind::DoubleClick, 350.0, 50.0));
        assert_eq!(*lists.borrow(), vec![1, 2]);
    }

    #[test]
    fn unselectable_chart_has_no_brush() {
        let mut m = model(ChartOptions {
            is_histogram_selectable: false,
            ..ChartOptions::default()
        });
        assert!(m.brush().is_none());
        drag(&mut m, 110.0, 210.0);
        assert_eq!(m.current_selection(), None);
        assert_eq!(m.commit_selection(), None);
    }

    #[test]
    fn render_defines_stripes_and_validates() {
        let mut m = model(ChartOptions::default());
        drag(&mut m, 110.0, 210.0);
        m.commit_selection();
        let mut ctx = PaintContext::new();
        m.render(&mut ctx);
        m.render(&mut ctx);
        assert_eq!(ctx.pattern_definitions(), 1);
        ctx.validate_patterns().unwrap();
    }
}
