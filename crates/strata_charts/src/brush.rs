//! Drag selection along the x axis.
//!
//! The brush keeps its geometry in pixels and converts to domain values
//! through the scale handed to each call, so it never holds a stale scale.

use strata_core::{Color, Listeners, Paint, Point, Primitive, Rect, Size, StrokeStyle};

use crate::config::BrushVariant;
use crate::interaction::InteractionState;
use crate::interval_set::SelectionInterval;
use crate::scale::Scale;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrushPhase {
    #[default]
    Idle,
    Dragging,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushEdge {
    Start,
    End,
}

/// Payload of brush notifications.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushEvent {
    pub selection: Option<SelectionInterval>,
    /// Selection edges in pixels, sorted.
    pub pixels: Option<(f64, f64)>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushStyle {
    pub fill: Color,
    pub stroke: Color,
    pub handle: Color,
    pub baseline: Color,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            fill: Color::rgba(0.35, 0.65, 1.0, 0.18),
            stroke: Color::rgba(0.35, 0.65, 1.0, 0.85),
            handle: Color::rgba(1.0, 1.0, 1.0, 0.9),
            baseline: Color::rgba(1.0, 1.0, 1.0, 0.25),
        }
    }
}

pub struct BrushController {
    variant: BrushVariant,
    handle_size: f64,
    plot: Option<Rect>,
    phase: BrushPhase,
    anchor_px: f64,
    cur_px: f64,
    moved: bool,
    px_range: Option<(f64, f64)>,

    pub on_brush_start: Listeners<BrushEvent>,
    pub on_brushing: Listeners<BrushEvent>,
    pub on_brush_end: Listeners<BrushEvent>,
}

impl BrushController {
    pub fn new(variant: BrushVariant, handle_size: f64) -> Self {
        Self {
            variant,
            handle_size: handle_size.max(1.0),
            plot: None,
            phase: BrushPhase::Idle,
            anchor_px: 0.0,
            cur_px: 0.0,
            moved: false,
            px_range: None,
            on_brush_start: Listeners::new(),
            on_brushing: Listeners::new(),
            on_brush_end: Listeners::new(),
        }
    }

    /// Switch handle geometry; the selection and listeners are kept.
    pub fn set_variant(&mut self, variant: BrushVariant, handle_size: f64) {
        self.variant = variant;
        self.handle_size = handle_size.max(1.0);
    }

    pub fn variant(&self) -> BrushVariant {
        self.variant
    }

    pub fn phase(&self) -> BrushPhase {
        self.phase
    }

    pub fn is_bound(&self) -> bool {
        self.plot.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.phase == BrushPhase::Dragging
    }

    /// Attach to a plot area. A zero-width area leaves the brush unbound
    /// (every interaction is a no-op) until it is bound again.
    pub fn bind(&mut self, plot: Rect) {
        if !(plot.width() > 0.0 && plot.height() >= 0.0) {
            tracing::debug!(width = plot.width(), "brush not bound: plot has no width");
            self.plot = None;
            self.phase = BrushPhase::Idle;
            self.px_range = None;
            return;
        }
        self.plot = Some(plot);
    }

    /// Handle footprint in pixels.
    pub fn size(&self) -> Size {
        match self.variant {
            BrushVariant::Range => Size::new(self.handle_size, self.handle_size * 2.0),
            BrushVariant::Slider => Size::new(self.handle_size * 2.0, self.handle_size * 2.0),
        }
    }

    pub fn pixel_range(&self) -> Option<(f64, f64)> {
        self.px_range
    }

    /// Begin a drag at `x`. Grabbing an edge handle resizes from the
    /// opposite edge; anywhere else starts a new selection.
    pub fn start(&mut self, x: f64, y: f64, state: &InteractionState) -> bool {
        let Some(plot) = self.plot else {
            return false;
        };
        if let Some(edge) = self.hit_test(x, y) {
            return self.start_resize(edge, state);
        }
        let x = plot.clamp_x(x);
        self.phase = BrushPhase::Dragging;
        self.anchor_px = x;
        self.cur_px = x;
        self.moved = false;
        tracing::trace!(x, "brush start");
        let ev = BrushEvent {
            selection: state.current_selection,
            pixels: self.px_range,
        };
        self.on_brush_start.emit(&ev);
        true
    }

    /// Begin dragging one edge of the existing selection.
    pub fn start_resize(&mut self, edge: BrushEdge, state: &InteractionState) -> bool {
        let (Some(_), Some((lo, hi))) = (self.plot, self.px_range) else {
            return false;
        };
        let (anchor, moving) = match edge {
            BrushEdge::Start => (hi, lo),
            BrushEdge::End => (lo, hi),
        };
        self.phase = BrushPhase::Dragging;
        self.anchor_px = anchor;
        self.cur_px = moving;
        // Grabbing a handle keeps the selection even without movement.
        self.moved = true;
        let ev = BrushEvent {
            selection: state.current_selection,
            pixels: self.px_range,
        };
        self.on_brush_start.emit(&ev);
        true
    }

    pub fn move_to(&mut self, x: f64, scale: &Scale, state: &mut InteractionState) {
        let Some(plot) = self.plot else {
            return;
        };
        if self.phase != BrushPhase::Dragging {
            return;
        }
        self.cur_px = plot.clamp_x(x);
        if self.cur_px != self.anchor_px {
            self.moved = true;
        }
        let (lo, hi) = self.sorted_px();
        self.px_range = Some((lo, hi));
        let selection =
            SelectionInterval::new(scale.invert_continuous(lo), scale.invert_continuous(hi));
        state.current_selection = Some(selection);
        self.on_brushing.emit(&BrushEvent {
            selection: Some(selection),
            pixels: Some((lo, hi)),
        });
    }

    /// Finish the drag. A press without movement clears the selection.
    /// Nothing is committed here.
    pub fn end(
        &mut self,
        scale: &Scale,
        state: &mut InteractionState,
    ) -> Option<SelectionInterval> {
        if self.phase != BrushPhase::Dragging {
            return state.current_selection;
        }
        self.phase = BrushPhase::Idle;
        if !self.moved {
            state.current_selection = None;
            self.px_range = None;
        } else {
            self.sync_to_selection(scale, state);
        }
        tracing::debug!(selection = ?state.current_selection, "brush end");
        self.on_brush_end.emit(&BrushEvent {
            selection: state.current_selection,
            pixels: self.px_range,
        });
        state.current_selection
    }

    pub fn cancel(&mut self) {
        self.phase = BrushPhase::Idle;
    }

    /// Drop the pixel selection without notifying.
    pub fn clear(&mut self) {
        self.phase = BrushPhase::Idle;
        self.px_range = None;
    }

    /// Reposition edges (and handles) from the current selection.
    pub fn sync_to_selection(&mut self, scale: &Scale, state: &InteractionState) {
        let (Some(plot), Some(sel)) = (self.plot, state.current_selection) else {
            self.px_range = None;
            return;
        };
        let a = plot.clamp_x(scale.map(sel.start));
        let b = plot.clamp_x(scale.map(sel.end));
        self.px_range = Some((a.min(b), a.max(b)));
    }

    fn sorted_px(&self) -> (f64, f64) {
        let (a, b) = (self.anchor_px, self.cur_px);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Handle centers, kept inside the plot area.
    pub fn handle_centers(&self) -> Option<(Point, Point)> {
        let plot = self.plot?;
        let (lo, hi) = self.px_range?;
        let half = self.size().width * 0.5;
        let min_x = plot.x() + half;
        let max_x = (plot.right() - half).max(min_x);
        let y = match self.variant {
            BrushVariant::Range => plot.y() + plot.height() * 0.5,
            BrushVariant::Slider => plot.bottom(),
        };
        Some((
            Point::new(lo.clamp(min_x, max_x), y),
            Point::new(hi.clamp(min_x, max_x), y),
        ))
    }

    fn handle_hit_rect(&self, center: Point) -> Rect {
        let s = self.size();
        // Hit targets are a little larger than the drawn handles.
        let pad = match self.variant {
            BrushVariant::Range => 2.0,
            BrushVariant::Slider => 4.0,
        };
        Rect::new(
            center.x - s.width * 0.5 - pad,
            center.y - s.height * 0.5 - pad,
            s.width + pad * 2.0,
            s.height + pad * 2.0,
        )
    }

    pub fn hit_test(&self, x: f64, y: f64) -> Option<BrushEdge> {
        let (a, b) = self.handle_centers()?;
        let p = Point::new(x, y);
        if self.handle_hit_rect(a).contains(p) {
            Some(BrushEdge::Start)
        } else if self.handle_hit_rect(b).contains(p) {
            Some(BrushEdge::End)
        } else {
            None
        }
    }

    /// Overlay primitives for the current selection.
    pub fn primitives(&self, style: &BrushStyle) -> Vec<Primitive> {
        let mut out = Vec::new();
        let Some(plot) = self.plot else {
            return out;
        };
        if self.variant == BrushVariant::Slider {
            out.push(Primitive::Line {
                from: Point::new(plot.x(), plot.bottom()),
                to: Point::new(plot.right(), plot.bottom()),
                stroke: StrokeStyle::new(style.baseline, 2.0),
            });
        }
        let (Some((lo, hi)), Some((a, b))) = (self.px_range, self.handle_centers()) else {
            return out;
        };
        match self.variant {
            BrushVariant::Range => {
                out.push(Primitive::Rect {
                    rect: Rect::from_x_span(lo, hi, plot.y(), plot.height()),
                    paint: Paint::fill(style.fill).with_stroke(style.stroke, 1.0),
                });
                let s = self.size();
                for c in [a, b] {
                    out.push(Primitive::Rect {
                        rect: Rect::new(
                            c.x - s.width * 0.5,
                            c.y - s.height * 0.5,
                            s.width,
                            s.height,
                        ),
                        paint: Paint::fill(style.handle).with_stroke(style.stroke, 1.0),
                    });
                }
            }
            BrushVariant::Slider => {
                out.push(Primitive::Line {
                    from: a,
                    to: b,
                    stroke: StrokeStyle::new(style.stroke, 2.0),
                });
                for c in [a, b] {
                    out.push(Primitive::Circle {
                        center: c,
                        radius: self.handle_size,
                        paint: Paint::fill(style.handle).with_stroke(style.stroke, 1.0),
                    });
                }
            }
        }
        out
    }
}

impl std::fmt::Debug for BrushController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrushController")
            .field("variant", &self.variant)
            .field("plot", &self.plot)
            .field("phase", &self.phase)
            .field("px_range", &self.px_range)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::scale::LinearScale;

    fn setup() -> (BrushController, Scale, InteractionState) {
        let mut b = BrushController::new(BrushVariant::Range, 8.0);
        b.bind(Rect::new(0.0, 0.0, 500.0, 100.0));
        let s = Scale::Linear(LinearScale::new(0.0, 100.0, 0.0, 500.0));
        (b, s, InteractionState::default())
    }

    #[test]
    fn drag_updates_selection_monotonically() {
        let (mut b, s, mut st) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        b.on_brushing.subscribe(move |e: &BrushEvent| {
            sink.borrow_mut().push(e.selection.map(|s| s.end));
        });

        assert!(b.start(50.0, 50.0, &st));
        for x in [100.0, 150.0, 200.0] {
            b.move_to(x, &s, &mut st);
        }
        let sel = b.end(&s, &mut st).unwrap();
        assert!((sel.start - 10.0).abs() < 1e-9);
        assert!((sel.end - 40.0).abs() < 1e-9);

        let ends: Vec<f64> = seen.borrow().iter().flatten().copied().collect();
        assert_eq!(ends.len(), 3);
        assert!(ends.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn drag_is_clamped_to_plot() {
        let (mut b, s, mut st) = setup();
        b.start(400.0, 10.0, &st);
        b.move_to(900.0, &s, &mut st);
        b.end(&s, &mut st);
        assert_eq!(b.pixel_range(), Some((400.0, 500.0)));
        assert_eq!(st.current_selection, Some(SelectionInterval::new(80.0, 100.0)));
    }

    #[test]
    fn click_without_drag_clears_selection() {
        let (mut b, s, mut st) = setup();
        st.current_selection = Some(SelectionInterval::new(10.0, 20.0));
        b.start(300.0, 10.0, &st);
        assert_eq!(b.end(&s, &mut st), None);
        assert_eq!(b.pixel_range(), None);
    }

    #[test]
    fn zero_width_extent_is_a_no_op() {
        let mut b = BrushController::new(BrushVariant::Range, 8.0);
        let s = Scale::Linear(LinearScale::new(0.0, 100.0, 0.0, 0.0));
        let mut st = InteractionState::default();
        b.bind(Rect::new(0.0, 0.0, 0.0, 100.0));
        assert!(!b.start(10.0, 10.0, &st));
        b.move_to(20.0, &s, &mut st);
        assert_eq!(st.current_selection, None);

        b.bind(Rect::new(0.0, 0.0, 500.0, 100.0));
        assert!(b.start(10.0, 10.0, &st));
    }

    #[test]
    fn handles_resize_from_opposite_edge() {
        let (mut b, s, mut st) = setup();
        b.start(100.0, 50.0, &st);
        b.move_to(300.0, &s, &mut st);
        b.end(&s, &mut st);

        let (_, end) = b.handle_centers().unwrap();
        assert_eq!(b.hit_test(end.x, end.y), Some(BrushEdge::End));
        assert!(b.start(end.x, end.y, &st));
        b.move_to(400.0, &s, &mut st);
        b.end(&s, &mut st);
        assert_eq!(st.current_selection, Some(SelectionInterval::new(20.0, 80.0)));
    }

    #[test]
    fn handles_stay_inside_plot() {
        let (mut b, s, mut st) = setup();
        b.start(0.0, 50.0, &st);
        b.move_to(500.0, &s, &mut st);
        b.end(&s, &mut st);
        let (a, c) = b.handle_centers().unwrap();
        assert_eq!(a.x, 4.0);
        assert_eq!(c.x, 496.0);
    }

    #[test]
    fn slider_uses_circles_and_baseline() {
        let mut b = BrushController::new(BrushVariant::Slider, 6.0);
        b.bind(Rect::new(0.0, 0.0, 500.0, 100.0));
        let s = Scale::Linear(LinearScale::new(0.0, 100.0, 0.0, 500.0));
        let mut st = InteractionState::default();
        b.start(100.0, 10.0, &st);
        b.move_to(200.0, &s, &mut st);
        b.end(&s, &mut st);
        assert_eq!(b.size(), Size::new(12.0, 12.0));
        let prims = b.primitives(&BrushStyle::default());
        let circles = prims
            .iter()
            .filter(|p| matches!(p, Primitive::Circle { .. }))
            .count();
        assert_eq!(circles, 2);
        assert!(matches!(prims[0], Primitive::Line { .. }));
    }
}
