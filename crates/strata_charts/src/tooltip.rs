//! Hover lookup and tooltip placement.

use strata_core::{Listeners, Point, Rect};

use crate::interaction::InteractionState;
use crate::scale::Scale;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TooltipSide {
    #[default]
    Left,
    Right,
}

/// Hovered-bucket notification. `visible == false` is the hide event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverEvent {
    pub key: Option<f64>,
    pub lane: Option<usize>,
    /// Tooltip anchor in chart pixels.
    pub position: Point,
    pub side: TooltipSide,
    pub visible: bool,
}

impl HoverEvent {
    fn hidden() -> Self {
        Self {
            key: None,
            lane: None,
            position: Point::ZERO,
            side: TooltipSide::Left,
            visible: false,
        }
    }
}

/// Lane row under the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneHit {
    pub index: usize,
}

/// Everything a hover lookup needs, resolved for one pointer callback.
#[derive(Clone, Copy, Debug)]
pub struct HoverQuery<'a> {
    pub pointer: Point,
    pub plot: Rect,
    pub scale: &'a Scale,
    /// Sorted bucket keys of the hovered series or lane.
    pub keys: &'a [f64],
    pub bucket_width: f64,
    pub lane: Option<LaneHit>,
    /// Extra horizontal offset contributed by the chart kind.
    pub strategy_offset: f64,
}

pub struct TooltipPositioner {
    pub x_offset: f64,
    pub y_offset: f64,
    /// Pixel window for continuous scales.
    pub tolerance: f64,
    pub on_hover: Listeners<HoverEvent>,
}

impl TooltipPositioner {
    pub fn new(x_offset: f64, y_offset: f64, tolerance: f64) -> Self {
        Self {
            x_offset,
            y_offset,
            tolerance,
            on_hover: Listeners::new(),
        }
    }

    /// Bucket key under pixel `x`: the first band whose `[start, end)` span
    /// contains `x`, or for continuous scales the first key within tolerance.
    pub fn locate(&self, x: f64, scale: &Scale, keys: &[f64], bucket_width: f64) -> Option<f64> {
        match scale {
            Scale::Band(_) => keys.iter().copied().find(|&k| {
                let (start, end) = scale.bucket_span(k, bucket_width);
                x >= start && x < end
            }),
            _ => keys
                .iter()
                .copied()
                .find(|&k| (scale.map(k) - x).abs() <= self.tolerance),
        }
    }

    /// Anchor and side for a pointer inside `plot`.
    pub fn anchor(
        &self,
        pointer: Point,
        plot: Rect,
        lane: Option<LaneHit>,
        extra: f64,
    ) -> (Point, TooltipSide) {
        let dx = self.x_offset + extra;
        let (x, side) = if pointer.x - plot.x() > plot.width() * 0.5 {
            (pointer.x - dx, TooltipSide::Right)
        } else {
            (pointer.x + dx, TooltipSide::Left)
        };
        // Each lane below the first adds one more vertical step.
        let lane_steps = lane.map_or(0.0, |l| l.index as f64);
        let y = pointer.y + self.y_offset * (1.0 + lane_steps);
        (Point::new(x, y), side)
    }

    pub fn hover(&mut self, q: HoverQuery<'_>, state: &mut InteractionState) -> Option<HoverEvent> {
        if !q.plot.contains(q.pointer) {
            self.leave(state);
            return None;
        }
        let Some(key) = self.locate(q.pointer.x, q.scale, q.keys, q.bucket_width) else {
            self.leave(state);
            return None;
        };

        let (position, side) = self.anchor(q.pointer, q.plot, q.lane, q.strategy_offset);
        let ev = HoverEvent {
            key: Some(key),
            lane: q.lane.map(|l| l.index),
            position,
            side,
            visible: true,
        };
        state.hovered_key = Some(key);
        state.hovered_lane = ev.lane;
        state.tooltip_visible = true;
        self.on_hover.emit(&ev);
        Some(ev)
    }

    /// Hide the tooltip. Notifies once; repeated calls while hidden are silent.
    pub fn leave(&mut self, state: &mut InteractionState) {
        state.clear_hover();
        if !state.tooltip_visible {
            return;
        }
        state.tooltip_visible = false;
        tracing::trace!("tooltip hidden");
        self.on_hover.emit(&HoverEvent::hidden());
    }
}

impl std::fmt::Debug for TooltipPositioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TooltipPositioner")
            .field("x_offset", &self.x_offset)
            .field("y_offset", &self.y_offset)
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::scale::{BandScale, LinearScale};

    fn band() -> Scale {
        Scale::Band(BandScale::new(vec![0.0, 1.0, 2.0, 3.0], 0.0, 400.0, 1.0))
    }

    fn query<'a>(x: f64, scale: &'a Scale, keys: &'a [f64]) -> HoverQuery<'a> {
        HoverQuery {
            pointer: Point::new(x, 50.0),
            plot: Rect::new(0.0, 0.0, 400.0, 100.0),
            scale,
            keys,
            bucket_width: 1.0,
            lane: None,
            strategy_offset: 0.0,
        }
    }

    #[test]
    fn band_lookup_is_half_open() {
        let t = TooltipPositioner::new(10.0, 10.0, 10.0);
        let s = band();
        let keys = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(t.locate(99.9, &s, &keys, 1.0), Some(0.0));
        assert_eq!(t.locate(100.0, &s, &keys, 1.0), Some(1.0));
        assert_eq!(t.locate(400.0, &s, &keys, 1.0), None);
    }

    #[test]
    fn continuous_lookup_uses_tolerance() {
        let t = TooltipPositioner::new(10.0, 10.0, 5.0);
        let s = Scale::Linear(LinearScale::new(0.0, 4.0, 0.0, 400.0));
        let keys = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(t.locate(104.0, &s, &keys, 1.0), Some(1.0));
        assert_eq!(t.locate(150.0, &s, &keys, 1.0), None);
    }

    #[test]
    fn side_flips_past_half_width() {
        let mut t = TooltipPositioner::new(10.0, 5.0, 10.0);
        let s = band();
        let keys = [0.0, 1.0, 2.0, 3.0];
        let mut st = InteractionState::default();

        let left = t.hover(query(150.0, &s, &keys), &mut st).unwrap();
        assert_eq!(left.side, TooltipSide::Left);
        assert_eq!(left.position, Point::new(160.0, 55.0));

        let right = t.hover(query(250.0, &s, &keys), &mut st).unwrap();
        assert_eq!(right.side, TooltipSide::Right);
        assert_eq!(right.position, Point::new(240.0, 55.0));
        assert_eq!(st.hovered_key, Some(2.0));
    }

    #[test]
    fn lane_rows_offset_vertical_anchor() {
        let t = TooltipPositioner::new(10.0, 5.0, 10.0);
        let plot = Rect::new(0.0, 0.0, 400.0, 100.0);
        let pointer = Point::new(10.0, 75.0);
        let (first, _) = t.anchor(pointer, plot, Some(LaneHit { index: 0 }), 0.0);
        assert_eq!(first.y, 80.0);
        let (third, _) = t.anchor(pointer, plot, Some(LaneHit { index: 2 }), 0.0);
        assert_eq!(third.y, 90.0);
        let (plain, _) = t.anchor(pointer, plot, None, 0.0);
        assert_eq!(plain.y, 80.0);
    }

    #[test]
    fn hide_fires_once_per_leave() {
        let mut t = TooltipPositioner::new(10.0, 10.0, 10.0);
        let hides = Rc::new(Cell::new(0));
        let sink = hides.clone();
        t.on_hover.subscribe(move |e: &HoverEvent| {
            if !e.visible {
                sink.set(sink.get() + 1);
            }
        });
        let s = band();
        let keys = [0.0, 1.0, 2.0, 3.0];
        let mut st = InteractionState::default();

        t.hover(query(50.0, &s, &keys), &mut st);
        t.hover(query(-20.0, &s, &keys), &mut st);
        t.hover(query(-30.0, &s, &keys), &mut st);
        t.leave(&mut st);
        assert_eq!(hides.get(), 1);

        t.hover(query(50.0, &s, &keys), &mut st);
        t.leave(&mut st);
        assert_eq!(hides.get(), 2);
    }
}
