use strata_core::{Rect, Size};

use crate::config::Margins;

/// 1D numeric domain (min..max).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain1D {
    pub min: f64,
    pub max: f64,
}

impl Domain1D {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max > self.min
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// True when `[start, end]` lies inside the domain.
    pub fn contains_span(&self, start: f64, end: f64) -> bool {
        self.contains(start.min(end)) && self.contains(start.max(end))
    }

    /// True when `[start, end]` shares at least one point with the domain.
    pub fn intersects(&self, start: f64, end: f64) -> bool {
        start.min(end) <= self.max && start.max(end) >= self.min
    }

    /// Grow the domain so it contains `[start, end]`. Non-finite bounds are ignored.
    pub fn include(&mut self, start: f64, end: f64) {
        for v in [start, end] {
            if v.is_finite() {
                self.min = self.min.min(v);
                self.max = self.max.max(v);
            }
        }
    }

    pub fn union(mut self, other: Domain1D) -> Self {
        self.include(other.min, other.max);
        self
    }

    /// Widen a degenerate domain to at least `min_span`, centered on its midpoint.
    pub fn clamp_span_min(&mut self, min_span: f64) {
        let span = self.span();
        if span < min_span {
            let mid = (self.min + self.max) * 0.5;
            self.min = mid - min_span * 0.5;
            self.max = mid + min_span * 0.5;
        }
    }
}

/// Resolve the plotting rectangle inside a chart of `size`, honoring margins
/// and an optional left column (swimlane labels).
pub fn plot_rect(size: Size, margins: &Margins, left_column: f64) -> Rect {
    let left = margins.left + left_column.max(0.0);
    let top = margins.top;
    let w = (size.width - left - margins.right).max(0.0);
    let h = (size.height - top - margins.bottom).max(0.0);
    Rect::new(left, top, w, h)
}
