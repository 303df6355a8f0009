//! Coordinate scales: continuous linear, continuous time, and discrete bands.

use serde::{Deserialize, Serialize};

use crate::data::DataType;
use crate::time_scale::TimeScale;
use crate::view::Domain1D;

/// Fraction used to widen a degenerate value range before building a value scale.
pub const VALUE_EPSILON_FRACTION: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleKind {
    Linear,
    Time,
    Band,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    pub fn new(domain_min: f64, domain_max: f64, range_min: f64, range_max: f64) -> Self {
        Self {
            domain_min,
            domain_max,
            range_min,
            range_max,
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        let d = self.domain_max - self.domain_min;
        if d.abs() < 1e-12 {
            return self.range_min;
        }
        let t = (value - self.domain_min) / d;
        self.range_min + t * (self.range_max - self.range_min)
    }

    pub fn invert(&self, px: f64) -> f64 {
        let r = self.range_max - self.range_min;
        if r.abs() < 1e-12 {
            return self.domain_min;
        }
        let t = (px - self.range_min) / r;
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    pub fn domain(&self) -> Domain1D {
        Domain1D::new(self.domain_min, self.domain_max)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }

    /// "Nice" ticks (1, 2 or 5 times a power of ten) inside the domain.
    ///
    /// Never returns more than `count` values.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain_min, self.domain_max, count)
    }
}

pub(crate) fn nice_ticks(a: f64, b: f64, count: usize) -> Vec<f64> {
    if count == 0 || !a.is_finite() || !b.is_finite() {
        return Vec::new();
    }
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo <= 0.0 {
        return vec![lo];
    }
    let mut step = tick_increment(lo, hi, count);
    loop {
        let ticks = ticks_with_step(lo, hi, step);
        if ticks.is_empty() {
            return vec![lo];
        }
        if ticks.len() <= count {
            return ticks;
        }
        step = next_nice_step(step);
    }
}

pub(crate) fn tick_increment(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count.max(1) as f64;
    let base = 10f64.powf(raw.log10().floor());
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

pub(crate) fn next_nice_step(step: f64) -> f64 {
    let mut base = 10f64.powf(step.log10().floor());
    let mut m = (step / base).round();
    if m >= 10.0 {
        base *= 10.0;
        m = 1.0;
    }
    let next = if m < 2.0 {
        2.0
    } else if m < 5.0 {
        5.0
    } else {
        10.0
    };
    next * base
}

fn ticks_with_step(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0) {
        return Vec::new();
    }
    // Sub-unit steps are generated through their integer inverse to avoid drift.
    let inv = (step < 1.0).then(|| (1.0 / step).round());
    let (i0, i1) = match inv {
        None => ((lo / step).ceil(), (hi / step).floor()),
        Some(inv) => ((lo * inv).ceil(), (hi * inv).floor()),
    };
    if i1 < i0 {
        return Vec::new();
    }
    let n = (i1 - i0) as usize + 1;
    (0..n)
        .map(|k| {
            let i = i0 + k as f64;
            let v = match inv {
                None => i * step,
                Some(inv) => i / inv,
            };
            v + 0.0
        })
        .collect()
}

/// Widen a degenerate `[min, max]` value range so a value scale stays invertible.
pub fn value_extent(min: f64, max: f64) -> Domain1D {
    if !(min.is_finite() && max.is_finite()) {
        return Domain1D::new(0.0, 1.0);
    }
    if max > min {
        return Domain1D::new(min, max);
    }
    let eps = if min == 0.0 {
        1.0
    } else {
        min.abs() * VALUE_EPSILON_FRACTION
    };
    Domain1D::new(min - eps, min + eps)
}

/// Ordered bucket keys mapped to equal-width pixel slots with zero padding.
#[derive(Clone, Debug, PartialEq)]
pub struct BandScale {
    keys: Vec<f64>,
    range_min: f64,
    range_max: f64,
    step: f64,
    bucket_width: f64,
}

impl BandScale {
    /// `keys` must be sorted ascending; `bucket_width` is the domain width of one band.
    pub fn new(keys: Vec<f64>, range_min: f64, range_max: f64, bucket_width: f64) -> Self {
        let step = if keys.is_empty() {
            0.0
        } else {
            (range_max - range_min) / keys.len() as f64
        };
        Self {
            keys,
            range_min,
            range_max,
            step,
            bucket_width,
        }
    }

    pub fn step_width(&self) -> f64 {
        self.step
    }

    pub fn bucket_width(&self) -> f64 {
        self.bucket_width
    }

    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn band_start(&self, idx: usize) -> Option<f64> {
        if idx >= self.keys.len() {
            return None;
        }
        Some(self.range_min + self.step * idx as f64)
    }

    pub fn center(&self, idx: usize) -> Option<f64> {
        self.band_start(idx).map(|x| x + self.step * 0.5)
    }

    pub fn index_of(&self, key: f64) -> Option<usize> {
        self.keys.binary_search_by(|k| k.total_cmp(&key)).ok()
    }

    /// Band whose half-open `[start, start + step)` span contains `px`.
    pub fn index_at(&self, px: f64) -> Option<usize> {
        if self.step <= 0.0 || px < self.range_min || px >= self.range_max {
            return None;
        }
        let i = ((px - self.range_min) / self.step).floor() as usize;
        Some(i.min(self.keys.len() - 1))
    }

    /// Map a domain value to pixels. Keys land on their band start; values
    /// between keys interpolate inside the band of the preceding key.
    pub fn map(&self, value: f64) -> f64 {
        let Some(&first) = self.keys.first() else {
            return self.range_min;
        };
        let width = if self.bucket_width > 0.0 {
            self.bucket_width
        } else {
            1.0
        };
        if value.is_nan() {
            return self.range_min;
        }
        if value < first {
            return self.range_min + (value - first) / width * self.step;
        }
        let i = self.keys.partition_point(|k| *k <= value) - 1;
        let mut frac = (value - self.keys[i]) / width;
        if i + 1 < self.keys.len() {
            frac = frac.min(1.0);
        }
        self.range_min + self.step * i as f64 + frac * self.step
    }

    /// Key of the band under `px` (clamped to the first/last band).
    pub fn invert(&self, px: f64) -> f64 {
        match self.clamped_index(px) {
            Some(i) => self.keys[i],
            None => 0.0,
        }
    }

    /// Domain value under `px`, interpolating inside the band.
    pub fn invert_continuous(&self, px: f64) -> f64 {
        let Some(i) = self.clamped_index(px) else {
            return 0.0;
        };
        let start = self.range_min + self.step * i as f64;
        let frac = if self.step > 0.0 {
            (px - start) / self.step
        } else {
            0.0
        };
        self.keys[i] + frac * self.bucket_width
    }

    fn clamped_index(&self, px: f64) -> Option<usize> {
        if self.keys.is_empty() {
            return None;
        }
        if self.step <= 0.0 {
            return Some(0);
        }
        let i = ((px - self.range_min) / self.step).floor();
        Some(i.clamp(0.0, (self.keys.len() - 1) as f64) as usize)
    }

    /// Every `ceil(len / count)`-th key, starting at the first band.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        if count == 0 || self.keys.is_empty() {
            return Vec::new();
        }
        let stride = self.keys.len().div_ceil(count);
        self.keys.iter().copied().step_by(stride.max(1)).collect()
    }

    pub fn domain(&self) -> Domain1D {
        match (self.keys.first(), self.keys.last()) {
            (Some(&a), Some(&b)) => Domain1D::new(a, b + self.bucket_width),
            _ => Domain1D::new(0.0, 0.0),
        }
    }
}

/// A monotonic, invertible `value -> pixel` mapping.
#[derive(Clone, Debug, PartialEq)]
pub enum Scale {
    Linear(LinearScale),
    Time(TimeScale),
    Band(BandScale),
}

impl Scale {
    pub fn kind(&self) -> ScaleKind {
        match self {
            Scale::Linear(_) => ScaleKind::Linear,
            Scale::Time(_) => ScaleKind::Time,
            Scale::Band(_) => ScaleKind::Band,
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        match self {
            Scale::Linear(s) => s.map(value),
            Scale::Time(s) => s.map(value),
            Scale::Band(s) => s.map(value),
        }
    }

    /// Inverse of [`Scale::map`]. Band scales return the key of the band under `px`.
    pub fn invert(&self, px: f64) -> f64 {
        match self {
            Scale::Linear(s) => s.invert(px),
            Scale::Time(s) => s.invert(px),
            Scale::Band(s) => s.invert(px),
        }
    }

    /// Continuous inverse, used for brushing.
    pub fn invert_continuous(&self, px: f64) -> f64 {
        match self {
            Scale::Band(s) => s.invert_continuous(px),
            other => other.invert(px),
        }
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            Scale::Linear(s) => s.range(),
            Scale::Time(s) => s.range(),
            Scale::Band(s) => (s.range_min, s.range_max),
        }
    }

    pub fn domain(&self) -> Domain1D {
        match self {
            Scale::Linear(s) => s.domain(),
            Scale::Time(s) => s.domain(),
            Scale::Band(s) => s.domain(),
        }
    }

    pub fn step_width(&self) -> Option<f64> {
        match self {
            Scale::Band(s) => Some(s.step_width()),
            _ => None,
        }
    }

    pub fn as_band(&self) -> Option<&BandScale> {
        match self {
            Scale::Band(s) => Some(s),
            _ => None,
        }
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match self {
            Scale::Linear(s) => s.ticks(count),
            Scale::Time(s) => s.ticks(count),
            Scale::Band(s) => s.ticks(count),
        }
    }

    /// Pixel span `[map(key), map(key + width)]` of one bucket.
    pub fn bucket_span(&self, key: f64, width: f64) -> (f64, f64) {
        match self {
            Scale::Band(s) => match s.index_of(key).and_then(|i| s.band_start(i)) {
                Some(x) => (x, x + s.step_width()),
                None => (s.map(key), s.map(key + width)),
            },
            other => (other.map(key), other.map(key + width)),
        }
    }
}

/// Domain handed to [`ScaleFactory::build`].
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleDomain {
    Extent(Domain1D),
    Keys { keys: Vec<f64>, bucket_width: f64 },
}

pub struct ScaleFactory;

impl ScaleFactory {
    /// Build a scale of `kind` from `domain` onto the pixel range `range`.
    ///
    /// A single-value extent is widened to a unit neighborhood (one unit for
    /// linear, one day for time) so the scale stays invertible.
    pub fn build(domain: ScaleDomain, range: (f64, f64), kind: ScaleKind) -> Scale {
        match kind {
            ScaleKind::Band => {
                let (keys, width) = match domain {
                    ScaleDomain::Keys { keys, bucket_width } => (keys, bucket_width),
                    ScaleDomain::Extent(d) => {
                        let width = if d.span() > 0.0 { d.span() } else { 1.0 };
                        (vec![d.min], width)
                    }
                };
                Scale::Band(BandScale::new(keys, range.0, range.1, width))
            }
            ScaleKind::Linear | ScaleKind::Time => {
                let unit = if kind == ScaleKind::Time {
                    DataType::Time.default_interval()
                } else {
                    DataType::Numeric.default_interval()
                };
                let mut extent = match domain {
                    ScaleDomain::Extent(d) => d,
                    ScaleDomain::Keys { keys, bucket_width } => match (keys.first(), keys.last())
                    {
                        (Some(&a), Some(&b)) => Domain1D::new(a, b + bucket_width),
                        _ => Domain1D::new(0.0, unit),
                    },
                };
                if !(extent.min.is_finite() && extent.max.is_finite()) {
                    extent = Domain1D::new(0.0, unit);
                }
                if extent.span() <= 0.0 {
                    extent = Domain1D::new(extent.min, extent.min + unit);
                }
                if kind == ScaleKind::Time {
                    Scale::Time(TimeScale::new(extent.min, extent.max, range.0, range.1))
                } else {
                    Scale::Linear(LinearScale::new(extent.min, extent.max, range.0, range.1))
                }
            }
        }
    }
}
