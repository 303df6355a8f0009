//! Continuous time scale over UTC epoch milliseconds with calendar-aware ticks.

use chrono::{Datelike, NaiveDate, TimeZone, Utc};

use crate::scale::{next_nice_step, nice_ticks, tick_increment, LinearScale};
use crate::view::Domain1D;

const SECOND: i64 = 1_000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const AVG_MONTH_MS: f64 = 30.436_875 * DAY as f64;

// Hard cap on generated ticks, independent of the requested count.
const MAX_GENERATED_TICKS: usize = 10_000;

/// Step between two time ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeInterval {
    /// Sub-second steps, generated as plain numeric ticks.
    Millis(i64),
    Fixed(i64),
    Months(u32),
}

impl TimeInterval {
    pub fn approx_ms(&self) -> f64 {
        match *self {
            TimeInterval::Millis(ms) | TimeInterval::Fixed(ms) => ms as f64,
            TimeInterval::Months(n) => n as f64 * AVG_MONTH_MS,
        }
    }
}

const CANDIDATES: &[TimeInterval] = &[
    TimeInterval::Fixed(SECOND),
    TimeInterval::Fixed(5 * SECOND),
    TimeInterval::Fixed(15 * SECOND),
    TimeInterval::Fixed(30 * SECOND),
    TimeInterval::Fixed(MINUTE),
    TimeInterval::Fixed(5 * MINUTE),
    TimeInterval::Fixed(15 * MINUTE),
    TimeInterval::Fixed(30 * MINUTE),
    TimeInterval::Fixed(HOUR),
    TimeInterval::Fixed(3 * HOUR),
    TimeInterval::Fixed(6 * HOUR),
    TimeInterval::Fixed(12 * HOUR),
    TimeInterval::Fixed(DAY),
    TimeInterval::Fixed(2 * DAY),
    TimeInterval::Fixed(7 * DAY),
    TimeInterval::Months(1),
    TimeInterval::Months(3),
    TimeInterval::Months(6),
    TimeInterval::Months(12),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    linear: LinearScale,
}

impl TimeScale {
    pub fn new(domain_min: f64, domain_max: f64, range_min: f64, range_max: f64) -> Self {
        Self {
            linear: LinearScale::new(domain_min, domain_max, range_min, range_max),
        }
    }

    pub fn map(&self, ms: f64) -> f64 {
        self.linear.map(ms)
    }

    pub fn invert(&self, px: f64) -> f64 {
        self.linear.invert(px)
    }

    pub fn domain(&self) -> Domain1D {
        self.linear.domain()
    }

    pub fn range(&self) -> (f64, f64) {
        self.linear.range()
    }

    /// Interval picked by [`TimeScale::ticks`] for `count`.
    pub fn tick_interval(&self, count: usize) -> Option<TimeInterval> {
        self.ticks_with_interval(count).map(|(iv, _)| iv)
    }

    /// Calendar-aligned ticks; never more than `count` values.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        self.ticks_with_interval(count)
            .map(|(_, t)| t)
            .unwrap_or_default()
    }

    fn ticks_with_interval(&self, count: usize) -> Option<(TimeInterval, Vec<f64>)> {
        let d = self.domain();
        if count == 0 || !d.is_valid() {
            return None;
        }
        let (lo, hi) = (d.min, d.max);
        let span = hi - lo;

        if span / (count as f64) < SECOND as f64 {
            let step = tick_increment(lo, hi, count);
            return Some((TimeInterval::Millis(step.max(1.0) as i64), nice_ticks(lo, hi, count)));
        }

        for &iv in CANDIDATES {
            if span / iv.approx_ms() > count as f64 {
                continue;
            }
            let ticks = generate(iv, lo, hi);
            if !ticks.is_empty() && ticks.len() <= count {
                return Some((iv, ticks));
            }
        }

        // Multi-year steps: 1, 2, 5, 10 ... years.
        let years = span / (12.0 * AVG_MONTH_MS);
        let mut step = tick_increment(0.0, years, count).max(1.0).round();
        loop {
            let iv = TimeInterval::Months((step as u32).saturating_mul(12));
            let ticks = generate(iv, lo, hi);
            if ticks.len() <= count || step > 1e6 {
                return Some((iv, ticks));
            }
            step = next_nice_step(step).round();
        }
    }
}

fn generate(iv: TimeInterval, lo: f64, hi: f64) -> Vec<f64> {
    match iv {
        TimeInterval::Millis(_) => Vec::new(),
        TimeInterval::Fixed(ms) => fixed_ticks(ms as f64, lo, hi),
        TimeInterval::Months(n) => month_ticks(n, lo, hi),
    }
}

fn fixed_ticks(step: f64, lo: f64, hi: f64) -> Vec<f64> {
    let mut out = Vec::new();
    let mut t = (lo / step).ceil() * step;
    while t <= hi && out.len() < MAX_GENERATED_TICKS {
        out.push(t);
        t += step;
    }
    out
}

fn month_ticks(n: u32, lo: f64, hi: f64) -> Vec<f64> {
    let n = n.max(1) as i32;
    let Some(start) = Utc.timestamp_millis_opt(lo.floor() as i64).single() else {
        return Vec::new();
    };
    let mut index = start.year() * 12 + start.month0() as i32;
    index -= index.rem_euclid(n);

    let mut out = Vec::new();
    while out.len() < MAX_GENERATED_TICKS {
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;
        let Some(midnight) =
            NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        else {
            break;
        };
        let ms = midnight.and_utc().timestamp_millis() as f64;
        if ms > hi {
            break;
        }
        if ms >= lo {
            out.push(ms);
        }
        index += n;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(y: i32, m: u32, d: u32) -> f64 {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
            .unwrap()
            .timestamp_millis() as f64
    }

    #[test]
    fn daily_ticks_align_to_midnight() {
        let s = TimeScale::new(ms(2024, 1, 1) + 3.0 * HOUR as f64, ms(2024, 1, 6), 0.0, 500.0);
        let t = s.ticks(9);
        assert_eq!(t.first().copied(), Some(ms(2024, 1, 2)));
        assert_eq!(s.tick_interval(9), Some(TimeInterval::Fixed(DAY)));
        assert!(t.len() <= 9);
    }

    #[test]
    fn month_ticks_follow_calendar() {
        let s = TimeScale::new(ms(2023, 1, 15), ms(2023, 12, 31), 0.0, 500.0);
        let t = s.ticks(6);
        assert!(t.len() <= 6);
        assert!(t.contains(&ms(2023, 7, 1)));
        assert_eq!(s.tick_interval(6), Some(TimeInterval::Months(3)));
    }

    #[test]
    fn multi_year_ticks_respect_count() {
        let s = TimeScale::new(ms(1900, 1, 1), ms(2020, 1, 1), 0.0, 500.0);
        let t = s.ticks(5);
        assert!(!t.is_empty());
        assert!(t.len() <= 5);
    }

    #[test]
    fn sub_second_spans_fall_back_to_numeric_ticks() {
        let s = TimeScale::new(0.0, 500.0, 0.0, 100.0);
        let t = s.ticks(5);
        assert!(t.len() <= 5);
        assert!(matches!(s.tick_interval(5), Some(TimeInterval::Millis(_))));
    }

    #[test]
    fn invert_round_trips() {
        let s = TimeScale::new(ms(2024, 1, 1), ms(2024, 2, 1), 0.0, 310.0);
        let v = ms(2024, 1, 17);
        assert!((s.invert(s.map(v)) - v).abs() < 1e-3);
    }
}
