//! Committed brush selections keyed by a deterministic id.

use std::fmt;
use std::hash::Hasher;

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::view::Domain1D;

/// A `[start, end]` range in domain units, always stored with `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionInterval {
    pub start: f64,
    pub end: f64,
}

impl SelectionInterval {
    pub fn new(a: f64, b: f64) -> Self {
        // `+ 0.0` folds -0 into 0 so ids do not depend on the sign of zero.
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self {
            start: start + 0.0,
            end: end + 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// True when `[start, end]` of a bucket lies inside this interval.
    pub fn covers(&self, start: f64, end: f64) -> bool {
        start >= self.start && end <= self.end
    }

    /// Deterministic id from the bit patterns of `(start, end)`.
    ///
    /// Numeric and temporal keys share one representation (f64), so the same
    /// range always produces the same id.
    pub fn id(&self) -> IntervalId {
        let hash = |seed: u64| {
            let mut h = FxHasher::default();
            h.write_u64(seed);
            h.write_u64(self.start.to_bits());
            h.write_u64(self.end.to_bits());
            h.finish()
        };
        let hi = hash(0x5157_4d3c_a91e_0001);
        let lo = hash(0x0be2_77f4_3c6d_0002);
        IntervalId(format!(
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            hi >> 32,
            (hi >> 16) & 0xffff,
            hi & 0xffff,
            lo >> 48,
            lo & 0xffff_ffff_ffff
        ))
    }
}

/// Opaque GUID-style identifier of a committed selection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntervalId(String);

impl IntervalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insertion-ordered set of committed selections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntervalSet {
    entries: IndexMap<IntervalId, SelectionInterval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit `interval`. Re-adding an identical range is a no-op and returns
    /// the existing id.
    pub fn add(&mut self, interval: SelectionInterval) -> IntervalId {
        let interval = SelectionInterval::new(interval.start, interval.end);
        let id = interval.id();
        self.entries.entry(id.clone()).or_insert(interval);
        id
    }

    pub fn contains(&self, id: &IntervalId) -> bool {
        self.entries.contains_key(id)
    }

    /// Remove by id, preserving the order of the remaining entries.
    pub fn remove(&mut self, id: &IntervalId) -> Option<SelectionInterval> {
        self.entries.shift_remove(id)
    }

    pub fn get(&self, id: &IntervalId) -> Option<SelectionInterval> {
        self.entries.get(id).copied()
    }

    pub fn all(&self) -> Vec<(IntervalId, SelectionInterval)> {
        self.entries
            .iter()
            .map(|(id, iv)| (id.clone(), *iv))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IntervalId, &SelectionInterval)> {
        self.entries.iter()
    }

    pub fn intervals(&self) -> impl Iterator<Item = SelectionInterval> + '_ {
        self.entries.values().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace every entry with `intervals`, in order.
    pub fn replace<I>(&mut self, intervals: I)
    where
        I: IntoIterator<Item = SelectionInterval>,
    {
        self.entries.clear();
        for iv in intervals {
            self.add(iv);
        }
    }

    /// Union of all committed intervals plus `active`.
    pub fn extent(&self, active: Option<SelectionInterval>) -> Option<Domain1D> {
        self.intervals()
            .chain(active)
            .filter(SelectionInterval::is_finite)
            .map(|iv| Domain1D::new(iv.start, iv.end))
            .reduce(Domain1D::union)
    }

    /// True when the committed intervals plus `active` reach outside `data`.
    pub fn bounds_exceed_data(&self, data: Domain1D, active: Option<SelectionInterval>) -> bool {
        self.extent(active)
            .is_some_and(|e| e.min < data.min || e.max > data.max)
    }

    /// Drop intervals that intersected the `previous` data but miss the
    /// refreshed `data`; returns the removed ids. Intervals that never touched
    /// the data stay, they widen the axis instead.
    pub fn prune(&mut self, previous: Domain1D, data: Domain1D) -> Vec<IntervalId> {
        let mut removed = Vec::new();
        self.entries.retain(|id, iv| {
            let keep = iv.is_finite() && !is_stale(*iv, previous, data);
            if !keep {
                removed.push(id.clone());
            }
            keep
        });
        removed
    }
}

/// Covered by the old data, outside the new one.
pub fn is_stale(iv: SelectionInterval, previous: Domain1D, data: Domain1D) -> bool {
    previous.intersects(iv.start, iv.end) && !data.intersects(iv.start, iv.end)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ids_are_deterministic_and_order_insensitive() {
        let a = SelectionInterval::new(1.0, 4.0).id();
        let b = SelectionInterval::new(4.0, 1.0).id();
        assert_eq!(a, b);
        assert_ne!(a, SelectionInterval::new(1.0, 5.0).id());
        assert_eq!(a.as_str().len(), 36);
        assert_eq!(
            SelectionInterval::new(-0.0, 1.0).id(),
            SelectionInterval::new(0.0, 1.0).id()
        );
    }

    #[test]
    fn re_adding_collides() {
        let mut set = IntervalSet::new();
        let a = set.add(SelectionInterval::new(0.0, 2.0));
        let b = set.add(SelectionInterval::new(2.0, 0.0));
        assert_eq!(a, b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_keeps_order_of_rest() {
        let mut set = IntervalSet::new();
        let a = set.add(SelectionInterval::new(0.0, 1.0));
        let before = set.clone();
        let b = set.add(SelectionInterval::new(5.0, 6.0));
        let c = set.add(SelectionInterval::new(2.0, 3.0));
        assert_eq!(set.remove(&b), Some(SelectionInterval::new(5.0, 6.0)));
        let ids: Vec<_> = set.all().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c.clone()]);
        set.remove(&c);
        assert_eq!(set, before);
        assert_eq!(set.get(&c), None);
    }

    #[test]
    fn bounds_exceed_data_considers_active() {
        let mut set = IntervalSet::new();
        set.add(SelectionInterval::new(2.0, 8.0));
        let data = Domain1D::new(0.0, 10.0);
        assert!(!set.bounds_exceed_data(data, None));
        assert!(set.bounds_exceed_data(data, Some(SelectionInterval::new(9.0, 12.0))));
        set.add(SelectionInterval::new(-3.0, 1.0));
        assert!(set.bounds_exceed_data(data, None));
    }

    #[test]
    fn prune_drops_intervals_the_data_shrank_away_from() {
        let mut set = IntervalSet::new();
        set.add(SelectionInterval::new(2.0, 8.0));
        let gone = set.add(SelectionInterval::new(20.0, 30.0));
        set.add(SelectionInterval::new(60.0, 70.0));
        let removed = set.prune(Domain1D::new(0.0, 50.0), Domain1D::new(0.0, 10.0));
        assert_eq!(removed, vec![gone]);
        assert_eq!(set.len(), 2);
    }
}
