//! Input data model: buckets, series and swimlane collections.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const MS_PER_DAY: f64 = 86_400_000.0;

/// How bucket keys are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    #[default]
    Numeric,
    /// Keys are UTC epoch milliseconds.
    Time,
}

impl DataType {
    /// Bucket width used when a series has no positive gap between keys.
    pub fn default_interval(self) -> f64 {
        match self {
            DataType::Numeric => 1.0,
            DataType::Time => MS_PER_DAY,
        }
    }
}

/// One bucket of input data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub key: f64,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
}

impl DataPoint {
    pub fn new(key: f64, value: f64) -> Self {
        Self {
            key,
            value,
            series_id: None,
        }
    }

    pub fn at_time(time: DateTime<Utc>, value: f64) -> Self {
        Self::new(time.timestamp_millis() as f64, value)
    }

    pub fn with_series(mut self, id: impl Into<String>) -> Self {
        self.series_id = Some(id.into());
        self
    }
}

/// A single series with keys sorted ascending and unique.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    pub id: Option<String>,
    pub keys: Vec<f64>,
    pub values: Vec<f64>,
}

impl Series {
    /// Build from unordered points. Non-finite entries are dropped; for
    /// duplicated keys the first occurrence wins.
    pub fn from_points<'a, I>(id: Option<String>, points: I) -> Self
    where
        I: IntoIterator<Item = &'a DataPoint>,
    {
        let mut pairs: Vec<(f64, f64)> = points
            .into_iter()
            .filter(|p| p.key.is_finite() && p.value.is_finite())
            .map(|p| (p.key, p.value))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs.dedup_by(|b, a| a.0 == b.0);
        let (keys, values) = pairs.into_iter().unzip();
        Self { id, keys, values }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_extent(&self) -> Option<(f64, f64)> {
        Some((*self.keys.first()?, *self.keys.last()?))
    }

    pub fn value_extent(&self) -> Option<(f64, f64)> {
        let mut it = self.values.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    pub fn min_gap(&self) -> Option<f64> {
        min_positive_gap(&self.keys)
    }
}

/// Group points by `series_id` (first-seen order) and sort each series.
pub fn merge_series(points: &[DataPoint]) -> Vec<Series> {
    let mut groups: IndexMap<Option<&str>, Vec<&DataPoint>> = IndexMap::new();
    for p in points {
        groups.entry(p.series_id.as_deref()).or_default().push(p);
    }
    groups
        .into_iter()
        .map(|(id, pts)| Series::from_points(id.map(str::to_string), pts))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Smallest strictly positive gap between consecutive sorted keys.
pub fn min_positive_gap(sorted_keys: &[f64]) -> Option<f64> {
    sorted_keys
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| d.is_finite() && *d > 0.0)
        .min_by(|a, b| a.total_cmp(b))
}

/// Bucket width across several series; falls back to the type default.
pub fn data_interval<'a, I>(series: I, data_type: DataType) -> f64
where
    I: IntoIterator<Item = &'a Series>,
{
    series
        .into_iter()
        .filter(|s| s.len() >= 2)
        .filter_map(Series::min_gap)
        .min_by(|a, b| a.total_cmp(b))
        .unwrap_or_else(|| data_type.default_interval())
}

/// Insertion-ordered lanes, each with its own buckets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SwimlaneCollection {
    lanes: IndexMap<String, Series>,
}

impl SwimlaneCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a lane. Replacing keeps the lane's original position.
    pub fn insert(&mut self, name: impl Into<String>, points: &[DataPoint]) {
        let name = name.into();
        let series = Series::from_points(Some(name.clone()), points);
        self.lanes.insert(name, series);
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// True when no lane holds a bucket.
    pub fn is_empty(&self) -> bool {
        self.lanes.values().all(Series::is_empty)
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.lanes.get(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lanes.get_index_of(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.lanes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lanes.keys().map(String::as_str)
    }

    pub fn bucket_count(&self) -> usize {
        self.lanes.values().map(Series::len).sum()
    }

    /// `(first key, last key)` over the union of all lanes.
    pub fn interval_borders(&self) -> Option<(f64, f64)> {
        self.lanes
            .values()
            .filter_map(Series::key_extent)
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
    }

    pub fn data_interval(&self, data_type: DataType) -> f64 {
        data_interval(self.lanes.values(), data_type)
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<DataPoint>)> for SwimlaneCollection {
    fn from_iter<T: IntoIterator<Item = (S, Vec<DataPoint>)>>(iter: T) -> Self {
        let mut c = SwimlaneCollection::new();
        for (name, points) in iter {
            c.insert(name, &points);
        }
        c
    }
}

/// Chart input: plain (possibly multi-) series or swimlanes.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartData {
    Series(Vec<DataPoint>),
    Swimlanes(SwimlaneCollection),
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Series(points) => !points
                .iter()
                .any(|p| p.key.is_finite() && p.value.is_finite()),
            ChartData::Swimlanes(lanes) => lanes.is_empty(),
        }
    }
}

impl Default for ChartData {
    fn default() -> Self {
        ChartData::Series(Vec::new())
    }
}
