//! Immutable chart configuration.
//!
//! Options deserialize from camelCase JSON; every field has a default so `{}`
//! is a valid configuration.

use anyhow::Context as _;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::data::DataType;

/// Which strategy draws the series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    #[default]
    Bars,
    Area,
    Curve,
    OneDimension,
    Swimlane,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BrushVariant {
    /// Rectangle with square edge handles.
    #[default]
    Range,
    /// Baseline with circular edge handles.
    Slider,
}

/// How swimlane intensities are normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwimlaneRepresentation {
    /// Each lane against its own value range.
    #[default]
    Column,
    /// Every lane against the maximum across all lanes.
    Global,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 10.0,
            bottom: 40.0,
            left: 60.0,
        }
    }
}

/// `clamp(base + log10_factor * log10(bucket_px), min, max)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OneDimensionStroke {
    pub base: f64,
    pub log10_factor: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for OneDimensionStroke {
    fn default() -> Self {
        Self {
            base: 1.0,
            log10_factor: 1.0,
            min: 1.0,
            max: 6.0,
        }
    }
}

impl OneDimensionStroke {
    pub fn width_for(&self, bucket_px: f64) -> f64 {
        let raw = if bucket_px > 0.0 {
            self.base + self.log10_factor * bucket_px.log10()
        } else {
            self.min
        };
        raw.clamp(self.min, self.max.max(self.min))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartOptions {
    pub data_type: DataType,
    pub chart_kind: ChartKind,

    pub x_ticks: usize,
    pub x_labels: usize,
    pub y_ticks: usize,
    pub y_labels: usize,
    pub margins: Margins,

    pub multiselectable: bool,
    pub is_histogram_selectable: bool,
    pub y_axis_from_zero: bool,
    pub bar_weight: f64,
    pub is_smoothed_curve: bool,
    /// strftime pattern for temporal labels; picked from the tick step when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,

    /// Fixed dimensions win over the container size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_height: Option<f64>,

    pub brush_variant: BrushVariant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brush_handle_size: Option<f64>,

    pub label_padding: f64,
    pub label_horizontal_offset: f64,
    pub label_font_size: f64,

    pub tooltip_x_offset: f64,
    pub tooltip_y_offset: f64,
    pub tooltip_tolerance: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub swimlane_labels_width: Option<f64>,
    pub swimlane_labels_fraction: f64,
    pub swimlane_representation: SwimlaneRepresentation,

    pub one_dimension_stroke: OneDimensionStroke,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            data_type: DataType::Numeric,
            chart_kind: ChartKind::Bars,
            x_ticks: 9,
            x_labels: 5,
            y_ticks: 5,
            y_labels: 5,
            margins: Margins::default(),
            multiselectable: false,
            is_histogram_selectable: true,
            y_axis_from_zero: true,
            bar_weight: 0.6,
            is_smoothed_curve: false,
            date_format: None,
            chart_width: None,
            chart_height: None,
            brush_variant: BrushVariant::Range,
            brush_handle_size: None,
            label_padding: 4.0,
            label_horizontal_offset: 4.0,
            label_font_size: 10.0,
            tooltip_x_offset: 10.0,
            tooltip_y_offset: 10.0,
            tooltip_tolerance: 10.0,
            swimlane_labels_width: None,
            swimlane_labels_fraction: 0.2,
            swimlane_representation: SwimlaneRepresentation::Column,
            one_dimension_stroke: OneDimensionStroke::default(),
        }
    }
}

impl ChartOptions {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let options: ChartOptions =
            serde_json::from_str(json).context("failed to parse chart options")?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.bar_weight > 0.0 && self.bar_weight <= 1.0,
            "barWeight must be in (0, 1], got {}",
            self.bar_weight
        );
        anyhow::ensure!(self.x_ticks > 0, "xTicks must be positive");
        anyhow::ensure!(self.x_labels > 0, "xLabels must be positive");

        let m = &self.margins;
        for (name, v) in [
            ("top", m.top),
            ("right", m.right),
            ("bottom", m.bottom),
            ("left", m.left),
        ] {
            anyhow::ensure!(
                v.is_finite() && v >= 0.0,
                "margin {name} must be a non-negative number, got {v}"
            );
        }

        for (name, v) in [
            ("chartWidth", self.chart_width),
            ("chartHeight", self.chart_height),
            ("brushHandleSize", self.brush_handle_size),
            ("swimlaneLabelsWidth", self.swimlane_labels_width),
        ] {
            if let Some(v) = v {
                anyhow::ensure!(v.is_finite() && v > 0.0, "{name} must be positive, got {v}");
            }
        }

        anyhow::ensure!(
            (0.0..1.0).contains(&self.swimlane_labels_fraction),
            "swimlaneLabelsFraction must be in [0, 1), got {}",
            self.swimlane_labels_fraction
        );
        anyhow::ensure!(
            self.label_font_size.is_finite() && self.label_font_size > 0.0,
            "labelFontSize must be positive"
        );

        if let Some(fmt) = &self.date_format {
            anyhow::ensure!(is_valid_date_format(fmt), "invalid dateFormat {fmt:?}");
        }
        Ok(())
    }

    /// Handle footprint for the configured brush variant.
    pub fn handle_size(&self) -> f64 {
        self.brush_handle_size.unwrap_or(match self.brush_variant {
            BrushVariant::Range => 8.0,
            BrushVariant::Slider => 6.0,
        })
    }

    pub fn is_swimlane(&self) -> bool {
        self.chart_kind == ChartKind::Swimlane
    }
}

pub(crate) fn is_valid_date_format(fmt: &str) -> bool {
    !fmt.is_empty() && !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let o = ChartOptions::from_json("{}").unwrap();
        assert_eq!(o, ChartOptions::default());
        assert_eq!(o.handle_size(), 8.0);
    }

    #[test]
    fn camel_case_fields_parse() {
        let o = ChartOptions::from_json(
            r#"{
                "dataType": "time",
                "chartKind": "oneDimension",
                "xTicks": 12,
                "margins": {"left": 20},
                "brushVariant": "slider",
                "dateFormat": "%Y-%m-%d",
                "oneDimensionStroke": {"max": 3}
            }"#,
        )
        .unwrap();
        assert_eq!(o.data_type, DataType::Time);
        assert_eq!(o.chart_kind, ChartKind::OneDimension);
        assert_eq!(o.x_ticks, 12);
        assert_eq!(o.margins.left, 20.0);
        assert_eq!(o.margins.bottom, 40.0);
        assert_eq!(o.handle_size(), 6.0);
        assert_eq!(o.one_dimension_stroke.max, 3.0);
        assert_eq!(o.one_dimension_stroke.base, 1.0);
    }

    #[test]
    fn invalid_options_are_rejected() {
        assert!(ChartOptions::from_json(r#"{"barWeight": 0}"#).is_err());
        assert!(ChartOptions::from_json(r#"{"barWeight": 1.5}"#).is_err());
        assert!(ChartOptions::from_json(r#"{"xLabels": 0}"#).is_err());
        assert!(ChartOptions::from_json(r#"{"chartWidth": -1}"#).is_err());
        assert!(ChartOptions::from_json(r#"{"margins": {"top": -3}}"#).is_err());
        assert!(ChartOptions::from_json(r#"{"swimlaneLabelsFraction": 1}"#).is_err());
        assert!(ChartOptions::from_json(r#"{"dateFormat": "%Q"}"#).is_err());
        assert!(ChartOptions::from_json(r#"{"chartKind": "pie"}"#).is_err());
    }

    #[test]
    fn one_dimension_stroke_is_clamped() {
        let s = OneDimensionStroke::default();
        assert_eq!(s.width_for(1.0), 1.0);
        assert_eq!(s.width_for(100.0), 3.0);
        assert_eq!(s.width_for(1e9), 6.0);
        assert_eq!(s.width_for(0.0), 1.0);
    }
}
