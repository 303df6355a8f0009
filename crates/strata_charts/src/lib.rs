//! strata_charts
//!
//! Histogram-style charts over bucketed data: bars, area, curve,
//! one-dimension stripes and swimlanes.
//!
//! The crate owns layout and interaction. Rendering goes through the
//! [`strata_core::DrawContext`] seam, so any backend that can draw rects,
//! paths and text can host a chart.
//!
//! - Scales (band, linear, calendar-aware time) and axis tick/label layout
//!   with overlap-driven label density
//! - Brush selection, committed multi-selection and hover tooltips
//! - Per-kind drawing strategies selected from [`ChartOptions`]

mod common;
mod view;

pub mod axis;
pub mod brush;
pub mod config;
pub mod data;
pub mod format;
pub mod histogram;
pub mod interaction;
pub mod interpolate;
pub mod interval_set;
pub mod layout;
pub mod pattern;
pub mod scale;
pub mod strategy;
pub mod swimlane;
pub mod time_format;
pub mod time_scale;
pub mod tooltip;

pub use config::{BrushVariant, ChartKind, ChartOptions, Margins, SwimlaneRepresentation};
pub use data::{ChartData, DataPoint, DataType, SwimlaneCollection};
pub use histogram::{HistogramChartModel, HistogramChartStyle, SelectionList};
pub use interval_set::{IntervalId, IntervalSet, SelectionInterval};
pub use layout::ChartLayout;
pub use view::{plot_rect, Domain1D};

/// Common imports for chart users.
pub mod prelude {
    pub use crate::brush::{BrushController, BrushEvent, BrushStyle};
    pub use crate::config::{
        BrushVariant, ChartKind, ChartOptions, Margins, OneDimensionStroke,
        SwimlaneRepresentation,
    };
    pub use crate::data::{ChartData, DataPoint, DataType, SwimlaneCollection};
    pub use crate::histogram::{HistogramChartModel, HistogramChartStyle, SelectionList};
    pub use crate::interval_set::{IntervalId, SelectionInterval};
    pub use crate::layout::ChartLayout;
    pub use crate::tooltip::{HoverEvent, TooltipSide};
    pub use crate::Domain1D;
}
