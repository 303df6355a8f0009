//! Strata Core
//!
//! Backend-neutral building blocks shared by the Strata chart crates:
//!
//! - **Geometry**: points, sizes and rectangles in local pixel space
//! - **Paint**: colors, solid and pattern brushes, stroke styles
//! - **Canvas**: the [`DrawContext`] capability a rendering backend implements,
//!   plus a recording [`PaintContext`]
//! - **Events**: pointer events and owned listener lists

pub mod canvas;
pub mod error;
pub mod events;
pub mod geometry;
pub mod paint;

pub use canvas::{
    ContainerId, DrawContext, PaintCommand, PaintContext, Primitive, ShapeHandle, TextAnchor,
    TextMeasure, TextStyle,
};
pub use error::{CoreError, Result};
pub use events::{
    ListenerId, Listeners, Modifiers, PointerEvent, PointerEventKind, PointerHandler,
};
pub use geometry::{Point, Rect, Size};
pub use paint::{Brush, Color, Paint, PatternId, PatternSpec, StrokeStyle};
