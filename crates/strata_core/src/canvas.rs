//! Drawing-context seam.
//!
//! Chart crates compute geometry and hand already-positioned primitives to a
//! [`DrawContext`]. Backends (SVG, GPU, terminal, ...) implement the trait;
//! [`PaintContext`] records commands in memory for tests and replay.

use rustc_hash::FxHashSet;

use crate::error::{CoreError, Result};
use crate::geometry::{Point, Rect, Size};
use crate::paint::{Brush, Color, Paint, PatternId, PatternSpec, StrokeStyle};

/// Handle of a group node created by [`DrawContext::create_container`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(pub u64);

/// Handle of one drawn shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub u64);

/// Horizontal text anchoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub anchor: TextAnchor,
}

impl TextStyle {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            color: Color::BLACK,
            anchor: TextAnchor::Start,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// A backend-neutral shape with its final pixel geometry.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Rect {
        rect: Rect,
        paint: Paint,
    },
    Path {
        points: Vec<Point>,
        closed: bool,
        paint: Paint,
    },
    Circle {
        center: Point,
        radius: f64,
        paint: Paint,
    },
    Line {
        from: Point,
        to: Point,
        stroke: StrokeStyle,
    },
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
    },
}

/// Text measurement capability, needed by label layout before anything is drawn.
pub trait TextMeasure {
    /// Bounding box of `text`, or `None` when the backend cannot measure.
    fn measure_text(&self, text: &str, style: &TextStyle) -> Option<Size>;
}

/// Rendering capability consumed by charts.
pub trait DrawContext: TextMeasure {
    fn create_container(&mut self, name: &str) -> ContainerId;
    fn remove_container(&mut self, id: ContainerId) -> Result<()>;
    fn define_pattern(&mut self, id: PatternId, spec: &PatternSpec);

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) -> ShapeHandle;
    fn draw_path(&mut self, points: &[Point], closed: bool, paint: &Paint) -> ShapeHandle;
    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint) -> ShapeHandle;
    fn draw_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) -> ShapeHandle;
    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> ShapeHandle;

    fn draw(&mut self, primitive: &Primitive) -> ShapeHandle {
        match primitive {
            Primitive::Rect { rect, paint } => self.draw_rect(*rect, paint),
            Primitive::Path {
                points,
                closed,
                paint,
            } => self.draw_path(points, *closed, paint),
            Primitive::Circle {
                center,
                radius,
                paint,
            } => self.draw_circle(*center, *radius, paint),
            Primitive::Line { from, to, stroke } => self.draw_line(*from, *to, stroke),
            Primitive::Text {
                text,
                origin,
                style,
            } => self.draw_text(text, *origin, style),
        }
    }
}

/// A recorded drawing command.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintCommand {
    CreateContainer { id: ContainerId, name: String },
    RemoveContainer { id: ContainerId },
    DefinePattern { id: PatternId, spec: PatternSpec },
    Draw { container: Option<ContainerId>, primitive: Primitive },
}

/// In-memory [`DrawContext`] that records every command.
///
/// Text is measured with a fixed advance per character so layouts driven by
/// it are deterministic.
pub struct PaintContext {
    commands: Vec<PaintCommand>,
    containers: Vec<ContainerId>,
    patterns: FxHashSet<PatternId>,
    next_id: u64,
    char_width: f64,
}

impl PaintContext {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            containers: Vec::new(),
            patterns: FxHashSet::default(),
            next_id: 1,
            char_width: 0.6,
        }
    }

    /// Character advance as a fraction of the font size.
    pub fn with_char_width(mut self, fraction: f64) -> Self {
        self.char_width = fraction;
        self
    }

    /// Get all recorded commands
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Take ownership of recorded commands
    pub fn take_commands(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Drawn primitives, in order, ignoring container bookkeeping.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.commands.iter().filter_map(|c| match c {
            PaintCommand::Draw { primitive, .. } => Some(primitive),
            _ => None,
        })
    }

    pub fn pattern_definitions(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PaintCommand::DefinePattern { .. }))
            .count()
    }

    /// Verify every pattern brush refers to a defined pattern.
    pub fn validate_patterns(&self) -> Result<()> {
        for p in self.primitives() {
            let fill = match p {
                Primitive::Rect { paint, .. }
                | Primitive::Path { paint, .. }
                | Primitive::Circle { paint, .. } => paint.fill,
                _ => None,
            };
            if let Some(Brush::Pattern(id)) = fill {
                if !self.patterns.contains(&id) {
                    return Err(CoreError::UnknownPattern(id));
                }
            }
        }
        Ok(())
    }

    fn push(&mut self, primitive: Primitive) -> ShapeHandle {
        let handle = ShapeHandle(self.next_id);
        self.next_id += 1;
        self.commands.push(PaintCommand::Draw {
            container: self.containers.last().copied(),
            primitive,
        });
        handle
    }
}

impl Default for PaintContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for PaintContext {
    fn measure_text(&self, text: &str, style: &TextStyle) -> Option<Size> {
        let width = text.chars().count() as f64 * style.size * self.char_width;
        Some(Size::new(width, style.size))
    }
}

impl DrawContext for PaintContext {
    fn create_container(&mut self, name: &str) -> ContainerId {
        let id = ContainerId(self.next_id);
        self.next_id += 1;
        self.containers.push(id);
        self.commands.push(PaintCommand::CreateContainer {
            id,
            name: name.to_string(),
        });
        id
    }

    fn remove_container(&mut self, id: ContainerId) -> Result<()> {
        let Some(pos) = self.containers.iter().position(|c| *c == id) else {
            return Err(CoreError::UnknownContainer(id.0));
        };
        self.containers.remove(pos);
        self.commands.push(PaintCommand::RemoveContainer { id });
        Ok(())
    }

    fn define_pattern(&mut self, id: PatternId, spec: &PatternSpec) {
        if !self.patterns.insert(id) {
            tracing::debug!(?id, "pattern redefined");
        }
        self.commands
            .push(PaintCommand::DefinePattern { id, spec: *spec });
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) -> ShapeHandle {
        self.push(Primitive::Rect {
            rect,
            paint: *paint,
        })
    }

    fn draw_path(&mut self, points: &[Point], closed: bool, paint: &Paint) -> ShapeHandle {
        self.push(Primitive::Path {
            points: points.to_vec(),
            closed,
            paint: *paint,
        })
    }

    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint) -> ShapeHandle {
        self.push(Primitive::Circle {
            center,
            radius,
            paint: *paint,
        })
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) -> ShapeHandle {
        self.push(Primitive::Line {
            from,
            to,
            stroke: *stroke,
        })
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> ShapeHandle {
        self.push(Primitive::Text {
            text: text.to_string(),
            origin,
            style: *style,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_primitives_inside_containers() {
        let mut ctx = PaintContext::new();
        let g = ctx.create_container("bars");
        ctx.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &Paint::fill(Color::WHITE));
        ctx.remove_container(g).unwrap();
        ctx.draw_line(Point::ZERO, Point::new(1.0, 1.0), &StrokeStyle::default());

        let cmds = ctx.commands();
        assert_eq!(cmds.len(), 4);
        assert!(matches!(
            cmds[1],
            PaintCommand::Draw {
                container: Some(id),
                ..
            } if id == g
        ));
        assert!(matches!(cmds[3], PaintCommand::Draw { container: None, .. }));
    }

    #[test]
    fn removing_unknown_container_fails() {
        let mut ctx = PaintContext::new();
        assert_eq!(
            ctx.remove_container(ContainerId(42)),
            Err(CoreError::UnknownContainer(42))
        );
    }

    #[test]
    fn measure_text_scales_with_length() {
        let ctx = PaintContext::new().with_char_width(0.5);
        let size = ctx.measure_text("1234", &TextStyle::new(10.0)).unwrap();
        assert_eq!(size.width, 20.0);
    }

    #[test]
    fn validate_patterns_flags_undefined_fill() {
        let mut ctx = PaintContext::new();
        ctx.draw_rect(Rect::ZERO, &Paint::fill(Brush::Pattern(PatternId(7))));
        assert_eq!(
            ctx.validate_patterns(),
            Err(CoreError::UnknownPattern(PatternId(7)))
        );
        ctx.define_pattern(
            PatternId(7),
            &PatternSpec {
                angle: 45.0,
                spacing: 4.0,
                stroke_width: 1.0,
                color: Color::BLACK,
                background: Color::TRANSPARENT,
            },
        );
        assert!(ctx.validate_patterns().is_ok());
    }
}
