use strata_core::{Brush, Color, DrawContext, Paint, Rect};

use crate::axis::AxisTick;

pub fn fill_bg(ctx: &mut dyn DrawContext, w: f64, h: f64, bg: Color) {
    ctx.draw_rect(Rect::new(0.0, 0.0, w, h), &Paint::fill(Brush::Solid(bg)));
}

/// One-pixel gridlines: horizontal at `y_ticks`, vertical at `x_ticks`.
pub fn draw_grid(
    ctx: &mut dyn DrawContext,
    plot: Rect,
    x_ticks: &[AxisTick],
    y_ticks: &[AxisTick],
    grid: Color,
) {
    if plot.width() <= 0.0 || plot.height() <= 0.0 {
        return;
    }
    let paint = Paint::fill(grid);
    for t in x_ticks {
        ctx.draw_rect(Rect::new(t.px, plot.y(), 1.0, plot.height()), &paint);
    }
    for t in y_ticks {
        ctx.draw_rect(Rect::new(plot.x(), t.px, plot.width(), 1.0), &paint);
    }
}
