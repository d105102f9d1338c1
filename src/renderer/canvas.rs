//! Canvas2D backend for draw commands

use web_sys::CanvasRenderingContext2d;

use super::{Align, DrawCommand};
use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    /// Backing-store pixels per field unit
    scale: f64,
}

impl CanvasRenderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx, scale: 1.0 }
    }

    /// Fit the play field into a canvas of the given backing size
    pub fn resize(&mut self, width: u32, height: u32) {
        let sx = width as f64 / FIELD_WIDTH as f64;
        let sy = height as f64 / FIELD_HEIGHT as f64;
        self.scale = sx.min(sy).max(0.01);
    }

    pub fn draw(&self, commands: &[DrawCommand]) {
        let ctx = &self.ctx;
        ctx.save();
        let _ = ctx.set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0);
        ctx.clear_rect(0.0, 0.0, FIELD_WIDTH as f64, FIELD_HEIGHT as f64);
        for command in commands {
            self.draw_command(command);
        }
        ctx.restore();
    }

    fn draw_command(&self, command: &DrawCommand) {
        let ctx = &self.ctx;
        match command {
            DrawCommand::Rect { pos, size, color } => {
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => {
                ctx.set_fill_style_str(&color.to_css());
                ctx.begin_path();
                let _ = ctx.arc(
                    center.x as f64,
                    center.y as f64,
                    radius.max(0.0) as f64,
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }
            DrawCommand::Polygon { points, color } => {
                let Some(first) = points.first() else {
                    return;
                };
                ctx.set_fill_style_str(&color.to_css());
                ctx.begin_path();
                ctx.move_to(first.x as f64, first.y as f64);
                for p in &points[1..] {
                    ctx.line_to(p.x as f64, p.y as f64);
                }
                ctx.close_path();
                ctx.fill();
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                color,
                align,
            } => {
                ctx.set_fill_style_str(&color.to_css());
                ctx.set_font(&format!("bold {}px sans-serif", size));
                ctx.set_text_align(match align {
                    Align::Left => "left",
                    Align::Center => "center",
                    Align::Right => "right",
                });
                let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
            }
            DrawCommand::Group {
                origin,
                rotation,
                commands,
            } => {
                ctx.save();
                let _ = ctx.translate(origin.x as f64, origin.y as f64);
                if *rotation != 0.0 {
                    let _ = ctx.rotate(*rotation as f64);
                }
                for c in commands {
                    self.draw_command(c);
                }
                ctx.restore();
            }
        }
    }
}
