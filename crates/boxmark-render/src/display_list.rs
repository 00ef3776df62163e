//! Backend-neutral renderer that records draw commands.
//!
//! Hosts replay the list onto whatever surface they own (canvas, GPU scene,
//! terminal dump). All geometry is in device space.

use crate::renderer::{RenderContext, Renderer};
use boxmark_core::{Annotation, handle_positions, hit_test};
use kurbo::{Point, Rect};
use peniko::Color;

/// One drawing operation.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Clear the whole surface to a color.
    Clear(Color),
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, color: Color, width: f64 },
    /// Draw the image identified by `source` scaled into `rect`.
    Image { rect: Rect, source: String },
    /// Text with its baseline starting at `origin`.
    Text {
        origin: Point,
        text: String,
        color: Color,
        size: f64,
    },
}

/// Renderer producing a [`DrawCommand`] list per frame.
#[derive(Debug, Default)]
pub struct DisplayListRenderer {
    commands: Vec<DrawCommand>,
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the last built frame.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    fn draw_annotation(&mut self, ctx: &RenderContext, index: usize, annotation: &Annotation, rect: Rect) {
        let selected = ctx.selection == Some(&annotation.id);
        let theme = &ctx.theme;
        let (fill, stroke, width) = if selected {
            (theme.selected_fill, theme.selected_stroke, theme.selected_stroke_width)
        } else {
            (theme.annotation_fill, theme.annotation_stroke, theme.stroke_width)
        };

        self.commands.push(DrawCommand::FillRect { rect, color: fill });
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color: stroke,
            width,
        });

        if ctx.editing_index == Some(index) {
            return;
        }
        // Labels sit above the box, or just inside it when there is no room.
        let baseline = if rect.y0 - theme.label_size - 2.0 >= 0.0 {
            rect.y0 - 4.0
        } else {
            rect.y0 + theme.label_size + 2.0
        };
        self.commands.push(DrawCommand::Text {
            origin: Point::new(rect.x0 + 2.0, baseline),
            text: label_text(annotation),
            color: theme.label_color,
            size: theme.label_size,
        });
    }

    fn draw_handles(&mut self, ctx: &RenderContext, rect: Rect) {
        for handle in handle_positions(rect) {
            let square = handle.hotspot(ctx.handle_size);
            self.commands.push(DrawCommand::FillRect {
                rect: square,
                color: ctx.theme.handle_fill,
            });
            self.commands.push(DrawCommand::StrokeRect {
                rect: square,
                color: ctx.theme.selected_stroke,
                width: 1.0,
            });
        }
    }
}

/// Label as displayed, with detector confidence as a percentage.
pub fn label_text(annotation: &Annotation) -> String {
    match annotation.confidence {
        Some(confidence) => format!("{} ({:.0}%)", annotation.label, confidence * 100.0),
        None => annotation.label.clone(),
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(self.background_color(ctx)));

        // Nothing but the background until the image is known.
        let Some(viewport) = ctx.viewport else {
            return;
        };

        self.commands.push(DrawCommand::Image {
            rect: viewport.image_device_bounds(),
            source: ctx.image_ref.to_string(),
        });

        for (index, annotation) in ctx.annotations.iter().enumerate() {
            let rect = hit_test::device_bounds(annotation, &viewport);
            self.draw_annotation(ctx, index, annotation, rect);
        }

        if let Some(preview) = ctx.interaction.drawing_preview() {
            self.commands.push(DrawCommand::StrokeRect {
                rect: viewport.image_rect_to_device(preview.rect()),
                color: ctx.theme.preview_stroke,
                width: ctx.theme.stroke_width,
            });
        } else if let Some(selected) = ctx
            .selection
            .and_then(|id| ctx.annotations.iter().find(|a| &a.id == id))
        {
            self.draw_handles(ctx, hit_test::device_bounds(selected, &viewport));
        }

        log::trace!("built frame with {} commands", self.commands.len());
    }
}
