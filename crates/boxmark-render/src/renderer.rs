//! Renderer trait abstraction.

use boxmark_core::{Annotation, AnnotationEngine, AnnotationId, InteractionState, Viewport};
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Image decode failed: {0}")]
    Decode(String),
    #[error("Unsupported image: {0}")]
    Unsupported(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Colors used to draw annotations.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Outline of unselected annotations.
    pub annotation_stroke: Color,
    /// Translucent fill of unselected annotations.
    pub annotation_fill: Color,
    /// Outline of the selected annotation.
    pub selected_stroke: Color,
    /// Translucent fill of the selected annotation.
    pub selected_fill: Color,
    /// Outline of the box being drawn.
    pub preview_stroke: Color,
    pub handle_fill: Color,
    pub label_color: Color,
    pub stroke_width: f64,
    pub selected_stroke_width: f64,
    pub label_size: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            annotation_stroke: Color::from_rgba8(34, 197, 94, 255),
            annotation_fill: Color::from_rgba8(34, 197, 94, 40),
            selected_stroke: Color::from_rgba8(59, 130, 246, 255), // Blue
            selected_fill: Color::from_rgba8(59, 130, 246, 56),
            preview_stroke: Color::from_rgba8(249, 115, 22, 255),
            handle_fill: Color::WHITE,
            label_color: Color::from_rgba8(17, 24, 39, 255),
            stroke_width: 2.0,
            selected_stroke_width: 3.0,
            label_size: 14.0,
        }
    }
}

/// Context for a single render frame.
///
/// Holds read-only views of everything a frame depends on; renderers never
/// mutate engine state.
pub struct RenderContext<'a> {
    /// Opaque image reference passed through to image draw commands.
    pub image_ref: &'a str,
    /// Transform, or `None` while the image is not loaded.
    pub viewport: Option<Viewport>,
    /// Annotations in z-order.
    pub annotations: &'a [Annotation],
    pub interaction: &'a InteractionState,
    pub selection: Option<&'a AnnotationId>,
    /// Annotation whose label is being edited (its label is not drawn).
    pub editing_index: Option<usize>,
    /// Display surface size in device pixels.
    pub display_size: Size,
    /// Side of resize handle squares.
    pub handle_size: f64,
    pub background_color: Color,
    pub theme: Theme,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(
        image_ref: &'a str,
        annotations: &'a [Annotation],
        interaction: &'a InteractionState,
        display_size: Size,
    ) -> Self {
        Self {
            image_ref,
            viewport: None,
            annotations,
            interaction,
            selection: None,
            editing_index: None,
            display_size,
            handle_size: boxmark_core::HANDLE_SIZE,
            background_color: Color::from_rgba8(243, 244, 246, 255),
            theme: Theme::default(),
        }
    }

    /// Snapshot everything needed to draw `engine`'s current frame.
    pub fn from_engine(engine: &'a AnnotationEngine) -> Self {
        let config = engine.config();
        Self::new(
            engine.image_ref(),
            engine.annotations(),
            engine.interaction_state(),
            config.display_size(),
        )
        .with_viewport(engine.viewport().copied())
        .with_selection(engine.selection())
        .with_editing_index(engine.label_editor().editing_index())
        .with_handle_size(config.handle_size)
    }

    pub fn with_viewport(mut self, viewport: Option<Viewport>) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_selection(mut self, selection: Option<&'a AnnotationId>) -> Self {
        self.selection = selection;
        self
    }

    /// Set the annotation being label-edited (its label is skipped).
    pub fn with_editing_index(mut self, index: Option<usize>) -> Self {
        self.editing_index = index;
        self
    }

    pub fn with_handle_size(mut self, size: f64) -> Self {
        self.handle_size = size;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the command buffer for a frame.
    ///
    /// This method is called once per frame and should prepare all drawing commands.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
