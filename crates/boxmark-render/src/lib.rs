//! Boxmark Render Library
//!
//! Renderer abstraction for the Boxmark annotation engine, a display-list
//! renderer that hosts replay onto their own surface, and image decoding.

pub mod decode;
mod display_list;
mod renderer;

pub use display_list::{DisplayListRenderer, DrawCommand, label_text};
pub use decode::{DecodedImage, decode_image, probe_dimensions};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, Theme};
