//! Renderer Module
//!
//! Font loading and glyph rasterization, plus the software canvas the
//! compositor draws into.

mod canvas;
mod font;

pub use canvas::{Canvas, RenderError};
pub use font::{
    Face, FontError, FontPaths, FontRenderer, FontSet, GlyphMetrics, RasterizedGlyph,
};
