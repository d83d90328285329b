//! Compositor
//!
//! Accumulates styled content (an echoed command plus captured output) and
//! turns it into either a rendered terminal window or plain text.
//!
//! - `content`: command echo, prompt detection and column wrapping
//! - `raster`: layout, window chrome, shadow and glyph drawing

mod content;
mod raster;

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::core::{to_text, StyledChar};
use crate::theme::Theme;

pub use content::{is_prompt_glyph, PROMPT_GLYPHS};

/// Environment variable overriding the default prompt glyph
pub const PROMPT_ENV: &str = "TS_COMMAND_INDICATOR";

/// Prompt glyph used when neither configuration nor environment set one
pub const DEFAULT_PROMPT: &str = "❯";

/// Prompt glyph from the environment, or the built-in default
pub fn default_prompt() -> String {
    std::env::var(PROMPT_ENV).unwrap_or_else(|_| DEFAULT_PROMPT.to_string())
}

/// Rendering options, resolved once per screenshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Fixed column count; 0 measures the longest line
    pub columns: usize,
    /// Wrap content at `columns` as it is added
    pub wrap: bool,
    /// Draw the title bar with its three buttons
    pub decorations: bool,
    /// Draw a blurred drop shadow under the window
    pub shadow: bool,
    /// Trim fully transparent margins from the final image
    pub clip_canvas: bool,
    /// Prompt glyph placed in front of an echoed command
    pub prompt: String,
    /// Color echoed commands by token category
    pub syntax_highlight: bool,
    /// Recognize an echoed prompt line at the start of captured content
    pub prompt_detection: bool,
    /// Multiplier applied to the font line height
    pub line_spacing: f32,
    /// Width of a tab in spaces
    pub tab_spaces: usize,
    /// Scale applied to every geometric constant
    pub scale: f32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            columns: 0,
            wrap: true,
            decorations: true,
            shadow: true,
            clip_canvas: false,
            prompt: DEFAULT_PROMPT.to_string(),
            syntax_highlight: false,
            prompt_detection: true,
            line_spacing: 1.2,
            tab_spaces: 2,
            scale: 2.0,
        }
    }
}

/// Content buffer plus everything needed to present it
#[derive(Debug, Clone)]
pub struct Compositor {
    config: CompositorConfig,
    theme: Theme,
    content: Vec<StyledChar>,
}

impl Compositor {
    pub fn new(config: CompositorConfig, theme: Theme) -> Self {
        Self {
            config,
            theme,
            content: Vec::new(),
        }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Everything added so far, after prompt handling and wrapping
    pub fn content(&self) -> &[StyledChar] {
        &self.content
    }

    /// Content as plain text
    pub fn text(&self) -> String {
        to_text(&self.content)
    }

    /// Write the content characters without any styling
    pub fn write_raw<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(self.text().as_bytes())?;
        writer.flush()
    }
}
