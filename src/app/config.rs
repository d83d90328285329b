//! Configuration for a screenshot run

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compositor::{default_prompt, CompositorConfig};
use crate::renderer::FontPaths;
use crate::theme::{Theme, ThemeError, DEFAULT_THEME};

/// Screenshot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed column count (0 = size to the longest line)
    pub columns: usize,
    /// Echo the command line above its output
    pub show_command: bool,
    /// Omit the window title bar and its buttons
    pub no_decoration: bool,
    /// Omit the drop shadow
    pub no_shadow: bool,
    /// Crop transparent margins from the image
    pub clip_canvas: bool,
    /// Built-in theme name
    pub theme: String,
    /// Theme file; takes precedence over `theme`
    pub theme_file: Option<PathBuf>,
    /// Prompt glyph for the echoed command
    pub prompt: Option<String>,
    /// Highlight the echoed command
    pub syntax_highlight: bool,
    /// Disable prompt-line detection in captured output
    pub no_prompt_detect: bool,
    /// Run content through the virtual terminal first
    pub improved_ansi: bool,
    /// Write plain text here instead of an image (`-` = stdout)
    pub raw_write: Option<PathBuf>,
    /// Read content from here instead of a command (`-` = stdin)
    pub raw_read: Option<PathBuf>,
    /// Output image path
    pub filename: PathBuf,
    /// Font files
    pub fonts: FontPaths,
    /// Font size in points
    pub font_size: f32,
    /// Line height multiplier
    pub line_spacing: f32,
    /// Width of a tab in spaces
    pub tab_spaces: usize,
    /// Image scale factor
    pub scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: 0,
            show_command: false,
            no_decoration: false,
            no_shadow: false,
            clip_canvas: false,
            theme: DEFAULT_THEME.to_string(),
            theme_file: None,
            prompt: None,
            syntax_highlight: false,
            no_prompt_detect: false,
            improved_ansi: false,
            raw_write: None,
            raw_read: None,
            filename: PathBuf::from("out.png"),
            fonts: FontPaths::default(),
            font_size: 12.0,
            line_spacing: 1.2,
            tab_spaces: 2,
            scale: 2.0,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Prompt glyph: configured, then `TS_COMMAND_INDICATOR`, then the default
    pub fn prompt(&self) -> String {
        self.prompt.clone().unwrap_or_else(default_prompt)
    }

    /// Theme file if one is set, otherwise the named built-in
    pub fn resolve_theme(&self) -> Result<Theme, ThemeError> {
        match &self.theme_file {
            Some(path) => Theme::from_file(path),
            None => Ok(Theme::by_name(&self.theme)),
        }
    }

    /// Compositor options for this run
    pub fn compositor_config(&self) -> CompositorConfig {
        CompositorConfig {
            columns: self.columns,
            wrap: self.raw_write.is_none(),
            decorations: !self.no_decoration,
            shadow: !self.no_shadow,
            clip_canvas: self.clip_canvas,
            prompt: self.prompt(),
            syntax_highlight: self.syntax_highlight,
            prompt_detection: !self.no_prompt_detect,
            line_spacing: self.line_spacing,
            tab_spaces: self.tab_spaces,
            scale: self.scale,
        }
    }

    /// Pixel size the fonts are rasterized at
    pub fn font_pixel_size(&self) -> f32 {
        self.font_size * 2.0 * self.scale
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
