//! Color themes
//!
//! A theme is an immutable palette: window colors plus the 16 ANSI slots.
//! Built-in themes are checked at compile time; theme files are JSON with
//! one hex string per role and every role required.

use std::borrow::Cow;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Rgb, Rgba, CANONICAL_ANSI};

/// Maximum per-component distance for a color to count as a canonical ANSI color
pub const REMAP_TOLERANCE: u8 = 5;

/// Name of the theme used when nothing else is requested
pub const DEFAULT_THEME: &str = "default";

/// Theme loading errors
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("failed to read theme file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse theme file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid color for {field}: {value:?}")]
    InvalidColor { field: &'static str, value: String },
}

/// Resolved palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: Cow<'static, str>,
    pub background: Rgba,
    pub foreground: Rgba,
    pub window_red: Rgba,
    pub window_yellow: Rgba,
    pub window_green: Rgba,
    pub window_border: Rgba,
    pub shadow: Rgba,
    /// ANSI colors 0-15: 8 base then 8 bright
    pub ansi: [Rgba; 16],
}

/// On-disk theme representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeFile {
    pub name: String,
    pub background: String,
    pub foreground: String,
    pub window_red: String,
    pub window_yellow: String,
    pub window_green: String,
    pub window_border: String,
    pub shadow: String,
    pub black: String,
    pub red: String,
    pub green: String,
    pub yellow: String,
    pub blue: String,
    pub magenta: String,
    pub cyan: String,
    pub white: String,
    pub bright_black: String,
    pub bright_red: String,
    pub bright_green: String,
    pub bright_yellow: String,
    pub bright_blue: String,
    pub bright_magenta: String,
    pub bright_cyan: String,
    pub bright_white: String,
}

/// Parse `#RRGGBB` or `#RRGGBBAA`; the `#` is optional and alpha defaults to 255.
pub fn parse_hex(hex: &str) -> Option<Rgba> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let a = if hex.len() == 8 { channel(6)? } else { 255 };

    Some(Rgba::new(channel(0)?, channel(2)?, channel(4)?, a))
}

/// Compile-time hex parsing for the built-in palettes
const fn hex(s: &str) -> Rgba {
    const fn nibble(c: u8) -> u8 {
        match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            b'A'..=b'F' => c - b'A' + 10,
            _ => panic!("invalid hex digit"),
        }
    }
    const fn byte(b: &[u8], i: usize) -> u8 {
        nibble(b[i]) << 4 | nibble(b[i + 1])
    }

    let b = s.as_bytes();
    let a = if b.len() == 9 { byte(b, 7) } else { 255 };
    Rgba::new(byte(b, 1), byte(b, 3), byte(b, 5), a)
}

macro_rules! builtin {
    (
        $name:literal, $bg:literal, $fg:literal,
        [$red:literal, $yellow:literal, $green:literal, $border:literal, $shadow:literal],
        [$($ansi:literal),+ $(,)?]
    ) => {
        Theme {
            name: Cow::Borrowed($name),
            background: hex($bg),
            foreground: hex($fg),
            window_red: hex($red),
            window_yellow: hex($yellow),
            window_green: hex($green),
            window_border: hex($border),
            shadow: hex($shadow),
            ansi: [$(hex($ansi)),+],
        }
    };
}

/// Built-in themes, keyed by lookup name
static BUILTINS: [(&str, Theme); 8] = [
    (
        "default",
        builtin!(
            "Default", "#151515", "#D3D3D3",
            ["#ED655A", "#E1C04C", "#71BD47", "#404040", "#10101066"],
            [
                "#000000", "#E06C75", "#98C379", "#E5C07B", "#61AFEF", "#C678DD", "#56B6C2", "#ABB2BF",
                "#5C6370", "#E06C75", "#98C379", "#E5C07B", "#61AFEF", "#C678DD", "#56B6C2", "#FFFFFF",
            ]
        ),
    ),
    (
        "catppuccin-mocha",
        builtin!(
            "Catppuccin Mocha", "#1e1e2e", "#cdd6f4",
            ["#f38ba8", "#f9e2af", "#a6e3a1", "#45475a", "#11111b66"],
            [
                "#45475a", "#f38ba8", "#a6e3a1", "#f9e2af", "#89b4fa", "#f5c2e7", "#94e2d5", "#bac2de",
                "#585b70", "#f38ba8", "#a6e3a1", "#f9e2af", "#89b4fa", "#f5c2e7", "#94e2d5", "#a6adc8",
            ]
        ),
    ),
    (
        "catppuccin-latte",
        builtin!(
            "Catppuccin Latte", "#eff1f5", "#4c4f69",
            ["#d20f39", "#df8e1d", "#40a02b", "#acb0be", "#e6e9ef66"],
            [
                "#5c5f77", "#d20f39", "#40a02b", "#df8e1d", "#1e66f5", "#ea76cb", "#179299", "#acb0be",
                "#6c6f85", "#d20f39", "#40a02b", "#df8e1d", "#1e66f5", "#ea76cb", "#179299", "#bcc0cc",
            ]
        ),
    ),
    (
        "nord",
        builtin!(
            "Nord", "#2e3440", "#d8dee9",
            ["#bf616a", "#ebcb8b", "#a3be8c", "#4c566a", "#2e344066"],
            [
                "#3b4252", "#bf616a", "#a3be8c", "#ebcb8b", "#81a1c1", "#b48ead", "#88c0d0", "#e5e9f0",
                "#4c566a", "#bf616a", "#a3be8c", "#ebcb8b", "#81a1c1", "#b48ead", "#8fbcbb", "#eceff4",
            ]
        ),
    ),
    (
        "dracula",
        builtin!(
            "Dracula", "#282a36", "#f8f8f2",
            ["#ff5555", "#f1fa8c", "#50fa7b", "#44475a", "#21222c66"],
            [
                "#21222c", "#ff5555", "#50fa7b", "#f1fa8c", "#bd93f9", "#ff79c6", "#8be9fd", "#f8f8f2",
                "#6272a4", "#ff6e6e", "#69ff94", "#ffffa5", "#d6acff", "#ff92df", "#a4ffff", "#ffffff",
            ]
        ),
    ),
    (
        "tokyo-night",
        builtin!(
            "Tokyo Night", "#1a1b26", "#c0caf5",
            ["#f7768e", "#e0af68", "#9ece6a", "#414868", "#16161e66"],
            [
                "#15161e", "#f7768e", "#9ece6a", "#e0af68", "#7aa2f7", "#bb9af7", "#7dcfff", "#a9b1d6",
                "#414868", "#f7768e", "#9ece6a", "#e0af68", "#7aa2f7", "#bb9af7", "#7dcfff", "#c0caf5",
            ]
        ),
    ),
    (
        "gruvbox-dark",
        builtin!(
            "Gruvbox Dark", "#282828", "#ebdbb2",
            ["#cc241d", "#d79921", "#98971a", "#504945", "#1d202166"],
            [
                "#282828", "#cc241d", "#98971a", "#d79921", "#458588", "#b16286", "#689d6a", "#a89984",
                "#928374", "#fb4934", "#b8bb26", "#fabd2f", "#83a598", "#d3869b", "#8ec07c", "#ebdbb2",
            ]
        ),
    ),
    (
        "solarized-dark",
        builtin!(
            "Solarized Dark", "#002b36", "#839496",
            ["#dc322f", "#b58900", "#859900", "#073642", "#002b3666"],
            [
                "#073642", "#dc322f", "#859900", "#b58900", "#268bd2", "#d33682", "#2aa198", "#eee8d5",
                "#002b36", "#cb4b16", "#586e75", "#657b83", "#839496", "#6c71c4", "#93a1a1", "#fdf6e3",
            ]
        ),
    ),
];

impl Default for Theme {
    fn default() -> Self {
        BUILTINS[0].1.clone()
    }
}

impl Theme {
    /// Look up a built-in theme
    pub fn builtin(name: &str) -> Option<Theme> {
        BUILTINS
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, theme)| theme.clone())
    }

    /// Built-in theme by name, falling back to the default theme
    pub fn by_name(name: &str) -> Theme {
        Self::builtin(name).unwrap_or_else(|| {
            tracing::warn!("Unknown theme {:?}, using {}", name, DEFAULT_THEME);
            Theme::default()
        })
    }

    /// Names of the built-in themes, sorted
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<_> = BUILTINS.iter().map(|(key, _)| *key).collect();
        names.sort_unstable();
        names
    }

    /// Load a theme from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Theme, ThemeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse a theme from JSON
    pub fn from_json(json: &str) -> Result<Theme, ThemeError> {
        let file: ThemeFile = serde_json::from_str(json)?;
        Theme::try_from(&file)
    }

    /// Foreground for a decoded color: canonical ANSI colors map onto the
    /// palette, anything else passes through opaque.
    pub fn remap(&self, color: Rgb) -> Rgba {
        let close = |a: u8, b: u8| a.abs_diff(b) <= REMAP_TOLERANCE;

        CANONICAL_ANSI
            .iter()
            .position(|c| close(c.r, color.r) && close(c.g, color.g) && close(c.b, color.b))
            .map(|i| self.ansi[i])
            .unwrap_or_else(|| color.into())
    }

    /// ANSI slot 2
    pub fn green(&self) -> Rgba {
        self.ansi[2]
    }
}

impl TryFrom<&ThemeFile> for Theme {
    type Error = ThemeError;

    fn try_from(file: &ThemeFile) -> Result<Self, Self::Error> {
        let color = |field: &'static str, value: &str| {
            parse_hex(value).ok_or_else(|| ThemeError::InvalidColor {
                field,
                value: value.to_string(),
            })
        };

        Ok(Theme {
            name: Cow::Owned(file.name.clone()),
            background: color("background", &file.background)?,
            foreground: color("foreground", &file.foreground)?,
            window_red: color("window_red", &file.window_red)?,
            window_yellow: color("window_yellow", &file.window_yellow)?,
            window_green: color("window_green", &file.window_green)?,
            window_border: color("window_border", &file.window_border)?,
            shadow: color("shadow", &file.shadow)?,
            ansi: [
                color("black", &file.black)?,
                color("red", &file.red)?,
                color("green", &file.green)?,
                color("yellow", &file.yellow)?,
                color("blue", &file.blue)?,
                color("magenta", &file.magenta)?,
                color("cyan", &file.cyan)?,
                color("white", &file.white)?,
                color("bright_black", &file.bright_black)?,
                color("bright_red", &file.bright_red)?,
                color("bright_green", &file.bright_green)?,
                color("bright_yellow", &file.bright_yellow)?,
                color("bright_blue", &file.bright_blue)?,
                color("bright_magenta", &file.bright_magenta)?,
                color("bright_cyan", &file.bright_cyan)?,
                color("bright_white", &file.bright_white)?,
            ],
        })
    }
}
