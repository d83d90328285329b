//! Font Rendering
//!
//! Handles font loading and glyph rasterization. Uses fontdue for simple,
//! fast font rasterization. The compositor only sees the `Face` trait, so
//! layout can be exercised with synthetic faces.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Attribute;

/// Font-related errors
#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("font parse error: {0}")]
    Parse(String),
    #[error("no suitable font found")]
    NoFontFound,
}

/// Placement of a rasterized glyph relative to the pen position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphMetrics {
    /// Offset of the bitmap's left edge from the pen
    pub xmin: i32,
    /// Offset of the bitmap's bottom edge from the baseline, up positive
    pub ymin: i32,
    pub width: usize,
    pub height: usize,
    pub advance: f32,
}

impl From<fontdue::Metrics> for GlyphMetrics {
    fn from(m: fontdue::Metrics) -> Self {
        Self {
            xmin: m.xmin,
            ymin: m.ymin,
            width: m.width,
            height: m.height,
            advance: m.advance_width,
        }
    }
}

/// A rendered glyph with its metrics and bitmap
#[derive(Debug, Clone, Default)]
pub struct RasterizedGlyph {
    /// Glyph metrics
    pub metrics: GlyphMetrics,
    /// Bitmap data (coverage, 1 byte per pixel, rows top to bottom)
    pub bitmap: Vec<u8>,
}

/// A sized font face
pub trait Face {
    /// Horizontal advance of `c` in pixels
    fn advance(&self, c: char) -> f32;

    /// Distance between consecutive baselines
    fn line_height(&self) -> f32;

    /// Distance from the top of a line to its baseline
    fn ascent(&self) -> f32;

    /// Rasterize a character, using the cache if available
    fn rasterize(&mut self, c: char) -> &RasterizedGlyph;

    /// Width of a string laid out on one line
    fn measure(&self, text: &str) -> f32 {
        text.chars().map(|c| self.advance(c)).sum()
    }
}

/// Font renderer that handles glyph rasterization and caching
pub struct FontRenderer {
    /// The loaded font
    font: Font,
    /// Font size in pixels
    font_size: f32,
    /// Cached glyphs: char -> RasterizedGlyph
    glyph_cache: HashMap<char, RasterizedGlyph>,
    line_height: f32,
    ascent: f32,
}

impl FontRenderer {
    /// Create a new font renderer with the given font file and size
    pub fn new(font_path: &Path, font_size: f32) -> Result<Self, FontError> {
        let font_data = std::fs::read(font_path).map_err(|source| FontError::Io {
            path: font_path.display().to_string(),
            source,
        })?;

        Self::from_bytes(&font_data, font_size)
    }

    /// Create a font renderer from font data bytes
    pub fn from_bytes(font_data: &[u8], font_size: f32) -> Result<Self, FontError> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;

        let line_metrics = font
            .horizontal_line_metrics(font_size)
            .ok_or_else(|| FontError::Parse("No line metrics".to_string()))?;

        Ok(Self {
            font,
            font_size,
            glyph_cache: HashMap::new(),
            line_height: line_metrics.new_line_size,
            ascent: line_metrics.ascent,
        })
    }
}

impl Face for FontRenderer {
    fn advance(&self, c: char) -> f32 {
        self.font.metrics(c, self.font_size).advance_width
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn ascent(&self) -> f32 {
        self.ascent
    }

    fn rasterize(&mut self, c: char) -> &RasterizedGlyph {
        let font = &self.font;
        let size = self.font_size;
        self.glyph_cache.entry(c).or_insert_with(|| {
            let (metrics, bitmap) = font.rasterize(c, size);
            RasterizedGlyph {
                metrics: metrics.into(),
                bitmap,
            }
        })
    }
}

/// Monospace families searched when no font is configured, in order of
/// preference: regular, bold, italic, bold italic.
const FONT_FAMILIES: &[[&str; 4]] = &[
    [
        "/usr/share/fonts/truetype/hack/Hack-Regular.ttf",
        "/usr/share/fonts/truetype/hack/Hack-Bold.ttf",
        "/usr/share/fonts/truetype/hack/Hack-Italic.ttf",
        "/usr/share/fonts/truetype/hack/Hack-BoldItalic.ttf",
    ],
    [
        "/usr/share/fonts/TTF/Hack-Regular.ttf",
        "/usr/share/fonts/TTF/Hack-Bold.ttf",
        "/usr/share/fonts/TTF/Hack-Italic.ttf",
        "/usr/share/fonts/TTF/Hack-BoldItalic.ttf",
    ],
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-Oblique.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-BoldOblique.ttf",
    ],
    [
        "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
        "/usr/share/fonts/TTF/DejaVuSansMono-Bold.ttf",
        "/usr/share/fonts/TTF/DejaVuSansMono-Oblique.ttf",
        "/usr/share/fonts/TTF/DejaVuSansMono-BoldOblique.ttf",
    ],
    [
        "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationMono-Bold.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationMono-Italic.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationMono-BoldItalic.ttf",
    ],
    [
        "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
        "/usr/share/fonts/truetype/ubuntu/UbuntuMono-B.ttf",
        "/usr/share/fonts/truetype/ubuntu/UbuntuMono-RI.ttf",
        "/usr/share/fonts/truetype/ubuntu/UbuntuMono-BI.ttf",
    ],
    [
        "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
        "/usr/share/fonts/truetype/freefont/FreeMonoBold.ttf",
        "/usr/share/fonts/truetype/freefont/FreeMonoOblique.ttf",
        "/usr/share/fonts/truetype/freefont/FreeMonoBoldOblique.ttf",
    ],
];

/// Explicit font files, one per style
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontPaths {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
    pub bold_italic: Option<PathBuf>,
}

/// The four faces used for rendering. Missing styles fall back to regular.
pub struct FontSet {
    regular: Box<dyn Face>,
    bold: Option<Box<dyn Face>>,
    italic: Option<Box<dyn Face>>,
    bold_italic: Option<Box<dyn Face>>,
}

impl FontSet {
    pub fn new(regular: Box<dyn Face>) -> Self {
        Self {
            regular,
            bold: None,
            italic: None,
            bold_italic: None,
        }
    }

    pub fn with_bold(mut self, face: Box<dyn Face>) -> Self {
        self.bold = Some(face);
        self
    }

    pub fn with_italic(mut self, face: Box<dyn Face>) -> Self {
        self.italic = Some(face);
        self
    }

    pub fn with_bold_italic(mut self, face: Box<dyn Face>) -> Self {
        self.bold_italic = Some(face);
        self
    }

    /// Load faces at `font_size` pixels.
    ///
    /// Without an explicit regular font the first installed system family is
    /// used and its other styles are taken from the same family. An explicit
    /// style path that fails to load is an error; a missing system style is
    /// not.
    pub fn load(paths: &FontPaths, font_size: f32) -> Result<Self, FontError> {
        let family = match &paths.regular {
            Some(_) => None,
            None => FONT_FAMILIES
                .iter()
                .find(|family| Path::new(family[0]).exists()),
        };

        let regular = match (&paths.regular, family) {
            (Some(path), _) => FontRenderer::new(path, font_size)?,
            (None, Some(family)) => FontRenderer::new(Path::new(family[0]), font_size)?,
            (None, None) => return Err(FontError::NoFontFound),
        };
        tracing::debug!("Loaded regular font at {}px", font_size);

        let mut set = FontSet::new(Box::new(regular));
        let styles = [&paths.bold, &paths.italic, &paths.bold_italic];

        for (i, explicit) in styles.into_iter().enumerate() {
            let face = match (explicit, family) {
                (Some(path), _) => Some(FontRenderer::new(path, font_size)?),
                (None, Some(family)) => {
                    let path = Path::new(family[i + 1]);
                    match FontRenderer::new(path, font_size) {
                        Ok(face) => Some(face),
                        Err(e) => {
                            tracing::debug!("Falling back to regular face: {}", e);
                            None
                        }
                    }
                }
                (None, None) => None,
            };

            let face = face.map(|f| Box::new(f) as Box<dyn Face>);
            match i {
                0 => set.bold = face,
                1 => set.italic = face,
                _ => set.bold_italic = face,
            }
        }

        Ok(set)
    }

    /// The face used for measurement
    pub fn regular(&self) -> &dyn Face {
        self.regular.as_ref()
    }

    /// Face for an attribute, falling back to regular
    pub fn face(&mut self, attr: Attribute) -> &mut dyn Face {
        let slot = match attr {
            Attribute::Bold => &mut self.bold,
            Attribute::Italic => &mut self.italic,
            Attribute::BoldItalic => &mut self.bold_italic,
            Attribute::None | Attribute::Underline => return self.regular.as_mut(),
        };

        match slot {
            Some(face) => face.as_mut(),
            None => self.regular.as_mut(),
        }
    }
}
