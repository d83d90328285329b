//! Styled characters
//!
//! A `StyledChar` is the unit shared by the decoder, the virtual terminal and
//! the compositor: one character plus its resolved colors and text attribute.

use serde::{Deserialize, Serialize};

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Attach an alpha channel
    pub const fn with_alpha(self, a: u8) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    /// Convert a 256-color index to RGB.
    ///
    /// Indices 0-15 resolve to the canonical ANSI triplets so that they can
    /// later be remapped onto a theme palette.
    pub fn from_index(index: u8) -> Self {
        match index {
            0..=15 => CANONICAL_ANSI[index as usize],
            // 216 color cube (16-231)
            16..=231 => {
                let n = index - 16;
                let r = n / 36;
                let g = (n % 36) / 6;
                let b = n % 6;
                let to_rgb = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
                Self::new(to_rgb(r), to_rgb(g), to_rgb(b))
            }
            // Grayscale (232-255)
            232..=255 => {
                let gray = 8 + (index - 232) * 10;
                Self::new(gray, gray, gray)
            }
        }
    }
}

/// RGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

impl From<Rgb> for Rgba {
    fn from(c: Rgb) -> Self {
        c.with_alpha(255)
    }
}

/// The 16 canonical ANSI triplets (8 base, then 8 bright)
pub const CANONICAL_ANSI: [Rgb; 16] = [
    Rgb::new(0, 0, 0),
    Rgb::new(128, 0, 0),
    Rgb::new(0, 128, 0),
    Rgb::new(128, 128, 0),
    Rgb::new(0, 0, 128),
    Rgb::new(128, 0, 128),
    Rgb::new(0, 128, 128),
    Rgb::new(192, 192, 192),
    Rgb::new(128, 128, 128),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 255, 255),
];

/// Text attribute. Mutually exclusive per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Attribute {
    #[default]
    None,
    Bold,
    Italic,
    BoldItalic,
    Underline,
}

impl Attribute {
    /// Collapse independent flags into the exclusive attribute.
    /// Bold and italic take precedence over underline.
    pub fn from_flags(bold: bool, italic: bool, underline: bool) -> Self {
        match (bold, italic) {
            (true, true) => Attribute::BoldItalic,
            (true, false) => Attribute::Bold,
            (false, true) => Attribute::Italic,
            (false, false) if underline => Attribute::Underline,
            _ => Attribute::None,
        }
    }

    fn code(self) -> u64 {
        match self {
            Attribute::None => 0,
            Attribute::Bold => 4,
            Attribute::Italic => 8,
            Attribute::BoldItalic => 12,
            Attribute::Underline => 16,
        }
    }
}

const FG_PRESENT: u64 = 0x01;
const BG_PRESENT: u64 = 0x02;
const ATTR_MASK: u64 = 0x1C;

/// Resolved colors and attribute of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Style {
    /// Foreground color, `None` means the theme foreground
    pub fg: Option<Rgb>,
    /// Background color, `None` means no fill
    pub bg: Option<Rgb>,
    pub attr: Attribute,
}

impl Style {
    pub const fn fg(color: Rgb) -> Self {
        Self {
            fg: Some(color),
            bg: None,
            attr: Attribute::None,
        }
    }

    /// Pack into the interop bit layout:
    /// bit0 fg present, bits 8..31 fg RGB, bit1 bg present,
    /// bits 32..55 bg RGB, bits 2..4 attribute code.
    pub fn to_bits(self) -> u64 {
        let mut bits = self.attr.code();
        if let Some(fg) = self.fg {
            bits |= FG_PRESENT;
            bits |= (fg.r as u64) << 8 | (fg.g as u64) << 16 | (fg.b as u64) << 24;
        }
        if let Some(bg) = self.bg {
            bits |= BG_PRESENT;
            bits |= (bg.r as u64) << 32 | (bg.g as u64) << 40 | (bg.b as u64) << 48;
        }
        bits
    }

    /// Unpack from the interop bit layout. Unknown attribute codes decode as
    /// `Attribute::None`.
    pub fn from_bits(bits: u64) -> Self {
        let byte = |shift: u32| ((bits >> shift) & 0xFF) as u8;

        let fg = (bits & FG_PRESENT != 0).then(|| Rgb::new(byte(8), byte(16), byte(24)));
        let bg = (bits & BG_PRESENT != 0).then(|| Rgb::new(byte(32), byte(40), byte(48)));
        let attr = match bits & ATTR_MASK {
            4 => Attribute::Bold,
            8 => Attribute::Italic,
            12 => Attribute::BoldItalic,
            16 => Attribute::Underline,
            _ => Attribute::None,
        };

        Self { fg, bg, attr }
    }
}

/// A character together with its style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StyledChar {
    pub symbol: char,
    pub style: Style,
}

impl StyledChar {
    pub const fn new(symbol: char, style: Style) -> Self {
        Self { symbol, style }
    }

    /// An unstyled character
    pub const fn plain(symbol: char) -> Self {
        Self {
            symbol,
            style: Style {
                fg: None,
                bg: None,
                attr: Attribute::None,
            },
        }
    }

    /// A default blank cell
    pub const fn blank() -> Self {
        Self::plain(' ')
    }

    /// A line break that continues the style of `prev`, or the default
    /// style when there is no previous character
    pub fn line_break_after(prev: Option<&StyledChar>) -> Self {
        Self {
            symbol: '\n',
            style: prev.map(|c| c.style).unwrap_or_default(),
        }
    }

    pub fn is_line_break(&self) -> bool {
        self.symbol == '\n'
    }
}

/// Build unstyled characters from a string
pub fn plain_chars(text: &str) -> Vec<StyledChar> {
    text.chars().map(StyledChar::plain).collect()
}

/// Collect the symbols of a styled sequence into a string
pub fn to_text(chars: &[StyledChar]) -> String {
    chars.iter().map(|c| c.symbol).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_bits_layout() {
        let style = Style {
            fg: Some(Rgb::new(0x11, 0x22, 0x33)),
            bg: None,
            attr: Attribute::Bold,
        };
        assert_eq!(style.to_bits(), 0x0033_2211_05);

        let style = Style {
            fg: None,
            bg: Some(Rgb::new(1, 2, 3)),
            attr: Attribute::Underline,
        };
        assert_eq!(style.to_bits(), 0x0003_0201_0000_0012);
    }

    #[test]
    fn test_style_bits_decode() {
        let style = Style {
            fg: Some(Rgb::new(200, 100, 50)),
            bg: Some(Rgb::new(5, 6, 7)),
            attr: Attribute::BoldItalic,
        };
        assert_eq!(Style::from_bits(style.to_bits()), style);

        // attribute code 20 (bold|underline) is not a valid exclusive value
        assert_eq!(Style::from_bits(20).attr, Attribute::None);
        assert_eq!(Style::from_bits(0), Style::default());
    }

    #[test]
    fn test_attribute_from_flags() {
        assert_eq!(Attribute::from_flags(true, true, true), Attribute::BoldItalic);
        assert_eq!(Attribute::from_flags(true, false, true), Attribute::Bold);
        assert_eq!(Attribute::from_flags(false, true, false), Attribute::Italic);
        assert_eq!(Attribute::from_flags(false, false, true), Attribute::Underline);
        assert_eq!(Attribute::from_flags(false, false, false), Attribute::None);
    }

    #[test]
    fn test_rgb_from_index() {
        assert_eq!(Rgb::from_index(1), Rgb::new(128, 0, 0));
        assert_eq!(Rgb::from_index(15), Rgb::new(255, 255, 255));
        assert_eq!(Rgb::from_index(16), Rgb::new(0, 0, 0));
        assert_eq!(Rgb::from_index(231), Rgb::new(255, 255, 255));
        assert_eq!(Rgb::from_index(232), Rgb::new(8, 8, 8));
        assert_eq!(Rgb::from_index(255), Rgb::new(238, 238, 238));
    }

    #[test]
    fn test_line_break_inherits_style() {
        let red = StyledChar::new('x', Style::fg(Rgb::new(255, 0, 0)));
        let br = StyledChar::line_break_after(Some(&red));
        assert!(br.is_line_break());
        assert_eq!(br.style, red.style);

        assert_eq!(StyledChar::line_break_after(None).style, Style::default());
    }
}
