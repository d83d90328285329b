//! Content accumulation
//!
//! Content is wrap-processed as it is appended, never retroactively.

use std::io::Read;

use super::Compositor;
use crate::core::{to_text, Rgb, Style, StyledChar};
use crate::highlight::{tokenize, TokenKind};
use crate::parser::{DecodeError, Decoder};

/// Glyphs that mark the first line of captured content as an echoed prompt
pub const PROMPT_GLYPHS: [char; 7] = ['➜', '❯', '$', '#', 'λ', '→', '%'];

const LIME: Rgb = Rgb::new(0, 255, 0);
const DIM_GRAY: Rgb = Rgb::new(105, 105, 105);
const CYAN: Rgb = Rgb::new(0, 255, 255);
const MAGENTA: Rgb = Rgb::new(255, 0, 255);
const YELLOW: Rgb = Rgb::new(255, 255, 0);
const GREEN: Rgb = Rgb::new(0, 128, 0);
const BLUE: Rgb = Rgb::new(0, 0, 255);
const RED: Rgb = Rgb::new(255, 0, 0);

/// Color of a detected prompt glyph
const PROMPT_ACCENT: Rgb = Rgb::new(203, 166, 247);

pub fn is_prompt_glyph(c: char) -> bool {
    PROMPT_GLYPHS.contains(&c)
}

fn starts_with_prompt(line: &[StyledChar]) -> bool {
    line.first().is_some_and(|c| is_prompt_glyph(c.symbol))
}

fn token_color(kind: TokenKind) -> Option<Rgb> {
    match kind {
        TokenKind::Command | TokenKind::Path => Some(CYAN),
        TokenKind::Keyword | TokenKind::Number => Some(MAGENTA),
        TokenKind::Flag => Some(YELLOW),
        TokenKind::String => Some(GREEN),
        TokenKind::Variable => Some(BLUE),
        TokenKind::Operator => Some(RED),
        TokenKind::Comment => Some(DIM_GRAY),
        TokenKind::Default => None,
    }
}

fn push_str(out: &mut Vec<StyledChar>, text: &str, style: Style) {
    out.extend(text.chars().map(|c| StyledChar::new(c, style)));
}

/// Insert a line break before any character that would make a line longer
/// than `columns`. Breaks take the style of the character they precede.
/// Carriage returns do not count towards the line length.
pub(crate) fn wrap(chars: Vec<StyledChar>, columns: usize) -> Vec<StyledChar> {
    if columns == 0 {
        return chars;
    }

    let mut out = Vec::with_capacity(chars.len() + chars.len() / columns);
    let mut count = 0;

    for c in chars {
        match c.symbol {
            '\n' => count = 0,
            '\r' => {}
            _ => {
                count += 1;
                if count > columns {
                    out.push(StyledChar::line_break_after(Some(&c)));
                    count = 1;
                }
            }
        }
        out.push(c);
    }

    out
}

impl Compositor {
    /// Echo a command line: `<prompt> <args joined by spaces>`
    pub fn add_command<S: AsRef<str>>(&mut self, args: &[S]) {
        let command = args
            .iter()
            .map(|a| a.as_ref())
            .collect::<Vec<_>>()
            .join(" ");

        let mut line = Vec::new();
        push_str(&mut line, &self.config.prompt, Style::fg(LIME));
        line.push(StyledChar::plain(' '));

        if self.config.syntax_highlight {
            for token in tokenize(&command) {
                let style = token_color(token.kind).map(Style::fg).unwrap_or_default();
                push_str(&mut line, &token.text, style);
            }
        } else {
            push_str(&mut line, &command, Style::fg(DIM_GRAY));
        }
        line.push(StyledChar::plain('\n'));

        self.append(line);
    }

    /// Decode captured output and add it
    pub fn add_content<R: Read>(&mut self, input: R) -> Result<(), DecodeError> {
        let chars = Decoder::new().decode_reader(input)?;
        self.add_styled(chars);
        Ok(())
    }

    /// Add already decoded content
    pub fn add_styled(&mut self, chars: Vec<StyledChar>) {
        let chars = if self.config.prompt_detection {
            self.detect_prompt(chars)
        } else {
            chars
        };
        self.append(chars);
    }

    fn append(&mut self, chars: Vec<StyledChar>) {
        let chars = if self.config.wrap {
            wrap(chars, self.config.columns)
        } else {
            chars
        };
        self.content.extend(chars);
    }

    /// Highlight an echoed prompt line at the start of `chars` and separate
    /// it from the output below it
    fn detect_prompt(&self, chars: Vec<StyledChar>) -> Vec<StyledChar> {
        let first_end = match chars.iter().position(StyledChar::is_line_break) {
            Some(end) if end > 0 => end,
            _ => return chars,
        };
        if !starts_with_prompt(&chars[..first_end]) {
            return chars;
        }

        let mut out = self.highlight_prompt_line(&chars[..first_end]);
        out.push(StyledChar::plain('\n'));

        let rest = &chars[first_end + 1..];
        if !rest.is_empty() {
            let next_end = rest
                .iter()
                .position(StyledChar::is_line_break)
                .unwrap_or(rest.len());
            let next = &rest[..next_end];

            if !starts_with_prompt(next) && !to_text(next).trim().is_empty() {
                out.push(StyledChar::plain('\n'));
            }
            out.extend_from_slice(rest);
        }

        out
    }

    /// Recolor the prompt glyph and the command word after it
    fn highlight_prompt_line(&self, line: &[StyledChar]) -> Vec<StyledChar> {
        let command_style = Style::fg(self.theme.green().rgb());
        let mut out = Vec::with_capacity(line.len());
        let mut rest = line.iter().copied();

        if let Some(glyph) = rest.next() {
            out.push(StyledChar::new(glyph.symbol, Style::fg(PROMPT_ACCENT)));
        }

        let mut rest = rest.peekable();
        while let Some(c) = rest.next_if(|c| c.symbol == ' ') {
            out.push(c);
        }
        while let Some(c) = rest.next_if(|c| c.symbol != ' ' && c.symbol != '\t') {
            out.push(StyledChar::new(c.symbol, command_style));
        }
        out.extend(rest);

        out
    }
}
