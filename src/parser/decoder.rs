//! SGR decoder
//!
//! Turns raw terminal output into `StyledChar`s. Color and attribute codes
//! (`CSI ... m`) update a pen whose style is stamped on every character that
//! follows. Cursor-control sequences are dropped unless the decoder is told to
//! keep them for the virtual terminal.

use std::io::Read;

use thiserror::Error;

use super::action::{Action, CsiAction};
use super::state::Parser;
use crate::core::{Attribute, Rgb, Style, StyledChar};

/// Errors raised while decoding input
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Current SGR state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pen {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Pen {
    /// Style for characters written with this pen
    pub fn style(&self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
            attr: Attribute::from_flags(self.bold, self.italic, self.underline),
        }
    }

    pub fn reset(&mut self) {
        *self = Pen::default();
    }

    /// Apply SGR parameters. Unknown codes are ignored.
    pub fn apply_sgr(&mut self, params: &[u32]) {
        if params.is_empty() {
            self.reset();
            return;
        }

        let mut i = 0;
        while i < params.len() {
            match params[i] {
                0 => self.reset(),
                1 => self.bold = true,
                3 => self.italic = true,
                4 => self.underline = true,
                22 => self.bold = false,
                23 => self.italic = false,
                24 => self.underline = false,
                n @ 30..=37 => self.fg = Some(Rgb::from_index((n - 30) as u8)),
                38 => {
                    let (color, used) = extended_color(&params[i + 1..]);
                    if let Some(color) = color {
                        self.fg = Some(color);
                    }
                    i += used;
                }
                39 => self.fg = None,
                n @ 40..=47 => self.bg = Some(Rgb::from_index((n - 40) as u8)),
                48 => {
                    let (color, used) = extended_color(&params[i + 1..]);
                    if let Some(color) = color {
                        self.bg = Some(color);
                    }
                    i += used;
                }
                49 => self.bg = None,
                n @ 90..=97 => self.fg = Some(Rgb::from_index((n - 90 + 8) as u8)),
                n @ 100..=107 => self.bg = Some(Rgb::from_index((n - 100 + 8) as u8)),
                _ => {}
            }
            i += 1;
        }
    }
}

/// Parse the tail of a 38/48 sequence. Returns the color, if complete, and
/// the number of parameters consumed.
fn extended_color(rest: &[u32]) -> (Option<Rgb>, usize) {
    let component = |v: u32| v.min(255) as u8;
    match rest {
        [5, n, ..] => (Some(Rgb::from_index(component(*n))), 2),
        [2, r, g, b, ..] => (Some(Rgb::new(component(*r), component(*g), component(*b))), 4),
        [5] | [2, ..] => (None, rest.len()),
        _ => (None, 0),
    }
}

/// Incremental byte-to-`StyledChar` decoder
#[derive(Debug, Default)]
pub struct Decoder {
    parser: Parser,
    pen: Pen,
    keep_cursor_sequences: bool,
    output: Vec<StyledChar>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-emit non-SGR control sequences verbatim instead of dropping them
    pub fn keep_cursor_sequences(mut self, keep: bool) -> Self {
        self.keep_cursor_sequences = keep;
        self
    }

    /// Feed a chunk of bytes. Chunks may split sequences anywhere.
    pub fn feed(&mut self, bytes: &[u8]) {
        for action in self.parser.parse(bytes) {
            self.handle(action);
        }
    }

    /// Flush pending state and return everything decoded so far
    pub fn finish(mut self) -> Vec<StyledChar> {
        for action in self.parser.finish() {
            self.handle(action);
        }
        self.output
    }

    /// Decode a complete buffer
    pub fn decode(mut self, bytes: &[u8]) -> Vec<StyledChar> {
        self.feed(bytes);
        self.finish()
    }

    /// Decode everything readable from `reader`
    pub fn decode_reader<R: Read>(mut self, mut reader: R) -> Result<Vec<StyledChar>, DecodeError> {
        let mut buf = [0u8; 8192];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.feed(&buf[..n]);
        }
        Ok(self.finish())
    }

    fn handle(&mut self, action: Action) {
        match action {
            Action::Print(c) => self.push(c),
            Action::Execute(byte) => match byte {
                b'\n' | b'\r' | b'\t' | 0x08 => self.push(byte as char),
                _ => {}
            },
            Action::CsiDispatch(csi) => self.handle_csi(csi),
            Action::Incomplete(raw) => {
                if self.keep_cursor_sequences {
                    self.push_raw(&raw);
                }
            }
            Action::EscDispatch { final_byte, .. } => {
                tracing::trace!("dropping ESC {}", final_byte as char);
            }
            Action::OscDispatch(_) => {}
        }
    }

    fn handle_csi(&mut self, csi: CsiAction) {
        if csi.is_sgr() {
            self.pen.apply_sgr(&csi.params);
        } else if self.keep_cursor_sequences {
            self.push_raw(&csi.raw);
        } else {
            tracing::trace!("dropping CSI {:?} {}", csi.params, csi.final_byte as char);
        }
    }

    fn push(&mut self, c: char) {
        self.output.push(StyledChar::new(c, self.pen.style()));
    }

    fn push_raw(&mut self, raw: &[u8]) {
        for c in String::from_utf8_lossy(raw).chars() {
            self.push(c);
        }
    }
}

/// Decode a buffer with cursor sequences dropped
pub fn decode(bytes: &[u8]) -> Vec<StyledChar> {
    Decoder::new().decode(bytes)
}
