//! Virtual Terminal
//!
//! Replays cursor-movement and erase sequences over a decoded styled stream
//! and reduces the result to a flat sequence with explicit line breaks. This
//! is what lets progress bars, spinners and redrawn prompts render as their
//! final frame instead of as every intermediate state.
//!
//! A terminal is created per call and holds no state afterwards.

use std::io::Read;

use crate::core::{Cursor, Grid, StyledChar};
use crate::parser::{CsiAction, DecodeError, Decoder};

/// Column count used when the caller passes 0
pub const DEFAULT_COLUMNS: usize = 80;

/// Furthest row a cursor command can reach on a grid shorter than this.
/// Line feeds still grow the grid one row at a time.
pub const MAX_ROWS: usize = 10_000;

const ESC: char = '\x1b';

/// Interpret `input` on a terminal `max_columns` wide and flatten the result.
pub fn interpret(input: &[StyledChar], max_columns: usize) -> Vec<StyledChar> {
    let mut term = Terminal::new(max_columns);
    term.process(input);
    term.flatten()
}

/// Decode raw bytes, keeping cursor sequences, and interpret them.
pub fn interpret_reader<R: Read>(
    reader: R,
    max_columns: usize,
) -> Result<Vec<StyledChar>, DecodeError> {
    let chars = Decoder::new()
        .keep_cursor_sequences(true)
        .decode_reader(reader)?;
    Ok(interpret(&chars, max_columns))
}

/// Outcome of scanning for a control sequence at an ESC
#[derive(Debug)]
enum Scan {
    /// A terminated CSI sequence spanning `len` characters
    Complete { csi: CsiAction, len: usize },
    /// Not a usable CSI sequence; only the ESC is skipped
    Malformed,
}

/// Virtual terminal state
#[derive(Debug)]
pub struct Terminal {
    grid: Grid,
    cursor: Cursor,
    max_columns: usize,
}

impl Terminal {
    /// Create a terminal. A width of 0 means `DEFAULT_COLUMNS`.
    pub fn new(max_columns: usize) -> Self {
        Self {
            grid: Grid::new(),
            cursor: Cursor::new(),
            max_columns: if max_columns == 0 {
                DEFAULT_COLUMNS
            } else {
                max_columns
            },
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Process a full styled sequence left to right
    pub fn process(&mut self, input: &[StyledChar]) {
        let mut i = 0;
        while i < input.len() {
            if input[i].symbol == ESC {
                match scan_csi(&input[i..]) {
                    Scan::Complete { csi, len } => {
                        self.execute_csi(&csi);
                        i += len;
                    }
                    Scan::Malformed => i += 1,
                }
                continue;
            }

            self.write(input[i]);
            i += 1;
        }
    }

    /// Consume the terminal, joining rows with line breaks
    pub fn flatten(self) -> Vec<StyledChar> {
        self.grid.flatten()
    }

    /// Write a single non-escape character
    fn write(&mut self, c: StyledChar) {
        match c.symbol {
            '\r' => self.cursor.carriage_return(),
            '\n' => self.line_feed(),
            '\x08' => self.cursor.move_left(1),
            _ => {
                if self.cursor.col >= self.max_columns {
                    self.line_feed();
                }
                self.grid.row_mut(self.cursor.row).put(self.cursor.col, c);
                self.cursor.col += 1;
            }
        }
    }

    fn line_feed(&mut self) {
        self.cursor.next_line();
        self.grid.ensure_row(self.cursor.row);
    }

    /// Clamp the cursor row after a cursor command and grow the grid to it
    fn enter_row(&mut self) {
        let last = self.grid.len().max(MAX_ROWS) - 1;
        if self.cursor.row > last {
            tracing::debug!("Cursor row {} clamped to {}", self.cursor.row, last);
            self.cursor.row = last;
        }
        self.grid.ensure_row(self.cursor.row);
    }

    /// Execute a CSI sequence
    fn execute_csi(&mut self, csi: &CsiAction) {
        if csi.private.is_some() || !csi.intermediates.is_empty() {
            tracing::debug!("Unhandled CSI: {:?} {}", csi.private, csi.final_byte as char);
            return;
        }

        match csi.final_byte {
            b'A' => {
                // CUU - Cursor Up
                let n = csi.param_or_default(0, 1) as usize;
                self.cursor.move_up(n);
            }
            b'B' => {
                // CUD - Cursor Down
                let n = csi.param_or_default(0, 1) as usize;
                self.cursor.move_down(n);
                self.enter_row();
            }
            b'C' => {
                // CUF - Cursor Forward
                let n = csi.param_or_default(0, 1) as usize;
                self.cursor.move_right(n);
            }
            b'D' => {
                // CUB - Cursor Backward
                let n = csi.param_or_default(0, 1) as usize;
                self.cursor.move_left(n);
            }
            b'G' => {
                // CHA - Cursor Character Absolute
                self.cursor.col = csi.param_or_default(0, 1).saturating_sub(1) as usize;
            }
            b'H' | b'f' => {
                // CUP - Cursor Position, HVP
                let row = csi.param_or_default(0, 1).saturating_sub(1) as usize;
                let col = csi.param_or_default(1, 1).saturating_sub(1) as usize;
                self.cursor.move_to(col, row);
                self.enter_row();
            }
            b'J' => self.erase_in_display(csi.param(0, 0)),
            b'K' => self.erase_in_line(csi.param(0, 0)),
            b's' => self.cursor.save(),
            b'u' => {
                self.cursor.restore();
                self.enter_row();
            }
            _ => {
                tracing::debug!("Unhandled CSI: {}", csi.final_byte as char);
            }
        }
    }

    /// ED - Erase in Display
    fn erase_in_display(&mut self, mode: u32) {
        let Cursor { col, row, .. } = self.cursor;
        match mode {
            0 => {
                self.grid.row_mut(row).truncate(col);
                self.grid.truncate_after(row);
            }
            1 => {
                self.grid.clear_before(row);
                self.grid.row_mut(row).blank_through(col);
            }
            2 | 3 => {
                self.grid.reset();
                self.cursor.home();
            }
            _ => {}
        }
    }

    /// EL - Erase in Line
    fn erase_in_line(&mut self, mode: u32) {
        let Cursor { col, row, .. } = self.cursor;
        let line = self.grid.row_mut(row);
        match mode {
            0 => line.truncate(col),
            1 => line.blank_through(col),
            2 => line.clear(),
            _ => {}
        }
    }
}

/// Scan a CSI sequence starting at an ESC.
///
/// Digits accumulate into the current parameter and `;` separates
/// parameters. A private marker may lead the parameters and intermediate
/// bytes may follow them; the first character in `@`..=`~` ends the
/// sequence. A marker byte after the first position still belongs to the
/// sequence but flags it private, so it is dropped. Anything else,
/// including running out of input, is malformed.
fn scan_csi(input: &[StyledChar]) -> Scan {
    if input.get(1).map(|c| c.symbol) != Some('[') {
        return Scan::Malformed;
    }

    let mut params = Vec::new();
    let mut current: u32 = 0;
    let mut has_param = false;
    let mut private = None;
    let mut intermediates = Vec::new();

    for (offset, c) in input.iter().enumerate().skip(2) {
        let ch = c.symbol;
        if !ch.is_ascii() {
            return Scan::Malformed;
        }
        let byte = ch as u8;

        match byte {
            b'0'..=b'9' if intermediates.is_empty() => {
                current = current
                    .saturating_mul(10)
                    .saturating_add((byte - b'0') as u32);
                has_param = true;
            }
            b';' | b':' if intermediates.is_empty() => {
                params.push(current);
                current = 0;
                has_param = true;
            }
            b'?' | b'>' | b'<' | b'=' if offset == 2 => private = Some(byte),
            b'<'..=b'?' => {
                private.get_or_insert(byte);
            }
            0x20..=0x2F => intermediates.push(byte),
            0x40..=0x7E => {
                if has_param {
                    params.push(current);
                }
                let len = offset + 1;
                let raw = input[..len].iter().map(|c| c.symbol as u8).collect();
                return Scan::Complete {
                    csi: CsiAction {
                        params,
                        intermediates,
                        final_byte: byte,
                        private,
                        raw,
                    },
                    len,
                };
            }
            _ => return Scan::Malformed,
        }
    }

    Scan::Malformed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{plain_chars, to_text, Rgb, Style};
    use proptest::prelude::*;

    fn run(input: &str, cols: usize) -> String {
        to_text(&interpret(&plain_chars(input), cols))
    }

    fn terminal(input: &str) -> Terminal {
        let mut term = Terminal::new(80);
        term.process(&plain_chars(input));
        term
    }

    #[test]
    fn test_terminal_print() {
        assert_eq!(run("Hello, World!", 80), "Hello, World!");
        assert_eq!(run("a\nb\n", 80), "a\nb\n");
    }

    #[test]
    fn test_carriage_return_overwrites() {
        assert_eq!(run("loading 10%\rloading 99%", 80), "loading 99%");
    }

    #[test]
    fn test_backspace() {
        assert_eq!(run("ab\x08c", 80), "ac");
        assert_eq!(run("\x08\x08x", 80), "x");
    }

    #[test]
    fn test_terminal_cursor_movement() {
        let term = terminal("\x1b[10;5HX");
        assert_eq!(term.cursor().row, 9);
        assert_eq!(term.cursor().col, 5);
        assert_eq!(term.grid().len(), 10);
    }

    #[test]
    fn test_cursor_position_is_idempotent() {
        let once = terminal("abc\x1b[3;4H");
        let twice = terminal("abc\x1b[3;4H\x1b[3;4H");
        assert_eq!(once.cursor(), twice.cursor());
        assert_eq!(once.grid(), twice.grid());
    }

    #[test]
    fn test_relative_moves() {
        assert_eq!(run("abc\x1b[2DX", 80), "aXc");
        assert_eq!(run("a\x1b[3Cb", 80), "a   b");
        assert_eq!(run("one\ntwo\x1b[Ax", 80), "onex\ntwo");
        assert_eq!(run("a\x1b[2Bb", 80), "a\n\n b");
        assert_eq!(run("\x1b[5Ax", 80), "x");
    }

    #[test]
    fn test_column_absolute() {
        assert_eq!(run("hello\x1b[1GJ", 80), "Jello");
        assert_eq!(run("hello\x1b[3GL", 80), "heLlo");
    }

    #[test]
    fn test_erase_in_line() {
        assert_eq!(run("abcdef\x1b[3G\x1b[K", 80), "ab");
        assert_eq!(run("abcdef\x1b[3G\x1b[0K", 80), "ab");
        assert_eq!(run("abcdef\x1b[3G\x1b[1K", 80), "   def");
        assert_eq!(run("abcdef\x1b[3G\x1b[2K", 80), "");

        let term = terminal("abcdef\x1b[2K");
        assert!(term.grid().row(0).unwrap().is_empty());
    }

    #[test]
    fn test_erase_in_display() {
        assert_eq!(run("one\ntwo\nthree\x1b[2;2H\x1b[J", 80), "one\nt");
        assert_eq!(run("one\ntwo\nthree\x1b[2;2H\x1b[1J", 80), "\n  o\nthree");
        assert_eq!(run("one\ntwo\x1b[2Jnew", 80), "new");
        assert_eq!(run("one\ntwo\x1b[3J", 80), "");
    }

    #[test]
    fn test_redrawn_progress_bar() {
        let input = "step 1\n[#   ]\x1b[1A\x1b[2K\rstep 2\x1b[1B\r[##  ]";
        assert_eq!(run(input, 80), "step 2\n[##  ]");
    }

    #[test]
    fn test_save_restore_cursor() {
        assert_eq!(run("ab\x1b[scd\x1b[uX", 80), "abXd");
        // restore without save stays put
        assert_eq!(run("ab\x1b[uc", 80), "abc");
    }

    #[test]
    fn test_wrap_at_max_columns() {
        assert_eq!(run("abcdefghijkl", 5), "abcde\nfghij\nkl");
        assert_eq!(run("abcde", 5), "abcde");
    }

    #[test]
    fn test_zero_columns_means_default() {
        let long = "x".repeat(DEFAULT_COLUMNS + 1);
        let out = run(&long, 0);
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_unterminated_sequence_skips_escape() {
        assert_eq!(run("ok\x1b[", 80), "ok[");
        assert_eq!(run("ok\x1b[12", 80), "ok[12");
        assert_eq!(run("\x1b", 80), "");
    }

    #[test]
    fn test_unknown_command_is_dropped() {
        assert_eq!(run("a\x1b[5Xb", 80), "ab");
        assert_eq!(run("a\x1b[?25lb", 80), "ab");
        assert_eq!(run("a\x1b[2 qb", 80), "ab");
    }

    #[test]
    fn test_marker_after_params_drops_sequence() {
        assert_eq!(run("a\x1b[1?hb", 80), "ab");
        assert_eq!(run("a\x1b[2;3>mb", 80), "ab");
        // a misplaced marker must not hide a real cursor move
        assert_eq!(run("abc\x1b[2=Dx", 80), "abcx");
    }

    #[test]
    fn test_cursor_rows_are_bounded() {
        let term = terminal("\x1b[5000000Bx");
        assert_eq!(term.grid().len(), MAX_ROWS);
        assert_eq!(term.cursor().row, MAX_ROWS - 1);
        assert_eq!(term.cursor().col, 1);

        let term = terminal("\x1b[4294967295;3H");
        assert_eq!(term.grid().len(), MAX_ROWS);
        assert_eq!(term.cursor().col, 2);

        let term = terminal("\x1b[4294967295B\x1b[s\x1b[H\x1b[2J\x1b[u");
        assert_eq!(term.cursor().row, MAX_ROWS - 1);
        assert_eq!(term.grid().len(), MAX_ROWS);
    }

    #[test]
    fn test_rows_past_limit_follow_line_feeds() {
        let input = "\n".repeat(MAX_ROWS + 5);
        let term = terminal(&format!("{}\x1b[99999999Bx", input));
        assert_eq!(term.grid().len(), MAX_ROWS + 6);
        assert_eq!(term.cursor().row, MAX_ROWS + 5);
    }

    #[test]
    fn test_control_char_inside_sequence_skips_escape() {
        assert_eq!(run("a\x1b[1\nb", 80), "a[1\nb");
    }

    #[test]
    fn test_non_csi_escape_skips_escape() {
        assert_eq!(run("a\x1b7b", 80), "a7b");
    }

    #[test]
    fn test_line_break_inherits_style() {
        let red = Style::fg(Rgb::new(255, 0, 0));
        let input = vec![
            StyledChar::new('a', red),
            StyledChar::plain('\n'),
            StyledChar::plain('b'),
        ];
        let out = interpret(&input, 80);
        assert_eq!(out[1].symbol, '\n');
        assert_eq!(out[1].style, red);
    }

    #[test]
    fn test_interpret_reader() {
        let input: &[u8] = b"\x1b[31mred\x1b[0m\x1b[2D\x1b[K!";
        let out = interpret_reader(input, 80).unwrap();
        assert_eq!(to_text(&out), "r!");
        assert_eq!(out[0].style.fg, Some(Rgb::new(128, 0, 0)));
        assert_eq!(out[1].style, Style::default());
    }

    const FRAGMENTS: &[&str] = &[
        "a", "xyz", "\n", "\r", "\x08", "\x1b", "\x1b[", "\x1b[1", "[", ";", "m", "K",
        "\x1b[2A", "\x1b[B", "\x1b[3C", "\x1b[D", "\x1b[4G", "\x1b[3;4H", "\x1b[;H",
        "\x1b[J", "\x1b[1J", "\x1b[2J", "\x1b[K", "\x1b[1K", "\x1b[2K", "\x1b[s", "\x1b[u",
        "\x1b[?7h",
    ];

    fn escape_soup() -> impl Strategy<Value = String> {
        proptest::collection::vec(proptest::sample::select(FRAGMENTS), 0..48)
            .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn prop_plain_text_is_identity(lines in proptest::collection::vec("[a-z ]{0,20}", 1..8)) {
            let input = lines.join("\n");
            prop_assert_eq!(run(&input, 80), input);
        }

        #[test]
        fn prop_always_terminates(input in escape_soup()) {
            let out = interpret(&plain_chars(&input), 10);
            prop_assert!(out.iter().all(|c| c.symbol != '\x1b'));
        }

        #[test]
        fn prop_wrap_conserves_characters(text in "[a-z]{1,60}", cols in 1usize..12) {
            let out = run(&text, cols);
            prop_assert!(out.split('\n').all(|line| line.chars().count() <= cols));
            prop_assert_eq!(out.replace('\n', ""), text);
        }
    }
}
