//! Byte-level escape sequence recognizer
//!
//! A VT500-style state machine (after Paul Williams' DEC parser model,
//! https://vt100.net/emu/dec_ansi_parser) cut down to what captured program
//! output contains. Input may arrive in arbitrary chunks; every recognized
//! piece becomes an `Action` for the decoder, and the bytes of the escape
//! sequence in flight are kept so the decoder can pass them on verbatim.
//!
//! Sequence states: `Escape`, `EscapeIntermediate`, the four `Csi*` states,
//! `OscString` and `StringIgnore` (DCS, SOS, PM and APC bodies). Text is
//! UTF-8 decoded in `Ground`.

use super::action::{Action, CsiAction};

const ESC: u8 = 0x1B;
const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    OscString,
    StringIgnore,
}

/// Escape sequence recognizer with chunk-spanning state
#[derive(Debug)]
pub struct Parser {
    state: State,
    intermediates: Vec<u8>,
    params: Vec<u32>,
    /// Parameter under construction
    param: u32,
    has_digit: bool,
    private: Option<u8>,
    osc: Vec<u8>,
    /// Bytes of the escape sequence in progress, starting with ESC
    raw: Vec<u8>,
    /// Partial UTF-8 character and the continuation bytes it still needs
    utf8: Vec<u8>,
    utf8_pending: u8,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            intermediates: Vec::with_capacity(4),
            params: Vec::with_capacity(16),
            param: 0,
            has_digit: false,
            private: None,
            osc: Vec::with_capacity(256),
            raw: Vec::with_capacity(16),
            utf8: Vec::with_capacity(4),
            utf8_pending: 0,
        }
    }

    /// Drop any sequence in progress and return to ground
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.clear_sequence();
        self.raw.clear();
        self.osc.clear();
        self.utf8.clear();
        self.utf8_pending = 0;
    }

    fn clear_sequence(&mut self) {
        self.intermediates.clear();
        self.params.clear();
        self.param = 0;
        self.has_digit = false;
        self.private = None;
    }

    /// Feed a chunk of bytes
    pub fn parse(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::new();

        for &byte in data {
            self.process_byte(byte, &mut actions);
        }

        actions
    }

    /// Signal end of input. Flushes a dangling UTF-8 sequence as U+FFFD and
    /// reports an unterminated escape sequence as `Action::Incomplete`.
    pub fn finish(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.utf8_pending > 0 {
            actions.push(Action::Print(REPLACEMENT));
        }

        match self.state {
            State::Escape
            | State::EscapeIntermediate
            | State::CsiEntry
            | State::CsiParam
            | State::CsiIntermediate
            | State::CsiIgnore => {
                if !self.raw.is_empty() {
                    actions.push(Action::Incomplete(std::mem::take(&mut self.raw)));
                }
            }
            State::Ground | State::OscString | State::StringIgnore => {}
        }

        self.reset();
        actions
    }

    /// Process a single byte
    fn process_byte(&mut self, byte: u8, out: &mut Vec<Action>) {
        if self.utf8_pending > 0 {
            if (0x80..=0xBF).contains(&byte) {
                self.process_utf8_continuation(byte, out);
                return;
            }
            // Invalid continuation: replace the broken sequence and
            // reprocess this byte on its own
            self.utf8.clear();
            self.utf8_pending = 0;
            out.push(Action::Print(REPLACEMENT));
        }

        // C0 controls are handled in every state
        if byte < 0x20 {
            self.process_c0(byte, out);
            return;
        }

        // DEL is ignored
        if byte == 0x7F {
            return;
        }

        match self.state {
            State::Ground => self.process_ground(byte, out),
            State::Escape => self.process_escape(byte, out),
            State::EscapeIntermediate => self.process_escape_intermediate(byte, out),
            State::CsiEntry => self.process_csi_entry(byte, out),
            State::CsiParam => self.process_csi_param(byte, out),
            State::CsiIntermediate => self.process_csi_intermediate(byte, out),
            State::CsiIgnore => self.process_csi_ignore(byte),
            State::OscString => self.osc.push(byte),
            State::StringIgnore => {}
        }
    }

    /// Process C0 control characters (0x00-0x1F)
    fn process_c0(&mut self, byte: u8, out: &mut Vec<Action>) {
        match byte {
            0x18 | 0x1A => {
                // CAN, SUB - cancel current sequence
                self.state = State::Ground;
                self.raw.clear();
            }
            ESC => {
                // ESC inside an OSC string starts the ST terminator
                if self.state == State::OscString {
                    self.terminate_osc(out);
                }
                self.state = State::Escape;
                self.clear_sequence();
                self.raw.clear();
                self.raw.push(ESC);
            }
            0x07 if self.state == State::OscString => self.terminate_osc(out),
            0x07 if self.state == State::StringIgnore => self.state = State::Ground,
            _ => match self.state {
                // Other C0 controls are ignored inside strings
                State::OscString | State::StringIgnore => {}
                _ => out.push(Action::Execute(byte)),
            },
        }
    }

    /// Process bytes in ground state (normal text)
    fn process_ground(&mut self, byte: u8, out: &mut Vec<Action>) {
        if byte >= 0x80 {
            self.start_utf8(byte, out);
        } else {
            out.push(Action::Print(byte as char));
        }
    }

    /// Start UTF-8 sequence
    fn start_utf8(&mut self, byte: u8, out: &mut Vec<Action>) {
        let remaining = match byte {
            0xC0..=0xDF => 1,
            0xE0..=0xEF => 2,
            0xF0..=0xF7 => 3,
            // Stray continuation or invalid start byte
            _ => {
                out.push(Action::Print(REPLACEMENT));
                return;
            }
        };

        self.utf8.clear();
        self.utf8.push(byte);
        self.utf8_pending = remaining;
    }

    /// Process UTF-8 continuation byte
    fn process_utf8_continuation(&mut self, byte: u8, out: &mut Vec<Action>) {
        self.utf8.push(byte);
        self.utf8_pending -= 1;

        if self.utf8_pending == 0 {
            let c = std::str::from_utf8(&self.utf8)
                .ok()
                .and_then(|s| s.chars().next())
                .unwrap_or(REPLACEMENT);
            self.utf8.clear();
            out.push(Action::Print(c));
        }
    }

    /// Process bytes in escape state
    fn process_escape(&mut self, byte: u8, out: &mut Vec<Action>) {
        self.raw.push(byte);
        match byte {
            // Intermediate bytes
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = State::EscapeIntermediate;
            }
            // CSI (ESC [)
            b'[' => self.state = State::CsiEntry,
            // OSC (ESC ])
            b']' => {
                self.state = State::OscString;
                self.osc.clear();
            }
            // DCS, SOS, PM, APC
            b'P' | b'X' | b'^' | b'_' => self.state = State::StringIgnore,
            // Final bytes - dispatch ESC sequence
            0x30..=0x7E => {
                self.state = State::Ground;
                self.dispatch_esc(byte, out);
            }
            _ => self.state = State::Ground,
        }
    }

    /// Process bytes in escape intermediate state
    fn process_escape_intermediate(&mut self, byte: u8, out: &mut Vec<Action>) {
        self.raw.push(byte);
        match byte {
            0x20..=0x2F => self.intermediates.push(byte),
            0x30..=0x7E => {
                self.state = State::Ground;
                self.dispatch_esc(byte, out);
            }
            _ => self.state = State::Ground,
        }
    }

    /// Dispatch ESC sequence
    fn dispatch_esc(&mut self, final_byte: u8, out: &mut Vec<Action>) {
        self.raw.clear();
        out.push(Action::EscDispatch {
            intermediates: std::mem::take(&mut self.intermediates),
            final_byte,
        });
    }

    /// Process bytes in CSI entry state
    fn process_csi_entry(&mut self, byte: u8, out: &mut Vec<Action>) {
        self.raw.push(byte);
        match byte {
            // Parameter bytes
            b'0'..=b'9' => {
                self.param = (byte - b'0') as u32;
                self.has_digit = true;
                self.state = State::CsiParam;
            }
            // Separator - empty first parameter
            b';' | b':' => {
                self.params.push(0);
                self.state = State::CsiParam;
            }
            // Private marker
            b'?' | b'>' | b'<' | b'=' => {
                self.private = Some(byte);
                self.state = State::CsiParam;
            }
            // Intermediate bytes
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = State::CsiIntermediate;
            }
            // Final bytes - dispatch
            0x40..=0x7E => {
                self.state = State::Ground;
                self.dispatch_csi(byte, out);
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    /// Process bytes in CSI param state
    fn process_csi_param(&mut self, byte: u8, out: &mut Vec<Action>) {
        self.raw.push(byte);
        match byte {
            b'0'..=b'9' => {
                self.param = self
                    .param
                    .saturating_mul(10)
                    .saturating_add((byte - b'0') as u32);
                self.has_digit = true;
            }
            // Parameter / subparameter separator
            b';' | b':' => {
                self.params.push(self.param);
                self.param = 0;
                self.has_digit = false;
            }
            // Intermediate bytes
            0x20..=0x2F => {
                if self.has_digit {
                    self.params.push(self.param);
                }
                self.intermediates.push(byte);
                self.state = State::CsiIntermediate;
            }
            // Final bytes - dispatch
            0x40..=0x7E => {
                if self.has_digit || !self.params.is_empty() {
                    self.params.push(self.param);
                }
                self.state = State::Ground;
                self.dispatch_csi(byte, out);
            }
            // Private markers in wrong position
            _ => self.state = State::CsiIgnore,
        }
    }

    /// Process bytes in CSI intermediate state
    fn process_csi_intermediate(&mut self, byte: u8, out: &mut Vec<Action>) {
        self.raw.push(byte);
        match byte {
            0x20..=0x2F => self.intermediates.push(byte),
            0x40..=0x7E => {
                self.state = State::Ground;
                self.dispatch_csi(byte, out);
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    /// Process bytes in CSI ignore state
    fn process_csi_ignore(&mut self, byte: u8) {
        self.raw.push(byte);
        if (0x40..=0x7E).contains(&byte) {
            self.state = State::Ground;
            self.raw.clear();
        }
    }

    /// Dispatch CSI sequence
    fn dispatch_csi(&mut self, final_byte: u8, out: &mut Vec<Action>) {
        out.push(Action::CsiDispatch(CsiAction {
            params: std::mem::take(&mut self.params),
            intermediates: std::mem::take(&mut self.intermediates),
            final_byte,
            private: self.private.take(),
            raw: std::mem::take(&mut self.raw),
        }));
    }

    /// Terminate OSC sequence and dispatch
    fn terminate_osc(&mut self, out: &mut Vec<Action>) {
        self.state = State::Ground;
        self.raw.clear();
        out.push(Action::OscDispatch(std::mem::take(&mut self.osc)));
    }
}
