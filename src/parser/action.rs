//! Actions produced by the parser
//!
//! These actions represent the semantic meaning of parsed escape sequences.

use serde::{Deserialize, Serialize};

/// Actions produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// A printable character
    Print(char),

    /// A C0 control character (0x00-0x1F except ESC, CAN and SUB)
    Execute(u8),

    /// CSI (Control Sequence Introducer) dispatch
    CsiDispatch(CsiAction),

    /// ESC dispatch (non-CSI escape sequences)
    /// Format: ESC \[intermediates\] final
    EscDispatch {
        /// Intermediate bytes (0x20-0x2F)
        intermediates: Vec<u8>,
        /// Final byte
        final_byte: u8,
    },

    /// OSC payload (terminated by BEL or ST)
    OscDispatch(Vec<u8>),

    /// Bytes of a control sequence that was still open when input ended
    Incomplete(Vec<u8>),
}

/// A complete CSI sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiAction {
    /// Numeric parameters. Empty parameters are represented as 0.
    pub params: Vec<u32>,
    /// Intermediate bytes (0x20-0x2F)
    pub intermediates: Vec<u8>,
    /// Final byte (0x40-0x7E) determines the command
    pub final_byte: u8,
    /// Private marker (`?`, `>`, `<`, `=`) if present
    pub private: Option<u8>,
    /// The sequence exactly as received, starting with ESC `[`
    pub raw: Vec<u8>,
}

impl CsiAction {
    /// Parameter at `idx`, or `default` when absent
    pub fn param(&self, idx: usize, default: u32) -> u32 {
        self.params.get(idx).copied().unwrap_or(default)
    }

    /// Parameter at `idx`, with 0 and absence both meaning `default`
    pub fn param_or_default(&self, idx: usize, default: u32) -> u32 {
        match self.params.get(idx) {
            Some(0) | None => default,
            Some(&v) => v,
        }
    }

    /// Select Graphic Rendition (CSI ... m)
    pub fn is_sgr(&self) -> bool {
        self.final_byte == b'm' && self.private.is_none() && self.intermediates.is_empty()
    }
}
