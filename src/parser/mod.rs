//! Terminal escape sequence parser
//!
//! A stateful parser that converts bytes into actions, and the SGR decoder
//! that turns those actions into styled characters.
//! Based on the VT500-series parser model from <https://vt100.net/emu/dec_ansi_parser>

mod action;
mod decoder;
mod state;

pub use action::{Action, CsiAction};
pub use decoder::{decode, DecodeError, Decoder, Pen};
pub use state::Parser;
