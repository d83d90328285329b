//! Shared data model
//!
//! Everything downstream of byte decoding works on `StyledChar`s:
//! - Colors and the exclusive text attribute
//! - The styled character itself and its packed-bit interop form
//! - Cursor and growable grid used by the virtual terminal

mod cell;
mod cursor;
mod grid;

pub use cell::{
    plain_chars, to_text, Attribute, Rgb, Rgba, Style, StyledChar, CANONICAL_ANSI,
};
pub use cursor::Cursor;
pub use grid::{Grid, Row};
