//! Termshot Library
//!
//! Renders captured terminal output into a screenshot of a stylized terminal
//! window, or into plain text.
//!
//! - `core`: colors, styles, styled characters, cursor and grid
//! - `parser`: escape sequence state machine and SGR decoder
//! - `terminal`: virtual terminal that resolves cursor movement and erasure
//! - `highlight`: shell command tokenizer
//! - `theme`: color palettes and ANSI color remapping
//! - `renderer`: fonts and the software canvas
//! - `compositor`: window layout and rasterization
//! - `app`: configuration and the screenshot pipeline

pub mod app;
pub mod compositor;
pub mod core;
pub mod error;
pub mod highlight;
pub mod parser;
pub mod renderer;
pub mod terminal;
pub mod theme;

pub use app::{Config, Screenshot};
pub use error::{Error, Result};
