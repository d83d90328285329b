//! Crate-level error

use std::path::PathBuf;

use thiserror::Error;

use crate::app::ConfigError;
use crate::parser::DecodeError;
use crate::renderer::{FontError, RenderError};
use crate::theme::ThemeError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Theme(#[from] ThemeError),

    #[error(transparent)]
    Font(#[from] FontError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("file type not supported: {}", .filename.display())]
    UnsupportedOutput { filename: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
