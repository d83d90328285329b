//! Application glue module
//!
//! Configuration and the screenshot pipeline that ties decoding, the virtual
//! terminal, the compositor and the fonts together.

mod config;

use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::Path;

pub use config::{Config, ConfigError};

use crate::compositor::Compositor;
use crate::core::StyledChar;
use crate::error::{Error, Result};
use crate::parser::{decode, DecodeError};
use crate::renderer::FontSet;
use crate::terminal::interpret_reader;

/// Columns handed to the virtual terminal when the width is automatic
pub const AUTO_TERMINAL_COLUMNS: usize = 500;

const STDIO: &str = "-";

/// One screenshot run: a configuration plus the command being shown
#[derive(Debug, Clone, Default)]
pub struct Screenshot {
    config: Config,
    command: Vec<String>,
}

impl Screenshot {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            command: Vec::new(),
        }
    }

    /// Command line echoed above the output when `show_command` is set
    pub fn with_command<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reject output targets that cannot be produced
    pub fn validate(&self) -> Result<()> {
        if self.config.raw_write.is_some() {
            return Ok(());
        }

        let is_png = self
            .config
            .filename
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if !is_png {
            return Err(Error::UnsupportedOutput {
                filename: self.config.filename.clone(),
            });
        }
        Ok(())
    }

    /// Build the compositor holding the command echo and the content.
    /// `captured` is read only when no `raw_read` source is configured.
    pub fn compose<R: Read>(&self, captured: R) -> Result<Compositor> {
        let theme = self.config.resolve_theme()?;
        tracing::debug!("Using theme {}", theme.name);

        let mut compositor = Compositor::new(self.config.compositor_config(), theme);

        if self.config.show_command && self.config.raw_read.is_none() {
            compositor.add_command(&self.command);
        }

        let bytes = self.read_content(captured)?;
        tracing::debug!("Read {} bytes of content", bytes.len());

        compositor.add_styled(self.decode_content(&bytes));
        Ok(compositor)
    }

    /// Run the whole pipeline, loading fonts from the configuration
    pub fn run<R: Read>(&self, captured: R) -> Result<()> {
        self.validate()?;
        let compositor = self.compose(captured)?;

        if let Some(target) = &self.config.raw_write {
            return write_raw(&compositor, target);
        }

        let mut fonts = FontSet::load(&self.config.fonts, self.config.font_pixel_size())?;
        self.save(&compositor, &mut fonts)
    }

    /// Render the compositor and write the image to the configured filename
    pub fn save(&self, compositor: &Compositor, fonts: &mut FontSet) -> Result<()> {
        let canvas = compositor.render(fonts)?;
        let (width, height) = canvas.dimensions();
        tracing::debug!("Rendered {}x{} canvas", width, height);

        canvas.save_png(&self.config.filename)?;
        tracing::debug!("Wrote {}", self.config.filename.display());
        Ok(())
    }

    fn read_content<R: Read>(&self, captured: R) -> Result<Vec<u8>> {
        match &self.config.raw_read {
            Some(path) if path == Path::new(STDIO) => read_all(io::stdin()),
            Some(path) => read_all(File::open(path)?),
            None => read_all(captured),
        }
    }

    fn decode_content(&self, bytes: &[u8]) -> Vec<StyledChar> {
        if !self.config.improved_ansi {
            return decode(bytes);
        }

        let columns = match self.config.columns {
            0 => AUTO_TERMINAL_COLUMNS,
            n => n,
        };
        match interpret_reader(bytes, columns) {
            Ok(chars) => chars,
            Err(e) => {
                tracing::warn!("Virtual terminal failed, using plain decoding: {}", e);
                decode(bytes)
            }
        }
    }
}

fn read_all<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(DecodeError::from)?;
    Ok(bytes)
}

fn write_raw(compositor: &Compositor, target: &Path) -> Result<()> {
    if target == Path::new(STDIO) {
        compositor.write_raw(io::stdout().lock())?;
    } else {
        let file = File::create(target)?;
        compositor.write_raw(BufWriter::new(file))?;
    }
    tracing::debug!("Wrote raw text to {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_validate_rejects_non_png() {
        let shot = Screenshot::new(Config {
            filename: PathBuf::from("shot.jpg"),
            ..Default::default()
        });
        assert!(matches!(
            shot.validate(),
            Err(Error::UnsupportedOutput { .. })
        ));

        let shot = Screenshot::new(Config {
            filename: PathBuf::from("shot.PNG"),
            ..Default::default()
        });
        assert!(shot.validate().is_ok());
    }

    #[test]
    fn test_validate_skipped_for_raw_write() {
        let shot = Screenshot::new(Config {
            filename: PathBuf::from("shot"),
            raw_write: Some(PathBuf::from("-")),
            ..Default::default()
        });
        assert!(shot.validate().is_ok());
    }

    #[test]
    fn test_compose_with_command() {
        let shot = Screenshot::new(Config {
            show_command: true,
            prompt: Some("$".to_string()),
            ..Default::default()
        })
        .with_command(["echo", "hi"]);

        let comp = shot.compose("hi\n".as_bytes()).unwrap();
        assert_eq!(comp.text(), "$ echo hi\nhi\n");
    }

    #[test]
    fn test_compose_raw_read_skips_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.txt");
        std::fs::write(&path, "from file").unwrap();

        let shot = Screenshot::new(Config {
            show_command: true,
            raw_read: Some(path),
            ..Default::default()
        })
        .with_command(["ignored"]);

        let comp = shot.compose("not read".as_bytes()).unwrap();
        assert_eq!(comp.text(), "from file");
    }

    #[test]
    fn test_compose_improved_ansi() {
        let plain = Screenshot::new(Config::default());
        let comp = plain.compose("abc\x1b[2Dx".as_bytes()).unwrap();
        assert_eq!(comp.text(), "abcx");

        let improved = Screenshot::new(Config {
            improved_ansi: true,
            ..Default::default()
        });
        let comp = improved.compose("abc\x1b[2Dx".as_bytes()).unwrap();
        assert_eq!(comp.text(), "axc");
    }

    #[test]
    fn test_run_raw_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        let shot = Screenshot::new(Config {
            columns: 3,
            raw_write: Some(target.clone()),
            ..Default::default()
        });
        shot.run("hello\nworld".as_bytes()).unwrap();

        assert_eq!(std::fs::read_to_string(target).unwrap(), "hello\nworld");
    }

    #[test]
    fn test_run_missing_theme_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let shot = Screenshot::new(Config {
            theme_file: Some(dir.path().join("nope.json")),
            raw_write: Some(dir.path().join("out.txt")),
            ..Default::default()
        });
        assert!(matches!(shot.run(io::empty()), Err(Error::Theme(_))));
    }
}
