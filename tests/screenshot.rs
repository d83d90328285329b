//! End-to-end tests for the screenshot pipeline
//!
//! Rendering uses a fixed-metric block face so results never depend on the
//! fonts installed on the machine.

use std::fs::File;
use std::path::PathBuf;

use termshot::core::Rgba;
use termshot::renderer::{Face, FontSet, GlyphMetrics, RasterizedGlyph};
use termshot::{Config, Error, Screenshot};

/// Every glyph is a solid 8x10 block on a 10px advance
struct BlockFace {
    glyph: RasterizedGlyph,
}

impl Face for BlockFace {
    fn advance(&self, _: char) -> f32 {
        10.0
    }
    fn line_height(&self) -> f32 {
        20.0
    }
    fn ascent(&self) -> f32 {
        15.0
    }
    fn rasterize(&mut self, _: char) -> &RasterizedGlyph {
        &self.glyph
    }
}

fn block_fonts() -> FontSet {
    FontSet::new(Box::new(BlockFace {
        glyph: RasterizedGlyph {
            metrics: GlyphMetrics {
                xmin: 0,
                ymin: 0,
                width: 8,
                height: 10,
                advance: 10.0,
            },
            bitmap: vec![255; 80],
        },
    }))
}

/// Window without chrome at scale 1, so the first glyph sits at (72, 77)
fn bare_config() -> Config {
    Config {
        no_decoration: true,
        no_shadow: true,
        scale: 1.0,
        line_spacing: 1.0,
        ..Default::default()
    }
}

fn theme_json(red: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "test",
        "background": "#101010",
        "foreground": "#eeeeee",
        "window_red": "#ff5f56",
        "window_yellow": "#ffbd2e",
        "window_green": "#27c93f",
        "window_border": "#333333",
        "shadow": "#00000080",
        "black": "#000000",
        "red": red,
        "green": "#00aa00",
        "yellow": "#aaaa00",
        "blue": "#0000aa",
        "magenta": "#aa00aa",
        "cyan": "#00aaaa",
        "white": "#aaaaaa",
        "bright_black": "#555555",
        "bright_red": "#ff5555",
        "bright_green": "#55ff55",
        "bright_yellow": "#ffff55",
        "bright_blue": "#5555ff",
        "bright_magenta": "#ff55ff",
        "bright_cyan": "#55ffff",
        "bright_white": "#ffffff"
    })
}

#[test]
fn test_raw_write_ignores_columns() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("raw.txt");

    let shot = Screenshot::new(Config {
        columns: 3,
        raw_write: Some(target.clone()),
        ..Default::default()
    });
    shot.run("hello\nworld".as_bytes()).unwrap();

    assert_eq!(std::fs::read(&target).unwrap(), b"hello\nworld");
}

#[test]
fn test_raw_write_strips_styling() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("raw.txt");

    let shot = Screenshot::new(Config {
        raw_write: Some(target.clone()),
        ..Default::default()
    });
    shot.run("\x1b[1;31merror\x1b[0m: nope".as_bytes()).unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "error: nope");
}

#[test]
fn test_prompt_detection_end_to_end() {
    let shot = Screenshot::new(Config::default());
    let comp = shot.compose("❯ ls -la\nfile1\nfile2".as_bytes()).unwrap();
    assert_eq!(comp.text(), "❯ ls -la\n\nfile1\nfile2");

    let comp = shot.compose("❯ ls\n❯ pwd\n".as_bytes()).unwrap();
    assert_eq!(comp.text(), "❯ ls\n❯ pwd\n");
}

#[test]
fn test_show_command_echo() {
    let shot = Screenshot::new(Config {
        show_command: true,
        prompt: Some("λ".to_string()),
        no_prompt_detect: true,
        ..Default::default()
    })
    .with_command(vec!["git".to_string(), "status".to_string()]);

    let comp = shot.compose("clean\n".as_bytes()).unwrap();
    assert_eq!(comp.text(), "λ git status\nclean\n");
}

#[test]
fn test_theme_file_remaps_canonical_red() {
    let dir = tempfile::tempdir().unwrap();
    let theme_path = dir.path().join("theme.json");
    std::fs::write(&theme_path, theme_json("#334455").to_string()).unwrap();

    let shot = Screenshot::new(Config {
        theme_file: Some(theme_path),
        ..bare_config()
    });
    let comp = shot
        .compose("\x1b[31mr\x1b[38;2;17;29;200mt".as_bytes())
        .unwrap();
    let canvas = comp.render(&mut block_fonts()).unwrap();

    assert_eq!(canvas.pixel(73, 80), Rgba::new(0x33, 0x44, 0x55, 255));
    assert_eq!(canvas.pixel(83, 80), Rgba::new(17, 29, 200, 255));
}

#[test]
fn test_incomplete_theme_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let theme_path = dir.path().join("theme.json");
    let mut json = theme_json("#334455");
    json.as_object_mut().unwrap().remove("bright_white");
    std::fs::write(&theme_path, json.to_string()).unwrap();

    let shot = Screenshot::new(Config {
        theme_file: Some(theme_path),
        ..Default::default()
    });
    assert!(matches!(
        shot.compose("x".as_bytes()),
        Err(Error::Theme(_))
    ));
}

#[test]
fn test_unsupported_output_rejected_before_reading() {
    struct Unreadable;

    impl std::io::Read for Unreadable {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            panic!("content must not be read for an invalid target");
        }
    }

    let shot = Screenshot::new(Config {
        filename: PathBuf::from("shot.jpg"),
        ..Default::default()
    });
    let err = shot.run(Unreadable).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOutput { .. }));
    assert_eq!(err.to_string(), "file type not supported: shot.jpg");
}

#[test]
fn test_unreadable_input_is_a_decode_error() {
    struct Broken;

    impl std::io::Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "pipe closed"))
        }
    }

    let shot = Screenshot::new(Config::default());
    assert!(matches!(shot.compose(Broken), Err(Error::Decode(_))));
}

#[test]
fn test_save_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let filename = dir.path().join("shot.png");

    let shot = Screenshot::new(Config {
        filename: filename.clone(),
        clip_canvas: true,
        ..bare_config()
    });
    let comp = shot.compose("\x1b[32mok\x1b[0m\n".as_bytes()).unwrap();
    let expected = comp.render(&mut block_fonts()).unwrap().dimensions();

    shot.save(&comp, &mut block_fonts()).unwrap();

    let decoder = png::Decoder::new(File::open(&filename).unwrap());
    let reader = decoder.read_info().unwrap();
    let info = reader.info();
    assert_eq!((info.width, info.height), expected);
    assert_eq!(info.color_type, png::ColorType::Rgba);
}

#[test]
fn test_improved_ansi_progress_line() {
    let shot = Screenshot::new(Config {
        improved_ansi: true,
        ..Default::default()
    });
    let comp = shot
        .compose("downloading 10%\r\x1b[Kdownloading 100%\ndone".as_bytes())
        .unwrap();
    assert_eq!(comp.text(), "downloading 100%\ndone");
}
