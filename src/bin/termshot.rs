//! Termshot
//!
//! Renders terminal output into a PNG screenshot of a terminal window.
//! Output is read from `--raw-read` or piped in on stdin; the trailing
//! arguments name the command shown with `--show-cmd`.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use termshot::theme::Theme;
use termshot::{Config, Screenshot};

#[derive(Parser, Debug, Clone)]
#[command(name = "termshot")]
#[command(version)]
#[command(about = "Creates a screenshot of terminal command output", long_about = None)]
struct CliArgs {
    /// Path to a JSON config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Include the command in the screenshot
    #[arg(short = 'c', long)]
    show_cmd: bool,

    /// Force a fixed number of columns
    #[arg(short = 'C', long, value_name = "COLS")]
    columns: Option<usize>,

    /// Do not draw window decorations
    #[arg(long)]
    no_decoration: bool,

    /// Do not draw the window shadow
    #[arg(long)]
    no_shadow: bool,

    /// Clip the canvas to the visible image area
    #[arg(short = 's', long)]
    clip_canvas: bool,

    /// Built-in color theme
    #[arg(long, value_name = "THEME")]
    theme: Option<String>,

    /// Custom theme JSON file
    #[arg(long, value_name = "FILE")]
    theme_file: Option<PathBuf>,

    /// Print the built-in theme names and exit
    #[arg(long)]
    list_themes: bool,

    /// Custom prompt string
    #[arg(long, value_name = "PROMPT")]
    prompt: Option<String>,

    /// Highlight the command
    #[arg(long)]
    syntax_highlight: bool,

    /// Disable prompt detection in the output
    #[arg(long)]
    no_prompt_detect: bool,

    /// Resolve cursor movement and erase sequences before rendering
    #[arg(long)]
    improved_ansi: bool,

    /// Screenshot filename
    #[arg(short = 'f', long, value_name = "FILE")]
    filename: Option<PathBuf>,

    /// Write plain text here instead of a screenshot (`-` for stdout)
    #[arg(long, value_name = "FILE")]
    raw_write: Option<PathBuf>,

    /// Read output from this file instead of stdin (`-` for stdin)
    #[arg(long, value_name = "FILE")]
    raw_read: Option<PathBuf>,

    /// Font size in points
    #[arg(long, value_name = "SIZE")]
    font_size: Option<f32>,

    /// Regular font file
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Bold font file
    #[arg(long, value_name = "FILE")]
    font_bold: Option<PathBuf>,

    /// Italic font file
    #[arg(long, value_name = "FILE")]
    font_italic: Option<PathBuf>,

    /// Bold italic font file
    #[arg(long, value_name = "FILE")]
    font_bold_italic: Option<PathBuf>,

    /// Command shown in the screenshot
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl CliArgs {
    /// Layer the flags over a config loaded from file or the defaults
    fn into_config(self, mut config: Config) -> Config {
        config.show_command |= self.show_cmd;
        config.no_decoration |= self.no_decoration;
        config.no_shadow |= self.no_shadow;
        config.clip_canvas |= self.clip_canvas;
        config.syntax_highlight |= self.syntax_highlight;
        config.no_prompt_detect |= self.no_prompt_detect;
        config.improved_ansi |= self.improved_ansi;

        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        if let Some(filename) = self.filename {
            config.filename = filename;
        }

        config.theme_file = self.theme_file.or(config.theme_file);
        config.prompt = self.prompt.or(config.prompt);
        config.raw_write = self.raw_write.or(config.raw_write);
        config.raw_read = self.raw_read.or(config.raw_read);
        config.fonts.regular = self.font.or(config.fonts.regular);
        config.fonts.bold = self.font_bold.or(config.fonts.bold);
        config.fonts.italic = self.font_italic.or(config.fonts.italic);
        config.fonts.bold_italic = self.font_bold_italic.or(config.fonts.bold_italic);

        config
    }
}

fn run(args: CliArgs) -> termshot::Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let command = args.command.clone();
    let config = args.into_config(config);

    let shot = Screenshot::new(config).with_command(command);
    shot.run(io::stdin())?;

    if shot.config().raw_write.is_none() {
        tracing::info!("Screenshot saved to {}", shot.config().filename.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = CliArgs::parse();

    if args.list_themes {
        for name in Theme::names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
