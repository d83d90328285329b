//! Golden tests for the decoder and virtual terminal
//!
//! Each case feeds raw bytes through `interpret_reader` and compares the
//! flattened text against the expected output.

use proptest::prelude::*;
use termshot::core::{to_text, Attribute, Rgb, StyledChar};
use termshot::parser::Decoder;
use termshot::terminal::{interpret, interpret_reader, Terminal};

fn run(input: &str, columns: usize) -> Vec<StyledChar> {
    interpret_reader(input.as_bytes(), columns).unwrap()
}

fn run_text(input: &str, columns: usize) -> String {
    to_text(&run(input, columns))
}

#[test]
fn golden_plain_lines() {
    assert_eq!(run_text("hello\nworld\n", 80), "hello\nworld\n");
}

#[test]
fn golden_carriage_return_overwrites() {
    assert_eq!(run_text("12345\rab", 80), "ab345");
}

#[test]
fn golden_erase_line_modes() {
    assert_eq!(run_text("abcdef\x1b[1;3H\x1b[K", 80), "ab");
    assert_eq!(run_text("abcdef\x1b[1;3H\x1b[0K", 80), "ab");
    assert_eq!(run_text("abcdef\x1b[1;3H\x1b[1K", 80), "   def");
    assert_eq!(run_text("abcdef\x1b[1;3H\x1b[2K", 80), "");
}

#[test]
fn golden_erase_display() {
    assert_eq!(run_text("one\ntwo\nthree\x1b[2;2H\x1b[J", 80), "one\nt");
    assert_eq!(run_text("one\ntwo\x1b[2J", 80), "");
    assert_eq!(run_text("one\ntwo\x1b[2Jnew", 80), "new");
}

#[test]
fn golden_cursor_position_idempotent() {
    let once = run("abc\x1b[2;5HX", 80);
    let twice = run("abc\x1b[2;5H\x1b[2;5HX", 80);
    assert_eq!(once, twice);
    assert_eq!(to_text(&once), "abc\n    X");
}

#[test]
fn golden_relative_moves() {
    assert_eq!(run_text("a\nb\x1b[Ac", 80), "ac\nb");
    assert_eq!(run_text("abc\x1b[2DX", 80), "aXc");
    assert_eq!(run_text("a\x1b[3Cb", 80), "a   b");
    assert_eq!(run_text("a\x1b[2Bb", 80), "a\n\n b");
    assert_eq!(run_text("abcdef\x1b[3GX", 80), "abXdef");
}

#[test]
fn golden_save_and_restore() {
    assert_eq!(run_text("ab\x1b[sxyz\x1b[u!", 80), "ab!yz");
}

#[test]
fn golden_wraps_at_columns() {
    let out = run_text("abcdefghijkl", 5);
    assert_eq!(out, "abcde\nfghij\nkl");
}

#[test]
fn golden_trailing_unterminated_sequence() {
    // only the ESC is dropped; the rest prints as text
    assert_eq!(run_text("done\x1b[", 80), "done[");
    assert_eq!(run_text("done\x1b[12;", 80), "done[12;");
}

#[test]
fn golden_unknown_sequences_dropped() {
    assert_eq!(run_text("a\x1b[?25lb\x1b[?25h", 80), "ab");
    assert_eq!(run_text("a\x1b[5Sb", 80), "ab");
}

#[test]
fn golden_colors_survive_movement() {
    let out = run("\x1b[31mred\x1b[0m\x1b[1Gr", 80);
    assert_eq!(to_text(&out), "red");
    assert_eq!(out[0].style.fg, None);
    assert_eq!(out[1].style.fg, Some(Rgb::new(128, 0, 0)));
}

#[test]
fn golden_bold_italic_attributes() {
    let out = run("\x1b[1mb\x1b[3mi\x1b[22mj\x1b[0;4mu", 80);
    let attrs: Vec<_> = out.iter().map(|c| c.style.attr).collect();
    assert_eq!(
        attrs,
        [
            Attribute::Bold,
            Attribute::BoldItalic,
            Attribute::Italic,
            Attribute::Underline
        ]
    );
}

#[test]
fn golden_decoded_input_matches_reader() {
    let input = "line\x1b[2Dxx\nnext\x1b[1;1H>";
    let chars = Decoder::new()
        .keep_cursor_sequences(true)
        .decode(input.as_bytes());

    let mut term = Terminal::new(80);
    term.process(&chars);
    assert_eq!(term.cursor().row, 0);
    assert_eq!(term.cursor().col, 1);
    assert_eq!(to_text(&term.flatten()), ">ixx\nnext");
    assert_eq!(interpret(&chars, 80), run(input, 80));
}

proptest! {
    #[test]
    fn prop_long_runs_wrap_without_loss(text in "[a-z]{1,200}", columns in 1usize..40) {
        let out = run(&text, columns);
        let lines: Vec<_> = to_text(&out).split('\n').map(str::to_string).collect();

        prop_assert!(lines.iter().all(|l| l.chars().count() <= columns));
        prop_assert_eq!(lines.concat(), text.clone());
        prop_assert_eq!(lines.len(), text.len().div_ceil(columns));
    }
}
