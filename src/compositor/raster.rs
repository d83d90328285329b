//! Layout and rasterization
//!
//! All geometric constants are given at scale 1 and multiplied by the
//! configured scale factor, so the default scale of 2 supersamples the
//! whole window.

use std::io::Write;

use super::Compositor;
use crate::core::{Attribute, Rgba, StyledChar};
use crate::renderer::{Canvas, Face, FontSet, RenderError};

const MARGIN: f32 = 48.0;
const PADDING: f32 = 24.0;
const CORNER_RADIUS: f32 = 6.0;
const BUTTON_RADIUS: f32 = 9.0;
const BUTTON_DISTANCE: f32 = 25.0;
const BUTTON_INSET: f32 = 4.0;
const TITLE_BAR: f32 = 40.0;
const BORDER_WIDTH: f32 = 1.0;
const SHADOW_OFFSET: f32 = 16.0;
const SHADOW_RADIUS: f32 = 16.0;
const UNDERLINE_OFFSET: f32 = 4.0;
const UNDERLINE_WIDTH: f32 = 1.0;

/// Characters some fonts render poorly, with their replacement
fn substitute(c: char) -> char {
    match c {
        '✗' | 'ˣ' => '×',
        _ => c,
    }
}

impl Compositor {
    fn scaled(&self, value: f32) -> f32 {
        value * self.config.scale
    }

    /// Horizontal advance of a character as laid out in the window
    fn advance(&self, face: &dyn Face, c: char) -> f32 {
        match c {
            '\t' => face.advance(' ') * self.config.tab_spaces as f32,
            c if c.is_control() => 0.0,
            c => face.advance(substitute(c)),
        }
    }

    /// Lines of content, ignoring a single trailing line break
    fn lines(&self) -> Vec<&[StyledChar]> {
        let content = match self.content.split_last() {
            Some((last, rest)) if last.is_line_break() => rest,
            _ => &self.content[..],
        };
        content.split(StyledChar::is_line_break).collect()
    }

    /// Size of the text area in pixels
    pub fn measure(&self, face: &dyn Face) -> (f32, f32) {
        let lines = self.lines();

        let width = match self.config.columns {
            0 => lines
                .iter()
                .map(|line| line.iter().map(|c| self.advance(face, c.symbol)).sum::<f32>())
                .fold(0.0, f32::max),
            columns => face.advance('a') * columns as f32,
        };
        let height = lines.len() as f32 * face.line_height() * self.config.line_spacing;

        (width, height)
    }

    /// Render the window into a new canvas
    pub fn render(&self, fonts: &mut FontSet) -> Result<Canvas, RenderError> {
        let corner = self.scaled(CORNER_RADIUS);
        let radius = self.scaled(BUTTON_RADIUS);
        let distance = self.scaled(BUTTON_DISTANCE);
        let margin = self.scaled(MARGIN);
        let padding = self.scaled(PADDING);
        let title = if self.config.decorations {
            self.scaled(TITLE_BAR)
        } else {
            0.0
        };

        let (content_width, content_height) = self.measure(fonts.regular());
        let content_width = content_width.max(3.0 * distance + 3.0 * radius);

        let width = content_width + 2.0 * margin + 2.0 * padding;
        let height = content_height + 2.0 * margin + 2.0 * padding + title;
        let (window_w, window_h) = (width - 2.0 * margin, height - 2.0 * margin);

        let mut canvas = Canvas::with_size(width, height)?;
        let (mut x0, mut y0) = (margin, margin);
        tracing::debug!("Rendering {}x{} window", width as u32, height as u32);

        if self.config.shadow {
            let offset = self.scaled(SHADOW_OFFSET);
            x0 -= offset / 2.0;
            y0 -= offset / 2.0;

            let mut shadow = Canvas::with_size(width, height)?;
            shadow.fill_rounded_rect(
                x0 + offset,
                y0 + offset,
                window_w,
                window_h,
                corner,
                self.theme.shadow,
            );
            shadow.blur(self.scaled(SHADOW_RADIUS) as u32);
            canvas.draw_canvas(&shadow);
        }

        canvas.fill_rounded_rect(x0, y0, window_w, window_h, corner, self.theme.background);
        canvas.stroke_rounded_rect(
            x0,
            y0,
            window_w,
            window_h,
            corner,
            self.scaled(BORDER_WIDTH),
            self.theme.window_border,
        );

        if self.config.decorations {
            let inset = self.scaled(BUTTON_INSET);
            let buttons = [
                self.theme.window_red,
                self.theme.window_yellow,
                self.theme.window_green,
            ];
            for (i, color) in buttons.into_iter().enumerate() {
                let cx = x0 + padding + i as f32 * distance + inset;
                canvas.fill_circle(cx, y0 + padding + inset, radius, color);
            }
        }

        self.draw_text(&mut canvas, fonts, x0 + padding, y0 + padding + title);

        Ok(if self.config.clip_canvas {
            canvas.clip()
        } else {
            canvas
        })
    }

    /// Draw the content with the top-left of the text area at (`left`, `top`)
    fn draw_text(&self, canvas: &mut Canvas, fonts: &mut FontSet, left: f32, top: f32) {
        let line_height = fonts.regular().line_height();
        let ascent = fonts.regular().ascent();
        let underline_offset = self.scaled(UNDERLINE_OFFSET);
        let underline_width = self.scaled(UNDERLINE_WIDTH);

        let (mut x, mut y) = (left, top + ascent);

        for c in &self.content {
            if c.is_line_break() {
                x = left;
                y += line_height * self.config.line_spacing;
                continue;
            }

            let face = fonts.face(c.style.attr);
            let w = self.advance(face, c.symbol);
            let fg: Rgba = c
                .style
                .fg
                .map(|rgb| self.theme.remap(rgb))
                .unwrap_or(self.theme.foreground);

            if let Some(bg) = c.style.bg {
                canvas.fill_rect(x, y - ascent, w, line_height, self.theme.remap(bg));
            }

            if c.symbol == '\t' || c.symbol.is_control() {
                x += w;
                continue;
            }

            let glyph = face.rasterize(substitute(c.symbol));
            canvas.draw_glyph(glyph, x, y, fg);

            if c.style.attr == Attribute::Underline {
                let line_y = y + underline_offset - underline_width / 2.0;
                canvas.fill_rect(x, line_y, w, underline_width, fg);
            }

            x += w;
        }
    }

    /// Render and encode as PNG
    pub fn write_png<W: Write>(&self, fonts: &mut FontSet, writer: W) -> Result<(), RenderError> {
        self.render(fonts)?.write_png(writer)
    }
}
