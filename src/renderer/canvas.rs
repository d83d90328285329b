//! Software canvas
//!
//! An RGBA pixel buffer with the handful of antialiased primitives needed to
//! draw a terminal window: rectangles, rounded rectangles, circles, glyph
//! coverage maps, a blur for the drop shadow, and PNG output.
//!
//! Colors are straight (non-premultiplied) alpha and every primitive blends
//! source-over onto what is already there.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::font::RasterizedGlyph;
use crate::core::Rgba;

/// Rendering and encoding errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode PNG: {0}")]
    Png(#[from] png::EncodingError),
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
    #[error("image too large: {width}x{height}")]
    TooLarge { width: f32, height: f32 },
}

/// Largest accepted edge length in pixels
const MAX_DIMENSION: f32 = 32_768.0;

/// RGBA pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    /// Pixel buffer (RGBA)
    buffer: Vec<u8>,
    /// Buffer width
    width: u32,
    /// Buffer height
    height: u32,
}

impl Canvas {
    /// Create a fully transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Create a canvas from fractional dimensions, truncating like an
    /// integer image size.
    pub fn with_size(width: f32, height: f32) -> Result<Self, RenderError> {
        if !(0.0..=MAX_DIMENSION).contains(&width) || !(0.0..=MAX_DIMENSION).contains(&height) {
            return Err(RenderError::TooLarge { width, height });
        }
        Ok(Self::new(width as u32, height as u32))
    }

    /// Get buffer dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Color at a pixel, transparent outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::TRANSPARENT;
        }
        let idx = self.index(x, y);
        let p = &self.buffer[idx..idx + 4];
        Rgba::new(p[0], p[1], p[2], p[3])
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Blend `color` onto a pixel with the given coverage (0.0 - 1.0)
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }

        let sa = color.a as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }

        let idx = self.index(x as u32, y as u32);
        let dst = &mut self.buffer[idx..idx + 4];
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);

        let channel = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };

        dst[0] = channel(color.r, dst[0]);
        dst[1] = channel(color.g, dst[1]);
        dst[2] = channel(color.b, dst[2]);
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Fill an axis-aligned rectangle. Partially covered edge pixels are
    /// blended by their covered area.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        let (x0, x1) = (x.floor() as i64, (x + w).ceil() as i64);
        let (y0, y1) = (y.floor() as i64, (y + h).ceil() as i64);

        for py in y0.max(0)..y1.min(self.height as i64) {
            let cov_y = overlap(py as f32, y, y + h);
            for px in x0.max(0)..x1.min(self.width as i64) {
                let cov_x = overlap(px as f32, x, x + w);
                self.blend_pixel(px, py, color, cov_x * cov_y);
            }
        }
    }

    /// Fill a rounded rectangle
    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgba) {
        let shape = RoundedRect::new(x, y, w, h, radius);
        self.shade(shape.bounds(1.0), color, |px, py| {
            (0.5 - shape.distance(px, py)).clamp(0.0, 1.0)
        });
    }

    /// Stroke the outline of a rounded rectangle, centered on its edge
    pub fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        line_width: f32,
        color: Rgba,
    ) {
        let shape = RoundedRect::new(x, y, w, h, radius);
        let half = line_width / 2.0;
        self.shade(shape.bounds(half + 1.0), color, |px, py| {
            (half + 0.5 - shape.distance(px, py).abs()).clamp(0.0, 1.0)
        });
    }

    /// Fill a circle
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        let bounds = (cx - radius - 1.0, cy - radius - 1.0, cx + radius + 1.0, cy + radius + 1.0);
        self.shade(bounds, color, |px, py| {
            let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt() - radius;
            (0.5 - d).clamp(0.0, 1.0)
        });
    }

    /// Blend `color` over every pixel in `bounds` with the coverage returned
    /// for the pixel center
    fn shade(
        &mut self,
        (left, top, right, bottom): (f32, f32, f32, f32),
        color: Rgba,
        coverage: impl Fn(f32, f32) -> f32,
    ) {
        let x0 = (left.floor() as i64).max(0);
        let y0 = (top.floor() as i64).max(0);
        let x1 = (right.ceil() as i64).min(self.width as i64);
        let y1 = (bottom.ceil() as i64).min(self.height as i64);

        for py in y0..y1 {
            for px in x0..x1 {
                let cov = coverage(px as f32 + 0.5, py as f32 + 0.5);
                if cov > 0.0 {
                    self.blend_pixel(px, py, color, cov);
                }
            }
        }
    }

    /// Draw a glyph with its pen at `x` on the baseline `baseline`
    pub fn draw_glyph(&mut self, glyph: &RasterizedGlyph, x: f32, baseline: f32, color: Rgba) {
        let m = &glyph.metrics;
        let left = x.round() as i64 + m.xmin as i64;
        let top = baseline.round() as i64 - m.height as i64 - m.ymin as i64;

        for gy in 0..m.height {
            for gx in 0..m.width {
                let alpha = glyph.bitmap.get(gy * m.width + gx).copied().unwrap_or(0);
                if alpha > 0 {
                    let coverage = alpha as f32 / 255.0;
                    self.blend_pixel(left + gx as i64, top + gy as i64, color, coverage);
                }
            }
        }
    }

    /// Composite `other` over this canvas, aligned at the origin
    pub fn draw_canvas(&mut self, other: &Canvas) {
        for y in 0..other.height.min(self.height) {
            for x in 0..other.width.min(self.width) {
                let p = other.pixel(x, y);
                if p.a > 0 {
                    self.blend_pixel(x as i64, y as i64, p, 1.0);
                }
            }
        }
    }

    /// Blur in place with three box-blur passes approximating a gaussian of
    /// the given radius. Works on premultiplied values so transparent
    /// surroundings do not darken the edges.
    pub fn blur(&mut self, radius: u32) {
        if radius == 0 || self.width == 0 || self.height == 0 {
            return;
        }

        let (w, h) = (self.width as usize, self.height as usize);
        let mut data: Vec<f32> = self
            .buffer
            .chunks_exact(4)
            .flat_map(|p| {
                let a = p[3] as f32 / 255.0;
                [p[0] as f32 * a, p[1] as f32 * a, p[2] as f32 * a, p[3] as f32]
            })
            .collect();
        let mut scratch = vec![0f32; data.len()];

        let box_radius = (radius as usize).div_ceil(2);
        for _ in 0..3 {
            box_blur(&data, &mut scratch, w, h, box_radius, Axis::Horizontal);
            box_blur(&scratch, &mut data, w, h, box_radius, Axis::Vertical);
        }

        for (dst, src) in self.buffer.chunks_exact_mut(4).zip(data.chunks_exact(4)) {
            let a = src[3].clamp(0.0, 255.0);
            if a < 0.5 {
                dst.copy_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            let unpremultiply = |v: f32| (v * 255.0 / a).round().clamp(0.0, 255.0) as u8;
            dst[0] = unpremultiply(src[0]);
            dst[1] = unpremultiply(src[1]);
            dst[2] = unpremultiply(src[2]);
            dst[3] = a.round() as u8;
        }
    }

    /// Inclusive bounding box `(x0, y0, x1, y1)` of all pixels that are not
    /// fully transparent black
    pub fn content_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;

        for (i, p) in self.buffer.chunks_exact(4).enumerate() {
            if p == [0, 0, 0, 0] {
                continue;
            }
            let x = (i % self.width as usize) as u32;
            let y = (i / self.width as usize) as u32;
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }

        bounds
    }

    /// Copy out the inclusive region `(x0, y0)..=(x1, y1)`
    pub fn crop(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> Canvas {
        let x1 = x1.min(self.width.saturating_sub(1));
        let y1 = y1.min(self.height.saturating_sub(1));
        if x0 > x1 || y0 > y1 {
            return Canvas::new(0, 0);
        }

        let mut out = Canvas::new(x1 - x0 + 1, y1 - y0 + 1);
        let row_len = out.width as usize * 4;
        for y in y0..=y1 {
            let src = self.index(x0, y);
            let dst = out.index(0, y - y0);
            out.buffer[dst..dst + row_len].copy_from_slice(&self.buffer[src..src + row_len]);
        }
        out
    }

    /// Shrink to the tightest box around the visible pixels. A canvas with no
    /// visible pixels is returned unchanged.
    pub fn clip(self) -> Canvas {
        match self.content_bounds() {
            Some((x0, y0, x1, y1)) => self.crop(x0, y0, x1, y1),
            None => self,
        }
    }

    /// Encode as an 8-bit RGBA PNG
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), RenderError> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.buffer)?;
        writer.finish()?;
        Ok(())
    }

    /// Encode as PNG into a file
    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_png(&mut out)?;
        out.flush()?;
        Ok(())
    }
}

/// Covered fraction of the unit pixel starting at `p` by the span `[a, b)`
fn overlap(p: f32, a: f32, b: f32) -> f32 {
    (b.min(p + 1.0) - a.max(p)).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy)]
struct RoundedRect {
    cx: f32,
    cy: f32,
    half_w: f32,
    half_h: f32,
    radius: f32,
}

impl RoundedRect {
    fn new(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Self {
        let radius = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        Self {
            cx: x + w / 2.0,
            cy: y + h / 2.0,
            half_w: w / 2.0,
            half_h: h / 2.0,
            radius,
        }
    }

    fn bounds(&self, pad: f32) -> (f32, f32, f32, f32) {
        (
            self.cx - self.half_w - pad,
            self.cy - self.half_h - pad,
            self.cx + self.half_w + pad,
            self.cy + self.half_h + pad,
        )
    }

    /// Signed distance from the outline, negative inside
    fn distance(&self, px: f32, py: f32) -> f32 {
        let qx = (px - self.cx).abs() - (self.half_w - self.radius);
        let qy = (py - self.cy).abs() - (self.half_h - self.radius);
        let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
        let inside = qx.max(qy).min(0.0);
        outside + inside - self.radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One box-blur pass over interleaved 4-channel data. Samples outside the
/// image count as zero.
fn box_blur(src: &[f32], dst: &mut [f32], w: usize, h: usize, radius: usize, axis: Axis) {
    let (lines, len) = match axis {
        Axis::Horizontal => (h, w),
        Axis::Vertical => (w, h),
    };
    let at = |line: usize, i: usize| match axis {
        Axis::Horizontal => (line * w + i) * 4,
        Axis::Vertical => (i * w + line) * 4,
    };
    let scale = 1.0 / (2 * radius + 1) as f32;

    for line in 0..lines {
        let mut sum = [0f32; 4];
        for i in 0..radius.min(len) {
            let idx = at(line, i);
            for c in 0..4 {
                sum[c] += src[idx + c];
            }
        }

        for i in 0..len {
            if i + radius < len {
                let idx = at(line, i + radius);
                for c in 0..4 {
                    sum[c] += src[idx + c];
                }
            }
            if i > radius {
                let idx = at(line, i - radius - 1);
                for c in 0..4 {
                    sum[c] -= src[idx + c];
                }
            }

            let idx = at(line, i);
            for c in 0..4 {
                dst[idx + c] = (sum[c] * scale).max(0.0);
            }
        }
    }
}
