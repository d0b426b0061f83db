//! CPU rasterizer implementing [`Surface`].
//!
//! Pixels are stored as premultiplied `f32` RGBA and blended source-over,
//! which matches what a 2D canvas does closely enough for soft, low-alpha
//! effects. Keeping floats means the background fade actually converges to
//! its target instead of leaving 8-bit rounding ghosts.
//!
//! The native viewer uploads [`Framebuffer::premultiplied_rgba8`] as a texture
//! each frame; snapshots go through [`Framebuffer::save_png`].

use crate::error::SnapshotError;
use crate::surface::Surface;
use crate::visuals::{Color, Paint, Stroke};
use glam::Vec2;
use std::path::Path;

/// Share of the base alpha the glow halo starts at.
const GLOW_STRENGTH: f32 = 0.5;

/// A premultiplied RGBA image that can be painted through [`Surface`].
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize and clear.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize(width as usize * height as usize, [0.0; 4]);
    }

    /// Premultiplied pixel value, or transparent outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        if x >= self.width || y >= self.height {
            return [0.0; 4];
        }
        self.pixels[(y * self.width + x) as usize]
    }

    /// Straight-alpha color of a pixel.
    pub fn color_at(&self, x: u32, y: u32) -> Color {
        let [r, g, b, a] = self.pixel(x, y);
        if a <= 0.0 {
            return Color::TRANSPARENT;
        }
        Color::rgba(r / a, g / a, b / a, a)
    }

    /// Bytes for GPU upload, premultiplied.
    pub fn premultiplied_rgba8(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.pixels.len() * 4);
        for p in &self.pixels {
            out.extend(p.iter().map(|&c| to_u8(c)));
        }
    }

    /// Bytes with straight alpha, the layout PNG expects.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &[r, g, b, a] in &self.pixels {
            if a <= 0.0 {
                out.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                out.extend_from_slice(&[to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a)]);
            }
        }
        out
    }

    /// Write the buffer as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        if self.width == 0 || self.height == 0 {
            return Err(SnapshotError::Empty);
        }
        image::save_buffer(
            path,
            &self.to_rgba8(),
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }

    /// Source-over blend of a premultiplied color scaled by `coverage`.
    #[inline]
    fn blend(&mut self, x: i64, y: i64, src: [f32; 4], coverage: f32) {
        if coverage <= 0.0 || x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        let dst = &mut self.pixels[idx];
        let a = src[3] * coverage;
        let keep = 1.0 - a;
        for c in 0..3 {
            dst[c] = src[c] * coverage + dst[c] * keep;
        }
        dst[3] = a + dst[3] * keep;
    }

    /// Fill the pixels whose centers fall inside `[min, max)`.
    fn fill_rect(&mut self, min: Vec2, max: Vec2, src: [f32; 4]) {
        let Some((x0, x1)) = Self::span(min.x, max.x, self.width) else {
            return;
        };
        let Some((y0, y1)) = Self::span(min.y, max.y, self.height) else {
            return;
        };
        for py in y0..=y1 {
            let cy = py as f32 + 0.5;
            if cy < min.y || cy >= max.y {
                continue;
            }
            for px in x0..=x1 {
                let cx = px as f32 + 0.5;
                if cx >= min.x && cx < max.x {
                    self.blend(px, py, src, 1.0);
                }
            }
        }
    }

    /// Pixel index range covering `[lo, hi]`, clamped to `0..extent`.
    fn span(lo: f32, hi: f32, extent: u32) -> Option<(i64, i64)> {
        if !(lo.is_finite() && hi.is_finite()) || extent == 0 {
            return None;
        }
        let start = (lo.floor() as i64).max(0);
        let end = (hi.ceil() as i64).min(extent as i64 - 1);
        (start <= end).then_some((start, end))
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Distance from `p` to segment `a..b` and the segment parameter of the
/// closest point.
fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> (f32, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return (p.distance(a), 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p.distance(a + ab * t), t)
}

/// 5x7 bitmaps for the binary digits; every other glyph gets a stable
/// pseudo-random pattern.
fn glyph_rows(glyph: char) -> [u8; 7] {
    match glyph {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        ' ' => [0; 7],
        other => {
            let mut h = (other as u32).wrapping_mul(0x9E37_79B9);
            let mut rows = [0u8; 7];
            for row in rows.iter_mut() {
                h ^= h >> 15;
                h = h.wrapping_mul(0x2C1B_3C6D);
                *row = (h >> 11) as u8 & 0x1F;
            }
            // a horizontal stroke keeps katakana-like shapes from looking empty
            rows[1] |= 0x1F;
            rows
        }
    }
}

impl Surface for Framebuffer {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    fn clear(&mut self) {
        self.pixels.fill([0.0; 4]);
    }

    fn fade(&mut self, color: Color) {
        let src = color.premultiplied();
        let keep = 1.0 - src[3];
        for dst in &mut self.pixels {
            for c in 0..4 {
                dst[c] = src[c] + dst[c] * keep;
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        if !(radius > 0.0) || paint.color.a <= 0.0 {
            return;
        }
        let src = paint.color.premultiplied();
        let glow = paint.glow.max(0.0);
        let reach = radius + glow + 1.0;
        // sub-pixel circles fade out instead of flickering
        let thin = (radius * 2.0).min(1.0);

        let Some((x0, x1)) = Self::span(center.x - reach, center.x + reach, self.width) else {
            return;
        };
        let Some((y0, y1)) = Self::span(center.y - reach, center.y + reach, self.height) else {
            return;
        };

        for py in y0..=y1 {
            for px in x0..=x1 {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let d = p.distance(center);
                let core = (radius + 0.5 - d).clamp(0.0, 1.0) * thin;
                let halo = if glow > 0.0 && d > radius - 0.5 {
                    let falloff = (1.0 - (d - radius) / glow).clamp(0.0, 1.0);
                    GLOW_STRENGTH * falloff * falloff
                } else {
                    0.0
                };
                self.blend(px, py, src, core.max(halo));
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, stroke: Stroke) {
        if !(width > 0.0) {
            return;
        }
        let half = width * 0.5;
        let thin = width.min(1.0);
        let pad = half.max(0.5) + 1.0;
        let d = to - from;
        let len = d.length();

        let Some((x0, x1)) = Self::span(from.x.min(to.x) - pad, from.x.max(to.x) + pad, self.width)
        else {
            return;
        };
        let Some((y0, y1)) = Self::span(from.y.min(to.y) - pad, from.y.max(to.y) + pad, self.height)
        else {
            return;
        };

        for py in y0..=y1 {
            let cy = py as f32 + 0.5;
            // the band of pixels near the line crosses this row in one span
            let (sx0, sx1) = if d.y.abs() > 1e-3 {
                let xc = from.x + (cy - from.y) * d.x / d.y;
                let reach = pad * len / d.y.abs();
                (xc - reach, xc + reach)
            } else {
                (x0 as f32, x1 as f32)
            };
            let start = x0.max(sx0.floor() as i64);
            let end = x1.min(sx1.ceil() as i64);
            for px in start..=end {
                let p = Vec2::new(px as f32 + 0.5, cy);
                let (dist, t) = segment_distance(p, from, to);
                let coverage = (half.max(0.5) + 0.5 - dist).clamp(0.0, 1.0) * thin;
                if coverage > 0.0 {
                    let src = stroke.color_at(t).premultiplied();
                    self.blend(px, py, src, coverage);
                }
            }
        }
    }

    fn fill_glyph(&mut self, glyph: char, origin: Vec2, size: f32, color: Color) {
        if !(size > 0.0) || color.a <= 0.0 {
            return;
        }
        let src = color.premultiplied();
        let rows = glyph_rows(glyph);
        let cell_h = size / 7.0;
        let cell_w = size * 0.6 / 5.0;
        let top = origin.y - size;

        for (r, bits) in rows.iter().enumerate() {
            for c in 0..5 {
                if bits & (0x10 >> c) == 0 {
                    continue;
                }
                let min = Vec2::new(origin.x + c as f32 * cell_w, top + r as f32 * cell_h);
                self.fill_rect(min, min + Vec2::new(cell_w, cell_h), src);
            }
        }
    }

    fn fill_radial(&mut self, center: Vec2, radius: f32, color: Color) {
        if !(radius > 0.0) || color.a <= 0.0 {
            return;
        }
        let src = color.premultiplied();
        let Some((x0, x1)) = Self::span(center.x - radius, center.x + radius, self.width) else {
            return;
        };
        let Some((y0, y1)) = Self::span(center.y - radius, center.y + radius, self.height) else {
            return;
        };
        let inv = 1.0 / radius;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let falloff = 1.0 - p.distance(center) * inv;
                if falloff > 0.0 {
                    self.blend(px, py, src, falloff);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_circle_covers_center() {
        let mut fb = Framebuffer::new(20, 20);
        fb.fill_circle(Vec2::new(10.0, 10.0), 3.0, Paint::solid(Color::CYAN));
        let c = fb.color_at(10, 10);
        assert!((c.a - 1.0).abs() < 1e-5);
        assert!(c.g > 0.99 && c.r < 0.01);
        assert_eq!(fb.pixel(0, 0), [0.0; 4]);
    }

    #[test]
    fn test_glow_extends_past_radius() {
        let mut plain = Framebuffer::new(40, 40);
        let mut glowing = Framebuffer::new(40, 40);
        let center = Vec2::new(20.0, 20.0);
        plain.fill_circle(center, 2.0, Paint::solid(Color::PINK));
        glowing.fill_circle(center, 2.0, Paint::glowing(Color::PINK, 8.0));
        assert_eq!(plain.pixel(26, 20)[3], 0.0);
        assert!(glowing.pixel(26, 20)[3] > 0.0);
    }

    #[test]
    fn test_fade_converges_to_fill() {
        let mut fb = Framebuffer::new(4, 4);
        fb.fill_circle(Vec2::new(2.0, 2.0), 4.0, Paint::solid(Color::WHITE));
        for _ in 0..300 {
            fb.fade(Color::rgba(0.0, 0.0, 0.0, 0.06));
        }
        let [r, g, b, a] = fb.pixel(2, 2);
        assert!(r < 1e-6 && g < 1e-6 && b < 1e-6);
        assert!(a > 0.999);
    }

    #[test]
    fn test_source_over_blending() {
        let mut fb = Framebuffer::new(1, 1);
        fb.fade(Color::rgba(1.0, 0.0, 0.0, 0.5));
        fb.fade(Color::rgba(0.0, 0.0, 1.0, 0.5));
        let [r, _, b, a] = fb.pixel(0, 0);
        assert!((r - 0.25).abs() < 1e-6);
        assert!((b - 0.5).abs() < 1e-6);
        assert!((a - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_gradient_line_endpoints() {
        let mut fb = Framebuffer::new(100, 10);
        let stroke = Stroke::Gradient {
            from: Color::CYAN,
            to: Color::PINK,
        };
        fb.stroke_line(Vec2::new(5.0, 5.0), Vec2::new(95.0, 5.0), 2.0, stroke);
        let start = fb.color_at(6, 4);
        let end = fb.color_at(94, 4);
        assert!(start.g > 0.9 && start.r < 0.1);
        assert!(end.r > 0.9 && end.g < 0.1);
        assert_eq!(fb.pixel(50, 0)[3], 0.0);
    }

    #[test]
    fn test_diagonal_line_is_continuous() {
        let mut fb = Framebuffer::new(64, 64);
        fb.stroke_line(
            Vec2::new(2.0, 3.0),
            Vec2::new(60.0, 50.0),
            1.0,
            Stroke::Solid(Color::WHITE),
        );
        for y in 4..49 {
            let row_has_ink = (0..64).any(|x| fb.pixel(x, y)[3] > 0.2);
            assert!(row_has_ink, "gap at row {}", y);
        }
    }

    #[test]
    fn test_radial_fades_outward() {
        let mut fb = Framebuffer::new(50, 50);
        fb.fill_radial(Vec2::new(25.0, 25.0), 20.0, Color::WHITE.with_alpha(0.6));
        let inner = fb.pixel(25, 25)[3];
        let outer = fb.pixel(25, 40)[3];
        assert!(inner > outer && outer > 0.0);
        assert!(inner <= 0.6 + 1e-6);
        assert_eq!(fb.pixel(25, 48)[3], 0.0);
    }

    #[test]
    fn test_glyph_drawn_above_baseline() {
        let mut fb = Framebuffer::new(30, 30);
        fb.fill_glyph('1', Vec2::new(5.0, 20.0), 14.0, Color::CYAN);
        let ink_above = (0..30).any(|x| (6..20).any(|y| fb.pixel(x, y)[3] > 0.0));
        let ink_below = (0..30).any(|x| (21..30).any(|y| fb.pixel(x, y)[3] > 0.0));
        assert!(ink_above);
        assert!(!ink_below);
    }

    #[test]
    fn test_offscreen_drawing_is_ignored() {
        let mut fb = Framebuffer::new(10, 10);
        fb.fill_circle(Vec2::new(-50.0, -50.0), 3.0, Paint::glowing(Color::WHITE, 8.0));
        fb.stroke_line(
            Vec2::new(-20.0, -5.0),
            Vec2::new(-1.0, -30.0),
            1.0,
            Stroke::Solid(Color::WHITE),
        );
        fb.fill_glyph('0', Vec2::new(100.0, 100.0), 14.0, Color::WHITE);
        fb.fill_circle(Vec2::new(f32::NAN, 1.0), 3.0, Paint::solid(Color::WHITE));
        assert!((0..10).all(|x| (0..10).all(|y| fb.pixel(x, y)[3] == 0.0)));
    }

    #[test]
    fn test_snapshot_bytes() {
        let mut fb = Framebuffer::new(2, 1);
        fb.fade(Color::rgba(0.0, 1.0, 1.0, 0.5));
        let bytes = fb.to_rgba8();
        assert_eq!(&bytes[..4], &[0, 255, 255, 128]);
        let mut upload = Vec::new();
        fb.premultiplied_rgba8(&mut upload);
        assert_eq!(&upload[..4], &[0, 128, 128, 128]);
        assert!(matches!(
            Framebuffer::new(0, 4).save_png("unused.png"),
            Err(SnapshotError::Empty)
        ));
    }
}
