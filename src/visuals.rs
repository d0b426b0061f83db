//! Colors, palettes and paint descriptions shared by every layer.
//!
//! Colors are straight (non-premultiplied) RGBA in `0.0..=1.0`. In config
//! files they are written as CSS-style hex strings (`"#00ffff"`,
//! `"#ff006e80"`).
//!
//! ```ignore
//! let cyan = Color::hex("#00ffff").unwrap();
//! let pink = Color::hsl(330.0, 1.0, 0.5);
//! let mid = cyan.lerp(pink, 0.5).with_alpha(0.25);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    /// `#00ffff`
    pub const CYAN: Color = Color::rgba(0.0, 1.0, 1.0, 1.0);
    /// `#ff006e`
    pub const PINK: Color = Color::rgba(1.0, 0.0, 110.0 / 255.0, 1.0);
    /// `#b967ff`
    pub const VIOLET: Color = Color::rgba(185.0 / 255.0, 103.0 / 255.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Color from 8-bit channels plus a float alpha, like CSS `rgba()`.
    pub fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a.clamp(0.0, 1.0),
        )
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. The leading `#` is optional.
    pub fn hex(s: &str) -> Option<Self> {
        let digits = s.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, c) in rgb.iter_mut().zip(digits.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Self::rgba8(rgb[0], rgb[1], rgb[2], 1.0))
            }
            6 => Some(Self::rgba8(channel(0)?, channel(2)?, channel(4)?, 1.0)),
            8 => Some(Self::rgba8(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)? as f32 / 255.0,
            )),
            _ => None,
        }
    }

    /// Opaque color from hue in degrees, saturation and lightness in `0..=1`.
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self::hsla(hue, saturation, lightness, 1.0)
    }

    pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        let h = hue.rem_euclid(360.0) / 60.0;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        Self::rgba(r + m, g + m, b + m, alpha.clamp(0.0, 1.0))
    }

    /// Same color with a replaced alpha, clamped to `0..=1`.
    #[inline]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Multiply alpha, like drawing under a canvas `globalAlpha`.
    #[inline]
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }

    /// Linear interpolation of all four channels.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Premultiplied channels, the form the rasterizer blends in.
    #[inline]
    pub fn premultiplied(self) -> [f32; 4] {
        let a = self.a.clamp(0.0, 1.0);
        [self.r * a, self.g * a, self.b * a, a]
    }

    /// CSS `rgba()` string for canvas fill and stroke styles.
    pub fn to_css(self) -> String {
        let [r, g, b] = self.channels8();
        format!("rgba({}, {}, {}, {:.3})", r, g, b, self.a.clamp(0.0, 1.0))
    }

    /// Hex form, `#rrggbb` when opaque and `#rrggbbaa` otherwise.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.channels8();
        let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }

    fn channels8(self) -> [u8; 3] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::hex(&value).ok_or_else(|| format!("invalid color '{}', expected #rrggbb[aa]", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// A set of colors that particles draw from uniformly at spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<Color>);

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self(colors)
    }

    /// Cyan, pink and violet: the particle field colors.
    pub fn neon() -> Self {
        Self(vec![Color::CYAN, Color::PINK, Color::VIOLET])
    }

    /// `hsl(180,100%,50%)` and `hsl(330,100%,50%)`: the cursor trail colors.
    pub fn trail() -> Self {
        Self(vec![Color::hsl(180.0, 1.0, 0.5), Color::hsl(330.0, 1.0, 0.5)])
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    /// Uniform pick. An empty palette yields white.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        if self.0.is_empty() {
            return Color::WHITE;
        }
        self.0[rng.gen_range(0..self.0.len())]
    }
}

/// Fill description for circles: color plus an optional glow halo.
///
/// `glow` mirrors a canvas `shadowBlur` in pixels; zero disables it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub glow: f32,
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Self { color, glow: 0.0 }
    }

    pub fn glowing(color: Color, glow: f32) -> Self {
        Self {
            color,
            glow: glow.max(0.0),
        }
    }
}

/// Line stroke style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stroke {
    Solid(Color),
    /// Two-stop linear gradient running from the line start to its end.
    Gradient { from: Color, to: Color },
}

impl Stroke {
    /// Color at parameter `t` along the line.
    pub fn color_at(&self, t: f32) -> Color {
        match *self {
            Stroke::Solid(c) => c,
            Stroke::Gradient { from, to } => from.lerp(to, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-3
            && (a.g - b.g).abs() < 1e-3
            && (a.b - b.b).abs() < 1e-3
            && (a.a - b.a).abs() < 1e-3
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::hex("#00ffff"), Some(Color::CYAN));
        assert!(close(Color::hex("ff006e").unwrap(), Color::PINK));
        assert!(close(Color::hex("#fff").unwrap(), Color::WHITE));
        let half = Color::hex("#00000080").unwrap();
        assert!((half.a - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(Color::hex("#12345"), None);
        assert_eq!(Color::hex("#gggggg"), None);
        assert_eq!(Color::hex("#ääää"), None);
    }

    #[test]
    fn test_hsl_matches_trail_colors() {
        assert!(close(Color::hsl(180.0, 1.0, 0.5), Color::CYAN));
        assert!(close(
            Color::hsl(330.0, 1.0, 0.5),
            Color::rgba(1.0, 0.0, 0.5, 1.0)
        ));
        let dim = Color::hsla(270.0, 0.6, 0.15, 0.6);
        assert!((dim.a - 0.6).abs() < 1e-6);
        assert!(dim.b > dim.r && dim.r > dim.g);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::PINK).unwrap();
        assert_eq!(json, "\"#ff006e\"");
        let back: Color = serde_json::from_str("\"#b967ff\"").unwrap();
        assert!(close(back, Color::VIOLET));
        assert!(serde_json::from_str::<Color>("\"cyan\"").is_err());
    }

    #[test]
    fn test_lerp_and_alpha() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert_eq!(Color::CYAN.with_alpha(2.0).a, 1.0);
        assert_eq!(Color::CYAN.with_alpha(-1.0).a, 0.0);
        assert!((Color::CYAN.with_alpha(0.5).fade(0.5).a - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_css_output() {
        assert_eq!(
            Color::rgba8(0, 255, 255, 0.08).to_css(),
            "rgba(0, 255, 255, 0.080)"
        );
    }

    #[test]
    fn test_palette_pick_stays_in_palette() {
        let palette = Palette::neon();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            assert!(palette.colors().contains(&palette.pick(&mut rng)));
        }
        assert_eq!(Palette::new(vec![]).pick(&mut rng), Color::WHITE);
    }
}
