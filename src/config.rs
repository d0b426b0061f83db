//! Tunable parameters for every effect layer.
//!
//! All groups are serde structs with full defaults, so a JSON file only
//! needs the values it changes:
//!
//! ```json
//! { "particles": { "count": 30 }, "rain": { "every": 2 } }
//! ```

use crate::error::ConfigError;
use crate::field::MAX_PARTICLES;
use crate::input::Hotspot;
use crate::surface::Viewport;
use crate::visuals::{Color, Palette};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete effects configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    pub particles: ParticleConfig,
    pub network: NetworkConfig,
    pub rain: RainConfig,
    pub background: BackgroundConfig,
    pub trail: TrailConfig,
    pub parallax: ParallaxConfig,
    pub viewer: ViewerConfig,
}

impl EffectsConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of field particles for `viewport`.
    ///
    /// Narrow viewports get the reduced count; a viewport under one pixel on
    /// either side gets none. Never exceeds [`MAX_PARTICLES`].
    pub fn particle_count_for(&self, viewport: Viewport) -> usize {
        let p = &self.particles;
        let viewport = viewport.sanitized();
        if viewport.is_degenerate() {
            return 0;
        }
        let count = if viewport.width < p.narrow_width {
            p.narrow_count
        } else {
            p.count
        };
        count.min(MAX_PARTICLES)
    }
}

/// Ambient particle field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Count used below `narrow_width`.
    pub narrow_count: usize,
    pub narrow_width: f32,
    pub palette: Palette,
    /// Initial velocity per axis is uniform in `[-speed/2, speed/2)`.
    pub speed: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub alpha_min: f32,
    pub alpha_max: f32,
    pub attraction_radius: f32,
    pub attraction_strength: f32,
    pub damping: f32,
    /// Pair distance below which a connection line is drawn.
    pub link_distance: f32,
    pub link_opacity: f32,
    pub link_width: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 50,
            narrow_count: 25,
            narrow_width: 768.0,
            palette: Palette::neon(),
            speed: 0.4,
            size_min: 0.5,
            size_max: 2.5,
            alpha_min: 0.1,
            alpha_max: 0.5,
            attraction_radius: 180.0,
            attraction_strength: 0.015,
            damping: 0.99,
            link_distance: 100.0,
            link_opacity: 0.15,
            link_width: 0.5,
        }
    }
}

/// A neural node anchor in fractional viewport coordinates.
///
/// `y` may exceed 1.0: those nodes sit below the first screen and only light
/// up once the page is scrolled down to them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeAnchor {
    pub x: f32,
    pub y: f32,
    /// Depth weight; scales node radius and alpha.
    pub layer: f32,
}

impl NodeAnchor {
    pub const fn new(x: f32, y: f32, layer: f32) -> Self {
        Self { x, y, layer }
    }
}

/// Scroll-driven neural node graph.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub nodes: Vec<NodeAnchor>,
    /// Link threshold as a fraction of viewport width.
    pub link_reach: f32,
    pub active_link_opacity: f32,
    pub idle_link_opacity: f32,
    pub active_link_width: f32,
    pub idle_link_width: f32,
    pub link_from: Color,
    pub link_to: Color,
    pub packet_period_ms: f64,
    pub packet_radius: f32,
    pub packet_alpha: f32,
    pub packet_glow: f32,
    pub packet_color: Color,
    pub idle_node_color: Color,
    pub active_node_color: Color,
    pub idle_node_radius: f32,
    pub active_node_radius: f32,
    pub idle_glow: f32,
    pub active_glow: f32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            nodes: vec![
                NodeAnchor::new(0.15, 0.15, 0.8),
                NodeAnchor::new(0.85, 0.3, 0.6),
                NodeAnchor::new(0.5, 0.45, 1.0),
                NodeAnchor::new(0.25, 0.65, 0.7),
                NodeAnchor::new(0.75, 0.8, 0.5),
                NodeAnchor::new(0.4, 1.0, 0.9),
                NodeAnchor::new(0.6, 1.2, 0.6),
            ],
            link_reach: 0.6,
            active_link_opacity: 0.25,
            idle_link_opacity: 0.06,
            active_link_width: 1.5,
            idle_link_width: 0.5,
            link_from: Color::CYAN,
            link_to: Color::PINK,
            packet_period_ms: 3000.0,
            packet_radius: 2.0,
            packet_alpha: 0.6,
            packet_glow: 12.0,
            packet_color: Color::CYAN,
            idle_node_color: Color::CYAN,
            active_node_color: Color::PINK,
            idle_node_radius: 3.0,
            active_node_radius: 5.0,
            idle_glow: 8.0,
            active_glow: 15.0,
        }
    }
}

/// Falling glyph rain.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RainConfig {
    /// Column width and row height in pixels.
    pub cell: f32,
    pub glyphs: String,
    /// Advance only on frames divisible by this.
    pub every: u64,
    /// Per-step advance while a drop is still above the top edge.
    pub entry_speed: f32,
    pub fall_speed: f32,
    /// Initial offsets are uniform in `(-initial_depth, 0]` rows.
    pub initial_depth: f32,
    /// Reset offsets are uniform in `(-reset_depth, 0]` rows.
    pub reset_depth: f32,
    /// Per-step probability of resetting once past the bottom edge.
    pub reset_chance: f32,
    /// Rows past the bottom edge after which a drop always resets.
    pub force_reset_rows: f32,
    /// Columns with `index % primary_every == 0` use `primary`.
    pub primary_every: usize,
    pub primary: Color,
    pub secondary: Color,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            cell: 14.0,
            glyphs: "01アイウエオカキクケコ".into(),
            every: 3,
            entry_speed: 0.5,
            fall_speed: 0.3,
            initial_depth: 100.0,
            reset_depth: 20.0,
            reset_chance: 0.02,
            force_reset_rows: 60.0,
            primary_every: 3,
            primary: Color::rgba8(0, 255, 255, 0.08),
            secondary: Color::rgba8(255, 0, 110, 0.05),
        }
    }
}

/// Background layer compositing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Painted over the layer every frame; alpha sets the afterimage length.
    pub fade: Color,
    /// Opacity the layer is composited at.
    pub opacity: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            fade: Color::rgba(0.0, 0.0, 0.0, 0.06),
            opacity: 0.7,
        }
    }
}

/// Cursor trail and cursor ring.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrailConfig {
    /// Spawn on every n-th pointer move.
    pub spawn_every: u64,
    /// Spawn offset per axis is uniform in `[-jitter/2, jitter/2)`.
    pub jitter: f32,
    pub size_min: f32,
    pub size_max: f32,
    /// Velocity per axis is uniform in `[-speed/2, speed/2)`.
    pub speed: f32,
    pub palette: Palette,
    pub cap: usize,
    /// Life lost per tick.
    pub decrement: f32,
    /// Size multiplier per tick.
    pub shrink: f32,
    pub alpha_scale: f32,
    pub glow: f32,
    pub dot_radius: f32,
    pub dot_color: Color,
    pub hover_radius: f32,
    pub hover_color: Color,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            spawn_every: 3,
            jitter: 8.0,
            size_min: 0.5,
            size_max: 3.0,
            speed: 1.5,
            palette: Palette::trail(),
            cap: 25,
            decrement: 0.03,
            shrink: 0.97,
            alpha_scale: 0.5,
            glow: 8.0,
            dot_radius: 4.0,
            dot_color: Color::CYAN,
            hover_radius: 16.0,
            hover_color: Color::PINK,
        }
    }
}

impl TrailConfig {
    /// Decrement floored to a small positive value so particles always expire.
    pub fn effective_decrement(&self) -> f32 {
        if self.decrement.is_finite() {
            self.decrement.max(1e-3)
        } else {
            1.0
        }
    }
}

/// One radial-gradient depth layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DepthLayerConfig {
    /// Gradient center in fractional viewport coordinates.
    pub center: Vec2,
    /// Radius as a fraction of the distance to the farthest corner.
    pub radius: f32,
    pub color: Color,
    pub scroll_factor: f32,
    pub drift_period_s: f32,
    /// Drift distance in pixels.
    pub drift_amplitude: f32,
}

/// Scroll-parallax depth layers, back to front.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParallaxConfig {
    pub layers: Vec<DepthLayerConfig>,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            layers: vec![
                DepthLayerConfig {
                    center: Vec2::new(0.2, 0.8),
                    radius: 0.5,
                    color: Color::hsla(270.0, 0.6, 0.15, 0.6),
                    scroll_factor: 0.03,
                    drift_period_s: 40.0,
                    drift_amplitude: 30.0,
                },
                DepthLayerConfig {
                    center: Vec2::new(0.8, 0.2),
                    radius: 0.5,
                    color: Color::hsla(210.0, 0.6, 0.15, 0.5),
                    scroll_factor: 0.06,
                    drift_period_s: 25.0,
                    drift_amplitude: 20.0,
                },
                DepthLayerConfig {
                    center: Vec2::new(0.5, 0.5),
                    radius: 0.6,
                    color: Color::hsla(280.0, 0.5, 0.12, 0.3),
                    scroll_factor: 0.10,
                    drift_period_s: 15.0,
                    drift_amplitude: 10.0,
                },
            ],
        }
    }
}

/// Native viewer window and virtual page.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Virtual page height in pixels; the wheel scrolls within it.
    pub page_height: f32,
    /// Pixels scrolled per wheel line.
    pub scroll_line: f32,
    pub clear_color: Color,
    /// Rectangles treated as interactive for the hover ring.
    pub hotspots: Vec<Hotspot>,
    /// Directory for PNG snapshots.
    pub snapshot_dir: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "backdrop".into(),
            width: 1280,
            height: 720,
            page_height: 3600.0,
            scroll_line: 48.0,
            clear_color: Color::rgba8(5, 5, 12, 1.0),
            hotspots: vec![
                Hotspot::new(40.0, 24.0, 160.0, 40.0),
                Hotspot::new(540.0, 420.0, 200.0, 56.0),
            ],
            snapshot_dir: ".".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = EffectsConfig::default();
        assert_eq!(config.particles.count, 50);
        assert_eq!(config.particles.narrow_count, 25);
        assert_eq!(config.network.nodes.len(), 7);
        assert_eq!(config.rain.glyphs.chars().count(), 12);
        assert_eq!(config.trail.cap, 25);
        assert_eq!(config.parallax.layers.len(), 3);
    }

    #[test]
    fn test_particle_count_for_viewport() {
        let config = EffectsConfig::default();
        let count = |w, h| config.particle_count_for(Viewport::new(w, h));
        assert_eq!(count(1024.0, 768.0), 50);
        assert_eq!(count(768.0, 600.0), 50);
        assert_eq!(count(767.0, 600.0), 25);
        assert_eq!(count(0.0, 600.0), 0);
        assert_eq!(count(800.0, 0.0), 0);
        assert_eq!(count(800.0, 0.5), 0);
        assert_eq!(count(f32::NAN, 600.0), 0);
    }

    #[test]
    fn test_count_clamped_to_max() {
        let mut config = EffectsConfig::default();
        config.particles.count = 5000;
        assert_eq!(config.particle_count_for(Viewport::new(1920.0, 1080.0)), MAX_PARTICLES);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r##"{ "particles": { "count": 30 }, "trail": { "dot_color": "#ffffff" } }"##;
        let config = EffectsConfig::from_json(json).unwrap();
        assert_eq!(config.particles.count, 30);
        assert_eq!(config.particles.damping, 0.99);
        assert_eq!(config.trail.dot_color, Color::WHITE);
        assert_eq!(config.rain, RainConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = EffectsConfig::default();
        config.rain.every = 2;
        config.viewer.hotspots.clear();
        let json = config.to_json().unwrap();
        let back = EffectsConfig::from_json(&json).unwrap();
        assert_eq!(back.rain.every, 2);
        assert!(back.viewer.hotspots.is_empty());
        assert_eq!(back.network, config.network);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = EffectsConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_effective_decrement_floor() {
        let mut trail = TrailConfig::default();
        trail.decrement = 0.0;
        assert_eq!(trail.effective_decrement(), 1e-3);
        trail.decrement = f32::NAN;
        assert_eq!(trail.effective_decrement(), 1.0);
    }
}
