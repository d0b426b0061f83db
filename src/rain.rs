//! Throttled falling-glyph rain.
//!
//! The viewport is split into columns one cell wide. Each column has a drop
//! offset measured in rows; negative offsets are still above the top edge.
//! Every `every`-th frame each visible drop emits one random glyph and moves
//! down. Past the bottom edge a drop resets with a small per-step chance, and
//! unconditionally once it is `force_reset_rows` rows below the edge, so
//! offsets stay bounded.

use crate::config::RainConfig;
use crate::spawn::SpawnRng;
use crate::surface::{Surface, Viewport};
use crate::visuals::Color;
use glam::Vec2;
use rand::Rng;

/// A glyph emitted by one rain step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainGlyph {
    pub column: usize,
    pub glyph: char,
    /// Left end of the text baseline.
    pub position: Vec2,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct RainOverlay {
    drops: Vec<f32>,
    glyphs: Vec<char>,
    cell: f32,
    viewport: Viewport,
    emitted: Vec<RainGlyph>,
    config: RainConfig,
}

impl RainOverlay {
    pub fn new(config: RainConfig) -> Self {
        let mut glyphs: Vec<char> = config.glyphs.chars().collect();
        if glyphs.is_empty() {
            glyphs = vec!['0', '1'];
        }
        Self {
            drops: Vec::new(),
            glyphs,
            cell: config.cell.max(1.0),
            viewport: Viewport::new(0.0, 0.0),
            emitted: Vec::new(),
            config,
        }
    }

    /// Size columns to the viewport and scatter the drops above the top edge.
    ///
    /// There is always at least one column, even for a degenerate viewport.
    pub fn reseed<R: Rng + ?Sized>(&mut self, viewport: Viewport, rng: &mut R) {
        self.viewport = viewport.sanitized();
        let columns = ((self.viewport.width / self.cell).floor() as usize).max(1);
        let depth = self.config.initial_depth;
        self.drops = (0..columns).map(|_| -rng.unit() * depth).collect();
        self.emitted.clear();
    }

    /// Advance the drops if `frame` is on the throttle beat.
    ///
    /// Returns whether the step ran. Glyphs emitted by the step are kept for
    /// [`render`](Self::render); a skipped frame emits nothing.
    pub fn step<R: Rng + ?Sized>(&mut self, frame: u64, rng: &mut R) -> bool {
        self.emitted.clear();
        let every = self.config.every.max(1);
        if frame % every != 0 {
            return false;
        }

        let c = &self.config;
        let cell = self.cell;
        let height = self.viewport.height;
        let bottom = height + c.force_reset_rows.max(0.0) * cell;
        let primary_every = c.primary_every.max(1);

        for (column, drop) in self.drops.iter_mut().enumerate() {
            if *drop < 0.0 {
                *drop += c.entry_speed;
                continue;
            }

            let glyph = self.glyphs[rng.gen_range(0..self.glyphs.len())];
            let y = *drop * cell;
            self.emitted.push(RainGlyph {
                column,
                glyph,
                position: Vec2::new(column as f32 * cell, y),
                color: if column % primary_every == 0 {
                    c.primary
                } else {
                    c.secondary
                },
            });

            if y > height && (rng.chance(c.reset_chance) || y > bottom) {
                *drop = -rng.unit() * c.reset_depth;
            }
            *drop += c.fall_speed;
        }
        true
    }

    /// Draw the glyphs emitted by the last step.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        for g in &self.emitted {
            surface.fill_glyph(g.glyph, g.position, self.cell, g.color);
        }
    }

    pub fn drops(&self) -> &[f32] {
        &self.drops
    }

    pub fn columns(&self) -> usize {
        self.drops.len()
    }

    pub fn emitted(&self) -> &[RainGlyph] {
        &self.emitted
    }

    pub fn cell(&self) -> f32 {
        self.cell
    }

    /// Largest offset, in rows, a drop can reach before it is forced back up.
    pub fn max_offset(&self) -> f32 {
        self.viewport.height / self.cell
            + self.config.force_reset_rows.max(0.0)
            + self.config.fall_speed.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn overlay(config: RainConfig, w: f32, h: f32, seed: u64) -> (RainOverlay, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut rain = RainOverlay::new(config);
        rain.reseed(Viewport::new(w, h), &mut rng);
        (rain, rng)
    }

    #[test]
    fn test_reseed_columns_and_offsets() {
        let (rain, _) = overlay(RainConfig::default(), 800.0, 600.0, 1);
        assert_eq!(rain.columns(), 57);
        for &d in rain.drops() {
            assert!(d <= 0.0 && d > -100.0);
        }
    }

    #[test]
    fn test_degenerate_viewport_keeps_one_column() {
        let (mut rain, mut rng) = overlay(RainConfig::default(), 0.0, 0.0, 1);
        assert_eq!(rain.columns(), 1);
        for frame in 1..300 {
            rain.step(frame, &mut rng);
        }
        assert!(rain.drops()[0].is_finite());
    }

    #[test]
    fn test_throttle() {
        let (mut rain, mut rng) = overlay(RainConfig::default(), 140.0, 100.0, 2);
        let before = rain.drops().to_vec();
        assert!(!rain.step(1, &mut rng));
        assert!(!rain.step(2, &mut rng));
        assert_eq!(rain.drops(), &before[..]);
        assert!(rain.step(3, &mut rng));
        assert_ne!(rain.drops(), &before[..]);
    }

    #[test]
    fn test_entry_and_fall_speeds() {
        let (mut rain, mut rng) = overlay(RainConfig::default(), 28.0, 600.0, 3);
        rain.drops = vec![-0.2, 2.0];
        rain.step(3, &mut rng);
        assert!((rain.drops()[0] - 0.3).abs() < 1e-6);
        assert!((rain.drops()[1] - 2.3).abs() < 1e-6);

        let emitted = rain.emitted();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].column, 1);
        assert_eq!(emitted[0].position, Vec2::new(14.0, 28.0));
        assert_eq!(emitted[0].color, RainConfig::default().secondary);
        assert!(RainConfig::default().glyphs.contains(emitted[0].glyph));
    }

    #[test]
    fn test_column_colors_alternate() {
        let (mut rain, mut rng) = overlay(RainConfig::default(), 14.0 * 6.0, 600.0, 4);
        rain.drops = vec![1.0; 6];
        rain.step(3, &mut rng);
        let config = RainConfig::default();
        for g in rain.emitted() {
            let expected = if g.column % 3 == 0 {
                config.primary
            } else {
                config.secondary
            };
            assert_eq!(g.color, expected);
        }
        assert_eq!(rain.emitted().len(), 6);
    }

    #[test]
    fn test_offsets_stay_bounded() {
        let (mut rain, mut rng) = overlay(RainConfig::default(), 420.0, 300.0, 5);
        let limit = rain.max_offset();
        for frame in 1..=30_000 {
            rain.step(frame, &mut rng);
            for &d in rain.drops() {
                assert!(d <= limit, "drop {} exceeded {}", d, limit);
            }
        }
    }

    #[test]
    fn test_probabilistic_reset_happens() {
        let config = RainConfig {
            force_reset_rows: 1e6,
            ..RainConfig::default()
        };
        let (mut rain, mut rng) = overlay(config, 14.0, 140.0, 6);
        // start just past the bottom edge
        rain.drops = vec![11.0];
        let mut reset = false;
        for frame in 1..=6000 {
            rain.step(frame * 3, &mut rng);
            if rain.drops()[0] < 11.0 {
                reset = true;
                break;
            }
        }
        assert!(reset);
    }

    #[test]
    fn test_skipped_frame_renders_nothing() {
        let (mut rain, mut rng) = overlay(RainConfig::default(), 140.0, 600.0, 7);
        rain.drops = vec![1.0; 10];
        rain.step(3, &mut rng);
        assert_eq!(rain.emitted().len(), 10);
        rain.step(4, &mut rng);
        let mut rec = crate::surface::Recorder::new(140.0, 600.0);
        rain.render(&mut rec);
        assert!(rec.commands().is_empty());
    }
}
