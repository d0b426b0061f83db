//! Cursor trail and cursor ring.
//!
//! Every few pointer moves a small glowing spark is dropped near the cursor.
//! Sparks drift, shrink and fade, and are removed once their life runs out.
//! Life is derived from an integer age, so a spark lives for exactly
//! `ceil(1 / decrement)` ticks regardless of float rounding.

use crate::config::TrailConfig;
use crate::spawn::SpawnRng;
use crate::surface::Surface;
use crate::visuals::{Color, Paint};
use glam::Vec2;
use rand::Rng;
use std::collections::VecDeque;

/// Ticks a spark survives for a given per-tick life decrement.
pub fn ticks_to_expire(decrement: f32) -> u32 {
    if !(decrement > 0.0) {
        return u32::MAX;
    }
    (1.0 / f64::from(decrement)).ceil().min(u32::MAX as f64) as u32
}

/// A single trail spark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub color: Color,
    age: u32,
    decrement: f32,
}

impl TrailParticle {
    /// Remaining life in `[0, 1]`.
    #[inline]
    pub fn life(&self) -> f32 {
        (1.0 - self.age as f32 * self.decrement).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }
}

#[derive(Debug, Clone)]
pub struct CursorTrail {
    particles: VecDeque<TrailParticle>,
    moves: u64,
    cursor: Option<Vec2>,
    lifetime: u32,
    config: TrailConfig,
}

impl CursorTrail {
    pub fn new(config: TrailConfig) -> Self {
        Self {
            particles: VecDeque::with_capacity(config.cap),
            moves: 0,
            cursor: None,
            lifetime: ticks_to_expire(config.effective_decrement()),
            config,
        }
    }

    /// Track the cursor and drop a spark on every `spawn_every`-th move.
    ///
    /// Returns whether a spark was spawned. Only the newest `cap` sparks are
    /// kept.
    pub fn on_pointer_move<R: Rng + ?Sized>(&mut self, position: Vec2, rng: &mut R) -> bool {
        self.cursor = Some(position);
        self.moves += 1;
        if self.moves % self.config.spawn_every.max(1) != 0 {
            return false;
        }

        let c = &self.config;
        self.particles.push_back(TrailParticle {
            position: position + rng.jitter(c.jitter),
            velocity: rng.jitter(c.speed),
            size: rng.uniform(c.size_min, c.size_max),
            color: c.palette.pick(rng),
            age: 0,
            decrement: c.effective_decrement(),
        });
        while self.particles.len() > c.cap {
            self.particles.pop_front();
        }
        true
    }

    /// Move, shrink and age every spark, dropping the expired ones.
    pub fn step(&mut self) {
        let shrink = self.config.shrink;
        let lifetime = self.lifetime;
        for p in &mut self.particles {
            p.position += p.velocity;
            p.size *= shrink;
            p.age = p.age.saturating_add(1);
        }
        self.particles.retain(|p| p.age < lifetime);
    }

    /// Clear, then draw each spark with alpha `alpha_scale × life`.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        let c = &self.config;
        for p in &self.particles {
            let alpha = c.alpha_scale * p.life();
            surface.fill_circle(
                p.position,
                p.size.max(0.0),
                Paint::glowing(p.color.with_alpha(alpha), c.glow),
            );
        }
    }

    pub fn particles(&self) -> impl ExactSizeIterator<Item = &TrailParticle> + '_ {
        self.particles.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Ticks a freshly spawned spark lives for.
    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }
}

/// The custom cursor: a small dot that turns into a wider ring over
/// interactive elements. Hidden until the first pointer move.
#[derive(Debug, Clone, Default)]
pub struct CursorRing {
    position: Option<Vec2>,
    hovering: bool,
}

impl CursorRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, position: Vec2, hovering: bool) {
        self.position = Some(position);
        self.hovering = hovering;
    }

    pub fn is_visible(&self) -> bool {
        self.position.is_some()
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Draw on top of the trail layer; does not clear.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, config: &TrailConfig) {
        let Some(position) = self.position else {
            return;
        };
        if self.hovering {
            // a soft disc with a brighter rim reads as a ring at this size
            surface.fill_circle(
                position,
                config.hover_radius,
                Paint::glowing(config.hover_color.with_alpha(0.12), 10.0),
            );
            surface.fill_circle(
                position,
                config.hover_radius * 0.25,
                Paint::solid(config.hover_color.with_alpha(0.8)),
            );
        } else {
            surface.fill_circle(
                position,
                config.dot_radius,
                Paint::glowing(config.dot_color.with_alpha(0.9), 10.0),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, Recorder};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn moved(trail: &mut CursorTrail, rng: &mut SmallRng, n: usize) {
        for i in 0..n {
            trail.on_pointer_move(Vec2::new(100.0 + i as f32, 100.0), rng);
        }
    }

    #[test]
    fn test_spawn_every_third_move() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut trail = CursorTrail::new(TrailConfig::default());
        assert!(!trail.on_pointer_move(Vec2::ZERO, &mut rng));
        assert!(!trail.on_pointer_move(Vec2::ZERO, &mut rng));
        assert!(trail.on_pointer_move(Vec2::new(50.0, 60.0), &mut rng));
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.cursor(), Some(Vec2::new(50.0, 60.0)));

        let spark = trail.particles().next().unwrap();
        assert!((spark.position - Vec2::new(50.0, 60.0)).abs().max_element() <= 4.0);
        assert!(spark.velocity.abs().max_element() <= 0.75);
        assert!(spark.size >= 0.5 && spark.size < 3.0);
        assert_eq!(spark.life(), 1.0);
    }

    #[test]
    fn test_cap_keeps_newest() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut trail = CursorTrail::new(TrailConfig::default());
        for i in 0..300 {
            trail.on_pointer_move(Vec2::new(i as f32, 0.0), &mut rng);
            assert!(trail.len() <= 25);
        }
        assert_eq!(trail.len(), 25);
        // the last spark came from the 300th move, at x = 299 ± 4
        let newest = trail.particles().last().unwrap();
        assert!((newest.position.x - 299.0).abs() <= 4.0);
        let oldest = trail.particles().next().unwrap();
        assert!(oldest.position.x > 299.0 - 3.0 * 25.0 - 4.0);
    }

    #[test]
    fn test_expiry_tick_count() {
        assert_eq!(ticks_to_expire(0.03), 34);
        assert_eq!(ticks_to_expire(0.25), 4);
        assert_eq!(ticks_to_expire(1.0), 1);
        assert_eq!(ticks_to_expire(0.0), u32::MAX);

        for decrement in [0.03_f32, 0.1, 0.2, 0.3, 0.5, 0.07] {
            let config = TrailConfig {
                decrement,
                spawn_every: 1,
                ..TrailConfig::default()
            };
            let mut rng = SmallRng::seed_from_u64(3);
            let mut trail = CursorTrail::new(config);
            trail.on_pointer_move(Vec2::ZERO, &mut rng);

            let expected = (1.0 / f64::from(decrement)).ceil() as u32;
            for _ in 0..expected - 1 {
                trail.step();
            }
            assert_eq!(trail.len(), 1, "decrement {}", decrement);
            trail.step();
            assert!(trail.is_empty(), "decrement {}", decrement);
        }
    }

    #[test]
    fn test_life_and_size_decay() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut trail = CursorTrail::new(TrailConfig::default());
        moved(&mut trail, &mut rng, 3);
        let size0 = trail.particles().next().unwrap().size;
        trail.step();
        let p = trail.particles().next().unwrap();
        assert!((p.life() - 0.97).abs() < 1e-6);
        assert!((p.size - size0 * 0.97).abs() < 1e-6);
        assert_eq!(p.age(), 1);
    }

    #[test]
    fn test_render_clears_then_draws() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut trail = CursorTrail::new(TrailConfig::default());
        moved(&mut trail, &mut rng, 6);
        let mut rec = Recorder::new(200.0, 200.0);
        trail.render(&mut rec);
        assert_eq!(rec.commands()[0], DrawCommand::Clear);
        let circles: Vec<_> = rec.circles().collect();
        assert_eq!(circles.len(), 2);
        for (_, _, paint) in circles {
            assert!((paint.color.a - 0.5).abs() < 1e-6);
            assert_eq!(paint.glow, 8.0);
        }
    }

    #[test]
    fn test_ring_hidden_until_first_move() {
        let config = TrailConfig::default();
        let mut ring = CursorRing::new();
        let mut rec = Recorder::new(100.0, 100.0);
        ring.render(&mut rec, &config);
        assert!(rec.commands().is_empty());

        ring.update(Vec2::new(10.0, 10.0), false);
        ring.render(&mut rec, &config);
        let (_, radius, _) = rec.circles().next().unwrap();
        assert_eq!(radius, 4.0);

        rec.take();
        ring.update(Vec2::new(10.0, 10.0), true);
        ring.render(&mut rec, &config);
        let (_, radius, paint) = rec.circles().next().unwrap();
        assert_eq!(radius, 16.0);
        assert_eq!(paint.color.r, 1.0);
    }
}
