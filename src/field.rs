//! The ambient particle field.
//!
//! A fixed set of small particles drifts across the background, wrapping at
//! the viewport edges. Particles within the attraction radius of the cursor
//! are gently pulled toward it, and any pair closer than the link distance is
//! joined by a faint line whose opacity falls off with distance.
//!
//! Each particle also carries a `depth` in `[0, 1)`: far particles render
//! smaller and dimmer than near ones.
//!
//! ```ignore
//! let mut field = ParticleField::new(config.particles.clone());
//! let viewport = Viewport::new(800.0, 600.0);
//! field.seed(config.particle_count_for(viewport), viewport, &mut rng);
//!
//! field.step(Some(cursor));
//! field.render(&mut surface);
//! ```

use crate::config::ParticleConfig;
use crate::spawn::SpawnRng;
use crate::surface::{Surface, Viewport};
use crate::visuals::{Color, Paint, Stroke};
use glam::Vec2;
use rand::Rng;

/// Upper bound on field particles; pair linking is O(n²).
pub const MAX_PARTICLES: usize = 50;

/// One drifting background particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Base radius before depth scaling.
    pub size: f32,
    /// Base alpha before depth scaling.
    pub alpha: f32,
    pub color: Color,
    pub depth: f32,
}

impl Particle {
    /// Radius after depth scaling: `size × (0.5 + 0.5·depth)`.
    #[inline]
    pub fn rendered_size(&self) -> f32 {
        (self.size * (0.5 + 0.5 * self.depth)).max(0.0)
    }

    /// Alpha after depth scaling: `alpha × (0.3 + 0.7·depth)`.
    #[inline]
    pub fn rendered_alpha(&self) -> f32 {
        (self.alpha * (0.3 + 0.7 * self.depth)).clamp(0.0, 1.0)
    }
}

/// Opacity of a link between two particles `distance` apart.
///
/// Falls linearly from `max_opacity` at zero distance to exactly zero at
/// `threshold` and beyond.
pub fn connection_opacity(distance: f32, threshold: f32, max_opacity: f32) -> f32 {
    if !(threshold > 0.0) || !(distance < threshold) {
        return 0.0;
    }
    ((1.0 - distance.max(0.0) / threshold) * max_opacity).max(0.0)
}

/// A pair of particles close enough to be linked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub opacity: f32,
}

/// The set of background particles plus the parameters that move them.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    viewport: Viewport,
    config: ParticleConfig,
}

impl ParticleField {
    /// An empty field; call [`seed`](Self::seed) once the viewport is known.
    pub fn new(config: ParticleConfig) -> Self {
        Self {
            particles: Vec::new(),
            viewport: Viewport::new(0.0, 0.0),
            config,
        }
    }

    /// A field with explicit particles, wrapped into `viewport`.
    ///
    /// Anything past [`MAX_PARTICLES`] is dropped.
    pub fn from_particles(
        config: ParticleConfig,
        viewport: Viewport,
        mut particles: Vec<Particle>,
    ) -> Self {
        let viewport = viewport.sanitized();
        particles.truncate(MAX_PARTICLES);
        for p in &mut particles {
            p.position = viewport.wrap(p.position);
        }
        Self {
            particles,
            viewport,
            config,
        }
    }

    /// Replace the set with `count` randomized particles.
    ///
    /// A degenerate viewport yields an empty field.
    pub fn seed<R: Rng + ?Sized>(&mut self, count: usize, viewport: Viewport, rng: &mut R) {
        self.viewport = viewport.sanitized();
        let count = if self.viewport.is_degenerate() {
            0
        } else {
            count.min(MAX_PARTICLES)
        };

        let c = &self.config;
        self.particles = (0..count)
            .map(|_| Particle {
                position: self.viewport.wrap(rng.point_in(self.viewport)),
                velocity: rng.jitter(c.speed),
                size: rng.uniform(c.size_min, c.size_max),
                alpha: rng.uniform(c.alpha_min, c.alpha_max),
                color: c.palette.pick(rng),
                depth: rng.unit(),
            })
            .collect();
    }

    /// Adopt new bounds, wrapping every particle into them.
    pub fn rebound(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized();
        for p in &mut self.particles {
            p.position = self.viewport.wrap(p.position);
        }
    }

    /// Advance one tick: cursor attraction, integration, damping, wrap.
    pub fn step(&mut self, cursor: Option<Vec2>) {
        let c = &self.config;
        let radius = c.attraction_radius;

        for p in &mut self.particles {
            if let Some(cursor) = cursor {
                let delta = cursor - p.position;
                let dist_sq = delta.length_squared();
                if dist_sq < radius * radius && dist_sq > 0.0 {
                    let dist = dist_sq.sqrt();
                    let force = (radius - dist) / radius;
                    p.velocity += delta / dist * force * c.attraction_strength;
                }
            }

            p.position += p.velocity;
            p.velocity *= c.damping;
            p.position = self.viewport.wrap(p.position);
        }
    }

    /// Every linked pair with its line opacity.
    pub fn connections(&self) -> Vec<Connection> {
        let threshold = self.config.link_distance;
        let mut links = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            for (j, b) in self.particles.iter().enumerate().skip(i + 1) {
                let opacity =
                    connection_opacity(a.position.distance(b.position), threshold, self.config.link_opacity);
                if opacity > 0.0 {
                    links.push(Connection { a: i, b: j, opacity });
                }
            }
        }
        links
    }

    /// Draw depth-scaled particles, then their links.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        for p in &self.particles {
            surface.fill_circle(
                p.position,
                p.rendered_size(),
                Paint::solid(p.color.with_alpha(p.rendered_alpha())),
            );
        }

        for link in self.connections() {
            let a = &self.particles[link.a];
            let b = &self.particles[link.b];
            surface.stroke_line(
                a.position,
                b.position,
                self.config.link_width,
                Stroke::Solid(a.color.with_alpha(link.opacity)),
            );
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, Recorder};
    use crate::visuals::Palette;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn seeded(count: usize, w: f32, h: f32, seed: u64) -> ParticleField {
        let mut field = ParticleField::new(ParticleConfig::default());
        let mut rng = SmallRng::seed_from_u64(seed);
        field.seed(count, Viewport::new(w, h), &mut rng);
        field
    }

    fn particle_at(position: Vec2, velocity: Vec2) -> Particle {
        Particle {
            position,
            velocity,
            size: 1.0,
            alpha: 0.3,
            color: Color::CYAN,
            depth: 0.5,
        }
    }

    #[test]
    fn test_seed_ranges() {
        let field = seeded(50, 800.0, 600.0, 1);
        assert_eq!(field.len(), 50);
        let palette = Palette::neon();
        for p in field.particles() {
            assert!(field.viewport().contains(p.position));
            assert!(p.velocity.x >= -0.2 && p.velocity.x < 0.2);
            assert!(p.velocity.y >= -0.2 && p.velocity.y < 0.2);
            assert!(p.size >= 0.5 && p.size < 2.5);
            assert!(p.alpha >= 0.1 && p.alpha < 0.5);
            assert!(p.depth >= 0.0 && p.depth < 1.0);
            assert!(palette.colors().contains(&p.color));
        }
    }

    #[test]
    fn test_seed_clamps_count() {
        assert_eq!(seeded(500, 800.0, 600.0, 2).len(), MAX_PARTICLES);
        assert!(seeded(50, 0.0, 600.0, 2).is_empty());
    }

    #[test]
    fn test_wrap_after_many_steps() {
        let mut field = seeded(50, 300.0, 200.0, 3);
        for i in 0..2000 {
            let cursor = if i % 2 == 0 {
                Some(Vec2::new(150.0, 100.0))
            } else {
                None
            };
            field.step(cursor);
            for p in field.particles() {
                assert!(p.position.x >= 0.0 && p.position.x < 300.0);
                assert!(p.position.y >= 0.0 && p.position.y < 200.0);
            }
        }
    }

    #[test]
    fn test_wrap_crosses_edges() {
        let vp = Viewport::new(100.0, 100.0);
        let mut field = ParticleField::from_particles(
            ParticleConfig::default(),
            vp,
            vec![
                particle_at(Vec2::new(99.9, 50.0), Vec2::new(0.5, 0.0)),
                particle_at(Vec2::new(50.0, 0.1), Vec2::new(0.0, -0.5)),
            ],
        );
        field.step(None);
        let ps = field.particles();
        assert!((ps[0].position.x - 0.4).abs() < 1e-3);
        assert!((ps[1].position.y - 99.6).abs() < 1e-3);
    }

    #[test]
    fn test_attraction_pulls_toward_cursor() {
        let config = ParticleConfig::default();
        let cursor = Vec2::new(400.0, 300.0);
        let mut field = ParticleField::from_particles(
            config.clone(),
            Viewport::new(800.0, 600.0),
            vec![
                particle_at(Vec2::new(300.0, 300.0), Vec2::ZERO),
                particle_at(Vec2::new(100.0, 100.0), Vec2::ZERO),
            ],
        );
        field.step(Some(cursor));
        let near = field.particles()[0];
        let far = field.particles()[1];

        // force = (180 - 100) / 180, scaled by strength then damped
        let expected = (80.0 / 180.0) * config.attraction_strength * config.damping;
        assert!(near.velocity.x > 0.0);
        assert!((near.velocity.x - expected).abs() < 1e-6);
        assert_eq!(near.velocity.y, 0.0);
        assert_eq!(far.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_particle_on_cursor_is_not_nan() {
        let mut field = ParticleField::from_particles(
            ParticleConfig::default(),
            Viewport::new(800.0, 600.0),
            vec![particle_at(Vec2::new(10.0, 10.0), Vec2::ZERO)],
        );
        field.step(Some(Vec2::new(10.0, 10.0)));
        assert!(field.particles()[0].position.is_finite());
    }

    #[test]
    fn test_damping() {
        let mut field = ParticleField::from_particles(
            ParticleConfig::default(),
            Viewport::new(800.0, 600.0),
            vec![particle_at(Vec2::new(10.0, 10.0), Vec2::new(1.0, 0.0))],
        );
        field.step(None);
        assert!((field.particles()[0].velocity.x - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_rendered_bounds() {
        let field = seeded(50, 800.0, 600.0, 4);
        for p in field.particles() {
            assert!(p.rendered_size() >= 0.0);
            let a = p.rendered_alpha();
            assert!((0.0..=1.0).contains(&a));
            assert!(a <= p.alpha);
        }
        let odd = Particle {
            alpha: 5.0,
            size: -1.0,
            ..particle_at(Vec2::ZERO, Vec2::ZERO)
        };
        assert_eq!(odd.rendered_size(), 0.0);
        assert_eq!(odd.rendered_alpha(), 1.0);
    }

    #[test]
    fn test_connection_opacity_shape() {
        assert_eq!(connection_opacity(0.0, 100.0, 0.15), 0.15);
        assert_eq!(connection_opacity(100.0, 100.0, 0.15), 0.0);
        assert_eq!(connection_opacity(150.0, 100.0, 0.15), 0.0);
        assert_eq!(connection_opacity(10.0, 0.0, 0.15), 0.0);
        let mut last = f32::INFINITY;
        for d in 0..=100 {
            let o = connection_opacity(d as f32, 100.0, 0.15);
            assert!(o <= last);
            last = o;
        }
    }

    #[test]
    fn test_render_draws_particles_then_links() {
        let field = ParticleField::from_particles(
            ParticleConfig::default(),
            Viewport::new(800.0, 600.0),
            vec![
                particle_at(Vec2::new(100.0, 100.0), Vec2::ZERO),
                particle_at(Vec2::new(150.0, 100.0), Vec2::ZERO),
                particle_at(Vec2::new(700.0, 500.0), Vec2::ZERO),
            ],
        );
        let mut rec = Recorder::new(800.0, 600.0);
        field.render(&mut rec);
        assert_eq!(rec.circles().count(), 3);
        let lines: Vec<_> = rec.lines().collect();
        assert_eq!(lines.len(), 1);
        let (_, _, width, stroke) = lines[0];
        assert_eq!(width, 0.5);
        match stroke {
            Stroke::Solid(c) => assert!((c.a - 0.075).abs() < 1e-6),
            other => panic!("unexpected stroke {:?}", other),
        }
        assert!(matches!(rec.commands()[0], DrawCommand::Circle { .. }));
    }
}
