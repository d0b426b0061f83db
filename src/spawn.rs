//! Random helpers for seeding particles, drops and trail sparks.
//!
//! Every randomized component takes an injected `&mut impl Rng`, so tests
//! pass a seeded [`SmallRng`] and get reproducible frames. [`SpawnRng`] is
//! blanket-implemented for every `Rng`:
//!
//! ```ignore
//! use backdrop::spawn::SpawnRng;
//!
//! let mut rng = backdrop::spawn::clock_seeded_rng();
//! let position = rng.point_in(viewport);
//! let velocity = rng.jitter(0.4);
//! ```

use crate::surface::Viewport;
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Spawn-oriented sampling on top of [`Rng`].
///
/// Unlike `gen_range`, none of these panic on an empty range: `uniform(a, a)`
/// returns `a`.
pub trait SpawnRng: Rng {
    /// Uniform in `[0, 1)`.
    #[inline]
    fn unit(&mut self) -> f32 {
        self.gen::<f32>()
    }

    /// Uniform in `[min, max)`.
    #[inline]
    fn uniform(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.unit()
    }

    /// Uniform in `[-spread/2, spread/2)`, i.e. `(random - 0.5) * spread`.
    #[inline]
    fn centered(&mut self, spread: f32) -> f32 {
        (self.unit() - 0.5) * spread
    }

    /// Both axes [`centered`](SpawnRng::centered).
    #[inline]
    fn jitter(&mut self, spread: f32) -> Vec2 {
        Vec2::new(self.centered(spread), self.centered(spread))
    }

    /// Uniform point inside the viewport.
    #[inline]
    fn point_in(&mut self, viewport: Viewport) -> Vec2 {
        Vec2::new(self.unit() * viewport.width, self.unit() * viewport.height)
    }

    /// True with probability `chance`, using the `random > 1 - chance` gate.
    #[inline]
    fn chance(&mut self, chance: f32) -> bool {
        self.unit() > 1.0 - chance
    }
}

impl<R: Rng + ?Sized> SpawnRng for R {}

/// A [`SmallRng`] seeded from the wall clock.
///
/// Different every run, like an unseeded page load. Pass an explicit seed
/// (`SmallRng::seed_from_u64`) when frames must be reproducible.
pub fn clock_seeded_rng() -> SmallRng {
    SmallRng::seed_from_u64(clock_seed())
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    let noise = (js_sys::Math::random() * u32::MAX as f64) as u64;
    (js_sys::Date::now() as u64) << 20 ^ noise
}
