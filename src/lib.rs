//! # Backdrop - ambient canvas effects
//!
//! A small per-frame simulation that paints the decorative layers behind a
//! portfolio page: drifting particles with proximity links, a scroll-driven
//! "neural" graph, throttled glyph rain, a cursor-following particle trail
//! and scroll-parallax depth layers.
//!
//! Everything is owned by a [`Backdrop`] handle that lives exactly as long as
//! the view it decorates. Painting goes through the [`Surface`] trait, so the
//! same simulation drives the CPU [`Framebuffer`] (native viewer, snapshots,
//! benches), a browser `CanvasRenderingContext2d` (wasm host) or a
//! [`Recorder`] in tests.
//!
//! ## Quick Start
//!
//! ```ignore
//! use backdrop::prelude::*;
//! use rand::SeedableRng;
//!
//! let config = EffectsConfig::default();
//! let viewport = Viewport::new(800.0, 600.0);
//! let mut backdrop = Backdrop::mount(
//!     config,
//!     viewport,
//!     Capabilities::default(),
//!     SmallRng::seed_from_u64(7),
//! );
//!
//! let mut background = Framebuffer::new(800, 600);
//! let mut trail = Framebuffer::new(800, 600);
//!
//! backdrop.pointer_moved(Vec2::new(400.0, 300.0), false);
//! backdrop.tick(FrameInfo { frame: 1, now_ms: 16.0 });
//! backdrop.render_background(&mut background);
//! backdrop.render_trail(&mut trail);
//! ```
//!
//! ## Layers
//!
//! | Layer | Contents | Repaint |
//! |-------|----------|---------|
//! | depth | [`DepthLayers`] radial gradients | clear + redraw |
//! | background | rain, [`ParticleField`], [`NeuralNetwork`] | translucent fade + redraw |
//! | trail | [`CursorTrail`], [`CursorRing`] | clear + redraw |
//!
//! ## Frame loop
//!
//! [`FrameScheduler`] wraps the platform refresh callback (`requestAnimationFrame`
//! in the browser, `request_redraw` under winit) behind [`FrameClock`]. High
//! frequency input is folded through a [`Coalescer`] so a burst of scroll
//! events costs one pending frame, not one per event.

pub mod config;
mod error;
pub mod field;
pub mod input;
pub mod network;
pub mod parallax;
pub mod rain;
pub mod raster;
mod scene;
pub mod scheduler;
pub mod spawn;
pub mod surface;
pub mod time;
pub mod trail;
pub mod visuals;

#[cfg(not(target_arch = "wasm32"))]
pub mod gpu;
#[cfg(not(target_arch = "wasm32"))]
pub mod window;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::EffectsConfig;
pub use error::{ConfigError, SchedulerError, SnapshotError};
#[cfg(not(target_arch = "wasm32"))]
pub use error::{GpuError, ViewerError};
pub use field::{Particle, ParticleField, MAX_PARTICLES};
pub use glam::Vec2;
pub use network::{NeuralNetwork, NeuralNode};
pub use parallax::DepthLayers;
pub use rain::{RainGlyph, RainOverlay};
pub use raster::Framebuffer;
pub use scene::{Backdrop, Capabilities};
pub use scheduler::{Coalescer, FrameClock, FrameInfo, FrameScheduler};
pub use surface::{DrawCommand, Recorder, Surface, Viewport};
pub use trail::{CursorRing, CursorTrail, TrailParticle};
pub use visuals::{Color, Paint, Palette, Stroke};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use backdrop::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::EffectsConfig;
    pub use crate::field::ParticleField;
    pub use crate::network::NeuralNetwork;
    pub use crate::parallax::DepthLayers;
    pub use crate::rain::RainOverlay;
    pub use crate::raster::Framebuffer;
    pub use crate::scene::{Backdrop, Capabilities};
    pub use crate::scheduler::{Coalescer, FrameClock, FrameInfo, FrameScheduler};
    pub use crate::surface::{Recorder, Surface, Viewport};
    pub use crate::time::Time;
    pub use crate::trail::{CursorRing, CursorTrail};
    pub use crate::visuals::{Color, Paint, Palette, Stroke};
    pub use crate::Vec2;
    pub use rand::rngs::SmallRng;
}
