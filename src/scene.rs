//! The [`Backdrop`] handle: every effect's state between mount and unmount.

use crate::config::EffectsConfig;
use crate::field::ParticleField;
use crate::network::NeuralNetwork;
use crate::parallax::DepthLayers;
use crate::rain::RainOverlay;
use crate::scheduler::{Coalescer, FrameInfo};
use crate::surface::{Surface, Viewport};
use crate::trail::{CursorRing, CursorTrail};
use glam::Vec2;
use rand::rngs::SmallRng;
use tracing::{debug, info};

/// What the host device supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Touch-only device: no cursor, so no trail or ring.
    pub touch: bool,
}

/// Owns the state of all effect layers.
///
/// Hosts call [`pointer_moved`](Self::pointer_moved) and
/// [`scrolled`](Self::scrolled) from their event handlers, [`tick`](Self::tick)
/// once per frame, and then the three `render_*` methods with the matching
/// layer surfaces.
///
/// ```ignore
/// let mut backdrop = Backdrop::mount(config, viewport, Capabilities::default(), rng);
///
/// // per frame
/// backdrop.tick(frame);
/// backdrop.render_depth(&mut depth);
/// backdrop.render_background(&mut background);
/// backdrop.render_trail(&mut trail);
/// ```
pub struct Backdrop {
    config: EffectsConfig,
    viewport: Viewport,
    rng: SmallRng,
    field: ParticleField,
    network: NeuralNetwork,
    rain: RainOverlay,
    depth: DepthLayers,
    trail: Option<CursorTrail>,
    ring: Option<CursorRing>,
    cursor: Option<Vec2>,
    scroll_y: f32,
    pending_scroll: Coalescer<f32>,
    last_frame: FrameInfo,
}

impl Backdrop {
    /// Size every layer to `viewport` and seed its state.
    pub fn mount(
        config: EffectsConfig,
        viewport: Viewport,
        capabilities: Capabilities,
        rng: SmallRng,
    ) -> Self {
        let (trail, ring) = if capabilities.touch {
            (None, None)
        } else {
            (
                Some(CursorTrail::new(config.trail.clone())),
                Some(CursorRing::new()),
            )
        };

        let mut backdrop = Self {
            field: ParticleField::new(config.particles.clone()),
            network: NeuralNetwork::new(config.network.clone()),
            rain: RainOverlay::new(config.rain.clone()),
            depth: DepthLayers::new(config.parallax.clone()),
            trail,
            ring,
            viewport: viewport.sanitized(),
            rng,
            cursor: None,
            scroll_y: 0.0,
            pending_scroll: Coalescer::new(),
            last_frame: FrameInfo::default(),
            config,
        };
        backdrop.reseed();
        info!(
            width = backdrop.viewport.width,
            height = backdrop.viewport.height,
            particles = backdrop.field.len(),
            columns = backdrop.rain.columns(),
            touch = capabilities.touch,
            "backdrop mounted"
        );
        backdrop
    }

    fn reseed(&mut self) {
        let count = self.config.particle_count_for(self.viewport);
        self.field.seed(count, self.viewport, &mut self.rng);
        self.network.reposition(self.viewport);
        self.network
            .update_activity(self.scroll_y, self.viewport.height);
        self.rain.reseed(self.viewport, &mut self.rng);
    }

    /// Adopt a new viewport size.
    ///
    /// The field is reseeded when the particle count for the new size
    /// differs (crossing the narrow threshold, or entering or leaving a
    /// zero-area viewport); otherwise existing particles are wrapped into
    /// the new bounds.
    pub fn resize(&mut self, viewport: Viewport) {
        let viewport = viewport.sanitized();
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;

        let count = self.config.particle_count_for(viewport);
        if count != self.field.len() {
            self.field.seed(count, viewport, &mut self.rng);
        } else {
            self.field.rebound(viewport);
        }
        self.network.reposition(viewport);
        self.network.update_activity(self.scroll_y, viewport.height);
        self.rain.reseed(viewport, &mut self.rng);
        debug!(
            width = viewport.width,
            height = viewport.height,
            particles = self.field.len(),
            "backdrop resized"
        );
    }

    /// Pointer moved to `position`; `hovering` is true over interactive elements.
    pub fn pointer_moved(&mut self, position: Vec2, hovering: bool) {
        self.cursor = Some(position);
        if let Some(trail) = self.trail.as_mut() {
            trail.on_pointer_move(position, &mut self.rng);
        }
        if let Some(ring) = self.ring.as_mut() {
            ring.update(position, hovering);
        }
    }

    /// Record a scroll offset for the next tick.
    ///
    /// Returns `true` only for the first offset since the last tick, so a
    /// paused host can request exactly one frame per burst.
    pub fn scrolled(&mut self, scroll_y: f32) -> bool {
        let scroll_y = if scroll_y.is_finite() {
            scroll_y.max(0.0)
        } else {
            0.0
        };
        self.pending_scroll.push(scroll_y)
    }

    /// Fold pending input into the simulation without advancing it.
    pub fn apply_input(&mut self) {
        if let Some(scroll_y) = self.pending_scroll.take() {
            self.scroll_y = scroll_y;
            self.network
                .update_activity(scroll_y, self.viewport.height);
        }
    }

    /// Advance every layer by one frame.
    pub fn tick(&mut self, frame: FrameInfo) {
        self.apply_input();
        self.rain.step(frame.frame, &mut self.rng);
        self.field.step(self.cursor);
        if let Some(trail) = self.trail.as_mut() {
            trail.step();
        }
        self.last_frame = frame;
    }

    /// Fade the background, then draw rain, particles, links and the graph.
    pub fn render_background<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.fade(self.config.background.fade);
        self.rain.render(surface);
        self.field.render(surface);
        self.network.render(surface, self.last_frame.now_ms);
    }

    /// Clear and draw the trail and cursor ring. No-op on touch devices.
    pub fn render_trail<S: Surface + ?Sized>(&self, surface: &mut S) {
        if let Some(trail) = &self.trail {
            trail.render(surface);
        }
        if let Some(ring) = &self.ring {
            ring.render(surface, &self.config.trail);
        }
    }

    /// Clear and draw the parallax layers.
    pub fn render_depth<S: Surface + ?Sized>(&self, surface: &mut S) {
        self.depth
            .render(surface, self.viewport, self.scroll_y, self.last_frame.now_ms);
    }

    /// Tear down. Consumes the handle so no state outlives the view.
    pub fn unmount(self) {
        info!(frames = self.last_frame.frame, "backdrop unmounted");
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn rain(&self) -> &RainOverlay {
        &self.rain
    }

    pub fn trail(&self) -> Option<&CursorTrail> {
        self.trail.as_ref()
    }

    pub fn ring(&self) -> Option<&CursorRing> {
        self.ring.as_ref()
    }

    pub fn depth(&self) -> &DepthLayers {
        &self.depth
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn last_frame(&self) -> FrameInfo {
        self.last_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, Recorder};
    use rand::SeedableRng;

    fn mounted(w: f32, h: f32, touch: bool) -> Backdrop {
        Backdrop::mount(
            EffectsConfig::default(),
            Viewport::new(w, h),
            Capabilities { touch },
            SmallRng::seed_from_u64(42),
        )
    }

    #[test]
    fn test_mount_seeds_everything() {
        let backdrop = mounted(1024.0, 768.0, false);
        assert_eq!(backdrop.field().len(), 50);
        assert_eq!(backdrop.rain().columns(), 73);
        assert!(backdrop.trail().is_some());
        assert_eq!(backdrop.network().active_count(), 5);
    }

    #[test]
    fn test_narrow_viewport_halves_particles() {
        assert_eq!(mounted(600.0, 800.0, false).field().len(), 25);
    }

    #[test]
    fn test_touch_has_no_trail() {
        let mut backdrop = mounted(800.0, 600.0, true);
        assert!(backdrop.trail().is_none());
        assert!(backdrop.ring().is_none());
        backdrop.pointer_moved(Vec2::new(10.0, 10.0), false);
        let mut rec = Recorder::new(800.0, 600.0);
        backdrop.render_trail(&mut rec);
        assert!(rec.commands().is_empty());
    }

    #[test]
    fn test_zero_size_resize_recovers() {
        let mut backdrop = mounted(800.0, 600.0, false);
        backdrop.resize(Viewport::new(0.0, 0.0));
        assert!(backdrop.field().is_empty());
        assert_eq!(backdrop.rain().columns(), 1);
        for frame in 1..10 {
            backdrop.tick(FrameInfo {
                frame,
                now_ms: frame as f64 * 16.0,
            });
        }

        backdrop.resize(Viewport::new(800.0, 600.0));
        assert_eq!(backdrop.field().len(), 50);
        assert_eq!(backdrop.rain().columns(), 57);
        for p in backdrop.field().particles() {
            assert!(backdrop.viewport().contains(p.position));
        }
    }

    #[test]
    fn test_resize_same_count_rebounds() {
        let mut backdrop = mounted(1000.0, 800.0, false);
        let before: Vec<Vec2> = backdrop.field().particles().iter().map(|p| p.velocity).collect();
        backdrop.resize(Viewport::new(900.0, 500.0));
        let after: Vec<Vec2> = backdrop.field().particles().iter().map(|p| p.velocity).collect();
        assert_eq!(before, after);
        for p in backdrop.field().particles() {
            assert!(p.position.x < 900.0 && p.position.y < 500.0);
        }
    }

    #[test]
    fn test_scroll_applied_on_tick() {
        let mut backdrop = mounted(1000.0, 800.0, false);
        assert!(backdrop.scrolled(400.0));
        assert!(!backdrop.scrolled(800.0));
        assert_eq!(backdrop.scroll_y(), 0.0);

        backdrop.tick(FrameInfo {
            frame: 1,
            now_ms: 16.0,
        });
        assert_eq!(backdrop.scroll_y(), 800.0);
        assert_eq!(backdrop.network().active_count(), 1);
        assert!(backdrop.scrolled(0.0));
    }

    #[test]
    fn test_background_starts_with_fade() {
        let mut backdrop = mounted(800.0, 600.0, false);
        backdrop.tick(FrameInfo {
            frame: 3,
            now_ms: 48.0,
        });
        let mut rec = Recorder::new(800.0, 600.0);
        backdrop.render_background(&mut rec);
        match rec.commands()[0] {
            DrawCommand::Fade(c) => assert!((c.a - 0.06).abs() < 1e-6),
            ref other => panic!("expected fade, got {:?}", other),
        }
    }

    #[test]
    fn test_trail_follows_pointer() {
        let mut backdrop = mounted(800.0, 600.0, false);
        for i in 0..9 {
            backdrop.pointer_moved(Vec2::new(100.0 + i as f32, 200.0), i == 8);
        }
        assert_eq!(backdrop.trail().map(|t| t.len()), Some(3));
        assert_eq!(backdrop.cursor(), Some(Vec2::new(108.0, 200.0)));
        assert!(backdrop.ring().is_some_and(|r| r.is_hovering()));
    }
}
