//! Scroll-parallax depth layers.
//!
//! Soft radial color washes behind everything else. Each layer is shifted
//! down by a fraction of the scroll offset (deeper layers move less) and
//! sways slowly on its own period.

use crate::config::{DepthLayerConfig, ParallaxConfig};
use crate::surface::{Surface, Viewport};
use glam::Vec2;
use std::f32::consts::TAU;

/// Sway offset of a layer at `now_ms`.
///
/// Moves along a shallow diagonal, `amplitude × sin(2πt / period)`.
pub fn drift(now_ms: f64, period_s: f32, amplitude: f32) -> Vec2 {
    if !(period_s > 0.0) || !now_ms.is_finite() {
        return Vec2::ZERO;
    }
    let period_ms = f64::from(period_s) * 1000.0;
    let phase = (now_ms.rem_euclid(period_ms) / period_ms) as f32;
    let s = (phase * TAU).sin() * amplitude;
    Vec2::new(s, -0.5 * s)
}

/// Distance from `p` to the farthest viewport corner.
fn farthest_corner(p: Vec2, viewport: Viewport) -> f32 {
    let dx = p.x.max(viewport.width - p.x);
    let dy = p.y.max(viewport.height - p.y);
    Vec2::new(dx, dy).length()
}

#[derive(Debug, Clone)]
pub struct DepthLayers {
    layers: Vec<DepthLayerConfig>,
}

impl DepthLayers {
    pub fn new(config: ParallaxConfig) -> Self {
        Self {
            layers: config.layers,
        }
    }

    /// Gradient center and radius of `layer` for the given scroll and time.
    pub fn placement(
        layer: &DepthLayerConfig,
        viewport: Viewport,
        scroll_y: f32,
        now_ms: f64,
    ) -> (Vec2, f32) {
        let anchor = layer.center * viewport.size();
        let radius = layer.radius.max(0.0) * farthest_corner(anchor, viewport);
        let offset = Vec2::new(0.0, scroll_y * layer.scroll_factor)
            + drift(now_ms, layer.drift_period_s, layer.drift_amplitude);
        (anchor + offset, radius)
    }

    /// Clear and paint every layer back to front.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        viewport: Viewport,
        scroll_y: f32,
        now_ms: f64,
    ) {
        surface.clear();
        for layer in &self.layers {
            let (center, radius) = Self::placement(layer, viewport, scroll_y, now_ms);
            surface.fill_radial(center, radius, layer.color);
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, Recorder};

    #[test]
    fn test_drift_cycle() {
        assert_eq!(drift(0.0, 40.0, 30.0), Vec2::ZERO);
        let quarter = drift(10_000.0, 40.0, 30.0);
        assert!((quarter.x - 30.0).abs() < 1e-3);
        assert!((quarter.y + 15.0).abs() < 1e-3);
        assert!(drift(40_000.0, 40.0, 30.0).length() < 1e-3);
        assert_eq!(drift(5.0, 0.0, 30.0), Vec2::ZERO);
    }

    #[test]
    fn test_deeper_layers_move_less() {
        let layers = DepthLayers::new(ParallaxConfig::default());
        let vp = Viewport::new(1000.0, 800.0);
        let shifts: Vec<f32> = layers
            .layers
            .iter()
            .map(|layer| {
                let (top, _) = DepthLayers::placement(layer, vp, 0.0, 0.0);
                let (scrolled, _) = DepthLayers::placement(layer, vp, 1000.0, 0.0);
                scrolled.y - top.y
            })
            .collect();
        assert!((shifts[0] - 30.0).abs() < 1e-3);
        assert!((shifts[1] - 60.0).abs() < 1e-3);
        assert!((shifts[2] - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_radius_from_farthest_corner() {
        let layer = &ParallaxConfig::default().layers[2];
        let vp = Viewport::new(800.0, 600.0);
        let (center, radius) = DepthLayers::placement(layer, vp, 0.0, 0.0);
        assert_eq!(center, Vec2::new(400.0, 300.0));
        assert!((radius - 0.6 * 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_render_clears_first() {
        let layers = DepthLayers::new(ParallaxConfig::default());
        let mut rec = Recorder::new(800.0, 600.0);
        layers.render(&mut rec, Viewport::new(800.0, 600.0), 120.0, 2500.0);
        assert_eq!(rec.commands()[0], DrawCommand::Clear);
        let radials = rec
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Radial { .. }))
            .count();
        assert_eq!(radials, 3);
    }
}
