//! Scroll-driven "neural network" graph.
//!
//! A handful of nodes sit at fixed fractional positions of a tall virtual
//! page. Nodes near the middle of the current scroll window light up; links
//! between nearby nodes brighten when an endpoint is active, and a small data
//! packet travels along links whose both ends are active.

use crate::config::{NetworkConfig, NodeAnchor};
use crate::surface::{Surface, Viewport};
use crate::visuals::{Paint, Stroke};
use glam::Vec2;

/// A node of the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuralNode {
    pub anchor: NodeAnchor,
    /// Page-space position derived from the anchor and viewport.
    pub position: Vec2,
    pub active: bool,
}

impl NeuralNode {
    #[inline]
    pub fn layer(&self) -> f32 {
        self.anchor.layer
    }
}

/// Position of the data packet along a link, as a fraction in `[0, 1)`.
pub fn packet_phase(now_ms: f64, period_ms: f64) -> f32 {
    if !(period_ms > 0.0) || !now_ms.is_finite() {
        return 0.0;
    }
    let phase = (now_ms.rem_euclid(period_ms) / period_ms) as f32;
    if phase >= 1.0 {
        0.0
    } else {
        phase
    }
}

/// A drawable link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub opacity: f32,
    pub width: f32,
    /// Both endpoints active: the link carries a packet.
    pub live: bool,
}

#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    nodes: Vec<NeuralNode>,
    viewport: Viewport,
    config: NetworkConfig,
}

impl NeuralNetwork {
    pub fn new(config: NetworkConfig) -> Self {
        let nodes = config
            .nodes
            .iter()
            .map(|&anchor| NeuralNode {
                anchor,
                position: Vec2::ZERO,
                active: false,
            })
            .collect();
        Self {
            nodes,
            viewport: Viewport::new(0.0, 0.0),
            config,
        }
    }

    /// Recompute node positions for a new viewport.
    pub fn reposition(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized();
        let size = self.viewport.size();
        for node in &mut self.nodes {
            node.position = Vec2::new(node.anchor.x, node.anchor.y) * size;
        }
    }

    /// A node is active iff it lies within half a screen of the middle of
    /// the visible window.
    pub fn update_activity(&mut self, scroll_y: f32, viewport_height: f32) {
        let half = viewport_height * 0.5;
        let middle = scroll_y + half;
        for node in &mut self.nodes {
            node.active = (node.position.y - middle).abs() < half;
        }
    }

    /// Links between nodes closer than `link_reach × width`.
    pub fn links(&self) -> Vec<Link> {
        let c = &self.config;
        let threshold = self.viewport.width * c.link_reach;
        let mut links = Vec::new();
        for (i, a) in self.nodes.iter().enumerate() {
            for (j, b) in self.nodes.iter().enumerate().skip(i + 1) {
                if a.position.distance(b.position) >= threshold {
                    continue;
                }
                let any = a.active || b.active;
                let both = a.active && b.active;
                links.push(Link {
                    a: i,
                    b: j,
                    opacity: if any {
                        c.active_link_opacity
                    } else {
                        c.idle_link_opacity
                    },
                    width: if both {
                        c.active_link_width
                    } else {
                        c.idle_link_width
                    },
                    live: both,
                });
            }
        }
        links
    }

    /// Where the packet on `link` is at `now_ms`.
    pub fn packet_position(&self, link: &Link, now_ms: f64) -> Vec2 {
        let t = packet_phase(now_ms, self.config.packet_period_ms);
        self.nodes[link.a]
            .position
            .lerp(self.nodes[link.b].position, t)
    }

    /// Draw links, packets and nodes. Positions are page space; the layer is
    /// fixed to the screen, so node `y` is drawn as is.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, now_ms: f64) {
        let c = &self.config;

        for link in self.links() {
            let a = self.nodes[link.a].position;
            let b = self.nodes[link.b].position;
            surface.stroke_line(
                a,
                b,
                link.width,
                Stroke::Gradient {
                    from: c.link_from.with_alpha(link.opacity),
                    to: c.link_to.with_alpha(link.opacity),
                },
            );
            if link.live {
                surface.fill_circle(
                    self.packet_position(&link, now_ms),
                    c.packet_radius,
                    Paint::glowing(c.packet_color.with_alpha(c.packet_alpha), c.packet_glow),
                );
            }
        }

        for node in &self.nodes {
            let layer = node.layer();
            let (color, radius, glow) = if node.active {
                (c.active_node_color, c.active_node_radius, c.active_glow)
            } else {
                (c.idle_node_color, c.idle_node_radius, c.idle_glow)
            };
            let alpha = (0.4 + 0.4 * layer).clamp(0.0, 1.0);
            surface.fill_circle(
                node.position,
                (radius * layer).max(0.0),
                Paint::glowing(color.with_alpha(alpha), glow),
            );
        }
    }

    pub fn nodes(&self) -> &[NeuralNode] {
        &self.nodes
    }

    pub fn active_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.active).count()
    }
}
