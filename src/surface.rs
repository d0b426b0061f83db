//! The 2D drawing surface the effects paint onto.
//!
//! [`Surface`] is the narrow set of canvas operations the layers need. The
//! CPU [`Framebuffer`](crate::Framebuffer) and the browser canvas both
//! implement it; [`Recorder`] captures calls for tests.

use crate::visuals::{Color, Paint, Stroke};
use glam::Vec2;

/// Size of the drawable area in CSS/logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Replace negative or non-finite extents with zero.
    pub fn sanitized(self) -> Self {
        let clean = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: clean(self.width),
            height: clean(self.height),
        }
    }

    /// True when either side is smaller than one pixel.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width >= 1.0 && self.height >= 1.0)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Wrap a point into `[0, width) x [0, height)`, each axis on its own.
    pub fn wrap(&self, p: Vec2) -> Vec2 {
        Vec2::new(wrap_axis(p.x, self.width), wrap_axis(p.y, self.height))
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x < self.width && p.y >= 0.0 && p.y < self.height
    }
}

/// `rem_euclid` can round up to exactly `extent` for tiny negative inputs.
fn wrap_axis(v: f32, extent: f32) -> f32 {
    if !(extent > 0.0) || !v.is_finite() {
        return 0.0;
    }
    let r = v.rem_euclid(extent);
    if r >= extent {
        0.0
    } else {
        r
    }
}

/// Canvas operations used by the effect layers.
///
/// Coordinates are in logical pixels with the origin at the top left.
pub trait Surface {
    /// Drawable size.
    fn size(&self) -> Vec2;

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Paint `color` over the whole surface (source-over), leaving a fading
    /// afterimage of earlier frames.
    fn fade(&mut self, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, stroke: Stroke);

    /// Draw a single glyph `size` pixels tall. `origin` is the left end of
    /// the baseline, as with canvas `fillText`.
    fn fill_glyph(&mut self, glyph: char, origin: Vec2, size: f32, color: Color);

    /// Radial gradient from `color` at the center to transparent at `radius`.
    fn fill_radial(&mut self, center: Vec2, radius: f32, color: Color);
}

/// One recorded [`Surface`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Fade(Color),
    Circle {
        center: Vec2,
        radius: f32,
        paint: Paint,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        stroke: Stroke,
    },
    Glyph {
        glyph: char,
        origin: Vec2,
        size: f32,
        color: Color,
    },
    Radial {
        center: Vec2,
        radius: f32,
        color: Color,
    },
}

/// A [`Surface`] that records every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32, Paint)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::Circle {
                center,
                radius,
                paint,
            } => Some((center, radius, paint)),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Vec2, Vec2, f32, Stroke)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::Line {
                from,
                to,
                width,
                stroke,
            } => Some((from, to, width, stroke)),
            _ => None,
        })
    }

    pub fn glyphs(&self) -> impl Iterator<Item = (char, Vec2, Color)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::Glyph {
                glyph,
                origin,
                color,
                ..
            } => Some((glyph, origin, color)),
            _ => None,
        })
    }
}

impl Surface for Recorder {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fade(&mut self, color: Color) {
        self.commands.push(DrawCommand::Fade(color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            paint,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, stroke: Stroke) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            stroke,
        });
    }

    fn fill_glyph(&mut self, glyph: char, origin: Vec2, size: f32, color: Color) {
        self.commands.push(DrawCommand::Glyph {
            glyph,
            origin,
            size,
            color,
        });
    }

    fn fill_radial(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Radial {
            center,
            radius,
            color,
        });
    }
}
