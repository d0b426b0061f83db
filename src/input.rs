//! Pointer, scroll and key state for the native viewer.
//!
//! A desktop window has no page to scroll and no DOM to hover, so [`Input`]
//! stands in for both: the mouse wheel moves a virtual scroll offset within a
//! page of configurable height, and the pointer counts as hovering while it
//! is inside one of the configured [`Hotspot`] rectangles.
//!
//! ```ignore
//! if let Some(change) = input.handle_event(&event) {
//!     match change {
//!         InputChange::Pointer { position, hovering } => backdrop.pointer_moved(position, hovering),
//!         InputChange::Scroll(y) => { backdrop.scrolled(y); }
//!     }
//! }
//! if input.key_pressed(KeyCode::Space) { /* toggle pause */ }
//! ```

use crate::surface::Viewport;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A screen-space rectangle treated as an interactive element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Hotspot {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    S,
    Escape,
    Other,
}

/// An input event the backdrop should hear about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputChange {
    Pointer { position: Vec2, hovering: bool },
    /// New absolute scroll offset.
    Scroll(f32),
}

#[derive(Debug, Clone, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    pointer: Option<Vec2>,
    scroll_y: f32,
    viewport_height: f32,
    page_height: f32,
    scroll_line: f32,
    hotspots: Vec<Hotspot>,
}

impl Input {
    pub fn new(page_height: f32, scroll_line: f32, hotspots: Vec<Hotspot>) -> Self {
        Self {
            page_height,
            scroll_line,
            hotspots,
            ..Default::default()
        }
    }

    /// Check if a key was pressed this frame (just went down).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Largest reachable scroll offset.
    pub fn max_scroll(&self) -> f32 {
        (self.page_height - self.viewport_height).max(0.0)
    }

    pub fn is_hovering(&self, p: Vec2) -> bool {
        self.hotspots.iter().any(|h| h.contains(p))
    }

    /// Called at the start of each frame to clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Track the viewport height, re-clamping the scroll offset.
    ///
    /// Returns the new offset if clamping moved it.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Option<f32> {
        self.viewport_height = viewport.sanitized().height;
        let clamped = self.scroll_y.clamp(0.0, self.max_scroll());
        (clamped != self.scroll_y).then(|| {
            self.scroll_y = clamped;
            clamped
        })
    }

    pub fn move_pointer(&mut self, position: Vec2) -> InputChange {
        self.pointer = Some(position);
        InputChange::Pointer {
            position,
            hovering: self.is_hovering(position),
        }
    }

    /// Scroll by `delta` pixels (positive is down the page).
    ///
    /// Returns the new offset, or `None` when already at the limit.
    pub fn scroll_by(&mut self, delta: f32) -> Option<f32> {
        if !delta.is_finite() {
            return None;
        }
        let next = (self.scroll_y + delta).clamp(0.0, self.max_scroll());
        (next != self.scroll_y).then(|| {
            self.scroll_y = next;
            next
        })
    }

    pub fn press_key(&mut self, key: KeyCode) {
        // held keys do not re-fire through auto-repeat
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::{Input, InputChange, KeyCode};
    use glam::Vec2;
    use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
    use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

    impl From<WinitKeyCode> for KeyCode {
        fn from(key: WinitKeyCode) -> Self {
            match key {
                WinitKeyCode::Space => KeyCode::Space,
                WinitKeyCode::KeyS => KeyCode::S,
                WinitKeyCode::Escape => KeyCode::Escape,
                _ => KeyCode::Other,
            }
        }
    }

    impl Input {
        /// Process a winit window event.
        pub fn handle_event(&mut self, event: &WindowEvent) -> Option<InputChange> {
            match event {
                WindowEvent::KeyboardInput { event, .. } => {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        let key = KeyCode::from(code);
                        match event.state {
                            ElementState::Pressed => self.press_key(key),
                            ElementState::Released => self.release_key(key),
                        }
                    }
                    None
                }

                WindowEvent::CursorMoved { position, .. } => Some(
                    self.move_pointer(Vec2::new(position.x as f32, position.y as f32)),
                ),

                WindowEvent::MouseWheel { delta, .. } => {
                    // wheel up is positive, which scrolls back up the page
                    let pixels = match delta {
                        MouseScrollDelta::LineDelta(_, y) => -y * self.scroll_line,
                        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                    };
                    self.scroll_by(pixels).map(InputChange::Scroll)
                }

                _ => None,
            }
        }
    }
}
