//! Browser host: canvas elements, `requestAnimationFrame` and DOM listeners.
//!
//! ```js
//! import init, { WebBackdrop } from "./backdrop.js";
//!
//! await init();
//! const backdrop = WebBackdrop.mount("bg-canvas", "trail-canvas", "depth-canvas", null);
//! // on navigation away
//! backdrop?.unmount();
//! ```

use crate::config::EffectsConfig;
use crate::scene::{Backdrop, Capabilities};
use crate::scheduler::{FrameClock, FrameScheduler};
use crate::spawn::clock_seeded_rng;
use crate::surface::{Surface, Viewport};
use crate::visuals::{Color, Paint, Stroke};
use glam::Vec2;
use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent};

const INTERACTIVE_SELECTOR: &str = "a, button, [data-interactive]";

/// A 2D canvas context sized in CSS pixels.
pub struct Canvas2d {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2d {
    /// Look up a canvas element by id. `None` if it is missing or has no 2D context.
    pub fn by_id(id: &str) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let canvas = document
            .get_element_by_id(id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }

    pub fn set_size(&self, viewport: Viewport) {
        self.canvas.set_width(viewport.width as u32);
        self.canvas.set_height(viewport.height as u32);
    }

    fn set_fill(&self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }
}

impl Surface for Canvas2d {
    fn size(&self) -> Vec2 {
        Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fade(&mut self, color: Color) {
        let size = self.size();
        self.set_fill(color);
        self.ctx.fill_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        if !(radius > 0.0) {
            return;
        }
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .is_err()
        {
            return;
        }
        self.set_fill(paint.color);
        if paint.glow > 0.0 {
            self.ctx.set_shadow_blur(paint.glow as f64);
            self.ctx.set_shadow_color(&paint.color.to_css());
        }
        self.ctx.fill();
        self.ctx.set_shadow_blur(0.0);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, stroke: Stroke) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.set_line_width(width as f64);
        match stroke {
            Stroke::Solid(color) => self.ctx.set_stroke_style_str(&color.to_css()),
            Stroke::Gradient { from: start, to: end } => {
                let gradient = self
                    .ctx
                    .create_linear_gradient(from.x as f64, from.y as f64, to.x as f64, to.y as f64);
                let _ = gradient.add_color_stop(0.0, &start.to_css());
                let _ = gradient.add_color_stop(1.0, &end.to_css());
                self.ctx.set_stroke_style_canvas_gradient(&gradient);
            }
        }
        self.ctx.stroke();
    }

    fn fill_glyph(&mut self, glyph: char, origin: Vec2, size: f32, color: Color) {
        self.ctx.set_font(&format!("{}px monospace", size));
        self.set_fill(color);
        let _ = self
            .ctx
            .fill_text(&glyph.to_string(), origin.x as f64, origin.y as f64);
    }

    fn fill_radial(&mut self, center: Vec2, radius: f32, color: Color) {
        if !(radius > 0.0) {
            return;
        }
        let (x, y) = (center.x as f64, center.y as f64);
        let Ok(gradient) = self
            .ctx
            .create_radial_gradient(x, y, 0.0, x, y, radius as f64)
        else {
            return;
        };
        let _ = gradient.add_color_stop(0.0, &color.to_css());
        let _ = gradient.add_color_stop(1.0, &color.with_alpha(0.0).to_css());
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        let size = self.size();
        self.ctx.fill_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// [`FrameClock`] over `window.requestAnimationFrame`.
pub struct AnimationFrameClock {
    window: web_sys::Window,
    callback: FrameCallback,
}

impl FrameClock for AnimationFrameClock {
    type Handle = i32;

    fn request_frame(&mut self) -> i32 {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return 0;
        };
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = ?e, "requestAnimationFrame failed");
                0
            }
        }
    }

    fn cancel_frame(&mut self, handle: i32) {
        let _ = self.window.cancel_animation_frame(handle);
    }
}

struct Layers {
    backdrop: Backdrop,
    background: Canvas2d,
    trail: Option<Canvas2d>,
    depth: Option<Canvas2d>,
}

impl Layers {
    fn resize(&mut self, viewport: Viewport) {
        self.background.set_size(viewport);
        if let Some(trail) = &self.trail {
            trail.set_size(viewport);
        }
        if let Some(depth) = &self.depth {
            depth.set_size(viewport);
        }
        self.backdrop.resize(viewport);
    }
}

fn window_viewport(window: &web_sys::Window) -> Viewport {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    Viewport::new(dim(window.inner_width()), dim(window.inner_height()))
}

fn is_touch_device(window: &web_sys::Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("ontouchstart")).unwrap_or(false)
}

/// Backdrop mounted on page canvases. Drop it only through [`unmount`](Self::unmount).
#[wasm_bindgen]
pub struct WebBackdrop {
    window: web_sys::Window,
    layers: Rc<RefCell<Layers>>,
    scheduler: Rc<RefCell<FrameScheduler<AnimationFrameClock>>>,
    frame_callback: FrameCallback,
    on_resize: Closure<dyn FnMut()>,
    on_mousemove: Closure<dyn FnMut(MouseEvent)>,
    on_scroll: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl WebBackdrop {
    /// Attach to the canvases with the given ids and start animating.
    ///
    /// Returns `undefined` without side effects when the background or trail
    /// canvas is missing. `config_json` overrides the defaults field by field.
    pub fn mount(
        background_id: &str,
        trail_id: &str,
        depth_id: Option<String>,
        config_json: Option<String>,
    ) -> Option<WebBackdrop> {
        console_error_panic_hook::set_once();

        let window = web_sys::window()?;
        let background = Canvas2d::by_id(background_id)?;
        let trail = Canvas2d::by_id(trail_id)?;
        let depth = depth_id.as_deref().and_then(Canvas2d::by_id);

        let config = match config_json.as_deref().map(EffectsConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                warn!(error = %e, "ignoring invalid backdrop config");
                EffectsConfig::default()
            }
            None => EffectsConfig::default(),
        };

        let viewport = window_viewport(&window);
        let capabilities = Capabilities {
            touch: is_touch_device(&window),
        };
        let backdrop = Backdrop::mount(config, viewport, capabilities, clock_seeded_rng());

        let mut layers = Layers {
            backdrop,
            background,
            trail: (!capabilities.touch).then_some(trail),
            depth,
        };
        layers.background.set_size(viewport);
        if let Some(trail) = &layers.trail {
            trail.set_size(viewport);
        }
        if let Some(depth) = &layers.depth {
            depth.set_size(viewport);
        }
        let layers = Rc::new(RefCell::new(layers));

        let frame_callback: FrameCallback = Rc::new(RefCell::new(None));
        let scheduler = Rc::new(RefCell::new(FrameScheduler::new(AnimationFrameClock {
            window: window.clone(),
            callback: Rc::clone(&frame_callback),
        })));

        {
            let scheduler = Rc::clone(&scheduler);
            *frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
                scheduler.borrow_mut().fire(now_ms);
            }) as Box<dyn FnMut(f64)>));
        }

        let on_resize = {
            let layers = Rc::clone(&layers);
            let window = window.clone();
            Closure::wrap(Box::new(move || {
                layers.borrow_mut().resize(window_viewport(&window));
            }) as Box<dyn FnMut()>)
        };

        let on_mousemove = {
            let layers = Rc::clone(&layers);
            Closure::wrap(Box::new(move |event: MouseEvent| {
                let hovering = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .is_some_and(|el| matches!(el.closest(INTERACTIVE_SELECTOR), Ok(Some(_))));
                let position = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                layers.borrow_mut().backdrop.pointer_moved(position, hovering);
            }) as Box<dyn FnMut(MouseEvent)>)
        };

        let on_scroll = {
            let layers = Rc::clone(&layers);
            let window = window.clone();
            Closure::wrap(Box::new(move || {
                let scroll_y = window.scroll_y().unwrap_or(0.0) as f32;
                layers.borrow_mut().backdrop.scrolled(scroll_y);
            }) as Box<dyn FnMut()>)
        };

        let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
        let _ = window.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        let passive = AddEventListenerOptions::new();
        passive.set_passive(true);
        let _ = window.add_event_listener_with_callback_and_add_event_listener_options(
            "scroll",
            on_scroll.as_ref().unchecked_ref(),
            &passive,
        );

        {
            let tick_layers = Rc::clone(&layers);
            let started = scheduler.borrow_mut().start(move |frame| {
                let mut layers = tick_layers.borrow_mut();
                let layers = &mut *layers;
                layers.backdrop.tick(frame);
                layers.backdrop.render_background(&mut layers.background);
                if let Some(trail) = layers.trail.as_mut() {
                    layers.backdrop.render_trail(trail);
                }
                if let Some(depth) = layers.depth.as_mut() {
                    layers.backdrop.render_depth(depth);
                }
            });
            if let Err(e) = started {
                warn!(error = %e, "frame loop not started");
            }
        }

        debug!("web backdrop mounted");
        Some(WebBackdrop {
            window,
            layers,
            scheduler,
            frame_callback,
            on_resize,
            on_mousemove,
            on_scroll,
        })
    }

    /// Remove listeners, cancel the pending frame and release all state.
    pub fn unmount(self) {
        let WebBackdrop {
            window,
            layers,
            scheduler,
            frame_callback,
            on_resize,
            on_mousemove,
            on_scroll,
        } = self;

        let _ = window.remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
        let _ = window.remove_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        let _ = window.remove_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref());
        drop((on_resize, on_mousemove, on_scroll));

        scheduler.borrow_mut().stop();
        // breaks the callback -> scheduler -> clock -> callback cycle
        frame_callback.borrow_mut().take();

        match Rc::try_unwrap(layers) {
            Ok(layers) => layers.into_inner().backdrop.unmount(),
            Err(_) => warn!("backdrop state still shared at unmount"),
        }
    }
}
