//! Native desktop viewer.
//!
//! Hosts a [`Backdrop`] in a winit window: the three layers are painted on
//! the CPU into [`Framebuffer`]s and composited by the GPU. The mouse wheel
//! scrolls a virtual page, and the configured hotspots stand in for links.
//!
//! | Key    | Action                               |
//! |--------|--------------------------------------|
//! | Space  | pause / resume the frame loop        |
//! | S      | save the three layers as PNG files   |
//! | Escape | quit                                 |

use crate::config::EffectsConfig;
use crate::error::ViewerError;
use crate::gpu::{Compositor, Layer};
use crate::input::{Input, InputChange, KeyCode};
use crate::raster::Framebuffer;
use crate::scene::{Backdrop, Capabilities};
use crate::scheduler::{FrameClock, FrameInfo, FrameScheduler};
use crate::spawn::clock_seeded_rng;
use crate::surface::Viewport;
use crate::time::Time;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Frame clock backed by `Window::request_redraw`.
///
/// winit coalesces redraw requests and offers no way to withdraw one, so
/// cancellation relies on [`FrameScheduler::fire`] ignoring stale callbacks.
#[derive(Debug)]
pub struct RedrawClock {
    window: Arc<Window>,
    requests: u64,
}

impl RedrawClock {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            requests: 0,
        }
    }
}

impl FrameClock for RedrawClock {
    type Handle = u64;

    fn request_frame(&mut self) -> u64 {
        self.window.request_redraw();
        self.requests += 1;
        self.requests
    }

    fn cancel_frame(&mut self, _handle: u64) {}
}

/// Simulation state shared between the app and the scheduler's tick.
struct Stage {
    backdrop: Backdrop,
    depth: Framebuffer,
    background: Framebuffer,
    trail: Framebuffer,
}

impl Stage {
    fn new(backdrop: Backdrop, size: PhysicalSize<u32>) -> Self {
        Self {
            backdrop,
            depth: Framebuffer::new(size.width, size.height),
            background: Framebuffer::new(size.width, size.height),
            trail: Framebuffer::new(size.width, size.height),
        }
    }

    fn tick(&mut self, frame: FrameInfo) {
        self.backdrop.tick(frame);
        self.backdrop.render_depth(&mut self.depth);
        self.backdrop.render_background(&mut self.background);
        self.backdrop.render_trail(&mut self.trail);
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.backdrop.resize(viewport_of(size));
        self.depth.resize(size.width, size.height);
        self.background.resize(size.width, size.height);
        self.trail.resize(size.width, size.height);
    }

    fn save_snapshots(&self, dir: &str, frame: u64) {
        let layers = [
            ("depth", &self.depth),
            ("background", &self.background),
            ("trail", &self.trail),
        ];
        for (name, framebuffer) in layers {
            let path = PathBuf::from(dir).join(format!("backdrop-{frame:06}-{name}.png"));
            match framebuffer.save_png(&path) {
                Ok(()) => info!(path = %path.display(), "snapshot saved"),
                Err(e) => warn!(path = %path.display(), error = %e, "snapshot failed"),
            }
        }
    }
}

fn viewport_of(size: PhysicalSize<u32>) -> Viewport {
    Viewport::new(size.width as f32, size.height as f32)
}

fn start_loop(scheduler: &mut FrameScheduler<RedrawClock>, stage: &Rc<RefCell<Stage>>) {
    let stage = Rc::clone(stage);
    if let Err(e) = scheduler.start(move |frame| stage.borrow_mut().tick(frame)) {
        warn!(error = %e, "frame loop not restarted");
    }
}

pub struct App {
    config: EffectsConfig,
    seed: Option<u64>,
    touch: bool,
    window: Option<Arc<Window>>,
    compositor: Option<Compositor>,
    stage: Option<Rc<RefCell<Stage>>>,
    scheduler: Option<FrameScheduler<RedrawClock>>,
    input: Input,
    time: Time,
    failure: Option<ViewerError>,
}

impl App {
    pub fn new(config: EffectsConfig, seed: Option<u64>, touch: bool) -> Self {
        let input = Input::new(
            config.viewer.page_height,
            config.viewer.scroll_line,
            config.viewer.hotspots.clone(),
        );
        Self {
            config,
            seed,
            touch,
            window: None,
            compositor: None,
            stage: None,
            scheduler: None,
            input,
            time: Time::new(),
            failure: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let viewer = &self.config.viewer;
        let attrs = Window::default_attributes()
            .with_title(viewer.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(viewer.width, viewer.height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let compositor = pollster::block_on(Compositor::new(
            Arc::clone(&window),
            viewer.clear_color,
            self.config.background.opacity,
        ))?;

        let size = window.inner_size();
        let rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => clock_seeded_rng(),
        };
        let backdrop = Backdrop::mount(
            self.config.clone(),
            viewport_of(size),
            Capabilities { touch: self.touch },
            rng,
        );
        self.input.set_viewport(viewport_of(size));

        let stage = Rc::new(RefCell::new(Stage::new(backdrop, size)));
        let mut scheduler = FrameScheduler::new(RedrawClock::new(Arc::clone(&window)));
        start_loop(&mut scheduler, &stage);

        self.window = Some(window);
        self.compositor = Some(compositor);
        self.stage = Some(stage);
        self.scheduler = Some(scheduler);
        Ok(())
    }

    fn toggle_pause(&mut self) {
        let (Some(scheduler), Some(stage)) = (self.scheduler.as_mut(), self.stage.as_ref()) else {
            return;
        };
        if scheduler.is_running() {
            scheduler.stop();
            self.time.pause();
            info!(frame = scheduler.frame(), "paused");
        } else {
            self.time.resume();
            start_loop(scheduler, stage);
            info!(frame = scheduler.frame(), "resumed");
        }
    }

    fn handle_keys(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
        }
        if self.input.key_pressed(KeyCode::Space) {
            self.toggle_pause();
        }
        if self.input.key_pressed(KeyCode::S) {
            if let (Some(stage), Some(scheduler)) = (&self.stage, &self.scheduler) {
                stage
                    .borrow()
                    .save_snapshots(&self.config.viewer.snapshot_dir, scheduler.frame());
            }
        }
        self.input.begin_frame();
    }

    fn apply_scroll(&mut self, scroll_y: f32) {
        let Some(stage) = &self.stage else {
            return;
        };
        let first = stage.borrow_mut().backdrop.scrolled(scroll_y);
        let paused = !self.scheduler.as_ref().is_some_and(|s| s.is_running());
        // a paused loop still shows where the page is, one frame per burst
        if first && paused {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now_ms = self.time.update();
        let (Some(stage), Some(scheduler), Some(compositor)) =
            (&self.stage, self.scheduler.as_mut(), self.compositor.as_mut())
        else {
            return;
        };

        if !scheduler.fire(now_ms) {
            let mut stage = stage.borrow_mut();
            let stage = &mut *stage;
            stage.backdrop.apply_input();
            stage.backdrop.render_depth(&mut stage.depth);
        }

        {
            let stage = stage.borrow();
            compositor.upload(Layer::Depth, &stage.depth);
            compositor.upload(Layer::Background, &stage.background);
            compositor.upload(Layer::Trail, &stage.trail);
        }

        match compositor.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = compositor.size();
                compositor.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => warn!(error = ?e, "frame dropped"),
        }

        if scheduler.frame() % 30 == 0 {
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "{} - {:.0} fps",
                    self.config.viewer.title,
                    self.time.fps()
                ));
            }
        }
    }

    /// The error that ended the event loop, if any.
    pub fn take_failure(&mut self) -> Option<ViewerError> {
        self.failure.take()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            error!(error = %e, "viewer failed to start");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                if let Some(compositor) = &mut self.compositor {
                    compositor.resize(size.width, size.height);
                }
                if let Some(stage) = &self.stage {
                    stage.borrow_mut().resize(*size);
                }
                if let Some(scroll_y) = self.input.set_viewport(viewport_of(*size)) {
                    self.apply_scroll(scroll_y);
                }
                return;
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                return;
            }
            _ => {}
        }

        match self.input.handle_event(&event) {
            Some(InputChange::Pointer { position, hovering }) => {
                if let Some(stage) = &self.stage {
                    stage.borrow_mut().backdrop.pointer_moved(position, hovering);
                }
            }
            Some(InputChange::Scroll(scroll_y)) => self.apply_scroll(scroll_y),
            None => {}
        }
        self.handle_keys(event_loop);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
        if let Some(stage) = self.stage.take() {
            match Rc::try_unwrap(stage) {
                Ok(stage) => stage.into_inner().backdrop.unmount(),
                Err(_) => warn!("backdrop still shared at exit"),
            }
        }
    }
}

/// Open the viewer window and run until it is closed.
pub fn run(config: EffectsConfig, seed: Option<u64>, touch: bool) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, seed, touch);
    event_loop.run_app(&mut app)?;

    match app.take_failure() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
