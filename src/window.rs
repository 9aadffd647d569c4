//! Native preview window.
//!
//! Runs the backdrop in a winit window: cursor events drive the pointer,
//! resizes go through the debounce, and occlusion stands in for page
//! visibility.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::backdrop::Backdrop;
use crate::config::FolioConfig;
use crate::driver::ManualScheduler;
use crate::gpu::{Presenter, PreviewError};
use crate::raster::PixelSurface;
use crate::time::{Clock, SystemClock};
use crate::viewport::Viewport;

const TITLE: &str = "folio preview";
/// How often the title's fps readout refreshes.
const TITLE_INTERVAL_MS: f64 = 500.0;

/// Open a window and run the backdrop until it is closed.
pub fn run(config: FolioConfig) -> Result<(), PreviewError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = PreviewApp::new(config);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct Running {
    window: Arc<Window>,
    presenter: Presenter,
    backdrop: Backdrop,
    pixels: PixelSurface,
}

pub struct PreviewApp {
    config: FolioConfig,
    clock: SystemClock,
    frames: ManualScheduler,
    running: Option<Running>,
    last_title_ms: f64,
    error: Option<PreviewError>,
}

impl PreviewApp {
    pub fn new(config: FolioConfig) -> Self {
        Self {
            config,
            clock: SystemClock::new(),
            frames: ManualScheduler::default(),
            running: None,
            last_title_ms: 0.0,
            error: None,
        }
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<Running, PreviewError> {
        let attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let presenter = pollster::block_on(Presenter::new(window.clone()))?;

        let size = window.inner_size();
        let viewport = Viewport::new(size.width as f32, size.height as f32);
        let backdrop = Backdrop::new(&self.config, viewport);
        let (w, h) = viewport.pixel_size();
        let mut pixels = PixelSurface::new(w, h);
        backdrop.attach(&mut pixels);

        Ok(Running {
            window,
            presenter,
            backdrop,
            pixels,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: PreviewError) {
        error!(%err, "preview failed");
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.clock.now_ms();
        let Some(running) = &mut self.running else {
            return;
        };
        let Some(handle) = self.frames.fire_next() else {
            return;
        };
        running
            .backdrop
            .on_frame(handle, now, &mut self.frames, &mut running.pixels);

        match running.presenter.present(&running.pixels) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = running.presenter.size();
                running.presenter.resize(w, h);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(err) => warn!(%err, "present failed"),
        }

        if now - self.last_title_ms >= TITLE_INTERVAL_MS {
            self.last_title_ms = now;
            let fps = running.backdrop.time().fps();
            running
                .window
                .set_title(&format!("{TITLE} - {fps:.0} fps"));
        }

        if self.frames.pending() > 0 {
            running.window.request_redraw();
        }
    }
}

impl ApplicationHandler for PreviewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.open(event_loop) {
            Ok(mut running) => {
                running.backdrop.start(&mut self.frames);
                running.window.request_redraw();
                info!("preview window opened");
                self.running = Some(running);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let now = self.clock.now_ms();
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            event => {
                let Some(running) = &mut self.running else {
                    return;
                };
                match event {
                    WindowEvent::Resized(size) => {
                        running.presenter.resize(size.width, size.height);
                        running.backdrop.resize_signal(
                            now,
                            Viewport::new(size.width as f32, size.height as f32),
                        );
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        running
                            .backdrop
                            .pointer_moved(Vec2::new(position.x as f32, position.y as f32), now);
                    }
                    WindowEvent::CursorLeft { .. } => running.backdrop.pointer_left(),
                    WindowEvent::Occluded(occluded) => {
                        running
                            .backdrop
                            .set_visible(!occluded, now, &mut self.frames);
                        if !occluded {
                            running.window.request_redraw();
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.clock.now_ms();
        let Some(running) = &mut self.running else {
            return;
        };
        if running.backdrop.poll_resize(now, &mut running.pixels) {
            running.window.request_redraw();
        }
        match running.backdrop.resize_deadline() {
            Some(deadline) => {
                let wait = Duration::from_secs_f64((deadline - now).max(0.0) / 1000.0);
                event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + wait));
            }
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
