//! # folio - interactive layer of a portfolio page
//!
//! A particle backdrop, scroll-triggered counters, scroll-spy navigation and a
//! keyword-matched "assistant" widget, written against small platform traits so
//! the same components run in the browser (wasm32) and in a native preview.
//!
//! ## Quick Start
//!
//! ```ignore
//! use folio::prelude::*;
//!
//! let config = FolioConfig::default();
//! let mut backdrop = Backdrop::new(&config, Viewport::new(1280.0, 720.0));
//! let mut surface = PixelSurface::new(1280, 720);
//! let mut frames = ManualScheduler::default();
//!
//! backdrop.start(&mut frames);
//! let handle = frames.fire_next().unwrap();
//! backdrop.on_frame(handle, 16.0, &mut frames, &mut surface);
//! ```
//!
//! ## Components
//!
//! | Component | Type |
//! |-----------|------|
//! | Particle simulation | [`ParticleSimulation`] |
//! | Proximity renderer | [`ProximityRenderer`] |
//! | Animation driver | [`AnimationDriver`] |
//! | Resize handling | [`ResizeHandler`] |
//! | Counters | [`CounterBoard`] |
//! | Assistant | [`KeywordResponder`], [`AssistantWidget`] |
//! | Scroll-spy | [`ScrollSpy`] |
//!
//! [`Portfolio`] is the composition root that owns one of each.

pub mod app;
pub mod backdrop;
pub mod config;
pub mod counter;
pub mod debounce;
pub mod driver;
mod error;
pub mod input;
pub mod particle;
pub mod raster;
pub mod render;
pub mod responder;
pub mod scroll_spy;
pub mod shader;
pub mod simulation;
mod spawn;
pub mod surface;
pub mod theme;
pub mod time;
pub mod viewport;

#[cfg(feature = "preview")]
pub mod gpu;
#[cfg(feature = "preview")]
pub mod window;

#[cfg(target_arch = "wasm32")]
mod web;

pub use app::{Page, Portfolio};
pub use backdrop::Backdrop;
pub use config::FolioConfig;
pub use counter::{CounterAnimation, CounterBoard};
pub use debounce::{Debouncer, Throttle};
pub use driver::{AnimationDriver, FrameHandle, FrameScheduler, ManualScheduler};
pub use error::FolioError;
pub use glam::Vec2;
pub use input::PointerTracker;
pub use particle::{Connection, Particle, ParticleColor, ParticleSet};
pub use raster::PixelSurface;
pub use render::{connection_opacity, ProximityRenderer};
pub use responder::{
    AssistantView, AssistantWidget, CannedResponse, KeywordResponder, ResponseTable, Submission,
};
pub use scroll_spy::ScrollSpy;
pub use simulation::ParticleSimulation;
pub use surface::{CommandRecorder, DrawCommand, Rgb, Surface};
pub use theme::{Theme, ThemeManager};
pub use time::{Clock, FrameTime, ManualClock, SystemClock};
pub use viewport::{ResizeHandler, Viewport};

/// Install a `tracing` subscriber honoring `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use folio::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::{Page, Portfolio};
    pub use crate::backdrop::Backdrop;
    pub use crate::config::{
        ConnectionMode, FolioConfig, FrameClear, ParticleConfig, PointerMode,
    };
    pub use crate::counter::{CounterBoard, CounterDisplay};
    pub use crate::driver::{AnimationDriver, FrameHandle, FrameScheduler, ManualScheduler};
    pub use crate::error::FolioError;
    pub use crate::input::PointerTracker;
    pub use crate::particle::{Particle, ParticleColor, ParticleSet};
    pub use crate::raster::PixelSurface;
    pub use crate::render::ProximityRenderer;
    pub use crate::responder::{AssistantView, AssistantWidget, KeywordResponder};
    pub use crate::scroll_spy::ScrollSpy;
    pub use crate::simulation::ParticleSimulation;
    pub use crate::surface::{Rgb, Surface};
    pub use crate::time::{Clock, ManualClock};
    pub use crate::viewport::Viewport;
    pub use crate::Vec2;
}
