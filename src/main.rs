//! `folio-preview`: run the backdrop in a native window, or render a PNG.
//!
//! ```text
//! folio-preview [--config folio.json] [--snapshot out.png] [--size 1280x720] [--frames 120] [--seed 7]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use folio::gpu::PreviewError;
use folio::prelude::*;
use tracing::{error, info};

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    size: (f32, f32),
    frames: u32,
    seed: Option<u64>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: None,
            snapshot: None,
            size: (1280.0, 720.0),
            frames: 120,
            seed: None,
        }
    }
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        let mut value = || iter.next().ok_or_else(|| format!("{flag} needs a value"));
        match flag.as_str() {
            "--config" => args.config = Some(value()?.into()),
            "--snapshot" => args.snapshot = Some(value()?.into()),
            "--size" => {
                let raw = value()?;
                let (w, h) = raw
                    .split_once('x')
                    .and_then(|(w, h)| Some((w.parse::<f32>().ok()?, h.parse::<f32>().ok()?)))
                    .ok_or_else(|| format!("invalid size {raw:?}, expected WIDTHxHEIGHT"))?;
                args.size = (w, h);
            }
            "--frames" => {
                let raw = value()?;
                args.frames = raw.parse().map_err(|_| format!("invalid frame count {raw:?}"))?;
            }
            "--seed" => {
                let raw = value()?;
                args.seed = Some(raw.parse().map_err(|_| format!("invalid seed {raw:?}"))?);
            }
            other => return Err(format!("unknown argument {other:?}")),
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<FolioConfig, FolioError> {
    match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            let config = FolioConfig::from_json_str(&json)?;
            info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        None => Ok(FolioConfig::default()),
    }
}

/// Render `args.frames` frames at 60 Hz without a window and write the last one.
fn snapshot(config: &FolioConfig, args: &Args, path: &PathBuf) -> Result<(), FolioError> {
    let viewport = Viewport::new(args.size.0, args.size.1);
    let mut simulation = ParticleSimulation::new(config.particles.clone(), config.connections.mode);
    if let Some(seed) = args.seed {
        simulation = simulation.with_seed(seed);
    }
    let mut backdrop = Backdrop::with_simulation(config, viewport, simulation);
    let (w, h) = viewport.pixel_size();
    let mut pixels = PixelSurface::new(w, h);
    backdrop.attach(&mut pixels);

    let clock = ManualClock::new(0.0);
    let mut frames = ManualScheduler::default();
    backdrop.start(&mut frames);
    for _ in 0..args.frames {
        let Some(handle) = frames.fire_next() else {
            break;
        };
        clock.advance(1000.0 / 60.0);
        backdrop.on_frame(handle, clock.now_ms(), &mut frames, &mut pixels);
    }
    pixels.save_png(path)
}

fn run(args: Args) -> Result<(), PreviewError> {
    let config = load_config(&args)?;
    match &args.snapshot {
        Some(path) => Ok(snapshot(&config, &args, path)?),
        None => folio::window::run(config),
    }
}

fn main() -> ExitCode {
    folio::init_logging();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("folio-preview: {msg}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "folio-preview failed");
            ExitCode::FAILURE
        }
    }
}
