//! Benchmarks for the CPU-side backdrop.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use folio::prelude::*;
use folio::{CommandRecorder, ResponseTable};

fn simulation(max_count: usize, viewport: Viewport) -> ParticleSimulation {
    let mut config = ParticleConfig::default();
    config.area_per_particle = 1.0;
    config.max_count = max_count;
    let mut sim = ParticleSimulation::new(config, ConnectionMode::AllPairs).with_seed(1);
    sim.initialize(viewport);
    sim
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");
    let viewport = Viewport::new(1920.0, 1080.0);

    for count in [25, 100, 400] {
        let mut sim = simulation(count, viewport);
        let pointer = Some(Vec2::new(960.0, 540.0));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| sim.step(viewport, black_box(pointer)))
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let viewport = Viewport::new(1920.0, 1080.0);
    let config = FolioConfig::default();

    for count in [25, 100, 400] {
        let sim = simulation(count, viewport);
        let renderer = ProximityRenderer::new(&config.connections, &config.particles);

        group.bench_with_input(BenchmarkId::new("recorder", count), &count, |b, _| {
            let mut surface = CommandRecorder::new(1920, 1080);
            b.iter(|| {
                surface.commands.clear();
                renderer.render(&mut surface, black_box(sim.particles()));
            })
        });
    }

    let sim = simulation(100, viewport);
    let renderer = ProximityRenderer::new(&config.connections, &config.particles);
    group.bench_function("pixels_100", |b| {
        let mut surface = PixelSurface::new(1920, 1080);
        b.iter(|| {
            surface.clear();
            renderer.render(&mut surface, black_box(sim.particles()));
        })
    });

    group.finish();
}

fn bench_responder(c: &mut Criterion) {
    let responder = KeywordResponder::new(ResponseTable::builtin()).expect("builtin table");
    c.bench_function("respond", |b| {
        b.iter(|| {
            black_box(responder.respond(black_box(
                "Tell me about your research experience and the skills your team uses",
            )))
        })
    });
}

criterion_group!(benches, bench_step, bench_render, bench_responder);
criterion_main!(benches);
