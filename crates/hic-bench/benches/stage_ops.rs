//! Criterion micro-benchmarks for the in-process physics stages.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use hic_bench::{bench_grid, gaussian_ic, ring_surface};
use hic_core::ThermalModel;
use hic_sampler::HadronGas;
use hic_stages::FreeStreamer;

/// Benchmark: free-stream a 61×61 grid to 0.5 fm/c and Landau-match it.
fn bench_freestream(c: &mut Criterion) {
    let grid = bench_grid();
    let ic = gaussian_ic(&grid, 50.0, 2.0);

    c.bench_function("freestream_61x61", |b| {
        b.iter(|| {
            let fs = FreeStreamer::new(ic.density(), &grid, 0.5);
            black_box(fs.fields());
        });
    });
}

/// Benchmark: build the hadron gas (species integrals).
fn bench_hrg_build(c: &mut Criterion) {
    c.bench_function("hrg_build", |b| {
        b.iter(|| black_box(HadronGas::new(black_box(0.150), 1)));
    });
}

/// Benchmark: one sampling round over a 200-cell surface.
fn bench_hrg_sample(c: &mut Criterion) {
    let gas = HadronGas::new(0.150, 1);
    let surface = ring_surface(200);
    let mut stream = 0u64;

    c.bench_function("hrg_sample_200_cells", |b| {
        b.iter(|| {
            stream += 1;
            black_box(gas.sample(&surface, stream));
        });
    });
}

criterion_group!(benches, bench_freestream, bench_hrg_build, bench_hrg_sample);
criterion_main!(benches);
