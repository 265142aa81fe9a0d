//! Benchmark inputs for the heavy-ion event pipeline.
//!
//! - [`gaussian_ic`]: a smooth central initial condition on a [`GridSpec`]
//! - [`ring_surface`]: a synthetic freeze-out surface with radial flow
//! - [`random_final_particles`]: a seeded final particle list

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::f64::consts::TAU;

use hic_core::{
    FinalParticle, FreezeOutSurface, Grid2, GridSpec, InitialConditionGrid, SurfaceElement,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Benchmark grid: 61×61 cells of 0.2 fm.
pub fn bench_grid() -> GridSpec {
    GridSpec::new(0.2, 6.0)
}

/// A Gaussian blob of width `width` fm and peak `peak`.
pub fn gaussian_ic(grid: &GridSpec, peak: f64, width: f64) -> InitialConditionGrid {
    let n = grid.cells();
    let mut density = Grid2::zeros(n, n);
    for r in 0..n {
        let y = grid.center(r);
        for c in 0..n {
            let x = grid.center(c);
            *density.get_mut(r, c) = peak * (-(x * x + y * y) / (2.0 * width * width)).exp();
        }
    }
    let mult = density.sum() * grid.cell_area();
    InitialConditionGrid::with_multiplicity(density, mult)
}

/// `n` surface cells on a ring of radius 5 fm, flowing outward at 0.6c.
pub fn ring_surface(n: usize) -> FreezeOutSurface {
    let elements = (0..n)
        .map(|i| {
            let phi = TAU * i as f64 / n as f64;
            let (s, c) = phi.sin_cos();
            SurfaceElement {
                tau: 8.0,
                x: [5.0 * c, 5.0 * s],
                sigma: [0.5, -0.1 * c, -0.1 * s],
                v: [0.6 * c, 0.6 * s],
                ..Default::default()
            }
        })
        .collect();
    FreezeOutSurface::new(elements)
}

/// `n` final particles with a v₂-like azimuthal modulation.
pub fn random_final_particles(n: usize, seed: u64) -> Vec<FinalParticle> {
    const IDS: [(i32, i32); 6] = [(211, 1), (-211, -1), (111, 0), (321, 1), (-321, -1), (2212, 1)];
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let (id, charge) = IDS[rng.random_range(0..IDS.len())];
            let phi = loop {
                let phi = rng.random::<f64>() * TAU;
                if rng.random::<f64>() < 0.5 * (1.0 + 0.2 * (2.0 * phi).cos()) / 0.6 {
                    break phi;
                }
            };
            let eta = 4.0 * (rng.random::<f64>() - 0.5);
            FinalParticle {
                id,
                charge,
                pt: -0.5 * rng.random::<f64>().max(f64::MIN_POSITIVE).ln(),
                phi,
                y: 0.9 * eta,
                eta,
            }
        })
        .collect()
}
