//! Stage fakes and small data builders.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use hic_core::{
    Afterburner, EventError, FinalParticle, FreezeOutSurface, Grid2, GridSpec, Handoff,
    HydroStage, InitialConditionGrid, SampledParticle, StageFailure, SurfaceElement, ThermalModel,
};
use hic_obs::write_final_particles;
use hic_sampler::{hadron_table, read_blocks};

/// Charged pion mass, used when an id is missing from the hadron table.
const FALLBACK_MASS: f64 = 0.139_57;

// ── Thermal model ──────────────────────────────────────────────────

/// Returns `per_round` identical particles for every stream.
///
/// Each particle is a π⁺ at the origin with `p = (pt, 0, 0)`, so it lands
/// at mid-rapidity inside every default acceptance window.
pub struct FixedCountModel {
    pub per_round: usize,
    pub pt: f64,
    pub energy_density: f64,
}

impl FixedCountModel {
    pub fn new(per_round: usize) -> Self {
        Self {
            per_round,
            pt: 0.5,
            energy_density: 0.3,
        }
    }
}

impl ThermalModel for FixedCountModel {
    fn energy_density(&self) -> f64 {
        self.energy_density
    }

    fn sample(&self, _surface: &FreezeOutSurface, _stream: u64) -> Vec<SampledParticle> {
        vec![
            SampledParticle {
                id: 211,
                x: [0.0; 3],
                p: [self.pt, 0.0, 0.0],
            };
            self.per_round
        ]
    }
}

// ── Hydro ──────────────────────────────────────────────────────────

/// Returns a fixed surface without reading the hand-off files.
///
/// Calls are counted from zero; calls listed in `fail_on` fail with a
/// non-zero exit instead.
pub struct MockHydro {
    surface: FreezeOutSurface,
    fail_on: BTreeSet<usize>,
    calls: Cell<usize>,
}

impl MockHydro {
    pub fn new(surface: FreezeOutSurface) -> Self {
        Self {
            surface,
            fail_on: BTreeSet::new(),
            calls: Cell::new(0),
        }
    }

    /// A hydro stage whose events never freeze out.
    pub fn empty() -> Self {
        Self::new(FreezeOutSurface::default())
    }

    /// Fail on the given call indices.
    pub fn failing_on(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.fail_on.extend(calls);
        self
    }

    /// Number of times [`HydroStage::evolve`] has been called.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl HydroStage for MockHydro {
    fn evolve(&self, _handoff: &Handoff, _workdir: &Path) -> Result<FreezeOutSurface, EventError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if self.fail_on.contains(&call) {
            return Err(StageFailure {
                program: "mock-hydro".into(),
                args: Vec::new(),
                exit_code: Some(1),
                output: format!("failing call {call}"),
            }
            .into());
        }
        Ok(self.surface.clone())
    }
}

// ── Afterburner ────────────────────────────────────────────────────

/// Converts the sampled particles straight into a final list.
pub struct PassThroughAfterburner;

impl Afterburner for PassThroughAfterburner {
    fn run(&self, input: &Path, output: &Path, _workdir: &Path) -> Result<(), EventError> {
        let table = hadron_table();
        let finals: Vec<FinalParticle> = read_blocks(input)?
            .into_iter()
            .flatten()
            .map(|p| {
                let species = table.get(&p.id);
                let mass = species.map_or(FALLBACK_MASS, |s| s.mass);
                let charge = species.map_or(0, |s| s.charge);
                finalize(&p, mass, charge)
            })
            .collect();
        let mut out = BufWriter::new(File::create(output)?);
        write_final_particles(&mut out, &finals)?;
        out.flush()?;
        Ok(())
    }
}

fn finalize(p: &SampledParticle, mass: f64, charge: i32) -> FinalParticle {
    let [px, py, pz] = p.p;
    let pt = px.hypot(py);
    let e = (mass * mass + pt * pt + pz * pz).sqrt();
    FinalParticle {
        id: p.id,
        charge,
        pt,
        phi: py.atan2(px),
        y: 0.5 * ((e + pz) / (e - pz)).ln(),
        eta: if pt > 0.0 { (pz / pt).asinh() } else { 0.0 },
    }
}

/// Always exits non-zero.
pub struct FailingAfterburner;

impl Afterburner for FailingAfterburner {
    fn run(&self, _input: &Path, _output: &Path, _workdir: &Path) -> Result<(), EventError> {
        Err(StageFailure {
            program: "failing-afterburner".into(),
            args: Vec::new(),
            exit_code: Some(2),
            output: String::new(),
        }
        .into())
    }
}

// ── Data builders ──────────────────────────────────────────────────

/// A grid filled with `value`, multiplicity set to its sum.
pub fn uniform_ic(grid: &GridSpec, value: f64) -> InitialConditionGrid {
    let n = grid.cells();
    let density = Grid2::from_vec(n, n, vec![value; n * n]).unwrap_or_else(|| Grid2::zeros(n, n));
    let mult = density.sum() * grid.cell_area();
    InitialConditionGrid::with_multiplicity(density, mult)
}

/// A centred square of `value` covering the middle half of the grid.
pub fn blob_ic(grid: &GridSpec, value: f64) -> InitialConditionGrid {
    let n = grid.cells();
    let mut density = Grid2::zeros(n, n);
    for r in n / 4..n - n / 4 {
        for c in n / 4..n - n / 4 {
            *density.get_mut(r, c) = value;
        }
    }
    let mult = density.sum() * grid.cell_area();
    InitialConditionGrid::with_multiplicity(density, mult)
}

/// One static cell of volume `volume` fm³ at `tau = 1`.
pub fn single_cell_surface(volume: f64) -> FreezeOutSurface {
    FreezeOutSurface::new(vec![SurfaceElement {
        tau: 1.0,
        sigma: [volume, 0.0, 0.0],
        ..Default::default()
    }])
}
