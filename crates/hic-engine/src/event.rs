//! One event through the pipeline.
//!
//! ```text
//! INIT → TRANSPORT → HYDRO → SAMPLE ─┬─ AFTERBURN → REDUCE → EMIT
//!                      │             │
//!                      └─ empty ─────┴─ zero particles → EARLY_END → EMIT
//! ```
//!
//! Every stage reads and writes inside the event's scratch directory. An
//! error in any state becomes an [`EventFailure`] tagged with that state;
//! the two early ends are successful outcomes carrying an all-zero record.

use std::path::Path;

use hic_core::{
    Afterburner, EventFailure, EventRecord, HydroStage, InitialConditionGrid, Stage, ThermalModel,
};
use hic_obs::{read_final_particles, reduce, Acceptance};
use hic_sampler::{sample_surface, SamplingPolicy};
use hic_stages::handoff::{PARTICLES_IN_FILE, PARTICLES_OUT_FILE};
use hic_stages::PreEquilibrium;
use tracing::{debug, info};

/// Why an event ended without running the afterburner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EarlyEnd {
    /// The hydro stage produced no freeze-out surface.
    EmptySurface,
    /// Every sampling round came back empty.
    ZeroParticles,
}

/// How an event that did not fail ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventOutcome {
    /// Full pipeline; the reduced record.
    Completed(EventRecord),
    /// Legal early end; the record is all zero.
    EarlyEnd(EarlyEnd),
}

impl EventOutcome {
    /// The record to emit.
    pub fn record(&self) -> EventRecord {
        match self {
            Self::Completed(record) => *record,
            Self::EarlyEnd(_) => EventRecord::zeroed(),
        }
    }
}

/// The per-event stages, borrowed from the run.
pub struct Pipeline<'a> {
    pre: PreEquilibrium,
    hydro: &'a dyn HydroStage,
    model: &'a dyn ThermalModel,
    afterburner: &'a dyn Afterburner,
    sampling: SamplingPolicy,
    acceptance: Acceptance,
    e_switch: f64,
}

impl<'a> Pipeline<'a> {
    /// Assemble a pipeline. The switching energy density is taken from
    /// `model` once, here.
    pub fn new(
        pre: PreEquilibrium,
        hydro: &'a dyn HydroStage,
        model: &'a dyn ThermalModel,
        afterburner: &'a dyn Afterburner,
    ) -> Self {
        Self {
            pre,
            hydro,
            model,
            afterburner,
            sampling: SamplingPolicy::default(),
            acceptance: Acceptance::default(),
            e_switch: model.energy_density(),
        }
    }

    /// Replace the sampling stop rule.
    pub fn with_sampling(mut self, sampling: SamplingPolicy) -> Self {
        self.sampling = sampling;
        self
    }

    /// Replace the observable cuts.
    pub fn with_acceptance(mut self, acceptance: Acceptance) -> Self {
        self.acceptance = acceptance;
        self
    }

    /// Run event `index` on `ic` inside `workdir`.
    pub fn run_event(
        &self,
        index: u64,
        ic: &InitialConditionGrid,
        workdir: &Path,
    ) -> Result<EventOutcome, EventFailure> {
        let initial_entropy = ic.multiplicity();
        info!("event {index}: initial entropy {initial_entropy}");

        let handoff = self
            .pre
            .run(ic, self.e_switch, workdir)
            .map_err(|e| EventFailure::new(Stage::Transport, e))?;

        let surface = self
            .hydro
            .evolve(&handoff, workdir)
            .map_err(|e| EventFailure::new(Stage::Hydro, e))?;
        if surface.is_empty() {
            info!("event {index}: empty freeze-out surface");
            return Ok(EventOutcome::EarlyEnd(EarlyEnd::EmptySurface));
        }

        let particles_in = workdir.join(PARTICLES_IN_FILE);
        let sampled = sample_surface(self.model, &surface, &self.sampling, index, &particles_in)
            .map_err(|e| EventFailure::new(Stage::Sample, e))?;
        if sampled.particles == 0 {
            info!("event {index}: no particles in {} rounds", sampled.rounds);
            return Ok(EventOutcome::EarlyEnd(EarlyEnd::ZeroParticles));
        }

        let particles_out = workdir.join(PARTICLES_OUT_FILE);
        self.afterburner
            .run(&particles_in, &particles_out, workdir)
            .map_err(|e| EventFailure::new(Stage::Afterburn, e))?;

        let finals = read_final_particles(&particles_out)
            .map_err(|e| EventFailure::new(Stage::Reduce, e))?;
        debug!("event {index}: {} final particles", finals.len());
        let record = reduce(&finals, sampled.rounds, &self.acceptance).into_record(
            initial_entropy,
            handoff.mult_factor,
            sampled.rounds,
        );
        Ok(EventOutcome::Completed(record))
    }
}
