//! Traits at the stage seams.
//!
//! The driver only talks to the hydrodynamic solver, the afterburner and the
//! thermal model through these traits, so tests can substitute in-process
//! fakes for the external programs.

use std::path::Path;

use crate::error::EventError;
use crate::particle::SampledParticle;
use crate::surface::FreezeOutSurface;

/// Which pre-equilibrium hand-off the hydro stage should read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HandoffKind {
    /// Free-streamed energy density, flow and shear files, switching at `tau`.
    FreeStreamed {
        /// Free-streaming (switching) proper time in fm/c.
        tau: f64,
    },
    /// Raw initial density written as the entropy-density file.
    Raw,
}

/// What the pre-equilibrium stage left in the event directory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Handoff {
    /// Format of the hand-off files.
    pub kind: HandoffKind,
    /// Energy renormalization factor; exactly 1.0 for [`HandoffKind::Raw`].
    pub mult_factor: f64,
}

/// The hydrodynamic evolution stage.
pub trait HydroStage {
    /// Evolve the hand-off files in `workdir` and return the freeze-out surface.
    ///
    /// An empty surface is a successful result.
    fn evolve(&self, handoff: &Handoff, workdir: &Path) -> Result<FreezeOutSurface, EventError>;
}

/// The hadronic afterburner stage.
pub trait Afterburner {
    /// Transport the particle list at `input` and write the final list to `output`.
    fn run(&self, input: &Path, output: &Path, workdir: &Path) -> Result<(), EventError>;
}

/// An equilibrium thermal model that particles are sampled from.
///
/// Built once per run and shared read-only by every event.
pub trait ThermalModel {
    /// Energy density at the switching temperature in GeV/fm³.
    fn energy_density(&self) -> f64;

    /// Draw one batch of particles from `surface`.
    ///
    /// `stream` identifies the draw: the same `(surface, stream)` pair must
    /// produce the same batch, distinct streams independent batches.
    fn sample(&self, surface: &FreezeOutSurface, stream: u64) -> Vec<SampledParticle>;
}
