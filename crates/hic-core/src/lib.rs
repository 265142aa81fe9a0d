//! Core types and traits for the heavy-ion event pipeline.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! data model that flows between pipeline stages (initial-condition grids,
//! freeze-out surfaces, particles, the fixed-layout [`EventRecord`]), the
//! error taxonomy, and the traits at the external-stage seams.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod particle;
pub mod record;
pub mod surface;
pub mod traits;

pub use error::{EventError, EventFailure, Stage, StageFailure};
pub use grid::{FreestreamedFields, Grid2, GridSpec, InitialConditionGrid};
pub use particle::{FinalParticle, SampledParticle, Species};
pub use record::{EventRecord, NUM_HARMONICS, NUM_SPECIES, RECORD_SIZE};
pub use surface::{FreezeOutSurface, ShearStress, SurfaceElement, SURFACE_COLUMNS};
pub use traits::{Afterburner, Handoff, HandoffKind, HydroStage, ThermalModel};
