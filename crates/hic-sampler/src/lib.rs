//! Thermal particle sampling off the freeze-out surface.
//!
//! [`HadronGas`] is the equilibrium reference model, built once per run at
//! the switching temperature and shared read-only by every event.
//! [`sample_surface`] draws rounds from any [`ThermalModel`] until a
//! [`SamplingPolicy`] is satisfied.
//!
//! [`ThermalModel`]: hic_core::ThermalModel

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod hrg;
pub mod sampler;
pub mod species;

pub use hrg::HadronGas;
pub use sampler::{
    read_blocks, sample_surface, stream_id, write_block, SamplingOutcome, SamplingPolicy,
};
pub use species::{hadron_table, HadronSpecies, Statistics};
