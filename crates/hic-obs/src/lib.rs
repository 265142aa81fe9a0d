//! Observable reduction.
//!
//! [`read_final_particles`] parses the afterburner's output;
//! [`reduce`] folds it into the per-event [`Observables`] that fill an
//! [`EventRecord`](hic_core::EventRecord).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod particles;
pub mod reduce;

pub use particles::{parse_final_particles, read_final_particles, write_final_particles};
pub use reduce::{reduce, Acceptance, Observables};
