//! hic: a heavy-ion collision event pipeline.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! pipeline sub-crates, and ships the `run-events` command-line driver.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use hic::prelude::*;
//!
//! let mut config = RunConfig::new("results.dat", "Pb Pb --cross-section 7.0");
//! config.nevents = Some(10);
//! config.tau_fs = Some(0.5);
//! let summary = hic::engine::run(&config, CancelToken::new()).unwrap();
//! println!("{summary}");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `hic-core` | grids, surfaces, particles, `EventRecord`, errors, stage traits |
//! | [`io`] | `hic-io` | text tables and the binary record stream |
//! | [`stages`] | `hic-stages` | external-program adapters and free streaming |
//! | [`sampler`] | `hic-sampler` | hadron resonance gas and adaptive sampling |
//! | [`obs`] | `hic-obs` | final particle lists and observable reduction |
//! | [`engine`] | `hic-engine` | run configuration, event loop, cancellation |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Data model, error taxonomy and stage traits (`hic-core`).
pub use hic_core as types;

/// Tabular text codec and the fixed-layout record stream (`hic-io`).
///
/// Consumers of a results file want [`io::RecordReader`].
pub use hic_io as io;

/// External-program adapters and the pre-equilibrium stage (`hic-stages`).
pub use hic_stages as stages;

/// Hadron resonance gas and the adaptive sampling loop (`hic-sampler`).
pub use hic_sampler as sampler;

/// Final particle lists and observable reduction (`hic-obs`).
pub use hic_obs as obs;

/// Run configuration, the event loop and cancellation (`hic-engine`).
///
/// [`engine::run()`] is the whole pipeline behind one call.
pub use hic_engine as engine;

/// Common imports for driving a run.
pub mod prelude {
    pub use hic_core::{EventRecord, GridSpec, RECORD_SIZE};
    pub use hic_engine::{
        AbortPolicy, CancelToken, ConfigError, ProgramNames, RunConfig, RunError, RunSummary,
        StopReason,
    };
    pub use hic_io::{RecordReader, RecordWriter};
    pub use hic_obs::Acceptance;
    pub use hic_sampler::SamplingPolicy;
}
