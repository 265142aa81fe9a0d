//! Run orchestration for the heavy-ion event pipeline.
//!
//! - [`RunConfig`]: validated run options; [`rank`] namespaces paths per instance.
//! - [`Pipeline`]: one event, initial condition to record.
//! - [`EventLoop`]: failure isolation, the abort threshold, cancellation
//!   and record output.
//! - [`run()`]: wires a config to the external programs and runs it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cancel;
pub mod checkpoint;
pub mod config;
pub mod driver;
pub mod event;
pub mod rank;
mod run;

pub use cancel::CancelToken;
pub use checkpoint::Checkpoint;
pub use config::{AbortPolicy, ConfigError, ProgramNames, RunConfig};
pub use driver::{EventLoop, LoopState, RunError, RunSummary, StopReason};
pub use event::{EarlyEnd, EventOutcome, Pipeline};
pub use run::run;
