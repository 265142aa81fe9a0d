//! Pipeline stages that wrap the external physics programs.
//!
//! Each external program is invoked through [`process::Invocation`]; data
//! crosses the process boundary only through the hand-off files named in
//! [`handoff`]. Free streaming is the one pre-hydro transform done
//! in-process.
//!
//! | Stage | Type | External program |
//! |-------|------|------------------|
//! | Initial conditions | [`TrentoSource`] | `trento` |
//! | Pre-equilibrium | [`PreEquilibrium`] | none ([`FreeStreamer`]) |
//! | Hydrodynamics | [`OsuHydro`] | `osu-hydro` |
//! | Afterburner | [`UrqmdAfterburner`] | `afterburner` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod afterburner;
pub mod freestream;
pub mod handoff;
pub mod hydro;
pub mod initial;
pub mod process;
pub mod transport;

pub use afterburner::UrqmdAfterburner;
pub use freestream::FreeStreamer;
pub use hydro::OsuHydro;
pub use initial::{IcBatch, IcStream, TrentoSource, DEFAULT_BATCH_SIZE};
pub use process::Invocation;
pub use transport::PreEquilibrium;
