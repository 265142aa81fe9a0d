//! Test fakes for the stage seams of the event pipeline.
//!
//! Each type here implements one of the `hic-core` traits in-process so
//! driver tests run without the external programs:
//!
//! - [`FixedCountModel`]: a thermal model with a fixed batch size.
//! - [`MockHydro`]: returns a canned surface and can fail on chosen calls.
//! - [`PassThroughAfterburner`] / [`FailingAfterburner`]: afterburner stand-ins.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    blob_ic, single_cell_surface, uniform_ic, FailingAfterburner, FixedCountModel, MockHydro,
    PassThroughAfterburner,
};
