//! The fixed-layout per-event output record.
//!
//! Every event, whether it produced particles or not, yields exactly one
//! [`EventRecord`] of [`RECORD_SIZE`] bytes once encoded. Events that end
//! early (empty surface, zero sampled particles) emit
//! [`EventRecord::zeroed()`].

use num_complex::Complex64;

/// Number of identified species (pion, kaon, proton).
pub const NUM_SPECIES: usize = 3;

/// Number of flow harmonics, `n = 1..=6`.
pub const NUM_HARMONICS: usize = 6;

/// Encoded size of one record in bytes.
///
/// 4 scalars + 2 × species arrays + `M` at 8 bytes each, plus 16 bytes per
/// complex flow vector.
pub const RECORD_SIZE: usize = 8 * (4 + 2 * NUM_SPECIES + 1) + 16 * NUM_HARMONICS;

/// Observables for one event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EventRecord {
    /// Total multiplicity of the initial condition.
    pub initial_entropy: f64,
    /// Pre-equilibrium energy renormalization factor (1.0 if unused).
    pub mult_factor: f64,
    /// Number of sampling rounds performed.
    pub nsamples: i64,
    /// Charged-particle density at mid-pseudorapidity.
    pub dnch_deta: f64,
    /// Identified yield densities at mid-rapidity, in [`crate::Species::ALL`] order.
    pub dn_dy: [f64; NUM_SPECIES],
    /// Identified mean transverse momenta, in [`crate::Species::ALL`] order.
    pub mean_pt: [f64; NUM_SPECIES],
    /// Multiplicity inside the flow acceptance window.
    pub m: i64,
    /// Flow vectors `Q_n`, `n = 1..=6`.
    pub qn: [Complex64; NUM_HARMONICS],
}

impl EventRecord {
    /// The all-zero record emitted for events that end early.
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// `true` if every field is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::zeroed()
    }
}
