//! Particles before and after the afterburner.

/// A particle drawn from the thermal model, written to the afterburner input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampledParticle {
    /// PDG Monte Carlo id.
    pub id: i32,
    /// Position `(x, y, z)` in fm.
    pub x: [f64; 3],
    /// Momentum `(p_x, p_y, p_z)` in GeV.
    pub p: [f64; 3],
}

/// A particle from the afterburner's final list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FinalParticle {
    /// PDG Monte Carlo id.
    pub id: i32,
    /// Electric charge in units of e.
    pub charge: i32,
    /// Transverse momentum in GeV.
    pub pt: f64,
    /// Azimuthal angle.
    pub phi: f64,
    /// Rapidity.
    pub y: f64,
    /// Pseudorapidity.
    pub eta: f64,
}

/// Identified species tracked in the event record, in record order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    /// π±.
    Pion,
    /// K±.
    Kaon,
    /// p, p̄.
    Proton,
}

impl Species {
    /// All tracked species in record order.
    pub const ALL: [Species; 3] = [Species::Pion, Species::Kaon, Species::Proton];

    /// Absolute PDG id.
    pub fn pdg(self) -> i32 {
        match self {
            Self::Pion => 211,
            Self::Kaon => 321,
            Self::Proton => 2212,
        }
    }

    /// Match a particle id to a tracked species (either sign).
    pub fn from_pdg(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.pdg() == id.abs())
    }
}
