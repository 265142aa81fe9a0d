//! Hadron species included in the resonance gas.
//!
//! Masses and widths in GeV. Entries with `anti = true` also contribute
//! their antiparticle (negated PDG id and charge).

use indexmap::IndexMap;

/// Quantum statistics of a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Statistics {
    /// Bose–Einstein.
    Boson,
    /// Fermi–Dirac.
    Fermion,
}

impl Statistics {
    /// Sign of the alternating term in the Bessel series: `+1` for bosons,
    /// `-1` for fermions.
    pub fn sign(self) -> f64 {
        match self {
            Self::Boson => 1.0,
            Self::Fermion => -1.0,
        }
    }
}

/// One hadron species.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HadronSpecies {
    /// PDG Monte Carlo id.
    pub pdg: i32,
    /// Pole mass in GeV.
    pub mass: f64,
    /// Total width in GeV; zero for stable species.
    pub width: f64,
    /// Spin degeneracy `2J + 1`.
    pub degeneracy: f64,
    /// Electric charge in units of `e`.
    pub charge: i32,
    /// Quantum statistics.
    pub statistics: Statistics,
}

impl HadronSpecies {
    /// `true` if the width is large enough to matter for sampling.
    pub fn is_resonance(&self) -> bool {
        self.width > 1e-3
    }
}

// (pdg, mass, width, 2J+1, charge, baryon, has antiparticle)
const TABLE: &[(i32, f64, f64, u8, i32, bool, bool)] = &[
    // light mesons
    (211, 0.139_570, 0.0, 1, 1, false, true),
    (111, 0.134_977, 0.0, 1, 0, false, false),
    (321, 0.493_677, 0.0, 1, 1, false, true),
    (311, 0.497_611, 0.0, 1, 0, false, true),
    (221, 0.547_862, 0.0, 1, 0, false, false),
    (213, 0.775_260, 0.149_1, 3, 1, false, true),
    (113, 0.775_260, 0.149_1, 3, 0, false, false),
    (223, 0.782_650, 0.008_49, 3, 0, false, false),
    (323, 0.891_660, 0.050_8, 3, 1, false, true),
    (313, 0.895_550, 0.047_3, 3, 0, false, true),
    (331, 0.957_780, 0.000_188, 1, 0, false, false),
    (333, 1.019_461, 0.004_249, 3, 0, false, false),
    // baryons
    (2212, 0.938_272, 0.0, 2, 1, true, true),
    (2112, 0.939_565, 0.0, 2, 0, true, true),
    (3122, 1.115_683, 0.0, 2, 0, true, true),
    (3222, 1.189_370, 0.0, 2, 1, true, true),
    (3212, 1.192_642, 0.0, 2, 0, true, true),
    (3112, 1.197_449, 0.0, 2, -1, true, true),
    (2224, 1.232_000, 0.117_0, 4, 2, true, true),
    (2214, 1.232_000, 0.117_0, 4, 1, true, true),
    (2114, 1.232_000, 0.117_0, 4, 0, true, true),
    (1114, 1.232_000, 0.117_0, 4, -1, true, true),
    (3322, 1.314_860, 0.0, 2, 0, true, true),
    (3312, 1.321_710, 0.0, 2, -1, true, true),
    (3334, 1.672_450, 0.0, 4, -1, true, true),
];

/// The fixed species list, particles and antiparticles, keyed by PDG id.
pub fn hadron_table() -> IndexMap<i32, HadronSpecies> {
    let mut table = IndexMap::with_capacity(2 * TABLE.len());
    for &(pdg, mass, width, degeneracy, charge, baryon, anti) in TABLE {
        let statistics = if baryon {
            Statistics::Fermion
        } else {
            Statistics::Boson
        };
        let species = HadronSpecies {
            pdg,
            mass,
            width,
            degeneracy: f64::from(degeneracy),
            charge,
            statistics,
        };
        table.insert(pdg, species);
        if anti {
            table.insert(
                -pdg,
                HadronSpecies {
                    pdg: -pdg,
                    charge: -charge,
                    ..species
                },
            );
        }
    }
    table
}

/// Electric charge of `pdg`, if it is in the table.
pub fn charge_of(pdg: i32) -> Option<i32> {
    hadron_table().get(&pdg).map(|s| s.charge)
}
