//! Reduce a final particle list to per-event observables.
//!
//! | observable | particles | normalization |
//! |---|---|---|
//! | `dNch/deta` | charged, `\|η\| < 0.5` | per sampling round |
//! | `dN/dy` | π, K, p (either sign), `\|y\| < 0.5` | per sampling round |
//! | `mean_pT` | same as `dN/dy` | plain mean, 0 when none |
//! | `M`, `Q_n` | charged, `\|η\| < 0.8`, `0.2 < pT < 5` | raw sums |

use hic_core::{EventRecord, FinalParticle, Species, NUM_HARMONICS, NUM_SPECIES};
use num_complex::Complex64;

/// Kinematic cuts used by [`reduce`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Acceptance {
    /// `|η|` bound for the charged-particle density.
    pub eta_ch: f64,
    /// `|y|` bound for identified yields and mean pT.
    pub y_id: f64,
    /// `|η|` bound for the flow window.
    pub eta_flow: f64,
    /// Open pT interval for the flow window, in GeV.
    pub pt_flow: (f64, f64),
}

impl Default for Acceptance {
    fn default() -> Self {
        Self {
            eta_ch: 0.5,
            y_id: 0.5,
            eta_flow: 0.8,
            pt_flow: (0.2, 5.0),
        }
    }
}

/// Event observables, before the initial-state fields are attached.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Observables {
    /// Charged-particle density at mid-pseudorapidity.
    pub dnch_deta: f64,
    /// Identified yields at mid-rapidity, in [`Species::ALL`] order.
    pub dn_dy: [f64; NUM_SPECIES],
    /// Identified mean pT, in [`Species::ALL`] order.
    pub mean_pt: [f64; NUM_SPECIES],
    /// Flow-window multiplicity.
    pub m: i64,
    /// Flow vectors `Q_n = Σ e^{i n φ}`, `n = 1..=6`.
    pub qn: [Complex64; NUM_HARMONICS],
}

impl Observables {
    /// Combine with the event's initial-state quantities into a record.
    pub fn into_record(self, initial_entropy: f64, mult_factor: f64, nsamples: u64) -> EventRecord {
        EventRecord {
            initial_entropy,
            mult_factor,
            nsamples: nsamples as i64,
            dnch_deta: self.dnch_deta,
            dn_dy: self.dn_dy,
            mean_pt: self.mean_pt,
            m: self.m,
            qn: self.qn,
        }
    }
}

/// Reduce `particles`, drawn over `nsamples` rounds, with `cuts`.
pub fn reduce(particles: &[FinalParticle], nsamples: u64, cuts: &Acceptance) -> Observables {
    let mut nch = 0u64;
    let mut counts = [0u64; NUM_SPECIES];
    let mut pt_sums = [0.0; NUM_SPECIES];
    let mut m = 0i64;
    let mut qn = [Complex64::default(); NUM_HARMONICS];

    for p in particles {
        let charged = p.charge != 0;
        if charged && p.eta.abs() < cuts.eta_ch {
            nch += 1;
        }
        if p.y.abs() < cuts.y_id {
            if let Some(s) = Species::from_pdg(p.id) {
                let k = species_index(s);
                counts[k] += 1;
                pt_sums[k] += p.pt;
            }
        }
        if charged
            && p.eta.abs() < cuts.eta_flow
            && p.pt > cuts.pt_flow.0
            && p.pt < cuts.pt_flow.1
        {
            m += 1;
            for (n, q) in qn.iter_mut().enumerate() {
                *q += Complex64::from_polar(1.0, (n + 1) as f64 * p.phi);
            }
        }
    }

    let per_round = if nsamples > 0 {
        1.0 / nsamples as f64
    } else {
        0.0
    };
    let mean_pt = std::array::from_fn(|k| {
        if counts[k] > 0 {
            pt_sums[k] / counts[k] as f64
        } else {
            0.0
        }
    });
    Observables {
        dnch_deta: nch as f64 * per_round,
        dn_dy: counts.map(|c| c as f64 * per_round),
        mean_pt,
        m,
        qn,
    }
}

fn species_index(s: Species) -> usize {
    match s {
        Species::Pion => 0,
        Species::Kaon => 1,
        Species::Proton => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(id: i32, charge: i32, pt: f64, phi: f64, y: f64) -> FinalParticle {
        FinalParticle {
            id,
            charge,
            pt,
            phi,
            y,
            eta: y,
        }
    }

    #[test]
    fn species_without_particles_have_zero_mean_pt() {
        let parts = [particle(211, 1, 0.4, 0.0, 0.1), particle(-211, -1, 0.6, 1.0, -0.2)];
        let obs = reduce(&parts, 2, &Acceptance::default());
        assert_eq!(obs.mean_pt, [0.5, 0.0, 0.0]);
        assert!(obs.mean_pt.iter().all(|v| !v.is_nan()));
        assert_eq!(obs.dn_dy, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_list_reduces_to_zero() {
        let obs = reduce(&[], 10, &Acceptance::default());
        assert_eq!(obs, Observables::default());
    }

    #[test]
    fn densities_are_per_round() {
        let parts: Vec<_> = (0..12).map(|_| particle(321, 1, 1.0, 0.0, 0.0)).collect();
        let obs = reduce(&parts, 4, &Acceptance::default());
        assert_eq!(obs.dnch_deta, 3.0);
        assert_eq!(obs.dn_dy[1], 3.0);
        // M and Q_n are not normalized.
        assert_eq!(obs.m, 12);
        assert!((obs.qn[0].re - 12.0).abs() < 1e-12);
    }

    #[test]
    fn neutral_and_forward_particles_are_excluded() {
        let cuts = Acceptance::default();
        let parts = [
            particle(111, 0, 1.0, 0.0, 0.0),
            particle(211, 1, 1.0, 0.0, 0.6),
            particle(211, 1, 0.1, 0.0, 0.0),
            particle(211, 1, 6.0, 0.0, 0.0),
        ];
        let obs = reduce(&parts, 1, &cuts);
        // |eta| < 0.5 and charged: the low- and high-pT pions.
        assert_eq!(obs.dnch_deta, 2.0);
        // 0.6 is inside the flow window's |eta| < 0.8, the others fail pT.
        assert_eq!(obs.m, 1);
        assert_eq!(obs.dn_dy[0], 2.0);
    }

    #[test]
    fn flow_vectors_follow_azimuth() {
        let phi = 0.3;
        let parts = [particle(211, 1, 1.0, phi, 0.0), particle(211, 1, 1.0, phi + std::f64::consts::PI, 0.0)];
        let obs = reduce(&parts, 1, &Acceptance::default());
        // Back-to-back pair: odd harmonics cancel, even ones add.
        assert!(obs.qn[0].norm() < 1e-12);
        assert!((obs.qn[1].norm() - 2.0).abs() < 1e-12);
        assert!((obs.qn[1].arg() - 2.0 * phi).abs() < 1e-12);
    }

    #[test]
    fn record_carries_initial_state() {
        let obs = reduce(&[particle(2212, 1, 1.5, 0.0, 0.0)], 1, &Acceptance::default());
        let rec = obs.into_record(123.0, 1.1, 1);
        assert_eq!(rec.initial_entropy, 123.0);
        assert_eq!(rec.mult_factor, 1.1);
        assert_eq!(rec.nsamples, 1);
        assert_eq!(rec.mean_pt[2], 1.5);
    }
}
