//! Hadron resonance gas: thermodynamics and Cooper–Frye sampling.
//!
//! Built once per run at the switching temperature. Densities use the full
//! Bessel-function series for quantum statistics; broad resonances are
//! averaged over a Breit–Wigner mass distribution truncated at two widths.
//!
//! Sampling is stateless: every call seeds a fresh `ChaCha8Rng` from
//! `seed ^ stream`, so a `(surface, stream)` pair always gives the same
//! batch.

use hic_core::{FreezeOutSurface, SampledParticle, SurfaceElement, ThermalModel};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::species::{hadron_table, HadronSpecies};

/// `ħc` in GeV·fm.
pub const HBARC: f64 = 0.197_326_98;

/// Half-width of the uniform space-time rapidity window particles are
/// sampled in.
pub const Y_MAX: f64 = 2.0;

const SERIES_TERMS: usize = 30;
const MASS_POINTS: usize = 32;
const BW_HALF_RANGE: f64 = 2.0;

/// Modified Bessel function of the second kind `K_ν(x)` for `x > 0`, from
/// `K_ν(x) = ∫₀^∞ exp(−x cosh t) cosh(νt) dt` by the trapezoid rule.
pub fn bessel_k(nu: u32, x: f64) -> f64 {
    if !(x > 0.0) {
        return f64::INFINITY;
    }
    // Integrand is below e^-40 of its peak beyond this point.
    let t_max = (1.0 + 40.0 / x).acosh();
    let steps = 400;
    let h = t_max / steps as f64;
    let nu = f64::from(nu);
    let f = |t: f64| (-x * t.cosh()).exp() * (nu * t).cosh();
    let interior: f64 = (1..steps).map(|i| f(i as f64 * h)).sum();
    h * (0.5 * (f(0.0) + f(t_max)) + interior)
}

/// Number density (fm⁻³) and energy density (GeV/fm³) of one species of
/// mass `m` at temperature `t`, per unit degeneracy.
fn density_and_energy(m: f64, t: f64, sign: f64) -> (f64, f64) {
    let mut n = 0.0;
    let mut e = 0.0;
    for k in 1..=SERIES_TERMS {
        let k = k as f64;
        let coeff = sign.powf(k + 1.0) / k;
        let x = k * m / t;
        let k2 = bessel_k(2, x);
        let k1 = bessel_k(1, x);
        let dn = coeff * m * m * t * k2;
        n += dn;
        e += coeff * (3.0 * m * m * t * t / k * k2 + m * m * m * t * k1);
        if dn.abs() < 1e-14 * n.abs() {
            break;
        }
    }
    let norm = 1.0 / (2.0 * std::f64::consts::PI.powi(2) * HBARC.powi(3));
    (n * norm, e * norm)
}

/// One species with its thermal density and sampling mass grid.
#[derive(Clone, Debug)]
struct SpeciesState {
    species: HadronSpecies,
    density: f64,
    /// Candidate masses and their cumulative density weights.
    masses: Vec<f64>,
    mass_cdf: Vec<f64>,
}

impl SpeciesState {
    fn new(species: HadronSpecies, t: f64) -> (Self, f64) {
        let sign = species.statistics.sign();
        if !species.is_resonance() {
            let (n, e) = density_and_energy(species.mass, t, sign);
            let state = Self {
                species,
                density: n * species.degeneracy,
                masses: vec![species.mass],
                mass_cdf: vec![1.0],
            };
            return (state, e * species.degeneracy);
        }

        let (m0, gamma) = (species.mass, species.width);
        let lo = (m0 - BW_HALF_RANGE * gamma).max(0.0);
        let hi = m0 + BW_HALF_RANGE * gamma;
        let dm = (hi - lo) / MASS_POINTS as f64;

        let mut masses = Vec::with_capacity(MASS_POINTS);
        let mut mass_cdf = Vec::with_capacity(MASS_POINTS);
        let (mut bw_sum, mut n_sum, mut e_sum) = (0.0, 0.0, 0.0);
        for i in 0..MASS_POINTS {
            let m = lo + (i as f64 + 0.5) * dm;
            let bw = breit_wigner(m, m0, gamma);
            let (n, e) = density_and_energy(m, t, sign);
            bw_sum += bw;
            n_sum += bw * n;
            e_sum += bw * e;
            masses.push(m);
            mass_cdf.push(n_sum);
        }
        for w in &mut mass_cdf {
            *w /= n_sum;
        }
        let g = species.degeneracy;
        let state = Self {
            species,
            density: g * n_sum / bw_sum,
            masses,
            mass_cdf,
        };
        (state, g * e_sum / bw_sum)
    }

    fn sample_mass(&self, rng: &mut ChaCha8Rng) -> f64 {
        let u: f64 = rng.random();
        let i = self.mass_cdf.partition_point(|&c| c < u);
        self.masses[i.min(self.masses.len() - 1)]
    }
}

/// Non-relativistic Breit–Wigner line shape (unnormalized).
fn breit_wigner(m: f64, m0: f64, gamma: f64) -> f64 {
    let half = 0.5 * gamma;
    half / ((m - m0).powi(2) + half * half)
}

/// Equilibrium hadron resonance gas at one temperature.
#[derive(Clone, Debug)]
pub struct HadronGas {
    temperature: f64,
    seed: u64,
    species: Vec<SpeciesState>,
    species_cdf: Vec<f64>,
    density: f64,
    energy_density: f64,
    pressure: f64,
}

impl HadronGas {
    /// Build the gas at temperature `t` (GeV); `seed` is the run seed.
    pub fn new(t: f64, seed: u64) -> Self {
        let mut species = Vec::new();
        let mut energy_density = 0.0;
        for s in hadron_table().into_values() {
            let (state, e) = SpeciesState::new(s, t);
            energy_density += e;
            species.push(state);
        }
        let mut total = 0.0;
        let mut species_cdf: Vec<f64> = species
            .iter()
            .map(|s| {
                total += s.density;
                total
            })
            .collect();
        for w in &mut species_cdf {
            *w /= total;
        }
        let gas = Self {
            temperature: t,
            seed,
            species,
            species_cdf,
            density: total,
            energy_density,
            // Classical ideal gas: P = nT.
            pressure: total * t,
        };
        debug!(
            "hadron gas at T = {t} GeV: n = {:.5} fm^-3, e = {:.5} GeV/fm^3",
            gas.density, gas.energy_density
        );
        gas
    }

    /// Switching temperature in GeV.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Total hadron number density in fm⁻³.
    pub fn density(&self) -> f64 {
        self.density
    }

    fn pick_species(&self, rng: &mut ChaCha8Rng) -> &SpeciesState {
        let u: f64 = rng.random();
        let i = self.species_cdf.partition_point(|&c| c < u);
        &self.species[i.min(self.species.len() - 1)]
    }

    /// Local rest-frame momentum magnitude for mass `m`, from
    /// `p² e^{-E/T}` via the `(K + m)² e^{-K/T}` envelope.
    fn sample_momentum(&self, m: f64, rng: &mut ChaCha8Rng) -> f64 {
        let t = self.temperature;
        let weights = [2.0 * t * t * t, 2.0 * m * t * t, m * m * t];
        let total: f64 = weights.iter().sum();
        loop {
            let r = rng.random::<f64>() * total;
            let shape = if r < weights[0] {
                3
            } else if r < weights[0] + weights[1] {
                2
            } else {
                1
            };
            let k = gamma_int(shape, t, rng);
            let e = k + m;
            let p = (k * (k + 2.0 * m)).sqrt();
            if rng.random::<f64>() * e < p {
                return p;
            }
        }
    }

    /// Apply the linear viscous deformation `p^i → p^i + λ^{ij} p_j`.
    fn deform(&self, p: [f64; 3], cell: &SurfaceElement) -> [f64; 3] {
        let enthalpy = self.energy_density + self.pressure;
        if !(enthalpy > 0.0) {
            return p;
        }
        let shear = 0.5 / enthalpy;
        let bulk = 1.0 - cell.bulk / (3.0 * enthalpy);
        let pi = cell.pi;
        let bulk = bulk.max(0.0);
        [
            bulk * (p[0] + shear * (pi.xx * p[0] + pi.xy * p[1])),
            bulk * (p[1] + shear * (pi.xy * p[0] + pi.yy * p[1])),
            bulk * p[2],
        ]
    }

    fn sample_into(
        &self,
        surface: &FreezeOutSurface,
        rng: &mut ChaCha8Rng,
        out: &mut Vec<SampledParticle>,
    ) {
        let mut total = 0.0;
        let cdf: Vec<f64> = surface
            .elements()
            .iter()
            .map(|el| {
                total += el.u_dot_sigma().max(0.0);
                total
            })
            .collect();
        if !(total > 0.0) {
            return;
        }
        let mean = total * self.density * 2.0 * Y_MAX;
        let count = poisson(mean, rng);
        out.reserve(count as usize);

        for _ in 0..count {
            let r = rng.random::<f64>() * total;
            let idx = cdf.partition_point(|&c| c < r).min(cdf.len() - 1);
            let cell = &surface.elements()[idx];
            let species = self.pick_species(rng);
            let m = species.sample_mass(rng);

            // Isotropic direction in the local rest frame.
            let p_mag = self.sample_momentum(m, rng);
            let cos_theta = 2.0 * rng.random::<f64>() - 1.0;
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
            let phi = 2.0 * std::f64::consts::PI * rng.random::<f64>();
            let local = [
                p_mag * sin_theta * phi.cos(),
                p_mag * sin_theta * phi.sin(),
                p_mag * cos_theta,
            ];
            let local = self.deform(local, cell);
            let e_local = (m * m + local.iter().map(|x| x * x).sum::<f64>()).sqrt();

            let (e, p) = boost_transverse(e_local, local, cell.v);
            let eta_s = Y_MAX * (2.0 * rng.random::<f64>() - 1.0);
            let (ch, sh) = (eta_s.cosh(), eta_s.sinh());
            let pz = p[2] * ch + e * sh;

            out.push(SampledParticle {
                id: species.species.pdg,
                x: [cell.x[0], cell.x[1], cell.tau * sh],
                p: [p[0], p[1], pz],
            });
        }
    }
}

impl ThermalModel for HadronGas {
    fn energy_density(&self) -> f64 {
        self.energy_density
    }

    fn sample(&self, surface: &FreezeOutSurface, stream: u64) -> Vec<SampledParticle> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ stream);
        let mut out = Vec::new();
        self.sample_into(surface, &mut rng, &mut out);
        out
    }
}

/// Boost `(e, p)` by transverse velocity `v`.
fn boost_transverse(e: f64, p: [f64; 3], v: [f64; 2]) -> (f64, [f64; 3]) {
    let v2 = v[0] * v[0] + v[1] * v[1];
    if v2 <= 0.0 {
        return (e, p);
    }
    let gamma = 1.0 / (1.0 - v2).max(f64::MIN_POSITIVE).sqrt();
    let pv = p[0] * v[0] + p[1] * v[1];
    let k = (gamma - 1.0) * pv / v2 + gamma * e;
    (gamma * (e + pv), [p[0] + k * v[0], p[1] + k * v[1], p[2]])
}

/// Gamma variate with integer shape `k` and scale `t`.
fn gamma_int(k: u32, t: f64, rng: &mut ChaCha8Rng) -> f64 {
    let mut prod = 1.0;
    for _ in 0..k {
        prod *= rng.random::<f64>().max(1e-300);
    }
    -t * prod.ln()
}

/// Standard normal variate (Box–Muller).
fn box_muller(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Poisson variate: Knuth's method for small means, normal approximation above 30.
pub fn poisson(mean: f64, rng: &mut ChaCha8Rng) -> u64 {
    if !(mean > 0.0) {
        return 0;
    }
    if mean < 30.0 {
        let limit = (-mean).exp();
        let mut k = 0;
        let mut prod: f64 = rng.random();
        while prod > limit {
            k += 1;
            prod *= rng.random::<f64>();
        }
        k
    } else {
        (mean + mean.sqrt() * box_muller(rng)).round().max(0.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_cell(volume: f64) -> SurfaceElement {
        SurfaceElement {
            tau: 1.0,
            sigma: [volume, 0.0, 0.0],
            ..Default::default()
        }
    }

    #[test]
    fn bessel_matches_reference_values() {
        // K1(1) = 0.6019072302, K2(1) = 1.6248388986, K2(5) = 0.005308943712
        assert!((bessel_k(1, 1.0) - 0.601_907_230_2).abs() < 1e-8);
        assert!((bessel_k(2, 1.0) - 1.624_838_898_6).abs() < 1e-8);
        assert!((bessel_k(2, 5.0) - 0.005_308_943_712).abs() < 1e-10);
    }

    #[test]
    fn pion_gas_density() {
        // Boltzmann estimate for one pion species at T = 150 MeV is about
        // 0.0371 fm^-3; Bose enhancement adds ten percent.
        let (n, _) = density_and_energy(0.139_57, 0.150, 1.0);
        assert!(n > 0.0371 && n < 0.042, "n = {n}");
    }

    #[test]
    fn energy_density_grows_with_temperature() {
        let cold = HadronGas::new(0.140, 0).energy_density();
        let hot = HadronGas::new(0.160, 0).energy_density();
        assert!(cold > 0.05 && cold < hot && hot < 1.0, "{cold} {hot}");
    }

    #[test]
    fn sampling_is_reproducible_per_stream() {
        let gas = HadronGas::new(0.150, 42);
        let surface = FreezeOutSurface::new(vec![static_cell(20.0)]);
        let a = gas.sample(&surface, 7);
        let b = gas.sample(&surface, 7);
        let c = gas.sample(&surface, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn mean_count_matches_density() {
        let gas = HadronGas::new(0.150, 1);
        let volume = 50.0;
        let surface = FreezeOutSurface::new(vec![static_cell(volume)]);
        let expected = volume * gas.density() * 2.0 * Y_MAX;
        let rounds = 200;
        let total: usize = (0..rounds).map(|s| gas.sample(&surface, s).len()).sum();
        let mean = total as f64 / rounds as f64;
        assert!((mean - expected).abs() / expected < 0.05, "{mean} vs {expected}");
    }

    #[test]
    fn empty_or_inward_surface_yields_nothing() {
        let gas = HadronGas::new(0.150, 0);
        assert!(gas.sample(&FreezeOutSurface::default(), 0).is_empty());
        let inward = FreezeOutSurface::new(vec![static_cell(-5.0)]);
        assert!(gas.sample(&inward, 0).is_empty());
    }

    #[test]
    fn static_cell_momenta_are_isotropic() {
        let gas = HadronGas::new(0.150, 3);
        let surface = FreezeOutSurface::new(vec![static_cell(2000.0)]);
        let parts = gas.sample(&surface, 0);
        assert!(parts.len() > 1000);
        let mean_px: f64 = parts.iter().map(|p| p.p[0]).sum::<f64>() / parts.len() as f64;
        assert!(mean_px.abs() < 0.05, "{mean_px}");
        assert!(parts.iter().all(|p| p.x[2].abs() <= Y_MAX.sinh() + 1e-12));
    }

    #[test]
    fn transverse_boost_moves_momentum_along_flow() {
        let (e, p) = boost_transverse(1.0, [0.0, 0.0, 0.0], [0.6, 0.0]);
        assert!((e - 1.25).abs() < 1e-12);
        assert!((p[0] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn poisson_small_and_large_means() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for mean in [0.5, 4.0, 200.0] {
            let n = 4000;
            let total: u64 = (0..n).map(|_| poisson(mean, &mut rng)).sum();
            let avg = total as f64 / n as f64;
            assert!((avg - mean).abs() < 0.1 * mean.max(1.0), "{mean}: {avg}");
        }
        assert_eq!(poisson(0.0, &mut rng), 0);
    }
}
