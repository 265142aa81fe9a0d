//! Massless boost-invariant free streaming.
//!
//! The initial density `F` is treated as a gas of massless partons moving
//! radially outward at the speed of light. At proper time `τ` the
//! energy-momentum tensor is
//!
//! ```text
//! T^{μν}(x, τ) = (1/τ) ⟨ p̂^μ p̂^ν F(x − τ p̂) ⟩_φ,   p̂ = (1, cos φ, sin φ)
//! ```
//!
//! averaged over a uniform set of momentum angles, with `F` bilinearly
//! interpolated (zero outside the grid). The hydrodynamic fields follow from
//! Landau matching `T^{μν} u_ν = e u^μ` with a conformal equation of state
//! `P = e/3`.

use hic_core::{FreestreamedFields, Grid2, GridSpec};

/// Minimum number of momentum angles.
pub const MIN_ANGLES: usize = 32;

const LANDAU_MAX_ITER: usize = 200;
const LANDAU_TOL: f64 = 1e-12;
// Keeps u^μ timelike for nearly null tensors.
const MAX_SPEED: f64 = 1.0 - 1e-9;

/// Independent components of a symmetric 2+1 tensor:
/// `[tt, tx, ty, xx, xy, yy]`.
pub type Tensor = [f64; 6];

/// Number of momentum angles for proper time `tau` on `grid`: enough that
/// neighbouring sample points at radius `tau` are half a cell apart.
pub fn angle_count(grid: &GridSpec, tau: f64) -> usize {
    let arc = 2.0 * std::f64::consts::PI * tau / (0.5 * grid.step);
    MIN_ANGLES.max(arc.ceil() as usize)
}

/// Free-streamed energy-momentum tensor of one initial grid.
pub struct FreeStreamer {
    tmunu: [Grid2; 6],
}

impl FreeStreamer {
    /// Stream `initial` (laid out on `grid`) to proper time `tau > 0`.
    pub fn new(initial: &Grid2, grid: &GridSpec, tau: f64) -> Self {
        debug_assert!(tau > 0.0, "free-streaming time must be positive");
        let rows = initial.rows();
        let cols = initial.cols();
        let nphi = angle_count(grid, tau);
        let dirs: Vec<(f64, f64)> = (0..nphi)
            .map(|k| {
                let phi = 2.0 * std::f64::consts::PI * k as f64 / nphi as f64;
                (phi.cos(), phi.sin())
            })
            .collect();

        let mut tmunu: [Grid2; 6] = std::array::from_fn(|_| Grid2::zeros(rows, cols));
        let norm = 1.0 / (nphi as f64 * tau);

        for r in 0..rows {
            let y = grid.center(r);
            for c in 0..cols {
                let x = grid.center(c);
                let mut acc = [0.0; 6];
                for &(cos, sin) in &dirs {
                    let f = grid.interpolate(initial, x - tau * cos, y - tau * sin);
                    if f == 0.0 {
                        continue;
                    }
                    acc[0] += f;
                    acc[1] += f * cos;
                    acc[2] += f * sin;
                    acc[3] += f * cos * cos;
                    acc[4] += f * cos * sin;
                    acc[5] += f * sin * sin;
                }
                for (component, value) in tmunu.iter_mut().zip(acc) {
                    *component.get_mut(r, c) = value * norm;
                }
            }
        }

        Self { tmunu }
    }

    /// `T^{μν}` at cell `(row, col)`.
    pub fn tensor(&self, row: usize, col: usize) -> Tensor {
        std::array::from_fn(|k| self.tmunu[k].get(row, col))
    }

    /// The `T^{ττ}` component over the grid.
    pub fn t00(&self) -> &Grid2 {
        &self.tmunu[0]
    }

    /// Landau-matched hydrodynamic fields on every cell.
    pub fn fields(&self) -> FreestreamedFields {
        let rows = self.tmunu[0].rows();
        let cols = self.tmunu[0].cols();
        let mut out: [Grid2; 6] = std::array::from_fn(|_| Grid2::zeros(rows, cols));
        for r in 0..rows {
            for c in 0..cols {
                let (e, u) = landau_match(&self.tensor(r, c));
                let pi = shear_stress(&self.tensor(r, c), e, u);
                for (grid, v) in out.iter_mut().zip([e, u[1], u[2], pi[0], pi[1], pi[2]]) {
                    *grid.get_mut(r, c) = v;
                }
            }
        }
        let [energy_density, u1, u2, pi11, pi12, pi22] = out;
        FreestreamedFields {
            energy_density,
            u1,
            u2,
            pi11,
            pi12,
            pi22,
        }
    }
}

/// Mixed tensor `T^μ_ν v^ν` with metric `diag(1, -1, -1)`.
fn apply_mixed(t: &Tensor, v: [f64; 3]) -> [f64; 3] {
    let [tt, tx, ty, xx, xy, yy] = *t;
    [
        tt * v[0] - tx * v[1] - ty * v[2],
        tx * v[0] - xx * v[1] - xy * v[2],
        ty * v[0] - xy * v[1] - yy * v[2],
    ]
}

/// Solve `T^{μν} u_ν = e u^μ` for the timelike eigenvector.
///
/// Uses power iteration on `T^μ_ν + T^{ττ} δ^μ_ν`, whose dominant eigenvalue
/// is the timelike one. A vanishing tensor gives `e = 0`, `u = (1, 0, 0)`.
pub fn landau_match(t: &Tensor) -> (f64, [f64; 3]) {
    let shift = t[0];
    if !(shift > 0.0) {
        return (0.0, [1.0, 0.0, 0.0]);
    }

    // Iterate on the three-velocity v = u / u^0.
    let mut v = [1.0, 0.0, 0.0];
    for _ in 0..LANDAU_MAX_ITER {
        let w = apply_mixed(t, v);
        let next = [w[0] + shift, w[1] + shift * v[1], w[2] + shift * v[2]];
        if !(next[0] > 0.0) {
            break;
        }
        let mut nv = [1.0, next[1] / next[0], next[2] / next[0]];
        let speed = nv[1].hypot(nv[2]);
        if speed > MAX_SPEED {
            nv[1] *= MAX_SPEED / speed;
            nv[2] *= MAX_SPEED / speed;
        }
        let delta = (nv[1] - v[1]).abs() + (nv[2] - v[2]).abs();
        v = nv;
        if delta < LANDAU_TOL {
            break;
        }
    }

    let gamma = 1.0 / (1.0 - v[1] * v[1] - v[2] * v[2]).sqrt();
    let u = [gamma, gamma * v[1], gamma * v[2]];
    let e = contract_lower(t, u);
    (e.max(0.0), u)
}

/// `u_μ T^{μν} u_ν`.
fn contract_lower(t: &Tensor, u: [f64; 3]) -> f64 {
    let [tt, tx, ty, xx, xy, yy] = *t;
    tt * u[0] * u[0] - 2.0 * tx * u[0] * u[1] - 2.0 * ty * u[0] * u[2]
        + xx * u[1] * u[1]
        + 2.0 * xy * u[1] * u[2]
        + yy * u[2] * u[2]
}

/// Transverse shear components `[π^{xx}, π^{xy}, π^{yy}]` for conformal
/// pressure `P = e/3`:
/// `π^{μν} = T^{μν} − e u^μ u^ν + P (g^{μν} − u^μ u^ν)`.
pub fn shear_stress(t: &Tensor, e: f64, u: [f64; 3]) -> [f64; 3] {
    let p = e / 3.0;
    let pi = |tij: f64, i: usize, j: usize, g: f64| tij - (e + p) * u[i] * u[j] + p * g;
    [pi(t[3], 1, 1, -1.0), pi(t[4], 1, 2, 0.0), pi(t[5], 2, 2, -1.0)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spec() -> GridSpec {
        GridSpec { step: 0.2, max: 4.0 }
    }

    fn gaussian(grid: &GridSpec, width: f64) -> Grid2 {
        let n = grid.cells();
        let mut g = Grid2::zeros(n, n);
        for r in 0..n {
            for c in 0..n {
                let (x, y) = (grid.center(c), grid.center(r));
                *g.get_mut(r, c) = (-(x * x + y * y) / (2.0 * width * width)).exp();
            }
        }
        g
    }

    #[test]
    fn angle_count_has_a_floor() {
        let grid = GridSpec::default();
        assert_eq!(angle_count(&grid, 0.01), MIN_ANGLES);
        // 2π · 1.0 / 0.075 = 83.8
        assert_eq!(angle_count(&grid, 1.0), 84);
    }

    #[test]
    fn uniform_density_is_isotropic_at_the_centre() {
        let grid = spec();
        let n = grid.cells();
        let c = 3.0;
        let initial = Grid2::from_vec(n, n, vec![c; n * n]).unwrap();
        let tau = 0.5;
        let fs = FreeStreamer::new(&initial, &grid, tau);
        let mid = n / 2;
        let t = fs.tensor(mid, mid);
        assert!((t[0] - c / tau).abs() < 1e-9);
        assert!((t[3] - c / (2.0 * tau)).abs() < 1e-9);
        assert!(t[1].abs() < 1e-9 && t[4].abs() < 1e-9);

        let fields = fs.fields();
        let e = fields.energy_density.get(mid, mid);
        assert!((e - c / tau).abs() < 1e-9);
        assert!(fields.u1.get(mid, mid).abs() < 1e-9);
        assert!((fields.pi11.get(mid, mid) - e / 6.0).abs() < 1e-9);
        assert!((fields.pi22.get(mid, mid) - e / 6.0).abs() < 1e-9);
    }

    #[test]
    fn streaming_conserves_energy() {
        let grid = spec();
        let initial = gaussian(&grid, 0.8);
        let tau = 0.6;
        let fs = FreeStreamer::new(&initial, &grid, tau);
        let before = initial.sum();
        let after = tau * fs.t00().sum();
        assert!((after - before).abs() / before < 1e-3, "{before} vs {after}");
    }

    #[test]
    fn blob_flows_outward() {
        let grid = spec();
        let n = grid.cells();
        let fields = FreeStreamer::new(&gaussian(&grid, 0.8), &grid, 1.0).fields();
        let mid = n / 2;
        // Right of centre moves right, above centre moves up.
        assert!(fields.u1.get(mid, mid + 5) > 0.0);
        assert!(fields.u2.get(mid + 5, mid) > 0.0);
        assert!(fields.u1.get(mid, mid - 6) < 0.0);
    }

    #[test]
    fn zero_tensor_is_at_rest() {
        assert_eq!(landau_match(&[0.0; 6]), (0.0, [1.0, 0.0, 0.0]));
    }

    /// Ideal conformal fluid with energy density `e` moving at `(vx, vy)`.
    fn perfect_fluid(e: f64, vx: f64, vy: f64) -> (Tensor, [f64; 3]) {
        let p = e / 3.0;
        let gamma = 1.0 / (1.0 - vx * vx - vy * vy).sqrt();
        let u = [gamma, gamma * vx, gamma * vy];
        let g = [1.0, -1.0, -1.0];
        let comp = |i: usize, j: usize| {
            let metric = if i == j { g[i] } else { 0.0 };
            (e + p) * u[i] * u[j] - p * metric
        };
        let t = [comp(0, 0), comp(0, 1), comp(0, 2), comp(1, 1), comp(1, 2), comp(2, 2)];
        (t, u)
    }

    #[test]
    fn perfect_fluid_is_recovered() {
        let (t, u) = perfect_fluid(2.0, 0.5, 0.0);
        let (e_fit, u_fit) = landau_match(&t);
        assert!((e_fit - 2.0).abs() < 1e-8);
        assert!((u_fit[1] - u[1]).abs() < 1e-6);
        let pi = shear_stress(&t, e_fit, u_fit);
        assert!(pi.iter().all(|x| x.abs() < 1e-6), "{pi:?}");
    }

    proptest! {
        #[test]
        fn landau_matching_inverts_ideal_fluid(
            e in 0.1f64..10.0,
            speed in 0.0f64..0.7,
            angle in 0.0f64..std::f64::consts::TAU,
        ) {
            let (vx, vy) = (speed * angle.cos(), speed * angle.sin());
            let (t, u) = perfect_fluid(e, vx, vy);
            let (e_fit, u_fit) = landau_match(&t);
            prop_assert!((e_fit - e).abs() < 1e-6 * e);
            prop_assert!((u_fit[1] - u[1]).abs() < 1e-6);
            prop_assert!((u_fit[2] - u[2]).abs() < 1e-6);
        }
    }
}
