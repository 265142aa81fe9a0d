//! Pre-equilibrium stage: free streaming or raw pass-through.

use std::path::Path;

use hic_core::{EventError, Grid2, GridSpec, Handoff, HandoffKind, InitialConditionGrid};
use hic_io::tabular::write_grid;
use tracing::debug;

use crate::freestream::FreeStreamer;
use crate::handoff::{ED_FILE, PI11_FILE, PI12_FILE, PI22_FILE, SD_FILE, U1_FILE, U2_FILE};

/// Ratio of total energy to energy in cells above `e_switch`.
///
/// Exactly 1.0 when no cell is above the threshold.
pub fn mult_factor(energy: &Grid2, e_switch: f64) -> f64 {
    let above: f64 = energy
        .as_slice()
        .iter()
        .filter(|&&e| e > e_switch)
        .sum();
    if above > 0.0 {
        energy.sum() / above
    } else {
        1.0
    }
}

/// Writes the hydro hand-off for one event.
#[derive(Clone, Copy, Debug)]
pub struct PreEquilibrium {
    grid: GridSpec,
    tau_fs: Option<f64>,
}

impl PreEquilibrium {
    /// Free-stream to `tau_fs` when given; otherwise hand off the raw density.
    pub fn new(grid: GridSpec, tau_fs: Option<f64>) -> Self {
        Self { grid, tau_fs }
    }

    /// The hand-off format this stage produces.
    pub fn kind(&self) -> HandoffKind {
        match self.tau_fs {
            Some(tau) => HandoffKind::FreeStreamed { tau },
            None => HandoffKind::Raw,
        }
    }

    /// Write the hand-off files for `ic` into `workdir`.
    pub fn run(
        &self,
        ic: &InitialConditionGrid,
        e_switch: f64,
        workdir: &Path,
    ) -> Result<Handoff, EventError> {
        let Some(tau) = self.tau_fs else {
            write_grid(&workdir.join(SD_FILE), ic.density())?;
            return Ok(Handoff {
                kind: HandoffKind::Raw,
                mult_factor: 1.0,
            });
        };

        let fields = FreeStreamer::new(ic.density(), &self.grid, tau).fields();
        let factor = mult_factor(&fields.energy_density, e_switch);
        debug!("free-streamed to tau = {tau} fm/c, mult_factor = {factor}");

        for (name, grid) in [
            (ED_FILE, &fields.energy_density),
            (U1_FILE, &fields.u1),
            (U2_FILE, &fields.u2),
            (PI11_FILE, &fields.pi11),
            (PI12_FILE, &fields.pi12),
            (PI22_FILE, &fields.pi22),
        ] {
            write_grid(&workdir.join(name), grid)?;
        }

        Ok(Handoff {
            kind: HandoffKind::FreeStreamed { tau },
            mult_factor: factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hic_io::tabular::read_matrix;

    fn grid() -> GridSpec {
        GridSpec { step: 0.5, max: 2.0 }
    }

    fn blob() -> InitialConditionGrid {
        let spec = grid();
        let n = spec.cells();
        let mut g = Grid2::zeros(n, n);
        for r in 2..6 {
            for c in 2..6 {
                *g.get_mut(r, c) = 10.0;
            }
        }
        InitialConditionGrid::with_multiplicity(g, 160.0)
    }

    #[test]
    fn mult_factor_is_one_below_threshold() {
        let e = Grid2::from_vec(2, 2, vec![0.1, 0.2, 0.0, 0.3]).unwrap();
        assert_eq!(mult_factor(&e, 0.5), 1.0);
        assert_eq!(mult_factor(&Grid2::zeros(3, 3), 0.0), 1.0);
    }

    #[test]
    fn mult_factor_is_total_over_above() {
        let e = Grid2::from_vec(2, 2, vec![1.0, 1.0, 2.0, 4.0]).unwrap();
        assert_eq!(mult_factor(&e, 1.5), 8.0 / 6.0);
    }

    #[test]
    fn raw_handoff_writes_density_only() {
        let dir = tempfile::tempdir().unwrap();
        let ic = blob();
        let handoff = PreEquilibrium::new(grid(), None)
            .run(&ic, 0.3, dir.path())
            .unwrap();
        assert_eq!(handoff.kind, HandoffKind::Raw);
        assert_eq!(handoff.mult_factor, 1.0);
        let back = Grid2::from_rows(read_matrix(&dir.path().join(SD_FILE)).unwrap()).unwrap();
        assert_eq!(&back, ic.density());
        assert!(!dir.path().join(ED_FILE).exists());
    }

    #[test]
    fn free_streamed_handoff_writes_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let stage = PreEquilibrium::new(grid(), Some(0.5));
        let handoff = stage.run(&blob(), 1e9, dir.path()).unwrap();
        assert_eq!(handoff.kind, HandoffKind::FreeStreamed { tau: 0.5 });
        assert_eq!(handoff.mult_factor, 1.0);
        for name in [ED_FILE, U1_FILE, U2_FILE, PI11_FILE, PI12_FILE, PI22_FILE] {
            let rows = read_matrix(&dir.path().join(name)).unwrap();
            assert_eq!(rows.len(), grid().cells(), "{name}");
        }
        assert!(!dir.path().join(SD_FILE).exists());
    }
}
