//! Hydrodynamic stage adapter.
//!
//! Runs the solver in the event directory, where it picks up the
//! pre-equilibrium hand-off files by name and leaves
//! [`SURFACE_FILE`](crate::handoff::SURFACE_FILE) behind.

use std::io::ErrorKind;
use std::path::Path;

use hic_core::{
    EventError, FreezeOutSurface, GridSpec, Handoff, HandoffKind, HydroStage, SURFACE_COLUMNS,
};
use hic_io::tabular::{expect_columns, parse_token, read_rows};
use hic_io::TableError;
use tracing::debug;

use crate::handoff::SURFACE_FILE;
use crate::process::Invocation;

/// Read a freeze-out surface table.
///
/// A missing file is malformed output; an empty one is an empty surface.
pub fn read_surface(path: &Path) -> Result<FreezeOutSurface, EventError> {
    let rows = read_rows(path, |tokens, line| {
        expect_columns(tokens, line, SURFACE_COLUMNS)?;
        let row: Vec<f64> = (0..SURFACE_COLUMNS)
            .map(|c| parse_token(tokens, line, c))
            .collect::<Result<_, _>>()?;
        Ok(row)
    });
    let rows = match rows {
        Ok(rows) => rows,
        Err(TableError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            return Err(EventError::malformed(format!(
                "hydro produced no surface file at {}",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };
    FreezeOutSurface::from_rows(&rows)
}

/// The `osu-hydro` solver.
#[derive(Clone, Debug)]
pub struct OsuHydro {
    program: String,
    extra_args: String,
    grid: GridSpec,
    e_switch: f64,
}

impl OsuHydro {
    /// `extra_args` are passed through before the derived flags;
    /// `e_switch` is the switching energy density in GeV/fm³.
    pub fn new(
        program: impl Into<String>,
        extra_args: impl Into<String>,
        grid: GridSpec,
        e_switch: f64,
    ) -> Self {
        Self {
            program: program.into(),
            extra_args: extra_args.into(),
            grid,
            e_switch,
        }
    }

    /// The solver invocation for `handoff`.
    pub fn invocation(&self, handoff: &Handoff) -> Invocation {
        let mut inv = Invocation::new(&self.program).args(&self.extra_args);
        inv = match handoff.kind {
            HandoffKind::FreeStreamed { tau } => inv.args(format!("initial=fs t0={tau}")),
            HandoffKind::Raw => inv.args("initial=raw"),
        };
        let nls = self.grid.cells().saturating_sub(1) / 2;
        inv.args(format!(
            "dxy={} nls={nls} edec={}",
            self.grid.step, self.e_switch
        ))
    }
}

impl HydroStage for OsuHydro {
    fn evolve(&self, handoff: &Handoff, workdir: &Path) -> Result<FreezeOutSurface, EventError> {
        self.invocation(handoff).current_dir(workdir).run()?;
        let surface = read_surface(&workdir.join(SURFACE_FILE))?;
        debug!("freeze-out surface has {} elements", surface.len());
        Ok(surface)
    }
}
