//! Checkpoint of the in-flight event's initial condition.
//!
//! The grid is saved before its event starts and cleared once the event
//! has been emitted, failed or ended early. A file left behind means the
//! run was interrupted mid-event; the next run replays it first.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use hic_core::{EventError, GridSpec, InitialConditionGrid};
use hic_stages::initial::{read_initial_condition, write_initial_condition};

/// A checkpoint file location.
#[derive(Clone, Debug)]
pub struct Checkpoint {
    path: PathBuf,
}

impl Checkpoint {
    /// Checkpoint at `path`. Nothing is touched until [`save`](Self::save).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `ic`, creating parent directories.
    pub fn save(&self, ic: &InitialConditionGrid) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        write_initial_condition(&self.path, ic)
    }

    /// Load a leftover grid, if any.
    pub fn load(&self, grid: &GridSpec) -> Result<Option<InitialConditionGrid>, EventError> {
        if !self.path.exists() {
            return Ok(None);
        }
        read_initial_condition(&self.path, Some(grid)).map(Some)
    }

    /// Remove the file; a missing file is fine.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
