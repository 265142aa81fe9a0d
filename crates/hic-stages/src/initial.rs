//! Initial-condition source.
//!
//! [`TrentoSource::generate`] runs the IC generator once for a batch of
//! events. The generator writes one self-describing text file per event
//! (`# key = value` header lines, then the density grid) into a fresh
//! scratch directory; [`IcBatch`] yields those files one at a time and
//! removes the directory when dropped.
//!
//! [`TrentoSource::events`] hides the batching: with a limit it generates
//! the whole run in one batch, without one it keeps generating batches of
//! [`DEFAULT_BATCH_SIZE`] forever, so at most one batch sits on disk at a
//! time.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use hic_core::{EventError, Grid2, GridSpec, InitialConditionGrid};
use hic_io::tabular::{parse_header, parse_matrix, read_text, write_grid_rows, write_header};
use tempfile::TempDir;
use tracing::debug;

use crate::handoff::IC_BATCH_DIR;
use crate::process::Invocation;

/// Batch size used when no event limit is given.
pub const DEFAULT_BATCH_SIZE: u64 = 10;

/// Read one IC file: header metadata plus density grid.
///
/// When `grid` is given the density must be `n × n` for its cell count.
pub fn read_initial_condition(
    path: &Path,
    grid: Option<&GridSpec>,
) -> Result<InitialConditionGrid, EventError> {
    let text = read_text(path)?;
    let metadata = parse_header(&text);
    let density = Grid2::from_rows(parse_matrix(&text)?)
        .ok_or_else(|| EventError::malformed(format!("{}: ragged grid", path.display())))?;
    if let Some(spec) = grid {
        let n = spec.cells();
        if density.rows() != n || density.cols() != n {
            return Err(EventError::malformed(format!(
                "{}: grid is {}x{}, expected {n}x{n}",
                path.display(),
                density.rows(),
                density.cols()
            )));
        }
    }
    Ok(InitialConditionGrid::new(density, metadata))
}

/// Write `ic` in the same format the generator uses.
pub fn write_initial_condition(path: &Path, ic: &InitialConditionGrid) -> io::Result<()> {
    let mut w = BufWriter::new(fs::File::create(path)?);
    write_header(&mut w, ic.metadata())?;
    write_grid_rows(&mut w, ic.density())?;
    w.flush()
}

/// Runs the IC generator.
#[derive(Clone, Debug)]
pub struct TrentoSource {
    program: String,
    args: String,
    grid: GridSpec,
    scratch: PathBuf,
}

impl TrentoSource {
    /// `args` is the user's generator option string, passed through verbatim.
    /// Batch directories are created under `scratch`.
    pub fn new(
        program: impl Into<String>,
        args: impl Into<String>,
        grid: GridSpec,
        scratch: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into(),
            grid,
            scratch: scratch.into(),
        }
    }

    /// The generator invocation for a batch of `count` events written to `output`.
    pub fn invocation(&self, count: u64, output: &Path) -> Invocation {
        Invocation::new(&self.program)
            .args(&self.args)
            .args(format!("--number-events {count}"))
            .args(format!(
                "--grid-step {} --grid-max {}",
                self.grid.step, self.grid.max
            ))
            .args("--output")
            .arg_path(output)
    }

    /// Generate `count` grids and return them as a lazy batch.
    ///
    /// # Errors
    ///
    /// [`EventError::Stage`] if the generator fails;
    /// [`EventError::Malformed`] if it succeeds but writes no event files.
    pub fn generate(&self, count: u64) -> Result<IcBatch, EventError> {
        fs::create_dir_all(&self.scratch)?;
        let dir = tempfile::Builder::new()
            .prefix("ic-batch-")
            .tempdir_in(&self.scratch)?;
        let output = dir.path().join(IC_BATCH_DIR);
        self.invocation(count, &output).run()?;

        let mut files: Vec<PathBuf> = fs::read_dir(&output)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "dat"))
            .collect();
        // Zero-padded or not, shorter stems sort first.
        files.sort_by_key(|p| {
            let stem = p
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            (stem.len(), stem)
        });
        if files.is_empty() {
            return Err(EventError::malformed(format!(
                "'{}' wrote no event files to {}",
                self.program,
                output.display()
            )));
        }
        debug!("generated {} initial conditions", files.len());

        Ok(IcBatch {
            _dir: dir,
            files: files.into_iter(),
            grid: self.grid,
        })
    }

    /// Turn the source into a lazy event sequence.
    ///
    /// `Some(n)` yields exactly `n` items from a single batch; `None` yields
    /// forever in batches of [`DEFAULT_BATCH_SIZE`]. A failed generator run
    /// yields one `Err` item and counts against the limit.
    pub fn events(self, limit: Option<u64>) -> IcStream {
        let batch_size = limit.unwrap_or(DEFAULT_BATCH_SIZE);
        IcStream {
            source: self,
            batch_size,
            remaining: limit,
            current: None,
        }
    }
}

/// Grids from one generator run. The batch directory lives as long as this does.
pub struct IcBatch {
    _dir: TempDir,
    files: std::vec::IntoIter<PathBuf>,
    grid: GridSpec,
}

impl IcBatch {
    /// Grids not yet yielded.
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl Iterator for IcBatch {
    type Item = Result<InitialConditionGrid, EventError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        Some(read_initial_condition(&path, Some(&self.grid)))
    }
}

/// Bounded or unbounded sequence of grids over successive batches.
pub struct IcStream {
    source: TrentoSource,
    batch_size: u64,
    remaining: Option<u64>,
    current: Option<IcBatch>,
}

impl Iterator for IcStream {
    type Item = Result<InitialConditionGrid, EventError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            self.current = None;
            return None;
        }
        let item = match self.current.as_mut().and_then(Iterator::next) {
            Some(item) => item,
            None => {
                // Drop the spent batch (and its directory) before generating.
                self.current = None;
                let size = self.remaining.map_or(self.batch_size, |r| r.min(self.batch_size));
                match self.source.generate(size) {
                    Ok(mut batch) => match batch.next() {
                        Some(item) => {
                            self.current = Some(batch);
                            item
                        }
                        None => Err(EventError::malformed("empty IC batch")),
                    },
                    Err(e) => Err(e),
                }
            }
        };
        if let Some(r) = self.remaining.as_mut() {
            *r -= 1;
        }
        Some(item)
    }
}
