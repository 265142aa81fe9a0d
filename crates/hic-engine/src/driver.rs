//! The event loop.
//!
//! Pulls one initial condition at a time, runs it through the
//! [`Pipeline`], and appends the record. Per-event failures are counted,
//! logged and skipped; the run itself only stops on exhaustion of the
//! source, on the abort threshold, or on cancellation.

use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hic_core::{EventError, EventFailure, InitialConditionGrid, Stage};
use hic_io::{CodecError, RecordWriter};
use tracing::{error, info, warn};

use crate::cancel::CancelToken;
use crate::checkpoint::Checkpoint;
use crate::config::{AbortPolicy, ConfigError};
use crate::event::{EventOutcome, Pipeline};

// ── RunError ───────────────────────────────────────────────────────

/// Errors that end the whole run.
#[derive(Debug)]
pub enum RunError {
    /// Configuration was rejected before any event ran.
    Config(ConfigError),
    /// The results file could not be opened or written.
    Output(io::Error),
    /// The scratch workspace or checkpoint could not be managed.
    Workspace(io::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Output(e) => write!(f, "cannot write results: {e}"),
            Self::Workspace(e) => write!(f, "scratch workspace error: {e}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Output(e) | Self::Workspace(e) => Some(e),
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CodecError> for RunError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Io(e) => Self::Output(e),
            other => Self::Output(io::Error::other(other.to_string())),
        }
    }
}

// ── Summary ────────────────────────────────────────────────────────

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The source ran out (the requested number of events was reached).
    Exhausted,
    /// The failure threshold was exceeded.
    Aborted,
    /// Cancellation was requested.
    Interrupted,
}

/// Counters threaded through the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopState {
    /// Events that ran to an outcome or a failure.
    pub attempted: u64,
    /// Events that failed.
    pub failures: u64,
    /// Records written.
    pub written: u64,
    /// Records written for early-ended events.
    pub early_ends: u64,
}

/// What a finished run did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Events that ran to an outcome or a failure.
    pub attempted: u64,
    /// Events that failed.
    pub failures: u64,
    /// Records written.
    pub written: u64,
    /// Records written for early-ended events.
    pub early_ends: u64,
    /// Why the run stopped.
    pub stop: StopReason,
}

impl RunSummary {
    fn new(state: LoopState, stop: StopReason) -> Self {
        Self {
            attempted: state.attempted,
            failures: state.failures,
            written: state.written,
            early_ends: state.early_ends,
            stop,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} events attempted, {} records written ({} early ends), {} failures, stopped: {:?}",
            self.attempted, self.written, self.early_ends, self.failures, self.stop
        )
    }
}

// ── EventLoop ──────────────────────────────────────────────────────

/// Drives events through a [`Pipeline`] into a [`RecordWriter`].
pub struct EventLoop<'a, W: Write> {
    pipeline: Pipeline<'a>,
    writer: RecordWriter<W>,
    workspace: PathBuf,
    abort: AbortPolicy,
    cancel: CancelToken,
    checkpoint: Option<Checkpoint>,
}

impl<'a, W: Write> EventLoop<'a, W> {
    /// Event scratch directories are created inside `workspace`.
    pub fn new(pipeline: Pipeline<'a>, writer: RecordWriter<W>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            writer,
            workspace: workspace.into(),
            abort: AbortPolicy::default(),
            cancel: CancelToken::new(),
            checkpoint: None,
        }
    }

    /// Replace the failure threshold.
    pub fn with_abort_policy(mut self, abort: AbortPolicy) -> Self {
        self.abort = abort;
        self
    }

    /// Poll `cancel` between events.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Save each event's initial condition to `checkpoint` while it runs.
    pub fn with_checkpoint(mut self, checkpoint: Checkpoint) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    /// Consume the loop and return the writer.
    pub fn into_writer(self) -> RecordWriter<W> {
        self.writer
    }

    /// Run until `source` is exhausted, the abort threshold trips, or
    /// cancellation is requested.
    ///
    /// Records are written in source order. The writer is flushed before
    /// returning on every path.
    pub fn run<I>(&mut self, source: I) -> Result<RunSummary, RunError>
    where
        I: IntoIterator<Item = Result<InitialConditionGrid, EventError>>,
    {
        let mut source = source.into_iter();
        let mut state = LoopState::default();
        let stop = loop {
            if self.cancel.is_requested() {
                break StopReason::Interrupted;
            }
            let Some(item) = source.next() else {
                break StopReason::Exhausted;
            };
            // Generating the next grid can take a while.
            if self.cancel.is_requested() {
                break StopReason::Interrupted;
            }
            let index = state.attempted;

            let result = match item {
                Ok(ic) => match self.run_one(index, &ic)? {
                    Some(result) => result,
                    None => break StopReason::Interrupted,
                },
                Err(e) => Err(EventFailure::new(Stage::InitialCondition, e)),
            };

            state.attempted += 1;
            match result {
                Ok(outcome) => {
                    self.writer.append(&outcome.record())?;
                    state.written += 1;
                    if let EventOutcome::EarlyEnd(reason) = outcome {
                        info!("event {index}: ended early ({reason:?}), wrote zero record");
                        state.early_ends += 1;
                    }
                }
                Err(failure) => {
                    state.failures += 1;
                    warn!("event {index} failed in {failure}");
                }
            }

            if self.abort.should_abort(state.attempted, state.failures) {
                error!(
                    "{} of {} events failed, aborting run",
                    state.failures, state.attempted
                );
                break StopReason::Aborted;
            }
        };

        self.writer.flush()?;
        let summary = RunSummary::new(state, stop);
        info!("{summary}");
        Ok(summary)
    }

    /// Run one event in a fresh scratch directory.
    ///
    /// `None` means cancellation arrived while the event ran: its result is
    /// dropped and its checkpoint kept.
    fn run_one(
        &mut self,
        index: u64,
        ic: &InitialConditionGrid,
    ) -> Result<Option<Result<EventOutcome, EventFailure>>, RunError> {
        if let Some(cp) = &self.checkpoint {
            cp.save(ic).map_err(RunError::Workspace)?;
        }

        let dir = event_dir(&self.workspace, index).map_err(RunError::Workspace)?;
        let result = self.pipeline.run_event(index, ic, dir.path());
        drop(dir);

        if self.cancel.is_requested() {
            warn!("event {index} interrupted, result discarded");
            return Ok(None);
        }
        if let Some(cp) = &self.checkpoint {
            cp.clear().map_err(RunError::Workspace)?;
        }
        Ok(Some(result))
    }
}

fn event_dir(workspace: &Path, index: u64) -> io::Result<tempfile::TempDir> {
    tempfile::Builder::new()
        .prefix(&format!("event-{index}-"))
        .tempdir_in(workspace)
}
