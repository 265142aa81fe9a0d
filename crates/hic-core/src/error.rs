//! Error types for the event pipeline.
//!
//! Two layers: [`StageFailure`] describes one external program that exited
//! unsuccessfully; [`EventError`] is anything that aborts the current event.
//! [`EventFailure`] pairs an `EventError` with the pipeline [`Stage`] it came
//! from so the driver can log where an event died. Run-level conditions
//! (abort threshold, interrupt) live in the engine crate.

use std::error::Error;
use std::fmt;
use std::io;

/// An external program exited with a non-zero status or could not be spawned.
///
/// Always fatal to the current event, never to the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageFailure {
    /// Program name as invoked.
    pub program: String,
    /// Argument tokens after whitespace splitting.
    pub args: Vec<String>,
    /// Exit code, or `None` if the process was killed by a signal or never started.
    pub exit_code: Option<i32>,
    /// Captured stdout followed by captured stderr (or the spawn error).
    pub output: String,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "'{}' exited with status {code}", self.program)?,
            None => write!(f, "'{}' did not exit normally", self.program)?,
        }
        let output = self.output.trim_end_matches('\n');
        if !output.is_empty() {
            write!(f, ":\n{output}")?;
        }
        Ok(())
    }
}

impl Error for StageFailure {}

/// Anything that aborts the current event.
///
/// Caught only at the per-event boundary by the driver.
#[derive(Debug)]
pub enum EventError {
    /// An external stage failed.
    Stage(StageFailure),
    /// A hand-off file could not be read or written.
    Io(io::Error),
    /// A hand-off file was readable but structurally wrong.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl EventError {
    /// Shorthand for [`EventError::Malformed`].
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stage(e) => write!(f, "stage failure: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Malformed { detail } => write!(f, "malformed data: {detail}"),
        }
    }
}

impl Error for EventError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Stage(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Malformed { .. } => None,
        }
    }
}

impl From<StageFailure> for EventError {
    fn from(e: StageFailure) -> Self {
        Self::Stage(e)
    }
}

impl From<io::Error> for EventError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Pipeline state an event was in when it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Drawing the next initial condition from the source.
    InitialCondition,
    /// Pre-equilibrium free streaming and hand-off writing.
    Transport,
    /// Hydrodynamic evolution.
    Hydro,
    /// Particle sampling off the freeze-out surface.
    Sample,
    /// Hadronic afterburner.
    Afterburn,
    /// Observable reduction.
    Reduce,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InitialCondition => "initial condition",
            Self::Transport => "transport",
            Self::Hydro => "hydro",
            Self::Sample => "sample",
            Self::Afterburn => "afterburn",
            Self::Reduce => "reduce",
        };
        f.write_str(name)
    }
}

/// An [`EventError`] tagged with the [`Stage`] it was raised in.
#[derive(Debug)]
pub struct EventFailure {
    /// Where the event died.
    pub stage: Stage,
    /// Why it died.
    pub error: EventError,
}

impl EventFailure {
    /// Tag `error` with `stage`.
    pub fn new(stage: Stage, error: impl Into<EventError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

impl fmt::Display for EventFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage: {}", self.stage, self.error)
    }
}

impl Error for EventFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(code: Option<i32>, output: &str) -> StageFailure {
        StageFailure {
            program: "osu-hydro".into(),
            args: vec!["edec=0.3".into()],
            exit_code: code,
            output: output.into(),
        }
    }

    #[test]
    fn stage_failure_display_includes_output() {
        let msg = failure(Some(2), "segfault in solver\n\n").to_string();
        assert_eq!(msg, "'osu-hydro' exited with status 2:\nsegfault in solver");
    }

    #[test]
    fn stage_failure_display_without_output() {
        assert_eq!(
            failure(None, "").to_string(),
            "'osu-hydro' did not exit normally"
        );
    }

    #[test]
    fn event_error_sources() {
        let e = EventError::from(failure(Some(1), ""));
        assert!(e.source().is_some());
        let e = EventError::malformed("bad row");
        assert!(e.source().is_none());
        assert_eq!(e.to_string(), "malformed data: bad row");
    }

    #[test]
    fn event_failure_names_stage() {
        let f = EventFailure::new(Stage::Afterburn, failure(Some(1), ""));
        assert!(f.to_string().starts_with("afterburn stage:"));
    }
}
