//! Run configuration, validation, and error types.
//!
//! [`RunConfig`] collects everything a run needs. [`validate()`](RunConfig::validate)
//! checks it once at startup, before any file is created or any event runs.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use hic_core::GridSpec;
use hic_obs::Acceptance;
use hic_sampler::SamplingPolicy;

// ── AbortPolicy ────────────────────────────────────────────────────

/// When accumulated event failures end the whole run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbortPolicy {
    /// Failures tolerated regardless of rate. Default: 3.
    pub min_failures: u64,
    /// Failure fraction of attempted events above which the run stops. Default: 0.5.
    pub max_failure_rate: f64,
}

impl Default for AbortPolicy {
    fn default() -> Self {
        Self {
            min_failures: 3,
            max_failure_rate: 0.5,
        }
    }
}

impl AbortPolicy {
    /// `true` if more than `min_failures` events failed and the failure
    /// rate exceeds `max_failure_rate`.
    pub fn should_abort(&self, attempted: u64, failures: u64) -> bool {
        attempted > 0
            && failures > self.min_failures
            && failures as f64 / attempted as f64 > self.max_failure_rate
    }
}

// ── ProgramNames ───────────────────────────────────────────────────

/// Names (or paths) of the external programs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramNames {
    /// Initial-condition generator. Default: `trento`.
    pub trento: String,
    /// Hydrodynamic solver. Default: `osu-hydro`.
    pub hydro: String,
    /// Hadronic afterburner. Default: `afterburner`.
    pub afterburner: String,
}

impl Default for ProgramNames {
    fn default() -> Self {
        Self {
            trento: "trento".into(),
            hydro: "osu-hydro".into(),
            afterburner: "afterburner".into(),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected before the run starts.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The rank environment variable is not set.
    RankVarUnset {
        /// Name of the variable.
        var: String,
    },
    /// The rank could not be formatted as an integer.
    InvalidRank {
        /// Name of the variable.
        var: String,
        /// Its value.
        value: String,
    },
    /// The rank format string is not one of the supported forms.
    InvalidRankFormat {
        /// The format string.
        format: String,
    },
    /// A numeric option is out of range.
    InvalidValue {
        /// Option name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RankVarUnset { var } => {
                write!(f, "rank variable {var} is not set")
            }
            Self::InvalidRank { var, value } => {
                write!(f, "rank variable {var} = '{value}' is not an integer")
            }
            Self::InvalidRankFormat { format } => {
                write!(f, "unsupported rank format '{format}'")
            }
            Self::InvalidValue { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── RunConfig ──────────────────────────────────────────────────────

/// Everything one run needs.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Results file; records are appended.
    pub results: PathBuf,
    /// Number of events; `None` runs until interrupted.
    pub nevents: Option<u64>,
    /// Parent of the run's scratch workspace; system temp dir if `None`.
    pub tmpdir: Option<PathBuf>,
    /// Checkpoint file for the in-flight event's initial condition.
    pub checkpoint: Option<PathBuf>,
    /// Collision system and generator options, passed through verbatim.
    pub trento_args: String,
    /// Free-streaming time in fm/c; `None` disables free streaming.
    pub tau_fs: Option<f64>,
    /// Extra hydro options, passed through verbatim.
    pub hydro_args: String,
    /// Particlization temperature in GeV.
    pub t_switch: f64,
    /// Results write buffer in bytes; 0 writes every record straight through.
    pub buffering: usize,
    /// Sampler seed.
    pub seed: u64,
    /// Transverse grid shared by every stage.
    pub grid: GridSpec,
    /// Adaptive sampling stop rule.
    pub sampling: SamplingPolicy,
    /// Failure threshold for ending the run.
    pub abort: AbortPolicy,
    /// External program names.
    pub programs: ProgramNames,
    /// Observable cuts.
    pub acceptance: Acceptance,
}

impl RunConfig {
    /// A config with defaults for everything but the results path and
    /// generator options.
    pub fn new(results: impl Into<PathBuf>, trento_args: impl Into<String>) -> Self {
        Self {
            results: results.into(),
            nevents: None,
            tmpdir: None,
            checkpoint: None,
            trento_args: trento_args.into(),
            tau_fs: None,
            hydro_args: String::new(),
            t_switch: 0.150,
            buffering: 0,
            seed: 0,
            grid: GridSpec::default(),
            sampling: SamplingPolicy::default(),
            abort: AbortPolicy::default(),
            programs: ProgramNames::default(),
            acceptance: Acceptance::default(),
        }
    }

    /// Check numeric options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: String| Err(ConfigError::InvalidValue { field, reason });

        if !self.grid.is_valid() {
            return invalid(
                "grid",
                format!("step {} and max {} must be positive", self.grid.step, self.grid.max),
            );
        }
        if self.grid.cells() % 2 == 0 {
            return invalid(
                "grid",
                format!("{} cells per axis; the hydro lattice needs an odd count", self.grid.cells()),
            );
        }
        if !(self.t_switch.is_finite() && self.t_switch > 0.0) {
            return invalid("Tswitch", format!("{} must be positive", self.t_switch));
        }
        if let Some(tau) = self.tau_fs {
            if !(tau.is_finite() && tau > 0.0) {
                return invalid("tau-fs", format!("{tau} must be positive"));
            }
        }
        if let Err(reason) = self.sampling.validate() {
            return invalid("sampling", reason);
        }
        let rate = self.abort.max_failure_rate;
        if !(0.0..=1.0).contains(&rate) {
            return invalid("abort", format!("failure rate {rate} outside [0, 1]"));
        }
        Ok(())
    }
}
