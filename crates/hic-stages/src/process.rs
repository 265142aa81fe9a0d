//! External-process adapter.
//!
//! [`Invocation`] runs one program to completion. Argument groups are
//! word-split on whitespace before the program is spawned, so a
//! user-supplied option string like `"--cross-section 7.0 -p 0"` becomes
//! four tokens. A non-zero exit (or a failure to spawn at all) is a
//! [`StageFailure`] carrying whatever the program printed.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use hic_core::StageFailure;
use tracing::{debug, error, info};

/// Split each group on whitespace and concatenate the tokens.
pub fn split_args<S: AsRef<str>>(groups: &[S]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|g| g.as_ref().split_whitespace())
        .map(str::to_string)
        .collect()
}

/// What happens to the child's stdout and stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Capture both streams; logged at debug level on success and attached
    /// to the [`StageFailure`] on error.
    #[default]
    Capture,
    /// Let the child write to this process's stdout and stderr.
    Inherit,
}

/// One run of an external program.
///
/// # Examples
///
/// ```no_run
/// use hic_stages::Invocation;
///
/// let output = Invocation::new("trento")
///     .args("Pb Pb --cross-section 7.0")
///     .args("--number-events 10")
///     .current_dir("/tmp/event")
///     .run()?;
/// # Ok::<(), hic_core::StageFailure>(())
/// ```
#[derive(Clone, Debug)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    output: OutputMode,
}

impl Invocation {
    /// Start an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            output: OutputMode::default(),
        }
    }

    /// Append the whitespace-split tokens of `group`.
    pub fn args(mut self, group: impl AsRef<str>) -> Self {
        self.args.extend(split_args(&[group]));
        self
    }

    /// Append one token verbatim, without splitting.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.display().to_string());
        self
    }

    /// Run the child in `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Choose how the child's output is handled (default: capture).
    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = mode;
        self
    }

    /// The program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument tokens accumulated so far.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Run to completion.
    ///
    /// Returns the captured output (stdout then stderr; empty when
    /// inheriting).
    ///
    /// # Errors
    ///
    /// [`StageFailure`] if the program cannot be spawned or exits non-zero.
    pub fn run(&self) -> Result<String, StageFailure> {
        info!("running command: {} {}", self.program, self.args.join(" "));

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let result = match self.output {
            OutputMode::Capture => cmd.output().map(|out| {
                let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&out.stderr));
                (out.status, text)
            }),
            OutputMode::Inherit => cmd.status().map(|status| (status, String::new())),
        };

        let (status, text) = match result {
            Ok(pair) => pair,
            Err(e) => {
                error!("could not start '{}': {e}", self.program);
                return Err(self.failure(None, format!("failed to start: {e}")));
            }
        };

        if status.success() {
            let trimmed = text.trim_end_matches('\n');
            if !trimmed.is_empty() {
                debug!("{trimmed}");
            }
            Ok(text)
        } else {
            error!(
                "command failed: {} (status {:?}):\n{}",
                self.program,
                status.code(),
                text.trim_end_matches('\n')
            );
            Err(self.failure(status.code(), text))
        }
    }

    fn failure(&self, exit_code: Option<i32>, output: String) -> StageFailure {
        StageFailure {
            program: self.program.clone(),
            args: self.args.clone(),
            exit_code,
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_are_word_split() {
        let args = split_args(&["Pb Pb  --cross-section 7.0", "", "  -p 0.0 "]);
        assert_eq!(
            args,
            vec!["Pb", "Pb", "--cross-section", "7.0", "-p", "0.0"]
        );
    }

    #[test]
    fn builder_accumulates_tokens() {
        let inv = Invocation::new("afterburner")
            .args("a b")
            .arg_path(Path::new("with space.dat"));
        assert_eq!(inv.program(), "afterburner");
        assert_eq!(inv.arguments(), ["a", "b", "with space.dat"]);
    }

    #[test]
    fn missing_program_is_a_stage_failure() {
        let err = Invocation::new("hic-no-such-program-4f1c")
            .run()
            .unwrap_err();
        assert_eq!(err.exit_code, None);
        assert!(err.output.starts_with("failed to start"));
    }

    #[cfg(unix)]
    #[test]
    fn output_is_captured() {
        let out = Invocation::new("echo").args("hello world").run().unwrap();
        assert_eq!(out, "hello world\n");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_a_stage_failure() {
        let err = Invocation::new("false").run().unwrap_err();
        assert_eq!(err.program, "false");
        assert_eq!(err.exit_code, Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = Invocation::new("pwd").current_dir(dir.path()).run().unwrap();
        let reported = std::fs::canonicalize(out.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
