//! Hadronic afterburner adapter.

use std::path::Path;

use hic_core::{Afterburner, EventError};

use crate::process::Invocation;

/// Runs the afterburner as `<program> <input> <output>` in the event directory.
#[derive(Clone, Debug)]
pub struct UrqmdAfterburner {
    program: String,
}

impl UrqmdAfterburner {
    /// Wrap the named afterburner program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The invocation for one particle list.
    pub fn invocation(&self, input: &Path, output: &Path) -> Invocation {
        Invocation::new(&self.program)
            .arg_path(input)
            .arg_path(output)
    }
}

impl Afterburner for UrqmdAfterburner {
    fn run(&self, input: &Path, output: &Path, workdir: &Path) -> Result<(), EventError> {
        self.invocation(input, output).current_dir(workdir).run()?;
        if !output.exists() {
            return Err(EventError::malformed(format!(
                "'{}' wrote no output at {}",
                self.program,
                output.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::{PARTICLES_IN_FILE, PARTICLES_OUT_FILE};

    #[test]
    fn positional_file_arguments() {
        let inv = UrqmdAfterburner::new("afterburner")
            .invocation(Path::new(PARTICLES_IN_FILE), Path::new(PARTICLES_OUT_FILE));
        assert_eq!(inv.arguments(), ["particles_in.dat", "particles_out.dat"]);
    }

    #[cfg(unix)]
    #[test]
    fn copies_through_a_shell_stand_in() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join(PARTICLES_IN_FILE);
        let output = dir.path().join(PARTICLES_OUT_FILE);
        std::fs::write(&input, "# 0\n").unwrap();
        UrqmdAfterburner::new("cp")
            .run(&input, &output, dir.path())
            .unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "# 0\n");
    }

    #[cfg(unix)]
    #[test]
    fn failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let err = UrqmdAfterburner::new("false")
            .run(Path::new("a"), Path::new("b"), dir.path())
            .unwrap_err();
        assert!(matches!(err, EventError::Stage(_)));
    }
}
