use crate::error::{LauncherError, Result};
use crate::library::{ProcessOutcome, ProcessRunner, RuntimeProbe};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// The Java runtime found on this machine.
#[derive(Debug, Clone)]
pub struct SystemRuntime {
    executable: PathBuf,
}

impl SystemRuntime {
    /// Resolves bare names through PATH; explicit paths are kept as given.
    pub fn new(java: impl Into<PathBuf>) -> Self {
        let java = java.into();
        let executable = if java.components().count() == 1 {
            which::which(&java).unwrap_or(java)
        } else {
            java
        };
        Self { executable }
    }
}

impl RuntimeProbe for SystemRuntime {
    fn is_available(&self) -> bool {
        match Command::new(&self.executable)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => {
                // `java -version` reports on stderr.
                let banner = String::from_utf8_lossy(&output.stderr);
                debug!("{} -version: {}", self.executable.display(), banner.trim());
                output.status.success()
            }
            Err(e) => {
                warn!("Failed to run {} -version: {}", self.executable.display(), e);
                false
            }
        }
    }

    fn describe(&self) -> String {
        self.executable.display().to_string()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, argv: &[String], working_directory: &Path) -> Result<ProcessOutcome> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| LauncherError::LaunchProcess("Launch command is empty".to_string()))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!("Generated command: {:?}", cmd);

        let output = cmd.output()?;
        let outcome = ProcessOutcome {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        info!("{} exited with {:?}", program, outcome.exit_code);
        Ok(outcome)
    }
}
