use crate::error::LauncherError;
use crate::library::GameLibrary;
use crate::status::StatusSender;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallResult {
    pub success: bool,
    pub error_message: String,
}

impl InstallResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error_message: String::new(),
        }
    }

    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: error_message.into(),
        }
    }
}

/// Makes sure every file the version needs is on disk. One attempt per run.
pub struct Installer {
    library: Arc<dyn GameLibrary>,
}

impl Installer {
    pub fn new(library: Arc<dyn GameLibrary>) -> Self {
        Self { library }
    }

    pub fn run(&self, version: &str, directory: &Path, status: &StatusSender) -> InstallResult {
        info!("Installing {} into {}", version, directory.display());
        status.emit("Checking and installing required libraries...");

        match self.library.ensure_installed(version, directory, status) {
            Ok(()) => {
                status.emit("Libraries installed successfully!");
                InstallResult::succeeded()
            }
            Err(e) => {
                let description = match e {
                    LauncherError::Install(message) => message,
                    other => other.to_string(),
                };
                error!("Library installation failed: {}", description);
                status.emit(format!("Error: Failed to install libraries: {description}"));
                InstallResult::failed(description)
            }
        }
    }
}
