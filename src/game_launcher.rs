use crate::error::{LauncherError, Result};
use crate::library::{maven_path, GameLibrary, LaunchOptions, ProcessRunner, RuntimeProbe};
use crate::status::StatusSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const MIN_NICKNAME_LEN: usize = 3;
pub const MAX_NICKNAME_LEN: usize = 16;
pub const MIN_RAM_GB: u32 = 1;
pub const MAX_RAM_GB: u32 = 14;

/// Offline sessions are never verified, any token will do.
pub const OFFLINE_TOKEN: &str = "0";

pub fn is_valid_nickname(nickname: &str) -> bool {
    (MIN_NICKNAME_LEN..=MAX_NICKNAME_LEN).contains(&nickname.chars().count())
}

/// Heap ceiling of `ram_gb` and a floor of half that, in whole gigabytes.
pub fn memory_arguments(ram_gb: u32) -> Vec<String> {
    vec![format!("-Xmx{}G", ram_gb), format!("-Xms{}G", ram_gb / 2)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStage {
    ValidateNickname,
    ValidateVersionPresent,
    ValidateRuntimePresent,
    ValidateCompatibilityArtifact,
    SynthesizeIdentity,
    BuildInvocation,
    Spawn,
    Report,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    version: String,
    game_directory: PathBuf,
    nickname: String,
    ram_gb: u32,
}

impl LaunchRequest {
    pub fn new(
        version: impl Into<String>,
        game_directory: impl Into<PathBuf>,
        nickname: impl Into<String>,
        ram_gb: u32,
    ) -> Self {
        Self {
            version: version.into(),
            game_directory: game_directory.into(),
            nickname: nickname.into(),
            ram_gb,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn game_directory(&self) -> &Path {
        &self.game_directory
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn ram_gb(&self) -> u32 {
        self.ram_gb
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchResult {
    pub success: bool,
    pub message: String,
    pub nickname: String,
}

impl LaunchResult {
    pub fn succeeded(message: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            nickname: nickname.into(),
        }
    }

    pub fn failed(message: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            nickname: nickname.into(),
        }
    }
}

/// Runs one offline launch attempt from validation to process exit.
pub struct GameLauncher {
    library: Arc<dyn GameLibrary>,
    runtime: Arc<dyn RuntimeProbe>,
    runner: Arc<dyn ProcessRunner>,
    compatibility_artifact: String,
    java_executable: Option<PathBuf>,
}

impl GameLauncher {
    pub fn new(
        library: Arc<dyn GameLibrary>,
        runtime: Arc<dyn RuntimeProbe>,
        runner: Arc<dyn ProcessRunner>,
        compatibility_artifact: impl Into<String>,
    ) -> Self {
        Self {
            library,
            runtime,
            runner,
            compatibility_artifact: compatibility_artifact.into(),
            java_executable: None,
        }
    }

    pub fn with_java_executable(mut self, java: impl Into<PathBuf>) -> Self {
        self.java_executable = Some(java.into());
        self
    }

    /// Never fails: every error ends up in the returned result.
    pub fn launch(&self, request: LaunchRequest, status: &StatusSender) -> LaunchResult {
        let nickname = request.nickname().to_string();

        match self.run_stages(&request, status) {
            Ok(message) => LaunchResult::succeeded(message, nickname),
            Err(e) if e.is_stage_failure() => {
                warn!("Launch for {} stopped: {}", nickname, e);
                LaunchResult::failed(e.to_string(), nickname)
            }
            Err(e) => {
                error!("Launch for {} failed: {}", nickname, e);
                status.emit(format!("Error: Failed to launch Minecraft: {e}"));
                LaunchResult::failed(format!("Failed to launch Minecraft: {e}"), nickname)
            }
        }
    }

    fn run_stages(&self, request: &LaunchRequest, status: &StatusSender) -> Result<String> {
        let nickname = request.nickname();
        let version = request.version();
        let game_dir = request.game_directory();

        enter(LaunchStage::ValidateNickname);
        if !is_valid_nickname(nickname) {
            status.emit(format!(
                "Error: Nickname must be between {MIN_NICKNAME_LEN} and {MAX_NICKNAME_LEN} characters."
            ));
            return Err(LauncherError::Validation(format!(
                "Invalid nickname: it must be between {MIN_NICKNAME_LEN} and {MAX_NICKNAME_LEN} characters long."
            )));
        }
        status.emit(format!("Trying to start Minecraft with nickname: {nickname}"));
        status.emit(format!("RAM allocation: {}GB", request.ram_gb()));

        enter(LaunchStage::ValidateVersionPresent);
        status.emit("Checking whether the version exists...");
        if !self.library.is_version_installed(version, game_dir) {
            status.emit(format!(
                "Error: Version {version} not found in {}",
                game_dir.display()
            ));
            return Err(LauncherError::Validation(format!("Version {version} not found.")));
        }
        status.emit("Version found.");

        enter(LaunchStage::ValidateRuntimePresent);
        status.emit("Checking Java installation...");
        if !self.runtime.is_available() {
            status.emit("Error: Java not found or not installed correctly.");
            return Err(LauncherError::DependencyMissing(format!(
                "Java is not installed or not on the PATH ({}). Please install Java 8.",
                self.runtime.describe()
            )));
        }
        status.emit("Java found.");

        enter(LaunchStage::ValidateCompatibilityArtifact);
        let relative = maven_path(&self.compatibility_artifact).ok_or_else(|| {
            LauncherError::Validation(format!(
                "Invalid compatibility artifact coordinate: {}",
                self.compatibility_artifact
            ))
        })?;
        let artifact_path = game_dir.join("libraries").join(&relative);
        let artifact_name = relative
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.compatibility_artifact.clone());
        status.emit(format!(
            "Checking {artifact_name} at: {}",
            artifact_path.display()
        ));
        if !artifact_path.is_file() {
            status.emit(format!(
                "Error: {artifact_name} not found at {}",
                artifact_path.display()
            ));
            return Err(LauncherError::DependencyMissing(format!(
                "{artifact_name} not found. Make sure the libraries are installed correctly."
            )));
        }
        status.emit(format!("{artifact_name} found."));

        enter(LaunchStage::SynthesizeIdentity);
        status.emit("Generating UUID for offline mode...");
        let offline_uuid = uuid::Uuid::new_v4().to_string();
        status.emit(format!("Generated UUID: {offline_uuid}"));

        enter(LaunchStage::BuildInvocation);
        status.emit("Preparing launch options...");
        let options = LaunchOptions {
            username: nickname.to_string(),
            uuid: offline_uuid,
            token: OFFLINE_TOKEN.to_string(),
            game_directory: game_dir.to_path_buf(),
            version: version.to_string(),
            jvm_arguments: memory_arguments(request.ram_gb()),
            executable_path: self.java_executable.clone(),
        };
        status.emit("Generating launch command...");
        let command = self.library.build_launch_command(version, game_dir, &options)?;
        status.emit(format!("Launch command: {}", command.join(" ")));

        enter(LaunchStage::Spawn);
        status.emit("Launching Minecraft...");
        let outcome = self.runner.run(&command, game_dir)?;

        enter(LaunchStage::Report);
        if outcome.success() {
            info!("Minecraft exited cleanly for {}", nickname);
            status.emit("Minecraft started successfully!");
            Ok(format!("Minecraft started in offline mode as {nickname}!"))
        } else {
            let code = outcome
                .exit_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "none (terminated by signal)".to_string());
            status.emit(format!("Error: Minecraft process failed with exit code {code}"));
            status.emit(format!("Process output: {}", outcome.stderr));
            Err(LauncherError::LaunchProcess(
                "Failed to start Minecraft. Check the logs for details.".to_string(),
            ))
        }
    }
}

fn enter(stage: LaunchStage) {
    debug!(?stage, "entering launch stage");
}
