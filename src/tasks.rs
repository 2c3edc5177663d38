use crate::config::Config;
use crate::game_launcher::{GameLauncher, LaunchRequest, LaunchResult};
use crate::installer::{InstallResult, Installer};
use crate::library::{GameLibrary, ProcessRunner, RuntimeProbe};
use crate::minecraft::MinecraftLibrary;
use crate::runtime::{SystemProcessRunner, SystemRuntime};
use crate::status::{StatusSender, Workflow};
use poll_promise::Promise;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Shared by every front end: where the game lives, which version to run,
/// the collaborators and the status channel the workflows report on.
#[derive(Clone)]
pub struct AppContext {
    pub game_directory: PathBuf,
    pub version: String,
    pub compatibility_artifact: String,
    pub java_executable: PathBuf,
    pub library: Arc<dyn GameLibrary>,
    pub runtime: Arc<dyn RuntimeProbe>,
    pub runner: Arc<dyn ProcessRunner>,
    pub status: StatusSender,
}

impl AppContext {
    pub fn from_config(config: &Config, status: StatusSender) -> Self {
        Self {
            game_directory: config.game.directory.clone(),
            version: config.game.version.clone(),
            compatibility_artifact: config.game.compatibility_artifact.clone(),
            java_executable: config.java.executable.clone(),
            library: Arc::new(MinecraftLibrary::new()),
            runtime: Arc::new(SystemRuntime::new(config.java.executable.clone())),
            runner: Arc::new(SystemProcessRunner),
            status,
        }
    }

    pub fn launch_request(&self, nickname: &str, ram_gb: u32) -> LaunchRequest {
        LaunchRequest::new(&self.version, &self.game_directory, nickname, ram_gb)
    }

    /// Starts the installer on its own thread.
    pub fn spawn_install(&self) -> Promise<InstallResult> {
        let installer = Installer::new(Arc::clone(&self.library));
        let version = self.version.clone();
        let directory = self.game_directory.clone();
        let status = self.status.for_workflow(Workflow::Installer);

        info!("Starting installer for {}", version);
        Promise::spawn_thread("library_installer", move || {
            guarded(
                || installer.run(&version, &directory, &status),
                |description| {
                    status.emit(format!("Error: Failed to install libraries: {description}"));
                    InstallResult::failed(description)
                },
            )
        })
    }

    /// Starts one launch attempt on its own thread; the request moves with it.
    pub fn spawn_launch(&self, request: LaunchRequest) -> Promise<LaunchResult> {
        let launcher = GameLauncher::new(
            Arc::clone(&self.library),
            Arc::clone(&self.runtime),
            Arc::clone(&self.runner),
            self.compatibility_artifact.clone(),
        )
        .with_java_executable(self.java_executable.clone());
        let status = self.status.for_workflow(Workflow::Launcher);

        let nickname = request.nickname().to_string();
        info!("Starting launch for {}", nickname);
        Promise::spawn_thread("game_launcher", move || {
            guarded(
                || launcher.launch(request, &status),
                |description| {
                    LaunchResult::failed(format!("Failed to launch Minecraft: {description}"), nickname)
                },
            )
        })
    }
}

/// A worker that panics still resolves its promise, through `on_panic`.
fn guarded<T>(work: impl FnOnce() -> T, on_panic: impl FnOnce(String) -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(value) => value,
        Err(payload) => {
            let description = panic_message(payload.as_ref());
            error!("Background task panicked: {}", description);
            on_panic(description)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
