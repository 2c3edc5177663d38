use crate::error::Result;
use crate::status::StatusSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options handed to the game library when it builds the launch command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchOptions {
    pub username: String,
    pub uuid: String,
    pub token: String,
    pub game_directory: PathBuf,
    pub version: String,
    pub jvm_arguments: Vec<String>,
    /// Java executable; `java` from PATH when unset.
    pub executable_path: Option<PathBuf>,
}

/// Everything version resolution, downloading and command construction needs.
#[cfg_attr(test, mockall::automock)]
pub trait GameLibrary: Send + Sync {
    /// Idempotent: files already present are left alone.
    fn ensure_installed(&self, version: &str, directory: &Path, status: &StatusSender) -> Result<()>;

    fn is_version_installed(&self, version: &str, directory: &Path) -> bool;

    fn build_launch_command(
        &self,
        version: &str,
        directory: &Path,
        options: &LaunchOptions,
    ) -> Result<Vec<String>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RuntimeProbe: Send + Sync {
    fn is_available(&self) -> bool;

    fn describe(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    /// Runs `argv[0]` with the remaining arguments and waits for it to exit.
    fn run(&self, argv: &[String], working_directory: &Path) -> Result<ProcessOutcome>;
}

/// Relative path of a maven coordinate (`group:artifact:version[:classifier][@ext]`).
pub fn maven_path(coordinate: &str) -> Option<PathBuf> {
    let (coords, extension) = match coordinate.split_once('@') {
        Some((coords, ext)) => (coords, ext),
        None => (coordinate, "jar"),
    };

    let mut parts = coords.split(':');
    let group = parts.next().filter(|s| !s.is_empty())?;
    let artifact = parts.next().filter(|s| !s.is_empty())?;
    let version = parts.next().filter(|s| !s.is_empty())?;
    let classifier = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let file_name = match classifier {
        Some(classifier) => format!("{artifact}-{version}-{classifier}.{extension}"),
        None => format!("{artifact}-{version}.{extension}"),
    };

    let mut path: PathBuf = group.split('.').collect();
    path.push(artifact);
    path.push(version);
    path.push(file_name);
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn authlib_coordinate_maps_to_library_layout() {
        assert_eq!(
            maven_path("com.mojang:authlib:1.5.21"),
            Some(PathBuf::from("com/mojang/authlib/1.5.21/authlib-1.5.21.jar"))
        );
    }

    #[test]
    fn classifier_and_extension_are_honoured() {
        assert_eq!(
            maven_path("org.lwjgl.lwjgl:lwjgl-platform:2.9.4-nightly-20150209:natives-linux"),
            Some(PathBuf::from(
                "org/lwjgl/lwjgl/lwjgl-platform/2.9.4-nightly-20150209/lwjgl-platform-2.9.4-nightly-20150209-natives-linux.jar"
            ))
        );
        assert_eq!(
            maven_path("net.minecraftforge:forge:1.8.8-11.15.0.1655:universal@zip"),
            Some(PathBuf::from(
                "net/minecraftforge/forge/1.8.8-11.15.0.1655/forge-1.8.8-11.15.0.1655-universal.zip"
            ))
        );
    }

    #[test]
    fn malformed_coordinates_are_rejected() {
        assert_eq!(maven_path("com.mojang:authlib"), None);
        assert_eq!(maven_path("::1.0"), None);
        assert_eq!(maven_path("a:b:c:d:e"), None);
    }

    #[test]
    fn outcome_success_requires_exit_zero() {
        let ok = ProcessOutcome { exit_code: Some(0), stderr: String::new() };
        let failed = ProcessOutcome { exit_code: Some(1), stderr: String::new() };
        let killed = ProcessOutcome { exit_code: None, stderr: String::new() };
        assert!(ok.success());
        assert!(!failed.success());
        assert!(!killed.success());
    }
}
