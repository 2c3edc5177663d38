use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DependencyMissing(String),

    #[error("Failed to install libraries: {0}")]
    Install(String),

    #[error("{0}")]
    LaunchProcess(String),

    #[error("Settings error: {0}")]
    SettingsIo(String),

    #[error("Version metadata error: {0}")]
    VersionMetadata(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlDeError(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),
}

impl LauncherError {
    /// Errors raised deliberately by a launch stage carry a message meant for the player.
    pub fn is_stage_failure(&self) -> bool {
        matches!(
            self,
            LauncherError::Validation(_)
                | LauncherError::DependencyMissing(_)
                | LauncherError::LaunchProcess(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
