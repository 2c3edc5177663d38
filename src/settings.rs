use crate::error::{LauncherError, Result};
use crate::game_launcher::{MAX_RAM_GB, MIN_RAM_GB};
use crate::status::StatusSender;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

pub const DEFAULT_RAM_GB: u32 = 2;

/// The last nickname and RAM choice, remembered between sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSettings {
    pub last_nickname: String,
    pub last_ram_gb: u32,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            last_nickname: String::new(),
            last_ram_gb: DEFAULT_RAM_GB,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(rename = "LauncherSettings", skip_serializing_if = "Option::is_none")]
    launcher_settings: Option<SettingsSection>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsSection {
    #[serde(default)]
    last_nickname: String,
    #[serde(default = "default_ram")]
    last_ram_gb: u32,
}

fn default_ram() -> u32 {
    DEFAULT_RAM_GB
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    MissingSection,
    MissingFile,
}

impl PersistedSettings {
    pub fn read(path: &Path) -> Result<(Self, LoadOutcome)> {
        if !path.exists() {
            return Ok((Self::default(), LoadOutcome::MissingFile));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| LauncherError::SettingsIo(format!("{}: {e}", path.display())))?;
        let file: SettingsFile = toml::from_str(&contents)
            .map_err(|e| LauncherError::SettingsIo(format!("{}: {e}", path.display())))?;

        Ok(match file.launcher_settings {
            Some(section) => (
                Self {
                    last_nickname: section.last_nickname,
                    last_ram_gb: section.last_ram_gb.clamp(MIN_RAM_GB, MAX_RAM_GB),
                },
                LoadOutcome::Loaded,
            ),
            None => (Self::default(), LoadOutcome::MissingSection),
        })
    }

    /// Overwrites the whole file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = SettingsFile {
            launcher_settings: Some(SettingsSection {
                last_nickname: self.last_nickname.clone(),
                last_ram_gb: self.last_ram_gb,
            }),
        };
        let contents = toml::to_string(&file)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LauncherError::SettingsIo(format!("{}: {e}", parent.display())))?;
        }
        std::fs::write(path, contents)
            .map_err(|e| LauncherError::SettingsIo(format!("{}: {e}", path.display())))?;
        Ok(())
    }

    /// Startup read: problems are reported, defaults are used.
    pub fn load_or_default(path: &Path, status: &StatusSender) -> Self {
        match Self::read(path) {
            Ok((settings, LoadOutcome::Loaded)) => {
                status.emit("Settings loaded.");
                settings
            }
            Ok((settings, LoadOutcome::MissingSection)) => {
                status.emit("Settings file found but it has no 'LauncherSettings' section. Using defaults.");
                settings
            }
            Ok((settings, LoadOutcome::MissingFile)) => {
                status.emit("Settings file not found. Using default settings.");
                settings
            }
            Err(e) => {
                warn!("{}", e);
                status.emit(format!("Error loading settings: {e}. Using defaults."));
                Self::default()
            }
        }
    }

    /// Write whose failure only shows up as status text.
    pub fn save_reporting(&self, path: &Path, status: &StatusSender) {
        match self.write(path) {
            Ok(()) => status.emit("Settings saved!"),
            Err(e) => {
                warn!("{}", e);
                status.emit(format!("Error saving settings: {e}"));
            }
        }
    }
}
