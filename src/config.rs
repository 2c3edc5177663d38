use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_VERSION: &str = "1.8.8-forge1.8.8-11.15.0.1655";
pub const DEFAULT_COMPATIBILITY_ARTIFACT: &str = "com.mojang:authlib:1.5.21";
pub const SETTINGS_FILE_NAME: &str = "launcher_settings.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub java: JavaConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub directory: PathBuf,
    pub version: String,
    /// Maven coordinate of the library that must exist before launching.
    pub compatibility_artifact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaConfig {
    pub executable: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub settings_file: PathBuf,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub game_directory: Option<PathBuf>,
    pub version: Option<String>,
    pub java: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| home.join(".local/share"))
            .join("grcraft");

        Self {
            game: GameConfig {
                directory: data_dir.join("game"),
                version: DEFAULT_VERSION.to_string(),
                compatibility_artifact: DEFAULT_COMPATIBILITY_ARTIFACT.to_string(),
            },
            java: JavaConfig {
                executable: PathBuf::from("java"),
            },
            paths: PathsConfig {
                settings_file: Self::config_dir().join(SETTINGS_FILE_NAME),
            },
        }
    }
}

impl Config {
    /// Loads the config file, writing the defaults on first run.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(&config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    pub fn apply(mut self, overrides: &Overrides) -> Self {
        if let Some(dir) = &overrides.game_directory {
            self.game.directory = dir.clone();
        }
        if let Some(version) = &overrides.version {
            self.game.version = version.clone();
        }
        if let Some(java) = &overrides.java {
            self.java.executable = java.clone();
        }
        self
    }

    pub fn mods_directory(&self) -> PathBuf {
        self.game.directory.join("mods")
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("grcraft")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}
