use crate::config::{Config, Overrides};
use crate::game_launcher::{is_valid_nickname, MAX_NICKNAME_LEN, MIN_NICKNAME_LEN};
use crate::settings::PersistedSettings;
use crate::status::{self, StatusMessage, Workflow};
use crate::tasks::AppContext;
use crate::utils;
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use poll_promise::Promise;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "grcraft",
    author,
    version,
    about = "GRcraft - offline launcher for Minecraft 1.8.8 Forge",
    long_about = "Installs the GRcraft game files and starts Minecraft in offline mode"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, env = "GRCRAFT_GAME_DIR", help = "Override the game directory")]
    pub game_dir: Option<PathBuf>,

    #[arg(long, global = true, env = "GRCRAFT_VERSION", help = "Override the version id to launch")]
    pub game_version: Option<String>,

    #[arg(long, global = true, env = "GRCRAFT_JAVA", help = "Override the java executable")]
    pub java: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Open the desktop launcher (default)")]
    Gui,

    #[command(about = "Download and install the game libraries")]
    Install,

    #[command(about = "Start Minecraft in offline mode")]
    Launch {
        #[arg(short, long, help = "Player nickname (3-16 characters)")]
        nickname: Option<String>,

        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=14), help = "RAM to allocate in GB")]
        ram: Option<u32>,

        #[arg(long, help = "Do not check the libraries before launching")]
        skip_install: bool,
    },

    #[command(about = "Show the saved launcher settings")]
    Settings,

    #[command(about = "Create and open the mods folder")]
    Mods,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            game_directory: self.game_dir.clone(),
            version: self.game_version.clone(),
            java: self.java.clone(),
        }
    }

    pub fn execute(self, config: Config) -> Result<()> {
        match self.command.unwrap_or(Commands::Gui) {
            Commands::Gui => launch_gui(config),
            Commands::Install => handle_install(&config),
            Commands::Launch {
                nickname,
                ram,
                skip_install,
            } => handle_launch(&config, nickname, ram, skip_install),
            Commands::Settings => handle_settings(&config),
            Commands::Mods => handle_mods(&config),
        }
    }
}

fn print_status(message: &StatusMessage) {
    println!("  {} {}", format!("[{}]", message.workflow).dimmed(), message.text);
}

/// Blocks on `promise`, echoing status lines above a spinner until it resolves.
fn wait_with_spinner<T: Send + 'static>(mut promise: Promise<T>, rx: &Receiver<StatusMessage>) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let value = loop {
        for message in status::drain(rx) {
            spinner.println(format!("  {} {}", format!("[{}]", message.workflow).dimmed(), message.text));
            spinner.set_message(message.text);
        }
        match promise.try_take() {
            Ok(value) => break value,
            Err(pending) => promise = pending,
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    spinner.finish_and_clear();
    for message in status::drain(rx) {
        print_status(&message);
    }
    value
}

fn run_install(context: &AppContext, rx: &Receiver<StatusMessage>) -> Result<()> {
    let result = wait_with_spinner(context.spawn_install(), rx);
    if result.success {
        Ok(())
    } else {
        Err(anyhow!("Critical failure installing libraries: {}", result.error_message))
    }
}

fn handle_install(config: &Config) -> Result<()> {
    println!("{} Installing {}", "📦", config.game.version.bold().cyan());
    println!("  Game directory: {}", config.game.directory.display());

    let (tx, rx) = status::channel(Workflow::Application);
    let context = AppContext::from_config(config, tx);
    run_install(&context, &rx)?;

    println!("{} Libraries are ready", "✅".green());
    Ok(())
}

fn prompt_nickname() -> Result<String> {
    let nickname: String = Input::new()
        .with_prompt("Nickname")
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            if is_valid_nickname(input.trim()) {
                Ok(())
            } else {
                Err(format!(
                    "Nickname must be between {} and {} characters",
                    MIN_NICKNAME_LEN, MAX_NICKNAME_LEN
                ))
            }
        })
        .interact_text()?;
    Ok(nickname.trim().to_string())
}

/// The flag wins; a saved nickname is reused only when it is still valid.
fn resolve_nickname(flag: Option<String>, saved: &str) -> Option<String> {
    match flag {
        Some(nickname) => Some(nickname.trim().to_string()),
        None if is_valid_nickname(saved) => Some(saved.to_string()),
        None => None,
    }
}

fn handle_launch(
    config: &Config,
    nickname: Option<String>,
    ram: Option<u32>,
    skip_install: bool,
) -> Result<()> {
    let (tx, rx) = status::channel(Workflow::Application);
    let settings_path = &config.paths.settings_file;
    let saved = PersistedSettings::load_or_default(settings_path, &tx);
    for message in status::drain(&rx) {
        print_status(&message);
    }

    let nickname = match resolve_nickname(nickname, &saved.last_nickname) {
        Some(nickname) => nickname,
        None => prompt_nickname()?,
    };
    let ram_gb = ram.unwrap_or(saved.last_ram_gb);

    let context = AppContext::from_config(config, tx.clone());
    if !skip_install {
        run_install(&context, &rx)?;
    }

    println!(
        "{} Launching {} as {} with {} GB",
        "🚀",
        config.game.version.bold(),
        nickname.bold().green(),
        ram_gb
    );
    let result = wait_with_spinner(context.spawn_launch(context.launch_request(&nickname, ram_gb)), &rx);

    PersistedSettings {
        last_nickname: nickname,
        last_ram_gb: ram_gb,
    }
    .save_reporting(settings_path, &tx);
    for message in status::drain(&rx) {
        print_status(&message);
    }

    if result.success {
        println!("{} {}", "✅".green(), result.message.green());
        Ok(())
    } else {
        println!("{} {}", "❌".red(), result.message.red());
        Err(anyhow!(result.message))
    }
}

fn handle_settings(config: &Config) -> Result<()> {
    let (settings, _) = PersistedSettings::read(&config.paths.settings_file)?;

    println!("{}", "⚙️  GRcraft Settings".bold().cyan());
    println!();
    println!("{}", "Launcher:".bold());
    let nickname = if settings.last_nickname.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        settings.last_nickname.yellow().to_string()
    };
    println!("  Last nickname: {}", nickname);
    println!("  RAM allocation: {} GB", settings.last_ram_gb.to_string().yellow());
    println!("  Settings file: {}", config.paths.settings_file.display());
    println!();
    println!("{}", "Game:".bold());
    println!("  Version: {}", config.game.version.yellow());
    println!("  Directory: {}", config.game.directory.display());
    println!("  Mods folder: {}", config.mods_directory().display());
    println!("  Java: {}", config.java.executable.display());
    println!("  Config file: {}", Config::config_path().display());
    Ok(())
}

fn handle_mods(config: &Config) -> Result<()> {
    let (tx, rx) = status::channel(Workflow::Application);
    let mods = config.mods_directory();
    utils::open_mods_folder(&mods, &tx);
    for message in status::drain(&rx) {
        print_status(&message);
    }
    println!("📁 {}", mods.display());
    Ok(())
}

#[cfg(feature = "gui")]
fn launch_gui(config: Config) -> Result<()> {
    crate::gui::run_gui(config)
}

#[cfg(not(feature = "gui"))]
fn launch_gui(_config: Config) -> Result<()> {
    Err(anyhow!(
        "GUI feature not enabled. Use the install/launch commands or build with --features gui"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_gui() {
        let cli = Cli::try_parse_from(["grcraft"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn launch_flags_parse() {
        let cli = Cli::try_parse_from(["grcraft", "launch", "--nickname", "Steve", "--ram", "6"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Launch {
                nickname: Some("Steve".to_string()),
                ram: Some(6),
                skip_install: false,
            })
        );
    }

    #[test]
    fn ram_outside_range_is_rejected() {
        assert!(Cli::try_parse_from(["grcraft", "launch", "--ram", "0"]).is_err());
        assert!(Cli::try_parse_from(["grcraft", "launch", "--ram", "15"]).is_err());
    }

    #[test]
    fn global_overrides_feed_config() {
        let cli = Cli::try_parse_from([
            "grcraft",
            "install",
            "--game-dir",
            "/tmp/grcraft",
            "--game-version",
            "1.8.8",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.game_directory, Some(PathBuf::from("/tmp/grcraft")));
        assert_eq!(overrides.version.as_deref(), Some("1.8.8"));
    }

    #[test]
    fn nickname_resolution_prefers_flag_then_valid_saved() {
        assert_eq!(resolve_nickname(Some(" Alex ".into()), "Steve"), Some("Alex".to_string()));
        assert_eq!(resolve_nickname(None, "Steve"), Some("Steve".to_string()));
        assert_eq!(resolve_nickname(None, "Al"), None);
        assert_eq!(resolve_nickname(None, ""), None);
    }
}
