use crate::status::StatusSender;
use std::path::Path;
use tracing::warn;

/// Creates the mods folder when missing; problems are only reported as status text.
pub fn ensure_mods_folder(path: &Path, status: &StatusSender) -> bool {
    if path.is_dir() {
        return true;
    }
    match std::fs::create_dir_all(path) {
        Ok(()) => {
            status.emit(format!("Mods folder created at: {}", path.display()));
            true
        }
        Err(e) => {
            warn!("Failed to create {}: {}", path.display(), e);
            status.emit(format!("Error: Failed to create {}: {e}", path.display()));
            false
        }
    }
}

/// Opens the mods folder in the platform file browser.
pub fn open_mods_folder(path: &Path, status: &StatusSender) {
    if !ensure_mods_folder(path, status) {
        return;
    }
    if let Err(e) = opener::open(path) {
        warn!("Failed to open {}: {}", path.display(), e);
        status.emit(format!("Error: Failed to open mods folder: {e}"));
    }
}

/// Short text for a nickname's validity, shown next to the input field.
pub fn nickname_hint(nickname: &str) -> Option<&'static str> {
    if crate::game_launcher::is_valid_nickname(nickname) {
        None
    } else {
        Some("Enter your nickname (3-16 characters)")
    }
}
