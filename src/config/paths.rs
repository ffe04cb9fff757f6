use crate::constants::{DATABASE_FILE_NAME, LOG_FILE_NAME};
use std::path::{Path, PathBuf};

fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join(env!("CARGO_PKG_NAME"))
}

/// Returns the platform-specific path for the config file.
///
/// # Notes
/// - Uses platform-specific config directory (e.g., ~/.config on Linux)
/// - Falls back to current directory if config directory is unavailable
pub fn get_config_path() -> String {
    app_config_dir()
        .join("config.toml")
        .to_string_lossy()
        .to_string()
}

/// Returns the platform-specific path for the log directory.
pub fn get_log_dir_path() -> String {
    app_config_dir().join("logs").to_string_lossy().to_string()
}

/// Returns the default location of the dedup database.
pub fn get_database_path() -> String {
    app_config_dir()
        .join(DATABASE_FILE_NAME)
        .to_string_lossy()
        .to_string()
}

/// Splits a log file path into its directory and file name.
/// A bare directory-less name is placed in the current directory.
pub fn split_log_path(path: &str) -> (String, String) {
    let path = Path::new(path);
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(LOG_FILE_NAME);
    (parent.to_string_lossy().to_string(), file_name.to_string())
}
