// ABOUTME: XDG Base Directory paths for config and log storage
// ABOUTME: Falls back to the working directory when no home directory is known

use directories::ProjectDirs;
use std::path::PathBuf;

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "quoordinates";
const APPLICATION: &str = "quoordinates";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// e.g. ~/.local/share/quoordinates/, falling back to ./data
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// e.g. ~/.local/share/quoordinates/logs/
pub fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

/// e.g. ~/.config/quoordinates/, falling back to the current directory
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
