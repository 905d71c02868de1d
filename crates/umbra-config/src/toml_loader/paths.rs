//! Where the preference file lives, and seeding it on first run.

use std::path::{Path, PathBuf};

use tracing::info;
use umbra_common::ConfigError;

use super::template::default_preferences_toml;

const APP_DIR: &str = "umbra";
const FILE_NAME: &str = "preferences.toml";

/// `<config dir>/umbra/preferences.toml` for the current platform.
pub fn default_preferences_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
        .ok_or_else(|| ConfigError::ParseError("no config directory on this platform".into()))
}

/// Seed `path` with the commented default preference file, creating
/// parent directories as needed.
pub fn create_default_preferences(path: &Path) -> Result<(), ConfigError> {
    let io_failure = |what: &str, at: &Path, e: std::io::Error| {
        ConfigError::ParseError(format!("cannot {what} {}: {e}", at.display()))
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_failure("create", parent, e))?;
    }
    std::fs::write(path, default_preferences_toml()).map_err(|e| io_failure("write", path, e))?;

    info!(path = %path.display(), "seeded default preferences");
    Ok(())
}
