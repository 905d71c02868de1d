//! Read preferences from a path or the platform default location.

use std::path::Path;

use tracing::{error, info, warn};
use umbra_common::ConfigError;

use crate::schema::Preferences;
use crate::validation;

use super::paths::{create_default_preferences, default_preferences_path};

/// Load preferences from a specific TOML file.
///
/// Missing fields take their defaults. Validation problems are logged
/// and the parsed preferences are returned as-is.
pub fn load_from_path(path: &Path) -> Result<Preferences, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(path.to_path_buf())
        } else {
            ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
        }
    })?;

    let prefs: Preferences = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&prefs) {
        warn!("preference validation warning: {e}");
    }

    info!(path = %path.display(), "loaded preferences");
    Ok(prefs)
}

/// Load preferences from `path`, writing a commented default file first
/// if nothing exists there yet.
///
/// A file that parses but fails validation is left on disk untouched and
/// defaults are used instead.
pub fn load_or_create(path: &Path) -> Result<Preferences, ConfigError> {
    match load_from_path(path) {
        Ok(prefs) => match validation::validate(&prefs) {
            Ok(()) => Ok(prefs),
            Err(e) => {
                error!(path = %path.display(), "ignoring invalid preferences, using defaults: {e}");
                Ok(Preferences::default())
            }
        },
        Err(ConfigError::FileNotFound(_)) => {
            info!(path = %path.display(), "no preferences found, creating default");
            create_default_preferences(path)?;
            Ok(Preferences::default())
        }
        Err(e) => Err(e),
    }
}

/// Load preferences from the platform default path.
///
/// On Linux: `~/.config/umbra/preferences.toml`
pub fn load_default() -> Result<Preferences, ConfigError> {
    load_or_create(&default_preferences_path()?)
}
