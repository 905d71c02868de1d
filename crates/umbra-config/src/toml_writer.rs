//! Persisting preferences as TOML.

use std::path::Path;

use tracing::{debug, warn};
use umbra_common::ConfigError;

use crate::schema::Preferences;

/// Serialize `prefs` and replace the file at `path`.
///
/// The new contents go to a sibling `.toml.tmp` first and are renamed
/// into place, so readers never see a half-written file. If the rename
/// is refused (Windows, file held open) the file is written directly.
pub fn save_preferences_to_path(prefs: &Preferences, path: &Path) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(prefs)
        .map_err(|e| ConfigError::ParseError(format!("preferences are not TOML-representable: {e}")))?;

    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| write_failed(dir, e))?;
    }

    let staged = path.with_extension("toml.tmp");
    std::fs::write(&staged, &contents).map_err(|e| write_failed(&staged, e))?;

    if let Err(e) = std::fs::rename(&staged, path) {
        warn!(path = %path.display(), "rename over preferences failed ({e}), writing in place");
        std::fs::write(path, &contents).map_err(|e| write_failed(path, e))?;
        if let Err(e) = std::fs::remove_file(&staged) {
            debug!("leaving {} behind: {e}", staged.display());
        }
    }

    debug!(path = %path.display(), bytes = contents.len(), "preferences saved");
    Ok(())
}

fn write_failed(path: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::ParseError(format!("cannot write {}: {e}", path.display()))
}
