//! Umbra preference system.
//!
//! Provides the global preference set (TOML-backed, live reloaded and
//! validated), the catalog of colouring methods, and the merger that
//! layers per-tab and private-browsing overrides on top of the global
//! preferences.
//!
//! ```rust,no_run
//! use umbra_config::{preferences_to_json, toml_loader};
//!
//! let prefs = toml_loader::load_default().expect("failed to load preferences");
//! println!("{}", preferences_to_json(&prefs));
//! ```

pub mod colors;
pub mod merge;
pub mod methods;
pub mod reload;
pub mod schema;
pub mod store;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;
pub mod watcher;

pub use merge::{merge, merged_pages, EffectiveConfig, PrivateOverrides, TabOverrides};
pub use methods::{Method, MethodCatalog, MethodId, BUILT_IN_METHODS};
pub use reload::ReloadManager;
pub use schema::Preferences;
pub use store::{FilePreferenceStore, PreferenceStore};
pub use toml_writer::save_preferences_to_path;
pub use watcher::PreferencesWatcher;

/// Serialize preferences to a pretty-printed JSON string.
pub fn preferences_to_json(prefs: &Preferences) -> String {
    serde_json::to_string_pretty(prefs)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize preferences: {e}\"}}"))
}
