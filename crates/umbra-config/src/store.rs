//! Preference store: read, write and observe the global preference set.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex as AsyncMutex};
use tracing::{debug, info, warn};
use umbra_common::{ConfigError, PrefChanges};

use crate::schema::Preferences;
use crate::toml_loader;
use crate::toml_writer::save_preferences_to_path;
use crate::validation;

/// Access to the global preference set.
///
/// `subscribe` is the change feed: every accepted write or reload that
/// alters at least one preference is published as a [`PrefChanges`].
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_all(&self) -> Result<Preferences, ConfigError>;

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, ConfigError> {
        Ok(self.get_all().await?.get(key))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), ConfigError>;

    fn subscribe(&self) -> broadcast::Receiver<PrefChanges>;
}

/// A [`PreferenceStore`] backed by a TOML file, or purely in memory.
pub struct FilePreferenceStore {
    path: Option<PathBuf>,
    current: RwLock<Preferences>,
    changes: broadcast::Sender<PrefChanges>,
    /// Held across a whole `set` so concurrent writers never start from
    /// the same snapshot.
    writes: AsyncMutex<()>,
}

impl FilePreferenceStore {
    /// Open the store at `path`, creating a default file if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let prefs = toml_loader::load_or_create(&path)?;
        Ok(Self::with_state(Some(path), prefs))
    }

    /// A store that never touches disk.
    pub fn in_memory(prefs: Preferences) -> Self {
        Self::with_state(None, prefs)
    }

    fn with_state(path: Option<PathBuf>, prefs: Preferences) -> Self {
        let (changes, _) = broadcast::channel(32);
        Self {
            path,
            current: RwLock::new(prefs),
            changes,
            writes: AsyncMutex::new(()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> Preferences {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Re-read the backing file and publish whatever changed.
    ///
    /// Invalid files are rejected and the current preferences kept.
    pub fn reload(&self) -> Result<PrefChanges, ConfigError> {
        let Some(path) = &self.path else {
            return Ok(PrefChanges::new());
        };
        let prefs = toml_loader::load_from_path(path)?;
        validation::validate(&prefs)?;
        Ok(self.replace(prefs))
    }

    fn replace(&self, prefs: Preferences) -> PrefChanges {
        let changes = {
            let mut current = self
                .current
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let changes = PrefChanges::between(&current.to_json(), &prefs.to_json());
            *current = prefs;
            changes
        };

        if changes.is_empty() {
            debug!("preferences unchanged");
        } else {
            info!(changed = changes.len(), "preferences updated");
            if self.changes.send(changes.clone()).is_err() {
                debug!("no subscribers for preference changes");
            }
        }
        changes
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get_all(&self) -> Result<Preferences, ConfigError> {
        Ok(self.snapshot())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), ConfigError> {
        let _write = self.writes.lock().await;
        let updated = self.snapshot().with_value(key, value)?;
        validation::validate(&updated)?;

        if let Some(path) = &self.path {
            save_preferences_to_path(&updated, path)?;
        }
        let changes = self.replace(updated);
        if changes.is_empty() {
            warn!(key, "set did not change any preference");
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PrefChanges> {
        self.changes.subscribe()
    }
}
