use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::store::FilePreferenceStore;
use crate::watcher::PreferencesWatcher;

/// Reloads a file-backed store whenever its file changes on disk.
///
/// Subscribers of the store see the resulting
/// [`PrefChanges`](umbra_common::PrefChanges) as if the edit had come through
/// `set`. A file that fails to parse or validate is ignored and the
/// store keeps its previous contents.
pub struct ReloadManager {
    store: Arc<FilePreferenceStore>,
}

impl ReloadManager {
    pub fn new(store: Arc<FilePreferenceStore>) -> Self {
        Self { store }
    }

    /// Spawn the watch loop. Returns `None` for in-memory stores.
    pub fn start(self) -> Option<JoinHandle<()>> {
        let watcher = PreferencesWatcher::new(self.store.path()?.to_path_buf());
        let (signal_tx, signal_rx) = broadcast::channel::<()>(16);

        tokio::spawn(async move {
            if let Err(e) = watcher.watch(signal_tx).await {
                error!("preference watcher stopped: {e}");
            }
        });
        Some(tokio::spawn(self.follow(signal_rx)))
    }

    async fn follow(self, mut signals: broadcast::Receiver<()>) {
        loop {
            match signals.recv().await {
                // A lagged receiver still owes one reload.
                Ok(()) | Err(RecvError::Lagged(_)) => self.reload_once(),
                Err(RecvError::Closed) => {
                    debug!("preference watcher closed, reload loop exiting");
                    return;
                }
            }
        }
    }

    fn reload_once(&self) {
        match self.store.reload() {
            Ok(changes) if changes.is_empty() => debug!("preference file touched, nothing changed"),
            Ok(changes) => info!(changed = changes.len(), "preferences reloaded from disk"),
            Err(e) => warn!("keeping previous preferences, reload failed: {e}"),
        }
    }
}
