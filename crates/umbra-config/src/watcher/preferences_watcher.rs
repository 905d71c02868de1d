use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use umbra_common::ConfigError;

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches the preference file and signals when it changes.
pub struct PreferencesWatcher {
    path: PathBuf,
}

impl PreferencesWatcher {
    /// The file does not need to exist yet; its directory is watched.
    pub fn new(path: PathBuf) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "preference file missing, watching for creation");
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run until the underlying notify watcher goes away, sending `()` on
    /// `tx` once per burst of writes to the file.
    pub async fn watch(&self, tx: broadcast::Sender<()>) -> Result<(), ConfigError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let target = self.path.file_name().map(OsString::from).unwrap_or_default();

        // notify calls back on its own thread.
        let (raw_tx, mut raw_rx) = mpsc::channel::<()>(16);
        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) if touches(&event, &target) => {
                    // Full channel means a signal is already pending.
                    let _ = raw_tx.try_send(());
                }
                Ok(_) => {}
                Err(e) => error!("notify error: {e}"),
            },
            notify::Config::default(),
        )
        .map_err(|e| ConfigError::WatchError(format!("cannot start watcher: {e}")))?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(format!("cannot watch {}: {e}", dir.display())))?;
        info!(path = %self.path.display(), "watching preference file");

        while raw_rx.recv().await.is_some() {
            if !settle(&mut raw_rx).await {
                break;
            }
            debug!("preference file settled, signalling reload");
            if tx.send(()).is_err() {
                debug!("nobody listening for preference reloads");
            }
        }
        drop(watcher);
        Ok(())
    }
}

fn touches(event: &Event, target: &OsString) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(target.as_os_str()))
}

/// Swallow further events until [`DEBOUNCE`] has passed since the first.
/// Returns `false` if the event source closed meanwhile.
async fn settle(raw_rx: &mut mpsc::Receiver<()>) -> bool {
    let quiet = tokio::time::sleep(DEBOUNCE);
    tokio::pin!(quiet);
    loop {
        tokio::select! {
            _ = &mut quiet => return true,
            more = raw_rx.recv() => if more.is_none() { return false },
        }
    }
}
