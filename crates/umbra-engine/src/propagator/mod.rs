//! Propagation of configuration state into pages.
//!
//! A cycle renders every method stylesheet, builds the injection payload,
//! swaps the registered script and then pushes the payload into already
//! open tabs. Cycles are serialized on the injection slot; a cycle that
//! is no longer the newest when it gets the slot hands its changes to the
//! newest one and does nothing else.

mod render;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};
use umbra_common::{ConfigError, Event, EventBus, HostError, PrefChanges};
use umbra_config::{merged_pages, MethodCatalog, PreferenceStore};
use umbra_inject::{
    InjectDetails, InjectionPayload, ManifestContentScript, ScriptRegistration, TemplateError,
    TemplateSource,
};

use crate::host::{Browser, RegisteredScript};
use crate::overrides::Overrides;

pub use render::render_stylesheets;

#[derive(Debug, thiserror::Error)]
pub enum PropagateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to serialize payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("failed to release previous injection: {0}")]
    Release(#[source] HostError),

    #[error("failed to install injection: {0}")]
    Install(#[source] HostError),
}

/// What one call to [`Propagator::propagate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The new script is registered and open tabs were updated.
    Installed {
        seq: u64,
        tabs_updated: usize,
        tabs_failed: usize,
    },
    /// A newer cycle started first; this one's changes were handed over.
    Superseded { seq: u64 },
}

#[derive(Default)]
struct InjectionSlot {
    handle: Option<Box<dyn RegisteredScript>>,
    registration: Option<ScriptRegistration>,
}

pub struct Propagator {
    browser: Arc<dyn Browser>,
    store: Arc<dyn PreferenceStore>,
    templates: Arc<dyn TemplateSource>,
    overrides: Overrides,
    manifest: ManifestContentScript,
    catalog: MethodCatalog,
    events: Arc<EventBus>,
    started: AtomicU64,
    completed: AtomicU64,
    pending: Mutex<PrefChanges>,
    slot: AsyncMutex<InjectionSlot>,
    rendered: RwLock<Arc<BTreeMap<String, String>>>,
}

impl Propagator {
    pub fn new(
        browser: Arc<dyn Browser>,
        store: Arc<dyn PreferenceStore>,
        templates: Arc<dyn TemplateSource>,
        overrides: Overrides,
        manifest: ManifestContentScript,
    ) -> Self {
        Self {
            browser,
            store,
            templates,
            overrides,
            manifest,
            catalog: MethodCatalog::builtin(),
            events: Arc::new(EventBus::default()),
            started: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            pending: Mutex::new(PrefChanges::new()),
            slot: AsyncMutex::new(InjectionSlot::default()),
            rendered: RwLock::new(Arc::new(BTreeMap::new())),
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Stylesheets published by the last completed cycle.
    #[cfg(test)]
    pub(crate) fn rendered(&self) -> Arc<BTreeMap<String, String>> {
        self.rendered
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Sequence number of the last completed cycle (0 before the first).
    #[cfg(test)]
    pub(crate) fn last_completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    /// The base stylesheet rendered for a top-level frame with the
    /// current preferences.
    pub async fn render_base_style(&self) -> Result<String, PropagateError> {
        let prefs = self.store.get_all().await?;
        render::render_base_style(self.templates.as_ref(), &prefs).await
    }

    /// Run one propagate cycle for `changes`.
    pub async fn propagate(&self, changes: PrefChanges) -> Result<CycleOutcome, PropagateError> {
        let seq = {
            let mut pending = self.lock_pending();
            pending.absorb(changes);
            self.started.fetch_add(1, Ordering::SeqCst) + 1
        };

        let mut slot = self.slot.lock().await;
        let changes = {
            let mut pending = self.lock_pending();
            if self.started.load(Ordering::SeqCst) != seq {
                debug!(seq, "propagate cycle superseded before it started");
                return Ok(CycleOutcome::Superseded { seq });
            }
            std::mem::take(&mut *pending)
        };

        let built = match self.build(&changes).await {
            Ok(built) => built,
            Err(e) => {
                self.restore_pending(changes);
                return Err(self.fail(seq, e));
            }
        };

        if let Err(e) = self.swap(&mut slot, built.registration).await {
            self.restore_pending(changes);
            return Err(self.fail(seq, e));
        }

        *self
            .rendered
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(built.rendered);
        self.completed.store(seq, Ordering::SeqCst);
        let details = slot.registration.as_ref().and_then(|r| r.inject_details());
        drop(slot);

        info!(seq, "injected script installed");
        self.events.publish(Event::InjectionInstalled { seq });

        let (tabs_updated, tabs_failed) = match details {
            Some(details) => self.broadcast(seq, &details).await,
            None => (0, 0),
        };
        Ok(CycleOutcome::Installed {
            seq,
            tabs_updated,
            tabs_failed,
        })
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, PrefChanges> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Put `changes` back ahead of anything that arrived meanwhile.
    fn restore_pending(&self, mut changes: PrefChanges) {
        let mut pending = self.lock_pending();
        changes.absorb(std::mem::take(&mut *pending));
        *pending = changes;
    }

    fn fail(&self, seq: u64, err: PropagateError) -> PropagateError {
        error!(seq, error = %err, "propagate cycle failed, previous injection stays active");
        self.events.publish(Event::PropagateFailed {
            seq,
            reason: err.to_string(),
        });
        err
    }

    async fn build(&self, changes: &PrefChanges) -> Result<Built, PropagateError> {
        let prefs = self.store.get_all().await?;
        let rendered = render_stylesheets(self.templates.as_ref(), &self.catalog, &prefs).await?;

        let payload = InjectionPayload {
            prefs: prefs.to_json(),
            merged_configured: serde_json::to_value(merged_pages(&prefs, &self.overrides.private()))?,
            configured_tabs: serde_json::to_value(self.overrides.tabs_sorted())?,
            rendered_stylesheets: rendered.clone(),
            changes: changes.clone(),
        };
        let registration = ScriptRegistration::from_manifest(&self.manifest, payload.to_script()?);
        Ok(Built {
            rendered,
            registration,
        })
    }

    /// Release the current registration, then install `registration`.
    ///
    /// A failed release keeps the current handle. A failed install puts
    /// the previous registration back.
    async fn swap(
        &self,
        slot: &mut InjectionSlot,
        registration: ScriptRegistration,
    ) -> Result<(), PropagateError> {
        if let Some(handle) = &slot.handle {
            handle.unregister().await.map_err(PropagateError::Release)?;
            slot.handle = None;
        }

        match self.browser.register_script(&registration).await {
            Ok(handle) => {
                slot.handle = Some(handle);
                slot.registration = Some(registration);
                Ok(())
            }
            Err(e) => {
                if let Some(previous) = &slot.registration {
                    match self.browser.register_script(previous).await {
                        Ok(handle) => {
                            warn!("re-installed previous injected script");
                            slot.handle = Some(handle);
                        }
                        Err(again) => {
                            error!(error = %again, "failed to re-install previous injected script");
                        }
                    }
                }
                Err(PropagateError::Install(e))
            }
        }
    }

    /// Run the payload in every open tab. Stops early once a newer cycle
    /// has completed, since that cycle broadcasts its own payload.
    async fn broadcast(&self, seq: u64, details: &InjectDetails) -> (usize, usize) {
        let tabs = match self.browser.query_tabs().await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(seq, error = %e, "could not list tabs, skipping broadcast");
                return (0, 0);
            }
        };

        let mut updated = 0;
        let mut failed = 0;
        for tab in tabs {
            if self.completed.load(Ordering::SeqCst) > seq {
                debug!(seq, "newer cycle completed, stopping broadcast");
                break;
            }
            match self.browser.execute_script(tab.id, details).await {
                Ok(()) => updated += 1,
                Err(e) => {
                    failed += 1;
                    debug!(seq, tab_id = %tab.id, error = %e, "could not update tab");
                }
            }
        }
        (updated, failed)
    }
}

struct Built {
    rendered: BTreeMap<String, String>,
    registration: ScriptRegistration,
}
