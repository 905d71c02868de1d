//! Startup and the browser event loop.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use umbra_common::{Event, HostError, PrefChanges, TabId};
use umbra_config::PreferenceStore;
use umbra_inject::{HeaderPatch, ManifestContentScript, ResponseHeader, TemplateSource};

use crate::commands::CommandHandler;
use crate::headers::on_headers_received;
use crate::host::{Browser, MessageSender, ResourceType};
use crate::overrides::Overrides;
use crate::propagator::Propagator;
use crate::router::Router;

/// Something the browser host reports.
#[derive(Debug)]
pub enum BrowserEvent {
    Message {
        request: Value,
        sender: MessageSender,
        reply: Option<oneshot::Sender<Option<Value>>>,
    },
    TabRemoved(TabId),
    Command(String),
    HeadersReceived {
        resource: ResourceType,
        headers: Vec<ResponseHeader>,
        reply: oneshot::Sender<HeaderPatch>,
    },
    Shutdown,
}

/// The engine, fully wired.
pub struct Background {
    browser: Arc<dyn Browser>,
    store: Arc<dyn PreferenceStore>,
    overrides: Overrides,
    propagator: Arc<Propagator>,
    router: Arc<Router>,
    commands: Arc<CommandHandler>,
}

impl Background {
    pub fn new(
        browser: Arc<dyn Browser>,
        store: Arc<dyn PreferenceStore>,
        templates: Arc<dyn TemplateSource>,
        manifest: ManifestContentScript,
    ) -> Self {
        let overrides = Overrides::new();
        let propagator = Arc::new(Propagator::new(
            Arc::clone(&browser),
            Arc::clone(&store),
            templates,
            overrides.clone(),
            manifest,
        ));
        let router = Arc::new(Router::new(
            Arc::clone(&browser),
            Arc::clone(&store),
            overrides.clone(),
            Arc::clone(&propagator),
        ));
        let commands = Arc::new(CommandHandler::new(
            Arc::clone(&browser),
            Arc::clone(&store),
            overrides.clone(),
            Arc::clone(&propagator),
        ));
        Self {
            browser,
            store,
            overrides,
            propagator,
            router,
            commands,
        }
    }

    pub fn propagator(&self) -> &Arc<Propagator> {
        &self.propagator
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    /// Engine lifecycle events: installs, failed cycles, override changes.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.propagator.events().subscribe()
    }

    /// Prepare the browser, run the first propagate cycle and start
    /// following preference changes.
    pub async fn start(&self) -> JoinHandle<()> {
        let changes = self.store.subscribe();

        match self.store.get_all().await {
            Ok(prefs) if !prefs.do_not_set_override_document_colors_to_never => {
                if let Err(e) = self.browser.set_override_document_colors_never().await {
                    error!(error = %e, "failed to set override document colours to never");
                }
            }
            Ok(_) => debug!("leaving override document colours alone"),
            Err(e) => error!(error = %e, "could not read preferences at startup"),
        }

        if let Err(e) = self.propagator.propagate(PrefChanges::new()).await {
            error!(error = %e, "initial propagate failed");
        }

        tokio::spawn(follow_preferences(Arc::clone(&self.propagator), changes))
    }

    /// Process browser events until `Shutdown` or the channel closes.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<BrowserEvent>) {
        info!("background event loop started");
        while let Some(event) = events.recv().await {
            match event {
                BrowserEvent::HeadersReceived {
                    resource,
                    headers,
                    reply,
                } => {
                    // Page load waits on this; answer inline.
                    let _ = reply.send(on_headers_received(resource, &headers));
                }
                BrowserEvent::Message {
                    request,
                    sender,
                    reply,
                } => {
                    let router = Arc::clone(&self.router);
                    tokio::spawn(async move {
                        let answer = router.dispatch(&request, sender).await;
                        if let Some(reply) = reply {
                            let _ = reply.send(answer);
                        }
                    });
                }
                BrowserEvent::TabRemoved(tab) => {
                    let this = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = this.on_tab_removed(tab).await {
                            error!(tab_id = %tab, error = %e, "tab removal handling failed");
                        }
                    });
                }
                BrowserEvent::Command(name) => {
                    let commands = Arc::clone(&self.commands);
                    tokio::spawn(async move {
                        if let Err(e) = commands.handle_named(&name).await {
                            error!(command = %name, error = %e, "command failed");
                        }
                    });
                }
                BrowserEvent::Shutdown => {
                    info!("shutting down");
                    self.propagator.events().publish(Event::Shutdown);
                    break;
                }
            }
        }
    }

    /// Forget the tab's override, and clear private overrides once no
    /// private tab is left.
    pub async fn on_tab_removed(&self, tab: TabId) -> Result<(), HostError> {
        if self.overrides.set_tab(tab, None).is_some() {
            debug!(tab_id = %tab, "dropped override of closed tab");
            self.propagator
                .events()
                .publish(Event::TabOverrideChanged(tab));
        }

        if !self.overrides.has_private() {
            return Ok(());
        }
        let tabs = self.browser.query_tabs().await?;
        if tabs.iter().any(|t| t.incognito) {
            return Ok(());
        }
        if self.overrides.clear_private() {
            info!("last private tab closed, clearing private overrides");
            self.propagator
                .events()
                .publish(Event::PrivateOverridesCleared);
            if let Err(e) = self.propagator.propagate(PrefChanges::new()).await {
                debug!(error = %e, "propagate after clearing private overrides failed");
            }
        }
        Ok(())
    }
}

async fn follow_preferences(propagator: Arc<Propagator>, mut changes: broadcast::Receiver<PrefChanges>) {
    loop {
        let changes = match changes.recv().await {
            Ok(changes) => changes,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "missed preference changes, propagating full state");
                PrefChanges::new()
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        if let Err(e) = propagator.propagate(changes).await {
            debug!(error = %e, "propagate after preference change failed");
        }
    }
    debug!("preference change feed closed");
}
