use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, error, warn};
use umbra_common::{Event, FrameId, PrefChanges, TabId};
use umbra_config::PreferenceStore;

use super::{Request, RouterError};
use crate::host::{Browser, MessageSender};
use crate::overrides::Overrides;
use crate::propagator::Propagator;

const ANDROID_SETTINGS_DELAY: Duration = Duration::from_millis(500);

/// Answers page requests and owns writes to the override maps.
pub struct Router {
    browser: Arc<dyn Browser>,
    store: Arc<dyn PreferenceStore>,
    overrides: Overrides,
    propagator: Arc<Propagator>,
}

impl Router {
    pub fn new(
        browser: Arc<dyn Browser>,
        store: Arc<dyn PreferenceStore>,
        overrides: Overrides,
        propagator: Arc<Propagator>,
    ) -> Self {
        Self {
            browser,
            store,
            overrides,
            propagator,
        }
    }

    /// Handle a raw request. Never fails: errors are logged and answered
    /// with `None`.
    pub async fn dispatch(&self, raw: &Value, sender: MessageSender) -> Option<Value> {
        let request = match Request::from_json(raw) {
            Ok(request) => request,
            Err(RouterError::UnknownAction(action)) => {
                warn!(%action, "request rejected: unknown action");
                return None;
            }
            Err(e) => {
                error!(error = %e, body = %raw, "request rejected");
                return None;
            }
        };

        debug!(?request, tab_id = ?sender.tab_id, "request dispatched");
        match self.handle(request, sender).await {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(e) => {
                error!(error = %e, "request failed");
                None
            }
        }
    }

    pub async fn handle(&self, request: Request, sender: MessageSender) -> Result<Value, RouterError> {
        match request {
            Request::QueryTabId => Ok(json!(sender.tab_id)),
            Request::QueryBaseStyle => Ok(json!(self.propagator.render_base_style().await?)),
            Request::GetPrivateConfig => Ok(json!(self.overrides.private())),
            Request::SetPrivateConfig { key, value } => {
                self.overrides.set_private(&key, value);
                self.propagator
                    .events()
                    .publish(Event::PrivateOverrideChanged(key));
                self.repropagate().await;
                Ok(Value::Null)
            }
            Request::GetMyTabConfig => {
                let tab = sender.tab_id.ok_or(RouterError::NoSenderTab)?;
                Ok(self.tab_config(tab))
            }
            Request::GetTabConfig { tab_id } => Ok(self.tab_config(tab_id)),
            Request::SetTabConfig { tab_id, value } => {
                self.overrides.set_tab(tab_id, value);
                self.propagator
                    .events()
                    .publish(Event::TabOverrideChanged(tab_id));
                self.repropagate().await;
                Ok(Value::Null)
            }
            Request::OpenSettingsPage => {
                self.open_settings_page().await?;
                Ok(Value::Null)
            }
            Request::QueryCommandsUpdateAvailable => {
                Ok(json!(self.browser.supports_command_update()))
            }
            Request::QueryParentMethod => self.parent_method(sender).await,
        }
    }

    /// A tab's override, or `false` when it has none.
    fn tab_config(&self, tab: TabId) -> Value {
        match self.overrides.tab(tab) {
            Some(method) => json!(method),
            None => Value::Bool(false),
        }
    }

    async fn repropagate(&self) {
        // Failures are logged by the propagator; the previous script stays.
        if let Err(e) = self.propagator.propagate(PrefChanges::new()).await {
            debug!(error = %e, "propagate after override change failed");
        }
    }

    async fn open_settings_page(&self) -> Result<(), RouterError> {
        if self.browser.platform_os().await? == "android" {
            let browser = Arc::clone(&self.browser);
            tokio::spawn(async move {
                tokio::time::sleep(ANDROID_SETTINGS_DELAY).await;
                if let Err(e) = browser.open_options_page().await {
                    error!(error = %e, "failed to open settings page");
                }
            });
            return Ok(());
        }
        self.browser.open_options_page().await?;
        Ok(())
    }

    async fn parent_method(&self, sender: MessageSender) -> Result<Value, RouterError> {
        if sender.frame_id.map_or(true, FrameId::is_top_level) {
            error!(?sender, "top-level frame asked for its parent's method");
            return self.own_method(sender.tab_id).await;
        }
        let tab = sender.tab_id.ok_or(RouterError::NoSenderTab)?;
        let answer = self
            .browser
            .send_to_frame(tab, FrameId::TOP_LEVEL, json!({"action": "get_method_number"}))
            .await?;
        Ok(answer)
    }

    /// The method the merged configuration picks for `tab`'s own page.
    async fn own_method(&self, tab: Option<TabId>) -> Result<Value, RouterError> {
        let prefs = self.store.get_all().await?;
        let effective = self.overrides.effective(&prefs, tab);
        let page = match tab {
            Some(tab) => self.tab_url(tab).await,
            None => None,
        };
        let method = match page {
            Some(url) => effective.method_for(&url),
            None => effective.fallback_method(),
        };
        Ok(json!(method))
    }

    async fn tab_url(&self, tab: TabId) -> Option<String> {
        match self.browser.query_tabs().await {
            Ok(tabs) => tabs.into_iter().find(|t| t.id == tab).and_then(|t| t.url),
            Err(e) => {
                debug!(tab_id = %tab, error = %e, "could not look up tab address");
                None
            }
        }
    }
}
