//! Hotkey commands.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};
use umbra_common::{ConfigError, Event, HostError, PrefChanges};
use umbra_config::{MethodId, PreferenceStore};

use crate::host::Browser;
use crate::overrides::Overrides;
use crate::propagator::{PropagateError, Propagator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flip the global `enabled` preference.
    GlobalToggle,
    /// Flip a disabled override on the active tab.
    TabToggle,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global_toggle_hotkey" => Ok(Command::GlobalToggle),
            "tab_toggle_hotkey" => Ok(Command::TabToggle),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("no active tab")]
    NoActiveTab,

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Propagate(#[from] PropagateError),
}

pub struct CommandHandler {
    browser: Arc<dyn Browser>,
    store: Arc<dyn PreferenceStore>,
    overrides: Overrides,
    propagator: Arc<Propagator>,
}

impl CommandHandler {
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

    /// Run a command by name. Unknown names are logged and ignored.
    pub async fn handle_named(&self, name: &str) -> Result<(), CommandError> {
        match name.parse::<Command>() {
            Ok(command) => self.handle(command).await,
            Err(e) => {
                warn!(command = name, "ignoring command: {e}");
                Ok(())
            }
        }
    }

    pub async fn handle(&self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::GlobalToggle => {
                // The store's change feed triggers the propagate.
                let enabled = self.store.get_all().await?.enabled;
                self.store.set("enabled", json!(!enabled)).await?;
                info!(enabled = !enabled, "toggled globally");
            }
            Command::TabToggle => {
                let tab = self
                    .browser
                    .active_tab()
                    .await?
                    .ok_or(CommandError::NoActiveTab)?;
                let now = self.overrides.toggle_tab(tab.id, MethodId::DISABLED);
                info!(tab_id = %tab.id, disabled = now.is_some(), "toggled tab");
                self.propagator
                    .events()
                    .publish(Event::TabOverrideChanged(tab.id));
                self.propagator.propagate(PrefChanges::new()).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TabInfo;
    use crate::testing::{FakeBrowser, Harness};
    use umbra_common::TabId;

    fn handler(h: &Harness) -> CommandHandler {
        CommandHandler::new(
            Arc::new(h.browser.clone()),
            h.store.clone(),
            h.overrides.clone(),
            h.propagator.clone(),
        )
    }

    #[test]
    fn parses_command_names() {
        assert_eq!("global_toggle_hotkey".parse::<Command>().unwrap(), Command::GlobalToggle);
        assert_eq!("tab_toggle_hotkey".parse::<Command>().unwrap(), Command::TabToggle);
        assert!("open_sesame".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn global_toggle_flips_enabled_through_store() {
        let h = Harness::new(FakeBrowser::new());
        let mut rx = h.store.subscribe();

        handler(&h).handle_named("global_toggle_hotkey").await.unwrap();

        assert!(!h.store.snapshot().enabled);
        let changes = rx.recv().await.unwrap();
        assert_eq!(changes.get("enabled").unwrap().new_value, Some(json!(false)));
    }

    #[tokio::test]
    async fn tab_toggle_disables_then_restores_active_tab() {
        let h = Harness::new(FakeBrowser::with_tabs(vec![
            TabInfo::new(TabId(6)),
            TabInfo::new(TabId(7)),
        ]));
        let commands = handler(&h);

        commands.handle(Command::TabToggle).await.unwrap();
        assert_eq!(h.overrides.tab(TabId(6)), Some(MethodId::DISABLED));
        assert!(h.browser.last_code().contains("window.configured_tabs = {\"6\":0};"));

        commands.handle(Command::TabToggle).await.unwrap();
        assert_eq!(h.overrides.tab(TabId(6)), None);
        assert_eq!(h.browser.state().registrations.len(), 2);
        assert_eq!(h.browser.state().active_handles, 1);
    }

    #[tokio::test]
    async fn tab_toggle_without_active_tab_fails() {
        let h = Harness::new(FakeBrowser::new());
        assert!(matches!(
            handler(&h).handle(Command::TabToggle).await,
            Err(CommandError::NoActiveTab)
        ));
    }

    #[tokio::test]
    async fn unknown_command_is_ignored() {
        let h = Harness::new(FakeBrowser::new());
        handler(&h).handle_named("bogus").await.unwrap();
        assert!(h.browser.state().registrations.is_empty());
    }
}
