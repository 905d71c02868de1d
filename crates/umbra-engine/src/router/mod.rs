//! Requests from page contexts.
//!
//! Every request is a JSON object with an `action` field. Actions outside
//! the allowlist are logged and ignored; malformed requests are logged
//! and answered with nothing.

mod dispatch;

use serde::Deserialize;
use umbra_common::{ConfigError, HostError, TabId};
use umbra_config::MethodId;

use crate::propagator::PropagateError;

pub use dispatch::Router;

// =============================================================================
// ACTION ALLOWLIST
// =============================================================================

/// Accepted `action` values, including the older names still sent by
/// existing page scripts.
const ALLOWED_ACTIONS: &[&str] = &[
    "query_tab_id",
    "query_tabId",
    "query_base_style",
    "get_private_config",
    "get_configured_private",
    "set_private_config",
    "set_configured_private",
    "get_my_tab_config",
    "get_my_tab_configuration",
    "get_tab_config",
    "get_tab_configuration",
    "set_tab_config",
    "set_configured_tab",
    "open_settings_page",
    "open_options_page",
    "query_commands_update_available",
    "is_commands_update_available",
    "query_parent_method",
    "query_parent_method_number",
];

pub fn is_action_allowed(action: &str) -> bool {
    ALLOWED_ACTIONS.contains(&action)
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    #[serde(alias = "query_tabId")]
    QueryTabId,
    QueryBaseStyle,
    #[serde(alias = "get_configured_private")]
    GetPrivateConfig,
    #[serde(alias = "set_configured_private")]
    SetPrivateConfig {
        key: String,
        value: Option<MethodId>,
    },
    #[serde(alias = "get_my_tab_configuration")]
    GetMyTabConfig,
    #[serde(alias = "get_tab_configuration")]
    GetTabConfig { tab_id: TabId },
    #[serde(alias = "set_configured_tab")]
    SetTabConfig {
        #[serde(alias = "key")]
        tab_id: TabId,
        value: Option<MethodId>,
    },
    #[serde(alias = "open_options_page")]
    OpenSettingsPage,
    #[serde(alias = "is_commands_update_available")]
    QueryCommandsUpdateAvailable,
    #[serde(alias = "query_parent_method_number")]
    QueryParentMethod,
}

impl Request {
    /// Parse a raw request, separating unknown actions from bad shapes.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self, RouterError> {
        let action = raw
            .get("action")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| RouterError::Malformed("missing action".into()))?;
        if !is_action_allowed(action) {
            return Err(RouterError::UnknownAction(action.to_string()));
        }
        serde_json::from_value(raw.clone()).map_err(|e| RouterError::Malformed(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("request has no sender tab")]
    NoSenderTab,

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Propagate(#[from] PropagateError),
}
