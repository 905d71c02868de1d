//! The browser the engine runs against.
//!
//! Everything the engine needs from its host goes through [`Browser`], so
//! the engine itself never talks to a concrete extension API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use umbra_common::{FrameId, HostError, TabId};
use umbra_inject::{InjectDetails, ScriptRegistration};

/// An open tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    #[serde(default)]
    pub incognito: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl TabInfo {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            incognito: false,
            url: None,
        }
    }

    pub fn incognito(mut self) -> Self {
        self.incognito = true;
        self
    }
}

/// Where an inbound request came from. Requests from extension pages
/// carry no tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSender {
    pub tab_id: Option<TabId>,
    pub frame_id: Option<FrameId>,
}

impl MessageSender {
    pub fn frame(tab_id: TabId, frame_id: FrameId) -> Self {
        Self {
            tab_id: Some(tab_id),
            frame_id: Some(frame_id),
        }
    }
}

/// Request type of an intercepted response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    Stylesheet,
    Script,
    #[serde(other)]
    Other,
}

/// A live script registration.
#[async_trait]
pub trait RegisteredScript: Send + Sync {
    async fn unregister(&self) -> Result<(), HostError>;
}

#[async_trait]
pub trait Browser: Send + Sync {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>, HostError>;

    /// The active tab of the current window.
    async fn active_tab(&self) -> Result<Option<TabInfo>, HostError>;

    /// Register a script for future page loads.
    async fn register_script(
        &self,
        registration: &ScriptRegistration,
    ) -> Result<Box<dyn RegisteredScript>, HostError>;

    /// Run a script in an already-open tab.
    async fn execute_script(&self, tab: TabId, details: &InjectDetails) -> Result<(), HostError>;

    /// Send a message to one frame of a tab and wait for its answer.
    async fn send_to_frame(
        &self,
        tab: TabId,
        frame: FrameId,
        message: serde_json::Value,
    ) -> Result<serde_json::Value, HostError>;

    /// Host operating system name (`"android"`, `"linux"`, ...).
    async fn platform_os(&self) -> Result<String, HostError>;

    async fn open_options_page(&self) -> Result<(), HostError>;

    /// Whether hotkeys can be rebound at runtime.
    fn supports_command_update(&self) -> bool;

    /// Stop the browser from overriding page colours itself.
    async fn set_override_document_colors_never(&self) -> Result<(), HostError>;
}
