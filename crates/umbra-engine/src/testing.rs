//! In-crate fake browser host for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use umbra_common::{FrameId, HostError, TabId};
use umbra_config::{FilePreferenceStore, Preferences};
use umbra_inject::{
    InjectDetails, ManifestContentScript, ScriptRegistration, StaticBundle, TemplateError,
    TemplateSource,
};

use crate::host::{Browser, RegisteredScript, TabInfo};
use crate::overrides::Overrides;
use crate::propagator::Propagator;

#[derive(Default)]
pub(crate) struct FakeState {
    pub tabs: Vec<TabInfo>,
    pub active: Option<TabId>,
    pub closed: HashSet<TabId>,
    pub active_handles: usize,
    pub max_active_handles: usize,
    pub registrations: Vec<ScriptRegistration>,
    pub executions: Vec<(TabId, InjectDetails)>,
    pub sent: Vec<(TabId, FrameId, Value)>,
    pub frame_reply: Value,
    pub os: String,
    pub options_opened: usize,
    pub override_colors_set: usize,
    pub fail_register: usize,
    pub fail_unregister: bool,
    pub command_update: bool,
}

#[derive(Clone, Default)]
pub(crate) struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        let browser = Self::default();
        browser.state().os = "linux".into();
        browser
    }

    pub fn with_tabs(tabs: Vec<TabInfo>) -> Self {
        let browser = Self::new();
        {
            let mut state = browser.state();
            state.active = tabs.first().map(|t| t.id);
            state.tabs = tabs;
        }
        browser
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn last_code(&self) -> String {
        self.state()
            .registrations
            .last()
            .and_then(|r| r.code().map(str::to_string))
            .unwrap_or_default()
    }
}

struct FakeHandle {
    state: Arc<Mutex<FakeState>>,
    released: AtomicBool,
}

#[async_trait]
impl RegisteredScript for FakeHandle {
    async fn unregister(&self) -> Result<(), HostError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        if state.fail_unregister {
            return Err(HostError::Failed("unregister refused".into()));
        }
        if !self.released.swap(true, Ordering::SeqCst) {
            state.active_handles -= 1;
        }
        Ok(())
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>, HostError> {
        tokio::task::yield_now().await;
        Ok(self.state().tabs.clone())
    }

    async fn active_tab(&self) -> Result<Option<TabInfo>, HostError> {
        let state = self.state();
        Ok(state
            .active
            .and_then(|id| state.tabs.iter().find(|t| t.id == id).cloned()))
    }

    async fn register_script(
        &self,
        registration: &ScriptRegistration,
    ) -> Result<Box<dyn RegisteredScript>, HostError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        if state.fail_register > 0 {
            state.fail_register -= 1;
            return Err(HostError::Registration("host said no".into()));
        }
        state.active_handles += 1;
        state.max_active_handles = state.max_active_handles.max(state.active_handles);
        state.registrations.push(registration.clone());
        Ok(Box::new(FakeHandle {
            state: Arc::clone(&self.state),
            released: AtomicBool::new(false),
        }))
    }

    async fn execute_script(&self, tab: TabId, details: &InjectDetails) -> Result<(), HostError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        if state.closed.contains(&tab) {
            return Err(HostError::TabClosed(tab.get()));
        }
        state.executions.push((tab, details.clone()));
        Ok(())
    }

    async fn send_to_frame(
        &self,
        tab: TabId,
        frame: FrameId,
        message: Value,
    ) -> Result<Value, HostError> {
        let mut state = self.state();
        state.sent.push((tab, frame, message));
        Ok(state.frame_reply.clone())
    }

    async fn platform_os(&self) -> Result<String, HostError> {
        Ok(self.state().os.clone())
    }

    async fn open_options_page(&self) -> Result<(), HostError> {
        self.state().options_opened += 1;
        Ok(())
    }

    fn supports_command_update(&self) -> bool {
        self.state().command_update
    }

    async fn set_override_document_colors_never(&self) -> Result<(), HostError> {
        self.state().override_colors_set += 1;
        Ok(())
    }
}

/// Built-in templates that can be switched to failing.
#[derive(Default)]
pub(crate) struct FlakyTemplates {
    inner: StaticBundle,
    pub fail: AtomicBool,
}

#[async_trait]
impl TemplateSource for FlakyTemplates {
    async fn load(&self, path: &str) -> Result<String, TemplateError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TemplateError::NotFound(path.to_string()));
        }
        self.inner.load(path).await
    }
}

pub(crate) struct Harness {
    pub browser: FakeBrowser,
    pub store: Arc<FilePreferenceStore>,
    pub templates: Arc<FlakyTemplates>,
    pub overrides: Overrides,
    pub propagator: Arc<Propagator>,
}

impl Harness {
    pub fn new(browser: FakeBrowser) -> Self {
        Self::with_prefs(browser, Preferences::default())
    }

    pub fn with_prefs(browser: FakeBrowser, prefs: Preferences) -> Self {
        let store = Arc::new(FilePreferenceStore::in_memory(prefs));
        let templates = Arc::new(FlakyTemplates::default());
        let overrides = Overrides::new();
        let propagator = Arc::new(Propagator::new(
            Arc::new(browser.clone()),
            store.clone(),
            templates.clone(),
            overrides.clone(),
            ManifestContentScript::all_frames_at_start(),
        ));
        Self {
            browser,
            store,
            templates,
            overrides,
            propagator,
        }
    }
}
