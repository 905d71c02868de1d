//! Tab and private-browsing override maps.
//!
//! Mutation is crate-private: the router, commands and tab lifecycle
//! handling write, everyone else reads snapshots.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use umbra_common::TabId;
use umbra_config::{merge, EffectiveConfig, MethodId, Preferences, PrivateOverrides, TabOverrides};

#[derive(Debug, Default)]
struct OverrideState {
    tabs: TabOverrides,
    private: PrivateOverrides,
}

/// Shared handle to the override maps.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    inner: Arc<Mutex<OverrideState>>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, OverrideState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn tab(&self, tab: TabId) -> Option<MethodId> {
        self.lock().tabs.get(&tab).copied()
    }

    pub fn tabs(&self) -> TabOverrides {
        self.lock().tabs.clone()
    }

    /// Tab overrides ordered by tab id.
    pub fn tabs_sorted(&self) -> BTreeMap<TabId, MethodId> {
        self.lock().tabs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    pub fn private(&self) -> PrivateOverrides {
        self.lock().private.clone()
    }

    pub fn has_private(&self) -> bool {
        !self.lock().private.is_empty()
    }

    /// Layer these overrides over `global` for `tab`.
    pub fn effective(&self, global: &Preferences, tab: Option<TabId>) -> EffectiveConfig {
        let state = self.lock();
        merge(global, &state.private, &state.tabs, tab)
    }

    /// Set or clear (`None`) a tab override. Returns the previous value.
    pub(crate) fn set_tab(&self, tab: TabId, value: Option<MethodId>) -> Option<MethodId> {
        let mut state = self.lock();
        match value {
            Some(method) => state.tabs.insert(tab, method),
            None => state.tabs.remove(&tab),
        }
    }

    /// Flip a tab between `method` and no override. Returns the new value.
    pub(crate) fn toggle_tab(&self, tab: TabId, method: MethodId) -> Option<MethodId> {
        let mut state = self.lock();
        if state.tabs.remove(&tab).is_some() {
            None
        } else {
            state.tabs.insert(tab, method);
            Some(method)
        }
    }

    pub(crate) fn set_private(&self, key: &str, value: Option<MethodId>) -> Option<MethodId> {
        let mut state = self.lock();
        match value {
            Some(method) => state.private.insert(key.to_string(), method),
            None => state.private.remove(key),
        }
    }

    /// Drop every private override. Returns whether any existed.
    pub(crate) fn clear_private(&self) -> bool {
        let mut state = self.lock();
        let had_any = !state.private.is_empty();
        state.private.clear();
        had_any
    }
}
