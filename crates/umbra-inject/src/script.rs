//! The script every page receives.
//!
//! It publishes the current configuration and rendered stylesheets as
//! page globals, then asks the already-loaded content script to apply
//! them. When the payload runs first, it only leaves a marker so the
//! content script knows to pick the globals up itself.

use std::collections::BTreeMap;

use serde::Serialize;
use umbra_common::PrefChanges;

const FIRST_MARKER: &str = "registered_content_script_first";

/// Everything a page needs for one configuration state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InjectionPayload {
    /// The full Global Preference Set.
    pub prefs: serde_json::Value,
    /// Configured pages with private overrides applied.
    pub merged_configured: serde_json::Value,
    /// Tab id to method override.
    pub configured_tabs: serde_json::Value,
    /// Rendered stylesheets keyed by `<path>_toplevel` / `<path>_iframe`.
    pub rendered_stylesheets: BTreeMap<String, String>,
    /// What changed since the previous state; empty on startup.
    pub changes: PrefChanges,
}

impl InjectionPayload {
    pub fn to_script(&self) -> Result<String, serde_json::Error> {
        let prefs = serde_json::to_string(&self.prefs)?;
        let merged = serde_json::to_string(&self.merged_configured)?;
        let tabs = serde_json::to_string(&self.configured_tabs)?;
        let sheets = serde_json::to_string(&self.rendered_stylesheets)?;
        let changes = serde_json::to_string(&self.changes)?;

        Ok(format!(
            "if (typeof content_script_state === 'undefined') {{\n\
             \x20   window.content_script_state = '{FIRST_MARKER}';\n\
             }}\n\
             window.prefs = {prefs};\n\
             window.merged_configured = {merged};\n\
             window.configured_tabs = {tabs};\n\
             window.rendered_stylesheets = {sheets};\n\
             if (window.content_script_state !== '{FIRST_MARKER}') {{\n\
             \x20   window.do_it({changes});\n\
             }}\n"
        ))
    }
}
