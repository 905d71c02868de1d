//! The global preference set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use umbra_common::ConfigError;

use crate::methods::MethodId;

/// Global preferences shared by every page.
///
/// All fields have defaults, so a partial preferences file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Master switch; when off every page resolves to the disabled method.
    pub enabled: bool,
    /// Method used for pages without a more specific setting.
    pub default_method: MethodId,
    pub default_foreground_color: String,
    pub default_background_color: String,
    pub default_link_color: String,
    pub default_visited_color: String,
    pub default_active_color: String,
    pub default_selection_color: String,
    /// Per-page method choices keyed by URL, host or parent domain.
    pub configured_pages: BTreeMap<String, MethodId>,
    /// Skip forcing the browser's "override document colours" to `never`.
    #[serde(alias = "do_not_set_overrideDocumentColors_to_never")]
    pub do_not_set_override_document_colors_to_never: bool,
    pub global_toggle_hotkey: String,
    pub tab_toggle_hotkey: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            enabled: true,
            default_method: MethodId::STYLESHEET_PROCESSOR,
            default_foreground_color: "#ffffff".into(),
            default_background_color: "#000000".into(),
            default_link_color: "#7fd7ff".into(),
            default_visited_color: "#ffafff".into(),
            default_active_color: "#ff0000".into(),
            default_selection_color: "#8080ff".into(),
            configured_pages: BTreeMap::new(),
            do_not_set_override_document_colors_to_never: false,
            global_toggle_hotkey: "Ctrl+Shift+F1".into(),
            tab_toggle_hotkey: "Ctrl+Shift+F2".into(),
        }
    }
}

impl Preferences {
    /// Flat JSON object view, keyed by preference name.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }

    /// Look up one preference by name.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        match self.to_json() {
            serde_json::Value::Object(mut map) => map.remove(key),
            _ => None,
        }
    }

    /// Return a copy with one preference replaced.
    ///
    /// Fails if `key` is not a known preference or `value` has the wrong shape.
    pub fn with_value(&self, key: &str, value: serde_json::Value) -> Result<Self, ConfigError> {
        let mut map = match self.to_json() {
            serde_json::Value::Object(map) => map,
            _ => return Err(ConfigError::ParseError("preferences are not an object".into())),
        };
        if !map.contains_key(key) {
            return Err(ConfigError::ValidationError(format!(
                "unknown preference: {key}"
            )));
        }
        map.insert(key.to_string(), value);
        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| ConfigError::ParseError(format!("invalid value for {key}: {e}")))
    }

    /// String-valued preferences, as template render parameters.
    pub fn string_values(&self) -> BTreeMap<String, String> {
        match self.to_json() {
            serde_json::Value::Object(map) => map
                .into_iter()
                .filter_map(|(k, v)| match v {
                    serde_json::Value::String(s) => Some((k, s)),
                    _ => None,
                })
                .collect(),
            _ => BTreeMap::new(),
        }
    }
}
