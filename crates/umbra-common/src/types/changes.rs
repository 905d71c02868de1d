use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One changed preference, shaped like a storage change record
/// (`{"oldValue": ..., "newValue": ...}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
}

/// Set of preference changes keyed by preference name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefChanges(pub BTreeMap<String, PrefChange>);

impl PrefChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&PrefChange> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, change: PrefChange) {
        self.0.insert(key.into(), change);
    }

    /// Fold a later change set into this one. For keys present in both,
    /// the earliest `old_value` and the latest `new_value` are kept.
    pub fn absorb(&mut self, later: PrefChanges) {
        for (key, change) in later.0 {
            match self.0.get_mut(&key) {
                Some(existing) => existing.new_value = change.new_value,
                None => {
                    self.0.insert(key, change);
                }
            }
        }
    }

    /// Diff two flat preference objects.
    pub fn between(old: &serde_json::Value, new: &serde_json::Value) -> Self {
        let empty = serde_json::Map::new();
        let old = old.as_object().unwrap_or(&empty);
        let new = new.as_object().unwrap_or(&empty);

        let mut changes = PrefChanges::new();
        for (key, new_value) in new {
            if old.get(key) != Some(new_value) {
                changes.insert(
                    key.clone(),
                    PrefChange {
                        old_value: old.get(key).cloned(),
                        new_value: Some(new_value.clone()),
                    },
                );
            }
        }
        for (key, old_value) in old {
            if !new.contains_key(key) {
                changes.insert(
                    key.clone(),
                    PrefChange {
                        old_value: Some(old_value.clone()),
                        new_value: None,
                    },
                );
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn between_reports_modified_added_and_removed_keys() {
        let old = json!({"enabled": true, "default_method": 1, "gone": "x"});
        let new = json!({"enabled": false, "default_method": 1, "fresh": "y"});
        let changes = PrefChanges::between(&old, &new);

        assert_eq!(changes.len(), 3);
        assert_eq!(
            changes.get("enabled"),
            Some(&PrefChange {
                old_value: Some(json!(true)),
                new_value: Some(json!(false)),
            })
        );
        assert_eq!(changes.get("fresh").unwrap().old_value, None);
        assert_eq!(changes.get("gone").unwrap().new_value, None);
        assert!(changes.get("default_method").is_none());
    }

    #[test]
    fn absorb_keeps_first_old_and_last_new() {
        let mut first = PrefChanges::between(&json!({"a": 1}), &json!({"a": 2}));
        let second = PrefChanges::between(&json!({"a": 2, "b": 0}), &json!({"a": 3, "b": 1}));
        first.absorb(second);

        let a = first.get("a").unwrap();
        assert_eq!(a.old_value, Some(json!(1)));
        assert_eq!(a.new_value, Some(json!(3)));
        assert!(first.get("b").is_some());
    }

    #[test]
    fn serializes_like_storage_changes() {
        let changes = PrefChanges::between(&json!({"enabled": true}), &json!({"enabled": false}));
        let text = serde_json::to_string(&changes).unwrap();
        assert_eq!(text, r#"{"enabled":{"oldValue":true,"newValue":false}}"#);
        assert_eq!(serde_json::to_string(&PrefChanges::new()).unwrap(), "{}");
    }
}
