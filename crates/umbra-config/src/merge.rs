//! Layering of global preferences, private-browsing overrides and
//! per-tab overrides into the configuration a page actually sees.
//!
//! Precedence is tab > private > global. Everything here is pure: a
//! missing entry falls through to the next layer and the global layer
//! always answers.

use std::collections::{BTreeMap, HashMap};

use umbra_common::TabId;
use url::Url;

use crate::methods::MethodId;
use crate::schema::Preferences;

/// Per-tab method overrides.
pub type TabOverrides = HashMap<TabId, MethodId>;

/// Private-browsing overrides keyed by page key (usually a host).
pub type PrivateOverrides = BTreeMap<String, MethodId>;

/// The configuration in effect for one page context.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectiveConfig {
    /// The tab carries its own override, which wins outright.
    Tab(MethodId),
    /// Global preferences with private overrides folded in.
    Layered(LayeredConfig),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayeredConfig {
    pub enabled: bool,
    pub default_method: MethodId,
    pub configured_pages: BTreeMap<String, MethodId>,
}

impl EffectiveConfig {
    /// Resolve the method for a page URL (or bare page key).
    pub fn method_for(&self, page: &str) -> MethodId {
        match self {
            EffectiveConfig::Tab(method) => *method,
            EffectiveConfig::Layered(layered) => layered.method_for(page),
        }
    }

    /// The method for a page no configured key matches, or whose
    /// address is unknown.
    pub fn fallback_method(&self) -> MethodId {
        match self {
            EffectiveConfig::Tab(method) => *method,
            EffectiveConfig::Layered(layered) if !layered.enabled => MethodId::DISABLED,
            EffectiveConfig::Layered(layered) => layered.default_method,
        }
    }
}

impl LayeredConfig {
    fn method_for(&self, page: &str) -> MethodId {
        if !self.enabled {
            return MethodId::DISABLED;
        }
        page_keys(page)
            .iter()
            .filter_map(|key| self.configured_pages.get(key))
            .copied()
            .find(|method| *method != MethodId::DEFAULT)
            .unwrap_or(self.default_method)
    }
}

/// Configured pages with private overrides applied on top.
pub fn merged_pages(global: &Preferences, private: &PrivateOverrides) -> BTreeMap<String, MethodId> {
    let mut pages = global.configured_pages.clone();
    pages.extend(private.iter().map(|(key, method)| (key.clone(), *method)));
    pages
}

/// Compute the effective configuration for `tab_id`.
pub fn merge(
    global: &Preferences,
    private: &PrivateOverrides,
    tabs: &TabOverrides,
    tab_id: Option<TabId>,
) -> EffectiveConfig {
    if let Some(method) = tab_id.and_then(|id| tabs.get(&id)) {
        return EffectiveConfig::Tab(*method);
    }
    EffectiveConfig::Layered(LayeredConfig {
        enabled: global.enabled,
        default_method: global.default_method,
        configured_pages: merged_pages(global, private),
    })
}

/// Candidate configuration keys for a page, most specific first:
/// the page as given, the URL without fragment, the host, then each
/// parent domain (never the bare top-level domain).
pub fn page_keys(page: &str) -> Vec<String> {
    let mut keys = vec![page.to_string()];
    let Ok(url) = Url::parse(page) else {
        return keys;
    };

    let mut push = |key: String| {
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    };

    let mut without_fragment = url.clone();
    without_fragment.set_fragment(None);
    push(without_fragment.to_string());

    if let Some(host) = url.host_str() {
        push(host.to_string());
    }
    if let Some(domain) = url.domain() {
        let labels: Vec<&str> = domain.split('.').collect();
        for start in 1..labels.len().saturating_sub(1) {
            push(labels[start..].join("."));
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_with(pages: &[(&str, MethodId)]) -> Preferences {
        Preferences {
            configured_pages: pages.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn tab_override_beats_private_and_global() {
        let global = global_with(&[("example.com", MethodId::SIMPLE_CSS)]);
        let private = PrivateOverrides::from([("example.com".to_string(), MethodId::INVERT)]);
        let tabs = TabOverrides::from([(TabId(7), MethodId::DISABLED)]);

        let effective = merge(&global, &private, &tabs, Some(TabId(7)));
        assert_eq!(effective, EffectiveConfig::Tab(MethodId::DISABLED));
        assert_eq!(effective.method_for("https://example.com/"), MethodId::DISABLED);
    }

    #[test]
    fn private_beats_global_when_tab_has_no_override() {
        let global = global_with(&[("example.com", MethodId::SIMPLE_CSS)]);
        let private = PrivateOverrides::from([("example.com".to_string(), MethodId::INVERT)]);
        let tabs = TabOverrides::from([(TabId(7), MethodId::DISABLED)]);

        let effective = merge(&global, &private, &tabs, Some(TabId(8)));
        assert_eq!(effective.method_for("https://example.com/"), MethodId::INVERT);
    }

    #[test]
    fn global_answers_when_nothing_else_matches() {
        let global = Preferences::default();
        let effective = merge(&global, &PrivateOverrides::new(), &TabOverrides::new(), None);
        assert_eq!(
            effective.method_for("https://unconfigured.org/page"),
            global.default_method
        );
    }

    #[test]
    fn private_entries_apply_regardless_of_tab() {
        let global = Preferences::default();
        let private = PrivateOverrides::from([("news.example".to_string(), MethodId::DISABLED)]);
        for tab in [None, Some(TabId(1)), Some(TabId(2))] {
            let effective = merge(&global, &private, &TabOverrides::new(), tab);
            assert_eq!(effective.method_for("https://news.example/a"), MethodId::DISABLED);
        }
    }

    #[test]
    fn disabled_globally_resolves_to_disabled() {
        let global = Preferences {
            enabled: false,
            ..global_with(&[("example.com", MethodId::INVERT)])
        };
        let effective = merge(&global, &PrivateOverrides::new(), &TabOverrides::new(), None);
        assert_eq!(effective.method_for("https://example.com/"), MethodId::DISABLED);
    }

    #[test]
    fn parent_domain_matches_subdomain() {
        let global = global_with(&[("example.com", MethodId::INVERT)]);
        let effective = merge(&global, &PrivateOverrides::new(), &TabOverrides::new(), None);
        assert_eq!(
            effective.method_for("https://docs.api.example.com/x#y"),
            MethodId::INVERT
        );
    }

    #[test]
    fn default_entry_falls_through_to_less_specific_key() {
        let global = global_with(&[
            ("a.example.com", MethodId::DEFAULT),
            ("example.com", MethodId::SIMPLE_CSS),
        ]);
        let effective = merge(&global, &PrivateOverrides::new(), &TabOverrides::new(), None);
        assert_eq!(effective.method_for("https://a.example.com/"), MethodId::SIMPLE_CSS);
    }

    #[test]
    fn fallback_method_ignores_configured_pages() {
        let global = global_with(&[("example.com", MethodId::INVERT)]);
        let none = merge(&global, &PrivateOverrides::new(), &TabOverrides::new(), None);
        assert_eq!(none.fallback_method(), MethodId::STYLESHEET_PROCESSOR);

        let off = Preferences {
            enabled: false,
            ..global.clone()
        };
        let off = merge(&off, &PrivateOverrides::new(), &TabOverrides::new(), None);
        assert_eq!(off.fallback_method(), MethodId::DISABLED);

        let tabs = TabOverrides::from([(TabId(2), MethodId::SIMPLE_CSS)]);
        let tab = merge(&global, &PrivateOverrides::new(), &tabs, Some(TabId(2)));
        assert_eq!(tab.fallback_method(), MethodId::SIMPLE_CSS);
    }

    #[test]
    fn page_keys_most_specific_first() {
        assert_eq!(
            page_keys("https://a.b.example.com/p?q=1#frag"),
            vec![
                "https://a.b.example.com/p?q=1#frag",
                "https://a.b.example.com/p?q=1",
                "a.b.example.com",
                "b.example.com",
                "example.com",
            ]
        );
    }

    #[test]
    fn page_keys_for_ip_and_plain_keys() {
        assert_eq!(
            page_keys("http://127.0.0.1:8080/"),
            vec!["http://127.0.0.1:8080/", "127.0.0.1"]
        );
        assert_eq!(page_keys("example.com"), vec!["example.com"]);
    }

    #[test]
    fn merged_pages_overlays_private() {
        let global = global_with(&[("a.com", MethodId::INVERT), ("b.com", MethodId::SIMPLE_CSS)]);
        let private = PrivateOverrides::from([("b.com".to_string(), MethodId::DISABLED)]);
        let pages = merged_pages(&global, &private);
        assert_eq!(pages.get("a.com"), Some(&MethodId::INVERT));
        assert_eq!(pages.get("b.com"), Some(&MethodId::DISABLED));
    }
}
