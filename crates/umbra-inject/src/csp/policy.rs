use std::fmt;

use indexmap::map::Entry;
use indexmap::IndexMap;

use super::CspError;

const STYLE_SRC: &str = "style-src";
const DEFAULT_SRC: &str = "default-src";
const DATA_SOURCE: &str = "data:";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
    /// Spelled as the header sent it.
    name: String,
    sources: Vec<String>,
}

/// One serialized policy: directives in header order.
///
/// Names match case-insensitively and are written back as sent. A
/// repeated directive keeps its first position and spelling and takes
/// the sources of its last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    directives: IndexMap<String, Directive>,
}

impl Policy {
    pub fn parse(text: &str) -> Result<Self, CspError> {
        let mut policy = Self::default();
        for directive in text.split(';').map(str::trim).filter(|d| !d.is_empty()) {
            let mut tokens = directive.split_whitespace();
            let Some(name) = tokens.next() else {
                continue;
            };
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(CspError::MalformedDirective(name.to_string()));
            }
            policy.set(name, tokens.map(str::to_string).collect());
        }
        Ok(policy)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.directives
            .get(&name.to_ascii_lowercase())
            .map(|d| d.sources.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Replace the sources of a directive, or append it.
    pub fn set(&mut self, name: impl Into<String>, sources: Vec<String>) {
        let name = name.into();
        match self.directives.entry(name.to_ascii_lowercase()) {
            Entry::Occupied(mut existing) => existing.get_mut().sources = sources,
            Entry::Vacant(slot) => {
                slot.insert(Directive { name, sources });
            }
        }
    }

    fn push_source(&mut self, name: &str, source: &str) {
        if let Some(directive) = self.directives.get_mut(name) {
            directive.sources.push(source.to_string());
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, directive) in self.directives.values().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(&directive.name)?;
            for source in &directive.sources {
                write!(f, " {source}")?;
            }
        }
        Ok(())
    }
}

fn allows_data(sources: &[String]) -> bool {
    sources.iter().any(|s| s.eq_ignore_ascii_case(DATA_SOURCE))
}

/// Patch a single policy so inline `data:` styles are allowed.
///
/// Returns `None` when the policy already allows them or restricts
/// neither `style-src` nor `default-src`.
pub fn patch_policy(raw: &str) -> Result<Option<String>, CspError> {
    let mut policy = Policy::parse(raw)?;

    if let Some(style) = policy.get(STYLE_SRC) {
        if allows_data(style) {
            return Ok(None);
        }
        policy.push_source(STYLE_SRC, DATA_SOURCE);
        return Ok(Some(policy.to_string()));
    }

    let Some(default) = policy.get(DEFAULT_SRC) else {
        return Ok(None);
    };
    if allows_data(default) {
        return Ok(None);
    }
    let style = if default.len() == 1 && default[0].eq_ignore_ascii_case("'none'") {
        vec![DATA_SOURCE.to_string()]
    } else {
        let mut sources = default.to_vec();
        sources.push(DATA_SOURCE.to_string());
        sources
    };
    policy.set(STYLE_SRC, style);
    Ok(Some(policy.to_string()))
}

/// Rewrite a full header value, which may carry several comma-separated
/// policies. Policies that need no change are kept as they were; if none
/// change, `value` is returned untouched.
pub fn rewrite_header_value(value: &str) -> Result<String, CspError> {
    let mut changed = false;
    let mut parts = Vec::new();
    for raw in value.split(',') {
        match patch_policy(raw)? {
            Some(patched) => {
                changed = true;
                parts.push(patched);
            }
            None => parts.push(raw.trim().to_string()),
        }
    }
    if !changed {
        return Ok(value.to_string());
    }
    Ok(parts.join(" , "))
}
