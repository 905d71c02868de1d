//! Colouring methods and the stylesheets each one injects.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Numeric selector of a colouring method.
///
/// Serialized as a bare number. Deserialization also accepts numeric
/// strings (`"0"`), which is how page scripts send overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MethodId(pub i32);

impl MethodId {
    /// Defer to whatever the next configuration layer says.
    pub const DEFAULT: MethodId = MethodId(-1);
    /// Leave the page untouched.
    pub const DISABLED: MethodId = MethodId(0);
    pub const STYLESHEET_PROCESSOR: MethodId = MethodId(1);
    pub const SIMPLE_CSS: MethodId = MethodId(2);
    pub const INVERT: MethodId = MethodId(3);

    pub fn is_disabled(self) -> bool {
        self == Self::DISABLED
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MethodId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(MethodId)
    }
}

impl<'de> Deserialize<'de> for MethodId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => i32::try_from(n)
                .map(MethodId)
                .map_err(|_| D::Error::custom(format!("method id out of range: {n}"))),
            Raw::Text(s) => s
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid method id: {s:?}"))),
        }
    }
}

/// A colouring method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Method {
    pub id: MethodId,
    pub label: &'static str,
    /// Stylesheet templates (bundle paths) the method injects.
    pub stylesheets: &'static [&'static str],
    /// Whether nested frames follow the top-level document's choice.
    pub affects_iframes: bool,
}

pub const BASE_STYLESHEET: &str = "methods/base.css";

pub static BUILT_IN_METHODS: &[Method] = &[
    Method {
        id: MethodId::DEFAULT,
        label: "Default",
        stylesheets: &[],
        affects_iframes: false,
    },
    Method {
        id: MethodId::DISABLED,
        label: "Disabled",
        stylesheets: &[],
        affects_iframes: false,
    },
    Method {
        id: MethodId::STYLESHEET_PROCESSOR,
        label: "Stylesheet processor",
        stylesheets: &[BASE_STYLESHEET, "methods/stylesheet-processor.css"],
        affects_iframes: false,
    },
    Method {
        id: MethodId::SIMPLE_CSS,
        label: "Simple CSS",
        stylesheets: &[BASE_STYLESHEET, "methods/simple-css.css"],
        affects_iframes: false,
    },
    Method {
        id: MethodId::INVERT,
        label: "Invert",
        stylesheets: &["methods/invert.css"],
        affects_iframes: true,
    },
];

/// Lookup over a set of methods.
#[derive(Debug, Clone, Copy)]
pub struct MethodCatalog {
    methods: &'static [Method],
}

impl MethodCatalog {
    pub fn builtin() -> Self {
        Self {
            methods: BUILT_IN_METHODS,
        }
    }

    pub fn get(&self, id: MethodId) -> Option<&'static Method> {
        self.methods.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: MethodId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Method> {
        self.methods.iter()
    }

    /// Every distinct stylesheet referenced by any method, in first-seen order.
    pub fn stylesheets(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for sheet in self.methods.iter().flat_map(|m| m.stylesheets.iter()) {
            if !out.contains(sheet) {
                out.push(sheet);
            }
        }
        out
    }
}

impl Default for MethodCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
