use std::collections::BTreeMap;
use std::fmt;

/// Whether a stylesheet is rendered for the top-level document or a
/// nested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameLevel {
    TopLevel,
    Nested,
}

impl FrameLevel {
    pub const ALL: [FrameLevel; 2] = [FrameLevel::TopLevel, FrameLevel::Nested];

    /// Suffix used in rendered-stylesheet cache keys.
    pub fn key_suffix(self) -> &'static str {
        match self {
            FrameLevel::TopLevel => "toplevel",
            FrameLevel::Nested => "iframe",
        }
    }
}

/// Darkness of the configured background colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Background {
    Dark,
    Light,
}

impl Background {
    pub fn from_is_dark(dark: bool) -> Self {
        if dark {
            Background::Dark
        } else {
            Background::Light
        }
    }
}

/// The two axes a template branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderAxes {
    pub frame: FrameLevel,
    pub background: Background,
}

impl RenderAxes {
    pub fn new(frame: FrameLevel, background: Background) -> Self {
        Self { frame, background }
    }
}

/// A named conditional region in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchTag {
    TopLevel,
    Nested,
    DarkBackground,
    LightBackground,
}

impl BranchTag {
    pub const ALL: [BranchTag; 4] = [
        BranchTag::TopLevel,
        BranchTag::Nested,
        BranchTag::DarkBackground,
        BranchTag::LightBackground,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BranchTag::TopLevel => "toplevel",
            BranchTag::Nested => "nested",
            BranchTag::DarkBackground => "dark_background",
            BranchTag::LightBackground => "light_background",
        }
    }

    pub fn start_key(self) -> String {
        format!("if_{}_start", self.name())
    }

    pub fn end_key(self) -> String {
        format!("if_{}_end", self.name())
    }

    /// Parse `if_<name>_start` / `if_<name>_end`. The flag is `true` for a
    /// start tag.
    pub fn from_key(key: &str) -> Option<(BranchTag, bool)> {
        let rest = key.strip_prefix("if_")?;
        let (name, is_start) = if let Some(name) = rest.strip_suffix("_start") {
            (name, true)
        } else {
            (rest.strip_suffix("_end")?, false)
        };
        BranchTag::ALL
            .into_iter()
            .find(|tag| tag.name() == name)
            .map(|tag| (tag, is_start))
    }

    pub fn is_active(self, axes: RenderAxes) -> bool {
        match self {
            BranchTag::TopLevel => axes.frame == FrameLevel::TopLevel,
            BranchTag::Nested => axes.frame == FrameLevel::Nested,
            BranchTag::DarkBackground => axes.background == Background::Dark,
            BranchTag::LightBackground => axes.background == Background::Light,
        }
    }
}

/// Flat placeholder values for one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderParams {
    values: BTreeMap<String, String>,
}

impl RenderParams {
    /// Values plus the branch toggles for `axes`. Toggles win over any
    /// caller-supplied value with the same key.
    pub fn new<K, V>(values: impl IntoIterator<Item = (K, V)>, axes: RenderAxes) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::from_flat(values);
        for tag in BranchTag::ALL {
            let (start, end) = if tag.is_active(axes) {
                ("", "")
            } else {
                ("/*", "*/")
            };
            params.values.insert(tag.start_key(), start.to_string());
            params.values.insert(tag.end_key(), end.to_string());
        }
        params
    }

    /// Use `values` exactly as given; no toggles are added.
    pub fn from_flat<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn flat(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

/// Cache key of one rendered stylesheet: `<path>_toplevel` or `<path>_iframe`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StylesheetKey {
    pub path: String,
    pub frame: FrameLevel,
}

impl StylesheetKey {
    pub fn new(path: impl Into<String>, frame: FrameLevel) -> Self {
        Self {
            path: path.into(),
            frame,
        }
    }
}

impl fmt::Display for StylesheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.path, self.frame.key_suffix())
    }
}
