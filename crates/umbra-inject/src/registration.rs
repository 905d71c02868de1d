//! Content-script registration.
//!
//! The injected payload is registered with the same frame targeting,
//! timing and exclusions the extension manifest declares for its content
//! script, but for every URL and with inline code instead of files.

use serde::{Deserialize, Serialize};

pub const ALL_URLS: &str = "<all_urls>";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("manifest declares no content scripts")]
    NoContentScripts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAt {
    #[default]
    DocumentStart,
    DocumentEnd,
    DocumentIdle,
}

/// The first `content_scripts` entry of the extension manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManifestContentScript {
    #[serde(default)]
    pub matches: Vec<String>,
    #[serde(default)]
    pub js: Vec<String>,
    #[serde(default)]
    pub css: Vec<String>,
    pub all_frames: Option<bool>,
    pub match_about_blank: Option<bool>,
    pub run_at: Option<RunAt>,
    pub exclude_matches: Option<Vec<String>>,
    pub include_globs: Option<Vec<String>>,
    pub exclude_globs: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    content_scripts: Vec<ManifestContentScript>,
}

impl ManifestContentScript {
    pub fn from_manifest_json(text: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(text)?;
        manifest
            .content_scripts
            .into_iter()
            .next()
            .ok_or(ManifestError::NoContentScripts)
    }

    /// Every frame, including `about:blank`, before page scripts.
    pub fn all_frames_at_start() -> Self {
        Self {
            all_frames: Some(true),
            match_about_blank: Some(true),
            run_at: Some(RunAt::DocumentStart),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptSource {
    Code(String),
    File(String),
}

/// What gets handed to the host's script-registration capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRegistration {
    pub matches: Vec<String>,
    pub js: Vec<ScriptSource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<ScriptSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_frames: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_about_blank: Option<bool>,
    pub run_at: RunAt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_matches: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_globs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_globs: Option<Vec<String>>,
}

impl ScriptRegistration {
    /// Register `code` for all URLs with the manifest's settings.
    pub fn from_manifest(manifest: &ManifestContentScript, code: impl Into<String>) -> Self {
        Self {
            matches: vec![ALL_URLS.to_string()],
            js: vec![ScriptSource::Code(code.into())],
            css: manifest.css.iter().cloned().map(ScriptSource::File).collect(),
            all_frames: manifest.all_frames,
            match_about_blank: manifest.match_about_blank,
            run_at: manifest.run_at.unwrap_or_default(),
            exclude_matches: manifest.exclude_matches.clone(),
            include_globs: manifest.include_globs.clone(),
            exclude_globs: manifest.exclude_globs.clone(),
        }
    }

    /// The inline code, if any.
    pub fn code(&self) -> Option<&str> {
        self.js.iter().find_map(|source| match source {
            ScriptSource::Code(code) => Some(code.as_str()),
            ScriptSource::File(_) => None,
        })
    }

    /// Details for running the same code in an already-open tab.
    pub fn inject_details(&self) -> Option<InjectDetails> {
        Some(InjectDetails {
            code: self.code()?.to_string(),
            all_frames: self.all_frames,
            match_about_blank: self.match_about_blank,
            run_at: self.run_at,
        })
    }
}

/// Immediate execution in one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectDetails {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_frames: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_about_blank: Option<bool>,
    pub run_at: RunAt,
}
