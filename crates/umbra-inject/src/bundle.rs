//! Where stylesheet template text comes from.
//!
//! [`StaticBundle`] serves the templates compiled into the binary, with
//! optional in-memory overrides. [`BundleDir`] reads them from a directory
//! on disk and refuses paths that resolve outside it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use umbra_common::UmbraError;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("template path escapes the bundle: {0}")]
    OutsideBundle(String),

    #[error("failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<TemplateError> for UmbraError {
    fn from(err: TemplateError) -> Self {
        UmbraError::Template(err.to_string())
    }
}

/// Fetches raw template text by bundle-relative path
/// (e.g. `methods/base.css`).
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn load(&self, path: &str) -> Result<String, TemplateError>;
}

const BUILT_IN_TEMPLATES: &[(&str, &str)] = &[
    ("methods/base.css", include_str!("../assets/methods/base.css")),
    (
        "methods/stylesheet-processor.css",
        include_str!("../assets/methods/stylesheet-processor.css"),
    ),
    ("methods/simple-css.css", include_str!("../assets/methods/simple-css.css")),
    ("methods/invert.css", include_str!("../assets/methods/invert.css")),
];

/// Templates compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct StaticBundle {
    overrides: HashMap<String, String>,
}

impl StaticBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` for `path` instead of the built-in template.
    pub fn with_override(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.overrides.insert(path.into(), text.into());
        self
    }

    /// Paths of every compiled-in template.
    pub fn built_in_paths() -> impl Iterator<Item = &'static str> {
        BUILT_IN_TEMPLATES.iter().map(|(path, _)| *path)
    }

    fn lookup(&self, path: &str) -> Option<&str> {
        let clean = path.trim_start_matches('/');
        if let Some(text) = self.overrides.get(clean) {
            return Some(text.as_str());
        }
        BUILT_IN_TEMPLATES
            .iter()
            .find(|(p, _)| *p == clean)
            .map(|(_, text)| *text)
    }
}

#[async_trait]
impl TemplateSource for StaticBundle {
    async fn load(&self, path: &str) -> Result<String, TemplateError> {
        self.lookup(path)
            .map(str::to_string)
            .ok_or_else(|| TemplateError::NotFound(path.to_string()))
    }
}

/// Templates read from a directory on disk.
#[derive(Debug, Clone)]
pub struct BundleDir {
    base_dir: PathBuf,
}

impl BundleDir {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait]
impl TemplateSource for BundleDir {
    async fn load(&self, path: &str) -> Result<String, TemplateError> {
        let clean = path.trim_start_matches('/');
        let file_path = self.base_dir.join(clean);

        // Canonicalize both sides so `..` and symlinks cannot escape the bundle.
        let io_err = |source: std::io::Error| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TemplateError::NotFound(path.to_string())
            } else {
                TemplateError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        };
        let canonical_base = tokio::fs::canonicalize(&self.base_dir).await.map_err(io_err)?;
        let canonical_file = tokio::fs::canonicalize(&file_path).await.map_err(io_err)?;
        if !canonical_file.starts_with(&canonical_base) {
            tracing::warn!(path, "template path resolves outside the bundle");
            return Err(TemplateError::OutsideBundle(path.to_string()));
        }

        tokio::fs::read_to_string(&canonical_file)
            .await
            .map_err(io_err)
    }
}
