use std::path::PathBuf;

/// Problems reading, validating or watching the preference set.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("preference file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid preferences: {0}")]
    ParseError(String),

    #[error("rejected preferences: {0}")]
    ValidationError(String),

    #[error("preference watch failed: {0}")]
    WatchError(String),
}

/// Failures reported by browser-side collaborators (tabs, script
/// registration, preference storage).
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    #[error("tab {0} is gone")]
    TabClosed(u64),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("script registration failed: {0}")]
    Registration(String),

    #[error("host call failed: {0}")]
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum UmbraError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(String),

    #[error("{0}")]
    Other(String),
}
