//! Error types for TLD fetching, pattern refresh and configuration.

use hilite_core::{PatternError, StoreError};
use miette::Diagnostic;
use thiserror::Error;

/// Failure to obtain or use a TLD list. The previous pattern stays in effect.
#[derive(Debug, Error, Diagnostic)]
pub enum TldError {
    #[error("malformed TLD entry {content:?} on line {line}")]
    #[diagnostic(
        code(hilite::tld::malformed),
        help("entries may only contain ASCII letters, digits and hyphens")
    )]
    Malformed { line: usize, content: String },

    #[error("TLD list has no entries")]
    #[diagnostic(code(hilite::tld::empty))]
    Empty,

    #[error("TLD request failed")]
    #[diagnostic(code(hilite::tld::fetch))]
    Fetch(#[from] reqwest::Error),

    #[error("TLD source answered with status {0}")]
    #[diagnostic(code(hilite::tld::status))]
    Status(u16),

    #[error("reading TLD file failed")]
    #[diagnostic(code(hilite::tld::io))]
    Io(#[from] std::io::Error),

    #[error("TLD fetch timed out after {secs}s")]
    #[diagnostic(code(hilite::tld::timeout))]
    Timeout { secs: u64 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),
}

impl TldError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Fetch(_) | Self::Status(_) | Self::Io(_) | Self::Timeout { .. }
        )
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum JsonStoreError {
    #[error("store file is not a JSON object of strings")]
    #[diagnostic(code(hilite::store::json))]
    Json(#[from] serde_json::Error),
}

impl From<JsonStoreError> for StoreError {
    fn from(err: JsonStoreError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read configuration")]
    #[diagnostic(code(hilite::config::io))]
    Io(#[from] std::io::Error),

    #[error("invalid configuration file")]
    #[diagnostic(code(hilite::config::parse))]
    Parse(#[from] serde_json::Error),
}
