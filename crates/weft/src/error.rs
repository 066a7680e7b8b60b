//! Error types for template evaluation.
//!
//! Every failure the engine can report is a [`TemplateError`]. Failures that
//! the template language defines as non-fatal (unknown tags, a command that
//! cannot be spawned) never reach this type: they are either silently dropped
//! or written into the output as a visible diagnostic.

use std::io;
use std::path::PathBuf;

/// Marker written to the sink when a tag's closing delimiter is missing.
pub const UNCLOSED_TAG_MARKER: &str = "[unclosed tag]";

/// Errors produced while evaluating a template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A start delimiter had no matching end delimiter.
    ///
    /// The `[unclosed tag]` marker has already been written to the sink.
    #[error("unclosed tag starting at byte {offset}")]
    UnclosedTag { offset: usize },

    /// A tag referred to a name that is absent or carries no value.
    #[error("invalid reference to '{name}'")]
    InvalidReference { name: String },

    /// A template file could not be opened.
    #[error("failed to open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A read was attempted on a source that was already closed.
    #[error("source is closed")]
    SourceClosed,

    /// A repeating tag ran into the configured iteration ceiling.
    #[error("'{name}' exceeded the iteration limit of {limit}")]
    IterationLimit { name: String, limit: usize },

    /// Reading a source or writing the sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Raised by host-supplied tags and hooks.
    #[error("{0}")]
    Custom(String),
}

impl TemplateError {
    /// Create an invalid-reference error.
    pub fn invalid_reference(name: impl Into<String>) -> Self {
        Self::InvalidReference { name: name.into() }
    }

    /// Create a custom error for host-supplied tags.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// A negative status code, distinct per variant, for callers that report
    /// integers.
    pub fn status_code(&self) -> i32 {
        match self {
            TemplateError::UnclosedTag { .. } => -1,
            TemplateError::Open { .. } => -2,
            TemplateError::SourceClosed => -3,
            TemplateError::InvalidReference { .. } => -4,
            TemplateError::IterationLimit { .. } => -5,
            TemplateError::Io(_) => -6,
            TemplateError::Config(_) => -7,
            TemplateError::Custom(_) => -8,
        }
    }
}

impl From<serde_yaml::Error> for TemplateError {
    fn from(err: serde_yaml::Error) -> Self {
        TemplateError::Config(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = TemplateError> = std::result::Result<T, E>;

/// Collapses an evaluation result into `0` or a negative status code.
pub fn status_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.status_code(),
    }
}
