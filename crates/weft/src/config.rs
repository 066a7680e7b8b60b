//! Engine configuration.
//!
//! [`EngineConfig`] carries the settings a [`Registry`](crate::Registry) is
//! built with: the tag delimiters, the iteration ceiling for repeating tags,
//! and the timeout handed to the `EXEC` command runner. It deserializes from
//! YAML, with every key optional:
//!
//! ```yaml
//! start_delimiter: "{%"
//! end_delimiter: "%}"
//! field_delimiter: "|"
//! max_repeat_iterations: 500
//! exec_timeout_ms: 2000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemplateError};

/// Default opening delimiter of a tag span.
pub const DEFAULT_START_DELIMITER: &str = "<!--%";
/// Default closing delimiter of a tag span.
pub const DEFAULT_END_DELIMITER: &str = "%-->";
/// Default separator between the fields of a typed tag.
pub const DEFAULT_FIELD_DELIMITER: &str = "=";
/// Default ceiling on the number of passes a repeating tag may make.
pub const DEFAULT_MAX_REPEAT_ITERATIONS: usize = 100_000;

/// Settings for a registry and the evaluations it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub start_delimiter: String,
    pub end_delimiter: String,
    /// Assigned to each tag when it is added to the registry.
    pub field_delimiter: String,
    /// `None` lets a repeat loop run for as long as its body keeps it alive.
    pub max_repeat_iterations: Option<usize>,
    /// `None` waits for `EXEC` children indefinitely.
    pub exec_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_delimiter: DEFAULT_START_DELIMITER.to_string(),
            end_delimiter: DEFAULT_END_DELIMITER.to_string(),
            field_delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
            max_repeat_iterations: Some(DEFAULT_MAX_REPEAT_ITERATIONS),
            exec_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Rejects delimiters the scanner cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.start_delimiter.is_empty() {
            return Err(TemplateError::Config("start_delimiter must not be empty".into()));
        }
        if self.end_delimiter.is_empty() {
            return Err(TemplateError::Config("end_delimiter must not be empty".into()));
        }
        if self.field_delimiter.is_empty() {
            return Err(TemplateError::Config("field_delimiter must not be empty".into()));
        }
        Ok(())
    }

    pub fn exec_timeout(&self) -> Option<Duration> {
        self.exec_timeout_ms.map(Duration::from_millis)
    }
}
