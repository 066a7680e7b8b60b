//! Files that feed bindings into the registry.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use weft::EngineConfig;

/// A scalar from a vars or config file, rendered as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    pub fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(x) => x.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Reads a flat name/value map. `.json` files are JSON, anything else YAML.
pub fn load_vars(path: &Path) -> Result<Vec<(String, String)>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read vars file {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let map: BTreeMap<String, Scalar> = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in {}", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML in {}", path.display()))?
    };
    Ok(map
        .into_iter()
        .map(|(name, value)| (name, value.into_text()))
        .collect())
}

/// The `--config` file: engine settings plus tags to register up front.
///
/// ```yaml
/// start_delimiter: "{{"
/// end_delimiter: "}}"
/// tags:
///   site: Example
/// includes:
///   footer: partials/footer.html
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub engine: EngineConfig,
    /// Value tags.
    pub tags: BTreeMap<String, Scalar>,
    /// Named includes: tag name to template path.
    pub includes: BTreeMap<String, String>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: CliConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }
}
