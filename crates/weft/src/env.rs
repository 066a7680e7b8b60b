//! Environment abstraction for the `ENV` tag.
//!
//! The registry reads environment variables through an [`EnvLookup`] so that
//! tests (and hosts that want to expose only part of the environment) can
//! substitute their own.

use std::collections::HashMap;

/// Where `ENV` looks variables up.
pub trait EnvLookup {
    /// The value of `name`, or `None` when it is unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment. Values that are not UTF-8 are converted lossily.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealEnv;

impl EnvLookup for RealEnv {
    fn var(&self, name: &str) -> Option<String> {
        // Names the platform cannot represent are simply unset.
        if name.is_empty() || name.contains(['=', '\0']) {
            return None;
        }
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

/// A fixed set of variables, for tests.
#[derive(Debug, Default, Clone)]
pub struct MockEnv {
    vars: HashMap<String, String>,
}

impl MockEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvLookup for MockEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn real_env_reads_process_environment() {
        std::env::set_var("WEFT_ENV_TEST", "present");
        assert_eq!(RealEnv.var("WEFT_ENV_TEST").as_deref(), Some("present"));
        std::env::remove_var("WEFT_ENV_TEST");
        assert_eq!(RealEnv.var("WEFT_ENV_TEST"), None);
    }

    #[test]
    fn real_env_rejects_unrepresentable_names() {
        assert_eq!(RealEnv.var(""), None);
        assert_eq!(RealEnv.var("A=B"), None);
        assert_eq!(RealEnv.var("A\0B"), None);
    }

    #[test]
    fn mock_env_returns_configured_values() {
        let env = MockEnv::new().with_var("HOME", "/home/test");
        assert_eq!(env.var("HOME").as_deref(), Some("/home/test"));
        assert_eq!(env.var("PATH"), None);
    }
}
