use std::time::Duration;

use crate::shell::{run_captured, Captured, ShellError};

/// Something that can run a command line and hand back its output.
///
/// The template engine only talks to this trait, so tests (and hosts that want
/// to restrict what `EXEC` may do) can substitute their own implementation.
/// Any `Fn(&str) -> Result<Captured, ShellError>` closure is a runner.
pub trait CommandRunner {
    /// Runs `command` to completion and returns its captured stdout.
    fn run(&self, command: &str) -> Result<Captured, ShellError>;
}

impl<F> CommandRunner for F
where
    F: Fn(&str) -> Result<Captured, ShellError>,
{
    fn run(&self, command: &str) -> Result<Captured, ShellError> {
        self(command)
    }
}

/// Runs commands through the platform shell (`sh -c` / `cmd /C`).
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    /// A runner that waits for as long as the child keeps its output open.
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Kill children that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<Captured, ShellError> {
        tracing::debug!(command, timeout = ?self.timeout, "spawning command");
        run_captured(command, self.timeout)
    }
}
