use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use wait_timeout::ChildExt;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("I/O error while running a command: {0}")]
    Io(#[from] io::Error),
    #[error("cannot start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` still running after {after:?}, killed")]
    Timeout { command: String, after: Duration },
    #[error("stdout reader for `{command}` panicked")]
    ReaderPanicked { command: String },
}

/// Everything a finished command wrote to its standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    /// Raw stdout bytes, unmodified.
    pub stdout: Vec<u8>,
    /// Whether the command exited successfully.
    pub success: bool,
    /// Exit code, when the platform reports one.
    pub code: Option<i32>,
}

impl Captured {
    /// A successful capture of the given bytes. Handy for stub runners.
    pub fn from_stdout(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            success: true,
            code: Some(0),
        }
    }
}

/// The platform shell invocation for `command`: `sh -c` on Unix, `cmd /C`
/// on Windows.
pub fn shell_command(command: &str) -> Command {
    let (shell, flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
    let mut invocation = Command::new(shell);
    invocation.arg(flag).arg(command);
    invocation
}

/// Runs `command` through the shell and captures its standard output.
///
/// Stdin is closed and stderr is inherited. The call blocks until the child
/// exits, or until `timeout` elapses, in which case the child is killed and
/// [`ShellError::Timeout`] is returned. A non-zero exit is not an error: the
/// status is reported in [`Captured`] next to whatever the command printed.
///
/// Stdout is drained on a helper thread, so a chatty child cannot fill the
/// pipe and stall while we wait on it.
pub fn run_captured(command: &str, timeout: Option<Duration>) -> Result<Captured, ShellError> {
    let mut child = shell_command(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| ShellError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let reader = drain_stdout(&mut child);
    let status = wait_for(&mut child, command, timeout)?;
    let stdout = reader.join().map_err(|_| ShellError::ReaderPanicked {
        command: command.to_string(),
    })??;

    Ok(Captured {
        stdout,
        success: status.success(),
        code: status.code(),
    })
}

fn drain_stdout(child: &mut Child) -> JoinHandle<io::Result<Vec<u8>>> {
    let stdout = child.stdout.take();
    thread::spawn(move || -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        if let Some(mut stdout) = stdout {
            stdout.read_to_end(&mut bytes)?;
        }
        Ok(bytes)
    })
}

fn wait_for(child: &mut Child, command: &str, timeout: Option<Duration>) -> Result<ExitStatus, ShellError> {
    let Some(after) = timeout else {
        return Ok(child.wait()?);
    };
    if let Some(status) = child.wait_timeout(after)? {
        return Ok(status);
    }
    child.kill()?;
    // Reap it; the reader thread ends when the pipe closes.
    let _ = child.wait();
    Err(ShellError::Timeout {
        command: command.to_string(),
        after,
    })
}
