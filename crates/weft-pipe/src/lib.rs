//! External command execution for the weft template engine.
//!
//! The `EXEC` tag hands a command line to a [`CommandRunner`]. The default
//! runner, [`ShellRunner`], spawns the command through the platform shell,
//! blocks until the child closes its standard output, and returns every byte
//! it produced. An optional timeout kills children that never finish.
//!
//! ```rust,no_run
//! use weft_pipe::{CommandRunner, ShellRunner};
//!
//! let captured = ShellRunner::new().run("echo hello").unwrap();
//! assert_eq!(captured.stdout, b"hello\n");
//! ```

pub mod runner;
pub mod shell;

pub use runner::{CommandRunner, ShellRunner};
pub use shell::{run_captured, shell_command, Captured, ShellError};
