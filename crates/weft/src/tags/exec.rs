use std::io::Write;

use crate::error::Result;
use crate::fields::Fields;
use crate::registry::Registry;
use crate::tag::{Tag, TagHeader};

use super::include::resolve_reference;

/// `EXEC=tok`: runs a command and writes its standard output verbatim.
///
/// `tok` is everything after the first field delimiter, so commands may
/// contain `=`. It resolves like the `INCLUDE` token: the value of the tag called `tok`
/// if there is one, else `tok` itself. Commands go through the registry's
/// [`CommandRunner`](weft_pipe::CommandRunner). A command that cannot be run
/// leaves an `[exec failed: ...]` note in the output and evaluation goes on.
#[derive(Debug, Clone)]
pub struct ExecTag {
    header: TagHeader,
}

impl ExecTag {
    pub fn new() -> Self {
        Self {
            header: TagHeader::new("EXEC"),
        }
    }
}

impl Default for ExecTag {
    fn default() -> Self {
        Self::new()
    }
}

impl Tag for ExecTag {
    fn header(&self) -> &TagHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TagHeader {
        &mut self.header
    }

    fn evaluate(&self, span: &[u8], registry: &mut Registry, out: &mut dyn Write) -> Result<()> {
        let fields = Fields::new(span, self.field_delimiter());
        let command = resolve_reference(registry, fields.rest(1))?;

        match registry.command_runner().run(&command) {
            Ok(captured) => {
                if !captured.success {
                    tracing::warn!(command = %command, code = ?captured.code, "command exited unsuccessfully");
                }
                out.write_all(&captured.stdout)?;
            }
            Err(err) => {
                tracing::warn!(command = %command, error = %err, "command failed");
                write!(out, "[exec failed: {err}]")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use weft_pipe::{Captured, ShellError};

    fn recording(registry: &mut Registry) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        registry.set_command_runner(move |command: &str| -> std::result::Result<Captured, ShellError> {
            log.borrow_mut().push(command.to_string());
            Ok(Captured::from_stdout(format!("<{command}>")))
        });
        seen
    }

    #[test]
    fn literal_command() {
        let mut registry = Registry::new();
        let seen = recording(&mut registry);
        assert_eq!(registry.render_str("<!--%EXEC=date -u%-->").unwrap(), "<date -u>");
        assert_eq!(*seen.borrow(), ["date -u"]);
    }

    #[test]
    fn command_from_tag_value() {
        let mut registry = Registry::new();
        let seen = recording(&mut registry);
        registry.set("cmd", "uname");
        assert_eq!(registry.render_str("<!--%EXEC=cmd%-->").unwrap(), "<uname>");
        assert_eq!(*seen.borrow(), ["uname"]);
    }

    #[test]
    fn command_keeps_field_delimiters() {
        let mut registry = Registry::new();
        let seen = recording(&mut registry);
        registry.render_str("<!--%EXEC=ls --color=never%-->").unwrap();
        registry.render_str("<!--%EXEC=LANG=C sort=x%-->").unwrap();
        assert_eq!(*seen.borrow(), ["ls --color=never", "LANG=C sort=x"]);
    }

    #[test]
    fn tag_without_value_is_invalid() {
        let mut registry = Registry::new();
        recording(&mut registry);
        assert!(matches!(
            registry.render_str("<!--%EXEC=ENV%-->"),
            Err(TemplateError::InvalidReference { .. })
        ));
    }

    #[test]
    fn runner_errors_are_written_inline() {
        let mut registry = Registry::new();
        registry.set_command_runner(|command: &str| -> std::result::Result<Captured, ShellError> {
            Err(ShellError::ReaderPanicked {
                command: command.to_string(),
            })
        });
        let out = registry.render_str("a<!--%EXEC=x%-->b").unwrap();
        assert_eq!(out, "a[exec failed: stdout reader for `x` panicked]b");
    }

    #[test]
    fn unsuccessful_commands_still_write_output() {
        let mut registry = Registry::new();
        registry.set_command_runner(|_: &str| -> std::result::Result<Captured, ShellError> {
            Ok(Captured {
                stdout: b"partial".to_vec(),
                success: false,
                code: Some(2),
            })
        });
        assert_eq!(registry.render_str("<!--%EXEC=x%-->").unwrap(), "partial");
    }

    #[cfg(unix)]
    #[test]
    fn runs_through_the_shell_by_default() {
        let mut registry = Registry::new();
        let out = registry.render_str("[<!--%EXEC=printf 'a b'%-->]").unwrap();
        assert_eq!(out, "[a b]");
    }
}
