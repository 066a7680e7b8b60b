//! Template evaluation.
//!
//! Evaluation walks the template with a [`Scanner`], copies plain text to the
//! sink unchanged, and hands every tag span to the first visible tag whose
//! predicate accepts it. Spans no tag claims produce no output.
//!
//! Tags evaluate their bodies by calling back into [`Registry::evaluate_bytes`],
//! so evaluation nests. The pre-scan hook runs only when the outermost
//! evaluation starts.
//!
//! An unclosed tag ends only the scan it occurs in. When that scan is nested
//! (an `IF` body, an included file), the enclosing scans carry on and the
//! outermost evaluation reports the first such failure once it is done.

use std::io::Write;
use std::path::Path;

use crate::error::{Result, TemplateError, UNCLOSED_TAG_MARKER};
use crate::registry::Registry;
use crate::scan::{Scanner, Segment};
use crate::source::{FileSource, Source};

impl Registry {
    /// Evaluates the template file at `path`.
    pub fn evaluate_file(&mut self, path: impl AsRef<Path>, out: &mut dyn Write) -> Result<()> {
        let mut source = FileSource::open(path)?;
        let result = self.evaluate_source(&mut source, out);
        let closed = source.close();
        result.and(closed)
    }

    /// Evaluates the remaining contents of `source`.
    pub fn evaluate_source(&mut self, source: &mut dyn Source, out: &mut dyn Write) -> Result<()> {
        let template = source.read_all()?;
        self.evaluate_bytes(&template, out)
    }

    pub fn evaluate_str(&mut self, template: &str, out: &mut dyn Write) -> Result<()> {
        self.evaluate_bytes(template.as_bytes(), out)
    }

    /// Evaluates `template`, writing the result to `out`.
    ///
    /// On an unclosed tag the `[unclosed tag]` marker is written after the
    /// text preceding it and scanning of that template stops. The outermost
    /// call returns [`TemplateError::UnclosedTag`] for the first unclosed tag
    /// met at any depth; nested calls return `Ok` so their callers go on.
    pub fn evaluate_bytes(&mut self, template: &[u8], out: &mut dyn Write) -> Result<()> {
        if self.depth == 0 {
            self.deferred = None;
            self.run_pre_scan_hook(out)?;
        }

        self.depth += 1;
        let result = self.scan(template, out);
        self.depth -= 1;

        if self.depth > 0 {
            return match result {
                Err(err @ TemplateError::UnclosedTag { .. }) => {
                    if self.deferred.is_none() {
                        self.deferred = Some(err);
                    }
                    Ok(())
                }
                other => other,
            };
        }
        match (result, self.deferred.take()) {
            (Ok(()) | Err(TemplateError::UnclosedTag { .. }), Some(first)) => Err(first),
            (result, _) => result,
        }
    }

    /// Evaluates `template` into a string.
    pub fn render_str(&mut self, template: &str) -> Result<String> {
        let mut out = Vec::with_capacity(template.len());
        self.evaluate_bytes(template.as_bytes(), &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn run_pre_scan_hook(&mut self, out: &mut dyn Write) -> Result<()> {
        let Some(mut hook) = self.pre_scan.take() else {
            return Ok(());
        };
        tracing::trace!("running pre-scan hook");
        let result = hook(self, out);
        // The hook may have installed a successor; that one wins.
        if self.pre_scan.is_none() {
            self.pre_scan = Some(hook);
        }
        result
    }

    fn scan(&mut self, template: &[u8], out: &mut dyn Write) -> Result<()> {
        let start = self.start_delimiter().to_string();
        let end = self.end_delimiter().to_string();

        for segment in Scanner::new(template, start.as_bytes(), end.as_bytes()) {
            match segment {
                Segment::Text(text) => out.write_all(text)?,
                Segment::Tag { span, offset } => self.dispatch(span, offset, out)?,
                Segment::Unclosed { offset } => {
                    tracing::debug!(offset, depth = self.depth, "unclosed tag");
                    out.write_all(UNCLOSED_TAG_MARKER.as_bytes())?;
                    return Err(TemplateError::UnclosedTag { offset });
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, span: &[u8], offset: usize, out: &mut dyn Write) -> Result<()> {
        match self.handler_for(span) {
            Some(tag) => {
                tracing::trace!(tag = tag.name(), offset, depth = self.depth, "dispatch");
                tag.evaluate(span, self, out)
            }
            None => {
                tracing::trace!(
                    offset,
                    span = %String::from_utf8_lossy(span),
                    "no tag matches, dropping span"
                );
                Ok(())
            }
        }
    }
}
