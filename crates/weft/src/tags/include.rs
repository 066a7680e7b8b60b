use std::io::Write;

use crate::error::{Result, TemplateError};
use crate::fields::Fields;
use crate::registry::Registry;
use crate::tag::{Shape, Tag, TagHeader};

/// Evaluates another template file in place.
///
/// The built-in `INCLUDE=tok` form resolves `tok`, everything after the first
/// field delimiter, to a path: when a tag
/// called `tok` exists, its value is the path (and a tag without a value is
/// an [`InvalidReference`](TemplateError::InvalidReference)); otherwise `tok`
/// itself is the path. Relative paths resolve against the working directory.
///
/// [`IncludeTag::named`] binds a fixed path to a name, so that the bare span
/// `<!--%footer%-->` includes it.
///
/// A file that cannot be opened fails the whole evaluation.
#[derive(Debug, Clone)]
pub struct IncludeTag {
    header: TagHeader,
    path: Option<String>,
}

impl IncludeTag {
    /// The typed `INCLUDE` tag.
    pub fn new() -> Self {
        Self {
            header: TagHeader::new("INCLUDE"),
            path: None,
        }
    }

    /// A named tag that always includes `path`.
    pub fn named(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            header: TagHeader::new(name),
            path: Some(path.into()),
        }
    }

    fn shape(&self) -> Shape {
        match self.path {
            Some(_) => Shape::Named,
            None => Shape::Typed,
        }
    }
}

impl Default for IncludeTag {
    fn default() -> Self {
        Self::new()
    }
}

/// The value of the tag called `token`, or `token` itself when no such tag
/// exists. `token` is the whole argument, field delimiters included.
pub(crate) fn resolve_reference(registry: &Registry, token: &[u8]) -> Result<String> {
    let text = String::from_utf8_lossy(token);
    if registry.contains(token) {
        return registry
            .value_of(token)
            .map(str::to_owned)
            .ok_or_else(|| TemplateError::invalid_reference(text));
    }
    Ok(text.into_owned())
}

impl Tag for IncludeTag {
    fn header(&self) -> &TagHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TagHeader {
        &mut self.header
    }

    fn matches(&self, span: &[u8]) -> bool {
        self.shape().matches(&self.header, span)
    }

    fn evaluate(&self, span: &[u8], registry: &mut Registry, out: &mut dyn Write) -> Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => resolve_reference(registry, Fields::new(span, self.field_delimiter()).rest(1))?,
        };
        tracing::debug!(path = %path, depth = registry.depth(), "including template");
        registry.evaluate_file(&path, out)
    }

    fn has_value(&self) -> bool {
        self.path.is_some()
    }

    fn value(&self) -> Option<&str> {
        self.path.as_deref()
    }
}
