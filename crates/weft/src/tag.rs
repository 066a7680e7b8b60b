//! The tag abstraction.
//!
//! A [`Tag`] is a named handler that can recognise a span of template text
//! and render it. Every tag has:
//!
//! - a name, which is its key in the [`Registry`];
//! - a field delimiter, copied from the registry when the tag is added and
//!   independent of later registry changes;
//! - a match predicate ([`Tag::matches`]) and an evaluator ([`Tag::evaluate`]);
//! - optionally a value ([`Tag::value`]) that other tags can look up;
//! - optionally some teardown work ([`Tag::teardown`]) run when the registry
//!   lets go of it.
//!
//! # Shapes
//!
//! Tags recognise spans in one of two [`Shape`]s:
//!
//! | Shape | Span | Example |
//! |-------|------|---------|
//! | [`Shape::Named`] | exactly the tag name | `<!--%place%-->` |
//! | [`Shape::Typed`] | first field is the tag name | `<!--%IF=flag=yes%-->` |

use std::io::Write;

use crate::config::DEFAULT_FIELD_DELIMITER;
use crate::error::Result;
use crate::fields::first_field_is;
use crate::registry::Registry;

/// How a tag recognises the spans it handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// The whole span equals the tag name.
    Named,
    /// The span's first field equals the tag name.
    Typed,
}

impl Shape {
    pub fn matches(self, header: &TagHeader, span: &[u8]) -> bool {
        match self {
            Shape::Named => span == header.name.as_bytes(),
            Shape::Typed => first_field_is(span, &header.delimiter, &header.name),
        }
    }
}

/// The name and field delimiter every tag carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHeader {
    name: String,
    delimiter: String,
}

impl TagHeader {
    /// A header with the default field delimiter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn set_delimiter(&mut self, delimiter: impl Into<String>) {
        self.delimiter = delimiter.into();
    }
}

/// A named handler for template spans.
///
/// Implementors provide [`header`](Tag::header), [`header_mut`](Tag::header_mut)
/// and [`evaluate`](Tag::evaluate); the rest have defaults. The default
/// [`matches`](Tag::matches) uses the typed shape.
///
/// `evaluate` takes `&self`: a tag may be re-entered while it is running
/// (an `IF` inside an `IF` body), so any per-tag state lives behind interior
/// mutability.
///
/// # Example
///
/// ```rust
/// use std::io::Write;
/// use weft::{Fields, Registry, Result, Tag, TagHeader};
///
/// struct Shout(TagHeader);
///
/// impl Tag for Shout {
///     fn header(&self) -> &TagHeader { &self.0 }
///     fn header_mut(&mut self) -> &mut TagHeader { &mut self.0 }
///
///     fn evaluate(&self, span: &[u8], _: &mut Registry, out: &mut dyn Write) -> Result<()> {
///         let fields = Fields::new(span, self.field_delimiter());
///         out.write_all(&fields.get(1).to_ascii_uppercase())?;
///         Ok(())
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry.add(Shout(TagHeader::new("SHOUT")));
/// assert_eq!(registry.render_str("<!--%SHOUT=hey%-->").unwrap(), "HEY");
/// ```
pub trait Tag {
    fn header(&self) -> &TagHeader;

    fn header_mut(&mut self) -> &mut TagHeader;

    /// Renders `span` into `out`. Only called after [`matches`](Tag::matches)
    /// accepted the span.
    fn evaluate(&self, span: &[u8], registry: &mut Registry, out: &mut dyn Write) -> Result<()>;

    /// Whether this tag handles `span`.
    fn matches(&self, span: &[u8]) -> bool {
        Shape::Typed.matches(self.header(), span)
    }

    /// Whether this tag carries a value other tags may look up.
    fn has_value(&self) -> bool {
        false
    }

    /// The tag's value, for value-bearing tags whose value is present.
    fn value(&self) -> Option<&str> {
        None
    }

    /// Called once when the registry drops the tag.
    fn teardown(&self) {}

    fn name(&self) -> &str {
        self.header().name()
    }

    fn field_delimiter(&self) -> &str {
        self.header().delimiter()
    }
}

impl std::fmt::Debug for dyn Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tag")
            .field("name", &self.name())
            .field("field_delimiter", &self.field_delimiter())
            .field("value", &self.value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_shape_needs_exact_span() {
        let header = TagHeader::new("place");
        assert!(Shape::Named.matches(&header, b"place"));
        assert!(!Shape::Named.matches(&header, b"place=x"));
        assert!(!Shape::Named.matches(&header, b" place"));
    }

    #[test]
    fn typed_shape_checks_first_field() {
        let header = TagHeader::new("IF");
        assert!(Shape::Typed.matches(&header, b"IF=a=b"));
        assert!(Shape::Typed.matches(&header, b"IF"));
        assert!(!Shape::Typed.matches(&header, b"IF_NOT=a=b"));
    }

    #[test]
    fn typed_shape_uses_header_delimiter() {
        let mut header = TagHeader::new("IF");
        header.set_delimiter("|");
        assert!(Shape::Typed.matches(&header, b"IF|a|b"));
        assert!(!Shape::Typed.matches(&header, b"IF=a=b"));
    }

    #[test]
    fn header_defaults_to_equals() {
        assert_eq!(TagHeader::new("x").delimiter(), "=");
    }
}
