//! Field access within a tag span.
//!
//! Typed tags carry their arguments as delimiter-separated fields:
//! `IF=flag=<body>` has the fields `IF`, `flag` and `<body>`. The last field a
//! tag reads is usually taken with [`Fields::rest`], so that a body may itself
//! contain the delimiter (for instance inside nested tags).

use std::borrow::Cow;

use crate::scan::find_from;

/// A view over the fields of one span.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    span: &'a [u8],
    delim: &'a [u8],
}

impl<'a> Fields<'a> {
    pub fn new(span: &'a [u8], delim: &'a str) -> Self {
        Self {
            span,
            delim: delim.as_bytes(),
        }
    }

    /// The whole span.
    pub fn span(&self) -> &'a [u8] {
        self.span
    }

    /// Byte offset at which field `which` starts, if the span has that many fields.
    fn offset(&self, which: usize) -> Option<usize> {
        let mut pos = 0;
        for _ in 0..which {
            pos = find_from(self.span, self.delim, pos)? + self.delim.len();
        }
        Some(pos)
    }

    /// Field `which`, up to the next delimiter. `None` if the span is shorter.
    pub fn try_get(&self, which: usize) -> Option<&'a [u8]> {
        let start = self.offset(which)?;
        let end = if self.delim.is_empty() {
            self.span.len()
        } else {
            find_from(self.span, self.delim, start).unwrap_or(self.span.len())
        };
        Some(&self.span[start..end])
    }

    /// Field `which`, or an empty slice when the span has fewer fields.
    pub fn get(&self, which: usize) -> &'a [u8] {
        self.try_get(which).unwrap_or_default()
    }

    /// Field `which` as text. Invalid UTF-8 is replaced.
    pub fn get_str(&self, which: usize) -> Cow<'a, str> {
        String::from_utf8_lossy(self.get(which))
    }

    /// Everything from the start of field `which` to the end of the span,
    /// delimiters included. Empty when the span has fewer fields.
    pub fn rest(&self, which: usize) -> &'a [u8] {
        match self.offset(which) {
            Some(start) => &self.span[start..],
            None => &[],
        }
    }

    /// The tag name: the first field.
    pub fn name(&self) -> &'a [u8] {
        self.get(0)
    }

    /// Number of fields in the span.
    pub fn len(&self) -> usize {
        if self.delim.is_empty() {
            return 1;
        }
        let mut count = 1;
        let mut pos = 0;
        while let Some(found) = find_from(self.span, self.delim, pos) {
            count += 1;
            pos = found + self.delim.len();
        }
        count
    }

    /// A span always has at least one (possibly empty) field.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Whether the first field of `span` is exactly `name`.
pub fn first_field_is(span: &[u8], delim: &str, name: &str) -> bool {
    Fields::new(span, delim).name() == name.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_delimiter() {
        let fields = Fields::new(b"IF_EQ=color=red=body", "=");
        assert_eq!(fields.get(0), b"IF_EQ");
        assert_eq!(fields.get(1), b"color");
        assert_eq!(fields.get(2), b"red");
        assert_eq!(fields.get(3), b"body");
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn missing_fields_are_empty() {
        let fields = Fields::new(b"IF=flag", "=");
        assert_eq!(fields.get(2), b"");
        assert_eq!(fields.try_get(2), None);
        assert_eq!(fields.rest(2), b"");
    }

    #[test]
    fn trailing_delimiter_yields_empty_field() {
        let fields = Fields::new(b"IF=flag=", "=");
        assert_eq!(fields.try_get(2), Some(&b""[..]));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn rest_keeps_later_delimiters() {
        let fields = Fields::new(b"IF=flag=<!--%IF=other=x%-->", "=");
        assert_eq!(fields.rest(2), b"<!--%IF=other=x%-->");
        assert_eq!(fields.get(2), b"<!--%IF");
    }

    #[test]
    fn multi_byte_delimiter() {
        let fields = Fields::new(b"a::b::c", "::");
        assert_eq!(fields.get(1), b"b");
        assert_eq!(fields.rest(1), b"b::c");
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn bare_span_is_one_field() {
        let fields = Fields::new(b"place", "=");
        assert_eq!(fields.name(), b"place");
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn get_str_is_lossy() {
        let fields = Fields::new(b"ENV=\xffHOME", "=");
        assert_eq!(fields.get_str(1), "\u{fffd}HOME");
    }

    #[test]
    fn first_field_comparison() {
        assert!(first_field_is(b"IF=x=y", "=", "IF"));
        assert!(first_field_is(b"IF", "=", "IF"));
        assert!(!first_field_is(b"IF_NOT=x=y", "=", "IF"));
        assert!(!first_field_is(b"IFX", "=", "IF"));
        assert!(!first_field_is(b"IF=x", "|", "IF"));
    }
}
