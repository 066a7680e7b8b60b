use std::io::Write;

use crate::error::Result;
use crate::registry::Registry;
use crate::tag::{Shape, Tag, TagHeader};

/// A named tag that renders a fixed value.
///
/// The span must be exactly the tag's name. A value tag may also be created
/// without a value, in which case it renders nothing and lookups of its value
/// come back empty.
#[derive(Debug, Clone)]
pub struct ValueTag {
    header: TagHeader,
    value: Option<String>,
}

impl ValueTag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header: TagHeader::new(name),
            value: Some(value.into()),
        }
    }

    pub fn from_int(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, value.to_string())
    }

    /// A value tag whose value is absent.
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            header: TagHeader::new(name),
            value: None,
        }
    }
}

impl Tag for ValueTag {
    fn header(&self) -> &TagHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TagHeader {
        &mut self.header
    }

    fn matches(&self, span: &[u8]) -> bool {
        Shape::Named.matches(&self.header, span)
    }

    fn evaluate(&self, _span: &[u8], _: &mut Registry, out: &mut dyn Write) -> Result<()> {
        if let Some(value) = &self.value {
            out.write_all(value.as_bytes())?;
        }
        Ok(())
    }

    fn has_value(&self) -> bool {
        true
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}
