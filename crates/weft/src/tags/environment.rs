use std::io::Write;

use crate::error::Result;
use crate::fields::Fields;
use crate::registry::Registry;
use crate::tag::{Tag, TagHeader};

/// `ENV=VAR`: writes the environment variable `VAR` (the rest of the span),
/// or nothing when it is unset. Variables are read through the registry's
/// [`EnvLookup`](crate::EnvLookup).
#[derive(Debug, Clone)]
pub struct EnvTag {
    header: TagHeader,
}

impl EnvTag {
    pub fn new() -> Self {
        Self {
            header: TagHeader::new("ENV"),
        }
    }
}

impl Default for EnvTag {
    fn default() -> Self {
        Self::new()
    }
}

impl Tag for EnvTag {
    fn header(&self) -> &TagHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TagHeader {
        &mut self.header
    }

    fn evaluate(&self, span: &[u8], registry: &mut Registry, out: &mut dyn Write) -> Result<()> {
        let fields = Fields::new(span, self.field_delimiter());
        let name = String::from_utf8_lossy(fields.rest(1));
        if let Some(value) = registry.env().var(&name) {
            out.write_all(value.as_bytes())?;
        }
        Ok(())
    }
}
