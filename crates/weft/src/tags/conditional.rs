use std::io::Write;

use crate::error::Result;
use crate::fields::Fields;
use crate::registry::Registry;
use crate::tag::{Tag, TagHeader};

/// `IF=tok=body` and `IF_NOT=tok=body`.
///
/// A token is truthy when it names a value-bearing tag whose value is present
/// and non-empty. `IF` evaluates its body for truthy tokens, `IF_NOT` for the
/// rest; the body may contain nested tags.
#[derive(Debug, Clone)]
pub struct ConditionalTag {
    header: TagHeader,
    negated: bool,
}

impl ConditionalTag {
    /// The `IF` tag.
    pub fn when() -> Self {
        Self {
            header: TagHeader::new("IF"),
            negated: false,
        }
    }

    /// The `IF_NOT` tag.
    pub fn unless() -> Self {
        Self {
            header: TagHeader::new("IF_NOT"),
            negated: true,
        }
    }
}

/// Whether `token` names a tag with a present, non-empty value.
pub(crate) fn is_truthy(registry: &Registry, token: &[u8]) -> bool {
    registry.value_of(token).is_some_and(|value| !value.is_empty())
}

impl Tag for ConditionalTag {
    fn header(&self) -> &TagHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TagHeader {
        &mut self.header
    }

    fn evaluate(&self, span: &[u8], registry: &mut Registry, out: &mut dyn Write) -> Result<()> {
        let fields = Fields::new(span, self.field_delimiter());
        if is_truthy(registry, fields.get(1)) != self.negated {
            registry.evaluate_bytes(fields.rest(2), out)?;
        }
        Ok(())
    }
}
