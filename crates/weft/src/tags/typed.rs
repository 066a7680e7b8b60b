use std::fmt;
use std::io::Write;

use crate::error::Result;
use crate::fields::Fields;
use crate::registry::Registry;
use crate::tag::{Tag, TagHeader};

type Handler = Box<dyn Fn(Fields<'_>, &mut Registry, &mut dyn Write) -> Result<()>>;

/// A typed tag whose behaviour is a host closure.
///
/// The closure receives the span's [`Fields`], so hosts can define tags that
/// take arguments without implementing [`Tag`] themselves:
///
/// ```rust
/// use std::io::Write;
/// use weft::{Registry, TypedTag};
///
/// let mut registry = Registry::new();
/// registry.add(TypedTag::new("UPPER", |fields, _, out| {
///     out.write_all(fields.get_str(1).to_uppercase().as_bytes())?;
///     Ok(())
/// }));
/// assert_eq!(registry.render_str("<!--%UPPER=shout%-->").unwrap(), "SHOUT");
/// ```
pub struct TypedTag {
    header: TagHeader,
    handler: Handler,
}

impl TypedTag {
    pub fn new(
        name: impl Into<String>,
        handler: impl Fn(Fields<'_>, &mut Registry, &mut dyn Write) -> Result<()> + 'static,
    ) -> Self {
        Self {
            header: TagHeader::new(name),
            handler: Box::new(handler),
        }
    }
}

impl fmt::Debug for TypedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedTag")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl Tag for TypedTag {
    fn header(&self) -> &TagHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TagHeader {
        &mut self.header
    }

    fn evaluate(&self, span: &[u8], registry: &mut Registry, out: &mut dyn Write) -> Result<()> {
        (self.handler)(Fields::new(span, self.field_delimiter()), registry, out)
    }
}
