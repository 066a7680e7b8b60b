use std::fmt;
use std::io::Write;

use crate::error::Result;
use crate::fields::Fields;
use crate::registry::Registry;
use crate::tag::{Shape, Tag, TagHeader};

/// First field of the typed form of a [`FunctionTag`].
pub const EXEC_SHARED: &str = "EXEC_SHARED";

type Callback = Box<dyn Fn(&mut Registry, &mut dyn Write) -> Result<()>>;

/// A tag backed by a host callback.
///
/// The callback gets the registry and the sink; whatever it writes replaces
/// the span. A function tag is reached either by its bare name
/// ([`FunctionTag::named`]) or through `EXEC_SHARED=name`
/// ([`FunctionTag::typed`]).
///
/// ```rust
/// use std::io::Write;
/// use weft::{FunctionTag, Registry};
///
/// let mut registry = Registry::new();
/// registry.add(FunctionTag::named("year", |_, out| {
///     out.write_all(b"1999")?;
///     Ok(())
/// }));
/// assert_eq!(registry.render_str("(c) <!--%year%-->").unwrap(), "(c) 1999");
/// ```
pub struct FunctionTag {
    header: TagHeader,
    shape: Shape,
    callback: Callback,
}

impl FunctionTag {
    /// Matches the span `name`.
    pub fn named(
        name: impl Into<String>,
        callback: impl Fn(&mut Registry, &mut dyn Write) -> Result<()> + 'static,
    ) -> Self {
        Self {
            header: TagHeader::new(name),
            shape: Shape::Named,
            callback: Box::new(callback),
        }
    }

    /// Matches spans of the form `EXEC_SHARED=name`.
    pub fn typed(
        name: impl Into<String>,
        callback: impl Fn(&mut Registry, &mut dyn Write) -> Result<()> + 'static,
    ) -> Self {
        Self {
            header: TagHeader::new(name),
            shape: Shape::Typed,
            callback: Box::new(callback),
        }
    }
}

impl fmt::Debug for FunctionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTag")
            .field("header", &self.header)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl Tag for FunctionTag {
    fn header(&self) -> &TagHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TagHeader {
        &mut self.header
    }

    fn matches(&self, span: &[u8]) -> bool {
        match self.shape {
            Shape::Named => Shape::Named.matches(&self.header, span),
            Shape::Typed => {
                let fields = Fields::new(span, self.field_delimiter());
                fields.name() == EXEC_SHARED.as_bytes() && fields.get(1) == self.name().as_bytes()
            }
        }
    }

    fn evaluate(&self, _span: &[u8], registry: &mut Registry, out: &mut dyn Write) -> Result<()> {
        (self.callback)(registry, out)
    }
}
