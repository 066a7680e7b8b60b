use std::cmp::Ordering;
use std::io::Write;

use crate::error::{Result, TemplateError};
use crate::fields::Fields;
use crate::registry::Registry;
use crate::tag::{Tag, TagHeader};

/// The relation a [`RelationalTag`] tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub const ALL: [Comparison; 6] = [
        Comparison::Eq,
        Comparison::Ne,
        Comparison::Lt,
        Comparison::Le,
        Comparison::Gt,
        Comparison::Ge,
    ];

    /// The tag name this comparison is registered under.
    pub fn tag_name(self) -> &'static str {
        match self {
            Comparison::Eq => "IF_EQ",
            Comparison::Ne => "IF_NOT_EQ",
            Comparison::Lt => "IF_LT",
            Comparison::Le => "IF_LE",
            Comparison::Gt => "IF_GT",
            Comparison::Ge => "IF_GE",
        }
    }

    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering.is_eq(),
            Comparison::Ne => ordering.is_ne(),
            Comparison::Lt => ordering.is_lt(),
            Comparison::Le => ordering.is_le(),
            Comparison::Gt => ordering.is_gt(),
            Comparison::Ge => ordering.is_ge(),
        }
    }
}

/// `IF_EQ=tok=literal=body` and its siblings.
///
/// Compares the value of `tok` with `literal` bytewise (a shorter string that
/// is a prefix of the other sorts first) and evaluates `body` when the
/// comparison holds. A token that is absent or carries no value is an
/// [`InvalidReference`](TemplateError::InvalidReference).
#[derive(Debug, Clone)]
pub struct RelationalTag {
    header: TagHeader,
    comparison: Comparison,
}

impl RelationalTag {
    pub fn new(comparison: Comparison) -> Self {
        Self {
            header: TagHeader::new(comparison.tag_name()),
            comparison,
        }
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }
}

impl Tag for RelationalTag {
    fn header(&self) -> &TagHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TagHeader {
        &mut self.header
    }

    fn evaluate(&self, span: &[u8], registry: &mut Registry, out: &mut dyn Write) -> Result<()> {
        let fields = Fields::new(span, self.field_delimiter());
        let token = fields.get(1);
        let ordering = registry
            .value_of(token)
            .map(|value| value.as_bytes().cmp(fields.get(2)))
            .ok_or_else(|| TemplateError::invalid_reference(fields.get_str(1)))?;

        if self.comparison.holds(ordering) {
            registry.evaluate_bytes(fields.rest(3), out)?;
        }
        Ok(())
    }
}
