use std::io::Write;

use crate::error::{Result, TemplateError};
use crate::fields::Fields;
use crate::registry::Registry;
use crate::tag::{Tag, TagHeader};

use super::{CyclicalTag, ValueTag};

/// Base name of the 1-based row counter bound on each pass.
pub const ROW_COUNTER_NAME: &str = "row_num";

/// `REPEAT2=src=name=delim=body`.
///
/// Splits the value of `src` into `delim`-separated records and evaluates
/// `body` once per record. During the loop two tags are bound in a scope of
/// their own:
///
/// - `name`, a [`CyclicalTag`] over the data: each use in the body yields the
///   next record;
/// - a row counter holding the 1-based pass number. It is called `row_num`,
///   or `row_num_2`, `row_num_3`, ... when an enclosing loop already took the
///   shorter name.
///
/// The loop runs while the cyclical tag has records left, so a body that
/// uses `name` twice consumes two records per pass and one that never uses it
/// would loop forever; the registry's iteration ceiling stops the latter with
/// [`TemplateError::IterationLimit`]. A missing or empty `src` renders
/// nothing.
#[derive(Debug, Clone)]
pub struct RepeatTag {
    header: TagHeader,
}

impl RepeatTag {
    pub fn new() -> Self {
        Self {
            header: TagHeader::new("REPEAT2"),
        }
    }
}

impl Default for RepeatTag {
    fn default() -> Self {
        Self::new()
    }
}

impl Tag for RepeatTag {
    fn header(&self) -> &TagHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TagHeader {
        &mut self.header
    }

    fn evaluate(&self, span: &[u8], registry: &mut Registry, out: &mut dyn Write) -> Result<()> {
        let fields = Fields::new(span, self.field_delimiter());
        let source = fields.get(1);
        let Some(data) = registry
            .value_of(source)
            .filter(|data| !data.is_empty())
            .map(str::to_owned)
        else {
            tracing::debug!(source = %fields.get_str(1), "nothing to repeat");
            return Ok(());
        };

        let binding = fields.get_str(2).into_owned();
        let delimiter = fields.get_str(3).into_owned();
        let body = fields.rest(4);
        let limit = registry.max_repeat_iterations();

        registry.scoped(|registry| {
            let records = registry.bind(CyclicalTag::new(binding.clone(), data, delimiter));
            let counter = registry.free_name(ROW_COUNTER_NAME);

            let mut row: usize = 0;
            while !records.is_exhausted() {
                if let Some(limit) = limit.filter(|&limit| row >= limit) {
                    tracing::warn!(binding = %binding, limit, "repeat stopped at iteration limit");
                    return Err(TemplateError::IterationLimit {
                        name: binding.clone(),
                        limit,
                    });
                }
                row += 1;
                registry.bind(ValueTag::new(counter.clone(), row.to_string()));
                registry.evaluate_bytes(body, out)?;
            }
            tracing::trace!(binding = %binding, rows = row, "repeat finished");
            Ok(())
        })
    }
}
