//! Built-in and host-constructible tags.
//!
//! A fresh [`Registry`](crate::Registry) holds the built-ins in this order,
//! which is also their dispatch order:
//!
//! | Tag | Span | Renders |
//! |-----|------|---------|
//! | `IF` | `IF=tok=body` | `body` when `tok` has a non-empty value |
//! | `IF_NOT` | `IF_NOT=tok=body` | `body` otherwise |
//! | `IF_EQ`, `IF_NOT_EQ`, `IF_LT`, `IF_LE`, `IF_GT`, `IF_GE` | `IF_EQ=tok=literal=body` | `body` when `tok`'s value compares to `literal` as named |
//! | `INCLUDE` | `INCLUDE=tok` | the template file named by `tok`'s value, or by `tok` itself |
//! | `REPEAT2` | `REPEAT2=src=name=delim=body` | `body` once per `delim`-separated record of `src`, with `name` bound to the record |
//! | `ENV` | `ENV=VAR` | the environment variable `VAR` |
//! | `EXEC` | `EXEC=tok` | the standard output of the command named by `tok`'s value, or by `tok` itself |
//!
//! The remaining tags are built by hosts: [`ValueTag`] for plain values,
//! [`FunctionTag`] and [`TypedTag`] for callbacks, [`IncludeTag::named`] for a
//! fixed file, and [`CyclicalTag`] for record-at-a-time data.

mod conditional;
mod cyclical;
mod environment;
mod exec;
mod function;
mod include;
mod relational;
mod repeat;
mod typed;
mod value;

pub use conditional::ConditionalTag;
pub use cyclical::{CyclicalTag, CYCLE_EXHAUSTED_MARKER};
pub use environment::EnvTag;
pub use exec::ExecTag;
pub use function::{FunctionTag, EXEC_SHARED};
pub use include::IncludeTag;
pub use relational::{Comparison, RelationalTag};
pub use repeat::{RepeatTag, ROW_COUNTER_NAME};
pub use typed::TypedTag;
pub use value::ValueTag;

use crate::tag::Tag;

/// The built-in tags, in registration order.
pub fn builtin_tags() -> Vec<Box<dyn Tag>> {
    vec![
        Box::new(ConditionalTag::when()),
        Box::new(ConditionalTag::unless()),
        Box::new(RelationalTag::new(Comparison::Eq)),
        Box::new(RelationalTag::new(Comparison::Ne)),
        Box::new(RelationalTag::new(Comparison::Lt)),
        Box::new(RelationalTag::new(Comparison::Le)),
        Box::new(RelationalTag::new(Comparison::Gt)),
        Box::new(RelationalTag::new(Comparison::Ge)),
        Box::new(IncludeTag::new()),
        Box::new(RepeatTag::new()),
        Box::new(EnvTag::new()),
        Box::new(ExecTag::new()),
    ]
}
