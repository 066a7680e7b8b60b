//! Delimiter-tag template engine.
//!
//! `weft` copies template text to an output sink, replacing every span
//! enclosed in a start and end delimiter (`<!--%` and `%-->` by default) with
//! whatever the tag that claims the span renders. Tags live in a mutable
//! [`Registry`]; hosts add value tags, callback tags and their own [`Tag`]
//! implementations, and may change the registry between (or during)
//! evaluations.
//!
//! # Quick Start
//!
//! ```rust
//! use weft::Registry;
//!
//! let mut registry = Registry::new();
//! registry.set("place", "world");
//! registry.set("items", "tea,cake,");
//!
//! let out = registry
//!     .render_str(concat!(
//!         "hello <!--%place%-->!",
//!         "<!--%IF=place=\n%-->",
//!         "<!--%REPEAT2=items=item=,=<!--%row_num%-->. <!--%item%-->\n%-->",
//!     ))
//!     .unwrap();
//! assert_eq!(out, "hello world!\n1. tea\n2. cake\n");
//! ```
//!
//! # Tag spans
//!
//! A span extends from a start delimiter to its *balanced* end delimiter:
//! start delimiters inside the span must be closed before the span is. That is
//! what lets bodies contain tags:
//!
//! ```text
//! <!--%IF=logged_in=Welcome back, <!--%user%-->!%-->
//! ```
//!
//! Spans no tag claims are dropped. A start delimiter without a matching end
//! writes `[unclosed tag]` and fails the evaluation with
//! [`TemplateError::UnclosedTag`].
//!
//! # Built-in tags
//!
//! See the [`tags`] module for `IF`, `IF_NOT`, the relational `IF_*` family,
//! `INCLUDE`, `REPEAT2`, `ENV` and `EXEC`.
//!
//! # Testing
//!
//! `ENV` and `EXEC` reach the outside world through [`EnvLookup`] and
//! [`CommandRunner`], both of which can be swapped on the registry:
//!
//! ```rust
//! use weft::{MockEnv, Registry};
//!
//! let mut registry = Registry::new();
//! registry.set_env(MockEnv::new().with_var("USER", "ada"));
//! assert_eq!(registry.render_str("<!--%ENV=USER%-->").unwrap(), "ada");
//! ```

mod config;
pub mod env;
mod error;
mod eval;
mod fields;
mod registry;
pub mod scan;
pub mod source;
mod tag;
pub mod tags;

pub use config::{
    EngineConfig, DEFAULT_END_DELIMITER, DEFAULT_FIELD_DELIMITER, DEFAULT_MAX_REPEAT_ITERATIONS,
    DEFAULT_START_DELIMITER,
};
pub use env::{EnvLookup, MockEnv, RealEnv};
pub use error::{status_code, Result, TemplateError, UNCLOSED_TAG_MARKER};
pub use fields::{first_field_is, Fields};
pub use registry::{Binding, PreScanHook, Registry};
pub use scan::{Scanner, Segment};
pub use source::{BufferSource, FileSource, Source};
pub use tag::{Shape, Tag, TagHeader};
pub use tags::{
    Comparison, ConditionalTag, CyclicalTag, EnvTag, ExecTag, FunctionTag, IncludeTag,
    RelationalTag, RepeatTag, TypedTag, ValueTag, CYCLE_EXHAUSTED_MARKER, EXEC_SHARED,
    ROW_COUNTER_NAME,
};

// Re-export the command runner seam so hosts need not depend on weft-pipe.
pub use weft_pipe::{Captured, CommandRunner, ShellError, ShellRunner};
