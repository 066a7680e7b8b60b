//! Optional tags and an HTML response layer for `weft`.
//!
//! None of this is registered by default. [`register_extensions`] adds the
//! tags:
//!
//! - `ESCAPE-JS=data` renders `data` and escapes it for a JavaScript string
//!   literal;
//! - `ESCAPE-HTML=data` renders `data` and escapes HTML metacharacters;
//! - `STRUCT=fields=data=delim=body` renders `body` once per row of a
//!   delimited table, binding each field name to its cell.
//!
//! The [`html`] module wraps a registry for CGI-style pages, writing the
//! response header block before the template output.

pub mod escape;
pub mod html;
pub mod structure;

pub use escape::{escape_html, escape_html_tag, escape_js, escape_js_tag, ESCAPE_HTML, ESCAPE_JS};
pub use html::{render_html, Cookie, HtmlOptions, HtmlPage, HtmlState};
pub use structure::{struct_tag, DATA_UNTERMINATED, HEADER_UNTERMINATED, ROW_NUMBER_NAME, STRUCT};

use weft::Registry;

/// Adds `ESCAPE-JS`, `ESCAPE-HTML` and `STRUCT` to `registry`.
pub fn register_extensions(registry: &mut Registry) {
    registry.add(escape_js_tag());
    registry.add(escape_html_tag());
    registry.add(struct_tag());
}
