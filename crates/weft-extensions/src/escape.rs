//! `ESCAPE-JS` and `ESCAPE-HTML`.
//!
//! Both tags evaluate their data field first, nested tags included, and
//! escape the rendered result as a whole.

use std::io::Write;

use weft::{Fields, Registry, Result, TypedTag};

pub const ESCAPE_JS: &str = "ESCAPE-JS";
pub const ESCAPE_HTML: &str = "ESCAPE-HTML";

/// Escapes `input` for use inside a single- or double-quoted JavaScript
/// string.
pub fn escape_js(input: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(input.len());
    for &byte in input {
        match byte {
            b'\'' | b'"' | b'\\' => escaped.extend_from_slice(&[b'\\', byte]),
            b'\n' => escaped.extend_from_slice(b"\\n"),
            b'\r' => escaped.extend_from_slice(b"\\r"),
            b'\t' => escaped.extend_from_slice(b"\\t"),
            _ => escaped.push(byte),
        }
    }
    escaped
}

/// Replaces `< > & " '` with their HTML entities.
pub fn escape_html(input: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(input.len());
    for &byte in input {
        match byte {
            b'<' => escaped.extend_from_slice(b"&lt;"),
            b'>' => escaped.extend_from_slice(b"&gt;"),
            b'&' => escaped.extend_from_slice(b"&amp;"),
            b'"' => escaped.extend_from_slice(b"&quot;"),
            b'\'' => escaped.extend_from_slice(b"&#39;"),
            _ => escaped.push(byte),
        }
    }
    escaped
}

/// Evaluates everything after the tag name into a buffer.
fn render_data(fields: &Fields<'_>, registry: &mut Registry) -> Result<Vec<u8>> {
    let mut rendered = Vec::new();
    registry.evaluate_bytes(fields.rest(1), &mut rendered)?;
    Ok(rendered)
}

pub fn escape_js_tag() -> TypedTag {
    TypedTag::new(ESCAPE_JS, |fields, registry, out| {
        let rendered = render_data(&fields, registry)?;
        out.write_all(&escape_js(&rendered))?;
        Ok(())
    })
}

pub fn escape_html_tag() -> TypedTag {
    TypedTag::new(ESCAPE_HTML, |fields, registry, out| {
        let rendered = render_data(&fields, registry)?;
        out.write_all(&escape_html(&rendered))?;
        Ok(())
    })
}
