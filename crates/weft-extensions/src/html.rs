//! CGI-style HTML responses.
//!
//! [`HtmlPage`] owns a [`Registry`] set up to write an HTTP header block in
//! front of the rendered template:
//!
//! ```text
//! Content-type: text/html
//! Pragma: no-cache                               (no_cache only)
//! Expires: Thu, 1 Jan 1970 00:00:01 GMT          (no_cache only)
//! Set-Cookie: session=abc; PATH=/; EXPIRES=...   (one per cookie)
//!
//! <template output>
//! ```
//!
//! The block is written by the registry's pre-scan hook from the
//! [`HtmlState`] kept in the registry's context, so cookies set while the
//! page is being built (by host code or by tags) all make it into the
//! response.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use weft::{Binding, Registry, Result};

/// The `Expires` value that forbids caching.
pub const NO_CACHE_EXPIRES: &str = "Thu, 1 Jan 1970 00:00:01 GMT";

const COOKIE_EXPIRES_FORMAT: &str = "%a, %d-%b-%y %H:%M:%S GMT";

/// What the header block contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Write the header block at all.
    pub header: bool,
    /// Add headers that disable caching.
    pub no_cache: bool,
}

impl HtmlOptions {
    pub fn with_header() -> Self {
        Self {
            header: true,
            no_cache: false,
        }
    }

    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Seconds until expiry; `None` for a session cookie.
    pub ttl: Option<u64>,
}

impl Cookie {
    /// The `Set-Cookie` line, without the trailing newline.
    pub fn header_line(&self, now: DateTime<Utc>) -> String {
        let mut line = format!("Set-Cookie: {}={}; PATH=/", self.name, self.value);
        if let Some(ttl) = self.ttl {
            let expires = i64::try_from(ttl)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .and_then(|ttl| now.checked_add_signed(ttl))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            line.push_str("; EXPIRES=");
            line.push_str(&expires.format(COOKIE_EXPIRES_FORMAT).to_string());
        }
        line
    }
}

/// Header settings and pending cookies for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlState {
    pub options: HtmlOptions,
    cookies: Vec<Cookie>,
}

impl HtmlState {
    pub fn new(options: HtmlOptions) -> Self {
        Self {
            options,
            cookies: Vec::new(),
        }
    }

    /// Queues a cookie. Later cookies are written first.
    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>, ttl: Option<u64>) {
        self.cookies.insert(
            0,
            Cookie {
                name: name.into(),
                value: value.into(),
                ttl,
            },
        );
    }

    /// Cookies in the order they will be written.
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Writes the header block, blank line included. Writes nothing when
    /// headers are off.
    pub fn write_headers(&self, now: DateTime<Utc>, out: &mut dyn Write) -> std::io::Result<()> {
        if !self.options.header {
            return Ok(());
        }
        out.write_all(b"Content-type: text/html\n")?;
        if self.options.no_cache {
            out.write_all(b"Pragma: no-cache\n")?;
            writeln!(out, "Expires: {NO_CACHE_EXPIRES}")?;
        }
        for cookie in &self.cookies {
            writeln!(out, "{}", cookie.header_line(now))?;
        }
        out.write_all(b"\n")
    }
}

fn write_html_headers(registry: &mut Registry, out: &mut dyn Write) -> Result<()> {
    if let Some(state) = registry.context::<HtmlState>() {
        tracing::debug!(cookies = state.cookies().len(), "writing HTML headers");
        state.write_headers(Utc::now(), out)?;
    }
    Ok(())
}

/// A registry that renders templates as HTML responses.
///
/// ```rust,no_run
/// use weft_extensions::{HtmlOptions, HtmlPage};
///
/// let mut page = HtmlPage::new(HtmlOptions::with_header().no_cache());
/// page.registry_mut().set("title", "Inbox");
/// page.set_cookie("session", "abc123", Some(3600));
/// page.render("templates/inbox.html", &mut std::io::stdout())?;
/// # Ok::<(), weft::TemplateError>(())
/// ```
#[derive(Debug)]
pub struct HtmlPage {
    registry: Registry,
    options: HtmlOptions,
}

impl HtmlPage {
    pub fn new(options: HtmlOptions) -> Self {
        Self::with_registry(Registry::new(), options)
    }

    /// Wraps an existing registry. Its context and pre-scan hook are replaced.
    pub fn with_registry(mut registry: Registry, options: HtmlOptions) -> Self {
        registry.set_context(HtmlState::new(options));
        registry.set_pre_scan_hook(write_html_headers);
        Self { registry, options }
    }

    pub fn options(&self) -> HtmlOptions {
        self.options
    }

    /// Queues a `Set-Cookie` header. `ttl` is in seconds from the time the
    /// headers are written.
    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>, ttl: Option<u64>) {
        match self.registry.context_mut::<HtmlState>() {
            Some(state) => state.set_cookie(name, value, ttl),
            None => {
                let mut state = HtmlState::new(self.options);
                state.set_cookie(name, value, ttl);
                self.registry.set_context(state);
            }
        }
    }

    pub fn cookies(&self) -> &[Cookie] {
        self.registry
            .context::<HtmlState>()
            .map(HtmlState::cookies)
            .unwrap_or_default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Renders the template file at `path` after the header block.
    pub fn render(&mut self, path: impl AsRef<Path>, out: &mut dyn Write) -> Result<()> {
        self.registry.evaluate_file(path, out)
    }

    /// Renders an in-memory template after the header block.
    pub fn render_str(&mut self, template: &str) -> Result<String> {
        self.registry.render_str(template)
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }
}

/// Builds a page from `bindings`, renders `path` into `out` and discards the
/// page.
pub fn render_html(
    path: impl AsRef<Path>,
    bindings: impl IntoIterator<Item = Binding>,
    options: HtmlOptions,
    out: &mut dyn Write,
) -> Result<()> {
    let mut page = HtmlPage::new(options);
    page.registry_mut().add_all(bindings);
    page.render(path, out)
}
