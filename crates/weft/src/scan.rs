//! Locating tag spans in a template.
//!
//! [`Scanner`] splits a template into literal text and tag spans. A span runs
//! from just after a start delimiter to its matching end delimiter. Spans may
//! contain further tags written in the same syntax; the scanner balances them
//! by extending the closing boundary once for every start delimiter found
//! before it:
//!
//! ```text
//!   <%   <%   <%  %>   %>       %>
//!   ^    ^        ^
//!   |    nested   end          (first pass)
//!   start
//!
//!   <%   <%   <%  %>   %>       %>
//!   ^                           ^
//!   start                       end   (nested is now past end: done)
//! ```
//!
//! This counts delimiters rather than keeping a stack, so it yields the
//! outermost boundary for templates that close every tag they open. Inputs
//! that interleave delimiters in other ways can be paired differently than a
//! reader would expect.

use memchr::memmem;

/// One piece of a scanned template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text, to be copied to the output as-is.
    Text(&'a [u8]),
    /// The bytes between a start delimiter and its balanced end delimiter.
    Tag {
        span: &'a [u8],
        /// Offset of the start delimiter within the template.
        offset: usize,
    },
    /// A start delimiter at `offset` that never closes. Scanning stops here.
    Unclosed { offset: usize },
}

/// Finds `needle` in `haystack` at or after `from`.
pub fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    memmem::find(&haystack[from..], needle).map(|i| i + from)
}

/// Iterator over the [`Segment`]s of a template.
pub struct Scanner<'a> {
    input: &'a [u8],
    start: &'a [u8],
    end: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Scanner<'a> {
    /// Scans `input` for spans opened by `start` and closed by `end`.
    ///
    /// Both delimiters must be non-empty.
    pub fn new(input: &'a [u8], start: &'a [u8], end: &'a [u8]) -> Self {
        debug_assert!(!start.is_empty() && !end.is_empty());
        Self {
            input,
            start,
            end,
            pos: 0,
            done: false,
        }
    }

    /// Resolves the span opened at `open`, balancing nested start delimiters.
    ///
    /// Returns the offset of the closing delimiter, or `None` if the span
    /// never closes.
    fn balanced_end(&self, open: usize) -> Option<usize> {
        let body = open + self.start.len();
        let mut end = find_from(self.input, self.end, body)?;
        let mut nested = find_from(self.input, self.start, body);

        while let Some(n) = nested {
            if n >= end {
                break;
            }
            end = find_from(self.input, self.end, end + self.end.len())?;
            nested = find_from(self.input, self.start, n + self.start.len());
        }

        Some(end)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.pos..];

        let Some(found) = memmem::find(remaining, self.start) else {
            // No more tags - rest is text
            self.pos = self.input.len();
            return Some(Segment::Text(remaining));
        };

        if found > 0 {
            self.pos += found;
            return Some(Segment::Text(&remaining[..found]));
        }

        let open = self.pos;
        match self.balanced_end(open) {
            Some(close) => {
                let span = &self.input[open + self.start.len()..close];
                self.pos = close + self.end.len();
                Some(Segment::Tag { span, offset: open })
            }
            None => {
                self.done = true;
                Some(Segment::Unclosed { offset: open })
            }
        }
    }
}
