//! Page range mini-language
//!
//! Three forms are accepted, all 1-based and bounded by the document's
//! page count:
//!
//! - `"7"`: a single page
//! - `"1,3,5"`: a list, kept in the given order without sorting or dedup
//! - `"2-5"`: an inclusive ascending span
//!
//! Values are never clamped: anything outside `[1, upper_bound]` is an
//! [`Error::InvalidRangeSyntax`].

use crate::{Error, Result};
use std::fmt;

/// An inclusive, ascending span of pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub start: u32,
    pub end: u32,
}

impl PageSpan {
    /// Number of pages covered
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Spans always cover at least one page
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pages in ascending order
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

impl fmt::Display for PageSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Parse a page specification into an ordered list of page numbers
pub fn parse(spec: &str, upper_bound: u32) -> Result<Vec<u32>> {
    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(Error::range(spec, "empty specification"));
    }

    if trimmed.contains('-') {
        if trimmed.contains(',') {
            return Err(Error::range(spec, "cannot mix ',' and '-'"));
        }
        return Ok(parse_span(spec, upper_bound)?.pages().collect());
    }

    trimmed
        .split(',')
        .map(|token| parse_page(spec, token, upper_bound))
        .collect()
}

/// Parse a contiguous span: either `"a-b"` or a single page `"N"`
pub fn parse_span(spec: &str, upper_bound: u32) -> Result<PageSpan> {
    let trimmed = spec.trim();
    let parts: Vec<&str> = trimmed.split('-').collect();

    let (start, end) = match parts.as_slice() {
        [single] => {
            let page = parse_page(spec, single, upper_bound)?;
            (page, page)
        }
        [start, end] => (
            parse_page(spec, start, upper_bound)?,
            parse_page(spec, end, upper_bound)?,
        ),
        _ => return Err(Error::range(spec, "more than one '-' separator")),
    };

    if start > end {
        return Err(Error::range(
            spec,
            format!("descending range {}-{}", start, end),
        ));
    }

    Ok(PageSpan { start, end })
}

fn parse_page(spec: &str, token: &str, upper_bound: u32) -> Result<u32> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::range(spec, "missing page number"));
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::range(spec, format!("\"{}\" is not a number", token)));
    }

    let page: u32 = token
        .parse()
        .map_err(|_| Error::range(spec, format!("\"{}\" is too large", token)))?;

    if page == 0 || page > upper_bound {
        return Err(Error::range(
            spec,
            format!("page {} is outside 1-{}", page, upper_bound),
        ));
    }

    Ok(page)
}
