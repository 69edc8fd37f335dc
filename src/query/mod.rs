//! Query parsing
//!
//! Raw search-box text is turned into a [`Query`]: the dot-separated segments that must
//! resolve exactly, the trailing partial segment being typed, and whether the wildcard
//! marker asked for a subtree-wide search.
//!
//! Parsing is total. Any string parses; misplaced or repeated markers only set the flag.
//!
//! ```text
//! "os.pa"     -> segments ["os"], partial "pa", wildcard false
//! "os."       -> segments ["os"], partial "",   wildcard false
//! "*join"     -> segments [],     partial "join", wildcard true
//! "os.*jo"    -> segments ["os"], partial "jo", wildcard true
//! ```

use std::fmt;

use serde::Serialize;

/// Canonical wildcard marker.
pub const WILDCARD_MARKER: char = '*';

/// Separator between path segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Parsed representation of user input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Query {
    /// Path segments that must resolve exactly, outermost first
    pub segments: Vec<String>,
    /// Trailing, possibly incomplete segment
    pub partial: String,
    /// Match anywhere in the anchored subtree instead of immediate children only
    pub wildcard: bool,
}

/// Parses `raw` using the canonical wildcard marker.
pub fn parse(raw: &str) -> Query {
    parse_with_marker(raw, WILDCARD_MARKER)
}

/// Parses `raw`, treating every occurrence of `marker` as the wildcard flag.
///
/// Whitespace is trimmed both before and after marker removal, so a marker typed next
/// to surrounding spaces never leaks whitespace into the segments.
pub fn parse_with_marker(raw: &str, marker: char) -> Query {
    let trimmed = raw.trim();
    let wildcard = trimmed.contains(marker);
    let stripped: String;
    let text = if wildcard {
        stripped = trimmed.chars().filter(|&c| c != marker).collect();
        stripped.trim()
    } else {
        trimmed
    };

    if text.is_empty() {
        return Query {
            wildcard,
            ..Default::default()
        };
    }

    let mut segments: Vec<String> = text.split(SEGMENT_SEPARATOR).map(str::to_string).collect();
    let partial = segments.pop().unwrap_or_default();

    Query {
        segments,
        partial,
        wildcard,
    }
}

impl Query {
    /// True when nothing has been typed (the marker alone still counts as empty text).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.partial.is_empty()
    }

    /// Segments and partial re-joined with `.`, without the marker.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for segment in &self.segments {
            text.push_str(segment);
            text.push(SEGMENT_SEPARATOR);
        }
        text.push_str(&self.partial);
        text
    }

    /// Query text that parses back to `self` with the given marker.
    pub fn to_query_string(&self, marker: char) -> String {
        let text = self.text();
        if self.wildcard {
            let mut with_marker = String::with_capacity(text.len() + marker.len_utf8());
            with_marker.push(marker);
            with_marker.push_str(&text);
            with_marker
        } else {
            text
        }
    }

    /// The path the text names exactly, with trailing dots dropped.
    ///
    /// `"http."` and `"http"` both name `["http"]`; an empty query names nothing.
    pub fn exact_path(&self) -> Option<Vec<&str>> {
        let mut path: Vec<&str> = self
            .segments
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.partial.as_str()))
            .collect();
        while path.last().is_some_and(|s| s.is_empty()) {
            path.pop();
        }
        if path.is_empty() { None } else { Some(path) }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string(WILDCARD_MARKER))
    }
}
