//! Text listing enumerator
//!
//! One declaration per line:
//!
//! ```text
//! # comments and blank lines are ignored
//! os                  package
//! os.path             module      /usr/lib/python3.12/posixpath.py
//! os.path.join        function
//! sys
//! ```
//!
//! Columns are tab-separated (runs of spaces also work); only the name is required.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::Enumerator;
use crate::tree::{Declaration, EntityKind, Metadata};

#[derive(Debug, Clone)]
pub struct ListingEnumerator {
    path: PathBuf,
}

impl ListingEnumerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Enumerator for ListingEnumerator {
    fn enumerate(&self) -> Result<Vec<Declaration>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read namespace listing {:?}", self.path))?;
        let declarations = parse_listing(&text);
        debug!("Read {} declarations from {:?}", declarations.len(), self.path);
        Ok(declarations)
    }

    fn name(&self) -> &'static str {
        "listing"
    }
}

/// Parses listing text. Malformed names are kept; the tree builder decides about them.
pub fn parse_listing(text: &str) -> Vec<Declaration> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let name = columns.next()?;
            let kind = columns.next().map(EntityKind::from_label).unwrap_or_default();
            let mut declaration = Declaration::new(name, kind);
            // The path may contain spaces, so it is the rest of the line
            if let Some(path) = rest_after_columns(line, 2) {
                declaration = declaration.with_metadata(Metadata::with_source(path));
            }
            Some(declaration)
        })
        .collect()
}

/// The remainder of `line` after skipping `count` whitespace-separated columns.
fn rest_after_columns(line: &str, count: usize) -> Option<&str> {
    let mut rest = line;
    for _ in 0..count {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace)?;
        rest = &rest[end..];
    }
    let rest = rest.trim();
    if rest.is_empty() { None } else { Some(rest) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_listing_columns() {
        let listing = indoc! {"
            # stdlib sample
            os\tpackage
            os.path\tmodule\t/usr/lib/python3.12/posixpath.py

            os.path.join  function
            sys
        "};

        let declarations = parse_listing(listing);
        assert_eq!(declarations.len(), 4);

        assert_eq!(declarations[0].name, "os");
        assert_eq!(declarations[0].description.kind, EntityKind::Package);

        let path = &declarations[1];
        assert_eq!(path.description.kind, EntityKind::Module);
        assert_eq!(
            path.description.metadata.as_ref().and_then(|m| m.source_path.as_deref()),
            Some(Path::new("/usr/lib/python3.12/posixpath.py"))
        );

        assert_eq!(declarations[2].description.kind, EntityKind::Function);
        assert!(declarations[2].description.metadata.is_none());
        assert_eq!(declarations[3].description.kind, EntityKind::Unknown);
    }

    #[test]
    fn test_path_with_spaces() {
        let declarations = parse_listing("pkg\tpackage\t/Users/me/My Projects/pkg/__init__.py");
        assert_eq!(
            declarations[0]
                .description
                .metadata
                .as_ref()
                .and_then(|m| m.source_path.as_deref()),
            Some(Path::new("/Users/me/My Projects/pkg/__init__.py"))
        );
    }

    #[test]
    fn test_unknown_kind_label() {
        let declarations = parse_listing("_thread builtin");
        assert_eq!(declarations[0].description.kind, EntityKind::Unknown);
    }

    #[test]
    fn test_enumerate_reads_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "json\tpackage").unwrap();
        writeln!(file, "json.decoder\tmodule").unwrap();

        let declarations = ListingEnumerator::new(file.path()).enumerate().unwrap();
        assert_eq!(declarations.len(), 2);
    }

    #[test]
    fn test_missing_listing_is_an_error() {
        let err = ListingEnumerator::new("/nonexistent/listing.tsv")
            .enumerate()
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read namespace listing"));
    }
}
