//! Package-root directory enumerator
//!
//! Walks one or more roots (for example a `site-packages` directory) the way Python's
//! import system sees them:
//!
//! - a directory holding `__init__.py` is a package (its `__init__.py` is the source)
//! - any other `*.py` file inside a root or package is a module
//! - compiled extension modules (`_ssl.cpython-312-x86_64-linux-gnu.so`, `*.pyd`) are
//!   modules named by the part before the first dot
//!
//! Directories without `__init__.py`, hidden entries, `__pycache__` and names that are
//! not identifiers are skipped. Unreadable entries are logged and skipped; a missing
//! root is an error.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::{Enumerator, is_identifier};
use crate::tree::{Declaration, EntityKind, Metadata};

const PACKAGE_MARKER: &str = "__init__.py";

#[derive(Debug, Clone)]
pub struct DirectoryEnumerator {
    roots: Vec<PathBuf>,
    follow_links: bool,
}

impl DirectoryEnumerator {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            follow_links: false,
        }
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    fn enumerate_root(&self, root: &Path, declarations: &mut Vec<Declaration>) -> Result<()> {
        if !root.is_dir() {
            bail!("Package root {:?} is not a directory", root);
        }

        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(keep_entry);

        let before = declarations.len();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {:?}: {}", root, e);
                    continue;
                }
            };
            if let Some(declaration) = declaration_for(root, &entry) {
                declarations.push(declaration);
            }
        }

        debug!("Enumerated {} names under {:?}", declarations.len() - before, root);
        Ok(())
    }
}

impl Enumerator for DirectoryEnumerator {
    fn enumerate(&self) -> Result<Vec<Declaration>> {
        let mut declarations = Vec::new();
        for root in &self.roots {
            self.enumerate_root(root, &mut declarations)?;
        }
        Ok(declarations)
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}

fn keep_entry(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || name == "__pycache__" {
        return false;
    }
    if entry.file_type().is_dir() {
        return entry.path().join(PACKAGE_MARKER).is_file();
    }
    true
}

/// Module or package name of an entry, relative to its root.
fn declaration_for(root: &Path, entry: &DirEntry) -> Option<Declaration> {
    let relative = entry.path().strip_prefix(root).ok()?;
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|parent| parent.components())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let file_name = entry.file_name().to_string_lossy();
    let (kind, source) = if entry.file_type().is_dir() {
        segments.push(file_name.into_owned());
        (EntityKind::Package, entry.path().join(PACKAGE_MARKER))
    } else {
        let module = module_name(&file_name)?;
        segments.push(module.to_string());
        (EntityKind::Module, entry.path().to_path_buf())
    };

    if !segments.iter().all(|s| is_identifier(s)) {
        return None;
    }

    Some(Declaration::new(segments.join("."), kind).with_metadata(Metadata::with_source(source)))
}

/// Module name for a file, or `None` when the file is not importable on its own.
fn module_name(file_name: &str) -> Option<&str> {
    if file_name == PACKAGE_MARKER {
        return None;
    }
    if let Some(stem) = file_name.strip_suffix(".py") {
        return Some(stem);
    }
    if file_name.ends_with(".so") || file_name.ends_with(".pyd") {
        return file_name.split('.').next();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    fn names(declarations: &[Declaration]) -> Vec<&str> {
        declarations.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_walks_packages_and_modules() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        touch(root, "six.py");
        touch(root, "requests/__init__.py");
        touch(root, "requests/api.py");
        touch(root, "requests/adapters/__init__.py");
        touch(root, "requests/adapters/http.py");
        touch(root, "_ssl.cpython-312-x86_64-linux-gnu.so");

        let declarations = DirectoryEnumerator::new([root]).enumerate().unwrap();
        let mut found = names(&declarations);
        found.sort();
        assert_eq!(
            found,
            vec![
                "_ssl",
                "requests",
                "requests.adapters",
                "requests.adapters.http",
                "requests.api",
                "six",
            ]
        );

        let package = declarations.iter().find(|d| d.name == "requests").unwrap();
        assert_eq!(package.description.kind, EntityKind::Package);
        assert_eq!(
            package.description.metadata.as_ref().and_then(|m| m.source_path.clone()),
            Some(root.join("requests").join("__init__.py"))
        );
        let module = declarations.iter().find(|d| d.name == "requests.api").unwrap();
        assert_eq!(module.description.kind, EntityKind::Module);
    }

    #[test]
    fn test_skips_non_packages_and_noise() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        touch(root, "requests-2.31.0.dist-info/METADATA");
        touch(root, "scripts/tool.py");
        touch(root, ".hidden.py");
        touch(root, "pkg/__init__.py");
        touch(root, "pkg/__pycache__/mod.cpython-312.pyc");
        touch(root, "pkg/not-a-module.py");
        touch(root, "pkg/README.md");

        let declarations = DirectoryEnumerator::new([root]).enumerate().unwrap();
        assert_eq!(names(&declarations), vec!["pkg"]);
    }

    #[test]
    fn test_multiple_roots() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(first.path(), "alpha.py");
        touch(second.path(), "beta.py");

        let declarations = DirectoryEnumerator::new([first.path(), second.path()])
            .enumerate()
            .unwrap();
        assert_eq!(names(&declarations), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let result = DirectoryEnumerator::new(["/nonexistent/site-packages"]).enumerate();
        assert!(result.is_err());
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("api.py"), Some("api"));
        assert_eq!(module_name("__init__.py"), None);
        assert_eq!(module_name("_ssl.cpython-312-x86_64-linux-gnu.so"), Some("_ssl"));
        assert_eq!(module_name("_socket.pyd"), Some("_socket"));
        assert_eq!(module_name("notes.txt"), None);
    }
}
