//! In-memory namespace tree
//!
//! The tree mirrors a dotted namespace (`os.path.join`) as nested entities under a
//! synthetic, unnamed root. Each entity owns its children outright, so the structure is
//! a strict tree: no sharing, no cycles. Full paths are never stored; they are derived
//! while walking from the root.
//!
//! Trees are immutable once built. Rebuilding produces a fresh tree (see
//! [`builder::TreeBuilder`]) which callers swap in through [`crate::index::SharedTree`].

pub mod builder;

use std::fmt;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub use builder::{ConflictError, ConflictPolicy, Declaration, DeclarationLookup, Description, Declarations, NoDescriptions, TreeBuilder};

/// Kind tag carried by each entity.
///
/// Informational only: matching and ranking never branch on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Package,
    Module,
    Class,
    Function,
    #[default]
    Unknown,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Package => "package",
            EntityKind::Module => "module",
            EntityKind::Class => "class",
            EntityKind::Function => "function",
            EntityKind::Unknown => "unknown",
        }
    }

    /// Parses a kind label case-insensitively. Unrecognized labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "package" => EntityKind::Package,
            "module" => EntityKind::Module,
            "class" => EntityKind::Class,
            "function" => EntityKind::Function,
            _ => EntityKind::Unknown,
        }
    }

    /// Leaf kinds may not own children under the strict conflict policy.
    pub fn is_leaf(&self) -> bool {
        matches!(self, EntityKind::Function)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display payload attached by the enumerator. Never interpreted by matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Source file backing the entity, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    /// Short human-readable description (first docstring paragraph)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Metadata {
    pub fn with_source(path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: Some(path.into()),
            description: None,
        }
    }
}

/// A single named node of the namespace.
#[derive(Debug, Clone, Default)]
pub struct Entity {
    name: String,
    kind: EntityKind,
    metadata: Option<Metadata>,
    children: FxHashMap<String, Entity>,
}

impl Entity {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Local (non-qualified) name. Empty only for the synthetic root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Exact, case-sensitive child lookup.
    pub fn child(&self, name: &str) -> Option<&Entity> {
        self.children.get(name)
    }

    /// Immediate children in unspecified order.
    pub fn children(&self) -> impl Iterator<Item = &Entity> {
        self.children.values()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub(crate) fn child_entry(&mut self, name: &str) -> (&mut Entity, bool) {
        let mut created = false;
        let child = self
            .children
            .entry(name.to_string())
            .or_insert_with(|| {
                created = true;
                Entity::new(name)
            });
        (child, created)
    }

    pub(crate) fn declare(&mut self, kind: EntityKind, metadata: Option<Metadata>) {
        self.kind = kind;
        self.metadata = metadata;
    }
}

/// Joins a parent path and a local name with `.`; the root's path is empty.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        let mut path = String::with_capacity(parent.len() + 1 + name.len());
        path.push_str(parent);
        path.push('.');
        path.push_str(name);
        path
    }
}

/// Summary numbers shown when no query has been typed yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Entities below the root
    pub nodes: usize,
    /// Immediate children of the root (top-level packages and modules)
    pub top_level: usize,
    /// Length of the longest dotted path
    pub max_depth: usize,
}

/// Owner of the whole namespace hierarchy.
#[derive(Debug, Clone, Default)]
pub struct EntityTree {
    root: Entity,
    nodes: usize,
}

impl EntityTree {
    /// A tree holding only the synthetic root.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_root(root: Entity, nodes: usize) -> Self {
        Self { root, nodes }
    }

    pub fn root(&self) -> &Entity {
        &self.root
    }

    /// Number of entities below the root.
    pub fn len(&self) -> usize {
        self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes == 0
    }

    /// Follows `path` segment by segment from the root. An empty path resolves to the root.
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Option<&Entity> {
        path.iter()
            .try_fold(&self.root, |node, segment| node.child(segment.as_ref()))
    }

    /// Depth-first walk over every entity strictly below `anchor`, yielding each with
    /// its full path. `anchor_path` is the full path of `anchor` itself.
    pub fn descendants<'a>(&'a self, anchor: &'a Entity, anchor_path: &str) -> Descendants<'a> {
        Descendants {
            stack: anchor
                .children()
                .map(|child| (join_path(anchor_path, child.name()), child))
                .collect(),
        }
    }

    pub fn stats(&self) -> TreeStats {
        let mut max_depth = 0;
        let mut stack: Vec<(&Entity, usize)> = self.root.children().map(|c| (c, 1)).collect();
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(node.children().map(|c| (c, depth + 1)));
        }

        TreeStats {
            nodes: self.nodes,
            top_level: self.root.child_count(),
            max_depth,
        }
    }
}

/// Iterator returned by [`EntityTree::descendants`].
pub struct Descendants<'a> {
    stack: Vec<(String, &'a Entity)>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (String, &'a Entity);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        self.stack
            .extend(node.children().map(|child| (join_path(&path, child.name()), child)));
        Some((path, node))
    }
}
