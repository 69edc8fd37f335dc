//! Tree construction from enumerated fully-qualified names
//!
//! The builder splits each name on `.`, creating intermediate entities on the way with
//! kind `unknown`. When the lookup describes the exact path, its kind and metadata
//! overwrite whatever the node carried before, so later declarations win.
//!
//! Building is a pure function of its inputs: it touches no global state and can be
//! repeated at will. Under [`ConflictPolicy::Permissive`] (the default) it never fails.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::{Entity, EntityKind, EntityTree, Metadata};

/// How the builder reacts to structurally questionable input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Any node may have children; malformed names are skipped with a warning
    #[default]
    Permissive,
    /// Leaf kinds may not have children, explicit kinds may not change, and
    /// malformed names are rejected
    Strict,
}

/// Structural conflicts reported under [`ConflictPolicy::Strict`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("`{path}` is declared as a {kind} and cannot have children")]
    LeafWithChildren { path: String, kind: EntityKind },

    #[error("`{path}` is declared as a {declared} but was already declared as a {previous}")]
    KindRedeclared {
        path: String,
        previous: EntityKind,
        declared: EntityKind,
    },

    #[error("`{name}` contains an empty path segment")]
    EmptySegment { name: String },
}

/// What the enumerator knows about one exact path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// A fully-qualified name together with its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(flatten)]
    pub description: Description,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            description: Description {
                kind,
                metadata: None,
            },
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.description.metadata = Some(metadata);
        self
    }
}

/// Kind and metadata lookup consulted for every built name.
pub trait DeclarationLookup {
    fn describe(&self, name: &str) -> Option<Description>;
}

impl<F> DeclarationLookup for F
where
    F: Fn(&str) -> Option<Description>,
{
    fn describe(&self, name: &str) -> Option<Description> {
        self(name)
    }
}

/// Lookup that knows nothing: every node keeps kind `unknown` and no metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDescriptions;

impl DeclarationLookup for NoDescriptions {
    fn describe(&self, _name: &str) -> Option<Description> {
        None
    }
}

/// Declarations in enumeration order, also usable as a lookup where the last
/// declaration of a name wins.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    entries: Vec<Declaration>,
    // Name -> index of its last entry
    last: FxHashMap<String, usize>,
    order: Vec<String>,
}

impl Declarations {
    /// Names in first-seen order, without duplicates.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Every declaration as enumerated, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.entries.iter()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<Declaration> for Declarations {
    fn from_iter<T: IntoIterator<Item = Declaration>>(iter: T) -> Self {
        let mut declarations = Declarations::default();
        for declaration in iter {
            let index = declarations.entries.len();
            if declarations.last.insert(declaration.name.clone(), index).is_none() {
                declarations.order.push(declaration.name.clone());
            }
            declarations.entries.push(declaration);
        }
        declarations
    }
}

impl DeclarationLookup for Declarations {
    fn describe(&self, name: &str) -> Option<Description> {
        self.last
            .get(name)
            .map(|&index| self.entries[index].description.clone())
    }
}

/// Builds [`EntityTree`]s under a configurable conflict policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    policy: ConflictPolicy,
}

impl TreeBuilder {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self { policy }
    }

    pub fn strict() -> Self {
        Self::new(ConflictPolicy::Strict)
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Builds a tree from fully-qualified names, describing each through `lookup`.
    ///
    /// An empty `names` sequence yields a tree holding only the root.
    pub fn build<I, S, L>(&self, names: I, lookup: &L) -> Result<EntityTree, ConflictError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        L: DeclarationLookup + ?Sized,
    {
        self.build_with(names.into_iter().map(|name| {
            let description = lookup.describe(name.as_ref());
            (name, description)
        }))
    }

    /// Builds a tree from declarations carrying their own descriptions.
    ///
    /// Every declaration is applied in enumeration order, so under strict policy a
    /// name declared twice with differing explicit kinds is a conflict.
    pub fn build_declarations(&self, declarations: &Declarations) -> Result<EntityTree, ConflictError> {
        self.build_with(
            declarations
                .iter()
                .map(|declaration| (declaration.name.as_str(), Some(declaration.description.clone()))),
        )
    }

    fn build_with<I, S>(&self, entries: I) -> Result<EntityTree, ConflictError>
    where
        I: IntoIterator<Item = (S, Option<Description>)>,
        S: AsRef<str>,
    {
        let mut root = Entity::default();
        let mut nodes = 0;
        let mut skipped = 0;

        for (name, description) in entries {
            let name = name.as_ref();
            match self.insert(&mut root, name, description) {
                Ok(created) => nodes += created,
                Err(ConflictError::EmptySegment { .. }) if self.policy == ConflictPolicy::Permissive => {
                    warn!("Skipping malformed name {:?}: empty path segment", name);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        debug!("Built namespace tree: {} nodes, {} names skipped", nodes, skipped);
        Ok(EntityTree::from_root(root, nodes))
    }

    /// Inserts one name, returning how many entities were created.
    fn insert(
        &self,
        root: &mut Entity,
        name: &str,
        description: Option<Description>,
    ) -> Result<usize, ConflictError> {
        let segments: Vec<&str> = name.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ConflictError::EmptySegment {
                name: name.to_string(),
            });
        }

        let strict = self.policy == ConflictPolicy::Strict;
        let mut created = 0;
        let mut node = root;

        for (depth, segment) in segments.iter().enumerate() {
            if strict && depth > 0 && node.kind().is_leaf() {
                return Err(ConflictError::LeafWithChildren {
                    path: segments[..depth].join("."),
                    kind: node.kind(),
                });
            }
            let (child, is_new) = node.child_entry(segment);
            if is_new {
                created += 1;
            }
            node = child;
        }

        if let Some(description) = description {
            if strict {
                if description.kind.is_leaf() && node.has_children() {
                    return Err(ConflictError::LeafWithChildren {
                        path: name.to_string(),
                        kind: description.kind,
                    });
                }
                let previous = node.kind();
                if previous != EntityKind::Unknown
                    && description.kind != EntityKind::Unknown
                    && previous != description.kind
                {
                    return Err(ConflictError::KindRedeclared {
                        path: name.to_string(),
                        previous,
                        declared: description.kind,
                    });
                }
            }
            node.declare(description.kind, description.metadata);
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declarations(entries: &[(&str, EntityKind)]) -> Declarations {
        entries
            .iter()
            .map(|(name, kind)| Declaration::new(*name, *kind))
            .collect()
    }

    #[test]
    fn test_empty_input_yields_root_only() {
        let names: [&str; 0] = [];
        let tree = TreeBuilder::default().build(names, &NoDescriptions).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.root().child_count(), 0);
    }

    #[test]
    fn test_intermediate_nodes_are_unknown() {
        let decls = declarations(&[("xml.etree.ElementTree", EntityKind::Module)]);
        let tree = TreeBuilder::default().build_declarations(&decls).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.resolve(&["xml"]).unwrap().kind(), EntityKind::Unknown);
        assert_eq!(tree.resolve(&["xml", "etree"]).unwrap().kind(), EntityKind::Unknown);
        assert_eq!(
            tree.resolve(&["xml", "etree", "ElementTree"]).unwrap().kind(),
            EntityKind::Module
        );
    }

    #[test]
    fn test_later_declaration_overwrites_kind_and_metadata() {
        let decls: Declarations = vec![
            Declaration::new("json.decoder", EntityKind::Module),
            Declaration::new("json", EntityKind::Package)
                .with_metadata(Metadata::with_source("/usr/lib/python3/json/__init__.py")),
        ]
        .into_iter()
        .collect();
        let tree = TreeBuilder::default().build_declarations(&decls).unwrap();

        let json = tree.resolve(&["json"]).unwrap();
        assert_eq!(json.kind(), EntityKind::Package);
        assert_eq!(
            json.metadata().and_then(|m| m.source_path.as_deref()),
            Some(std::path::Path::new("/usr/lib/python3/json/__init__.py"))
        );
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_duplicate_names_do_not_duplicate_nodes() {
        let tree = TreeBuilder::default()
            .build(["os", "os.path", "os", "os.path"], &NoDescriptions)
            .unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |name: &str| {
            name.ends_with("join").then(|| Description {
                kind: EntityKind::Function,
                metadata: None,
            })
        };
        let tree = TreeBuilder::default().build(["os.path.join"], &lookup).unwrap();
        assert_eq!(
            tree.resolve(&["os", "path", "join"]).unwrap().kind(),
            EntityKind::Function
        );
    }

    #[test]
    fn test_permissive_allows_children_under_leaf() {
        let decls = declarations(&[
            ("pkg.helper", EntityKind::Function),
            ("pkg.helper.inner", EntityKind::Function),
        ]);
        let tree = TreeBuilder::default().build_declarations(&decls).unwrap();
        assert!(tree.resolve(&["pkg", "helper", "inner"]).is_some());
    }

    #[test]
    fn test_permissive_skips_empty_segments() {
        let tree = TreeBuilder::default()
            .build(["os", "os..path", "", ".hidden", "sys."], &NoDescriptions)
            .unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.resolve(&["os"]).is_some());
    }

    #[test]
    fn test_strict_rejects_children_under_leaf() {
        let decls = declarations(&[
            ("pkg.helper", EntityKind::Function),
            ("pkg.helper.inner", EntityKind::Function),
        ]);
        let err = TreeBuilder::strict().build_declarations(&decls).unwrap_err();
        assert_eq!(
            err,
            ConflictError::LeafWithChildren {
                path: "pkg.helper".to_string(),
                kind: EntityKind::Function,
            }
        );
    }

    #[test]
    fn test_strict_rejects_leaf_declared_after_children() {
        let decls = declarations(&[
            ("pkg.helper.inner", EntityKind::Class),
            ("pkg.helper", EntityKind::Function),
        ]);
        let err = TreeBuilder::strict().build_declarations(&decls).unwrap_err();
        assert!(matches!(err, ConflictError::LeafWithChildren { ref path, .. } if path == "pkg.helper"));
    }

    #[test]
    fn test_strict_rejects_kind_redeclaration() {
        let decls = declarations(&[("pkg", EntityKind::Package), ("pkg", EntityKind::Module)]);
        assert_eq!(decls.len(), 1);

        let err = TreeBuilder::strict().build_declarations(&decls).unwrap_err();
        assert_eq!(
            err,
            ConflictError::KindRedeclared {
                path: "pkg".to_string(),
                previous: EntityKind::Package,
                declared: EntityKind::Module,
            }
        );

        let tree = TreeBuilder::default().build_declarations(&decls).unwrap();
        assert_eq!(tree.resolve(&["pkg"]).unwrap().kind(), EntityKind::Module);
    }

    #[test]
    fn test_strict_accepts_repeated_and_unknown_kinds() {
        let decls = declarations(&[
            ("pkg", EntityKind::Package),
            ("pkg", EntityKind::Unknown),
            ("pkg", EntityKind::Package),
        ]);
        let tree = TreeBuilder::strict().build_declarations(&decls).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.resolve(&["pkg"]).unwrap().kind(), EntityKind::Package);
    }

    #[test]
    fn test_strict_rejects_empty_segments() {
        let err = TreeBuilder::strict()
            .build(["os..path"], &NoDescriptions)
            .unwrap_err();
        assert_eq!(
            err,
            ConflictError::EmptySegment {
                name: "os..path".to_string()
            }
        );
        assert_eq!(err.to_string(), "`os..path` contains an empty path segment");
    }
}
