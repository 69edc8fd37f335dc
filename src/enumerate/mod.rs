//! Namespace enumerators
//!
//! An [`Enumerator`] discovers fully-qualified names and whatever it knows about them
//! (kind, source file). The engine only consumes the declarations; discovery failures
//! are passed back to the caller unchanged.
//!
//! Implementations:
//! - [`ListingEnumerator`]: a prepared text listing (`name<TAB>kind<TAB>path`)
//! - [`DirectoryEnumerator`]: a walk over installed package roots such as `site-packages`
//! - [`StaticEnumerator`]: an in-memory list, mostly for tests and embedding

pub mod directory;
pub mod listing;

pub use directory::DirectoryEnumerator;
pub use listing::{ListingEnumerator, parse_listing};

use crate::tree::{Declaration, EntityKind};

pub trait Enumerator: Send + Sync {
    /// Enumerates every declaration currently available.
    fn enumerate(&self) -> anyhow::Result<Vec<Declaration>>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Enumerator over a fixed list of declarations.
#[derive(Debug, Clone, Default)]
pub struct StaticEnumerator {
    declarations: Vec<Declaration>,
}

impl StaticEnumerator {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self { declarations }
    }

    /// Declares every name with kind `unknown`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| Declaration::new(name, EntityKind::Unknown))
                .collect(),
        )
    }
}

impl Enumerator for StaticEnumerator {
    fn enumerate(&self) -> anyhow::Result<Vec<Declaration>> {
        Ok(self.declarations.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// True for names usable as a Python identifier segment (ASCII subset).
pub(crate) fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}
