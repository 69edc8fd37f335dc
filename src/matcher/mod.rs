//! Query matching against the namespace tree
//!
//! The matcher resolves the query's exact segments from the root, then fuzzy-scores
//! either the immediate children of the resolved node or, in wildcard mode, its whole
//! subtree. Only local names are scored. An unresolvable path yields no candidates.
//!
//! The tree is only ever read; large wildcard scans are scored in parallel with rayon.

pub mod fuzzy;

use rayon::prelude::*;
use tracing::debug;

use crate::query::Query;
use crate::tree::{Entity, EntityTree, join_path};

pub use fuzzy::{Pattern, Score};

/// Subtree size at which wildcard scoring switches to rayon.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1000;

/// A scored entity, not yet ranked.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub entity: &'a Entity,
    pub full_path: String,
    pub score: Score,
}

/// Exact, case-sensitive path resolution from the root.
pub fn resolve<'a, S: AsRef<str>>(tree: &'a EntityTree, path: &[S]) -> Option<&'a Entity> {
    tree.resolve(path)
}

/// Matches `query` with default settings.
pub fn match_query<'a>(tree: &'a EntityTree, query: &Query) -> Vec<Candidate<'a>> {
    Matcher::default().match_query(tree, query)
}

#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    parallel_threshold: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl Matcher {
    pub fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    /// Scores the entities `query` selects. Non-matching entities are left out entirely.
    pub fn match_query<'a>(&self, tree: &'a EntityTree, query: &Query) -> Vec<Candidate<'a>> {
        let Some(anchor) = tree.resolve(&query.segments) else {
            debug!("Query path {:?} does not resolve", query.segments);
            return Vec::new();
        };
        let anchor_path = query.segments.join(".");
        let pattern = Pattern::new(&query.partial);

        if query.wildcard {
            let scope: Vec<(String, &Entity)> = tree.descendants(anchor, &anchor_path).collect();
            self.score_subtree(scope, &pattern)
        } else {
            anchor
                .children()
                .filter_map(|child| {
                    pattern.score(child.name()).map(|score| Candidate {
                        entity: child,
                        full_path: join_path(&anchor_path, child.name()),
                        score,
                    })
                })
                .collect()
        }
    }

    fn score_subtree<'a>(&self, scope: Vec<(String, &'a Entity)>, pattern: &Pattern) -> Vec<Candidate<'a>> {
        let to_candidate = |(full_path, entity): (String, &'a Entity)| {
            pattern.score(entity.name()).map(|score| Candidate {
                entity,
                full_path,
                score,
            })
        };

        if scope.len() >= self.parallel_threshold {
            debug!("Scoring {} entities in parallel", scope.len());
            scope.into_par_iter().filter_map(to_candidate).collect()
        } else {
            scope.into_iter().filter_map(to_candidate).collect()
        }
    }
}
