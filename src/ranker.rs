//! Ranking of matched candidates
//!
//! Candidates are ordered by:
//! 1. Score, best first
//! 2. Local name, case-insensitive ascending
//! 3. Full path ascending, as the final tie-breaker
//!
//! Sibling names are unique, so full paths are unique and the order is total: the same
//! candidate set always ranks identically, which keeps keyboard-navigation indices stable.

use std::cmp::{Ordering, Reverse};

use serde::Serialize;

use crate::matcher::{Candidate, Score};
use crate::tree::{Entity, EntityKind, Metadata};

/// One ranked result as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub name: String,
    pub full_path: String,
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Hit {
    pub fn from_entity(entity: &Entity, full_path: impl Into<String>) -> Self {
        Self {
            name: entity.name().to_string(),
            full_path: full_path.into(),
            kind: entity.kind(),
            metadata: entity.metadata().cloned(),
        }
    }
}

impl From<Candidate<'_>> for Hit {
    fn from(candidate: Candidate<'_>) -> Self {
        Self {
            name: candidate.entity.name().to_string(),
            full_path: candidate.full_path,
            kind: candidate.entity.kind(),
            metadata: candidate.entity.metadata().cloned(),
        }
    }
}

/// Orders candidates best-first and converts them into hits.
pub fn rank(candidates: Vec<Candidate<'_>>) -> Vec<Hit> {
    rank_candidates(candidates).into_iter().map(Hit::from).collect()
}

/// Orders candidates best-first, keeping their scores.
pub fn rank_candidates(candidates: Vec<Candidate<'_>>) -> Vec<Candidate<'_>> {
    let mut keyed: Vec<(Reverse<Score>, String, Candidate<'_>)> = candidates
        .into_iter()
        .map(|c| (Reverse(c.score), c.entity.name().to_lowercase(), c))
        .collect();

    // The key is a total order, so an unstable sort is still deterministic
    keyed.sort_unstable_by(|a, b| compare(a, b));
    keyed.into_iter().map(|(_, _, c)| c).collect()
}

fn compare(
    a: &(Reverse<Score>, String, Candidate<'_>),
    b: &(Reverse<Score>, String, Candidate<'_>),
) -> Ordering {
    a.0.cmp(&b.0)
        .then_with(|| a.1.cmp(&b.1))
        .then_with(|| a.2.full_path.cmp(&b.2.full_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::match_query;
    use crate::query::parse;
    use crate::tree::{NoDescriptions, TreeBuilder};

    fn ranked_paths(names: &[&str], raw: &str) -> Vec<String> {
        let tree = TreeBuilder::default().build(names, &NoDescriptions).unwrap();
        rank(match_query(&tree, &parse(raw)))
            .into_iter()
            .map(|hit| hit.full_path)
            .collect()
    }

    #[test]
    fn test_rank_by_score() {
        let ranked = ranked_paths(&["pxaxtxh", "xpath", "path", "pathlib"], "path");
        assert_eq!(ranked, vec!["path", "pathlib", "xpath", "pxaxtxh"]);
    }

    #[test]
    fn test_empty_partial_ranks_by_name() {
        let ranked = ranked_paths(&["sys", "Os", "abc", "json"], "");
        assert_eq!(ranked, vec!["abc", "json", "Os", "sys"]);
    }

    #[test]
    fn test_case_variants_tie_break_on_full_path() {
        let ranked = ranked_paths(&["os", "OS", "Os"], "");
        assert_eq!(ranked, vec!["OS", "Os", "os"]);
    }

    #[test]
    fn test_same_name_in_different_packages() {
        let ranked = ranked_paths(&["b.util", "a.util", "c.util"], "*util");
        assert_eq!(ranked, vec!["a.util", "b.util", "c.util"]);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let names: Vec<String> = (0..50).map(|i| format!("mod{}", (i * 7) % 50)).collect();
        let tree = TreeBuilder::default().build(&names, &NoDescriptions).unwrap();
        let query = parse("mod");
        let first = rank(match_query(&tree, &query));
        for _ in 0..5 {
            assert_eq!(rank(match_query(&tree, &query)), first);
        }
    }

    #[test]
    fn test_hit_carries_kind_and_metadata() {
        use crate::tree::{Declaration, Declarations};

        let decls: Declarations = vec![
            Declaration::new("json", EntityKind::Package)
                .with_metadata(Metadata::with_source("/lib/json/__init__.py")),
        ]
        .into_iter()
        .collect();
        let tree = TreeBuilder::default().build_declarations(&decls).unwrap();
        let hits = rank(match_query(&tree, &parse("js")));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "json");
        assert_eq!(hits[0].kind, EntityKind::Package);
        assert!(hits[0].metadata.is_some());
    }
}
