//! Search engine: parse → match → rank over a swappable namespace tree
//!
//! `SearchEngine` is the one object a host holds. It owns the current tree, the result
//! cache and the configuration, and is `Sync`, so searches may run from any number of
//! threads while a rebuild happens elsewhere.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, QueryCache};
use crate::config::EngineConfig;
use crate::enumerate::Enumerator;
use crate::index::SharedTree;
use crate::matcher::Matcher;
use crate::metrics::{TimingGuard, metrics};
use crate::query::{Query, parse_with_marker};
use crate::ranker::{Hit, rank};
use crate::tree::{Declarations, EntityTree, TreeBuilder, TreeStats};

/// Outcome of one search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: Query,
    /// Best hits, at most `max_results`
    pub hits: Vec<Hit>,
    /// Number of matches before truncation
    pub total: usize,
    /// The entity the query text names exactly, if it exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact: Option<Hit>,
    /// Tree generation the search ran against
    pub generation: u64,
}

impl SearchResults {
    /// Matches left out by the result limit.
    pub fn hidden(&self) -> usize {
        self.total.saturating_sub(self.hits.len())
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[derive(Debug)]
pub struct SearchEngine {
    config: EngineConfig,
    tree: SharedTree,
    cache: QueryCache,
    matcher: Matcher,
}

impl SearchEngine {
    /// An engine over an empty tree. Call [`SearchEngine::rebuild`] or
    /// [`SearchEngine::install`] to load a namespace.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_tree(config, EntityTree::empty())
    }

    pub fn with_tree(config: EngineConfig, tree: EntityTree) -> Self {
        Self {
            cache: QueryCache::with_capacity(config.cache_capacity),
            matcher: Matcher::new(config.parallel_threshold),
            tree: SharedTree::new(tree),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The current tree. Remains usable after a later rebuild.
    pub fn snapshot(&self) -> Arc<EntityTree> {
        self.tree.snapshot()
    }

    pub fn generation(&self) -> u64 {
        self.tree.generation()
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.snapshot().stats()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Replaces the current tree with an already built one.
    pub fn install(&self, tree: EntityTree) -> u64 {
        let nodes = tree.len();
        let generation = self.tree.replace(tree);
        self.cache.clear();
        metrics().record_rebuild(nodes);
        generation
    }

    /// Enumerates the namespace again and swaps the new tree in.
    ///
    /// Any enumeration or build failure leaves the current tree untouched.
    pub fn rebuild(&self, enumerator: &dyn Enumerator) -> Result<TreeStats> {
        let _timing = TimingGuard::new("rebuild");
        let builder = TreeBuilder::new(self.config.conflict_policy);

        let result = enumerator
            .enumerate()
            .with_context(|| format!("{} enumeration failed", enumerator.name()))
            .and_then(|declarations| {
                let declarations: Declarations = declarations.into_iter().collect();
                builder
                    .build_declarations(&declarations)
                    .context("Failed to build namespace tree")
            });

        let tree = match result {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Rebuild failed, keeping generation {}: {:#}", self.generation(), e);
                metrics().record_failed_rebuild();
                return Err(e);
            }
        };

        let stats = tree.stats();
        let generation = self.install(tree);
        info!(
            "Rebuilt namespace from {} enumerator: {} nodes, {} top-level (generation {})",
            enumerator.name(),
            stats.nodes,
            stats.top_level,
            generation
        );
        Ok(stats)
    }

    /// Parses raw query text with the configured wildcard marker.
    pub fn parse(&self, raw: &str) -> Query {
        parse_with_marker(raw, self.config.wildcard_marker)
    }

    pub fn search(&self, raw: &str) -> SearchResults {
        self.search_query(self.parse(raw))
    }

    pub fn search_query(&self, query: Query) -> SearchResults {
        let _timing = TimingGuard::new("search");
        let (generation, tree) = self.tree.snapshot_with_generation();

        let ranked = match self.cache.get(generation, &query) {
            Some(hits) => {
                metrics().record_cache_hit();
                hits
            }
            None => {
                if self.cache.is_enabled() {
                    metrics().record_cache_miss();
                }
                let hits = Arc::new(rank(self.matcher.match_query(&tree, &query)));
                self.cache.insert(generation, query.clone(), Arc::clone(&hits));
                hits
            }
        };

        // Wildcard queries search a subtree, never a single path
        let exact = if query.wildcard {
            None
        } else {
            query.exact_path().and_then(|path| {
                tree.resolve(&path)
                    .map(|entity| Hit::from_entity(entity, path.join(".")))
            })
        };

        let total = ranked.len();
        let hits: Vec<Hit> = ranked.iter().take(self.config.max_results).cloned().collect();
        metrics().record_search(query.wildcard, total);
        debug!(
            "Query {:?}: {} matches, showing {} (generation {})",
            query.text(),
            total,
            hits.len(),
            generation
        );

        SearchResults {
            query,
            hits,
            total,
            exact,
            generation,
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
