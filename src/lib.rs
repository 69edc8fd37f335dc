pub mod cache;
pub mod config;
pub mod engine;
pub mod enumerate;
pub mod index;
pub mod logging;
pub mod matcher;
pub mod metrics;
pub mod query;
pub mod ranker;
pub mod tree;

pub use config::{ConfigError, EngineConfig};
pub use engine::{SearchEngine, SearchResults};
pub use enumerate::{DirectoryEnumerator, Enumerator, ListingEnumerator, StaticEnumerator};
pub use index::SharedTree;
pub use matcher::{Candidate, Matcher, Score, match_query, resolve};
pub use query::{Query, parse};
pub use ranker::{Hit, rank};
pub use tree::{
    ConflictError, ConflictPolicy, Declaration, Entity, EntityKind, EntityTree, Metadata, TreeBuilder,
    TreeStats,
};
