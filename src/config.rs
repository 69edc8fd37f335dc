//! Engine configuration
//!
//! Settings come from an optional JSON file, with command-line flags applied on top.
//! Every field has a default, so an empty object (`{}`) is a valid file.
//!
//! ```json
//! {
//!   "max_results": 9,
//!   "wildcard_marker": "*",
//!   "cache_capacity": 128,
//!   "conflict_policy": "permissive",
//!   "parallel_threshold": 1000
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matcher::DEFAULT_PARALLEL_THRESHOLD;
use crate::query::{SEGMENT_SEPARATOR, WILDCARD_MARKER};
use crate::tree::ConflictPolicy;

/// Results shown before the "more results not shown" line.
pub const DEFAULT_MAX_RESULTS: usize = 9;

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("max_results must be at least 1")]
    ZeroMaxResults,

    #[error("{0:?} cannot be used as the wildcard marker")]
    InvalidMarker(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum hits returned per search (the full count is still reported)
    pub max_results: usize,
    /// Character that switches a query to subtree-wide matching
    pub wildcard_marker: char,
    /// Ranked result lists kept in the LRU cache; 0 disables caching
    pub cache_capacity: usize,
    /// Tree builder policy used on rebuild
    pub conflict_policy: ConflictPolicy,
    /// Subtree size at which wildcard scoring goes parallel
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            wildcard_marker: WILDCARD_MARKER,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            conflict_policy: ConflictPolicy::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == 0 {
            return Err(ConfigError::ZeroMaxResults);
        }
        let marker = self.wildcard_marker;
        if marker == SEGMENT_SEPARATOR || marker.is_whitespace() || marker.is_control() {
            return Err(ConfigError::InvalidMarker(marker));
        }
        Ok(())
    }
}
