//! Caller-owned tree handle with atomic replacement
//!
//! Queries take a snapshot (`Arc<EntityTree>`) and keep reading it for as long as they
//! need; the owner builds the new tree completely before swapping the reference.
//! In-flight queries therefore always see one whole tree, old or new, never a partial one.
//!
//! The lock only guards the pointer swap, never tree construction, so it is held for a
//! few nanoseconds at a time.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::tree::EntityTree;

#[derive(Debug)]
struct Current {
    generation: u64,
    tree: Arc<EntityTree>,
}

/// The tree instance used by subsequent queries.
#[derive(Debug)]
pub struct SharedTree {
    current: RwLock<Current>,
}

impl SharedTree {
    pub fn new(tree: EntityTree) -> Self {
        Self {
            current: RwLock::new(Current {
                generation: 0,
                tree: Arc::new(tree),
            }),
        }
    }

    /// The current tree. Stays valid even if a rebuild swaps in a new one.
    pub fn snapshot(&self) -> Arc<EntityTree> {
        Arc::clone(&self.current.read().tree)
    }

    /// The current tree together with its generation, read consistently.
    pub fn snapshot_with_generation(&self) -> (u64, Arc<EntityTree>) {
        let current = self.current.read();
        (current.generation, Arc::clone(&current.tree))
    }

    /// Incremented on every replacement.
    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Swaps in `tree`, returning the new generation.
    pub fn replace(&self, tree: EntityTree) -> u64 {
        let tree = Arc::new(tree);
        let nodes = tree.len();
        let generation = {
            let mut current = self.current.write();
            current.generation += 1;
            current.tree = tree;
            current.generation
        };
        info!("Installed namespace tree generation {} ({} nodes)", generation, nodes);
        generation
    }

}

impl Default for SharedTree {
    fn default() -> Self {
        Self::new(EntityTree::empty())
    }
}
