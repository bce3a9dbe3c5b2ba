use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use ptcloud_index::KdTree;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Returns a fresh id for a newly created coordinate buffer.
pub(crate) fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug)]
struct BuiltIndex {
    generation: u64,
    tree: KdTree,
}

/// Lazily built k-d tree tied to one coordinate buffer.
///
/// `OnceLock` runs the build at most once: concurrent first queries block
/// until the winning thread has installed the tree.
#[derive(Debug, Clone, Default)]
pub(crate) struct IndexCache {
    cell: OnceLock<Arc<BuiltIndex>>,
}

impl IndexCache {
    /// Returns the cached tree, building it from `points` on first use.
    pub(crate) fn get_or_build(
        &self,
        points: &[[f64; 3]],
        generation: u64,
        leaf_size: usize,
    ) -> &KdTree {
        let built = self.cell.get_or_init(|| {
            Arc::new(BuiltIndex {
                generation,
                tree: KdTree::build(points, leaf_size),
            })
        });
        debug_assert_eq!(
            built.generation, generation,
            "k-d tree queried against a replaced coordinate buffer"
        );
        &built.tree
    }

    pub(crate) fn get(&self) -> Option<&KdTree> {
        self.cell.get().map(|built| &built.tree)
    }

    /// Drops the cached tree; the next query rebuilds it.
    pub(crate) fn invalidate(&mut self) {
        if self.cell.take().is_some() {
            log::debug!("dropped cached k-d tree");
        }
    }
}
