use std::num::NonZeroUsize;

/// Point count below which queries scan linearly instead of using the k-d tree.
pub const DEFAULT_BRUTE_FORCE_THRESHOLD: usize = 500;

/// Default maximum number of points per k-d tree leaf.
pub const DEFAULT_LEAF_SIZE: usize = 10;

/// Controls how a [`crate::PointSet`] indexes its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Point sets with strictly fewer points are searched by brute force.
    pub brute_force_threshold: usize,
    /// Maximum number of points per k-d tree leaf.
    pub leaf_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            brute_force_threshold: DEFAULT_BRUTE_FORCE_THRESHOLD,
            leaf_size: DEFAULT_LEAF_SIZE,
        }
    }
}

/// Per-query options for k-NN and radius searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Return results by ascending distance.
    pub sort: bool,
    /// Maximum number of k-d tree leaves scanned per query.
    ///
    /// `None` makes the search exhaustive and exact.
    pub max_leaf_checks: Option<NonZeroUsize>,
}

impl SearchParams {
    /// Exact search with sorted output.
    pub fn sorted() -> Self {
        Self {
            sort: true,
            max_leaf_checks: None,
        }
    }

    /// Bounds the search to `max_leaf_checks` leaves; zero means unbounded.
    pub fn with_max_leaf_checks(mut self, max_leaf_checks: usize) -> Self {
        self.max_leaf_checks = NonZeroUsize::new(max_leaf_checks);
        self
    }

    /// Returns true if the search may stop before visiting every candidate leaf.
    pub fn is_approximate(&self) -> bool {
        self.max_leaf_checks.is_some()
    }
}
