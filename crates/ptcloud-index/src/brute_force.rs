//! Linear scans over a coordinate slice.
//!
//! These kernels skip index construction entirely and are used for small
//! clouds. Points with any non-finite coordinate never appear in k-NN or
//! radius results; box queries test every point as-is.

use crate::neighbor::{sort_neighbors, Neighbor};
use crate::{is_finite_point, squared_distance, BoundingBox};

/// Squared distances from `query` to every finite point, in index order.
fn finite_neighbors(points: &[[f64; 3]], query: &[f64; 3]) -> Vec<Neighbor> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| is_finite_point(p))
        .map(|(i, p)| Neighbor::new(i, squared_distance(p, query)))
        .filter(|n| n.distance_sq.is_finite())
        .collect()
}

/// Finds the `k` nearest finite points to `query`.
///
/// The result is sorted by ascending squared distance, ties broken by
/// ascending index, and holds `min(k, #finite points)` entries.
pub fn knn(points: &[[f64; 3]], query: &[f64; 3], k: usize) -> Vec<Neighbor> {
    if k == 0 {
        return Vec::new();
    }

    let mut candidates = finite_neighbors(points, query);

    // partial selection before sorting the survivors
    if k < candidates.len() {
        candidates.select_nth_unstable(k - 1);
        candidates.truncate(k);
    }
    sort_neighbors(&mut candidates);

    candidates
}

/// Finds every finite point whose squared distance to `query` is at most
/// `radius_sq`, in ascending index order.
pub fn radius(points: &[[f64; 3]], query: &[f64; 3], radius_sq: f64) -> Vec<Neighbor> {
    finite_neighbors(points, query)
        .into_iter()
        .filter(|n| n.distance_sq <= radius_sq)
        .collect()
}

/// Returns, in ascending order, the indices of all points inside `roi`.
pub fn in_box(points: &[[f64; 3]], roi: &BoundingBox) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| roi.contains(p))
        .map(|(i, _)| i)
        .collect()
}
