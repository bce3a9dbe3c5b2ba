#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Axis-aligned bounding boxes used for pruning and region queries.
pub mod bbox;

/// Linear scan search kernels.
pub mod brute_force;

/// k-d tree spatial index.
pub mod kdtree;

/// Neighbor records and result collectors.
pub mod neighbor;

pub use bbox::BoundingBox;
pub use kdtree::KdTree;
pub use neighbor::Neighbor;

/// Squared Euclidean distance between two points.
#[inline]
pub fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// Returns true if all three coordinates are finite.
#[inline]
pub fn is_finite_point(p: &[f64; 3]) -> bool {
    p.iter().all(|v| v.is_finite())
}
