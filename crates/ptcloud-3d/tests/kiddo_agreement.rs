use std::num::NonZeroUsize;

use approx::assert_relative_eq;
use kiddo::float::distance::SquaredEuclidean;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use ptcloud_3d::{PointSet, SearchParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn exact_knn_distances_match_kiddo() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(42);
    let points: Vec<[f64; 3]> = (0..5000)
        .map(|_| [rng.random::<f64>(), rng.random::<f64>(), rng.random::<f64>()])
        .collect();

    let reference: ImmutableKdTree<f64, u32, 3, 32> = ImmutableKdTree::new_from_slice(&points);
    let ps = PointSet::new(points, None, None)?;

    for k in [1usize, 5, 32] {
        let Some(nz_k) = NonZeroUsize::new(k) else {
            continue;
        };
        for _ in 0..20 {
            let query = [rng.random::<f64>(), rng.random::<f64>(), rng.random::<f64>()];
            let expected = reference.nearest_n::<SquaredEuclidean>(&query, nz_k);
            let (idx, dist) = ps.find_k_nearest(&query, k, &SearchParams::sorted())?;

            assert_eq!(idx.len(), expected.len());
            for (d, nn) in dist.iter().zip(expected.iter()) {
                assert_relative_eq!(*d, nn.distance.sqrt(), epsilon = 1e-12);
            }
        }
    }
    Ok(())
}
