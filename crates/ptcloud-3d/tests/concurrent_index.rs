use std::sync::Barrier;

use ptcloud_3d::{PointSet, PointSetError, SearchParams};

fn helix(n: usize) -> Vec<[f64; 3]> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.01;
            [t.cos(), t.sin(), t * 0.1]
        })
        .collect()
}

#[test]
fn concurrent_first_queries_share_one_index() -> Result<(), PointSetError> {
    let ps = PointSet::new(helix(20_000), None, None)?;
    let num_threads = 8;
    let barrier = Barrier::new(num_threads);

    let results = std::thread::scope(|s| {
        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    let tree = ps.spatial_index().map(|t| t as *const _ as usize);
                    let knn = ps.find_k_nearest(&[1.0, 0.0, 0.0], 5, &SearchParams::sorted());
                    (tree, knn)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join())
            .collect::<Vec<_>>()
    });

    let mut trees = Vec::new();
    let mut answers = Vec::new();
    for res in results {
        let Ok((tree, knn)) = res else {
            panic!("query thread panicked");
        };
        trees.push(tree);
        answers.push(knn?);
    }

    assert!(trees[0].is_some());
    assert!(trees.iter().all(|t| *t == trees[0]));
    assert!(answers.iter().all(|a| *a == answers[0]));
    assert_eq!(answers[0].0[0], 0);
    Ok(())
}

#[test]
fn point_set_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PointSet>();
}
