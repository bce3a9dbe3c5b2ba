use ptcloud_index::{brute_force, is_finite_point, neighbor, BoundingBox, KdTree, Neighbor};

use crate::{PointSet, PointSetError, SearchParams};

/// The search kernel serving a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Linear scan over all points.
    BruteForce,
    /// Lazily built k-d tree.
    KdTree,
}

fn check_query_point(query: &[f64; 3]) -> Result<(), PointSetError> {
    if !is_finite_point(query) {
        return Err(PointSetError::InvalidArgument(format!(
            "query point {query:?} must be finite"
        )));
    }
    Ok(())
}

/// Splits neighbors into indices and Euclidean distances.
fn into_indices_and_distances(neighbors: Vec<Neighbor>) -> (Vec<usize>, Vec<f64>) {
    neighbors
        .into_iter()
        .map(|n| (n.index, n.distance()))
        .unzip()
}

impl PointSet {
    /// The kernel queries on this point set run on.
    ///
    /// Point sets with fewer points than
    /// [`crate::IndexConfig::brute_force_threshold`] are scanned linearly.
    pub fn search_strategy(&self) -> SearchStrategy {
        if self.len() < self.index_config().brute_force_threshold {
            SearchStrategy::BruteForce
        } else {
            SearchStrategy::KdTree
        }
    }

    /// Returns true if the k-d tree for the current coordinates has been built.
    pub fn has_index(&self) -> bool {
        self.index_cache().get().is_some()
    }

    /// Returns the k-d tree, building it if needed, or `None` when this
    /// point set is small enough to be scanned linearly.
    pub fn spatial_index(&self) -> Option<&KdTree> {
        match self.search_strategy() {
            SearchStrategy::BruteForce => None,
            SearchStrategy::KdTree => Some(self.kdtree()),
        }
    }

    fn kdtree(&self) -> &KdTree {
        self.index_cache()
            .get_or_build(self.points(), self.generation(), self.index_config().leaf_size)
    }

    /// Find the `k` nearest neighbors of `query`.
    ///
    /// `k` is clamped to the number of points. Points with a non-finite
    /// coordinate are never returned, and an approximate search may return
    /// fewer than `k` neighbors.
    ///
    /// # Arguments
    ///
    /// * `query` - The query point.
    /// * `k` - The number of neighbors to find.
    /// * `params` - Sorting and leaf budget options.
    ///
    /// # Returns
    ///
    /// The indices of the neighbors and their Euclidean distances to `query`.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::InvalidArgument`] if `k` is zero or `query`
    /// is not finite.
    pub fn find_k_nearest(
        &self,
        query: &[f64; 3],
        k: usize,
        params: &SearchParams,
    ) -> Result<(Vec<usize>, Vec<f64>), PointSetError> {
        if k == 0 {
            return Err(PointSetError::InvalidArgument(
                "number of neighbors must be positive".to_string(),
            ));
        }
        check_query_point(query)?;

        let k = k.min(self.len());
        let neighbors = match self.search_strategy() {
            // brute force results come back sorted
            SearchStrategy::BruteForce => {
                log::trace!("knn: brute force over {} points", self.len());
                brute_force::knn(self.points(), query, k)
            }
            SearchStrategy::KdTree => {
                log::trace!("knn: k-d tree over {} points", self.len());
                self.kdtree()
                    .knn(query, k, params.max_leaf_checks, params.sort)
            }
        };

        Ok(into_indices_and_distances(neighbors))
    }

    /// Find all points within `radius` of `query`.
    ///
    /// A point matches when its squared distance to `query` is at most
    /// `radius * radius`. Points with a non-finite coordinate never match.
    ///
    /// # Returns
    ///
    /// The indices of the matches and their Euclidean distances to `query`.
    /// Unless `params.sort` is set, the order depends on the search strategy.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::InvalidArgument`] if `radius` is negative or
    /// not finite, or if `query` is not finite.
    pub fn find_in_radius(
        &self,
        query: &[f64; 3],
        radius: f64,
        params: &SearchParams,
    ) -> Result<(Vec<usize>, Vec<f64>), PointSetError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(PointSetError::InvalidArgument(format!(
                "radius must be finite and non-negative, got {radius}"
            )));
        }
        check_query_point(query)?;

        let radius_sq = radius * radius;
        let mut neighbors = match self.search_strategy() {
            SearchStrategy::BruteForce => {
                log::trace!("radius: brute force over {} points", self.len());
                brute_force::radius(self.points(), query, radius_sq)
            }
            SearchStrategy::KdTree => {
                log::trace!("radius: k-d tree over {} points", self.len());
                self.kdtree().radius(query, radius_sq, params.max_leaf_checks)
            }
        };

        if params.sort {
            neighbor::sort_neighbors(&mut neighbors);
        }

        Ok(into_indices_and_distances(neighbors))
    }

    /// Find the points inside an axis-aligned region of interest.
    ///
    /// # Arguments
    ///
    /// * `roi` - Inclusive `[min, max]` bounds for x, y and z. Infinite bounds are allowed.
    ///
    /// # Returns
    ///
    /// The matching indices in ascending order. Organized point sets report
    /// row-major flat indices.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::InvalidArgument`] if a bound is NaN or `min > max`
    /// on any axis.
    ///
    /// # Example
    ///
    /// ```
    /// use ptcloud_3d::PointSet;
    ///
    /// let cloud = PointSet::new(vec![[0.0, 0.0, 0.0], [5.0, 5.0, 5.0]], None, None).unwrap();
    /// let inside = cloud.find_in_box(&[[0.0, 1.0], [0.0, 1.0], [0.0, 1.0]]).unwrap();
    /// assert_eq!(inside, vec![0]);
    /// ```
    pub fn find_in_box(&self, roi: &[[f64; 2]; 3]) -> Result<Vec<usize>, PointSetError> {
        for (axis, [min, max]) in roi.iter().enumerate() {
            if min.is_nan() || max.is_nan() || min > max {
                return Err(PointSetError::InvalidArgument(format!(
                    "invalid bounds [{min}, {max}] on axis {axis}"
                )));
            }
        }
        let roi = BoundingBox::new(
            [roi[0][0], roi[1][0], roi[2][0]],
            [roi[0][1], roi[1][1], roi[2][1]],
        );

        let indices = match self.search_strategy() {
            SearchStrategy::BruteForce => brute_force::in_box(self.points(), &roi),
            SearchStrategy::KdTree => self.kdtree().in_box(&roi),
        };

        Ok(indices)
    }
}
