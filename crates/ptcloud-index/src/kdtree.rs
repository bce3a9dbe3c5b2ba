use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::num::NonZeroUsize;

use crate::neighbor::{KnnResultSet, Neighbor, RadiusResultSet, ResultSet};
use crate::{is_finite_point, squared_distance, BoundingBox};

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf,
    Branch { left: usize, right: usize },
}

#[derive(Debug, Clone)]
struct Node {
    // tight bounds of the points below this node
    bounds: BoundingBox,
    // range into `KdTree::order` covered by this node
    start: usize,
    end: usize,
    kind: NodeKind,
}

/// A pending subtree in the best-bin-first queue.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Branch {
    lower_bound: f64,
    node: usize,
}

impl Eq for Branch {}

impl Ord for Branch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lower_bound
            .total_cmp(&other.lower_bound)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A bucketed k-d tree over 3d coordinates.
///
/// The tree snapshots the coordinates it is built from: points are copied
/// into leaf order, so queries never touch the source slice again. Points
/// with a non-finite coordinate are kept aside and only take part in box
/// queries.
///
/// Nodes split at the median of their widest axis and every node keeps the
/// tight bounding box of its points, which is what k-NN, radius and box
/// queries prune against.
#[derive(Debug, Clone)]
pub struct KdTree {
    nodes: Vec<Node>,
    // original indices of the finite points, in leaf order
    order: Vec<usize>,
    // coordinates aligned with `order`
    points: Vec<[f64; 3]>,
    non_finite: Vec<(usize, [f64; 3])>,
    leaf_size: usize,
}

impl KdTree {
    /// Builds a tree over `points`.
    ///
    /// # Arguments
    ///
    /// * `points` - The coordinates to index. Result indices refer to this slice.
    /// * `leaf_size` - Maximum number of points per leaf. Clamped to at least 1.
    pub fn build(points: &[[f64; 3]], leaf_size: usize) -> Self {
        let now = std::time::Instant::now();
        let leaf_size = leaf_size.max(1);

        let mut order = Vec::with_capacity(points.len());
        let mut non_finite = Vec::new();
        for (i, p) in points.iter().enumerate() {
            if is_finite_point(p) {
                order.push(i);
            } else {
                non_finite.push((i, *p));
            }
        }

        let mut nodes = Vec::new();
        if !order.is_empty() {
            build_node(points, &mut order, 0, leaf_size, &mut nodes);
        }

        let leaf_points = order.iter().map(|&i| points[i]).collect();

        log::debug!(
            "kd-tree built: {} points ({} non-finite), leaf size {}, {} nodes in {:?}",
            points.len(),
            non_finite.len(),
            leaf_size,
            nodes.len(),
            now.elapsed()
        );

        Self {
            nodes,
            order,
            points: leaf_points,
            non_finite,
            leaf_size,
        }
    }

    /// Total number of points the tree was built from, finite or not.
    pub fn len(&self) -> usize {
        self.order.len() + self.non_finite.len()
    }

    /// Returns true if the tree was built from an empty slice.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of finite points stored in the leaves.
    pub fn num_indexed(&self) -> usize {
        self.order.len()
    }

    /// Number of nodes, leaves included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Maximum number of points per leaf.
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Finds the `k` nearest finite points to `query`.
    ///
    /// With `max_leaf_checks == None` the search is exact and returns the
    /// same neighbors as a linear scan, ties broken by ascending index.
    /// With a budget, at most that many leaves are scanned, nearest first,
    /// and fewer than `k` neighbors may come back.
    ///
    /// Distances are squared. When `sorted` is false the order is unspecified.
    pub fn knn(
        &self,
        query: &[f64; 3],
        k: usize,
        max_leaf_checks: Option<NonZeroUsize>,
        sorted: bool,
    ) -> Vec<Neighbor> {
        let mut result = KnnResultSet::new(k);
        if k > 0 {
            self.search(query, &mut result, max_leaf_checks);
        }
        result.into_vec(sorted)
    }

    /// Finds the finite points within squared distance `radius_sq` of `query`,
    /// in traversal order.
    ///
    /// The leaf budget behaves as in [`KdTree::knn`].
    pub fn radius(
        &self,
        query: &[f64; 3],
        radius_sq: f64,
        max_leaf_checks: Option<NonZeroUsize>,
    ) -> Vec<Neighbor> {
        let mut result = RadiusResultSet::new(radius_sq);
        self.search(query, &mut result, max_leaf_checks);
        result.into_vec()
    }

    /// Returns, in ascending order, the indices of all points inside `roi`.
    ///
    /// Always exhaustive. Non-finite points are tested as-is, so a point
    /// with an infinite coordinate matches a box unbounded on that axis.
    pub fn in_box(&self, roi: &BoundingBox) -> Vec<usize> {
        let mut out = Vec::new();

        let mut stack = Vec::new();
        if !self.nodes.is_empty() {
            stack.push(0);
        }
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if !roi.intersects(&node.bounds) {
                continue;
            }
            if roi.contains_box(&node.bounds) {
                out.extend_from_slice(&self.order[node.start..node.end]);
                continue;
            }
            match node.kind {
                NodeKind::Leaf => {
                    for pos in node.start..node.end {
                        if roi.contains(&self.points[pos]) {
                            out.push(self.order[pos]);
                        }
                    }
                }
                NodeKind::Branch { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        out.extend(
            self.non_finite
                .iter()
                .filter(|(_, p)| roi.contains(p))
                .map(|(i, _)| *i),
        );
        out.sort_unstable();
        out
    }

    // best-bin-first traversal: leaves are scanned in order of their lower
    // bound distance until the budget runs out or no subtree can improve
    // the result set
    fn search<R: ResultSet>(
        &self,
        query: &[f64; 3],
        result: &mut R,
        max_leaf_checks: Option<NonZeroUsize>,
    ) {
        let Some(root) = self.nodes.first() else {
            return;
        };

        let budget = max_leaf_checks.map_or(usize::MAX, NonZeroUsize::get);
        let mut checks = 0;

        let mut queue = BinaryHeap::new();
        queue.push(Reverse(Branch {
            lower_bound: root.bounds.squared_distance_to(query),
            node: 0,
        }));

        while let Some(Reverse(branch)) = queue.pop() {
            if branch.lower_bound > result.worst_distance_sq() {
                break;
            }
            if checks >= budget {
                log::trace!("leaf budget of {} exhausted", budget);
                break;
            }

            // descend to the closest leaf, queueing the farther siblings
            let mut current = branch.node;
            while let NodeKind::Branch { left, right } = self.nodes[current].kind {
                let dl = self.nodes[left].bounds.squared_distance_to(query);
                let dr = self.nodes[right].bounds.squared_distance_to(query);
                let (near, far, far_bound) = if dl <= dr {
                    (left, right, dr)
                } else {
                    (right, left, dl)
                };
                if far_bound <= result.worst_distance_sq() {
                    queue.push(Reverse(Branch {
                        lower_bound: far_bound,
                        node: far,
                    }));
                }
                current = near;
            }

            checks += 1;
            let leaf = &self.nodes[current];
            for pos in leaf.start..leaf.end {
                let d = squared_distance(&self.points[pos], query);
                if d.is_finite() {
                    result.add(self.order[pos], d);
                }
            }
        }
    }
}

fn build_node(
    points: &[[f64; 3]],
    order: &mut [usize],
    start: usize,
    leaf_size: usize,
    nodes: &mut Vec<Node>,
) -> usize {
    let bounds = BoundingBox::from_points(order.iter().map(|&i| &points[i]));
    let id = nodes.len();
    nodes.push(Node {
        bounds,
        start,
        end: start + order.len(),
        kind: NodeKind::Leaf,
    });

    // all points coincide on every axis when the widest one is flat
    let axis = bounds.widest_axis();
    if order.len() <= leaf_size || bounds.max[axis] <= bounds.min[axis] {
        return id;
    }

    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));

    let (lo, hi) = order.split_at_mut(mid);
    let left = build_node(points, lo, start, leaf_size, nodes);
    let right = build_node(points, hi, start + mid, leaf_size, nodes);
    nodes[id].kind = NodeKind::Branch { left, right };

    id
}
