use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A point index paired with its squared distance to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the point in the indexed coordinate slice.
    pub index: usize,
    /// Squared Euclidean distance to the query.
    pub distance_sq: f64,
}

impl Neighbor {
    /// Creates a new neighbor record.
    pub fn new(index: usize, distance_sq: f64) -> Self {
        Self { index, distance_sq }
    }

    /// Euclidean distance to the query.
    pub fn distance(&self) -> f64 {
        self.distance_sq.sqrt()
    }
}

impl Eq for Neighbor {}

// ascending distance, ties broken by ascending index
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_sq
            .total_cmp(&other.distance_sq)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sorts neighbors by ascending distance, then ascending index.
pub fn sort_neighbors(neighbors: &mut [Neighbor]) {
    neighbors.sort_unstable();
}

/// Collector receiving candidate points during a tree traversal.
pub(crate) trait ResultSet {
    /// Squared distance beyond which no candidate can be accepted.
    fn worst_distance_sq(&self) -> f64;

    /// Offers one candidate.
    fn add(&mut self, index: usize, distance_sq: f64);
}

/// Keeps the `k` smallest neighbors seen so far.
pub(crate) struct KnnResultSet {
    k: usize,
    heap: BinaryHeap<Neighbor>,
}

impl KnnResultSet {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    pub(crate) fn into_vec(self, sorted: bool) -> Vec<Neighbor> {
        if sorted {
            self.heap.into_sorted_vec()
        } else {
            self.heap.into_vec()
        }
    }
}

impl ResultSet for KnnResultSet {
    fn worst_distance_sq(&self) -> f64 {
        if self.heap.len() < self.k {
            return f64::INFINITY;
        }
        self.heap.peek().map_or(f64::INFINITY, |n| n.distance_sq)
    }

    fn add(&mut self, index: usize, distance_sq: f64) {
        if self.k == 0 {
            return;
        }
        let candidate = Neighbor::new(index, distance_sq);
        if self.heap.len() < self.k {
            self.heap.push(candidate);
        } else if let Some(top) = self.heap.peek() {
            if candidate < *top {
                self.heap.pop();
                self.heap.push(candidate);
            }
        }
    }
}

/// Keeps every neighbor within a fixed squared radius.
pub(crate) struct RadiusResultSet {
    radius_sq: f64,
    items: Vec<Neighbor>,
}

impl RadiusResultSet {
    pub(crate) fn new(radius_sq: f64) -> Self {
        Self {
            radius_sq,
            items: Vec::new(),
        }
    }

    pub(crate) fn into_vec(self) -> Vec<Neighbor> {
        self.items
    }
}

impl ResultSet for RadiusResultSet {
    fn worst_distance_sq(&self) -> f64 {
        self.radius_sq
    }

    fn add(&mut self, index: usize, distance_sq: f64) {
        if distance_sq <= self.radius_sq {
            self.items.push(Neighbor::new(index, distance_sq));
        }
    }
}
