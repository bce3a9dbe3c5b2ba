/// An axis-aligned box in 3d space.
///
/// Bounds are inclusive on both ends. A box with `min > max` on any axis is
/// considered empty and contains nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Lower corner.
    pub min: [f64; 3],
    /// Upper corner.
    pub max: [f64; 3],
}

impl BoundingBox {
    /// Creates a box from its corners.
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// The empty box, the identity for [`BoundingBox::expand`].
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    /// A box covering all of space.
    pub fn everything() -> Self {
        Self {
            min: [f64::NEG_INFINITY; 3],
            max: [f64::INFINITY; 3],
        }
    }

    /// Returns true if the box contains no point.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| !(self.min[axis] <= self.max[axis]))
    }

    /// Grows the box to contain `point`. Non-finite points are ignored.
    pub fn expand(&mut self, point: &[f64; 3]) {
        if !crate::is_finite_point(point) {
            return;
        }
        for (axis, &v) in point.iter().enumerate() {
            self.min[axis] = self.min[axis].min(v);
            self.max[axis] = self.max[axis].max(v);
        }
    }

    /// Tightest box around the finite points of `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f64; 3]>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand(p);
        }
        bbox
    }

    /// Inclusive containment test. NaN coordinates are never contained.
    #[inline]
    pub fn contains(&self, point: &[f64; 3]) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// Returns true if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        (0..3).all(|axis| other.min[axis] >= self.min[axis] && other.max[axis] <= self.max[axis])
    }

    /// Returns true if the two boxes share at least one point.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        (0..3).all(|axis| other.min[axis] <= self.max[axis] && other.max[axis] >= self.min[axis])
    }

    /// Squared distance from `point` to the closest point of the box.
    ///
    /// Zero when the point is inside.
    #[inline]
    pub fn squared_distance_to(&self, point: &[f64; 3]) -> f64 {
        let mut d = 0.0;
        for (axis, &v) in point.iter().enumerate() {
            let gap = if v < self.min[axis] {
                self.min[axis] - v
            } else if v > self.max[axis] {
                v - self.max[axis]
            } else {
                0.0
            };
            d += gap * gap;
        }
        d
    }

    /// Index of the axis with the largest extent.
    pub fn widest_axis(&self) -> usize {
        let extent = |axis: usize| self.max[axis] - self.min[axis];
        let mut best = 0;
        for axis in 1..3 {
            if extent(axis) > extent(best) {
                best = axis;
            }
        }
        best
    }
}
