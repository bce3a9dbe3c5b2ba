use std::sync::Arc;

use ptcloud_index::{is_finite_point, BoundingBox};

use crate::cache::{next_generation, IndexCache};
use crate::{IndexConfig, PointSetError};

/// How the points of a [`PointSet`] are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Organization {
    /// A flat list of points.
    #[default]
    Unorganized,
    /// A `rows x cols` grid stored in row-major order, e.g. a back-projected depth map.
    Organized {
        /// Number of grid rows.
        rows: usize,
        /// Number of grid columns.
        cols: usize,
    },
}

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    /// Position of the axis in a coordinate triple.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A set of 3d points with optional per-point colors and normals.
///
/// The point set is a value: selections and filters return new point sets.
/// The coordinate buffer is shared between clones and indexed on demand by
/// the query methods; replacing it through [`PointSet::set_points`] drops
/// the cached index.
///
/// A `PointSet` is `Send + Sync`. The lazy index build runs at most once per
/// coordinate buffer, even under concurrent first queries.
#[derive(Debug, Clone)]
pub struct PointSet {
    points: Arc<[[f64; 3]]>,
    // identifies `points`; the cached index records the one it was built from
    generation: u64,
    colors: Option<Vec<[u8; 3]>>,
    normals: Option<Vec<[f64; 3]>>,
    organization: Organization,
    config: IndexConfig,
    index: IndexCache,
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), PointSetError> {
    if expected != actual {
        return Err(PointSetError::ShapeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

impl PointSet {
    /// Create a flat point set from points, colors (optional), and normals (optional).
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::ShapeMismatch`] if colors or normals are not
    /// exactly one per point.
    pub fn new(
        points: Vec<[f64; 3]>,
        colors: Option<Vec<[u8; 3]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Result<Self, PointSetError> {
        Self::with_organization(points, colors, normals, Organization::Unorganized)
    }

    /// Create an organized point set from row-major `rows x cols` arrays.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::ShapeMismatch`] if any array does not hold
    /// exactly `rows * cols` entries.
    pub fn from_grid(
        rows: usize,
        cols: usize,
        points: Vec<[f64; 3]>,
        colors: Option<Vec<[u8; 3]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Result<Self, PointSetError> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            PointSetError::InvalidArgument(format!("grid of {rows}x{cols} points is too large"))
        })?;
        check_len("points", expected, points.len())?;
        Self::with_organization(points, colors, normals, Organization::Organized { rows, cols })
    }

    /// Create a flat point set from interleaved `x, y, z` coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::ShapeMismatch`] if the length of `data` is not
    /// a multiple of 3 or the attributes do not match the point count.
    pub fn from_interleaved(
        data: &[f64],
        colors: Option<Vec<[u8; 3]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Result<Self, PointSetError> {
        if data.len() % 3 != 0 {
            return Err(PointSetError::ShapeMismatch {
                what: "interleaved coordinates",
                expected: data.len().div_ceil(3) * 3,
                actual: data.len(),
            });
        }
        let points = data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self::new(points, colors, normals)
    }

    fn with_organization(
        points: Vec<[f64; 3]>,
        colors: Option<Vec<[u8; 3]>>,
        normals: Option<Vec<[f64; 3]>>,
        organization: Organization,
    ) -> Result<Self, PointSetError> {
        if let Some(colors) = &colors {
            check_len("colors", points.len(), colors.len())?;
        }
        if let Some(normals) = &normals {
            check_len("normals", points.len(), normals.len())?;
        }
        Ok(Self {
            points: points.into(),
            generation: next_generation(),
            colors,
            normals,
            organization,
            config: IndexConfig::default(),
            index: IndexCache::default(),
        })
    }

    /// Replaces the index configuration, dropping any cached index.
    pub fn with_index_config(mut self, config: IndexConfig) -> Self {
        self.config = config;
        self.index.invalidate();
        self
    }

    /// The index configuration.
    pub fn index_config(&self) -> &IndexConfig {
        &self.config
    }

    /// Get the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Total number of points, `rows * cols` for organized sets.
    #[inline]
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Check if the point set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the point coordinates.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get the coordinates of one point.
    pub fn point(&self, index: usize) -> Option<[f64; 3]> {
        self.points.get(index).copied()
    }

    /// Get as reference the colors of the points.
    pub fn colors(&self) -> Option<&[[u8; 3]]> {
        self.colors.as_deref()
    }

    /// Get as reference the normals of the points.
    pub fn normals(&self) -> Option<&[[f64; 3]]> {
        self.normals.as_deref()
    }

    /// Returns true if the points carry colors.
    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Returns true if the points carry normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// The layout of the points.
    pub fn organization(&self) -> Organization {
        self.organization
    }

    /// Returns true for grid-organized point sets.
    pub fn is_organized(&self) -> bool {
        matches!(self.organization, Organization::Organized { .. })
    }

    /// Row-major flat index of the grid cell at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::OrganizedOnlyOperation`] on a flat point set and
    /// [`PointSetError::InvalidArgument`] if the cell is outside the grid.
    pub fn grid_index(&self, row: usize, col: usize) -> Result<usize, PointSetError> {
        let Organization::Organized { rows, cols } = self.organization else {
            return Err(PointSetError::OrganizedOnlyOperation("grid indexing"));
        };
        if row >= rows || col >= cols {
            return Err(PointSetError::InvalidArgument(format!(
                "grid cell ({row}, {col}) outside a {rows}x{cols} grid"
            )));
        }
        Ok(row * cols + col)
    }

    /// Bounding box of the points with finite coordinates.
    ///
    /// The box is empty when no point is finite.
    pub fn limits(&self) -> BoundingBox {
        BoundingBox::from_points(self.points.iter())
    }

    /// `(min, max)` along `axis` over the points with finite coordinates, or
    /// `None` if there is no such point.
    pub fn bounds(&self, axis: Axis) -> Option<(f64, f64)> {
        let limits = self.limits();
        if limits.is_empty() {
            return None;
        }
        let i = axis.index();
        Some((limits.min[i], limits.max[i]))
    }

    /// Returns a flat point set with the points at `indices`, in that order.
    ///
    /// Duplicate indices produce duplicate points.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::InvalidArgument`] if an index is out of range.
    pub fn select(&self, indices: &[usize]) -> Result<Self, PointSetError> {
        let n = self.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
            return Err(PointSetError::InvalidArgument(format!(
                "index {bad} out of range for {n} points"
            )));
        }

        Ok(self.gather(indices))
    }

    /// Returns a flat point set with the grid cells `(rows[i], cols[i])`.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::OrganizedOnlyOperation`] on a flat point set and
    /// [`PointSetError::InvalidArgument`] if the lists differ in length or a
    /// cell is outside the grid.
    pub fn select_grid(&self, rows: &[usize], cols: &[usize]) -> Result<Self, PointSetError> {
        if !self.is_organized() {
            return Err(PointSetError::OrganizedOnlyOperation("row/column selection"));
        }
        if rows.len() != cols.len() {
            return Err(PointSetError::InvalidArgument(format!(
                "{} rows but {} columns",
                rows.len(),
                cols.len()
            )));
        }
        let indices = rows
            .iter()
            .zip(cols)
            .map(|(&r, &c)| self.grid_index(r, c))
            .collect::<Result<Vec<_>, _>>()?;
        self.select(&indices)
    }

    /// Returns a flat point set without the points that have a NaN or
    /// infinite coordinate.
    pub fn remove_invalid(&self) -> Self {
        self.remove_invalid_with_indices().0
    }

    /// Like [`PointSet::remove_invalid`], also returning the indices of the
    /// kept points in this set.
    pub fn remove_invalid_with_indices(&self) -> (Self, Vec<usize>) {
        let kept: Vec<usize> = self
            .points
            .iter()
            .enumerate()
            .filter(|(_, p)| is_finite_point(p))
            .map(|(i, _)| i)
            .collect();

        log::trace!("kept {} of {} points", kept.len(), self.len());

        (self.gather(&kept), kept)
    }

    /// Replaces the colors. `None` removes them.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::ShapeMismatch`] unless there is one color per point.
    pub fn set_colors(&mut self, colors: Option<Vec<[u8; 3]>>) -> Result<(), PointSetError> {
        if let Some(colors) = &colors {
            check_len("colors", self.len(), colors.len())?;
        }
        self.colors = colors;
        Ok(())
    }

    /// Replaces the normals. `None` removes them.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::ShapeMismatch`] unless there is one normal per point.
    pub fn set_normals(&mut self, normals: Option<Vec<[f64; 3]>>) -> Result<(), PointSetError> {
        if let Some(normals) = &normals {
            check_len("normals", self.len(), normals.len())?;
        }
        self.normals = normals;
        Ok(())
    }

    /// Replaces the coordinate buffer and drops the cached index.
    ///
    /// # Errors
    ///
    /// Returns [`PointSetError::ShapeMismatch`] if the new point count breaks
    /// the grid shape or the present colors or normals.
    pub fn set_points(&mut self, points: Vec<[f64; 3]>) -> Result<(), PointSetError> {
        if let Organization::Organized { rows, cols } = self.organization {
            check_len("points", rows * cols, points.len())?;
        }
        if let Some(colors) = &self.colors {
            check_len("points", colors.len(), points.len())?;
        }
        if let Some(normals) = &self.normals {
            check_len("points", normals.len(), points.len())?;
        }
        self.points = points.into();
        self.generation = next_generation();
        self.index.invalidate();
        Ok(())
    }

    // flat copy of the points at `indices`, which must all be in range
    fn gather(&self, indices: &[usize]) -> Self {
        let points: Vec<[f64; 3]> = indices.iter().map(|&i| self.points[i]).collect();
        let colors = self
            .colors
            .as_ref()
            .map(|c| indices.iter().map(|&i| c[i]).collect());
        let normals = self
            .normals
            .as_ref()
            .map(|nrm| indices.iter().map(|&i| nrm[i]).collect());

        Self {
            points: points.into(),
            generation: next_generation(),
            colors,
            normals,
            organization: Organization::Unorganized,
            config: self.config,
            index: IndexCache::default(),
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn index_cache(&self) -> &IndexCache {
        &self.index
    }
}

impl PartialEq for PointSet {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
            && self.colors == other.colors
            && self.normals == other.normals
            && self.organization == other.organization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Result<PointSet, PointSetError> {
        PointSet::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [5.0, 5.0, 5.0],
            ],
            Some(vec![[255, 0, 0], [0, 255, 0], [0, 0, 255], [9, 9, 9]]),
            None,
        )
    }

    #[test]
    fn test_pointset_smoke() -> Result<(), PointSetError> {
        let ps = square()?;
        assert_eq!(ps.len(), 4);
        assert_eq!(ps.count(), 4);
        assert!(ps.has_colors());
        assert!(!ps.has_normals());
        assert!(!ps.is_organized());
        assert_eq!(ps.point(3), Some([5.0, 5.0, 5.0]));
        assert_eq!(ps.point(4), None);
        Ok(())
    }

    #[test]
    fn test_color_length_mismatch() {
        let res = PointSet::new(vec![[0.0; 3]; 5], Some(vec![[0; 3]; 4]), None);
        assert_eq!(
            res.err(),
            Some(PointSetError::ShapeMismatch {
                what: "colors",
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn test_normal_length_mismatch() {
        let res = PointSet::new(vec![[0.0; 3]; 2], None, Some(vec![[0.0; 3]; 3]));
        assert!(matches!(
            res,
            Err(PointSetError::ShapeMismatch { what: "normals", .. })
        ));
    }

    #[test]
    fn test_from_interleaved() -> Result<(), PointSetError> {
        let ps = PointSet::from_interleaved(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], None, None)?;
        assert_eq!(ps.points(), &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

        let res = PointSet::from_interleaved(&[1.0, 2.0, 3.0, 4.0], None, None);
        assert!(matches!(
            res,
            Err(PointSetError::ShapeMismatch { expected: 6, actual: 4, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_grid_construction_and_indexing() -> Result<(), PointSetError> {
        let points = (0..6).map(|i| [i as f64, 0.0, 0.0]).collect();
        let ps = PointSet::from_grid(2, 3, points, None, None)?;
        assert_eq!(ps.organization(), Organization::Organized { rows: 2, cols: 3 });
        assert_eq!(ps.count(), 6);
        assert_eq!(ps.grid_index(1, 2)?, 5);
        assert!(matches!(
            ps.grid_index(2, 0),
            Err(PointSetError::InvalidArgument(_))
        ));

        let res = PointSet::from_grid(2, 3, vec![[0.0; 3]; 5], None, None);
        assert!(matches!(
            res,
            Err(PointSetError::ShapeMismatch { what: "points", .. })
        ));
        Ok(())
    }

    #[test]
    fn test_grid_operations_on_flat_set() -> Result<(), PointSetError> {
        let ps = square()?;
        assert_eq!(
            ps.grid_index(0, 0),
            Err(PointSetError::OrganizedOnlyOperation("grid indexing"))
        );
        assert!(matches!(
            ps.select_grid(&[0], &[0]),
            Err(PointSetError::OrganizedOnlyOperation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_select_grid_pairs() -> Result<(), PointSetError> {
        let points = (0..6).map(|i| [i as f64, 0.0, 0.0]).collect();
        let ps = PointSet::from_grid(2, 3, points, None, None)?;
        let sel = ps.select_grid(&[1, 0], &[0, 2])?;
        assert_eq!(sel.points(), &[[3.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        assert!(!sel.is_organized());

        assert!(matches!(
            ps.select_grid(&[1, 0], &[0]),
            Err(PointSetError::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn test_select_keeps_attributes_and_duplicates() -> Result<(), PointSetError> {
        let ps = square()?;
        let sel = ps.select(&[2, 2, 0])?;
        assert_eq!(sel.points(), &[[0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]);
        assert_eq!(sel.colors(), Some(&[[0, 0, 255], [0, 0, 255], [255, 0, 0]][..]));
        assert!(sel.normals().is_none());

        assert!(matches!(ps.select(&[4]), Err(PointSetError::InvalidArgument(_))));
        Ok(())
    }

    #[test]
    fn test_bounds_skip_non_finite() -> Result<(), PointSetError> {
        let ps = PointSet::new(
            vec![[1.0, -2.0, 3.0], [f64::NAN, 100.0, 0.0], [-1.0, 4.0, f64::INFINITY], [0.0, 0.0, 0.0]],
            None,
            None,
        )?;
        assert_eq!(ps.bounds(Axis::X), Some((0.0, 1.0)));
        assert_eq!(ps.bounds(Axis::Y), Some((-2.0, 0.0)));
        assert_eq!(ps.bounds(Axis::Z), Some((0.0, 3.0)));

        let invalid = PointSet::new(vec![[f64::NAN; 3]], None, None)?;
        assert_eq!(invalid.bounds(Axis::X), None);
        assert!(invalid.limits().is_empty());
        Ok(())
    }

    #[test]
    fn test_remove_invalid() -> Result<(), PointSetError> {
        let points = vec![
            [0.0, 0.0, 0.0],
            [f64::NAN, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            [0.0, f64::NEG_INFINITY, 0.0],
        ];
        let ps = PointSet::from_grid(2, 2, points, None, Some(vec![[0.0, 0.0, 1.0]; 4]))?;
        let (valid, kept) = ps.remove_invalid_with_indices();
        assert_eq!(kept, vec![0, 2]);
        assert_eq!(valid.points(), &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        assert_eq!(valid.normals().map(|n| n.len()), Some(2));
        assert_eq!(valid.organization(), Organization::Unorganized);
        assert_eq!(valid.remove_invalid(), valid);
        Ok(())
    }

    #[test]
    fn test_attribute_replacement() -> Result<(), PointSetError> {
        let mut ps = square()?;
        ps.set_normals(Some(vec![[0.0, 0.0, 1.0]; 4]))?;
        assert!(ps.has_normals());
        assert!(ps.set_colors(Some(vec![[0; 3]; 3])).is_err());
        assert_eq!(ps.colors().map(|c| c.len()), Some(4));
        ps.set_colors(None)?;
        assert!(!ps.has_colors());
        Ok(())
    }

    #[test]
    fn test_set_points_checks_shape_and_renews_buffer() -> Result<(), PointSetError> {
        let mut ps = square()?;
        let generation = ps.generation();
        assert!(ps.set_points(vec![[0.0; 3]; 3]).is_err());
        assert_eq!(ps.generation(), generation);

        ps.set_points(vec![[2.0; 3]; 4])?;
        assert_ne!(ps.generation(), generation);
        assert_eq!(ps.point(0), Some([2.0; 3]));
        Ok(())
    }

    #[test]
    fn test_clone_shares_buffer() -> Result<(), PointSetError> {
        let ps = square()?;
        let copy = ps.clone();
        assert_eq!(copy.generation(), ps.generation());
        assert_eq!(copy, ps);
        Ok(())
    }
}
