//! Dense 3D voxel grids.
//!
//! Every grid in volmesh stores its samples x-fastest: voxel `(x, y, z)` lives at
//! flat index `x + nx * (y + ny * z)`. This is also the memory order of a
//! C-ordered `(z, y, x)` array, which is how most imaging toolkits hand volumes
//! over. [`ScalarGrid::from_zyx`] is the single place where a `(z, y, x)` shape is
//! turned into [`Dims`]; loaders must go through it rather than reversing shapes
//! themselves.

use glam::Vec3;

use crate::error::{Result, VolmeshError};

/// Grid extents along each axis, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dims {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl Dims {
    /// Creates a new extent triple.
    #[must_use]
    pub const fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// Total number of samples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Returns true if any axis has zero extent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of voxel `(x, y, z)`.
    #[inline]
    #[must_use]
    pub const fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.nx * (y + self.ny * z)
    }

    /// Inverse of [`Dims::index`], `None` if `index` lies outside the grid.
    #[must_use]
    pub const fn coords(&self, index: usize) -> Option<[usize; 3]> {
        if index >= self.len() {
            return None;
        }
        let x = index % self.nx;
        let y = (index / self.nx) % self.ny;
        let z = index / (self.nx * self.ny);
        Some([x, y, z])
    }

    /// Number of marching-cubes cells (`(nx-1)(ny-1)(nz-1)`, zero if any axis < 2).
    #[must_use]
    pub const fn num_cells(&self) -> usize {
        self.nx.saturating_sub(1) * self.ny.saturating_sub(1) * self.nz.saturating_sub(1)
    }
}

impl std::fmt::Display for Dims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.nx, self.ny, self.nz)
    }
}

/// Read access to a sampled scalar field, as consumed by the isosurface extractor.
pub trait ScalarField {
    /// Grid extents.
    fn dims(&self) -> Dims;

    /// Physical size of one voxel along each axis.
    fn spacing(&self) -> Vec3;

    /// Sample at a flat (x-fastest) index.
    fn sample(&self, index: usize) -> f32;

    /// Smallest and largest finite sample, `None` if there is none.
    fn value_range(&self) -> Option<(f32, f32)> {
        (0..self.dims().len())
            .map(|i| self.sample(i))
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((v.min(lo), v.max(hi))),
            })
    }
}

/// A dense grid of floating-point samples.
///
/// Integer volumes are widened to `f32` by the loaders.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    dims: Dims,
    values: Vec<f32>,
    spacing: Vec3,
}

impl ScalarGrid {
    /// Creates a grid from x-fastest samples with unit spacing.
    ///
    /// Fails with [`VolmeshError::SizeMismatch`] if `values.len()` is not `dims.len()`.
    pub fn new(dims: Dims, values: Vec<f32>) -> Result<Self> {
        if values.len() != dims.len() {
            return Err(VolmeshError::SizeMismatch {
                expected: dims.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            dims,
            values,
            spacing: Vec3::ONE,
        })
    }

    /// Creates a grid from a C-ordered `(z, y, x)` array with voxel size
    /// `spacing` given in `(x, y, z)` order.
    ///
    /// The buffer is already x-fastest, so only the shape triple is reversed.
    pub fn from_zyx(shape_zyx: [usize; 3], values: Vec<f32>, spacing: Vec3) -> Result<Self> {
        let [nz, ny, nx] = shape_zyx;
        Ok(Self::new(Dims::new(nx, ny, nz), values)?.with_spacing(spacing))
    }

    /// Creates a grid by evaluating `f(x, y, z)` at every voxel.
    #[must_use]
    pub fn from_fn(dims: Dims, mut f: impl FnMut(usize, usize, usize) -> f32) -> Self {
        let mut values = Vec::with_capacity(dims.len());
        for z in 0..dims.nz {
            for y in 0..dims.ny {
                for x in 0..dims.nx {
                    values.push(f(x, y, z));
                }
            }
        }
        Self {
            dims,
            values,
            spacing: Vec3::ONE,
        }
    }

    /// Sets the physical voxel size.
    #[must_use]
    pub fn with_spacing(mut self, spacing: Vec3) -> Self {
        self.spacing = spacing;
        self
    }

    /// Grid extents.
    #[must_use]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Physical voxel size.
    #[must_use]
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Samples in x-fastest order.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the grid has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sample at voxel `(x, y, z)`.
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.values[self.dims.index(x, y, z)]
    }

    /// Smallest and largest sample, or `None` for an empty grid.
    #[must_use]
    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.values.is_empty() {
            return None;
        }
        Some(
            self.values
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                }),
        )
    }

    /// Returns a grid with the same geometry and every sample mapped through `f`.
    #[must_use]
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            dims: self.dims,
            values: self.values.iter().map(|&v| f(v)).collect(),
            spacing: self.spacing,
        }
    }
}

impl ScalarField for ScalarGrid {
    fn dims(&self) -> Dims {
        self.dims
    }

    fn spacing(&self) -> Vec3 {
        self.spacing
    }

    #[inline]
    fn sample(&self, index: usize) -> f32 {
        self.values[index]
    }
}

/// A grid whose samples are restricted to `0` (background) and `1` (foreground).
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryGrid {
    dims: Dims,
    mask: Vec<u8>,
    spacing: Vec3,
}

impl BinaryGrid {
    /// Creates a binary grid from x-fastest mask values.
    ///
    /// Fails if the length is wrong or any value is not 0 or 1.
    pub fn new(dims: Dims, mask: Vec<u8>) -> Result<Self> {
        if mask.len() != dims.len() {
            return Err(VolmeshError::SizeMismatch {
                expected: dims.len(),
                actual: mask.len(),
            });
        }
        if let Some(bad) = mask.iter().find(|&&m| m > 1) {
            return Err(VolmeshError::InvalidArgument(format!(
                "binary mask contains value {bad}"
            )));
        }
        Ok(Self {
            dims,
            mask,
            spacing: Vec3::ONE,
        })
    }

    /// Classifies every sample of `grid` with `is_foreground`, keeping its geometry.
    #[must_use]
    pub fn from_predicate(grid: &ScalarGrid, is_foreground: impl Fn(f32) -> bool) -> Self {
        Self {
            dims: grid.dims(),
            mask: grid
                .values()
                .iter()
                .map(|&v| u8::from(is_foreground(v)))
                .collect(),
            spacing: grid.spacing(),
        }
    }

    /// Sets the physical voxel size.
    #[must_use]
    pub fn with_spacing(mut self, spacing: Vec3) -> Self {
        self.spacing = spacing;
        self
    }

    /// Grid extents.
    #[must_use]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Physical voxel size.
    #[must_use]
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Mask values in x-fastest order.
    #[must_use]
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Mask value at voxel `(x, y, z)`.
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.mask[self.dims.index(x, y, z)]
    }

    /// Number of foreground voxels.
    #[must_use]
    pub fn foreground_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m == 1).count()
    }
}

impl ScalarField for BinaryGrid {
    fn dims(&self) -> Dims {
        self.dims
    }

    fn spacing(&self) -> Vec3 {
        self.spacing
    }

    #[inline]
    fn sample(&self, index: usize) -> f32 {
        f32::from(self.mask[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_x_fastest() {
        let dims = Dims::new(4, 3, 2);
        assert_eq!(dims.index(1, 0, 0), 1);
        assert_eq!(dims.index(0, 1, 0), 4);
        assert_eq!(dims.index(0, 0, 1), 12);
        assert_eq!(dims.coords(dims.index(3, 2, 1)), Some([3, 2, 1]));
        assert_eq!(dims.coords(24), None);
    }

    #[test]
    fn test_coords_of_empty_dims() {
        assert_eq!(Dims::new(0, 3, 2).coords(0), None);
        assert_eq!(Dims::new(4, 0, 2).coords(5), None);
    }

    #[test]
    fn test_num_cells() {
        assert_eq!(Dims::new(4, 4, 4).num_cells(), 27);
        assert_eq!(Dims::new(1, 4, 4).num_cells(), 0);
    }

    #[test]
    fn test_size_mismatch() {
        let err = ScalarGrid::new(Dims::new(2, 2, 2), vec![0.0; 7]).unwrap_err();
        assert!(matches!(
            err,
            VolmeshError::SizeMismatch {
                expected: 8,
                actual: 7
            }
        ));
    }

    #[test]
    fn test_from_zyx_reverses_shape_only() {
        // C-ordered (z=2, y=1, x=3): x varies fastest in the buffer.
        let values = vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0];
        let spacing = Vec3::new(0.5, 1.0, 2.0);
        let grid = ScalarGrid::from_zyx([2, 1, 3], values, spacing).unwrap();
        assert_eq!(grid.dims(), Dims::new(3, 1, 2));
        assert_eq!(grid.spacing(), spacing);
        assert_eq!(grid.get(2, 0, 0), 2.0);
        assert_eq!(grid.get(0, 0, 1), 10.0);
    }

    #[test]
    fn test_from_fn_matches_get() {
        let dims = Dims::new(3, 4, 5);
        #[allow(clippy::cast_precision_loss)]
        let grid = ScalarGrid::from_fn(dims, |x, y, z| (x + 10 * y + 100 * z) as f32);
        assert_eq!(grid.get(2, 3, 4), 432.0);
        assert_eq!(grid.len(), 60);
    }

    #[test]
    fn test_min_max() {
        let grid = ScalarGrid::new(Dims::new(3, 1, 1), vec![2.0, -1.0, 5.0]).unwrap();
        assert_eq!(grid.min_max(), Some((-1.0, 5.0)));
        let empty = ScalarGrid::new(Dims::new(0, 1, 1), vec![]).unwrap();
        assert_eq!(empty.min_max(), None);
    }

    #[test]
    fn test_value_range() {
        let grid = ScalarGrid::new(Dims::new(4, 1, 1), vec![2.0, -1.0, 5.0, 0.0]).unwrap();
        assert_eq!(grid.value_range(), Some((-1.0, 5.0)));

        let mask = BinaryGrid::new(Dims::new(3, 1, 1), vec![0, 0, 0]).unwrap();
        assert_eq!(mask.value_range(), Some((0.0, 0.0)));
        let mask = BinaryGrid::new(Dims::new(2, 1, 1), vec![1, 0]).unwrap();
        assert_eq!(mask.value_range(), Some((0.0, 1.0)));
        let empty = BinaryGrid::new(Dims::new(0, 0, 0), vec![]).unwrap();
        assert_eq!(empty.value_range(), None);
    }

    #[test]
    fn test_binary_grid_rejects_non_binary() {
        assert!(BinaryGrid::new(Dims::new(2, 1, 1), vec![0, 2]).is_err());
        let grid = BinaryGrid::new(Dims::new(2, 1, 1), vec![0, 1]).unwrap();
        assert_eq!(grid.foreground_count(), 1);
        assert_eq!(grid.sample(1), 1.0);
    }
}
