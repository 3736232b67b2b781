//! Row-major 2D scalar grids used for the intensity and depth fields

use nalgebra::RealField;

use crate::Real;

/// A dense, row-major grid of scalar values with `width * height` cells
///
/// The same storage is used for the intensity grid produced by the image
/// normalizer (values in `0..=255`) and for the depth grid produced by the
/// depth estimator (values in `[0, 1]`). A cell is addressed by its column
/// `x` and row `y`, the flat index of a cell is `y * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarGrid2d<R: Real> {
    width: usize,
    height: usize,
    data: Vec<R>,
}

impl<R: Real> ScalarGrid2d<R> {
    /// Constructs a grid of the given dimensions with all cells set to zero
    pub fn new_zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![R::zero(); width * height],
        }
    }

    /// Constructs a grid from an existing row-major data vector
    ///
    /// Panics if the length of the data vector does not match the grid dimensions.
    pub fn from_vec(width: usize, height: usize, data: Vec<R>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "grid data length has to match width * height"
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// Returns the number of columns of the grid
    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows of the grid
    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns whether the grid has a zero dimension (i.e. contains no cells)
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the flat (row-major) index of the cell in column `x` and row `y`
    #[inline(always)]
    pub fn flat_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Returns the value of the cell in column `x` and row `y`
    #[inline(always)]
    pub fn get(&self, x: usize, y: usize) -> R {
        self.data[self.flat_index(x, y)]
    }

    /// Sets the value of the cell in column `x` and row `y`
    #[inline(always)]
    pub fn set(&mut self, x: usize, y: usize, value: R) {
        let index = self.flat_index(x, y);
        self.data[index] = value;
    }

    /// Returns the row-major slice of all cell values
    #[inline(always)]
    pub fn data(&self) -> &[R] {
        self.data.as_slice()
    }

    /// Returns the largest cell value of the grid, or zero for an empty grid
    pub fn max_value(&self) -> R {
        self.data.iter().copied().fold(R::zero(), RealField::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_indexing_is_row_major() {
        let mut grid = ScalarGrid2d::<f64>::new_zeros(3, 2);
        grid.set(2, 1, 7.0);

        assert_eq!(grid.flat_index(2, 1), 5);
        assert_eq!(grid.get(2, 1), 7.0);
        assert_eq!(grid.data()[5], 7.0);
    }

    #[test]
    fn test_grid_max_value() {
        let grid = ScalarGrid2d::from_vec(2, 2, vec![0.25, 1.0, 0.5, 0.75]);
        assert_eq!(grid.max_value(), 1.0);

        let empty = ScalarGrid2d::<f32>::new_zeros(0, 0);
        assert!(empty.is_empty());
        assert_eq!(empty.max_value(), 0.0);
    }
}
