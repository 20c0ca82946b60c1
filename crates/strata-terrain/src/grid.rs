//! Dense row-major grids backing the noise, height and color fields.
//!
//! Every grid holds exactly `width * depth` cells and addresses cell `(x, y)`
//! at flat index `x + y * width`.

use std::ops::{Index, IndexMut};

use crate::color::{MISSING_COLOR, Rgb};
use crate::error::TerrainError;

/// A `width × depth` buffer stored in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    depth: usize,
    cells: Vec<T>,
}

/// Per-tile normalized noise samples in `[0, 1]`.
pub type NoiseField = Grid<f32>;

/// Terrain heights; in `[0, 1]` once synthesis has finished.
pub type HeightField = Grid<f32>;

/// Surface colors. `None` marks a cell no color rule classified.
pub type ColorField = Grid<Option<Rgb>>;

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`.
    pub fn filled(width: usize, depth: usize, value: T) -> Self {
        Self {
            width,
            depth,
            cells: vec![value; width * depth],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap an existing buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::FieldSizeMismatch`] if `cells.len() != width * depth`.
    pub fn from_vec(width: usize, depth: usize, cells: Vec<T>) -> Result<Self, TerrainError> {
        let expected = width * depth;
        if cells.len() != expected {
            return Err(TerrainError::FieldSizeMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            depth,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// `(width, depth)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.depth)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat index of cell `(x, y)`.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    /// Grid coordinates of a flat index.
    #[inline]
    pub fn coords_of(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.depth {
            self.cells.get(self.index_of(x, y))
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }
}

impl<T> Index<usize> for Grid<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.cells[index]
    }
}

impl<T> IndexMut<usize> for Grid<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.cells[index]
    }
}

impl Grid<Option<Rgb>> {
    /// Color at `index`, substituting [`MISSING_COLOR`] for unclassified cells.
    pub fn resolved(&self, index: usize) -> Rgb {
        self.cells[index].unwrap_or(MISSING_COLOR)
    }

    /// Number of cells without a color.
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_indexing() {
        let grid: Grid<u32> = Grid::from_vec(3, 2, (0..6).collect()).unwrap();
        assert_eq!(grid.index_of(2, 1), 5);
        assert_eq!(grid.coords_of(4), (1, 1));
        assert_eq!(grid.get(1, 1), Some(&4));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let result = Grid::from_vec(4, 4, vec![0.0_f32; 15]);
        assert!(matches!(
            result,
            Err(TerrainError::FieldSizeMismatch {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn test_missing_colors_resolve_to_sentinel() {
        let mut colors: ColorField = Grid::filled(2, 1, None);
        colors[1] = Some(Rgb::from_u8(1, 2, 3));
        assert_eq!(colors.resolved(0), MISSING_COLOR);
        assert_eq!(colors.resolved(1), Rgb::from_u8(1, 2, 3));
        assert_eq!(colors.missing_count(), 1);
    }
}
