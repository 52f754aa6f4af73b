//! Periodic 2D lattice with flat row-major indexing.

use crate::error::ConfigError;

/// A fixed-size `rows x cols` lattice with periodic wraparound on both
/// axes.
///
/// Sites are addressed either by `(row, col)` or by a flat row-major
/// index in `0..rows * cols`. All wraparound arithmetic for kernel
/// offsets goes through [`Grid2::wrap`], keeping the redistribution hot
/// path free of allocation and bounds surprises.
///
/// # Examples
///
/// ```
/// use epm_core::Grid2;
///
/// let grid = Grid2::new(4, 6).unwrap();
/// assert_eq!(grid.cell_count(), 24);
/// assert_eq!(grid.flat_index(1, 2), 8);
///
/// // Offsets wrap on both axes.
/// assert_eq!(grid.wrap(-1, 0), grid.flat_index(3, 0));
/// assert_eq!(grid.wrap(0, 6), grid.flat_index(0, 0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid2 {
    rows: u32,
    cols: u32,
}

impl Grid2 {
    /// Maximum extent per axis: coordinates use `i32` arithmetic.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Create a new periodic lattice.
    ///
    /// Returns `Err(ConfigError::EmptyLattice)` if either dimension is
    /// zero, or `Err(ConfigError::DimensionTooLarge)` if a dimension
    /// does not fit in `i32`.
    pub fn new(rows: u32, cols: u32) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyLattice);
        }
        if rows > Self::MAX_DIM {
            return Err(ConfigError::DimensionTooLarge {
                name: "rows",
                value: rows,
                max: Self::MAX_DIM,
            });
        }
        if cols > Self::MAX_DIM {
            return Err(ConfigError::DimensionTooLarge {
                name: "cols",
                value: cols,
                max: Self::MAX_DIM,
            });
        }
        Ok(Self { rows, cols })
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Total number of sites, `rows * cols`.
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Flat row-major index of an in-bounds `(row, col)` pair.
    pub fn flat_index(&self, row: u32, col: u32) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row as usize * self.cols as usize + col as usize
    }

    /// Decompose a flat index into `(row, col)`.
    pub fn coords(&self, index: usize) -> (u32, u32) {
        debug_assert!(index < self.cell_count());
        (
            (index / self.cols as usize) as u32,
            (index % self.cols as usize) as u32,
        )
    }

    /// Flat index of a possibly out-of-range `(row, col)`, wrapped
    /// periodically onto the lattice.
    pub fn wrap(&self, row: i32, col: i32) -> usize {
        let r = row.rem_euclid(self.rows as i32) as usize;
        let c = col.rem_euclid(self.cols as i32) as usize;
        r * self.cols as usize + c
    }

    /// Wrap a row coordinate only. Used to hoist the row component out
    /// of the inner kernel loop.
    pub fn wrap_row(&self, row: i32) -> usize {
        row.rem_euclid(self.rows as i32) as usize
    }

    /// Wrap a column coordinate only.
    pub fn wrap_col(&self, col: i32) -> usize {
        col.rem_euclid(self.cols as i32) as usize
    }
}
