//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell can be empty or filled with a ball color.
//! Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//! Match results use `(row, col)`, i.e. `(y, x)`.

use arrayvec::ArrayVec;

use crate::error::PlacementError;
use crate::types::{BallColor, Cell, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
pub const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Row-major grid of wire color ids (0 = empty).
pub type U8Grid = [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Build a board from a grid of color ids. Ids outside the palette become empty cells.
    pub fn from_grid(grid: &U8Grid) -> Self {
        let mut board = Self::new();
        for (y, row) in grid.iter().enumerate() {
            for (x, &id) in row.iter().enumerate() {
                board.set(x as i8, y as i8, BallColor::new(id));
            }
        }
        board
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    #[inline]
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Empty a single cell. Returns true if a ball was removed.
    pub fn clear_cell(&mut self, x: i8, y: i8) -> bool {
        match Self::index(x, y) {
            Some(idx) => self.cells[idx].take().is_some(),
            None => false,
        }
    }

    /// Check if position is valid (within bounds and empty)
    #[inline]
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if position is out of bounds
    pub fn is_out_of_bounds(&self, x: i8, y: i8) -> bool {
        Self::index(x, y).is_none()
    }

    /// Write a set of balls onto the board.
    ///
    /// All targets are validated before anything is written, so a failed placement
    /// leaves the board untouched.
    pub fn place(&mut self, balls: &[(i8, i8, BallColor)]) -> Result<(), PlacementError> {
        for &(x, y, _) in balls {
            match self.get(x, y) {
                None => return Err(PlacementError::OutOfBounds { x, y }),
                Some(Some(_)) => return Err(PlacementError::Occupied { x, y }),
                Some(None) => {}
            }
        }

        for &(x, y, color) in balls {
            self.set(x, y, Some(color));
        }

        Ok(())
    }

    /// Drop every ball of column `x` to the bottom, keeping their vertical order.
    /// Returns true if any ball moved.
    pub fn compact_column(&mut self, x: i8) -> bool {
        if x < 0 || x >= BOARD_WIDTH as i8 {
            return false;
        }

        // Bottom to top.
        let mut balls = ArrayVec::<BallColor, { BOARD_HEIGHT as usize }>::new();
        for y in (0..BOARD_HEIGHT as i8).rev() {
            if let Some(Some(color)) = self.get(x, y) {
                balls.push(color);
            }
        }

        let mut moved = false;
        for (i, y) in (0..BOARD_HEIGHT as i8).rev().enumerate() {
            let cell = balls.get(i).copied();
            if self.get(x, y) != Some(cell) {
                moved = true;
                self.set(x, y, cell);
            }
        }
        moved
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Copy the board into a grid of wire color ids.
    pub fn write_u8_grid(&self, out: &mut U8Grid) {
        let width = BOARD_WIDTH as usize;
        for (y, row) in out.iter_mut().enumerate() {
            let start = y * width;
            for (x, v) in row.iter_mut().enumerate() {
                *v = crate::types::cell_to_u8(self.cells[start + x]);
            }
        }
    }

    pub fn to_u8_grid(&self) -> U8Grid {
        let mut grid = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        self.write_u8_grid(&mut grid);
        grid
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
