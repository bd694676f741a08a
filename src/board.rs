//! Game board representation and collision detection

use crate::piece::{ColorKey, MAX_COLOR_KEY, Piece};
use serde::Serialize;

/// Standard Tetris board dimensions
pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 10;

/// Value of an unoccupied cell
pub const EMPTY: ColorKey = 0;

/// The game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    num_rows: usize,
    num_cols: usize,
    /// Grid stored as [row][col], row 0 is the top
    grid: Vec<Vec<ColorKey>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl Board {
    /// Create a new empty board
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            grid: vec![vec![EMPTY; num_cols]; num_rows],
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Convert signed coordinates to grid indices, None if out of bounds
    fn index(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.num_rows || col >= self.num_cols {
            return None;
        }
        Some((row, col))
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<ColorKey> {
        self.index(row, col).map(|(r, c)| self.grid[r][c])
    }

    /// Set a cell at a position
    /// Returns false if out of bounds or `key` is not a valid color key
    pub fn set(&mut self, row: i32, col: i32, key: ColorKey) -> bool {
        if key > MAX_COLOR_KEY {
            return false;
        }
        match self.index(row, col) {
            Some((r, c)) => {
                self.grid[r][c] = key;
                true
            }
            None => false,
        }
    }

    /// Rows top to bottom, for rendering
    pub fn rows(&self) -> impl Iterator<Item = &[ColorKey]> {
        self.grid.iter().map(|row| row.as_slice())
    }

    /// Check whether `piece` fits with its anchor at (target_row, target_col)
    pub fn can_place(&self, piece: &Piece, target_row: i32, target_col: i32) -> bool {
        piece
            .cells_at(target_row, target_col)
            .all(|(row, col)| self.get(row, col) == Some(EMPTY))
    }

    /// Write the piece's color key at its current position.
    /// No collision check: callers verify with `can_place` first.
    pub fn place_shape(&mut self, piece: &Piece) {
        let key = piece.color_key();
        for (row, col) in piece.block_positions() {
            self.set(row, col, key);
        }
    }

    /// Clear the cells under the piece at its current position
    pub fn remove_shape(&mut self, piece: &Piece) {
        for (row, col) in piece.block_positions() {
            self.set(row, col, EMPTY);
        }
    }

    /// Clear completed rows and return the number cleared
    pub fn clear_rows(&mut self) -> usize {
        // A zero-width row is vacuously full and would never stop clearing
        if self.num_cols == 0 {
            return 0;
        }

        let mut cleared = 0;
        let mut row = self.num_rows;

        // Scan bottom-up; after a removal the row above slides into the same
        // index, so only advance when the row is kept.
        while row > 0 {
            if self.is_row_full(row - 1) {
                self.grid.remove(row - 1);
                self.grid.insert(0, vec![EMPTY; self.num_cols]);
                cleared += 1;
            } else {
                row -= 1;
            }
        }

        cleared
    }

    /// Check if a row is completely filled
    fn is_row_full(&self, row: usize) -> bool {
        self.grid[row].iter().all(|&cell| cell != EMPTY)
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.grid
            .iter()
            .all(|row| row.iter().all(|&cell| cell == EMPTY))
    }
}
