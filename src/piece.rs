//! Piece matrices and the active falling piece

use crate::tetromino::TetrominoType;
use serde::Serialize;
use std::fmt;

/// A cell value: 0 is empty, 1-7 identify a shape's color
pub type ColorKey = u8;

/// Highest color key any cell may hold
pub const MAX_COLOR_KEY: ColorKey = 7;

/// Why a matrix was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidShapeError {
    /// No rows at all
    Empty,
    /// A row's length differs from the number of rows
    NotSquare { rows: usize, cols: usize },
    /// A cell value above the color-key range
    ColorOutOfRange(ColorKey),
    /// Every cell is empty
    NoOccupiedCells,
    /// Occupied cells disagree on their color key
    MixedColors { first: ColorKey, other: ColorKey },
}

impl fmt::Display for InvalidShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidShapeError::Empty => write!(f, "shape matrix has no rows"),
            InvalidShapeError::NotSquare { rows, cols } => {
                write!(f, "shape matrix must be square, got {rows} rows with a {cols}-wide row")
            }
            InvalidShapeError::ColorOutOfRange(value) => {
                write!(f, "cell value {value} is outside 0..={MAX_COLOR_KEY}")
            }
            InvalidShapeError::NoOccupiedCells => write!(f, "shape matrix has no occupied cells"),
            InvalidShapeError::MixedColors { first, other } => {
                write!(f, "shape matrix mixes color keys {first} and {other}")
            }
        }
    }
}

impl std::error::Error for InvalidShapeError {}

/// Square occupancy matrix, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrix {
    size: usize,
    cells: Vec<ColorKey>,
    #[serde(skip)]
    color_key: ColorKey,
}

impl Matrix {
    /// Build a matrix from rows, validating shape and colors
    pub fn from_rows<R: AsRef<[ColorKey]>>(rows: &[R]) -> Result<Self, InvalidShapeError> {
        let size = rows.len();
        if size == 0 {
            return Err(InvalidShapeError::Empty);
        }

        let mut cells = Vec::with_capacity(size * size);
        let mut color_key = None;
        for row in rows {
            let row = row.as_ref();
            if row.len() != size {
                return Err(InvalidShapeError::NotSquare {
                    rows: size,
                    cols: row.len(),
                });
            }
            for &value in row {
                if value > MAX_COLOR_KEY {
                    return Err(InvalidShapeError::ColorOutOfRange(value));
                }
                if value != 0 {
                    match color_key {
                        None => color_key = Some(value),
                        Some(first) if first != value => {
                            return Err(InvalidShapeError::MixedColors { first, other: value });
                        }
                        Some(_) => {}
                    }
                }
                cells.push(value);
            }
        }

        let color_key = color_key.ok_or(InvalidShapeError::NoOccupiedCells)?;
        Ok(Self {
            size,
            cells,
            color_key,
        })
    }

    /// Build from a trusted constant table (the shape catalog)
    pub(crate) fn from_array<const N: usize>(rows: [[ColorKey; N]; N]) -> Self {
        let cells: Vec<ColorKey> = rows.iter().flatten().copied().collect();
        let color_key = cells.iter().copied().find(|&v| v != 0).unwrap_or(0);
        Self {
            size: N,
            cells,
            color_key,
        }
    }

    /// Side length
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn color_key(&self) -> ColorKey {
        self.color_key
    }

    /// Cell value at (row, col) within the matrix
    pub fn get(&self, row: usize, col: usize) -> ColorKey {
        self.cells[row * self.size + col]
    }

    /// Iterate the (row, col) offsets of occupied cells
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0)
            .map(|(i, _)| (i / self.size, i % self.size))
    }

    /// Rows of the matrix, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[ColorKey]> {
        self.cells.chunks(self.size)
    }

    /// Rotate 90° clockwise in place: transpose, then reverse each row
    pub fn rotate_cw(&mut self) {
        let n = self.size;
        for i in 0..n {
            for j in (i + 1)..n {
                self.cells.swap(i * n + j, j * n + i);
            }
        }
        for row in self.cells.chunks_mut(n) {
            row.reverse();
        }
    }
}

/// A piece on (or about to be on) the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Piece {
    /// Current orientation
    pub matrix: Matrix,
    /// Board row of the matrix's top-left corner
    pub row: i32,
    /// Board column of the matrix's top-left corner
    pub col: i32,
}

impl Piece {
    /// Create a piece with its top-left anchor at (row, col)
    pub fn new(matrix: Matrix, row: i32, col: i32) -> Self {
        Self { matrix, row, col }
    }

    /// Create a catalog piece at the spawn anchor for a board `num_cols` wide
    pub fn spawn(piece_type: TetrominoType, num_cols: usize) -> Self {
        let matrix = piece_type.matrix();
        let col = (num_cols as i32 - matrix.size() as i32) / 2;
        Self::new(matrix, 0, col)
    }

    /// The color key written into the board when this piece is placed
    pub fn color_key(&self) -> ColorKey {
        self.matrix.color_key()
    }

    /// The catalog shape this piece was built from
    pub fn piece_type(&self) -> Option<TetrominoType> {
        TetrominoType::from_color_key(self.color_key())
    }

    /// Absolute board positions of the occupied cells at an anchor
    pub fn cells_at(&self, row: i32, col: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.matrix
            .occupied()
            .map(move |(r, c)| (row + r as i32, col + c as i32))
    }

    /// Absolute board positions of the occupied cells at the current anchor
    pub fn block_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells_at(self.row, self.col)
    }

    /// Rotate 90° clockwise. Board legality is the caller's concern.
    pub fn rotate(&mut self) {
        self.matrix.rotate_cw();
    }
}
