//! The shape catalog
//!
//! All 7 standard tetrominoes with their default matrices and color keys.
//! The catalog is a constant table: pieces copy their matrix out of it and
//! rotate their own buffer.

use crate::piece::{ColorKey, Matrix};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// The 7 tetromino types, in color-key order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I, // 1 - long bar
    O, // 2 - square
    T, // 3 - T-shape
    J, // 4 - J-shape
    L, // 5 - L-shape
    S, // 6 - S-shape
    Z, // 7 - Z-shape
}

const I_ROWS: [[ColorKey; 4]; 4] = [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]];
const O_ROWS: [[ColorKey; 4]; 4] = [[0, 0, 0, 0], [0, 2, 2, 0], [0, 2, 2, 0], [0, 0, 0, 0]];
const T_ROWS: [[ColorKey; 3]; 3] = [[0, 3, 0], [3, 3, 3], [0, 0, 0]];
const J_ROWS: [[ColorKey; 3]; 3] = [[4, 0, 0], [4, 4, 4], [0, 0, 0]];
const L_ROWS: [[ColorKey; 3]; 3] = [[0, 0, 5], [5, 5, 5], [0, 0, 0]];
const S_ROWS: [[ColorKey; 3]; 3] = [[0, 6, 6], [6, 6, 0], [0, 0, 0]];
const Z_ROWS: [[ColorKey; 3]; 3] = [[7, 7, 0], [0, 7, 7], [0, 0, 0]];

impl TetrominoType {
    /// Get all tetromino types for random selection
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::J,
            TetrominoType::L,
            TetrominoType::S,
            TetrominoType::Z,
        ]
    }

    /// The fixed color key (1-7) this shape writes into the board
    pub fn color_key(&self) -> ColorKey {
        match self {
            TetrominoType::I => 1,
            TetrominoType::O => 2,
            TetrominoType::T => 3,
            TetrominoType::J => 4,
            TetrominoType::L => 5,
            TetrominoType::S => 6,
            TetrominoType::Z => 7,
        }
    }

    /// Look up the shape owning a color key
    pub fn from_color_key(key: ColorKey) -> Option<TetrominoType> {
        Self::all().into_iter().find(|t| t.color_key() == key)
    }

    /// Default (spawn) orientation of this shape
    pub fn matrix(&self) -> Matrix {
        match self {
            TetrominoType::I => Matrix::from_array(I_ROWS),
            TetrominoType::O => Matrix::from_array(O_ROWS),
            TetrominoType::T => Matrix::from_array(T_ROWS),
            TetrominoType::J => Matrix::from_array(J_ROWS),
            TetrominoType::L => Matrix::from_array(L_ROWS),
            TetrominoType::S => Matrix::from_array(S_ROWS),
            TetrominoType::Z => Matrix::from_array(Z_ROWS),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TetrominoType::I => "I",
            TetrominoType::O => "O",
            TetrominoType::T => "T",
            TetrominoType::J => "J",
            TetrominoType::L => "L",
            TetrominoType::S => "S",
            TetrominoType::Z => "Z",
        }
    }
}

/// Terminal color for a color key. Unknown keys render white.
pub fn color_for_key(key: ColorKey) -> Color {
    match key {
        1 => Color::Blue,
        2 => Color::Yellow,
        3 => Color::Magenta,
        4 => Color::Rgb(255, 192, 203), // Pink
        5 => Color::Rgb(255, 165, 0),   // Orange
        6 => Color::Red,
        7 => Color::Green,
        _ => Color::White,
    }
}
