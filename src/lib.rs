//! Blockfall - a falling-block puzzle game engine
//!
//! The engine is pure state: it performs no I/O and never blocks. A host
//! drives it by calling [`engine::Engine::tick`] on a timer and the move,
//! rotate, hold and drop mutators on input, then renders the read-only state.

pub mod board;
pub mod engine;
pub mod piece;
pub mod queue;
pub mod score;
pub mod settings;
pub mod tetromino;

pub use board::Board;
pub use engine::{Direction, Engine, EngineConfig, GameState, HoldRule, LockEvent};
pub use piece::{InvalidShapeError, Matrix, Piece};
pub use tetromino::TetrominoType;
