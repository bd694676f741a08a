//! Core game state and logic
//!
//! The engine owns the board and the active piece. The active piece is kept
//! written into the board while it falls; every move or rotation removes it,
//! tries the new placement, and writes it back either at the new position or
//! at the old one. A lock therefore needs no extra write: the piece is already
//! in the grid when it stops.

use crate::board::{Board, EMPTY};
use crate::piece::Piece;
use crate::queue::{DEFAULT_QUEUE_DEPTH, PieceQueue};
use crate::score::Score;
use crate::tetromino::TetrominoType;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameState {
    Running,
    GameOver,
}

/// Directions a piece can be shifted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    /// (row, col) delta
    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
        }
    }
}

/// How often the player may use hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldRule {
    /// Swap as often as you like
    #[default]
    Unlimited,
    /// One hold per piece; re-armed when a piece locks
    OncePerLock,
}

/// Engine construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub initial_level: u32,
    pub queue_depth: usize,
    pub hold_rule: HoldRule,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_level: 1,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            hold_rule: HoldRule::Unlimited,
        }
    }
}

/// Outcome of the most recent lock, for host feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockEvent {
    pub lines_cleared: usize,
    pub points: u64,
    pub leveled_up: bool,
}

/// Serializable read-only view of the whole engine
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub state: GameState,
    pub board: Vec<Vec<u8>>,
    pub active_piece: Option<Piece>,
    pub queue: Vec<TetrominoType>,
    pub held_piece: Option<TetrominoType>,
    pub score: Score,
}

/// The game engine
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    /// Current falling piece, None only after game over
    active_piece: Option<Piece>,
    queue: PieceQueue,
    /// Held shape
    held_piece: Option<TetrominoType>,
    /// Whether hold has been used since the last lock
    hold_used: bool,
    hold_rule: HoldRule,
    score: Score,
    state: GameState,
    last_lock: Option<LockEvent>,
}

impl Engine {
    /// Create a new game on a standard board
    pub fn new(initial_level: u32) -> Self {
        Self::with_seed(initial_level, rand::random())
    }

    /// Create a new game with a reproducible piece sequence
    pub fn with_seed(initial_level: u32, seed: u64) -> Self {
        let config = EngineConfig {
            initial_level,
            ..EngineConfig::default()
        };
        Self::with_board(Board::default(), config, seed)
    }

    /// Create a game on a prepared board. The first piece spawns immediately;
    /// if it does not fit the engine starts in `GameOver`.
    pub fn with_board(board: Board, config: EngineConfig, seed: u64) -> Self {
        let mut engine = Self {
            board,
            active_piece: None,
            queue: PieceQueue::with_seed(config.queue_depth, seed),
            held_piece: None,
            hold_used: false,
            hold_rule: config.hold_rule,
            score: Score::new(config.initial_level),
            state: GameState::Running,
            last_lock: None,
        };
        engine.spawn_new_shape();
        engine
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_piece(&self) -> Option<&Piece> {
        self.active_piece.as_ref()
    }

    /// Upcoming shapes, next first
    pub fn preview(&self) -> impl Iterator<Item = TetrominoType> + '_ {
        self.queue.preview()
    }

    pub fn held_piece(&self) -> Option<TetrominoType> {
        self.held_piece
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn points(&self) -> u64 {
        self.score.points
    }

    pub fn level(&self) -> u32 {
        self.score.level
    }

    pub fn lines(&self) -> u32 {
        self.score.lines
    }

    pub fn hold_rule(&self) -> HoldRule {
        self.hold_rule
    }

    /// Gravity interval for the current level
    pub fn tick_interval(&self, base: Duration) -> Duration {
        self.score.tick_interval(base)
    }

    /// Take the next queued shape and drop it in at the top center.
    ///
    /// Whatever piece was active stays where it is on the board. Returns
    /// false, and ends the game, if the spawn position is obstructed.
    pub fn spawn_new_shape(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        let next = self.queue.next();
        self.spawn(Piece::spawn(next, self.board.num_cols()))
    }

    fn spawn(&mut self, piece: Piece) -> bool {
        if !self.board.can_place(&piece, piece.row, piece.col) {
            info!(
                color_key = piece.color_key(),
                points = self.score.points,
                lines = self.score.lines,
                "spawn blocked, game over"
            );
            self.active_piece = None;
            self.state = GameState::GameOver;
            return false;
        }

        self.board.place_shape(&piece);
        debug!(color_key = piece.color_key(), row = piece.row, col = piece.col, "spawned piece");
        self.active_piece = Some(piece);
        true
    }

    /// Shift the active piece one cell. Returns false if blocked.
    pub fn move_piece(&mut self, direction: Direction) -> bool {
        if self.is_game_over() {
            return false;
        }
        let Some(piece) = &mut self.active_piece else {
            return false;
        };

        let (dr, dc) = direction.delta();
        self.board.remove_shape(piece);
        let moved = self.board.can_place(piece, piece.row + dr, piece.col + dc);
        if moved {
            piece.row += dr;
            piece.col += dc;
        }
        self.board.place_shape(piece);
        moved
    }

    /// Rotate the active piece clockwise in place. No wall kicks: the
    /// rotation is rejected if it does not fit at the current anchor.
    pub fn rotate(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        let Some(piece) = &mut self.active_piece else {
            return false;
        };

        let original = piece.matrix.clone();
        self.board.remove_shape(piece);
        piece.rotate();
        let rotated = self.board.can_place(piece, piece.row, piece.col);
        if !rotated {
            piece.matrix = original;
        }
        self.board.place_shape(piece);
        rotated
    }

    /// Advance one step: fall one row, or lock and spawn the next piece.
    /// Returns false once the game is over.
    pub fn tick(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        if self.move_piece(Direction::Down) {
            return true;
        }
        self.lock_piece()
    }

    /// Drop the active piece as far as it goes and lock it immediately.
    pub fn hard_drop(&mut self) -> bool {
        if self.is_game_over() || self.active_piece.is_none() {
            return false;
        }
        let mut distance = 0;
        while self.move_piece(Direction::Down) {
            distance += 1;
        }
        debug!(distance, "hard drop");
        self.lock_piece()
    }

    /// Swap the active piece with the held one (or the next queued piece if
    /// nothing is held). The incoming piece restarts at the spawn position in
    /// its default orientation.
    pub fn hold_active_piece(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        if self.hold_rule == HoldRule::OncePerLock && self.hold_used {
            return false;
        }
        let Some(piece) = self.active_piece.take() else {
            return false;
        };
        let Some(piece_type) = piece.piece_type() else {
            self.active_piece = Some(piece);
            return false;
        };

        self.board.remove_shape(&piece);
        let incoming = match self.held_piece.replace(piece_type) {
            Some(held) => held,
            None => self.queue.next(),
        };
        self.hold_used = true;
        debug!(held = piece_type.name(), incoming = incoming.name(), "hold");
        self.spawn(Piece::spawn(incoming, self.board.num_cols()))
    }

    /// Replace the active piece with `piece` at the piece's own anchor.
    /// Leaves everything unchanged and returns false if it does not fit.
    pub fn replace_active_piece(&mut self, piece: Piece) -> bool {
        if self.is_game_over() {
            return false;
        }
        if let Some(current) = &self.active_piece {
            self.board.remove_shape(current);
        }
        if self.board.can_place(&piece, piece.row, piece.col) {
            self.board.place_shape(&piece);
            self.active_piece = Some(piece);
            true
        } else {
            if let Some(current) = &self.active_piece {
                self.board.place_shape(current);
            }
            false
        }
    }

    /// Row the active piece would lock at if dropped now
    pub fn ghost_row(&self) -> Option<i32> {
        let piece = self.active_piece.as_ref()?;

        // The piece is written into the grid, so its own cells count as empty
        let fits = |row: i32| {
            piece.cells_at(row, piece.col).all(|cell| {
                self.board.get(cell.0, cell.1) == Some(EMPTY)
                    || piece.block_positions().any(|own| own == cell)
            })
        };

        let mut row = piece.row;
        while fits(row + 1) {
            row += 1;
        }
        Some(row)
    }

    /// Outcome of the last lock since this was last called
    pub fn take_lock_event(&mut self) -> Option<LockEvent> {
        self.last_lock.take()
    }

    /// The active piece is already in the grid; clear rows, score, spawn.
    fn lock_piece(&mut self) -> bool {
        self.active_piece = None;

        let lines_cleared = self.board.clear_rows();
        let level_before = self.score.level;
        let points = self.score.add_clear(lines_cleared);
        let leveled_up = self.score.level > level_before;

        if lines_cleared > 0 {
            debug!(lines_cleared, points, total = self.score.points, "rows cleared");
        }
        if leveled_up {
            info!(level = self.score.level, lines = self.score.lines, "level up");
        }

        self.last_lock = Some(LockEvent {
            lines_cleared,
            points,
            leveled_up,
        });
        self.hold_used = false;
        self.spawn_new_shape()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            board: self.board.rows().map(|row| row.to_vec()).collect(),
            active_piece: self.active_piece.clone(),
            queue: self.queue.preview().collect(),
            held_piece: self.held_piece,
            score: self.score.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::DEFAULT_COLS;
    use crate::piece::Matrix;

    fn engine() -> Engine {
        Engine::with_seed(1, 17)
    }

    fn occupied_count(board: &Board) -> usize {
        board.rows().flatten().filter(|&&c| c != 0).count()
    }

    #[test]
    fn test_new_engine_spawns_piece() {
        let engine = engine();
        assert_eq!(engine.state(), GameState::Running);
        let piece = engine.active_piece().unwrap();
        assert_eq!(piece.row, 0);
        assert_eq!(occupied_count(engine.board()), 4);
        assert_eq!(engine.preview().count(), DEFAULT_QUEUE_DEPTH);
        assert_eq!(engine.held_piece(), None);
    }

    #[test]
    fn test_spawn_takes_front_of_queue() {
        let mut engine = engine();
        let next = engine.preview().next().unwrap();
        assert!(engine.spawn_new_shape());
        assert_eq!(engine.active_piece().unwrap().piece_type(), Some(next));
        assert_eq!(engine.preview().count(), DEFAULT_QUEUE_DEPTH);
    }

    #[test]
    fn test_move_right_and_down() {
        let mut engine = engine();
        let start = engine.active_piece().unwrap().clone();
        assert!(engine.move_piece(Direction::Right));
        assert!(engine.move_piece(Direction::Down));
        let piece = engine.active_piece().unwrap();
        assert_eq!((piece.row, piece.col), (start.row + 1, start.col + 1));
        // Still exactly one copy of the piece on the board
        assert_eq!(occupied_count(engine.board()), 4);
        for (row, col) in piece.block_positions() {
            assert_eq!(engine.board().get(row, col), Some(piece.color_key()));
        }
    }

    #[test]
    fn test_blocked_move_restores_piece() {
        let mut board = Board::default();
        board.set(5, 2, 6);
        let mut engine = Engine::with_board(board, EngineConfig::default(), 3);
        let single = Piece::new(Matrix::from_rows(&[[1u8]]).unwrap(), 5, 3);
        assert!(engine.replace_active_piece(single));

        let before = engine.board().clone();
        assert!(!engine.move_piece(Direction::Left));
        assert_eq!(engine.board(), &before);
        let piece = engine.active_piece().unwrap();
        assert_eq!((piece.row, piece.col), (5, 3));
    }

    #[test]
    fn test_rotate_on_open_board() {
        let mut engine = engine();
        engine.move_piece(Direction::Down);
        engine.move_piece(Direction::Down);
        let mut expected = engine.active_piece().unwrap().matrix.clone();
        expected.rotate_cw();
        assert!(engine.rotate());
        assert_eq!(engine.active_piece().unwrap().matrix, expected);
        assert_eq!(occupied_count(engine.board()), 4);
    }

    #[test]
    fn test_rotate_rejected_against_wall() {
        let mut engine = engine();
        // A vertical I in the last column has nowhere to rotate back to
        let vertical = {
            let mut m = TetrominoType::I.matrix();
            m.rotate_cw();
            m
        };
        // Rotated I occupies matrix column 2; anchor col 7 puts it in column 9
        assert!(engine.replace_active_piece(Piece::new(vertical.clone(), 5, 7)));
        let before = engine.board().clone();
        assert!(!engine.rotate());
        assert_eq!(engine.active_piece().unwrap().matrix, vertical);
        assert_eq!(engine.board(), &before);
    }

    #[test]
    fn test_tick_falls_then_locks() {
        let mut engine = engine();
        let row = engine.active_piece().unwrap().row;
        assert!(engine.tick());
        assert_eq!(engine.active_piece().unwrap().row, row + 1);
        assert!(engine.take_lock_event().is_none());

        // Tick until something locks
        let mut ticks = 0;
        while engine.take_lock_event().is_none() {
            assert!(engine.tick());
            ticks += 1;
            assert!(ticks < 30);
        }
        // Locked piece plus the fresh spawn
        assert_eq!(occupied_count(engine.board()), 8);
    }

    #[test]
    fn test_hard_drop_locks_at_ghost_row() {
        let mut engine = engine();
        let ghost = engine.ghost_row().unwrap();
        let piece = engine.active_piece().unwrap().clone();
        assert!(engine.hard_drop());
        let event = engine.take_lock_event().unwrap();
        assert_eq!(event.lines_cleared, 0);
        for (row, col) in piece.cells_at(ghost, piece.col) {
            assert_eq!(engine.board().get(row, col), Some(piece.color_key()));
        }
    }

    #[test]
    fn test_ghost_row_is_read_only() {
        let engine = engine();
        let before = engine.board().clone();
        assert!(engine.ghost_row().unwrap() > 0);
        assert_eq!(engine.board(), &before);
    }

    #[test]
    fn test_hold_swaps_with_queue_then_held() {
        let mut engine = engine();
        let first = engine.active_piece().unwrap().piece_type().unwrap();
        let next = engine.preview().next().unwrap();

        assert!(engine.hold_active_piece());
        assert_eq!(engine.held_piece(), Some(first));
        assert_eq!(engine.active_piece().unwrap().piece_type(), Some(next));
        assert_eq!(occupied_count(engine.board()), 4);

        // Unlimited by default: swap straight back
        assert!(engine.hold_active_piece());
        assert_eq!(engine.held_piece(), Some(next));
        let active = engine.active_piece().unwrap();
        assert_eq!(active.piece_type(), Some(first));
        assert_eq!(active.matrix, first.matrix());
        assert_eq!(active.row, 0);
    }

    #[test]
    fn test_hold_once_per_lock() {
        let config = EngineConfig {
            hold_rule: HoldRule::OncePerLock,
            ..EngineConfig::default()
        };
        let mut engine = Engine::with_board(Board::default(), config, 17);
        assert!(engine.hold_active_piece());
        assert!(!engine.hold_active_piece());
        assert!(engine.hard_drop());
        assert!(engine.hold_active_piece());
    }

    #[test]
    fn test_ghost_row_lands_on_stack() {
        let mut board = Board::default();
        board.set(12, 0, 4);
        let mut engine = Engine::with_board(board, EngineConfig::default(), 3);
        let column = Matrix::from_rows(&[[1u8, 0], [1, 0]]).unwrap();
        assert!(engine.replace_active_piece(Piece::new(column, 2, 0)));
        // Bottom cell stops on row 11, so the anchor sits one row higher
        assert_eq!(engine.ghost_row(), Some(10));
        // Moving down by one overlaps the piece's old cells; still the same landing row
        assert!(engine.move_piece(Direction::Down));
        assert_eq!(engine.ghost_row(), Some(10));
    }

    #[test]
    fn test_hold_into_blocked_spawn_ends_game() {
        // Find a seed whose second shape needs a spawn cell the first one leaves free
        let (seed, first, blocker) = (0..200u64)
            .find_map(|seed| {
                let engine = Engine::with_seed(1, seed);
                let first = engine.active_piece()?.clone();
                let next = Piece::spawn(engine.preview().next()?, DEFAULT_COLS);
                let blocker = next
                    .block_positions()
                    .find(|cell| !first.block_positions().any(|own| own == *cell))?;
                Some((seed, first.piece_type()?, blocker))
            })
            .unwrap();

        let mut board = Board::default();
        board.set(blocker.0, blocker.1, 7);
        let mut engine = Engine::with_board(board, EngineConfig::default(), seed);
        assert_eq!(engine.active_piece().unwrap().piece_type(), Some(first));

        assert!(!engine.hold_active_piece());
        assert_eq!(engine.state(), GameState::GameOver);
        assert!(engine.active_piece().is_none());
        assert_eq!(engine.held_piece(), Some(first));
        // The outgoing piece was lifted off the board; only the blocker is left
        assert_eq!(occupied_count(engine.board()), 1);
    }

    #[test]
    fn test_replace_that_does_not_fit_changes_nothing() {
        let mut board = Board::default();
        board.set(10, 5, 6);
        let mut engine = Engine::with_board(board, EngineConfig::default(), 9);
        let before = engine.board().clone();
        let active = engine.active_piece().unwrap().clone();

        let cell = Matrix::from_rows(&[[1u8]]).unwrap();
        assert!(!engine.replace_active_piece(Piece::new(cell.clone(), 10, 5)));
        assert!(!engine.replace_active_piece(Piece::new(cell, 20, 0)));

        assert_eq!(engine.board(), &before);
        assert_eq!(engine.active_piece(), Some(&active));
        assert_eq!(engine.state(), GameState::Running);
    }

    #[test]
    fn test_snapshot_serializes() {
        let engine = engine();
        let json = serde_json::to_string(&engine.snapshot()).unwrap();
        assert!(json.contains("\"state\":\"Running\""));
        assert!(json.contains("\"points\":0"));
    }
}
