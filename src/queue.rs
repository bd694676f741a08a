//! Upcoming-piece queue
//!
//! Shapes are drawn uniformly at random, with replacement, from the 7-shape
//! catalog. This is not the 7-bag randomizer of modern Tetris: droughts and
//! repeats are possible.

use crate::tetromino::TetrominoType;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Default number of upcoming pieces kept visible
pub const DEFAULT_QUEUE_DEPTH: usize = 3;

/// Fixed-depth lookahead of upcoming pieces
#[derive(Debug, Clone)]
pub struct PieceQueue {
    queue: VecDeque<TetrominoType>,
    rng: ChaCha8Rng,
}

impl PieceQueue {
    /// Create a queue of `depth` pieces from a seed. Depth is at least 1.
    pub fn with_seed(depth: usize, seed: u64) -> Self {
        let depth = depth.max(1);
        let mut queue = Self {
            queue: VecDeque::with_capacity(depth),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        for _ in 0..depth {
            let piece = queue.draw();
            queue.queue.push_back(piece);
        }
        queue
    }

    /// Take the next piece, appending a fresh one so the length stays constant
    pub fn next(&mut self) -> TetrominoType {
        let fresh = self.draw();
        self.queue.push_back(fresh);
        // The queue always holds at least the piece just pushed
        self.queue.pop_front().unwrap_or(fresh)
    }

    /// Upcoming pieces, next first
    pub fn preview(&self) -> impl Iterator<Item = TetrominoType> + '_ {
        self.queue.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn draw(&mut self) -> TetrominoType {
        let all = TetrominoType::all();
        all[self.rng.gen_range(0..all.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_length_stays_constant() {
        let mut queue = PieceQueue::with_seed(3, 7);
        assert_eq!(queue.len(), 3);
        for _ in 0..50 {
            queue.next();
            assert_eq!(queue.len(), 3);
        }
    }

    #[test]
    fn test_next_returns_front_of_preview() {
        let mut queue = PieceQueue::with_seed(3, 42);
        for _ in 0..20 {
            let expected: Vec<_> = queue.preview().collect();
            assert_eq!(queue.next(), expected[0]);
            let after: Vec<_> = queue.preview().collect();
            assert_eq!(&after[..2], &expected[1..]);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = PieceQueue::with_seed(3, 1234);
        let mut b = PieceQueue::with_seed(3, 1234);
        for _ in 0..100 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_all_shapes_eventually_appear() {
        let mut queue = PieceQueue::with_seed(3, 99);
        let seen: HashSet<_> = (0..500).map(|_| queue.next()).collect();
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_zero_depth_is_clamped() {
        let queue = PieceQueue::with_seed(0, 1);
        assert_eq!(queue.len(), 1);
    }
}
