//! Scoring, leveling and fall speed

use serde::Serialize;
use std::time::Duration;

/// Lines cleared per level step
pub const LINES_PER_LEVEL: u32 = 10;

/// Fastest tick the speed curve reaches
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Per-level speed-up factor
const SPEEDUP: f64 = 0.9;

/// Base points for clearing `lines` rows with a single lock
pub fn line_clear_points(lines: usize) -> u64 {
    match lines {
        1 => 40,
        2 => 100,
        3 => 300,
        4 => 1200,
        _ => 0,
    }
}

/// Score tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
    /// Level the game started at
    pub initial_level: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Score {
    pub fn new(initial_level: u32) -> Self {
        Self {
            points: 0,
            level: initial_level,
            lines: 0,
            initial_level,
        }
    }

    /// Record a lock that cleared `lines` rows.
    /// Points use the level in effect before the clear. Returns points awarded.
    pub fn add_clear(&mut self, lines: usize) -> u64 {
        let awarded = line_clear_points(lines) * self.level as u64;
        self.points += awarded;
        self.lines += lines as u32;

        // Derived from the total, so it never goes down
        self.level = self.lines / LINES_PER_LEVEL + self.initial_level;
        awarded
    }

    /// Time between gravity ticks at the current level
    pub fn tick_interval(&self, base: Duration) -> Duration {
        tick_interval(base, self.level)
    }
}

/// `max(50ms, round(base × 0.9^(level − 1)))`
pub fn tick_interval(base: Duration, level: u32) -> Duration {
    let exponent = level as i32 - 1;
    let millis = (base.as_millis() as f64 * SPEEDUP.powi(exponent)).round();
    Duration::from_millis(millis as u64).max(MIN_TICK_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_table() {
        assert_eq!(line_clear_points(0), 0);
        assert_eq!(line_clear_points(1), 40);
        assert_eq!(line_clear_points(2), 100);
        assert_eq!(line_clear_points(3), 300);
        assert_eq!(line_clear_points(4), 1200);
        assert_eq!(line_clear_points(5), 0);
    }

    #[test]
    fn test_single_clear() {
        let mut score = Score::new(1);
        assert_eq!(score.add_clear(1), 40);
        assert_eq!(score.points, 40);
        assert_eq!(score.lines, 1);
    }

    #[test]
    fn test_multiplied_by_level() {
        let mut score = Score::new(3);
        assert_eq!(score.add_clear(2), 300);
        assert_eq!(score.points, 300);
        assert_eq!(score.lines, 2);
        assert_eq!(score.level, 3);
    }

    #[test]
    fn test_zero_lines_changes_nothing() {
        let mut score = Score::new(2);
        assert_eq!(score.add_clear(0), 0);
        assert_eq!(score, Score::new(2));
    }

    #[test]
    fn test_level_up() {
        let mut score = Score::new(1);
        for _ in 0..9 {
            score.add_clear(1);
        }
        assert_eq!(score.level, 1);
        score.add_clear(1);
        assert_eq!(score.level, 2);
        score.add_clear(4);
        assert_eq!(score.lines, 14);
        assert_eq!(score.level, 2);
    }

    #[test]
    fn test_level_offset_by_initial() {
        let mut score = Score::new(5);
        score.add_clear(4);
        score.add_clear(4);
        score.add_clear(4);
        assert_eq!(score.lines, 12);
        assert_eq!(score.level, 6);
    }

    #[test]
    fn test_tick_interval() {
        let base = Duration::from_millis(500);
        assert_eq!(tick_interval(base, 1), Duration::from_millis(500));
        assert_eq!(tick_interval(base, 2), Duration::from_millis(450));
        assert_eq!(tick_interval(base, 3), Duration::from_millis(405));
        // 500 * 0.9^4 = 328.05
        assert_eq!(tick_interval(base, 5), Duration::from_millis(328));
    }

    #[test]
    fn test_tick_interval_floor() {
        let base = Duration::from_millis(500);
        assert_eq!(tick_interval(base, 30), MIN_TICK_INTERVAL);
        assert_eq!(tick_interval(base, 200), MIN_TICK_INTERVAL);
    }

    #[test]
    fn test_tick_interval_never_increases() {
        let base = Duration::from_millis(800);
        let mut last = tick_interval(base, 1);
        for level in 2..40 {
            let next = tick_interval(base, level);
            assert!(next <= last);
            last = next;
        }
    }
}
