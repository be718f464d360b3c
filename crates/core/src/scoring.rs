//! Scoring module - flat per-line bonus
//!
//! Every cleared row is worth [`LINE_CLEAR_BONUS`] points regardless of how
//! many rows clear together. There are no levels, combos or drop points.

use crate::types::LINE_CLEAR_BONUS;

/// Points awarded for clearing `lines` rows in one lock.
pub fn line_clear_score(lines: usize) -> u32 {
    (lines as u32).saturating_mul(LINE_CLEAR_BONUS)
}

/// Add points to a score without wrapping.
pub fn add_score(score: u32, points: u32) -> u32 {
    score.saturating_add(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_bonus_per_line() {
        assert_eq!(line_clear_score(0), 0);
        assert_eq!(line_clear_score(1), 10);
        assert_eq!(line_clear_score(4), 40);
    }

    #[test]
    fn test_score_saturates() {
        assert_eq!(add_score(u32::MAX - 5, 10), u32::MAX);
    }
}
