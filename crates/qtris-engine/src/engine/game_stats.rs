/// Game statistics tracking score, lines cleared, and piece count.
///
/// Scoring is linear: every cleared line is worth the configured
/// [`score_per_line`](crate::GameConfig::score_per_line), with no bonus for
/// clearing several lines at once. The score never decreases.
///
/// # Example
///
/// ```
/// use qtris_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_lock(3, 100);
/// stats.record_lock(0, 100);
///
/// assert_eq!(stats.score(), 300);
/// assert_eq!(stats.completed_pieces(), 2);
/// assert_eq!(stats.line_cleared_counter()[3], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by number of lines cleared (0 to 4).
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Updates statistics after a piece lock and returns the points gained.
    pub fn record_lock(&mut self, cleared_lines: usize, score_per_line: usize) -> usize {
        let gained = cleared_lines * score_per_line;
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if let Some(counter) = self.line_cleared_counter.get_mut(cleared_lines) {
            *counter += 1;
        }
        self.score += gained;
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_linear_in_lines() {
        let mut stats = GameStats::new();
        assert_eq!(stats.record_lock(1, 100), 100);
        assert_eq!(stats.record_lock(4, 100), 400);
        assert_eq!(stats.record_lock(2, 50), 100);
        assert_eq!(stats.score(), 600);
        assert_eq!(stats.total_cleared_lines(), 7);
        assert_eq!(stats.line_cleared_counter(), &[0, 1, 1, 0, 1]);
    }

    #[test]
    fn test_score_never_decreases() {
        let mut stats = GameStats::new();
        let mut last = 0;
        for lines in [0, 1, 0, 0, 3, 2, 0] {
            stats.record_lock(lines, 100);
            assert!(stats.score() >= last);
            last = stats.score();
        }
        assert_eq!(stats.completed_pieces(), 7);
        assert_eq!(stats.line_cleared_counter()[0], 4);
    }
}
