//! Parallel greedy evaluation of a trained agent.
//!
//! Every game gets its own [`GameController`] on its own thread; the agent (and its
//! table) is only read.

use std::thread;

use qtris_engine::{GameConfig, GameController, PieceSeed};
use serde::Serialize;

use crate::agent::QAgent;

/// Result of one greedy game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub seed: PieceSeed,
    pub score: usize,
    pub lines: usize,
    pub pieces: usize,
    pub topped_out: bool,
}

/// Results of an evaluation run, one entry per seed in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub games: Vec<GameSummary>,
}

impl EvaluationReport {
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average_score(&self) -> f64 {
        if self.games.is_empty() {
            return 0.0;
        }
        let total: usize = self.games.iter().map(|game| game.score).sum();
        total as f64 / self.games.len() as f64
    }

    #[must_use]
    pub fn best_score(&self) -> usize {
        self.games.iter().map(|game| game.score).max().unwrap_or(0)
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average_pieces(&self) -> f64 {
        if self.games.is_empty() {
            return 0.0;
        }
        let total: usize = self.games.iter().map(|game| game.pieces).sum();
        total as f64 / self.games.len() as f64
    }
}

/// Plays one game per seed with greedy actions, in parallel.
///
/// Games end at top-out or after `piece_limit` pieces.
#[must_use]
pub fn evaluate(
    agent: &QAgent,
    config: &GameConfig,
    seeds: &[PieceSeed],
    piece_limit: usize,
) -> EvaluationReport {
    let mut games: Vec<Option<GameSummary>> = vec![None; seeds.len()];
    thread::scope(|s| {
        for (slot, &seed) in games.iter_mut().zip(seeds) {
            s.spawn(move || {
                *slot = Some(play_greedy_game(agent, config, seed, piece_limit));
            });
        }
    });
    EvaluationReport {
        games: games.into_iter().flatten().collect(),
    }
}

/// Plays a single greedy game.
#[must_use]
pub fn play_greedy_game(
    agent: &QAgent,
    config: &GameConfig,
    seed: PieceSeed,
    piece_limit: usize,
) -> GameSummary {
    let mut game = GameController::with_seed(config.clone(), seed);
    while game.state().is_running() && game.stats().completed_pieces() < piece_limit {
        match agent.play_greedy(&mut game) {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => break,
        }
    }
    let stats = game.stats();
    GameSummary {
        seed,
        score: stats.score(),
        lines: stats.total_cleared_lines(),
        pieces: stats.completed_pieces(),
        topped_out: game.state().is_game_over(),
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use crate::{LearningParams, StateEncoding, Trainer};

    use super::*;

    fn seeds(n: usize) -> Vec<PieceSeed> {
        let mut rng = Pcg32::seed_from_u64(99);
        (0..n).map(|_| rng.random()).collect()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let agent = QAgent::with_seed(StateEncoding::Contour, LearningParams::default(), 4);
        let mut trainer = Trainer::new(agent, GameConfig::default()).with_seed(4);
        trainer.train(5);
        let agent = trainer.into_agent();

        let config = GameConfig::default();
        let seeds = seeds(4);
        let report = evaluate(&agent, &config, &seeds, 500);
        assert_eq!(report.games.len(), 4);
        for (summary, &seed) in report.games.iter().zip(&seeds) {
            assert_eq!(summary.seed, seed);
            assert_eq!(*summary, play_greedy_game(&agent, &config, seed, 500));
        }
    }

    #[test]
    fn test_piece_limit_and_averages() {
        let agent = QAgent::with_seed(StateEncoding::FullGrid, LearningParams::default(), 4);
        let report = evaluate(&agent, &GameConfig::default(), &seeds(3), 5);
        assert!(report.games.iter().all(|game| game.pieces <= 5));
        assert!(report.average_pieces() <= 5.0);
        assert!(report.average_score() <= report.best_score() as f64);
    }

    #[test]
    fn test_empty_evaluation() {
        let agent = QAgent::with_seed(StateEncoding::Contour, LearningParams::default(), 4);
        let report = evaluate(&agent, &GameConfig::default(), &[], 10);
        assert!(report.games.is_empty());
        assert!(report.average_score().abs() < f64::EPSILON);
        assert_eq!(report.best_score(), 0);
    }
}
