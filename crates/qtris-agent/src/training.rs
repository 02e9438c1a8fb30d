//! Headless training loop.
//!
//! Each episode is a fresh [`GameController`] driven by [`QAgent::step`] until top-out
//! (or the piece limit). The trainer keeps the running statistics the renderer also
//! shows in auto-play mode: games played and average score.

use qtris_engine::{GameConfig, GameController, PieceSeed};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use tracing::{debug, info};

use crate::agent::QAgent;

/// Running statistics over finished games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingStats {
    games_played: usize,
    total_score: usize,
    best_score: usize,
    last_score: usize,
}

impl TrainingStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, score: usize) {
        self.games_played += 1;
        self.total_score += score;
        self.best_score = self.best_score.max(score);
        self.last_score = score;
    }

    #[must_use]
    pub fn games_played(&self) -> usize {
        self.games_played
    }

    #[must_use]
    pub fn best_score(&self) -> usize {
        self.best_score
    }

    #[must_use]
    pub fn last_score(&self) -> usize {
        self.last_score
    }

    /// Mean score over finished games, 0 before the first one.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average_score(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.games_played as f64
    }
}

/// Summary of one training episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeReport {
    pub seed: PieceSeed,
    pub score: usize,
    pub lines: usize,
    pub pieces: usize,
    pub total_reward: f32,
    /// The episode ended by top-out rather than by the piece limit.
    pub topped_out: bool,
}

/// Plays training episodes and tracks their statistics.
#[derive(Debug, Clone)]
pub struct Trainer {
    agent: QAgent,
    config: GameConfig,
    stats: TrainingStats,
    rng: Pcg32,
    piece_limit: usize,
    log_interval: usize,
}

impl Trainer {
    pub const DEFAULT_PIECE_LIMIT: usize = 10_000;
    pub const DEFAULT_LOG_INTERVAL: usize = 100;

    #[must_use]
    pub fn new(agent: QAgent, config: GameConfig) -> Self {
        Self {
            agent,
            config,
            stats: TrainingStats::new(),
            rng: Pcg32::from_rng(&mut rand::rng()),
            piece_limit: Self::DEFAULT_PIECE_LIMIT,
            log_interval: Self::DEFAULT_LOG_INTERVAL,
        }
    }

    /// Derives every episode's piece sequence from `seed`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }

    /// Ends an episode after this many placed pieces even if the game is still running.
    #[must_use]
    pub fn with_piece_limit(mut self, piece_limit: usize) -> Self {
        self.piece_limit = piece_limit;
        self
    }

    /// Logs a progress line every `log_interval` episodes (never when 0).
    #[must_use]
    pub fn with_log_interval(mut self, log_interval: usize) -> Self {
        self.log_interval = log_interval;
        self
    }

    #[must_use]
    pub fn agent(&self) -> &QAgent {
        &self.agent
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    #[must_use]
    pub fn into_agent(self) -> QAgent {
        self.agent
    }

    /// Runs `episodes` episodes.
    pub fn train(&mut self, episodes: usize) -> &TrainingStats {
        for _ in 0..episodes {
            let report = self.run_episode();
            let games = self.stats.games_played();
            debug!(
                game = games,
                score = report.score,
                pieces = report.pieces,
                "episode finished"
            );
            if self.log_interval > 0 && games % self.log_interval == 0 {
                info!(
                    games,
                    average_score = self.stats.average_score(),
                    best_score = self.stats.best_score(),
                    epsilon = self.agent.epsilon(),
                    states = self.agent.table().state_count(),
                    "training progress"
                );
            }
        }
        &self.stats
    }

    /// Plays one episode on a fresh game and records it.
    pub fn run_episode(&mut self) -> EpisodeReport {
        let seed = self.rng.random();
        let mut game = GameController::with_seed(self.config.clone(), seed);
        let mut total_reward = 0.0;
        while game.state().is_running() && game.stats().completed_pieces() < self.piece_limit {
            match self.agent.step(&mut game) {
                Ok(Some(step)) => total_reward += step.reward,
                Ok(None) => break,
                Err(error) => {
                    debug!(%error, "placement rejected, ending episode");
                    break;
                }
            }
        }
        self.agent.end_episode();

        let stats = game.stats();
        self.stats.record_game(stats.score());
        EpisodeReport {
            seed,
            score: stats.score(),
            lines: stats.total_cleared_lines(),
            pieces: stats.completed_pieces(),
            total_reward,
            topped_out: game.state().is_game_over(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{LearningParams, StateEncoding};

    use super::*;

    fn trainer(seed: u64) -> Trainer {
        let agent = QAgent::with_seed(StateEncoding::Contour, LearningParams::default(), seed);
        Trainer::new(agent, GameConfig::default()).with_seed(seed)
    }

    #[test]
    fn test_stats_average() {
        let mut stats = TrainingStats::new();
        assert!(stats.average_score().abs() < f64::EPSILON);
        stats.record_game(100);
        stats.record_game(300);
        assert_eq!(stats.games_played(), 2);
        assert!((stats.average_score() - 200.0).abs() < f64::EPSILON);
        assert_eq!(stats.best_score(), 300);
        assert_eq!(stats.last_score(), 300);
    }

    #[test]
    fn test_episode_runs_to_top_out() {
        let mut trainer = trainer(11);
        let report = trainer.run_episode();
        assert!(report.topped_out);
        assert!(report.pieces > 0);
        assert_eq!(report.score, report.lines * 100);
        assert_eq!(trainer.stats().games_played(), 1);
        assert!(trainer.agent().table().entry_count() > 0);
    }

    #[test]
    fn test_piece_limit_ends_episode() {
        let mut trainer = trainer(12).with_piece_limit(3);
        let report = trainer.run_episode();
        assert_eq!(report.pieces, 3);
        assert!(!report.topped_out);
    }

    #[test]
    fn test_training_decays_epsilon_per_episode() {
        let mut trainer = trainer(13).with_log_interval(2);
        let stats = trainer.train(4).clone();
        assert_eq!(stats.games_played(), 4);
        let expected = 0.995_f32.powi(4);
        assert!((trainer.agent().epsilon() - expected).abs() < 1e-5);
    }

    #[test]
    fn test_same_seeds_same_training() {
        let mut a = trainer(21);
        let mut b = trainer(21);
        a.train(3);
        b.train(3);
        assert_eq!(a.stats(), b.stats());
        assert_eq!(a.agent().table(), b.agent().table());
    }
}
