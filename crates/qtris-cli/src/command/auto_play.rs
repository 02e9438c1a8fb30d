use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use qtris_agent::{QAgent, QModel, StateEncoding, TrainingStats};
use qtris_engine::{GameConfig, GameController};
use ratatui::Frame;
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    input::InputAction,
    tui::{App, RenderMode, Tui},
    util::{self, Output},
    view::{
        Palette,
        widgets::{AgentSummary, GameDisplay},
    },
};

const TICK_RATE: f64 = 60.0;
const TURBO_STEPS_PER_TICK: usize = 500;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Continue learning from this model file (JSON format)
    #[clap(long)]
    model: Option<PathBuf>,
    /// State encoding of a fresh agent (contour, full-grid)
    #[clap(long, default_value_t = StateEncoding::Contour)]
    encoding: StateEncoding,
    /// Placements per second
    #[clap(long, default_value_t = 10.0)]
    speed: f64,
    /// Start in turbo mode
    #[clap(long)]
    turbo: bool,
    /// Save the learned model to this file on exit
    #[clap(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AutoPlayArg, config: &AppConfig) -> anyhow::Result<()> {
    let (agent, episodes) = match &arg.model {
        Some(path) => {
            let model = util::read_model_file(path)?;
            model
                .check_config(&config.game)
                .with_context(|| format!("Model {} cannot play this game", path.display()))?;
            let episodes = model.episodes;
            (model.into_agent()?, episodes)
        }
        None => (QAgent::new(arg.encoding, config.learning), 0),
    };
    anyhow::ensure!(
        arg.speed.is_finite() && arg.speed > 0.0,
        "speed must be positive, got {}",
        arg.speed
    );

    let mut app = AutoPlayApp::new(agent, config, Duration::from_secs_f64(1.0 / arg.speed))
        .turbo(arg.turbo);
    Tui::new().run(&mut app)?;

    let stats = &app.stats;
    info!(
        games = stats.games_played(),
        average_score = stats.average_score(),
        best_score = stats.best_score(),
        "auto-play finished"
    );

    if let Some(path) = &arg.output {
        let episodes = episodes + stats.games_played();
        let model = QModel::from_agent("auto-play", &app.agent, &config.game, episodes);
        Output::save_json(&model, Some(path.clone()))?;
        eprintln!("Saved model to {}", path.display());
    }
    Ok(())
}

/// Lets the agent learn on screen: one placement per step, a fresh game after each
/// top-out.
#[derive(Debug)]
struct AutoPlayApp {
    agent: QAgent,
    config: GameConfig,
    palette: Palette,
    game: GameController,
    stats: TrainingStats,
    step_interval: Duration,
    step_elapsed: Duration,
    turbo: bool,
    paused: bool,
    is_exiting: bool,
}

impl AutoPlayApp {
    fn new(agent: QAgent, config: &AppConfig, step_interval: Duration) -> Self {
        Self {
            agent,
            config: config.game.clone(),
            palette: config.palette.clone(),
            game: GameController::new(config.game.clone()),
            stats: TrainingStats::new(),
            step_interval,
            step_elapsed: Duration::ZERO,
            turbo: false,
            paused: false,
            is_exiting: false,
        }
    }

    fn turbo(self, turbo: bool) -> Self {
        Self { turbo, ..self }
    }

    fn summary(&self) -> AgentSummary {
        AgentSummary {
            games_played: self.stats.games_played(),
            average_score: self.stats.average_score(),
            best_score: self.stats.best_score(),
            epsilon: self.agent.epsilon(),
            states: self.agent.table().state_count(),
        }
    }

    fn handle_input(&mut self, event: &Event) {
        if let Some(key) = event.as_key_event()
            && key.code == KeyCode::Char('t')
            && key.kind != KeyEventKind::Release
        {
            self.turbo = !self.turbo;
            return;
        }
        match InputAction::from_event(event) {
            Some(InputAction::TogglePause) => self.paused = !self.paused,
            Some(InputAction::Quit) => self.is_exiting = true,
            Some(InputAction::Move(_)) | None => {}
        }
    }

    fn advance(&mut self, elapsed: Duration) {
        if self.paused || self.is_exiting {
            return;
        }
        if self.turbo {
            for _ in 0..TURBO_STEPS_PER_TICK {
                self.step();
            }
            return;
        }
        self.step_elapsed += elapsed;
        if self.step_elapsed >= self.step_interval {
            self.step_elapsed = Duration::ZERO;
            self.step();
        }
    }

    /// Places one piece and learns from it; starts a new game after a top-out.
    fn step(&mut self) {
        let placed = match self.agent.step(&mut self.game) {
            Ok(step) => step.is_some(),
            Err(error) => {
                debug!(%error, "placement rejected");
                false
            }
        };
        if !placed || self.game.state().is_game_over() {
            self.finish_game();
        }
    }

    fn finish_game(&mut self) {
        let stats = self.game.stats();
        self.stats.record_game(stats.score());
        self.agent.end_episode();
        info!(
            game = self.stats.games_played(),
            score = stats.score(),
            pieces = stats.completed_pieces(),
            average_score = self.stats.average_score(),
            epsilon = self.agent.epsilon(),
            "game finished"
        );
        self.game = GameController::new(self.config.clone());
    }
}

impl App for AutoPlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(TICK_RATE);
        tui.set_render_mode(RenderMode::from_rate(TICK_RATE));
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        self.handle_input(&event);
    }

    fn draw(&self, frame: &mut Frame) {
        let display = GameDisplay::new(self.game.view(), self.game.next_pieces(), &self.palette)
            .agent(self.summary())
            .paused(self.paused)
            .turbo(self.turbo);
        let turbo_text = if self.turbo {
            "T (Turbo: ON)"
        } else {
            "T (Turbo: OFF)"
        };
        let help_text = if self.paused {
            "Controls: P (Resume) | Q (Quit)".to_owned()
        } else {
            format!("Controls: {turbo_text} | P (Pause) | Q (Quit)")
        };
        super::draw_game(frame, &display, &help_text);
    }

    fn update(&mut self, _tui: &mut Tui, elapsed: Duration) {
        self.advance(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};
    use qtris_agent::LearningParams;

    use super::*;

    fn app() -> AutoPlayApp {
        let agent = QAgent::with_seed(StateEncoding::Contour, LearningParams::default(), 3);
        AutoPlayApp::new(agent, &AppConfig::default(), Duration::from_millis(100))
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_steps_follow_interval() {
        let mut app = app();
        app.advance(Duration::from_millis(60));
        assert_eq!(app.game.stats().completed_pieces(), 0);
        app.advance(Duration::from_millis(60));
        assert_eq!(app.game.stats().completed_pieces(), 1);
        assert!(app.agent.table().entry_count() > 0);
    }

    #[test]
    fn test_game_restarts_after_top_out() {
        let mut app = app().turbo(true);
        while app.stats.games_played() == 0 {
            app.advance(Duration::ZERO);
        }
        assert!(app.game.state().is_running());
        assert!(app.agent.epsilon() < 1.0);
        assert_eq!(app.summary().games_played, app.stats.games_played());
    }

    #[test]
    fn test_keys() {
        let mut app = app();
        app.handle_input(&key('t'));
        assert!(app.turbo);
        app.handle_input(&key('p'));
        app.advance(Duration::from_secs(1));
        assert_eq!(app.game.stats().completed_pieces(), 0);
        app.handle_input(&key('q'));
        assert!(app.should_exit());
    }
}
