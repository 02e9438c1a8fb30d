use std::time::Duration;

use crossterm::event::Event;
use qtris_engine::{Command, GameController, PieceSeed};
use ratatui::Frame;
use tracing::info;

use crate::{
    config::AppConfig,
    input::{InputAction, InputQueue},
    tui::{App, RenderMode, Tui},
    view::{Palette, widgets::GameDisplay},
};

const TICK_RATE: f64 = 60.0;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Piece sequence seed (32 hex digits)
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Hide the landing preview
    #[clap(long)]
    no_ghost: bool,
}

pub(crate) fn run(arg: &PlayArg, config: &AppConfig) -> anyhow::Result<()> {
    let game = match arg.seed {
        Some(seed) => GameController::with_seed(config.game.clone(), seed),
        None => GameController::new(config.game.clone()),
    };
    let mut app = PlayApp::new(game, config.palette.clone(), !arg.no_ghost);
    Tui::new().run(&mut app)?;

    let stats = app.game.stats();
    info!(
        score = stats.score(),
        lines = stats.total_cleared_lines(),
        pieces = stats.completed_pieces(),
        "session finished"
    );
    eprintln!(
        "Score: {} (lines: {}, pieces: {})",
        stats.score(),
        stats.total_cleared_lines(),
        stats.completed_pieces()
    );
    Ok(())
}

#[derive(Debug)]
struct PlayApp {
    game: GameController,
    palette: Palette,
    input: InputQueue,
    show_ghost: bool,
    paused: bool,
    is_exiting: bool,
}

impl PlayApp {
    fn new(game: GameController, palette: Palette, show_ghost: bool) -> Self {
        Self {
            game,
            palette,
            input: InputQueue::new(),
            show_ghost,
            paused: false,
            is_exiting: false,
        }
    }

    fn is_playing(&self) -> bool {
        !self.is_exiting && !self.paused && self.game.state().is_running()
    }

    fn handle_action(&mut self, action: InputAction) {
        let is_running = self.game.state().is_running();
        match action {
            InputAction::Move(intent) if self.is_playing() => _ = self.input.push(intent),
            InputAction::TogglePause if is_running => {
                self.paused = !self.paused;
                self.input.clear();
            }
            InputAction::Quit => self.is_exiting = true,
            _ => {}
        }
    }

    fn step(&mut self, elapsed: Duration) {
        if !self.is_playing() {
            return;
        }
        let command = self.input.pop().map(Command::Move);
        let report = self.game.tick(elapsed, command);
        if report.locks.iter().any(|lock| lock.topped_out) {
            self.input.clear();
            info!(score = self.game.stats().score(), "game over");
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(TICK_RATE);
        tui.set_render_mode(RenderMode::from_rate(TICK_RATE));
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        if let Some(action) = InputAction::from_event(&event) {
            self.handle_action(action);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let display = GameDisplay::new(self.game.view(), self.game.next_pieces(), &self.palette)
            .show_ghost(self.show_ghost)
            .paused(self.paused);
        let help_text = if self.game.state().is_game_over() {
            "Controls: Q (Quit)"
        } else if self.paused {
            "Controls: P (Resume) | Q (Quit)"
        } else {
            "Controls: ← → (Move) | ↓ (Soft Drop) | ↑ (Rotate) | P (Pause) | Q (Quit)"
        };
        super::draw_game(frame, &display, help_text);
    }

    fn update(&mut self, _tui: &mut Tui, elapsed: Duration) {
        self.step(elapsed);
    }
}
