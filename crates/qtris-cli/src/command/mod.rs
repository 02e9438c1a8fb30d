use clap::{Parser, Subcommand};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    text::Text,
};

use crate::{
    config::ConfigArg,
    logging::{LogArg, LogTarget},
    view::widgets::{GameDisplay, style},
};

use self::{auto_play::AutoPlayArg, evaluate::EvaluateArg, play::PlayArg, train::TrainArg};

mod auto_play;
mod evaluate;
mod play;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
    #[clap(flatten)]
    config: ConfigArg,
    #[clap(flatten)]
    log: LogArg,
}

#[derive(Debug, Clone, Subcommand, derive_more::IsVariant)]
enum Mode {
    /// Play with the keyboard (default)
    #[command(name = "play")]
    Play(#[clap(flatten)] PlayArg),
    /// Watch the agent learn; a new game starts after every top-out
    #[command(name = "auto-play")]
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Train the agent without a UI and write the model
    Train(#[clap(flatten)] TrainArg),
    /// Play greedy games with a trained model, in parallel
    Evaluate(#[clap(flatten)] EvaluateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let mode = args.mode.unwrap_or(Mode::Play(PlayArg::default()));

    let target = if mode.is_play() || mode.is_auto_play() {
        LogTarget::FileOnly
    } else {
        LogTarget::Stderr
    };
    args.log.init(target)?;
    let config = args.config.load()?;

    match mode {
        Mode::Play(arg) => play::run(&arg, &config)?,
        Mode::AutoPlay(arg) => auto_play::run(&arg, &config)?,
        Mode::Train(arg) => train::run(&arg, &config)?,
        Mode::Evaluate(arg) => evaluate::run(&arg, &config)?,
    }
    Ok(())
}

/// Draws a game with a line of key help under it.
fn draw_game(frame: &mut Frame<'_>, display: &GameDisplay<'_>, help_text: &str) {
    let help_text = Text::from(help_text).style(style::HELP).centered();

    let [main_area, help_area] =
        Layout::vertical([Constraint::Length(display.height()), Constraint::Length(1)])
            .areas::<2>(frame.area());
    frame.render_widget(display, main_area);
    frame.render_widget(help_text, help_area);
}
