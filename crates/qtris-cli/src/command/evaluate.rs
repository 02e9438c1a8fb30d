use std::path::PathBuf;

use anyhow::Context as _;
use qtris_agent::{Trainer, evaluate};
use qtris_engine::PieceSeed;
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
use tracing::info;

use crate::{
    config::AppConfig,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Path to the model file (JSON format)
    model_path: PathBuf,
    /// Number of games, played in parallel
    #[clap(long, default_value_t = 8)]
    games: usize,
    /// Seed for the piece sequences
    #[clap(long)]
    seed: Option<u64>,
    /// End a game after this many pieces
    #[clap(long, default_value_t = Trainer::DEFAULT_PIECE_LIMIT)]
    piece_limit: usize,
    /// Output file path for the per-game report (stdout if omitted)
    #[clap(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg, config: &AppConfig) -> anyhow::Result<()> {
    let EvaluateArg {
        model_path,
        games,
        seed,
        piece_limit,
        output,
    } = arg;

    let model = util::read_model_file(model_path)?;
    model
        .check_config(&config.game)
        .with_context(|| format!("Model {} cannot play this game", model_path.display()))?;
    info!(
        name = %model.name,
        trained_at = %model.trained_at,
        episodes = model.episodes,
        "model loaded"
    );
    let agent = model.into_agent()?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let seeds = (0..*games).map(|_| rng.random()).collect::<Vec<PieceSeed>>();

    let report = evaluate(&agent, &config.game, &seeds, *piece_limit);
    for (i, game) in report.games.iter().enumerate() {
        info!(
            game = i + 1,
            seed = %game.seed,
            score = game.score,
            lines = game.lines,
            pieces = game.pieces,
            topped_out = game.topped_out,
            "game finished"
        );
    }
    info!(
        average_score = report.average_score(),
        best_score = report.best_score(),
        average_pieces = report.average_pieces(),
        "evaluation finished"
    );

    Output::save_json(&report, output.clone())?;
    Ok(())
}
