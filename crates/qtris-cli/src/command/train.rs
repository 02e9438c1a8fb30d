use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use qtris_agent::{QAgent, QModel, StateEncoding, Trainer};
use tracing::info;

use crate::{
    config::AppConfig,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of training games
    #[clap(long, default_value_t = 1000)]
    episodes: usize,
    /// State encoding (contour, full-grid) [default: contour]
    ///
    /// A resumed model keeps its own encoding; a different value here is an error.
    #[clap(long)]
    encoding: Option<StateEncoding>,
    /// Seed for exploration and piece sequences
    #[clap(long)]
    seed: Option<u64>,
    /// End a game after this many pieces
    #[clap(long, default_value_t = Trainer::DEFAULT_PIECE_LIMIT)]
    piece_limit: usize,
    /// Log progress every N games (0 disables)
    #[clap(long, default_value_t = Trainer::DEFAULT_LOG_INTERVAL)]
    log_interval: usize,
    /// Continue training this model file
    #[clap(long)]
    resume: Option<PathBuf>,
    /// Model name stored in the output
    #[clap(long)]
    name: Option<String>,
    /// Output file path (stdout if omitted)
    #[clap(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg, config: &AppConfig) -> anyhow::Result<()> {
    let TrainArg {
        episodes,
        seed,
        piece_limit,
        log_interval,
        name,
        output,
        ..
    } = arg;

    let (agent, previous_episodes) = initial_agent(arg, config)?;

    let mut trainer = Trainer::new(agent, config.game.clone())
        .with_piece_limit(*piece_limit)
        .with_log_interval(*log_interval);
    if let Some(seed) = seed {
        trainer = trainer.with_seed(*seed);
    }

    info!(
        episodes,
        encoding = %trainer.agent().encoding(),
        "training started"
    );
    let stats = trainer.train(*episodes);
    info!(
        games = stats.games_played(),
        average_score = stats.average_score(),
        best_score = stats.best_score(),
        "training finished"
    );

    let name = name
        .clone()
        .unwrap_or_else(|| format!("qtris-{}", Utc::now().format("%Y%m%d-%H%M%S")));
    let agent = trainer.into_agent();
    let model = QModel::from_agent(name, &agent, &config.game, previous_episodes + episodes);
    info!(
        states = agent.table().state_count(),
        entries = model.entries.len(),
        "model built"
    );

    Output::save_json(&model, output.clone())?;
    Ok(())
}

/// Builds a fresh agent, or loads the model to resume with its episode count.
///
/// A resumed model keeps its encoding and learning parameters; the `learning` section of
/// the configuration only applies to fresh agents.
fn initial_agent(arg: &TrainArg, config: &AppConfig) -> anyhow::Result<(QAgent, usize)> {
    let Some(path) = &arg.resume else {
        let encoding = arg.encoding.unwrap_or_default();
        let agent = match arg.seed {
            Some(seed) => QAgent::with_seed(encoding, config.learning, seed),
            None => QAgent::new(encoding, config.learning),
        };
        return Ok((agent, 0));
    };

    let model = util::read_model_file(path)?;
    model
        .check_config(&config.game)
        .with_context(|| format!("Model {} cannot play this game", path.display()))?;
    if let Some(encoding) = arg.encoding {
        anyhow::ensure!(
            encoding == model.encoding,
            "Model {} uses the {} encoding, not {encoding}",
            path.display(),
            model.encoding
        );
    }
    let previous = model.episodes;
    info!(
        path = %path.display(),
        previous,
        encoding = %model.encoding,
        "resuming model"
    );
    Ok((model.into_agent()?, previous))
}
