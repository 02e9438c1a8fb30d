use std::{fs::File, path::PathBuf, sync::Mutex};

use anyhow::Context as _;
use tracing::{Level, info};
use tracing_subscriber::{filter::LevelFilter, prelude::*};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LogArg {
    /// Log level (error, warn, info, debug, trace)
    #[clap(long, global = true, default_value_t = Level::INFO)]
    log_level: Level,
    /// Write logs to this file. Interactive modes log nothing without it
    #[clap(long, global = true)]
    log_file: Option<PathBuf>,
}

/// Where log events go for the selected mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogTarget {
    /// Headless modes log to stderr.
    Stderr,
    /// The terminal belongs to the UI; only a log file is allowed.
    FileOnly,
}

impl LogArg {
    /// Installs the global subscriber.
    pub(crate) fn init(&self, target: LogTarget) -> anyhow::Result<()> {
        let filter = LevelFilter::from_level(self.log_level);
        let registry = tracing_subscriber::registry().with(filter);

        match (&self.log_file, target) {
            (Some(path), _) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create log file: {}", path.display()))?;
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_target(false)
                            .with_ansi(false)
                            .with_writer(Mutex::new(file)),
                    )
                    .init();
            }
            (None, LogTarget::Stderr) => {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_target(false)
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            (None, LogTarget::FileOnly) => return Ok(()),
        }

        info!(level = %self.log_level, "logging initialized");
        Ok(())
    }
}
