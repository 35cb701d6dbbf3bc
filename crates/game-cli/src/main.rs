mod config;
mod play;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use game_api::ServerError;
use game_core::{Catalog, CatalogError, GameError};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::CliConfig;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("terminal io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Quiz-gated hidden-role game against bot coworkers.
#[derive(Parser)]
#[command(name = "traitors", version, about = "Find the traitors before they find you")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively on stdin
    Play(GameArgs),

    /// Play on autopilot and print the event log as JSON lines
    Simulate(GameArgs),

    /// Serve the HTTP API
    Serve {
        /// Listen address, overrides `bind_addr`
        addr: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Overrides for the layered configuration.
#[derive(Debug, Args, Default)]
struct GameArgs {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    traitors: Option<usize>,
    /// Character id to play as
    #[arg(long)]
    human: Option<String>,
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    reveal_delay_ms: Option<u64>,
}

impl GameArgs {
    fn apply(self, config: &mut CliConfig) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(traitors) = self.traitors {
            config.num_traitors = traitors;
        }
        if let Some(human) = self.human {
            config.human_id = Some(human);
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(delay) = self.reveal_delay_ms {
            config.reveal_delay_ms = delay;
        }
    }
}

fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let mut config = CliConfig::load()?;

    match cli.command {
        Commands::Play(args) => {
            args.apply(&mut config);
            init_tracing(&config);
            let catalog = Catalog::load_dir(&config.data_dir)?;
            play::interactive(&config, &catalog)
        }
        Commands::Simulate(args) => {
            args.apply(&mut config);
            init_tracing(&config);
            let catalog = Catalog::load_dir(&config.data_dir)?;
            play::simulate(&config, &catalog)
        }
        Commands::Serve { addr, data_dir } => {
            if let Some(addr) = addr {
                config.bind_addr = addr;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            init_tracing(&config);
            let addr = config.bind_addr()?;
            let catalog = Catalog::load_dir(&config.data_dir)?;
            info!(%addr, data_dir = %config.data_dir.display(), "starting server");
            println!("serving game api on http://{addr}");
            game_api::serve(addr, catalog).await?;
            Ok(())
        }
    }
}
