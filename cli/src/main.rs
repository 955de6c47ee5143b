use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::{
    mileposts::{run_mileposts, MilepostsArgs},
    nearest::{run_nearest, NearestArgs},
    recalculate::{run_recalculate, RecalculateArgs},
};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    /// Path to a TOML configuration file (overrides `RAILREF_CONFIG`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Mileposts(MilepostsArgs),
    Recalculate(RecalculateArgs),
    Nearest(NearestArgs),
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Mileposts(args) => run_mileposts(args, &config),
        Commands::Recalculate(args) => run_recalculate(args, &config),
        Commands::Nearest(args) => run_nearest(args, &config),
    }
}
