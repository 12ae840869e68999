use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser};
use tracing::Level;

mod subcommands;
use subcommands::{PagerSubcommand, PagerSubcommandDispatcher};

/// Command line arguments for `pager-cli`
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Verbosity level (0-4)
    #[arg(long, short, action = ArgAction::Count, default_value = "2")]
    v: u8,

    #[command(subcommand)]
    subcommand: PagerSubcommand,
}

fn main() -> Result<()> {
    let Args { v, subcommand } = Args::parse();

    init_tracing_subscriber(v)?;

    subcommand.dispatch()
}

/// Initializes the tracing subscriber
///
/// # Arguments
/// * `verbosity_level` - The verbosity level (0-4)
///
/// # Returns
/// * `Result<()>` - Ok if successful, Err otherwise.
fn init_tracing_subscriber(verbosity_level: u8) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(match verbosity_level {
            0 => Level::ERROR,
            1 => Level::WARN,
            2 => Level::INFO,
            3 => Level::DEBUG,
            _ => Level::TRACE,
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| anyhow!(e))
}
