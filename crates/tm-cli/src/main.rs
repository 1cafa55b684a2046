//! Tidemark CLI - versioned SQL schema migrations for DuckDB

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{create, down, status, up};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Create(args) => create::execute(args, &cli.global),
        cli::Commands::Up => up::execute(&cli.global),
        cli::Commands::Down => down::execute(&cli.global),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
    }
}

/// Install the logger. `RUST_LOG` wins over the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
