//! Command-line interface for repo-docs
//!
//! Provides `generate`, `update` and `info` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod generate;
mod info;
mod update;
mod utils;

/// Generate per-file repository documentation from call-graph context
#[derive(Parser)]
#[command(name = "repo-docs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Document every file of the call graph from scratch
    Generate(Box<generate::GenerateArgs>),

    /// Update existing documentation from the changes since a git revision
    Update(Box<update::UpdateArgs>),

    /// Show call-graph statistics and per-file context sizes
    Info(info::InfoArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Generate(args) => generate::run(*args, cli.verbose),
        Commands::Update(args) => update::run(*args, cli.verbose),
        Commands::Info(args) => info::run(args),
    }
}
