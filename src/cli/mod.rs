//! Command-line interface for rconfig
//!
//! Provides `resolve`, `flatten` and `nest` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod resolve;
mod transform;
mod utils;

/// Resolve one configuration from layered files, inline JSON, flags and mappings
#[derive(Parser)]
#[command(name = "rconfig")]
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
    /// Resolve and print the effective configuration
    Resolve(Box<resolve::ResolveArgs>),

    /// Print a configuration file with dot-separated keys
    Flatten(transform::TransformArgs),

    /// Print a configuration file with dot-separated keys expanded
    Nest(transform::TransformArgs),
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
        Commands::Resolve(args) => resolve::run(*args),
        Commands::Flatten(args) => transform::run_flatten(args),
        Commands::Nest(args) => transform::run_nest(args),
    }
}
