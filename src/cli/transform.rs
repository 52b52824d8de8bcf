//! Flatten and nest command implementations

use anyhow::{Context, Result};
use clap::Args;

use rconfig::parse::{NamespaceEvaluator, SourceParser};
use rconfig::{flatten, nest, EnvSnapshot, Mapping, Options, Overrides, Settings};

use super::utils::{render, OutputFormat};

#[derive(Args)]
pub struct TransformArgs {
    /// Configuration file or URL to read
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

pub fn run_flatten(args: TransformArgs) -> Result<()> {
    let mapping = read(&args.file)?;
    let flat = flatten(&mapping).with_context(|| format!("Failed to flatten {}", args.file))?;
    println!("{}", render(&flat, args.format)?.trim_end());
    Ok(())
}

pub fn run_nest(args: TransformArgs) -> Result<()> {
    let mapping = read(&args.file)?;
    let nested = nest(&mapping).with_context(|| format!("Failed to nest {}", args.file))?;
    println!("{}", render(&nested, args.format)?.trim_end());
    Ok(())
}

fn read(location: &str) -> Result<Mapping> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let settings =
        Settings::resolve(&Overrides::default(), &EnvSnapshot::capture(), &Options::new());
    let evaluator = NamespaceEvaluator::from_process(cwd.clone());
    let parser = SourceParser::new(&settings, &evaluator);
    parser
        .parse_location(location, &cwd)
        .with_context(|| format!("Failed to read {location}"))
}
