//! Resolve command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use rconfig::{mapping_from_pairs, nest, Rconfig, Value};

use super::utils::{parse_assignment, parse_bool_arg, render, OutputFormat};

#[derive(Args)]
pub struct ResolveArgs {
    /// Explicit configuration file or URL, applied after command-line sources (repeatable)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub files: Vec<String>,

    /// Explicit `KEY=VALUE` entry, applied last (repeatable, dotted keys nest)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, Value)>,

    /// Evaluate `!expr` markers (overrides R_RCONFIG_EVAL)
    #[arg(long, value_name = "BOOL", value_parser = parse_bool_arg)]
    pub eval: Option<bool>,

    /// Flatten the result into dot-separated keys
    #[arg(long)]
    pub flatten: bool,

    /// Include the source trace in the output
    #[arg(long)]
    pub debug: bool,

    /// Key/value separator for delimited text sources
    #[arg(long, value_name = "SEP")]
    pub sep: Option<String>,

    /// Directory relative sources are resolved against
    #[arg(short = 'C', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Source flags (`-j JSON`, `-f FILE`, `--a.b.c VALUE...`)
    #[arg(last = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

pub fn run(args: ResolveArgs) -> Result<()> {
    let mut builder = Rconfig::new().files(args.files).args(args.args);

    if !args.set.is_empty() {
        let flat = mapping_from_pairs(args.set).context("Invalid --set entries")?;
        builder = builder.list(nest(&flat).context("Invalid --set entries")?);
    }
    if let Some(eval) = args.eval {
        builder = builder.eval(eval);
    }
    if args.flatten {
        builder = builder.flatten(true);
    }
    if args.debug {
        builder = builder.debug(true);
    }
    if let Some(sep) = args.sep {
        builder = builder.sep(sep);
    }
    if let Some(dir) = args.dir {
        builder = builder.working_dir(dir);
    }

    let resolved = builder.resolve().context("Failed to resolve configuration")?;
    println!("{}", render(&resolved, args.format)?.trim_end());
    Ok(())
}
