//! rconfig: print the configuration resolved from layered sources

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
