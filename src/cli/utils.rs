//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use rconfig::parse::coerce_scalar;
use rconfig::settings::parse_bool;
use rconfig::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Split a `KEY=VALUE` assignment, coercing the value like a command-line
/// flag value.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), coerce_scalar(value)))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

pub fn parse_bool_arg(raw: &str) -> Result<bool, String> {
    parse_bool(raw).ok_or_else(|| format!("expected a boolean, got `{raw}`"))
}

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to render JSON output")
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to render YAML output"),
    }
}
