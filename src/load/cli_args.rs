//! Command-line source flags
//!
//! `-j`/`--json` carry an inline JSON document and `-f`/`--file` a file or
//! URL; each occurrence becomes its own source. Every other `--a.b.c` flag is
//! a hierarchical key whose following tokens are its value: none is `true`,
//! one is a scalar, more than one is a sequence.

use crate::domain::{Mapping, Value};
use crate::error::{RconfigError, Result};
use crate::parse::coerce_scalar;

/// Marks where the program's own arguments end and source flags begin.
pub const ARGS_BOUNDARY: &str = "--args";

/// An inline JSON or file flag, in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliSource {
    Json(String),
    File(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandLine {
    pub sources: Vec<CliSource>,
    /// Hierarchical flags keyed by their dotted name, not yet nested.
    pub flags: Mapping,
    /// The tokens that produced `flags`, for provenance.
    pub flag_tokens: Vec<String>,
}

impl CommandLine {
    pub fn parse<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut cmd = CommandLine::default();
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            i += 1;

            if let Some(kind) = source_flag(token) {
                let (name, inline) = split_inline(token);
                let value = match inline {
                    Some(value) => value.to_string(),
                    None => {
                        let value = tokens.get(i).ok_or_else(|| {
                            RconfigError::load("command line", format!("{name} requires a value"))
                        })?;
                        i += 1;
                        value.clone()
                    }
                };
                cmd.sources.push(match kind {
                    SourceFlag::Json => CliSource::Json(value),
                    SourceFlag::File => CliSource::File(value),
                });
                continue;
            }

            let Some(flag) = token.strip_prefix("--").filter(|f| !f.is_empty()) else {
                if token != "--" {
                    tracing::warn!(token = %token, "ignoring positional command-line token");
                }
                continue;
            };

            let (key, inline) = match flag.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (flag, None),
            };
            let mut values: Vec<&String> = Vec::new();
            let start = i;
            if inline.is_none() {
                while i < tokens.len() && !is_flag(&tokens[i]) {
                    values.push(&tokens[i]);
                    i += 1;
                }
            }

            let value = match (inline, values.as_slice()) {
                (Some(v), _) => coerce_scalar(v),
                (None, []) => Value::from(true),
                (None, [single]) => coerce_scalar(single),
                (None, many) => Value::Sequence(many.iter().map(|t| coerce_scalar(t)).collect()),
            };

            cmd.flag_tokens.push(token.clone());
            cmd.flag_tokens.extend(tokens[start..i].iter().cloned());
            // A repeated flag keeps its last value.
            cmd.flags.shift_remove(key);
            cmd.flags.insert(key.to_string(), value);
        }

        Ok(cmd)
    }
}

/// The tokens after [`ARGS_BOUNDARY`] when present, otherwise all of them.
pub fn trailing_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    match args.iter().position(|a| a == ARGS_BOUNDARY) {
        Some(pos) => args[pos + 1..].to_vec(),
        None => args,
    }
}

enum SourceFlag {
    Json,
    File,
}

fn source_flag(token: &str) -> Option<SourceFlag> {
    match split_inline(token).0 {
        "-j" | "--json" => Some(SourceFlag::Json),
        "-f" | "--file" => Some(SourceFlag::File),
        _ => None,
    }
}

fn is_flag(token: &str) -> bool {
    source_flag(token).is_some() || (token.starts_with("--") && token.len() > 2)
}

fn split_inline(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((name, value)) if name.starts_with('-') => (name, Some(value)),
        _ => (token, None),
    }
}
