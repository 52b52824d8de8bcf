//! Ordered source loading
//!
//! Produces the sources of one resolution call in precedence order:
//!
//! 1. the default file (`R_RCONFIG_FILE` or `rconfig.yml`), when present
//! 2. each `-j`/`--json` and `-f`/`--file` flag, left to right
//! 3. all remaining `--a.b.c` flags, as a single source
//! 4. each explicit file, in the order given
//! 5. the explicit mapping
//!
//! Later sources override earlier ones when merged.

use std::path::Path;

use tracing::debug;

use crate::domain::{Mapping, SourceDescriptor, SourceKind};
use crate::error::Result;
use crate::parse::{Format, SourceParser};
use crate::settings::EnvSnapshot;
use crate::transform::nest;

pub mod cli_args;

pub use cli_args::{trailing_args, CliSource, CommandLine};

/// The five logical inputs of a resolution call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inputs<'a> {
    pub args: &'a [String],
    pub files: &'a [String],
    pub list: Option<&'a Mapping>,
}

pub struct SourceLoader<'a> {
    parser: &'a SourceParser<'a>,
    working_dir: &'a Path,
    env: &'a EnvSnapshot,
}

impl<'a> SourceLoader<'a> {
    pub fn new(parser: &'a SourceParser<'a>, working_dir: &'a Path, env: &'a EnvSnapshot) -> Self {
        Self { parser, working_dir, env }
    }

    pub fn load(&self, inputs: Inputs<'_>) -> Result<Vec<SourceDescriptor>> {
        let mut sources = Vec::new();

        if let Some(default) = self.default_source()? {
            sources.push(default);
        }

        let command_line = CommandLine::parse(inputs.args.iter().cloned())?;
        for source in &command_line.sources {
            sources.push(match source {
                CliSource::Json(text) => SourceDescriptor::new(
                    SourceKind::InlineString,
                    self.parser.parse_str(text, Format::Json, "inline JSON")?,
                    Some(text.clone()),
                ),
                CliSource::File(location) => self.file_source(location, SourceKind::File)?,
            });
        }

        if !command_line.flags.is_empty() {
            sources.push(SourceDescriptor::new(
                SourceKind::CliArgs,
                nest(&command_line.flags).map_err(|e| e.in_source("command line"))?,
                Some(command_line.flag_tokens.join(" ")),
            ));
        }

        for location in inputs.files {
            sources.push(self.file_source(location, SourceKind::File)?);
        }

        if let Some(list) = inputs.list {
            sources.push(SourceDescriptor::new(SourceKind::ExplicitMapping, list.clone(), None));
        }

        for source in &sources {
            debug!(
                kind = %source.kind,
                token = source.token.as_deref().unwrap_or(""),
                keys = source.mapping.len(),
                "loaded source"
            );
        }
        Ok(sources)
    }

    fn default_source(&self) -> Result<Option<SourceDescriptor>> {
        let location = self.env.default_file();
        match self.parser.parse_optional_location(location, self.working_dir)? {
            Some(mapping) => Ok(Some(SourceDescriptor::new(
                SourceKind::DefaultFile,
                mapping,
                Some(location.to_string()),
            ))),
            None => {
                debug!(location, "no default source");
                Ok(None)
            }
        }
    }

    fn file_source(&self, location: &str, kind: SourceKind) -> Result<SourceDescriptor> {
        let mapping = self.parser.parse_location(location, self.working_dir)?;
        Ok(SourceDescriptor::new(kind, mapping, Some(location.to_string())))
    }
}
