//! Source descriptors

use serde::Serialize;
use std::fmt;

use super::Mapping;
use crate::trace::Trace;

/// Where a unit of configuration came from. Variants are listed in the order
/// the loader applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    DefaultFile,
    InlineString,
    File,
    CliArgs,
    ExplicitMapping,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::DefaultFile => "default_file",
            SourceKind::InlineString => "inline_string",
            SourceKind::File => "file",
            SourceKind::CliArgs => "cli_args",
            SourceKind::ExplicitMapping => "explicit_mapping",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ordered, parsed unit of configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescriptor {
    pub kind: SourceKind,
    pub mapping: Mapping,
    /// File path, URL, literal string content or joined CLI tokens.
    pub token: Option<String>,
}

impl SourceDescriptor {
    pub fn new(kind: SourceKind, mapping: Mapping, token: Option<String>) -> Self {
        Self { kind, mapping, token }
    }

    pub fn trace(&self) -> Trace {
        Trace::Source { kind: self.kind, value: self.token.clone() }
    }
}
