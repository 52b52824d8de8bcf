//! Error types shared by every resolution stage

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RconfigError>;

/// Terminal failures of a resolution call. There is no partial result.
#[derive(Debug, Error)]
pub enum RconfigError {
    /// Missing, duplicate or separator-containing names, and structural conflicts
    /// between flat keys.
    #[error("naming error: {0}")]
    Naming(String),

    /// `nest(flatten(m))` did not reproduce `m`.
    #[error("internal consistency error: {0}")]
    Consistency(String),

    /// A file, URL or inline string could not be fetched, parsed or evaluated.
    #[error("failed to load {origin}: {message}")]
    Source { origin: String, message: String },
}

impl RconfigError {
    pub fn naming(message: impl Into<String>) -> Self {
        Self::Naming(message.into())
    }

    pub fn load(origin: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Source { origin: origin.into(), message: message.to_string() }
    }

    /// Prefix a naming error with the source it was raised for.
    pub fn in_source(self, origin: &str) -> Self {
        match self {
            Self::Naming(message) => Self::Naming(format!("{origin}: {message}")),
            other => other,
        }
    }
}
