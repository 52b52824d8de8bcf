//! rconfig: resolve one effective configuration from layered sources
//!
//! Sources are read in a fixed order (default file, inline JSON and file
//! flags, hierarchical command-line flags, explicit files, explicit mapping),
//! deep-merged with later sources winning, and optionally flattened into
//! dot-separated keys. Behavior flags resolve per call from overrides, the
//! environment, process options and defaults.
//!
//! ```no_run
//! use rconfig::{mapping, Rconfig};
//!
//! let resolved = Rconfig::new()
//!     .args(["--db.port", "5432"])
//!     .list(mapping! { "db" => mapping! { "host" => "localhost" } })
//!     .resolve()?;
//! assert_eq!(resolved.get("db.host").and_then(|v| v.as_str()), Some("localhost"));
//! # Ok::<(), rconfig::RconfigError>(())
//! ```

pub mod domain;
pub mod error;
pub mod fetch;
pub mod load;
pub mod merge;
pub mod parse;
pub mod resolve;
pub mod settings;
pub mod trace;
pub mod transform;

pub use domain::{mapping_from_pairs, Mapping, Scalar, SourceDescriptor, SourceKind, Value};
pub use error::{RconfigError, Result};
pub use resolve::{Rconfig, Resolved};
pub use settings::{EnvSnapshot, Options, Overrides, Settings};
pub use trace::Trace;
pub use transform::{flatten, nest};
