//! Source fetching (local path or URL)

use std::path::Path;

use crate::error::{RconfigError, Result};

pub mod local;
pub mod remote;

/// Read a source that must exist.
///
/// Dispatches on the location:
/// - `http://` / `https://` → [`remote::fetch_url`]
/// - anything else → [`local::read_local`], relative to `working_dir`
pub fn fetch(location: &str, working_dir: &Path) -> Result<String> {
    fetch_if_present(location, working_dir)?
        .ok_or_else(|| RconfigError::load(location, "no such file or URL"))
}

/// Read a source, reporting absence as `None` rather than an error.
pub fn fetch_if_present(location: &str, working_dir: &Path) -> Result<Option<String>> {
    if remote::is_url(location) {
        remote::fetch_url(location)
    } else {
        local::read_local(&local::resolve_path(location, working_dir))
    }
}
