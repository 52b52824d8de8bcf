//! Flat -> nested conversion

use std::collections::HashSet;

use super::KEY_SEPARATOR;
use crate::domain::{Mapping, Value};
use crate::error::{RconfigError, Result};

/// Rebuild a nested mapping from dot-separated keys.
///
/// Each key is split on [`KEY_SEPARATOR`]; intermediate mappings are created
/// as needed. A key that ends where another key continues (`a` and `a.b`)
/// is a naming error, whichever order they appear in.
pub fn nest(flat: &Mapping) -> Result<Mapping> {
    let mut root = Mapping::new();
    let mut leaves: HashSet<String> = HashSet::new();

    for (key, value) in flat {
        let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(RconfigError::naming(format!("flat key '{key}' has an empty segment")));
        }
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };

        let mut current = &mut root;
        let mut path = String::new();
        for segment in parents {
            if !path.is_empty() {
                path.push(KEY_SEPARATOR);
            }
            path.push_str(segment);
            if leaves.contains(&path) {
                return Err(conflict(&path, key));
            }
            current = match current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Mapping(Mapping::new()))
            {
                Value::Mapping(m) => m,
                _ => return Err(conflict(&path, key)),
            };
        }

        if current.contains_key(*last) {
            return Err(RconfigError::naming(format!(
                "flat key '{key}' conflicts with another key at the same path"
            )));
        }
        current.insert(last.to_string(), value.clone());
        leaves.insert(key.clone());
    }

    Ok(root)
}

fn conflict(path: &str, key: &str) -> RconfigError {
    RconfigError::naming(format!("'{path}' is a value but '{key}' uses it as a parent"))
}
