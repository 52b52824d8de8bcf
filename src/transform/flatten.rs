//! Nested -> flat conversion
//!
//! Flattening works on the unlisted form of a mapping: one dot-qualified name
//! per terminal value, where a sequence with more than one element contributes
//! one indexed name per element (`roles1`, `roles2`). Those names are then
//! reconciled with the keys that actually own them, resolved back against the
//! original mapping, and the indexed siblings of a sequence are collapsed into
//! a single entry again. Sequences are always emitted whole.
//!
//! The owner reconciliation is prefix based. When names produced by indexing a
//! sequence coincide with a sibling key below the top level (`b: [1, 2]` next
//! to `b1: 3`) the walk can pick the wrong key; this is reported as a naming
//! error rather than guessed at. The final round-trip check guarantees that a
//! successful result always nests back to the input.

use std::collections::{HashMap, HashSet};

use super::{nest, KEY_SEPARATOR};
use crate::domain::{Mapping, Value};
use crate::error::{RconfigError, Result};

/// One resolved flat entry before adjacent duplicates are collapsed.
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    key: String,
    chain: Vec<String>,
    value: Value,
}

/// Flatten `mapping` into dot-separated keys.
///
/// A mapping holding a single terminal value is returned unchanged. Names
/// must be non-empty and free of the separator at every level.
pub fn flatten(mapping: &Mapping) -> Result<Mapping> {
    let total: usize = mapping.values().map(count_terminals).sum();
    if total <= 1 {
        return Ok(mapping.clone());
    }

    validate_names(mapping, "")?;

    let mut names = unlist(mapping);
    let owners = owners(mapping);
    debug_assert_eq!(names.len(), owners.len());

    correct_first_segments(&mut names, &owners);
    // Every key owns at least one terminal and now starts its own names, so
    // nothing is orphaned after the depth-one correction.
    let repaired = repair_orphans(mapping.keys().map(String::as_str), &mut names, &owners);
    debug_assert_eq!(repaired, 0);

    let entries = materialize(mapping, &names)?;
    let flat = collapse(entries)?;

    let restored = nest(&flat)?;
    if restored != *mapping {
        return Err(RconfigError::Consistency(format!(
            "flattened keys [{}] do not nest back to the input",
            flat.keys().cloned().collect::<Vec<_>>().join(", ")
        )));
    }
    Ok(flat)
}

fn validate_names(mapping: &Mapping, parent: &str) -> Result<()> {
    for (key, value) in mapping {
        if key.is_empty() {
            let at = if parent.is_empty() { "top level" } else { parent };
            return Err(RconfigError::naming(format!("unnamed entry at {at}")));
        }
        if key.contains(KEY_SEPARATOR) {
            return Err(RconfigError::naming(format!(
                "name '{key}' contains the key separator '{KEY_SEPARATOR}'"
            )));
        }
        if let Value::Mapping(nested) = value {
            validate_names(nested, &join(parent, key))?;
        }
    }
    Ok(())
}

/// Number of names `unlist` produces for `value`. Empty containers count once.
fn count_terminals(value: &Value) -> usize {
    match value {
        Value::Scalar(_) => 1,
        Value::Sequence(items) if items.len() > 1 => items.iter().map(count_terminals).sum(),
        Value::Sequence(items) => items.first().map_or(1, count_terminals),
        Value::Mapping(m) if m.is_empty() => 1,
        Value::Mapping(m) => m.values().map(count_terminals).sum(),
    }
}

fn unlist(mapping: &Mapping) -> Vec<String> {
    let mut names = Vec::new();
    for (key, value) in mapping {
        unlist_value(key.clone(), value, &mut names);
    }
    names
}

fn unlist_value(name: String, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Scalar(_) => out.push(name),
        Value::Sequence(items) if items.len() > 1 => {
            for (index, item) in items.iter().enumerate() {
                unlist_value(format!("{name}{}", index + 1), item, out);
            }
        }
        Value::Sequence(items) => match items.first() {
            Some(item) => unlist_value(name, item, out),
            None => out.push(name),
        },
        Value::Mapping(m) if m.is_empty() => out.push(name),
        Value::Mapping(m) => {
            for (key, nested) in m {
                unlist_value(join(&name, key), nested, out);
            }
        }
    }
}

/// Top-level key owning each unlisted name, by position.
fn owners(mapping: &Mapping) -> Vec<String> {
    mapping
        .iter()
        .flat_map(|(key, value)| std::iter::repeat(key.clone()).take(count_terminals(value)))
        .collect()
}

fn first_segment(name: &str) -> &str {
    name.split(KEY_SEPARATOR).next().unwrap_or(name)
}

fn replace_first_segment(name: &str, owner: &str) -> String {
    match name.split_once(KEY_SEPARATOR) {
        Some((_, rest)) => format!("{owner}{KEY_SEPARATOR}{rest}"),
        None => owner.to_string(),
    }
}

/// Rewrite the first segment of each name to its owner. Indexing a top-level
/// sequence yields `roles1`, `roles2` for the key `roles`.
fn correct_first_segments(names: &mut [String], owners: &[String]) {
    for (name, owner) in names.iter_mut().zip(owners) {
        if first_segment(name) != owner {
            *name = replace_first_segment(name, owner);
        }
    }
}

/// Hand terminals to top-level keys that no name starts with.
///
/// Each orphaned key claims the owner sharing the longest leading-character
/// run with it. Owners claimed by more than one orphan are ambiguous and left
/// alone. Orphans only arise when `names` and `owners` disagree. Returns the
/// number of keys that took over terminals.
fn repair_orphans<'a, I>(keys: I, names: &mut [String], owners: &[String]) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let present: HashSet<String> = names.iter().map(|n| first_segment(n).to_string()).collect();
    let orphans: Vec<&str> = keys.into_iter().filter(|k| !present.contains(*k)).collect();
    if orphans.is_empty() {
        return 0;
    }

    let mut distinct: Vec<&str> = Vec::new();
    for owner in owners {
        if !distinct.contains(&owner.as_str()) {
            distinct.push(owner);
        }
    }

    let mut claims: Vec<(&str, &str)> = Vec::new();
    for orphan in &orphans {
        let best = distinct
            .iter()
            .map(|owner| (*owner, shared_root(orphan, owner).len()))
            .filter(|(_, len)| *len > 0)
            .fold(None, |best: Option<(&str, usize)>, candidate| match best {
                Some((_, len)) if len >= candidate.1 => best,
                _ => Some(candidate),
            });
        if let Some((owner, _)) = best {
            claims.push((*orphan, owner));
        }
    }

    let mut claim_counts: HashMap<&str, usize> = HashMap::new();
    for (_, owner) in &claims {
        *claim_counts.entry(*owner).or_default() += 1;
    }

    let mut repaired = 0;
    for (orphan, owner) in claims {
        if claim_counts.get(owner).copied().unwrap_or(0) > 1 {
            tracing::debug!(orphan, owner, "ambiguous root, leaving terminals in place");
            continue;
        }
        repaired += 1;
        tracing::debug!(orphan, owner, "reassigning terminals to orphaned key");
        for (name, name_owner) in names.iter_mut().zip(owners) {
            if name_owner == owner {
                *name = replace_first_segment(name, orphan);
            }
        }
    }
    repaired
}

/// Resolve each name against `mapping`, stopping at the first value that is
/// not a non-empty mapping.
fn materialize(mapping: &Mapping, names: &[String]) -> Result<Vec<Entry>> {
    names
        .iter()
        .map(|name| {
            let mut current = mapping;
            let mut chain: Vec<String> = Vec::new();
            let mut value: Option<&Value> = None;
            for segment in name.split(KEY_SEPARATOR) {
                let (key, found) = lookup(current, segment)?.ok_or_else(|| {
                    RconfigError::naming(format!(
                        "cannot resolve '{segment}' of flattened name '{name}'"
                    ))
                })?;
                chain.push(key.clone());
                value = Some(found);
                match found {
                    Value::Mapping(m) if !m.is_empty() => current = m,
                    _ => break,
                }
            }
            let value = value
                .ok_or_else(|| RconfigError::naming(format!("empty flattened name '{name}'")))?;
            let key = chain.join(KEY_SEPARATOR.to_string().as_str());
            Ok(Entry { key, chain, value: value.clone() })
        })
        .collect()
}

/// Find `segment` in `mapping`, falling back to the sequence key it was
/// indexed from (`roles2` -> `roles`).
///
/// Elements of nested sequences carry one index per level (`matrix12`). The
/// walk stops at the outer sequence, so when no key matches a single index
/// exactly, a suffix whose leading index fits the sequence is accepted.
fn lookup<'m>(mapping: &'m Mapping, segment: &str) -> Result<Option<(&'m String, &'m Value)>> {
    if let Some(found) = mapping.get_key_value(segment) {
        return Ok(Some(found));
    }

    let mut candidates = indexed_candidates(mapping, segment, |index, len| {
        index.parse::<usize>().map_or(false, |i| i >= 1 && i <= len)
    });
    if candidates.is_empty() {
        candidates = indexed_candidates(mapping, segment, |index, len| {
            (1..index.len()).any(|end| {
                index[..end].parse::<usize>().map_or(false, |i| i >= 1 && i <= len)
            })
        });
    }

    match candidates.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(*only)),
        _ => Err(RconfigError::naming(format!(
            "'{segment}' could index more than one sequence: {}",
            candidates.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>().join(", ")
        ))),
    }
}

/// Sequence entries whose key prefixes `segment` with an all-digit index
/// accepted by `fits`.
fn indexed_candidates<'m, F>(
    mapping: &'m Mapping,
    segment: &str,
    fits: F,
) -> Vec<(&'m String, &'m Value)>
where
    F: Fn(&str, usize) -> bool,
{
    mapping
        .iter()
        .filter(|(key, value)| {
            let Some(index) = segment.strip_prefix(key.as_str()) else {
                return false;
            };
            let Value::Sequence(items) = value else {
                return false;
            };
            !index.is_empty()
                && index.bytes().all(|b| b.is_ascii_digit())
                && fits(index, items.len())
        })
        .collect()
}

/// Collapse runs of adjacent entries that resolved to the same value through
/// the same chain of keys, then reject any path that is still repeated.
fn collapse(entries: Vec<Entry>) -> Result<Mapping> {
    let mut kept: Vec<Entry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(last) = kept.last_mut() {
            if last.chain == entry.chain && last.value == entry.value {
                last.key = shared_root(&last.key, &entry.key)
                    .trim_end_matches(KEY_SEPARATOR)
                    .to_string();
                continue;
            }
        }
        kept.push(entry);
    }

    let mut flat = Mapping::with_capacity(kept.len());
    for entry in kept {
        if flat.contains_key(&entry.key) {
            return Err(RconfigError::naming(format!(
                "flattened name '{}' is produced by more than one value",
                entry.key
            )));
        }
        flat.insert(entry.key, entry.value);
    }
    Ok(flat)
}

/// Longest common leading run of characters.
fn shared_root<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()));
    &a[..end]
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{KEY_SEPARATOR}{key}")
    }
}
