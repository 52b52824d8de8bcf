//! Deep merge of configuration mappings
//!
//! Later mappings override earlier ones key by key. Recursion only happens
//! where both sides hold a mapping; every other combination is a replacement,
//! so sequences are never concatenated.

use crate::domain::{Mapping, Value};

/// Merge `incoming` into `base`, overriding on conflicts.
pub fn deep_merge(base: &mut Mapping, incoming: Mapping) {
    for (key, value) in incoming {
        match (base.get_mut(&key), value) {
            (Some(Value::Mapping(existing)), Value::Mapping(nested)) => {
                deep_merge(existing, nested);
            }
            (Some(slot), value) => *slot = value,
            (None, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Fold `mappings` left to right starting from an empty mapping.
pub fn merge_all<I>(mappings: I) -> Mapping
where
    I: IntoIterator<Item = Mapping>,
{
    mappings.into_iter().fold(Mapping::new(), |mut acc, next| {
        deep_merge(&mut acc, next);
        acc
    })
}
