//! Configuration values
//!
//! A configuration is an insertion-ordered mapping whose values are scalars,
//! sequences, or nested mappings. Sequences are leaves: merging replaces them
//! wholesale and flattening never produces keys inside them.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::error::{RconfigError, Result};
use crate::transform::KEY_SEPARATOR;

pub type Mapping = IndexMap<String, Value>;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

// NaN compares equal to NaN so a value always equals its own copy.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Integer(a), Scalar::Integer(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Scalar::String(a), Scalar::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Integer(n) => write!(f, "{n}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::String(s.into()))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    /// Look up a dot-separated path below this value.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        path.split(KEY_SEPARATOR)
            .try_fold(self, |current, segment| current.as_mapping()?.get(segment))
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(Scalar::Integer(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Scalar(Scalar::Integer(i64::from(n)))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(Scalar::Float(x))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Build a mapping from named entries, rejecting missing or repeated names.
///
/// This is the declaration-time check for explicit mappings: a duplicate is
/// reported here rather than silently resolved by a later merge.
pub fn mapping_from_pairs<I, K>(pairs: I) -> Result<Mapping>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    let mut mapping = Mapping::new();
    for (key, value) in pairs {
        let key = key.into();
        if key.is_empty() {
            return Err(RconfigError::naming("explicit mapping contains an unnamed entry"));
        }
        if mapping.contains_key(&key) {
            return Err(RconfigError::naming(format!(
                "explicit mapping declares '{key}' more than once"
            )));
        }
        mapping.insert(key, value);
    }
    Ok(mapping)
}

/// Build a [`Mapping`] literal. Later duplicates replace earlier ones; use
/// [`mapping_from_pairs`] when duplicates must be rejected.
///
/// ```
/// use rconfig::{mapping, Value};
///
/// let m = mapping! { "db" => mapping! { "host" => "a", "port" => 5432 } };
/// assert_eq!(m["db"].pointer("port"), Some(&Value::from(5432)));
/// ```
#[macro_export]
macro_rules! mapping {
    () => { $crate::Mapping::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut m = $crate::Mapping::new();
        $( m.insert(::std::string::String::from($key), $crate::Value::from($value)); )+
        m
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_from_pairs_rejects_duplicates() {
        let err = mapping_from_pairs(vec![("a", Value::from(1)), ("a", Value::from(2))])
            .expect_err("duplicate names should fail");
        assert!(matches!(err, RconfigError::Naming(_)));
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_mapping_from_pairs_rejects_unnamed() {
        let err = mapping_from_pairs(vec![("", Value::from(1))]).expect_err("empty name");
        assert!(matches!(err, RconfigError::Naming(_)));
    }

    #[test]
    fn test_mapping_from_pairs_keeps_order() {
        let m = mapping_from_pairs(vec![("z", Value::from(1)), ("a", Value::from(2))])
            .expect("mapping");
        let keys: Vec<&str> = m.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_pointer_walks_nested_mappings() {
        let m = Value::from(crate::mapping! { "a" => crate::mapping! { "b" => true } });
        assert_eq!(m.pointer("a.b"), Some(&Value::from(true)));
        assert_eq!(m.pointer("a.c"), None);
        assert_eq!(m.pointer("a.b.c"), None);
    }

    #[test]
    fn test_nan_equals_itself() {
        assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_ne!(Value::from(1.0), Value::from(1));
    }

    #[test]
    fn test_serializes_untagged() {
        let m = crate::mapping! { "a" => vec![1, 2], "b" => Value::null() };
        let json = serde_json::to_string(&m).expect("json");
        assert_eq!(json, r#"{"a":[1,2],"b":null}"#);
    }
}
