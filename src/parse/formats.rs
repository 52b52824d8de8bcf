//! Structured formats: YAML, JSON and TOML
//!
//! Each document is parsed to the format's generic value first and then
//! converted, so every format ends up in the same [`Value`] model.

use crate::domain::{Mapping, Scalar, Value};
use crate::error::{RconfigError, Result};

use super::expr::EXPR_MARKER;

pub fn parse_yaml(content: &str, origin: &str) -> Result<Mapping> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| RconfigError::load(origin, format!("invalid YAML: {e}")))?;
    match convert_yaml(raw, origin)? {
        Value::Mapping(m) => Ok(m),
        Value::Scalar(Scalar::Null) => Ok(Mapping::new()),
        _ => Err(RconfigError::load(origin, "top level of a YAML source must be a mapping")),
    }
}

pub fn parse_json(content: &str, origin: &str) -> Result<Mapping> {
    let raw: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| RconfigError::load(origin, format!("invalid JSON: {e}")))?;
    match convert_json(raw) {
        Value::Mapping(m) => Ok(m),
        Value::Scalar(Scalar::Null) => Ok(Mapping::new()),
        _ => Err(RconfigError::load(origin, "top level of a JSON source must be an object")),
    }
}

pub fn parse_toml(content: &str, origin: &str) -> Result<Mapping> {
    let raw: toml::Table = toml::from_str(content)
        .map_err(|e| RconfigError::load(origin, format!("invalid TOML: {e}")))?;
    Ok(raw.into_iter().map(|(k, v)| (k, convert_toml(v))).collect())
}

fn convert_yaml(value: serde_yaml::Value, origin: &str) -> Result<Value> {
    Ok(match value {
        serde_yaml::Value::Null => Value::null(),
        serde_yaml::Value::Bool(b) => Value::from(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::string(s),
        serde_yaml::Value::Sequence(items) => Value::Sequence(
            items.into_iter().map(|item| convert_yaml(item, origin)).collect::<Result<_>>()?,
        ),
        serde_yaml::Value::Mapping(m) => {
            let mut mapping = Mapping::with_capacity(m.len());
            for (key, item) in m {
                mapping.insert(yaml_key(key, origin)?, convert_yaml(item, origin)?);
            }
            Value::Mapping(mapping)
        }
        // `!expr code` becomes the marked string the evaluator looks for.
        serde_yaml::Value::Tagged(tagged) if tagged.tag == "expr" => match tagged.value {
            serde_yaml::Value::String(code) => Value::string(format!("{EXPR_MARKER}{code}")),
            other => {
                return Err(RconfigError::load(
                    origin,
                    format!("!expr must tag a string, found {other:?}"),
                ))
            }
        },
        serde_yaml::Value::Tagged(tagged) => {
            tracing::debug!(tag = %tagged.tag, origin, "ignoring unknown YAML tag");
            convert_yaml(tagged.value, origin)?
        }
    })
}

pub(crate) fn yaml_number(n: &serde_yaml::Number) -> Value {
    match (n.as_i64(), n.as_f64()) {
        (Some(i), _) => Value::from(i),
        (None, Some(f)) => Value::from(f),
        (None, None) => Value::string(n.to_string()),
    }
}

fn yaml_key(key: serde_yaml::Value, origin: &str) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => {
            Err(RconfigError::load(origin, format!("unsupported YAML mapping key {other:?}")))
        }
    }
}

fn convert_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::null(),
        serde_json::Value::Bool(b) => Value::from(b),
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Value::from(i),
            (None, Some(f)) => Value::from(f),
            (None, None) => Value::string(n.to_string()),
        },
        serde_json::Value::String(s) => Value::string(s),
        serde_json::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(convert_json).collect())
        }
        serde_json::Value::Object(m) => {
            Value::Mapping(m.into_iter().map(|(k, v)| (k, convert_json(v))).collect())
        }
    }
}

fn convert_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::string(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::from(b),
        toml::Value::Datetime(dt) => Value::string(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(convert_toml).collect()),
        toml::Value::Table(t) => {
            Value::Mapping(t.into_iter().map(|(k, v)| (k, convert_toml(v))).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping;

    #[test]
    fn test_yaml_nested_mapping() {
        let m = parse_yaml("db:\n  host: a\n  port: 5432\nratio: 0.5\non: true\n", "t.yml")
            .expect("yaml");
        assert_eq!(
            m,
            mapping! {
                "db" => mapping! { "host" => "a", "port" => 5432 },
                "ratio" => 0.5,
                "on" => true,
            }
        );
    }

    #[test]
    fn test_yaml_keeps_key_order() {
        let m = parse_yaml("z: 1\na: 2\nm: 3\n", "t.yml").expect("yaml");
        let keys: Vec<&str> = m.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_yaml_expr_tag_becomes_marked_string() {
        let m = parse_yaml("home: !expr env(\"HOME\")\n", "t.yml").expect("yaml");
        assert_eq!(m["home"], Value::string("!expr env(\"HOME\")"));
    }

    #[test]
    fn test_yaml_empty_document_is_empty_mapping() {
        assert!(parse_yaml("", "t.yml").expect("yaml").is_empty());
        assert!(parse_yaml("# only a comment\n", "t.yml").expect("yaml").is_empty());
    }

    #[test]
    fn test_yaml_non_mapping_top_level_is_error() {
        let err = parse_yaml("- a\n- b\n", "list.yml").expect_err("sequence");
        assert!(matches!(err, RconfigError::Source { .. }));
        assert!(err.to_string().contains("list.yml"));
    }

    #[test]
    fn test_yaml_syntax_error_names_origin() {
        let err = parse_yaml("a: [1, 2\n", "broken.yml").expect_err("syntax");
        assert!(err.to_string().contains("broken.yml"));
    }

    #[test]
    fn test_yaml_numeric_keys_become_strings() {
        let m = parse_yaml("1: one\ntrue: yes\n", "t.yml").expect("yaml");
        assert_eq!(m["1"], Value::from("one"));
        assert_eq!(m["true"], Value::from("yes"));
    }

    #[test]
    fn test_json_object() {
        let m = parse_json(r#"{"b": {"c": [1, 2.5, null]}, "a": "x"}"#, "inline").expect("json");
        assert_eq!(
            m,
            mapping! {
                "b" => mapping! { "c" => vec![Value::from(1), Value::from(2.5), Value::null()] },
                "a" => "x",
            }
        );
        let keys: Vec<&str> = m.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_json_non_object_is_error() {
        assert!(matches!(parse_json("[1]", "inline"), Err(RconfigError::Source { .. })));
        assert!(matches!(parse_json("{", "inline"), Err(RconfigError::Source { .. })));
    }

    #[test]
    fn test_toml_tables() {
        let m = parse_toml("title = 't'\n[db]\nport = 5432\nhosts = ['a', 'b']\n", "c.toml")
            .expect("toml");
        assert_eq!(
            m,
            mapping! {
                "title" => "t",
                "db" => mapping! { "port" => 5432, "hosts" => vec!["a", "b"] },
            }
        );
    }
}
