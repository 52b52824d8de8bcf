//! Delimited text sources
//!
//! One `key<sep>value` pair per line. Blank lines and lines starting with `#`
//! are skipped, keys may be dot-separated to nest, and values are coerced the
//! way a YAML scalar would be.

use crate::domain::{Mapping, Value};
use crate::error::{RconfigError, Result};
use crate::transform::nest;

use super::formats::yaml_number;

pub fn parse_text(content: &str, sep: &str, origin: &str) -> Result<Mapping> {
    let mut flat = Mapping::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(sep) else {
            return Err(RconfigError::load(
                origin,
                format!("line {}: expected `key{sep}value`", index + 1),
            ));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(RconfigError::load(origin, format!("line {}: missing key", index + 1)));
        }
        if flat.contains_key(key) {
            return Err(RconfigError::naming(format!(
                "{origin}: line {}: key '{key}' is declared more than once",
                index + 1
            )));
        }
        flat.insert(key.to_string(), coerce_scalar(value.trim()));
    }
    nest(&flat).map_err(|e| e.in_source(origin))
}

/// Interpret a bare token as a scalar: numbers, booleans and `null` are typed,
/// everything else stays a string.
pub fn coerce_scalar(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::string(raw);
    }
    match serde_yaml::from_str::<serde_yaml::Value>(raw) {
        Ok(serde_yaml::Value::Bool(b)) => Value::from(b),
        Ok(serde_yaml::Value::Number(n)) => yaml_number(&n),
        Ok(serde_yaml::Value::Null) => Value::null(),
        _ => Value::string(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping;

    #[test]
    fn test_parse_text_nests_dotted_keys() {
        let content = "# database\ndb.host = a\ndb.port=5432\n\nname = my app\n";
        let m = parse_text(content, "=", "app.txt").expect("text");
        assert_eq!(
            m,
            mapping! { "db" => mapping! { "host" => "a", "port" => 5432 }, "name" => "my app" }
        );
    }

    #[test]
    fn test_parse_text_custom_separator() {
        let m = parse_text("a: 1\nb: x=y\n", ":", "app.txt").expect("text");
        assert_eq!(m, mapping! { "a" => 1, "b" => "x=y" });
    }

    #[test]
    fn test_parse_text_splits_on_first_separator_only() {
        let m = parse_text("url=http://h/?a=b\n", "=", "app.txt").expect("text");
        assert_eq!(m["url"], Value::from("http://h/?a=b"));
    }

    #[test]
    fn test_parse_text_rejects_lines_without_separator() {
        let err = parse_text("a=1\noops\n", "=", "app.txt").expect_err("bad line");
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_text_rejects_structural_conflicts() {
        let err = parse_text("a=1\na.b=2\n", "=", "app.txt").expect_err("conflict");
        assert!(matches!(err, RconfigError::Naming(_)));
        assert!(err.to_string().contains("app.txt"));
    }

    #[test]
    fn test_parse_text_rejects_repeated_keys() {
        let err = parse_text("a=1\nb=2\na = 3\n", "=", "app.txt").expect_err("repeated key");
        assert!(matches!(err, RconfigError::Naming(_)));
        let msg = err.to_string();
        assert!(msg.contains("app.txt"));
        assert!(msg.contains("line 3"));
    }

    #[test]
    fn test_coerce_scalar() {
        assert_eq!(coerce_scalar("5432"), Value::from(5432));
        assert_eq!(coerce_scalar("1.5"), Value::from(1.5));
        assert_eq!(coerce_scalar("true"), Value::from(true));
        assert_eq!(coerce_scalar("null"), Value::null());
        assert_eq!(coerce_scalar("hello"), Value::from("hello"));
        assert_eq!(coerce_scalar("[1, 2]"), Value::from("[1, 2]"));
        assert_eq!(coerce_scalar("!expr today()"), Value::from("!expr today()"));
        assert_eq!(coerce_scalar(""), Value::from(""));
    }
}
