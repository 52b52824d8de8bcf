//! Source parsing
//!
//! Turns file contents or inline strings into a [`Mapping`], picking the
//! format from the file extension, and evaluates expression markers when
//! evaluation is enabled.

use std::path::Path;

use crate::domain::Mapping;
use crate::error::Result;
use crate::fetch;
use crate::settings::Settings;

pub mod expr;
pub mod formats;
pub mod text;

pub use expr::{EvalError, ExpressionEvaluator, NamespaceEvaluator, EXPR_MARKER};
pub use text::coerce_scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
    Text,
}

impl Format {
    /// Pick a format from a path or URL. Unknown extensions are read as YAML.
    pub fn detect(location: &str) -> Format {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Format::Json,
            "toml" => Format::Toml,
            "txt" | "env" | "cfg" => Format::Text,
            _ => Format::Yaml,
        }
    }
}

pub struct SourceParser<'a> {
    eval: bool,
    sep: String,
    evaluator: &'a dyn ExpressionEvaluator,
}

impl<'a> SourceParser<'a> {
    pub fn new(settings: &Settings, evaluator: &'a dyn ExpressionEvaluator) -> Self {
        Self { eval: settings.eval, sep: settings.sep.clone(), evaluator }
    }

    pub fn parse_str(&self, content: &str, format: Format, origin: &str) -> Result<Mapping> {
        let mut mapping = match format {
            Format::Yaml => formats::parse_yaml(content, origin)?,
            Format::Json => formats::parse_json(content, origin)?,
            Format::Toml => formats::parse_toml(content, origin)?,
            Format::Text => text::parse_text(content, &self.sep, origin)?,
        };
        if self.eval {
            expr::evaluate_markers(&mut mapping, self.evaluator, origin)?;
        }
        Ok(mapping)
    }

    /// Fetch and parse a file or URL that must exist.
    pub fn parse_location(&self, location: &str, working_dir: &Path) -> Result<Mapping> {
        let content = fetch::fetch(location, working_dir)?;
        self.parse_str(&content, Format::detect(location), location)
    }

    /// Like [`parse_location`](Self::parse_location), but a missing file is `None`.
    pub fn parse_optional_location(
        &self,
        location: &str,
        working_dir: &Path,
    ) -> Result<Option<Mapping>> {
        match fetch::fetch_if_present(location, working_dir)? {
            Some(content) => self.parse_str(&content, Format::detect(location), location).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;
    use crate::mapping;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_format() {
        assert_eq!(Format::detect("rconfig.yml"), Format::Yaml);
        assert_eq!(Format::detect("conf/app.YAML"), Format::Yaml);
        assert_eq!(Format::detect("app.json"), Format::Json);
        assert_eq!(Format::detect("app.toml"), Format::Toml);
        assert_eq!(Format::detect("app.txt"), Format::Text);
        assert_eq!(Format::detect("https://h/x/app.json?token=1"), Format::Json);
        assert_eq!(Format::detect("no_extension"), Format::Yaml);
    }

    #[test]
    fn test_eval_toggle() {
        let evaluator = NamespaceEvaluator::new("/tmp");
        let on = Settings::default();
        let off = Settings { eval: false, ..Settings::default() };

        let parsed = SourceParser::new(&on, &evaluator)
            .parse_str("a: !expr upper('x')\n", Format::Yaml, "t")
            .expect("parse");
        assert_eq!(parsed, mapping! { "a" => "X" });

        let parsed = SourceParser::new(&off, &evaluator)
            .parse_str("a: !expr upper('x')\n", Format::Yaml, "t")
            .expect("parse");
        assert_eq!(parsed, mapping! { "a" => "!expr upper('x')" });
    }

    #[test]
    fn test_text_uses_configured_separator() {
        let evaluator = NamespaceEvaluator::new("/tmp");
        let settings = Settings { sep: ":".to_string(), ..Settings::default() };
        let parsed = SourceParser::new(&settings, &evaluator)
            .parse_str("a: 1\n", Format::Text, "t")
            .expect("parse");
        assert_eq!(parsed["a"], Value::from(1));
    }

    #[test]
    fn test_parse_location_and_optional_location() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("app.json"), r#"{"a": 1}"#).expect("write");
        let evaluator = NamespaceEvaluator::new(tmp.path());
        let settings = Settings::default();
        let parser = SourceParser::new(&settings, &evaluator);

        let parsed = parser.parse_location("app.json", tmp.path()).expect("parse");
        assert_eq!(parsed, mapping! { "a" => 1 });

        assert!(parser.parse_location("missing.yml", tmp.path()).is_err());
        assert!(parser.parse_optional_location("missing.yml", tmp.path()).expect("ok").is_none());
    }
}
