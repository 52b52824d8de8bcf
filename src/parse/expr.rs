//! Expression markers
//!
//! String values starting with `!expr ` are replaced by the result of
//! evaluating the remainder. The default evaluator only knows a small, fixed
//! namespace of functions; anything outside it is an error.

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{Mapping, Scalar, Value};
use crate::error::{RconfigError, Result};

pub const EXPR_MARKER: &str = "!expr ";

static CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*\((.*)\)$").expect("valid regex")
});

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?$").expect("valid regex"));

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("syntax error in `{0}`")]
    Syntax(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("`{name}` expects {expected} argument(s), got {got}")]
    Arity { name: String, expected: &'static str, got: usize },

    #[error("`{name}` expects a string argument")]
    NotAString { name: String },
}

/// Evaluates the text following an expression marker.
pub trait ExpressionEvaluator {
    fn evaluate(&self, expression: &str) -> std::result::Result<Value, EvalError>;
}

/// The built-in namespace: literals, `env`, `cwd`, `today`, `now`, `upper`,
/// `lower` and `concat`.
#[derive(Debug, Clone, Default)]
pub struct NamespaceEvaluator {
    vars: HashMap<String, String>,
    cwd: PathBuf,
}

impl NamespaceEvaluator {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { vars: HashMap::new(), cwd: cwd.into() }
    }

    /// Evaluator seeing the whole process environment.
    pub fn from_process(cwd: impl Into<PathBuf>) -> Self {
        Self { vars: std::env::vars().collect(), cwd: cwd.into() }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    fn eval(&self, source: &str) -> std::result::Result<Value, EvalError> {
        let source = source.trim();
        if let Some(literal) = parse_literal(source) {
            return Ok(literal);
        }
        let caps = CALL_RE.captures(source).ok_or_else(|| EvalError::Syntax(source.to_string()))?;
        let args = split_args(&caps[2])
            .ok_or_else(|| EvalError::Syntax(source.to_string()))?
            .into_iter()
            .map(|arg| self.eval(arg))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.call(&caps[1], args)
    }

    fn call(&self, name: &str, args: Vec<Value>) -> std::result::Result<Value, EvalError> {
        let arity = |expected: &'static str| EvalError::Arity {
            name: name.to_string(),
            expected,
            got: args.len(),
        };
        match name {
            "env" => {
                let (var, default) = match args.as_slice() {
                    [var] => (var, None),
                    [var, default] => (var, Some(default)),
                    _ => return Err(arity("1 or 2")),
                };
                let var = var.as_str().ok_or(EvalError::NotAString { name: name.to_string() })?;
                Ok(match (self.vars.get(var), default) {
                    (Some(value), _) => Value::string(value.clone()),
                    (None, Some(default)) => default.clone(),
                    (None, None) => Value::null(),
                })
            }
            "cwd" if args.is_empty() => Ok(Value::string(self.cwd.display().to_string())),
            "today" if args.is_empty() => {
                Ok(Value::string(Local::now().format("%Y-%m-%d").to_string()))
            }
            "now" if args.is_empty() => Ok(Value::string(Local::now().to_rfc3339())),
            "cwd" | "today" | "now" => Err(arity("0")),
            "upper" | "lower" => {
                let [arg] = args.as_slice() else {
                    return Err(arity("1"));
                };
                let s = arg.as_str().ok_or(EvalError::NotAString { name: name.to_string() })?;
                Ok(Value::string(if name == "upper" { s.to_uppercase() } else { s.to_lowercase() }))
            }
            "concat" => {
                let mut out = String::new();
                for arg in &args {
                    match arg {
                        Value::Scalar(Scalar::Null) => {}
                        Value::Scalar(s) => out.push_str(&s.to_string()),
                        _ => return Err(EvalError::NotAString { name: name.to_string() }),
                    }
                }
                Ok(Value::string(out))
            }
            other => Err(EvalError::UnknownFunction(other.to_string())),
        }
    }
}

impl ExpressionEvaluator for NamespaceEvaluator {
    fn evaluate(&self, expression: &str) -> std::result::Result<Value, EvalError> {
        self.eval(expression)
    }
}

fn parse_literal(source: &str) -> Option<Value> {
    for quote in ['"', '\''] {
        if source.len() >= 2 && source.starts_with(quote) && source.ends_with(quote) {
            let inner = &source[1..source.len() - 1];
            if !inner.contains(quote) {
                return Some(Value::string(inner));
            }
        }
    }
    match source {
        "true" | "TRUE" => return Some(Value::from(true)),
        "false" | "FALSE" => return Some(Value::from(false)),
        "null" | "NULL" => return Some(Value::null()),
        _ => {}
    }
    if NUMBER_RE.is_match(source) {
        if let Ok(i) = source.parse::<i64>() {
            return Some(Value::from(i));
        }
        if let Ok(f) = source.parse::<f64>() {
            return Some(Value::from(f));
        }
    }
    None
}

/// Split call arguments on top-level commas. `None` on unbalanced input.
fn split_args(source: &str) -> Option<Vec<&str>> {
    if source.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.checked_sub(1)?,
            (None, ',') if depth == 0 => {
                parts.push(source[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return None;
    }
    parts.push(source[start..].trim());
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

/// Replace every marked string below `mapping` with its evaluated value.
pub fn evaluate_markers(
    mapping: &mut Mapping,
    evaluator: &dyn ExpressionEvaluator,
    origin: &str,
) -> Result<()> {
    for value in mapping.values_mut() {
        evaluate_value(value, evaluator, origin)?;
    }
    Ok(())
}

fn evaluate_value(
    value: &mut Value,
    evaluator: &dyn ExpressionEvaluator,
    origin: &str,
) -> Result<()> {
    match value {
        Value::Scalar(Scalar::String(s)) => {
            if let Some(code) = s.strip_prefix(EXPR_MARKER) {
                let evaluated = evaluator
                    .evaluate(code)
                    .map_err(|e| RconfigError::load(origin, format!("expression `{code}`: {e}")))?;
                *value = evaluated;
            }
        }
        Value::Scalar(_) => {}
        Value::Sequence(items) => {
            for item in items {
                evaluate_value(item, evaluator, origin)?;
            }
        }
        Value::Mapping(m) => evaluate_markers(m, evaluator, origin)?,
    }
    Ok(())
}
