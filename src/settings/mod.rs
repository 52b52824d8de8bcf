//! Behavior flags
//!
//! Each flag resolves, highest first, from a call-time override, an
//! environment variable, a process-wide option, and finally a built-in
//! default. Resolution happens once per call into a [`Settings`] value that is
//! passed explicitly, so overrides never touch the process environment and
//! there is nothing to restore afterwards.

use std::collections::HashMap;

use tracing::debug;

pub const ENV_FILE: &str = "R_RCONFIG_FILE";
pub const DEFAULT_FILE: &str = "rconfig.yml";
pub const DEFAULT_SEP: &str = "=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Eval,
    Flatten,
    Debug,
    Sep,
}

impl Flag {
    pub const ALL: [Flag; 4] = [Flag::Eval, Flag::Flatten, Flag::Debug, Flag::Sep];

    pub fn env_var(self) -> &'static str {
        match self {
            Flag::Eval => "R_RCONFIG_EVAL",
            Flag::Flatten => "R_RCONFIG_FLATTEN",
            Flag::Debug => "R_RCONFIG_DEBUG",
            Flag::Sep => "R_RCONFIG_SEP",
        }
    }

    pub fn option_name(self) -> &'static str {
        match self {
            Flag::Eval => "rconfig.eval",
            Flag::Flatten => "rconfig.flatten",
            Flag::Debug => "rconfig.debug",
            Flag::Sep => "rconfig.sep",
        }
    }
}

/// The environment variables this crate reads, captured at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Read the flag variables and `R_RCONFIG_FILE` from the process environment.
    pub fn capture() -> Self {
        let names = Flag::ALL.iter().map(|f| f.env_var()).chain(std::iter::once(ENV_FILE));
        let vars = names
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_string(), value)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self { vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Name of the default source: `R_RCONFIG_FILE` when set and non-empty.
    pub fn default_file(&self) -> &str {
        match self.get(ENV_FILE) {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_FILE,
        }
    }
}

/// Process-wide option values (`rconfig.eval`, ...), owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: HashMap<String, String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.values.insert(name.into(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Call-time overrides. `None` defers to the lower tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub eval: Option<bool>,
    pub flatten: Option<bool>,
    pub debug: Option<bool>,
    pub sep: Option<String>,
}

/// Effective flag values for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub eval: bool,
    pub flatten: bool,
    pub debug: bool,
    pub sep: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self { eval: true, flatten: false, debug: false, sep: DEFAULT_SEP.to_string() }
    }
}

impl Settings {
    /// Resolve every flag. Never fails: unparseable values fall through to the
    /// next tier.
    pub fn resolve(overrides: &Overrides, env: &EnvSnapshot, options: &Options) -> Self {
        let defaults = Settings::default();
        Self {
            eval: resolve_bool(Flag::Eval, overrides.eval, env, options, defaults.eval),
            flatten: resolve_bool(Flag::Flatten, overrides.flatten, env, options, defaults.flatten),
            debug: resolve_bool(Flag::Debug, overrides.debug, env, options, defaults.debug),
            sep: resolve_sep(overrides.sep.as_deref(), env, options, defaults.sep),
        }
    }
}

fn resolve_bool(
    flag: Flag,
    call: Option<bool>,
    env: &EnvSnapshot,
    options: &Options,
    default: bool,
) -> bool {
    if let Some(value) = call {
        debug!(flag = flag.option_name(), value, "flag set by call override");
        return value;
    }
    if let Some(value) = env.get(flag.env_var()).and_then(parse_bool) {
        debug!(flag = flag.option_name(), value, "flag set by environment");
        return value;
    }
    if let Some(value) = options.get(flag.option_name()).and_then(parse_bool) {
        debug!(flag = flag.option_name(), value, "flag set by option");
        return value;
    }
    default
}

fn resolve_sep(
    call: Option<&str>,
    env: &EnvSnapshot,
    options: &Options,
    default: String,
) -> String {
    let flag = Flag::Sep;
    [call, env.get(flag.env_var()), options.get(flag.option_name())]
        .into_iter()
        .flatten()
        .find(|sep| !sep.is_empty())
        .map(str::to_string)
        .unwrap_or(default)
}

/// Logical coercion for flag values. Returns `None` for anything unrecognised.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}
