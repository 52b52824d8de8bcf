//! Top-level resolution
//!
//! [`Rconfig`] gathers the inputs of one call, resolves the behavior flags
//! once into a [`Settings`] value and runs the pipeline:
//!
//! ```text
//! settings -> load sources -> record trace -> deep merge -> flatten? -> Resolved
//! ```
//!
//! Nothing here mutates process state. Call-time overrides only live in the
//! `Settings` of the call that received them.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{mapping_from_pairs, Mapping, Value};
use crate::error::{RconfigError, Result};
use crate::load::{trailing_args, Inputs, SourceLoader};
use crate::merge::merge_all;
use crate::parse::{ExpressionEvaluator, NamespaceEvaluator, SourceParser};
use crate::settings::{EnvSnapshot, Options, Overrides, Settings};
use crate::trace::{self, Trace};
use crate::transform::{flatten, KEY_SEPARATOR};

/// Builder for one resolution call.
///
/// ```no_run
/// use rconfig::Rconfig;
///
/// let resolved = Rconfig::new()
///     .file("conf/app.yml")
///     .with_process_args()
///     .debug(true)
///     .resolve()?;
/// println!("{:?}", resolved.get("db.host"));
/// # Ok::<(), rconfig::RconfigError>(())
/// ```
#[derive(Default)]
pub struct Rconfig {
    files: Vec<String>,
    list: Option<Mapping>,
    args: Vec<String>,
    overrides: Overrides,
    working_dir: Option<PathBuf>,
    env: Option<EnvSnapshot>,
    options: Options,
    evaluator: Option<Box<dyn ExpressionEvaluator>>,
}

impl Rconfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an explicit file or URL. Explicit files apply after command-line
    /// sources, in the order they were added.
    pub fn file(mut self, location: impl Into<String>) -> Self {
        self.files.push(location.into());
        self
    }

    pub fn files<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(locations.into_iter().map(Into::into));
        self
    }

    /// The explicit mapping, applied last.
    pub fn list(mut self, list: Mapping) -> Self {
        self.list = Some(list);
        self
    }

    /// Like [`list`](Self::list) but built from named entries, failing on
    /// unnamed or duplicate names.
    pub fn try_list<I, K>(self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Ok(self.list(mapping_from_pairs(pairs)?))
    }

    /// Command-line tokens to read `-j`, `-f` and `--a.b.c` flags from.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Use this process's arguments, starting after `--args` when present.
    pub fn with_process_args(self) -> Self {
        let args = trailing_args(std::env::args().skip(1));
        self.args(args)
    }

    pub fn eval(mut self, eval: bool) -> Self {
        self.overrides.eval = Some(eval);
        self
    }

    pub fn flatten(mut self, flatten: bool) -> Self {
        self.overrides.flatten = Some(flatten);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.overrides.debug = Some(debug);
        self
    }

    pub fn sep(mut self, sep: impl Into<String>) -> Self {
        self.overrides.sep = Some(sep.into());
        self
    }

    /// Directory relative paths are resolved against. Defaults to the
    /// current directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Environment to read flags and `R_RCONFIG_FILE` from. Defaults to a
    /// snapshot of the process environment taken at resolve time.
    ///
    /// A supplied snapshot is also the only environment `env()` expressions
    /// see; without one they read the process environment.
    pub fn env(mut self, env: EnvSnapshot) -> Self {
        self.env = Some(env);
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Replace the expression evaluator used for `!expr` markers.
    pub fn evaluator(mut self, evaluator: impl ExpressionEvaluator + 'static) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    /// The flag values this call would run with.
    pub fn settings(&self) -> Settings {
        match &self.env {
            Some(env) => Settings::resolve(&self.overrides, env, &self.options),
            None => Settings::resolve(&self.overrides, &EnvSnapshot::capture(), &self.options),
        }
    }

    pub fn resolve(&self) -> Result<Resolved> {
        let env = self.env.clone().unwrap_or_else(EnvSnapshot::capture);
        let settings = Settings::resolve(&self.overrides, &env, &self.options);
        let working_dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .map_err(|e| RconfigError::load("working directory", e))?,
        };
        debug!(?settings, working_dir = %working_dir.display(), "resolving configuration");

        let fallback;
        let evaluator: &dyn ExpressionEvaluator = match &self.evaluator {
            Some(custom) => custom.as_ref(),
            None => {
                fallback = match &self.env {
                    Some(snapshot) => {
                        NamespaceEvaluator::new(working_dir.clone()).with_vars(snapshot.iter())
                    }
                    None => NamespaceEvaluator::from_process(working_dir.clone()),
                };
                &fallback
            }
        };

        let parser = SourceParser::new(&settings, evaluator);
        let loader = SourceLoader::new(&parser, &working_dir, &env);
        let sources = loader.load(Inputs {
            args: &self.args,
            files: &self.files,
            list: self.list.as_ref(),
        })?;

        let trace = settings.debug.then(|| trace::record(&sources));
        let count = sources.len();
        let merged = merge_all(sources.into_iter().map(|s| s.mapping));
        let config = if settings.flatten { flatten(&merged)? } else { merged };
        info!(sources = count, keys = config.len(), "configuration resolved");

        Ok(Resolved { config, trace, settings })
    }
}

/// The effective configuration of one call.
///
/// Serializes as the configuration itself, with the trace added under a
/// `trace` key when debug is on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    #[serde(flatten)]
    pub config: Mapping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Trace>,
    #[serde(skip)]
    pub settings: Settings,
}

impl Resolved {
    /// Look up a value by flat key, or by walking a dot-separated path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.config.get(path) {
            return Some(value);
        }
        let (head, rest) = path.split_once(KEY_SEPARATOR)?;
        self.config.get(head)?.pointer(rest)
    }

    pub fn into_config(self) -> Mapping {
        self.config
    }
}
