//! Task configuration and its environment-dependent views.

use std::fmt;

use tracing::warn;

use crate::env::{Env, RCOVOPTS, RCOVPATH, TEST};
use crate::quote::quote_args;

pub const DEFAULT_TASK_NAME: &str = "rcov";
pub const DEFAULT_PATTERN: &str = "test/test*.rb";
pub const DEFAULT_OUTPUT_DIR: &str = "coverage";
pub const DEFAULT_RUBY: &str = "ruby";
/// Executable searched for on `PATH` when `RCOVPATH` is not set.
pub const RCOV_EXECUTABLE: &str = "rcov";

#[cfg(windows)]
pub const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
pub const PATH_SEPARATOR: &str = ":";

/// Name of the primary task, optionally with tasks that must run first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskName {
    Plain(String),
    WithDeps { name: String, deps: Vec<String> },
}

impl TaskName {
    pub fn with_deps<I, S>(name: impl Into<String>, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::WithDeps {
            name: name.into(),
            deps: deps.into_iter().map(Into::into).collect(),
        }
    }

    /// The name tasks are registered and described under.
    pub fn actual_name(&self) -> &str {
        match self {
            Self::Plain(name) => name,
            Self::WithDeps { name, .. } => name,
        }
    }

    pub fn dependencies(&self) -> &[String] {
        match self {
            Self::Plain(_) => &[],
            Self::WithDeps { deps, .. } => deps,
        }
    }

    /// True only for the unqualified default name.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Plain(name) if name == DEFAULT_TASK_NAME)
    }
}

impl Default for TaskName {
    fn default() -> Self {
        Self::Plain(DEFAULT_TASK_NAME.to_string())
    }
}

impl From<&str> for TaskName {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl From<String> for TaskName {
    fn from(value: String) -> Self {
        Self::Plain(value)
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(name) => write!(f, "{name}"),
            Self::WithDeps { name, deps } => write!(f, "{name} => [{}]", deps.join(", ")),
        }
    }
}

/// Configuration of one coverage task.
///
/// Built through [`RcovTask::new`], which runs the caller's closure between
/// the built-in defaults and the deferred `pattern` default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcovTask {
    pub name: TaskName,
    /// Directories added to the interpreter's load path.
    pub libs: Vec<String>,
    /// Echo the command line before running it.
    pub verbose: bool,
    /// Run the interpreter with `-w`.
    pub warning: bool,
    /// Glob matching test files.
    pub pattern: Option<String>,
    /// Explicit test files, listed ahead of the pattern matches.
    pub test_files: Option<Vec<String>>,
    /// Interpreter flags placed before the generated `-I` flag.
    pub ruby_opts: Vec<String>,
    /// Flags passed to rcov. `None` passes none at all.
    pub rcov_opts: Option<Vec<String>>,
    pub output_dir: String,
    /// Overrides the generated task description.
    pub description: Option<String>,
    /// Interpreter used to launch rcov.
    pub ruby: String,
}

impl RcovTask {
    pub fn new<F>(name: impl Into<TaskName>, configure: F) -> Self
    where
        F: FnOnce(&mut RcovTask),
    {
        let mut task = Self::unresolved(name.into());
        configure(&mut task);
        task.apply_deferred_defaults();
        task
    }

    pub fn with_defaults(name: impl Into<TaskName>) -> Self {
        Self::new(name, |_| {})
    }

    fn unresolved(name: TaskName) -> Self {
        Self {
            name,
            libs: vec!["lib".to_string()],
            verbose: false,
            warning: false,
            pattern: None,
            test_files: None,
            ruby_opts: Vec::new(),
            rcov_opts: Some(vec!["--text-report".to_string()]),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            description: None,
            ruby: DEFAULT_RUBY.to_string(),
        }
    }

    fn apply_deferred_defaults(&mut self) {
        if self.pattern.is_none() && self.test_files.is_none() {
            self.pattern = Some(DEFAULT_PATTERN.to_string());
        }
    }

    pub fn lib_path(&self) -> String {
        self.libs.join(PATH_SEPARATOR)
    }

    /// Explicit rcov executable from `RCOVPATH`, when set and non-empty.
    pub fn rcov_path<'e>(&self, env: &'e Env) -> Option<&'e str> {
        env.get(RCOVPATH).filter(|path| !path.is_empty())
    }

    /// Tokens that make the interpreter run rcov: either the explicit path,
    /// or `-S rcov` to search `PATH`.
    pub fn tool_selector(&self, env: &Env) -> Vec<String> {
        match self.rcov_path(env) {
            Some(path) => vec![path.to_string()],
            None => vec!["-S".to_string(), RCOV_EXECUTABLE.to_string()],
        }
    }

    /// Options for rcov, already shell-ready.
    ///
    /// `RCOVOPTS` is used verbatim, even when empty. Otherwise `rcov_opts` is
    /// quoted; an absent list renders as the empty string.
    pub fn option_list(&self, env: &Env) -> String {
        if let Some(opts) = env.get(RCOVOPTS) {
            return opts.to_string();
        }
        quote_args(self.rcov_opts.as_deref()).unwrap_or_default()
    }

    /// Test files to run, unquoted.
    ///
    /// `TEST` replaces everything with one literal file name. Otherwise the
    /// explicit `test_files` come first, followed by the pattern matches in
    /// discovery order. Duplicates are kept.
    pub fn file_list(&self, env: &Env) -> Vec<String> {
        if let Some(test) = env.get(TEST) {
            return vec![test.to_string()];
        }

        let mut files = self.test_files.clone().unwrap_or_default();
        if let Some(pattern) = &self.pattern {
            files.extend(expand_pattern(pattern));
        }
        files
    }
}

impl Default for RcovTask {
    fn default() -> Self {
        Self::with_defaults(TaskName::default())
    }
}

fn expand_pattern(pattern: &str) -> Vec<String> {
    match glob::glob(pattern) {
        Ok(entries) => entries
            .flatten()
            .map(|path| path.to_string_lossy().into_owned())
            .collect(),
        Err(err) => {
            warn!(pattern, error = %err, "invalid test file pattern, matching nothing");
            Vec::new()
        }
    }
}
