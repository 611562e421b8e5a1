//! JSON task files.
//!
//! ```json
//! {
//!   "tasks": [
//!     { "name": "rcov", "libs": ["lib", "test"], "rcov_opts": ["--exclude", "gems/"] },
//!     { "name": "units", "depends_on": ["compile"], "test_files": ["test/unit/a.rb"] }
//!   ]
//! }
//! ```
//!
//! Omitted fields keep the task defaults. `"rcov_opts": null` passes no rcov
//! options at all.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::error::{TaskError, TaskResult};
use crate::options::{RcovTask, TaskName, DEFAULT_TASK_NAME};
use crate::registry::TaskRegistry;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskFile {
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    pub name: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub libs: Option<Vec<String>>,
    pub verbose: Option<bool>,
    pub warning: Option<bool>,
    pub pattern: Option<String>,
    pub test_files: Option<Vec<String>>,
    pub ruby_opts: Option<Vec<String>>,
    /// Outer `None`: field omitted. `Some(None)`: explicit `null`.
    #[serde(default, deserialize_with = "explicit_null")]
    pub rcov_opts: Option<Option<Vec<String>>>,
    pub output_dir: Option<String>,
    pub description: Option<String>,
    pub ruby: Option<String>,
}

fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<Vec<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Some)
}

impl TaskFile {
    pub fn load(path: &Path) -> TaskResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| TaskError::io(path, err))?;
        serde_json::from_str(&raw).map_err(|err| TaskError::task_file(path, err))
    }

    /// Register every task in file order.
    pub fn define_all<R: TaskRegistry + ?Sized>(&self, registry: &mut R) -> Vec<Arc<RcovTask>> {
        self.tasks
            .iter()
            .map(|spec| spec.build().define(&mut *registry))
            .collect()
    }
}

impl std::str::FromStr for TaskFile {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

impl TaskSpec {
    pub fn task_name(&self) -> TaskName {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_TASK_NAME.to_string());
        if self.depends_on.is_empty() {
            TaskName::Plain(name)
        } else {
            TaskName::with_deps(name, self.depends_on.iter().cloned())
        }
    }

    /// Apply the spec through the regular constructor so the deferred
    /// pattern default still kicks in.
    pub fn build(&self) -> RcovTask {
        RcovTask::new(self.task_name(), |t| {
            if let Some(libs) = &self.libs {
                t.libs = libs.clone();
            }
            if let Some(verbose) = self.verbose {
                t.verbose = verbose;
            }
            if let Some(warning) = self.warning {
                t.warning = warning;
            }
            if self.pattern.is_some() {
                t.pattern = self.pattern.clone();
            }
            if self.test_files.is_some() {
                t.test_files = self.test_files.clone();
            }
            if let Some(ruby_opts) = &self.ruby_opts {
                t.ruby_opts = ruby_opts.clone();
            }
            if let Some(rcov_opts) = &self.rcov_opts {
                t.rcov_opts = rcov_opts.clone();
            }
            if let Some(output_dir) = &self.output_dir {
                t.output_dir = output_dir.clone();
            }
            if self.description.is_some() {
                t.description = self.description.clone();
            }
            if let Some(ruby) = &self.ruby {
                t.ruby = ruby.clone();
            }
        })
    }
}
