//! # rcov_task
//!
//! Task library that runs a Ruby test suite through rcov.
//!
//! [`RcovTask`] holds the configuration, [`RcovTask::define`] registers the
//! coverage task and its `clobber_<name>` cleanup task with a
//! [`TaskRegistry`], and the coverage task builds a POSIX-quoted command line
//! on every run.
//!
//! ```
//! use rcov_task::{Env, RcovTask, TaskGraph};
//!
//! let mut graph = TaskGraph::new();
//! let task = RcovTask::new("rcov", |t| {
//!     t.libs.push("test".to_string());
//!     t.rcov_opts = Some(vec!["--exclude".to_string(), "gems/".to_string()]);
//! })
//! .define(&mut graph);
//!
//! let env = Env::new().with("RCOVPATH", "bin/rcov").with("TEST", "test/test_a.rb");
//! assert!(task
//!     .shellquoted_ruby_args(&env)
//!     .ends_with("'bin/rcov' '--exclude' 'gems/' '-o' 'coverage' 'test/test_a.rb'"));
//! ```
//!
//! ## Environment Variables
//!
//! Read from the [`Env`] snapshot at run time, never at definition time:
//!
//! - `TEST`: run only this file (taken literally, no globbing)
//! - `RCOVOPTS`: rcov options, inserted verbatim into the command line
//! - `RCOVPATH`: rcov executable; when unset or empty `ruby -S rcov` is used

pub mod command;
pub mod env;
pub mod error;
pub mod exec;
pub mod options;
pub mod quote;
pub mod registry;
pub mod task;
pub mod taskfile;

pub use command::{assemble_command_line, ResolvedInvocation};
pub use env::Env;
pub use error::{TaskError, TaskResult};
pub use exec::{CommandRunner, DryRunRunner, ShellRunner};
pub use options::{RcovTask, TaskName};
pub use quote::{quote_arg, quote_args};
pub use registry::{TaskAction, TaskContext, TaskGraph, TaskRegistry};
pub use task::{remove_output_dir, CLOBBER_TASK};
pub use taskfile::{TaskFile, TaskSpec};
