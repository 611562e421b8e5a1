//! Command line assembly.
//!
//! The interpreter arguments are laid out as
//!
//! ```text
//! <ruby_opts...> -I<libpath> <tool selector...> [-w] <rcov options> -o <output_dir> <files...>
//! ```
//!
//! Every token is quoted on its own, except the rcov options which arrive
//! shell-ready from [`RcovTask::option_list`].

use crate::env::Env;
use crate::options::RcovTask;
use crate::quote::{quote_arg, quote_args};

/// Values that depend on the environment at run time. Recomputed for every
/// task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInvocation {
    pub lib_path: String,
    pub tool_selector: Vec<String>,
    pub tool_options: String,
    pub file_list: Vec<String>,
}

impl ResolvedInvocation {
    pub fn resolve(task: &RcovTask, env: &Env) -> Self {
        Self {
            lib_path: task.lib_path(),
            tool_selector: task.tool_selector(env),
            tool_options: task.option_list(env),
            file_list: task.file_list(env),
        }
    }
}

/// Render the interpreter arguments as one shell-safe string.
///
/// Segments are joined with single spaces even when one of them is empty, so
/// an empty option list shows up as a doubled space.
pub fn assemble_command_line(task: &RcovTask, invocation: &ResolvedInvocation) -> String {
    let mut ruby_opts = task.ruby_opts.clone();
    ruby_opts.push(format!("-I{}", invocation.lib_path));
    ruby_opts.extend(invocation.tool_selector.iter().cloned());
    if task.warning {
        ruby_opts.push("-w".to_string());
    }

    let output = ["-o", task.output_dir.as_str()];
    [
        quote_args(Some(ruby_opts.as_slice())).unwrap_or_default(),
        invocation.tool_options.clone(),
        quote_args(Some(&output[..])).unwrap_or_default(),
        quote_args(Some(invocation.file_list.as_slice())).unwrap_or_default(),
    ]
    .join(" ")
}

impl RcovTask {
    /// Interpreter arguments for one run under `env`.
    pub fn shellquoted_ruby_args(&self, env: &Env) -> String {
        let invocation = ResolvedInvocation::resolve(self, env);
        assemble_command_line(self, &invocation)
    }

    /// The complete line handed to the shell: interpreter plus arguments.
    pub fn command_line(&self, env: &Env) -> String {
        format!("{} {}", quote_arg(&self.ruby), self.shellquoted_ruby_args(env))
    }
}
