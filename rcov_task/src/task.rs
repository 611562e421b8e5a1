//! Task registration.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::options::{RcovTask, RCOV_EXECUTABLE};
use crate::registry::{TaskContext, TaskRegistry};

/// Aggregate task every cleanup task hangs off.
pub const CLOBBER_TASK: &str = "clobber";

impl RcovTask {
    pub fn clobber_task_name(&self) -> String {
        format!("{CLOBBER_TASK}_{}", self.name.actual_name())
    }

    pub fn default_description(&self) -> String {
        let mut desc = "Analyze code coverage with tests".to_string();
        if !self.name.is_default() {
            desc.push_str(&format!(" for {}", self.name.actual_name()));
        }
        desc
    }

    /// Register the coverage task and its cleanup task.
    ///
    /// Defines:
    /// - `<name>`: runs the test files through rcov, after its declared
    ///   dependencies and `clobber_<name>`
    /// - `clobber_<name>`: removes `output_dir`
    /// - `clobber`: gains `clobber_<name>` as a prerequisite
    pub fn define<R: TaskRegistry + ?Sized>(self, registry: &mut R) -> Arc<RcovTask> {
        let task = Arc::new(self);
        let actual_name = task.name.actual_name().to_string();
        let clobber_name = task.clobber_task_name();

        if let Some(description) = &task.description {
            registry.desc(description.clone());
        } else if registry.last_comment().is_none() {
            registry.desc(task.default_description());
        }
        let body = Arc::clone(&task);
        registry.define_task(
            &actual_name,
            task.name.dependencies(),
            Some(Box::new(move |ctx| body.run(ctx))),
        );

        registry.desc(format!("Remove rcov products for {actual_name}"));
        let output_dir = task.output_dir.clone();
        registry.define_task(
            &clobber_name,
            &[],
            Some(Box::new(move |ctx: &TaskContext<'_>| {
                ctx.runner.remove_dir(Path::new(&output_dir))
            })),
        );

        registry.define_task(CLOBBER_TASK, &[clobber_name.clone()], None);
        registry.define_task(&actual_name, &[clobber_name], None);

        debug!(task = %task.name, output_dir = %task.output_dir, "registered rcov tasks");
        task
    }

    /// Body of the coverage task. The command line is rebuilt from the
    /// context's environment on every run.
    pub fn run(&self, ctx: &TaskContext<'_>) -> crate::TaskResult<()> {
        if self.rcov_path(ctx.env).is_none() && which::which(RCOV_EXECUTABLE).is_err() {
            warn!(
                "{RCOV_EXECUTABLE} not found on PATH; set RCOVPATH to point at the executable"
            );
        }

        let command = self.command_line(ctx.env);
        if self.verbose {
            eprintln!("{command}");
        }
        info!(task = self.name.actual_name(), command = %command, "running coverage");
        ctx.runner.run(&command)
    }
}

/// Recursively remove `path`. Any failure, a missing directory included, is
/// logged and otherwise ignored.
pub fn remove_output_dir(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => info!(path = %path.display(), "removed coverage output"),
        Err(err) => debug!(path = %path.display(), error = %err, "nothing removed"),
    }
}
