//! Process execution.
//!
//! Task bodies hand a finished command line to a [`CommandRunner`]. The
//! runner owns the blocking wait and the mapping of exit status to
//! [`TaskError`]; nothing here retries or times out.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::error::{TaskError, TaskResult};
use crate::quote::quote_arg;
use crate::task::remove_output_dir;

pub trait CommandRunner {
    fn run(&self, command_line: &str) -> TaskResult<()>;

    /// Recursively remove a generated directory. A missing directory is not
    /// an error.
    fn remove_dir(&self, path: &Path) -> TaskResult<()> {
        remove_output_dir(path);
        Ok(())
    }
}

/// Runs command lines through `sh -c` with inherited stdio.
///
/// Command lines are built with POSIX single-quote quoting, so a POSIX `sh`
/// must be on `PATH`. On Windows that means an MSYS or Git Bash `sh`;
/// `cmd.exe` does not understand the quoting and is never used.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }

    fn shell_command(command_line: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command_line);
        cmd
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command_line: &str) -> TaskResult<()> {
        debug!(command = command_line, "spawning shell");
        let status = Self::shell_command(command_line)
            .status()
            .map_err(|err| TaskError::spawn(command_line, err))?;

        if !status.success() {
            return Err(TaskError::CommandFailed {
                status: status.code(),
                command: command_line.to_string(),
            });
        }

        info!(command = command_line, "command finished");
        Ok(())
    }
}

/// Prints what would happen instead of doing it.
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, command_line: &str) -> TaskResult<()> {
        println!("{command_line}");
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> TaskResult<()> {
        println!("rm -r {}", quote_arg(&path.display().to_string()));
        Ok(())
    }
}
