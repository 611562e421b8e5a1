use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Don't know how to build task '{0}'")]
    UnknownTask(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Command failed with status ({}): [{}]", display_status(.status), .command)]
    CommandFailed {
        status: Option<i32>,
        command: String,
    },

    #[error("failed to spawn shell for [{command}]: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("task file parse error in {path:?}: {source}")]
    TaskFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type TaskResult<T> = Result<T, TaskError>;

fn display_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

impl TaskError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn task_file(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::TaskFile {
            path: path.into(),
            source,
        }
    }

    pub fn spawn(command: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }
}
