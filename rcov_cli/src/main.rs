//! rcov-task command line interface
//!
//! Loads coverage task definitions and runs them, rake style: positional
//! words are task names, `KEY=VALUE` words are environment overrides.
//!
//! ```bash
//! rcov-task                               # run the rcov task
//! rcov-task rcov TEST=test/test_parser.rb # run just one test file
//! rcov-task rcov RCOVOPTS="-p"            # run rcov in profile mode
//! rcov-task -n rcov                       # print the command line only
//! rcov-task -T                            # list tasks
//! rcov-task clobber                       # remove every coverage report
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rcov_task::{
    CommandRunner, DryRunRunner, Env, RcovTask, ShellRunner, TaskContext, TaskFile, TaskGraph,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_TASK_FILE: &str = "rcov.json";
const DEFAULT_TARGET: &str = "rcov";

/// Run test suites through rcov
#[derive(Parser, Debug)]
#[command(name = "rcov-task")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Task file to load (defaults to ./rcov.json when present)
    #[arg(short, long, value_name = "PATH", env = "RCOV_TASK_FILE")]
    file: Option<PathBuf>,

    /// List described tasks and exit
    #[arg(short = 'T', long)]
    tasks: bool,

    /// Print commands instead of running them
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Task names and KEY=VALUE environment overrides
    #[arg(value_name = "ARGS")]
    args: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_graph(file: Option<&Path>) -> Result<TaskGraph> {
    let mut graph = TaskGraph::new();

    let path = match file {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_TASK_FILE)).filter(|path| path.is_file()),
    };

    match path {
        Some(path) => {
            let task_file = TaskFile::load(&path)
                .with_context(|| format!("Failed to load task file {}", path.display()))?;
            let defined = task_file.define_all(&mut graph);
            debug!(path = %path.display(), tasks = defined.len(), "loaded task file");
        }
        None => {
            debug!("no task file, defining the default rcov task");
            RcovTask::default().define(&mut graph);
        }
    }

    Ok(graph)
}

fn print_tasks(graph: &TaskGraph) {
    let tasks = graph.tasks();
    let width = tasks.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, desc) in tasks {
        println!("rcov-task {name:<width$}  # {desc}");
    }
}

fn run(cli: Cli) -> Result<()> {
    let graph = load_graph(cli.file.as_deref())?;

    if cli.tasks {
        print_tasks(&graph);
        return Ok(());
    }

    let mut env = Env::from_process();
    let mut targets = env.apply_assignments(cli.args);
    if targets.is_empty() {
        targets.push(DEFAULT_TARGET.to_string());
    }

    let runner: Box<dyn CommandRunner> = if cli.dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(ShellRunner::new())
    };
    let ctx = TaskContext::new(&env, runner.as_ref());

    info!(targets = ?targets, dry_run = cli.dry_run, "invoking tasks");
    graph
        .invoke_all(targets.iter().map(String::as_str), &ctx)
        .with_context(|| format!("rcov-task aborted while running {}", targets.join(", ")))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli__definition__then_passes_clap_debug_asserts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli__mixed_args__then_collects_tasks_and_overrides() {
        let cli = Cli::try_parse_from(["rcov-task", "-n", "rcov", "TEST=foo.rb", "RCOVOPTS=-T -p"])
            .expect("parse");
        assert!(cli.dry_run);
        assert_eq!(cli.args, vec!["rcov", "TEST=foo.rb", "RCOVOPTS=-T -p"]);
    }

    #[test]
    fn cli__flag_after_task_name__then_parsed_as_flag() {
        let cli = Cli::try_parse_from(["rcov-task", "clobber", "-n", "TEST=t.rb", "-v"])
            .expect("parse");
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert_eq!(cli.args, vec!["clobber", "TEST=t.rb"]);
    }

    #[test]
    fn cli__unknown_flag_after_task_name__then_rejected() {
        assert!(Cli::try_parse_from(["rcov-task", "rcov", "--trace=x"]).is_err());
    }

    #[test]
    fn load_graph__explicit_missing_file__then_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = match load_graph(Some(dir.path().join("missing.json").as_path())) {
            Err(err) => err,
            Ok(graph) => panic!("missing task file loaded: {graph:?}"),
        };
        assert!(format!("{err:#}").contains("missing.json"));
    }

    #[test]
    fn load_graph__task_file__then_defines_listed_tasks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rcov.json");
        std::fs::write(&path, r#"{ "tasks": [ { "name": "units" } ] }"#).expect("write");

        let graph = load_graph(Some(path.as_path())).expect("load");
        assert!(graph.contains("units"));
        assert!(graph.contains("clobber_units"));
        assert!(!graph.contains("rcov"));
    }
}
