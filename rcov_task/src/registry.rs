//! Task framework seam.
//!
//! [`TaskRegistry`] is the surface task libraries register against. It
//! follows the usual build-tool conventions: `desc` attaches to the next
//! defined task, and defining a task that already exists enhances it with
//! more prerequisites and actions. [`TaskGraph`] is the in-memory
//! implementation used by the `rcov-task` binary and by tests.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::env::Env;
use crate::error::{TaskError, TaskResult};
use crate::exec::CommandRunner;

/// What a task body gets to see while it runs.
pub struct TaskContext<'a> {
    pub env: &'a Env,
    pub runner: &'a dyn CommandRunner,
}

impl<'a> TaskContext<'a> {
    pub fn new(env: &'a Env, runner: &'a dyn CommandRunner) -> Self {
        Self { env, runner }
    }
}

pub type TaskAction = Box<dyn Fn(&TaskContext<'_>) -> TaskResult<()>>;

pub trait TaskRegistry {
    /// Description waiting for the next `define_task`, if any.
    fn last_comment(&self) -> Option<&str>;

    fn desc(&mut self, description: String);

    fn define_task(&mut self, name: &str, prerequisites: &[String], action: Option<TaskAction>);
}

struct TaskEntry {
    name: String,
    description: Option<String>,
    prerequisites: Vec<String>,
    actions: Vec<TaskAction>,
}

#[derive(Default)]
pub struct TaskGraph {
    tasks: Vec<TaskEntry>,
    index: HashMap<String, usize>,
    pending_comment: Option<String>,
}

impl fmt::Debug for TaskGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tasks: Vec<(&str, &[String])> = self
            .tasks
            .iter()
            .map(|entry| (entry.name.as_str(), entry.prerequisites.as_slice()))
            .collect();
        f.debug_struct("TaskGraph")
            .field("tasks", &tasks)
            .field("pending_comment", &self.pending_comment)
            .finish()
    }
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.entry(name)?.description.as_deref()
    }

    pub fn prerequisites(&self, name: &str) -> Option<&[String]> {
        self.entry(name).map(|entry| entry.prerequisites.as_slice())
    }

    /// Described tasks in definition order.
    pub fn tasks(&self) -> Vec<(&str, &str)> {
        self.tasks
            .iter()
            .filter_map(|entry| {
                entry
                    .description
                    .as_deref()
                    .map(|desc| (entry.name.as_str(), desc))
            })
            .collect()
    }

    /// Run `name` after its prerequisites. Each task runs at most once.
    pub fn invoke(&self, name: &str, ctx: &TaskContext<'_>) -> TaskResult<()> {
        self.invoke_all([name], ctx)
    }

    /// Run several top-level targets in order, sharing one set of already-run
    /// tasks between them.
    pub fn invoke_all<'n, I>(&self, names: I, ctx: &TaskContext<'_>) -> TaskResult<()>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let mut done = HashSet::new();
        for name in names {
            let mut chain = Vec::new();
            self.invoke_with_chain(name, ctx, &mut chain, &mut done)?;
        }
        Ok(())
    }

    fn invoke_with_chain(
        &self,
        name: &str,
        ctx: &TaskContext<'_>,
        chain: &mut Vec<String>,
        done: &mut HashSet<String>,
    ) -> TaskResult<()> {
        if chain.iter().any(|seen| seen == name) {
            chain.push(name.to_string());
            return Err(TaskError::CircularDependency(chain.join(" => ")));
        }
        if done.contains(name) {
            return Ok(());
        }

        let entry = self
            .entry(name)
            .ok_or_else(|| TaskError::UnknownTask(name.to_string()))?;

        chain.push(name.to_string());
        for prerequisite in &entry.prerequisites {
            self.invoke_with_chain(prerequisite, ctx, chain, done)?;
        }
        chain.pop();

        debug!(task = name, actions = entry.actions.len(), "executing task");
        for action in &entry.actions {
            action(ctx)?;
        }
        done.insert(name.to_string());
        Ok(())
    }

    fn entry(&self, name: &str) -> Option<&TaskEntry> {
        self.index.get(name).map(|&idx| &self.tasks[idx])
    }
}

impl TaskRegistry for TaskGraph {
    fn last_comment(&self) -> Option<&str> {
        self.pending_comment.as_deref()
    }

    fn desc(&mut self, description: String) {
        self.pending_comment = Some(description);
    }

    fn define_task(&mut self, name: &str, prerequisites: &[String], action: Option<TaskAction>) {
        let description = self.pending_comment.take();
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.tasks.push(TaskEntry {
                    name: name.to_string(),
                    description: None,
                    prerequisites: Vec::new(),
                    actions: Vec::new(),
                });
                let idx = self.tasks.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };

        let entry = &mut self.tasks[idx];
        if description.is_some() {
            entry.description = description;
        }
        for prerequisite in prerequisites {
            if !entry.prerequisites.contains(prerequisite) {
                entry.prerequisites.push(prerequisite.clone());
            }
        }
        if let Some(action) = action {
            entry.actions.push(action);
        }
        debug!(task = name, prerequisites = ?entry.prerequisites, "defined task");
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::exec::DryRunRunner;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, label: &str) -> TaskAction {
        let log = Rc::clone(log);
        let label = label.to_string();
        Box::new(move |_ctx| {
            log.borrow_mut().push(label.clone());
            Ok(())
        })
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn task_graph__prerequisites__then_run_first_and_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = TaskGraph::new();
        graph.define_task("clean", &[], Some(recorder(&log, "clean")));
        graph.define_task("build", &names(&["clean"]), Some(recorder(&log, "build")));
        graph.define_task("test", &names(&["clean", "build"]), Some(recorder(&log, "test")));

        let env = Env::new();
        graph
            .invoke("test", &TaskContext::new(&env, &DryRunRunner))
            .expect("invoke");

        assert_eq!(*log.borrow(), vec!["clean", "build", "test"]);
    }

    #[test]
    fn task_graph__redefinition__then_enhances_existing_task() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = TaskGraph::new();
        graph.define_task("a", &[], Some(recorder(&log, "a1")));
        graph.define_task("b", &[], Some(recorder(&log, "b")));
        graph.define_task("a", &names(&["b"]), Some(recorder(&log, "a2")));

        assert_eq!(graph.prerequisites("a"), Some(&names(&["b"])[..]));

        let env = Env::new();
        graph
            .invoke("a", &TaskContext::new(&env, &DryRunRunner))
            .expect("invoke");
        assert_eq!(*log.borrow(), vec!["b", "a1", "a2"]);
    }

    #[test]
    fn task_graph__desc__then_attaches_to_next_task_only() {
        let mut graph = TaskGraph::new();
        graph.desc("first".to_string());
        assert_eq!(graph.last_comment(), Some("first"));
        graph.define_task("one", &[], None);
        graph.define_task("two", &[], None);

        assert_eq!(graph.last_comment(), None);
        assert_eq!(graph.description("one"), Some("first"));
        assert_eq!(graph.description("two"), None);
        assert_eq!(graph.tasks(), vec![("one", "first")]);
    }

    #[test]
    fn task_graph__unknown_task__then_error() {
        let graph = TaskGraph::new();
        let env = Env::new();
        let err = graph
            .invoke("missing", &TaskContext::new(&env, &DryRunRunner))
            .unwrap_err();
        assert!(matches!(err, TaskError::UnknownTask(name) if name == "missing"));
    }

    #[test]
    fn task_graph__cycle__then_reports_chain() {
        let mut graph = TaskGraph::new();
        graph.define_task("a", &names(&["b"]), None);
        graph.define_task("b", &names(&["a"]), None);

        let env = Env::new();
        let err = graph
            .invoke("a", &TaskContext::new(&env, &DryRunRunner))
            .unwrap_err();
        match err {
            TaskError::CircularDependency(chain) => assert_eq!(chain, "a => b => a"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn task_graph__failing_action__then_stops_and_propagates() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = TaskGraph::new();
        graph.define_task(
            "broken",
            &[],
            Some(Box::new(|_ctx| {
                Err(TaskError::CommandFailed {
                    status: Some(1),
                    command: "false".to_string(),
                })
            })),
        );
        graph.define_task("after", &names(&["broken"]), Some(recorder(&log, "after")));

        let env = Env::new();
        let err = graph
            .invoke("after", &TaskContext::new(&env, &DryRunRunner))
            .unwrap_err();
        assert!(matches!(err, TaskError::CommandFailed { .. }));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn task_graph__invoke_all__then_shared_tasks_run_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = TaskGraph::new();
        graph.define_task("setup", &[], Some(recorder(&log, "setup")));
        graph.define_task("x", &names(&["setup"]), Some(recorder(&log, "x")));
        graph.define_task("y", &names(&["setup"]), Some(recorder(&log, "y")));

        let env = Env::new();
        graph
            .invoke_all(["x", "y"], &TaskContext::new(&env, &DryRunRunner))
            .expect("invoke");
        assert_eq!(*log.borrow(), vec!["setup", "x", "y"]);
    }

    #[test]
    fn task_graph__debug__then_lists_tasks_with_prerequisites() {
        let mut graph = TaskGraph::new();
        graph.define_task("clean", &[], None);
        graph.define_task("build", &names(&["clean"]), None);
        graph.desc("pending".to_string());

        let rendered = format!("{graph:?}");
        assert!(rendered.starts_with("TaskGraph"));
        assert!(rendered.contains(r#"("build", ["clean"])"#));
        assert!(rendered.contains(r#"pending_comment: Some("pending")"#));
    }
}
