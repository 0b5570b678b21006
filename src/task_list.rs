//! An ordered list of task descriptions.

use crate::container::Container;
use crate::observable::Observable;
use tracing::debug;

/// Task-list container. Empty unless seeded.
#[derive(Clone, Debug)]
pub struct TaskList {
    tasks: Observable<Vec<String>>,
}

impl TaskList {
    /// An empty list.
    pub fn new() -> Self {
        Self {
            tasks: Observable::new(Vec::new()),
        }
    }

    /// A list seeded with `tasks`. Blank entries are dropped, as with
    /// [`add_task`](Self::add_task).
    pub fn with_tasks<I, S>(tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tasks = tasks
            .into_iter()
            .map(Into::into)
            .filter(|task| !is_blank(task))
            .collect();
        Self {
            tasks: Observable::new(tasks),
        }
    }

    /// Snapshot of the tasks in order.
    pub fn tasks(&self) -> Vec<String> {
        self.tasks.get()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `text` unless it is empty after trimming.
    ///
    /// Blank input is ignored without notifying anyone.
    pub fn add_task(&self, text: impl Into<String>) {
        let text = text.into();
        if is_blank(&text) {
            debug!("ignoring blank task");
            return;
        }
        let len = self.tasks.update(|tasks| {
            tasks.push(text);
            tasks.len()
        });
        debug!(len, "task added");
    }

    /// Remove the task at `index`. Out-of-range indices are ignored without
    /// notifying anyone.
    pub fn remove_task(&self, index: usize) {
        let removed = self.tasks.update_if(|tasks| {
            if index < tasks.len() {
                tasks.remove(index);
                true
            } else {
                false
            }
        });
        if removed {
            debug!(index, "task removed");
        } else {
            debug!(index, "ignoring out-of-range task index");
        }
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for TaskList {
    type State = Vec<String>;

    fn observable(&self) -> &Observable<Vec<String>> {
        &self.tasks
    }
}
