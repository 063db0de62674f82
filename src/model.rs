use serde::{Deserialize, Serialize};
use std::fmt;

/// A single to-do entry. `name` is the user-facing unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub status: bool,
}

impl Task {
    pub fn new(name: impl Into<String>, text: impl Into<String>, status: bool) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            status,
        }
    }
}

/// Stable handle to a task inside a [`crate::store::TaskStore`].
///
/// The generation makes a handle go stale once its task is removed, even if
/// the arena slot is later reused for another task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.slot, self.generation)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
}

impl Summary {
    pub fn pending(&self) -> usize {
        self.total - self.completed
    }

    pub fn total_line(&self) -> String {
        format!("All : {}", self.total)
    }

    pub fn completed_line(&self) -> String {
        format!("Ready : {}", self.completed)
    }
}

/// On-disk form of a task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub saved_at: String,
    pub tasks: Vec<Task>,
}

/// JSON document printed by `--json` and written by JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListReport {
    pub summary: Summary,
    pub tasks: Vec<Task>,
}
