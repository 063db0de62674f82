//! In-memory task store.
//!
//! Tasks live in a generational arena so that handles stay valid across
//! removals of other tasks; a separate order vector keeps insertion order.

use crate::model::{Summary, Task, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("a task named {0:?} already exists")]
    DuplicateName(String),

    #[error("no task with id {0}")]
    UnknownTask(TaskId),

    #[error("task index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    task: Option<Task>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<TaskId>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from tasks in insertion order. Duplicate names are rejected.
    pub fn from_tasks<I>(tasks: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = Task>,
    {
        let mut store = Self::new();
        for t in tasks {
            store.add(t.name, t.text, t.status)?;
        }
        Ok(store)
    }

    pub fn add(
        &mut self,
        name: impl Into<String>,
        text: impl Into<String>,
        status: bool,
    ) -> Result<TaskId, StoreError> {
        let name = name.into();
        if self.exists(&name) {
            return Err(StoreError::DuplicateName(name));
        }
        let task = Task::new(name, text, status);

        let id = match self.free.pop() {
            Some(slot) => {
                let s = &mut self.slots[slot as usize];
                s.task = Some(task);
                TaskId {
                    slot,
                    generation: s.generation,
                }
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    task: Some(task),
                });
                TaskId {
                    slot,
                    generation: 0,
                }
            }
        };
        self.order.push(id);
        tracing::debug!(%id, total = self.order.len(), "task added");
        Ok(id)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// First task (in insertion order) with the given name.
    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.get(*id).is_some_and(|t| t.name == name))
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.slots
            .get(id.slot as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.task.as_ref())
    }

    fn get_mut(&mut self, id: TaskId) -> Result<&mut Task, StoreError> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.task.as_mut())
            .ok_or(StoreError::UnknownTask(id))
    }

    /// Handle of the task at `index` in insertion order.
    pub fn id_at(&self, index: usize) -> Result<TaskId, StoreError> {
        self.order
            .get(index)
            .copied()
            .ok_or(StoreError::IndexOutOfBounds {
                index,
                len: self.order.len(),
            })
    }

    /// Flip completion and return the new status.
    pub fn toggle_status(&mut self, id: TaskId) -> Result<bool, StoreError> {
        let task = self.get_mut(id)?;
        task.status = !task.status;
        let status = task.status;
        tracing::debug!(%id, status, "task toggled");
        Ok(status)
    }

    pub fn toggle_status_at(&mut self, index: usize) -> Result<bool, StoreError> {
        let id = self.id_at(index)?;
        self.toggle_status(id)
    }

    /// Overwrite name and text. The new name may equal the task's current
    /// name but must not belong to any other task.
    pub fn edit(
        &mut self,
        id: TaskId,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), StoreError> {
        let name = name.into();
        if self.get(id).is_none() {
            return Err(StoreError::UnknownTask(id));
        }
        if self.find(&name).is_some_and(|other| other != id) {
            return Err(StoreError::DuplicateName(name));
        }
        let task = self.get_mut(id)?;
        task.name = name;
        task.text = text.into();
        tracing::debug!(%id, "task edited");
        Ok(())
    }

    /// Remove every task named `name`; returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let doomed: Vec<TaskId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_some_and(|t| t.name == name))
            .collect();

        for id in &doomed {
            self.release(*id);
        }
        if !doomed.is_empty() {
            self.order.retain(|id| !doomed.contains(id));
            tracing::debug!(name, removed = doomed.len(), "tasks removed");
        }
        doomed.len()
    }

    fn release(&mut self, id: TaskId) {
        if let Some(slot) = self.slots.get_mut(id.slot as usize) {
            slot.task = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.slot);
        }
    }

    pub fn summary(&self) -> Summary {
        let total = self.order.len();
        let completed = self.iter().filter(|(_, t)| t.status).count();
        Summary { total, completed }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tasks in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (TaskId, &Task)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.get(*id).map(|t| (*id, t)))
    }

    /// Tasks in display order (newest first).
    pub fn iter_display(&self) -> impl Iterator<Item = (TaskId, &Task)> + '_ {
        self.iter().rev()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.iter().map(|(_, t)| t.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_updates_summary() {
        let mut store = TaskStore::new();
        store.add("a", "x", false).unwrap();
        assert_eq!(store.summary(), Summary { total: 1, completed: 0 });
        store.add("b", "y", true).unwrap();
        assert_eq!(store.summary(), Summary { total: 2, completed: 1 });
    }

    #[test]
    fn buy_milk_scenario() {
        let mut store = TaskStore::new();
        store.add("Buy milk", "2%", false).unwrap();
        assert_eq!(store.summary(), Summary { total: 1, completed: 0 });

        assert!(store.toggle_status_at(0).unwrap());
        assert_eq!(store.summary(), Summary { total: 1, completed: 1 });

        assert_eq!(store.remove("Buy milk"), 1);
        assert_eq!(store.summary(), Summary { total: 0, completed: 0 });
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut store = TaskStore::new();
        store.add("A", "x", false).unwrap();
        let err = store.add("A", "y", false).unwrap_err();
        assert_eq!(err, StoreError::DuplicateName("A".into()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].text, "x");
    }

    #[test]
    fn exists_checks_candidate_key() {
        let mut store = TaskStore::new();
        store.add("first", "x", false).unwrap();
        store.add("second", "y", false).unwrap();
        assert!(store.exists("second"));
        assert!(!store.exists("third"));
    }

    #[test]
    fn toggle_is_self_inverse() {
        let mut store = TaskStore::new();
        let id = store.add("a", "x", false).unwrap();
        store.toggle_status(id).unwrap();
        store.toggle_status(id).unwrap();
        assert!(!store.get(id).unwrap().status);
    }

    #[test]
    fn toggle_out_of_bounds_is_reported() {
        let mut store = TaskStore::new();
        store.add("a", "x", false).unwrap();
        assert_eq!(
            store.toggle_status_at(3),
            Err(StoreError::IndexOutOfBounds { index: 3, len: 1 })
        );
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut store = TaskStore::new();
        store.add("a", "x", true).unwrap();
        let before = store.summary();
        assert_eq!(store.remove("missing"), 0);
        assert_eq!(store.summary(), before);
    }

    #[test]
    fn stale_id_does_not_resolve_after_slot_reuse() {
        let mut store = TaskStore::new();
        let old = store.add("a", "x", false).unwrap();
        store.remove("a");
        let new = store.add("b", "y", false).unwrap();
        assert_eq!(old.slot, new.slot);
        assert!(store.get(old).is_none());
        assert_eq!(store.toggle_status(old), Err(StoreError::UnknownTask(old)));
        assert_eq!(store.get(new).unwrap().name, "b");
    }

    #[test]
    fn ids_survive_removal_of_other_tasks() {
        let mut store = TaskStore::new();
        store.add("a", "x", false).unwrap();
        let b = store.add("b", "y", false).unwrap();
        store.remove("a");
        store.toggle_status(b).unwrap();
        assert!(store.get(b).unwrap().status);
        assert_eq!(store.id_at(0).unwrap(), b);
    }

    #[test]
    fn edit_rejects_name_of_other_task() {
        let mut store = TaskStore::new();
        let a = store.add("a", "x", false).unwrap();
        store.add("b", "y", false).unwrap();
        assert_eq!(
            store.edit(a, "b", "z"),
            Err(StoreError::DuplicateName("b".into()))
        );
        store.edit(a, "a", "updated").unwrap();
        assert_eq!(store.get(a).unwrap().text, "updated");
    }

    #[test]
    fn display_order_is_newest_first() {
        let mut store = TaskStore::new();
        store.add("1", "", false).unwrap();
        store.add("2", "", false).unwrap();
        store.add("3", "", false).unwrap();
        let names: Vec<_> = store.iter_display().map(|(_, t)| t.name.as_str()).collect();
        assert_eq!(names, ["3", "2", "1"]);
    }
}
