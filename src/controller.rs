//! Presentation controller.
//!
//! Translates user actions into task store operations and rebuilds the rows to
//! render after every mutation. Holds the add-form and inline-editor state so
//! the interaction rules can be exercised without a terminal.

use crate::model::{Summary, TaskId};
use crate::store::{StoreError, TaskStore};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("name and text must both be filled in")]
    EmptyField,

    #[error("a task named {0:?} already exists")]
    DuplicateName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no task selected")]
    NothingSelected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Name,
    Text,
}

impl Field {
    fn other(self) -> Self {
        match self {
            Field::Name => Field::Text,
            Field::Text => Field::Name,
        }
    }
}

/// The add-task form: closed or open, with an error overlay.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub open: bool,
    pub error: bool,
    pub name: String,
    pub text: String,
    pub focus: Field,
}

impl FormState {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Inline editor for one task, pre-filled with its current values.
#[derive(Debug, Clone)]
pub struct EditState {
    pub id: TaskId,
    pub name: String,
    pub text: String,
    pub focus: Field,
    pub error: bool,
}

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: TaskId,
    pub name: String,
    pub text: String,
    pub status: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    List,
    Form,
    Editing,
}

/// User intents understood by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenForm,
    CloseForm,
    Input(char),
    Backspace,
    SwitchField,
    Submit,
    Toggle,
    Edit,
    CancelEdit,
    Remove,
    SelectPrev,
    SelectNext,
}

#[derive(Debug, Default)]
pub struct Controller {
    store: TaskStore,
    form: FormState,
    editing: Option<EditState>,
    rows: Vec<TaskRow>,
    selected: usize,
}

impl Controller {
    pub fn new(store: TaskStore) -> Self {
        let mut c = Self {
            store,
            ..Default::default()
        };
        c.rebuild();
        c
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn rows(&self) -> &[TaskRow] {
        &self.rows
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.rows.get(self.selected).map(|r| r.id)
    }

    pub fn summary(&self) -> Summary {
        self.store.summary()
    }

    pub fn mode(&self) -> Mode {
        if self.editing.is_some() {
            Mode::Editing
        } else if self.form.open {
            Mode::Form
        } else {
            Mode::List
        }
    }

    /// Dispatch a single action. Text input and submit go to whichever of the
    /// editor or the form is active.
    pub fn handle(&mut self, action: Action) -> Result<(), ActionError> {
        match action {
            Action::OpenForm => self.open_form(),
            Action::CloseForm => self.close_form(),
            Action::Input(c) => self.input(c),
            Action::Backspace => self.backspace(),
            Action::SwitchField => self.switch_field(),
            Action::Submit => match self.mode() {
                Mode::Editing => self.submit_edit()?,
                Mode::Form => {
                    self.submit_form()?;
                }
                Mode::List => {}
            },
            Action::Toggle => {
                self.toggle_selected()?;
            }
            Action::Edit => self.begin_edit()?,
            Action::CancelEdit => self.cancel_edit(),
            Action::Remove => {
                self.remove_selected()?;
            }
            Action::SelectPrev => self.select_prev(),
            Action::SelectNext => self.select_next(),
        }
        Ok(())
    }

    pub fn open_form(&mut self) {
        self.form.open = true;
    }

    pub fn close_form(&mut self) {
        self.form.open = false;
        self.form.error = false;
    }

    /// Validate the form and add a pending task. Any failure raises the
    /// form's error flag and leaves it open with its contents.
    pub fn submit_form(&mut self) -> Result<TaskId, FormError> {
        let name = self.form.name.trim().to_string();
        let text = self.form.text.trim().to_string();

        let res = if name.is_empty() || text.is_empty() {
            Err(FormError::EmptyField)
        } else if self.store.exists(&name) {
            Err(FormError::DuplicateName(name))
        } else {
            self.store
                .add(name.clone(), text, false)
                .map_err(|_| FormError::DuplicateName(name))
        };

        match res {
            Ok(id) => {
                self.form.reset();
                self.rebuild();
                self.selected = 0;
                Ok(id)
            }
            Err(e) => {
                tracing::debug!(error = %e, "form rejected");
                self.form.error = true;
                Err(e)
            }
        }
    }

    pub fn toggle_selected(&mut self) -> Result<bool, ActionError> {
        let id = self.selected_id().ok_or(ActionError::NothingSelected)?;
        let status = self.store.toggle_status(id)?;
        self.rebuild();
        Ok(status)
    }

    pub fn begin_edit(&mut self) -> Result<(), ActionError> {
        let id = self.selected_id().ok_or(ActionError::NothingSelected)?;
        let task = self.store.get(id).ok_or(StoreError::UnknownTask(id))?;
        self.editing = Some(EditState {
            id,
            name: task.name.clone(),
            text: task.text.clone(),
            focus: Field::Name,
            error: false,
        });
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Apply the inline editor. An empty or taken name keeps the editor open
    /// with its error flag set; a task removed meanwhile closes it.
    pub fn submit_edit(&mut self) -> Result<(), ActionError> {
        let Some(edit) = self.editing.as_mut() else {
            return Ok(());
        };
        let name = edit.name.trim().to_string();
        if name.is_empty() {
            edit.error = true;
            return Err(FormError::EmptyField.into());
        }

        match self.store.edit(edit.id, name, edit.text.trim().to_string()) {
            Ok(()) => {
                self.editing = None;
                self.rebuild();
                Ok(())
            }
            Err(StoreError::DuplicateName(n)) => {
                edit.error = true;
                Err(FormError::DuplicateName(n).into())
            }
            Err(e) => {
                self.editing = None;
                self.rebuild();
                Err(e.into())
            }
        }
    }

    /// Remove the selected task by name; every task sharing the name goes.
    pub fn remove_selected(&mut self) -> Result<usize, ActionError> {
        let name = self
            .rows
            .get(self.selected)
            .map(|r| r.name.clone())
            .ok_or(ActionError::NothingSelected)?;
        let removed = self.store.remove(&name);
        self.rebuild();
        Ok(removed)
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    fn input(&mut self, c: char) {
        if let Some(edit) = self.editing.as_mut() {
            match edit.focus {
                Field::Name => edit.name.push(c),
                Field::Text => edit.text.push(c),
            }
        } else if self.form.open {
            match self.form.focus {
                Field::Name => self.form.name.push(c),
                Field::Text => self.form.text.push(c),
            }
        }
    }

    fn backspace(&mut self) {
        if let Some(edit) = self.editing.as_mut() {
            match edit.focus {
                Field::Name => edit.name.pop(),
                Field::Text => edit.text.pop(),
            };
        } else if self.form.open {
            match self.form.focus {
                Field::Name => self.form.name.pop(),
                Field::Text => self.form.text.pop(),
            };
        }
    }

    fn switch_field(&mut self) {
        if let Some(edit) = self.editing.as_mut() {
            edit.focus = edit.focus.other();
        } else if self.form.open {
            self.form.focus = self.form.focus.other();
        }
    }

    /// Full rebuild of the rendered rows from the store, newest first.
    fn rebuild(&mut self) {
        self.rows = self
            .store
            .iter_display()
            .map(|(id, t)| TaskRow {
                id,
                name: t.name.clone(),
                text: t.text.clone(),
                status: t.status,
            })
            .collect();
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }
}
