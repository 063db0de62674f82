// Integration tests for the task store and controller working together

#[cfg(test)]
mod tests {
    use tasklist::controller::{Action, Controller, FormError, Mode};
    use tasklist::model::Summary;
    use tasklist::store::{StoreError, TaskStore};

    #[test]
    fn test_add_toggle_remove_scenario() {
        let mut store = TaskStore::new();
        store.add("Buy milk", "2%", false).unwrap();
        assert_eq!(store.summary(), Summary { total: 1, completed: 0 });

        store.toggle_status_at(0).unwrap();
        assert_eq!(store.summary(), Summary { total: 1, completed: 1 });

        store.remove("Buy milk");
        assert_eq!(store.summary(), Summary { total: 0, completed: 0 });
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut store = TaskStore::new();
        store.add("A", "x", false).unwrap();
        assert!(matches!(
            store.add("A", "y", false),
            Err(StoreError::DuplicateName(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_counts_completed_only_when_status_set() {
        let mut store = TaskStore::new();
        for (i, status) in [false, true, true, false].into_iter().enumerate() {
            let before = store.summary();
            store.add(format!("task {i}"), "t", status).unwrap();
            let after = store.summary();
            assert_eq!(after.total, before.total + 1);
            assert_eq!(after.completed, before.completed + usize::from(status));
        }
    }

    #[test]
    fn test_from_tasks_rejects_duplicates() {
        use tasklist::model::Task;
        let tasks = vec![Task::new("a", "1", false), Task::new("a", "2", true)];
        assert!(TaskStore::from_tasks(tasks).is_err());
    }

    #[test]
    fn test_controller_full_session() {
        let mut c = Controller::new(TaskStore::new());

        c.handle(Action::OpenForm).unwrap();
        for ch in "Write report".chars() {
            c.handle(Action::Input(ch)).unwrap();
        }
        // Submitting with an empty text field is refused.
        assert!(c.handle(Action::Submit).is_err());
        assert!(c.form().error);

        c.handle(Action::SwitchField).unwrap();
        for ch in "Q3 numbers".chars() {
            c.handle(Action::Input(ch)).unwrap();
        }
        c.handle(Action::Submit).unwrap();
        assert_eq!(c.mode(), Mode::List);

        c.handle(Action::Toggle).unwrap();
        assert_eq!(c.summary(), Summary { total: 1, completed: 1 });

        c.handle(Action::OpenForm).unwrap();
        for ch in "Write report".chars() {
            c.handle(Action::Input(ch)).unwrap();
        }
        c.handle(Action::SwitchField).unwrap();
        c.handle(Action::Input('!')).unwrap();
        assert_eq!(
            c.submit_form(),
            Err(FormError::DuplicateName("Write report".into()))
        );
        c.handle(Action::CloseForm).unwrap();
        assert!(!c.form().error);

        c.handle(Action::Remove).unwrap();
        assert!(c.rows().is_empty());
        assert_eq!(c.summary(), Summary::default());
    }
}
