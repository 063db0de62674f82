use crate::controller::Controller;
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};
use std::path::PathBuf;

pub const TAB_TASKS: usize = 0;
pub const TAB_HELP: usize = 1;
pub const TAB_COUNT: usize = 2;

pub struct UiState {
    pub tab: usize,
    pub info: String,
    pub controller: Controller,
    pub snapshot_path: PathBuf,
    pub auto_save: bool,
    pub last_exported_path: Option<String>,
    pub list_scroll_offset: usize,
}

impl UiState {
    pub fn new(controller: Controller, snapshot_path: PathBuf, auto_save: bool) -> Self {
        Self {
            tab: TAB_TASKS,
            info: String::new(),
            controller,
            snapshot_path,
            auto_save,
            last_exported_path: None,
            list_scroll_offset: 0,
        }
    }

    /// Keep the selected row inside a window of `visible` rows.
    pub fn clamp_scroll(&mut self, visible: usize) {
        let selected = self.controller.selected();
        let visible = visible.max(1);
        if selected < self.list_scroll_offset {
            self.list_scroll_offset = selected;
        } else if selected >= self.list_scroll_offset + visible {
            self.list_scroll_offset = selected + 1 - visible;
        }
        let max_offset = self.controller.rows().len().saturating_sub(visible);
        self.list_scroll_offset = self.list_scroll_offset.min(max_offset);
    }
}

pub fn push_wrapped_status_kv(
    out: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    status_area_width: u16,
) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    // Account for borders (2 chars on each side)
    let usable_width = status_area_width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    while !remaining.is_empty() {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let chars_to_take = (remaining.len() as u16).min(line_width) as usize;
        let (line_chars, rest) = remaining.split_at(chars_to_take);
        let line_text: String = line_chars.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::raw(line_text),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::raw(line_text)]));
        }

        remaining = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;

    fn state_with(n: usize) -> UiState {
        let mut store = TaskStore::new();
        for i in 0..n {
            store.add(format!("t{i}"), "x", false).unwrap();
        }
        UiState::new(Controller::new(store), PathBuf::from("tasks.json"), false)
    }

    #[test]
    fn scroll_follows_selection() {
        let mut state = state_with(10);
        for _ in 0..6 {
            state.controller.select_next();
        }
        state.clamp_scroll(4);
        assert_eq!(state.list_scroll_offset, 3);

        for _ in 0..6 {
            state.controller.select_prev();
        }
        state.clamp_scroll(4);
        assert_eq!(state.list_scroll_offset, 0);
    }

    #[test]
    fn wrapped_status_splits_long_values() {
        let mut out = Vec::new();
        push_wrapped_status_kv(&mut out, "Saved", "abcdefghijklmnopqrstuvwxyz", 16);
        assert!(out.len() > 1);

        let mut empty = Vec::new();
        push_wrapped_status_kv(&mut empty, "Saved", "   ", 16);
        assert!(empty.is_empty());
    }
}
