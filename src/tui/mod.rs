mod export;
mod help;
mod state;

use crate::cli::{self, Cli};
use crate::controller::{Action, ActionError, Controller, Field, Mode};
use crate::store::TaskStore;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Terminal,
};
use std::{io, time::Duration, time::Instant};

use export::{copy_last_export, export_and_show_path, export_list_csv, export_list_json};
use help::draw_help;
use state::{push_wrapped_status_kv, UiState, TAB_COUNT, TAB_HELP, TAB_TASKS};

/// What a key press means in the current mode.
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyIntent {
    Controller(Action),
    Quit,
    Save,
    ExportJson,
    ExportCsv,
    CopyPath,
    NextTab,
    ShowHelp,
}

fn is_plain_text(modifiers: KeyModifiers) -> bool {
    modifiers.difference(KeyModifiers::SHIFT).is_empty()
}

fn map_key(mode: Mode, tab: usize, k: KeyEvent) -> Option<KeyIntent> {
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return Some(KeyIntent::Quit);
    }

    if mode != Mode::List {
        let cancel = if mode == Mode::Editing {
            Action::CancelEdit
        } else {
            Action::CloseForm
        };
        return match k.code {
            KeyCode::Esc => Some(KeyIntent::Controller(cancel)),
            KeyCode::Enter => Some(KeyIntent::Controller(Action::Submit)),
            KeyCode::Tab | KeyCode::BackTab => Some(KeyIntent::Controller(Action::SwitchField)),
            KeyCode::Backspace => Some(KeyIntent::Controller(Action::Backspace)),
            KeyCode::Char(c) if is_plain_text(k.modifiers) => {
                Some(KeyIntent::Controller(Action::Input(c)))
            }
            _ => None,
        };
    }

    match k.code {
        KeyCode::Char('q') => return Some(KeyIntent::Quit),
        KeyCode::Tab => return Some(KeyIntent::NextTab),
        KeyCode::Char('?') => return Some(KeyIntent::ShowHelp),
        _ => {}
    }
    if tab != TAB_TASKS {
        return None;
    }

    let intent = match k.code {
        KeyCode::Char('a') => KeyIntent::Controller(Action::OpenForm),
        KeyCode::Char(' ') | KeyCode::Char('x') => KeyIntent::Controller(Action::Toggle),
        KeyCode::Char('e') => KeyIntent::Controller(Action::Edit),
        KeyCode::Char('d') | KeyCode::Delete => KeyIntent::Controller(Action::Remove),
        KeyCode::Up | KeyCode::Char('k') => KeyIntent::Controller(Action::SelectPrev),
        KeyCode::Down | KeyCode::Char('j') => KeyIntent::Controller(Action::SelectNext),
        KeyCode::Char('s') => KeyIntent::Save,
        KeyCode::Char('E') => KeyIntent::ExportJson,
        KeyCode::Char('c') => KeyIntent::ExportCsv,
        KeyCode::Char('y') => KeyIntent::CopyPath,
        _ => return None,
    };
    Some(intent)
}

pub fn run(args: Cli, store: TaskStore) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState::new(Controller::new(store), args.snapshot_path(), args.auto_save);
    state.info = format!("{} task(s) loaded", state.controller.store().len());

    let res = run_loop(&mut terminal, &mut state);

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();

    res?;
    cli::finish(&args, state.controller.store())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut UiState,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    loop {
        if dirty || last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, state)).ok();
            last_tick = Instant::now();
            dirty = false;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if !event::poll(Duration::from_millis(10)).unwrap_or(false) {
            continue;
        }
        let Ok(Event::Key(k)) = event::read() else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }

        let Some(intent) = map_key(state.controller.mode(), state.tab, k) else {
            continue;
        };
        dirty = true;
        match intent {
            KeyIntent::Quit => return Ok(()),
            KeyIntent::Controller(action) => apply_action(state, action),
            KeyIntent::Save => export::save_and_show_path(state),
            KeyIntent::ExportJson => export_and_show_path(state, "JSON", export_list_json),
            KeyIntent::ExportCsv => export_and_show_path(state, "CSV", export_list_csv),
            KeyIntent::CopyPath => copy_last_export(state),
            KeyIntent::NextTab => state.tab = (state.tab + 1) % TAB_COUNT,
            KeyIntent::ShowHelp => state.tab = TAB_HELP,
        }
    }
}

fn apply_action(state: &mut UiState, action: Action) {
    let describe = match &action {
        Action::Submit => Some(state.controller.mode()),
        _ => None,
    };
    match state.controller.handle(action.clone()) {
        Ok(()) => match (&action, describe) {
            (Action::Submit, Some(Mode::Form)) => state.info = "Task added".into(),
            (Action::Submit, Some(Mode::Editing)) => state.info = "Task updated".into(),
            (Action::Toggle, _) | (Action::Remove, _) => {
                let s = state.controller.summary();
                state.info = format!("{}  {}", s.total_line(), s.completed_line());
            }
            _ => {}
        },
        // Validation failures show as the form's error state.
        Err(ActionError::Form(_)) => {}
        Err(ActionError::NothingSelected) => state.info = "No task selected".into(),
        Err(e @ ActionError::Store(_)) => {
            tracing::warn!(error = %e, "task action failed");
            state.info = format!("{e}");
        }
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &mut UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Tasks"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("tasklist"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        TAB_TASKS => draw_tasks(chunks[1], f, state),
        _ => draw_help(chunks[1], f),
    }
}

fn draw_tasks(area: Rect, f: &mut ratatui::Frame, state: &mut UiState) {
    let panel_height = match state.controller.mode() {
        Mode::List => 0,
        Mode::Form | Mode::Editing => 5,
    };
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(panel_height),
                Constraint::Length(4),
            ]
            .as_ref(),
        )
        .split(area);

    draw_summary(main[0], f, state);
    draw_list(main[1], f, state);
    if panel_height > 0 {
        draw_form_panel(main[2], f, state);
    }
    draw_status(main[3], f, state);
}

fn draw_summary(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let s = state.controller.summary();
    let line = Line::from(vec![
        Span::styled("All : ", Style::default().fg(Color::Gray)),
        Span::raw(s.total.to_string()),
        Span::raw("   "),
        Span::styled("Ready : ", Style::default().fg(Color::Gray)),
        Span::styled(s.completed.to_string(), Style::default().fg(Color::Green)),
        Span::raw("   "),
        Span::styled("Pending : ", Style::default().fg(Color::Gray)),
        Span::raw(s.pending().to_string()),
    ]);
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Summary"));
    f.render_widget(p, area);
}

fn draw_list(area: Rect, f: &mut ratatui::Frame, state: &mut UiState) {
    let visible = (area.height as usize).saturating_sub(2);
    state.clamp_scroll(visible);

    let rows = state.controller.rows();
    let selected = state.controller.selected();
    let editing = state.controller.editing().map(|e| e.id);

    let mut lines: Vec<Line> = Vec::new();
    if rows.is_empty() {
        lines.push(Line::from(vec![
            Span::raw("No tasks yet. Press "),
            Span::styled("a", Style::default().fg(Color::Magenta)),
            Span::raw(" to add one."),
        ]));
    }

    for (i, row) in rows
        .iter()
        .enumerate()
        .skip(state.list_scroll_offset)
        .take(visible)
    {
        let mark = if row.status { "[x] " } else { "[ ] " };
        let mut name_style = Style::default().add_modifier(Modifier::BOLD);
        let mut text_style = Style::default().fg(Color::Gray);
        if row.status {
            name_style = name_style.fg(Color::Green).add_modifier(Modifier::CROSSED_OUT);
            text_style = text_style.add_modifier(Modifier::CROSSED_OUT);
        }
        let mut spans = vec![
            Span::raw(mark),
            Span::styled(row.name.clone(), name_style),
            Span::raw("  "),
            Span::styled(row.text.clone(), text_style),
        ];
        if editing == Some(row.id) {
            spans.push(Span::styled("  (editing)", Style::default().fg(Color::Yellow)));
        }
        let mut line = Line::from(spans);
        if i == selected {
            line = line.style(Style::default().bg(Color::DarkGray));
        }
        lines.push(line);
    }

    let title = format!("Tasks ({})", rows.len());
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let mut spans = vec![
        Span::styled(marker.to_string(), Style::default().fg(Color::Magenta)),
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::raw(value.to_string()),
    ];
    if focused {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }
    Line::from(spans)
}

fn draw_form_panel(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let (title, name, text, focus, error) = match state.controller.editing() {
        Some(e) => ("Edit task", e.name.as_str(), e.text.as_str(), e.focus, e.error),
        None => {
            let form = state.controller.form();
            (
                "Add task",
                form.name.as_str(),
                form.text.as_str(),
                form.focus,
                form.error,
            )
        }
    };

    let mut block = Block::default().borders(Borders::ALL);
    if error {
        block = block
            .title(format!("{title} - fill both fields with a unique name"))
            .border_style(Style::default().fg(Color::Red));
    } else {
        block = block.title(format!("{title} (enter: ok, esc: close)"));
    }

    let p = Paragraph::new(vec![
        field_line("Name", name, focus == Field::Name),
        field_line("Text", text, focus == Field::Text),
    ])
    .block(block);
    f.render_widget(p, area);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let mut status_lines = vec![Line::from(vec![
        Span::styled("Auto-save: ", Style::default().fg(Color::Gray)),
        Span::raw(if state.auto_save { "on" } else { "off" }),
        Span::raw("   "),
        Span::styled("File: ", Style::default().fg(Color::Gray)),
        Span::raw(state.snapshot_path.display().to_string()),
    ])];
    push_wrapped_status_kv(&mut status_lines, "Info", &state.info, area.width);

    let status =
        Paragraph::new(status_lines).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn list_keys_map_to_actions() {
        assert_eq!(
            map_key(Mode::List, TAB_TASKS, key(KeyCode::Char('a'))),
            Some(KeyIntent::Controller(Action::OpenForm))
        );
        assert_eq!(
            map_key(Mode::List, TAB_TASKS, key(KeyCode::Char(' '))),
            Some(KeyIntent::Controller(Action::Toggle))
        );
        assert_eq!(
            map_key(Mode::List, TAB_TASKS, key(KeyCode::Char('q'))),
            Some(KeyIntent::Quit)
        );
    }

    #[test]
    fn form_mode_treats_letters_as_input() {
        assert_eq!(
            map_key(Mode::Form, TAB_TASKS, key(KeyCode::Char('q'))),
            Some(KeyIntent::Controller(Action::Input('q')))
        );
        assert_eq!(
            map_key(Mode::Form, TAB_TASKS, key(KeyCode::Esc)),
            Some(KeyIntent::Controller(Action::CloseForm))
        );
        assert_eq!(
            map_key(Mode::Editing, TAB_TASKS, key(KeyCode::Esc)),
            Some(KeyIntent::Controller(Action::CancelEdit))
        );
    }

    #[test]
    fn modified_chars_are_not_form_input() {
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        let alt_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT);
        assert_eq!(map_key(Mode::Form, TAB_TASKS, ctrl_a), None);
        assert_eq!(map_key(Mode::Editing, TAB_TASKS, alt_x), None);

        let shift_a = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(
            map_key(Mode::Form, TAB_TASKS, shift_a),
            Some(KeyIntent::Controller(Action::Input('A')))
        );
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let k = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(Mode::Form, TAB_TASKS, k), Some(KeyIntent::Quit));
        assert_eq!(map_key(Mode::List, TAB_HELP, k), Some(KeyIntent::Quit));
    }

    #[test]
    fn task_keys_ignored_on_help_tab() {
        assert_eq!(map_key(Mode::List, TAB_HELP, key(KeyCode::Char('d'))), None);
        assert_eq!(
            map_key(Mode::List, TAB_HELP, key(KeyCode::Tab)),
            Some(KeyIntent::NextTab)
        );
    }

    #[test]
    fn failed_submit_leaves_info_untouched() {
        let mut state = UiState::new(
            Controller::default(),
            std::path::PathBuf::from("tasks.json"),
            false,
        );
        apply_action(&mut state, Action::OpenForm);
        apply_action(&mut state, Action::Submit);
        assert!(state.controller.form().error);
        assert!(state.info.is_empty());

        for c in "a".chars() {
            apply_action(&mut state, Action::Input(c));
        }
        apply_action(&mut state, Action::SwitchField);
        apply_action(&mut state, Action::Input('b'));
        apply_action(&mut state, Action::Submit);
        assert_eq!(state.info, "Task added");
        assert_eq!(state.controller.summary().total, 1);
    }
}
