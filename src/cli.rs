use crate::store::TaskStore;
use crate::{storage, text_summary};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "tasklist", version, about = "To-do list with optional TUI")]
pub struct Cli {
    /// Snapshot file to load at start and save to (default: data dir)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Add a task before running, as NAME=TEXT (repeatable)
    #[arg(long = "add", value_name = "NAME=TEXT", value_parser = parse_task_arg)]
    pub add: Vec<(String, String)>,

    /// Print the task list as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Write the snapshot back on exit. Use --auto-save true or --auto-save false
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    pub auto_save: bool,

    /// Export the task list as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Export the task list as CSV
    #[arg(long)]
    pub export_csv: Option<PathBuf>,

    /// Log file (default: data dir). Filter with TASKLIST_LOG
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn snapshot_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(storage::default_snapshot_path)
    }

    pub fn is_non_tui(&self) -> bool {
        self.json || self.text
    }
}

/// Parse `NAME=TEXT`; both parts must be non-empty.
pub fn parse_task_arg(s: &str) -> Result<(String, String), String> {
    let (name, text) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=TEXT, got {s:?}"))?;
    let (name, text) = (name.trim(), text.trim());
    if name.is_empty() || text.is_empty() {
        return Err("task name and text must both be non-empty".to_string());
    }
    Ok((name.to_string(), text.to_string()))
}

/// Load the snapshot and apply `--add` tasks.
pub fn build_store(args: &Cli) -> Result<TaskStore> {
    let path = args.snapshot_path();
    let mut store = storage::load_store(&path)?;
    for (name, text) in &args.add {
        store
            .add(name.as_str(), text.as_str(), false)
            .with_context(|| format!("cannot add task {name:?}"))?;
    }
    Ok(store)
}

pub fn run(args: Cli) -> Result<()> {
    let store = build_store(&args)?;

    if !args.is_non_tui() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args, store);
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_text(&args, &store);
        }
    }

    if args.json {
        return run_json(&args, &store);
    }
    run_text(&args, &store)
}

fn run_json(args: &Cli, store: &TaskStore) -> Result<()> {
    handle_exports(args, store)?;
    let out = serde_json::to_string_pretty(&storage::report(store))?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{out}")?;
    finish(args, store)
}

fn run_text(args: &Cli, store: &TaskStore) -> Result<()> {
    handle_exports(args, store)?;
    let summary = text_summary::build_text_summary(store);
    let mut stdout = std::io::LineWriter::new(std::io::stdout().lock());
    for line in summary.lines {
        writeln!(stdout, "{line}")?;
    }
    stdout.flush()?;
    finish(args, store)
}

/// Save on exit when auto-save is on.
pub fn finish(args: &Cli, store: &TaskStore) -> Result<()> {
    if args.auto_save {
        let p = storage::save_snapshot(&args.snapshot_path(), store)
            .context("failed to save task list")?;
        if args.is_non_tui() {
            eprintln!("Saved: {}", p.display());
        }
    }
    Ok(())
}

/// Handle export operations (JSON and CSV) for both text and JSON modes.
fn handle_exports(args: &Cli, store: &TaskStore) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        storage::export_json(p, store)?;
    }
    if let Some(p) = args.export_csv.as_deref() {
        storage::export_csv(p, store)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_task_arg_splits_on_first_equals() {
        assert_eq!(
            parse_task_arg("Buy milk=2% = low fat"),
            Ok(("Buy milk".to_string(), "2% = low fat".to_string()))
        );
    }

    #[test]
    fn parse_task_arg_rejects_empty_parts() {
        assert!(parse_task_arg("noequals").is_err());
        assert!(parse_task_arg("=text").is_err());
        assert!(parse_task_arg("name=").is_err());
    }

    #[test]
    fn cli_parses_repeated_add() {
        let args = Cli::parse_from(["tasklist", "--text", "--add", "a=1", "--add", "b=2"]);
        assert!(args.is_non_tui());
        assert_eq!(args.add.len(), 2);
        assert!(!args.auto_save);
    }

    #[test]
    fn build_store_rejects_duplicate_adds() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tasks.json");
        let file = file.to_str().unwrap();
        let args = Cli::parse_from(["tasklist", "--file", file, "--add", "a=1", "--add", "a=2"]);
        assert!(build_store(&args).is_err());
    }
}
