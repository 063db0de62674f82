use crate::storage;
use anyhow::{Context, Result};
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

use super::state::UiState;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Save the snapshot and update state.info with the saved path message.
pub fn save_and_show_path(state: &mut UiState) {
    match storage::save_snapshot(&state.snapshot_path, state.controller.store()) {
        Ok(path) => {
            state.info = format!("Saved: {}", path.display());
        }
        Err(e) => {
            tracing::warn!(error = %e, "save failed");
            state.info = format!("Save failed: {e:#}");
        }
    }
}

/// Export JSON into the current directory. Returns the absolute path.
pub fn export_list_json(state: &UiState) -> Result<std::path::PathBuf> {
    let current_dir = std::env::current_dir().context("get current directory")?;
    let path = current_dir.join(storage::export_file_name("json"));
    storage::export_json(&path, state.controller.store())?;
    Ok(path)
}

/// Export CSV into the current directory. Returns the absolute path.
pub fn export_list_csv(state: &UiState) -> Result<std::path::PathBuf> {
    let current_dir = std::env::current_dir().context("get current directory")?;
    let path = current_dir.join(storage::export_file_name("csv"));
    storage::export_csv(&path, state.controller.store())?;
    Ok(path)
}

/// Run an export and record the outcome in `state`.
pub fn export_and_show_path(
    state: &mut UiState,
    kind: &str,
    export: fn(&UiState) -> Result<std::path::PathBuf>,
) {
    match export(state) {
        Ok(p) => {
            state.last_exported_path = Some(p.to_string_lossy().to_string());
            state.info = format!("Exported {kind}: {} (press 'y' to copy path)", p.display());
        }
        Err(e) => {
            tracing::warn!(error = %e, kind, "export failed");
            state.info = format!("{kind} export failed: {e:#}");
        }
    }
}

/// Initialize the clipboard manager thread if not already initialized.
/// Each clipboard instance is kept alive for a while so clipboard managers
/// on Linux get a chance to read it.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue `text` for the clipboard without blocking the UI thread.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}

/// Copy the last exported path and report the outcome in `state.info`.
pub fn copy_last_export(state: &mut UiState) {
    let Some(path) = state.last_exported_path.clone() else {
        state.info = "No exported file path to copy. Export a file first (E/c)".into();
        return;
    };
    match copy_to_clipboard(&path) {
        Ok(_) => {
            let display_path = if path.chars().count() > 60 {
                let head: String = path.chars().take(57).collect();
                format!("{head}...")
            } else {
                path
            };
            state.info = format!("✓ Copied to clipboard: {}", display_path);
        }
        Err(e) => {
            state.info = format!("Clipboard copy failed: {e:#}");
        }
    }
}
