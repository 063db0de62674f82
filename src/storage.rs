//! Snapshot persistence and exports.

use crate::model::{ListReport, Snapshot};
use crate::store::TaskStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub fn base_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasklist")
}

pub fn default_snapshot_path() -> PathBuf {
    base_dir().join("tasks.json")
}

pub fn default_log_path() -> PathBuf {
    base_dir().join("tasklist.log")
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Load a snapshot; a missing file is not an error.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let snap: Snapshot =
        serde_json::from_slice(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(snap))
}

/// Load the store from `path`, or an empty store when the file is absent.
pub fn load_store(path: &Path) -> Result<TaskStore> {
    match load_snapshot(path)? {
        Some(snap) => {
            let n = snap.tasks.len();
            let store = TaskStore::from_tasks(snap.tasks)
                .with_context(|| format!("invalid snapshot {}", path.display()))?;
            tracing::info!(path = %path.display(), tasks = n, "snapshot loaded");
            Ok(store)
        }
        None => Ok(TaskStore::new()),
    }
}

pub fn save_snapshot(path: &Path, store: &TaskStore) -> Result<PathBuf> {
    ensure_parent(path)?;
    let snap = Snapshot {
        saved_at: now_rfc3339(),
        tasks: store.tasks(),
    };
    let data = serde_json::to_vec_pretty(&snap)?;
    fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), tasks = snap.tasks.len(), "snapshot saved");
    Ok(path.to_path_buf())
}

pub fn report(store: &TaskStore) -> ListReport {
    ListReport {
        summary: store.summary(),
        tasks: store.tasks(),
    }
}

pub fn export_json(path: &Path, store: &TaskStore) -> Result<()> {
    ensure_parent(path)?;
    let data = serde_json::to_vec_pretty(&report(store))?;
    fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "exported JSON");
    Ok(())
}

pub fn export_csv(path: &Path, store: &TaskStore) -> Result<()> {
    ensure_parent(path)?;
    let mut out = String::new();
    out.push_str("name,text,status\n");
    for (_, t) in store.iter() {
        out.push_str(&format!(
            "{},{},{}\n",
            csv_escape(&t.name),
            csv_escape(&t.text),
            t.status
        ));
    }
    fs::write(path, out).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "exported CSV");
    Ok(())
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Timestamped export file name, e.g. `tasklist-2024-05-01_12-30-00.json`.
pub fn export_file_name(ext: &str) -> String {
    let fmt = time::macros::format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let stamp = now.format(&fmt).unwrap_or_else(|_| "export".into());
    format!("tasklist-{stamp}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_escape_quotes_when_needed() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_store(&dir.path().join("none.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn export_file_name_has_extension() {
        let name = export_file_name("csv");
        assert!(name.starts_with("tasklist-"));
        assert!(name.ends_with(".csv"));
    }
}
