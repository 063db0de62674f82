//! Text summary builder for CLI output.

use crate::store::TaskStore;

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

/// Build the text listing: summary first, then tasks newest first.
pub fn build_text_summary(store: &TaskStore) -> TextSummary {
    let summary = store.summary();
    let mut lines = vec![summary.total_line(), summary.completed_line()];

    if store.is_empty() {
        lines.push("No tasks.".to_string());
        return TextSummary { lines };
    }

    lines.push(String::new());
    for (_, t) in store.iter_display() {
        let mark = if t.status { "x" } else { " " };
        if t.text.is_empty() {
            lines.push(format!("[{mark}] {}", t.name));
        } else {
            lines.push(format!("[{mark}] {}: {}", t.name, t.text));
        }
    }
    TextSummary { lines }
}
