//! Migration plan rendering.
//!
//! Sections always appear in the same order: files to copy, files to review,
//! database entries to add, database entries to update. Empty sections are
//! omitted; long sections collapse to a placeholder line.

use serde::{Deserialize, Serialize};

use crate::dump::KeyValueDiff;
use crate::files::FileSetDiff;

/// Sections with more items than this print a placeholder instead.
pub const LIST_THRESHOLD: usize = 5;

/// The whole report when nothing differs.
pub const NO_DIFFERENCES: &str = "No differences found.";

/// Placeholder for a section over [`LIST_THRESHOLD`].
pub const TOO_MANY: &str = "(too many to list)";

/// Both halves of a comparison, as rendered by [`generate_report`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub files: FileSetDiff,
    pub entries: KeyValueDiff,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        generate_report(&self.files, &self.entries)
    }
}

/// Render a migration plan. Pure; the caller decides where the text goes.
pub fn generate_report(files: &FileSetDiff, entries: &KeyValueDiff) -> String {
    let updates: Vec<String> = entries
        .changed
        .iter()
        .map(|(key, change)| format!("{key}: {} -> {}", change.old, change.new))
        .collect();

    let sections = [
        ("Files to copy from old system", files.missing_in_new.as_slice()),
        ("Files to review on new system", files.missing_in_old.as_slice()),
        ("Database entries to add", entries.missing_keys.as_slice()),
        ("Database entries to update", updates.as_slice()),
    ];

    let rendered: Vec<String> = sections
        .iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(title, items)| render_section(title, items))
        .collect();

    if rendered.is_empty() {
        return format!("{NO_DIFFERENCES}\n");
    }
    rendered.join("\n")
}

fn render_section(title: &str, items: &[String]) -> String {
    let mut out = format!("{title} ({}):\n", items.len());
    if items.len() > LIST_THRESHOLD {
        out.push_str(&format!("  {TOO_MANY}\n"));
        return out;
    }
    for item in items {
        out.push_str(&format!("  {item}\n"));
    }
    out
}
