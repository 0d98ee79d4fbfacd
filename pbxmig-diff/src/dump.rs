//! Key-value dump parsing and map difference.
//!
//! Dump files are whatever the remote side exported: ASTDB `database show`
//! output (`/key : value`), simplified SQL (`key=value`), or noise. Each line
//! splits on its first `=`, else on its first `:`, else is dropped.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, DiffError};

/// Parsed dump. Last occurrence of a key wins.
pub type KeyValueMap = BTreeMap<String, String>;

/// A value that differs between the two dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueChange {
    pub old: String,
    pub new: String,
}

/// Difference between two dumps, keyed from the old side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueDiff {
    /// Keys only present in the old dump, ascending.
    pub missing_keys: Vec<String>,
    /// Keys present in both with unequal values.
    pub changed: BTreeMap<String, ValueChange>,
}

impl KeyValueDiff {
    pub fn is_empty(&self) -> bool {
        self.missing_keys.is_empty() && self.changed.is_empty()
    }
}

/// Split one dump line into a trimmed `(key, value)` pair.
///
/// Returns `None` when the line has neither delimiter.
pub(crate) fn split_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=').or_else(|| line.split_once(':'))?;
    Some((key.trim(), value.trim()))
}

/// Parse a dump file from disk.
///
/// The file handle is dropped on every exit path, including read errors
/// part-way through.
pub fn parse_key_value_dump(path: &Path) -> Result<KeyValueMap, DiffError> {
    let file = std::fs::File::open(path).map_err(|e| io_err(path, e))?;
    let reader = BufReader::new(file);

    let mut map = KeyValueMap::new();
    let mut skipped = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| io_err(path, e))?;
        if !insert_line(&mut map, &line) {
            skipped += 1;
            tracing::debug!("{}:{}: no delimiter, skipped", path.display(), idx + 1);
        }
    }

    tracing::debug!(
        "parsed {} entries from {} ({} lines skipped)",
        map.len(),
        path.display(),
        skipped
    );
    Ok(map)
}

/// Parse in-memory dump content with the same rules as [`parse_key_value_dump`].
pub fn parse_key_value_str(content: &str) -> KeyValueMap {
    let mut map = KeyValueMap::new();
    for line in content.lines() {
        insert_line(&mut map, line);
    }
    map
}

fn insert_line(map: &mut KeyValueMap, line: &str) -> bool {
    match split_line(line) {
        Some((key, value)) => {
            map.insert(key.to_string(), value.to_string());
            true
        }
        None => false,
    }
}

/// Keys missing from `new`, and keys whose values differ.
///
/// Equality is exact and case-sensitive; keys only in `new` are ignored.
pub fn compare_key_value_maps(old: &KeyValueMap, new: &KeyValueMap) -> KeyValueDiff {
    let mut diff = KeyValueDiff::default();
    for (key, old_value) in old {
        match new.get(key) {
            None => diff.missing_keys.push(key.clone()),
            Some(new_value) if new_value != old_value => {
                diff.changed.insert(
                    key.clone(),
                    ValueChange {
                        old: old_value.clone(),
                        new: new_value.clone(),
                    },
                );
            }
            Some(_) => {}
        }
    }
    diff
}
