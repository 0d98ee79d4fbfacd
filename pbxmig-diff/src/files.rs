//! File-tree snapshots and their set difference.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use crate::error::{io_err, DiffError};

// ---------------------------------------------------------------------------
// FileSet
// ---------------------------------------------------------------------------

/// Relative file paths under a snapshot root, `/`-separated.
///
/// Unordered on construction; [`compare_file_sets`] sorts its output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet(HashSet<String>);

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.0.insert(path.into())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FileSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Both directions of a file-set comparison, each sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSetDiff {
    /// Present in the old snapshot only: candidates to copy across.
    pub missing_in_new: Vec<String>,
    /// Present in the new snapshot only: worth a manual review.
    pub missing_in_old: Vec<String>,
}

impl FileSetDiff {
    pub fn is_empty(&self) -> bool {
        self.missing_in_new.is_empty() && self.missing_in_old.is_empty()
    }
}

// ---------------------------------------------------------------------------
// list_files
// ---------------------------------------------------------------------------

/// Recursively collect every file under `root`, relative to `root`.
///
/// Directories contribute no entries. Symlinks are not followed into, but a
/// symlink that resolves to a regular file counts as a file. Any unreadable
/// entry or non-UTF-8 file name fails the whole listing.
pub fn list_files(root: &Path) -> Result<FileSet, DiffError> {
    let meta = std::fs::metadata(root).map_err(|e| io_err(root, e))?;
    if !meta.is_dir() {
        return Err(DiffError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut files = FileSet::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| walk_err(root, e))?;
        if !is_file_entry(&entry) {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let key = relative_key(relative).ok_or_else(|| DiffError::NonUtf8Path {
            path: entry.path().to_path_buf(),
        })?;
        files.insert(key);
    }

    tracing::debug!("listed {} files under {}", files.len(), root.display());
    Ok(files)
}

fn is_file_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// `None` if any component is not valid UTF-8; such names cannot be keyed
/// without collisions or handed back to rsync verbatim.
fn relative_key(relative: &Path) -> Option<String> {
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

fn walk_err(root: &Path, err: walkdir::Error) -> DiffError {
    let path: PathBuf = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    io_err(path, std::io::Error::from(err))
}

// ---------------------------------------------------------------------------
// compare_file_sets
// ---------------------------------------------------------------------------

/// Set difference in both directions, sorted by raw path string.
pub fn compare_file_sets(old: &FileSet, new: &FileSet) -> FileSetDiff {
    let mut missing_in_new: Vec<String> = old.0.difference(&new.0).cloned().collect();
    let mut missing_in_old: Vec<String> = new.0.difference(&old.0).cloned().collect();
    missing_in_new.sort();
    missing_in_old.sort();
    FileSetDiff {
        missing_in_new,
        missing_in_old,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, "x").expect("write");
    }

    #[test]
    fn lists_nested_files_relative_to_root() {
        let dir = TempDir::new().expect("tempdir");
        touch(dir.path(), "sip.conf");
        touch(dir.path(), "extensions.d/custom.conf");
        touch(dir.path(), "keys/a/b/c.pem");

        let files = list_files(dir.path()).expect("list");
        assert_eq!(files.len(), 3);
        assert!(files.contains("sip.conf"));
        assert!(files.contains("extensions.d/custom.conf"));
        assert!(files.contains("keys/a/b/c.pem"));
    }

    #[test]
    fn directories_contribute_no_entries() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("empty/nested")).expect("mkdir");
        let files = list_files(dir.path()).expect("list");
        assert!(files.is_empty());
    }

    #[test]
    fn missing_root_is_io_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = list_files(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, DiffError::Io { .. }), "got: {err}");
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        touch(dir.path(), "single.conf");
        let err = list_files(&dir.path().join("single.conf")).unwrap_err();
        assert!(matches!(err, DiffError::NotADirectory { .. }), "got: {err}");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_counts_but_symlinked_dir_does_not() {
        let dir = TempDir::new().expect("tempdir");
        touch(dir.path(), "real/target.conf");
        std::os::unix::fs::symlink(
            dir.path().join("real/target.conf"),
            dir.path().join("link.conf"),
        )
        .expect("symlink file");
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("linkdir"))
            .expect("symlink dir");

        let files = list_files(dir.path()).expect("list");
        assert!(files.contains("link.conf"));
        assert!(files.contains("real/target.conf"));
        assert!(!files.iter().any(|p| p.starts_with("linkdir")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_name_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().expect("tempdir");
        touch(dir.path(), "ok.conf");
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.conf")), "x").expect("write");

        let err = list_files(dir.path()).unwrap_err();
        assert!(matches!(err, DiffError::NonUtf8Path { .. }), "got: {err}");
    }

    #[test]
    fn scenario_old_and_new_overlap() {
        let old: FileSet = ["a.conf", "b.conf"].into_iter().collect();
        let new: FileSet = ["b.conf", "c.conf"].into_iter().collect();
        let diff = compare_file_sets(&old, &new);
        assert_eq!(diff.missing_in_new, vec!["a.conf"]);
        assert_eq!(diff.missing_in_old, vec!["c.conf"]);
    }

    #[test]
    fn both_empty_yields_empty_diff() {
        let diff = compare_file_sets(&FileSet::new(), &FileSet::new());
        assert!(diff.is_empty());
    }

    #[test]
    fn output_is_sorted_by_raw_string() {
        let old: FileSet = ["b.conf", "a/z.conf", "a.conf", "B.conf"].into_iter().collect();
        let diff = compare_file_sets(&old, &FileSet::new());
        // '.' (0x2E) sorts before '/' (0x2F); uppercase before lowercase.
        assert_eq!(diff.missing_in_new, vec!["B.conf", "a.conf", "a/z.conf", "b.conf"]);
    }
}
