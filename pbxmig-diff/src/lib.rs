//! # pbxmig-diff
//!
//! Snapshot differ and migration-plan renderer.
//!
//! Call [`build_plan`] with the two configuration trees and the two dump
//! files, then [`MigrationPlan::render`] (or [`generate_report`]) for text.
//! Nothing here touches the network or spawns processes.

pub mod dump;
pub mod error;
pub mod files;
pub mod report;

use std::path::Path;

pub use dump::{
    compare_key_value_maps, parse_key_value_dump, parse_key_value_str, KeyValueDiff, KeyValueMap,
    ValueChange,
};
pub use error::DiffError;
pub use files::{compare_file_sets, list_files, FileSet, FileSetDiff};
pub use report::{generate_report, MigrationPlan, LIST_THRESHOLD, NO_DIFFERENCES};

/// Input locations for one comparison.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotPaths<'a> {
    pub old_etc: &'a Path,
    pub new_etc: &'a Path,
    pub old_dump: &'a Path,
    pub new_dump: &'a Path,
}

/// Read all four snapshots, then compare.
///
/// Every input is read before any comparison runs, so a failure on any one
/// of them yields no plan at all.
pub fn build_plan(paths: SnapshotPaths<'_>) -> Result<MigrationPlan, DiffError> {
    let old_files = list_files(paths.old_etc)?;
    let new_files = list_files(paths.new_etc)?;
    let old_map = parse_key_value_dump(paths.old_dump)?;
    let new_map = parse_key_value_dump(paths.new_dump)?;

    let plan = MigrationPlan {
        files: compare_file_sets(&old_files, &new_files),
        entries: compare_key_value_maps(&old_map, &new_map),
    };
    tracing::info!(
        "plan: {} to copy, {} to review, {} to add, {} to update",
        plan.files.missing_in_new.len(),
        plan.files.missing_in_old.len(),
        plan.entries.missing_keys.len(),
        plan.entries.changed.len()
    );
    Ok(plan)
}
