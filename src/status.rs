//! StatusReconciler — the three-way classification engine (§4.2).

use crate::error::{PorcelainError, Result};
use crate::hash::ObjectId;
use crate::pathmatch::PathMatcher;
use crate::object::FileMode;
use crate::repository::Repository;
use crate::treewalk::{self, WalkRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    Untracked,
    Added,
    Modified,
    Deleted,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    Untracked,
    Added,
    Removed,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub path: String,
    pub index_status: IndexStatus,
    pub repo_status: RepoStatus,
}

/// `status(listUnchanged, lenient)`.
pub fn status(repo: &Repository, list_unchanged: bool, lenient: bool) -> Result<Vec<StatusEntry>> {
    let lock = repo.lock_index()?;
    let index = repo.read_index()?;
    let head_tree = repo.head_tree_id()?;
    let matcher = PathMatcher::load(&repo.work_dir);

    let records = treewalk::three_way_walk(&repo.work_dir, &index, &repo.store, head_tree.as_ref())?;
    lock.unlock();

    let mut out = Vec::new();
    for record in records {
        if matcher.is_ignored_rel(&record.path) {
            continue;
        }
        if let Some(entry) = classify(&repo.work_dir, &record, list_unchanged, lenient)? {
            out.push(entry);
        }
    }
    Ok(out)
}

fn classify(
    work_dir: &std::path::Path,
    record: &WalkRecord,
    list_unchanged: bool,
    lenient: bool,
) -> Result<Option<StatusEntry>> {
    let in_wd = record.in_wd();
    let in_idx = record.in_index();
    let in_repo = record.in_tree();

    let result = match (in_wd, in_idx, in_repo) {
        (true, false, false) => Some((IndexStatus::Untracked, RepoStatus::Untracked)),
        (true, true, false) => {
            let idx = record.index.as_ref().unwrap();
            if idx.mode == FileMode::Gitlink {
                None
            } else {
                let wd = record.wd.as_ref().unwrap();
                let stale = idx.length != wd.length
                    || !treewalk::timestamps_match(idx.mtime_ms, wd.mtime_ms);
                if stale {
                    let wd_id = treewalk::hash_work_tree_file(work_dir, &record.path)?;
                    if wd_id == idx.object_id {
                        Some((IndexStatus::Added, RepoStatus::Untracked))
                    } else {
                        Some((IndexStatus::Modified, RepoStatus::Untracked))
                    }
                } else {
                    Some((IndexStatus::Added, RepoStatus::Untracked))
                }
            }
        }
        (false, true, true) => {
            let idx = record.index.as_ref().unwrap();
            let repo = record.tree.as_ref().unwrap();
            if idx.object_id == repo.object_id {
                Some((IndexStatus::Deleted, RepoStatus::Unchanged))
            } else {
                Some((IndexStatus::Deleted, RepoStatus::Added))
            }
        }
        (true, true, true) => {
            let idx = record.index.as_ref().unwrap();
            let repo = record.tree.as_ref().unwrap();
            let idx_eq_repo = idx.object_id == repo.object_id;

            let stale = {
                let wd = record.wd.as_ref().unwrap();
                idx.length != wd.length || !treewalk::timestamps_match(idx.mtime_ms, wd.mtime_ms)
            };
            let wd_eq_idx = if stale {
                treewalk::hash_work_tree_file(work_dir, &record.path)? == idx.object_id
            } else {
                true
            };

            match (wd_eq_idx, idx_eq_repo) {
                (true, true) => {
                    if list_unchanged {
                        Some((IndexStatus::Unchanged, RepoStatus::Unchanged))
                    } else {
                        None
                    }
                }
                (true, false) => Some((IndexStatus::Added, RepoStatus::Added)),
                (false, true) => Some((IndexStatus::Modified, RepoStatus::Unchanged)),
                (false, false) => Some((IndexStatus::Modified, RepoStatus::Added)),
            }
        }
        (false, true, false) => Some((IndexStatus::Deleted, RepoStatus::Untracked)),
        (false, false, true) => Some((IndexStatus::Deleted, RepoStatus::Removed)),
        (true, false, true) => Some((IndexStatus::Untracked, RepoStatus::Removed)),
        (false, false, false) => None, // impossible per §3 invariants
    };

    match result {
        Some((index_status, repo_status)) => Ok(Some(StatusEntry {
            path: record.path.clone(),
            index_status,
            repo_status,
        })),
        None if in_wd || in_idx || in_repo => Ok(None),
        None => {
            if lenient {
                tracing::warn!(
                    path = %record.path,
                    wd = ?record.wd.as_ref().map(|r| r.object_id),
                    idx = ?record.index.as_ref().map(|r| r.object_id),
                    repo = ?record.tree.as_ref().map(|r| r.object_id),
                    "status reconciliation hit an unexpected case"
                );
                Ok(None)
            } else {
                Err(PorcelainError::UnexpectedStatusCase {
                    path: record.path.clone(),
                    wd: record.wd.as_ref().map(|r| r.object_id),
                    idx: record.index.as_ref().map(|r| r.object_id),
                    repo: record.tree.as_ref().map(|r| r.object_id),
                })
            }
        }
    }
}

/// Human-readable one-line-per-entry rendering, in the teacher's short
/// status idiom (`XY path`), colorized the way `status.rs` colors
/// staged vs. unstaged changes.
pub fn format_short(entries: &[StatusEntry]) -> String {
    use colored::Colorize;
    let mut out = String::new();
    for entry in entries {
        let code = short_code(entry);
        let line = format!("{code} {}", entry.path);
        let colored_line = if matches!(
            entry.repo_status,
            RepoStatus::Added | RepoStatus::Removed
        ) {
            line.green().to_string()
        } else {
            line.red().to_string()
        };
        out.push_str(&colored_line);
        out.push('\n');
    }
    out
}

fn short_code(entry: &StatusEntry) -> String {
    let x = match entry.repo_status {
        RepoStatus::Added => 'A',
        RepoStatus::Removed => 'D',
        RepoStatus::Untracked => '?',
        RepoStatus::Unchanged => ' ',
    };
    let y = match entry.index_status {
        IndexStatus::Modified => 'M',
        IndexStatus::Deleted => 'D',
        IndexStatus::Untracked => '?',
        IndexStatus::Added | IndexStatus::Unchanged => ' ',
    };
    format!("{x}{y}")
}

/// `v1` porcelain format is byte-identical in spirit to `format_short`
/// for this crate's reduced status surface (no rename detection).
pub fn format_porcelain_v1(entries: &[StatusEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("{} {}\n", short_code(entry), entry.path));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treewalk::SourceRecord;

    fn src(mode: FileMode, len: u64, mtime: u64, id: ObjectId) -> SourceRecord {
        SourceRecord {
            mode,
            length: len,
            mtime_ms: mtime,
            object_id: id,
        }
    }

    #[test]
    fn untracked_file_classification() {
        let id = ObjectId::of_payload("blob", b"x");
        let record = WalkRecord {
            path: "f.txt".into(),
            wd: Some(src(FileMode::Regular, 1, 0, id)),
            index: None,
            tree: None,
        };
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), b"x").unwrap();
        let entry = classify(dir.path(), &record, false, false).unwrap().unwrap();
        assert_eq!(entry.index_status, IndexStatus::Untracked);
        assert_eq!(entry.repo_status, RepoStatus::Untracked);
    }

    #[test]
    fn deleted_unchanged_classification() {
        let id = ObjectId::of_payload("blob", b"x");
        let record = WalkRecord {
            path: "f.txt".into(),
            wd: None,
            index: Some(src(FileMode::Regular, 1, 0, id)),
            tree: Some(src(FileMode::Regular, 0, 0, id)),
        };
        let dir = tempfile::tempdir().unwrap();
        let entry = classify(dir.path(), &record, false, false).unwrap().unwrap();
        assert_eq!(entry.index_status, IndexStatus::Deleted);
        assert_eq!(entry.repo_status, RepoStatus::Unchanged);
    }
}
