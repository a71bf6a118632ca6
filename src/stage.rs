//! IndexStager — rebuilds the staged index from a two-way walk of the
//! previous index and the working tree (§4.3).

use std::path::{Path, PathBuf};

use crate::error::{PorcelainError, Result};
use crate::pathmatch::PathMatcher;
use crate::index::DirCacheEntry;
use crate::object::{FileMode, ObjectStore};
use crate::repository::Repository;
use crate::treewalk;

/// `add(toAdd, alsoRemove)`. `to_add` is a path inside the work
/// directory (file or directory); `None` targets the whole work tree.
pub fn add(repo: &Repository, to_add: Option<&Path>, also_remove: bool) -> Result<()> {
    let target = match to_add {
        Some(p) => {
            let canonical = dunce_canonicalize(&repo.work_dir.join(p))?;
            if !canonical.starts_with(&repo.work_dir) {
                return Err(PorcelainError::PreconditionFailed(format!(
                    "path '{}' is outside the work directory",
                    p.display()
                )));
            }
            Some(
                canonical
                    .strip_prefix(&repo.work_dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/"),
            )
        }
        None => None,
    };

    let matcher = PathMatcher::load(&repo.work_dir);
    let lock = repo.lock_index()?;
    let index = repo.read_index()?;
    let mut builder = index.builder();

    let wd_map = treewalk::scan_work_tree(&repo.work_dir)?;

    let mut paths: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
    paths.extend(index.entries().iter().map(|e| e.path.clone()));
    paths.extend(wd_map.keys().cloned());

    for path in paths {
        if let Some(ref scope) = target
            && !path_in_scope(&path, scope)
        {
            if let Some(prev) = builder.previous(&path) {
                builder.add(prev.clone());
            }
            continue;
        }

        let prev = builder.previous(&path).cloned();
        let wd = wd_map.get(&path).copied();

        if prev.is_none() && matcher.is_ignored_rel(&path) {
            continue; // newly seen path, respects ignore rules
        }

        match (prev, wd) {
            (None, None) => {}
            (None, Some((mode, len, mtime))) => {
                // Case A: new to the index.
                let entry = build_entry(&repo.store, &repo.work_dir, &path, mode, len, mtime, None)?;
                builder.add(entry);
            }
            (Some(prev), None) => {
                // Case B: gone from the work tree.
                if !also_remove {
                    builder.add(prev);
                }
            }
            (Some(prev), Some((mode, len, mtime))) => {
                if prev.mode == FileMode::Symlink {
                    // Case C: symlinks are never re-staged.
                    builder.add(prev);
                } else {
                    // Case D: re-add, refreshing content fields as needed.
                    let entry = build_entry(
                        &repo.store,
                        &repo.work_dir,
                        &path,
                        mode,
                        len,
                        mtime,
                        Some(&prev),
                    )?;
                    builder.add(entry);
                }
            }
        }
    }

    let new_index = builder.finish();
    if !lock.commit(&new_index)? {
        return Err(PorcelainError::IndexUpdateFailed(
            "index lock commit returned false".into(),
        ));
    }
    Ok(())
}

fn path_in_scope(path: &str, scope: &str) -> bool {
    path == scope || path.starts_with(&format!("{scope}/"))
}

fn build_entry(
    store: &ObjectStore,
    work_dir: &Path,
    path: &str,
    mode: FileMode,
    length: u64,
    mtime_ms: u64,
    prev: Option<&DirCacheEntry>,
) -> Result<DirCacheEntry> {
    if mode == FileMode::Gitlink {
        let object_id = prev
            .map(|p| p.object_id)
            .unwrap_or_else(crate::hash::ObjectId::zero);
        return Ok(DirCacheEntry {
            path: path.to_string(),
            mode,
            length: 0,
            mtime_ms: 0,
            object_id,
            assume_valid: false,
        });
    }

    let needs_rehash = match prev {
        Some(prev) => prev.length != length || !treewalk::timestamps_match(prev.mtime_ms, mtime_ms),
        None => true,
    };

    let object_id = if needs_rehash {
        store.write_blob_from_file(&work_dir.join(path))?
    } else {
        prev.unwrap().object_id
    };

    Ok(DirCacheEntry {
        path: path.to_string(),
        mode,
        length,
        mtime_ms,
        object_id,
        assume_valid: prev.map(|p| p.assume_valid).unwrap_or(false),
    })
}

fn dunce_canonicalize(path: &Path) -> Result<PathBuf> {
    match path.canonicalize() {
        Ok(p) => Ok(p),
        Err(_) => {
            // Target may not exist yet (e.g. a deleted file re-add scope);
            // canonicalize the existing parent and rejoin.
            let parent = path.parent().ok_or_else(|| {
                PorcelainError::PreconditionFailed("path has no parent".into())
            })?;
            let file_name = path.file_name().ok_or_else(|| {
                PorcelainError::PreconditionFailed("path has no file name".into())
            })?;
            Ok(parent.canonicalize()?.join(file_name))
        }
    }
}
