//! Three-way tree walk: a uniform view over the working tree, the
//! staged index and a committed tree, modeled as a tagged enum per
//! source rather than a runtime-downcast iterator hierarchy.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::hash::ObjectId;
use crate::index::{DirCache, DirCacheEntry};
use crate::object::{FileMode, ObjectStore};

/// A single source's view of a path: raw mode, length and mtime are
/// always available; the object id may require hashing file content
/// on demand for the work-tree source.
#[derive(Debug, Clone)]
pub struct SourceRecord {
    pub mode: FileMode,
    pub length: u64,
    pub mtime_ms: u64,
    pub object_id: ObjectId,
}

#[derive(Debug, Clone, Default)]
pub struct WalkRecord {
    pub path: String,
    pub wd: Option<SourceRecord>,
    pub index: Option<SourceRecord>,
    pub tree: Option<SourceRecord>,
}

impl WalkRecord {
    pub fn in_wd(&self) -> bool {
        self.wd.is_some()
    }
    pub fn in_index(&self) -> bool {
        self.index.is_some()
    }
    pub fn in_tree(&self) -> bool {
        self.tree.is_some()
    }
}

/// Recursively list the working tree (excluding `.git`), hashing file
/// content lazily — callers that only need length/mtime never pay for it.
pub fn scan_work_tree(work_dir: &Path) -> Result<BTreeMap<String, (FileMode, u64, u64)>> {
    let mut out = BTreeMap::new();
    for entry in walkdir::WalkDir::new(work_dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_dir() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(work_dir)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/");
        let metadata = entry.metadata().map_err(std::io::Error::from)?;
        let mode = if entry.file_type().is_symlink() {
            FileMode::Symlink
        } else if is_executable(&metadata) {
            FileMode::Executable
        } else {
            FileMode::Regular
        };
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        out.insert(rel, (mode, metadata.len(), mtime_ms));
    }
    Ok(out)
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

pub fn hash_work_tree_file(work_dir: &Path, rel_path: &str) -> Result<ObjectId> {
    let data = fs::read(work_dir.join(rel_path))?;
    Ok(ObjectId::of_payload("blob", &data))
}

/// Flatten a committed tree into its leaf blob/gitlink entries, path
/// relative to the tree root.
pub fn flatten_tree(store: &ObjectStore, tree_id: &ObjectId) -> Result<BTreeMap<String, (FileMode, ObjectId)>> {
    let mut out = BTreeMap::new();
    flatten_tree_into(store, tree_id, "", &mut out)?;
    Ok(out)
}

fn flatten_tree_into(
    store: &ObjectStore,
    tree_id: &ObjectId,
    prefix: &str,
    out: &mut BTreeMap<String, (FileMode, ObjectId)>,
) -> Result<()> {
    let tree = store.read_tree(tree_id)?;
    for entry in &tree.entries {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };
        if entry.mode.is_tree() {
            flatten_tree_into(store, &entry.id, &path, out)?;
        } else {
            out.insert(path, (entry.mode, entry.id));
        }
    }
    Ok(())
}

/// Build the three-way walk records in canonical path order. `tree_id`
/// is `None` when HEAD is unborn (an empty repository).
pub fn three_way_walk(
    work_dir: &Path,
    index: &DirCache,
    store: &ObjectStore,
    tree_id: Option<&ObjectId>,
) -> Result<Vec<WalkRecord>> {
    let wd_map = scan_work_tree(work_dir)?;
    let tree_map = match tree_id {
        Some(id) => flatten_tree(store, id)?,
        None => BTreeMap::new(),
    };

    let mut paths: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
    paths.extend(wd_map.keys().cloned());
    paths.extend(index.entries().iter().map(|e| e.path.clone()));
    paths.extend(tree_map.keys().cloned());

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let wd = wd_map.get(&path).map(|(mode, len, mtime)| SourceRecord {
            mode: *mode,
            length: *len,
            mtime_ms: *mtime,
            object_id: ObjectId::zero(), // lazily hashed by callers that need it
        });
        let index_rec = index.get(&path).map(index_to_source);
        let tree_rec = tree_map.get(&path).map(|(mode, id)| SourceRecord {
            mode: *mode,
            length: 0,
            mtime_ms: 0,
            object_id: *id,
        });
        records.push(WalkRecord {
            path,
            wd,
            index: index_rec,
            tree: tree_rec,
        });
    }
    Ok(records)
}

fn index_to_source(entry: &DirCacheEntry) -> SourceRecord {
    SourceRecord {
        mode: entry.mode,
        length: entry.length,
        mtime_ms: entry.mtime_ms,
        object_id: entry.object_id,
    }
}

/// mtime comparison with second-resolution fallback whenever either
/// side's millisecond component is a multiple of 1000 (coarse fs clock).
pub fn timestamps_match(a_ms: u64, b_ms: u64) -> bool {
    if a_ms % 1000 == 0 || b_ms % 1000 == 0 {
        a_ms / 1000 == b_ms / 1000
    } else {
        a_ms == b_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_second_resolution_fallback() {
        assert!(timestamps_match(1_000, 1_999));
        assert!(!timestamps_match(1_500, 2_500));
        assert!(timestamps_match(1_234, 1_234));
        assert!(!timestamps_match(1_234, 1_235));
    }
}
