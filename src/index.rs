//! The staged index ("DirCache"): a canonically ordered, lock-file
//! guarded list of what will go into the next commit.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PorcelainError, Result};
use crate::hash::ObjectId;
use crate::object::{FileMode, Tree, TreeEntry};

#[derive(Debug, Clone, PartialEq)]
pub struct DirCacheEntry {
    pub path: String,
    pub mode: FileMode,
    pub length: u64,
    pub mtime_ms: u64,
    pub object_id: ObjectId,
    pub assume_valid: bool,
}

/// Byte-lexicographic, `/` sorts before any other byte at the same
/// position — the canonical index order (spec invariant #2).
fn path_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

#[derive(Debug, Default, Clone)]
pub struct DirCache {
    entries: Vec<DirCacheEntry>,
}

impl DirCache {
    pub fn entries(&self) -> &[DirCacheEntry] {
        &self.entries
    }

    pub fn get(&self, path: &str) -> Option<&DirCacheEntry> {
        self.entries
            .binary_search_by(|e| path_cmp(&e.path, path))
            .ok()
            .map(|i| &self.entries[i])
    }

    fn insert_sorted(&mut self, entry: DirCacheEntry) {
        match self.entries.binary_search_by(|e| path_cmp(&e.path, &entry.path)) {
            Ok(i) => self.entries[i] = entry,
            Err(i) => self.entries.insert(i, entry),
        }
    }

    /// Insert (or replace) an entry, keeping canonical order. Used by
    /// checkout, which rebuilds the index directly from a tree rather
    /// than through a `DirCacheBuilder` walk.
    pub fn insert(&mut self, entry: DirCacheEntry) {
        self.insert_sorted(entry);
    }

    pub fn path() -> &'static str {
        "index"
    }

    fn index_path(git_dir: &Path) -> PathBuf {
        git_dir.join("index")
    }

    /// Read the index from disk; an absent index is an empty one (fresh repo).
    pub fn read(git_dir: &Path) -> Result<DirCache> {
        let path = Self::index_path(git_dir);
        if !path.exists() {
            return Ok(DirCache::default());
        }
        let text = fs::read_to_string(&path)?;
        let mut entries = Vec::new();
        for line in text.lines() {
            let mut fields = line.split('\t');
            let mode_raw: u32 = u32::from_str_radix(fields.next().unwrap_or("0"), 8).unwrap_or(0);
            let length: u64 = fields.next().unwrap_or("0").parse().unwrap_or(0);
            let mtime_ms: u64 = fields.next().unwrap_or("0").parse().unwrap_or(0);
            let id_hex = fields.next().unwrap_or_default();
            let assume_valid = fields.next().unwrap_or("0") == "1";
            let path_field = fields.next().unwrap_or_default().to_string();
            let object_id = id_hex.parse().unwrap_or_else(|_| ObjectId::zero());
            entries.push(DirCacheEntry {
                path: path_field,
                mode: FileMode::from_raw(mode_raw),
                length,
                mtime_ms,
                object_id,
                assume_valid,
            });
        }
        entries.sort_by(|a, b| path_cmp(&a.path, &b.path));
        Ok(DirCache { entries })
    }

    pub fn write_tree(&self, store: &crate::object::ObjectStore) -> Result<ObjectId> {
        build_tree_recursive(&self.entries, "", store)
    }

    pub fn lock(git_dir: &Path) -> Result<IndexLock> {
        IndexLock::acquire(git_dir)
    }

    pub fn builder(&self) -> DirCacheBuilder {
        DirCacheBuilder {
            base: self.clone(),
            staged: Vec::new(),
        }
    }
}

fn build_tree_recursive(
    entries: &[DirCacheEntry],
    prefix: &str,
    store: &crate::object::ObjectStore,
) -> Result<ObjectId> {
    // Group entries directly under `prefix` by their next path component.
    let mut children: Vec<(String, Vec<&DirCacheEntry>)> = Vec::new();
    for entry in entries {
        let rel = match entry.path.strip_prefix(prefix) {
            Some(r) if !r.is_empty() => r,
            _ => continue,
        };
        let name = rel.split('/').next().unwrap().to_string();
        match children.iter_mut().find(|(n, _)| *n == name) {
            Some((_, group)) => group.push(entry),
            None => children.push((name, vec![entry])),
        }
    }

    let mut tree = Tree::default();
    for (name, group) in children {
        if group.len() == 1 && group[0].path == format!("{prefix}{name}") {
            let entry = group[0];
            tree.entries.push(TreeEntry {
                name,
                mode: entry.mode,
                id: entry.object_id,
            });
        } else {
            let owned: Vec<DirCacheEntry> = group.into_iter().cloned().collect();
            let sub_prefix = format!("{prefix}{name}/");
            let sub_id = build_tree_recursive(&owned, &sub_prefix, store)?;
            tree.entries.push(TreeEntry {
                name,
                mode: FileMode::Tree,
                id: sub_id,
            });
        }
    }
    store.write_tree(&tree)
}

/// Builds a new index from a three-way walk without materializing more
/// than the entries actually visited.
pub struct DirCacheBuilder {
    base: DirCache,
    staged: Vec<DirCacheEntry>,
}

impl DirCacheBuilder {
    pub fn previous(&self, path: &str) -> Option<&DirCacheEntry> {
        self.base.get(path)
    }

    pub fn add(&mut self, entry: DirCacheEntry) {
        self.staged.push(entry);
    }

    /// Finish building, returning the new canonically ordered index.
    pub fn finish(self) -> DirCache {
        let mut cache = DirCache::default();
        for entry in self.staged {
            cache.insert_sorted(entry);
        }
        cache
    }
}

/// Exclusive index lock: `index.lock` sibling, released on every exit
/// path including unwinding (drop guard), committed by atomic rename.
pub struct IndexLock {
    git_dir: PathBuf,
    lock_path: PathBuf,
    committed: bool,
}

impl IndexLock {
    fn acquire(git_dir: &Path) -> Result<IndexLock> {
        let lock_path = git_dir.join("index.lock");
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path);
        match file {
            Ok(_) => Ok(IndexLock {
                git_dir: git_dir.to_path_buf(),
                lock_path,
                committed: false,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(
                PorcelainError::IndexUpdateFailed("index is already locked".into()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Serialize `cache` into the lock file and atomically rename it
    /// into place. Returns `Ok(true)` on success, matching
    /// `DirCacheBuilder.commit() -> bool` in the collaborator contract.
    pub fn commit(mut self, cache: &DirCache) -> Result<bool> {
        let mut text = String::new();
        for entry in cache.entries() {
            text.push_str(&format!(
                "{:o}\t{}\t{}\t{}\t{}\t{}\n",
                entry.mode.raw(),
                entry.length,
                entry.mtime_ms,
                entry.object_id,
                if entry.assume_valid { 1 } else { 0 },
                entry.path
            ));
        }
        fs::write(&self.lock_path, text)?;
        let index_path = self.git_dir.join("index");
        fs::rename(&self.lock_path, &index_path)?;
        self.committed = true;
        tracing::debug!(entries = cache.entries().len(), "committed staged index");
        Ok(true)
    }

    pub fn unlock(mut self) {
        self.committed = true; // mark handled; drop impl removes any residual lock file
        let _ = fs::remove_file(&self.lock_path);
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn non_regular_modes_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let git_dir = dir.path();

        let mut cache = DirCache::default();
        for (path, mode) in [
            ("exe", FileMode::Executable),
            ("link", FileMode::Symlink),
            ("sub", FileMode::Gitlink),
        ] {
            cache.insert(DirCacheEntry {
                path: path.into(),
                mode,
                length: 0,
                mtime_ms: 0,
                object_id: ObjectId::of_payload("blob", path.as_bytes()),
                assume_valid: false,
            });
        }

        let lock = IndexLock::acquire(git_dir).unwrap();
        lock.commit(&cache).unwrap();

        let reloaded = DirCache::read(git_dir).unwrap();
        assert_eq!(reloaded.get("exe").unwrap().mode, FileMode::Executable);
        assert_eq!(reloaded.get("link").unwrap().mode, FileMode::Symlink);
        assert_eq!(reloaded.get("sub").unwrap().mode, FileMode::Gitlink);
    }
}
