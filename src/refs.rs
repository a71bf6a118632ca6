//! File-based ref database: HEAD, `refs/heads/*`, `refs/remotes/*`,
//! each updated via a `.lock` sibling and an atomic rename (§6.3).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PorcelainError, Result};
use crate::hash::ObjectId;

pub struct RefDb {
    git_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub enum Head {
    Branch(String),
    Detached(ObjectId),
}

impl RefDb {
    pub fn new(git_dir: &Path) -> Self {
        RefDb {
            git_dir: git_dir.to_path_buf(),
        }
    }

    fn ref_path(&self, name: &str) -> PathBuf {
        self.git_dir.join(name)
    }

    /// Read a ref file's target id, following one level of `ref:` indirection.
    pub fn resolve(&self, name: &str) -> Result<Option<ObjectId>> {
        let path = self.ref_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let content = content.trim();
        if let Some(target) = content.strip_prefix("ref: ") {
            return self.resolve(target.trim());
        }
        Ok(content.parse().ok())
    }

    /// Atomic update: create `NAME.lock`, write target, rename over `NAME`.
    /// Fails with a lock-conflict error if `NAME.lock` already exists.
    pub fn update_ref(&self, name: &str, target: &ObjectId) -> Result<()> {
        let path = self.ref_path(name);
        let lock_path = path.with_extension("lock");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path);
        match file {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(PorcelainError::CommitFailedReflogLocked);
            }
            Err(e) => return Err(e.into()),
        }
        fs::write(&lock_path, format!("{target}\n"))?;
        fs::rename(&lock_path, &path)?;
        Ok(())
    }

    pub fn write_symref(&self, name: &str, target_ref: &str) -> Result<()> {
        let path = self.ref_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_path = path.with_extension("lock");
        fs::write(&lock_path, format!("ref: {target_ref}\n"))?;
        fs::rename(&lock_path, &path)?;
        Ok(())
    }

    pub fn head(&self) -> Result<Head> {
        let path = self.ref_path("HEAD");
        let content = fs::read_to_string(&path)?;
        let content = content.trim();
        if let Some(target) = content.strip_prefix("ref: ") {
            let branch = target
                .trim()
                .strip_prefix("refs/heads/")
                .unwrap_or(target.trim())
                .to_string();
            Ok(Head::Branch(branch))
        } else {
            let id: ObjectId = content
                .parse()
                .map_err(|_| PorcelainError::RefNotResolvable("HEAD".into()))?;
            Ok(Head::Detached(id))
        }
    }

    pub fn set_head(&self, head: &Head) -> Result<()> {
        match head {
            Head::Branch(name) => self.write_symref("HEAD", &format!("refs/heads/{name}")),
            Head::Detached(id) => {
                let path = self.ref_path("HEAD");
                let lock_path = path.with_extension("lock");
                fs::write(&lock_path, format!("{id}\n"))?;
                fs::rename(&lock_path, &path)?;
                Ok(())
            }
        }
    }

    pub fn head_commit(&self) -> Result<Option<ObjectId>> {
        match self.head()? {
            Head::Detached(id) => Ok(Some(id)),
            Head::Branch(name) => self.resolve(&format!("refs/heads/{name}")),
        }
    }

    pub fn current_branch_name(&self) -> Result<Option<String>> {
        match self.head()? {
            Head::Branch(name) => Ok(Some(name)),
            Head::Detached(_) => Ok(None),
        }
    }

    pub fn list_branches(&self) -> Result<Vec<(String, ObjectId)>> {
        self.list_under("refs/heads")
    }

    pub fn list_remote_branches(&self, remote: &str) -> Result<Vec<(String, ObjectId)>> {
        self.list_under(&format!("refs/remotes/{remote}"))
    }

    fn list_under(&self, prefix: &str) -> Result<Vec<(String, ObjectId)>> {
        let dir = self.git_dir.join(prefix);
        let mut out = Vec::new();
        if !dir.exists() {
            return Ok(out);
        }
        for entry in walkdir::WalkDir::new(&dir).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                let rel = entry
                    .path()
                    .strip_prefix(&dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                if let Ok(Some(id)) = self.resolve(&format!("{prefix}/{rel}")) {
                    out.push((rel, id));
                }
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn symref_round_trips_through_head() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        let db = RefDb::new(dir.path());
        db.write_symref("HEAD", "refs/heads/master").unwrap();
        match db.head().unwrap() {
            Head::Branch(name) => assert_eq!(name, "master"),
            Head::Detached(_) => panic!("expected branch head"),
        }
    }

    #[test]
    fn update_ref_rejects_concurrent_lock() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        let db = RefDb::new(dir.path());
        fs::write(dir.path().join("refs/heads/master.lock"), "busy").unwrap();
        let id = ObjectId::of_payload("commit", b"x");
        assert!(db.update_ref("refs/heads/master", &id).is_err());
    }
}
