//! `Repository`: owns the work directory, object store, ref database
//! and config for one `.git` directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{PorcelainError, Result};
use crate::hash::ObjectId;
use crate::index::{DirCache, IndexLock};
use crate::object::ObjectStore;
use crate::refs::{Head, RefDb};

pub struct Repository {
    pub work_dir: PathBuf,
    pub git_dir: PathBuf,
    pub store: ObjectStore,
}

impl Repository {
    /// `init(workDir)`: create `<workDir>/.git`, set `core.bare=false`,
    /// persist config. Fails if a repository already exists there.
    pub fn init(work_dir: &Path) -> Result<Repository> {
        let git_dir = work_dir.join(".git");
        if git_dir.exists() {
            return Err(PorcelainError::PreconditionFailed(format!(
                "'{}' already contains a repository",
                work_dir.display()
            )));
        }
        fs::create_dir_all(&git_dir)?;
        fs::create_dir_all(git_dir.join("objects"))?;
        fs::create_dir_all(git_dir.join("refs/heads"))?;
        fs::create_dir_all(git_dir.join("refs/remotes"))?;
        fs::create_dir_all(git_dir.join("logs"))?;
        fs::write(git_dir.join("HEAD"), "ref: refs/heads/master\n")?;

        let mut config = Config::load(&git_dir);
        config.set_boolean("core", None, "bare", false);
        config.save()?;

        Ok(Repository {
            work_dir: work_dir.to_path_buf(),
            git_dir: git_dir.clone(),
            store: ObjectStore::new(&git_dir),
        })
    }

    /// `existing(workDir)`: open `<workDir>/.git`; `None` if absent.
    pub fn existing(work_dir: &Path) -> Result<Option<Repository>> {
        let git_dir = work_dir.join(".git");
        if !git_dir.exists() {
            return Ok(None);
        }
        Ok(Some(Repository {
            work_dir: work_dir.to_path_buf(),
            git_dir: git_dir.clone(),
            store: ObjectStore::new(&git_dir),
        }))
    }

    pub fn wrap(work_dir: PathBuf, git_dir: PathBuf) -> Repository {
        let store = ObjectStore::new(&git_dir);
        Repository {
            work_dir,
            git_dir,
            store,
        }
    }

    pub fn refs(&self) -> RefDb {
        RefDb::new(&self.git_dir)
    }

    pub fn config(&self) -> Config {
        Config::load(&self.git_dir)
    }

    pub fn lock_index(&self) -> Result<IndexLock> {
        DirCache::lock(&self.git_dir)
    }

    pub fn read_index(&self) -> Result<DirCache> {
        DirCache::read(&self.git_dir)
    }

    pub fn head(&self) -> Result<Head> {
        self.refs().head()
    }

    pub fn head_commit_id(&self) -> Result<Option<ObjectId>> {
        self.refs().head_commit()
    }

    /// The committed HEAD tree id, or `None` when HEAD is unborn.
    pub fn head_tree_id(&self) -> Result<Option<ObjectId>> {
        match self.head_commit_id()? {
            Some(commit_id) => {
                let commit = self.store.read_commit(&commit_id)?;
                Ok(Some(commit.tree))
            }
            None => Ok(None),
        }
    }

    pub fn get_branch(&self) -> Result<Option<String>> {
        self.refs().current_branch_name()
    }
}
