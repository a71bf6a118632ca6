//! Minimal `Transport` collaborator plus a `file://` implementation —
//! enough to satisfy clone/fetch/push over a local bare-ish remote
//! (scenario S3). Network protocols (HTTPS/pkt-line/pack) are out of
//! scope for this crate.

use std::path::{Path, PathBuf};

use crate::error::{PorcelainError, Result};
use crate::hash::ObjectId;
use crate::refs::{Head, RefDb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefUpdateStatus {
    Ok,
    RejectedNoDelete,
    RejectedNonFastForward,
    RejectedOtherReason,
    RejectedRemoteChanged,
}

#[derive(Debug, Clone)]
pub struct RefUpdate {
    pub name: String,
    pub new_id: ObjectId,
    pub status: RefUpdateStatus,
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub advertised_refs: Vec<(String, ObjectId)>,
    pub advertised_head: Option<Head>,
}

#[derive(Debug, Clone)]
pub struct PushResult {
    pub updates: Vec<RefUpdate>,
}

impl PushResult {
    /// §4.1: false iff any status is a REJECTED_* variant.
    pub fn succeeded(&self) -> bool {
        !self.updates.iter().any(|u| u.status != RefUpdateStatus::Ok)
    }
}

pub trait Transport {
    fn fetch(&self, want_refs: &[String]) -> Result<FetchResult>;
    fn push(&self, updates: &[(String, ObjectId)], force: bool) -> Result<PushResult>;
}

/// A `file:///abs/path` remote: reads/writes the remote's `.git`
/// directly, since there is no network boundary to negotiate across.
pub struct FileTransport {
    remote_git_dir: PathBuf,
    local_git_dir: PathBuf,
}

impl FileTransport {
    pub fn open(uri: &str, local_git_dir: &Path) -> Result<FileTransport> {
        let remote_path = url::Url::parse(uri)
            .ok()
            .and_then(|u| u.to_file_path().ok())
            .unwrap_or_else(|| PathBuf::from(uri));
        let remote_git_dir = if remote_path.join(".git").exists() {
            remote_path.join(".git")
        } else {
            remote_path
        };
        Ok(FileTransport {
            remote_git_dir,
            local_git_dir: local_git_dir.to_path_buf(),
        })
    }

    fn copy_objects(&self, from: &Path, to: &Path) -> Result<()> {
        let from_objects = from.join("objects");
        let to_objects = to.join("objects");
        if !from_objects.exists() {
            return Ok(());
        }
        for entry in walkdir::WalkDir::new(&from_objects).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                let rel = entry.path().strip_prefix(&from_objects).unwrap();
                let dest = to_objects.join(rel);
                if !dest.exists() {
                    if let Some(parent) = dest.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::copy(entry.path(), &dest)?;
                }
            }
        }
        Ok(())
    }
}

impl Transport for FileTransport {
    fn fetch(&self, _want_refs: &[String]) -> Result<FetchResult> {
        if !self.remote_git_dir.exists() {
            return Err(PorcelainError::TransportFailure(format!(
                "remote '{}' not found",
                self.remote_git_dir.display()
            )));
        }
        self.copy_objects(&self.remote_git_dir, &self.local_git_dir)?;

        let remote_refs = RefDb::new(&self.remote_git_dir);
        let advertised_refs = remote_refs.list_branches()?;
        let advertised_head = remote_refs.head().ok();

        let local_refs = RefDb::new(&self.local_git_dir);
        for (name, id) in &advertised_refs {
            local_refs.update_ref(&format!("refs/remotes/origin/{name}"), id)?;
        }

        Ok(FetchResult {
            advertised_refs,
            advertised_head,
        })
    }

    fn push(&self, updates: &[(String, ObjectId)], force: bool) -> Result<PushResult> {
        if !self.remote_git_dir.exists() {
            return Err(PorcelainError::TransportFailure(format!(
                "remote '{}' not found",
                self.remote_git_dir.display()
            )));
        }
        self.copy_objects(&self.local_git_dir, &self.remote_git_dir)?;

        let remote_refs = RefDb::new(&self.remote_git_dir);
        let mut results = Vec::new();
        for (name, new_id) in updates {
            let current = remote_refs.resolve(&format!("refs/heads/{name}"))?;
            let status = match current {
                None => RefUpdateStatus::Ok,
                Some(current_id) if current_id == *new_id => RefUpdateStatus::Ok,
                Some(current_id) if force || is_ancestor(&remote_refs, &self.remote_git_dir, &current_id, new_id)? => {
                    RefUpdateStatus::Ok
                }
                Some(_) => RefUpdateStatus::RejectedNonFastForward,
            };
            if status == RefUpdateStatus::Ok {
                remote_refs.update_ref(&format!("refs/heads/{name}"), new_id)?;
            }
            results.push(RefUpdate {
                name: name.clone(),
                new_id: *new_id,
                status,
            });
        }
        Ok(PushResult { updates: results })
    }
}

/// BFS fast-forward check: is `ancestor` reachable from `descendant`?
fn is_ancestor(
    _refs: &RefDb,
    git_dir: &Path,
    ancestor: &ObjectId,
    descendant: &ObjectId,
) -> Result<bool> {
    let store = crate::object::ObjectStore::new(git_dir);
    let mut queue = std::collections::VecDeque::new();
    let mut seen = std::collections::HashSet::new();
    queue.push_back(*descendant);
    seen.insert(*descendant);
    while let Some(id) = queue.pop_front() {
        if id == *ancestor {
            return Ok(true);
        }
        if let Ok(commit) = store.read_commit(&id) {
            for parent in commit.parents {
                if seen.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
    }
    Ok(false)
}
