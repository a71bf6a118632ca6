//! PorcelainFaçade — the glue layer (§4.1): factories plus
//! clone/fetch/push/checkout orchestration and the commit builder.

use std::path::Path;

use crate::error::{PorcelainError, Result};
use crate::hash::ObjectId;
use crate::history::{self, ChangeEntry};
use crate::index::DirCache;
use crate::lsfiles::{self, LsFileEntry};
use crate::object::{Commit, Signature};
use crate::reflog::{self, ReflogAction, ReflogContext};
use crate::refs::Head;
use crate::repository::Repository;
use crate::stage;
use crate::status::{self, StatusEntry};
use crate::transport::{FileTransport, Transport};
use crate::treewalk;

pub struct Porcelain {
    pub repo: Repository,
}

impl Porcelain {
    pub fn init(work_dir: &Path) -> Result<Porcelain> {
        Ok(Porcelain {
            repo: Repository::init(work_dir)?,
        })
    }

    pub fn existing(work_dir: &Path) -> Result<Option<Porcelain>> {
        Ok(Repository::existing(work_dir)?.map(|repo| Porcelain { repo }))
    }

    pub fn wrap(repo: Repository) -> Porcelain {
        Porcelain { repo }
    }

    /// `clone(workDir, remoteName, uri, branch)`: init + addRemote +
    /// fetch(remoteName) + checkout(detected head).
    pub fn clone(work_dir: &Path, remote_name: &str, uri: &str, branch: Option<&str>) -> Result<Porcelain> {
        let porcelain = Porcelain::init(work_dir)?;
        porcelain.add_remote(remote_name, uri)?;
        let fetch_result = porcelain.fetch(remote_name)?;

        let head_branch = detect_head_branch(&fetch_result, branch);
        if let Some(branch_name) = head_branch {
            let tracking_ref = format!("refs/remotes/{remote_name}/{branch_name}");
            let commit_id = porcelain
                .repo
                .refs()
                .resolve(&tracking_ref)?
                .ok_or_else(|| PorcelainError::RefNotResolvable(tracking_ref.clone()))?;

            porcelain
                .repo
                .refs()
                .update_ref(&format!("refs/heads/{branch_name}"), &commit_id)?;
            porcelain.repo.refs().set_head(&Head::Branch(branch_name.clone()))?;

            let mut config = porcelain.repo.config();
            config.set_string("branch", Some(&branch_name), "merge", &format!("refs/heads/{branch_name}"));
            config.set_string("branch", Some(&branch_name), "remote", remote_name);
            config.save()?;

            porcelain.checkout(&branch_name)?;

            reflog::with_reflog(
                &porcelain.repo.git_dir,
                "HEAD",
                ReflogContext {
                    old_oid: ObjectId::zero(),
                    new_oid: commit_id,
                    action: ReflogAction::Clone { from: uri.to_string() },
                },
                || Ok(()),
            )?;
        } else {
            tracing::warn!("cloned an empty repository");
        }

        Ok(porcelain)
    }

    pub fn add_remote(&self, name: &str, uri: &str) -> Result<()> {
        let mut config = self.repo.config();
        config.set_string("remote", Some(name), "url", uri);
        config.save()?;
        Ok(())
    }

    pub fn fetch(&self, remote_name: &str) -> Result<crate::transport::FetchResult> {
        let uri = self
            .repo
            .config()
            .remote_url(remote_name)
            .map(|s| s.to_string())
            .ok_or_else(|| PorcelainError::PreconditionFailed(format!("remote '{remote_name}' not configured")))?;
        let transport = FileTransport::open(&uri, &self.repo.git_dir)?;
        transport.fetch(&[])
    }

    /// `push(monitor, uri|remoteName, localBranch, remoteBranch)`.
    pub fn push(&self, remote_name: &str, local_branch: &str) -> Result<bool> {
        let uri = self
            .repo
            .config()
            .remote_url(remote_name)
            .map(|s| s.to_string())
            .ok_or_else(|| PorcelainError::PreconditionFailed(format!("remote '{remote_name}' not configured")))?;
        let commit_id = self
            .repo
            .refs()
            .resolve(&format!("refs/heads/{local_branch}"))?
            .ok_or_else(|| PorcelainError::RefNotResolvable(local_branch.to_string()))?;

        let transport = FileTransport::open(&uri, &self.repo.git_dir)?;
        let result = transport.push(&[(local_branch.to_string(), commit_id)], false)?;

        if result.succeeded() {
            self.repo
                .refs()
                .update_ref(&format!("refs/remotes/{remote_name}/{local_branch}"), &commit_id)?;
        }
        Ok(result.succeeded())
    }

    /// The commit algorithm (§4.1).
    pub fn commit(&self, author: Option<Signature>, committer: Option<Signature>, message: &str) -> Result<ObjectId> {
        let parent_id = self.repo.head_commit_id()?;
        let lock = self.repo.lock_index()?;
        let index = self.repo.read_index()?;
        let tree_id = index.write_tree(&self.repo.store)?;
        lock.unlock();

        let default_signature = || {
            let config = self.repo.config();
            Signature {
                name: config.user_name().unwrap_or("unknown").to_string(),
                email: config.user_email().unwrap_or("unknown@localhost").to_string(),
                timestamp: chrono::Utc::now().timestamp(),
                tz_offset_minutes: 0,
            }
        };
        let author = author.unwrap_or_else(default_signature);
        let committer = committer.unwrap_or_else(default_signature);

        // First-commit parent list is empty, never a placeholder entry
        // (§9 open question, resolved in SPEC_FULL.md).
        let parents = match parent_id {
            Some(id) => vec![id],
            None => vec![],
        };

        let commit = Commit {
            tree: tree_id,
            parents,
            author,
            committer,
            message: message.to_string(),
        };
        let commit_id = self.repo.store.write_commit(&commit)?;

        let branch_name = self.repo.get_branch()?;
        let subject = message.lines().next().unwrap_or_default().to_string();
        match branch_name {
            Some(name) => {
                let ref_name = format!("refs/heads/{name}");
                self.repo
                    .refs()
                    .update_ref(&ref_name, &commit_id)
                    .map_err(|_| PorcelainError::CommitFailedReflogLocked)?;
                reflog::with_reflog(
                    &self.repo.git_dir,
                    &ref_name,
                    ReflogContext {
                        old_oid: parent_id.unwrap_or_else(ObjectId::zero),
                        new_oid: commit_id,
                        action: ReflogAction::Commit { amend: false, subject },
                    },
                    || Ok(()),
                )?;
            }
            None => {
                self.repo
                    .refs()
                    .update_ref("HEAD", &commit_id)
                    .map_err(|_| PorcelainError::CommitFailedReflogLocked)?;
            }
        }
        Ok(commit_id)
    }

    /// `checkout(branchOrRefspec)`: writes a HEAD ref unless the
    /// argument is literally `"HEAD"` (testable property #7).
    pub fn checkout(&self, target: &str) -> Result<()> {
        if target == "HEAD" {
            return Ok(());
        }

        let refs = self.repo.refs();
        let (new_head, commit_id) = if let Some(id) = refs.resolve(&format!("refs/heads/{target}"))? {
            (Head::Branch(target.to_string()), id)
        } else if let Some(branch) = crate::branch::search_branch(&refs, target)?.into_iter().next() {
            // A bare local name is handled above; anything `search_branch`
            // turns up here came from `origin/name`-style disambiguation,
            // so it lands HEAD detached at the remote-tracking commit.
            (Head::Detached(branch.commit), branch.commit)
        } else if let Ok(id) = target.parse::<ObjectId>() {
            (Head::Detached(id), id)
        } else {
            return Err(PorcelainError::RefNotResolvable(target.to_string()));
        };

        let old_commit = self.repo.head_commit_id()?.unwrap_or_else(ObjectId::zero);
        refs.set_head(&new_head)?;
        restore_work_tree(&self.repo, &commit_id)?;

        reflog::with_reflog(
            &self.repo.git_dir,
            "HEAD",
            ReflogContext {
                old_oid: old_commit,
                new_oid: commit_id,
                action: ReflogAction::Switch {
                    from: old_commit.to_hex(),
                    to: target.to_string(),
                },
            },
            || Ok(()),
        )
    }

    pub fn status(&self, list_unchanged: bool, lenient: bool) -> Result<Vec<StatusEntry>> {
        status::status(&self.repo, list_unchanged, lenient)
    }

    pub fn add(&self, path: Option<&Path>, also_remove: bool) -> Result<()> {
        stage::add(&self.repo, path, also_remove)
    }

    pub fn ls_files(&self) -> Result<Vec<LsFileEntry>> {
        lsfiles::ls_files(&self.repo)
    }

    pub fn rev_list(&self, from_rev: Option<&str>, to_rev: Option<&str>, max_lines: i64) -> Result<Vec<ObjectId>> {
        history::rev_list(&self.repo, from_rev, to_rev, max_lines)
    }

    pub fn whatchanged(
        &self,
        from_rev: Option<&str>,
        to_rev: Option<&str>,
        max_lines: i64,
    ) -> Result<Vec<ChangeEntry>> {
        history::whatchanged(&self.repo, from_rev, to_rev, max_lines)
    }

    pub fn get_branch(&self) -> Result<Option<String>> {
        self.repo.get_branch()
    }
}

fn detect_head_branch(fetch_result: &crate::transport::FetchResult, requested: Option<&str>) -> Option<String> {
    if let Some(branch) = requested {
        return Some(branch.to_string());
    }
    let mut heads = fetch_result.advertised_refs.clone();
    heads.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(Head::Detached(advertised_id)) = &fetch_result.advertised_head {
        if let Some((name, _)) = heads.iter().find(|(_, id)| id == advertised_id) {
            return Some(name.clone());
        }
    }
    if let Some(Head::Branch(name)) = &fetch_result.advertised_head {
        return Some(name.clone());
    }
    heads.first().map(|(name, _)| name.clone())
}

/// Writes the working tree to match `commit_id`'s tree and rebuilds the
/// staged index to match it (used by checkout and clone).
fn restore_work_tree(repo: &Repository, commit_id: &ObjectId) -> Result<()> {
    let commit = repo.store.read_commit(commit_id)?;
    let entries = treewalk::flatten_tree(&repo.store, &commit.tree)?;

    let lock = repo.lock_index()?;
    let mut cache = DirCache::default();
    for (path, (mode, id)) in &entries {
        let abs = repo.work_dir.join(path);
        if let Some(parent) = abs.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = repo.store.read_blob(id)?;
        std::fs::write(&abs, &data)?;
        let metadata = std::fs::metadata(&abs)?;
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        cache.insert(crate::index::DirCacheEntry {
            path: path.clone(),
            mode: *mode,
            length: metadata.len(),
            mtime_ms,
            object_id: *id,
            assume_valid: false,
        });
    }
    lock.commit(&cache)?;
    Ok(())
}
