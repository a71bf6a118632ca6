//! HistoryQuery — range-constrained commit enumeration (§4.6).

use std::collections::{HashSet, VecDeque};

use crate::error::{PorcelainError, Result};
use crate::hash::ObjectId;
use crate::object::Signature;
use crate::repository::Repository;
use crate::treewalk;

#[derive(Debug, Clone)]
pub struct ChangeEntry {
    pub commit_hash: ObjectId,
    pub tree_hash: ObjectId,
    pub author: Signature,
    pub committer: Signature,
    pub subject: String,
    pub body: String,
    pub files: Option<Vec<FileChange>>,
}

#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: String,
    pub change: ChangeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// BFS over parent edges from `start`, stopping at any id in `uninteresting`.
fn reachable(
    repo: &Repository,
    start: ObjectId,
    uninteresting: &HashSet<ObjectId>,
) -> Result<Vec<ObjectId>> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    let mut order = Vec::new();
    queue.push_back(start);
    seen.insert(start);
    while let Some(id) = queue.pop_front() {
        if uninteresting.contains(&id) {
            continue;
        }
        order.push(id);
        let commit = repo.store.read_commit(&id)?;
        for parent in commit.parents {
            if seen.insert(parent) {
                queue.push_back(parent);
            }
        }
    }
    Ok(order)
}

/// `revList(fromRev, toRev, maxLines)`. Sort order defaults to
/// commit-time descending, approximating the spec's default
/// {TOPO, COMMIT_TIME_DESC} for a BFS-reachable set.
pub fn rev_list(
    repo: &Repository,
    from_rev: Option<&str>,
    to_rev: Option<&str>,
    max_lines: i64,
) -> Result<Vec<ObjectId>> {
    let start = match to_rev {
        Some(rev) => resolve_rev(repo, rev)?,
        None => repo
            .head_commit_id()?
            .ok_or_else(|| PorcelainError::RefNotResolvable("HEAD".into()))?,
    };

    let mut uninteresting = HashSet::new();
    if let Some(rev) = from_rev {
        let boundary = resolve_rev(repo, rev)?;
        uninteresting.insert(boundary);
        // Everything reachable from the boundary is also uninteresting —
        // the boundary commit itself is excluded per "exclusive lower bound".
        for id in reachable(repo, boundary, &HashSet::new())? {
            uninteresting.insert(id);
        }
    }

    let mut commits = reachable(repo, start, &uninteresting)?;
    let mut with_time = Vec::with_capacity(commits.len());
    for id in commits.drain(..) {
        let commit = repo.store.read_commit(&id)?;
        with_time.push((commit.committer.timestamp, id));
    }
    with_time.sort_by(|a, b| b.0.cmp(&a.0));
    let mut ids: Vec<ObjectId> = with_time.into_iter().map(|(_, id)| id).collect();

    if max_lines >= 0 {
        ids.truncate(max_lines as usize);
    }
    Ok(ids)
}

fn resolve_rev(repo: &Repository, rev: &str) -> Result<ObjectId> {
    if let Ok(id) = rev.parse::<ObjectId>() {
        return Ok(id);
    }
    repo.refs()
        .resolve(&format!("refs/heads/{rev}"))?
        .ok_or_else(|| PorcelainError::RefNotResolvable(rev.to_string()))
}

/// `whatchanged`: like `revList` but each commit is projected into a
/// `ChangeEntry` including its diff against the first parent.
pub fn whatchanged(
    repo: &Repository,
    from_rev: Option<&str>,
    to_rev: Option<&str>,
    max_lines: i64,
) -> Result<Vec<ChangeEntry>> {
    let ids = rev_list(repo, from_rev, to_rev, max_lines)?;
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let commit = repo.store.read_commit(&id)?;
        let mut lines = commit.message.splitn(2, "\n\n");
        let subject = lines.next().unwrap_or_default().to_string();
        let body = lines.next().unwrap_or_default().to_string();

        let files = if let Some(&parent) = commit.parents.first() {
            let parent_commit = repo.store.read_commit(&parent)?;
            Some(diff_trees(repo, &parent_commit.tree, &commit.tree)?)
        } else {
            Some(diff_trees_against_empty(repo, &commit.tree)?)
        };

        out.push(ChangeEntry {
            commit_hash: id,
            tree_hash: commit.tree,
            author: commit.author,
            committer: commit.committer,
            subject,
            body,
            files,
        });
    }
    Ok(out)
}

fn diff_trees(repo: &Repository, before: &ObjectId, after: &ObjectId) -> Result<Vec<FileChange>> {
    let before_map = treewalk::flatten_tree(&repo.store, before)?;
    let after_map = treewalk::flatten_tree(&repo.store, after)?;
    let mut out = Vec::new();
    for (path, (_, id)) in &after_map {
        match before_map.get(path) {
            None => out.push(FileChange {
                path: path.clone(),
                change: ChangeKind::Added,
            }),
            Some((_, before_id)) if before_id != id => out.push(FileChange {
                path: path.clone(),
                change: ChangeKind::Modified,
            }),
            _ => {}
        }
    }
    for path in before_map.keys() {
        if !after_map.contains_key(path) {
            out.push(FileChange {
                path: path.clone(),
                change: ChangeKind::Deleted,
            });
        }
    }
    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

fn diff_trees_against_empty(repo: &Repository, after: &ObjectId) -> Result<Vec<FileChange>> {
    let after_map = treewalk::flatten_tree(&repo.store, after)?;
    let mut out: Vec<FileChange> = after_map
        .keys()
        .map(|path| FileChange {
            path: path.clone(),
            change: ChangeKind::Added,
        })
        .collect();
    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}
