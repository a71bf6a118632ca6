//! Branch lookup, including `origin/name`-style remote-tracking
//! disambiguation, in the teacher's `search_branch` idiom.

use crate::error::Result;
use crate::hash::ObjectId;
use crate::refs::RefDb;

#[derive(Debug, Clone)]
pub struct Branch {
    pub name: String,
    pub commit: ObjectId,
    pub remote: Option<String>,
}

/// Resolve `name` against local branches first, then
/// `refs/remotes/<remote>/<rest>` by splitting on the first `/`.
pub fn search_branch(refs: &RefDb, name: &str) -> Result<Vec<Branch>> {
    let mut out = Vec::new();
    for (branch_name, commit) in refs.list_branches()? {
        if branch_name == name {
            out.push(Branch {
                name: branch_name,
                commit,
                remote: None,
            });
        }
    }
    if let Some((remote, rest)) = name.split_once('/') {
        for (branch_name, commit) in refs.list_remote_branches(remote)? {
            if branch_name == rest {
                out.push(Branch {
                    name: rest.to_string(),
                    commit,
                    remote: Some(remote.to_string()),
                });
            }
        }
    }
    Ok(out)
}

pub fn find_local_branch(refs: &RefDb, name: &str) -> Result<Option<Branch>> {
    Ok(refs
        .list_branches()?
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(name, commit)| Branch {
            name,
            commit,
            remote: None,
        }))
}
