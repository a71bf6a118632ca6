//! LsFilesMerge — merge-join the staged index with a filesystem scan.

use crate::error::Result;
use crate::hash::ObjectId;
use crate::pathmatch::PathMatcher;
use crate::repository::Repository;
use crate::treewalk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsFileStatus {
    Cached,
    Unmerged,
    Removed,
    Changed,
    Killed,
    Other,
}

#[derive(Debug, Clone)]
pub struct LsFileEntry {
    pub path: String,
    pub status: LsFileStatus,
    pub object_id: Option<ObjectId>,
}

pub fn ls_files(repo: &Repository) -> Result<Vec<LsFileEntry>> {
    let index = repo.read_index()?;
    let matcher = PathMatcher::load(&repo.work_dir);
    let wd_map = treewalk::scan_work_tree(&repo.work_dir)?;

    let mut paths: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
    paths.extend(index.entries().iter().map(|e| e.path.clone()));
    paths.extend(
        wd_map
            .keys()
            .filter(|p| !matcher.is_ignored_rel(p))
            .cloned(),
    );

    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let in_index = index.get(&path);
        let on_disk = wd_map.contains_key(&path);
        let entry = match (in_index, on_disk) {
            (Some(idx), true) => LsFileEntry {
                path,
                status: LsFileStatus::Cached,
                object_id: Some(idx.object_id),
            },
            (Some(_), false) => LsFileEntry {
                path,
                status: LsFileStatus::Removed,
                object_id: None,
            },
            (None, true) => LsFileEntry {
                path,
                status: LsFileStatus::Other,
                object_id: None,
            },
            (None, false) => continue, // impossible: path came from one of the two sources
        };
        out.push(entry);
    }
    Ok(out)
}
