//! End-to-end scenarios and testable properties from the specification.

use std::fs;
use std::path::Path;

use porcelain_core::status::{IndexStatus, RepoStatus};
use porcelain_core::Porcelain;

fn init_repo(dir: &Path) -> Porcelain {
    Porcelain::init(dir).unwrap()
}

fn write_file(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// S1 — untracked file.
#[test]
fn s1_untracked_file() {
    let dir = tempfile::tempdir().unwrap();
    let porcelain = init_repo(dir.path());
    write_file(dir.path(), "myNewFile.txt", "This File will be added, sic!");

    let entries = porcelain.status(false, false).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "myNewFile.txt");
    assert_eq!(entries[0].index_status, IndexStatus::Untracked);
    assert_eq!(entries[0].repo_status, RepoStatus::Untracked);
}

/// S2 — staged but uncommitted.
#[test]
fn s2_staged_but_uncommitted() {
    let dir = tempfile::tempdir().unwrap();
    let porcelain = init_repo(dir.path());
    write_file(dir.path(), "myNewFile.txt", "This File will be added, sic!");

    porcelain.add(Some(Path::new("myNewFile.txt")), false).unwrap();
    let entries = porcelain.status(false, false).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].index_status, IndexStatus::Added);
    assert_eq!(entries[0].repo_status, RepoStatus::Untracked);
}

/// S3 — add + commit + push against a file-URI clone source.
#[test]
fn s3_add_commit_push() {
    let origin_dir = tempfile::tempdir().unwrap();
    let origin = init_repo(origin_dir.path());
    write_file(origin_dir.path(), "seed.txt", "seed");
    origin.add(None, false).unwrap();
    origin.commit(None, None, "seed commit").unwrap();

    let clone_dir = tempfile::tempdir().unwrap();
    let origin_uri = format!("file://{}", origin_dir.path().display());
    let cloned = Porcelain::clone(clone_dir.path(), "origin", &origin_uri, None).unwrap();

    write_file(clone_dir.path(), "myNewFile.txt", "This File will be added, sic!");
    cloned.add(Some(Path::new("myNewFile.txt")), false).unwrap();
    let commit_id = cloned.commit(None, None, "test commit").unwrap();

    let branch = cloned.get_branch().unwrap().unwrap();
    let pushed = cloned.push("origin", &branch).unwrap();
    assert!(pushed);

    let head_commit = cloned.repo.store.read_commit(&commit_id).unwrap();
    assert_eq!(head_commit.message, "test commit");

    let origin_head_id = origin.repo.head_commit_id().unwrap().unwrap();
    let origin_head = origin.repo.store.read_commit(&origin_head_id).unwrap();
    assert_eq!(origin_head.message, "test commit");
}

/// S4 — ls-files after clone.
#[test]
fn s4_ls_files_after_clone() {
    let origin_dir = tempfile::tempdir().unwrap();
    let origin = init_repo(origin_dir.path());
    for i in 0..8 {
        write_file(origin_dir.path(), &format!("file{i}.txt"), "content");
    }
    origin.add(None, false).unwrap();
    origin.commit(None, None, "eight files").unwrap();

    let clone_dir = tempfile::tempdir().unwrap();
    let origin_uri = format!("file://{}", origin_dir.path().display());
    let cloned = Porcelain::clone(clone_dir.path(), "origin", &origin_uri, None).unwrap();

    assert_eq!(cloned.ls_files().unwrap().len(), 8);

    write_file(clone_dir.path(), "file9.txt", "new");
    assert_eq!(cloned.ls_files().unwrap().len(), 9);
}

/// checkout resolves an `origin/name`-style remote-tracking refspec by
/// detaching HEAD at the advertised commit.
#[test]
fn checkout_remote_tracking_refspec() {
    let origin_dir = tempfile::tempdir().unwrap();
    let origin = init_repo(origin_dir.path());
    write_file(origin_dir.path(), "seed.txt", "seed");
    origin.add(None, false).unwrap();
    let origin_commit = origin.commit(None, None, "seed commit").unwrap();

    let clone_dir = tempfile::tempdir().unwrap();
    let origin_uri = format!("file://{}", origin_dir.path().display());
    let cloned = Porcelain::clone(clone_dir.path(), "origin", &origin_uri, None).unwrap();

    cloned.checkout("origin/master").unwrap();
    assert_eq!(cloned.repo.head_commit_id().unwrap(), Some(origin_commit));
}

/// S5 — revList bounds.
#[test]
fn s5_rev_list_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let porcelain = init_repo(dir.path());

    let mut ids = Vec::new();
    for i in 0..21 {
        write_file(dir.path(), "f.txt", &format!("v{i}"));
        porcelain.add(None, false).unwrap();
        ids.push(porcelain.commit(None, None, &format!("commit {i}")).unwrap());
    }

    let all = porcelain.rev_list(None, None, -1).unwrap();
    assert_eq!(all.len(), 21);

    let from_second = porcelain.rev_list(Some(&ids[1].to_hex()), None, -1).unwrap();
    assert_eq!(from_second.len(), 19);

    let bounded = porcelain
        .rev_list(Some(&ids[3].to_hex()), Some(&ids[19].to_hex()), -1)
        .unwrap();
    assert_eq!(bounded.len(), 16);
}

/// S6 — .gitignore root + wildcard.
#[test]
fn s6_gitignore_precedence_and_wildcard() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), ".gitignore", "a\nc/c*.txt\n");
    write_file(dir.path(), "b/.gitignore", "b2.txt\n");
    fs::create_dir_all(dir.path().join("c")).unwrap();

    let matcher = porcelain_core::pathmatch::PathMatcher::load(dir.path());
    assert!(matcher.is_ignored_rel("a/a1.txt"));
    assert!(!matcher.is_ignored_rel("b/b1.txt"));
    assert!(matcher.is_ignored_rel("b/b2.txt"));
    assert!(!matcher.is_ignored_rel("b/b2Xtxt"));
    assert!(matcher.is_ignored_rel("c/c1.txt"));
    assert!(!matcher.is_ignored_rel("c/c"));
}

/// Property 1: round-trip of add+commit.
#[test]
fn property_round_trip_add_commit() {
    let dir = tempfile::tempdir().unwrap();
    let porcelain = init_repo(dir.path());
    write_file(dir.path(), "stable.txt", "unchanging content");
    porcelain.add(Some(Path::new("stable.txt")), false).unwrap();
    porcelain.commit(None, None, "add stable file").unwrap();

    let entries = porcelain.status(false, false).unwrap();
    assert!(entries.iter().all(|e| e.path != "stable.txt"));
}

/// Property 2: idempotent add produces a byte-identical index.
#[test]
fn property_idempotent_add() {
    let dir = tempfile::tempdir().unwrap();
    let porcelain = init_repo(dir.path());
    write_file(dir.path(), "f.txt", "hello");

    porcelain.add(Some(Path::new("f.txt")), false).unwrap();
    let first = fs::read(dir.path().join(".git/index")).unwrap();
    porcelain.add(Some(Path::new("f.txt")), false).unwrap();
    let second = fs::read(dir.path().join(".git/index")).unwrap();
    assert_eq!(first, second);
}

/// Property 7: checkout writes a HEAD ref unless the argument is "HEAD".
#[test]
fn property_checkout_head_literal_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let porcelain = init_repo(dir.path());
    write_file(dir.path(), "f.txt", "hello");
    porcelain.add(None, false).unwrap();
    porcelain.commit(None, None, "initial").unwrap();

    let before = fs::read(dir.path().join(".git/HEAD")).unwrap();
    porcelain.checkout("HEAD").unwrap();
    let after = fs::read(dir.path().join(".git/HEAD")).unwrap();
    assert_eq!(before, after);
}

/// Property 4: canonical ordering of status() output.
#[test]
fn property_canonical_ordering() {
    let dir = tempfile::tempdir().unwrap();
    let porcelain = init_repo(dir.path());
    write_file(dir.path(), "b.txt", "b");
    write_file(dir.path(), "a/z.txt", "z");
    write_file(dir.path(), "a.txt", "a");

    let entries = porcelain.status(false, false).unwrap();
    let mut paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    let mut sorted = paths.clone();
    sorted.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
    assert_eq!(paths, sorted);
    paths.clear();
}
