//! PathMatcher: layered `.gitignore` precedence, full gitignore(5)
//! glob semantics via the `ignore` crate (see SPEC_FULL.md §9).

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

pub struct PathMatcher {
    work_dir: std::path::PathBuf,
    root: Gitignore,
}

impl PathMatcher {
    /// Build the matcher by walking `.gitignore` files from the work
    /// root down; `ignore`'s builder already applies the later-file,
    /// later-line-wins precedence and `!` negation described in §4.4.
    pub fn load(work_dir: &Path) -> Self {
        let mut builder = GitignoreBuilder::new(work_dir);
        for entry in walkdir::WalkDir::new(work_dir)
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
            .filter_map(|e| e.ok())
        {
            if entry.file_name() == ".gitignore" {
                let _ = builder.add(entry.path());
            }
        }
        // info/exclude and core.excludesfile are stubs (§4.4); no source
        // files for them are added here.
        let root = builder.build().unwrap_or_else(|_| Gitignore::empty());
        PathMatcher {
            work_dir: work_dir.to_path_buf(),
            root,
        }
    }

    pub fn is_ignored(&self, abs_path: &Path) -> bool {
        let is_dir = abs_path.is_dir();
        self.root.matched_path_or_any_parents(abs_path, is_dir).is_ignore()
    }

    pub fn is_ignored_rel(&self, rel_path: &str) -> bool {
        self.is_ignored(&self.work_dir.join(rel_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn wildcard_extension_and_nested_gitignore() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(".gitignore"), "a\nc/c*.txt\n").unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b/.gitignore"), "b2.txt\n").unwrap();
        fs::create_dir_all(root.join("c")).unwrap();

        let matcher = PathMatcher::load(root);
        assert!(matcher.is_ignored_rel("a/a1.txt"));
        assert!(matcher.is_ignored_rel("c/c1.txt"));
        assert!(!matcher.is_ignored_rel("c/c"));
    }
}
