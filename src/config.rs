//! `<gitDir>/config`: flat `[section]` / `[section "subsection"]`
//! headers, `key = value` lines. Narrow enough (§6.4 enumerates the
//! whole key set this crate cares about) that hand-writing it beats
//! bending a generic INI crate to git's subsection quoting — see
//! DESIGN.md.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SectionKey {
    section: String,
    subsection: Option<String>,
}

#[derive(Debug, Default)]
pub struct Config {
    path: PathBuf,
    values: BTreeMap<SectionKey, BTreeMap<String, String>>,
}

impl Config {
    pub fn load(git_dir: &Path) -> Self {
        let path = git_dir.join("config");
        let mut config = Config {
            path: path.clone(),
            values: BTreeMap::new(),
        };
        if let Ok(text) = fs::read_to_string(&path) {
            config.parse(&text);
        }
        config
    }

    fn parse(&mut self, text: &str) {
        let mut current = SectionKey {
            section: String::new(),
            subsection: None,
        };
        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                let inner = &line[1..line.len() - 1];
                if let Some(space) = inner.find(' ') {
                    let section = inner[..space].trim().to_string();
                    let sub = inner[space + 1..].trim().trim_matches('"').to_string();
                    current = SectionKey {
                        section,
                        subsection: Some(sub),
                    };
                } else {
                    current = SectionKey {
                        section: inner.trim().to_string(),
                        subsection: None,
                    };
                }
                self.values.entry(current.clone()).or_default();
            } else if let Some(eq) = line.find('=') {
                let key = line[..eq].trim().to_string();
                let value = line[eq + 1..].trim().to_string();
                self.values.entry(current.clone()).or_default().insert(key, value);
            }
        }
    }

    pub fn get(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<&str> {
        let sk = SectionKey {
            section: section.to_string(),
            subsection: subsection.map(|s| s.to_string()),
        };
        self.values.get(&sk).and_then(|m| m.get(key)).map(|s| s.as_str())
    }

    pub fn set_string(&mut self, section: &str, subsection: Option<&str>, key: &str, value: &str) {
        let sk = SectionKey {
            section: section.to_string(),
            subsection: subsection.map(|s| s.to_string()),
        };
        self.values
            .entry(sk)
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn set_boolean(&mut self, section: &str, subsection: Option<&str>, key: &str, value: bool) {
        self.set_string(section, subsection, key, if value { "true" } else { "false" });
    }

    pub fn save(&self) -> std::io::Result<()> {
        let mut out = String::new();
        for (sk, entries) in &self.values {
            if entries.is_empty() {
                continue;
            }
            match &sk.subsection {
                Some(sub) => out.push_str(&format!("[{} \"{}\"]\n", sk.section, sub)),
                None => out.push_str(&format!("[{}]\n", sk.section)),
            }
            for (k, v) in entries {
                out.push_str(&format!("\t{k} = {v}\n"));
            }
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, out)
    }

    pub fn remote_url(&self, remote: &str) -> Option<&str> {
        self.get("remote", Some(remote), "url")
    }

    pub fn branch_remote(&self, branch: &str) -> Option<&str> {
        self.get("branch", Some(branch), "remote")
    }

    pub fn branch_merge(&self, branch: &str) -> Option<&str> {
        self.get("branch", Some(branch), "merge")
    }

    pub fn user_name(&self) -> Option<&str> {
        self.get("user", None, "name")
    }

    pub fn user_email(&self) -> Option<&str> {
        self.get("user", None, "email")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_subsection_keys() {
        let dir = tempdir().unwrap();
        let mut config = Config::load(dir.path());
        config.set_boolean("core", None, "bare", false);
        config.set_string("remote", Some("origin"), "url", "file:///tmp/repo");
        config.set_string("branch", Some("master"), "merge", "refs/heads/master");
        config.save().unwrap();

        let reloaded = Config::load(dir.path());
        assert_eq!(reloaded.get("core", None, "bare"), Some("false"));
        assert_eq!(reloaded.remote_url("origin"), Some("file:///tmp/repo"));
        assert_eq!(reloaded.branch_merge("master"), Some("refs/heads/master"));
    }
}
