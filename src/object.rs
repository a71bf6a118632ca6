//! Content-addressed object store: loose blob/tree/commit objects, zlib
//! framed exactly like a real `.git/objects` directory.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{PorcelainError, Result};
use crate::hash::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Regular,
    Executable,
    Symlink,
    Gitlink,
    Tree,
    Missing,
}

impl FileMode {
    pub fn raw(self) -> u32 {
        match self {
            FileMode::Regular => 0o100644,
            FileMode::Executable => 0o100755,
            FileMode::Symlink => 0o120000,
            FileMode::Gitlink => 0o160000,
            FileMode::Tree => 0o040000,
            FileMode::Missing => 0,
        }
    }

    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => FileMode::Missing,
            0o040000 => FileMode::Tree,
            0o120000 => FileMode::Symlink,
            0o160000 => FileMode::Gitlink,
            0o100755 => FileMode::Executable,
            _ => FileMode::Regular,
        }
    }

    pub fn is_tree(self) -> bool {
        matches!(self, FileMode::Tree)
    }
}

#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub name: String,
    pub mode: FileMode,
    pub id: ObjectId,
}

#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Canonical index order: byte-lexicographic, `/` sorts before any
    /// other byte at the same position. Tree entries sort as if
    /// directories carried a trailing `/`.
    pub fn sort_key(name: &str, mode: FileMode) -> Vec<u8> {
        let mut key = name.as_bytes().to_vec();
        if mode.is_tree() {
            key.push(b'/');
        }
        key
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| Tree::sort_key(&a.name, a.mode).cmp(&Tree::sort_key(&b.name, b.mode)));
        let mut buf = Vec::new();
        for entry in &entries {
            buf.extend_from_slice(format!("{:o} {}", entry.mode.raw(), entry.name).as_bytes());
            buf.push(0);
            buf.extend_from_slice(entry.id.as_bytes());
        }
        buf
    }

    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut entries = Vec::new();
        let mut cursor = 0usize;
        while cursor < data.len() {
            let space = data[cursor..]
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| PorcelainError::CorruptObject(ObjectId::zero()))?;
            let mode_str = std::str::from_utf8(&data[cursor..cursor + space]).unwrap_or_default();
            let raw_mode = u32::from_str_radix(mode_str, 8).unwrap_or(0);
            cursor += space + 1;
            let nul = data[cursor..]
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| PorcelainError::CorruptObject(ObjectId::zero()))?;
            let name = String::from_utf8_lossy(&data[cursor..cursor + nul]).to_string();
            cursor += nul + 1;
            let mut id_bytes = [0u8; 20];
            id_bytes.copy_from_slice(&data[cursor..cursor + 20]);
            cursor += 20;
            entries.push(TreeEntry {
                name,
                mode: FileMode::from_raw(raw_mode),
                id: ObjectId::from_bytes(id_bytes),
            });
        }
        Ok(Tree { entries })
    }
}

#[derive(Debug, Clone)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub timestamp: i64,
    pub tz_offset_minutes: i32,
}

impl Signature {
    pub fn format(&self) -> String {
        let sign = if self.tz_offset_minutes < 0 { '-' } else { '+' };
        let abs = self.tz_offset_minutes.unsigned_abs();
        format!(
            "{} <{}> {} {}{:02}{:02}",
            self.name,
            self.email,
            self.timestamp,
            sign,
            abs / 60,
            abs % 60
        )
    }
}

#[derive(Debug, Clone)]
pub struct Commit {
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(&format!("tree {}\n", self.tree));
        for parent in &self.parents {
            out.push_str(&format!("parent {}\n", parent));
        }
        out.push_str(&format!("author {}\n", self.author.format()));
        out.push_str(&format!("committer {}\n", self.committer.format()));
        out.push('\n');
        out.push_str(&self.message);
        out.into_bytes()
    }
}

pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(git_dir: &Path) -> Self {
        ObjectStore {
            root: git_dir.join("objects"),
        }
    }

    fn path_for(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[0..2]).join(&hex[2..])
    }

    pub fn exists(&self, id: &ObjectId) -> bool {
        self.path_for(id).exists()
    }

    pub fn write_raw(&self, kind: &str, data: &[u8]) -> Result<ObjectId> {
        let id = ObjectId::of_payload(kind, data);
        let path = self.path_for(&id);
        if path.exists() {
            return Ok(id);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let header = format!("{kind} {}\0", data.len());
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(header.as_bytes())?;
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, compressed)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(object = %id, kind, "wrote loose object");
        Ok(id)
    }

    pub fn read_raw(&self, id: &ObjectId) -> Result<(String, Vec<u8>)> {
        let path = self.path_for(id);
        let compressed = fs::read(&path).map_err(|_| PorcelainError::CorruptObject(*id))?;
        let mut decoder = ZlibDecoder::new(&compressed[..]);
        let mut raw = Vec::new();
        decoder
            .read_to_end(&mut raw)
            .map_err(|_| PorcelainError::CorruptObject(*id))?;
        let nul = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or(PorcelainError::CorruptObject(*id))?;
        let header = std::str::from_utf8(&raw[..nul]).map_err(|_| PorcelainError::CorruptObject(*id))?;
        let kind = header.split(' ').next().unwrap_or_default().to_string();
        Ok((kind, raw[nul + 1..].to_vec()))
    }

    pub fn write_blob(&self, data: &[u8]) -> Result<ObjectId> {
        self.write_raw("blob", data)
    }

    pub fn write_blob_from_file(&self, path: &Path) -> Result<ObjectId> {
        let data = fs::read(path)?;
        self.write_blob(&data)
    }

    pub fn write_tree(&self, tree: &Tree) -> Result<ObjectId> {
        self.write_raw("tree", &tree.serialize())
    }

    pub fn write_commit(&self, commit: &Commit) -> Result<ObjectId> {
        self.write_raw("commit", &commit.serialize())
    }

    pub fn read_blob(&self, id: &ObjectId) -> Result<Vec<u8>> {
        let (kind, data) = self.read_raw(id)?;
        if kind != "blob" {
            return Err(PorcelainError::CorruptObject(*id));
        }
        Ok(data)
    }

    pub fn read_tree(&self, id: &ObjectId) -> Result<Tree> {
        let (kind, data) = self.read_raw(id)?;
        if kind != "tree" {
            return Err(PorcelainError::CorruptObject(*id));
        }
        Tree::deserialize(&data)
    }

    pub fn read_commit(&self, id: &ObjectId) -> Result<Commit> {
        let (kind, data) = self.read_raw(id)?;
        if kind != "commit" {
            return Err(PorcelainError::CorruptObject(*id));
        }
        parse_commit(&data, *id)
    }
}

fn parse_commit(data: &[u8], id: ObjectId) -> Result<Commit> {
    let text = std::str::from_utf8(data).map_err(|_| PorcelainError::CorruptObject(id))?;
    let mut lines = text.lines();
    let mut tree = None;
    let mut parents = Vec::new();
    let mut author = None;
    let mut committer = None;
    for line in &mut lines {
        if line.is_empty() {
            break;
        }
        if let Some(rest) = line.strip_prefix("tree ") {
            tree = rest.parse().ok();
        } else if let Some(rest) = line.strip_prefix("parent ") {
            if let Ok(parsed) = rest.parse() {
                parents.push(parsed);
            }
        } else if let Some(rest) = line.strip_prefix("author ") {
            author = parse_signature(rest);
        } else if let Some(rest) = line.strip_prefix("committer ") {
            committer = parse_signature(rest);
        }
    }
    let message = lines.collect::<Vec<_>>().join("\n");
    Ok(Commit {
        tree: tree.ok_or(PorcelainError::CorruptObject(id))?,
        parents,
        author: author.ok_or(PorcelainError::CorruptObject(id))?,
        committer: committer.ok_or(PorcelainError::CorruptObject(id))?,
        message,
    })
}

fn parse_signature(s: &str) -> Option<Signature> {
    let lt = s.find('<')?;
    let gt = s.find('>')?;
    let name = s[..lt].trim().to_string();
    let email = s[lt + 1..gt].trim().to_string();
    let rest = s[gt + 1..].trim();
    let mut parts = rest.split_whitespace();
    let timestamp = parts.next()?.parse().ok()?;
    let tz = parts.next().unwrap_or("+0000");
    let sign = if tz.starts_with('-') { -1 } else { 1 };
    let digits = &tz[1..];
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let mins: i32 = digits.get(2..4)?.parse().ok()?;
    Some(Signature {
        name,
        email,
        timestamp,
        tz_offset_minutes: sign * (hours * 60 + mins),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_round_trips() {
        let tree = Tree {
            entries: vec![
                TreeEntry {
                    name: "b.txt".into(),
                    mode: FileMode::Regular,
                    id: ObjectId::of_payload("blob", b"b"),
                },
                TreeEntry {
                    name: "a".into(),
                    mode: FileMode::Tree,
                    id: ObjectId::of_payload("tree", b""),
                },
            ],
        };
        let bytes = tree.serialize();
        let parsed = Tree::deserialize(&bytes).unwrap();
        assert_eq!(parsed.entries.len(), 2);
    }

    #[test]
    fn commit_round_trips() {
        let sig = Signature {
            name: "A".into(),
            email: "a@example.com".into(),
            timestamp: 1_700_000_000,
            tz_offset_minutes: -300,
        };
        let commit = Commit {
            tree: ObjectId::of_payload("tree", b""),
            parents: vec![],
            author: sig.clone(),
            committer: sig,
            message: "test commit\n".into(),
        };
        let bytes = commit.serialize();
        let parsed = parse_commit(&bytes, ObjectId::zero()).unwrap();
        assert_eq!(parsed.message, "test commit\n");
        assert!(parsed.parents.is_empty());
    }
}
