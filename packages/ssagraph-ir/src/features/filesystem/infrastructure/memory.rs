//! In-memory file system for fixtures and tests

use crate::errors::Result;
use crate::features::filesystem::ports::{not_found, DirEntry, FileStat, FileSystem};
use std::collections::{BTreeMap, BTreeSet};

/// Files keyed by normalized path; directories are implied by file paths
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<String, String>,
}

fn normalize(path: &str) -> String {
    path.trim_start_matches("./").trim_end_matches('/').to_string()
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<str>, content: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), content.into());
    }

    pub fn with_file(mut self, path: impl AsRef<str>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn dir_prefix(path: &str) -> String {
        let path = normalize(path);
        if path.is_empty() {
            path
        } else {
            format!("{}/", path)
        }
    }

    fn is_dir(&self, path: &str) -> bool {
        let prefix = Self::dir_prefix(path);
        self.files.keys().any(|k| k.starts_with(&prefix))
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &str) -> Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let prefix = Self::dir_prefix(path);
        if !prefix.is_empty() && !self.is_dir(path) {
            return Err(not_found(path));
        }
        let mut dirs = BTreeSet::new();
        let mut entries = Vec::new();
        for key in self.files.keys().filter(|k| k.starts_with(&prefix)) {
            let rest = &key[prefix.len()..];
            match rest.split_once('/') {
                Some((dir, _)) => {
                    dirs.insert(dir.to_string());
                }
                None => entries.push(DirEntry {
                    name: rest.to_string(),
                    path: key.clone(),
                    is_dir: false,
                }),
            }
        }
        entries.extend(dirs.into_iter().map(|name| DirEntry {
            path: format!("{}{}", prefix, name),
            name,
            is_dir: true,
        }));
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn stat(&self, path: &str) -> Result<FileStat> {
        if let Some(content) = self.files.get(&normalize(path)) {
            return Ok(FileStat {
                size: content.len() as u64,
                is_dir: false,
            });
        }
        if self.is_dir(path) {
            return Ok(FileStat {
                size: 0,
                is_dir: true,
            });
        }
        Err(not_found(path))
    }
}
