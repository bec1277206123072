//! File system port

use crate::errors::{Result, SsaGraphError};

/// One directory listing entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub is_dir: bool,
}

/// Read-only file access used by the project pipeline
///
/// Paths are `/`-separated strings.
pub trait FileSystem: Send + Sync {
    fn read_file(&self, path: &str) -> Result<String>;

    /// Entries of `path`, sorted by name
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>>;

    fn stat(&self, path: &str) -> Result<FileStat>;

    fn join(&self, parts: &[&str]) -> String {
        let mut out = String::new();
        for part in parts.iter().filter(|p| !p.is_empty()) {
            if out.is_empty() || out.ends_with('/') {
                out.push_str(part);
            } else {
                out.push('/');
                out.push_str(part.trim_start_matches('/'));
            }
        }
        out
    }

    /// `(directory, file name)`
    fn split(&self, path: &str) -> (String, String) {
        match path.rfind('/') {
            Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
            None => (String::new(), path.to_string()),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.stat(path).is_ok()
    }

    /// Every file under `root`, sorted, skipping hidden and vendor directories
    fn walk(&self, root: &str) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_string()];
        while let Some(dir) = pending.pop() {
            for entry in self.read_dir(&dir)? {
                if entry.is_dir {
                    if !is_skipped_dir(&entry.name) {
                        pending.push(entry.path);
                    }
                } else {
                    files.push(entry.path);
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Directories never descended into
pub fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || matches!(name, "node_modules" | "target" | "build" | "dist" | "out")
}

pub(crate) fn not_found(path: &str) -> SsaGraphError {
    SsaGraphError::file_system(format!("no such file or directory: {}", path))
}
