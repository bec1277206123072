//! Disk-backed file system

use crate::errors::{Result, SsaGraphError};
use crate::features::filesystem::ports::{is_skipped_dir, DirEntry, FileStat, FileSystem};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

impl FileSystem for LocalFileSystem {
    fn read_file(&self, path: &str) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: path_string(&entry.path()),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        entries.sort();
        Ok(entries)
    }

    fn stat(&self, path: &str) -> Result<FileStat> {
        let meta = fs::metadata(path)?;
        Ok(FileStat {
            size: meta.len(),
            is_dir: meta.is_dir(),
        })
    }

    fn join(&self, parts: &[&str]) -> String {
        let mut buf = std::path::PathBuf::new();
        for part in parts {
            buf.push(part);
        }
        path_string(&buf)
    }

    fn walk(&self, root: &str) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(&e.file_name().to_string_lossy()))
        {
            let entry = entry.map_err(|e| SsaGraphError::file_system(format!("walk error: {}", e)))?;
            if entry.file_type().is_file() {
                files.push(path_string(entry.path()));
            }
        }
        files.sort();
        Ok(files)
    }
}
