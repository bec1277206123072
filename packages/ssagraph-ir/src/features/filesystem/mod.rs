//! File system capability
//!
//! Project builds enumerate and read sources through [`FileSystem`], so the
//! same pipeline runs on disk trees and in-memory fixtures.

pub mod infrastructure;
pub mod ports;

pub use infrastructure::{LocalFileSystem, MemoryFileSystem};
pub use ports::{DirEntry, FileStat, FileSystem};
