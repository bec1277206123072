//! Module loader port
//!
//! Import resolution is on demand: when an adapter meets an import whose
//! module is not built yet, the builder asks its loader for a deferred build
//! and runs it re-entrantly before binding the imported symbol.

use crate::features::ssa::infrastructure::SsaBuilder;
use crate::shared::ports::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Import path as written (`a.b.C`, `./util`)
    pub path: String,
    /// File containing the import
    pub from_file: Option<String>,
    pub language: Option<Language>,
}

/// Deferred build of one module
pub type ModuleBuild = Box<dyn FnOnce(&mut SsaBuilder)>;

pub trait ModuleLoader {
    /// Module key the request resolves to (`a.b.C`, `src/util`), if any
    fn resolve(&self, request: &ImportRequest) -> Option<String>;

    /// Hand out the build for `key` once; later calls return `None`
    fn load(&mut self, key: &str) -> Option<ModuleBuild>;
}
