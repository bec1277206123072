//! Project builds
//!
//! ```text
//! collect files (FileSystem::walk, enabled languages)
//!        ↓
//! read + parse (stages.rs, parallel)
//!        ↓
//! SSA build (serial, sorted by path; imports built on demand)
//!        ↓
//! Program
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::cancel::CancellationToken;
use super::loader::{ProjectLoader, ProjectUnit};
use super::stages::read_and_parse;
use crate::config::{BuildConfig, Validatable};
use crate::errors::{Result, SsaGraphError};
use crate::features::filesystem::FileSystem;
use crate::features::frontend::{build_unit, FrontendRegistry};
use crate::features::ssa::{BuildSsaUseCase, HookRegistry, Program, ProgramStats};
use crate::shared::ports::Language;

/// Builds every source file under a root into one program
pub struct ProjectBuilder {
    config: BuildConfig,
    fs: Option<Arc<dyn FileSystem>>,
    frontends: FrontendRegistry,
    hooks: Option<Arc<HookRegistry>>,
}

impl ProjectBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            fs: None,
            frontends: FrontendRegistry::with_defaults(),
            hooks: None,
        }
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn with_frontends(mut self, frontends: FrontendRegistry) -> Self {
        self.frontends = frontends;
        self
    }

    /// Override the hooks named in the configuration
    pub fn with_hooks(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Source files under `root` with their language, sorted by path
    ///
    /// Files of disabled languages are skipped; an enabled language without
    /// a frontend is an error.
    pub fn collect_files(&self, root: &str) -> Result<Vec<(String, Language)>> {
        let fs = self.file_system()?;
        let mut files = Vec::new();
        for path in fs.walk(root)? {
            let Some(language) = self.config.language_for_path(&path) else {
                continue;
            };
            if !self.config.language_enabled(language) {
                continue;
            }
            self.frontends.require(language)?;
            files.push((path, language));
        }
        files.sort();
        Ok(files)
    }

    /// Build every source file under `root`
    pub fn build(&self, root: &str, token: &CancellationToken) -> Result<Program> {
        let started = Instant::now();
        self.config.validate()?;
        let fs = self.file_system()?;
        token.check()?;

        let files = self.collect_files(root)?;
        info!(root = %root, files = files.len(), "collected project files");

        let parsed = read_and_parse(fs, files, &self.frontends, &self.config.parallel, token)?;

        let mut units = Vec::with_capacity(parsed.len());
        for (path, unit) in parsed.into_iter() {
            let frontend = Arc::clone(self.frontends.require(unit.language)?);
            debug!(path = %path, "queued for SSA build");
            units.push(ProjectUnit::new(unit, frontend));
        }
        units.sort_by(|a, b| a.unit.path.cmp(&b.unit.path));

        let program = self.build_units(&units, token)?;
        info!(
            stats = ?ProgramStats::collect(&program),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "project build finished"
        );
        #[cfg(feature = "trace")]
        tracing::trace!(dump = %program.dump(), "project program");
        Ok(program)
    }

    /// Serial SSA stage over units sorted by path
    fn build_units(&self, units: &[ProjectUnit], token: &CancellationToken) -> Result<Program> {
        let mut use_case = BuildSsaUseCase::new(self.config.clone());
        if let Some(hooks) = &self.hooks {
            use_case = use_case.with_hooks(Arc::clone(hooks));
        }
        let loader = ProjectLoader::new(self.frontends.clone(), units);
        let mut builder = use_case.builder().with_loader(Box::new(loader));

        for unit in units {
            token.check()?;
            if builder.program().module_by_key(&unit.key).is_some() {
                debug!(key = %unit.key, "already built through an import");
                continue;
            }
            build_unit(unit.frontend.as_ref(), &mut builder, &unit.unit);
        }
        token.check()?;
        Ok(builder.finish())
    }

    fn file_system(&self) -> Result<&Arc<dyn FileSystem>> {
        self.fs
            .as_ref()
            .ok_or_else(|| SsaGraphError::file_system("no file system configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::filesystem::MemoryFileSystem;

    fn project(files: &[(&str, &str)]) -> ProjectBuilder {
        let mut fs = MemoryFileSystem::new();
        for (path, content) in files {
            fs.insert(path, *content);
        }
        ProjectBuilder::new(BuildConfig::default()).with_file_system(Arc::new(fs))
    }

    #[test]
    fn test_missing_file_system() {
        let err = ProjectBuilder::new(BuildConfig::default())
            .build("src", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, SsaGraphError::FileSystem(_)));
    }

    #[test]
    fn test_collect_files_skips_disabled_languages() {
        let mut builder = project(&[
            ("src/a.js", "1;"),
            ("src/b.c", "int x;"),
            ("src/notes.txt", "hi"),
        ]);
        builder.config = BuildConfig::default().languages([Language::C]);
        let files = builder.collect_files("src").unwrap();
        assert_eq!(files, vec![("src/b.c".to_string(), Language::C)]);
    }

    #[test]
    fn test_enabled_language_without_frontend() {
        let builder = project(&[("src/a.c", "int x;")]).with_frontends(FrontendRegistry::new());
        let err = builder.collect_files("src").unwrap_err();
        assert!(matches!(err, SsaGraphError::UnsupportedLanguage(Language::C)));
    }

    #[test]
    fn test_cancelled_build_returns_error() {
        let builder = project(&[("src/a.js", "let a = 1;")]);
        let token = CancellationToken::new();
        token.cancel();
        assert!(builder.build("src", &token).unwrap_err().is_cancelled());
    }
}
