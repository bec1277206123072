//! Frontend registry and single-source builds

use std::sync::Arc;

use ahash::AHashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use super::{CFrontend, JavaFrontend, TypeScriptFrontend};
use crate::config::BuildConfig;
use crate::errors::{Result, SsaGraphError};
use crate::features::frontend::ports::{LanguageFrontend, ParsedUnit};
use crate::features::ssa::{BuildSsaUseCase, Program, SsaBuilder};
use crate::shared::ports::Language;

/// Registry for language frontends
#[derive(Clone)]
pub struct FrontendRegistry {
    frontends: AHashMap<Language, Arc<dyn LanguageFrontend>>,
}

impl FrontendRegistry {
    pub fn new() -> Self {
        Self {
            frontends: AHashMap::new(),
        }
    }

    /// Java, TypeScript, JavaScript and C
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JavaFrontend::new()));
        registry.register(Arc::new(TypeScriptFrontend::typescript()));
        registry.register(Arc::new(TypeScriptFrontend::javascript()));
        registry.register(Arc::new(CFrontend::new()));
        registry
    }

    /// Register a frontend, replacing any previous one for its language
    pub fn register(&mut self, frontend: Arc<dyn LanguageFrontend>) {
        self.frontends.insert(frontend.language(), frontend);
    }

    pub fn get(&self, language: Language) -> Option<&Arc<dyn LanguageFrontend>> {
        self.frontends.get(&language)
    }

    /// Frontend for `language`, or `UnsupportedLanguage`
    pub fn require(&self, language: Language) -> Result<&Arc<dyn LanguageFrontend>> {
        self.get(language)
            .ok_or(SsaGraphError::UnsupportedLanguage(language))
    }

    /// Frontend for a file path, by extension
    pub fn for_path(&self, path: &str) -> Option<&Arc<dyn LanguageFrontend>> {
        let language = Language::from_file_path(path)?;
        self.get(language)
    }

    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.frontends.keys().copied().collect();
        languages.sort();
        languages
    }

    pub fn len(&self) -> usize {
        self.frontends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontends.is_empty()
    }
}

impl Default for FrontendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for FrontendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrontendRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

/// Frontends used by single-file builds
static DEFAULT_FRONTENDS: Lazy<FrontendRegistry> = Lazy::new(FrontendRegistry::with_defaults);

/// Build a parsed unit as one module inside `builder`
pub fn build_unit(frontend: &dyn LanguageFrontend, builder: &mut SsaBuilder, unit: &ParsedUnit) {
    let spec = frontend.module_spec(unit);
    debug!(path = %unit.path, key = %spec.key, "building module");
    builder.build_module(spec, |b| frontend.build(b, unit));
}

/// Build one source text with the default configuration
///
/// The module is named `input.<ext>` after the language's first extension.
pub fn build_source(language: Language, source: &str) -> Result<Program> {
    let extension = language.extensions().first().copied().unwrap_or("txt");
    build_file(&BuildConfig::default(), &format!("input.{}", extension), source)
}

/// Build one file's source text; imports stay unresolved
pub fn build_file(config: &BuildConfig, path: &str, source: &str) -> Result<Program> {
    let language = Language::from_file_path(path)
        .ok_or_else(|| SsaGraphError::parse_error(format!("unknown file extension: {}", path)))?;
    let frontend = DEFAULT_FRONTENDS.require(language)?;
    let unit = frontend.parse(path, source)?;
    let use_case = BuildSsaUseCase::new(config.clone());
    Ok(use_case.execute(|b| build_unit(frontend.as_ref(), b, &unit)))
}
