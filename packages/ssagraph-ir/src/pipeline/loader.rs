//! On-demand module loading for project builds

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use tracing::trace;

use crate::features::frontend::{build_unit, FrontendRegistry, LanguageFrontend, ParsedUnit};
use crate::features::ssa::{ImportRequest, ModuleBuild, ModuleLoader};

/// One parsed project file and the frontend that builds it
#[derive(Clone)]
pub struct ProjectUnit {
    pub key: String,
    pub unit: Arc<ParsedUnit>,
    pub frontend: Arc<dyn LanguageFrontend>,
}

impl ProjectUnit {
    pub fn new(unit: ParsedUnit, frontend: Arc<dyn LanguageFrontend>) -> Self {
        let key = frontend.module_spec(&unit).key;
        Self {
            key,
            unit: Arc::new(unit),
            frontend,
        }
    }

    /// Deferred build of this unit
    pub fn deferred(&self) -> ModuleBuild {
        let unit = Arc::clone(&self.unit);
        let frontend = Arc::clone(&self.frontend);
        Box::new(move |b| build_unit(frontend.as_ref(), b, &unit))
    }
}

/// Resolves imports against the project's module keys
pub struct ProjectLoader {
    frontends: FrontendRegistry,
    units: AHashMap<String, ProjectUnit>,
    handed_out: AHashSet<String>,
}

impl ProjectLoader {
    pub fn new(frontends: FrontendRegistry, units: &[ProjectUnit]) -> Self {
        Self {
            frontends,
            units: units
                .iter()
                .map(|u| (u.key.clone(), u.clone()))
                .collect(),
            handed_out: AHashSet::new(),
        }
    }
}

impl ModuleLoader for ProjectLoader {
    fn resolve(&self, request: &ImportRequest) -> Option<String> {
        let language = request.language?;
        let frontend = self.frontends.get(language)?;
        let key = frontend
            .import_candidates(request)
            .into_iter()
            .find(|candidate| self.units.contains_key(candidate));
        trace!(import = %request.path, key = ?key, "resolved import");
        key
    }

    fn load(&mut self, key: &str) -> Option<ModuleBuild> {
        if !self.handed_out.insert(key.to_string()) {
            return None;
        }
        self.units.get(key).map(ProjectUnit::deferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::frontend::TypeScriptFrontend;
    use crate::shared::ports::Language;

    fn unit(path: &str, source: &str) -> ProjectUnit {
        let frontend: Arc<dyn LanguageFrontend> = Arc::new(TypeScriptFrontend::typescript());
        let parsed = frontend.parse(path, source).unwrap();
        ProjectUnit::new(parsed, frontend)
    }

    #[test]
    fn test_resolve_relative_import() {
        let units = vec![unit("src/util.ts", "export const a = 1;")];
        let loader = ProjectLoader::new(FrontendRegistry::with_defaults(), &units);
        let request = ImportRequest {
            path: "./util".to_string(),
            from_file: Some("src/app.ts".to_string()),
            language: Some(Language::TypeScript),
        };
        assert_eq!(loader.resolve(&request), Some("src/util".to_string()));
    }

    #[test]
    fn test_load_hands_out_once() {
        let units = vec![unit("lib.ts", "export function f() {}")];
        let mut loader = ProjectLoader::new(FrontendRegistry::with_defaults(), &units);
        assert!(loader.load("lib").is_some());
        assert!(loader.load("lib").is_none());
        assert!(loader.load("missing").is_none());
    }
}
