//! SSA build use case
//!
//! ```text
//! Frontend / Pipeline
//!        ↓
//! BuildSsaUseCase (this module)
//!        ↓
//! SsaBuilder + structured builders (infrastructure)
//!        ↓
//! Program (domain)
//! ```

use crate::config::BuildConfig;
use crate::features::ssa::domain::{Program, ValueKind};
use crate::features::ssa::infrastructure::{HookRegistry, SsaBuilder};
use crate::shared::models::Severity;
use std::sync::Arc;
use tracing::debug;

/// Size counters of a finished program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramStats {
    pub modules: usize,
    pub functions: usize,
    pub blocks: usize,
    pub values: usize,
    pub phis: usize,
    pub undefined: usize,
    pub diagnostics: usize,
    pub errors: usize,
}

impl ProgramStats {
    pub fn collect(program: &Program) -> Self {
        let mut stats = Self {
            modules: program.modules().len(),
            functions: program.functions().len(),
            blocks: program.blocks().len(),
            diagnostics: program.diagnostics().len(),
            errors: program
                .diagnostics()
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .count(),
            ..Self::default()
        };
        for value in program.values() {
            stats.values += 1;
            match value.kind {
                ValueKind::Phi { .. } => stats.phis += 1,
                ValueKind::Undefined { .. } => stats.undefined += 1,
                _ => {}
            }
        }
        stats
    }
}

/// Builds programs with one configuration and one shared hook registry
#[derive(Debug, Clone)]
pub struct BuildSsaUseCase {
    config: BuildConfig,
    hooks: Arc<HookRegistry>,
}

impl BuildSsaUseCase {
    pub fn new(config: BuildConfig) -> Self {
        let hooks = Arc::new(HookRegistry::from_names(&config.hooks));
        Self { config, hooks }
    }

    pub fn with_hooks(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Fresh builder sharing this use case's hooks
    pub fn builder(&self) -> SsaBuilder {
        SsaBuilder::new(self.config.clone()).with_hooks(Arc::clone(&self.hooks))
    }

    /// Run `build` against a fresh builder and finish the program
    pub fn execute(&self, build: impl FnOnce(&mut SsaBuilder)) -> Program {
        let mut builder = self.builder();
        build(&mut builder);
        let program = builder.finish();
        debug!(stats = ?ProgramStats::collect(&program), "SSA build finished");
        program
    }
}

impl Default for BuildSsaUseCase {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ssa::domain::Literal;
    use crate::features::ssa::infrastructure::{IfBuilder, ModuleSpec};
    use crate::shared::ports::Language;

    #[test]
    fn test_stats_count_phis() {
        let program = BuildSsaUseCase::default().execute(|b| {
            b.build_module(ModuleSpec::new("t.js", Language::JavaScript), |b| {
                IfBuilder::new()
                    .append_item(
                        |b| b.read_value("c"),
                        |b| {
                            let one = b.emit_const(Literal::Int(1));
                            b.assign_to_name("a", one);
                        },
                    )
                    .build(b);
                b.read_value("a");
            });
        });
        let stats = ProgramStats::collect(&program);
        assert_eq!(stats.modules, 1);
        assert_eq!(stats.phis, 1);
        // `c` and the else-path `a`
        assert_eq!(stats.undefined, 2);
        assert_eq!(stats.errors, 0);
    }
}
