//! Build configuration
//!
//! `BuildConfig` is resolved from a [`Preset`] and then adjusted through
//! builder methods or a YAML file (see [`super::io`]).

use super::error::{ConfigError, ConfigResult};
use super::io::ConfigFileV1;
use super::preset::Preset;
use super::validation::Validatable;
use crate::features::ssa::BUILTIN_HOOKS;
use crate::shared::models::Severity;
use crate::shared::ports::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Where an assignment to an undeclared name creates its binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopingMode {
    /// Bind in the nearest enclosing function scope
    Hoisted,
    /// Bind in the current block scope (JS "use strict" behaviour)
    Block,
}

impl Default for ScopingMode {
    fn default() -> Self {
        ScopingMode::Hoisted
    }
}

// ============================================================================
// Parallelism
// ============================================================================

/// Parallelism Configuration for project builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Number of parse workers (0=auto, 1..=256)
    pub workers: usize,

    /// Capacity of the bounded channels between stages (1..=4096)
    pub channel_capacity: usize,
}

impl ParallelConfig {
    /// Resolve `workers = 0` to the machine's CPU count
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            std::cmp::max(1, num_cpus::get())
        } else {
            self.workers
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Lenient | Preset::Strict => Self::default(),
            Preset::Fast => Self {
                workers: 0,
                channel_capacity: 256,
            },
        }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            channel_capacity: 64,
        }
    }
}

impl Validatable for ParallelConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.workers > 256 {
            return Err(ConfigError::range_with_hint(
                "parallel.workers",
                self.workers,
                0,
                256,
                "Number of workers must be reasonable (0=auto)",
            ));
        }

        if self.channel_capacity < 1 || self.channel_capacity > 4096 {
            return Err(ConfigError::range_with_hint(
                "parallel.channel_capacity",
                self.channel_capacity,
                1,
                4096,
                "Bounded channels need at least one slot",
            ));
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "ParallelConfig"
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Diagnostic filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Diagnostics below this severity are dropped
    pub min_severity: Severity,

    /// Maximum number of diagnostics kept per program (0=unlimited)
    pub max_count: usize,

    /// Report unsupported constructs as errors instead of warnings
    pub unsupported_as_error: bool,
}

impl DiagnosticsConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Lenient => Self::default(),
            Preset::Strict => Self {
                unsupported_as_error: true,
                ..Self::default()
            },
            Preset::Fast => Self {
                min_severity: Severity::Warn,
                max_count: 10_000,
                unsupported_as_error: false,
            },
        }
    }

    /// Whether a diagnostic of `severity` is kept once `current` are stored
    pub fn accepts(&self, severity: Severity, current: usize) -> bool {
        severity >= self.min_severity && (self.max_count == 0 || current < self.max_count)
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Hint,
            max_count: 0,
            unsupported_as_error: false,
        }
    }
}

impl Validatable for DiagnosticsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_count > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "diagnostics.max_count",
                self.max_count,
                0,
                1_000_000,
                "Use 0 for unlimited",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "DiagnosticsConfig"
    }
}

// ============================================================================
// BuildConfig
// ============================================================================

/// Complete build configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    preset: Preset,
    pub scoping: ScopingMode,
    pub parallel: ParallelConfig,
    pub diagnostics: DiagnosticsConfig,
    /// Languages the project build picks up (by file extension)
    pub languages: Vec<Language>,
    /// Extra file extensions (without the dot) mapped to a language
    pub extensions: BTreeMap<String, Language>,
    /// Framework hooks enabled for this build
    pub hooks: Vec<String>,
}

impl BuildConfig {
    /// Create a configuration from a preset
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            scoping: match preset {
                Preset::Strict => ScopingMode::Block,
                Preset::Lenient | Preset::Fast => ScopingMode::Hoisted,
            },
            parallel: ParallelConfig::from_preset(preset),
            diagnostics: DiagnosticsConfig::from_preset(preset),
            languages: Language::ALL.to_vec(),
            extensions: BTreeMap::new(),
            hooks: BUILTIN_HOOKS.iter().map(|h| h.to_string()).collect(),
        }
    }

    pub fn get_preset(&self) -> Preset {
        self.preset
    }

    pub fn scoping(mut self, scoping: ScopingMode) -> Self {
        self.scoping = scoping;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.parallel.workers = workers;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.parallel.channel_capacity = capacity;
        self
    }

    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.diagnostics.min_severity = severity;
        self
    }

    pub fn languages(mut self, languages: impl IntoIterator<Item = Language>) -> Self {
        self.languages = languages.into_iter().collect();
        self
    }

    pub fn hooks<S: Into<String>>(mut self, hooks: impl IntoIterator<Item = S>) -> Self {
        self.hooks = hooks.into_iter().map(Into::into).collect();
        self
    }

    /// Treat files ending in `.ext` as `language`
    pub fn extension(mut self, ext: impl Into<String>, language: Language) -> Self {
        self.extensions.insert(ext.into(), language);
        self
    }

    /// Language of a file path: extension overrides first, then the built-in table
    pub fn language_for_path(&self, path: &str) -> Option<Language> {
        let file_name = path.rsplit(['/', '\\']).next()?;
        let (_, ext) = file_name.rsplit_once('.')?;
        self.extensions
            .get(ext)
            .copied()
            .or_else(|| Language::from_extension(ext))
    }

    /// Whether files of `language` take part in project builds
    pub fn language_enabled(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    /// Load a validated configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load a validated configuration from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;

        match file.version {
            None => return Err(ConfigError::MissingVersion),
            Some(1) => {}
            Some(found) => {
                return Err(ConfigError::UnsupportedVersion {
                    found,
                    supported: vec![1],
                })
            }
        }

        let preset = match file.preset {
            Some(ref name) => {
                Preset::from_str(name).map_err(|_| ConfigError::UnknownPreset(name.clone()))?
            }
            None => Preset::default(),
        };

        let mut config = Self::preset(preset);
        if let Some(scoping) = file.scoping {
            config.scoping = scoping;
        }
        if let Some(parallel) = file.parallel {
            config.parallel = parallel;
        }
        if let Some(diagnostics) = file.diagnostics {
            config.diagnostics = diagnostics;
        }
        if let Some(languages) = file.languages {
            config.languages = languages;
        }
        if let Some(extensions) = file.extensions {
            config.extensions = extensions;
        }
        if let Some(hooks) = file.hooks {
            config.hooks = hooks;
        }

        config.validate()?;
        Ok(config)
    }

    /// Serialize to the versioned YAML schema
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: Some(1),
            preset: Some(self.preset.to_string()),
            scoping: Some(self.scoping),
            parallel: Some(self.parallel.clone()),
            diagnostics: Some(self.diagnostics.clone()),
            languages: Some(self.languages.clone()),
            extensions: (!self.extensions.is_empty()).then(|| self.extensions.clone()),
            hooks: Some(self.hooks.clone()),
        };

        serde_yaml::to_string(&file).map_err(ConfigError::Yaml)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

impl Validatable for BuildConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.parallel.validate()?;
        self.diagnostics.validate()?;

        if self.languages.is_empty() {
            return Err(ConfigError::Validation(
                "at least one language must be enabled".to_string(),
            ));
        }

        for ext in self.extensions.keys() {
            if ext.is_empty() || ext.starts_with('.') || ext.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "invalid extension '{}': give it without the leading dot",
                    ext
                )));
            }
        }

        for hook in &self.hooks {
            if !BUILTIN_HOOKS.contains(&hook.as_str()) {
                return Err(ConfigError::unknown_name_with_suggestion(
                    "hook",
                    hook.clone(),
                    BUILTIN_HOOKS,
                ));
            }
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "BuildConfig"
    }
}
