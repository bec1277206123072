//! Configuration I/O (YAML schema)
//!
//! Defines the on-disk schema. Loading lives in `build_config.rs`.

use super::build_config::{DiagnosticsConfig, ParallelConfig, ScopingMode};
use crate::shared::ports::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    #[serde(default)]
    pub version: Option<u32>,

    /// Base preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoping: Option<ScopingMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<ParallelConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<DiagnosticsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<Language>>,

    /// Extension → language overrides (`es6: javascript`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<BTreeMap<String, Language>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use crate::config::error::ConfigError;
    use crate::config::{BuildConfig, Preset, ScopingMode};
    use crate::shared::models::Severity;
    use crate::shared::ports::Language;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_roundtrip() {
        let config = BuildConfig::preset(Preset::Strict).workers(2);

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("version: 1"));
        assert!(yaml.contains("preset: strict"));
        assert!(yaml.contains("scoping: block"));

        let back = BuildConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_yaml_loading() {
        let yaml_content = r#"
version: 1
preset: lenient
scoping: block
parallel:
  workers: 4
diagnostics:
  min_severity: warn
languages: [java, typescript]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = BuildConfig::from_yaml(temp_file.path()).unwrap();
        assert_eq!(config.scoping, ScopingMode::Block);
        assert_eq!(config.parallel.workers, 4);
        assert_eq!(config.parallel.channel_capacity, 64);
        assert_eq!(config.diagnostics.min_severity, Severity::Warn);
        assert_eq!(config.languages, vec![Language::Java, Language::TypeScript]);
    }

    #[test]
    fn test_yaml_missing_version() {
        let result = BuildConfig::from_yaml_str("preset: fast\n");
        assert!(matches!(result, Err(ConfigError::MissingVersion)));
    }

    #[test]
    fn test_yaml_unsupported_version() {
        let result = BuildConfig::from_yaml_str("version: 2\npreset: fast\n");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::UnsupportedVersion { found: 2, .. }
        ));
    }

    #[test]
    fn test_yaml_unknown_preset_and_field() {
        let result = BuildConfig::from_yaml_str("version: 1\npreset: thorough\n");
        assert!(matches!(result, Err(ConfigError::UnknownPreset(_))));

        let result = BuildConfig::from_yaml_str("version: 1\nmax_depth: 3\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_yaml_validation_runs() {
        let result = BuildConfig::from_yaml_str("version: 1\nparallel:\n  channel_capacity: 0\n");
        assert!(matches!(result, Err(ConfigError::Range { .. })));
    }
}
