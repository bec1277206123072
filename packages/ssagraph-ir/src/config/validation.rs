//! Configuration validation

use super::error::ConfigResult;

/// Trait for validatable configuration objects
///
/// # Example
/// ```rust,ignore
/// use ssagraph_ir::config::Validatable;
///
/// fn start<C: Validatable>(config: C) -> Result<(), ConfigError> {
///     config.validate()?;
///     // ... build
/// }
/// ```
pub trait Validatable {
    /// Validate the configuration
    ///
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Get the configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Extension trait for validating collections of configs
pub trait ValidatableCollection {
    /// Validate all configs in collection
    fn validate_all(&self) -> ConfigResult<()>;
}

impl<T: Validatable> ValidatableCollection for Vec<T> {
    fn validate_all(&self) -> ConfigResult<()> {
        for config in self {
            config.validate()?;
        }
        Ok(())
    }
}

impl<T: Validatable> ValidatableCollection for Option<T> {
    fn validate_all(&self) -> ConfigResult<()> {
        if let Some(config) = self {
            config.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::build_config::ParallelConfig;
    use super::*;

    #[test]
    fn test_validate_collection() {
        let configs = vec![
            ParallelConfig::default(),
            ParallelConfig {
                workers: 4,
                channel_capacity: 16,
            },
        ];
        assert!(configs.validate_all().is_ok());

        let bad: Option<ParallelConfig> = Some(ParallelConfig {
            workers: 1,
            channel_capacity: 0,
        });
        assert!(bad.validate_all().is_err());
    }
}
