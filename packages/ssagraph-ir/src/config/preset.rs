//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Default analysis build
    ///
    /// - Undeclared assignments hoist to the function scope
    /// - Every diagnostic is kept
    Lenient,

    /// Strict-mode build
    ///
    /// - Undeclared assignments bind in the current block scope
    /// - Unsupported constructs are reported as errors
    Strict,

    /// CI build: keep only warnings and errors, larger channels
    Fast,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            "fast" => Ok(Self::Fast),
            _ => Err(format!(
                "Unknown preset '{}'. Valid presets: lenient, strict, fast",
                s
            )),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
            Self::Fast => "fast",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Lenient
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(Preset::from_str("lenient").unwrap(), Preset::Lenient);
        assert_eq!(Preset::from_str("STRICT").unwrap(), Preset::Strict);
        assert_eq!(Preset::from_str("fast").unwrap(), Preset::Fast);
        assert!(Preset::from_str("balanced").is_err());
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(Preset::Lenient.to_string(), "lenient");
        assert_eq!(Preset::Strict.to_string(), "strict");
        assert_eq!(Preset::default(), Preset::Lenient);
    }
}
