//! Build Configuration System
//!
//! Two tiers:
//! - Level 1: Preset - one-liner (`BuildConfig::preset(Preset::Strict)`)
//! - Level 2: YAML / builder overrides for individual sections
//!
//! # Examples
//!
//! ```rust,ignore
//! use ssagraph_ir::config::{BuildConfig, Preset, ScopingMode};
//!
//! let config = BuildConfig::preset(Preset::Lenient)
//!     .scoping(ScopingMode::Block)
//!     .workers(4);
//!
//! let config = BuildConfig::from_yaml("ssagraph.yaml")?;
//! ```

pub mod build_config;
pub mod error;
pub mod io;
pub mod preset;
pub mod validation;

// Re-exports
pub use build_config::{BuildConfig, DiagnosticsConfig, ParallelConfig, ScopingMode};
pub use error::{ConfigError, ConfigResult};
pub use io::ConfigFileV1;
pub use preset::Preset;
pub use validation::{Validatable, ValidatableCollection};
