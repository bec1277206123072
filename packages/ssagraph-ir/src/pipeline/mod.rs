//! Project build pipeline
//!
//! Reads and parses in parallel, builds SSA on one thread.

pub mod cancel;
pub mod loader;
pub mod project;
pub mod stages;

pub use cancel::CancellationToken;
pub use loader::{ProjectLoader, ProjectUnit};
pub use project::ProjectBuilder;
pub use stages::{read_and_parse, ParsedUnits, SourceFile};
