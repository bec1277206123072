//! Tree-sitter frontends

pub mod c;
pub mod common;
pub mod java;
pub mod registry;
pub mod typescript;

pub use c::CFrontend;
pub use java::JavaFrontend;
pub use registry::{build_file, build_source, build_unit, FrontendRegistry};
pub use typescript::TypeScriptFrontend;
