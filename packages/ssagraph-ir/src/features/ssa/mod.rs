//! SSA construction feature
//!
//! Turns structured control flow into basic blocks of SSA values with
//! on-demand phi insertion.
//!
//! Layout:
//! - domain/          : ids, values, blocks, functions, scopes, the finished `Program`
//! - infrastructure/  : `SsaBuilder` and the structured builders
//! - ports/           : framework hook and module loader traits
//! - application/     : program-level build entry points

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::*;
pub use domain::*;
pub use infrastructure::*;
pub use ports::*;
