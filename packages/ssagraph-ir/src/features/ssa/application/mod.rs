//! SSA application layer
//!
//! Entry point for callers that drive an `SsaBuilder` themselves
//! (frontends, the project pipeline, tests).

mod build_ssa;

pub use build_ssa::{BuildSsaUseCase, ProgramStats};
