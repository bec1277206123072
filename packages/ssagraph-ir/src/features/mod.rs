//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure data model (no external dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Entry points
//! - infrastructure/ - Implementations

pub mod filesystem;
pub mod frontend;
pub mod ssa;
