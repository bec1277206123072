//! SSA domain model
//!
//! Arena-allocated nodes addressed by `u32` ids. The builder owns the
//! arenas while a program is under construction; the finished [`Program`]
//! exposes them read-only.

mod block;
mod function;
mod ids;
mod program;
mod render;
mod scope;
mod types;
mod value;

pub use block::{BasicBlock, Terminator};
pub use function::{Function, FunctionSideEffect, Module, SideEffectTarget};
pub use ids::{BlockId, FunctionId, ScopeId, ValueId, VariableId};
pub use program::{ClassBlueprint, Program};
pub use render::ValueRenderer;
pub use scope::{Scope, ScopeKind, Variable, VariableKind};
pub use types::Type;
pub use value::{BinaryOp, Literal, UnaryOp, Value, ValueKind};
