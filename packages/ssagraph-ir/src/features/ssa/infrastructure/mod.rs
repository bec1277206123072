//! SSA construction
//!
//! - builder.rs        : `SsaBuilder` (cursor, blocks, emission, functions, modules)
//! - variables.rs      : scopes, members, classes, symbols, side effects
//! - phi.rs            : on-demand phi insertion and trivial-phi removal
//! - jump.rs           : break / continue frames, labeled blocks
//! - *_builder.rs      : structured if / loop / switch / try
//! - hooks.rs          : framework hook registry
//! - cfg_export.rs     : petgraph CFG view, DOT export
//! - verify.rs         : structural invariant checks

mod builder;
mod cfg_export;
mod hooks;
mod if_builder;
mod jump;
mod loop_builder;
mod phi;
mod switch_builder;
mod try_builder;
mod variables;
mod verify;

pub use builder::{FunctionSpec, ModuleSpec, ParamSpec, SsaBuilder};
pub use cfg_export::FunctionCfg;
pub use hooks::{ExpressRequestHook, HookRegistry, ServletRequestHook, BUILTIN_HOOKS};
pub use if_builder::IfBuilder;
pub use jump::JumpKind;
pub use loop_builder::LoopBuilder;
pub use switch_builder::SwitchBuilder;
pub use try_builder::TryBuilder;

use crate::features::ssa::domain::ValueId;

/// Condition closure run by a structured builder
pub type CondFn<'a> = Box<dyn FnOnce(&mut SsaBuilder) -> ValueId + 'a>;

/// Body closure run by a structured builder
pub type BodyFn<'a> = Box<dyn FnOnce(&mut SsaBuilder) + 'a>;
