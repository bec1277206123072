//! Framework hook port

use crate::features::ssa::domain::ValueId;
use crate::features::ssa::infrastructure::SsaBuilder;
use crate::shared::ports::Language;

/// A call as the builder emitted it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub call: ValueId,
    pub callee: ValueId,
    /// Method / function name as written (`getParameter`, `println`)
    pub method: Option<String>,
    pub receiver: Option<ValueId>,
    /// Variable name the receiver was bound to (`req`, `request`)
    pub receiver_name: Option<String>,
    pub args: Vec<ValueId>,
    pub language: Option<Language>,
}

/// Framework-specific behaviour attached to calls
///
/// Hooks are registered by name in a [`crate::features::ssa::HookRegistry`]
/// and consulted after each call is emitted, in registration order.
pub trait CallHook: Send + Sync {
    fn name(&self) -> &str;

    fn matches(&self, site: &CallSite) -> bool;

    /// May emit values or annotate existing ones through `builder`
    fn on_call(&self, builder: &mut SsaBuilder, site: &CallSite);
}
