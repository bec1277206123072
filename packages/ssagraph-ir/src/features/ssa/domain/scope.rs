//! Lexical scopes and variables

use super::ids::{FunctionId, ScopeId, ValueId, VariableId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    /// Top of a function (or module) body
    Function,
    /// Nested syntactic block
    Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub function: FunctionId,
    pub kind: ScopeKind,
    pub bindings: IndexMap<String, VariableId>,
    /// Undeclared assignments bind here instead of hoisting
    pub strict: bool,
}

impl Scope {
    pub fn lookup(&self, name: &str) -> Option<VariableId> {
        self.bindings.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    Local,
    /// Object field keyed by the object value
    Member { object: ValueId, key: String },
    /// Program-lifetime global (C file scope)
    Global,
    /// Unbound helper slot (ternary / switch-expression results)
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    pub scope: Option<ScopeId>,
    /// Function whose blocks define this variable
    pub function: Option<FunctionId>,
    pub kind: VariableKind,
}

impl Variable {
    pub fn is_member(&self) -> bool {
        matches!(self.kind, VariableKind::Member { .. })
    }
}
