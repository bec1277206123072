//! Functions and modules

use super::ids::{BlockId, FunctionId, ScopeId, ValueId, VariableId};
use crate::shared::models::Span;
use crate::shared::ports::Language;
use serde::{Deserialize, Serialize};

/// What a recorded side effect rebinds at the call site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideEffectTarget {
    /// Variable of an enclosing function assigned inside the callee
    Captured(VariableId),
    /// Member of the callee's parameter `index` (`this` is index 0 of methods)
    ParameterMember { index: usize, key: String },
    /// Member of an object captured from an enclosing function
    CapturedMember { variable: VariableId, key: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSideEffect {
    pub target: SideEffectTarget,
    /// Value the target holds when the callee returns
    pub value: ValueId,
    /// Display name of the target (`a`, `this.f`)
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: FunctionId,
    pub name: String,
    pub parent: Option<FunctionId>,
    pub children: Vec<FunctionId>,
    pub params: Vec<ValueId>,
    pub entry: BlockId,
    /// Single exit every `return` (and falling off the end) jumps to
    pub exit: BlockId,
    pub blocks: Vec<BlockId>,
    pub scope: ScopeId,
    /// Captured variables, in first-capture order
    pub free_values: Vec<(VariableId, ValueId)>,
    pub side_effects: Vec<FunctionSideEffect>,
    pub returns: Vec<ValueId>,
    /// Owning class for methods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub is_method: bool,
    /// `true` once the body has been built
    pub defined: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub span: Span,
}

impl Function {
    pub fn free_value(&self, variable: VariableId) -> Option<ValueId> {
        self.free_values
            .iter()
            .find(|(v, _)| *v == variable)
            .map(|(_, value)| *value)
    }
}

/// One source file built into the program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub path: String,
    pub language: Language,
    /// Import key (`a.b.Main` for Java, path without extension for TS/JS)
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub main: FunctionId,
}
