//! Basic blocks

use super::ids::{BlockId, FunctionId, ScopeId, ValueId};
use crate::shared::models::Span;
use serde::{Deserialize, Serialize};

/// How control leaves a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminator {
    Jump(BlockId),
    Branch {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },
    /// Holds the `Return` value; the successor is the function's exit block
    Return(ValueId),
    /// Enter a try body; handlers receive the pre-try state
    Try {
        body: BlockId,
        handlers: Vec<BlockId>,
        finally: Option<BlockId>,
    },
    /// End of a finally block: normal completion and every routed exit
    Dispatch(Vec<BlockId>),
}

impl Terminator {
    pub fn targets(&self) -> Vec<BlockId> {
        match self {
            Terminator::Jump(target) => vec![*target],
            Terminator::Branch {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Terminator::Return(_) => Vec::new(),
            Terminator::Try {
                body,
                handlers,
                finally,
            } => {
                let mut targets = vec![*body];
                targets.extend(handlers.iter().copied());
                targets.extend(finally.iter().copied());
                targets
            }
            Terminator::Dispatch(targets) => targets.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    /// Role label (`entry`, `if.true`, `loop.header`, ...)
    pub name: String,
    pub function: FunctionId,
    /// Ordered predecessors; phi edge `i` comes from `preds[i]`
    pub preds: Vec<BlockId>,
    pub succs: Vec<BlockId>,
    pub phis: Vec<ValueId>,
    pub insts: Vec<ValueId>,
    pub terminator: Option<Terminator>,
    /// No predecessor will be added any more
    pub sealed: bool,
    pub scope: ScopeId,
    pub span: Span,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId, name: &str, function: FunctionId, scope: ScopeId) -> Self {
        Self {
            id,
            name: name.to_string(),
            function,
            preds: Vec::new(),
            succs: Vec::new(),
            phis: Vec::new(),
            insts: Vec::new(),
            terminator: None,
            sealed: false,
            scope,
            span: Span::zero(),
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }

    /// Phis followed by instructions, in block order
    pub fn values(&self) -> impl Iterator<Item = ValueId> + '_ {
        self.phis.iter().chain(self.insts.iter()).copied()
    }

    /// Label used in dumps and DOT output (`if.true3`)
    pub fn label(&self) -> String {
        format!("{}{}", self.name, self.id.0)
    }
}
