//! SSA values
//!
//! A value is the result of exactly one operation. Updating a variable never
//! touches an existing value: it creates a new one and rebinds the variable.

use super::ids::{BlockId, FunctionId, ValueId, VariableId};
use super::types::Type;
use crate::shared::models::Span;
use serde::{Deserialize, Serialize};

/// Literal constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
    Null,
}

impl Literal {
    pub fn ty(&self) -> Type {
        match self {
            Literal::Int(_) | Literal::Float(_) | Literal::Char(_) => Type::Number,
            Literal::Str(_) => Type::String,
            Literal::Bool(_) => Type::Boolean,
            Literal::Null => Type::Null,
        }
    }

    /// Key used when the literal indexes a member (`a[0]`, `o["k"]`)
    pub fn as_member_key(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_truthy(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            Literal::Int(i) => Some(*i != 0),
            Literal::Null => Some(false),
            _ => None,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Char(c) => write!(f, "{:?}", c),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Gt,
    GtEq,
    Lt,
    LtEq,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    LogicAnd,
    LogicOr,
    Pow,
    In,
    InstanceOf,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Gt => "gt",
            BinaryOp::GtEq => "gt-eq",
            BinaryOp::Lt => "lt",
            BinaryOp::LtEq => "lt-eq",
            BinaryOp::Eq => "eq",
            BinaryOp::NotEq => "neq",
            BinaryOp::StrictEq => "strict-eq",
            BinaryOp::StrictNotEq => "strict-neq",
            BinaryOp::BitAnd => "and",
            BinaryOp::BitOr => "or",
            BinaryOp::BitXor => "xor",
            BinaryOp::Shl => "shl",
            BinaryOp::Shr => "shr",
            BinaryOp::UShr => "ushr",
            BinaryOp::LogicAnd => "log-and",
            BinaryOp::LogicOr => "log-or",
            BinaryOp::Pow => "pow",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        }
    }

    /// Map a source operator token (`+`, `>=`, `+=` minus the `=`)
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::GtEq,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::LtEq,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::NotEq,
            "===" => BinaryOp::StrictEq,
            "!==" => BinaryOp::StrictNotEq,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            ">>>" => BinaryOp::UShr,
            "&&" => BinaryOp::LogicAnd,
            "||" => BinaryOp::LogicOr,
            "**" => BinaryOp::Pow,
            "in" => BinaryOp::In,
            "instanceof" => BinaryOp::InstanceOf,
            _ => return None,
        })
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::StrictEq
                | BinaryOp::StrictNotEq
                | BinaryOp::In
                | BinaryOp::InstanceOf
        )
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
    TypeOf,
    Deref,
    AddressOf,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Neg => "neg",
            UnaryOp::Plus => "plus",
            UnaryOp::BitNot => "bitwise-not",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Deref => "deref",
            UnaryOp::AddressOf => "address-of",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "!" => UnaryOp::Not,
            "-" => UnaryOp::Neg,
            "+" => UnaryOp::Plus,
            "~" => UnaryOp::BitNot,
            "typeof" => UnaryOp::TypeOf,
            "*" => UnaryOp::Deref,
            "&" => UnaryOp::AddressOf,
            _ => return None,
        })
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation producing a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueKind {
    Const(Literal),
    Parameter {
        name: String,
        index: usize,
    },
    /// Variable captured from an enclosing function
    FreeValue {
        name: String,
        variable: VariableId,
    },
    /// Merge of one incoming value per predecessor, in predecessor order
    Phi {
        variable: String,
        edges: Vec<ValueId>,
    },
    BinOp {
        op: BinaryOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    UnOp {
        op: UnaryOp,
        operand: ValueId,
    },
    Call {
        callee: ValueId,
        args: Vec<ValueId>,
        /// Receiver of a method call (`recv.m(args)`), passed as parameter 0
        receiver: Option<ValueId>,
    },
    /// Read of a name with no reaching definition
    Undefined {
        name: String,
    },
    /// Value a callee left in a captured variable or member after `call`
    SideEffect {
        value: ValueId,
        target: String,
        call: ValueId,
    },
    MakeObject {
        class: Option<String>,
        fields: Vec<(String, ValueId)>,
    },
    MakeSlice {
        elements: Vec<ValueId>,
    },
    Function {
        function: FunctionId,
        name: String,
    },
    /// Exception bound by a catch clause
    CaughtError {
        name: String,
    },
    Return {
        results: Vec<ValueId>,
    },
}

impl ValueKind {
    /// Values this one reads
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            ValueKind::Phi { edges, .. } => edges.clone(),
            ValueKind::BinOp { lhs, rhs, .. } => vec![*lhs, *rhs],
            ValueKind::UnOp { operand, .. } => vec![*operand],
            ValueKind::Call {
                callee,
                args,
                receiver,
            } => {
                let mut ops = vec![*callee];
                ops.extend(receiver.iter().copied());
                ops.extend(args.iter().copied());
                ops
            }
            ValueKind::SideEffect { value, call, .. } => vec![*value, *call],
            ValueKind::MakeObject { fields, .. } => fields.iter().map(|(_, v)| *v).collect(),
            ValueKind::MakeSlice { elements } => elements.clone(),
            ValueKind::Return { results } => results.clone(),
            ValueKind::Const(_)
            | ValueKind::Parameter { .. }
            | ValueKind::FreeValue { .. }
            | ValueKind::Undefined { .. }
            | ValueKind::Function { .. }
            | ValueKind::CaughtError { .. } => Vec::new(),
        }
    }

    /// Rewrite every operand through `f`
    pub(crate) fn map_operands(&mut self, mut f: impl FnMut(ValueId) -> ValueId) {
        match self {
            ValueKind::Phi { edges, .. } => edges.iter_mut().for_each(|e| *e = f(*e)),
            ValueKind::BinOp { lhs, rhs, .. } => {
                *lhs = f(*lhs);
                *rhs = f(*rhs);
            }
            ValueKind::UnOp { operand, .. } => *operand = f(*operand),
            ValueKind::Call {
                callee,
                args,
                receiver,
            } => {
                *callee = f(*callee);
                if let Some(r) = receiver {
                    *r = f(*r);
                }
                args.iter_mut().for_each(|a| *a = f(*a));
            }
            ValueKind::SideEffect { value, call, .. } => {
                *value = f(*value);
                *call = f(*call);
            }
            ValueKind::MakeObject { fields, .. } => {
                fields.iter_mut().for_each(|(_, v)| *v = f(*v))
            }
            ValueKind::MakeSlice { elements } => elements.iter_mut().for_each(|e| *e = f(*e)),
            ValueKind::Return { results } => results.iter_mut().for_each(|r| *r = f(*r)),
            ValueKind::Const(_)
            | ValueKind::Parameter { .. }
            | ValueKind::FreeValue { .. }
            | ValueKind::Undefined { .. }
            | ValueKind::Function { .. }
            | ValueKind::CaughtError { .. } => {}
        }
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, ValueKind::Phi { .. })
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, ValueKind::Undefined { .. })
    }

    /// Values placed at the head of a function's entry block
    pub(crate) fn is_entry_header(&self) -> bool {
        matches!(
            self,
            ValueKind::Parameter { .. } | ValueKind::FreeValue { .. } | ValueKind::Undefined { .. }
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueKind::Const(_) => "const",
            ValueKind::Parameter { .. } => "parameter",
            ValueKind::FreeValue { .. } => "free-value",
            ValueKind::Phi { .. } => "phi",
            ValueKind::BinOp { .. } => "binop",
            ValueKind::UnOp { .. } => "unop",
            ValueKind::Call { .. } => "call",
            ValueKind::Undefined { .. } => "undefined",
            ValueKind::SideEffect { .. } => "side-effect",
            ValueKind::MakeObject { .. } => "make-object",
            ValueKind::MakeSlice { .. } => "make-slice",
            ValueKind::Function { .. } => "function",
            ValueKind::CaughtError { .. } => "caught-error",
            ValueKind::Return { .. } => "return",
        }
    }
}

/// One SSA value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub id: ValueId,
    pub kind: ValueKind,
    pub block: BlockId,
    pub function: FunctionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,
    pub span: Span,
    /// First variable the value was bound to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tags attached by framework hooks
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    /// Values reading this one
    pub users: Vec<ValueId>,
    /// Trivial phi forwarded to another value; listed in no block
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub detached: bool,
}

impl Value {
    pub fn has_annotation(&self, tag: &str) -> bool {
        self.annotations.iter().any(|a| a == tag)
    }

    pub fn phi_edges(&self) -> Option<&[ValueId]> {
        match &self.kind {
            ValueKind::Phi { edges, .. } => Some(edges),
            _ => None,
        }
    }
}
