//! Language-neutral construct kinds
//!
//! Each adapter maps tree-sitter node kinds onto these closed enums and
//! dispatches on them; nothing outside this list reaches the builder.

/// Statement-level construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructKind {
    Block,
    VariableDeclaration,
    ExpressionStatement,
    If,
    While,
    DoWhile,
    For,
    ForEach,
    Switch,
    Try,
    Return,
    Break,
    Continue,
    Labeled,
    Throw,
    /// `yield v;` inside a switch expression
    Yield,
    FunctionDeclaration,
    ClassDeclaration,
    Import,
    Export,
    /// Types, comments, preprocessor lines, `;`
    Ignored,
    /// Parser error node
    Error,
    Unsupported,
}

impl ConstructKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstructKind::Block => "block",
            ConstructKind::VariableDeclaration => "variable-declaration",
            ConstructKind::ExpressionStatement => "expression-statement",
            ConstructKind::If => "if",
            ConstructKind::While => "while",
            ConstructKind::DoWhile => "do-while",
            ConstructKind::For => "for",
            ConstructKind::ForEach => "for-each",
            ConstructKind::Switch => "switch",
            ConstructKind::Try => "try",
            ConstructKind::Return => "return",
            ConstructKind::Break => "break",
            ConstructKind::Continue => "continue",
            ConstructKind::Labeled => "labeled",
            ConstructKind::Throw => "throw",
            ConstructKind::Yield => "yield",
            ConstructKind::FunctionDeclaration => "function-declaration",
            ConstructKind::ClassDeclaration => "class-declaration",
            ConstructKind::Import => "import",
            ConstructKind::Export => "export",
            ConstructKind::Ignored => "ignored",
            ConstructKind::Error => "error",
            ConstructKind::Unsupported => "unsupported",
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            ConstructKind::While | ConstructKind::DoWhile | ConstructKind::For | ConstructKind::ForEach
        )
    }

    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            ConstructKind::Return
                | ConstructKind::Break
                | ConstructKind::Continue
                | ConstructKind::Throw
                | ConstructKind::Yield
        )
    }
}

impl std::fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expression-level construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Int,
    Float,
    Str,
    Char,
    Bool,
    Null,
    Identifier,
    This,
    Member,
    Index,
    Call,
    New,
    Binary,
    Unary,
    Update,
    Assignment,
    CompoundAssignment,
    Ternary,
    /// Lambda, arrow function, function expression
    Function,
    Array,
    Object,
    /// Parentheses, casts, `await`, non-null assertions: value of the inner expression
    Wrapped,
    Sequence,
    /// Switch used as an expression
    Switch,
    Error,
    Unsupported,
}

impl ExprKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExprKind::Int => "int",
            ExprKind::Float => "float",
            ExprKind::Str => "string",
            ExprKind::Char => "char",
            ExprKind::Bool => "bool",
            ExprKind::Null => "null",
            ExprKind::Identifier => "identifier",
            ExprKind::This => "this",
            ExprKind::Member => "member",
            ExprKind::Index => "index",
            ExprKind::Call => "call",
            ExprKind::New => "new",
            ExprKind::Binary => "binary",
            ExprKind::Unary => "unary",
            ExprKind::Update => "update",
            ExprKind::Assignment => "assignment",
            ExprKind::CompoundAssignment => "compound-assignment",
            ExprKind::Ternary => "ternary",
            ExprKind::Function => "function",
            ExprKind::Array => "array",
            ExprKind::Object => "object",
            ExprKind::Wrapped => "wrapped",
            ExprKind::Sequence => "sequence",
            ExprKind::Switch => "switch",
            ExprKind::Error => "error",
            ExprKind::Unsupported => "unsupported",
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            ExprKind::Int
                | ExprKind::Float
                | ExprKind::Str
                | ExprKind::Char
                | ExprKind::Bool
                | ExprKind::Null
        )
    }
}

impl std::fmt::Display for ExprKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_kind_groups() {
        assert!(ConstructKind::ForEach.is_loop());
        assert!(!ConstructKind::Switch.is_loop());
        assert!(ConstructKind::Yield.is_jump());
        assert_eq!(ConstructKind::DoWhile.to_string(), "do-while");
    }

    #[test]
    fn test_expr_kind_literals() {
        assert!(ExprKind::Char.is_literal());
        assert!(!ExprKind::Identifier.is_literal());
    }
}
