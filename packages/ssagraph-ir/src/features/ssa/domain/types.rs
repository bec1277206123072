//! Declared types
//!
//! Only what adapters can read off declarations; there is no inference.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Any,
    Number,
    String,
    Boolean,
    Null,
    Function,
    Slice(Box<Type>),
    /// Class / struct / interface name as written
    Named(String),
}

impl Type {
    /// Map a primitive or class name written in source to a type
    pub fn from_name(name: &str) -> Self {
        let base = name.trim();
        if let Some(elem) = base.strip_suffix("[]") {
            return Type::Slice(Box::new(Type::from_name(elem)));
        }
        match base {
            "int" | "long" | "short" | "byte" | "float" | "double" | "char" | "unsigned"
            | "size_t" | "number" | "bigint" | "Integer" | "Long" | "Double" | "Float" => {
                Type::Number
            }
            "String" | "string" | "CharSequence" => Type::String,
            "boolean" | "bool" | "Boolean" | "_Bool" => Type::Boolean,
            "void" | "null" | "undefined" => Type::Null,
            "any" | "var" | "auto" | "Object" | "unknown" | "" => Type::Any,
            other => Type::Named(other.to_string()),
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Number => f.write_str("number"),
            Type::String => f.write_str("string"),
            Type::Boolean => f.write_str("boolean"),
            Type::Null => f.write_str("null"),
            Type::Function => f.write_str("function"),
            Type::Slice(elem) => write!(f, "{}[]", elem),
            Type::Named(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Type::from_name("int"), Type::Number);
        assert_eq!(Type::from_name("String"), Type::String);
        assert_eq!(
            Type::from_name("int[]"),
            Type::Slice(Box::new(Type::Number))
        );
        assert_eq!(
            Type::from_name("HttpServletRequest"),
            Type::Named("HttpServletRequest".to_string())
        );
        assert_eq!(Type::from_name("String[]").to_string(), "string[]");
    }
}
