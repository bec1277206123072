//! Helpers shared by the tree-sitter adapters
//!
//! Node access (text, children by kind / field), literal decoding, and the
//! lowering of operators that every C-family language spells the same way.

use crate::features::frontend::ports::SpanExt;
use crate::features::ssa::{BinaryOp, Literal, SsaBuilder, UnaryOp, ValueId};
use crate::shared::models::{DiagnosticTag, Severity};
use tree_sitter::Node;

/// Get node text from source
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    let start = node.start_byte();
    let end = node.end_byte();
    source.get(start..end).unwrap_or("")
}

/// Find first child of a specific kind
pub fn find_child_by_kind<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                return Some(child);
            }
        }
    }
    None
}

/// Named children, comments skipped
pub fn named_children<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !is_comment(c.kind()))
        .collect()
}

/// All children under a repeated field (`init`, `update`, `body`)
pub fn field_children<'a>(node: &Node<'a>, field: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor)
        .filter(|c| !is_comment(c.kind()))
        .collect()
}

/// Text of an unnamed operator child (`+`, `&&`, `++`)
pub fn operator_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    if let Some(op) = node.child_by_field_name("operator") {
        return Some(node_text(&op, source));
    }
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .find(|c| !c.is_named())
        .map(|c| node_text(&c, source))
}

pub fn is_comment(kind: &str) -> bool {
    matches!(kind, "comment" | "line_comment" | "block_comment")
}

/// Strip one layer of parentheses (`if (c)`, `while (c)`)
pub fn unwrap_parens<'a>(node: Node<'a>) -> Node<'a> {
    match node.kind() {
        "parenthesized_expression" | "condition_clause" => named_children(&node)
            .into_iter()
            .last()
            .unwrap_or(node),
        _ => node,
    }
}

/// Type name without generics or array brackets (`List<String>` → `List`)
pub fn base_type_name(text: &str) -> &str {
    let end = text.find(['<', '[']).unwrap_or(text.len());
    text[..end].trim()
}

// ═══════════════════════════════════════════════════════════════════════════
// Literals
// ═══════════════════════════════════════════════════════════════════════════

/// Integer literal in any of the C-family spellings
///
/// Handles `0x` / `0b` / `0o` / leading-zero octal prefixes, `_` separators
/// and `L` / `u` suffixes. Out of range values fall back to a float.
pub fn parse_int(text: &str) -> Literal {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let trimmed = cleaned.trim_end_matches(['l', 'L', 'u', 'U', 'n']);
    let lower = trimmed.to_ascii_lowercase();
    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if lower.len() > 1 && lower.starts_with('0') && lower.chars().all(|c| c.is_ascii_digit()) {
        i64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse::<i64>().ok()
    };
    match parsed {
        Some(value) => Literal::Int(value),
        None => parse_float(text),
    }
}

pub fn parse_float(text: &str) -> Literal {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let trimmed = cleaned.trim_end_matches(['f', 'F', 'd', 'D', 'l', 'L']);
    Literal::Float(trimmed.parse::<f64>().unwrap_or(f64::NAN))
}

/// Numeric literal that may be either an integer or a float (JS, C)
pub fn parse_number(text: &str) -> Literal {
    let lower = text.to_ascii_lowercase();
    let is_float = !lower.starts_with("0x")
        && (lower.contains('.') || lower.contains('e'));
    if is_float {
        parse_float(text)
    } else {
        parse_int(text)
    }
}

/// String literal contents without quotes; escapes are kept as written
pub fn string_contents(text: &str) -> String {
    let text = text.trim();
    for quote in ["\"\"\"", "\"", "'", "`"] {
        if text.len() >= 2 * quote.len() && text.starts_with(quote) && text.ends_with(quote) {
            return text[quote.len()..text.len() - quote.len()].to_string();
        }
    }
    text.to_string()
}

/// Character literal value; escapes decode to their character
pub fn char_value(text: &str) -> Literal {
    let inner = string_contents(text);
    let value = match inner.as_str() {
        "\\n" => '\n',
        "\\t" => '\t',
        "\\r" => '\r',
        "\\0" => '\0',
        "\\\\" => '\\',
        "\\'" => '\'',
        "\\\"" => '"',
        other => other.chars().next().unwrap_or('\0'),
    };
    Literal::Char(value)
}

// ═══════════════════════════════════════════════════════════════════════════
// Operator lowering
// ═══════════════════════════════════════════════════════════════════════════

/// Target of an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Name(String),
    Member(ValueId, String),
}

impl Target {
    pub fn read(&self, b: &mut SsaBuilder) -> ValueId {
        match self {
            Target::Name(name) => b.read_value(name),
            Target::Member(object, key) => b.read_member_call_value(*object, key),
        }
    }

    pub fn write(&self, b: &mut SsaBuilder, value: ValueId) {
        match self {
            Target::Name(name) => {
                b.assign_to_name(name, value);
            }
            Target::Member(object, key) => {
                b.assign_member(*object, key, value);
            }
        }
    }
}

/// `lhs op rhs`; `&&`, `||` and `??` evaluate `rhs` on one branch only
pub fn lower_binary<'a>(
    b: &mut SsaBuilder,
    op: &str,
    lhs: ValueId,
    rhs: impl FnOnce(&mut SsaBuilder) -> ValueId + 'a,
) -> ValueId {
    match op {
        "&&" => b.emit_conditional("and", lhs, rhs, move |_| lhs),
        "||" | "??" => b.emit_conditional("or", lhs, move |_| lhs, rhs),
        _ => {
            let rhs = rhs(b);
            match BinaryOp::from_token(op) {
                Some(op) => b.emit_binop(op, lhs, rhs),
                None => {
                    b.unsupported("operator", op);
                    b.emit_undefined(op)
                }
            }
        }
    }
}

pub fn lower_unary(b: &mut SsaBuilder, op: &str, operand: ValueId) -> ValueId {
    match UnaryOp::from_token(op) {
        Some(op) => b.emit_unop(op, operand),
        // `void x`, `delete o.k`, `sizeof x`: the operand is evaluated, the result unknown
        None => b.emit_undefined(op),
    }
}

/// `target op= rhs`, rebinding the target
pub fn lower_compound<'a>(
    b: &mut SsaBuilder,
    target: &Target,
    op: &str,
    rhs: impl FnOnce(&mut SsaBuilder) -> ValueId + 'a,
) -> ValueId {
    let current = target.read(b);
    let binary = op.strip_suffix('=').unwrap_or(op);
    let value = lower_binary(b, binary, current, rhs);
    target.write(b, value);
    value
}

/// `++x` / `x--`; postfix forms evaluate to the old value
pub fn lower_update(b: &mut SsaBuilder, target: &Target, increment: bool, prefix: bool) -> ValueId {
    let old = target.read(b);
    let one = b.emit_const(Literal::Int(1));
    let op = if increment { BinaryOp::Add } else { BinaryOp::Sub };
    let new = b.emit_binop(op, old, one);
    target.write(b, new);
    if prefix {
        new
    } else {
        old
    }
}

/// Record every parser error node below `root`
pub fn report_syntax_errors(b: &mut SsaBuilder, root: &Node, source: &str) {
    if !root.has_error() {
        return;
    }
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            b.set_span(node.to_span());
            let text = node_text(&node, source);
            let snippet: String = text.chars().take(60).collect();
            let message = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                format!("syntax error near `{}`", snippet)
            };
            b.diagnose(Severity::Warn, DiagnosticTag::SyntaxError, message);
            continue;
        }
        if node.has_error() {
            for i in (0..node.child_count()).rev() {
                if let Some(child) = node.child(i) {
                    stack.push(child);
                }
            }
        }
    }
}
