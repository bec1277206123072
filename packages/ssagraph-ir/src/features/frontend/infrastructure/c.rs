//! C frontend
//!
//! Functions and file-scope variables are program globals, so calls across
//! translation units resolve by name. `#include "x.h"` builds the matching
//! source file on demand. Pointer dereference is modelled as the `*` member
//! of the pointer value; `goto` is reported as unsupported.

use tree_sitter::{Language as TSLanguage, Node};

use super::common::{
    char_value, find_child_by_kind, lower_binary, lower_compound, lower_unary, lower_update,
    named_children, node_text, operator_text, parse_number, report_syntax_errors, string_contents,
    unwrap_parens, Target,
};
use crate::features::frontend::domain::{ConstructKind, ExprKind};
use crate::features::frontend::ports::{LanguageFrontend, ParsedUnit, SpanExt};
use crate::features::ssa::{
    FunctionSpec, IfBuilder, ImportRequest, Literal, LoopBuilder, ParamSpec, SsaBuilder,
    SwitchBuilder, Type, ValueId, ValueKind,
};
use crate::shared::ports::Language;

/// C language frontend
pub struct CFrontend;

impl CFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageFrontend for CFrontend {
    fn tree_sitter_language(&self, _path: &str) -> TSLanguage {
        tree_sitter_c::language()
    }

    fn language(&self) -> Language {
        Language::C
    }

    fn map_construct_kind(&self, ts_kind: &str) -> ConstructKind {
        match ts_kind {
            "compound_statement" => ConstructKind::Block,
            "declaration" => ConstructKind::VariableDeclaration,
            "expression_statement" => ConstructKind::ExpressionStatement,
            "if_statement" => ConstructKind::If,
            "while_statement" => ConstructKind::While,
            "do_statement" => ConstructKind::DoWhile,
            "for_statement" => ConstructKind::For,
            "switch_statement" => ConstructKind::Switch,
            "return_statement" => ConstructKind::Return,
            "break_statement" => ConstructKind::Break,
            "continue_statement" => ConstructKind::Continue,
            "labeled_statement" => ConstructKind::Labeled,
            "function_definition" => ConstructKind::FunctionDeclaration,
            "preproc_include" => ConstructKind::Import,
            "type_definition" | "struct_specifier" | "union_specifier" | "enum_specifier"
            | "preproc_def" | "preproc_function_def" | "preproc_call" | "comment" | ";" => {
                ConstructKind::Ignored
            }
            "ERROR" => ConstructKind::Error,
            _ => ConstructKind::Unsupported,
        }
    }

    fn map_expr_kind(&self, ts_kind: &str) -> ExprKind {
        match ts_kind {
            "number_literal" => ExprKind::Int,
            "string_literal" | "concatenated_string" => ExprKind::Str,
            "char_literal" => ExprKind::Char,
            "true" | "false" => ExprKind::Bool,
            "null" => ExprKind::Null,
            "identifier" => ExprKind::Identifier,
            "field_expression" => ExprKind::Member,
            "subscript_expression" => ExprKind::Index,
            "call_expression" => ExprKind::Call,
            "binary_expression" => ExprKind::Binary,
            "unary_expression" | "pointer_expression" => ExprKind::Unary,
            "update_expression" => ExprKind::Update,
            "assignment_expression" => ExprKind::Assignment,
            "conditional_expression" => ExprKind::Ternary,
            "initializer_list" => ExprKind::Array,
            "parenthesized_expression" | "cast_expression" | "compound_literal_expression" => {
                ExprKind::Wrapped
            }
            "comma_expression" => ExprKind::Sequence,
            "ERROR" => ExprKind::Error,
            _ => ExprKind::Unsupported,
        }
    }

    /// `#include "util.h"` from `src/main.c` names `src/util.h`, then `src/util.c`
    /// when the project has no such header
    fn import_candidates(&self, request: &ImportRequest) -> Vec<String> {
        let dir = request
            .from_file
            .as_deref()
            .and_then(|f| f.rsplit_once('/').map(|(dir, _)| dir))
            .unwrap_or("");
        let joined = if dir.is_empty() {
            request.path.clone()
        } else {
            format!("{}/{}", dir, request.path)
        };
        match joined.strip_suffix(".h") {
            Some(stem) => vec![joined.clone(), format!("{}.c", stem)],
            None => vec![joined],
        }
    }

    fn build(&self, builder: &mut SsaBuilder, unit: &ParsedUnit) {
        let walker = CWalker {
            frontend: self,
            source: &unit.source,
        };
        walker.translation_unit(builder, unit.root());
    }
}

/// Name and shape of a declarator (`*p`, `a[4]`, `f(int)`)
struct Declared<'t> {
    name: &'t str,
    is_array: bool,
    function: Option<Node<'t>>,
}

struct CWalker<'t> {
    frontend: &'t CFrontend,
    source: &'t str,
}

impl<'t> CWalker<'t> {
    fn text(&self, node: &Node) -> &'t str {
        node_text(node, self.source)
    }

    fn translation_unit(&self, b: &mut SsaBuilder, root: Node<'t>) {
        report_syntax_errors(b, &root, self.source);
        let items = self.top_level_items(root);
        for item in &items {
            self.predeclare(b, *item);
        }
        for item in items {
            self.top_level(b, item);
        }
    }

    /// File-scope items, looking through the taken branch of `#if` / `#ifdef`
    fn top_level_items(&self, parent: Node<'t>) -> Vec<Node<'t>> {
        let branch = parent
            .child_by_field_name("name")
            .or_else(|| parent.child_by_field_name("condition"));
        let alternative = parent.child_by_field_name("alternative");
        let mut items = Vec::new();
        for child in named_children(&parent) {
            if Some(child) == branch || Some(child) == alternative {
                continue;
            }
            match child.kind() {
                "preproc_if" | "preproc_ifdef" => items.extend(self.top_level_items(child)),
                _ => items.push(child),
            }
        }
        items
    }

    /// Create every function up front so calls resolve regardless of order
    fn predeclare(&self, b: &mut SsaBuilder, node: Node<'t>) {
        match node.kind() {
            "function_definition" => {
                if let Some(declared) = node
                    .child_by_field_name("declarator")
                    .and_then(|d| self.declarator(d))
                {
                    self.function_value(b, node, &declared);
                }
            }
            "declaration" => {
                for declarator in self.declarators(node) {
                    if let Some(declared) = self.declarator(declarator) {
                        if declared.function.is_some() && b.peek_value(declared.name).is_none() {
                            self.function_value(b, node, &declared);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Existing global function with no body yet (prototype seen earlier)
    fn undefined_function(&self, b: &mut SsaBuilder, name: &str) -> Option<ValueId> {
        let value = b.peek_value(name)?;
        let resolved = b.resolve(value);
        match &b.program().value(resolved).kind {
            ValueKind::Function { function, .. } if !b.program().function(*function).defined => {
                Some(resolved)
            }
            _ => None,
        }
    }

    fn function_value(&self, b: &mut SsaBuilder, node: Node<'t>, declared: &Declared<'t>) -> ValueId {
        if let Some(existing) = self.undefined_function(b, declared.name) {
            return existing;
        }
        b.set_span(node.to_span());
        let params = declared
            .function
            .map(|f| self.params(f))
            .unwrap_or_default();
        let value = b.declare_function(
            FunctionSpec::new(declared.name)
                .params(params)
                .span(node.to_span()),
        );
        b.declare_global(declared.name, value);
        value
    }

    fn top_level(&self, b: &mut SsaBuilder, node: Node<'t>) {
        b.set_span(node.to_span());
        match node.kind() {
            "function_definition" => self.function_definition(b, node),
            "declaration" => self.declaration(b, node, true),
            "preproc_include" => self.include(b, node),
            "preproc_def" => self.define(b, node),
            "type_definition" | "enum_specifier" => {
                if let Some(enumerators) = find_enumerators(node) {
                    self.enumerators(b, enumerators);
                }
            }
            _ => match self.frontend.map_construct_kind(node.kind()) {
                ConstructKind::Ignored | ConstructKind::Error => {}
                _ => self.stmt(b, node),
            },
        }
    }

    fn include(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let Some(path) = node.child_by_field_name("path") else {
            return;
        };
        // `<stdio.h>` is a system header
        if path.kind() != "string_literal" {
            return;
        }
        let request = ImportRequest {
            path: string_contents(self.text(&path)),
            from_file: b.current_file().map(str::to_string),
            language: Some(Language::C),
        };
        b.import_module(&request);
    }

    /// `#define N 10` binds a global constant; macros with bodies are skipped
    fn define(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.text(&n)) else {
            return;
        };
        let Some(value) = node.child_by_field_name("value") else {
            return;
        };
        let text = self.text(&value).trim();
        let literal = if text.starts_with('"') {
            Literal::Str(string_contents(text))
        } else if text.starts_with(|c: char| c.is_ascii_digit()) {
            parse_number(text)
        } else {
            return;
        };
        let constant = b.emit_const(literal);
        b.declare_global(name, constant);
    }

    /// `enum { A, B = 5, C }` binds A = 0, B = 5, C = 6
    fn enumerators(&self, b: &mut SsaBuilder, list: Node<'t>) {
        let mut next = 0i64;
        for enumerator in named_children(&list) {
            if enumerator.kind() != "enumerator" {
                continue;
            }
            let Some(name) = enumerator.child_by_field_name("name").map(|n| self.text(&n)) else {
                continue;
            };
            let value = match enumerator.child_by_field_name("value") {
                Some(value) => {
                    let value = self.expr(b, value);
                    if let ValueKind::Const(Literal::Int(n)) = &b.program().value(b.resolve(value)).kind {
                        next = *n;
                    }
                    value
                }
                None => b.emit_const(Literal::Int(next)),
            };
            next += 1;
            b.declare_global(name, value);
        }
    }

    fn function_definition(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let Some(declared) = node
            .child_by_field_name("declarator")
            .and_then(|d| self.declarator(d))
        else {
            return;
        };
        let value = self.function_value(b, node, &declared);
        let body = node.child_by_field_name("body");
        b.define_function(value, |b| {
            if let Some(body) = body {
                self.statements(b, body);
            }
        });
    }

    fn params(&self, function_declarator: Node<'t>) -> Vec<ParamSpec> {
        let Some(list) = function_declarator.child_by_field_name("parameters") else {
            return Vec::new();
        };
        named_children(&list)
            .into_iter()
            .filter(|p| p.kind() == "parameter_declaration")
            .filter_map(|param| {
                let declared = self.declarator(param.child_by_field_name("declarator")?)?;
                let ty = param
                    .child_by_field_name("type")
                    .map(|t| c_type(self.text(&t), declared.is_array));
                Some(match ty {
                    Some(ty) => ParamSpec::typed(declared.name, ty),
                    None => ParamSpec::new(declared.name),
                })
            })
            .collect()
    }

    /// Innermost identifier of a declarator chain
    fn declarator(&self, node: Node<'t>) -> Option<Declared<'t>> {
        let mut current = node;
        let mut is_array = false;
        let mut function = None;
        loop {
            match current.kind() {
                "identifier" | "field_identifier" => {
                    return Some(Declared {
                        name: self.text(&current),
                        is_array,
                        function,
                    })
                }
                "init_declarator" | "pointer_declarator" | "parenthesized_declarator"
                | "attributed_declarator" => {}
                "array_declarator" => is_array = true,
                "function_declarator" => {
                    if function.is_none() {
                        function = Some(current);
                    }
                }
                _ => return None,
            }
            current = current
                .child_by_field_name("declarator")
                .or_else(|| named_children(&current).into_iter().next())?;
        }
    }

    fn declarators(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.children_by_field_name("declarator", &mut cursor).collect()
    }

    fn declaration(&self, b: &mut SsaBuilder, node: Node<'t>, file_scope: bool) {
        let type_text = node.child_by_field_name("type").map(|t| self.text(&t));
        for declarator in self.declarators(node) {
            let Some(declared) = self.declarator(declarator) else {
                continue;
            };
            // Prototypes were created by `predeclare`
            if declared.function.is_some() {
                continue;
            }
            b.set_span(declarator.to_span());
            let init = match declarator.kind() {
                "init_declarator" => declarator.child_by_field_name("value"),
                _ => None,
            };
            let value = match init {
                Some(init) => Some(self.expr(b, init)),
                None if declared.is_array => Some(b.emit_make_slice(Vec::new())),
                None => None,
            };
            if let (Some(value), Some(type_text)) = (value, type_text) {
                if b.program().value(b.resolve(value)).ty.is_none() {
                    b.set_type(value, c_type(type_text, declared.is_array));
                }
            }
            match (file_scope, value) {
                (true, Some(value)) => {
                    b.declare_global(declared.name, value);
                }
                (true, None) => {
                    b.global_variable(declared.name);
                }
                (false, Some(value)) => {
                    b.declare_local(declared.name, value);
                }
                (false, None) => {
                    b.create_variable(declared.name);
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════════

    fn statements(&self, b: &mut SsaBuilder, parent: Node<'t>) {
        for child in named_children(&parent) {
            self.stmt(b, child);
        }
    }

    fn body(&self, b: &mut SsaBuilder, node: Option<Node<'t>>) {
        match node {
            Some(node) if node.kind() == "compound_statement" => self.statements(b, node),
            Some(node) => self.stmt(b, node),
            None => {}
        }
    }

    fn stmt(&self, b: &mut SsaBuilder, node: Node<'t>) {
        b.set_span(node.to_span());
        match self.frontend.map_construct_kind(node.kind()) {
            ConstructKind::Block => b.build_block(|b| self.statements(b, node)),
            ConstructKind::VariableDeclaration => self.declaration(b, node, false),
            ConstructKind::ExpressionStatement => {
                for child in named_children(&node) {
                    self.expr(b, child);
                }
            }
            ConstructKind::If => self.if_statement(b, node),
            ConstructKind::While | ConstructKind::DoWhile | ConstructKind::For => {
                self.loop_statement(b, node, None)
            }
            ConstructKind::Switch => self.switch(b, node, None),
            ConstructKind::Return => {
                let results = named_children(&node)
                    .into_iter()
                    .next()
                    .map(|e| vec![self.expr(b, e)])
                    .unwrap_or_default();
                b.set_span(node.to_span());
                b.emit_return(results);
            }
            ConstructKind::Break => {
                b.emit_break(None);
            }
            ConstructKind::Continue => {
                b.emit_continue(None);
            }
            ConstructKind::Labeled => self.labeled(b, node),
            ConstructKind::FunctionDeclaration => {
                // Nested definitions are a GNU extension
                b.unsupported(node.kind(), self.text(&node));
            }
            ConstructKind::Ignored | ConstructKind::Error => {}
            _ => b.unsupported(node.kind(), self.text(&node)),
        }
    }

    fn if_statement(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let mut builder = IfBuilder::new();
        let mut current = Some(node);
        let mut otherwise = None;
        while let Some(branch) = current.take() {
            let cond = branch.child_by_field_name("condition");
            let consequence = branch.child_by_field_name("consequence");
            builder = builder.append_item(
                move |b| self.condition(b, cond),
                move |b| self.body(b, consequence),
            );
            let alternative = branch.child_by_field_name("alternative").and_then(|alt| {
                match alt.kind() {
                    "else_clause" => named_children(&alt).into_iter().next(),
                    _ => Some(alt),
                }
            });
            match alternative {
                Some(alt) if alt.kind() == "if_statement" => current = Some(alt),
                alt => otherwise = alt,
            }
        }
        if let Some(alt) = otherwise {
            builder = builder.set_else(move |b| self.body(b, Some(alt)));
        }
        builder.build(b);
    }

    fn condition(&self, b: &mut SsaBuilder, node: Option<Node<'t>>) -> ValueId {
        match node {
            Some(node) => self.expr(b, unwrap_parens(node)),
            None => b.emit_undefined("condition"),
        }
    }

    fn loop_statement(&self, b: &mut SsaBuilder, node: Node<'t>, label: Option<String>) {
        let body = node.child_by_field_name("body");
        match node.kind() {
            "while_statement" | "do_statement" => {
                let cond = node.child_by_field_name("condition");
                LoopBuilder::new()
                    .set_condition(move |b| self.condition(b, cond))
                    .set_body(move |b| self.body(b, body))
                    .condition_after_body(node.kind() == "do_statement")
                    .set_label(label)
                    .build(b);
            }
            "for_statement" => {
                let init = node.child_by_field_name("initializer");
                let cond = node.child_by_field_name("condition");
                let update = node.child_by_field_name("update");
                let mut builder = LoopBuilder::new()
                    .set_first(move |b| match init {
                        Some(init) if init.kind() == "declaration" => {
                            self.declaration(b, init, false)
                        }
                        Some(init) => {
                            self.expr(b, init);
                        }
                        None => {}
                    })
                    .set_third(move |b| {
                        if let Some(update) = update {
                            self.expr(b, update);
                        }
                    })
                    .set_body(move |b| self.body(b, body))
                    .set_label(label);
                if let Some(cond) = cond {
                    builder = builder.set_condition(move |b| self.expr(b, cond));
                }
                builder.build(b);
            }
            _ => b.unsupported(node.kind(), self.text(&node)),
        }
    }

    /// `label: stmt`; the label is only a `goto` target, so the statement is built as is
    fn labeled(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let inner = named_children(&node)
            .into_iter()
            .find(|n| n.kind() != "statement_identifier");
        if let Some(inner) = inner {
            self.stmt(b, inner);
        }
    }

    fn switch(&self, b: &mut SsaBuilder, node: Node<'t>, label: Option<String>) {
        let cond = node.child_by_field_name("condition");
        let mut cases = Vec::new();
        let mut default = None;
        if let Some(body) = node.child_by_field_name("body") {
            for clause in named_children(&body) {
                if clause.kind() != "case_statement" {
                    continue;
                }
                if clause.child_by_field_name("value").is_some() {
                    cases.push(clause);
                } else {
                    default = Some((cases.len(), clause));
                }
            }
        }

        let cases = &cases;
        let mut builder = SwitchBuilder::new()
            .set_label(label)
            .condition(move |b| self.condition(b, cond))
            .case_size(cases.len())
            .set_case(move |b, i| {
                cases[i]
                    .child_by_field_name("value")
                    .map(|v| vec![self.expr(b, v)])
                    .unwrap_or_default()
            })
            .set_body(move |b, i| self.case_body(b, cases[i]));
        if let Some((position, clause)) = default {
            builder = builder.set_default(position, move |b| self.case_body(b, clause));
        }
        builder.build(b);
    }

    fn case_body(&self, b: &mut SsaBuilder, clause: Node<'t>) {
        let value = clause.child_by_field_name("value");
        for child in named_children(&clause) {
            if Some(child) != value {
                self.stmt(b, child);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════════

    fn opt_expr(&self, b: &mut SsaBuilder, node: Option<Node<'t>>) -> ValueId {
        match node {
            Some(node) => self.expr(b, node),
            None => b.emit_undefined("expression"),
        }
    }

    fn expr(&self, b: &mut SsaBuilder, node: Node<'t>) -> ValueId {
        let span = node.to_span();
        b.set_span(span);
        let text = self.text(&node);
        match self.frontend.map_expr_kind(node.kind()) {
            ExprKind::Int | ExprKind::Float => b.emit_const(parse_number(text)),
            ExprKind::Str if node.kind() == "concatenated_string" => {
                let joined: String = named_children(&node)
                    .iter()
                    .map(|part| string_contents(self.text(part)))
                    .collect();
                b.emit_const(Literal::Str(joined))
            }
            ExprKind::Str => b.emit_const(Literal::Str(string_contents(text))),
            ExprKind::Char => b.emit_const(char_value(text)),
            ExprKind::Bool => b.emit_const(Literal::Bool(text == "true")),
            ExprKind::Null => b.emit_const(Literal::Null),
            ExprKind::Identifier => b.read_value(text),
            ExprKind::Member | ExprKind::Index => {
                let target = self.target(b, node);
                b.set_span(span);
                target.read(b)
            }
            ExprKind::Call => self.call(b, node),
            ExprKind::Binary => {
                let lhs = self.opt_expr(b, node.child_by_field_name("left"));
                let op = operator_text(&node, self.source).unwrap_or("");
                let right = node.child_by_field_name("right");
                lower_binary(b, op, lhs, move |b| {
                    let rhs = self.opt_expr(b, right);
                    b.set_span(span);
                    rhs
                })
            }
            ExprKind::Unary => {
                let op = operator_text(&node, self.source).unwrap_or("");
                if op == "*" {
                    let target = self.target(b, node);
                    b.set_span(span);
                    return target.read(b);
                }
                let operand = self.opt_expr(b, node.child_by_field_name("argument"));
                b.set_span(span);
                lower_unary(b, op, operand)
            }
            ExprKind::Update => {
                let Some(argument) = node.child_by_field_name("argument") else {
                    return b.emit_undefined(text);
                };
                let prefix = node.child(0).is_some_and(|c| !c.is_named());
                let increment = text.contains("++");
                let target = self.target(b, argument);
                b.set_span(span);
                lower_update(b, &target, increment, prefix)
            }
            ExprKind::Assignment => {
                let Some(left) = node.child_by_field_name("left") else {
                    return b.emit_undefined(text);
                };
                let op = operator_text(&node, self.source).unwrap_or("=");
                let right = node.child_by_field_name("right");
                if op == "=" {
                    let value = self.opt_expr(b, right);
                    let target = self.target(b, left);
                    b.set_span(span);
                    target.write(b, value);
                    value
                } else {
                    let target = self.target(b, left);
                    lower_compound(b, &target, op, move |b| {
                        let rhs = self.opt_expr(b, right);
                        b.set_span(span);
                        rhs
                    })
                }
            }
            ExprKind::Ternary => {
                let cond = self.opt_expr(b, node.child_by_field_name("condition"));
                let consequence = node.child_by_field_name("consequence");
                let alternative = node.child_by_field_name("alternative");
                b.emit_conditional(
                    "ternary",
                    cond,
                    move |b| self.opt_expr(b, consequence),
                    move |b| self.opt_expr(b, alternative),
                )
            }
            ExprKind::Array => self.initializer_list(b, node),
            ExprKind::Wrapped => {
                let inner = match node.kind() {
                    "cast_expression" | "compound_literal_expression" => {
                        node.child_by_field_name("value")
                    }
                    _ => named_children(&node).into_iter().last(),
                };
                let value = self.opt_expr(b, inner);
                if let Some(ty) = node.child_by_field_name("type") {
                    let ty = c_type(self.text(&ty), false);
                    if b.program().value(b.resolve(value)).ty.is_none() {
                        b.set_type(value, ty);
                    }
                }
                value
            }
            ExprKind::Sequence => {
                self.opt_expr(b, node.child_by_field_name("left"));
                self.opt_expr(b, node.child_by_field_name("right"))
            }
            ExprKind::Error => b.emit_undefined(text),
            _ => {
                if node.kind() == "sizeof_expression" {
                    return b.emit_undefined(text);
                }
                b.unsupported(node.kind(), text);
                b.emit_undefined(text)
            }
        }
    }

    /// `{1, 2}` is a slice; `{.x = 1}` is an object
    fn initializer_list(&self, b: &mut SsaBuilder, node: Node<'t>) -> ValueId {
        let span = node.to_span();
        let items = named_children(&node);
        let designated = items.iter().any(|i| i.kind() == "initializer_pair");
        if !designated {
            let elements = items.into_iter().map(|e| self.expr(b, e)).collect();
            b.set_span(span);
            return b.emit_make_slice(elements);
        }
        let mut fields = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            match item.kind() {
                "initializer_pair" => {
                    let key = item
                        .child_by_field_name("designator")
                        .map(|d| self.text(&d).trim_start_matches('.').to_string())
                        .unwrap_or_else(|| index.to_string());
                    let value = self.opt_expr(b, item.child_by_field_name("value"));
                    fields.push((key, value));
                }
                _ => {
                    let value = self.expr(b, item);
                    fields.push((index.to_string(), value));
                }
            }
        }
        b.set_span(span);
        b.emit_make_object(None, fields)
    }

    fn target(&self, b: &mut SsaBuilder, node: Node<'t>) -> Target {
        match node.kind() {
            "identifier" => Target::Name(self.text(&node).to_string()),
            "field_expression" => {
                let object = self.opt_expr(b, node.child_by_field_name("argument"));
                let field = node
                    .child_by_field_name("field")
                    .map(|f| self.text(&f))
                    .unwrap_or("");
                Target::Member(object, field.to_string())
            }
            "subscript_expression" => {
                let object = self.opt_expr(b, node.child_by_field_name("argument"));
                let index = node
                    .child_by_field_name("index")
                    .or_else(|| named_children(&node).into_iter().nth(1));
                Target::Member(object, self.index_key(b, index))
            }
            "pointer_expression" => {
                let pointer = self.opt_expr(b, node.child_by_field_name("argument"));
                Target::Member(pointer, "*".to_string())
            }
            "parenthesized_expression" => match named_children(&node).into_iter().next() {
                Some(inner) => self.target(b, inner),
                None => Target::Name(self.text(&node).to_string()),
            },
            _ => {
                b.unsupported("assignment target", self.text(&node));
                Target::Name(self.text(&node).to_string())
            }
        }
    }

    fn index_key(&self, b: &mut SsaBuilder, index: Option<Node<'t>>) -> String {
        let Some(index) = index else {
            return String::new();
        };
        let value = self.expr(b, index);
        match &b.program().value(b.resolve(value)).kind {
            ValueKind::Const(literal) => literal.as_member_key(),
            _ => self.text(&index).to_string(),
        }
    }

    fn call(&self, b: &mut SsaBuilder, node: Node<'t>) -> ValueId {
        let span = node.to_span();
        let Some(function) = node.child_by_field_name("function") else {
            return b.emit_undefined(self.text(&node));
        };
        let (callee, name) = match function.kind() {
            "identifier" => {
                let name = self.text(&function);
                (b.read_value(name), Some(name))
            }
            _ => (self.expr(b, function), None),
        };
        let args = node
            .child_by_field_name("arguments")
            .map(|list| {
                named_children(&list)
                    .into_iter()
                    .map(|arg| self.expr(b, arg))
                    .collect()
            })
            .unwrap_or_default();
        b.set_span(span);
        b.emit_call(callee, args, None, name)
    }
}

/// Enumerator list of an `enum` specifier, possibly inside a typedef
fn find_enumerators<'a>(node: Node<'a>) -> Option<Node<'a>> {
    let specifier = match node.kind() {
        "enum_specifier" => node,
        _ => find_child_by_kind(&node, "enum_specifier")?,
    };
    specifier.child_by_field_name("body")
}

/// Value type for a C declaration (`char *` → string, `int[]` → slice)
fn c_type(text: &str, is_array: bool) -> Type {
    let base = text
        .trim_start_matches("const ")
        .trim_start_matches("unsigned ")
        .trim_start_matches("signed ")
        .trim();
    let element = match base {
        "int" | "long" | "short" | "float" | "double" | "size_t" | "long long" => Type::Number,
        "char" => Type::Number,
        "bool" | "_Bool" => Type::Boolean,
        other => Type::from_name(other),
    };
    if is_array {
        Type::Slice(Box::new(element))
    } else {
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_construct_kind() {
        let frontend = CFrontend::new();
        assert_eq!(frontend.map_construct_kind("for_statement"), ConstructKind::For);
        assert_eq!(frontend.map_construct_kind("preproc_def"), ConstructKind::Ignored);
        assert_eq!(frontend.map_construct_kind("goto_statement"), ConstructKind::Unsupported);
    }

    #[test]
    fn test_import_candidates_prefer_header() {
        let request = ImportRequest {
            path: "util.h".to_string(),
            from_file: Some("src/main.c".to_string()),
            language: Some(Language::C),
        };
        assert_eq!(
            CFrontend::new().import_candidates(&request),
            vec!["src/util.h", "src/util.c"]
        );

        let source = ImportRequest {
            path: "impl.c".to_string(),
            from_file: Some("main.c".to_string()),
            language: Some(Language::C),
        };
        assert_eq!(CFrontend::new().import_candidates(&source), vec!["impl.c"]);
    }

    #[test]
    fn test_c_type() {
        assert_eq!(c_type("int", false), Type::Number);
        assert_eq!(c_type("int", true), Type::Slice(Box::new(Type::Number)));
        assert_eq!(c_type("const unsigned int", false), Type::Number);
    }
}
