//! TypeScript / JavaScript frontend
//!
//! One walker for both languages over the tree-sitter-typescript grammars
//! (`.tsx` / `.jsx` use the TSX grammar). Type-only declarations are skipped.
//!
//! Supports: function hoisting, `var` / `let` / `const` with destructuring,
//! `"use strict"`, classes, arrow functions and closures, object literals,
//! for / for-in / for-of, labeled statements, switch with fallthrough,
//! try / catch / finally, ES module imports and exports.

use std::cell::RefCell;

use ahash::AHashMap;
use tree_sitter::{Language as TSLanguage, Node};

use super::common::{
    field_children, find_child_by_kind, lower_binary, lower_compound, lower_unary, lower_update,
    named_children, node_text, operator_text, parse_number, report_syntax_errors, string_contents,
    unwrap_parens, Target,
};
use crate::features::frontend::domain::{ConstructKind, ExprKind};
use crate::features::frontend::ports::{LanguageFrontend, ParsedUnit, SpanExt};
use crate::features::ssa::{
    BinaryOp, FunctionSpec, IfBuilder, ImportRequest, Literal, LoopBuilder, ModuleSpec, ParamSpec,
    SsaBuilder, SwitchBuilder, TryBuilder, Type, ValueId, ValueKind,
};
use crate::shared::ports::Language;

/// TypeScript / JavaScript language frontend
pub struct TypeScriptFrontend {
    language: Language,
}

impl TypeScriptFrontend {
    pub fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
        }
    }

    pub fn javascript() -> Self {
        Self {
            language: Language::JavaScript,
        }
    }
}

impl LanguageFrontend for TypeScriptFrontend {
    fn tree_sitter_language(&self, path: &str) -> TSLanguage {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".tsx") || lower.ends_with(".jsx") {
            tree_sitter_typescript::language_tsx()
        } else {
            tree_sitter_typescript::language_typescript()
        }
    }

    fn language(&self) -> Language {
        self.language
    }

    fn map_construct_kind(&self, ts_kind: &str) -> ConstructKind {
        match ts_kind {
            "statement_block" | "class_static_block" => ConstructKind::Block,
            "lexical_declaration" | "variable_declaration" => ConstructKind::VariableDeclaration,
            "expression_statement" => ConstructKind::ExpressionStatement,
            "if_statement" => ConstructKind::If,
            "while_statement" => ConstructKind::While,
            "do_statement" => ConstructKind::DoWhile,
            "for_statement" => ConstructKind::For,
            "for_in_statement" => ConstructKind::ForEach,
            "switch_statement" => ConstructKind::Switch,
            "try_statement" => ConstructKind::Try,
            "return_statement" => ConstructKind::Return,
            "break_statement" => ConstructKind::Break,
            "continue_statement" => ConstructKind::Continue,
            "labeled_statement" => ConstructKind::Labeled,
            "throw_statement" => ConstructKind::Throw,
            "function_declaration" | "generator_function_declaration" => {
                ConstructKind::FunctionDeclaration
            }
            "class_declaration" | "abstract_class_declaration" => ConstructKind::ClassDeclaration,
            "import_statement" => ConstructKind::Import,
            "export_statement" => ConstructKind::Export,
            "interface_declaration" | "type_alias_declaration" | "ambient_declaration"
            | "function_signature" | "empty_statement" | "debugger_statement" | "comment"
            | "hash_bang_line" => ConstructKind::Ignored,
            "ERROR" => ConstructKind::Error,
            _ => ConstructKind::Unsupported,
        }
    }

    fn map_expr_kind(&self, ts_kind: &str) -> ExprKind {
        match ts_kind {
            "number" => ExprKind::Int,
            "string" | "template_string" | "regex" => ExprKind::Str,
            "true" | "false" => ExprKind::Bool,
            "null" | "undefined" => ExprKind::Null,
            "identifier" | "shorthand_property_identifier" => ExprKind::Identifier,
            "this" | "super" => ExprKind::This,
            "member_expression" => ExprKind::Member,
            "subscript_expression" => ExprKind::Index,
            "call_expression" => ExprKind::Call,
            "new_expression" => ExprKind::New,
            "binary_expression" => ExprKind::Binary,
            "unary_expression" => ExprKind::Unary,
            "update_expression" => ExprKind::Update,
            "assignment_expression" => ExprKind::Assignment,
            "augmented_assignment_expression" => ExprKind::CompoundAssignment,
            "ternary_expression" => ExprKind::Ternary,
            "arrow_function" | "function_expression" | "function" | "generator_function" => {
                ExprKind::Function
            }
            "array" => ExprKind::Array,
            "object" => ExprKind::Object,
            "parenthesized_expression" | "as_expression" | "satisfies_expression"
            | "non_null_expression" | "type_assertion" | "await_expression" | "spread_element" => {
                ExprKind::Wrapped
            }
            "sequence_expression" => ExprKind::Sequence,
            "ERROR" => ExprKind::Error,
            _ => ExprKind::Unsupported,
        }
    }

    /// Key is the path without extension; exports are qualified by it
    fn module_spec(&self, unit: &ParsedUnit) -> ModuleSpec {
        let key = strip_extension(&unit.path).to_string();
        ModuleSpec::new(unit.path.clone(), self.language)
            .key(key.clone())
            .package(Some(key))
    }

    /// `./util` from `src/app.ts` names `src/util` or `src/util/index`
    fn import_candidates(&self, request: &ImportRequest) -> Vec<String> {
        let path = &request.path;
        if !(path.starts_with("./") || path.starts_with("../")) {
            return vec![strip_extension(path).to_string()];
        }
        let dir = request
            .from_file
            .as_deref()
            .and_then(|f| f.rsplit_once('/').map(|(dir, _)| dir))
            .unwrap_or("");
        let joined = normalize_path(&format!("{}/{}", dir, path));
        let base = strip_extension(&joined).to_string();
        vec![base.clone(), format!("{}/index", base)]
    }

    fn build(&self, builder: &mut SsaBuilder, unit: &ParsedUnit) {
        let walker = TsWalker {
            frontend: self,
            source: &unit.source,
            hoisted: RefCell::new(AHashMap::new()),
        };
        walker.program(builder, unit.root());
    }
}

fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Resolve `.` and `..` segments (`src/./a/../b` → `src/b`)
fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// How a pattern binds its names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    /// `let` / `const` / parameters / catch
    Block,
    /// `var`
    Function,
    /// Plain assignment
    Assign,
}

struct TsWalker<'t> {
    frontend: &'t TypeScriptFrontend,
    source: &'t str,
    /// Function declarations created ahead of their statement
    hoisted: RefCell<AHashMap<usize, ValueId>>,
}

impl<'t> TsWalker<'t> {
    fn text(&self, node: &Node) -> &'t str {
        node_text(node, self.source)
    }

    fn field_text(&self, node: &Node, field: &str) -> Option<&'t str> {
        node.child_by_field_name(field).map(|n| self.text(&n))
    }

    fn program(&self, b: &mut SsaBuilder, root: Node<'t>) {
        report_syntax_errors(b, &root, self.source);
        self.function_body(b, root);
    }

    /// Statement list of a module or function: directives, hoisting, statements
    fn function_body(&self, b: &mut SsaBuilder, parent: Node<'t>) {
        let children = named_children(&parent);
        if let Some(first) = children.first() {
            if first.kind() == "expression_statement" {
                let directive = named_children(first)
                    .first()
                    .map(|s| s.kind() == "string" && string_contents(self.text(s)) == "use strict")
                    .unwrap_or(false);
                if directive {
                    b.set_strict(true);
                }
            }
        }
        self.statement_list(b, &children);
    }

    fn statement_list(&self, b: &mut SsaBuilder, children: &[Node<'t>]) {
        for child in children {
            let declaration = match child.kind() {
                "export_statement" => child.child_by_field_name("declaration"),
                _ => Some(*child),
            };
            if let Some(declaration) = declaration {
                if self.frontend.map_construct_kind(declaration.kind())
                    == ConstructKind::FunctionDeclaration
                {
                    self.hoist(b, declaration);
                }
            }
        }
        for child in children {
            self.stmt(b, *child);
        }
    }

    fn hoist(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let Some(name) = self.field_text(&node, "name") else {
            return;
        };
        b.set_span(node.to_span());
        let value = b.declare_function(
            FunctionSpec::new(name)
                .params(self.params(node))
                .bind(true)
                .span(node.to_span()),
        );
        self.hoisted.borrow_mut().insert(node.id(), value);
    }

    fn statements(&self, b: &mut SsaBuilder, parent: Node<'t>) {
        let children = named_children(&parent);
        self.statement_list(b, &children);
    }

    fn body(&self, b: &mut SsaBuilder, node: Option<Node<'t>>) {
        match node {
            Some(node) if node.kind() == "statement_block" => self.statements(b, node),
            Some(node) => self.stmt(b, node),
            None => {}
        }
    }

    fn stmt(&self, b: &mut SsaBuilder, node: Node<'t>) {
        b.set_span(node.to_span());
        match self.frontend.map_construct_kind(node.kind()) {
            ConstructKind::Block => b.build_block(|b| self.statements(b, node)),
            ConstructKind::VariableDeclaration => self.declaration(b, node),
            ConstructKind::ExpressionStatement => {
                for child in named_children(&node) {
                    self.expr(b, child);
                }
            }
            ConstructKind::If => self.if_statement(b, node),
            ConstructKind::While
            | ConstructKind::DoWhile
            | ConstructKind::For
            | ConstructKind::ForEach => self.loop_statement(b, node, None),
            ConstructKind::Switch => self.switch(b, node, None),
            ConstructKind::Try => self.try_statement(b, node),
            ConstructKind::Return => {
                let results = named_children(&node)
                    .first()
                    .map(|e| vec![self.expr(b, *e)])
                    .unwrap_or_default();
                b.set_span(node.to_span());
                b.emit_return(results);
            }
            ConstructKind::Break => {
                let label = self.field_text(&node, "label");
                b.emit_break(label);
            }
            ConstructKind::Continue => {
                let label = self.field_text(&node, "label");
                b.emit_continue(label);
            }
            ConstructKind::Labeled => self.labeled(b, node),
            ConstructKind::Throw => {
                if let Some(error) = named_children(&node).first() {
                    self.expr(b, *error);
                }
                b.emit_return(Vec::new());
            }
            ConstructKind::FunctionDeclaration => {
                self.function_declaration(b, node);
            }
            ConstructKind::ClassDeclaration => {
                self.class(b, node);
            }
            ConstructKind::Import => self.import(b, node),
            ConstructKind::Export => self.export(b, node),
            ConstructKind::Ignored | ConstructKind::Error => {}
            ConstructKind::Yield | ConstructKind::Unsupported => {
                b.unsupported(node.kind(), self.text(&node));
            }
        }
    }

    fn declaration(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let binding = if node.kind() == "variable_declaration" {
            Binding::Function
        } else {
            Binding::Block
        };
        for declarator in named_children(&node) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(pattern) = declarator.child_by_field_name("name") else {
                continue;
            };
            match declarator.child_by_field_name("value") {
                Some(init) => {
                    let value = self.expr(b, init);
                    if let Some(ty) = self.annotation(&declarator) {
                        if b.program().value(b.resolve(value)).ty.is_none() {
                            b.set_type(value, ty);
                        }
                    }
                    self.bind_pattern(b, pattern, value, binding);
                }
                None if pattern.kind() == "identifier" => {
                    let name = self.text(&pattern);
                    match binding {
                        Binding::Function => {
                            b.declare_var(name, None);
                        }
                        _ => {
                            b.create_variable(name);
                        }
                    }
                }
                None => b.unsupported("destructuring without initializer", self.text(&declarator)),
            }
        }
    }

    /// `: Type` annotation of a declarator or parameter
    fn annotation(&self, node: &Node<'t>) -> Option<Type> {
        let annotation = node.child_by_field_name("type")?;
        let text = self.text(&annotation).trim_start_matches(':').trim();
        Some(Type::from_name(text))
    }

    fn bind_name(&self, b: &mut SsaBuilder, name: &str, value: ValueId, binding: Binding) {
        match binding {
            Binding::Block => {
                b.declare_local(name, value);
            }
            Binding::Function => {
                b.declare_var(name, Some(value));
            }
            Binding::Assign => {
                b.assign_to_name(name, value);
            }
        }
    }

    /// Bind identifiers of a (possibly destructuring) pattern
    fn bind_pattern(&self, b: &mut SsaBuilder, pattern: Node<'t>, value: ValueId, binding: Binding) {
        match pattern.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                self.bind_name(b, self.text(&pattern), value, binding)
            }
            "object_pattern" => {
                for property in named_children(&pattern) {
                    match property.kind() {
                        "shorthand_property_identifier_pattern" => {
                            let key = self.text(&property);
                            let member = b.read_member_call_value(value, key);
                            self.bind_name(b, key, member, binding);
                        }
                        "pair_pattern" => {
                            let key = property
                                .child_by_field_name("key")
                                .map(|k| string_contents(self.text(&k)))
                                .unwrap_or_default();
                            let member = b.read_member_call_value(value, &key);
                            if let Some(inner) = property.child_by_field_name("value") {
                                self.bind_pattern(b, inner, member, binding);
                            }
                        }
                        "object_assignment_pattern" => {
                            if let Some(left) = property.child_by_field_name("left") {
                                let key = self.text(&left);
                                let member = b.read_member_call_value(value, key);
                                self.bind_pattern(b, left, member, binding);
                            }
                        }
                        _ => b.unsupported(property.kind(), self.text(&property)),
                    }
                }
            }
            "array_pattern" => {
                for (index, element) in named_children(&pattern).into_iter().enumerate() {
                    let member = b.read_member_call_value(value, &index.to_string());
                    self.bind_pattern(b, element, member, binding);
                }
            }
            "assignment_pattern" => {
                if let Some(left) = pattern.child_by_field_name("left") {
                    self.bind_pattern(b, left, value, binding);
                }
            }
            _ => b.unsupported("pattern", self.text(&pattern)),
        }
    }

    fn condition(&self, b: &mut SsaBuilder, node: Option<Node<'t>>) -> ValueId {
        match node {
            Some(node) => self.expr(b, unwrap_parens(node)),
            None => b.emit_undefined("condition"),
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
            let alternative = branch
                .child_by_field_name("alternative")
                .and_then(|clause| named_children(&clause).into_iter().next());
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
                let increment = node.child_by_field_name("increment");
                // `for (;;)`: the condition slot holds an empty statement
                let cond = node
                    .child_by_field_name("condition")
                    .and_then(|c| match c.kind() {
                        "expression_statement" => named_children(&c).into_iter().next(),
                        "empty_statement" => None,
                        _ => Some(c),
                    });
                let mut builder = LoopBuilder::new()
                    .set_first(move |b| {
                        if let Some(init) = init {
                            self.stmt(b, init);
                        }
                    })
                    .set_third(move |b| {
                        if let Some(increment) = increment {
                            self.expr(b, increment);
                        }
                    })
                    .set_body(move |b| self.body(b, body))
                    .set_label(label);
                if let Some(cond) = cond {
                    builder = builder.set_condition(move |b| self.expr(b, cond));
                }
                builder.build(b);
            }
            "for_in_statement" => {
                let left = node.child_by_field_name("left");
                let binding = match self.field_text(&node, "kind") {
                    Some("var") => Binding::Function,
                    Some(_) => Binding::Block,
                    None => Binding::Assign,
                };
                let iterable = match node.child_by_field_name("right") {
                    Some(right) => self.expr(b, right),
                    None => b.emit_undefined("iterable"),
                };
                LoopBuilder::for_each(
                    iterable,
                    move |b, item| {
                        if let Some(left) = left {
                            self.bind_loop_target(b, left, item, binding);
                        }
                    },
                    move |b| self.body(b, body),
                )
                .set_label(label)
                .build(b);
            }
            _ => b.unsupported(node.kind(), self.text(&node)),
        }
    }

    fn bind_loop_target(&self, b: &mut SsaBuilder, left: Node<'t>, item: ValueId, binding: Binding) {
        match left.kind() {
            "member_expression" | "subscript_expression" => {
                let target = self.target(b, left);
                target.write(b, item);
            }
            _ => self.bind_pattern(b, left, item, binding),
        }
    }

    fn labeled(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let Some(label) = self.field_text(&node, "label").map(str::to_string) else {
            return;
        };
        let Some(inner) = node.child_by_field_name("body") else {
            return;
        };
        let kind = self.frontend.map_construct_kind(inner.kind());
        if kind.is_loop() {
            self.loop_statement(b, inner, Some(label));
        } else if kind == ConstructKind::Switch {
            self.switch(b, inner, Some(label));
        } else {
            b.build_labeled_block(&label, |b| self.stmt(b, inner));
        }
    }

    fn switch(&self, b: &mut SsaBuilder, node: Node<'t>, label: Option<String>) {
        let cond = node.child_by_field_name("value");
        let mut cases = Vec::new();
        let mut default = None;
        if let Some(body) = node.child_by_field_name("body") {
            for clause in named_children(&body) {
                match clause.kind() {
                    "switch_case" => cases.push(clause),
                    "switch_default" => default = Some((cases.len(), clause)),
                    _ => {}
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
            .set_body(move |b, i| self.clause_body(b, cases[i]));
        if let Some((position, clause)) = default {
            builder = builder.set_default(position, move |b| self.clause_body(b, clause));
        }
        builder.build(b);
    }

    fn clause_body(&self, b: &mut SsaBuilder, clause: Node<'t>) {
        let body = field_children(&clause, "body");
        self.statement_list(b, &body);
    }

    fn try_statement(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let body = node.child_by_field_name("body");
        let mut builder = TryBuilder::new().set_try(move |b| self.body(b, body));
        if let Some(handler) = node.child_by_field_name("handler") {
            let param = handler.child_by_field_name("parameter");
            let type_name = handler
                .child_by_field_name("type")
                .map(|t| self.text(&t).trim_start_matches(':').trim().to_string());
            // Destructured errors are bound as `error` and unpacked in the handler
            let binding = param.map(|p| match p.kind() {
                "identifier" => self.text(&p).to_string(),
                _ => "error".to_string(),
            });
            let body = handler.child_by_field_name("body");
            builder = builder.add_catch(type_name, binding, move |b| {
                if let Some(pattern) = param.filter(|p| p.kind() != "identifier") {
                    let error = b.read_value("error");
                    self.bind_pattern(b, pattern, error, Binding::Block);
                }
                self.body(b, body);
            });
        }
        if let Some(finalizer) = node.child_by_field_name("finalizer") {
            let body = finalizer.child_by_field_name("body");
            builder = builder.set_finally(move |b| self.body(b, body));
        }
        builder.build(b);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Functions and classes
    // ═══════════════════════════════════════════════════════════════════════

    fn params(&self, node: Node<'t>) -> Vec<ParamSpec> {
        if let Some(single) = node.child_by_field_name("parameter") {
            return vec![ParamSpec::new(self.text(&single))];
        }
        let Some(params) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };
        named_children(&params)
            .into_iter()
            .filter_map(|param| {
                let (name, ty) = match param.kind() {
                    "identifier" => (self.text(&param), None),
                    "required_parameter" | "optional_parameter" => {
                        let pattern = param.child_by_field_name("pattern")?;
                        (self.text(&pattern), self.annotation(&param))
                    }
                    "assignment_pattern" => (self.field_text(&param, "left")?, None),
                    "rest_pattern" => (self.text(&named_children(&param).into_iter().next()?), None),
                    _ => return None,
                };
                Some(match ty {
                    Some(ty) => ParamSpec::typed(name, ty),
                    None => ParamSpec::new(name),
                })
            })
            .collect()
    }

    /// Body of a function, method or arrow; expression bodies return their value
    fn define(&self, b: &mut SsaBuilder, value: ValueId, body: Option<Node<'t>>) {
        b.define_function(value, |b| match body {
            Some(body) if body.kind() == "statement_block" => self.function_body(b, body),
            Some(expr) => {
                let result = self.expr(b, expr);
                b.emit_return(vec![result]);
            }
            None => {}
        });
    }

    fn function_declaration(&self, b: &mut SsaBuilder, node: Node<'t>) -> Option<ValueId> {
        let hoisted = self.hoisted.borrow_mut().remove(&node.id());
        let value = match hoisted {
            Some(value) => value,
            None => {
                let name = self.field_text(&node, "name")?;
                b.declare_function(
                    FunctionSpec::new(name)
                        .params(self.params(node))
                        .bind(true)
                        .span(node.to_span()),
                )
            }
        };
        self.define(b, value, node.child_by_field_name("body"));
        Some(value)
    }

    fn function_expression(&self, b: &mut SsaBuilder, node: Node<'t>) -> ValueId {
        let name = self.field_text(&node, "name").unwrap_or("lambda");
        b.set_span(node.to_span());
        let value = b.declare_function(
            FunctionSpec::new(name)
                .params(self.params(node))
                .span(node.to_span()),
        );
        self.define(b, value, node.child_by_field_name("body"));
        value
    }

    fn class(&self, b: &mut SsaBuilder, node: Node<'t>) -> Option<ValueId> {
        let name = self.field_text(&node, "name")?.to_string();
        let parent = find_child_by_kind(&node, "class_heritage")
            .and_then(|h| find_child_by_kind(&h, "extends_clause"))
            .and_then(|e| e.child_by_field_name("value"))
            .map(|v| self.text(&v).to_string());

        b.set_span(node.to_span());
        let class_value = b.declare_class(&name, parent.as_deref());
        let Some(body) = node.child_by_field_name("body") else {
            return Some(class_value);
        };

        let mut bodies = Vec::new();
        for member in named_children(&body) {
            b.set_span(member.to_span());
            let is_static = find_child_by_kind(&member, "static").is_some();
            match member.kind() {
                "method_definition" => {
                    let method = self.field_text(&member, "name").unwrap_or("").to_string();
                    let is_constructor = method == "constructor";
                    let mut spec = FunctionSpec::new(format!("{}.{}", name, method))
                        .params(self.params(member))
                        .span(member.to_span());
                    spec = if is_static {
                        spec.static_of(&name)
                    } else {
                        spec.method_of(&name)
                    };
                    let value = b.declare_function(spec);
                    if is_constructor {
                        b.set_class_constructor(&name, value);
                    } else {
                        b.set_class_member(&name, &method, value);
                    }
                    bodies.push((value, member.child_by_field_name("body")));
                }
                "public_field_definition" | "field_definition" => {
                    let field = member
                        .child_by_field_name("name")
                        .or_else(|| member.child_by_field_name("property"))
                        .map(|n| self.text(&n).to_string());
                    let Some(field) = field else {
                        continue;
                    };
                    let value = match member.child_by_field_name("value") {
                        Some(init) => self.expr(b, init),
                        None => b.emit_undefined(format!("{}.{}", name, field)),
                    };
                    b.set_class_member(&name, &field, value);
                }
                "class_static_block" => {
                    if let Some(block) = member.child_by_field_name("body") {
                        b.build_block(|b| self.statements(b, block));
                    }
                }
                _ => {}
            }
        }

        for (value, body) in bodies {
            self.define(b, value, body);
        }
        Some(class_value)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Modules
    // ═══════════════════════════════════════════════════════════════════════

    fn import(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let Some(source) = self.field_text(&node, "source").map(string_contents) else {
            return;
        };
        b.set_span(node.to_span());
        let request = ImportRequest {
            path: source.clone(),
            from_file: b.current_file().map(str::to_string),
            language: Some(self.frontend.language),
        };
        let key = b.import_module(&request);
        let qualify = |name: &str| key.as_ref().map(|k| format!("{}.{}", k, name));

        let Some(clause) = find_child_by_kind(&node, "import_clause") else {
            return;
        };
        for part in named_children(&clause) {
            match part.kind() {
                "identifier" => {
                    b.bind_import(self.text(&part), qualify("default").as_deref());
                }
                "namespace_import" => {
                    let Some(alias) = named_children(&part).into_iter().next() else {
                        continue;
                    };
                    let alias = self.text(&alias);
                    match &key {
                        Some(key) => {
                            let prefix = format!("{}.", key);
                            let fields: Vec<(String, ValueId)> = b
                                .program()
                                .symbols()
                                .filter_map(|(name, value)| {
                                    name.strip_prefix(&prefix)
                                        .map(|member| (member.to_string(), value))
                                })
                                .collect();
                            let namespace = b.emit_make_object(None, fields);
                            b.declare_local(alias, namespace);
                        }
                        None => {
                            b.bind_import(alias, None);
                        }
                    }
                }
                "named_imports" => {
                    for specifier in named_children(&part) {
                        if specifier.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(name) = self.field_text(&specifier, "name") else {
                            continue;
                        };
                        let alias = self.field_text(&specifier, "alias").unwrap_or(name);
                        b.bind_import(alias, qualify(name).as_deref());
                    }
                }
                _ => {}
            }
        }
    }

    fn export(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let is_default = find_child_by_kind(&node, "default").is_some();
        if let Some(declaration) = node.child_by_field_name("declaration") {
            let exported = match self.frontend.map_construct_kind(declaration.kind()) {
                ConstructKind::FunctionDeclaration => self
                    .function_declaration(b, declaration)
                    .map(|v| vec![(self.field_text(&declaration, "name").unwrap_or(""), v)]),
                ConstructKind::ClassDeclaration => self
                    .class(b, declaration)
                    .map(|v| vec![(self.field_text(&declaration, "name").unwrap_or(""), v)]),
                ConstructKind::VariableDeclaration => {
                    self.declaration(b, declaration);
                    let names: Vec<&str> = named_children(&declaration)
                        .into_iter()
                        .filter_map(|d| d.child_by_field_name("name"))
                        .filter(|n| n.kind() == "identifier")
                        .map(|n| self.text(&n))
                        .collect();
                    Some(names.into_iter().map(|n| (n, b.read_value(n))).collect())
                }
                _ => {
                    self.stmt(b, declaration);
                    None
                }
            };
            for (name, value) in exported.unwrap_or_default() {
                if !name.is_empty() {
                    b.register_symbol(name, value);
                }
                if is_default {
                    b.register_symbol("default", value);
                }
            }
            return;
        }

        if let Some(value) = node.child_by_field_name("value") {
            let value = self.expr(b, value);
            b.register_symbol("default", value);
            return;
        }

        if let Some(clause) = find_child_by_kind(&node, "export_clause") {
            for specifier in named_children(&clause) {
                let Some(name) = self.field_text(&specifier, "name") else {
                    continue;
                };
                let alias = self.field_text(&specifier, "alias").unwrap_or(name);
                let value = b.read_value(name);
                b.register_symbol(alias, value);
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
            ExprKind::Str if node.kind() == "template_string" => self.template(b, node),
            ExprKind::Str | ExprKind::Char => b.emit_const(Literal::Str(string_contents(text))),
            ExprKind::Bool => b.emit_const(Literal::Bool(text == "true")),
            ExprKind::Null => b.emit_const(Literal::Null),
            ExprKind::Identifier => b.read_value(text),
            ExprKind::This => b.read_value("this"),
            ExprKind::Member => {
                let object = self.opt_expr(b, node.child_by_field_name("object"));
                let property = self.field_text(&node, "property").unwrap_or("");
                b.set_span(span);
                b.read_member_call_value(object, property)
            }
            ExprKind::Index => {
                let object = self.opt_expr(b, node.child_by_field_name("object"));
                let key = self.index_key(b, node.child_by_field_name("index"));
                b.set_span(span);
                b.read_member_call_value(object, &key)
            }
            ExprKind::Call => self.call(b, node),
            ExprKind::New => {
                let class = node
                    .child_by_field_name("constructor")
                    .map(|c| match c.kind() {
                        "member_expression" => self.field_text(&c, "property").unwrap_or(""),
                        _ => self.text(&c),
                    })
                    .unwrap_or("")
                    .to_string();
                let args = self.arguments(b, node.child_by_field_name("arguments"));
                b.set_span(span);
                b.emit_new(&class, args)
            }
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
                let operand = self.opt_expr(b, node.child_by_field_name("argument"));
                let op = operator_text(&node, self.source).unwrap_or("");
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
                let value = self.opt_expr(b, node.child_by_field_name("right"));
                match left.kind() {
                    "object_pattern" | "array_pattern" => {
                        self.bind_pattern(b, left, value, Binding::Assign)
                    }
                    _ => {
                        let target = self.target(b, left);
                        target.write(b, value);
                    }
                }
                value
            }
            ExprKind::CompoundAssignment => {
                let Some(left) = node.child_by_field_name("left") else {
                    return b.emit_undefined(text);
                };
                let target = self.target(b, left);
                let op = operator_text(&node, self.source).unwrap_or("=");
                let right = node.child_by_field_name("right");
                lower_compound(b, &target, op, move |b| {
                    let rhs = self.opt_expr(b, right);
                    b.set_span(span);
                    rhs
                })
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
            ExprKind::Function => self.function_expression(b, node),
            ExprKind::Array => {
                let elements = named_children(&node)
                    .into_iter()
                    .map(|e| self.expr(b, e))
                    .collect();
                b.set_span(span);
                b.emit_make_slice(elements)
            }
            ExprKind::Object => self.object(b, node),
            ExprKind::Wrapped => {
                let inner = match node.kind() {
                    "as_expression" | "satisfies_expression" | "non_null_expression" => {
                        named_children(&node).into_iter().next()
                    }
                    _ => named_children(&node).into_iter().last(),
                };
                self.opt_expr(b, inner)
            }
            ExprKind::Sequence => {
                let mut last = None;
                for part in named_children(&node) {
                    last = Some(self.expr(b, part));
                }
                last.unwrap_or_else(|| b.emit_undefined(text))
            }
            ExprKind::Error => b.emit_undefined(text),
            ExprKind::Switch | ExprKind::Unsupported => {
                b.unsupported(node.kind(), text);
                b.emit_undefined(text)
            }
        }
    }

    /// `a${x}b` concatenates the literal fragments with each substitution
    fn template(&self, b: &mut SsaBuilder, node: Node<'t>) -> ValueId {
        let span = node.to_span();
        let mut result: Option<ValueId> = None;
        for part in named_children(&node) {
            let value = match part.kind() {
                "template_substitution" => match named_children(&part).into_iter().next() {
                    Some(inner) => self.expr(b, inner),
                    None => continue,
                },
                _ => b.emit_const(Literal::Str(self.text(&part).to_string())),
            };
            b.set_span(span);
            result = Some(match result {
                Some(acc) => b.emit_binop(BinaryOp::Add, acc, value),
                None => value,
            });
        }
        result.unwrap_or_else(|| b.emit_const(Literal::Str(String::new())))
    }

    fn object(&self, b: &mut SsaBuilder, node: Node<'t>) -> ValueId {
        let span = node.to_span();
        let mut fields = Vec::new();
        for property in named_children(&node) {
            match property.kind() {
                "pair" => {
                    let key = property
                        .child_by_field_name("key")
                        .map(|k| self.property_key(&k))
                        .unwrap_or_default();
                    let value = self.opt_expr(b, property.child_by_field_name("value"));
                    fields.push((key, value));
                }
                "shorthand_property_identifier" => {
                    let name = self.text(&property);
                    fields.push((name.to_string(), b.read_value(name)));
                }
                "method_definition" => {
                    let name = self.field_text(&property, "name").unwrap_or("lambda");
                    let value = b.declare_function(
                        FunctionSpec::new(name)
                            .params(self.params(property))
                            .span(property.to_span()),
                    );
                    self.define(b, value, property.child_by_field_name("body"));
                    fields.push((name.to_string(), value));
                }
                _ => b.unsupported(property.kind(), self.text(&property)),
            }
        }
        b.set_span(span);
        b.emit_make_object(None, fields)
    }

    /// Key of an object-literal property (`a`, `"a"`, `1`, `[k]`)
    fn property_key(&self, key: &Node<'t>) -> String {
        match key.kind() {
            "computed_property_name" => named_children(key)
                .into_iter()
                .next()
                .map(|inner| string_contents(self.text(&inner)))
                .unwrap_or_default(),
            _ => string_contents(self.text(key)),
        }
    }

    fn target(&self, b: &mut SsaBuilder, node: Node<'t>) -> Target {
        match node.kind() {
            "identifier" => Target::Name(self.text(&node).to_string()),
            "member_expression" => {
                let object = self.opt_expr(b, node.child_by_field_name("object"));
                let property = self.field_text(&node, "property").unwrap_or("");
                Target::Member(object, property.to_string())
            }
            "subscript_expression" => {
                let object = self.opt_expr(b, node.child_by_field_name("object"));
                let key = self.index_key(b, node.child_by_field_name("index"));
                Target::Member(object, key)
            }
            "parenthesized_expression" | "non_null_expression" => {
                match named_children(&node).into_iter().next() {
                    Some(inner) => self.target(b, inner),
                    None => Target::Name(self.text(&node).to_string()),
                }
            }
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

    fn arguments(&self, b: &mut SsaBuilder, node: Option<Node<'t>>) -> Vec<ValueId> {
        node.map(|args| {
            named_children(&args)
                .into_iter()
                .map(|arg| self.expr(b, arg))
                .collect()
        })
        .unwrap_or_default()
    }

    fn call(&self, b: &mut SsaBuilder, node: Node<'t>) -> ValueId {
        let span = node.to_span();
        let Some(function) = node.child_by_field_name("function") else {
            return b.emit_undefined(self.text(&node));
        };
        match function.kind() {
            "member_expression" => {
                let receiver = self.opt_expr(b, function.child_by_field_name("object"));
                let method = self.field_text(&function, "property").unwrap_or("");
                let args = self.arguments(b, node.child_by_field_name("arguments"));
                b.set_span(span);
                let callee = b.read_member_call_value(receiver, method);
                b.emit_call(callee, args, Some(receiver), Some(method))
            }
            "identifier" => {
                let name = self.text(&function);
                let callee = b.read_value(name);
                let args = self.arguments(b, node.child_by_field_name("arguments"));
                b.set_span(span);
                b.emit_call(callee, args, None, Some(name))
            }
            _ => {
                let callee = self.expr(b, function);
                let args = self.arguments(b, node.child_by_field_name("arguments"));
                b.set_span(span);
                b.emit_call(callee, args, None, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_construct_kind() {
        let frontend = TypeScriptFrontend::typescript();
        assert_eq!(frontend.map_construct_kind("for_in_statement"), ConstructKind::ForEach);
        assert_eq!(
            frontend.map_construct_kind("interface_declaration"),
            ConstructKind::Ignored
        );
        assert_eq!(frontend.map_construct_kind("with_statement"), ConstructKind::Unsupported);
    }

    #[test]
    fn test_module_spec_strips_extension() {
        let frontend = TypeScriptFrontend::javascript();
        let unit = frontend.parse("src/util.js", "export const a = 1;").unwrap();
        let spec = frontend.module_spec(&unit);
        assert_eq!(spec.key, "src/util");
        assert_eq!(spec.language, Language::JavaScript);
    }

    #[test]
    fn test_import_candidates_relative() {
        let frontend = TypeScriptFrontend::typescript();
        let request = ImportRequest {
            path: "../lib/db".to_string(),
            from_file: Some("src/app/main.ts".to_string()),
            language: Some(Language::TypeScript),
        };
        assert_eq!(
            frontend.import_candidates(&request),
            vec!["src/lib/db", "src/lib/db/index"]
        );
    }

    #[test]
    fn test_normalize_and_strip() {
        assert_eq!(normalize_path("src/./a/../b"), "src/b");
        assert_eq!(strip_extension("a/b.test.ts"), "a/b.test");
        assert_eq!(strip_extension("a.b/c"), "a.b/c");
    }
}
