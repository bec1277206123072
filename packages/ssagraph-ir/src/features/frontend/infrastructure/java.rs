//! Java frontend
//!
//! Supports: classes / interfaces / enums (blueprints with fields, methods,
//! constructors), lambdas, if / loops / enhanced for / labeled statements,
//! switch statements and expressions (colon and arrow forms, `yield`),
//! try / catch / finally and try-with-resources, package-qualified imports.
//!
//! Bare identifiers that are not locals resolve to fields of the enclosing
//! class (`x` is `this.x`, or the class itself inside static members).

use std::cell::RefCell;

use tree_sitter::{Language as TSLanguage, Node};

use super::common::{
    base_type_name, field_children, find_child_by_kind, lower_binary, lower_compound, lower_unary,
    lower_update, named_children, node_text, operator_text, parse_float, parse_int,
    report_syntax_errors, string_contents, char_value, unwrap_parens, Target,
};
use crate::features::frontend::domain::{ConstructKind, ExprKind};
use crate::features::frontend::ports::{LanguageFrontend, ParsedUnit, SpanExt};
use crate::features::ssa::{
    BinaryOp, FunctionSpec, IfBuilder, ImportRequest, Literal, LoopBuilder, ModuleSpec, ParamSpec,
    SsaBuilder, SwitchBuilder, TryBuilder, Type, ValueId, ValueKind, VariableId,
};
use crate::shared::ports::Language;

/// Java language frontend
pub struct JavaFrontend;

impl JavaFrontend {
    pub fn new() -> Self {
        Self
    }

    /// `package a.b;` of a compilation unit
    fn package_name(unit: &ParsedUnit) -> Option<String> {
        let root = unit.root();
        let package = find_child_by_kind(&root, "package_declaration")?;
        named_children(&package)
            .into_iter()
            .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
            .map(|n| node_text(&n, &unit.source).to_string())
    }
}

impl LanguageFrontend for JavaFrontend {
    fn tree_sitter_language(&self, _path: &str) -> TSLanguage {
        tree_sitter_java::language()
    }

    fn language(&self) -> Language {
        Language::Java
    }

    fn map_construct_kind(&self, ts_kind: &str) -> ConstructKind {
        match ts_kind {
            "block" | "synchronized_statement" | "static_initializer" => ConstructKind::Block,
            "local_variable_declaration" => ConstructKind::VariableDeclaration,
            "expression_statement" => ConstructKind::ExpressionStatement,
            "if_statement" => ConstructKind::If,
            "while_statement" => ConstructKind::While,
            "do_statement" => ConstructKind::DoWhile,
            "for_statement" => ConstructKind::For,
            "enhanced_for_statement" => ConstructKind::ForEach,
            "switch_expression" | "switch_statement" => ConstructKind::Switch,
            "try_statement" | "try_with_resources_statement" => ConstructKind::Try,
            "return_statement" => ConstructKind::Return,
            "break_statement" => ConstructKind::Break,
            "continue_statement" => ConstructKind::Continue,
            "labeled_statement" => ConstructKind::Labeled,
            "throw_statement" => ConstructKind::Throw,
            "yield_statement" => ConstructKind::Yield,
            "class_declaration" | "interface_declaration" | "enum_declaration"
            | "record_declaration" => ConstructKind::ClassDeclaration,
            "import_declaration" => ConstructKind::Import,
            "package_declaration" | "module_declaration" | "annotation_type_declaration"
            | "explicit_constructor_invocation" | "line_comment" | "block_comment" | ";" => {
                ConstructKind::Ignored
            }
            "ERROR" => ConstructKind::Error,
            _ => ConstructKind::Unsupported,
        }
    }

    fn map_expr_kind(&self, ts_kind: &str) -> ExprKind {
        match ts_kind {
            "decimal_integer_literal" | "hex_integer_literal" | "octal_integer_literal"
            | "binary_integer_literal" => ExprKind::Int,
            "decimal_floating_point_literal" | "hex_floating_point_literal" => ExprKind::Float,
            "string_literal" | "text_block" => ExprKind::Str,
            "character_literal" => ExprKind::Char,
            "true" | "false" => ExprKind::Bool,
            "null_literal" => ExprKind::Null,
            "identifier" => ExprKind::Identifier,
            "this" | "super" => ExprKind::This,
            "field_access" => ExprKind::Member,
            "array_access" => ExprKind::Index,
            "method_invocation" => ExprKind::Call,
            "object_creation_expression" => ExprKind::New,
            "binary_expression" | "instanceof_expression" => ExprKind::Binary,
            "unary_expression" => ExprKind::Unary,
            "update_expression" => ExprKind::Update,
            "assignment_expression" => ExprKind::Assignment,
            "ternary_expression" => ExprKind::Ternary,
            "lambda_expression" => ExprKind::Function,
            "array_creation_expression" | "array_initializer" => ExprKind::Array,
            "parenthesized_expression" | "cast_expression" => ExprKind::Wrapped,
            "switch_expression" => ExprKind::Switch,
            "ERROR" => ExprKind::Error,
            _ => ExprKind::Unsupported,
        }
    }

    fn module_spec(&self, unit: &ParsedUnit) -> ModuleSpec {
        let package = Self::package_name(unit);
        let key = match &package {
            Some(package) => format!("{}.{}", package, unit.file_stem()),
            None => unit.file_stem().to_string(),
        };
        ModuleSpec::new(unit.path.clone(), Language::Java)
            .key(key)
            .package(package)
    }

    /// `a.b.C.m` may name class `a.b.C.m` or member `m` of class `a.b.C`
    fn import_candidates(&self, request: &ImportRequest) -> Vec<String> {
        let segments: Vec<&str> = request.path.split('.').collect();
        (1..=segments.len())
            .rev()
            .map(|n| segments[..n].join("."))
            .collect()
    }

    fn build(&self, builder: &mut SsaBuilder, unit: &ParsedUnit) {
        let walker = JavaWalker {
            frontend: self,
            source: &unit.source,
            yields: RefCell::new(Vec::new()),
        };
        walker.compilation_unit(builder, unit.root());
    }
}

/// One switch arm: `case 1, 2:` group or `case 1 ->` rule
struct SwitchArm<'t> {
    values: Vec<Node<'t>>,
    body: Vec<Node<'t>>,
    is_default: bool,
    arrow: bool,
}

struct JavaWalker<'t> {
    frontend: &'t JavaFrontend,
    source: &'t str,
    /// Result variables of the enclosing switch expressions
    yields: RefCell<Vec<VariableId>>,
}

impl<'t> JavaWalker<'t> {
    fn text(&self, node: &Node) -> &'t str {
        node_text(node, self.source)
    }

    fn field_text(&self, node: &Node, field: &str) -> Option<&'t str> {
        node.child_by_field_name(field).map(|n| self.text(&n))
    }

    fn compilation_unit(&self, b: &mut SsaBuilder, root: Node<'t>) {
        report_syntax_errors(b, &root, self.source);
        for child in named_children(&root) {
            match self.frontend.map_construct_kind(child.kind()) {
                ConstructKind::Import => self.import(b, child),
                _ => self.stmt(b, child),
            }
        }
    }

    fn import(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let Some(path_node) = named_children(&node)
            .into_iter()
            .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
        else {
            return;
        };
        let path = self.text(&path_node).to_string();
        let is_static = find_child_by_kind(&node, "static").is_some();
        let wildcard = find_child_by_kind(&node, "asterisk").is_some();

        b.set_span(node.to_span());
        let request = ImportRequest {
            path: path.clone(),
            from_file: b.current_file().map(str::to_string),
            language: Some(Language::Java),
        };
        let key = b.import_module(&request);
        if wildcard {
            return;
        }

        let alias = path.rsplit('.').next().unwrap_or(&path).to_string();
        if is_static {
            if let Some((class, member)) = path.rsplit_once('.') {
                let value = b
                    .program()
                    .class(class)
                    .and_then(|c| c.members.get(member).copied());
                if let Some(value) = value {
                    b.declare_local(&alias, value);
                    return;
                }
            }
        }
        let qualified = key.unwrap_or(path);
        b.bind_import(&alias, Some(&qualified));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════════

    fn statements(&self, b: &mut SsaBuilder, parent: Node<'t>) {
        for child in named_children(&parent) {
            self.stmt(b, child);
        }
    }

    /// Loop / branch body: a block's statements, or a single statement
    fn body(&self, b: &mut SsaBuilder, node: Option<Node<'t>>) {
        match node {
            Some(node) if node.kind() == "block" => self.statements(b, node),
            Some(node) => self.stmt(b, node),
            None => {}
        }
    }

    fn stmt(&self, b: &mut SsaBuilder, node: Node<'t>) {
        b.set_span(node.to_span());
        match self.frontend.map_construct_kind(node.kind()) {
            ConstructKind::Block => b.build_block(|b| {
                for child in named_children(&node) {
                    self.stmt(b, child);
                }
            }),
            ConstructKind::VariableDeclaration => self.local_declaration(b, node),
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
            ConstructKind::Switch => {
                self.switch(b, node, None, None);
            }
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
                let label = find_child_by_kind(&node, "identifier").map(|l| self.text(&l));
                b.emit_break(label);
            }
            ConstructKind::Continue => {
                let label = find_child_by_kind(&node, "identifier").map(|l| self.text(&l));
                b.emit_continue(label);
            }
            ConstructKind::Labeled => self.labeled(b, node),
            ConstructKind::Throw => {
                if let Some(error) = named_children(&node).first() {
                    self.expr(b, *error);
                }
                b.emit_return(Vec::new());
            }
            ConstructKind::Yield => self.yield_value(b, node),
            ConstructKind::ClassDeclaration => self.class(b, node),
            ConstructKind::Import => self.import(b, node),
            ConstructKind::Ignored | ConstructKind::Error => {}
            ConstructKind::FunctionDeclaration
            | ConstructKind::Export
            | ConstructKind::Unsupported => {
                if self.frontend.map_expr_kind(node.kind()) != ExprKind::Unsupported {
                    self.expr(b, node);
                } else if node.kind() == "block" {
                    self.statements(b, node);
                } else {
                    b.unsupported(node.kind(), self.text(&node));
                }
            }
        }
    }

    fn local_declaration(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let ty = self.field_text(&node, "type").map(java_type);
        for declarator in field_children(&node, "declarator") {
            let Some(name) = self.field_text(&declarator, "name") else {
                continue;
            };
            match declarator.child_by_field_name("value") {
                Some(init) => {
                    let value = self.expr(b, init);
                    if let Some(ty) = &ty {
                        if b.program().value(b.resolve(value)).ty.is_none() {
                            b.set_type(value, ty.clone());
                        }
                    }
                    b.declare_local(name, value);
                }
                None => {
                    b.create_variable(name);
                }
            }
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
            match branch.child_by_field_name("alternative") {
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
            "while_statement" => {
                let cond = node.child_by_field_name("condition");
                LoopBuilder::new()
                    .set_condition(move |b| self.condition(b, cond))
                    .set_body(move |b| self.body(b, body))
                    .set_label(label)
                    .build(b);
            }
            "do_statement" => {
                let cond = node.child_by_field_name("condition");
                LoopBuilder::new()
                    .set_condition(move |b| self.condition(b, cond))
                    .set_body(move |b| self.body(b, body))
                    .condition_after_body(true)
                    .set_label(label)
                    .build(b);
            }
            "for_statement" => {
                let init = field_children(&node, "init");
                let update = field_children(&node, "update");
                let mut builder = LoopBuilder::new()
                    .set_first(move |b| {
                        for part in init {
                            if part.kind() == "local_variable_declaration" {
                                self.local_declaration(b, part);
                            } else {
                                self.expr(b, part);
                            }
                        }
                    })
                    .set_third(move |b| {
                        for part in update {
                            self.expr(b, part);
                        }
                    })
                    .set_body(move |b| self.body(b, body))
                    .set_label(label);
                if let Some(cond) = node.child_by_field_name("condition") {
                    builder = builder.set_condition(move |b| self.expr(b, cond));
                }
                builder.build(b);
            }
            "enhanced_for_statement" => {
                let name = self.field_text(&node, "name").unwrap_or("_").to_string();
                let iterable = match node.child_by_field_name("value") {
                    Some(value) => self.expr(b, value),
                    None => b.emit_undefined("iterable"),
                };
                LoopBuilder::for_each(
                    iterable,
                    move |b, item| {
                        b.declare_local(&name, item);
                    },
                    move |b| self.body(b, body),
                )
                .set_label(label)
                .build(b);
            }
            _ => b.unsupported(node.kind(), self.text(&node)),
        }
    }

    fn labeled(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let children = named_children(&node);
        let Some(label) = children.first().map(|l| self.text(l).to_string()) else {
            return;
        };
        let Some(inner) = children.last().copied().filter(|n| n.kind() != "identifier") else {
            return;
        };
        let kind = self.frontend.map_construct_kind(inner.kind());
        if kind.is_loop() {
            self.loop_statement(b, inner, Some(label));
        } else if kind == ConstructKind::Switch {
            self.switch(b, inner, Some(label), None);
        } else {
            b.build_labeled_block(&label, |b| self.stmt(b, inner));
        }
    }

    fn yield_value(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let target = self.yields.borrow().last().copied();
        let Some(target) = target else {
            b.unsupported("yield outside switch expression", self.text(&node));
            return;
        };
        let value = match named_children(&node).first() {
            Some(expr) => self.expr(b, *expr),
            None => b.emit_undefined("yield"),
        };
        b.assign_variable(target, value);
        b.emit_break(None);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // switch
    // ═══════════════════════════════════════════════════════════════════════

    fn switch_arms(&self, block: Node<'t>) -> Vec<SwitchArm<'t>> {
        let mut arms = Vec::new();
        for group in named_children(&block) {
            let arrow = group.kind() == "switch_rule";
            if !arrow && group.kind() != "switch_block_statement_group" {
                continue;
            }
            let mut arm = SwitchArm {
                values: Vec::new(),
                body: Vec::new(),
                is_default: false,
                arrow,
            };
            for child in named_children(&group) {
                if child.kind() == "switch_label" {
                    let values = named_children(&child);
                    if values.is_empty() || self.text(&child).trim_start().starts_with("default") {
                        arm.is_default = true;
                    }
                    arm.values.extend(values);
                } else {
                    arm.body.push(child);
                }
            }
            arms.push(arm);
        }
        arms
    }

    /// Switch statement, or switch expression when `result` is given
    fn switch(
        &self,
        b: &mut SsaBuilder,
        node: Node<'t>,
        label: Option<String>,
        result: Option<VariableId>,
    ) -> Option<ValueId> {
        let cond = node.child_by_field_name("condition");
        let arms = node
            .child_by_field_name("body")
            .map(|block| self.switch_arms(block))
            .unwrap_or_default();
        let arrow = arms.iter().any(|a| a.arrow);

        let mut cases = Vec::new();
        let mut default = None;
        let mut shared_default = None;
        for arm in arms {
            if arm.is_default && arm.values.is_empty() {
                default = Some((cases.len(), arm));
                continue;
            }
            if arm.is_default {
                // `case X, default ->` / `case X: default:` share one body
                shared_default = Some(cases.len());
            }
            cases.push(arm);
        }

        let cases = &cases;
        let mut builder = SwitchBuilder::new()
            .auto_break(arrow)
            .set_label(label)
            .condition(move |b| self.condition(b, cond))
            .case_size(cases.len())
            .set_case(move |b, i| cases[i].values.iter().map(|v| self.expr(b, *v)).collect())
            .set_body(move |b, i| self.arm_body(b, &cases[i], result));
        if let Some((position, arm)) = default {
            builder = builder.set_default(position, move |b| self.arm_body(b, &arm, result));
        }
        if let Some(index) = shared_default {
            builder = builder.default_case(index);
        }

        match result {
            Some(result) => Some(builder.build_value(b, result)),
            None => {
                builder.build(b);
                None
            }
        }
    }

    fn arm_body(&self, b: &mut SsaBuilder, arm: &SwitchArm<'t>, result: Option<VariableId>) {
        for stmt in &arm.body {
            match result {
                Some(result) if arm.arrow && stmt.kind() == "expression_statement" => {
                    if let Some(expr) = named_children(stmt).first() {
                        let value = self.expr(b, *expr);
                        b.assign_variable(result, value);
                    }
                }
                _ => self.stmt(b, *stmt),
            }
        }
    }

    fn switch_value(&self, b: &mut SsaBuilder, node: Node<'t>) -> ValueId {
        let result = b.synthetic_variable("switch");
        self.yields.borrow_mut().push(result);
        let value = self.switch(b, node, None, Some(result));
        self.yields.borrow_mut().pop();
        value.unwrap_or_else(|| b.emit_undefined("switch"))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // try
    // ═══════════════════════════════════════════════════════════════════════

    fn try_statement(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let mut builder = TryBuilder::new();
        if let Some(resources) = node.child_by_field_name("resources") {
            for resource in named_children(&resources) {
                if resource.kind() == "resource" {
                    builder = builder.add_resource(move |b| self.resource(b, resource));
                }
            }
        }
        let body = node.child_by_field_name("body");
        builder = builder.set_try(move |b| self.body(b, body));

        for clause in named_children(&node) {
            match clause.kind() {
                "catch_clause" => {
                    let param = find_child_by_kind(&clause, "catch_formal_parameter");
                    let type_name = param
                        .and_then(|p| find_child_by_kind(&p, "catch_type"))
                        .map(|t| self.text(&t).to_string());
                    let binding = param
                        .and_then(|p| p.child_by_field_name("name"))
                        .map(|n| self.text(&n).to_string());
                    let body = clause.child_by_field_name("body");
                    builder = builder.add_catch(type_name, binding, move |b| self.body(b, body));
                }
                "finally_clause" => {
                    let block = find_child_by_kind(&clause, "block");
                    builder = builder.set_finally(move |b| self.body(b, block));
                }
                _ => {}
            }
        }
        builder.build(b);
    }

    /// `Type name = init` inside `try (...)`; a bare variable is closed as is
    fn resource(&self, b: &mut SsaBuilder, node: Node<'t>) -> Option<ValueId> {
        match (node.child_by_field_name("name"), node.child_by_field_name("value")) {
            (Some(name), Some(init)) => {
                let value = self.expr(b, init);
                b.declare_local(self.text(&name), value);
                Some(value)
            }
            _ => named_children(&node).last().map(|n| self.expr(b, *n)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Classes
    // ═══════════════════════════════════════════════════════════════════════

    fn class(&self, b: &mut SsaBuilder, node: Node<'t>) {
        let Some(name) = self.field_text(&node, "name").map(str::to_string) else {
            return;
        };
        let parent = node
            .child_by_field_name("superclass")
            .and_then(|s| named_children(&s).into_iter().next())
            .map(|t| simple_name(base_type_name(self.text(&t))).to_string());

        b.set_span(node.to_span());
        b.declare_class(&name, parent.as_deref());
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };

        let mut members = Vec::new();
        for member in named_children(&body) {
            if member.kind() == "enum_body_declarations" {
                members.extend(named_children(&member));
            } else {
                members.push(member);
            }
        }

        // Methods are declared before any body is built so calls resolve in any order
        let mut bodies = Vec::new();
        for member in members {
            b.set_span(member.to_span());
            match member.kind() {
                "method_declaration" | "constructor_declaration" => {
                    let is_constructor = member.kind() == "constructor_declaration";
                    let method = if is_constructor {
                        "<init>".to_string()
                    } else {
                        self.field_text(&member, "name").unwrap_or("").to_string()
                    };
                    let mut spec = FunctionSpec::new(format!("{}.{}", name, method))
                        .params(self.params(member))
                        .span(member.to_span());
                    spec = if has_modifier(&member, "static") {
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
                "field_declaration" | "constant_declaration" => {
                    let ty = self.field_text(&member, "type").map(java_type);
                    for declarator in field_children(&member, "declarator") {
                        let Some(field) = self.field_text(&declarator, "name") else {
                            continue;
                        };
                        let value = match declarator.child_by_field_name("value") {
                            Some(init) => self.expr(b, init),
                            None => default_value(b, ty.as_ref()),
                        };
                        b.set_class_member(&name, field, value);
                    }
                }
                "enum_constant" => {
                    if let Some(constant) = self.field_text(&member, "name") {
                        let value = b.emit_new(&name, Vec::new());
                        b.set_class_member(&name, constant, value);
                    }
                }
                "static_initializer" => {
                    if let Some(block) = find_child_by_kind(&member, "block") {
                        b.build_block(|b| self.statements(b, block));
                    }
                }
                "class_declaration" | "interface_declaration" | "enum_declaration"
                | "record_declaration" => self.class(b, member),
                _ => {}
            }
        }

        for (value, body) in bodies {
            b.define_function(value, |b| {
                if let Some(body) = body {
                    self.statements(b, body);
                }
            });
        }
    }

    fn params(&self, node: Node<'t>) -> Vec<ParamSpec> {
        let Some(params) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };
        named_children(&params)
            .into_iter()
            .filter_map(|param| {
                let name = match param.kind() {
                    "formal_parameter" => param.child_by_field_name("name"),
                    "spread_parameter" => find_child_by_kind(&param, "variable_declarator")
                        .and_then(|d| d.child_by_field_name("name")),
                    "identifier" => Some(param),
                    _ => None,
                }?;
                let name = self.text(&name);
                Some(match self.field_text(&param, "type") {
                    Some(ty) => ParamSpec::typed(name, java_type(ty)),
                    None => ParamSpec::new(name),
                })
            })
            .collect()
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
            ExprKind::Int => b.emit_const(parse_int(text)),
            ExprKind::Float => b.emit_const(parse_float(text)),
            ExprKind::Str => b.emit_const(Literal::Str(string_contents(text))),
            ExprKind::Char => b.emit_const(char_value(text)),
            ExprKind::Bool => b.emit_const(Literal::Bool(text == "true")),
            ExprKind::Null => b.emit_const(Literal::Null),
            ExprKind::Identifier => self.identifier(b, text),
            ExprKind::This => b.read_value("this"),
            ExprKind::Member => {
                let object = self.opt_expr(b, node.child_by_field_name("object"));
                let field = self.field_text(&node, "field").unwrap_or("");
                b.set_span(span);
                b.read_member_call_value(object, field)
            }
            ExprKind::Index => {
                let array = self.opt_expr(b, node.child_by_field_name("array"));
                let key = self.index_key(b, node.child_by_field_name("index"));
                b.set_span(span);
                b.read_member_call_value(array, &key)
            }
            ExprKind::Call => self.call(b, node),
            ExprKind::New => {
                let class = self
                    .field_text(&node, "type")
                    .map(|t| simple_name(base_type_name(t)).to_string())
                    .unwrap_or_default();
                let args = self.arguments(b, node.child_by_field_name("arguments"));
                if find_child_by_kind(&node, "class_body").is_some() {
                    b.unsupported("anonymous class body", text);
                }
                b.set_span(span);
                b.emit_new(&class, args)
            }
            ExprKind::Binary if node.kind() == "instanceof_expression" => {
                let lhs = self.opt_expr(b, node.child_by_field_name("left"));
                let ty = self.field_text(&node, "right").unwrap_or("").to_string();
                let rhs = b.emit_const(Literal::Str(ty));
                b.set_span(span);
                b.emit_binop(BinaryOp::InstanceOf, lhs, rhs)
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
                let operand = self.opt_expr(b, node.child_by_field_name("operand"));
                let op = operator_text(&node, self.source).unwrap_or("");
                b.set_span(span);
                lower_unary(b, op, operand)
            }
            ExprKind::Update => {
                let Some(operand) = named_children(&node).into_iter().next() else {
                    return b.emit_undefined(text);
                };
                let prefix = node.child(0).is_some_and(|c| !c.is_named());
                let increment = text.contains("++");
                let target = self.target(b, operand);
                b.set_span(span);
                lower_update(b, &target, increment, prefix)
            }
            ExprKind::Assignment | ExprKind::CompoundAssignment => {
                let Some(left) = node.child_by_field_name("left") else {
                    return b.emit_undefined(text);
                };
                let target = self.target(b, left);
                let op = self.field_text(&node, "operator").unwrap_or("=");
                let right = node.child_by_field_name("right");
                if op == "=" {
                    let value = self.opt_expr(b, right);
                    target.write(b, value);
                    value
                } else {
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
            ExprKind::Function => self.lambda(b, node),
            ExprKind::Array => {
                let init = if node.kind() == "array_initializer" {
                    Some(node)
                } else {
                    node.child_by_field_name("value")
                        .or_else(|| find_child_by_kind(&node, "array_initializer"))
                };
                let elements = init
                    .map(|init| {
                        named_children(&init)
                            .into_iter()
                            .map(|e| self.expr(b, e))
                            .collect()
                    })
                    .unwrap_or_default();
                b.set_span(span);
                b.emit_make_slice(elements)
            }
            ExprKind::Wrapped => {
                let inner = match node.kind() {
                    "cast_expression" => node.child_by_field_name("value"),
                    _ => named_children(&node).into_iter().last(),
                };
                self.opt_expr(b, inner)
            }
            ExprKind::Switch => self.switch_value(b, node),
            ExprKind::Object | ExprKind::Sequence => {
                b.unsupported(node.kind(), text);
                b.emit_undefined(text)
            }
            ExprKind::Error => b.emit_undefined(text),
            ExprKind::Unsupported => {
                b.unsupported(node.kind(), text);
                b.emit_undefined(text)
            }
        }
    }

    /// Local, else field of the enclosing class, else symbol / undefined
    fn identifier(&self, b: &mut SsaBuilder, name: &str) -> ValueId {
        if b.lookup_variable(name).is_none() {
            if let Some(class) = b.enclosing_class() {
                if b.has_class_member(&class, name) {
                    let receiver = self.receiver(b, &class);
                    return b.read_member_call_value(receiver, name);
                }
            }
        }
        b.read_value(name)
    }

    /// `this` in instance members, the class blueprint in static ones
    fn receiver(&self, b: &mut SsaBuilder, class: &str) -> ValueId {
        if b.lookup_variable("this").is_some() {
            return b.read_value("this");
        }
        match b.lookup_symbol(class) {
            Some(blueprint) => blueprint,
            None => b.read_value(class),
        }
    }

    fn target(&self, b: &mut SsaBuilder, node: Node<'t>) -> Target {
        match node.kind() {
            "identifier" => {
                let name = self.text(&node);
                if b.lookup_variable(name).is_none() {
                    if let Some(class) = b.enclosing_class() {
                        if b.has_class_member(&class, name) {
                            let receiver = self.receiver(b, &class);
                            return Target::Member(receiver, name.to_string());
                        }
                    }
                }
                Target::Name(name.to_string())
            }
            "field_access" => {
                let object = self.opt_expr(b, node.child_by_field_name("object"));
                let field = self.field_text(&node, "field").unwrap_or("");
                Target::Member(object, field.to_string())
            }
            "array_access" => {
                let array = self.opt_expr(b, node.child_by_field_name("array"));
                let key = self.index_key(b, node.child_by_field_name("index"));
                Target::Member(array, key)
            }
            "parenthesized_expression" => match named_children(&node).into_iter().last() {
                Some(inner) => self.target(b, inner),
                None => Target::Name(self.text(&node).to_string()),
            },
            _ => {
                b.unsupported("assignment target", self.text(&node));
                Target::Name(self.text(&node).to_string())
            }
        }
    }

    /// Member key of `a[i]`: the literal when constant, else the index text
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
        let name = self.field_text(&node, "name").unwrap_or("").to_string();
        match node.child_by_field_name("object") {
            Some(object) => {
                let receiver = self.expr(b, object);
                let args = self.arguments(b, node.child_by_field_name("arguments"));
                b.set_span(span);
                let callee = b.read_member_call_value(receiver, &name);
                b.emit_call(callee, args, Some(receiver), Some(&name))
            }
            None => {
                let receiver = match b.enclosing_class() {
                    Some(class) if b.has_class_member(&class, &name) => {
                        Some(self.receiver(b, &class))
                    }
                    _ => None,
                };
                let args = self.arguments(b, node.child_by_field_name("arguments"));
                b.set_span(span);
                match receiver {
                    Some(receiver) => {
                        let callee = b.read_member_call_value(receiver, &name);
                        b.emit_call(callee, args, Some(receiver), Some(&name))
                    }
                    None => {
                        let callee = b.read_value(&name);
                        b.emit_call(callee, args, None, Some(&name))
                    }
                }
            }
        }
    }

    fn lambda(&self, b: &mut SsaBuilder, node: Node<'t>) -> ValueId {
        let params = match node.child_by_field_name("parameters") {
            Some(p) if p.kind() == "identifier" => vec![ParamSpec::new(self.text(&p))],
            Some(p) if p.kind() == "inferred_parameters" => named_children(&p)
                .into_iter()
                .map(|n| ParamSpec::new(self.text(&n)))
                .collect(),
            Some(_) => self.params(node),
            None => Vec::new(),
        };
        let body = node.child_by_field_name("body");
        b.set_span(node.to_span());
        b.build_function(
            FunctionSpec::new("lambda").params(params).span(node.to_span()),
            move |b| match body {
                Some(body) if body.kind() == "block" => self.statements(b, body),
                Some(expr) => {
                    let value = self.expr(b, expr);
                    b.emit_return(vec![value]);
                }
                None => {}
            },
        )
    }
}

/// Declared type without generic arguments (`Map<K, V>[]` → `Map[]`)
fn java_type(text: &str) -> Type {
    let stripped = match (text.find('<'), text.rfind('>')) {
        (Some(open), Some(close)) if close > open => {
            format!("{}{}", &text[..open], &text[close + 1..])
        }
        _ => text.to_string(),
    };
    Type::from_name(&stripped)
}

/// Last segment of a qualified name (`java.io.File` → `File`)
fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn has_modifier(node: &Node, modifier: &str) -> bool {
    let Some(modifiers) = find_child_by_kind(node, "modifiers") else {
        return false;
    };
    (0..modifiers.child_count())
        .filter_map(|i| modifiers.child(i))
        .any(|c| c.kind() == modifier)
}

/// Value of a field declared without initializer
fn default_value(b: &mut SsaBuilder, ty: Option<&Type>) -> ValueId {
    let literal = match ty {
        Some(Type::Number) => Literal::Int(0),
        Some(Type::Boolean) => Literal::Bool(false),
        _ => Literal::Null,
    };
    b.emit_const(literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_construct_kind() {
        let frontend = JavaFrontend::new();
        assert_eq!(
            frontend.map_construct_kind("enhanced_for_statement"),
            ConstructKind::ForEach
        );
        assert_eq!(
            frontend.map_construct_kind("try_with_resources_statement"),
            ConstructKind::Try
        );
        assert_eq!(frontend.map_construct_kind("assert_statement"), ConstructKind::Unsupported);
    }

    #[test]
    fn test_map_expr_kind() {
        let frontend = JavaFrontend::new();
        assert_eq!(frontend.map_expr_kind("hex_integer_literal"), ExprKind::Int);
        assert_eq!(frontend.map_expr_kind("method_invocation"), ExprKind::Call);
        assert_eq!(frontend.map_expr_kind("method_reference"), ExprKind::Unsupported);
    }

    #[test]
    fn test_module_spec_uses_package() {
        let frontend = JavaFrontend::new();
        let unit = frontend
            .parse("src/a/b/Foo.java", "package a.b;\nclass Foo {}\n")
            .unwrap();
        let spec = frontend.module_spec(&unit);
        assert_eq!(spec.key, "a.b.Foo");
        assert_eq!(spec.package.as_deref(), Some("a.b"));
    }

    #[test]
    fn test_import_candidates_longest_first() {
        let frontend = JavaFrontend::new();
        let request = ImportRequest {
            path: "a.b.C.m".to_string(),
            from_file: None,
            language: Some(Language::Java),
        };
        assert_eq!(
            frontend.import_candidates(&request),
            vec!["a.b.C.m", "a.b.C", "a.b", "a"]
        );
    }

    #[test]
    fn test_java_type_strips_generics() {
        assert_eq!(java_type("List<String>"), Type::Named("List".to_string()));
        assert_eq!(java_type("int"), Type::Number);
        assert_eq!(java_type("String[]"), Type::Slice(Box::new(Type::String)));
    }
}
