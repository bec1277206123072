/*
 * SsaBuilder - single-threaded SSA construction context
 *
 * One builder owns the `Program` under construction plus a stack of
 * function frames (cursor block, lexical scope, jump frames). Nested
 * functions and on-demand module imports push a frame, build, and pop.
 *
 * Language adapters only talk to this type and the structured builders:
 * they never create blocks or edges themselves.
 */

use super::hooks::HookRegistry;
use super::jump::{JumpFrame, PendingExit};
use super::phi::PhiTables;
use crate::config::BuildConfig;
use crate::features::ssa::domain::{
    BasicBlock, BinaryOp, BlockId, Function, FunctionId, Literal, Module, Program, Scope,
    ScopeId, ScopeKind, Terminator, Type, UnaryOp, Value, ValueId, ValueKind, VariableId,
};
use crate::features::ssa::ports::{CallSite, ImportRequest, ModuleLoader};
use crate::shared::models::{Diagnostic, DiagnosticTag, Severity, Span};
use crate::shared::ports::Language;
use ahash::AHashMap;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Declared parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: Option<Type>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
        }
    }

    pub fn typed(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
        }
    }
}

/// Function (or closure / method) about to be declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    pub params: Vec<ParamSpec>,
    /// Methods receive `this` as parameter 0
    pub is_method: bool,
    pub class: Option<String>,
    /// Bind `name` in the current scope to the function value
    pub bind: bool,
    pub span: Span,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            is_method: false,
            class: None,
            bind: false,
            span: Span::zero(),
        }
    }

    pub fn params(mut self, params: Vec<ParamSpec>) -> Self {
        self.params = params;
        self
    }

    pub fn method_of(mut self, class: impl Into<String>) -> Self {
        self.is_method = true;
        self.class = Some(class.into());
        self
    }

    /// Static member of `class`: no receiver
    pub fn static_of(mut self, class: impl Into<String>) -> Self {
        self.is_method = false;
        self.class = Some(class.into());
        self
    }

    pub fn bind(mut self, bind: bool) -> Self {
        self.bind = bind;
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Source file about to be built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    pub path: String,
    pub language: Language,
    pub key: String,
    pub package: Option<String>,
}

impl ModuleSpec {
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        let path = path.into();
        Self {
            key: path.clone(),
            path,
            language,
            package: None,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn package(mut self, package: Option<String>) -> Self {
        self.package = package;
        self
    }
}

/// Per-function construction state
#[derive(Debug)]
pub(crate) struct FunctionFrame {
    pub(crate) function: FunctionId,
    pub(crate) block: BlockId,
    pub(crate) scope: ScopeId,
    pub(crate) span: Span,
    pub(crate) jumps: Vec<JumpFrame>,
    pub(crate) language: Option<Language>,
    pub(crate) module_key: Option<String>,
    pub(crate) package: Option<String>,
    pub(crate) file: Option<String>,
    /// Variables of enclosing functions assigned here
    pub(crate) captured_writes: IndexSet<VariableId>,
    /// Member variables assigned here
    pub(crate) member_writes: IndexSet<VariableId>,
}

pub struct SsaBuilder {
    pub(crate) program: Program,
    pub(crate) config: BuildConfig,
    hooks: Arc<HookRegistry>,
    loader: Option<Box<dyn ModuleLoader>>,
    /// Never empty: index 0 is the `<global>` frame
    pub(crate) frames: Vec<FunctionFrame>,
    pub(crate) phi: PhiTables,
    pub(crate) members: AHashMap<(ValueId, String), VariableId>,
    pending_params: AHashMap<FunctionId, Vec<ParamSpec>>,
    loading: Vec<String>,
}

impl SsaBuilder {
    pub fn new(config: BuildConfig) -> Self {
        let hooks = Arc::new(HookRegistry::from_names(&config.hooks));
        let mut builder = Self {
            program: Program::new(),
            config,
            hooks,
            loader: None,
            frames: Vec::new(),
            phi: PhiTables::default(),
            members: AHashMap::new(),
            pending_params: AHashMap::new(),
            loading: Vec::new(),
        };

        let root = builder.new_function("<global>", None, None, None);
        let entry = builder.program.function(root).entry;
        let scope = builder.program.function(root).scope;
        builder.frames.push(FunctionFrame::new(root, entry, scope));
        builder
    }

    /// Replace the hook registry (shared, built once at start-up)
    pub fn with_hooks(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_loader(mut self, loader: Box<dyn ModuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Close every open frame and hand out the canonical program
    pub fn finish(mut self) -> Program {
        while self.frames.len() > 1 {
            self.diagnose(
                Severity::Warn,
                DiagnosticTag::BuilderMisuse,
                "function frame left open at finish",
            );
            self.close_function_frame();
        }
        self.close_function_frame();
        self.program.canonicalize();
        debug!(
            functions = self.program.functions.len(),
            values = self.program.values().count(),
            diagnostics = self.program.diagnostics.len(),
            "SSA program finished"
        );
        self.program
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Cursor
    // ═══════════════════════════════════════════════════════════════════════

    pub(crate) fn frame(&self) -> &FunctionFrame {
        &self.frames[self.frames.len() - 1]
    }

    pub(crate) fn frame_mut(&mut self) -> &mut FunctionFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn current_block(&self) -> BlockId {
        self.frame().block
    }

    pub fn current_function(&self) -> FunctionId {
        self.frame().function
    }

    pub fn current_scope(&self) -> ScopeId {
        self.frame().scope
    }

    pub fn language(&self) -> Option<Language> {
        self.frame().language
    }

    pub fn current_file(&self) -> Option<&str> {
        self.frame().file.as_deref()
    }

    pub fn current_package(&self) -> Option<&str> {
        self.frame().package.as_deref()
    }

    pub fn current_module_key(&self) -> Option<&str> {
        self.frame().module_key.as_deref()
    }

    /// Source span attached to values emitted from now on
    pub fn set_span(&mut self, span: Span) {
        self.frame_mut().span = span;
    }

    pub fn span(&self) -> Span {
        self.frame().span
    }

    pub(crate) fn switch_to(&mut self, block: BlockId) {
        trace!(block = %block, "switch block");
        self.frame_mut().block = block;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Scopes
    // ═══════════════════════════════════════════════════════════════════════

    pub(crate) fn new_scope(
        &mut self,
        parent: Option<ScopeId>,
        function: FunctionId,
        kind: ScopeKind,
    ) -> ScopeId {
        let id = ScopeId::from_index(self.program.scopes.len());
        let strict = parent.map(|p| self.program.scope(p).strict).unwrap_or(false);
        self.program.scopes.push(Scope {
            id,
            parent,
            function,
            kind,
            bindings: IndexMap::new(),
            strict,
        });
        id
    }

    /// Open a nested block scope
    pub fn enter_scope(&mut self) -> ScopeId {
        let parent = self.current_scope();
        let function = self.current_function();
        let scope = self.new_scope(Some(parent), function, ScopeKind::Block);
        self.frame_mut().scope = scope;
        scope
    }

    /// Return to the parent scope; bindings of the closed scope become unreachable
    pub fn exit_scope(&mut self) {
        let scope = self.current_scope();
        match self.program.scope(scope).parent {
            Some(parent) if self.program.scope(scope).kind == ScopeKind::Block => {
                self.frame_mut().scope = parent;
            }
            _ => self.diagnose(
                Severity::Warn,
                DiagnosticTag::BuilderMisuse,
                "exit_scope called on a function scope",
            ),
        }
    }

    /// Run `body` inside a fresh block scope, in the current basic block
    pub fn build_block(&mut self, body: impl FnOnce(&mut Self)) {
        self.enter_scope();
        body(self);
        self.exit_scope();
    }

    /// Mark the current scope (and scopes opened inside it) strict
    pub fn set_strict(&mut self, strict: bool) {
        let scope = self.current_scope();
        self.program.scope_mut(scope).strict = strict;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Blocks and edges
    // ═══════════════════════════════════════════════════════════════════════

    fn alloc_block(&mut self, function: FunctionId, name: &str, scope: ScopeId) -> BlockId {
        let id = BlockId::from_index(self.program.blocks.len());
        let mut block = BasicBlock::new(id, name, function, scope);
        block.span = if self.frames.is_empty() {
            Span::zero()
        } else {
            self.span()
        };
        self.program.blocks.push(block);
        self.program.function_mut(function).blocks.push(id);
        id
    }

    /// New unsealed block in the current function
    pub(crate) fn new_block(&mut self, name: &str) -> BlockId {
        let function = self.current_function();
        let scope = self.current_scope();
        let id = self.alloc_block(function, name, scope);
        trace!(block = %id, name, "new block");
        id
    }

    pub(crate) fn is_entry(&self, block: BlockId) -> bool {
        let function = self.program.block(block).function;
        self.program.function(function).entry == block
    }

    /// Not the entry and no predecessor: nothing can reach it
    pub(crate) fn is_dead(&self, block: BlockId) -> bool {
        !self.is_entry(block) && self.program.block(block).preds.is_empty()
    }

    /// Whether control can flow out of `block` along a new edge
    pub(crate) fn can_leave(&self, block: BlockId) -> bool {
        !self.program.block(block).is_terminated() && !self.is_dead(block)
    }

    pub fn current_block_reachable(&self) -> bool {
        self.can_leave(self.current_block())
    }

    pub(crate) fn add_edge(&mut self, from: BlockId, to: BlockId) {
        if self.program.block(to).sealed {
            warn!(from = %from, to = %to, "edge into sealed block");
        }
        self.program.block_mut(from).succs.push(to);
        self.program.block_mut(to).preds.push(from);
    }

    pub(crate) fn emit_jump(&mut self, target: BlockId) {
        let current = self.current_block();
        if !self.can_leave(current) {
            return;
        }
        self.program.block_mut(current).terminator = Some(Terminator::Jump(target));
        self.add_edge(current, target);
    }

    pub(crate) fn emit_branch(&mut self, cond: ValueId, then_block: BlockId, else_block: BlockId) {
        let current = self.current_block();
        if !self.can_leave(current) {
            return;
        }
        self.program.block_mut(current).terminator = Some(Terminator::Branch {
            cond,
            then_block,
            else_block,
        });
        self.add_edge(current, then_block);
        self.add_edge(current, else_block);
    }

    pub(crate) fn emit_try_enter(
        &mut self,
        body: BlockId,
        handlers: &[BlockId],
        finally: Option<BlockId>,
    ) {
        let current = self.current_block();
        if !self.can_leave(current) {
            return;
        }
        self.program.block_mut(current).terminator = Some(Terminator::Try {
            body,
            handlers: handlers.to_vec(),
            finally,
        });
        self.add_edge(current, body);
        for handler in handlers {
            self.add_edge(current, *handler);
        }
    }

    /// Block new values go to; code after a terminator lands in a fresh dead block
    pub(crate) fn writable_block(&mut self) -> BlockId {
        let block = self.current_block();
        if !self.program.block(block).is_terminated() {
            return block;
        }
        let dead = self.new_block("unreachable");
        self.program.block_mut(dead).sealed = true;
        self.switch_to(dead);
        self.diagnose(
            Severity::Hint,
            DiagnosticTag::UnreachableCode,
            "unreachable code",
        );
        dead
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Value emission
    // ═══════════════════════════════════════════════════════════════════════

    pub(crate) fn alloc_value(
        &mut self,
        kind: ValueKind,
        ty: Option<Type>,
        block: BlockId,
    ) -> ValueId {
        let id = ValueId::from_index(self.program.values.len());
        let operands = kind.operands();
        let function = self.program.block(block).function;
        self.program.values.push(Value {
            id,
            kind,
            block,
            function,
            ty,
            span: self.span(),
            name: None,
            annotations: Vec::new(),
            users: Vec::new(),
            detached: false,
        });
        for operand in operands {
            let operand = self.program.resolve(operand);
            let users = &mut self.program.value_mut(operand).users;
            if !users.contains(&id) {
                users.push(id);
            }
        }
        id
    }

    /// Append a value to the current block
    pub(crate) fn emit(&mut self, kind: ValueKind, ty: Option<Type>) -> ValueId {
        let block = self.writable_block();
        let id = self.alloc_value(kind, ty, block);
        self.program.block_mut(block).insts.push(id);
        id
    }

    /// Insert a value at the head of `function`'s entry block
    pub(crate) fn emit_in_entry(
        &mut self,
        function: FunctionId,
        kind: ValueKind,
        ty: Option<Type>,
    ) -> ValueId {
        let entry = self.program.function(function).entry;
        let id = self.alloc_value(kind, ty, entry);
        let position = self
            .program
            .block(entry)
            .insts
            .iter()
            .take_while(|v| self.program.value(**v).kind.is_entry_header())
            .count();
        self.program.block_mut(entry).insts.insert(position, id);
        id
    }

    pub fn emit_const(&mut self, literal: Literal) -> ValueId {
        let ty = literal.ty();
        self.emit(ValueKind::Const(literal), Some(ty))
    }

    pub fn emit_binop(&mut self, op: BinaryOp, lhs: ValueId, rhs: ValueId) -> ValueId {
        let ty = if op.is_comparison() {
            Some(Type::Boolean)
        } else {
            None
        };
        self.emit(ValueKind::BinOp { op, lhs, rhs }, ty)
    }

    pub fn emit_unop(&mut self, op: UnaryOp, operand: ValueId) -> ValueId {
        let ty = match op {
            UnaryOp::Not => Some(Type::Boolean),
            UnaryOp::TypeOf => Some(Type::String),
            _ => None,
        };
        self.emit(ValueKind::UnOp { op, operand }, ty)
    }

    pub fn emit_make_object(
        &mut self,
        class: Option<String>,
        fields: Vec<(String, ValueId)>,
    ) -> ValueId {
        let ty = class.as_ref().map(|c| Type::Named(c.clone()));
        let object = self.emit(
            ValueKind::MakeObject {
                class,
                fields: fields.clone(),
            },
            ty,
        );
        for (key, value) in fields {
            self.assign_member(object, &key, value);
        }
        object
    }

    pub fn emit_make_slice(&mut self, elements: Vec<ValueId>) -> ValueId {
        let slice = self.emit(
            ValueKind::MakeSlice {
                elements: elements.clone(),
            },
            Some(Type::Slice(Box::new(Type::Any))),
        );
        for (index, element) in elements.into_iter().enumerate() {
            self.assign_member(slice, &index.to_string(), element);
        }
        slice
    }

    /// Placeholder for an expression that could not be lowered
    pub fn emit_undefined(&mut self, name: impl Into<String>) -> ValueId {
        self.emit(ValueKind::Undefined { name: name.into() }, None)
    }

    /// Emit a call, apply the callee's recorded side effects, run hooks
    pub fn emit_call(
        &mut self,
        callee: ValueId,
        args: Vec<ValueId>,
        receiver: Option<ValueId>,
        method: Option<&str>,
    ) -> ValueId {
        let call = self.emit(
            ValueKind::Call {
                callee,
                args: args.clone(),
                receiver,
            },
            None,
        );
        self.apply_call_side_effects(call, callee, &args, receiver);

        if !self.hooks.is_empty() {
            let site = CallSite {
                call,
                callee,
                method: method.map(str::to_string),
                receiver,
                receiver_name: receiver.map(|r| self.object_name(r)),
                args,
                language: self.language(),
            };
            let hooks = Arc::clone(&self.hooks);
            for hook in hooks.iter() {
                if hook.matches(&site) {
                    trace!(hook = hook.name(), call = %call, "hook matched");
                    hook.on_call(self, &site);
                }
            }
        }
        call
    }

    /// `return results`; control continues at the function's exit block,
    /// through every enclosing finally block first
    pub fn emit_return(&mut self, results: Vec<ValueId>) -> ValueId {
        let ret = self.emit(ValueKind::Return { results }, None);
        self.leave_with_return(ret);
        ret
    }

    /// End the current block with `ret`
    pub(crate) fn leave_with_return(&mut self, ret: ValueId) {
        let current = self.current_block();
        if !self.can_leave(current) {
            return;
        }
        if let Some(finally) = self.finally_frame_after(None) {
            self.route_through_finally(finally, PendingExit::Return(ret));
            return;
        }
        let function = self.current_function();
        let exit = self.program.function(function).exit;
        self.program.block_mut(current).terminator = Some(Terminator::Return(ret));
        self.add_edge(current, exit);
        self.program.function_mut(function).returns.push(ret);
    }

    /// Attach a hook tag to a value
    pub fn annotate(&mut self, value: ValueId, tag: impl Into<String>) {
        let value = self.program.resolve(value);
        let tag = tag.into();
        let annotations = &mut self.program.value_mut(value).annotations;
        if !annotations.contains(&tag) {
            annotations.push(tag);
        }
    }

    pub fn set_type(&mut self, value: ValueId, ty: Type) {
        let value = self.program.resolve(value);
        self.program.value_mut(value).ty = Some(ty);
    }

    /// Current replacement of `value` (trivial phis forward to their operand)
    pub fn resolve(&self, value: ValueId) -> ValueId {
        self.program.resolve(value)
    }

    pub fn render(&self, value: ValueId) -> String {
        self.program.render(value)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Diagnostics
    // ═══════════════════════════════════════════════════════════════════════

    pub fn diagnose(&mut self, severity: Severity, tag: DiagnosticTag, message: impl Into<String>) {
        if !self
            .config
            .diagnostics
            .accepts(severity, self.program.diagnostics.len())
        {
            return;
        }
        let mut diagnostic = Diagnostic::new(severity, tag, message).with_span(self.span());
        if let Some(file) = self.current_file() {
            diagnostic = diagnostic.with_file(file);
        }
        trace!(%diagnostic, "diagnostic");
        self.program.diagnostics.push(diagnostic);
    }

    /// Record a construct the adapter does not lower
    pub fn unsupported(&mut self, construct: &str, text: &str) {
        let severity = if self.config.diagnostics.unsupported_as_error {
            Severity::Error
        } else {
            Severity::Warn
        };
        let snippet: String = text.chars().take(80).collect();
        self.diagnose(
            severity,
            DiagnosticTag::UnsupportedConstruct,
            format!("unsupported {}: {}", construct, snippet),
        );
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Functions and modules
    // ═══════════════════════════════════════════════════════════════════════

    fn new_function(
        &mut self,
        name: &str,
        parent: Option<FunctionId>,
        parent_scope: Option<ScopeId>,
        file: Option<String>,
    ) -> FunctionId {
        let id = FunctionId::from_index(self.program.functions.len());
        let scope = self.new_scope(parent_scope, id, ScopeKind::Function);
        let first_block = BlockId::from_index(self.program.blocks.len());
        self.program.functions.push(Function {
            id,
            name: name.to_string(),
            parent,
            children: Vec::new(),
            params: Vec::new(),
            entry: first_block,
            exit: BlockId::from_index(first_block.index() + 1),
            blocks: Vec::new(),
            scope,
            free_values: Vec::new(),
            side_effects: Vec::new(),
            returns: Vec::new(),
            class: None,
            is_method: false,
            defined: false,
            file,
            span: Span::zero(),
        });
        let entry = self.alloc_block(id, "entry", scope);
        let exit = self.alloc_block(id, "exit", scope);
        debug_assert_eq!(entry, first_block);
        debug_assert_eq!(exit.index(), first_block.index() + 1);
        self.program.block_mut(entry).sealed = true;
        if let Some(parent) = parent {
            self.program.function_mut(parent).children.push(id);
        }
        id
    }

    /// Create a function and its value without building the body
    ///
    /// Lets adapters hoist declarations (JS functions, Java methods) so that
    /// calls appearing before the definition resolve to the function value.
    pub fn declare_function(&mut self, spec: FunctionSpec) -> ValueId {
        let parent = self.current_function();
        let parent_scope = self.current_scope();
        let file = self.frame().file.clone();
        let function = self.new_function(&spec.name, Some(parent), Some(parent_scope), file);
        {
            let record = self.program.function_mut(function);
            record.is_method = spec.is_method;
            record.class = spec.class.clone();
            record.span = spec.span;
        }

        let mut params = Vec::with_capacity(spec.params.len() + 1);
        if spec.is_method {
            let this_ty = spec.class.as_ref().map(|c| Type::Named(c.clone()));
            params.push(ParamSpec {
                name: "this".to_string(),
                ty: this_ty,
            });
        }
        params.extend(spec.params);
        self.pending_params.insert(function, params);

        let value = self.emit(
            ValueKind::Function {
                function,
                name: spec.name.clone(),
            },
            Some(Type::Function),
        );
        if spec.bind {
            let variable = self.create_variable(&spec.name);
            self.assign_variable(variable, value);
        }
        debug!(function = %spec.name, id = %function, "declared function");
        value
    }

    /// Build the body of a function created by [`Self::declare_function`]
    pub fn define_function(&mut self, function_value: ValueId, body: impl FnOnce(&mut Self)) {
        let function_value = self.program.resolve(function_value);
        let function = match self.program.value(function_value).kind {
            ValueKind::Function { function, .. } => function,
            _ => {
                self.diagnose(
                    Severity::Warn,
                    DiagnosticTag::BuilderMisuse,
                    "define_function called with a non-function value",
                );
                return;
            }
        };
        if self.program.function(function).defined {
            self.diagnose(
                Severity::Warn,
                DiagnosticTag::BuilderMisuse,
                "function body defined twice",
            );
            return;
        }

        let (entry, scope, span) = {
            let record = self.program.function(function);
            (record.entry, record.scope, record.span)
        };
        let parent = self.frame();
        let mut frame = FunctionFrame::new(function, entry, scope);
        frame.language = parent.language;
        frame.module_key = parent.module_key.clone();
        frame.package = parent.package.clone();
        frame.file = parent.file.clone();
        frame.span = span;
        self.frames.push(frame);

        let params = self.pending_params.remove(&function).unwrap_or_default();
        for (index, param) in params.into_iter().enumerate() {
            let value = self.emit_in_entry(
                function,
                ValueKind::Parameter {
                    name: param.name.clone(),
                    index,
                },
                param.ty,
            );
            self.program.function_mut(function).params.push(value);
            let variable = self.create_variable(&param.name);
            self.assign_variable(variable, value);
        }

        body(self);
        self.close_function_frame();
    }

    /// Declare and immediately define a function
    pub fn build_function(&mut self, spec: FunctionSpec, body: impl FnOnce(&mut Self)) -> ValueId {
        let value = self.declare_function(spec);
        self.define_function(value, body);
        value
    }

    /// Build one source file; returns its main function
    ///
    /// A module whose key is already built is not rebuilt.
    pub fn build_module(&mut self, spec: ModuleSpec, body: impl FnOnce(&mut Self)) -> FunctionId {
        if let Some(module) = self.program.module_by_key(&spec.key) {
            return module.main;
        }

        let main = self.new_function(&spec.key, None, None, Some(spec.path.clone()));
        self.program.function_mut(main).defined = false;
        self.program.modules.push(Module {
            path: spec.path.clone(),
            language: spec.language,
            key: spec.key.clone(),
            package: spec.package.clone(),
            main,
        });

        let (entry, scope) = {
            let record = self.program.function(main);
            (record.entry, record.scope)
        };
        let mut frame = FunctionFrame::new(main, entry, scope);
        frame.language = Some(spec.language);
        frame.module_key = Some(spec.key.clone());
        frame.package = spec.package.clone();
        frame.file = Some(spec.path.clone());
        self.frames.push(frame);

        debug!(module = %spec.key, language = %spec.language, "building module");
        self.loading.push(spec.key.clone());
        body(self);
        self.loading.retain(|k| k != &spec.key);
        self.close_function_frame();
        main
    }

    /// Whether a module with `key` is being built right now (import cycle)
    pub fn is_loading(&self, key: &str) -> bool {
        self.loading.iter().any(|k| k == key)
    }

    /// Build an imported module on demand; returns its key when it exists
    pub fn import_module(&mut self, request: &ImportRequest) -> Option<String> {
        let mut loader = self.loader.take()?;
        let key = loader.resolve(request);
        let build = match key {
            Some(ref key) if self.program.module_by_key(key).is_none() && !self.is_loading(key) => {
                loader.load(key)
            }
            _ => None,
        };
        self.loader = Some(loader);

        if let Some(build) = build {
            debug!(import = %request.path, "building imported module on demand");
            build(self);
        }
        key
    }

    /// Implicit return, seal what is left, record side effects, pop the frame
    pub(crate) fn close_function_frame(&mut self) {
        let function = self.current_function();
        let current = self.current_block();
        if self.can_leave(current) {
            self.emit_return(Vec::new());
        }

        let blocks = self.program.function(function).blocks.clone();
        let exit = self.program.function(function).exit;
        for block in blocks {
            if block == exit {
                continue;
            }
            if !self.program.block(block).sealed {
                trace!(block = %block, "sealing straggler block");
                self.seal_block(block);
            }
        }
        self.seal_block(exit);
        self.record_side_effects(function, exit);

        self.program.function_mut(function).defined = true;
        if self.frames.len() > 1 || self.frames[0].function == function {
            self.frames.pop();
        }
        trace!(function = %function, "function closed");
    }
}

impl FunctionFrame {
    pub(crate) fn new(function: FunctionId, block: BlockId, scope: ScopeId) -> Self {
        Self {
            function,
            block,
            scope,
            span: Span::zero(),
            jumps: Vec::new(),
            language: None,
            module_key: None,
            package: None,
            file: None,
            captured_writes: IndexSet::new(),
            member_writes: IndexSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> SsaBuilder {
        SsaBuilder::new(BuildConfig::default())
    }

    #[test]
    fn test_emit_after_return_goes_to_dead_block() {
        let mut b = builder();
        b.build_module(ModuleSpec::new("m.js", Language::JavaScript), |b| {
            let one = b.emit_const(Literal::Int(1));
            b.emit_return(vec![one]);
            let two = b.emit_const(Literal::Int(2));
            let block = b.program().value(two).block;
            assert_eq!(b.program().block(block).name, "unreachable");
            assert!(b.is_dead(block));
        });
        let program = b.finish();
        assert!(program
            .diagnostics()
            .iter()
            .any(|d| d.tag == DiagnosticTag::UnreachableCode));
    }

    #[test]
    fn test_function_entry_and_exit() {
        let mut b = builder();
        let mut inner = None;
        b.build_module(ModuleSpec::new("m.js", Language::JavaScript), |b| {
            let f = b.build_function(
                FunctionSpec::new("f").params(vec![ParamSpec::new("x")]).bind(true),
                |b| {
                    let x = b.read_value("x");
                    b.emit_return(vec![x]);
                },
            );
            inner = Some(f);
        });
        let program = b.finish();
        let f = program.function_by_name("f").unwrap();
        assert!(f.defined);
        assert_eq!(f.params.len(), 1);
        assert_eq!(program.render(f.params[0]), "Parameter-x");
        assert_eq!(program.block(f.exit).preds.len(), 1);
        assert_eq!(program.render(inner.unwrap()), "Function-f");
    }

    #[test]
    fn test_module_not_rebuilt() {
        let mut b = builder();
        let first = b.build_module(ModuleSpec::new("a.ts", Language::TypeScript), |_| {});
        let second = b.build_module(ModuleSpec::new("a.ts", Language::TypeScript), |b| {
            b.emit_const(Literal::Int(1));
        });
        assert_eq!(first, second);
        assert_eq!(b.finish().modules().len(), 1);
    }
}
