//! Variable, member, class and symbol resolution

use super::builder::SsaBuilder;
use crate::config::ScopingMode;
use crate::features::ssa::domain::{
    BlockId, ClassBlueprint, FunctionId, FunctionSideEffect, ScopeId, SideEffectTarget, Type,
    ValueId, ValueKind, Variable, VariableId, VariableKind,
};
use crate::shared::models::{DiagnosticTag, Severity};
use indexmap::IndexMap;
use tracing::{debug, trace};

impl SsaBuilder {
    // ═══════════════════════════════════════════════════════════════════════
    // Variables
    // ═══════════════════════════════════════════════════════════════════════

    pub(crate) fn new_variable(
        &mut self,
        name: &str,
        scope: Option<ScopeId>,
        function: Option<FunctionId>,
        kind: VariableKind,
    ) -> VariableId {
        let id = VariableId::from_index(self.program.variables.len());
        self.program.variables.push(Variable {
            id,
            name: name.to_string(),
            scope,
            function,
            kind,
        });
        if let Some(scope) = scope {
            self.program
                .scope_mut(scope)
                .bindings
                .insert(name.to_string(), id);
        }
        id
    }

    /// Variable named `name` in the current scope, created if absent
    pub fn create_variable(&mut self, name: &str) -> VariableId {
        let scope = self.current_scope();
        if let Some(existing) = self.program.scope(scope).lookup(name) {
            return existing;
        }
        let function = self.current_function();
        self.new_variable(name, Some(scope), Some(function), VariableKind::Local)
    }

    /// Nearest binding of `name` on the scope chain
    pub fn lookup_variable(&self, name: &str) -> Option<VariableId> {
        let mut scope = Some(self.current_scope());
        while let Some(id) = scope {
            let record = self.program.scope(id);
            if let Some(variable) = record.lookup(name) {
                return Some(variable);
            }
            scope = record.parent;
        }
        None
    }

    /// Rebind `variable` to `value` in the current block
    pub fn assign_variable(&mut self, variable: VariableId, value: ValueId) {
        let value = self.program.resolve(value);
        let block = self.writable_block();
        self.write_variable(variable, block, value);

        let record = self.program.variable(variable);
        let name = record.name.clone();
        let kind = record.kind.clone();
        let owner = record.function;
        if self.program.value(value).name.is_none() {
            self.program.value_mut(value).name = Some(name);
        }

        let function = self.current_function();
        match kind {
            VariableKind::Local if owner.is_some_and(|o| o != function) => {
                self.frame_mut().captured_writes.insert(variable);
            }
            VariableKind::Member { .. } => {
                self.frame_mut().member_writes.insert(variable);
            }
            VariableKind::Global => {
                self.program.global_values.insert(variable, value);
            }
            _ => {}
        }
    }

    /// `let name = value`: new binding in the current scope
    pub fn declare_local(&mut self, name: &str, value: ValueId) -> VariableId {
        let scope = self.current_scope();
        let function = self.current_function();
        let variable = self.new_variable(name, Some(scope), Some(function), VariableKind::Local);
        self.assign_variable(variable, value);
        variable
    }

    /// Function-scoped declaration (`var x = v`); re-declaring rebinds
    pub fn declare_var(&mut self, name: &str, value: Option<ValueId>) -> VariableId {
        let function = self.current_function();
        let scope = self.program.function(function).scope;
        let variable = match self.program.scope(scope).lookup(name) {
            Some(existing) => existing,
            None => self.new_variable(name, Some(scope), Some(function), VariableKind::Local),
        };
        if let Some(value) = value {
            self.assign_variable(variable, value);
        }
        variable
    }

    /// Assignment without declaration
    ///
    /// Rebinds the nearest existing binding; otherwise creates one in the
    /// function scope (hoisted) or the current block scope (block / strict).
    pub fn assign_to_name(&mut self, name: &str, value: ValueId) -> VariableId {
        if let Some(variable) = self.lookup_variable(name) {
            self.assign_variable(variable, value);
            return variable;
        }
        if let Some(&global) = self.program.globals.get(name) {
            self.assign_variable(global, value);
            return global;
        }

        let current = self.current_scope();
        let block_scoped =
            self.config.scoping == ScopingMode::Block || self.program.scope(current).strict;
        let function = self.current_function();
        let scope = if block_scoped {
            current
        } else {
            self.program.function(function).scope
        };
        let variable = self.new_variable(name, Some(scope), Some(function), VariableKind::Local);
        self.assign_variable(variable, value);
        variable
    }

    /// Current value of `variable` at the cursor
    pub fn read_variable_value(&mut self, variable: VariableId) -> ValueId {
        let block = self.current_block();
        self.read_variable(variable, block)
    }

    /// Resolve `name`; unresolved names read as `Undefined-<name>`
    pub fn read_value(&mut self, name: &str) -> ValueId {
        if let Some(value) = self.peek_value(name) {
            return value;
        }
        let function = self.current_function();
        let known = self.phi.undefined.contains_key(&(function, name.to_string()));
        let value = self.undefined_value(function, name);
        if !known {
            self.diagnose(
                Severity::Info,
                DiagnosticTag::UndefinedValue,
                format!("undefined value: {}", name),
            );
        }
        value
    }

    /// Like [`Self::read_value`] but `None` when `name` resolves nowhere
    pub fn peek_value(&mut self, name: &str) -> Option<ValueId> {
        if let Some(variable) = self.lookup_variable(name) {
            return Some(self.read_variable_value(variable));
        }
        if let Some(value) = self.lookup_symbol(name) {
            return Some(value);
        }
        if let Some(&global) = self.program.globals.get(name) {
            return Some(self.read_variable_value(global));
        }
        None
    }

    /// Unbound helper variable (ternary / switch-expression results)
    pub fn synthetic_variable(&mut self, name: &str) -> VariableId {
        let function = self.current_function();
        self.new_variable(name, None, Some(function), VariableKind::Synthetic)
    }

    /// Program-lifetime variable, created on first reference
    pub fn global_variable(&mut self, name: &str) -> VariableId {
        if let Some(&existing) = self.program.globals.get(name) {
            return existing;
        }
        let variable = self.new_variable(name, None, None, VariableKind::Global);
        self.program.globals.insert(name.to_string(), variable);
        variable
    }

    pub fn declare_global(&mut self, name: &str, value: ValueId) -> VariableId {
        let variable = self.global_variable(name);
        self.assign_variable(variable, value);
        variable
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Members
    // ═══════════════════════════════════════════════════════════════════════

    /// Display name of an object value (`o`, `this`, `Foo`)
    pub(crate) fn object_name(&self, object: ValueId) -> String {
        let value = self.program.value(self.program.resolve(object));
        if let Some(name) = &value.name {
            return name.clone();
        }
        match &value.kind {
            ValueKind::Parameter { name, .. }
            | ValueKind::FreeValue { name, .. }
            | ValueKind::Undefined { name }
            | ValueKind::Function { name, .. } => name.clone(),
            ValueKind::MakeObject {
                class: Some(class), ..
            } => class.clone(),
            _ => value.id.to_string(),
        }
    }

    /// Member slot `object.key`; reads and writes go through phi resolution
    pub fn create_member_call_variable(&mut self, object: ValueId, key: &str) -> VariableId {
        let object = self.program.resolve(object);
        if let Some(&existing) = self.members.get(&(object, key.to_string())) {
            return existing;
        }
        let name = format!("{}.{}", self.object_name(object), key);
        let owner = self.program.value(object).function;
        let variable = self.new_variable(
            &name,
            None,
            Some(owner),
            VariableKind::Member {
                object,
                key: key.to_string(),
            },
        );
        self.members.insert((object, key.to_string()), variable);
        variable
    }

    pub fn read_member_call_value(&mut self, object: ValueId, key: &str) -> ValueId {
        let variable = self.create_member_call_variable(object, key);
        self.read_variable_value(variable)
    }

    pub fn assign_member(&mut self, object: ValueId, key: &str, value: ValueId) -> VariableId {
        let variable = self.create_member_call_variable(object, key);
        self.assign_variable(variable, value);
        variable
    }

    /// Unassigned member: class blueprint member, else `Undefined-<obj>.<key>`
    pub(crate) fn default_member_value(
        &mut self,
        function: FunctionId,
        object: ValueId,
        key: &str,
        display: &str,
    ) -> ValueId {
        if let Some(class) = self.class_of(object) {
            if let Some(member) = self.class_member(&class, key) {
                return self.program.resolve(member);
            }
        }
        self.undefined_value(function, display)
    }

    /// Class an object value is an instance (or blueprint) of
    fn class_of(&self, object: ValueId) -> Option<String> {
        let value = self.program.value(self.program.resolve(object));
        match &value.kind {
            ValueKind::MakeObject {
                class: Some(class), ..
            } => Some(class.clone()),
            ValueKind::Parameter { index: 0, .. } => {
                let function = self.program.function(value.function);
                if function.is_method {
                    function.class.clone()
                } else {
                    None
                }
            }
            _ => match &value.ty {
                Some(Type::Named(class)) if self.program.class_by_name(class).is_some() => {
                    Some(class.clone())
                }
                _ => None,
            },
        }
    }

    /// Member of `class` or its nearest ancestor defining `key`
    fn class_member(&self, class: &str, key: &str) -> Option<ValueId> {
        let mut current = self.program.class_by_name(class);
        let mut depth = 0;
        while let Some(blueprint) = current {
            if let Some(&member) = blueprint.members.get(key) {
                return Some(member);
            }
            depth += 1;
            if depth > 64 {
                break;
            }
            current = blueprint
                .parent
                .as_deref()
                .and_then(|p| self.program.class_by_name(p));
        }
        None
    }

    /// Whether `class` or one of its ancestors defines `key`
    pub fn has_class_member(&self, class: &str, key: &str) -> bool {
        self.class_member(class, key).is_some()
    }

    /// Class of the nearest enclosing method, walking out of closures
    pub fn enclosing_class(&self) -> Option<String> {
        let mut function = Some(self.current_function());
        while let Some(id) = function {
            let record = self.program.function(id);
            if let Some(class) = &record.class {
                return Some(class.clone());
            }
            function = record.parent;
        }
        None
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Classes and symbols
    // ═══════════════════════════════════════════════════════════════════════

    /// `name` prefixed with the current package, if any
    pub fn qualify(&self, name: &str) -> String {
        match self.current_package() {
            Some(package) if !package.is_empty() => format!("{}.{}", package, name),
            _ => name.to_string(),
        }
    }

    pub fn register_symbol(&mut self, name: &str, value: ValueId) {
        let qualified = self.qualify(name);
        trace!(symbol = %qualified, value = %value, "register symbol");
        self.program.symbols.insert(qualified, value);
    }

    /// Program symbol by exact name, then qualified with the current package
    pub fn lookup_symbol(&self, name: &str) -> Option<ValueId> {
        self.program
            .symbol(name)
            .or_else(|| self.program.symbol(&self.qualify(name)))
            .map(|v| self.program.resolve(v))
    }

    /// Declare a class blueprint and bind its name
    pub fn declare_class(&mut self, name: &str, parent: Option<&str>) -> ValueId {
        let qualified = self.qualify(name);
        let value = self.emit(
            ValueKind::MakeObject {
                class: Some(name.to_string()),
                fields: Vec::new(),
            },
            Some(Type::Named(name.to_string())),
        );
        self.program.classes.insert(
            qualified.clone(),
            ClassBlueprint {
                name: name.to_string(),
                qualified_name: qualified,
                value,
                parent: parent.map(str::to_string),
                members: IndexMap::new(),
                constructor: None,
            },
        );
        self.register_symbol(name, value);
        self.declare_local(name, value);
        debug!(class = %name, "declared class");
        value
    }

    fn blueprint_mut(&mut self, class: &str) -> Option<&mut ClassBlueprint> {
        let key = if self.program.classes.contains_key(class) {
            class.to_string()
        } else {
            self.program
                .classes
                .values()
                .find(|c| c.name == class)?
                .qualified_name
                .clone()
        };
        self.program.classes.get_mut(&key)
    }

    pub fn set_class_member(&mut self, class: &str, key: &str, value: ValueId) {
        let value = self.program.resolve(value);
        match self.blueprint_mut(class) {
            Some(blueprint) => {
                blueprint.members.insert(key.to_string(), value);
            }
            None => self.diagnose(
                Severity::Warn,
                DiagnosticTag::BuilderMisuse,
                format!("member {} set on unknown class {}", key, class),
            ),
        }
    }

    pub fn set_class_constructor(&mut self, class: &str, constructor: ValueId) {
        if let Some(blueprint) = self.blueprint_mut(class) {
            blueprint.constructor = Some(constructor);
        }
    }

    /// `new Class(args)`: instance object plus constructor call
    pub fn emit_new(&mut self, class: &str, args: Vec<ValueId>) -> ValueId {
        let object = self.emit(
            ValueKind::MakeObject {
                class: Some(class.to_string()),
                fields: Vec::new(),
            },
            Some(Type::Named(class.to_string())),
        );
        let constructor = self
            .program
            .class_by_name(class)
            .and_then(|c| c.constructor);
        if let Some(constructor) = constructor {
            self.emit_call(constructor, args, Some(object), Some(class));
        }
        object
    }

    /// Bind an imported symbol to `alias`; unresolved imports read as undefined
    pub fn bind_import(&mut self, alias: &str, qualified: Option<&str>) -> ValueId {
        let value = qualified
            .and_then(|q| self.program.symbol(q))
            .map(|v| self.program.resolve(v));
        let value = match value {
            Some(value) => value,
            None => {
                self.diagnose(
                    Severity::Info,
                    DiagnosticTag::UnresolvedImport,
                    format!("unresolved import: {}", qualified.unwrap_or(alias)),
                );
                let function = self.current_function();
                self.undefined_value(function, alias)
            }
        };
        self.declare_local(alias, value);
        value
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Side effects
    // ═══════════════════════════════════════════════════════════════════════

    /// Values a finished function leaves in captured variables and members
    pub(crate) fn record_side_effects(&mut self, function: FunctionId, exit: BlockId) {
        if self.current_function() != function || self.is_dead(exit) {
            return;
        }
        let captured: Vec<VariableId> = self.frame().captured_writes.iter().copied().collect();
        let members: Vec<VariableId> = self.frame().member_writes.iter().copied().collect();
        let mut effects = Vec::new();

        for variable in captured {
            let value = self.read_variable(variable, exit);
            if matches!(self.program.value(value).kind, ValueKind::FreeValue { variable: v, .. } if v == variable)
            {
                continue;
            }
            effects.push(FunctionSideEffect {
                target: SideEffectTarget::Captured(variable),
                value,
                name: self.program.variable(variable).name.clone(),
            });
        }

        for variable in members {
            let (object, key, name) = match &self.program.variable(variable).kind {
                VariableKind::Member { object, key } => (
                    self.program.resolve(*object),
                    key.clone(),
                    self.program.variable(variable).name.clone(),
                ),
                _ => continue,
            };
            let object_value = self.program.value(object);
            if object_value.function != function {
                continue;
            }
            let target = match &object_value.kind {
                ValueKind::Parameter { index, .. } => SideEffectTarget::ParameterMember {
                    index: *index,
                    key,
                },
                ValueKind::FreeValue { variable: captured, .. } => {
                    SideEffectTarget::CapturedMember {
                        variable: *captured,
                        key,
                    }
                }
                _ => continue,
            };
            let value = self.read_variable(variable, exit);
            if self.program.value(value).kind.is_undefined() {
                continue;
            }
            effects.push(FunctionSideEffect {
                target,
                value,
                name,
            });
        }

        if !effects.is_empty() {
            debug!(function = %function, count = effects.len(), "recorded side effects");
        }
        self.program.function_mut(function).side_effects = effects;
    }

    /// Replay a known callee's side effects at `call`
    pub(crate) fn apply_call_side_effects(
        &mut self,
        call: ValueId,
        callee: ValueId,
        args: &[ValueId],
        receiver: Option<ValueId>,
    ) {
        let callee = self.program.resolve(callee);
        let function = match self.program.value(callee).kind {
            ValueKind::Function { function, .. } => function,
            _ => return,
        };
        let record = self.program.function(function);
        if record.side_effects.is_empty() {
            return;
        }
        let effects = record.side_effects.clone();

        // Parameter index -> actual argument; methods take the receiver at 0
        let mut actuals: Vec<Option<ValueId>> = Vec::with_capacity(args.len() + 1);
        if record.is_method {
            actuals.push(receiver);
        }
        actuals.extend(args.iter().copied().map(Some));

        for effect in effects {
            let ty = self.program.value(effect.value).ty.clone();
            match effect.target {
                SideEffectTarget::Captured(variable) => {
                    let value = self.emit(
                        ValueKind::SideEffect {
                            value: effect.value,
                            target: effect.name.clone(),
                            call,
                        },
                        ty,
                    );
                    self.assign_variable(variable, value);
                }
                SideEffectTarget::ParameterMember { index, key } => {
                    let Some(Some(object)) = actuals.get(index).copied() else {
                        continue;
                    };
                    let target = format!("{}.{}", self.object_name(object), key);
                    let value = self.emit(
                        ValueKind::SideEffect {
                            value: effect.value,
                            target,
                            call,
                        },
                        ty,
                    );
                    self.assign_member(object, &key, value);
                }
                SideEffectTarget::CapturedMember { variable, key } => {
                    let object = self.read_variable_value(variable);
                    let target = format!("{}.{}", self.object_name(object), key);
                    let value = self.emit(
                        ValueKind::SideEffect {
                            value: effect.value,
                            target,
                            call,
                        },
                        ty,
                    );
                    self.assign_member(object, &key, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::features::ssa::domain::Literal;
    use crate::features::ssa::infrastructure::{FunctionSpec, ModuleSpec};
    use crate::shared::ports::Language;

    fn module(body: impl FnOnce(&mut SsaBuilder)) -> crate::features::ssa::domain::Program {
        let mut b = SsaBuilder::new(BuildConfig::default());
        b.build_module(ModuleSpec::new("t.js", Language::JavaScript), body);
        b.finish()
    }

    #[test]
    fn test_read_unknown_name_is_undefined_with_one_diagnostic() {
        let mut seen = Vec::new();
        let program = module(|b| {
            seen.push(b.read_value("x"));
            seen.push(b.read_value("x"));
        });
        assert_eq!(seen[0], seen[1]);
        assert_eq!(program.render(seen[0]), "Undefined-x");
        let undefined: Vec<_> = program
            .diagnostics()
            .iter()
            .filter(|d| d.tag == DiagnosticTag::UndefinedValue)
            .collect();
        assert_eq!(undefined.len(), 1);
    }

    #[test]
    fn test_peek_value_records_nothing() {
        let mut peeked = Some(ValueId::from_index(0));
        let program = module(|b| peeked = b.peek_value("nothing"));
        assert!(peeked.is_none());
        assert!(program.diagnostics().is_empty());
    }

    #[test]
    fn test_inner_scope_shadow() {
        let mut seen = Vec::new();
        let program = module(|b| {
            let one = b.emit_const(Literal::Int(1));
            b.declare_local("a", one);
            b.build_block(|b| {
                let two = b.emit_const(Literal::Int(2));
                b.declare_local("a", two);
                seen.push(b.read_value("a"));
            });
            seen.push(b.read_value("a"));
        });
        let rendered: Vec<String> = seen.iter().map(|v| program.render(*v)).collect();
        assert_eq!(rendered, vec!["2", "1"]);
    }

    #[test]
    fn test_closure_capture_is_free_value() {
        let mut inner = None;
        let program = module(|b| {
            let one = b.emit_const(Literal::Int(1));
            b.declare_local("a", one);
            b.build_function(FunctionSpec::new("f").bind(true), |b| {
                inner = Some(b.read_value("a"));
            });
        });
        assert_eq!(program.render(inner.unwrap()), "FreeValue-a");
        let f = program.function_by_name("f").unwrap();
        assert_eq!(f.free_values.len(), 1);
    }

    #[test]
    fn test_captured_write_becomes_side_effect_at_call() {
        let mut after = None;
        let program = module(|b| {
            let one = b.emit_const(Literal::Int(1));
            b.declare_local("a", one);
            b.build_function(FunctionSpec::new("f").bind(true), |b| {
                let two = b.emit_const(Literal::Int(2));
                b.assign_to_name("a", two);
            });
            let f = b.read_value("f");
            b.emit_call(f, vec![], None, Some("f"));
            after = Some(b.read_value("a"));
        });
        assert_eq!(program.render(after.unwrap()), "side-effect(2, a)");
    }

    #[test]
    fn test_member_default_is_undefined() {
        let mut read = None;
        let program = module(|b| {
            let object = b.emit_make_object(None, vec![]);
            b.declare_local("o", object);
            let o = b.read_value("o");
            read = Some(b.read_member_call_value(o, "f"));
        });
        assert_eq!(program.render(read.unwrap()), "Undefined-o.f");
    }

    #[test]
    fn test_blueprint_member_fallback() {
        let mut read = None;
        let program = module(|b| {
            b.declare_class("Foo", None);
            let seven = b.emit_const(Literal::Int(7));
            b.set_class_member("Foo", "x", seven);
            let object = b.emit_new("Foo", vec![]);
            read = Some(b.read_member_call_value(object, "x"));
        });
        assert_eq!(program.render(read.unwrap()), "7");
    }
}
