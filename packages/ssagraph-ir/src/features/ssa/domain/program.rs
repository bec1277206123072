/*
 * Program - the finished SSA artifact
 *
 * Owns every arena (values, blocks, functions, scopes, variables) plus the
 * top-level symbol table, class blueprints, modules and diagnostics.
 *
 * While the builder runs, trivial phis are forwarded through `forwards`.
 * `canonicalize()` rewrites every operand through the forwarding table and
 * detaches the forwarded phis. The table is kept flattened (one hop to the
 * live value) so ids handed out during building still resolve afterwards.
 */

use super::block::BasicBlock;
use super::function::{Function, Module};
use super::ids::{BlockId, FunctionId, ScopeId, ValueId, VariableId};
use super::render::ValueRenderer;
use super::scope::{Scope, Variable};
use super::value::{Value, ValueKind};
use crate::shared::models::Diagnostic;
use ahash::AHashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Class / struct declaration: default members shared by every instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBlueprint {
    pub name: String,
    pub qualified_name: String,
    /// Blueprint value (`MakeObject` with `class` set)
    pub value: ValueId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub members: IndexMap<String, ValueId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor: Option<ValueId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub(crate) values: Vec<Value>,
    pub(crate) blocks: Vec<BasicBlock>,
    pub(crate) functions: Vec<Function>,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) variables: Vec<Variable>,
    pub(crate) modules: Vec<Module>,
    /// Qualified name → value (functions, classes, exports)
    pub(crate) symbols: IndexMap<String, ValueId>,
    pub(crate) classes: IndexMap<String, ClassBlueprint>,
    pub(crate) globals: IndexMap<String, VariableId>,
    pub(crate) global_values: AHashMap<VariableId, ValueId>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub(crate) forwards: AHashMap<ValueId, ValueId>,
    #[serde(skip)]
    pub(crate) source_index: AHashMap<String, Vec<(usize, usize, ValueId)>>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Arena access
    // ═══════════════════════════════════════════════════════════════════════

    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.index()]
    }

    pub(crate) fn value_mut(&mut self, id: ValueId) -> &mut Value {
        &mut self.values[id.index()]
    }

    /// Every value that is part of a block
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.detached)
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.index()]
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    pub(crate) fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// First function with the given name, in creation order
    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.index()]
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module_by_key(&self, key: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.key == key)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn symbol(&self, qualified_name: &str) -> Option<ValueId> {
        self.symbols.get(qualified_name).copied()
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&str, ValueId)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn class(&self, qualified_name: &str) -> Option<&ClassBlueprint> {
        self.classes.get(qualified_name)
    }

    /// Look a class up by qualified or simple name
    pub fn class_by_name(&self, name: &str) -> Option<&ClassBlueprint> {
        self.classes
            .get(name)
            .or_else(|| self.classes.values().find(|c| c.name == name))
    }

    /// Follow trivial-phi forwarding to the value that replaced `id`
    pub fn resolve(&self, id: ValueId) -> ValueId {
        let mut current = id;
        while let Some(&next) = self.forwards.get(&current) {
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Render a value the way diagnostics and tests print it
    pub fn render(&self, id: ValueId) -> String {
        ValueRenderer::new(self).render(id)
    }

    /// Values of `function` in block order
    pub fn function_values(&self, function: FunctionId) -> Vec<ValueId> {
        self.function(function)
            .blocks
            .iter()
            .flat_map(|b| self.block(*b).values())
            .collect()
    }

    /// Calls whose callee is named `callee_name` or ends in `.callee_name`
    /// (`Undefined-System.out.println` matches `println`), in creation order
    pub fn calls_to(&self, callee_name: &str) -> Vec<ValueId> {
        let suffix = format!(".{}", callee_name);
        let is_match = |name: &str| name == callee_name || name.ends_with(&suffix);
        self.values()
            .filter(|v| match &v.kind {
                ValueKind::Call { callee, .. } => {
                    let callee = self.value(self.resolve(*callee));
                    callee.name.as_deref().is_some_and(is_match)
                        || matches!(&callee.kind, ValueKind::Undefined { name } if is_match(name))
                        || matches!(&callee.kind, ValueKind::Function { name, .. } if is_match(name))
                }
                _ => false,
            })
            .map(|v| v.id)
            .collect()
    }

    /// Values whose source span covers `byte` in `file`, innermost first
    pub fn values_at(&self, file: &str, byte: usize) -> Vec<ValueId> {
        let Some(entries) = self.source_index.get(file) else {
            return Vec::new();
        };
        let upper = entries.partition_point(|(start, _, _)| *start <= byte);
        let mut hits: Vec<(usize, ValueId)> = entries[..upper]
            .iter()
            .filter(|(_, end, _)| byte < *end)
            .map(|(start, end, id)| (end - start, *id))
            .collect();
        hits.sort();
        hits.into_iter().map(|(_, id)| id).collect()
    }

    /// Serialize the whole program as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable listing of every function
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for function in &self.functions {
            let params: Vec<String> = function.params.iter().map(|p| self.render(*p)).collect();
            let _ = writeln!(out, "func {}({})", function.name, params.join(", "));
            for block_id in &function.blocks {
                let block = self.block(*block_id);
                let preds: Vec<String> = block
                    .preds
                    .iter()
                    .map(|p| self.block(*p).label())
                    .collect();
                let _ = writeln!(out, "  {}: <- [{}]", block.label(), preds.join(", "));
                for value in block.values() {
                    let _ = writeln!(out, "    {} = {}", value, self.render(value));
                }
                if let Some(ref term) = block.terminator {
                    let targets: Vec<String> = term
                        .targets()
                        .iter()
                        .map(|t| self.block(*t).label())
                        .collect();
                    let _ = writeln!(out, "    -> [{}]", targets.join(", "));
                }
            }
        }
        out
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Finalization
    // ═══════════════════════════════════════════════════════════════════════

    /// Rewrite every reference through `forwards`, detach forwarded phis,
    /// recompute def-use lists and build the source index.
    ///
    /// `forwards` is left holding each removed phi's final replacement.
    pub(crate) fn canonicalize(&mut self) {
        if !self.forwards.is_empty() {
            let forwarded: Vec<ValueId> = self.forwards.keys().copied().collect();
            let resolved: AHashMap<ValueId, ValueId> = forwarded
                .iter()
                .map(|id| (*id, self.resolve(*id)))
                .collect();
            let map = |id: ValueId| resolved.get(&id).copied().unwrap_or(id);

            for value in &mut self.values {
                value.kind.map_operands(map);
            }
            for block in &mut self.blocks {
                block.phis.retain(|p| !resolved.contains_key(p));
                if let Some(super::block::Terminator::Branch { cond, .. }) = block.terminator.as_mut()
                {
                    *cond = map(*cond);
                }
            }
            for function in &mut self.functions {
                for (_, value) in function.free_values.iter_mut() {
                    *value = map(*value);
                }
                for effect in function.side_effects.iter_mut() {
                    effect.value = map(effect.value);
                }
            }
            for value in self.symbols.values_mut() {
                *value = map(*value);
            }
            for value in self.global_values.values_mut() {
                *value = map(*value);
            }
            for class in self.classes.values_mut() {
                for value in class.members.values_mut() {
                    *value = map(*value);
                }
            }
            for id in forwarded {
                self.values[id.index()].detached = true;
            }
            self.forwards = resolved;
        }

        for value in &mut self.values {
            value.users.clear();
        }
        let edges: Vec<(ValueId, ValueId)> = self
            .values
            .iter()
            .filter(|v| !v.detached)
            .flat_map(|v| v.kind.operands().into_iter().map(move |op| (op, v.id)))
            .collect();
        for (operand, user) in edges {
            let users = &mut self.values[operand.index()].users;
            if !users.contains(&user) {
                users.push(user);
            }
        }

        self.source_index.clear();
        for value in self.values.iter().filter(|v| !v.detached) {
            if value.span.end_byte <= value.span.start_byte {
                continue;
            }
            let Some(file) = self.functions[value.function.index()].file.clone() else {
                continue;
            };
            self.source_index.entry(file).or_default().push((
                value.span.start_byte,
                value.span.end_byte,
                value.id,
            ));
        }
        for entries in self.source_index.values_mut() {
            entries.sort();
        }
    }
}
