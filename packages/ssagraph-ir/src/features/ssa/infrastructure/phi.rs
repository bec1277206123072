//! On-demand phi construction
//!
//! Braun et al., "Simple and Efficient Construction of Static Single
//! Assignment Form" (CC 2013):
//! - `write_variable` records the latest definition per (variable, block)
//! - `read_variable` looks locally, then recursively through predecessors
//! - reads in unsealed blocks leave an incomplete phi, completed by `seal_block`
//! - a phi whose operands are all the same value (or itself) is forwarded
//!
//! Single-predecessor chains are walked iteratively; long straight-line
//! functions would otherwise recurse once per block.

use super::builder::SsaBuilder;
use crate::features::ssa::domain::{
    BlockId, FunctionId, Type, ValueId, ValueKind, VariableId, VariableKind,
};
use ahash::{AHashMap, AHashSet};
use tracing::trace;

#[derive(Debug, Default)]
pub(crate) struct PhiTables {
    pub(crate) current_def: AHashMap<(VariableId, BlockId), ValueId>,
    /// Incomplete phis per unsealed block, in creation order
    pub(crate) incomplete: AHashMap<BlockId, Vec<(VariableId, ValueId)>>,
    pub(crate) undefined: AHashMap<(FunctionId, String), ValueId>,
    pub(crate) free_values: AHashMap<(FunctionId, VariableId), ValueId>,
}

impl SsaBuilder {
    pub(crate) fn write_variable(&mut self, variable: VariableId, block: BlockId, value: ValueId) {
        self.phi.current_def.insert((variable, block), value);
    }

    pub(crate) fn read_variable(&mut self, variable: VariableId, block: BlockId) -> ValueId {
        if let Some(&value) = self.phi.current_def.get(&(variable, block)) {
            return self.program.resolve(value);
        }
        self.read_variable_recursive(variable, block)
    }

    fn read_variable_recursive(&mut self, variable: VariableId, block: BlockId) -> ValueId {
        let mut chain: Vec<BlockId> = Vec::new();
        let mut visited: AHashSet<BlockId> = AHashSet::new();
        let mut current = block;

        let value = loop {
            if let Some(&value) = self.phi.current_def.get(&(variable, current)) {
                break self.program.resolve(value);
            }
            if !visited.insert(current) {
                // Cycle of single-predecessor blocks: only dead code does that
                let function = self.program.block(current).function;
                let name = self.program.variable(variable).name.clone();
                break self.undefined_value(function, &name);
            }

            let (sealed, preds) = {
                let b = self.program.block(current);
                (b.sealed, b.preds.len())
            };
            if !sealed {
                let phi = self.new_phi(variable, current);
                self.phi
                    .incomplete
                    .entry(current)
                    .or_default()
                    .push((variable, phi));
                break phi;
            }
            match preds {
                0 => break self.entry_value(variable, current),
                1 => {
                    chain.push(current);
                    current = self.program.block(current).preds[0];
                }
                _ => {
                    let phi = self.new_phi(variable, current);
                    self.write_variable(variable, current, phi);
                    break self.add_phi_operands(variable, phi);
                }
            }
        };

        self.write_variable(variable, current, value);
        for b in chain {
            self.write_variable(variable, b, value);
        }
        value
    }

    fn new_phi(&mut self, variable: VariableId, block: BlockId) -> ValueId {
        let name = self.program.variable(variable).name.clone();
        let phi = self.alloc_value(
            ValueKind::Phi {
                variable: name.clone(),
                edges: Vec::new(),
            },
            None,
            block,
        );
        self.program.value_mut(phi).name = Some(name);
        self.program.block_mut(block).phis.push(phi);
        trace!(phi = %phi, block = %block, "new phi");
        phi
    }

    /// One operand per predecessor, in predecessor order
    fn add_phi_operands(&mut self, variable: VariableId, phi: ValueId) -> ValueId {
        let block = self.program.value(phi).block;
        let preds = self.program.block(block).preds.clone();
        let mut edges = Vec::with_capacity(preds.len());
        for pred in preds {
            edges.push(self.read_variable(variable, pred));
        }
        for edge in &edges {
            let edge = self.program.resolve(*edge);
            let users = &mut self.program.value_mut(edge).users;
            if !users.contains(&phi) {
                users.push(phi);
            }
        }
        if let ValueKind::Phi { edges: slot, .. } = &mut self.program.value_mut(phi).kind {
            *slot = edges;
        }
        self.try_remove_trivial_phi(phi)
    }

    /// Forward `phi` to its only distinct operand; re-check phis that used it
    fn try_remove_trivial_phi(&mut self, phi: ValueId) -> ValueId {
        let edges = match &self.program.value(phi).kind {
            ValueKind::Phi { edges, .. } => edges.clone(),
            _ => return phi,
        };

        let mut same: Option<ValueId> = None;
        for edge in edges {
            let edge = self.program.resolve(edge);
            if edge == phi || Some(edge) == same {
                continue;
            }
            if same.is_some() {
                return phi;
            }
            same = Some(edge);
        }

        let same = match same {
            Some(value) => value,
            None => {
                let function = self.program.value(phi).function;
                let name = self.program.value(phi).name.clone().unwrap_or_default();
                self.undefined_value(function, &name)
            }
        };

        let users: Vec<ValueId> = self
            .program
            .value(phi)
            .users
            .iter()
            .copied()
            .filter(|u| *u != phi)
            .collect();
        self.program.forwards.insert(phi, same);
        for user in &users {
            let list = &mut self.program.value_mut(same).users;
            if !list.contains(user) {
                list.push(*user);
            }
        }
        let block = self.program.value(phi).block;
        self.program.block_mut(block).phis.retain(|p| *p != phi);
        self.program.value_mut(phi).detached = true;
        trace!(phi = %phi, replacement = %same, "trivial phi removed");

        for user in users {
            let (is_phi, detached) = {
                let value = self.program.value(user);
                (value.kind.is_phi(), value.detached)
            };
            if is_phi && !detached {
                self.try_remove_trivial_phi(user);
            }
        }
        self.program.resolve(same)
    }

    /// Mark `block` sealed (no more predecessors) and complete its phis
    pub(crate) fn seal_block(&mut self, block: BlockId) {
        if self.program.block(block).sealed {
            return;
        }
        self.program.block_mut(block).sealed = true;
        let pending = self.phi.incomplete.remove(&block).unwrap_or_default();
        trace!(block = %block, pending = pending.len(), "seal block");
        for (variable, phi) in pending {
            self.add_phi_operands(variable, phi);
        }
    }

    /// Value of `variable` in a block nothing flows into
    fn entry_value(&mut self, variable: VariableId, block: BlockId) -> ValueId {
        let function = self.program.block(block).function;
        let record = self.program.variable(variable).clone();
        if !self.is_entry(block) {
            return self.undefined_value(function, &record.name);
        }

        match record.kind {
            VariableKind::Member { object, key } => {
                self.default_member_value(function, object, &key, &record.name)
            }
            VariableKind::Global => match self.program.global_values.get(&variable) {
                Some(&value) => self.program.resolve(value),
                None => self.undefined_value(function, &record.name),
            },
            VariableKind::Synthetic => self.undefined_value(function, &record.name),
            VariableKind::Local => match record.function {
                Some(owner) if owner != function => self.free_value(function, variable),
                _ => self.undefined_value(function, &record.name),
            },
        }
    }

    /// Cached `Undefined-<name>` at the head of `function`'s entry block
    pub(crate) fn undefined_value(&mut self, function: FunctionId, name: &str) -> ValueId {
        let key = (function, name.to_string());
        if let Some(&value) = self.phi.undefined.get(&key) {
            return value;
        }
        let value = self.emit_in_entry(
            function,
            ValueKind::Undefined {
                name: name.to_string(),
            },
            None,
        );
        self.phi.undefined.insert(key, value);
        value
    }

    /// Capture of an enclosing function's variable, created on first use
    pub(crate) fn free_value(&mut self, function: FunctionId, variable: VariableId) -> ValueId {
        if let Some(&value) = self.phi.free_values.get(&(function, variable)) {
            return value;
        }
        let name = self.program.variable(variable).name.clone();
        let ty = self.captured_type(variable);
        let value = self.emit_in_entry(
            function,
            ValueKind::FreeValue {
                name: name.clone(),
                variable,
            },
            ty,
        );
        self.program.value_mut(value).name = Some(name);
        self.phi.free_values.insert((function, variable), value);
        self.program
            .function_mut(function)
            .free_values
            .push((variable, value));
        trace!(function = %function, variable = %variable, "free value captured");
        value
    }

    /// Type of a captured binding with exactly one definition (imports, classes)
    fn captured_type(&self, variable: VariableId) -> Option<Type> {
        let mut defs = self
            .phi
            .current_def
            .iter()
            .filter(|((v, _), _)| *v == variable)
            .map(|(_, value)| self.program.resolve(*value));
        let first = defs.next()?;
        if defs.any(|other| other != first) {
            return None;
        }
        self.program.value(first).ty.clone()
    }
}
