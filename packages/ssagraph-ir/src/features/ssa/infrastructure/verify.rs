//! Structural checks on a finished program
//!
//! Returns one message per violated invariant; an empty list means the
//! graph is well formed.

use crate::features::ssa::domain::{Program, Terminator, ValueKind};
use ahash::AHashMap;

impl Program {
    pub fn verify(&self) -> Vec<String> {
        let mut errors = Vec::new();

        // Every attached value is listed by exactly one block, its own
        let mut placement: AHashMap<_, usize> = AHashMap::new();
        for block in &self.blocks {
            for value_id in block.values() {
                *placement.entry(value_id).or_default() += 1;
                let value = self.value(value_id);
                if value.block != block.id {
                    errors.push(format!(
                        "{} listed in {} but belongs to {}",
                        value_id,
                        block.label(),
                        value.block
                    ));
                }
                if value.detached {
                    errors.push(format!("{} is detached but listed in {}", value_id, block.label()));
                }
            }
        }
        for value in self.values() {
            match placement.get(&value.id) {
                Some(1) => {}
                Some(n) => errors.push(format!("{} listed in {} blocks", value.id, n)),
                None => errors.push(format!("{} is in no block", value.id)),
            }
        }

        for block in &self.blocks {
            // Phi arity matches predecessor count
            for phi in &block.phis {
                if let ValueKind::Phi { edges, .. } = &self.value(*phi).kind {
                    if edges.len() != block.preds.len() {
                        errors.push(format!(
                            "{} in {} has {} edges for {} predecessors",
                            phi,
                            block.label(),
                            edges.len(),
                            block.preds.len()
                        ));
                    }
                    for edge in edges {
                        if self.value(*edge).detached {
                            errors.push(format!("{} uses detached {}", phi, edge));
                        }
                    }
                }
            }

            // Successor and predecessor lists mirror each other
            for succ in &block.succs {
                let back = self.block(*succ).preds.iter().filter(|p| **p == block.id).count();
                let forward = block.succs.iter().filter(|s| *s == succ).count();
                if back != forward {
                    errors.push(format!(
                        "edge {} -> {} missing from predecessors",
                        block.label(),
                        self.block(*succ).label()
                    ));
                }
            }
            for pred in &block.preds {
                if !self.block(*pred).succs.contains(&block.id) {
                    errors.push(format!(
                        "edge {} -> {} missing from successors",
                        self.block(*pred).label(),
                        block.label()
                    ));
                }
            }

            // Terminator targets are the successors
            if let Some(terminator) = &block.terminator {
                let mut targets = terminator.targets();
                if let Terminator::Return(_) = terminator {
                    targets.push(self.function(block.function).exit);
                }
                if targets != block.succs {
                    errors.push(format!(
                        "{} terminator targets differ from successors",
                        block.label()
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuildConfig;
    use crate::features::ssa::domain::Literal;
    use crate::features::ssa::infrastructure::{
        IfBuilder, LoopBuilder, ModuleSpec, SsaBuilder, SwitchBuilder, TryBuilder,
    };
    use crate::shared::ports::Language;

    #[test]
    fn test_nested_constructs_verify_clean() {
        let mut b = SsaBuilder::new(BuildConfig::default());
        b.build_module(ModuleSpec::new("t.js", Language::JavaScript), |b| {
            let zero = b.emit_const(Literal::Int(0));
            b.assign_to_name("a", zero);
            LoopBuilder::new()
                .set_condition(|b| b.read_value("c"))
                .set_body(|b| {
                    IfBuilder::new()
                        .append_item(
                            |b| b.read_value("d"),
                            |b| {
                                b.emit_break(None);
                            },
                        )
                        .build(b);
                    TryBuilder::new()
                        .set_try(|b| {
                            let one = b.emit_const(Literal::Int(1));
                            b.assign_to_name("a", one);
                        })
                        .set_finally(|b| {
                            SwitchBuilder::new()
                                .condition(|b| b.read_value("a"))
                                .case_size(1)
                                .set_case(|b, _| vec![b.emit_const(Literal::Int(1))])
                                .set_body(|b, _| {
                                    b.emit_continue(None);
                                })
                                .build(b);
                        })
                        .build(b);
                })
                .build(b);
            b.read_value("a");
        });
        let program = b.finish();
        assert_eq!(program.verify(), Vec::<String>::new());
    }
}
