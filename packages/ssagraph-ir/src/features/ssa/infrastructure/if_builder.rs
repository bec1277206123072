//! if / else-if / else

use super::builder::SsaBuilder;
use super::{BodyFn, CondFn};
use crate::features::ssa::domain::ValueId;

/// Structured `if` chain
///
/// ```text
/// cond1 ──true──▶ if.true ──────────────┐
///   │false                              ▼
/// if.elif: cond2 ──true──▶ if.true ──▶ if.done
///   │false                              ▲
/// if.else ──────────────────────────────┘
/// ```
///
/// `if.done` predecessors are `[body1, …, bodyN, else]`; an empty else
/// block is synthesized when none is written.
#[derive(Default)]
pub struct IfBuilder<'a> {
    items: Vec<(CondFn<'a>, BodyFn<'a>)>,
    else_body: Option<BodyFn<'a>>,
}

impl<'a> IfBuilder<'a> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            else_body: None,
        }
    }

    /// Add one `if (cond) body` / `else if (cond) body` pair
    pub fn append_item(
        mut self,
        cond: impl FnOnce(&mut SsaBuilder) -> ValueId + 'a,
        body: impl FnOnce(&mut SsaBuilder) + 'a,
    ) -> Self {
        self.items.push((Box::new(cond), Box::new(body)));
        self
    }

    pub fn set_else(mut self, body: impl FnOnce(&mut SsaBuilder) + 'a) -> Self {
        self.else_body = Some(Box::new(body));
        self
    }

    pub fn build(self, b: &mut SsaBuilder) {
        if self.items.is_empty() {
            if let Some(else_body) = self.else_body {
                b.build_block(else_body);
            }
            return;
        }

        let done = b.new_block("if.done");
        let else_block = b.new_block("if.else");
        let count = self.items.len();

        for (index, (cond, body)) in self.items.into_iter().enumerate() {
            let cond = cond(b);
            let then_block = b.new_block("if.true");
            let next = if index + 1 < count {
                b.new_block("if.elif")
            } else {
                else_block
            };
            b.emit_branch(cond, then_block, next);

            b.seal_block(then_block);
            b.switch_to(then_block);
            b.build_block(body);
            b.emit_jump(done);

            b.seal_block(next);
            b.switch_to(next);
        }

        if let Some(else_body) = self.else_body {
            b.build_block(else_body);
        }
        b.emit_jump(done);

        b.seal_block(done);
        b.switch_to(done);
    }
}

impl SsaBuilder {
    /// `cond ? then : else` as a phi of a synthetic variable named `name`
    ///
    /// Also lowers short-circuit operators: `x || y` is
    /// `emit_conditional(x, |_| x, |b| y(b))`.
    pub fn emit_conditional<'a>(
        &mut self,
        name: &str,
        cond: ValueId,
        then_value: impl FnOnce(&mut SsaBuilder) -> ValueId + 'a,
        else_value: impl FnOnce(&mut SsaBuilder) -> ValueId + 'a,
    ) -> ValueId {
        let variable = self.synthetic_variable(name);
        IfBuilder::new()
            .append_item(
                move |_| cond,
                move |b| {
                    let value = then_value(b);
                    b.assign_variable(variable, value);
                },
            )
            .set_else(move |b| {
                let value = else_value(b);
                b.assign_variable(variable, value);
            })
            .build(self);
        self.read_variable_value(variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::features::ssa::domain::{Literal, Program};
    use crate::features::ssa::infrastructure::ModuleSpec;
    use crate::shared::ports::Language;
    use pretty_assertions::assert_eq;

    fn run(body: impl FnOnce(&mut SsaBuilder) -> ValueId) -> (Program, ValueId) {
        let mut b = SsaBuilder::new(BuildConfig::default());
        let mut out = None;
        b.build_module(ModuleSpec::new("t.js", Language::JavaScript), |b| {
            out = Some(body(b));
        });
        let program = b.finish();
        let value = out.unwrap();
        (program, value)
    }

    fn int(b: &mut SsaBuilder, value: i64) -> ValueId {
        b.emit_const(Literal::Int(value))
    }

    #[test]
    fn test_if_else_phi() {
        let (program, a) = run(|b| {
            IfBuilder::new()
                .append_item(
                    |b| b.read_value("c"),
                    |b| {
                        let two = int(b, 2);
                        b.assign_to_name("a", two);
                    },
                )
                .set_else(|b| {
                    let three = int(b, 3);
                    b.assign_to_name("a", three);
                })
                .build(b);
            b.read_value("a")
        });
        assert_eq!(program.render(a), "phi(a)[2,3]");
    }

    #[test]
    fn test_if_without_assignment_keeps_value() {
        let (program, a) = run(|b| {
            let one = int(b, 1);
            b.assign_to_name("a", one);
            IfBuilder::new()
                .append_item(|b| b.read_value("c"), |_| {})
                .build(b);
            b.read_value("a")
        });
        assert_eq!(program.render(a), "1");
    }

    #[test]
    fn test_if_then_only_assignment() {
        let (program, a) = run(|b| {
            let one = int(b, 1);
            b.assign_to_name("a", one);
            IfBuilder::new()
                .append_item(
                    |b| b.read_value("c"),
                    |b| {
                        let two = int(b, 2);
                        b.assign_to_name("a", two);
                    },
                )
                .build(b);
            b.read_value("a")
        });
        assert_eq!(program.render(a), "phi(a)[2,1]");
    }

    #[test]
    fn test_else_if_chain_operand_order() {
        let (program, a) = run(|b| {
            IfBuilder::new()
                .append_item(
                    |b| b.read_value("c1"),
                    |b| {
                        let v = int(b, 1);
                        b.assign_to_name("a", v);
                    },
                )
                .append_item(
                    |b| b.read_value("c2"),
                    |b| {
                        let v = int(b, 2);
                        b.assign_to_name("a", v);
                    },
                )
                .set_else(|b| {
                    let v = int(b, 3);
                    b.assign_to_name("a", v);
                })
                .build(b);
            b.read_value("a")
        });
        assert_eq!(program.render(a), "phi(a)[1,2,3]");
    }

    #[test]
    fn test_first_assignment_in_branch_merges_with_undefined() {
        let (program, a) = run(|b| {
            IfBuilder::new()
                .append_item(
                    |b| b.read_value("c"),
                    |b| {
                        let one = int(b, 1);
                        b.assign_to_name("a", one);
                    },
                )
                .build(b);
            b.read_value("a")
        });
        assert_eq!(program.render(a), "phi(a)[1,Undefined-a]");
    }

    #[test]
    fn test_return_in_branch_contributes_no_operand() {
        let (program, a) = run(|b| {
            let one = int(b, 1);
            b.assign_to_name("a", one);
            IfBuilder::new()
                .append_item(
                    |b| b.read_value("c"),
                    |b| {
                        let two = int(b, 2);
                        b.assign_to_name("a", two);
                        b.emit_return(vec![]);
                    },
                )
                .build(b);
            b.read_value("a")
        });
        assert_eq!(program.render(a), "1");
    }

    #[test]
    fn test_conditional_value() {
        let (program, v) = run(|b| {
            let c = b.read_value("c");
            b.emit_conditional("t", c, |b| int(b, 1), |b| int(b, 2))
        });
        assert_eq!(program.render(v), "phi(t)[1,2]");
    }
}
