//! switch statements and switch expressions
//!
//! Every case test runs before any body, whatever the textual position of
//! `default`. Bodies are laid out in textual order so statement fallthrough
//! enters the next written body; with `auto_break` each body leaves for
//! `switch.done` instead. A case body lists its fallthrough predecessor
//! before its dispatch edges.

use super::builder::SsaBuilder;
use super::jump::{JumpFrame, JumpKind};
use super::{BodyFn, CondFn};
use crate::features::ssa::domain::{BinaryOp, BlockId, ValueId, VariableId};
use crate::shared::models::{DiagnosticTag, Severity};

type CaseFn<'a> = Box<dyn FnMut(&mut SsaBuilder, usize) -> Vec<ValueId> + 'a>;
type CaseBodyFn<'a> = Box<dyn FnMut(&mut SsaBuilder, usize) + 'a>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Case(usize),
    Default,
}

#[derive(Default)]
pub struct SwitchBuilder<'a> {
    auto_break: bool,
    label: Option<String>,
    condition: Option<CondFn<'a>>,
    case_size: usize,
    case_values: Option<CaseFn<'a>>,
    case_body: Option<CaseBodyFn<'a>>,
    default: Option<(usize, BodyFn<'a>)>,
    /// Case whose body also serves as default
    shared_default: Option<usize>,
}

impl<'a> SwitchBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrow-form arms: no fallthrough
    pub fn auto_break(mut self, auto_break: bool) -> Self {
        self.auto_break = auto_break;
        self
    }

    pub fn set_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// Scrutinee; without one each case value is itself the test
    pub fn condition(mut self, cond: impl FnOnce(&mut SsaBuilder) -> ValueId + 'a) -> Self {
        self.condition = Some(Box::new(cond));
        self
    }

    pub fn case_size(mut self, size: usize) -> Self {
        self.case_size = size;
        self
    }

    /// Values of case `i` (`case 3, 4:` yields two)
    pub fn set_case(mut self, values: impl FnMut(&mut SsaBuilder, usize) -> Vec<ValueId> + 'a) -> Self {
        self.case_values = Some(Box::new(values));
        self
    }

    /// Body of case `i`
    pub fn set_body(mut self, body: impl FnMut(&mut SsaBuilder, usize) + 'a) -> Self {
        self.case_body = Some(Box::new(body));
        self
    }

    /// `default` written after `position` cases
    pub fn set_default(mut self, position: usize, body: impl FnOnce(&mut SsaBuilder) + 'a) -> Self {
        self.default = Some((position, Box::new(body)));
        self
    }

    /// `case X, default ->` / `case X: default:`: no match enters case `index`
    pub fn default_case(mut self, index: usize) -> Self {
        self.shared_default = Some(index);
        self
    }

    pub fn build(self, b: &mut SsaBuilder) {
        self.build_inner(b);
    }

    /// Switch expression: arms assign `result`; returns its merged value
    pub fn build_value(self, b: &mut SsaBuilder, result: VariableId) -> ValueId {
        if self.default.is_none() && self.shared_default.is_none() {
            b.diagnose(
                Severity::Warn,
                DiagnosticTag::SwitchNoMatch,
                "switch expression without default",
            );
        }
        self.build_inner(b);
        b.read_variable_value(result)
    }

    fn build_inner(self, b: &mut SsaBuilder) {
        let Self {
            auto_break,
            label,
            condition,
            case_size,
            mut case_values,
            mut case_body,
            default,
            shared_default,
        } = self;
        let shared_default = shared_default.filter(|index| *index < case_size);

        let scrutinee = condition.map(|c| c(b));
        let done = b.new_block("switch.done");
        let bodies: Vec<BlockId> = (0..case_size).map(|_| b.new_block("switch.case")).collect();
        let default_block = match shared_default {
            Some(_) => done,
            None => b.new_block("switch.default"),
        };

        // Dispatch: every test before any body
        let mut dispatch = Vec::new();
        for (index, body_block) in bodies.iter().enumerate() {
            let values = match case_values.as_mut() {
                Some(values) => values(b, index),
                None => Vec::new(),
            };
            for value in values {
                let test = match scrutinee {
                    Some(scrutinee) => b.emit_binop(BinaryOp::Eq, scrutinee, value),
                    None => value,
                };
                let next = b.new_block("switch.next");
                dispatch.push(b.current_block());
                b.emit_branch(test, *body_block, next);
                b.seal_block(next);
                b.switch_to(next);
            }
        }
        let no_match = b.current_block();

        let mut slots: Vec<Slot> = (0..case_size).map(Slot::Case).collect();
        let mut default_body = None;
        match shared_default {
            Some(index) => {
                dispatch.push(no_match);
                b.emit_jump(bodies[index]);
            }
            None => {
                let position = match default {
                    Some((position, body)) => {
                        default_body = Some(body);
                        position.min(case_size)
                    }
                    None => case_size,
                };
                slots.insert(position, Slot::Default);
            }
        }
        let slot_block = |slot: Slot| match slot {
            Slot::Case(index) => bodies[index],
            Slot::Default => default_block,
        };

        b.push_jump_frame(JumpFrame::new(JumpKind::Switch, label, done));
        for (position, slot) in slots.iter().enumerate() {
            let block = slot_block(*slot);
            match *slot {
                Slot::Case(index) => {
                    fallthrough_first(b, block, &dispatch);
                    b.seal_block(block);
                    b.switch_to(block);
                    if let Some(body) = case_body.as_mut() {
                        b.build_block(|b| body(b, index));
                    }
                }
                Slot::Default => {
                    b.switch_to(no_match);
                    b.emit_jump(default_block);
                    b.seal_block(default_block);
                    b.switch_to(default_block);
                    if let Some(body) = default_body.take() {
                        b.build_block(body);
                    }
                }
            }

            let next = match slots.get(position + 1) {
                Some(next) if !auto_break => slot_block(*next),
                _ => done,
            };
            b.emit_jump(next);
        }
        b.pop_jump_frame();

        b.seal_block(done);
        b.switch_to(done);
    }
}

/// Move dispatch edges behind the fallthrough edge in `block`'s predecessors
fn fallthrough_first(b: &mut SsaBuilder, block: BlockId, dispatch: &[BlockId]) {
    let preds = &mut b.program.block_mut(block).preds;
    let (mut ordered, tests): (Vec<BlockId>, Vec<BlockId>) =
        preds.iter().copied().partition(|pred| !dispatch.contains(pred));
    ordered.extend(tests);
    *preds = ordered;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::features::ssa::domain::{Literal, Program};
    use crate::features::ssa::infrastructure::ModuleSpec;
    use crate::shared::ports::Language;
    use pretty_assertions::assert_eq;

    fn run(body: impl FnOnce(&mut SsaBuilder) -> ValueId) -> (Program, String) {
        let mut b = SsaBuilder::new(BuildConfig::default());
        let mut out = None;
        b.build_module(ModuleSpec::new("t.java", Language::Java), |b| {
            out = Some(body(b));
        });
        let program = b.finish();
        let rendered = program.render(out.unwrap());
        (program, rendered)
    }

    fn assign(b: &mut SsaBuilder, value: i64) {
        let v = b.emit_const(Literal::Int(value));
        b.assign_to_name("a", v);
    }

    fn cases<'a>(auto_break: bool, with_break: bool) -> SwitchBuilder<'a> {
        SwitchBuilder::new()
            .auto_break(auto_break)
            .condition(|b| b.read_value("x"))
            .case_size(2)
            .set_case(|b, i| vec![b.emit_const(Literal::Int(i as i64 + 1))])
            .set_body(move |b, i| {
                assign(b, (i as i64 + 2) * 11);
                if with_break {
                    b.emit_break(None);
                }
            })
    }

    #[test]
    fn test_switch_without_default_merges_original() {
        let (_, a) = run(|b| {
            assign(b, 1);
            cases(false, true).build(b);
            b.read_value("a")
        });
        assert_eq!(a, "phi(a)[22,33,1]");
    }

    #[test]
    fn test_fallthrough_runs_next_case() {
        let (_, a) = run(|b| {
            assign(b, 1);
            cases(false, false).build(b);
            b.read_value("a")
        });
        // case 1 falls into case 2, both fall into the synthetic default
        assert_eq!(a, "phi(a)[33,1]");
    }

    #[test]
    fn test_arrow_form_does_not_fall_through() {
        let (_, a) = run(|b| {
            assign(b, 1);
            cases(true, false).build(b);
            b.read_value("a")
        });
        assert_eq!(a, "phi(a)[22,33,1]");
    }

    #[test]
    fn test_default_before_cases_runs_only_on_no_match() {
        let (program, a) = run(|b| {
            assign(b, 1);
            cases(false, true)
                .set_default(0, |b| {
                    assign(b, 99);
                    b.emit_break(None);
                })
                .build(b);
            b.read_value("a")
        });
        assert_eq!(a, "phi(a)[99,22,33]");
        let main = program.function_by_name("t.java").unwrap();
        let default = main
            .blocks
            .iter()
            .map(|id| program.block(*id))
            .find(|blk| blk.name == "switch.default")
            .unwrap();
        // only the no-match edge enters a leading default
        assert_eq!(default.preds.len(), 1);
        assert_eq!(program.block(default.preds[0]).name, "switch.next");
    }

    #[test]
    fn test_fallthrough_into_default() {
        let (_, a) = run(|b| {
            assign(b, 1);
            SwitchBuilder::new()
                .condition(|b| b.read_value("x"))
                .case_size(1)
                .set_case(|b, _| vec![b.emit_const(Literal::Int(1))])
                .set_body(|b, _| assign(b, 5))
                .set_default(1, |b| {
                    let a = b.read_value("a");
                    b.assign_to_name("seen", a);
                })
                .build(b);
            b.read_value("seen")
        });
        assert_eq!(a, "phi(a)[5,1]");
    }

    #[test]
    fn test_fallthrough_edge_precedes_dispatch_edge() {
        let (_, seen) = run(|b| {
            assign(b, 1);
            SwitchBuilder::new()
                .condition(|b| b.read_value("x"))
                .case_size(2)
                .set_case(|b, i| vec![b.emit_const(Literal::Int(i as i64 + 1))])
                .set_body(|b, i| {
                    if i == 0 {
                        assign(b, 2);
                    } else {
                        let a = b.read_value("a");
                        b.assign_to_name("seen", a);
                    }
                })
                .build(b);
            b.read_value("seen")
        });
        assert!(seen.starts_with("phi(seen)["), "{seen}");
        assert!(seen.contains("phi(a)[2,1]"), "{seen}");
    }

    #[test]
    fn test_shared_default_runs_case_body() {
        let (program, a) = run(|b| {
            assign(b, 1);
            SwitchBuilder::new()
                .auto_break(true)
                .condition(|b| b.read_value("x"))
                .case_size(2)
                .set_case(|b, i| vec![b.emit_const(Literal::Int(i as i64 + 1))])
                .set_body(|b, i| assign(b, (i as i64 + 2) * 11))
                .default_case(1)
                .build(b);
            b.read_value("a")
        });
        // no-match enters case 2 instead of skipping the switch
        assert_eq!(a, "phi(a)[22,33]");
        let main = program.function_by_name("t.java").unwrap();
        assert!(main
            .blocks
            .iter()
            .all(|id| program.block(*id).name != "switch.default"));
        assert!(program.verify().is_empty(), "{:?}", program.verify());
    }

    #[test]
    fn test_build_value_without_default_warns() {
        let mut result = None;
        let (program, _) = run(|b| {
            let variable = b.synthetic_variable("r");
            let value = SwitchBuilder::new()
                .auto_break(true)
                .condition(|b| b.read_value("x"))
                .case_size(1)
                .set_case(|b, _| vec![b.emit_const(Literal::Int(1))])
                .set_body(move |b, _| {
                    let v = b.emit_const(Literal::Int(10));
                    b.assign_variable(variable, v);
                })
                .build_value(b, variable);
            result = Some(value);
            value
        });
        assert_eq!(program.render(result.unwrap()), "phi(r)[10,Undefined-r]");
        assert!(program
            .diagnostics()
            .iter()
            .any(|d| d.tag == DiagnosticTag::SwitchNoMatch));
    }
}
