//! try / catch / finally and try-with-resources

use super::builder::SsaBuilder;
use super::jump::{JumpFrame, PendingExit};
use super::BodyFn;
use crate::features::ssa::domain::{BlockId, Terminator, Type, ValueId, ValueKind};
use tracing::trace;

type ResourceFn<'a> = Box<dyn FnOnce(&mut SsaBuilder) -> Option<ValueId> + 'a>;

struct CatchClause<'a> {
    type_name: Option<String>,
    binding: Option<String>,
    body: BodyFn<'a>,
}

/// Structured try statement
///
/// `try.enter` ends in a `Try` terminator whose successors are the try body
/// and every catch block, so handlers see the pre-try state. Normal
/// completion of the body and of each catch merges in `try.finally` (when
/// present) and then `try.done`. Without catch clauses the unhandled
/// exception edge `try.enter → try.finally` is added after the body's edge.
/// A `return`, `break` or `continue` leaving the body or a catch enters
/// `try.finally` too and resumes from its own block after the finally body.
#[derive(Default)]
pub struct TryBuilder<'a> {
    resources: Vec<ResourceFn<'a>>,
    body: Option<BodyFn<'a>>,
    catches: Vec<CatchClause<'a>>,
    finally: Option<BodyFn<'a>>,
}

impl<'a> TryBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_try(mut self, body: impl FnOnce(&mut SsaBuilder) + 'a) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    /// `catch (TypeName binding) { body }`
    pub fn add_catch(
        mut self,
        type_name: Option<String>,
        binding: Option<String>,
        body: impl FnOnce(&mut SsaBuilder) + 'a,
    ) -> Self {
        self.catches.push(CatchClause {
            type_name,
            binding,
            body: Box::new(body),
        });
        self
    }

    pub fn set_finally(mut self, body: impl FnOnce(&mut SsaBuilder) + 'a) -> Self {
        self.finally = Some(Box::new(body));
        self
    }

    /// try-with-resources declaration; the returned value is closed in finally
    pub fn add_resource(mut self, init: impl FnOnce(&mut SsaBuilder) -> Option<ValueId> + 'a) -> Self {
        self.resources.push(Box::new(init));
        self
    }

    pub fn build(self, b: &mut SsaBuilder) {
        let has_finally = self.finally.is_some() || !self.resources.is_empty();

        let enter = b.new_block("try.enter");
        b.emit_jump(enter);
        b.seal_block(enter);
        b.switch_to(enter);

        let body_block = b.new_block("try.body");
        let handlers: Vec<BlockId> = self
            .catches
            .iter()
            .map(|_| b.new_block("try.catch"))
            .collect();
        let finally_block = has_finally.then(|| b.new_block("try.finally"));
        let done = b.new_block("try.done");
        let after = finally_block.unwrap_or(done);

        b.emit_try_enter(body_block, &handlers, None);
        b.seal_block(body_block);
        for handler in &handlers {
            b.seal_block(*handler);
        }

        if let Some(finally_block) = finally_block {
            b.push_jump_frame(JumpFrame::finally(finally_block));
        }

        b.switch_to(body_block);
        b.enter_scope();
        let mut opened = Vec::new();
        for resource in self.resources {
            if let Some(value) = resource(b) {
                opened.push(value);
            }
        }
        if let Some(body) = self.body {
            body(b);
        }
        b.exit_scope();
        b.emit_jump(after);

        if let Some(finally_block) = finally_block {
            if handlers.is_empty() && b.has_live_try(enter) {
                b.add_edge(enter, finally_block);
                if let Some(Terminator::Try { finally, .. }) =
                    b.program.block_mut(enter).terminator.as_mut()
                {
                    *finally = Some(finally_block);
                }
                trace!(enter = %enter, finally = %finally_block, "unhandled exception edge");
            }
        }

        for (clause, handler) in self.catches.into_iter().zip(handlers.iter().copied()) {
            b.switch_to(handler);
            b.enter_scope();
            let name = clause.binding.clone().unwrap_or_else(|| "error".to_string());
            let ty = clause.type_name.map(Type::Named);
            let error = b.emit(ValueKind::CaughtError { name: name.clone() }, ty);
            if clause.binding.is_some() {
                b.declare_local(&name, error);
            }
            (clause.body)(b);
            b.exit_scope();
            b.emit_jump(after);
        }

        if let Some(finally_block) = finally_block {
            let exits = b.pop_finally_frame();
            let normal = b.program.block(finally_block).preds.len() > exits.len();
            b.seal_block(finally_block);
            b.switch_to(finally_block);
            b.enter_scope();
            for resource in opened {
                let close = b.read_member_call_value(resource, "close");
                b.emit_call(close, Vec::new(), Some(resource), Some("close"));
            }
            if let Some(finally) = self.finally {
                finally(b);
            }
            b.exit_scope();
            b.leave_finally(exits, normal, done);
        }

        b.seal_block(done);
        b.switch_to(done);
    }
}

impl SsaBuilder {
    /// Leave a finally block for `done` (when something completed normally)
    /// and for one resume block per routed exit
    fn leave_finally(&mut self, exits: Vec<PendingExit>, normal: bool, done: BlockId) {
        let current = self.current_block();
        if exits.is_empty() || !self.can_leave(current) {
            self.emit_jump(done);
            return;
        }

        let resumes: Vec<(BlockId, PendingExit)> = exits
            .into_iter()
            .map(|exit| (self.new_block(exit.block_name()), exit))
            .collect();
        let mut targets = Vec::with_capacity(resumes.len() + 1);
        if normal {
            targets.push(done);
        }
        targets.extend(resumes.iter().map(|(block, _)| *block));
        self.program.block_mut(current).terminator = Some(Terminator::Dispatch(targets.clone()));
        for target in targets {
            self.add_edge(current, target);
        }
        trace!(finally = %current, exits = resumes.len(), normal, "finally dispatch");

        for (block, exit) in resumes {
            self.seal_block(block);
            self.switch_to(block);
            match exit {
                PendingExit::Return(ret) => self.leave_with_return(ret),
                PendingExit::Break(label) => {
                    self.emit_break(label.as_deref());
                }
                PendingExit::Continue(label) => {
                    self.emit_continue(label.as_deref());
                }
            }
        }
    }

    /// `block` ends in a `Try` terminator and is reachable
    fn has_live_try(&self, block: BlockId) -> bool {
        !self.is_dead(block)
            && matches!(
                self.program.block(block).terminator,
                Some(Terminator::Try { .. })
            )
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

    fn run(body: impl FnOnce(&mut SsaBuilder) -> Vec<ValueId>) -> (Program, Vec<String>) {
        let mut b = SsaBuilder::new(BuildConfig::default());
        let mut out = Vec::new();
        b.build_module(ModuleSpec::new("T.java", Language::Java), |b| {
            out = body(b);
        });
        let program = b.finish();
        let rendered = out.iter().map(|v| program.render(*v)).collect();
        (program, rendered)
    }

    fn assign(b: &mut SsaBuilder, value: i64) {
        let v = b.emit_const(Literal::Int(value));
        b.assign_to_name("a", v);
    }

    #[test]
    fn test_try_catch_finally_merges_in_finally() {
        let seen = std::cell::RefCell::new(Vec::new());
        let (_, rendered) = run(|b| {
            assign(b, 1);
            TryBuilder::new()
                .set_try(|b| assign(b, 2))
                .add_catch(Some("Exception".into()), Some("e".into()), |b| assign(b, 3))
                .set_finally(|b| {
                    let a = b.read_value("a");
                    seen.borrow_mut().push(a);
                })
                .build(b);
            seen.borrow().clone()
        });
        assert_eq!(rendered, vec!["phi(a)[2,3]"]);
    }

    #[test]
    fn test_catch_sees_pre_try_state() {
        let seen = std::cell::RefCell::new(Vec::new());
        let (_, rendered) = run(|b| {
            assign(b, 1);
            TryBuilder::new()
                .set_try(|b| assign(b, 2))
                .add_catch(None, Some("e".into()), |b| {
                    let a = b.read_value("a");
                    seen.borrow_mut().push(a);
                    let e = b.read_value("e");
                    seen.borrow_mut().push(e);
                })
                .build(b);
            let mut out = seen.borrow().clone();
            out.push(b.read_value("a"));
            out
        });
        assert_eq!(rendered, vec!["1", "Error-e", "phi(a)[2,1]"]);
    }

    #[test]
    fn test_try_finally_without_catch_has_unhandled_edge() {
        let seen = std::cell::RefCell::new(Vec::new());
        let (_, rendered) = run(|b| {
            assign(b, 1);
            TryBuilder::new()
                .set_try(|b| assign(b, 2))
                .set_finally(|b| {
                    let a = b.read_value("a");
                    seen.borrow_mut().push(a);
                })
                .build(b);
            seen.borrow().clone()
        });
        assert_eq!(rendered, vec!["phi(a)[2,1]"]);
    }

    fn finally_sees_a<'a>(seen: &'a std::cell::RefCell<Vec<ValueId>>) -> impl FnOnce(&mut SsaBuilder) + 'a {
        move |b| {
            let a = b.read_value("a");
            seen.borrow_mut().push(a);
        }
    }

    fn block_named<'p>(program: &'p Program, name: &str) -> Option<&'p crate::features::ssa::domain::BasicBlock> {
        let main = program.function_by_name("T.java")?;
        main.blocks
            .iter()
            .map(|id| program.block(*id))
            .find(|blk| blk.name == name)
    }

    #[test]
    fn test_return_in_try_passes_through_finally() {
        let seen = std::cell::RefCell::new(Vec::new());
        let (program, rendered) = run(|b| {
            assign(b, 1);
            TryBuilder::new()
                .set_try(|b| {
                    assign(b, 2);
                    b.emit_return(Vec::new());
                })
                .add_catch(None, Some("e".into()), |b| assign(b, 3))
                .set_finally(finally_sees_a(&seen))
                .build(b);
            seen.borrow().clone()
        });
        assert_eq!(rendered, vec!["phi(a)[2,3]"]);

        let resume = block_named(&program, "finally.return").expect("resume block");
        assert_eq!(program.block(resume.preds[0]).name, "try.finally");
        let exit = program.function_by_name("T.java").unwrap().exit;
        assert!(program.block(exit).preds.contains(&resume.id));
        assert!(program.verify().is_empty(), "{:?}", program.verify());
    }

    #[test]
    fn test_return_in_catch_passes_through_finally() {
        let seen = std::cell::RefCell::new(Vec::new());
        let (program, rendered) = run(|b| {
            assign(b, 1);
            TryBuilder::new()
                .set_try(|b| assign(b, 2))
                .add_catch(None, Some("e".into()), |b| {
                    assign(b, 3);
                    b.emit_return(Vec::new());
                })
                .set_finally(finally_sees_a(&seen))
                .build(b);
            seen.borrow().clone()
        });
        assert_eq!(rendered, vec!["phi(a)[2,3]"]);
        let finally = block_named(&program, "try.finally").unwrap();
        assert_eq!(
            finally.succs.iter().map(|s| program.block(*s).name.as_str()).collect::<Vec<_>>(),
            vec!["try.done", "finally.return"]
        );
    }

    #[test]
    fn test_nested_finally_blocks_run_inner_first() {
        let seen = std::cell::RefCell::new(Vec::new());
        let (program, rendered) = run(|b| {
            assign(b, 1);
            TryBuilder::new()
                .set_try(|b| {
                    TryBuilder::new()
                        .set_try(|b| {
                            assign(b, 2);
                            b.emit_return(Vec::new());
                        })
                        .set_finally(|b| assign(b, 3))
                        .build(b);
                })
                .set_finally(finally_sees_a(&seen))
                .build(b);
            seen.borrow().clone()
        });
        // resumed return, inner normal completion, outer unhandled edge
        assert_eq!(rendered, vec!["phi(a)[3,3,1]"]);
        let main = program.function_by_name("T.java").unwrap();
        let resumes = main
            .blocks
            .iter()
            .filter(|id| program.block(**id).name == "finally.return")
            .count();
        assert_eq!(resumes, 2);
        assert!(program.verify().is_empty(), "{:?}", program.verify());
    }

    #[test]
    fn test_break_out_of_loop_passes_through_finally() {
        use crate::features::ssa::infrastructure::LoopBuilder;

        let seen = std::cell::RefCell::new(Vec::new());
        let (program, rendered) = run(|b| {
            assign(b, 1);
            LoopBuilder::new()
                .set_condition(|b| b.read_value("c"))
                .set_body(|b| {
                    TryBuilder::new()
                        .set_try(|b| {
                            assign(b, 2);
                            b.emit_break(None);
                        })
                        .set_finally(finally_sees_a(&seen))
                        .build(b);
                })
                .build(b);
            seen.borrow().clone()
        });
        // the unhandled edge carries the loop-carried value
        assert_eq!(rendered, vec!["phi(a)[2,phi(a)[1,a]]"]);
        assert!(block_named(&program, "finally.break").is_some());
        assert!(program.verify().is_empty(), "{:?}", program.verify());
    }

    #[test]
    fn test_resources_closed_before_early_return() {
        let (program, _) = run(|b| {
            TryBuilder::new()
                .add_resource(|b| {
                    let r = b.emit_new("Reader", vec![]);
                    b.declare_local("r", r);
                    Some(r)
                })
                .set_try(|b| {
                    b.emit_return(Vec::new());
                })
                .build(b);
            Vec::new()
        });
        let closes = program.calls_to("close");
        assert_eq!(closes.len(), 1);
        let finally = program.value(closes[0]).block;
        assert_eq!(program.block(finally).name, "try.finally");
        let resume = block_named(&program, "finally.return").expect("resume block");
        assert_eq!(resume.preds, vec![finally]);
        assert!(program.verify().is_empty(), "{:?}", program.verify());
    }

    #[test]
    fn test_resources_closed_in_synthesized_finally() {
        let (program, _) = run(|b| {
            TryBuilder::new()
                .add_resource(|b| {
                    let r = b.emit_new("Reader", vec![]);
                    b.declare_local("r", r);
                    Some(r)
                })
                .set_try(|_| {})
                .build(b);
            Vec::new()
        });
        let closes = program.calls_to("close");
        assert_eq!(closes.len(), 1);
        let call = program.value(closes[0]);
        assert_eq!(program.block(call.block).name, "try.finally");
        assert!(program.verify().is_empty(), "{:?}", program.verify());
    }
}
