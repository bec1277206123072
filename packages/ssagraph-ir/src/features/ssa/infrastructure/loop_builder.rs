//! for / while / do-while / for-each

use super::builder::SsaBuilder;
use super::jump::{JumpFrame, JumpKind};
use super::{BodyFn, CondFn};
use crate::features::ssa::domain::ValueId;

/// Structured loop
///
/// `init → loop.header(cond) → loop.body → loop.latch(step) → loop.header`,
/// leaving through the header's false edge into `loop.exit`. With
/// [`LoopBuilder::condition_after_body`] the body runs first and the latch
/// tests the condition. `continue` targets the latch, `break` the exit.
#[derive(Default)]
pub struct LoopBuilder<'a> {
    first: Option<BodyFn<'a>>,
    condition: Option<CondFn<'a>>,
    third: Option<BodyFn<'a>>,
    body: Option<BodyFn<'a>>,
    label: Option<String>,
    condition_after_body: bool,
}

impl<'a> LoopBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loop over `iterable` through its `hasNext()` / `next()` members
    pub fn for_each(
        iterable: ValueId,
        bind: impl FnOnce(&mut SsaBuilder, ValueId) + 'a,
        body: impl FnOnce(&mut SsaBuilder) + 'a,
    ) -> Self {
        Self::new()
            .set_condition(move |b| {
                let has_next = b.read_member_call_value(iterable, "hasNext");
                b.emit_call(has_next, Vec::new(), Some(iterable), Some("hasNext"))
            })
            .set_body(move |b| {
                let next = b.read_member_call_value(iterable, "next");
                let item = b.emit_call(next, Vec::new(), Some(iterable), Some("next"));
                bind(b, item);
                body(b);
            })
    }

    pub fn set_first(mut self, first: impl FnOnce(&mut SsaBuilder) + 'a) -> Self {
        self.first = Some(Box::new(first));
        self
    }

    pub fn set_condition(mut self, cond: impl FnOnce(&mut SsaBuilder) -> ValueId + 'a) -> Self {
        self.condition = Some(Box::new(cond));
        self
    }

    pub fn set_third(mut self, third: impl FnOnce(&mut SsaBuilder) + 'a) -> Self {
        self.third = Some(Box::new(third));
        self
    }

    pub fn set_body(mut self, body: impl FnOnce(&mut SsaBuilder) + 'a) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    pub fn set_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// do-while: body first, condition in the latch
    pub fn condition_after_body(mut self, after: bool) -> Self {
        self.condition_after_body = after;
        self
    }

    pub fn build(self, b: &mut SsaBuilder) {
        // Scope of `for (let i = ...)`
        b.enter_scope();
        if let Some(first) = self.first {
            first(b);
        }
        if self.condition_after_body {
            build_do_while(b, self.condition, self.body, self.label);
        } else {
            build_while(b, self.condition, self.third, self.body, self.label);
        }
        b.exit_scope();
    }
}

fn build_while(
    b: &mut SsaBuilder,
    condition: Option<CondFn<'_>>,
    third: Option<BodyFn<'_>>,
    body: Option<BodyFn<'_>>,
    label: Option<String>,
) {
    let header = b.new_block("loop.header");
    let body_block = b.new_block("loop.body");
    let latch = b.new_block("loop.latch");
    let exit = b.new_block("loop.exit");

    b.emit_jump(header);
    b.switch_to(header);
    match condition {
        Some(condition) => {
            let cond = condition(b);
            b.emit_branch(cond, body_block, exit);
        }
        // Infinite loop: the exit is reached through `break` only
        None => b.emit_jump(body_block),
    }

    b.seal_block(body_block);
    b.switch_to(body_block);
    b.push_jump_frame(JumpFrame::new(JumpKind::Loop, label, exit).with_continue(latch));
    if let Some(body) = body {
        b.build_block(body);
    }
    b.pop_jump_frame();
    b.emit_jump(latch);

    b.seal_block(latch);
    b.switch_to(latch);
    if let Some(third) = third {
        third(b);
    }
    b.emit_jump(header);
    b.seal_block(header);

    b.seal_block(exit);
    b.switch_to(exit);
}

fn build_do_while(
    b: &mut SsaBuilder,
    condition: Option<CondFn<'_>>,
    body: Option<BodyFn<'_>>,
    label: Option<String>,
) {
    let body_block = b.new_block("loop.body");
    let latch = b.new_block("loop.latch");
    let exit = b.new_block("loop.exit");

    b.emit_jump(body_block);
    b.switch_to(body_block);
    b.push_jump_frame(JumpFrame::new(JumpKind::Loop, label, exit).with_continue(latch));
    if let Some(body) = body {
        b.build_block(body);
    }
    b.pop_jump_frame();
    b.emit_jump(latch);

    b.seal_block(latch);
    b.switch_to(latch);
    match condition {
        Some(condition) => {
            let cond = condition(b);
            b.emit_branch(cond, body_block, exit);
        }
        None => b.emit_jump(body_block),
    }
    b.seal_block(body_block);

    b.seal_block(exit);
    b.switch_to(exit);
}
