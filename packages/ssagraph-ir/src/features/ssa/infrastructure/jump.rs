//! break / continue target resolution
//!
//! A try statement with a finally block pushes a `Finally` frame. Returns,
//! and breaks or continues whose target lies outside that frame, jump into
//! the finally block and are queued on the frame; the try builder resumes
//! each of them once the finally body is built.

use super::builder::SsaBuilder;
use crate::features::ssa::domain::{BlockId, ValueId};
use crate::shared::models::{DiagnosticTag, Severity};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Loop,
    Switch,
    /// Labeled plain block: `break label` only
    Block,
    /// Finally region; `break_target` is the finally block
    Finally,
}

/// Exit that left a finally region and resumes after its finally block
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingExit {
    Return(ValueId),
    Break(Option<String>),
    Continue(Option<String>),
}

impl PendingExit {
    pub(crate) fn block_name(&self) -> &'static str {
        match self {
            PendingExit::Return(_) => "finally.return",
            PendingExit::Break(_) => "finally.break",
            PendingExit::Continue(_) => "finally.continue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JumpFrame {
    pub(crate) label: Option<String>,
    pub(crate) kind: JumpKind,
    pub(crate) break_target: BlockId,
    pub(crate) continue_target: Option<BlockId>,
    pub(crate) exits: Vec<PendingExit>,
}

impl JumpFrame {
    pub(crate) fn new(kind: JumpKind, label: Option<String>, break_target: BlockId) -> Self {
        Self {
            label,
            kind,
            break_target,
            continue_target: None,
            exits: Vec::new(),
        }
    }

    pub(crate) fn finally(finally_block: BlockId) -> Self {
        Self::new(JumpKind::Finally, None, finally_block)
    }

    pub(crate) fn with_continue(mut self, target: BlockId) -> Self {
        self.continue_target = Some(target);
        self
    }
}

impl SsaBuilder {
    pub(crate) fn push_jump_frame(&mut self, frame: JumpFrame) {
        self.frame_mut().jumps.push(frame);
    }

    pub(crate) fn pop_jump_frame(&mut self) {
        self.frame_mut().jumps.pop();
    }

    /// Pop a `Finally` frame and hand back the exits queued on it
    pub(crate) fn pop_finally_frame(&mut self) -> Vec<PendingExit> {
        match self.frame_mut().jumps.pop() {
            Some(frame) if frame.kind == JumpKind::Finally => frame.exits,
            Some(frame) => {
                self.frame_mut().jumps.push(frame);
                self.diagnose(
                    Severity::Warn,
                    DiagnosticTag::BuilderMisuse,
                    "finally frame is not the innermost jump frame",
                );
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Index of the frame `break` / `break label` leaves
    fn break_frame(&self, label: Option<&str>) -> Option<usize> {
        let jumps = &self.frame().jumps;
        (0..jumps.len()).rev().find(|i| {
            let frame = &jumps[*i];
            match label {
                None => matches!(frame.kind, JumpKind::Loop | JumpKind::Switch),
                Some(label) => frame.label.as_deref() == Some(label),
            }
        })
    }

    /// Index of the loop frame `continue` / `continue label` restarts
    fn continue_frame(&self, label: Option<&str>) -> Option<usize> {
        let jumps = &self.frame().jumps;
        (0..jumps.len())
            .rev()
            .find(|i| {
                let frame = &jumps[*i];
                frame.kind == JumpKind::Loop
                    && label.map_or(true, |l| frame.label.as_deref() == Some(l))
            })
            .filter(|i| jumps[*i].continue_target.is_some())
    }

    /// Innermost `Finally` frame pushed after frame `outer` (any, when `None`)
    pub(crate) fn finally_frame_after(&self, outer: Option<usize>) -> Option<usize> {
        let jumps = &self.frame().jumps;
        let start = outer.map_or(0, |i| i + 1);
        (start..jumps.len())
            .rev()
            .find(|i| jumps[*i].kind == JumpKind::Finally)
    }

    /// Jump into the finally block of frame `index` and queue `exit` on it
    pub(crate) fn route_through_finally(&mut self, index: usize, exit: PendingExit) {
        let current = self.current_block();
        if !self.can_leave(current) {
            return;
        }
        let frame = &mut self.frame_mut().jumps[index];
        let finally_block = frame.break_target;
        trace!(finally = %finally_block, exit = ?exit, "route through finally");
        frame.exits.push(exit);
        self.emit_jump(finally_block);
    }

    /// `break` / `break label`; returns false (with a diagnostic) when no
    /// enclosing construct matches
    pub fn emit_break(&mut self, label: Option<&str>) -> bool {
        let Some(index) = self.break_frame(label) else {
            self.invalid_jump("break", label);
            return false;
        };
        if let Some(finally) = self.finally_frame_after(Some(index)) {
            self.route_through_finally(finally, PendingExit::Break(label.map(str::to_string)));
            return true;
        }
        let target = self.frame().jumps[index].break_target;
        trace!(target = %target, label = ?label, "break");
        self.emit_jump(target);
        true
    }

    /// `continue` / `continue label`
    pub fn emit_continue(&mut self, label: Option<&str>) -> bool {
        let Some(index) = self.continue_frame(label) else {
            self.invalid_jump("continue", label);
            return false;
        };
        if let Some(finally) = self.finally_frame_after(Some(index)) {
            self.route_through_finally(finally, PendingExit::Continue(label.map(str::to_string)));
            return true;
        }
        let Some(target) = self.frame().jumps[index].continue_target else {
            return false;
        };
        trace!(target = %target, label = ?label, "continue");
        self.emit_jump(target);
        true
    }

    fn invalid_jump(&mut self, keyword: &str, label: Option<&str>) {
        let message = match label {
            Some(label) => format!("{} {}: no enclosing target", keyword, label),
            None => format!("{}: no enclosing target", keyword),
        };
        self.diagnose(Severity::Warn, DiagnosticTag::InvalidJump, message);
    }

    /// `label: { ... }` where `break label` leaves the block
    pub fn build_labeled_block(&mut self, label: &str, body: impl FnOnce(&mut Self)) {
        let done = self.new_block("label.done");
        self.push_jump_frame(JumpFrame::new(
            JumpKind::Block,
            Some(label.to_string()),
            done,
        ));
        self.build_block(body);
        self.pop_jump_frame();
        self.emit_jump(done);
        self.seal_block(done);
        self.switch_to(done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::features::ssa::domain::Literal;
    use crate::features::ssa::infrastructure::ModuleSpec;
    use crate::shared::ports::Language;

    #[test]
    fn test_break_outside_loop_is_diagnostic() {
        let mut b = SsaBuilder::new(BuildConfig::default());
        let mut ok = true;
        b.build_module(ModuleSpec::new("t.js", Language::JavaScript), |b| {
            ok = b.emit_break(None);
        });
        let program = b.finish();
        assert!(!ok);
        assert!(program
            .diagnostics()
            .iter()
            .any(|d| d.tag == DiagnosticTag::InvalidJump));
    }

    #[test]
    fn test_labeled_block_break_skips_rest() {
        let mut b = SsaBuilder::new(BuildConfig::default());
        let mut after = None;
        b.build_module(ModuleSpec::new("t.js", Language::JavaScript), |b| {
            let one = b.emit_const(Literal::Int(1));
            b.assign_to_name("a", one);
            b.build_labeled_block("out", |b| {
                let two = b.emit_const(Literal::Int(2));
                b.assign_to_name("a", two);
                b.emit_break(Some("out"));
                let three = b.emit_const(Literal::Int(3));
                b.assign_to_name("a", three);
            });
            after = Some(b.read_value("a"));
        });
        let program = b.finish();
        assert_eq!(program.render(after.unwrap()), "2");
    }

    #[test]
    fn test_unlabeled_break_ignores_labeled_block() {
        let mut b = SsaBuilder::new(BuildConfig::default());
        let mut ok = true;
        b.build_module(ModuleSpec::new("t.js", Language::JavaScript), |b| {
            b.build_labeled_block("out", |b| {
                ok = b.emit_break(None);
            });
        });
        assert!(!ok);
    }
}
