//! Assertions over built programs

use ssagraph_ir::{DiagnosticTag, Program, ValueId, ValueKind};

/// Arguments of every call to `callee`, in creation order
pub fn call_args(program: &Program, callee: &str) -> Vec<Vec<ValueId>> {
    program
        .calls_to(callee)
        .into_iter()
        .filter_map(|id| match &program.value(id).kind {
            ValueKind::Call { args, .. } => Some(args.clone()),
            _ => None,
        })
        .collect()
}

/// Rendered first argument of every call to `callee`
pub fn printed_by(program: &Program, callee: &str) -> Vec<String> {
    call_args(program, callee)
        .into_iter()
        .map(|args| {
            args.first()
                .map(|a| program.render(*a))
                .unwrap_or_default()
        })
        .collect()
}

/// Rendered first argument of every `println` call
pub fn printed(program: &Program) -> Vec<String> {
    printed_by(program, "println")
}

/// Assert the program has no diagnostic with `tag`
pub fn assert_no_diagnostic(program: &Program, tag: DiagnosticTag) {
    let found: Vec<_> = program
        .diagnostics()
        .iter()
        .filter(|d| d.tag == tag)
        .collect();
    assert!(found.is_empty(), "unexpected {tag:?} diagnostics: {found:?}");
}

/// Assert the program has at least one diagnostic with `tag`
pub fn assert_has_diagnostic(program: &Program, tag: DiagnosticTag) {
    assert!(
        program.diagnostics().iter().any(|d| d.tag == tag),
        "expected a {tag:?} diagnostic, got: {:?}",
        program.diagnostics()
    );
}

/// Assert `verify` finds no broken invariant
pub fn assert_verified(program: &Program) {
    let problems = program.verify();
    assert!(problems.is_empty(), "verification failed: {problems:#?}");
}
