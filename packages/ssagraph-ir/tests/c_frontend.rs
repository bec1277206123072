//! C frontend lowering
//!
//! Values are observed through calls to an undeclared `show` function.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use ssagraph_ir::{DiagnosticTag, ValueKind};

fn shown(program: &ssagraph_ir::Program) -> Vec<String> {
    printed_by(program, "show")
}

#[test]
fn test_if_else_merges_locals() {
    let program = build_c(
        "int main(int c) {\n  int a;\n  if (c) { a = 2; } else { a = 3; }\n  show(a);\n  return 0;\n}\n",
    );
    assert_eq!(shown(&program), vec!["phi(a)[2,3]"]);
    assert_verified(&program);
}

#[test]
fn test_for_loop_with_declaration() {
    let program = build_c("void f(void) {\n  for (int i = 0; i < 10; i++) { show(i); }\n}\n");
    assert_eq!(shown(&program), vec!["phi(i)[0,add(i, 1)]"]);
}

#[test]
fn test_switch_fallthrough() {
    let program = build_c(
        r#"
        void f(int x) {
            int a = 1;
            switch (x) {
            case 1: a = 22;
            case 2: a = 33; break;
            default: a = 44;
            }
            show(a);
        }
        "#,
    );
    let rendered = shown(&program).join("");
    assert!(!rendered.contains("22"), "{rendered}");
    assert!(rendered.contains("33") && rendered.contains("44"), "{rendered}");
}

#[test]
fn test_globals_are_shared_between_functions() {
    let program = build_c(
        r#"
        int counter = 5;
        void bump(void) { counter = counter + 1; }
        int main(void) { show(counter); return 0; }
        "#,
    );
    assert_eq!(shown(&program), vec!["add(5, 1)"]);
}

#[test]
fn test_functions_resolve_before_definition() {
    let program = build_c(
        r#"
        int helper(int x);
        int main(void) { return helper(1); }
        int helper(int x) { return x + 1; }
        "#,
    );
    assert_eq!(program.calls_to("helper").len(), 1);
    let helper = program.function_by_name("helper").expect("helper");
    assert!(helper.defined);
    assert_eq!(
        program.functions().iter().filter(|f| f.name == "helper").count(),
        1
    );
    assert_no_diagnostic(&program, DiagnosticTag::UndefinedValue);
}

#[test]
fn test_pointer_and_struct_members() {
    let program = build_c(
        r#"
        struct point { int x; int y; };
        void f(int *p) {
            struct point pt;
            pt.x = 1;
            *p = 3;
            show(pt.x);
            show(*p);
        }
        "#,
    );
    assert_eq!(shown(&program), vec!["1", "3"]);
}

#[test]
fn test_enum_and_define_constants() {
    let program = build_c(
        r#"
        #define LIMIT 10
        enum color { RED, GREEN = 5, BLUE };
        void f(void) { show(LIMIT); show(RED); show(BLUE); }
        "#,
    );
    assert_eq!(shown(&program), vec!["10", "0", "6"]);
}

#[test]
fn test_array_initializer_is_slice() {
    let program = build_c("void f(void) { int xs[] = {1, 2, 3}; show(xs); }");
    let arg = call_args(&program, "show")[0][0];
    assert!(matches!(
        program.value(program.resolve(arg)).kind,
        ValueKind::MakeSlice { .. }
    ));
    assert_eq!(shown(&program), vec!["make([1, 2, 3])"]);
}

#[test]
fn test_goto_is_unsupported() {
    let program = build_c("void f(void) { goto done; done: show(1); }");
    assert_has_diagnostic(&program, DiagnosticTag::UnsupportedConstruct);
    assert_eq!(shown(&program), vec!["1"]);
}

#[test]
fn test_ifdef_branches_are_lowered() {
    let program = build_c(
        r#"
        #ifdef DEBUG
        int level = 2;
        #endif
        void f(void) { show(level); }
        "#,
    );
    assert_eq!(shown(&program), vec!["2"]);
}
