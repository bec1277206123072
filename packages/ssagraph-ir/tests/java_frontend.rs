//! Java frontend lowering
//!
//! Method bodies print through `System.out.println`, which stays an
//! undefined member chain and is matched by `calls_to("println")`.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use ssagraph_ir::{DiagnosticTag, ValueKind};

fn method(body: &str) -> String {
    format!(
        "class Main {{\n  static void run(int c, int x, java.util.List<String> items) {{\n{}\n  }}\n}}\n",
        body
    )
}

#[test]
fn test_if_else_on_parameter() {
    let program = build_java(&method(
        "int a; if (c > 0) { a = 2; } else { a = 3; } System.out.println(a);",
    ));
    assert_eq!(printed(&program), vec!["phi(a)[2,3]"]);
    assert_verified(&program);
}

#[test]
fn test_counting_loop() {
    let program = build_java(&method(
        "int i; for (i = 0; i < 10; i++) { System.out.println(i); }",
    ));
    assert_eq!(printed(&program), vec!["phi(i)[0,add(i, 1)]"]);
}

#[test]
fn test_switch_statement_fallthrough() {
    let program = build_java(&method(
        r#"
        int a = 1;
        switch (x) {
            case 1: a = 22;
            case 2: a = 33; break;
            default: a = 44;
        }
        System.out.println(a);
        "#,
    ));
    let rendered = printed(&program).join("");
    assert!(!rendered.contains("22"), "{rendered}");
    assert!(rendered.contains("33") && rendered.contains("44"), "{rendered}");
}

#[test]
fn test_switch_arrow_form_does_not_fall_through() {
    let program = build_java(&method(
        r#"
        int a = 1;
        switch (x) {
            case 1 -> a = 22;
            case 2 -> a = 33;
        }
        System.out.println(a);
        "#,
    ));
    let rendered = printed(&program).join("");
    for expected in ["22", "33", "1"] {
        assert!(rendered.contains(expected), "{expected} missing in {rendered}");
    }
}

#[test]
fn test_switch_expression_merges_arm_values() {
    let program = build_java(&method(
        r#"
        int r = switch (x) {
            case 1 -> 10;
            default -> 20;
        };
        System.out.println(r);
        "#,
    ));
    let rendered = printed(&program).join("");
    assert!(rendered.contains("10") && rendered.contains("20"), "{rendered}");
}

#[test]
fn test_switch_label_shared_with_default() {
    let program = build_java(&method(
        r#"
        int a = 1;
        switch (x) {
            case 1: a = 5; break;
            case 2: default: a = 9; break;
        }
        System.out.println(a);
        "#,
    ));
    assert_eq!(printed(&program), vec!["phi(a)[5,9]"]);
    assert_verified(&program);
}

#[test]
fn test_return_in_try_runs_finally() {
    let program = build_java(&method(
        r#"
        int a = 1;
        try { a = 2; return; }
        catch (Exception e) { a = 3; }
        finally { System.out.println(a); }
        "#,
    ));
    assert_eq!(printed(&program), vec!["phi(a)[2,3]"]);
    assert_verified(&program);
}

#[test]
fn test_throw_in_catch_runs_finally() {
    let program = build_java(&method(
        r#"
        int a = 1;
        try { a = 2; }
        catch (RuntimeException e) { a = 3; throw e; }
        finally { System.out.println(a); }
        "#,
    ));
    assert_eq!(printed(&program), vec!["phi(a)[2,3]"]);
}

#[test]
fn test_try_with_resources_closes_on_early_return() {
    let program = build_java(&method(
        r#"
        try (java.io.Reader r = open()) {
            if (c > 0) { return; }
            System.out.println(1);
        }
        "#,
    ));
    assert_eq!(printed(&program), vec!["1"]);
    let closes = program.calls_to("close");
    assert_eq!(closes.len(), 1);
    let finally = program.value(closes[0]).block;
    assert_eq!(program.block(finally).name, "try.finally");

    let run = program.function_by_name("Main.run").expect("method");
    let resume = run
        .blocks
        .iter()
        .map(|id| program.block(*id))
        .find(|blk| blk.name == "finally.return")
        .expect("early return resumes after finally");
    assert_eq!(resume.preds, vec![finally]);
    assert!(program.block(run.exit).preds.contains(&resume.id));
    assert_verified(&program);
}

#[test]
fn test_labeled_break_exits_outer_loop() {
    let program = build_java(&method(
        r#"
        int a = 0;
        outer:
        for (int i = 0; i < 3; i++) {
            for (int j = 0; j < 3; j++) {
                if (j == 1) { a = 5; break outer; }
                a = 7;
            }
            a = 9;
        }
        System.out.println(a);
        "#,
    ));
    let rendered = printed(&program).join("");
    assert!(rendered.contains('5') && rendered.contains('9'), "{rendered}");
    assert!(!rendered.contains('7'), "{rendered}");
}

#[test]
fn test_class_members_and_method_calls() {
    let program = build_java(
        r#"
        class Counter {
            int count = 0;
            Counter() { count = 1; }
            void inc() { count = count + 1; }
            static void main() {
                Counter c = new Counter();
                c.inc();
            }
        }
        "#,
    );
    let class = program.class_by_name("Counter").expect("class blueprint");
    assert!(class.members.contains_key("count"));
    assert!(class.members.contains_key("inc"));
    assert!(class.constructor.is_some());

    let inc = program.function_by_name("Counter.inc").expect("method");
    assert!(inc.is_method);
    assert!(program.function_by_name("Counter.<init>").is_some());
    assert_eq!(program.calls_to("inc").len(), 1);
}

#[test]
fn test_enhanced_for_uses_iterator_protocol() {
    let program = build_java(&method(
        "for (String s : items) { System.out.println(s); }",
    ));
    assert_eq!(program.calls_to("hasNext").len(), 1);
    assert_eq!(program.calls_to("next").len(), 1);
    let printed_value = call_args(&program, "println")[0][0];
    assert!(matches!(
        program.value(program.resolve(printed_value)).kind,
        ValueKind::Call { .. }
    ));
}

#[test]
fn test_assert_is_reported_unsupported() {
    let program = build_java(&method("assert c > 0;"));
    assert_has_diagnostic(&program, DiagnosticTag::UnsupportedConstruct);
}

#[test]
fn test_syntax_error_is_diagnosed() {
    let program = build_java("class Main { void f() { int = ; } }");
    assert_has_diagnostic(&program, DiagnosticTag::SyntaxError);
}

#[test]
fn test_package_names_the_module() {
    let program = build("src/com/acme/Main.java", "package com.acme;\nclass Main {}\n");
    assert!(program.module_by_key("com.acme.Main").is_some());
}
