//! Core SSA properties observed through real source
//!
//! Each case prints a variable and checks the rendered value that reaches
//! the print: constants, phis with edges in predecessor order, and
//! `Undefined-<name>` markers.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use ssagraph_ir::{
    BuildConfig, DiagnosticTag, Language, Literal, LoopBuilder, ModuleSpec, SsaBuilder,
};

#[test]
fn test_if_else_merges_both_assignments() {
    let program = build_js("if (c) { a = 2; } else { a = 3; }\nprintln(a);");
    assert_eq!(printed(&program), vec!["phi(a)[2,3]"]);
    assert_verified(&program);
}

#[test]
fn test_empty_if_keeps_single_definition() {
    let program = build_js("a = 1;\nif (c) {}\nprintln(a);");
    assert_eq!(printed(&program), vec!["1"]);
}

#[test]
fn test_if_without_else_merges_with_prior_value() {
    let program = build_js("a = 1;\nif (c) { a = 2; }\nprintln(a);");
    assert_eq!(printed(&program), vec!["phi(a)[2,1]"]);
}

#[test]
fn test_counting_loop_phi_inside_and_after() {
    let program = build_js("for (i = 0; i < 10; i++) { println(i); }\nprintln(i);");
    assert_eq!(
        printed(&program),
        vec!["phi(i)[0,add(i, 1)]", "phi(i)[0,add(i, 1)]"]
    );
    assert_verified(&program);
}

#[test]
fn test_block_scope_shadows_then_restores() {
    let program = build_js("a = 1;\nprintln(a);\n{ let a = 2; println(a); }\nprintln(a);");
    assert_eq!(printed(&program), vec!["1", "2", "1"]);
}

#[test]
fn test_throw_in_catch_runs_finally() {
    let program = build_js(
        "let a = 1;\ntry { a = 2; } catch (e) { a = 3; throw e; } finally { println(a); }",
    );
    assert_eq!(printed(&program), vec!["phi(a)[2,3]"]);
    assert_verified(&program);
}

#[test]
fn test_return_in_loop_inside_try_runs_finally() {
    let program = build_js(
        r#"
        function f(c) {
            let a = 1;
            try {
                while (c) { a = 2; return a; }
            } finally { println(a); }
        }
        "#,
    );
    let rendered = printed(&program).join("");
    assert!(rendered.contains('2'), "{}", rendered);
    assert!(rendered.contains('1'), "{}", rendered);
    assert_verified(&program);
}

#[test]
fn test_value_ids_kept_during_building_resolve_after_finish() {
    let mut b = SsaBuilder::new(BuildConfig::default());
    let mut kept = Vec::new();
    b.build_module(ModuleSpec::new("t.js", Language::JavaScript), |b| {
        let one = b.emit_const(Literal::Int(1));
        b.assign_to_name("a", one);
        let mut inside = None;
        LoopBuilder::new()
            .set_condition(|b| b.read_value("c"))
            .set_body(|b| inside = Some(b.read_value("a")))
            .build(b);
        kept.extend(inside);
        kept.push(b.read_value("a"));
    });
    let program = b.finish();
    let rendered: Vec<String> = kept.iter().map(|v| program.render(*v)).collect();
    assert_eq!(rendered, vec!["1", "1"]);
    assert_verified(&program);
}

#[test]
fn test_switch_fallthrough_runs_following_case() {
    let program = build_js(
        r#"
        a = 1;
        switch (x) {
            case 1: a = 22;
            case 2: a = 33; break;
            default: a = 44;
        }
        println(a);
        "#,
    );
    let rendered = printed(&program).join("");
    assert!(!rendered.contains("22"), "fallthrough overwrote 22: {rendered}");
    assert!(rendered.contains("33") && rendered.contains("44"), "{rendered}");
    assert!(!rendered.contains('1'), "every path assigns: {rendered}");
}

#[test]
fn test_try_catch_finally_sees_both_paths() {
    let program = build_java(
        r#"
        class Main {
            static void run() {
                int a = 1;
                try { a = 2; } catch (Exception e) { a = 3; } finally { System.out.println(a); }
            }
        }
        "#,
    );
    assert_eq!(printed(&program), vec!["phi(a)[2,3]"]);
    assert_verified(&program);
}

#[test]
fn test_labeled_break_leaves_outer_loop() {
    let program = build_js(
        r#"
        let a = 0;
        outer: for (let i = 0; i < 3; i++) {
            for (let j = 0; j < 3; j++) {
                if (j == 1) { a = 5; break outer; }
                a = 7;
            }
            a = 9;
        }
        println(a);
        "#,
    );
    let rendered = printed(&program).join("");
    assert!(rendered.contains('5') && rendered.contains('9'), "{rendered}");
    assert!(!rendered.contains('7'), "inner exit leaked: {rendered}");
    assert_no_diagnostic(&program, DiagnosticTag::InvalidJump);
}

#[test]
fn test_span_round_trip() {
    let source = "let total = compute(41, 1);\nprintln(total);";
    let program = build("spans.js", source);
    let call = program.calls_to("compute")[0];
    let span = program.value(call).span;
    assert_eq!(span.text(source), Some("compute(41, 1)"));

    let literal = program
        .values_at("spans.js", source.find("41").unwrap())
        .into_iter()
        .find(|v| program.render(*v) == "41")
        .expect("literal indexed by byte");
    assert_eq!(program.value(literal).span.text(source), Some("41"));
}

#[test]
fn test_unresolved_name_is_undefined_marker() {
    let program = build_js("println(missing);");
    assert_eq!(printed(&program), vec!["Undefined-missing"]);
    assert_has_diagnostic(&program, DiagnosticTag::UndefinedValue);
}

#[test]
fn test_code_after_return_is_unreachable() {
    let program = build_js("function f() { return 1; println(2); }");
    assert_has_diagnostic(&program, DiagnosticTag::UnreachableCode);
    assert_verified(&program);
}

#[test]
fn test_compound_assignment_rebinds() {
    let program = build_js("a = 1;\na += 2;\nprintln(a);");
    assert_eq!(printed(&program), vec!["add(1, 2)"]);
}

#[test]
fn test_ternary_is_phi_of_synthetic_variable() {
    let program = build_js("x = c ? 1 : 2;\nprintln(x);");
    assert_eq!(printed(&program), vec!["phi(ternary)[1,2]"]);
}

#[test]
fn test_json_export_is_valid() {
    let program = build_js("a = 1;\nif (c) { a = 2; }\nprintln(a);");
    let json = program.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed.get("functions").is_some());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_builds_are_deterministic(depth in 1usize..8) {
        let source = nested_ifs_js(depth);
        let first = build_js(&source);
        let second = build_js(&source);
        prop_assert_eq!(printed(&first), printed(&second));
        prop_assert_eq!(first.dump(), second.dump());
        prop_assert!(first.verify().is_empty());
    }

    #[test]
    fn prop_nested_ifs_reach_every_assignment(depth in 1usize..8) {
        let rendered = printed(&build_js(&nested_ifs_js(depth))).join("");
        for value in 0..=depth {
            prop_assert!(rendered.contains(&value.to_string()), "{} missing in {}", value, rendered);
        }
    }
}
