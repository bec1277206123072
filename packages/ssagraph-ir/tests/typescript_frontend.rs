//! TypeScript / JavaScript frontend lowering

mod common;

use common::*;
use pretty_assertions::assert_eq;
use ssagraph_ir::{DiagnosticTag, Language, ValueKind};

#[test]
fn test_function_declarations_are_hoisted() {
    let program = build_js("println(f());\nfunction f() { return 1; }");
    assert_eq!(printed(&program), vec!["Function-f()"]);
    assert_no_diagnostic(&program, DiagnosticTag::UndefinedValue);
}

#[test]
fn test_var_is_function_scoped() {
    let program = build_js("if (c) { var v = 1; }\nprintln(v);");
    assert_eq!(printed(&program), vec!["phi(v)[1,Undefined-v]"]);
}

#[test]
fn test_let_is_block_scoped() {
    let program = build_js("if (c) { let w = 1; }\nprintln(w);");
    assert_eq!(printed(&program), vec!["Undefined-w"]);
}

#[test]
fn test_strict_mode_keeps_implicit_assignments_in_block() {
    let strict = build_js("\"use strict\";\nif (c) { z = 1; }\nprintln(z);");
    assert_eq!(printed(&strict), vec!["Undefined-z"]);

    let sloppy = build_js("if (c) { z = 1; }\nprintln(z);");
    assert_eq!(printed(&sloppy), vec!["phi(z)[1,Undefined-z]"]);
}

#[test]
fn test_closure_reads_free_value() {
    let program = build_js("let k = 1;\nconst g = () => { println(k); };");
    assert_eq!(printed(&program), vec!["FreeValue-k"]);
    let g = program
        .functions()
        .iter()
        .find(|f| !f.free_values.is_empty())
        .expect("closure");
    assert_eq!(g.free_values.len(), 1);
}

#[test]
fn test_class_blueprint_and_method_call() {
    let program = build_ts(
        r#"
        class Greeter {
            greeting: string = "hi";
            constructor(name: string) { this.name = name; }
            greet() { return this.greeting; }
            static create() { return new Greeter("x"); }
        }
        const g = new Greeter("world");
        g.greet();
        "#,
    );
    let class = program.class_by_name("Greeter").expect("class");
    assert!(class.members.contains_key("greeting"));
    assert!(class.members.contains_key("greet"));
    assert!(class.constructor.is_some());
    assert!(program.function_by_name("Greeter.greet").unwrap().is_method);
    assert!(!program.function_by_name("Greeter.create").unwrap().is_method);
    assert_eq!(program.calls_to("greet").len(), 1);
}

#[test]
fn test_object_literal_members_are_tracked() {
    let program = build_js("const o = { x: 1, y: 2 };\no.y = 3;\nprintln(o.x);\nprintln(o.y);");
    assert_eq!(printed(&program), vec!["1", "3"]);
}

#[test]
fn test_destructuring_reads_members() {
    let program = build_js("const { a, b: [c] } = obj;\nprintln(a);\nprintln(c);");
    assert_eq!(printed(&program), vec!["Undefined-obj.a", "Undefined-obj.b.0"]);
}

#[test]
fn test_template_substitutions_flow_into_value() {
    let program = build_js("const n = 41;\nprintln(`value ${n}`);");
    let rendered = printed(&program).join("");
    assert!(rendered.contains("41"), "{rendered}");
}

#[test]
fn test_unresolved_import_is_undefined() {
    let program = build_ts("import { helper } from \"./util\";\nprintln(helper);");
    assert_eq!(printed(&program), vec!["Undefined-helper"]);
    assert_has_diagnostic(&program, DiagnosticTag::UnresolvedImport);
}

#[test]
fn test_exports_register_qualified_symbols() {
    let program = build("src/util.ts", "export const x = 1;\nexport function f() { return x; }");
    let x = program.symbol("src/util.x").expect("exported const");
    assert_eq!(program.render(x), "1");
    let f = program.symbol("src/util.f").expect("exported function");
    assert!(matches!(
        program.value(program.resolve(f)).kind,
        ValueKind::Function { .. }
    ));
}

#[test]
fn test_tsx_parses_with_jsx_grammar() {
    let program = build("src/App.tsx", "export function App() { return <div>{1}</div>; }");
    assert_no_diagnostic(&program, DiagnosticTag::SyntaxError);
    assert_eq!(program.modules()[0].language, Language::TypeScript);
}

#[test]
fn test_do_while_runs_body_first() {
    let program = build_js("let i = 0;\ndo { i = i + 1; } while (i < 3);\nprintln(i);");
    assert_eq!(printed(&program), vec!["add(phi(i)[0,add(i, 1)], 1)"]);
    assert_verified(&program);
}
