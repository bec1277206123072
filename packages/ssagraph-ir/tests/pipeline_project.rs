//! Project builds: file collection, parallel parsing, cross-file imports

mod common;

use std::fs;
use std::io::Write;
use std::sync::Arc;

use common::*;
use pretty_assertions::assert_eq;
use ssagraph_ir::{
    BuildConfig, CancellationToken, DiagnosticTag, FrontendRegistry, JavaFrontend, Language,
    LocalFileSystem, ProjectBuilder, ScopingMode, SsaGraphError,
};
use tempfile::{NamedTempFile, TempDir};

const TS_PROJECT: &[(&str, &str)] = &[
    (
        "src/app.ts",
        "import { x, twice } from \"./util\";\nprintln(x);\nprintln(twice(x));\n",
    ),
    (
        "src/util.ts",
        "export const x = 42;\nexport function twice(n: number) { return n * 2; }\n",
    ),
];

#[test]
fn test_typescript_import_resolves_exported_symbols() {
    let program = build_project(TS_PROJECT, "src");
    assert_eq!(printed(&program), vec!["42", "Function-twice(42)"]);
    assert!(program.symbol("src/util.x").is_some());
    assert_eq!(program.modules().len(), 2);
    assert_no_diagnostic(&program, DiagnosticTag::UnresolvedImport);
    assert_verified(&program);
}

#[test]
fn test_java_import_builds_dependency_on_demand() {
    let program = build_project(
        &[
            (
                "src/com/acme/Main.java",
                "package com.acme;\nimport com.acme.util.Helper;\nclass Main {\n  static void run() { System.out.println(Helper.two()); }\n}\n",
            ),
            (
                "src/com/acme/util/Helper.java",
                "package com.acme.util;\npublic class Helper {\n  public static int two() { return 2; }\n}\n",
            ),
        ],
        "src",
    );
    assert!(program.module_by_key("com.acme.Main").is_some());
    assert!(program.module_by_key("com.acme.util.Helper").is_some());
    assert_eq!(program.calls_to("two").len(), 1);
    assert_eq!(printed(&program), vec!["Function-Helper.two()"]);
    assert_no_diagnostic(&program, DiagnosticTag::UnresolvedImport);
}

#[test]
fn test_c_include_shares_globals_and_prototypes() {
    let program = build_project(
        &[
            ("src/main.c", "#include \"util.h\"\nint main(void) { show(scale(2)); show(SCALE); return 0; }\n"),
            ("src/util.h", "#define SCALE 3\nint scale(int v);\n"),
            ("src/util.c", "#include \"util.h\"\nint scale(int v) { return v * SCALE; }\n"),
        ],
        "src",
    );
    assert_eq!(printed_by(&program, "show"), vec!["Function-scale(2)", "3"]);
    let scale: Vec<_> = program.functions().iter().filter(|f| f.name == "scale").collect();
    assert_eq!(scale.len(), 1);
    assert!(scale[0].defined);
    assert_eq!(program.modules().len(), 3);
}

#[test]
fn test_disabled_languages_are_skipped() {
    let files = memory_project(&[
        ("src/A.java", "class A {}"),
        ("src/b.ts", "let b = 1;"),
        ("src/c.c", "int c = 1;"),
    ]);
    let program = ProjectBuilder::new(BuildConfig::default().languages([Language::Java]))
        .with_file_system(files)
        .build("src", &CancellationToken::new())
        .unwrap();
    let languages: Vec<Language> = program.modules().iter().map(|m| m.language).collect();
    assert_eq!(languages, vec![Language::Java]);
}

#[test]
fn test_enabled_language_without_frontend_fails() {
    let mut frontends = FrontendRegistry::new();
    frontends.register(Arc::new(JavaFrontend::new()));
    let result = ProjectBuilder::new(BuildConfig::default())
        .with_file_system(memory_project(&[("src/main.c", "int x;")]))
        .with_frontends(frontends)
        .build("src", &CancellationToken::new());
    assert!(matches!(
        result,
        Err(SsaGraphError::UnsupportedLanguage(Language::C))
    ));
}

#[test]
fn test_cancelled_build_stops() {
    let token = CancellationToken::new();
    token.cancel();
    let result = ProjectBuilder::new(BuildConfig::default())
        .with_file_system(memory_project(TS_PROJECT))
        .build("src", &token);
    assert!(result.err().is_some_and(|e| e.is_cancelled()));
}

#[test]
fn test_output_is_independent_of_worker_count() {
    let mut files: Vec<(String, String)> = (0..12)
        .map(|i| (format!("src/m{i:02}.js"), nested_ifs_js(i % 4 + 1)))
        .collect();
    files.push(("src/loops.js".to_string(), sequential_loops_js(3)));
    let files: Vec<(&str, &str)> = files.iter().map(|(p, s)| (p.as_str(), s.as_str())).collect();

    let dumps: Vec<String> = [1, 2, 8]
        .into_iter()
        .map(|workers| {
            ProjectBuilder::new(BuildConfig::default().workers(workers).channel_capacity(2))
                .with_file_system(memory_project(&files))
                .build("src", &CancellationToken::new())
                .unwrap()
                .dump()
        })
        .collect();
    assert_eq!(dumps[0], dumps[1]);
    assert_eq!(dumps[0], dumps[2]);
}

#[test]
fn test_local_file_system_project() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    for (path, content) in TS_PROJECT {
        fs::write(dir.path().join(path), content).unwrap();
    }
    fs::create_dir_all(dir.path().join("node_modules/dep")).unwrap();
    fs::write(dir.path().join("node_modules/dep/index.js"), "println(0);").unwrap();

    let program = ProjectBuilder::new(BuildConfig::default())
        .with_file_system(Arc::new(LocalFileSystem::new()))
        .build(&dir.path().to_string_lossy(), &CancellationToken::new())
        .unwrap();
    assert_eq!(printed(&program), vec!["42", "Function-twice(42)"]);
    assert_eq!(program.modules().len(), 2);
}

#[test]
fn test_yaml_config_drives_project_build() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        b"version: 1\npreset: strict\nparallel:\n  workers: 2\nlanguages: [javascript]\n",
    )
    .unwrap();
    let config = BuildConfig::from_yaml(file.path()).unwrap();
    assert_eq!(config.scoping, ScopingMode::Block);
    assert!(!config.language_enabled(Language::TypeScript));

    let program = ProjectBuilder::new(config)
        .with_file_system(memory_project(&[
            ("src/main.js", "if (c) { z = 1; }\nprintln(z);"),
            ("src/skip.ts", "println(1);"),
        ]))
        .build("src", &CancellationToken::new())
        .unwrap();
    assert_eq!(printed(&program), vec!["Undefined-z"]);
}

#[test]
fn test_missing_root_is_file_system_error() {
    let result = ProjectBuilder::new(BuildConfig::default())
        .with_file_system(memory_project(TS_PROJECT))
        .build("lib", &CancellationToken::new());
    assert!(matches!(result, Err(SsaGraphError::FileSystem(_))));
}

#[test]
fn test_extension_override_picks_up_files() {
    let files = memory_project(&[("src/legacy.es6", "let a = 7;\nprintln(a);")]);
    let plain = ProjectBuilder::new(BuildConfig::default())
        .with_file_system(files.clone())
        .build("src", &CancellationToken::new())
        .unwrap();
    assert!(plain.modules().is_empty());

    let program = ProjectBuilder::new(BuildConfig::default().extension("es6", Language::JavaScript))
        .with_file_system(files)
        .build("src", &CancellationToken::new())
        .unwrap();
    assert_eq!(printed(&program), vec!["7"]);
    assert_eq!(program.modules()[0].language, Language::JavaScript);
}
