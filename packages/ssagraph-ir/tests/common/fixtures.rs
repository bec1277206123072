//! Source fixtures and build helpers

use std::sync::Arc;

use ssagraph_ir::{
    build_file, BuildConfig, CancellationToken, FileSystem, Language, MemoryFileSystem, Program,
    ProjectBuilder,
};

/// Build one source text under `path` with the default configuration
pub fn build(path: &str, source: &str) -> Program {
    build_file(&BuildConfig::default(), path, source)
        .unwrap_or_else(|e| panic!("build of {path} failed: {e}"))
}

pub fn build_js(source: &str) -> Program {
    build("main.js", source)
}

pub fn build_ts(source: &str) -> Program {
    build("main.ts", source)
}

pub fn build_java(source: &str) -> Program {
    build("Main.java", source)
}

pub fn build_c(source: &str) -> Program {
    build("main.c", source)
}

/// In-memory project from `(path, content)` pairs
pub fn memory_project(files: &[(&str, &str)]) -> Arc<dyn FileSystem> {
    let mut fs = MemoryFileSystem::new();
    for (path, content) in files {
        fs.insert(path, *content);
    }
    Arc::new(fs)
}

/// Build every file of an in-memory project under `root`
pub fn build_project(files: &[(&str, &str)], root: &str) -> Program {
    ProjectBuilder::new(BuildConfig::default().workers(2))
        .with_file_system(memory_project(files))
        .build(root, &CancellationToken::new())
        .unwrap_or_else(|e| panic!("project build failed: {e}"))
}

/// JS source with `depth` nested if statements, each assigning `a`
pub fn nested_ifs_js(depth: usize) -> String {
    let mut source = String::from("let a = 0;\n");
    for i in 0..depth {
        source.push_str(&format!("if (c{i}) {{\n  a = {};\n", i + 1));
    }
    for _ in 0..depth {
        source.push_str("}\n");
    }
    source.push_str("println(a);\n");
    source
}

/// JS source with `count` counting loops in sequence
pub fn sequential_loops_js(count: usize) -> String {
    (0..count)
        .map(|i| format!("for (let i{i} = 0; i{i} < 10; i{i}++) {{ total = total + i{i}; }}\n"))
        .collect::<String>()
        + "println(total);\n"
}

pub fn language_of(path: &str) -> Language {
    Language::from_file_path(path).unwrap_or_else(|| panic!("no language for {path}"))
}
