/*
 * Ssagraph IR - Multi-language SSA Construction Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Span, Diagnostic, Language)
 * - features/    : Vertical slices (filesystem → frontend → ssa)
 * - pipeline/    : Project build orchestration (read → parse → build)
 * - config/      : Build configuration (presets, YAML)
 *
 * Core:
 * - On-demand phi insertion (Braun et al. 2013) driven by structured
 *   builders for if / loop / switch / try
 * - One engine, thin tree-sitter adapters per language (Java, TS/JS, C)
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Builder entry points take many handles
#![allow(clippy::type_complexity)] // Boxed builder callbacks
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::upper_case_acronyms)] // SSA, CFG naming
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::collapsible_else_if)] // else if clarity

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (filesystem, frontend, ssa)
pub mod features;

/// Project build pipeline
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{BuildConfig, Preset, ScopingMode};
pub use errors::{Result, SsaGraphError};
pub use features::filesystem::{FileSystem, LocalFileSystem, MemoryFileSystem};
pub use features::frontend::{
    build_file, build_source, CFrontend, FrontendRegistry, JavaFrontend, LanguageFrontend,
    TypeScriptFrontend,
};
pub use features::ssa::{
    BlockId, BuildSsaUseCase, FunctionId, FunctionSpec, HookRegistry, IfBuilder, Literal,
    LoopBuilder, ModuleSpec, ParamSpec, Program, SsaBuilder, SwitchBuilder, TryBuilder, Type,
    ValueId, ValueKind,
};
pub use pipeline::{CancellationToken, ProjectBuilder};
pub use shared::models::{Diagnostic, DiagnosticTag, Severity, Span};
pub use shared::ports::Language;
