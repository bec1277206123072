//! Language frontends
//!
//! Thin adapters from tree-sitter syntax trees onto the SSA builder API.
//! Each adapter maps its node kinds to the closed [`ConstructKind`] /
//! [`ExprKind`] sets and dispatches to the structured builders.
//!
//! Layout:
//! - domain/          : construct and expression kinds
//! - ports/           : `LanguageFrontend` trait, `ParsedUnit`
//! - infrastructure/  : Java, TypeScript / JavaScript and C adapters, registry

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{ConstructKind, ExprKind};
pub use infrastructure::{
    build_file, build_source, build_unit, CFrontend, FrontendRegistry, JavaFrontend,
    TypeScriptFrontend,
};
pub use ports::{LanguageFrontend, ParsedUnit, SpanExt};
