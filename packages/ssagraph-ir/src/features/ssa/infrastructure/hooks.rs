//! Framework hook registry
//!
//! Built once at start-up from configured names and shared by `Arc` with
//! every builder of a project build.

use super::builder::SsaBuilder;
use crate::features::ssa::ports::{CallHook, CallSite};
use crate::shared::ports::Language;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Hook names accepted in `BuildConfig::hooks`
pub const BUILTIN_HOOKS: &[&str] = &["servlet", "express"];

#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: IndexMap<String, Arc<dyn CallHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in hook
    pub fn with_builtins() -> Self {
        let names: Vec<String> = BUILTIN_HOOKS.iter().map(|s| s.to_string()).collect();
        Self::from_names(&names)
    }

    /// Built-in hooks by name; unknown names are skipped with a warning
    pub fn from_names(names: &[String]) -> Self {
        let mut registry = Self::new();
        for name in names {
            match builtin(name) {
                Some(hook) => registry.register(hook),
                None => warn!(hook = %name, "unknown hook name ignored"),
            }
        }
        registry
    }

    /// Add (or replace) a hook under its own name
    pub fn register(&mut self, hook: Arc<dyn CallHook>) {
        self.hooks.insert(hook.name().to_string(), hook);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CallHook>> {
        self.hooks.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.hooks.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CallHook>> {
        self.hooks.values()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.names())
            .finish()
    }
}

fn builtin(name: &str) -> Option<Arc<dyn CallHook>> {
    match name {
        "servlet" => Some(Arc::new(ServletRequestHook)),
        "express" => Some(Arc::new(ExpressRequestHook)),
        _ => None,
    }
}

/// Marks `HttpServletRequest` accessors as untrusted sources
#[derive(Debug, Clone, Copy, Default)]
pub struct ServletRequestHook;

impl ServletRequestHook {
    pub const ANNOTATION: &'static str = "source:servlet-request";
    const METHODS: &'static [&'static str] = &[
        "getParameter",
        "getParameterValues",
        "getParameterMap",
        "getHeader",
        "getHeaders",
        "getQueryString",
        "getCookies",
        "getInputStream",
        "getReader",
    ];
}

impl CallHook for ServletRequestHook {
    fn name(&self) -> &str {
        "servlet"
    }

    fn matches(&self, site: &CallSite) -> bool {
        site.language == Some(Language::Java)
            && site.receiver.is_some()
            && site
                .method
                .as_deref()
                .is_some_and(|m| Self::METHODS.contains(&m))
    }

    fn on_call(&self, builder: &mut SsaBuilder, site: &CallSite) {
        builder.annotate(site.call, Self::ANNOTATION);
    }
}

/// Marks Express `req.param()` / `req.get()` / `req.header()` as sources
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressRequestHook;

impl ExpressRequestHook {
    pub const ANNOTATION: &'static str = "source:express-request";
    const METHODS: &'static [&'static str] = &["param", "get", "header"];
    const RECEIVERS: &'static [&'static str] = &["req", "request"];
}

impl CallHook for ExpressRequestHook {
    fn name(&self) -> &str {
        "express"
    }

    fn matches(&self, site: &CallSite) -> bool {
        matches!(
            site.language,
            Some(Language::TypeScript) | Some(Language::JavaScript)
        ) && site
            .receiver_name
            .as_deref()
            .is_some_and(|r| Self::RECEIVERS.contains(&r))
            && site
                .method
                .as_deref()
                .is_some_and(|m| Self::METHODS.contains(&m))
    }

    fn on_call(&self, builder: &mut SsaBuilder, site: &CallSite) {
        builder.annotate(site.call, Self::ANNOTATION);
    }
}
