//! SSA ports
//!
//! Seams where callers plug behaviour into a build: framework hooks that see
//! every emitted call, and the loader that builds imported modules on demand.

mod hook;
mod module_loader;

pub use hook::{CallHook, CallSite};
pub use module_loader::{ImportRequest, ModuleBuild, ModuleLoader};
