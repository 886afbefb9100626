//! Process-wide *default* registries for defines, macros and attribute
//! overlays — populated once at startup and read-mostly thereafter,
//! mirroring the reference workspace's `OnceCell<Metadata>` singleton
//! (`common/src/schema/schema.rs`) generalized from one hardcoded
//! metadata blob into several explicit registries.
//!
//! `render`/`prepare` never read these implicitly: callers who want the
//! process defaults build a [`TemplateEnvironment`] with
//! [`default_environment`], which snapshots the registries into an
//! explicit, owned environment at call time.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use sqlprep_core::{EnvironmentBuilder, Macro, TemplateEnvironment};
use sqlprep_introspect::AttrRegistry;
use sqlprep_quote::Quoter;

static DEFINES: Lazy<RwLock<HashMap<String, String>>> = Lazy::new(|| RwLock::new(HashMap::new()));
static MACROS: Lazy<RwLock<HashMap<String, Macro>>> = Lazy::new(|| RwLock::new(HashMap::new()));
static ATTR_REGISTRY: Lazy<RwLock<AttrRegistry>> = Lazy::new(|| RwLock::new(AttrRegistry::new()));

/// Registers (or overwrites) a process-wide `#define`.
pub fn define(name: impl Into<String>, sql: impl Into<String>) {
    DEFINES.write().expect("define registry poisoned").insert(name.into(), sql.into());
}

/// Registers (or overwrites) a process-wide `$macro`.
pub fn register_macro(name: impl Into<String>, f: Macro) {
    MACROS.write().expect("macro registry poisoned").insert(name.into(), f);
}

/// Runs `f` with mutable access to the process-wide attribute overlay
/// registry, for startup-time population (`col_attrs`, `col_name_attrs`,
/// `col_type_attrs`, `mysql_col_type_attrs`).
pub fn with_attr_registry<T>(f: impl FnOnce(&mut AttrRegistry) -> T) -> T {
    let mut registry = ATTR_REGISTRY.write().expect("attribute registry poisoned");
    f(&mut registry)
}

/// A snapshot of the current attribute overlay registry, cheap to clone
/// since its maps are typically small and populated once.
pub fn attr_registry_snapshot() -> AttrRegistry {
    ATTR_REGISTRY.read().expect("attribute registry poisoned").clone()
}

/// Builds a [`TemplateEnvironment`] seeded with the process-wide
/// `defines`/`macros` registries, ready for the caller to set
/// `params`/`args` before a single `render`/`prepare` call.
pub fn default_environment(quoter: Arc<Quoter>) -> TemplateEnvironment {
    let defines = DEFINES.read().expect("define registry poisoned").clone();
    let mut builder = EnvironmentBuilder::new();
    for (name, sql) in defines {
        builder = builder.define(name, sql);
    }
    let macros = MACROS.read().expect("macro registry poisoned").clone();
    let mut env = builder.build(quoter);
    env = env.with_macros(Arc::new(macros));
    env
}
