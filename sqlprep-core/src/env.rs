use std::collections::HashMap;
use std::sync::Arc;

use sqlprep_quote::{Quoter, Value};

use crate::error::TemplateError;

/// A named macro callable. Invoked with already
/// unquoted-expanded argument strings; returns the raw SQL fragment to
/// splice at the call site.
pub type Macro = Arc<dyn Fn(&[String]) -> Result<String, TemplateError> + Send + Sync>;

/// `TemplateEnvironment`: everything TPL needs to expand one
/// query. `params`/`args` are per-call; `defines`/`macros` are typically
/// shared across many calls (hence `Arc`-wrapped maps, cheap to clone),
/// turning the reference implementation's
/// process-wide globals into an explicit, passed-in object.
#[derive(Clone)]
pub struct TemplateEnvironment {
    pub params: HashMap<String, Value>,
    pub args: Vec<Value>,
    defines: Arc<HashMap<String, String>>,
    macros: Arc<HashMap<String, Macro>>,
    quoter: Arc<Quoter>,
}

impl TemplateEnvironment {
    pub fn new(quoter: Arc<Quoter>) -> Self {
        TemplateEnvironment {
            params: HashMap::new(),
            args: Vec::new(),
            defines: Arc::new(HashMap::new()),
            macros: Arc::new(HashMap::new()),
            quoter,
        }
    }

    pub fn with_params(mut self, params: HashMap<String, Value>) -> Self {
        self.params = params;
        self
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_defines(mut self, defines: Arc<HashMap<String, String>>) -> Self {
        self.defines = defines;
        self
    }

    pub fn with_macros(mut self, macros: Arc<HashMap<String, Macro>>) -> Self {
        self.macros = macros;
        self
    }

    pub fn quoter(&self) -> &Quoter {
        &self.quoter
    }

    pub fn define(&self, name: &str) -> Result<&str, TemplateError> {
        self.defines
            .get(name)
            .map(|s| s.as_str())
            .ok_or_else(|| TemplateError::UnknownConstant(name.to_string()))
    }

    pub fn macro_fn(&self, name: &str) -> Result<&Macro, TemplateError> {
        self.macros
            .get(name)
            .ok_or_else(|| TemplateError::UnknownMacro(name.to_string()))
    }

    pub fn param(&self, name: &str) -> Result<&Value, TemplateError> {
        self.params
            .get(name)
            .ok_or_else(|| TemplateError::MissingNamedParam(name.to_string()))
    }

    pub fn arg(&self, index: usize) -> Result<&Value, TemplateError> {
        self.args
            .get(index)
            .ok_or_else(|| TemplateError::MissingPositionalArg(index))
    }

    /// Readable by `#if`/`#elif` expressions: identifiers not
    /// bound in `params` fall back to `false`/absent rather than erroring,
    /// matching "globals from the host language are also readable for
    /// convenience" without actually embedding a host-language sandbox.
    pub fn lookup_condition(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

/// Builds the shared (`defines`, `macros`) half of a [`TemplateEnvironment`]
/// once, so many per-call environments can clone it cheaply.
#[derive(Default)]
pub struct EnvironmentBuilder {
    defines: HashMap<String, String>,
    macros: HashMap<String, Macro>,
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        EnvironmentBuilder::default()
    }

    pub fn define(mut self, name: impl Into<String>, sql: impl Into<String>) -> Self {
        self.defines.insert(name.into(), sql.into());
        self
    }

    pub fn macro_fn(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&[String]) -> Result<String, TemplateError> + Send + Sync + 'static,
    ) -> Self {
        self.macros.insert(name.into(), Arc::new(f));
        self
    }

    pub fn build(self, quoter: Arc<Quoter>) -> TemplateEnvironment {
        TemplateEnvironment::new(quoter)
            .with_defines(Arc::new(self.defines))
            .with_macros(Arc::new(self.macros))
    }
}
