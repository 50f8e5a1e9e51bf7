use aeadx_core::{AeadError, HostValue};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A host-callable entry point. Stateless apart from what it captured at
/// registration, so one `Exports` may be shared by any number of threads.
pub type HostFn = Arc<dyn Fn(&[HostValue]) -> Result<HostValue, AeadError> + Send + Sync>;

/// The host surface produced by one registration.
#[derive(Clone, Default)]
pub struct Exports {
    functions: BTreeMap<String, HostFn>,
    constants: BTreeMap<String, HostValue>,
}

impl Exports {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn define_fn(&mut self, name: String, f: HostFn) {
        self.functions.insert(name, f);
    }

    pub(crate) fn define_const(&mut self, name: String, value: HostValue) {
        self.constants.insert(name, value);
    }

    pub fn call(&self, name: &str, args: &[HostValue]) -> Result<HostValue, AeadError> {
        let f = self
            .functions
            .get(name)
            .ok_or_else(|| AeadError::UnknownExport(name.to_string()))?;
        f(args)
    }

    pub fn function(&self, name: &str) -> Option<&HostFn> {
        self.functions.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<&HostValue> {
        self.constants.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name) || self.constants.contains_key(name)
    }

    /// Function names, sorted.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn constant_names(&self) -> impl Iterator<Item = &str> {
        self.constants.keys().map(String::as_str)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }
}

impl fmt::Debug for Exports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exports")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("constants", &self.constants)
            .finish()
    }
}
