use bytes::Bytes;
use core::any::Any;
use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A value crossing the host boundary.
///
/// Hosts hand the binding loosely typed arguments; the buffer validator is
/// the only place that narrows them to byte views.
#[derive(Clone)]
pub enum HostValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Buffer(Bytes),
    Object(BTreeMap<String, HostValue>),
    /// Opaque native handle, owned by the host once returned.
    External(Arc<dyn Any + Send + Sync>),
}

impl HostValue {
    pub fn buffer(bytes: impl Into<Bytes>) -> Self {
        HostValue::Buffer(bytes.into())
    }

    pub fn external<T: Any + Send + Sync>(value: T) -> Self {
        HostValue::External(Arc::new(value))
    }

    /// `null` and `undefined` both count as absent.
    pub fn is_absent(&self) -> bool {
        matches!(self, HostValue::Undefined | HostValue::Null)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            HostValue::Buffer(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn downcast_external<T: Any + Send + Sync>(&self) -> Option<&T> {
        match self {
            HostValue::External(handle) => handle.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Field lookup on an object value.
    pub fn get(&self, key: &str) -> Option<&HostValue> {
        match self {
            HostValue::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Bool(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Buffer(_) => "buffer",
            HostValue::Object(_) => "object",
            HostValue::External(_) => "external",
        }
    }
}

// Buffers are printed by length only; they routinely carry plaintext.
impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => f.write_str("Undefined"),
            HostValue::Null => f.write_str("Null"),
            HostValue::Bool(b) => write!(f, "Bool({})", b),
            HostValue::Number(n) => write!(f, "Number({})", n),
            HostValue::String(s) => write!(f, "String({:?})", s),
            HostValue::Buffer(b) => write!(f, "Buffer(<{} bytes>)", b.len()),
            HostValue::Object(fields) => f.debug_map().entries(fields.iter()).finish(),
            HostValue::External(_) => f.write_str("External(..)"),
        }
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(v: Vec<u8>) -> Self {
        HostValue::Buffer(Bytes::from(v))
    }
}

impl From<&'static [u8]> for HostValue {
    fn from(v: &'static [u8]) -> Self {
        HostValue::Buffer(Bytes::from_static(v))
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<usize> for HostValue {
    fn from(n: usize) -> Self {
        HostValue::Number(n as f64)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => HostValue::Null,
        }
    }
}
