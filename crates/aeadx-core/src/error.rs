use core::fmt;
use thiserror::Error;

/// Length requirement reported back to the caller on a rejected buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Exactly(usize),
    AtLeast(usize),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Exactly(n) => write!(f, "{} bytes long", n),
            Expected::AtLeast(n) => write!(f, "at least {} bytes long", n),
        }
    }
}

/// Caller-facing failures of the binding layer.
///
/// Authentication failure is deliberately absent: operations report it as
/// `Ok(None)` so callers branch on it instead of treating it as a bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AeadError {
    #[error("argument {argument} must be a buffer")]
    TypeMismatch { argument: &'static str },

    #[error("argument {argument} must be {expected}")]
    LengthMismatch {
        argument: &'static str,
        expected: Expected,
    },

    #[error("{algorithm} does not support precomputation")]
    UnsupportedAlgorithm { algorithm: &'static str },

    #[error("context was expanded for {found}, not {expected}")]
    AlgorithmMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{algorithm} is not hardware accelerated on this host")]
    Unavailable { algorithm: &'static str },

    #[error("{operation} failed with status {status}")]
    Primitive { operation: &'static str, status: i32 },

    #[error("primitive wrote {written} bytes, expected {expected}")]
    OutputLength { expected: usize, written: usize },

    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),

    #[error("no export named `{0}`")]
    UnknownExport(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AeadError {
    pub fn exact(argument: &'static str, len: usize) -> Self {
        AeadError::LengthMismatch {
            argument,
            expected: Expected::Exactly(len),
        }
    }

    pub fn at_least(argument: &'static str, len: usize) -> Self {
        AeadError::LengthMismatch {
            argument,
            expected: Expected::AtLeast(len),
        }
    }
}

impl From<toml::de::Error> for AeadError {
    fn from(e: toml::de::Error) -> Self {
        AeadError::Config(e.to_string())
    }
}

impl From<std::io::Error> for AeadError {
    fn from(e: std::io::Error) -> Self {
        AeadError::Config(e.to_string())
    }
}
