//! # aeadx-core: Host Boundary Types
//!
//! Value model, buffer validation, error taxonomy and configuration shared
//! by the crypto and binding crates. Nothing in here touches key material.

pub mod buffer;
pub mod config;
pub mod error;
pub mod value;

pub use buffer::{check_len, optional_buffer, require_buffer, Args, AssociatedData, Constraint};
pub use config::BindingConfig;
pub use error::{AeadError, Expected};
pub use value::HostValue;
