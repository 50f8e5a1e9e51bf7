//! # aeadx-bind: Host Surface
//!
//! Exposes the AEAD family as named, loosely typed entry points
//! (`crypto_aead_<algo>_<op>`) plus their size constants. Hosts call
//! [`bind`] once at load time and keep the returned [`Exports`].
//!
//! An authentication failure returns `HostValue::Undefined`; every other
//! failure is an `Err`.

pub mod exports;
pub mod register;

pub use exports::{Exports, HostFn};
pub use register::{bind, register};

pub use aeadx_core::{AeadError, BindingConfig, HostValue};
pub use aeadx_crypto::PrecomputedContext;
