//! # aeadx-crypto: AEAD Dispatch
//!
//! ## Layout
//! - **descriptor**: fixed lengths per algorithm, a closed table.
//! - **primitive**: the status-code contract and its RustCrypto adapters.
//! - **precompute**: the `beforenm` / `afternm` two-phase protocol.
//! - **dispatch**: validation, output allocation, status interpretation.
//!
//! Every operation returns `Result<Option<T>, AeadError>`. `Ok(None)` is an
//! authentication (or encryption) failure and never carries partial output.

pub mod descriptor;
pub mod dispatch;
pub mod legacy;
pub mod precompute;
pub mod primitive;

pub use descriptor::{lookup, Algorithm, AlgorithmDescriptor, AES256GCM_STATEBYTES};
pub use dispatch::{
    dispatch, open, run, seal, Aead, Aes256GcmAead, ChaCha20Poly1305Aead,
    ChaCha20Poly1305IetfAead, Detached, Direction, KeyInput, KeyStrategy, Mode, Operation,
    Output, Request, XChaCha20Poly1305IetfAead,
};
pub use precompute::{before, PrecomputedContext};
pub use primitive::{
    aes_hardware_available, AeadPrimitive, Aes256GcmPrimitive, ChaCha20Poly1305IetfPrimitive,
    ChaCha20Poly1305Primitive, PrecomputedState, XChaCha20Poly1305IetfPrimitive, FAILURE,
    SUCCESS,
};

pub use aeadx_core::{AeadError, AssociatedData};
