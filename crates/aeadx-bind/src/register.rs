//! # Capability Registration
//!
//! Builds the host surface once. Each algorithm contributes the cross
//! product of `Operation`s it supports, its constants, and for AES-256-GCM
//! the hardware probe. Registration is idempotent: the same config always
//! yields the same set of names.

use crate::exports::{Exports, HostFn};
use aeadx_core::{AeadError, Args, BindingConfig, Constraint, HostValue};
use aeadx_crypto::{
    before, run, AeadPrimitive, Aes256GcmPrimitive, Algorithm, ChaCha20Poly1305IetfPrimitive,
    ChaCha20Poly1305Primitive, Direction, KeyInput, KeyStrategy, Mode, Operation, Output,
    PrecomputedContext, Request, XChaCha20Poly1305IetfPrimitive,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registers every configured algorithm.
pub fn bind(config: &BindingConfig) -> Result<Exports, AeadError> {
    let mut algorithms = Vec::with_capacity(config.algorithms.len());
    for name in &config.algorithms {
        let algorithm: Algorithm = name
            .parse()
            .map_err(|_| AeadError::Config(format!("unknown algorithm `{}`", name)))?;
        if !algorithms.contains(&algorithm) {
            algorithms.push(algorithm);
        }
    }

    let mut exports = Exports::new();
    for algorithm in algorithms {
        match algorithm {
            Algorithm::Aes256Gcm => register::<Aes256GcmPrimitive>(&mut exports, config),
            Algorithm::ChaCha20Poly1305 => {
                register::<ChaCha20Poly1305Primitive>(&mut exports, config)
            }
            Algorithm::ChaCha20Poly1305Ietf => {
                register::<ChaCha20Poly1305IetfPrimitive>(&mut exports, config)
            }
            Algorithm::XChaCha20Poly1305Ietf => {
                register::<XChaCha20Poly1305IetfPrimitive>(&mut exports, config)
            }
        }
    }

    tracing::info!(
        functions = exports.function_count(),
        constants = exports.constant_count(),
        "AEAD surface registered"
    );
    Ok(exports)
}

/// Registers one algorithm's entry points and constants.
pub fn register<P: AeadPrimitive>(exports: &mut Exports, config: &BindingConfig) {
    let algorithm = P::ALGORITHM;
    let descriptor = algorithm.descriptor();

    // Software AES is constant time but slow; hosts may opt out of it.
    let mut gated = false;
    if algorithm == Algorithm::Aes256Gcm {
        let available = P::is_available();
        if !available {
            tracing::warn!(
                algorithm = algorithm.name(),
                software_fallback = config.allow_software_aes,
                "no AES hardware support detected"
            );
            gated = !config.allow_software_aes;
        }
        let probe: HostFn = Arc::new(move |_args: &[HostValue]| Ok(HostValue::Bool(available)));
        exports.define_fn(config.export_name(algorithm.name(), "is_available"), probe);
    }

    let precompute = descriptor.supports_precompute && config.export_precompute;
    for operation in Operation::ALL {
        if operation.key == KeyStrategy::Precomputed && !precompute {
            continue;
        }
        let f: HostFn = Arc::new(move |args: &[HostValue]| invoke::<P>(operation, gated, args));
        exports.define_fn(config.export_name(algorithm.name(), operation.suffix()), f);
    }

    if precompute {
        let f: HostFn = Arc::new(move |args: &[HostValue]| beforenm::<P>(gated, args));
        exports.define_fn(config.export_name(algorithm.name(), "beforenm"), f);
    }

    if config.export_constants {
        let mut constants = vec![
            ("KEYBYTES", descriptor.key_length),
            ("NPUBBYTES", descriptor.nonce_length),
            ("ABYTES", descriptor.tag_length),
            ("NSECBYTES", descriptor.secret_nonce_length),
        ];
        if descriptor.supports_precompute {
            constants.push(("STATEBYTES", descriptor.state_size));
        }
        for (suffix, value) in constants {
            exports.define_const(
                config.export_name(algorithm.name(), suffix),
                HostValue::from(value),
            );
        }
    }
}

/// Positional argument names of one operation, in host order.
fn argument_names(operation: Operation) -> &'static [&'static str] {
    match (operation.direction, operation.mode, operation.key) {
        (Direction::Encrypt, _, KeyStrategy::RawKey) => {
            &["message", "associated_data", "nonce", "key"]
        }
        (Direction::Encrypt, _, KeyStrategy::Precomputed) => {
            &["message", "associated_data", "nonce", "context"]
        }
        (Direction::Decrypt, Mode::Combined, KeyStrategy::RawKey) => {
            &["ciphertext", "associated_data", "nonce", "key"]
        }
        (Direction::Decrypt, Mode::Combined, KeyStrategy::Precomputed) => {
            &["ciphertext", "associated_data", "nonce", "context"]
        }
        (Direction::Decrypt, Mode::Detached, KeyStrategy::RawKey) => {
            &["ciphertext", "mac", "associated_data", "nonce", "key"]
        }
        (Direction::Decrypt, Mode::Detached, KeyStrategy::Precomputed) => {
            &["ciphertext", "mac", "associated_data", "nonce", "context"]
        }
    }
}

fn require_arity(names: &[&'static str], values: &[HostValue]) -> Result<(), AeadError> {
    match names.get(values.len()) {
        Some(&argument) => Err(AeadError::TypeMismatch { argument }),
        None => Ok(()),
    }
}

fn invoke<P: AeadPrimitive>(
    operation: Operation,
    gated: bool,
    values: &[HostValue],
) -> Result<HostValue, AeadError> {
    let names = argument_names(operation);
    debug_assert_eq!(names.len(), operation.arity());
    require_arity(names, values)?;
    if gated {
        return Err(AeadError::Unavailable {
            algorithm: P::ALGORITHM.name(),
        });
    }

    let args = Args::new(values);
    let input = args.buffer(0, names[0], Constraint::Any)?;
    let (mac, rest) = match operation.mode {
        Mode::Detached if operation.direction == Direction::Decrypt => {
            (Some(args.buffer(1, names[1], Constraint::Any)?), 2)
        }
        _ => (None, 1),
    };
    let associated_data = args.optional(rest, names[rest])?;
    let nonce = args.buffer(rest + 1, names[rest + 1], Constraint::Any)?;
    let key = match operation.key {
        KeyStrategy::RawKey => KeyInput::Raw(args.buffer(rest + 2, names[rest + 2], Constraint::Any)?),
        KeyStrategy::Precomputed => {
            KeyInput::Context(args.external::<PrecomputedContext>(rest + 2, names[rest + 2])?)
        }
    };

    let request = Request {
        input,
        mac,
        associated_data,
        nonce,
        key,
    };
    let output = run::<P>(operation.direction, operation.mode, request)?;
    Ok(to_host(output))
}

fn beforenm<P: AeadPrimitive>(gated: bool, values: &[HostValue]) -> Result<HostValue, AeadError> {
    require_arity(&["key"], values)?;
    if gated {
        return Err(AeadError::Unavailable {
            algorithm: P::ALGORITHM.name(),
        });
    }
    let key = Args::new(values).buffer(0, "key", Constraint::Any)?;
    before::<P>(key).map(HostValue::external)
}

fn to_host(output: Option<Output>) -> HostValue {
    match output {
        None => HostValue::Undefined,
        Some(Output::Ciphertext(c)) => HostValue::from(c),
        Some(Output::Plaintext(m)) => HostValue::from(m),
        Some(Output::Detached(detached)) => {
            let mut fields = BTreeMap::new();
            fields.insert("cipherText".to_string(), HostValue::from(detached.ciphertext));
            fields.insert("mac".to_string(), HostValue::from(detached.mac));
            HostValue::Object(fields)
        }
    }
}
