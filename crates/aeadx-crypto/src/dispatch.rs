//! # AEAD Dispatcher
//!
//! One generic body per direction/mode, instantiated per algorithm through
//! `AeadPrimitive`. The key-strategy axis collapses early: both a raw key
//! and a precomputed context resolve to a borrowed `P::Cipher` before the
//! primitive is called.
//!
//! ## Output discipline
//! - Output buffers are zero-initialized before the primitive writes them.
//! - A non-zero status never surfaces a buffer; it is wiped and dropped and
//!   the caller sees `Ok(None)`.
//! - A zero status with a short write is an error, not a success.

use crate::descriptor::{Algorithm, AlgorithmDescriptor};
use crate::precompute::{self, PrecomputedContext};
use crate::primitive::{
    AeadPrimitive, Aes256GcmPrimitive, ChaCha20Poly1305IetfPrimitive, ChaCha20Poly1305Primitive,
    XChaCha20Poly1305IetfPrimitive, SUCCESS,
};
use aeadx_core::{check_len, AeadError, AssociatedData, Constraint};
use core::marker::PhantomData;
use core::ops::Deref;
use zeroize::{Zeroize, Zeroizing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Combined,
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStrategy {
    RawKey,
    Precomputed,
}

/// One cell of the direction x mode x key-strategy cross product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    pub direction: Direction,
    pub mode: Mode,
    pub key: KeyStrategy,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::new(Direction::Encrypt, Mode::Combined, KeyStrategy::RawKey),
        Operation::new(Direction::Decrypt, Mode::Combined, KeyStrategy::RawKey),
        Operation::new(Direction::Encrypt, Mode::Detached, KeyStrategy::RawKey),
        Operation::new(Direction::Decrypt, Mode::Detached, KeyStrategy::RawKey),
        Operation::new(Direction::Encrypt, Mode::Combined, KeyStrategy::Precomputed),
        Operation::new(Direction::Decrypt, Mode::Combined, KeyStrategy::Precomputed),
        Operation::new(Direction::Encrypt, Mode::Detached, KeyStrategy::Precomputed),
        Operation::new(Direction::Decrypt, Mode::Detached, KeyStrategy::Precomputed),
    ];

    pub const fn new(direction: Direction, mode: Mode, key: KeyStrategy) -> Self {
        Self {
            direction,
            mode,
            key,
        }
    }

    /// Name suffix, e.g. `decrypt_detached_afternm`.
    pub const fn suffix(&self) -> &'static str {
        match (self.direction, self.mode, self.key) {
            (Direction::Encrypt, Mode::Combined, KeyStrategy::RawKey) => "encrypt",
            (Direction::Decrypt, Mode::Combined, KeyStrategy::RawKey) => "decrypt",
            (Direction::Encrypt, Mode::Detached, KeyStrategy::RawKey) => "encrypt_detached",
            (Direction::Decrypt, Mode::Detached, KeyStrategy::RawKey) => "decrypt_detached",
            (Direction::Encrypt, Mode::Combined, KeyStrategy::Precomputed) => "encrypt_afternm",
            (Direction::Decrypt, Mode::Combined, KeyStrategy::Precomputed) => "decrypt_afternm",
            (Direction::Encrypt, Mode::Detached, KeyStrategy::Precomputed) => {
                "encrypt_detached_afternm"
            }
            (Direction::Decrypt, Mode::Detached, KeyStrategy::Precomputed) => {
                "decrypt_detached_afternm"
            }
        }
    }

    /// Positional argument count on the host surface.
    pub const fn arity(&self) -> usize {
        match (self.direction, self.mode) {
            (Direction::Decrypt, Mode::Detached) => 5,
            _ => 4,
        }
    }
}

/// Key material for one call.
#[derive(Debug, Clone, Copy)]
pub enum KeyInput<'a> {
    Raw(&'a [u8]),
    Context(&'a PrecomputedContext),
}

impl KeyInput<'_> {
    pub fn strategy(&self) -> KeyStrategy {
        match self {
            KeyInput::Raw(_) => KeyStrategy::RawKey,
            KeyInput::Context(_) => KeyStrategy::Precomputed,
        }
    }
}

/// Ciphertext and tag returned separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detached {
    pub ciphertext: Vec<u8>,
    pub mac: Vec<u8>,
}

/// Borrowed inputs of one dispatch. Nothing here outlives the call.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    /// Message on encrypt, ciphertext on decrypt.
    pub input: &'a [u8],
    /// Detached decrypt only.
    pub mac: Option<&'a [u8]>,
    pub associated_data: AssociatedData<'a>,
    pub nonce: &'a [u8],
    pub key: KeyInput<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Ciphertext(Vec<u8>),
    Detached(Detached),
    Plaintext(Vec<u8>),
}

enum Keyed<'a, C> {
    Expanded(C),
    Precomputed(&'a C),
}

impl<C> Deref for Keyed<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        match self {
            Keyed::Expanded(cipher) => cipher,
            Keyed::Precomputed(cipher) => cipher,
        }
    }
}

fn validate_key<P: AeadPrimitive>(
    descriptor: &AlgorithmDescriptor,
    key: KeyInput<'_>,
) -> Result<(), AeadError> {
    match key {
        KeyInput::Raw(raw) => check_len("key", raw, Constraint::Exact(descriptor.key_length))
            .map(|_| ()),
        KeyInput::Context(context) => precompute::resolve::<P>(context).map(|_| ()),
    }
}

fn keyed<'a, P: AeadPrimitive>(key: KeyInput<'a>) -> Result<Keyed<'a, P::Cipher>, AeadError> {
    match key {
        KeyInput::Raw(raw) => P::expand(raw)
            .map(Keyed::Expanded)
            .map_err(|status| AeadError::Primitive {
                operation: "key expansion",
                status,
            }),
        KeyInput::Context(context) => precompute::resolve::<P>(context).map(Keyed::Precomputed),
    }
}

fn rejected<P: AeadPrimitive>(operation: &'static str, key: KeyInput<'_>, status: i32) {
    tracing::debug!(
        algorithm = P::ALGORITHM.name(),
        operation,
        strategy = ?key.strategy(),
        status,
        "primitive rejected input"
    );
}

pub fn encrypt<P: AeadPrimitive>(
    message: &[u8],
    associated_data: AssociatedData<'_>,
    nonce: &[u8],
    key: KeyInput<'_>,
) -> Result<Option<Vec<u8>>, AeadError> {
    let descriptor = P::ALGORITHM.descriptor();
    check_len("nonce", nonce, Constraint::Exact(descriptor.nonce_length))?;
    validate_key::<P>(descriptor, key)?;
    let cipher = keyed::<P>(key)?;

    let expected = message.len() + descriptor.tag_length;
    let mut out = vec![0u8; expected];
    let mut written = 0usize;
    let status = P::encrypt_combined(
        &cipher,
        &mut out,
        &mut written,
        message,
        associated_data.as_option(),
        nonce,
    );
    if status != SUCCESS {
        out.zeroize();
        rejected::<P>("encrypt", key, status);
        return Ok(None);
    }
    if written != expected {
        out.zeroize();
        return Err(AeadError::OutputLength { expected, written });
    }
    Ok(Some(out))
}

pub fn decrypt<P: AeadPrimitive>(
    ciphertext: &[u8],
    associated_data: AssociatedData<'_>,
    nonce: &[u8],
    key: KeyInput<'_>,
) -> Result<Option<Vec<u8>>, AeadError> {
    let descriptor = P::ALGORITHM.descriptor();
    check_len(
        "ciphertext",
        ciphertext,
        Constraint::AtLeast(descriptor.tag_length),
    )?;
    check_len("nonce", nonce, Constraint::Exact(descriptor.nonce_length))?;
    validate_key::<P>(descriptor, key)?;
    let cipher = keyed::<P>(key)?;

    let expected = ciphertext.len() - descriptor.tag_length;
    let mut out = Zeroizing::new(vec![0u8; expected]);
    let mut written = 0usize;
    let status = P::decrypt_combined(
        &cipher,
        &mut out,
        &mut written,
        ciphertext,
        associated_data.as_option(),
        nonce,
    );
    if status != SUCCESS {
        rejected::<P>("decrypt", key, status);
        return Ok(None);
    }
    if written != expected {
        return Err(AeadError::OutputLength { expected, written });
    }
    Ok(Some(core::mem::take(&mut *out)))
}

pub fn encrypt_detached<P: AeadPrimitive>(
    message: &[u8],
    associated_data: AssociatedData<'_>,
    nonce: &[u8],
    key: KeyInput<'_>,
) -> Result<Option<Detached>, AeadError> {
    let descriptor = P::ALGORITHM.descriptor();
    check_len("nonce", nonce, Constraint::Exact(descriptor.nonce_length))?;
    validate_key::<P>(descriptor, key)?;
    let cipher = keyed::<P>(key)?;

    let mut ciphertext = vec![0u8; message.len()];
    let mut mac = vec![0u8; descriptor.tag_length];
    let status = P::encrypt_detached(
        &cipher,
        &mut ciphertext,
        &mut mac,
        message,
        associated_data.as_option(),
        nonce,
    );
    if status != SUCCESS {
        ciphertext.zeroize();
        mac.zeroize();
        rejected::<P>("encrypt_detached", key, status);
        return Ok(None);
    }
    Ok(Some(Detached { ciphertext, mac }))
}

pub fn decrypt_detached<P: AeadPrimitive>(
    ciphertext: &[u8],
    mac: &[u8],
    associated_data: AssociatedData<'_>,
    nonce: &[u8],
    key: KeyInput<'_>,
) -> Result<Option<Vec<u8>>, AeadError> {
    let descriptor = P::ALGORITHM.descriptor();
    check_len("mac", mac, Constraint::Exact(descriptor.tag_length))?;
    check_len("nonce", nonce, Constraint::Exact(descriptor.nonce_length))?;
    validate_key::<P>(descriptor, key)?;
    let cipher = keyed::<P>(key)?;

    let mut out = Zeroizing::new(vec![0u8; ciphertext.len()]);
    let status = P::decrypt_detached(
        &cipher,
        &mut out,
        ciphertext,
        mac,
        associated_data.as_option(),
        nonce,
    );
    if status != SUCCESS {
        rejected::<P>("decrypt_detached", key, status);
        return Ok(None);
    }
    Ok(Some(core::mem::take(&mut *out)))
}

/// Single entry over the whole cross product for one algorithm.
pub fn run<P: AeadPrimitive>(
    direction: Direction,
    mode: Mode,
    request: Request<'_>,
) -> Result<Option<Output>, AeadError> {
    tracing::trace!(
        algorithm = P::ALGORITHM.name(),
        ?direction,
        ?mode,
        strategy = ?request.key.strategy(),
        input_len = request.input.len(),
        ad_len = request.associated_data.len(),
        "dispatch"
    );
    let Request {
        input,
        mac,
        associated_data,
        nonce,
        key,
    } = request;
    match (direction, mode) {
        (Direction::Encrypt, Mode::Combined) => {
            Ok(encrypt::<P>(input, associated_data, nonce, key)?.map(Output::Ciphertext))
        }
        (Direction::Decrypt, Mode::Combined) => {
            Ok(decrypt::<P>(input, associated_data, nonce, key)?.map(Output::Plaintext))
        }
        (Direction::Encrypt, Mode::Detached) => {
            Ok(encrypt_detached::<P>(input, associated_data, nonce, key)?.map(Output::Detached))
        }
        (Direction::Decrypt, Mode::Detached) => {
            let mac = mac.ok_or(AeadError::TypeMismatch { argument: "mac" })?;
            Ok(decrypt_detached::<P>(input, mac, associated_data, nonce, key)?
                .map(Output::Plaintext))
        }
    }
}

/// Runtime selection of the algorithm axis.
pub fn dispatch(
    algorithm: Algorithm,
    direction: Direction,
    mode: Mode,
    request: Request<'_>,
) -> Result<Option<Output>, AeadError> {
    match algorithm {
        Algorithm::Aes256Gcm => run::<Aes256GcmPrimitive>(direction, mode, request),
        Algorithm::ChaCha20Poly1305 => run::<ChaCha20Poly1305Primitive>(direction, mode, request),
        Algorithm::ChaCha20Poly1305Ietf => {
            run::<ChaCha20Poly1305IetfPrimitive>(direction, mode, request)
        }
        Algorithm::XChaCha20Poly1305Ietf => {
            run::<XChaCha20Poly1305IetfPrimitive>(direction, mode, request)
        }
    }
}

/// Combined-mode encrypt with the algorithm chosen at runtime.
pub fn seal(
    algorithm: Algorithm,
    message: &[u8],
    associated_data: AssociatedData<'_>,
    nonce: &[u8],
    key: &[u8],
) -> Result<Option<Vec<u8>>, AeadError> {
    let request = Request {
        input: message,
        mac: None,
        associated_data,
        nonce,
        key: KeyInput::Raw(key),
    };
    match dispatch(algorithm, Direction::Encrypt, Mode::Combined, request)? {
        Some(Output::Ciphertext(c)) => Ok(Some(c)),
        _ => Ok(None),
    }
}

/// Combined-mode decrypt with the algorithm chosen at runtime.
pub fn open(
    algorithm: Algorithm,
    ciphertext: &[u8],
    associated_data: AssociatedData<'_>,
    nonce: &[u8],
    key: &[u8],
) -> Result<Option<Vec<u8>>, AeadError> {
    let request = Request {
        input: ciphertext,
        mac: None,
        associated_data,
        nonce,
        key: KeyInput::Raw(key),
    };
    match dispatch(algorithm, Direction::Decrypt, Mode::Combined, request)? {
        Some(Output::Plaintext(m)) => Ok(Some(m)),
        _ => Ok(None),
    }
}

/// Typed facade over one algorithm: the `crypto_aead_<algo>_*` family.
pub struct Aead<P>(PhantomData<P>);

impl<P: AeadPrimitive> Aead<P> {
    pub fn descriptor() -> &'static AlgorithmDescriptor {
        P::ALGORITHM.descriptor()
    }

    pub fn is_available() -> bool {
        P::is_available()
    }

    pub fn beforenm(key: &[u8]) -> Result<PrecomputedContext, AeadError> {
        precompute::before::<P>(key)
    }

    pub fn encrypt(
        message: &[u8],
        associated_data: AssociatedData<'_>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, AeadError> {
        encrypt::<P>(message, associated_data, nonce, KeyInput::Raw(key))
    }

    pub fn decrypt(
        ciphertext: &[u8],
        associated_data: AssociatedData<'_>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, AeadError> {
        decrypt::<P>(ciphertext, associated_data, nonce, KeyInput::Raw(key))
    }

    pub fn encrypt_detached(
        message: &[u8],
        associated_data: AssociatedData<'_>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Option<Detached>, AeadError> {
        encrypt_detached::<P>(message, associated_data, nonce, KeyInput::Raw(key))
    }

    pub fn decrypt_detached(
        ciphertext: &[u8],
        mac: &[u8],
        associated_data: AssociatedData<'_>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, AeadError> {
        decrypt_detached::<P>(ciphertext, mac, associated_data, nonce, KeyInput::Raw(key))
    }

    pub fn encrypt_afternm(
        message: &[u8],
        associated_data: AssociatedData<'_>,
        nonce: &[u8],
        context: &PrecomputedContext,
    ) -> Result<Option<Vec<u8>>, AeadError> {
        encrypt::<P>(message, associated_data, nonce, KeyInput::Context(context))
    }

    pub fn decrypt_afternm(
        ciphertext: &[u8],
        associated_data: AssociatedData<'_>,
        nonce: &[u8],
        context: &PrecomputedContext,
    ) -> Result<Option<Vec<u8>>, AeadError> {
        decrypt::<P>(ciphertext, associated_data, nonce, KeyInput::Context(context))
    }

    pub fn encrypt_detached_afternm(
        message: &[u8],
        associated_data: AssociatedData<'_>,
        nonce: &[u8],
        context: &PrecomputedContext,
    ) -> Result<Option<Detached>, AeadError> {
        encrypt_detached::<P>(message, associated_data, nonce, KeyInput::Context(context))
    }

    pub fn decrypt_detached_afternm(
        ciphertext: &[u8],
        mac: &[u8],
        associated_data: AssociatedData<'_>,
        nonce: &[u8],
        context: &PrecomputedContext,
    ) -> Result<Option<Vec<u8>>, AeadError> {
        decrypt_detached::<P>(
            ciphertext,
            mac,
            associated_data,
            nonce,
            KeyInput::Context(context),
        )
    }
}

pub type Aes256GcmAead = Aead<Aes256GcmPrimitive>;
pub type ChaCha20Poly1305Aead = Aead<ChaCha20Poly1305Primitive>;
pub type ChaCha20Poly1305IetfAead = Aead<ChaCha20Poly1305IetfPrimitive>;
pub type XChaCha20Poly1305IetfAead = Aead<XChaCha20Poly1305IetfPrimitive>;
