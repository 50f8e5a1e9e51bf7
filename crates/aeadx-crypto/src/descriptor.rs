//! Algorithm Descriptor Table.
//!
//! A closed, compile-time set. Every `Algorithm` has exactly one entry and
//! the table is never mutated, so it is read from any thread without locks.

use aeadx_core::AeadError;
use core::fmt;
use core::str::FromStr;
use static_assertions::{const_assert, const_assert_eq};

/// Size of the expanded AES-256-GCM key schedule held by a context.
pub const AES256GCM_STATEBYTES: usize = core::mem::size_of::<aes_gcm::Aes256Gcm>();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    Aes256Gcm,
    ChaCha20Poly1305,
    ChaCha20Poly1305Ietf,
    XChaCha20Poly1305Ietf,
}

/// Fixed-length contract of one algorithm variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmDescriptor {
    pub algorithm: Algorithm,
    /// ABYTES
    pub tag_length: usize,
    /// KEYBYTES
    pub key_length: usize,
    /// NPUBBYTES
    pub nonce_length: usize,
    /// NSECBYTES. Always zero; no supported algorithm takes a secret nonce.
    pub secret_nonce_length: usize,
    /// Zero when `supports_precompute` is false.
    pub state_size: usize,
    pub supports_precompute: bool,
}

static DESCRIPTORS: [AlgorithmDescriptor; 4] = [
    AlgorithmDescriptor {
        algorithm: Algorithm::Aes256Gcm,
        tag_length: 16,
        key_length: 32,
        nonce_length: 12,
        secret_nonce_length: 0,
        state_size: AES256GCM_STATEBYTES,
        supports_precompute: true,
    },
    AlgorithmDescriptor {
        algorithm: Algorithm::ChaCha20Poly1305,
        tag_length: 16,
        key_length: 32,
        nonce_length: 8,
        secret_nonce_length: 0,
        state_size: 0,
        supports_precompute: false,
    },
    AlgorithmDescriptor {
        algorithm: Algorithm::ChaCha20Poly1305Ietf,
        tag_length: 16,
        key_length: 32,
        nonce_length: 12,
        secret_nonce_length: 0,
        state_size: 0,
        supports_precompute: false,
    },
    AlgorithmDescriptor {
        algorithm: Algorithm::XChaCha20Poly1305Ietf,
        tag_length: 16,
        key_length: 32,
        nonce_length: 24,
        secret_nonce_length: 0,
        state_size: 0,
        supports_precompute: false,
    },
];

// Table order must follow the enum discriminants; `lookup` indexes by them.
const_assert_eq!(Algorithm::Aes256Gcm as usize, 0);
const_assert_eq!(Algorithm::XChaCha20Poly1305Ietf as usize, 3);
const_assert!(AES256GCM_STATEBYTES > 0);

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Aes256Gcm,
        Algorithm::ChaCha20Poly1305,
        Algorithm::ChaCha20Poly1305Ietf,
        Algorithm::XChaCha20Poly1305Ietf,
    ];

    /// Host-facing identifier, as used in exported names.
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Aes256Gcm => "aes256gcm",
            Algorithm::ChaCha20Poly1305 => "chacha20poly1305",
            Algorithm::ChaCha20Poly1305Ietf => "chacha20poly1305_ietf",
            Algorithm::XChaCha20Poly1305Ietf => "xchacha20poly1305_ietf",
        }
    }

    #[inline]
    pub fn descriptor(self) -> &'static AlgorithmDescriptor {
        lookup(self)
    }
}

/// Total over `Algorithm`.
#[inline]
pub fn lookup(algorithm: Algorithm) -> &'static AlgorithmDescriptor {
    &DESCRIPTORS[algorithm as usize]
}

pub fn descriptors() -> &'static [AlgorithmDescriptor] {
    &DESCRIPTORS
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = AeadError;

    /// Accepts the hyphenated spellings as well (`chacha20poly1305-ietf`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| AeadError::UnknownAlgorithm(s.to_string()))
    }
}
