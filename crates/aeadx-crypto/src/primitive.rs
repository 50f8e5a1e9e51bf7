//! The external primitive contract.
//!
//! Each supported algorithm is reached through the same status-code shaped
//! surface: `0` on success, non-zero on failure, outputs written into
//! caller-allocated buffers. The adapters below satisfy it over the
//! RustCrypto AEADs; nothing above this module sees a RustCrypto type.

use crate::descriptor::Algorithm;
use crate::legacy::ChaCha20Poly1305Legacy;
use aes_gcm::Aes256Gcm;
use chacha20poly1305::aead::generic_array::typenum::Unsigned;
use chacha20poly1305::aead::generic_array::GenericArray;
use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, XChaCha20Poly1305};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = -1;

/// Expanded key material owned by a precomputed context.
#[non_exhaustive]
pub enum PrecomputedState {
    Aes256Gcm(Box<Aes256Gcm>),
}

impl PrecomputedState {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            PrecomputedState::Aes256Gcm(_) => Algorithm::Aes256Gcm,
        }
    }
}

/// One AEAD algorithm as the dispatcher sees it.
///
/// `Cipher` is the keyed state. The raw-key strategy expands it per call;
/// the precomputed strategy borrows it from a context via `load`.
pub trait AeadPrimitive: 'static {
    const ALGORITHM: Algorithm;
    type Cipher;

    /// Hardware support probe. Only meaningful for AES-256-GCM.
    fn is_available() -> bool {
        true
    }

    /// Key expansion (`beforenm`).
    fn expand(key: &[u8]) -> Result<Self::Cipher, i32>;

    fn encrypt_detached(
        cipher: &Self::Cipher,
        c: &mut [u8],
        mac: &mut [u8],
        m: &[u8],
        ad: Option<&[u8]>,
        npub: &[u8],
    ) -> i32;

    fn decrypt_detached(
        cipher: &Self::Cipher,
        m: &mut [u8],
        c: &[u8],
        mac: &[u8],
        ad: Option<&[u8]>,
        npub: &[u8],
    ) -> i32;

    /// Writes `c || mac` into `out` and the written length into `out_len`.
    fn encrypt_combined(
        cipher: &Self::Cipher,
        out: &mut [u8],
        out_len: &mut usize,
        m: &[u8],
        ad: Option<&[u8]>,
        npub: &[u8],
    ) -> i32 {
        *out_len = 0;
        let abytes = Self::ALGORITHM.descriptor().tag_length;
        let Some(total) = m.len().checked_add(abytes) else {
            return FAILURE;
        };
        if out.len() < total {
            return FAILURE;
        }
        let (c, mac) = out[..total].split_at_mut(m.len());
        let status = Self::encrypt_detached(cipher, c, mac, m, ad, npub);
        if status == SUCCESS {
            *out_len = total;
        }
        status
    }

    /// Verifies and strips the trailing tag of `c` into `out`.
    fn decrypt_combined(
        cipher: &Self::Cipher,
        out: &mut [u8],
        out_len: &mut usize,
        c: &[u8],
        ad: Option<&[u8]>,
        npub: &[u8],
    ) -> i32 {
        *out_len = 0;
        let abytes = Self::ALGORITHM.descriptor().tag_length;
        let Some(mlen) = c.len().checked_sub(abytes) else {
            return FAILURE;
        };
        if out.len() < mlen {
            return FAILURE;
        }
        let (body, mac) = c.split_at(mlen);
        let status = Self::decrypt_detached(cipher, &mut out[..mlen], body, mac, ad, npub);
        if status == SUCCESS {
            *out_len = mlen;
        }
        status
    }

    /// Moves an expanded cipher into a context. `None` when precompute is unsupported.
    fn store(_cipher: Self::Cipher) -> Option<PrecomputedState> {
        None
    }

    /// Borrows the expanded cipher back out of a context.
    fn load(_state: &PrecomputedState) -> Option<&Self::Cipher> {
        None
    }
}

// The RustCrypto nonce/tag constructors panic on a length mismatch, so the
// lengths are re-checked here even though the dispatcher validated them.
fn seal_detached<C: AeadInPlace>(
    cipher: &C,
    c: &mut [u8],
    mac: &mut [u8],
    m: &[u8],
    ad: Option<&[u8]>,
    npub: &[u8],
) -> i32 {
    if npub.len() != <C::NonceSize as Unsigned>::USIZE
        || mac.len() != <C::TagSize as Unsigned>::USIZE
        || c.len() != m.len()
    {
        return FAILURE;
    }
    c.copy_from_slice(m);
    let nonce = GenericArray::from_slice(npub);
    match cipher.encrypt_in_place_detached(nonce, ad.unwrap_or_default(), c) {
        Ok(tag) => {
            mac.copy_from_slice(&tag);
            SUCCESS
        }
        Err(_) => FAILURE,
    }
}

fn open_detached<C: AeadInPlace>(
    cipher: &C,
    m: &mut [u8],
    c: &[u8],
    mac: &[u8],
    ad: Option<&[u8]>,
    npub: &[u8],
) -> i32 {
    if npub.len() != <C::NonceSize as Unsigned>::USIZE
        || mac.len() != <C::TagSize as Unsigned>::USIZE
        || m.len() != c.len()
    {
        return FAILURE;
    }
    m.copy_from_slice(c);
    match cipher.decrypt_in_place_detached(
        GenericArray::from_slice(npub),
        ad.unwrap_or_default(),
        m,
        GenericArray::from_slice(mac),
    ) {
        Ok(()) => SUCCESS,
        Err(_) => FAILURE,
    }
}

macro_rules! software_primitive {
    ($(#[$meta:meta])* $name:ident, $cipher:ty, $algorithm:expr) => {
        $(#[$meta])*
        pub struct $name;

        impl AeadPrimitive for $name {
            const ALGORITHM: Algorithm = $algorithm;
            type Cipher = $cipher;

            fn expand(key: &[u8]) -> Result<Self::Cipher, i32> {
                <$cipher as KeyInit>::new_from_slice(key).map_err(|_| FAILURE)
            }

            fn encrypt_detached(
                cipher: &Self::Cipher,
                c: &mut [u8],
                mac: &mut [u8],
                m: &[u8],
                ad: Option<&[u8]>,
                npub: &[u8],
            ) -> i32 {
                seal_detached(cipher, c, mac, m, ad, npub)
            }

            fn decrypt_detached(
                cipher: &Self::Cipher,
                m: &mut [u8],
                c: &[u8],
                mac: &[u8],
                ad: Option<&[u8]>,
                npub: &[u8],
            ) -> i32 {
                open_detached(cipher, m, c, mac, ad, npub)
            }
        }
    };
}

software_primitive!(
    /// Original ChaCha20-Poly1305, 64-bit nonce.
    ChaCha20Poly1305Primitive,
    ChaCha20Poly1305Legacy,
    Algorithm::ChaCha20Poly1305
);

software_primitive!(
    /// RFC 8439 ChaCha20-Poly1305, 96-bit nonce.
    ChaCha20Poly1305IetfPrimitive,
    ChaCha20Poly1305,
    Algorithm::ChaCha20Poly1305Ietf
);

software_primitive!(
    /// XChaCha20-Poly1305, 192-bit nonce.
    XChaCha20Poly1305IetfPrimitive,
    XChaCha20Poly1305,
    Algorithm::XChaCha20Poly1305Ietf
);

/// AES-256-GCM. The only algorithm with key-expansion amortization.
pub struct Aes256GcmPrimitive;

impl AeadPrimitive for Aes256GcmPrimitive {
    const ALGORITHM: Algorithm = Algorithm::Aes256Gcm;
    type Cipher = Aes256Gcm;

    fn is_available() -> bool {
        aes_hardware_available()
    }

    fn expand(key: &[u8]) -> Result<Self::Cipher, i32> {
        <Aes256Gcm as KeyInit>::new_from_slice(key).map_err(|_| FAILURE)
    }

    fn encrypt_detached(
        cipher: &Self::Cipher,
        c: &mut [u8],
        mac: &mut [u8],
        m: &[u8],
        ad: Option<&[u8]>,
        npub: &[u8],
    ) -> i32 {
        seal_detached(cipher, c, mac, m, ad, npub)
    }

    fn decrypt_detached(
        cipher: &Self::Cipher,
        m: &mut [u8],
        c: &[u8],
        mac: &[u8],
        ad: Option<&[u8]>,
        npub: &[u8],
    ) -> i32 {
        open_detached(cipher, m, c, mac, ad, npub)
    }

    fn store(cipher: Self::Cipher) -> Option<PrecomputedState> {
        Some(PrecomputedState::Aes256Gcm(Box::new(cipher)))
    }

    fn load(state: &PrecomputedState) -> Option<&Self::Cipher> {
        match state {
            PrecomputedState::Aes256Gcm(cipher) => Some(cipher.as_ref()),
        }
    }
}

/// AES-NI + PCLMULQDQ (+ SSSE3) on x86, AES + PMULL on AArch64.
///
/// `aes-gcm` runs a constant-time software implementation when this is
/// false, so it gates acceleration, not correctness.
pub fn aes_hardware_available() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        std::arch::is_x86_feature_detected!("aes")
            && std::arch::is_x86_feature_detected!("pclmulqdq")
            && std::arch::is_x86_feature_detected!("ssse3")
    }
    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("aes")
            && std::arch::is_aarch64_feature_detected!("pmull")
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}
