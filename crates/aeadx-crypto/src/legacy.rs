//! Original (64-bit nonce) ChaCha20-Poly1305.
//!
//! The `chacha20poly1305` crate only ships the IETF and extended-nonce
//! variants, so the original construction is assembled here from the same
//! building blocks and exposed through the RustCrypto `AeadInPlace` trait:
//!
//! - Poly1305 one-time key: first 32 bytes of ChaCha20 block 0.
//! - Encryption: ChaCha20 keystream from block 1 onward.
//! - Tag input: `ad || le64(ad_len) || ciphertext || le64(ciphertext_len)`,
//!   without padding.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::{ChaCha20Legacy, LegacyNonce};
use chacha20poly1305::aead::consts::{U0, U16, U32, U8};
use chacha20poly1305::aead::{AeadCore, AeadInPlace, Error, KeyInit, KeySizeUser};
use chacha20poly1305::aead::{Key, Nonce, Tag};
use poly1305::universal_hash::KeyInit as MacInit;
use poly1305::Poly1305;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

const BLOCK_LEN: usize = 64;

pub struct ChaCha20Poly1305Legacy {
    key: Zeroizing<[u8; 32]>,
}

impl KeySizeUser for ChaCha20Poly1305Legacy {
    type KeySize = U32;
}

impl KeyInit for ChaCha20Poly1305Legacy {
    fn new(key: &Key<Self>) -> Self {
        let mut bytes = Zeroizing::new([0u8; 32]);
        bytes.copy_from_slice(key.as_slice());
        Self { key: bytes }
    }
}

impl AeadCore for ChaCha20Poly1305Legacy {
    type NonceSize = U8;
    type TagSize = U16;
    type CiphertextOverhead = U0;
}

impl ChaCha20Poly1305Legacy {
    /// Keystream positioned at block 1, plus the MAC keyed from block 0.
    fn keystream(&self, nonce: &Nonce<Self>) -> (ChaCha20Legacy, Poly1305) {
        let mut stream = <ChaCha20Legacy as KeyIvInit>::new(
            chacha20::Key::from_slice(&self.key[..]),
            LegacyNonce::from_slice(nonce.as_slice()),
        );
        let mut block0 = Zeroizing::new([0u8; BLOCK_LEN]);
        stream.apply_keystream(&mut block0[..]);
        let mac = <Poly1305 as MacInit>::new(poly1305::Key::from_slice(&block0[..32]));
        (stream, mac)
    }

    fn authenticate(mac: Poly1305, associated_data: &[u8], ciphertext: &[u8]) -> poly1305::Tag {
        let mut input = Vec::with_capacity(associated_data.len() + ciphertext.len() + 16);
        input.extend_from_slice(associated_data);
        input.extend_from_slice(&(associated_data.len() as u64).to_le_bytes());
        input.extend_from_slice(ciphertext);
        input.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
        mac.compute_unpadded(&input)
    }
}

impl AeadInPlace for ChaCha20Poly1305Legacy {
    fn encrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> Result<Tag<Self>, Error> {
        let (mut stream, mac) = self.keystream(nonce);
        stream.apply_keystream(buffer);
        let tag = Self::authenticate(mac, associated_data, buffer);
        Ok(Tag::<Self>::clone_from_slice(tag.as_slice()))
    }

    fn decrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &Tag<Self>,
    ) -> Result<(), Error> {
        let (mut stream, mac) = self.keystream(nonce);
        let expected = Self::authenticate(mac, associated_data, buffer);

        // Verify before touching the buffer; a forged message is never decrypted.
        if bool::from(expected.as_slice().ct_eq(tag.as_slice())) {
            stream.apply_keystream(buffer);
            Ok(())
        } else {
            Err(Error)
        }
    }
}
