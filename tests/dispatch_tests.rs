//! # Dispatch Layer Tests: Combined / Detached Operations
//!
//! Validates round trips, tamper detection, length validation ordering and
//! status interpretation of the generic dispatcher. Fake primitives count
//! their invocations per thread so validation can be shown to run first.

use aeadx_crypto::{
    dispatch, open, run, seal, AeadError, AeadPrimitive, Algorithm, AssociatedData,
    ChaCha20Poly1305IetfAead, ChaCha20Poly1305Aead, Direction, KeyInput, Mode, Output, Request,
    XChaCha20Poly1305IetfAead, FAILURE, SUCCESS,
};
use std::cell::Cell;
use std::time::Instant;

thread_local! {
    static EXPANSIONS: Cell<usize> = Cell::new(0);
    static CALLS: Cell<usize> = Cell::new(0);
}

fn calls() -> (usize, usize) {
    (EXPANSIONS.with(Cell::get), CALLS.with(Cell::get))
}

/// Copies input to output, writes a tag of `0xAA`. Always succeeds.
struct CountingPrimitive;

impl AeadPrimitive for CountingPrimitive {
    const ALGORITHM: Algorithm = Algorithm::ChaCha20Poly1305Ietf;
    type Cipher = ();

    fn expand(_key: &[u8]) -> Result<(), i32> {
        EXPANSIONS.with(|c| c.set(c.get() + 1));
        Ok(())
    }

    fn encrypt_detached(
        _cipher: &(),
        c: &mut [u8],
        mac: &mut [u8],
        m: &[u8],
        _ad: Option<&[u8]>,
        _npub: &[u8],
    ) -> i32 {
        CALLS.with(|n| n.set(n.get() + 1));
        c.copy_from_slice(m);
        mac.fill(0xAA);
        SUCCESS
    }

    fn decrypt_detached(
        _cipher: &(),
        m: &mut [u8],
        c: &[u8],
        _mac: &[u8],
        _ad: Option<&[u8]>,
        _npub: &[u8],
    ) -> i32 {
        CALLS.with(|n| n.set(n.get() + 1));
        m.copy_from_slice(c);
        SUCCESS
    }
}

/// Writes plaintext-looking bytes, then reports failure.
struct RejectingPrimitive;

impl AeadPrimitive for RejectingPrimitive {
    const ALGORITHM: Algorithm = Algorithm::ChaCha20Poly1305Ietf;
    type Cipher = ();

    fn expand(_key: &[u8]) -> Result<(), i32> {
        Ok(())
    }

    fn encrypt_detached(
        _cipher: &(),
        c: &mut [u8],
        _mac: &mut [u8],
        m: &[u8],
        _ad: Option<&[u8]>,
        _npub: &[u8],
    ) -> i32 {
        c.copy_from_slice(m);
        FAILURE
    }

    fn decrypt_detached(
        _cipher: &(),
        m: &mut [u8],
        c: &[u8],
        _mac: &[u8],
        _ad: Option<&[u8]>,
        _npub: &[u8],
    ) -> i32 {
        m.copy_from_slice(c);
        FAILURE
    }
}

/// Reports success but claims one byte fewer than the layout requires.
struct ShortWritePrimitive;

impl AeadPrimitive for ShortWritePrimitive {
    const ALGORITHM: Algorithm = Algorithm::ChaCha20Poly1305Ietf;
    type Cipher = ();

    fn expand(_key: &[u8]) -> Result<(), i32> {
        Ok(())
    }

    fn encrypt_detached(
        _cipher: &(),
        _c: &mut [u8],
        _mac: &mut [u8],
        _m: &[u8],
        _ad: Option<&[u8]>,
        _npub: &[u8],
    ) -> i32 {
        SUCCESS
    }

    fn decrypt_detached(
        _cipher: &(),
        _m: &mut [u8],
        _c: &[u8],
        _mac: &[u8],
        _ad: Option<&[u8]>,
        _npub: &[u8],
    ) -> i32 {
        SUCCESS
    }

    fn encrypt_combined(
        _cipher: &(),
        _out: &mut [u8],
        out_len: &mut usize,
        m: &[u8],
        _ad: Option<&[u8]>,
        _npub: &[u8],
    ) -> i32 {
        *out_len = m.len() + 15;
        SUCCESS
    }
}

/// Key expansion that always fails.
struct BrokenKeyPrimitive;

impl AeadPrimitive for BrokenKeyPrimitive {
    const ALGORITHM: Algorithm = Algorithm::ChaCha20Poly1305Ietf;
    type Cipher = ();

    fn expand(_key: &[u8]) -> Result<(), i32> {
        Err(-7)
    }

    fn encrypt_detached(
        _cipher: &(),
        _c: &mut [u8],
        _mac: &mut [u8],
        _m: &[u8],
        _ad: Option<&[u8]>,
        _npub: &[u8],
    ) -> i32 {
        SUCCESS
    }

    fn decrypt_detached(
        _cipher: &(),
        _m: &mut [u8],
        _c: &[u8],
        _mac: &[u8],
        _ad: Option<&[u8]>,
        _npub: &[u8],
    ) -> i32 {
        SUCCESS
    }
}

fn request<'a>(input: &'a [u8], nonce: &'a [u8], key: &'a [u8]) -> Request<'a> {
    Request {
        input,
        mac: None,
        associated_data: AssociatedData::Absent,
        nonce,
        key: KeyInput::Raw(key),
    }
}

/// Encrypt then decrypt returns the original message for every algorithm.
#[test]
fn test_roundtrip_all_algorithms() {
    let t = Instant::now();

    let key = [0x42u8; 32];
    let message = b"the quick brown fox jumps over the lazy dog";
    let ad: &[u8] = b"header";

    for algorithm in Algorithm::ALL {
        let d = algorithm.descriptor();
        let nonce = vec![0x24u8; d.nonce_length];

        let sealed = seal(algorithm, message, ad.into(), &nonce, &key)
            .unwrap()
            .expect("encryption succeeds");
        assert_eq!(sealed.len(), message.len() + d.tag_length, "{}", algorithm);

        let opened = open(algorithm, &sealed, ad.into(), &nonce, &key)
            .unwrap()
            .expect("authentication succeeds");
        assert_eq!(opened, message, "{}", algorithm);
    }

    let overhead = t.elapsed();
    println!("test_roundtrip_all_algorithms: Testing Overhead = {:?}", overhead);
}

/// Detached output concatenated equals combined output.
#[test]
fn test_detached_matches_combined() {
    let t = Instant::now();

    let key = [9u8; 32];
    let message = b"detached and combined agree";

    for algorithm in Algorithm::ALL {
        let nonce = vec![3u8; algorithm.descriptor().nonce_length];
        let combined = seal(algorithm, message, AssociatedData::Absent, &nonce, &key)
            .unwrap()
            .unwrap();

        let out = dispatch(
            algorithm,
            Direction::Encrypt,
            Mode::Detached,
            request(message, &nonce, &key),
        )
        .unwrap();
        let Some(Output::Detached(detached)) = out else {
            panic!("expected detached output for {}", algorithm);
        };
        assert_eq!(detached.mac.len(), 16);
        let mut joined = detached.ciphertext.clone();
        joined.extend_from_slice(&detached.mac);
        assert_eq!(joined, combined, "{}", algorithm);

        let opened = dispatch(
            algorithm,
            Direction::Decrypt,
            Mode::Detached,
            Request {
                mac: Some(detached.mac.as_slice()),
                ..request(&detached.ciphertext, &nonce, &key)
            },
        )
        .unwrap();
        assert_eq!(opened, Some(Output::Plaintext(message.to_vec())));
    }

    let overhead = t.elapsed();
    println!("test_detached_matches_combined: Testing Overhead = {:?}", overhead);
}

/// Any single flipped bit makes decryption return `Ok(None)`.
#[test]
fn test_tamper_detection() {
    let t = Instant::now();

    let key = [1u8; 32];
    let nonce = [2u8; 24];
    let message = b"integrity matters";
    let ad = AssociatedData::Present(b"ad");
    let sealed = XChaCha20Poly1305IetfAead::encrypt(message, ad, &nonce, &key)
        .unwrap()
        .unwrap();

    for i in 0..sealed.len() {
        let mut forged = sealed.clone();
        forged[i] ^= 0x01;
        let result =
            XChaCha20Poly1305IetfAead::decrypt(&forged, ad, &nonce, &key).unwrap();
        assert!(result.is_none(), "flip at byte {} was accepted", i);
    }

    // Wrong associated data, wrong nonce and wrong key are all rejected.
    assert!(XChaCha20Poly1305IetfAead::decrypt(&sealed, AssociatedData::Present(b"xx"), &nonce, &key)
        .unwrap()
        .is_none());
    assert!(XChaCha20Poly1305IetfAead::decrypt(&sealed, ad, &[0u8; 24], &key)
        .unwrap()
        .is_none());
    assert!(XChaCha20Poly1305IetfAead::decrypt(&sealed, ad, &nonce, &[0u8; 32])
        .unwrap()
        .is_none());

    let overhead = t.elapsed();
    println!("test_tamper_detection: Testing Overhead = {:?}", overhead);
}

/// A detached tag from a different message fails verification.
#[test]
fn test_detached_tag_swap_rejected() {
    let t = Instant::now();

    let key = [5u8; 32];
    let nonce = [6u8; 8];
    let a = ChaCha20Poly1305Aead::encrypt_detached(b"first", AssociatedData::Absent, &nonce, &key)
        .unwrap()
        .unwrap();
    let b = ChaCha20Poly1305Aead::encrypt_detached(b"other", AssociatedData::Absent, &nonce, &key)
        .unwrap()
        .unwrap();

    let swapped = ChaCha20Poly1305Aead::decrypt_detached(
        &a.ciphertext,
        &b.mac,
        AssociatedData::Absent,
        &nonce,
        &key,
    )
    .unwrap();
    assert_eq!(swapped, None);

    let overhead = t.elapsed();
    println!("test_detached_tag_swap_rejected: Testing Overhead = {:?}", overhead);
}

/// Empty messages are valid: ciphertext is exactly one tag.
#[test]
fn test_empty_message() {
    let t = Instant::now();

    let key = [0u8; 32];
    let nonce = [0u8; 12];
    let sealed = ChaCha20Poly1305IetfAead::encrypt(&[], AssociatedData::Absent, &nonce, &key)
        .unwrap()
        .unwrap();
    assert_eq!(sealed.len(), 16);
    let opened = ChaCha20Poly1305IetfAead::decrypt(&sealed, AssociatedData::Absent, &nonce, &key)
        .unwrap()
        .unwrap();
    assert!(opened.is_empty());

    let overhead = t.elapsed();
    println!("test_empty_message: Testing Overhead = {:?}", overhead);
}

/// Ciphertext shorter than a tag is a length error, never a failed decrypt.
#[test]
fn test_short_ciphertext_is_length_error() {
    let t = Instant::now();

    for algorithm in Algorithm::ALL {
        let d = algorithm.descriptor();
        let nonce = vec![0u8; d.nonce_length];
        let err = open(algorithm, &[0u8; 15], AssociatedData::Absent, &nonce, &[0u8; 32])
            .unwrap_err();
        assert_eq!(err, AeadError::at_least("ciphertext", d.tag_length), "{}", algorithm);
    }

    let overhead = t.elapsed();
    println!("test_short_ciphertext_is_length_error: Testing Overhead = {:?}", overhead);
}

/// Nonce, key and mac lengths are checked exactly.
#[test]
fn test_exact_length_errors() {
    let t = Instant::now();

    let key = [0u8; 32];
    let err = seal(Algorithm::Aes256Gcm, b"m", AssociatedData::Absent, &[0u8; 8], &key)
        .unwrap_err();
    assert_eq!(err, AeadError::exact("nonce", 12));

    let err = seal(
        Algorithm::ChaCha20Poly1305,
        b"m",
        AssociatedData::Absent,
        &[0u8; 8],
        &key[..16],
    )
    .unwrap_err();
    assert_eq!(err, AeadError::exact("key", 32));
    assert_eq!(err.to_string(), "argument key must be 32 bytes long");

    let err = ChaCha20Poly1305IetfAead::decrypt_detached(
        b"abc",
        &[0u8; 15],
        AssociatedData::Absent,
        &[0u8; 12],
        &key,
    )
    .unwrap_err();
    assert_eq!(err, AeadError::exact("mac", 16));

    let overhead = t.elapsed();
    println!("test_exact_length_errors: Testing Overhead = {:?}", overhead);
}

/// Invalid lengths never reach key expansion or the primitive.
#[test]
fn test_validation_precedes_primitive() {
    let t = Instant::now();

    let key = [0u8; 32];
    let nonce = [0u8; 12];

    let bad_requests = [
        (Direction::Encrypt, Mode::Combined, request(b"m", &nonce[..11], &key)),
        (Direction::Encrypt, Mode::Detached, request(b"m", &nonce, &key[..31])),
        (Direction::Decrypt, Mode::Combined, request(&[0u8; 15], &nonce, &key)),
        (
            Direction::Decrypt,
            Mode::Detached,
            Request {
                mac: Some(&[0u8; 17]),
                ..request(b"c", &nonce, &key)
            },
        ),
    ];
    for (direction, mode, req) in bad_requests {
        assert!(run::<CountingPrimitive>(direction, mode, req).is_err());
    }
    assert_eq!(calls(), (0, 0));

    let ok = run::<CountingPrimitive>(
        Direction::Encrypt,
        Mode::Combined,
        request(b"hello", &nonce, &key),
    )
    .unwrap();
    assert_eq!(calls(), (1, 1));
    let mut expected = b"hello".to_vec();
    expected.extend_from_slice(&[0xAA; 16]);
    assert_eq!(ok, Some(Output::Ciphertext(expected)));

    let overhead = t.elapsed();
    println!("test_validation_precedes_primitive: Testing Overhead = {:?}", overhead);
}

/// A detached decrypt without a mac is a type mismatch.
#[test]
fn test_detached_decrypt_requires_mac() {
    let t = Instant::now();

    let err = run::<CountingPrimitive>(
        Direction::Decrypt,
        Mode::Detached,
        request(b"c", &[0u8; 12], &[0u8; 32]),
    )
    .unwrap_err();
    assert_eq!(err, AeadError::TypeMismatch { argument: "mac" });

    let overhead = t.elapsed();
    println!("test_detached_decrypt_requires_mac: Testing Overhead = {:?}", overhead);
}

/// A non-zero status surfaces as `Ok(None)` in every direction and mode.
#[test]
fn test_failure_status_is_none() {
    let t = Instant::now();

    let key = [0u8; 32];
    let nonce = [0u8; 12];
    let ciphertext = [0x55u8; 32];
    let mac = [0u8; 16];

    let cases = [
        (Direction::Encrypt, Mode::Combined, request(b"secret", &nonce, &key)),
        (Direction::Encrypt, Mode::Detached, request(b"secret", &nonce, &key)),
        (Direction::Decrypt, Mode::Combined, request(&ciphertext, &nonce, &key)),
        (
            Direction::Decrypt,
            Mode::Detached,
            Request {
                mac: Some(&mac),
                ..request(&ciphertext, &nonce, &key)
            },
        ),
    ];
    for (direction, mode, req) in cases {
        let out = run::<RejectingPrimitive>(direction, mode, req).unwrap();
        assert_eq!(out, None, "{:?} {:?}", direction, mode);
    }

    let overhead = t.elapsed();
    println!("test_failure_status_is_none: Testing Overhead = {:?}", overhead);
}

/// Success with the wrong written length is an error, not a result.
#[test]
fn test_short_write_is_output_length_error() {
    let t = Instant::now();

    let err = run::<ShortWritePrimitive>(
        Direction::Encrypt,
        Mode::Combined,
        request(b"abcd", &[0u8; 12], &[0u8; 32]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        AeadError::OutputLength {
            expected: 20,
            written: 19
        }
    );

    let overhead = t.elapsed();
    println!("test_short_write_is_output_length_error: Testing Overhead = {:?}", overhead);
}

/// A failing key expansion is a primitive error carrying the status.
#[test]
fn test_key_expansion_failure() {
    let t = Instant::now();

    let err = run::<BrokenKeyPrimitive>(
        Direction::Encrypt,
        Mode::Combined,
        request(b"abcd", &[0u8; 12], &[0u8; 32]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        AeadError::Primitive {
            operation: "key expansion",
            status: -7
        }
    );

    let overhead = t.elapsed();
    println!("test_key_expansion_failure: Testing Overhead = {:?}", overhead);
}
