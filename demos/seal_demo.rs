//! Registers the AEAD surface and walks through a sealed exchange.
//!
//! `cargo run --example seal_demo [config.toml]`

use aeadx_bind::{bind, BindingConfig, HostValue};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => BindingConfig::load(path)?,
        None => BindingConfig::default(),
    };
    let exports = bind(&config)?;
    for name in exports.function_names() {
        tracing::debug!("export {}", name);
    }

    let algo = "xchacha20poly1305_ietf";
    let name = |suffix: &str| config.export_name(algo, suffix);
    if !exports.contains(&name("encrypt")) {
        tracing::warn!("{} is not registered by this config", algo);
        return Ok(());
    }

    let key = HostValue::buffer(vec![0x42u8; 32]);
    let nonce = HostValue::buffer(vec![0x24u8; 24]);
    let ad = HostValue::buffer(b"demo-header".to_vec());

    let sealed = exports.call(
        &name("encrypt"),
        &[
            HostValue::buffer(b"hello, sealed world".to_vec()),
            ad.clone(),
            nonce.clone(),
            key.clone(),
        ],
    )?;
    let ciphertext = sealed.as_bytes().map(<[u8]>::to_vec).unwrap_or_default();
    tracing::info!(len = ciphertext.len(), "sealed");

    let opened = exports.call(
        &name("decrypt"),
        &[sealed, ad.clone(), nonce.clone(), key.clone()],
    )?;
    if let Some(plaintext) = opened.as_bytes() {
        tracing::info!("opened: {}", String::from_utf8_lossy(plaintext));
    }

    let mut forged = ciphertext;
    if let Some(byte) = forged.first_mut() {
        *byte ^= 1;
    }
    let rejected = exports.call(&name("decrypt"), &[HostValue::from(forged), ad, nonce, key])?;
    tracing::info!(result = rejected.type_name(), "forged ciphertext");

    Ok(())
}
