use crate::error::AeadError;
use serde::Deserialize;
use std::path::Path;

/// Controls which entry points the host surface exposes.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BindingConfig {
    /// Prepended to every exported name.
    pub prefix: String,
    pub export_precompute: bool,
    pub export_constants: bool,
    /// When false, AES-256-GCM refuses to run without AES-NI/PCLMUL (or the
    /// ARMv8 equivalents) instead of falling back to the bitsliced software path.
    pub allow_software_aes: bool,
    /// Host-facing algorithm names to register.
    pub algorithms: Vec<String>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            prefix: "crypto_aead_".to_string(),
            export_precompute: true,
            export_constants: true,
            allow_software_aes: true,
            algorithms: vec![
                "aes256gcm".to_string(),
                "chacha20poly1305".to_string(),
                "chacha20poly1305_ietf".to_string(),
                "xchacha20poly1305_ietf".to_string(),
            ],
        }
    }
}

impl BindingConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, AeadError> {
        let config: BindingConfig = toml::from_str(raw)?;
        tracing::debug!(
            "BindingConfig: prefix={:?}, {} algorithms",
            config.prefix,
            config.algorithms.len()
        );
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AeadError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Full exported name for `<algorithm>_<suffix>`.
    pub fn export_name(&self, algorithm: &str, suffix: &str) -> String {
        format!("{}{}_{}", self.prefix, algorithm, suffix)
    }
}
