//! Tunable parameters.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Time cost (passes over memory).
    pub iterations: u32,
    /// Lanes.
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// Interactive profile: 64 MiB, two passes, one lane.
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    fn validate(&self) -> VaultResult<()> {
        if self.iterations == 0 || self.parallelism == 0 {
            return Err(VaultError::Config(
                "kdf iterations and parallelism must be non-zero".into(),
            ));
        }
        // Argon2 needs at least 8 KiB per lane.
        if self.memory_kib < 8 * self.parallelism {
            return Err(VaultError::Config(format!(
                "kdf memory must be at least {} KiB",
                8 * self.parallelism
            )));
        }
        Ok(())
    }
}

/// When a content key counts as stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPolicy {
    pub threshold_secs: i64,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            threshold_secs: 3600,
        }
    }
}

impl RotationPolicy {
    pub fn threshold(&self) -> Duration {
        Duration::seconds(self.threshold_secs)
    }
}

/// Top-level configuration for a [`crate::Vault`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub kdf: KdfParams,
    pub rotation: RotationPolicy,
    /// Prefix for ciphertext blob paths.
    pub blob_prefix: BlobPrefix,
}

/// Newtype so the prefix has its own default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobPrefix(pub String);

impl Default for BlobPrefix {
    fn default() -> Self {
        Self("files".to_string())
    }
}

impl VaultConfig {
    /// Parse and validate a JSON document. Missing sections take defaults.
    pub fn from_json(json: &str) -> VaultResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VaultResult<()> {
        self.kdf.validate()?;
        if self.rotation.threshold_secs <= 0 {
            return Err(VaultError::Config(
                "rotation threshold must be positive".into(),
            ));
        }
        if self.blob_prefix.0.is_empty() {
            return Err(VaultError::Config("blob prefix must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_interactive_profile() {
        let config = VaultConfig::default();
        assert_eq!(config.kdf.memory_kib, 65536);
        assert_eq!(config.kdf.iterations, 2);
        assert_eq!(config.rotation.threshold(), Duration::hours(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = VaultConfig::from_json(r#"{ "rotation": { "threshold_secs": 60 } }"#).unwrap();
        assert_eq!(config.rotation.threshold_secs, 60);
        assert_eq!(config.kdf, KdfParams::default());
        assert_eq!(config.blob_prefix.0, "files");
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let err = VaultConfig::from_json(r#"{ "rotation": { "threshold_secs": 0 } }"#).unwrap_err();
        assert!(matches!(err, VaultError::Config(_)));
    }

    #[test]
    fn test_rejects_tiny_memory() {
        let json = r#"{ "kdf": { "memory_kib": 4, "iterations": 1, "parallelism": 1 } }"#;
        assert!(matches!(
            VaultConfig::from_json(json),
            Err(VaultError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(
            VaultConfig::from_json("{ nope"),
            Err(VaultError::Config(_))
        ));
    }
}
