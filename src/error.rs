//! Error types for zkvault.
//!
//! Every variant is a distinct failure mode of the envelope protocol. Error
//! messages signal *what* failed without carrying key bytes, plaintext, or
//! passwords.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type VaultResult<T> = Result<T, VaultError>;

/// One failed target inside a bulk operation (folder share, rotation
/// broadcast). Successes are not rolled back; the caller may retry exactly
/// the targets listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    /// The file or recipient the step was applied to.
    pub target: String,
    /// Which step failed, e.g. `"reseal"` or `"grant"`.
    pub step: &'static str,
    /// Rendered cause. Never contains key material.
    pub reason: String,
}

impl TargetFailure {
    pub(crate) fn new(target: impl Into<String>, step: &'static str, err: &VaultError) -> Self {
        Self {
            target: target.into(),
            step,
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for TargetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.target, self.step, self.reason)
    }
}

/// The single error type for all zkvault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Empty password, malformed identifier, or an otherwise unusable input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required parameter (nonce, sealed bytes, key) was absent.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// AEAD tag mismatch: tampered ciphertext, wrong key, or wrong nonce.
    #[error("authentication failed")]
    AuthenticationFailure,

    /// A sealed envelope could not be opened with the supplied keypair.
    #[error("unseal failed")]
    UnsealFailure,

    /// Ciphertext did not verify against the recorded signer key.
    #[error("signature invalid")]
    SignatureInvalid,

    /// The actor holds no valid envelope for the requested operation.
    #[error("not authorized")]
    NotAuthorized,

    /// The actor's envelope exists but its expiry has passed.
    #[error("access expired")]
    AccessExpired,

    /// A bulk operation succeeded for some targets and failed for these.
    #[error("partial failure: {} target(s) failed", .0.len())]
    PartialFailure(Vec<TargetFailure>),

    /// Registration attempted with a username that already exists.
    #[error("username taken")]
    UsernameTaken,

    /// Unknown user or wrong password. The two are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A referenced row or blob does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A persisted value was not valid URL-safe unpadded base64.
    #[error("invalid encoding for {0}")]
    InvalidEncoding(&'static str),

    /// Key bytes had the wrong length or structure.
    #[error("invalid key")]
    InvalidKey,

    /// Argon2id rejected its parameters or failed to run.
    #[error("key derivation failed")]
    KeyDerivationFailure,

    /// The AEAD or sealing primitive refused to encrypt.
    #[error("encryption failed")]
    EncryptionFailure,

    /// The system random number generator failed.
    #[error("randomness source failed")]
    RandomnessFailure,

    /// The file row changed underneath a rotation.
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },

    /// The backend collaborator failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration could not be parsed or is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl VaultError {
    /// Whether retrying the same logical operation can succeed.
    ///
    /// Cryptographic failures are terminal; bulk partial failures, version
    /// races, and backend hiccups are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PartialFailure(_) | Self::VersionConflict { .. } | Self::Storage(_)
        )
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
