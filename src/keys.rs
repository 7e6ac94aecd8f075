//! Key derivation and symmetric key ownership.
//!
//! This module owns two responsibilities:
//! 1. Hardening a low-entropy password into a 256-bit master key with
//!    Argon2id.
//! 2. Holding symmetric key material (master keys, content keys) in types
//!    that are opaque, non-cloneable, and zeroised on drop.
//!
//! ## Derivation structure
//!
//! ```text
//! Argon2id(
//!     password,
//!     salt   = 16 random bytes (stored publicly with the user),
//!     m_cost = KdfParams::memory_kib,
//!     t_cost = KdfParams::iterations,
//!     p_cost = KdfParams::parallelism,
//! ) -> 32 bytes
//! ```

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::KdfParams;
use crate::crypto::{self, KEY_LEN};
use crate::error::{VaultError, VaultResult};

/// Size of a password salt in bytes.
pub const SALT_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Salt
// ---------------------------------------------------------------------------

/// Public per-user salt. Paired 1:1 with a user record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Sample a fresh salt (registration and password change).
    pub fn random() -> VaultResult<Self> {
        let mut bytes = [0u8; SALT_LEN];
        crypto::fill_random(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> VaultResult<Self> {
        let arr: [u8; SALT_LEN] = bytes
            .try_into()
            .map_err(|_| VaultError::InvalidInput(format!("salt must be {SALT_LEN} bytes")))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Master key
// ---------------------------------------------------------------------------

/// A password-derived key. Protects only its owner's private keys at rest.
///
/// - Not `Clone`. Lives in exactly one session.
/// - Zeroised on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Wrap raw bytes. Prefer [`derive`]; this exists for tests and for
    /// hosts that source the master key elsewhere.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

// ---------------------------------------------------------------------------
// Content key
// ---------------------------------------------------------------------------

/// Per-file-version symmetric key. Never persisted unwrapped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ContentKey {
    bytes: [u8; KEY_LEN],
}

impl ContentKey {
    /// Generate a fresh content key (upload and rotation).
    pub fn generate() -> VaultResult<Self> {
        Ok(Self {
            bytes: crypto::generate_random_key()?,
        })
    }

    /// Rebuild a content key recovered from an envelope.
    ///
    /// The buffer is wiped whether or not it has the right length.
    pub(crate) fn from_unsealed(mut bytes: Vec<u8>) -> VaultResult<Self> {
        let parsed: Result<[u8; KEY_LEN], _> = bytes.as_slice().try_into();
        bytes.zeroize();
        parsed
            .map(|bytes| Self { bytes })
            .map_err(|_| VaultError::InvalidKey)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContentKey(..)")
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive a master key from `password`.
///
/// With `salt == None` a fresh salt is sampled (registration path);
/// otherwise the supplied salt is reused so login re-derives the same key.
/// Pure: no I/O, no storage.
pub fn derive(
    password: &[u8],
    salt: Option<&Salt>,
    params: &KdfParams,
) -> VaultResult<(MasterKey, Salt)> {
    if password.is_empty() {
        return Err(VaultError::InvalidInput("password is required".into()));
    }

    let salt = match salt {
        Some(salt) => *salt,
        None => Salt::random()?,
    };

    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|_| VaultError::KeyDerivationFailure)?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut out = [0u8; KEY_LEN];
    argon
        .hash_password_into(password, salt.as_bytes(), &mut out)
        .map_err(|_| VaultError::KeyDerivationFailure)?;

    let master = MasterKey::from_bytes(out);
    out.zeroize();
    Ok((master, salt))
}
