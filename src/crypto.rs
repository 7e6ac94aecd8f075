//! Symmetric authenticated encryption (the "secret box").
//!
//! This module is the only place in the crate that touches `ring::aead`.
//! It protects two kinds of payload: a user's private key bytes under their
//! master key, and file content under a per-file content key.
//!
//! Primitive choices:
//! - **Cipher**: AES-256-GCM (authenticated encryption)
//! - **Nonce**: 96-bit (12 bytes), generated fresh per seal via `SystemRandom`
//! - **Key size**: 256 bits (32 bytes)
//!
//! Unlike a nonce-prefixed blob, the nonce is returned separately: callers
//! persist it next to the ciphertext as part of the record. It is not secret.

use ring::aead::{self, LessSafeKey, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{VaultError, VaultResult};

/// The AEAD algorithm used throughout zkvault.
const ALGORITHM: &aead::Algorithm = &AES_256_GCM;

/// Size of the nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of a master or content key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Size of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// A nonce produced by one `seal` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    fn generate() -> VaultResult<Self> {
        let mut buf = [0u8; NONCE_LEN];
        fill_random(&mut buf)?;
        Ok(Self(buf))
    }

    /// Parse a nonce read back from storage.
    ///
    /// An empty slice is a caller error (`MissingParameter`); any other
    /// length is rejected as `InvalidInput`.
    pub fn from_slice(bytes: &[u8]) -> VaultResult<Self> {
        if bytes.is_empty() {
            return Err(VaultError::MissingParameter("nonce"));
        }
        let arr: [u8; NONCE_LEN] = bytes
            .try_into()
            .map_err(|_| VaultError::InvalidInput(format!("nonce must be {NONCE_LEN} bytes")))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

/// Output of [`seal`]: ciphertext with its GCM tag, and the nonce used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedBox {
    pub ciphertext: Vec<u8>,
    pub nonce: Nonce,
}

fn bind_key(key_bytes: &[u8; KEY_LEN]) -> VaultResult<LessSafeKey> {
    let unbound = UnboundKey::new(ALGORITHM, key_bytes).map_err(|_| VaultError::InvalidKey)?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key_bytes` with a fresh random nonce.
pub fn seal(plaintext: &[u8], key_bytes: &[u8; KEY_LEN]) -> VaultResult<SealedBox> {
    let key = bind_key(key_bytes)?;
    let nonce = Nonce::generate()?;

    let mut buffer = Vec::with_capacity(plaintext.len() + ALGORITHM.tag_len());
    buffer.extend_from_slice(plaintext);

    key.seal_in_place_append_tag(
        aead::Nonce::assume_unique_for_key(nonce.0),
        aead::Aad::empty(),
        &mut buffer,
    )
    .map_err(|_| VaultError::EncryptionFailure)?;

    Ok(SealedBox {
        ciphertext: buffer,
        nonce,
    })
}

/// Decrypt a ciphertext produced by [`seal`].
///
/// `nonce` is the raw nonce as persisted; it is validated before the
/// primitive runs. Any tag mismatch (tampered bytes, wrong key, wrong nonce)
/// yields `AuthenticationFailure` and no partial plaintext.
pub fn open(ciphertext: &[u8], nonce: &[u8], key_bytes: &[u8; KEY_LEN]) -> VaultResult<Vec<u8>> {
    let nonce = Nonce::from_slice(nonce)?;
    if ciphertext.is_empty() {
        return Err(VaultError::MissingParameter("ciphertext"));
    }
    if ciphertext.len() < TAG_LEN {
        return Err(VaultError::AuthenticationFailure);
    }

    let key = bind_key(key_bytes)?;
    let mut payload = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(
            aead::Nonce::assume_unique_for_key(nonce.0),
            aead::Aad::empty(),
            &mut payload,
        )
        .map_err(|_| VaultError::AuthenticationFailure)?;

    Ok(plaintext.to_vec())
}

/// Fill `buf` from the system CSPRNG.
pub(crate) fn fill_random(buf: &mut [u8]) -> VaultResult<()> {
    SystemRandom::new()
        .fill(buf)
        .map_err(|_| VaultError::RandomnessFailure)
}

/// Generate a cryptographically secure random 256-bit key.
pub(crate) fn generate_random_key() -> VaultResult<[u8; KEY_LEN]> {
    let mut key = [0u8; KEY_LEN];
    fill_random(&mut key)?;
    Ok(key)
}
