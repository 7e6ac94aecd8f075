//! Anonymous public-key sealing of content keys.
//!
//! Uses the libsodium-compatible sealed box (`crypto_box_seal`): an
//! ephemeral X25519 keypair is generated per seal, so the sealer needs no
//! keypair of its own and the opener cannot tell who sealed. Only the holder
//! of the matching private key can open the result.
//!
//! Sealed values are persisted through [`crate::encoding`] on both paths.

use crypto_box::aead::OsRng;

use crate::encoding;
use crate::error::{VaultError, VaultResult};
use crate::identity::{EncryptionKeyPair, EncryptionPublicKey};
use crate::keys::ContentKey;

/// Seal `secret` so only the owner of `recipient` can open it.
pub fn seal_for(secret: &[u8], recipient: &EncryptionPublicKey) -> VaultResult<Vec<u8>> {
    if secret.is_empty() {
        return Err(VaultError::MissingParameter("secret"));
    }
    recipient
        .inner()
        .seal(&mut OsRng, secret)
        .map_err(|_| VaultError::EncryptionFailure)
}

/// Open a sealed value with the recipient's keypair.
///
/// `recipient_public` must be the public half of `recipient`; a mismatch is
/// reported as `UnsealFailure`, as is any ciphertext not sealed for this
/// keypair.
pub fn unseal(
    sealed: &[u8],
    recipient_public: &EncryptionPublicKey,
    recipient: &EncryptionKeyPair,
) -> VaultResult<Vec<u8>> {
    if sealed.is_empty() {
        return Err(VaultError::MissingParameter("sealed bytes"));
    }
    if recipient.public_key() != recipient_public {
        return Err(VaultError::UnsealFailure);
    }
    recipient
        .secret()
        .unseal(sealed)
        .map_err(|_| VaultError::UnsealFailure)
}

/// Seal a content key for `recipient` and encode it for storage.
pub fn wrap_content_key(key: &ContentKey, recipient: &EncryptionPublicKey) -> VaultResult<String> {
    let sealed = seal_for(key.as_bytes(), recipient)?;
    Ok(encoding::encode(sealed))
}

/// Decode and open a stored wrapped content key.
pub fn unwrap_content_key(wrapped: &str, recipient: &EncryptionKeyPair) -> VaultResult<ContentKey> {
    let sealed = encoding::decode(wrapped, "wrapped content key")?;
    let secret = unseal(&sealed, recipient.public_key(), recipient)?;
    ContentKey::from_unsealed(secret)
}
