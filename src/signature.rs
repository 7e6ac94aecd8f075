//! Detached Ed25519 signatures over ciphertext.
//!
//! Signing happens at upload (and rotation) with the uploader's signing key;
//! verification happens before every decryption with the signer key recorded
//! on the file. This is independent of the AEAD tag: it proves origin, and
//! it can be checked without holding the content key.

use ring::signature::{self, UnparsedPublicKey, ED25519};

use crate::encoding;
use crate::error::{VaultError, VaultResult};
use crate::identity::{SigningKeyPair, SigningPublicKey};

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// A detached signature, stored separately from the bytes it covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn to_encoded(&self) -> String {
        encoding::encode(self.0)
    }
}

pub fn sign(message: &[u8], signer: &SigningKeyPair) -> Signature {
    let sig: signature::Signature = signer.ring_pair().sign(message);
    let mut bytes = [0u8; SIGNATURE_LEN];
    bytes.copy_from_slice(sig.as_ref());
    Signature(bytes)
}

pub fn verify(message: &[u8], signature: &Signature, signer: &SigningPublicKey) -> bool {
    UnparsedPublicKey::new(&ED25519, signer.as_bytes())
        .verify(message, signature.as_bytes())
        .is_ok()
}

/// Verify against persisted (encoded) signature and signer key.
///
/// Any failure, including an undecodable signature or key, is
/// `SignatureInvalid`: the ciphertext must be treated as tampered.
pub fn verify_stored(message: &[u8], signature: &str, signer: &str) -> VaultResult<()> {
    let signer =
        SigningPublicKey::from_encoded(signer).map_err(|_| VaultError::SignatureInvalid)?;
    let signature = encoding::decode(signature, "signature")
        .ok()
        .and_then(|bytes| Signature::from_slice(&bytes))
        .ok_or(VaultError::SignatureInvalid)?;

    if verify(message, &signature, &signer) {
        Ok(())
    } else {
        Err(VaultError::SignatureInvalid)
    }
}
