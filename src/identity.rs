//! Per-user asymmetric identities.
//!
//! Every user holds two keypairs:
//! - an X25519 **encryption** keypair, used only to unwrap content keys
//!   sealed for them;
//! - an Ed25519 **signing** keypair, used only to sign uploaded ciphertext.
//!
//! Public halves go to the user directory. Private halves leave the session
//! only as [`SealedPrivateKeys`]: secret-box ciphertext under the master key.

use crypto_box::aead::OsRng;
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto;
use crate::encoding;
use crate::error::{VaultError, VaultResult};
use crate::keys::MasterKey;

/// Length of both public key kinds in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Encryption keys
// ---------------------------------------------------------------------------

/// Published half of an encryption keypair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptionPublicKey(crypto_box::PublicKey);

impl EncryptionPublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(crypto_box::PublicKey::from(bytes))
    }

    /// Parse the directory form.
    pub fn from_encoded(value: &str) -> VaultResult<Self> {
        Ok(Self::from_bytes(encoding::decode_array(
            value,
            "encryption public key",
        )?))
    }

    pub fn to_encoded(&self) -> String {
        encoding::encode(self.0.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        self.0.as_bytes()
    }

    pub(crate) fn inner(&self) -> &crypto_box::PublicKey {
        &self.0
    }
}

/// X25519 keypair. The secret half zeroises on drop (via `crypto_box`).
pub struct EncryptionKeyPair {
    secret: crypto_box::SecretKey,
    public: EncryptionPublicKey,
}

impl EncryptionKeyPair {
    pub fn generate() -> Self {
        let secret = crypto_box::SecretKey::generate(&mut OsRng);
        let public = EncryptionPublicKey(secret.public_key());
        Self { secret, public }
    }

    fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = crypto_box::SecretKey::from(bytes);
        let public = EncryptionPublicKey(secret.public_key());
        Self { secret, public }
    }

    pub fn public_key(&self) -> &EncryptionPublicKey {
        &self.public
    }

    pub(crate) fn secret(&self) -> &crypto_box::SecretKey {
        &self.secret
    }
}

// ---------------------------------------------------------------------------
// Signing keys
// ---------------------------------------------------------------------------

/// Published half of a signing keypair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SigningPublicKey([u8; PUBLIC_KEY_LEN]);

impl SigningPublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_encoded(value: &str) -> VaultResult<Self> {
        Ok(Self(encoding::decode_array(value, "signing public key")?))
    }

    pub fn to_encoded(&self) -> String {
        encoding::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }
}

/// Ed25519 keypair, held as its PKCS#8 document plus the parsed `ring` key.
pub struct SigningKeyPair {
    pkcs8: Zeroizing<Vec<u8>>,
    pair: Ed25519KeyPair,
}

impl SigningKeyPair {
    pub fn generate() -> VaultResult<Self> {
        let document = Ed25519KeyPair::generate_pkcs8(&SystemRandom::new())
            .map_err(|_| VaultError::RandomnessFailure)?;
        Self::from_pkcs8(document.as_ref().to_vec())
    }

    fn from_pkcs8(pkcs8: Vec<u8>) -> VaultResult<Self> {
        let pkcs8 = Zeroizing::new(pkcs8);
        let pair = Ed25519KeyPair::from_pkcs8(&pkcs8).map_err(|_| VaultError::InvalidKey)?;
        Ok(Self { pkcs8, pair })
    }

    pub fn public_key(&self) -> SigningPublicKey {
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes.copy_from_slice(self.pair.public_key().as_ref());
        SigningPublicKey(bytes)
    }

    pub(crate) fn ring_pair(&self) -> &Ed25519KeyPair {
        &self.pair
    }
}

// ---------------------------------------------------------------------------
// Identity bundle
// ---------------------------------------------------------------------------

/// Secret-box ciphertext of one private key, as persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSecret {
    pub ciphertext: String,
    pub nonce: String,
}

impl SealedSecret {
    fn seal(secret: &[u8], master: &MasterKey) -> VaultResult<Self> {
        let sealed = crypto::seal(secret, master.as_bytes())?;
        Ok(Self {
            ciphertext: encoding::encode(&sealed.ciphertext),
            nonce: encoding::encode(sealed.nonce.as_bytes()),
        })
    }

    fn open(&self, master: &MasterKey) -> VaultResult<Zeroizing<Vec<u8>>> {
        let ciphertext = encoding::decode(&self.ciphertext, "sealed private key")?;
        let nonce = encoding::decode(&self.nonce, "nonce")?;
        crypto::open(&ciphertext, &nonce, master.as_bytes()).map(Zeroizing::new)
    }
}

/// Both private keys sealed at rest. Safe to hand to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPrivateKeys {
    pub encryption: SealedSecret,
    pub signing: SealedSecret,
}

/// The unsealed identity of a logged-in user. Session memory only.
pub struct IdentityKeys {
    pub encryption: EncryptionKeyPair,
    pub signing: SigningKeyPair,
}

impl IdentityKeys {
    pub fn generate() -> VaultResult<Self> {
        Ok(Self {
            encryption: EncryptionKeyPair::generate(),
            signing: SigningKeyPair::generate()?,
        })
    }

    /// Seal both private halves under `master`.
    pub fn seal_private(&self, master: &MasterKey) -> VaultResult<SealedPrivateKeys> {
        let encryption_secret = Zeroizing::new(self.encryption.secret.to_bytes());
        Ok(SealedPrivateKeys {
            encryption: SealedSecret::seal(&encryption_secret[..], master)?,
            signing: SealedSecret::seal(&self.signing.pkcs8, master)?,
        })
    }

    /// Open sealed private keys with `master`.
    ///
    /// A wrong master key fails at the AEAD tag with `AuthenticationFailure`.
    pub fn unseal_private(sealed: &SealedPrivateKeys, master: &MasterKey) -> VaultResult<Self> {
        let encryption_bytes = sealed.encryption.open(master)?;
        let secret: [u8; 32] = encryption_bytes
            .as_slice()
            .try_into()
            .map_err(|_| VaultError::InvalidKey)?;
        let encryption = EncryptionKeyPair::from_secret_bytes(secret);

        let signing_bytes = sealed.signing.open(master)?;
        let signing = SigningKeyPair::from_pkcs8(signing_bytes.to_vec())?;

        Ok(Self {
            encryption,
            signing,
        })
    }
}
