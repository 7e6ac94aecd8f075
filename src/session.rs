//! The authenticated session context.
//!
//! A `Session` is created by [`crate::Vault::login`] and destroyed by
//! [`crate::Vault::logout`] (or by dropping it). It is the only holder of the
//! master key and the unsealed private keys; every core operation borrows it
//! explicitly. Nothing in it is ever written to a store.

use chrono::{DateTime, Utc};

use crate::identity::{EncryptionPublicKey, IdentityKeys, SigningPublicKey};
use crate::keys::MasterKey;
use crate::store::UserId;

pub struct Session {
    user_id: UserId,
    username: String,
    master: MasterKey,
    identity: IdentityKeys,
    started_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(
        user_id: UserId,
        username: String,
        master: MasterKey,
        identity: IdentityKeys,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            username,
            master,
            identity,
            started_at,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn encryption_public_key(&self) -> &EncryptionPublicKey {
        self.identity.encryption.public_key()
    }

    pub fn signing_public_key(&self) -> SigningPublicKey {
        self.identity.signing.public_key()
    }

    pub(crate) fn identity(&self) -> &IdentityKeys {
        &self.identity
    }

    pub(crate) fn replace_master(&mut self, master: MasterKey) {
        self.master = master;
    }

    pub(crate) fn master(&self) -> &MasterKey {
        &self.master
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
