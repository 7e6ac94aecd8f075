//! The untrusted backend, seen from the client.
//!
//! Three narrow seams: a blob store for ciphertext, a metadata store for
//! rows, and a user directory for public keys. Nothing written through these
//! traits is plaintext content, an unwrapped content key, or an unsealed
//! private key.
//!
//! No transactions are assumed across rows. Every write is an idempotent
//! upsert or delete keyed by stable identifiers, so any operation can be
//! abandoned and retried.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VaultResult;
use crate::identity::{EncryptionPublicKey, SealedPrivateKeys};

pub type UserId = Uuid;
pub type FileId = Uuid;
pub type FolderId = Uuid;
pub type ShareId = Uuid;

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A registered user. Everything here is public or sealed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub encryption_public_key: String,
    pub signing_public_key: String,
    pub sealed_private_keys: SealedPrivateKeys,
    pub salt: String,
}

/// Metadata for one stored file. The owner's envelope lives on this row as
/// `owner_wrapped_key`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: FileId,
    pub owner_id: UserId,
    pub folder_id: Option<FolderId>,
    pub name: String,
    pub mime_type: String,
    /// Plaintext length in bytes.
    pub size: u64,
    pub storage_path: String,
    pub owner_wrapped_key: String,
    pub nonce: String,
    pub signature: String,
    pub signer_public_key: String,
    /// When the current content key was generated.
    pub content_key_age: DateTime<Utc>,
    /// Bumped by every rotation; guards concurrent rotations.
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

/// A recipient's wrapped content key for one file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEnvelope {
    pub share_id: ShareId,
    pub file_id: FileId,
    pub recipient_id: UserId,
    pub wrapped_content_key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// The grant this one was derived from (re-share or folder share).
    pub parent_share_id: Option<ShareId>,
}

impl FileEnvelope {
    /// An envelope without expiry, or whose expiry is still ahead of `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires| expires > now)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub folder_id: FolderId,
    pub owner_id: UserId,
    pub parent_id: Option<FolderId>,
    pub name: String,
}

/// A folder-level grant. The effective content-key envelopes are the
/// per-file [`FileEnvelope`]s that point back here via `parent_share_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderShareRecord {
    pub share_id: ShareId,
    pub folder_id: FolderId,
    pub recipient_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub parent_share_id: Option<ShareId>,
}

impl FolderShareRecord {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires| expires > now)
    }
}

/// A directory hit: enough to start a grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub id: UserId,
    pub encryption_public_key: EncryptionPublicKey,
}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Opaque ciphertext storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`. With `overwrite == false` an existing blob
    /// is a `Storage` error.
    async fn put(&self, path: &str, bytes: Vec<u8>, overwrite: bool) -> VaultResult<()>;

    /// Fetch a blob; `NotFound` if absent.
    async fn get(&self, path: &str) -> VaultResult<Vec<u8>>;

    /// Remove a blob. Removing an absent blob is a no-op.
    async fn delete(&self, path: &str) -> VaultResult<()>;
}

/// Row storage for users, files, shares, and folders.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a user; `UsernameTaken` if the name exists.
    async fn insert_user(&self, user: UserRecord) -> VaultResult<()>;
    async fn user_by_username(&self, username: &str) -> VaultResult<Option<UserRecord>>;
    async fn user_by_id(&self, id: UserId) -> VaultResult<Option<UserRecord>>;
    /// Replace a user's salt and sealed private keys (password change).
    async fn update_user_keys(
        &self,
        id: UserId,
        salt: String,
        sealed: SealedPrivateKeys,
    ) -> VaultResult<()>;

    async fn insert_file(&self, file: FileRecord) -> VaultResult<()>;
    async fn file(&self, id: FileId) -> VaultResult<Option<FileRecord>>;
    async fn files_by_owner(&self, owner: UserId) -> VaultResult<Vec<FileRecord>>;
    async fn files_in_folder(&self, folder: FolderId) -> VaultResult<Vec<FileRecord>>;
    /// Replace a file row only if its stored version equals `expected`;
    /// otherwise `VersionConflict`.
    async fn update_file_if_version(&self, file: FileRecord, expected: u64) -> VaultResult<()>;
    async fn delete_file(&self, id: FileId) -> VaultResult<()>;

    /// Insert or update the envelope keyed by `(file_id, recipient_id)`.
    /// An update keeps the existing `share_id`. Returns the stored row.
    async fn upsert_share(&self, share: FileEnvelope) -> VaultResult<FileEnvelope>;
    async fn share(&self, file: FileId, recipient: UserId) -> VaultResult<Option<FileEnvelope>>;
    async fn shares_for_file(&self, file: FileId) -> VaultResult<Vec<FileEnvelope>>;
    async fn shares_for_recipient(&self, recipient: UserId) -> VaultResult<Vec<FileEnvelope>>;
    /// Returns whether a row was removed.
    async fn delete_share(&self, file: FileId, recipient: UserId) -> VaultResult<bool>;
    async fn delete_shares_for_file(&self, file: FileId) -> VaultResult<()>;

    async fn insert_folder(&self, folder: FolderRecord) -> VaultResult<()>;
    async fn folder(&self, id: FolderId) -> VaultResult<Option<FolderRecord>>;
    async fn subfolders(&self, parent: FolderId) -> VaultResult<Vec<FolderRecord>>;
    async fn delete_folder(&self, id: FolderId) -> VaultResult<()>;

    /// Insert or update keyed by `(folder_id, recipient_id)`.
    async fn upsert_folder_share(&self, share: FolderShareRecord)
        -> VaultResult<FolderShareRecord>;
    async fn folder_share(
        &self,
        folder: FolderId,
        recipient: UserId,
    ) -> VaultResult<Option<FolderShareRecord>>;
    async fn folder_shares_for_recipient(
        &self,
        recipient: UserId,
    ) -> VaultResult<Vec<FolderShareRecord>>;
    async fn delete_folder_share(&self, folder: FolderId, recipient: UserId) -> VaultResult<bool>;
    async fn delete_folder_shares(&self, folder: FolderId) -> VaultResult<()>;
}

/// Public-key lookup.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup(&self, username: &str) -> VaultResult<Option<DirectoryEntry>>;

    /// The encryption public key of a known user; `NotFound` if unknown,
    /// `InvalidEncoding` if the published key is unreadable.
    async fn encryption_key(&self, id: UserId) -> VaultResult<EncryptionPublicKey>;
}

/// The three seams bundled for a [`crate::Vault`].
#[derive(Clone)]
pub struct Backend {
    pub blobs: Arc<dyn BlobStore>,
    pub metadata: Arc<dyn MetadataStore>,
    pub directory: Arc<dyn UserDirectory>,
}

impl<T> From<Arc<T>> for Backend
where
    T: BlobStore + MetadataStore + UserDirectory + 'static,
{
    fn from(store: Arc<T>) -> Self {
        Self {
            blobs: store.clone(),
            metadata: store.clone(),
            directory: store,
        }
    }
}
