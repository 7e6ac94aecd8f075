//! In-memory backend implementing every store seam.
//!
//! Used by tests, benches, and single-process hosts. It behaves like the
//! real collaborator: it only ever sees ciphertext, sealed keys, and public
//! keys.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{VaultError, VaultResult};
use crate::identity::{EncryptionPublicKey, SealedPrivateKeys};
use crate::store::{
    BlobStore, DirectoryEntry, FileEnvelope, FileId, FileRecord, FolderId, FolderRecord,
    FolderShareRecord, MetadataStore, UserDirectory, UserId, UserRecord,
};

#[derive(Default)]
struct Tables {
    blobs: HashMap<String, Vec<u8>>,
    users: HashMap<UserId, UserRecord>,
    files: HashMap<FileId, FileRecord>,
    shares: HashMap<(FileId, UserId), FileEnvelope>,
    folders: HashMap<FolderId, FolderRecord>,
    folder_shares: HashMap<(FolderId, UserId), FolderShareRecord>,
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend").finish_non_exhaustive()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a user's published encryption key with raw text. Lets
    /// tests model a directory entry that can no longer be read.
    pub async fn set_published_encryption_key(&self, id: UserId, value: &str) -> VaultResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| VaultError::NotFound(format!("user {id}")))?;
        user.encryption_public_key = value.to_string();
        Ok(())
    }

    /// Number of stored blobs.
    pub async fn blob_count(&self) -> usize {
        self.tables.read().await.blobs.len()
    }

    /// Every blob, for asserting that no plaintext reached storage.
    pub async fn all_blobs(&self) -> Vec<Vec<u8>> {
        self.tables.read().await.blobs.values().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn put(&self, path: &str, bytes: Vec<u8>, overwrite: bool) -> VaultResult<()> {
        let mut tables = self.tables.write().await;
        if !overwrite && tables.blobs.contains_key(path) {
            return Err(VaultError::Storage(format!("blob exists: {path}")));
        }
        tables.blobs.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, path: &str) -> VaultResult<Vec<u8>> {
        self.tables
            .read()
            .await
            .blobs
            .get(path)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(format!("blob {path}")))
    }

    async fn delete(&self, path: &str) -> VaultResult<()> {
        self.tables.write().await.blobs.remove(path);
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for MemoryBackend {
    async fn insert_user(&self, user: UserRecord) -> VaultResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(VaultError::UsernameTaken);
        }
        tables.users.insert(user.id, user);
        Ok(())
    }

    async fn user_by_username(&self, username: &str) -> VaultResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn user_by_id(&self, id: UserId) -> VaultResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn update_user_keys(
        &self,
        id: UserId,
        salt: String,
        sealed: SealedPrivateKeys,
    ) -> VaultResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| VaultError::NotFound(format!("user {id}")))?;
        user.salt = salt;
        user.sealed_private_keys = sealed;
        Ok(())
    }

    async fn insert_file(&self, file: FileRecord) -> VaultResult<()> {
        self.tables.write().await.files.insert(file.file_id, file);
        Ok(())
    }

    async fn file(&self, id: FileId) -> VaultResult<Option<FileRecord>> {
        Ok(self.tables.read().await.files.get(&id).cloned())
    }

    async fn files_by_owner(&self, owner: UserId) -> VaultResult<Vec<FileRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .files
            .values()
            .filter(|f| f.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn files_in_folder(&self, folder: FolderId) -> VaultResult<Vec<FileRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .files
            .values()
            .filter(|f| f.folder_id == Some(folder))
            .cloned()
            .collect())
    }

    async fn update_file_if_version(&self, file: FileRecord, expected: u64) -> VaultResult<()> {
        let mut tables = self.tables.write().await;
        let current = tables
            .files
            .get_mut(&file.file_id)
            .ok_or_else(|| VaultError::NotFound(format!("file {}", file.file_id)))?;
        if current.version != expected {
            return Err(VaultError::VersionConflict {
                expected,
                found: current.version,
            });
        }
        *current = file;
        Ok(())
    }

    async fn delete_file(&self, id: FileId) -> VaultResult<()> {
        self.tables.write().await.files.remove(&id);
        Ok(())
    }

    async fn upsert_share(&self, share: FileEnvelope) -> VaultResult<FileEnvelope> {
        let mut tables = self.tables.write().await;
        let key = (share.file_id, share.recipient_id);
        let stored = match tables.shares.get(&key) {
            Some(existing) => FileEnvelope {
                share_id: existing.share_id,
                created_at: existing.created_at,
                ..share
            },
            None => share,
        };
        tables.shares.insert(key, stored.clone());
        Ok(stored)
    }

    async fn share(&self, file: FileId, recipient: UserId) -> VaultResult<Option<FileEnvelope>> {
        Ok(self
            .tables
            .read()
            .await
            .shares
            .get(&(file, recipient))
            .cloned())
    }

    async fn shares_for_file(&self, file: FileId) -> VaultResult<Vec<FileEnvelope>> {
        let tables = self.tables.read().await;
        Ok(tables
            .shares
            .values()
            .filter(|s| s.file_id == file)
            .cloned()
            .collect())
    }

    async fn shares_for_recipient(&self, recipient: UserId) -> VaultResult<Vec<FileEnvelope>> {
        let tables = self.tables.read().await;
        Ok(tables
            .shares
            .values()
            .filter(|s| s.recipient_id == recipient)
            .cloned()
            .collect())
    }

    async fn delete_share(&self, file: FileId, recipient: UserId) -> VaultResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .shares
            .remove(&(file, recipient))
            .is_some())
    }

    async fn delete_shares_for_file(&self, file: FileId) -> VaultResult<()> {
        self.tables
            .write()
            .await
            .shares
            .retain(|(file_id, _), _| *file_id != file);
        Ok(())
    }

    async fn insert_folder(&self, folder: FolderRecord) -> VaultResult<()> {
        self.tables
            .write()
            .await
            .folders
            .insert(folder.folder_id, folder);
        Ok(())
    }

    async fn folder(&self, id: FolderId) -> VaultResult<Option<FolderRecord>> {
        Ok(self.tables.read().await.folders.get(&id).cloned())
    }

    async fn subfolders(&self, parent: FolderId) -> VaultResult<Vec<FolderRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .values()
            .filter(|f| f.parent_id == Some(parent))
            .cloned()
            .collect())
    }

    async fn delete_folder(&self, id: FolderId) -> VaultResult<()> {
        self.tables.write().await.folders.remove(&id);
        Ok(())
    }

    async fn upsert_folder_share(
        &self,
        share: FolderShareRecord,
    ) -> VaultResult<FolderShareRecord> {
        let mut tables = self.tables.write().await;
        let key = (share.folder_id, share.recipient_id);
        let stored = match tables.folder_shares.get(&key) {
            Some(existing) => FolderShareRecord {
                share_id: existing.share_id,
                created_at: existing.created_at,
                ..share
            },
            None => share,
        };
        tables.folder_shares.insert(key, stored.clone());
        Ok(stored)
    }

    async fn folder_share(
        &self,
        folder: FolderId,
        recipient: UserId,
    ) -> VaultResult<Option<FolderShareRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .folder_shares
            .get(&(folder, recipient))
            .cloned())
    }

    async fn folder_shares_for_recipient(
        &self,
        recipient: UserId,
    ) -> VaultResult<Vec<FolderShareRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .folder_shares
            .values()
            .filter(|s| s.recipient_id == recipient)
            .cloned()
            .collect())
    }

    async fn delete_folder_share(&self, folder: FolderId, recipient: UserId) -> VaultResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .folder_shares
            .remove(&(folder, recipient))
            .is_some())
    }

    async fn delete_folder_shares(&self, folder: FolderId) -> VaultResult<()> {
        self.tables
            .write()
            .await
            .folder_shares
            .retain(|(folder_id, _), _| *folder_id != folder);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryBackend {
    async fn lookup(&self, username: &str) -> VaultResult<Option<DirectoryEntry>> {
        let Some(user) = self.user_by_username(username).await? else {
            return Ok(None);
        };
        Ok(Some(DirectoryEntry {
            id: user.id,
            encryption_public_key: EncryptionPublicKey::from_encoded(&user.encryption_public_key)?,
        }))
    }

    async fn encryption_key(&self, id: UserId) -> VaultResult<EncryptionPublicKey> {
        let user = self
            .user_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound(format!("user {id}")))?;
        EncryptionPublicKey::from_encoded(&user.encryption_public_key)
    }
}
