//! A backend that delegates to [`MemoryBackend`] but fails chosen writes on
//! demand, for exercising the partial-failure paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use zkvault::identity::{EncryptionPublicKey, SealedPrivateKeys};
use zkvault::store::{
    BlobStore, DirectoryEntry, FileEnvelope, FileId, FileRecord, FolderId, FolderRecord,
    FolderShareRecord, MetadataStore, UserDirectory, UserId, UserRecord,
};
use zkvault::{MemoryBackend, VaultError, VaultResult};

#[derive(Default)]
pub struct Faults {
    pub insert_file: AtomicBool,
    pub delete_share: AtomicBool,
    pub delete_blob: AtomicBool,
}

impl Faults {
    pub fn set(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }
}

pub struct FlakyBackend {
    pub inner: Arc<MemoryBackend>,
    pub faults: Faults,
}

impl FlakyBackend {
    pub fn new(inner: Arc<MemoryBackend>) -> Self {
        Self {
            inner,
            faults: Faults::default(),
        }
    }

    fn check(flag: &AtomicBool, what: &str) -> VaultResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(VaultError::Storage(format!("injected {what} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BlobStore for FlakyBackend {
    async fn put(&self, path: &str, bytes: Vec<u8>, overwrite: bool) -> VaultResult<()> {
        self.inner.put(path, bytes, overwrite).await
    }

    async fn get(&self, path: &str) -> VaultResult<Vec<u8>> {
        self.inner.get(path).await
    }

    async fn delete(&self, path: &str) -> VaultResult<()> {
        Self::check(&self.faults.delete_blob, "blob delete")?;
        BlobStore::delete(self.inner.as_ref(), path).await
    }
}

#[async_trait]
impl MetadataStore for FlakyBackend {
    async fn insert_user(&self, user: UserRecord) -> VaultResult<()> {
        self.inner.insert_user(user).await
    }

    async fn user_by_username(&self, username: &str) -> VaultResult<Option<UserRecord>> {
        self.inner.user_by_username(username).await
    }

    async fn user_by_id(&self, id: UserId) -> VaultResult<Option<UserRecord>> {
        self.inner.user_by_id(id).await
    }

    async fn update_user_keys(
        &self,
        id: UserId,
        salt: String,
        sealed: SealedPrivateKeys,
    ) -> VaultResult<()> {
        self.inner.update_user_keys(id, salt, sealed).await
    }

    async fn insert_file(&self, file: FileRecord) -> VaultResult<()> {
        Self::check(&self.faults.insert_file, "insert_file")?;
        self.inner.insert_file(file).await
    }

    async fn file(&self, id: FileId) -> VaultResult<Option<FileRecord>> {
        self.inner.file(id).await
    }

    async fn files_by_owner(&self, owner: UserId) -> VaultResult<Vec<FileRecord>> {
        self.inner.files_by_owner(owner).await
    }

    async fn files_in_folder(&self, folder: FolderId) -> VaultResult<Vec<FileRecord>> {
        self.inner.files_in_folder(folder).await
    }

    async fn update_file_if_version(&self, file: FileRecord, expected: u64) -> VaultResult<()> {
        self.inner.update_file_if_version(file, expected).await
    }

    async fn delete_file(&self, id: FileId) -> VaultResult<()> {
        self.inner.delete_file(id).await
    }

    async fn upsert_share(&self, share: FileEnvelope) -> VaultResult<FileEnvelope> {
        self.inner.upsert_share(share).await
    }

    async fn share(&self, file: FileId, recipient: UserId) -> VaultResult<Option<FileEnvelope>> {
        self.inner.share(file, recipient).await
    }

    async fn shares_for_file(&self, file: FileId) -> VaultResult<Vec<FileEnvelope>> {
        self.inner.shares_for_file(file).await
    }

    async fn shares_for_recipient(&self, recipient: UserId) -> VaultResult<Vec<FileEnvelope>> {
        self.inner.shares_for_recipient(recipient).await
    }

    async fn delete_share(&self, file: FileId, recipient: UserId) -> VaultResult<bool> {
        Self::check(&self.faults.delete_share, "delete_share")?;
        self.inner.delete_share(file, recipient).await
    }

    async fn delete_shares_for_file(&self, file: FileId) -> VaultResult<()> {
        self.inner.delete_shares_for_file(file).await
    }

    async fn insert_folder(&self, folder: FolderRecord) -> VaultResult<()> {
        self.inner.insert_folder(folder).await
    }

    async fn folder(&self, id: FolderId) -> VaultResult<Option<FolderRecord>> {
        self.inner.folder(id).await
    }

    async fn subfolders(&self, parent: FolderId) -> VaultResult<Vec<FolderRecord>> {
        self.inner.subfolders(parent).await
    }

    async fn delete_folder(&self, id: FolderId) -> VaultResult<()> {
        self.inner.delete_folder(id).await
    }

    async fn upsert_folder_share(
        &self,
        share: FolderShareRecord,
    ) -> VaultResult<FolderShareRecord> {
        self.inner.upsert_folder_share(share).await
    }

    async fn folder_share(
        &self,
        folder: FolderId,
        recipient: UserId,
    ) -> VaultResult<Option<FolderShareRecord>> {
        self.inner.folder_share(folder, recipient).await
    }

    async fn folder_shares_for_recipient(
        &self,
        recipient: UserId,
    ) -> VaultResult<Vec<FolderShareRecord>> {
        self.inner.folder_shares_for_recipient(recipient).await
    }

    async fn delete_folder_share(&self, folder: FolderId, recipient: UserId) -> VaultResult<bool> {
        self.inner.delete_folder_share(folder, recipient).await
    }

    async fn delete_folder_shares(&self, folder: FolderId) -> VaultResult<()> {
        self.inner.delete_folder_shares(folder).await
    }
}

#[async_trait]
impl UserDirectory for FlakyBackend {
    async fn lookup(&self, username: &str) -> VaultResult<Option<DirectoryEntry>> {
        self.inner.lookup(username).await
    }

    async fn encryption_key(&self, id: UserId) -> VaultResult<EncryptionPublicKey> {
        self.inner.encryption_key(id).await
    }
}
