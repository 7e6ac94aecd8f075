//! The client-side vault: the operations a UI layer calls.
//!
//! Every operation runs on the acting user's device. The backend only ever
//! receives ciphertext, sealed keys, and public keys. Verify-then-decrypt is
//! mandatory on every read path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{AuditAction, AuditLog, AuditRecord, AuditSink};
use crate::clock::{Clock, SystemClock};
use crate::config::VaultConfig;
use crate::crypto;
use crate::encoding;
use crate::envelope;
use crate::error::{TargetFailure, VaultError, VaultResult};
use crate::identity::{IdentityKeys, SigningPublicKey};
use crate::keys::{self, ContentKey, Salt};
use crate::rotation::{self, KeyState, RotationReport};
use crate::session::Session;
use crate::sharing::{self, BulkReport, FolderGrantRequest, GrantRequest};
use crate::signature;
use crate::store::{
    Backend, FileEnvelope, FileId, FileRecord, FolderId, FolderRecord, ShareId, UserId,
    UserRecord,
};

/// How the acting user reaches a file's content key.
#[derive(Debug, Clone)]
pub(crate) enum Access {
    Owner,
    Shared(FileEnvelope),
}

impl Access {
    pub(crate) fn share_id(&self) -> Option<ShareId> {
        match self {
            Self::Owner => None,
            Self::Shared(envelope) => Some(envelope.share_id),
        }
    }
}

/// Parameters for [`Vault::upload_file`].
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Stored as given; `application/octet-stream` when absent.
    pub mime_type: Option<String>,
    pub folder_id: Option<FolderId>,
}

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Parameters for [`Vault::grant_access`] and [`Vault::share_folder`].
#[derive(Debug, Clone)]
pub struct ShareRequest {
    pub recipient_username: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of a read.
#[derive(Debug)]
pub struct OpenedFile {
    pub plaintext: Vec<u8>,
    /// Present when this read rotated the content key.
    pub rotation: Option<RotationReport>,
}

/// A file visible to the session through someone else's grant.
#[derive(Debug, Clone)]
pub struct SharedFile {
    pub file: FileRecord,
    pub envelope: FileEnvelope,
}

/// Decrypted contents of a folder tree.
#[derive(Debug, Default)]
pub struct FolderDownload {
    /// `(path, plaintext)` with `/`-joined folder names.
    pub files: Vec<(String, Vec<u8>)>,
    pub failures: Vec<TargetFailure>,
}

pub struct Vault {
    pub(crate) backend: Backend,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: VaultConfig,
    audit: Mutex<AuditLog>,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Vault {
    /// Build a vault over `backend` using the wall clock.
    pub fn new(backend: Backend, config: VaultConfig) -> VaultResult<Self> {
        Self::with_clock(backend, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        backend: Backend,
        config: VaultConfig,
        clock: Arc<dyn Clock>,
    ) -> VaultResult<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            clock,
            config,
            audit: Mutex::new(AuditLog::new()),
        })
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // -----------------------------------------------------------------------
    // Audit
    // -----------------------------------------------------------------------

    fn audit_guard(&self) -> MutexGuard<'_, AuditLog> {
        // The log stays append-only even if a sink panicked mid-append.
        self.audit.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_audit_sink(&self, sink: Box<dyn AuditSink>) {
        self.audit_guard().add_forward_sink(sink);
    }

    /// A snapshot of the audit log.
    pub fn audit_log(&self) -> AuditLog {
        self.audit_guard().clone()
    }

    pub(crate) fn record(
        &self,
        action: AuditAction,
        actor_id: UserId,
        target_id: Uuid,
        subject_id: Option<UserId>,
    ) {
        let record = AuditRecord {
            action,
            actor_id,
            target_id,
            subject_id,
            timestamp: self.now(),
        };
        self.audit_guard().append(record);
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// Create an account: derive a master key under a fresh salt, generate
    /// both keypairs, seal the private halves, publish the rest.
    pub async fn register(&self, username: &str, password: &str) -> VaultResult<UserId> {
        if username.trim().is_empty() {
            return Err(VaultError::InvalidInput("username is required".into()));
        }
        if self
            .backend
            .metadata
            .user_by_username(username)
            .await?
            .is_some()
        {
            return Err(VaultError::UsernameTaken);
        }

        let (master, salt) = keys::derive(password.as_bytes(), None, &self.config.kdf)?;
        let identity = IdentityKeys::generate()?;
        let sealed = identity.seal_private(&master)?;

        let id = Uuid::new_v4();
        self.backend
            .metadata
            .insert_user(UserRecord {
                id,
                username: username.to_string(),
                encryption_public_key: identity.encryption.public_key().to_encoded(),
                signing_public_key: identity.signing.public_key().to_encoded(),
                sealed_private_keys: sealed,
                salt: encoding::encode(salt.as_bytes()),
            })
            .await?;

        info!(user_id = %id, "registered user");
        Ok(id)
    }

    /// Re-derive the master key and unseal the private keys into a session.
    ///
    /// Unknown user and wrong password are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> VaultResult<Session> {
        let user = self
            .backend
            .metadata
            .user_by_username(username)
            .await?
            .ok_or(VaultError::InvalidCredentials)?;

        let salt = Salt::from_slice(&encoding::decode(&user.salt, "salt")?)?;
        let (master, _) = keys::derive(password.as_bytes(), Some(&salt), &self.config.kdf)?;

        let identity = match IdentityKeys::unseal_private(&user.sealed_private_keys, &master) {
            Ok(identity) => identity,
            Err(VaultError::AuthenticationFailure) => {
                debug!(user_id = %user.id, "login rejected");
                return Err(VaultError::InvalidCredentials);
            }
            Err(err) => return Err(err),
        };

        if identity.encryption.public_key().to_encoded() != user.encryption_public_key
            || identity.signing.public_key().to_encoded() != user.signing_public_key
        {
            warn!(user_id = %user.id, "published keys do not match sealed keys");
            return Err(VaultError::InvalidKey);
        }

        info!(user_id = %user.id, "session started");
        Ok(Session::new(user.id, user.username, master, identity, self.now()))
    }

    /// End a session. Key material is zeroised as the session drops.
    pub fn logout(&self, session: Session) {
        info!(user_id = %session.user_id(), "session ended");
        drop(session);
    }

    /// Re-key the password layer: new salt, new master key, private keys
    /// resealed. File envelopes are untouched.
    pub async fn change_password(
        &self,
        session: &mut Session,
        old_password: &str,
        new_password: &str,
    ) -> VaultResult<()> {
        let user = self
            .backend
            .metadata
            .user_by_id(session.user_id())
            .await?
            .ok_or_else(|| VaultError::NotFound(format!("user {}", session.user_id())))?;

        let salt = Salt::from_slice(&encoding::decode(&user.salt, "salt")?)?;
        let (check, _) = keys::derive(old_password.as_bytes(), Some(&salt), &self.config.kdf)?;
        if !bool::from(check.as_bytes()[..].ct_eq(&session.master().as_bytes()[..])) {
            debug!(user_id = %session.user_id(), "password change rejected");
            return Err(VaultError::InvalidCredentials);
        }

        let (master, salt) = keys::derive(new_password.as_bytes(), None, &self.config.kdf)?;
        let sealed = session.identity().seal_private(&master)?;
        self.backend
            .metadata
            .update_user_keys(session.user_id(), encoding::encode(salt.as_bytes()), sealed)
            .await?;
        session.replace_master(master);

        info!(user_id = %session.user_id(), "password changed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------------

    /// A fresh blob path. Each write gets its own path, so a losing
    /// concurrent rotation can never clobber the winner's ciphertext.
    pub(crate) fn blob_path(&self, owner: UserId, file_id: FileId, version: u64) -> String {
        format!(
            "{}/{owner}/{file_id}/v{version}-{}",
            self.config.blob_prefix.0,
            Uuid::new_v4().simple()
        )
    }

    pub(crate) async fn load_file(&self, file_id: FileId) -> VaultResult<FileRecord> {
        self.backend
            .metadata
            .file(file_id)
            .await?
            .ok_or_else(|| VaultError::NotFound(format!("file {file_id}")))
    }

    async fn owned_folder(&self, session: &Session, folder_id: FolderId) -> VaultResult<FolderRecord> {
        let folder = self
            .backend
            .metadata
            .folder(folder_id)
            .await?
            .ok_or_else(|| VaultError::NotFound(format!("folder {folder_id}")))?;
        if folder.owner_id != session.user_id() {
            return Err(VaultError::NotAuthorized);
        }
        Ok(folder)
    }

    /// Encrypt, sign, and store a new file. Returns its id.
    pub async fn upload_file(&self, session: &Session, request: UploadRequest) -> VaultResult<FileId> {
        if let Some(folder_id) = request.folder_id {
            self.owned_folder(session, folder_id).await?;
        }

        let mime_type = match request.mime_type {
            Some(mime) if mime.is_empty() || mime.contains(char::is_whitespace) => {
                return Err(VaultError::InvalidInput(format!("bad mime type: {mime:?}")));
            }
            Some(mime) => mime,
            None => DEFAULT_MIME_TYPE.to_string(),
        };
        let size = request.bytes.len() as u64;

        let file_id = Uuid::new_v4();
        let key = ContentKey::generate()?;
        let sealed = crypto::seal(&request.bytes, key.as_bytes())?;
        let sig = signature::sign(&sealed.ciphertext, &session.identity().signing);
        let owner_wrapped_key = envelope::wrap_content_key(&key, session.encryption_public_key())?;

        let storage_path = self.blob_path(session.user_id(), file_id, 0);
        self.backend
            .blobs
            .put(&storage_path, sealed.ciphertext, false)
            .await?;

        let now = self.now();
        let inserted = self
            .backend
            .metadata
            .insert_file(FileRecord {
                file_id,
                owner_id: session.user_id(),
                folder_id: request.folder_id,
                name: request.name,
                mime_type,
                size,
                storage_path: storage_path.clone(),
                owner_wrapped_key,
                nonce: encoding::encode(sealed.nonce.as_bytes()),
                signature: sig.to_encoded(),
                signer_public_key: session.signing_public_key().to_encoded(),
                content_key_age: now,
                version: 0,
                created_at: now,
            })
            .await;
        if let Err(err) = inserted {
            if let Err(cleanup) = self.backend.blobs.delete(&storage_path).await {
                warn!(path = %storage_path, error = %cleanup, "orphaned upload blob");
            }
            return Err(err);
        }

        info!(%file_id, "uploaded file");
        Ok(file_id)
    }

    /// Decide how `session` reaches `file`'s content key.
    pub(crate) async fn resolve_access(
        &self,
        session: &Session,
        file: &FileRecord,
    ) -> VaultResult<Access> {
        if file.owner_id == session.user_id() {
            return Ok(Access::Owner);
        }
        match self
            .backend
            .metadata
            .share(file.file_id, session.user_id())
            .await?
        {
            Some(envelope) if envelope.is_valid_at(self.now()) => Ok(Access::Shared(envelope)),
            Some(_) => Err(VaultError::AccessExpired),
            None => Err(VaultError::NotAuthorized),
        }
    }

    pub(crate) fn unwrap_key(
        &self,
        session: &Session,
        file: &FileRecord,
        access: &Access,
    ) -> VaultResult<ContentKey> {
        let wrapped = match access {
            Access::Owner => &file.owner_wrapped_key,
            Access::Shared(envelope) => &envelope.wrapped_content_key,
        };
        envelope::unwrap_content_key(wrapped, &session.identity().encryption)
    }

    /// Check that `ciphertext` was signed by the file's owner.
    ///
    /// The recorded signer key must be the owner's published signing key,
    /// and the detached signature must verify under it.
    pub(crate) async fn verify_origin(&self, file: &FileRecord, ciphertext: &[u8]) -> VaultResult<()> {
        let owner = self
            .backend
            .metadata
            .user_by_id(file.owner_id)
            .await?
            .ok_or_else(|| VaultError::NotFound(format!("user {}", file.owner_id)))?;
        let published = SigningPublicKey::from_encoded(&owner.signing_public_key)
            .map_err(|_| VaultError::SignatureInvalid)?;
        if published.to_encoded() != file.signer_public_key {
            warn!(file_id = %file.file_id, "signer is not the file owner");
            return Err(VaultError::SignatureInvalid);
        }

        signature::verify_stored(ciphertext, &file.signature, &file.signer_public_key).map_err(
            |err| {
                warn!(file_id = %file.file_id, "ciphertext failed signature check");
                err
            },
        )
    }

    /// Read a file: verify, possibly rotate, decrypt.
    pub async fn open_file(&self, session: &Session, file_id: FileId) -> VaultResult<Vec<u8>> {
        let opened = self.open_file_detailed(session, file_id).await?;
        if let Some(report) = &opened.rotation {
            if !report.failures.is_empty() {
                warn!(
                    %file_id,
                    failed = report.failures.len(),
                    "rotation left some recipients on a stale envelope"
                );
            }
        }
        Ok(opened.plaintext)
    }

    /// As [`Vault::open_file`], also reporting any rotation the read caused.
    pub async fn open_file_detailed(
        &self,
        session: &Session,
        file_id: FileId,
    ) -> VaultResult<OpenedFile> {
        // One retry: a concurrent rotation may have replaced the row
        // between our read and our conditional write.
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.open_once(session, file_id).await {
                Err(VaultError::VersionConflict { expected, found }) if attempts < 2 => {
                    debug!(%file_id, expected, found, "file rotated concurrently, re-reading");
                }
                other => return other,
            }
        }
    }

    async fn open_once(&self, session: &Session, file_id: FileId) -> VaultResult<OpenedFile> {
        let file = self.load_file(file_id).await?;
        let access = self.resolve_access(session, &file).await?;
        let ciphertext = self.backend.blobs.get(&file.storage_path).await?;

        self.verify_origin(&file, &ciphertext).await?;
        let key = self.unwrap_key(session, &file, &access)?;

        let state = rotation::key_state(&file, self.now(), &self.config.rotation);
        if matches!(access, Access::Owner) && state == KeyState::Stale {
            let (plaintext, report) = self.rotate_loaded(session, &file, &ciphertext, &key).await?;
            return Ok(OpenedFile {
                plaintext,
                rotation: Some(report),
            });
        }

        let nonce = encoding::decode(&file.nonce, "nonce")?;
        let plaintext = crypto::open(&ciphertext, &nonce, key.as_bytes())?;
        Ok(OpenedFile {
            plaintext,
            rotation: None,
        })
    }

    /// Delete a file. The owner removes the blob, the row, and every share;
    /// a recipient removes only their own envelope.
    pub async fn delete_file(&self, session: &Session, file_id: FileId) -> VaultResult<()> {
        let file = self.load_file(file_id).await?;
        if file.owner_id != session.user_id() {
            let removed = self
                .backend
                .metadata
                .delete_share(file_id, session.user_id())
                .await?;
            return if removed {
                Ok(())
            } else {
                Err(VaultError::NotAuthorized)
            };
        }
        self.delete_owned_file(session, &file).await
    }

    /// Blob first, then shares, then the row: a failure part way leaves a
    /// row the owner can still find and delete again.
    async fn delete_owned_file(&self, session: &Session, file: &FileRecord) -> VaultResult<()> {
        let meta = &self.backend.metadata;
        self.backend.blobs.delete(&file.storage_path).await?;
        meta.delete_shares_for_file(file.file_id).await?;
        meta.delete_file(file.file_id).await?;
        self.record(AuditAction::FileDeleted, session.user_id(), file.file_id, None);
        info!(file_id = %file.file_id, "deleted file");
        Ok(())
    }

    pub async fn list_owned_files(&self, session: &Session) -> VaultResult<Vec<FileRecord>> {
        self.backend.metadata.files_by_owner(session.user_id()).await
    }

    /// Files shared with the session. Expired envelopes are purged and
    /// left out.
    pub async fn list_shared_with_me(&self, session: &Session) -> VaultResult<Vec<SharedFile>> {
        let meta = &self.backend.metadata;
        let now = self.now();
        let mut visible = Vec::new();
        for envelope in meta.shares_for_recipient(session.user_id()).await? {
            if !envelope.is_valid_at(now) {
                meta.delete_share(envelope.file_id, envelope.recipient_id)
                    .await?;
                continue;
            }
            if let Some(file) = meta.file(envelope.file_id).await? {
                visible.push(SharedFile { file, envelope });
            }
        }
        Ok(visible)
    }

    /// Remove expired envelopes the session can see: ones it received and
    /// ones on files it owns. Returns how many were removed.
    pub async fn purge_expired_shares(&self, session: &Session) -> VaultResult<usize> {
        let meta = &self.backend.metadata;
        let now = self.now();
        let mut candidates = meta.shares_for_recipient(session.user_id()).await?;
        for file in meta.files_by_owner(session.user_id()).await? {
            candidates.extend(meta.shares_for_file(file.file_id).await?);
        }

        let mut purged = 0;
        for envelope in candidates.iter().filter(|e| !e.is_valid_at(now)) {
            if meta
                .delete_share(envelope.file_id, envelope.recipient_id)
                .await?
            {
                purged += 1;
            }
        }
        for share in meta.folder_shares_for_recipient(session.user_id()).await? {
            if !share.is_valid_at(now)
                && meta
                    .delete_folder_share(share.folder_id, share.recipient_id)
                    .await?
            {
                purged += 1;
            }
        }

        debug!(purged, "purged expired shares");
        Ok(purged)
    }

    // -----------------------------------------------------------------------
    // Sharing by username
    // -----------------------------------------------------------------------

    async fn lookup_recipient(&self, username: &str) -> VaultResult<crate::store::DirectoryEntry> {
        self.backend
            .directory
            .lookup(username)
            .await?
            .ok_or_else(|| VaultError::NotFound(format!("user {username}")))
    }

    /// Grant `request.recipient_username` access to one file.
    pub async fn grant_access(
        &self,
        session: &Session,
        file_id: FileId,
        request: &ShareRequest,
    ) -> VaultResult<FileEnvelope> {
        let recipient = self.lookup_recipient(&request.recipient_username).await?;
        self.grant(
            session,
            &GrantRequest {
                file_id,
                recipient_id: recipient.id,
                recipient_public_key: recipient.encryption_public_key,
                expires_at: request.expires_at,
            },
        )
        .await
    }

    /// Withdraw a recipient's access to one file. Idempotent.
    pub async fn revoke_access(
        &self,
        session: &Session,
        file_id: FileId,
        recipient_id: UserId,
    ) -> VaultResult<()> {
        self.revoke(session, file_id, recipient_id).await.map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Folders
    // -----------------------------------------------------------------------

    pub async fn create_folder(
        &self,
        session: &Session,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> VaultResult<FolderId> {
        if name.trim().is_empty() || name.contains('/') {
            return Err(VaultError::InvalidInput(format!("bad folder name: {name:?}")));
        }
        if let Some(parent) = parent_id {
            self.owned_folder(session, parent).await?;
        }
        let folder_id = Uuid::new_v4();
        self.backend
            .metadata
            .insert_folder(FolderRecord {
                folder_id,
                owner_id: session.user_id(),
                parent_id,
                name: name.to_string(),
            })
            .await?;
        Ok(folder_id)
    }

    /// Folders shared with the session whose grant is still valid.
    pub async fn list_shared_folders(&self, session: &Session) -> VaultResult<Vec<FolderRecord>> {
        let meta = &self.backend.metadata;
        let now = self.now();
        let mut folders = Vec::new();
        for share in meta.folder_shares_for_recipient(session.user_id()).await? {
            if !share.is_valid_at(now) {
                continue;
            }
            if let Some(folder) = meta.folder(share.folder_id).await? {
                folders.push(folder);
            }
        }
        Ok(folders)
    }

    /// Share every file under a folder tree with a user.
    ///
    /// Each file is granted independently; on partial failure the error
    /// lists the failed targets and the successful grants stay in place.
    pub async fn share_folder(
        &self,
        session: &Session,
        folder_id: FolderId,
        request: &ShareRequest,
    ) -> VaultResult<BulkReport> {
        let recipient = self.lookup_recipient(&request.recipient_username).await?;
        self.grant_folder(
            session,
            &FolderGrantRequest {
                folder_id,
                recipient_id: recipient.id,
                recipient_public_key: recipient.encryption_public_key,
                expires_at: request.expires_at,
            },
        )
        .await?
        .into_result()
    }

    pub async fn unshare_folder(
        &self,
        session: &Session,
        folder_id: FolderId,
        recipient_id: UserId,
    ) -> VaultResult<BulkReport> {
        self.revoke_folder(session, folder_id, recipient_id)
            .await?
            .into_result()
    }

    /// Delete a folder tree: every file, every folder share, and every
    /// folder, children before parents. Owner only.
    pub async fn delete_folder(&self, session: &Session, folder_id: FolderId) -> VaultResult<BulkReport> {
        let root = self.owned_folder(session, folder_id).await?;
        let meta = &self.backend.metadata;
        let tree = sharing::folder_tree(meta.as_ref(), &root).await?;

        let mut report = BulkReport::default();
        for folder in &tree {
            for file in meta.files_in_folder(folder.folder_id).await? {
                match self.delete_owned_file(session, &file).await {
                    Ok(()) => report.succeeded.push(file.file_id),
                    Err(err) => {
                        warn!(file_id = %file.file_id, error = %err, "file delete failed");
                        report
                            .failures
                            .push(TargetFailure::new(file.file_id.to_string(), "delete", &err));
                    }
                }
            }
        }

        if !report.failures.is_empty() {
            // Keep the folders so the failed files stay reachable for retry.
            return report.into_result();
        }

        for folder in tree.iter().rev() {
            meta.delete_folder_shares(folder.folder_id).await?;
            meta.delete_folder(folder.folder_id).await?;
        }
        info!(%folder_id, folders = tree.len(), "deleted folder tree");
        Ok(report)
    }

    /// Decrypt every file under a folder tree the session can read.
    pub async fn open_folder(&self, session: &Session, folder_id: FolderId) -> VaultResult<FolderDownload> {
        let meta = &self.backend.metadata;
        let root = meta
            .folder(folder_id)
            .await?
            .ok_or_else(|| VaultError::NotFound(format!("folder {folder_id}")))?;

        if root.owner_id != session.user_id() {
            match meta.folder_share(folder_id, session.user_id()).await? {
                Some(share) if share.is_valid_at(self.now()) => {}
                Some(_) => return Err(VaultError::AccessExpired),
                None => return Err(VaultError::NotAuthorized),
            }
        }

        let tree = sharing::folder_tree(meta.as_ref(), &root).await?;
        let mut paths: HashMap<FolderId, String> = HashMap::new();
        let mut download = FolderDownload::default();

        for folder in &tree {
            let path = match folder.parent_id.and_then(|p| paths.get(&p)) {
                Some(parent) if folder.folder_id != root.folder_id => {
                    format!("{parent}/{}", folder.name)
                }
                _ => folder.name.clone(),
            };
            for file in meta.files_in_folder(folder.folder_id).await? {
                match self.open_file(session, file.file_id).await {
                    Ok(bytes) => download.files.push((format!("{path}/{}", file.name), bytes)),
                    Err(err) => download
                        .failures
                        .push(TargetFailure::new(file.file_id.to_string(), "open", &err)),
                }
            }
            paths.insert(folder.folder_id, path);
        }

        Ok(download)
    }
}
