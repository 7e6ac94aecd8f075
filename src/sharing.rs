//! Granting and revoking access.
//!
//! A grant is one sealed envelope row per `(file, recipient)`. Writing it is
//! an upsert, so granting twice replaces the wrapped key and keeps the share
//! id. Revoking deletes the row and is a no-op when the row is absent.
//!
//! Folder grants fan out to one file grant per file in the tree. Each file
//! grant is independent; the folder operation succeeds as a whole only if
//! every child does, and otherwise reports exactly which targets failed.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::AuditAction;
use crate::envelope;
use crate::error::{TargetFailure, VaultError, VaultResult};
use crate::identity::EncryptionPublicKey;
use crate::session::Session;
use crate::store::{
    FileEnvelope, FileId, FolderId, FolderRecord, FolderShareRecord, MetadataStore, ShareId,
    UserId,
};
use crate::vault::Vault;

/// Grant one recipient access to one file.
#[derive(Debug, Clone)]
pub struct GrantRequest {
    pub file_id: FileId,
    pub recipient_id: UserId,
    pub recipient_public_key: EncryptionPublicKey,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Grant one recipient access to every file under a folder.
#[derive(Debug, Clone)]
pub struct FolderGrantRequest {
    pub folder_id: FolderId,
    pub recipient_id: UserId,
    pub recipient_public_key: EncryptionPublicKey,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Outcome of a fan-out operation.
#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    /// Ids of the targets that were handled.
    pub succeeded: Vec<Uuid>,
    pub failures: Vec<TargetFailure>,
}

impl BulkReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Ok(self)` if nothing failed, otherwise `PartialFailure` naming
    /// every failed target.
    pub fn into_result(self) -> VaultResult<Self> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(VaultError::PartialFailure(self.failures))
        }
    }

    fn fail(&mut self, target: Uuid, step: &'static str, err: &VaultError) {
        warn!(%target, step, error = %err, "target failed");
        self.failures
            .push(TargetFailure::new(target.to_string(), step, err));
    }
}

/// Every folder under `root`, root first, parents before children.
///
/// Walks with an explicit worklist; a folder reached twice is visited once.
pub(crate) async fn folder_tree(
    meta: &dyn MetadataStore,
    root: &FolderRecord,
) -> VaultResult<Vec<FolderRecord>> {
    let mut visited = HashSet::new();
    let mut ordered = Vec::new();
    let mut pending = vec![root.clone()];

    while let Some(folder) = pending.pop() {
        if !visited.insert(folder.folder_id) {
            continue;
        }
        let mut children = meta.subfolders(folder.folder_id).await?;
        // Reverse so children pop in the order the store listed them.
        children.reverse();
        pending.extend(children);
        ordered.push(folder);
    }
    Ok(ordered)
}

impl Vault {
    /// Grant access to a file.
    ///
    /// The granter must be able to read the file: the owner, or a recipient
    /// holding a valid envelope. A recipient's grant records their own share
    /// as its parent, and cannot replace an envelope someone else issued.
    /// Nobody can grant to themselves.
    pub async fn grant(&self, session: &Session, request: &GrantRequest) -> VaultResult<FileEnvelope> {
        self.grant_with_parent(session, request, None).await
    }

    async fn grant_with_parent(
        &self,
        session: &Session,
        request: &GrantRequest,
        folder_share: Option<ShareId>,
    ) -> VaultResult<FileEnvelope> {
        let now = self.now();
        if request.expires_at.is_some_and(|at| at <= now) {
            return Err(VaultError::InvalidInput("expiry must be in the future".into()));
        }

        let file = self.load_file(request.file_id).await?;
        if request.recipient_id == file.owner_id {
            return Err(VaultError::InvalidInput("owner already holds the file key".into()));
        }
        if request.recipient_id == session.user_id() {
            return Err(VaultError::InvalidInput("cannot grant access to yourself".into()));
        }

        let access = self
            .resolve_access(session, &file)
            .await
            .map_err(|err| match err {
                VaultError::AccessExpired => VaultError::NotAuthorized,
                other => other,
            })?;

        // A re-sharer may only replace grants they issued themselves.
        if let Some(own_share) = access.share_id() {
            if let Some(existing) = self
                .backend
                .metadata
                .share(file.file_id, request.recipient_id)
                .await?
            {
                if existing.parent_share_id != Some(own_share) {
                    debug!(
                        file_id = %file.file_id,
                        recipient = %request.recipient_id,
                        "re-share would replace another granter's envelope"
                    );
                    return Err(VaultError::NotAuthorized);
                }
            }
        }

        let key = self.unwrap_key(session, &file, &access)?;
        let wrapped = envelope::wrap_content_key(&key, &request.recipient_public_key)?;

        let stored = self
            .backend
            .metadata
            .upsert_share(FileEnvelope {
                share_id: Uuid::new_v4(),
                file_id: file.file_id,
                recipient_id: request.recipient_id,
                wrapped_content_key: wrapped,
                created_at: now,
                expires_at: request.expires_at,
                parent_share_id: folder_share.or_else(|| access.share_id()),
            })
            .await?;

        self.record(
            AuditAction::Granted,
            session.user_id(),
            file.file_id,
            Some(request.recipient_id),
        );
        info!(file_id = %file.file_id, recipient = %request.recipient_id, "granted access");
        Ok(stored)
    }

    /// Remove a recipient's envelope. Returns whether one was removed.
    ///
    /// Allowed for the file owner, the recipient, and whoever issued the
    /// grant by re-sharing. Revoking an absent grant succeeds.
    pub async fn revoke(
        &self,
        session: &Session,
        file_id: FileId,
        recipient_id: UserId,
    ) -> VaultResult<bool> {
        let meta = &self.backend.metadata;
        let Some(share) = meta.share(file_id, recipient_id).await? else {
            debug!(%file_id, recipient = %recipient_id, "revoke of absent grant");
            return Ok(false);
        };

        let actor = session.user_id();
        let owner = meta.file(file_id).await?.map(|f| f.owner_id);
        let is_resharer = match share.parent_share_id {
            Some(parent) => meta
                .share(file_id, actor)
                .await?
                .is_some_and(|own| own.share_id == parent),
            None => false,
        };
        if owner != Some(actor) && actor != recipient_id && !is_resharer {
            return Err(VaultError::NotAuthorized);
        }

        let removed = meta.delete_share(file_id, recipient_id).await?;
        if removed {
            self.record(AuditAction::Revoked, actor, file_id, Some(recipient_id));
            info!(%file_id, recipient = %recipient_id, "revoked access");
        }
        Ok(removed)
    }

    /// Share a folder tree. The folder-share row for a folder is written
    /// before its files are granted; a folder whose row could not be written
    /// is skipped along with everything below it.
    pub async fn grant_folder(
        &self,
        session: &Session,
        request: &FolderGrantRequest,
    ) -> VaultResult<BulkReport> {
        let now = self.now();
        if request.expires_at.is_some_and(|at| at <= now) {
            return Err(VaultError::InvalidInput("expiry must be in the future".into()));
        }
        let meta = &self.backend.metadata;
        let root = meta
            .folder(request.folder_id)
            .await?
            .ok_or_else(|| VaultError::NotFound(format!("folder {}", request.folder_id)))?;
        if root.owner_id != session.user_id() {
            return Err(VaultError::NotAuthorized);
        }
        if request.recipient_id == root.owner_id {
            return Err(VaultError::InvalidInput("cannot share a folder with its owner".into()));
        }

        let mut share_ids: HashMap<FolderId, ShareId> = HashMap::new();
        let mut report = BulkReport::default();

        for folder in folder_tree(meta.as_ref(), &root).await? {
            let parent_share = if folder.folder_id == root.folder_id {
                None
            } else {
                match folder.parent_id.and_then(|p| share_ids.get(&p)) {
                    Some(id) => Some(*id),
                    None => {
                        report.fail(
                            folder.folder_id,
                            "share-folder",
                            &VaultError::NotFound("parent folder share".into()),
                        );
                        continue;
                    }
                }
            };

            let row = match meta
                .upsert_folder_share(FolderShareRecord {
                    share_id: Uuid::new_v4(),
                    folder_id: folder.folder_id,
                    recipient_id: request.recipient_id,
                    created_at: now,
                    expires_at: request.expires_at,
                    parent_share_id: parent_share,
                })
                .await
            {
                Ok(row) => row,
                Err(err) => {
                    report.fail(folder.folder_id, "share-folder", &err);
                    continue;
                }
            };
            share_ids.insert(folder.folder_id, row.share_id);

            let files = match meta.files_in_folder(folder.folder_id).await {
                Ok(files) => files,
                Err(err) => {
                    report.fail(folder.folder_id, "list-files", &err);
                    continue;
                }
            };
            for file in files {
                let grant = GrantRequest {
                    file_id: file.file_id,
                    recipient_id: request.recipient_id,
                    recipient_public_key: request.recipient_public_key.clone(),
                    expires_at: request.expires_at,
                };
                match self
                    .grant_with_parent(session, &grant, Some(row.share_id))
                    .await
                {
                    Ok(_) => report.succeeded.push(file.file_id),
                    Err(err) => report.fail(file.file_id, "grant", &err),
                }
            }
        }

        self.record(
            AuditAction::FolderShared,
            session.user_id(),
            root.folder_id,
            Some(request.recipient_id),
        );
        info!(
            folder_id = %root.folder_id,
            granted = report.succeeded.len(),
            failed = report.failures.len(),
            "shared folder"
        );
        Ok(report)
    }

    /// Withdraw a folder share: every folder-share row in the tree and every
    /// file envelope the recipient holds inside it.
    pub async fn revoke_folder(
        &self,
        session: &Session,
        folder_id: FolderId,
        recipient_id: UserId,
    ) -> VaultResult<BulkReport> {
        let meta = &self.backend.metadata;
        let root = meta
            .folder(folder_id)
            .await?
            .ok_or_else(|| VaultError::NotFound(format!("folder {folder_id}")))?;
        if root.owner_id != session.user_id() && recipient_id != session.user_id() {
            return Err(VaultError::NotAuthorized);
        }

        let mut report = BulkReport::default();
        for folder in folder_tree(meta.as_ref(), &root).await? {
            let files = match meta.files_in_folder(folder.folder_id).await {
                Ok(files) => files,
                Err(err) => {
                    report.fail(folder.folder_id, "list-files", &err);
                    continue;
                }
            };
            for file in files {
                match self.revoke(session, file.file_id, recipient_id).await {
                    Ok(_) => report.succeeded.push(file.file_id),
                    Err(err) => report.fail(file.file_id, "revoke", &err),
                }
            }
            if let Err(err) = meta.delete_folder_share(folder.folder_id, recipient_id).await {
                report.fail(folder.folder_id, "unshare-folder", &err);
            }
        }

        self.record(
            AuditAction::FolderUnshared,
            session.user_id(),
            folder_id,
            Some(recipient_id),
        );
        Ok(report)
    }
}
