//! Lazy content-key rotation.
//!
//! A key older than the rotation threshold is replaced the next time its
//! owner reads the file. Rotation writes the new ciphertext to a fresh
//! blob path, swaps the file row with a version-checked write, and only
//! then drops the old blob. Every valid recipient envelope is re-wrapped to
//! the new key; a recipient whose envelope could not be re-wrapped is named
//! in the report rather than failing the read.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::audit::AuditAction;
use crate::config::RotationPolicy;
use crate::crypto;
use crate::encoding;
use crate::envelope;
use crate::error::{TargetFailure, VaultError, VaultResult};
use crate::keys::ContentKey;
use crate::session::Session;
use crate::sharing::BulkReport;
use crate::signature;
use crate::store::{FileEnvelope, FileId, FileRecord, UserId};
use crate::vault::Vault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Fresh,
    Stale,
}

/// Classify a file's content key. A key exactly at the threshold is
/// still fresh.
pub fn key_state(file: &FileRecord, now: DateTime<Utc>, policy: &RotationPolicy) -> KeyState {
    if now - file.content_key_age > policy.threshold() {
        KeyState::Stale
    } else {
        KeyState::Fresh
    }
}

/// What a rotation did.
#[derive(Debug, Clone, Default)]
pub struct RotationReport {
    /// The file row version after rotation.
    pub version: u64,
    /// Recipients now holding an envelope for the new key.
    pub rewrapped: Vec<UserId>,
    /// Recipients whose expired envelopes were dropped instead.
    pub expired: Vec<UserId>,
    /// Recipients still holding an envelope for the old key (`reseal`),
    /// expired envelopes left in place (`purge`), or the whole share
    /// listing (`list-shares`).
    pub failures: Vec<TargetFailure>,
}

impl RotationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ids of the recipients to pass to [`Vault::rewrap_recipients`].
    /// Expired envelopes that could not be purged are not among them.
    pub fn failed_recipients(&self) -> Vec<UserId> {
        self.failures
            .iter()
            .filter(|f| f.step == "reseal")
            .filter_map(|f| f.target.parse().ok())
            .collect()
    }
}

impl Vault {
    /// Rotate a file's content key now, whatever its age. Owner only.
    pub async fn rotate_file(&self, session: &Session, file_id: FileId) -> VaultResult<RotationReport> {
        let file = self.load_file(file_id).await?;
        if file.owner_id != session.user_id() {
            return Err(VaultError::NotAuthorized);
        }
        let ciphertext = self.backend.blobs.get(&file.storage_path).await?;
        self.verify_origin(&file, &ciphertext).await?;
        let key = envelope::unwrap_content_key(&file.owner_wrapped_key, &session.identity().encryption)?;

        let (_, report) = self.rotate_loaded(session, &file, &ciphertext, &key).await?;
        Ok(report)
    }

    /// Rotate a file whose ciphertext has already been fetched and verified.
    /// Returns the plaintext alongside the report.
    pub(crate) async fn rotate_loaded(
        &self,
        session: &Session,
        file: &FileRecord,
        ciphertext: &[u8],
        current: &ContentKey,
    ) -> VaultResult<(Vec<u8>, RotationReport)> {
        let nonce = encoding::decode(&file.nonce, "nonce")?;
        let plaintext = crypto::open(ciphertext, &nonce, current.as_bytes())?;

        let key = ContentKey::generate()?;
        let sealed = crypto::seal(&plaintext, key.as_bytes())?;
        let sig = signature::sign(&sealed.ciphertext, &session.identity().signing);
        let owner_wrapped_key = envelope::wrap_content_key(&key, session.encryption_public_key())?;

        let version = file.version + 1;
        let storage_path = self.blob_path(file.owner_id, file.file_id, version);
        self.backend
            .blobs
            .put(&storage_path, sealed.ciphertext, false)
            .await?;

        let now = self.now();
        let rotated = FileRecord {
            storage_path: storage_path.clone(),
            owner_wrapped_key,
            nonce: encoding::encode(sealed.nonce.as_bytes()),
            signature: sig.to_encoded(),
            signer_public_key: session.signing_public_key().to_encoded(),
            content_key_age: now,
            version,
            ..file.clone()
        };
        if let Err(err) = self
            .backend
            .metadata
            .update_file_if_version(rotated, file.version)
            .await
        {
            if let Err(cleanup) = self.backend.blobs.delete(&storage_path).await {
                warn!(path = %storage_path, error = %cleanup, "orphaned rotation blob");
            }
            return Err(err);
        }

        if let Err(err) = self.backend.blobs.delete(&file.storage_path).await {
            warn!(path = %file.storage_path, error = %err, "old blob not removed");
        }

        let mut report = RotationReport {
            version,
            ..RotationReport::default()
        };
        // The row swap has committed: from here on failures are reported,
        // never returned.
        let shares = match self.backend.metadata.shares_for_file(file.file_id).await {
            Ok(shares) => shares,
            Err(err) => {
                warn!(file_id = %file.file_id, error = %err, "could not list envelopes to re-wrap");
                report
                    .failures
                    .push(TargetFailure::new(file.file_id.to_string(), "list-shares", &err));
                Vec::new()
            }
        };
        for share in shares {
            let recipient = share.recipient_id;
            if !share.is_valid_at(now) {
                match self
                    .backend
                    .metadata
                    .delete_share(share.file_id, recipient)
                    .await
                {
                    Ok(_) => report.expired.push(recipient),
                    Err(err) => {
                        warn!(file_id = %file.file_id, %recipient, error = %err, "expired envelope not purged");
                        report
                            .failures
                            .push(TargetFailure::new(recipient.to_string(), "purge", &err));
                    }
                }
                continue;
            }
            match self.rewrap(share, &key).await {
                Ok(()) => report.rewrapped.push(recipient),
                Err(err) => {
                    warn!(file_id = %file.file_id, %recipient, error = %err, "re-wrap failed");
                    self.record(
                        AuditAction::RewrapFailed,
                        session.user_id(),
                        file.file_id,
                        Some(recipient),
                    );
                    report
                        .failures
                        .push(TargetFailure::new(recipient.to_string(), "reseal", &err));
                }
            }
        }

        self.record(AuditAction::Rotated, session.user_id(), file.file_id, None);
        info!(
            file_id = %file.file_id,
            version,
            rewrapped = report.rewrapped.len(),
            failed = report.failures.len(),
            "rotated content key"
        );
        Ok((plaintext, report))
    }

    async fn rewrap(&self, share: FileEnvelope, key: &ContentKey) -> VaultResult<()> {
        let public_key = self
            .backend
            .directory
            .encryption_key(share.recipient_id)
            .await?;
        let wrapped_content_key = envelope::wrap_content_key(key, &public_key)?;
        self.backend
            .metadata
            .upsert_share(FileEnvelope {
                wrapped_content_key,
                ..share
            })
            .await?;
        Ok(())
    }

    /// Re-wrap the current content key for the given recipients. Used to
    /// retry the failures a rotation reported.
    pub async fn rewrap_recipients(
        &self,
        session: &Session,
        file_id: FileId,
        recipients: &[UserId],
    ) -> VaultResult<BulkReport> {
        let file = self.load_file(file_id).await?;
        if file.owner_id != session.user_id() {
            return Err(VaultError::NotAuthorized);
        }
        let key = envelope::unwrap_content_key(&file.owner_wrapped_key, &session.identity().encryption)?;
        let now = self.now();

        let mut report = BulkReport::default();
        for &recipient in recipients {
            let outcome = match self.backend.metadata.share(file_id, recipient).await {
                Ok(Some(share)) if share.is_valid_at(now) => self.rewrap(share, &key).await,
                Ok(Some(_)) => Err(VaultError::AccessExpired),
                Ok(None) => Err(VaultError::NotFound(format!("share for {recipient}"))),
                Err(err) => Err(err),
            };
            match outcome {
                Ok(()) => report.succeeded.push(recipient),
                Err(err) => report
                    .failures
                    .push(TargetFailure::new(recipient.to_string(), "reseal", &err)),
            }
        }
        report.into_result()
    }
}
