//! # zkvault
//!
//! Client-side zero-knowledge file vault with sharing and lazy key rotation.
//!
//! Every file is encrypted on the client under its own random content key.
//! Content keys travel only inside sealed envelopes addressed to a
//! recipient's X25519 public key. Private keys are sealed under a master key
//! derived from the user's password with Argon2id, and the backend never
//! holds anything it could decrypt. Ciphertext is signed with Ed25519 and
//! verified before every decryption.
//!
//! ## Public API
//!
//! [`Vault`] is the entry point. It is built over a [`Backend`] (the three
//! storage seams in [`store`]) and hands out a [`Session`] on login; every
//! file operation borrows that session explicitly.
//!
//! The primitive layers (`crypto`, `envelope`, `signature`, `keys`,
//! `identity`) are public for hosts that need them directly, but the vault
//! is the supported surface.

pub mod audit;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod keys;
pub mod memory;
pub mod rotation;
pub mod session;
pub mod sharing;
pub mod signature;
pub mod store;
mod vault;

pub use audit::{AuditAction, AuditLog, AuditRecord, AuditSink, FileAuditSink};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BlobPrefix, KdfParams, RotationPolicy, VaultConfig};
pub use error::{TargetFailure, VaultError, VaultResult};
pub use memory::MemoryBackend;
pub use rotation::{KeyState, RotationReport};
pub use session::Session;
pub use sharing::{BulkReport, FolderGrantRequest, GrantRequest};
pub use store::{
    Backend, FileEnvelope, FileId, FileRecord, FolderId, FolderRecord, FolderShareRecord, ShareId,
    UserId,
};
pub use vault::{FolderDownload, OpenedFile, ShareRequest, SharedFile, UploadRequest, Vault};
