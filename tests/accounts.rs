mod common;

use zkvault::store::MetadataStore;
use zkvault::{Backend, MemoryBackend, Vault, VaultConfig, VaultError};

use common::fixture;

#[tokio::test]
async fn test_register_then_login_restores_keys() {
    let fx = fixture();
    let id = fx.vault.register("alice", "correct horse").await.unwrap();
    let session = fx.vault.login("alice", "correct horse").await.unwrap();

    assert_eq!(session.user_id(), id);
    assert_eq!(session.username(), "alice");

    let row = fx.store.user_by_id(id).await.unwrap().unwrap();
    assert_eq!(row.encryption_public_key, session.encryption_public_key().to_encoded());
    assert_eq!(row.signing_public_key, session.signing_public_key().to_encoded());
    // The stored row holds no password-derived material in the clear.
    assert!(!serde_json::to_string(&row).unwrap().contains("correct horse"));
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let fx = fixture();
    fx.vault.register("alice", "p1").await.unwrap();
    let err = fx.vault.register("alice", "p2").await.unwrap_err();
    assert!(matches!(err, VaultError::UsernameTaken));
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let fx = fixture();
    fx.vault.register("alice", "p1").await.unwrap();

    let wrong_password = fx.vault.login("alice", "p2").await.unwrap_err();
    let unknown_user = fx.vault.login("nobody", "p1").await.unwrap_err();
    assert!(matches!(wrong_password, VaultError::InvalidCredentials));
    assert!(matches!(unknown_user, VaultError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn test_empty_password_is_invalid_input() {
    let fx = fixture();
    let err = fx.vault.register("alice", "").await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidInput(_)));
}

#[tokio::test]
async fn test_change_password_keeps_files_readable() {
    let fx = fixture();
    let mut alice = fx.user("alice", "old").await;
    let file_id = fx.upload(&alice, "a.txt", b"survives").await;
    let salt_before = fx
        .store
        .user_by_id(alice.user_id())
        .await
        .unwrap()
        .unwrap()
        .salt;

    let err = fx
        .vault
        .change_password(&mut alice, "not-old", "new")
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::InvalidCredentials));

    fx.vault.change_password(&mut alice, "old", "new").await.unwrap();
    let salt_after = fx
        .store
        .user_by_id(alice.user_id())
        .await
        .unwrap()
        .unwrap()
        .salt;
    assert_ne!(salt_before, salt_after);

    fx.vault.logout(alice);
    assert!(matches!(
        fx.vault.login("alice", "old").await.unwrap_err(),
        VaultError::InvalidCredentials
    ));
    let alice = fx.vault.login("alice", "new").await.unwrap();
    assert_eq!(fx.vault.open_file(&alice, file_id).await.unwrap(), b"survives");
}

#[tokio::test]
async fn test_change_password_checks_against_current_master() {
    let fx = fixture();
    let mut alice = fx.user("alice", "first").await;

    fx.vault.change_password(&mut alice, "first", "second").await.unwrap();
    // The session now holds the second master key; the first no longer matches.
    assert!(matches!(
        fx.vault
            .change_password(&mut alice, "first", "third")
            .await
            .unwrap_err(),
        VaultError::InvalidCredentials
    ));
    fx.vault.change_password(&mut alice, "second", "third").await.unwrap();

    fx.vault.logout(alice);
    assert!(fx.vault.login("alice", "third").await.is_ok());
}

#[tokio::test]
async fn test_session_debug_is_redacted() {
    let fx = fixture();
    let alice = fx.user("alice", "p1").await;
    let rendered = format!("{alice:?}");
    assert!(rendered.contains("alice"));
    assert!(!rendered.contains("master"));
    assert!(!rendered.contains("identity"));
}

#[test]
fn test_invalid_config_is_refused() {
    let mut config = VaultConfig::default();
    config.rotation.threshold_secs = 0;
    let backend = Backend::from(std::sync::Arc::new(MemoryBackend::new()));
    assert!(matches!(
        Vault::new(backend, config).unwrap_err(),
        VaultError::Config(_)
    ));
}

#[test]
fn test_config_from_json_fills_defaults() {
    let config = VaultConfig::from_json(r#"{ "rotation": { "threshold_secs": 600 } }"#).unwrap();
    assert_eq!(config.rotation.threshold_secs, 600);
    assert_eq!(config.kdf, zkvault::KdfParams::default());
    assert_eq!(config.blob_prefix.0, "files");
}
