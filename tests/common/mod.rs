//! Shared fixture: an in-memory backend, a manual clock, and cheap KDF
//! parameters so scenarios run in milliseconds.

#![allow(dead_code)]

pub mod flaky;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use flaky::FlakyBackend;
use zkvault::{
    Backend, KdfParams, ManualClock, MemoryBackend, Session, UploadRequest, Vault, VaultConfig,
};

pub struct Fixture {
    pub store: Arc<MemoryBackend>,
    pub clock: Arc<ManualClock>,
    pub vault: Vault,
}

pub fn cheap_config() -> VaultConfig {
    VaultConfig {
        kdf: KdfParams {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        },
        ..VaultConfig::default()
    }
}

/// Honour `RUST_LOG` in test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fixture_over(store: Arc<MemoryBackend>, backend: Backend) -> Fixture {
    init_tracing();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
    ));
    let vault = Vault::with_clock(backend, cheap_config(), clock.clone()).unwrap();
    Fixture {
        store,
        clock,
        vault,
    }
}

pub fn fixture() -> Fixture {
    let store = Arc::new(MemoryBackend::new());
    fixture_over(Arc::clone(&store), Backend::from(store))
}

/// A fixture whose vault writes through a [`FlakyBackend`]. `fx.store`
/// still reaches the underlying rows directly.
pub fn flaky_fixture() -> (Fixture, Arc<FlakyBackend>) {
    let store = Arc::new(MemoryBackend::new());
    let flaky = Arc::new(FlakyBackend::new(Arc::clone(&store)));
    let fx = fixture_over(store, Backend::from(Arc::clone(&flaky)));
    (fx, flaky)
}

impl Fixture {
    /// Register and log in.
    pub async fn user(&self, name: &str, password: &str) -> Session {
        self.vault.register(name, password).await.unwrap();
        self.vault.login(name, password).await.unwrap()
    }

    pub async fn upload(&self, session: &Session, name: &str, bytes: &[u8]) -> uuid::Uuid {
        self.vault
            .upload_file(
                session,
                UploadRequest {
                    name: name.into(),
                    bytes: bytes.to_vec(),
                    mime_type: None,
                    folder_id: None,
                },
            )
            .await
            .unwrap()
    }
}
