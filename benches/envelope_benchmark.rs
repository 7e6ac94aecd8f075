use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zkvault::crypto::{open, seal};
use zkvault::envelope::{unwrap_content_key, wrap_content_key};
use zkvault::identity::{EncryptionKeyPair, SigningKeyPair};
use zkvault::keys::{derive, ContentKey, Salt};
use zkvault::signature::{sign, verify};
use zkvault::KdfParams;

fn benchmark_content_encryption(c: &mut Criterion) {
    let mut group = c.benchmark_group("secret_box");
    let key = [42u8; 32];

    for (name, size) in [("1KB", 1024), ("64KB", 64 * 1024), ("1MB", 1024 * 1024)] {
        let payload = vec![0u8; size];
        let sealed = seal(&payload, &key).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("seal", name), &payload, |b, payload| {
            b.iter(|| seal(black_box(payload), black_box(&key)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("open", name), &sealed, |b, sealed| {
            b.iter(|| {
                open(
                    black_box(&sealed.ciphertext),
                    black_box(sealed.nonce.as_bytes()),
                    black_box(&key),
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

fn benchmark_envelopes(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");
    let recipient = EncryptionKeyPair::generate();
    let content_key = ContentKey::generate().unwrap();
    let wrapped = wrap_content_key(&content_key, recipient.public_key()).unwrap();

    // One wrap per recipient is the per-share cost of a rotation.
    group.bench_function("wrap", |b| {
        b.iter(|| wrap_content_key(black_box(&content_key), black_box(recipient.public_key())).unwrap())
    });
    group.bench_function("unwrap", |b| {
        b.iter(|| unwrap_content_key(black_box(&wrapped), black_box(&recipient)).unwrap())
    });
    group.finish();
}

fn benchmark_signatures(c: &mut Criterion) {
    let mut group = c.benchmark_group("signature");
    let signer = SigningKeyPair::generate().unwrap();
    let message = vec![1u8; 64 * 1024];
    let sig = sign(&message, &signer);
    let public = signer.public_key();

    group.throughput(Throughput::Bytes(message.len() as u64));
    group.bench_function("sign_64KB", |b| b.iter(|| sign(black_box(&message), &signer)));
    group.bench_function("verify_64KB", |b| {
        b.iter(|| verify(black_box(&message), black_box(&sig), &public))
    });
    group.finish();
}

fn benchmark_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdf");
    group.sample_size(10);
    let salt = Salt::random().unwrap();

    for (name, params) in [
        (
            "cheap",
            KdfParams {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        ),
        ("interactive", KdfParams::default()),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| derive(black_box(b"correct horse"), Some(&salt), &params).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_content_encryption,
    benchmark_envelopes,
    benchmark_signatures,
    benchmark_derivation
);
criterion_main!(benches);
