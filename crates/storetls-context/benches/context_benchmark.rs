//! Context construction benchmarks
//!
//! Measures:
//! - Decoding each fixture container format
//! - Full `build_context` for key store, trust store and mutual TLS setups

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use storetls_context::store::decode;
use storetls_context::{build_context, StoreSpec, StoreType};
use storetls_test_utils::{TestFixtures, FIXTURE_PASSWORD};

/// Benchmark raw container decoding
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let stores: &[(&str, StoreType)] = &[
        ("keystore.p12", StoreType::Pkcs12),
        ("keystore.jks", StoreType::Jks),
        ("truststore.jks", StoreType::Jks),
        ("client-bundle.pem", StoreType::Pem),
    ];

    for (name, store_type) in stores {
        let bytes = TestFixtures::bytes(name);
        group.bench_with_input(BenchmarkId::new("store", name), &bytes, |b, bytes| {
            b.iter(|| black_box(decode(black_box(bytes), *store_type, Some(FIXTURE_PASSWORD)).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark complete context construction
fn bench_build_context(c: &mut Criterion) {
    let key = StoreSpec::new(TestFixtures::keystore_p12())
        .with_type("PKCS12")
        .with_password(FIXTURE_PASSWORD);
    let trust = StoreSpec::new(TestFixtures::truststore_jks())
        .with_type("JKS")
        .with_password(FIXTURE_PASSWORD);
    let none = StoreSpec::none();

    let mut group = c.benchmark_group("build_context");

    group.bench_function("trust_only", |b| {
        b.iter(|| black_box(build_context(&none, &trust, false).unwrap()))
    });
    group.bench_function("key_only", |b| {
        b.iter(|| black_box(build_context(&key, &none, false).unwrap()))
    });
    group.bench_function("mutual", |b| {
        b.iter(|| black_box(build_context(&key, &trust, false).unwrap()))
    });
    group.bench_function("insecure_only", |b| {
        b.iter(|| black_box(build_context(&none, &none, true).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_build_context);
criterion_main!(benches);
