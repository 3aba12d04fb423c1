// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
#![allow(clippy::unwrap_used)]
//! Context construction against the checked-in store fixtures
//!
//! Covers:
//! - The "nothing configured" and insecure-only cases
//! - Key store and trust store loading in every supported format
//! - Failure classification (missing file, wrong password, wrong format)
//! - End-to-end trust and identity behaviour over in-memory handshakes

use std::error::Error as _;
use std::sync::Arc;

use storetls_context::{build_context, FailureCause, StoreRole, StoreSpec, TransportContext};
use storetls_test_utils::{
    complete_handshake, fixture_server_config, server_config, TestCertificates, TestFixtures,
    FIXTURE_PASSWORD,
};

fn p12_key_store() -> StoreSpec {
    StoreSpec::new(TestFixtures::keystore_p12())
        .with_type("PKCS12")
        .with_password(FIXTURE_PASSWORD)
}

fn jks_trust_store() -> StoreSpec {
    StoreSpec::new(TestFixtures::truststore_jks())
        .with_type("JKS")
        .with_password(FIXTURE_PASSWORD)
}

fn build(key: &StoreSpec, trust: &StoreSpec, insecure: bool) -> TransportContext {
    build_context(key, trust, insecure)
        .unwrap()
        .expect("context should be present")
}

// ============================================================================
// Presence rules
// ============================================================================

#[test]
fn test_no_stores_no_insecure_is_no_context() {
    let ctx = build_context(&StoreSpec::none(), &StoreSpec::none(), false).unwrap();
    assert!(ctx.is_none());
}

#[test]
fn test_unconfigured_stores_ignore_type_and_password() {
    let key = StoreSpec::none().with_type("invalid").with_password("invalid");
    let trust = StoreSpec::none().with_type("invalid").with_password("invalid");
    assert!(build_context(&key, &trust, false).unwrap().is_none());
}

#[test]
fn test_insecure_only_accepts_untrusted_servers() {
    let ctx = build(&StoreSpec::none(), &StoreSpec::none(), true);
    assert!(ctx.insecure());
    assert!(ctx.credentials().is_none());

    for identity in [
        TestCertificates::rogue_ca_signed("localhost"),
        TestCertificates::self_signed("localhost"),
        TestCertificates::expired("localhost"),
    ] {
        let server = server_config(identity.chain.clone(), identity.key(), None).unwrap();
        complete_handshake(ctx.config(), server, "localhost").unwrap();
    }
}

// ============================================================================
// Successful loading
// ============================================================================

#[test]
fn test_p12_key_store_with_jks_trust_store() {
    let ctx = build(&p12_key_store(), &jks_trust_store(), false);
    assert!(!ctx.insecure());

    let credentials = ctx.credentials().unwrap();
    assert_eq!(credentials.len(), 1);
    assert!(!credentials.identities()[0].chain().is_empty());

    let trust = ctx.trust().unwrap();
    assert_eq!(trust.anchor_count(), 1);
    assert!(!trust.is_insecure());

    let summary = ctx.summary();
    assert_eq!(summary.identities.len(), 1);
    assert!(!summary.ambient_roots);
}

#[test]
fn test_mutual_tls_presents_key_store_identity() {
    let ctx = build(&p12_key_store(), &jks_trust_store(), false);

    let outcome =
        complete_handshake(ctx.config(), fixture_server_config(true), "localhost").unwrap();

    let presented = outcome.client_chain.expect("client certificate sent");
    let expected = ctx.credentials().unwrap().identities()[0].chain();
    assert_eq!(presented[0], expected[0]);
}

#[test]
fn test_trust_store_rejects_unknown_servers() {
    let ctx = build(&StoreSpec::none(), &jks_trust_store(), false);
    assert!(ctx.credentials().is_none());

    complete_handshake(ctx.config(), fixture_server_config(false), "localhost").unwrap();

    for identity in [
        TestCertificates::rogue_ca_signed("localhost"),
        TestCertificates::self_signed("localhost"),
    ] {
        let server = server_config(identity.chain.clone(), identity.key(), None).unwrap();
        let err = complete_handshake(ctx.config(), server, "localhost").unwrap_err();
        assert!(
            matches!(err, rustls::Error::InvalidCertificate(_)),
            "unexpected error: {:?}",
            err
        );
    }
}

#[test]
fn test_insecure_overrides_trust_store() {
    let ctx = build(&StoreSpec::none(), &jks_trust_store(), true);

    let trust = ctx.trust().unwrap();
    assert_eq!(trust.len(), 2);
    assert!(trust.is_insecure());

    let rogue = TestCertificates::rogue_ca_signed("localhost");
    let server = server_config(rogue.chain.clone(), rogue.key(), None).unwrap();
    complete_handshake(ctx.config(), server, "localhost").unwrap();
}

#[test]
fn test_jks_key_store() {
    let key = StoreSpec::new(TestFixtures::keystore_jks())
        .with_type("jks")
        .with_password(FIXTURE_PASSWORD);
    let ctx = build(&key, &jks_trust_store(), false);

    let identity = &ctx.credentials().unwrap().identities()[0];
    assert_eq!(identity.alias(), "client");

    let outcome =
        complete_handshake(ctx.config(), fixture_server_config(true), "localhost").unwrap();
    assert!(outcome.client_chain.is_some());
}

#[test]
fn test_pem_stores() {
    let key = StoreSpec::new(TestFixtures::client_bundle_pem()).with_type("PEM");
    // A password is meaningless for PEM and must not get in the way
    let trust = StoreSpec::new(TestFixtures::ca_pem())
        .with_type("PEM")
        .with_password("ignored");
    let ctx = build(&key, &trust, false);

    assert_eq!(ctx.credentials().unwrap().identities()[0].chain().len(), 2);
    assert_eq!(ctx.trust().unwrap().anchor_count(), 1);

    complete_handshake(ctx.config(), fixture_server_config(true), "localhost").unwrap();
}

#[test]
fn test_jks_trust_store_without_password() {
    let trust = StoreSpec::new(TestFixtures::truststore_jks()).with_type("JKS");
    let ctx = build(&StoreSpec::none(), &trust, false);
    assert_eq!(ctx.trust().unwrap().anchor_count(), 1);
}

#[test]
fn test_p12_trust_store_without_password() {
    // The MAC is not checked and the plain certificate bag is read
    let trust = StoreSpec::new(TestFixtures::truststore_plain_p12()).with_type("PKCS12");
    let ctx = build(&StoreSpec::none(), &trust, false);
    assert_eq!(ctx.trust().unwrap().anchor_count(), 1);

    complete_handshake(ctx.config(), fixture_server_config(false), "localhost").unwrap();
}

#[test]
fn test_p12_key_store_without_mac() {
    let key = StoreSpec::new(TestFixtures::keystore_p12_without_mac())
        .with_type("PKCS12")
        .with_password(FIXTURE_PASSWORD);
    let ctx = build(&key, &jks_trust_store(), false);
    assert_eq!(ctx.credentials().unwrap().identities()[0].alias(), "client");

    let key = StoreSpec::new(TestFixtures::keystore_p12_without_mac())
        .with_type("PKCS12")
        .with_password("wrong-password");
    let err = build_context(&key, &StoreSpec::none(), false).unwrap_err();
    assert_eq!(err.cause(), FailureCause::PasswordIncorrect);
}

#[test]
fn test_key_store_only_uses_bundled_roots() {
    let ctx = build(&p12_key_store(), &StoreSpec::none(), false);
    assert!(ctx.trust().is_none());
    assert!(ctx.summary().ambient_roots);

    // The test CA is not a public root
    let err =
        complete_handshake(ctx.config(), fixture_server_config(false), "localhost").unwrap_err();
    assert!(matches!(err, rustls::Error::InvalidCertificate(_)));
}

#[test]
fn test_key_store_doubles_as_trust_store() {
    // The leaf of each key entry becomes an anchor
    let ctx = build(&StoreSpec::none(), &p12_key_store(), false);
    assert!(ctx.trust().unwrap().anchor_count() >= 1);
}

#[test]
fn test_trust_store_without_certificates_rejects_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("key-only.pem");
    std::fs::copy(TestFixtures::path("server-key.pem"), &path).unwrap();

    let ctx = build(&StoreSpec::none(), &StoreSpec::new(&path).with_type("PEM"), false);
    assert_eq!(ctx.trust().unwrap().anchor_count(), 0);

    let err =
        complete_handshake(ctx.config(), fixture_server_config(false), "localhost").unwrap_err();
    assert_eq!(
        err,
        rustls::Error::InvalidCertificate(rustls::CertificateError::UnknownIssuer)
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_trust_store_is_not_found() {
    let trust = StoreSpec::new("/no/such/file");
    let err = build_context(&StoreSpec::none(), &trust, false).unwrap_err();

    assert_eq!(err.cause(), FailureCause::NotFound);
    assert_eq!(err.store_error().unwrap().role(), StoreRole::TrustStore);
    assert!(err.message().contains("/no/such/file"));
    assert!(err.source().is_some());
}

#[test]
fn test_missing_key_store_is_not_found() {
    let key = StoreSpec::new("invalid")
        .with_type("invalid")
        .with_password("invalid");
    let err = build_context(&key, &StoreSpec::none(), false).unwrap_err();

    assert_eq!(err.cause(), FailureCause::NotFound);
    assert_eq!(err.store_error().unwrap().role(), StoreRole::KeyStore);
}

#[test]
fn test_wrong_key_store_password() {
    let key = StoreSpec::new(TestFixtures::keystore_p12())
        .with_type("PKCS12")
        .with_password("wrong-password");
    let err = build_context(&key, &StoreSpec::none(), false).unwrap_err();

    assert_eq!(err.cause(), FailureCause::PasswordIncorrect);
    assert!(err.to_string().contains("password"));
}

#[test]
fn test_wrong_jks_passwords() {
    let key = StoreSpec::new(TestFixtures::keystore_jks())
        .with_type("JKS")
        .with_password("wrong-password");
    let err = build_context(&key, &StoreSpec::none(), false).unwrap_err();
    assert_eq!(err.cause(), FailureCause::PasswordIncorrect);

    let trust = StoreSpec::new(TestFixtures::truststore_jks())
        .with_type("JKS")
        .with_password("wrong-password");
    let err = build_context(&StoreSpec::none(), &trust, false).unwrap_err();
    assert_eq!(err.cause(), FailureCause::PasswordIncorrect);
    assert!(err.message().contains("password was incorrect"));
}

#[test]
fn test_declared_type_mismatch() {
    let trust = StoreSpec::new(TestFixtures::keystore_p12())
        .with_type("JKS")
        .with_password(FIXTURE_PASSWORD);
    let err = build_context(&StoreSpec::none(), &trust, false).unwrap_err();
    assert_eq!(err.cause(), FailureCause::FormatMismatch);

    let key = StoreSpec::new(TestFixtures::truststore_jks())
        .with_type("PKCS12")
        .with_password(FIXTURE_PASSWORD);
    let err = build_context(&key, &StoreSpec::none(), false).unwrap_err();
    assert_eq!(err.cause(), FailureCause::FormatMismatch);
}

#[test]
fn test_default_type_is_pkcs12() {
    let key = StoreSpec::new(TestFixtures::keystore_p12()).with_password(FIXTURE_PASSWORD);
    assert!(build_context(&key, &StoreSpec::none(), false).unwrap().is_some());

    let trust = StoreSpec::new(TestFixtures::truststore_jks()).with_password(FIXTURE_PASSWORD);
    let err = build_context(&StoreSpec::none(), &trust, false).unwrap_err();
    assert_eq!(err.cause(), FailureCause::FormatMismatch);
}

#[test]
fn test_unknown_type_is_format_mismatch() {
    let key = StoreSpec::new(TestFixtures::keystore_p12())
        .with_type("invalid")
        .with_password(FIXTURE_PASSWORD);
    let err = build_context(&key, &StoreSpec::none(), false).unwrap_err();
    assert_eq!(err.cause(), FailureCause::FormatMismatch);
    assert!(err.message().contains("invalid"));
}

#[test]
fn test_key_failure_wins_over_trust_failure() {
    let key = StoreSpec::new("/no/such/keystore");
    let trust = StoreSpec::new(TestFixtures::truststore_jks())
        .with_type("JKS")
        .with_password("wrong-password");
    let err = build_context(&key, &trust, true).unwrap_err();
    assert_eq!(err.store_error().unwrap().role(), StoreRole::KeyStore);
}

// ============================================================================
// Statelessness
// ============================================================================

#[test]
fn test_repeated_builds_are_independent() {
    let first = build(&p12_key_store(), &jks_trust_store(), false);
    let second = build(&p12_key_store(), &jks_trust_store(), false);

    assert!(!Arc::ptr_eq(&first.config(), &second.config()));
    assert_eq!(first.summary(), second.summary());

    complete_handshake(first.config(), fixture_server_config(true), "localhost").unwrap();
    complete_handshake(second.config(), fixture_server_config(true), "localhost").unwrap();
}

#[test]
fn test_concurrent_builds() {
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                scope.spawn(move || {
                    if i % 2 == 0 {
                        build(&p12_key_store(), &jks_trust_store(), false).summary()
                    } else {
                        build(&p12_key_store(), &jks_trust_store(), i % 3 == 0).summary()
                    }
                })
            })
            .collect();

        for handle in handles {
            let summary = handle.join().unwrap();
            assert_eq!(summary.identities.len(), 1);
        }
    });
}

#[test]
fn test_store_file_can_change_between_builds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truststore");
    let trust = StoreSpec::new(&path).with_type("PEM");

    std::fs::copy(TestFixtures::ca_pem(), &path).unwrap();
    assert_eq!(build(&StoreSpec::none(), &trust, false).summary().anchors, 1);

    std::fs::write(&path, b"not a store").unwrap();
    let err = build_context(&StoreSpec::none(), &trust, false).unwrap_err();
    assert_eq!(err.cause(), FailureCause::FormatMismatch);

    std::fs::remove_file(&path).unwrap();
    let err = build_context(&StoreSpec::none(), &trust, false).unwrap_err();
    assert_eq!(err.cause(), FailureCause::NotFound);
}
