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
//! Property-Based Tests for store decoding
//!
//! Arbitrary bytes must be rejected with a classified error, never a panic:
//! - Random data in every container format
//! - Random data behind a valid JKS header
//! - Truncations of the real fixtures

use proptest::prelude::*;
use storetls_context::store::decode;
use storetls_context::{FailureCause, StoreType};
use storetls_test_utils::{TestFixtures, FIXTURE_PASSWORD};

fn arb_store_type() -> impl Strategy<Value = StoreType> {
    prop_oneof![
        Just(StoreType::Pkcs12),
        Just(StoreType::Jks),
        Just(StoreType::Pem),
    ]
}

/// Random data in every format
#[test]
fn proptest_random_bytes_never_panic() {
    proptest!(|(data in prop::collection::vec(any::<u8>(), 0..4096), store_type in arb_store_type())| {
        let _ = decode(&data, store_type, Some(FIXTURE_PASSWORD));
        let _ = decode(&data, store_type, None);
    });
}

/// Random bodies behind the JKS magic and version
#[test]
fn proptest_jks_header_with_garbage() {
    proptest!(|(body in prop::collection::vec(any::<u8>(), 0..2048))| {
        let mut data = vec![0xfe, 0xed, 0xfe, 0xed, 0x00, 0x00, 0x00, 0x02];
        data.extend_from_slice(&body);

        let err = decode(&data, StoreType::Jks, Some(FIXTURE_PASSWORD)).unwrap_err();
        prop_assert!(matches!(
            err.cause(),
            FailureCause::FormatMismatch | FailureCause::PasswordIncorrect | FailureCause::AlgorithmUnavailable
        ));
    });
}

/// Every strict prefix of a real store is rejected
#[test]
fn proptest_truncated_fixtures_rejected() {
    let jks = TestFixtures::bytes("truststore.jks");
    let p12 = TestFixtures::bytes("keystore.p12");

    proptest!(|(jks_cut in 0..jks.len(), p12_cut in 0..p12.len())| {
        prop_assert!(decode(&jks[..jks_cut], StoreType::Jks, Some(FIXTURE_PASSWORD)).is_err());
        prop_assert!(decode(&p12[..p12_cut], StoreType::Pkcs12, Some(FIXTURE_PASSWORD)).is_err());
    });
}
