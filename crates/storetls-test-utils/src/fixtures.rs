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

//! Checked-in store fixtures.
//!
//! Generated once with `openssl` and `keytool`:
//! - `ca.pem`: self-signed "CN=storetls Test CA"
//! - `keystore.p12` / `keystore.jks`: alias `client`, "CN=storetls client"
//!   with its chain (leaf, CA)
//! - `keystore-nomac.p12`: the same identity exported with `-nomac`
//! - `trust-plain.p12`: the CA under alias `ca` in an unencrypted
//!   certificate bag (`-nokeys -certpbe NONE`)
//! - `client-bundle.pem`: the same identity as PEM key plus chain
//! - `truststore.jks`: the CA under alias `ca`
//! - `server-chain.pem` / `server-key.pem`: "CN=localhost" issued by the CA
//!
//! Every store uses [`FIXTURE_PASSWORD`].

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::fs;
use std::path::{Path, PathBuf};

/// Password of every fixture store
pub const FIXTURE_PASSWORD: &str = "password";

/// Test fixture management utilities.
pub struct TestFixtures;

impl TestFixtures {
    /// Directory holding the fixture files.
    pub fn dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Path of a fixture file by name.
    pub fn path(name: &str) -> PathBuf {
        Self::dir().join(name)
    }

    /// PKCS#12 key store with the client identity.
    pub fn keystore_p12() -> PathBuf {
        Self::path("keystore.p12")
    }

    /// PKCS#12 key store with the client identity and no MAC.
    pub fn keystore_p12_without_mac() -> PathBuf {
        Self::path("keystore-nomac.p12")
    }

    /// PKCS#12 trust store with the test CA in a plain certificate bag.
    pub fn truststore_plain_p12() -> PathBuf {
        Self::path("trust-plain.p12")
    }

    /// JKS key store with the client identity.
    pub fn keystore_jks() -> PathBuf {
        Self::path("keystore.jks")
    }

    /// JKS trust store holding the test CA.
    pub fn truststore_jks() -> PathBuf {
        Self::path("truststore.jks")
    }

    /// Test CA certificate as PEM.
    pub fn ca_pem() -> PathBuf {
        Self::path("ca.pem")
    }

    /// Client key and chain as one PEM bundle.
    pub fn client_bundle_pem() -> PathBuf {
        Self::path("client-bundle.pem")
    }

    /// Server certificate chain, leaf first.
    pub fn server_chain() -> Vec<CertificateDer<'static>> {
        let pem = fs::read(Self::path("server-chain.pem")).expect("server-chain.pem fixture");
        rustls_pemfile::certs(&mut pem.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .expect("valid server chain")
    }

    /// Server private key.
    pub fn server_key() -> PrivateKeyDer<'static> {
        let pem = fs::read(Self::path("server-key.pem")).expect("server-key.pem fixture");
        rustls_pemfile::private_key(&mut pem.as_slice())
            .expect("valid server key")
            .expect("server key present")
    }

    /// Test CA certificate.
    pub fn ca_certificate() -> CertificateDer<'static> {
        let pem = fs::read(Self::ca_pem()).expect("ca.pem fixture");
        let cert = rustls_pemfile::certs(&mut pem.as_slice())
            .next()
            .expect("CA certificate present")
            .expect("valid CA certificate");
        cert
    }

    /// Read a fixture file completely.
    pub fn bytes(name: &str) -> Vec<u8> {
        fs::read(Self::path(name)).unwrap_or_else(|e| panic!("fixture {} unreadable: {}", name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_present() {
        for path in [
            TestFixtures::keystore_p12(),
            TestFixtures::keystore_p12_without_mac(),
            TestFixtures::truststore_plain_p12(),
            TestFixtures::keystore_jks(),
            TestFixtures::truststore_jks(),
            TestFixtures::ca_pem(),
            TestFixtures::client_bundle_pem(),
        ] {
            assert!(path.exists(), "missing fixture {:?}", path);
        }
        assert_eq!(TestFixtures::server_chain().len(), 2);
    }
}
