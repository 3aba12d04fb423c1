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

//! Certificates generated on the fly for negative trust tests.

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use time::{Duration, OffsetDateTime};

/// A generated key with its certificate chain
pub struct GeneratedIdentity {
    /// Chain, leaf first
    pub chain: Vec<CertificateDer<'static>>,
    /// PKCS#8 private key of the leaf
    pub key_der: Vec<u8>,
    /// Leaf certificate as PEM
    pub cert_pem: String,
    /// Leaf key as PEM
    pub key_pem: String,
}

impl GeneratedIdentity {
    /// Private key in rustls form
    pub fn key(&self) -> PrivateKeyDer<'static> {
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key_der.clone()))
    }
}

/// Certificate generators.
pub struct TestCertificates;

impl TestCertificates {
    /// Self-signed certificate for `host`, valid now.
    pub fn self_signed(host: &str) -> GeneratedIdentity {
        let now = OffsetDateTime::now_utc();
        Self::leaf(host, now - Duration::days(1), now + Duration::days(30), None)
    }

    /// Self-signed certificate for `host` that expired a month ago.
    pub fn expired(host: &str) -> GeneratedIdentity {
        let now = OffsetDateTime::now_utc();
        Self::leaf(host, now - Duration::days(60), now - Duration::days(30), None)
    }

    /// Certificate for `host` issued by a freshly generated CA nobody trusts.
    pub fn rogue_ca_signed(host: &str) -> GeneratedIdentity {
        let now = OffsetDateTime::now_utc();
        let ca_key = KeyPair::generate().expect("CA key");
        let mut ca_params = params(
            "storetls Rogue CA",
            vec![],
            now - Duration::days(1),
            now + Duration::days(30),
        );
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let ca_cert = ca_params.self_signed(&ca_key).expect("rogue CA");

        Self::leaf(
            host,
            now - Duration::days(1),
            now + Duration::days(30),
            Some((&ca_cert, &ca_key)),
        )
    }

    fn leaf(
        host: &str,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
        issuer: Option<(&rcgen::Certificate, &KeyPair)>,
    ) -> GeneratedIdentity {
        let key = KeyPair::generate().expect("leaf key");
        let leaf_params = params(host, vec![host.to_string()], not_before, not_after);

        let (cert, mut chain) = match issuer {
            Some((ca_cert, ca_key)) => (
                leaf_params
                    .signed_by(&key, ca_cert, ca_key)
                    .expect("CA-signed leaf"),
                vec![ca_cert.der().clone()],
            ),
            None => (leaf_params.self_signed(&key).expect("self-signed leaf"), vec![]),
        };
        chain.insert(0, cert.der().clone());

        GeneratedIdentity {
            chain,
            key_der: key.serialize_der(),
            cert_pem: cert.pem(),
            key_pem: key.serialize_pem(),
        }
    }
}

fn params(
    common_name: &str,
    names: Vec<String>,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
) -> CertificateParams {
    let mut params = CertificateParams::new(names).expect("valid subject alt names");
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params.not_before = not_before;
    params.not_after = not_after;
    params
}
