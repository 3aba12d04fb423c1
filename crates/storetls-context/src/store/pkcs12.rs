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
//! PKCS#12 decoding
//!
//! With a password the container is opened with `p12-keystore`, which
//! verifies the MAC and decrypts shrouded keys and encrypted bags. Without
//! one the MAC is not checked and only plain certificate bags are read,
//! so a trust store can be loaded without its password.

use super::{PrivateKeyEntry, StoreEntry};
use crate::error::{DecodeError, FailureCause};
use der::asn1::{BmpString, ContextSpecific, ObjectIdentifier, OctetString};
use der::{Decode, Encode};
use p12_keystore::error::Error as P12Error;
use p12_keystore::{KeyStore, KeyStoreEntry};
use pkcs12::authenticated_safe::AuthenticatedSafe;
use pkcs12::cert_type::CertBag;
use pkcs12::pfx::Pfx;
use pkcs12::safe_bag::{SafeBag, SafeContents};
use pkcs12::{PKCS_12_CERT_BAG_OID, PKCS_12_X509_CERT_OID};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tracing::debug;

const CONTENT_TYPE_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.1");
const CONTENT_TYPE_ENCRYPTED_DATA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.6");
const FRIENDLY_NAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.20");
const LOCAL_KEY_ID_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.21");

pub(super) fn decode(bytes: &[u8], password: Option<&str>) -> Result<Vec<StoreEntry>, DecodeError> {
    match password {
        Some(password) => decode_protected(bytes, password),
        None => decode_plain_certificates(bytes),
    }
}

fn decode_protected(bytes: &[u8], password: &str) -> Result<Vec<StoreEntry>, DecodeError> {
    let store = KeyStore::from_pkcs12(bytes, password).map_err(classify)?;

    let mut entries = Vec::new();
    for (alias, entry) in store.entries() {
        match entry {
            KeyStoreEntry::PrivateKeyChain(chain) => {
                let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(chain.key().to_vec()));
                let certs = chain
                    .chain()
                    .iter()
                    .map(|cert| CertificateDer::from(cert.as_der().to_vec()))
                    .collect();
                entries.push(StoreEntry::PrivateKey(PrivateKeyEntry::plain(
                    alias.clone(),
                    key,
                    certs,
                )));
            }
            KeyStoreEntry::Certificate(cert) => {
                entries.push(StoreEntry::TrustedCertificate {
                    alias: alias.clone(),
                    certificate: CertificateDer::from(cert.as_der().to_vec()),
                });
            }
        }
    }

    Ok(entries)
}

/// Read the unencrypted certificate bags that do not belong to a key
///
/// Encrypted safes and key bags need the password and are skipped.
fn decode_plain_certificates(bytes: &[u8]) -> Result<Vec<StoreEntry>, DecodeError> {
    let pfx = Pfx::from_der(bytes).map_err(malformed)?;
    let auth_safe = data_content(&pfx.auth_safe.content_type, &pfx.auth_safe.content)?;
    let safes = AuthenticatedSafe::from_der(&auth_safe).map_err(malformed)?;

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for safe in safes {
        if safe.content_type == CONTENT_TYPE_ENCRYPTED_DATA {
            skipped += 1;
            continue;
        }
        let bags = SafeContents::from_der(&data_content(&safe.content_type, &safe.content)?)
            .map_err(malformed)?;

        for bag in bags {
            if bag.bag_id != PKCS_12_CERT_BAG_OID || bag_attribute(&bag, LOCAL_KEY_ID_OID).is_some() {
                skipped += 1;
                continue;
            }

            let cert_bag = ContextSpecific::<CertBag>::from_der(&bag.bag_value).map_err(malformed)?;
            if cert_bag.value.cert_id != PKCS_12_X509_CERT_OID {
                return Err(DecodeError::new(
                    FailureCause::AlgorithmUnavailable,
                    format!("unsupported certificate type {}", cert_bag.value.cert_id),
                ));
            }

            let alias = bag_attribute(&bag, FRIENDLY_NAME_OID)
                .and_then(|name| BmpString::from_der(&name).ok())
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("certificate-{}", entries.len()));
            entries.push(StoreEntry::TrustedCertificate {
                alias,
                certificate: CertificateDer::from(cert_bag.value.cert_value.as_bytes().to_vec()),
            });
        }
    }

    if skipped > 0 {
        debug!(
            skipped,
            "Skipped PKCS#12 safes and bags that need the store password"
        );
    }

    Ok(entries)
}

/// Contents of a `data` ContentInfo
fn data_content(content_type: &ObjectIdentifier, content: &der::Any) -> Result<Vec<u8>, DecodeError> {
    if *content_type != CONTENT_TYPE_DATA {
        return Err(DecodeError::format(format!(
            "invalid keystore format (unsupported PKCS#12 content type {})",
            content_type
        )));
    }
    let encoded = content.to_der().map_err(malformed)?;
    Ok(OctetString::from_der(&encoded).map_err(malformed)?.into_bytes())
}

fn bag_attribute(bag: &SafeBag, oid: ObjectIdentifier) -> Option<Vec<u8>> {
    bag.bag_attributes
        .as_ref()?
        .iter()
        .find(|attr| attr.oid == oid)?
        .values
        .iter()
        .next()?
        .to_der()
        .ok()
}

fn malformed(err: der::Error) -> DecodeError {
    DecodeError::with_source(
        FailureCause::FormatMismatch,
        "invalid keystore format (not a PKCS#12 file)",
        err,
    )
}

/// Map a `p12-keystore` failure onto a failure cause
///
/// A MAC mismatch or a decryption that yields bad padding means the
/// password was wrong; stores without a MAC only fail at decryption.
fn classify(err: P12Error) -> DecodeError {
    let (cause, message) = match &err {
        P12Error::MacError(_) | P12Error::UnpadError | P12Error::Pkcs5Error(_) => (
            FailureCause::PasswordIncorrect,
            "keystore password was incorrect",
        ),
        P12Error::UnsupportedEncryptionScheme
        | P12Error::UnsupportedMacAlgorithm
        | P12Error::UnsupportedCertificateType => (
            FailureCause::AlgorithmUnavailable,
            "PKCS#12 file uses an unsupported algorithm",
        ),
        P12Error::DerError(_)
        | P12Error::X509Error(_)
        | P12Error::IoError(_)
        | P12Error::InvalidVersion
        | P12Error::UnsupportedContentType
        | P12Error::InvalidLength
        | P12Error::InvalidParameters
        | P12Error::InvalidData => (
            FailureCause::FormatMismatch,
            "invalid keystore format (not a PKCS#12 file)",
        ),
    };
    DecodeError::with_source(cause, message, err)
}
