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
//! JKS decoding
//!
//! Layout: magic, version, entry count, entries, then a SHA-1 digest over
//! the UTF-16BE password, the `Mighty Aphrodite` salt and every preceding
//! byte. Private keys are wrapped with the Sun key protector, a SHA-1
//! keystream XOR followed by a SHA-1 check digest of the plaintext.

use super::{PrivateKeyEntry, StoreEntry};
use crate::error::{DecodeError, FailureCause};
use der::asn1::ObjectIdentifier;
use der::Decode;
use pkcs12::pbe_params::EncryptedPrivateKeyInfo;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

const JKS_MAGIC: u32 = 0xFEED_FEED;
const JCEKS_MAGIC: u32 = 0xCECE_CECE;

const TAG_PRIVATE_KEY: u32 = 1;
const TAG_TRUSTED_CERT: u32 = 2;
const TAG_SECRET_KEY: u32 = 3;

const INTEGRITY_SALT: &[u8] = b"Mighty Aphrodite";
const DIGEST_LEN: usize = 20;

/// Sun JDK key protector
const KEY_PROTECTOR_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.42.2.17.1.1");

pub(super) fn decode(bytes: &[u8], password: Option<&str>) -> Result<Vec<StoreEntry>, DecodeError> {
    let mut reader = Reader::new(bytes);
    match reader.u32()? {
        JKS_MAGIC => {}
        JCEKS_MAGIC => {
            return Err(DecodeError::format(
                "file is a JCEKS key store, which is not supported",
            ))
        }
        _ => return Err(DecodeError::format("invalid keystore format (not a JKS file)")),
    }

    let version = reader.u32()?;
    if version != 1 && version != 2 {
        return Err(DecodeError::format(format!(
            "unsupported JKS version {}",
            version
        )));
    }

    let count = reader.u32()?;
    let mut entries = Vec::new();
    for _ in 0..count {
        let tag = reader.u32()?;
        let alias = reader.utf()?;
        let _created_millis = reader.u64()?;

        match tag {
            TAG_PRIVATE_KEY => {
                let protected = reader.block()?.to_vec();
                let chain_len = reader.u32()?;
                let mut chain = Vec::new();
                for _ in 0..chain_len {
                    chain.push(reader.certificate(version)?);
                }
                entries.push(StoreEntry::PrivateKey(PrivateKeyEntry::jks_protected(
                    alias, protected, chain,
                )));
            }
            TAG_TRUSTED_CERT => {
                let certificate = reader.certificate(version)?;
                entries.push(StoreEntry::TrustedCertificate { alias, certificate });
            }
            TAG_SECRET_KEY => {
                return Err(DecodeError::format(format!(
                    "entry '{}' is a secret key, which JKS cannot hold",
                    alias
                )))
            }
            other => {
                return Err(DecodeError::format(format!(
                    "unknown JKS entry tag {} for '{}'",
                    other, alias
                )))
            }
        }
    }

    let body_len = reader.position();
    let stored_digest = reader.take(DIGEST_LEN)?;
    if !reader.is_empty() {
        return Err(DecodeError::format("trailing data after JKS integrity digest"));
    }

    // Without a password the integrity check is skipped, as for trust-only use
    if let Some(password) = password {
        let password = utf16_be(password);
        let mut hasher = Sha1::new();
        hasher.update(password.as_slice());
        hasher.update(INTEGRITY_SALT);
        hasher.update(&bytes[..body_len]);
        if hasher.finalize().as_slice() != stored_digest {
            return Err(DecodeError::password(
                "keystore was tampered with, or password was incorrect",
            ));
        }
    }

    Ok(entries)
}

/// Unwrap a Sun-protected private key into PKCS#8
pub(super) fn recover_key(
    alias: &str,
    protected: &[u8],
    password: &str,
) -> Result<PrivateKeyDer<'static>, DecodeError> {
    let info = EncryptedPrivateKeyInfo::from_der(protected).map_err(|e| {
        DecodeError::with_source(
            FailureCause::FormatMismatch,
            format!("protected key '{}' is malformed", alias),
            e,
        )
    })?;
    if info.encryption_algorithm.oid != KEY_PROTECTOR_OID {
        return Err(DecodeError::new(
            FailureCause::AlgorithmUnavailable,
            format!(
                "key '{}' uses an unsupported protection algorithm ({})",
                alias, info.encryption_algorithm.oid
            ),
        ));
    }
    let data = info.encrypted_data.as_bytes();
    if data.len() < 2 * DIGEST_LEN {
        return Err(DecodeError::format(format!(
            "protected key '{}' is too short",
            alias
        )));
    }

    let (salt, rest) = data.split_at(DIGEST_LEN);
    let (ciphertext, check) = rest.split_at(rest.len() - DIGEST_LEN);
    let password = utf16_be(password);

    let mut plaintext = Zeroizing::new(Vec::with_capacity(ciphertext.len()));
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(salt);
    for chunk in ciphertext.chunks(DIGEST_LEN) {
        let mut hasher = Sha1::new();
        hasher.update(password.as_slice());
        hasher.update(digest);
        digest.copy_from_slice(&hasher.finalize());
        plaintext.extend(chunk.iter().zip(digest.iter()).map(|(c, k)| c ^ k));
    }

    let mut hasher = Sha1::new();
    hasher.update(password.as_slice());
    hasher.update(plaintext.as_slice());
    if hasher.finalize().as_slice() != check {
        return Err(DecodeError::password(format!(
            "cannot recover key '{}': password was incorrect",
            alias
        )));
    }

    Ok(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(plaintext.to_vec())))
}

fn utf16_be(password: &str) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(
        password
            .encode_utf16()
            .flat_map(|unit| unit.to_be_bytes())
            .collect(),
    )
}

/// Big-endian cursor over the JKS body
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn is_empty(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| DecodeError::format("invalid keystore format (truncated)"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, DecodeError> {
        let hi = u64::from(self.u32()?);
        let lo = u64::from(self.u32()?);
        Ok((hi << 32) | lo)
    }

    /// Length-prefixed modified UTF-8 string
    fn utf(&mut self) -> Result<String, DecodeError> {
        let len = usize::from(self.u16()?);
        Ok(String::from_utf8_lossy(self.take(len)?).into_owned())
    }

    /// u32-length-prefixed byte block
    fn block(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.u32()? as usize;
        self.take(len)
    }

    fn certificate(&mut self, version: u32) -> Result<CertificateDer<'static>, DecodeError> {
        if version == 2 {
            let cert_type = self.utf()?;
            if cert_type != "X.509" {
                return Err(DecodeError::new(
                    FailureCause::AlgorithmUnavailable,
                    format!("unsupported certificate type '{}'", cert_type),
                ));
            }
        }
        Ok(CertificateDer::from(self.block()?.to_vec()))
    }
}
