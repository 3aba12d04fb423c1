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
//! Key store and trust store containers
//!
//! Describes where a store lives ([`StoreSpec`]), which container format it
//! uses ([`StoreType`]), and decodes it into a flat list of entries.
//!
//! # Supported formats
//! - PKCS#12 (default when no type is declared)
//! - JKS (the legacy Java key store, including Sun-protected private keys)
//! - PEM bundles of certificates and at most one private key

mod jks;
mod pem;
mod pkcs12;

use crate::error::{DecodeError, FailureCause, StoreLoadError, StoreRole};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

/// Location, format and password of one store
///
/// An absent `path` means the store is not configured; `store_type` and
/// `password` are then ignored and nothing is read from disk.
#[derive(Debug, Clone, Default)]
pub struct StoreSpec {
    /// Store file
    pub path: Option<PathBuf>,

    /// Container format identifier, e.g. `PKCS12` or `JKS`
    pub store_type: Option<String>,

    /// Password unlocking the container and its private keys
    pub password: Option<SecretString>,
}

impl StoreSpec {
    /// A store that is not configured
    pub fn none() -> Self {
        Self::default()
    }

    /// A store read from `path` in the default format, without password
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Declare the container format
    pub fn with_type(mut self, store_type: impl Into<String>) -> Self {
        self.store_type = Some(store_type.into());
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password.into()));
        self
    }

    /// Whether a store file is configured
    pub fn is_configured(&self) -> bool {
        self.path.is_some()
    }

    pub(crate) fn password_str(&self) -> Option<&str> {
        self.password.as_ref().map(|p| p.expose_secret().as_str())
    }
}

/// Container formats understood by the loaders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreType {
    /// PKCS#12 / PFX
    #[default]
    Pkcs12,

    /// Java key store
    Jks,

    /// PEM certificates and key
    Pem,
}

impl StoreType {
    /// Canonical identifier
    pub fn name(&self) -> &'static str {
        match self {
            StoreType::Pkcs12 => "PKCS12",
            StoreType::Jks => "JKS",
            StoreType::Pem => "PEM",
        }
    }

    /// Resolve a declared identifier, falling back to the default format
    pub fn resolve(declared: Option<&str>) -> Result<Self, UnsupportedStoreType> {
        declared.map_or(Ok(StoreType::default()), str::parse)
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared store type no decoder recognises
#[derive(Debug, Error)]
#[error("unsupported store type '{0}' (expected PKCS12, JKS or PEM)")]
pub struct UnsupportedStoreType(pub String);

impl FromStr for StoreType {
    type Err = UnsupportedStoreType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PKCS12" | "PKCS#12" | "P12" | "PFX" => Ok(StoreType::Pkcs12),
            "JKS" => Ok(StoreType::Jks),
            "PEM" => Ok(StoreType::Pem),
            _ => Err(UnsupportedStoreType(s.to_string())),
        }
    }
}

/// Private key material as held by the container
enum KeyMaterial {
    /// Already decrypted while decoding the container
    Plain(PrivateKeyDer<'static>),

    /// Encrypted with the JKS key protector, unlocked on demand
    JksProtected(Vec<u8>),
}

/// A private key and the certificate chain that goes with it
pub struct PrivateKeyEntry {
    /// Entry alias
    pub alias: String,

    /// Certificate chain, leaf first
    pub chain: Vec<CertificateDer<'static>>,

    key: KeyMaterial,
}

impl PrivateKeyEntry {
    pub(crate) fn plain(
        alias: String,
        key: PrivateKeyDer<'static>,
        chain: Vec<CertificateDer<'static>>,
    ) -> Self {
        Self {
            alias,
            chain,
            key: KeyMaterial::Plain(key),
        }
    }

    pub(crate) fn jks_protected(
        alias: String,
        protected: Vec<u8>,
        chain: Vec<CertificateDer<'static>>,
    ) -> Self {
        Self {
            alias,
            chain,
            key: KeyMaterial::JksProtected(protected),
        }
    }

    /// Leaf certificate of the chain
    pub fn leaf(&self) -> Option<&CertificateDer<'static>> {
        self.chain.first()
    }

    /// Whether the key still needs the password to be recovered
    pub fn is_protected(&self) -> bool {
        matches!(self.key, KeyMaterial::JksProtected(_))
    }

    /// Recover the private key, using the store password where needed
    pub(crate) fn unlock(&self, password: Option<&str>) -> Result<PrivateKeyDer<'static>, DecodeError> {
        match &self.key {
            KeyMaterial::Plain(key) => Ok(key.clone_key()),
            KeyMaterial::JksProtected(protected) => {
                jks::recover_key(&self.alias, protected, password.unwrap_or_default())
            }
        }
    }
}

impl fmt::Debug for PrivateKeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyEntry")
            .field("alias", &self.alias)
            .field("chain_len", &self.chain.len())
            .field("protected", &self.is_protected())
            .finish()
    }
}

/// One entry of a decoded store
#[derive(Debug)]
pub enum StoreEntry {
    /// Private key with its chain
    PrivateKey(PrivateKeyEntry),

    /// Certificate trusted on its own
    TrustedCertificate {
        /// Entry alias
        alias: String,
        /// DER certificate
        certificate: CertificateDer<'static>,
    },
}

impl StoreEntry {
    /// Entry alias
    pub fn alias(&self) -> &str {
        match self {
            StoreEntry::PrivateKey(entry) => &entry.alias,
            StoreEntry::TrustedCertificate { alias, .. } => alias,
        }
    }
}

/// Decoded contents of a store file
#[derive(Debug)]
pub struct LoadedStore {
    /// Format the file was decoded as
    pub store_type: StoreType,

    /// Entries in container order
    pub entries: Vec<StoreEntry>,
}

impl LoadedStore {
    /// Private-key entries
    pub fn private_keys(&self) -> impl Iterator<Item = &PrivateKeyEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            StoreEntry::PrivateKey(key) => Some(key),
            StoreEntry::TrustedCertificate { .. } => None,
        })
    }

    /// Trusted-certificate entries
    pub fn trusted_certificates(&self) -> impl Iterator<Item = (&str, &CertificateDer<'static>)> {
        self.entries.iter().filter_map(|entry| match entry {
            StoreEntry::TrustedCertificate { alias, certificate } => {
                Some((alias.as_str(), certificate))
            }
            StoreEntry::PrivateKey(_) => None,
        })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read and decode the store described by `spec`
///
/// Returns `Ok(None)` without touching the filesystem when no path is set.
/// The file is read completely and its handle released before decoding.
pub fn open_store(spec: &StoreSpec, role: StoreRole) -> Result<Option<LoadedStore>, StoreLoadError> {
    let Some(path) = spec.path.as_deref() else {
        return Ok(None);
    };

    let bytes = read_store_file(path).map_err(|e| StoreLoadError::new(role, path, e))?;

    let store_type = StoreType::resolve(spec.store_type.as_deref()).map_err(|e| {
        StoreLoadError::new(
            role,
            path,
            DecodeError::with_source(FailureCause::FormatMismatch, e.to_string(), e),
        )
    })?;

    let entries = decode(&bytes, store_type, spec.password_str())
        .map_err(|e| StoreLoadError::new(role, path, e))?;

    debug!(
        path = %path.display(),
        store_type = %store_type,
        entries = entries.len(),
        "Opened {}",
        role
    );

    Ok(Some(LoadedStore {
        store_type,
        entries,
    }))
}

/// Decode store bytes in the given format
pub fn decode(
    bytes: &[u8],
    store_type: StoreType,
    password: Option<&str>,
) -> Result<Vec<StoreEntry>, DecodeError> {
    match store_type {
        StoreType::Pkcs12 => pkcs12::decode(bytes, password),
        StoreType::Jks => jks::decode(bytes, password),
        StoreType::Pem => pem::decode(bytes),
    }
}

fn read_store_file(path: &Path) -> Result<Zeroizing<Vec<u8>>, DecodeError> {
    std::fs::read(path).map(Zeroizing::new).map_err(|e| {
        DecodeError::with_source(
            FailureCause::NotFound,
            format!("cannot read store file: {}", e),
            e,
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_type_parsing() {
        assert_eq!("PKCS12".parse::<StoreType>().unwrap(), StoreType::Pkcs12);
        assert_eq!("pkcs12".parse::<StoreType>().unwrap(), StoreType::Pkcs12);
        assert_eq!("p12".parse::<StoreType>().unwrap(), StoreType::Pkcs12);
        assert_eq!("jks".parse::<StoreType>().unwrap(), StoreType::Jks);
        assert_eq!("PEM".parse::<StoreType>().unwrap(), StoreType::Pem);
        assert!("invalid".parse::<StoreType>().is_err());
    }

    #[test]
    fn test_default_store_type() {
        assert_eq!(StoreType::resolve(None).unwrap(), StoreType::Pkcs12);
        assert_eq!(StoreType::resolve(Some("JKS")).unwrap(), StoreType::Jks);
    }

    #[test]
    fn test_unconfigured_store_reads_nothing() {
        // Type and password are irrelevant without a path
        let spec = StoreSpec {
            path: None,
            store_type: Some("invalid".to_string()),
            password: Some(SecretString::new("invalid".to_string())),
        };
        assert!(open_store(&spec, StoreRole::KeyStore).unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let spec = StoreSpec::new("/no/such/file").with_type("JKS");
        let err = open_store(&spec, StoreRole::TrustStore).unwrap_err();
        assert_eq!(err.cause(), FailureCause::NotFound);
        assert_eq!(err.role(), StoreRole::TrustStore);
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let spec = StoreSpec::new("store.p12").with_password("hunter2");
        assert!(!format!("{:?}", spec).contains("hunter2"));
    }
}
