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
//! Key material: client identities loaded from a key store
//!
//! Every private-key entry of the store becomes one [`ClientIdentity`].
//! The resulting [`CredentialSet`] is installed in the context as its
//! client-certificate resolver.

use crate::error::{DecodeError, FailureCause, StoreLoadError, StoreRole};
use crate::store::{open_store, PrivateKeyEntry, StoreSpec};
use rustls::client::ResolvesClientCert;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::CertificateDer;
use rustls::sign::CertifiedKey;
use rustls::SignatureScheme;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A private key with its certificate chain, ready to sign handshakes
#[derive(Clone)]
pub struct ClientIdentity {
    alias: String,
    certified_key: Arc<CertifiedKey>,
    /// DER issuer names of every certificate in the chain
    issuers: Vec<Vec<u8>>,
}

impl ClientIdentity {
    /// Turn a decoded private-key entry into a signing identity
    pub fn from_entry(
        entry: &PrivateKeyEntry,
        password: Option<&str>,
        provider: &CryptoProvider,
    ) -> Result<Self, DecodeError> {
        if entry.chain.is_empty() {
            return Err(DecodeError::format(format!(
                "private key '{}' has no certificate chain",
                entry.alias
            )));
        }

        let key = entry.unlock(password)?;
        let signing_key = provider.key_provider.load_private_key(key).map_err(|e| {
            DecodeError::with_source(
                FailureCause::AlgorithmUnavailable,
                format!("no signing algorithm available for key '{}'", entry.alias),
                e,
            )
        })?;

        let issuers = entry
            .chain
            .iter()
            .map(|cert| issuer_name(&entry.alias, cert))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            alias: entry.alias.clone(),
            certified_key: Arc::new(CertifiedKey::new(entry.chain.clone(), signing_key)),
            issuers,
        })
    }

    /// Alias of the store entry
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Certificate chain presented to the peer, leaf first
    pub fn chain(&self) -> &[CertificateDer<'static>] {
        &self.certified_key.cert
    }

    /// Key and chain as used by rustls
    pub fn certified_key(&self) -> Arc<CertifiedKey> {
        Arc::clone(&self.certified_key)
    }

    fn signs_with(&self, schemes: &[SignatureScheme]) -> bool {
        self.certified_key.key.choose_scheme(schemes).is_some()
    }

    fn issued_by_any(&self, hints: &[&[u8]]) -> bool {
        self.issuers
            .iter()
            .any(|issuer| hints.iter().any(|hint| issuer.as_slice() == *hint))
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("alias", &self.alias)
            .field("chain_len", &self.chain().len())
            .finish()
    }
}

fn issuer_name(alias: &str, cert: &CertificateDer<'_>) -> Result<Vec<u8>, DecodeError> {
    let (_, parsed) = x509_parser::parse_x509_certificate(cert.as_ref()).map_err(|e| {
        DecodeError::with_source(
            FailureCause::FormatMismatch,
            format!("certificate chain of '{}' is malformed", alias),
            e.to_string(),
        )
    })?;
    Ok(parsed.issuer().as_raw().to_vec())
}

/// Ordered client identities from one key store
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    identities: Vec<ClientIdentity>,
}

impl CredentialSet {
    /// Wrap a list of identities
    pub fn new(identities: Vec<ClientIdentity>) -> Self {
        Self { identities }
    }

    /// Identities in store order
    pub fn identities(&self) -> &[ClientIdentity] {
        &self.identities
    }

    /// Number of identities
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether no identity was loaded
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// `None` when empty
    pub fn into_present(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }

    /// Pick the identity to present for a certificate request
    ///
    /// The identity must be able to sign with one of the offered schemes.
    /// Among those, one issued by a CA the peer hinted is preferred; when
    /// none matches the hints the first signing-capable identity is used.
    pub fn select(
        &self,
        root_hint_subjects: &[&[u8]],
        sigschemes: &[SignatureScheme],
    ) -> Option<&ClientIdentity> {
        let mut capable = self.identities.iter().filter(|id| id.signs_with(sigschemes));
        let first = capable.clone().next()?;
        if root_hint_subjects.is_empty() {
            return Some(first);
        }
        Some(
            capable
                .find(|id| id.issued_by_any(root_hint_subjects))
                .unwrap_or(first),
        )
    }
}

impl ResolvesClientCert for CredentialSet {
    fn resolve(
        &self,
        root_hint_subjects: &[&[u8]],
        sigschemes: &[SignatureScheme],
    ) -> Option<Arc<CertifiedKey>> {
        let identity = self.select(root_hint_subjects, sigschemes);
        match identity {
            Some(identity) => debug!(alias = %identity.alias, "Presenting client certificate"),
            None => debug!("No client identity matches the certificate request"),
        }
        identity.map(ClientIdentity::certified_key)
    }

    fn has_certs(&self) -> bool {
        !self.is_empty()
    }
}

/// Load the client identities of a key store
///
/// An unconfigured store yields an empty set without any file access.
/// Private keys are unlocked with the same password as the container.
pub fn load_credentials(
    spec: &StoreSpec,
    provider: &CryptoProvider,
) -> Result<CredentialSet, StoreLoadError> {
    let Some(path) = spec.path.as_deref() else {
        return Ok(CredentialSet::default());
    };
    let Some(store) = open_store(spec, StoreRole::KeyStore)? else {
        return Ok(CredentialSet::default());
    };

    let identities = store
        .private_keys()
        .map(|entry| ClientIdentity::from_entry(entry, spec.password_str(), provider))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreLoadError::new(StoreRole::KeyStore, path, e))?;

    debug!(
        path = %path.display(),
        identities = identities.len(),
        "Loaded key material"
    );
    Ok(CredentialSet::new(identities))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_key_store_is_empty() {
        let provider = rustls::crypto::ring::default_provider();
        let set = load_credentials(&StoreSpec::none().with_type("invalid"), &provider).unwrap();
        assert!(set.is_empty());
        assert!(!set.has_certs());
        assert!(set.into_present().is_none());
    }

    #[test]
    fn test_empty_set_resolves_nothing() {
        let set = CredentialSet::default();
        assert!(set
            .resolve(&[], &[SignatureScheme::RSA_PSS_SHA256])
            .is_none());
    }
}
