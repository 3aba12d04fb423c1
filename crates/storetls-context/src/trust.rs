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
//! Trust material: decisions on whether a server certificate chain is accepted
//!
//! A trust store contributes one [`TrustDecision::Anchors`]; the insecure
//! override contributes [`TrustDecision::AcceptAny`]. The ordered
//! [`TrustDecisionSet`] is what the context installs as its server
//! certificate verifier.

use crate::error::{DecodeError, FailureCause, StoreLoadError, StoreRole};
use crate::insecure::InsecureTrust;
use crate::store::{open_store, LoadedStore, StoreSpec};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider, WebPkiSupportedAlgorithms};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, Error as TlsError, RootCertStore, SignatureScheme};
use std::sync::Arc;
use tracing::{debug, warn};

/// Anchors taken from one trust store
#[derive(Debug, Clone)]
pub struct StoreTrust {
    anchors: Arc<RootCertStore>,
    /// Absent when the store holds no anchors; every chain is then rejected
    verifier: Option<Arc<WebPkiServerVerifier>>,
}

impl StoreTrust {
    /// Build the chain validator for a set of anchors
    pub fn new(anchors: RootCertStore, provider: &Arc<CryptoProvider>) -> Result<Self, DecodeError> {
        let anchors = Arc::new(anchors);
        if anchors.is_empty() {
            return Ok(Self {
                anchors,
                verifier: None,
            });
        }

        let verifier = WebPkiServerVerifier::builder_with_provider(
            Arc::clone(&anchors),
            Arc::clone(provider),
        )
        .build()
        .map_err(|e| {
            DecodeError::with_source(
                FailureCause::AlgorithmUnavailable,
                "cannot build certificate validator for the trust anchors",
                e,
            )
        })?;

        Ok(Self {
            anchors,
            verifier: Some(verifier),
        })
    }

    /// Trust anchors
    pub fn anchors(&self) -> &RootCertStore {
        &self.anchors
    }

    /// Number of trust anchors
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    fn verify(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        match &self.verifier {
            Some(verifier) => {
                verifier.verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
            }
            None => Err(TlsError::InvalidCertificate(CertificateError::UnknownIssuer)),
        }
    }
}

/// One source of trust
#[derive(Debug, Clone)]
pub enum TrustDecision {
    /// Chains must lead to one of the store's anchors
    Anchors(StoreTrust),

    /// Every chain is accepted
    AcceptAny(InsecureTrust),
}

impl TrustDecision {
    fn verify(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        match self {
            TrustDecision::Anchors(trust) => {
                trust.verify(end_entity, intermediates, server_name, ocsp_response, now)
            }
            TrustDecision::AcceptAny(trust) => {
                trust.verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
            }
        }
    }
}

/// Ordered trust decisions acting as one server certificate verifier
///
/// A chain is accepted as soon as one decision accepts it. When all of
/// them reject it the error of the first decision is reported.
#[derive(Debug, Clone)]
pub struct TrustDecisionSet {
    decisions: Vec<TrustDecision>,
    algorithms: WebPkiSupportedAlgorithms,
}

impl TrustDecisionSet {
    /// An empty set verifying handshake signatures with the provider's algorithms
    pub fn new(provider: &CryptoProvider) -> Self {
        Self {
            decisions: Vec::new(),
            algorithms: provider.signature_verification_algorithms,
        }
    }

    /// Append a decision
    pub fn push(&mut self, decision: TrustDecision) {
        self.decisions.push(decision);
    }

    /// Decisions in evaluation order
    pub fn decisions(&self) -> &[TrustDecision] {
        &self.decisions
    }

    /// Number of decisions
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    /// Whether the set holds no decision
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// `None` when empty
    pub fn into_present(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }

    /// Total anchors across all store decisions
    pub fn anchor_count(&self) -> usize {
        self.decisions
            .iter()
            .map(|decision| match decision {
                TrustDecision::Anchors(trust) => trust.anchor_count(),
                TrustDecision::AcceptAny(_) => 0,
            })
            .sum()
    }

    /// Whether an accept-any decision is part of the set
    pub fn is_insecure(&self) -> bool {
        self.decisions
            .iter()
            .any(|decision| matches!(decision, TrustDecision::AcceptAny(_)))
    }
}

impl ServerCertVerifier for TrustDecisionSet {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        let mut first_error = None;
        for decision in &self.decisions {
            match decision.verify(end_entity, intermediates, server_name, ocsp_response, now) {
                Ok(verified) => return Ok(verified),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        Err(first_error.unwrap_or(TlsError::InvalidCertificate(CertificateError::UnknownIssuer)))
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

/// Collect the trust anchors of a decoded store
///
/// Trusted-certificate entries and the leaf of every private-key entry
/// are anchors.
pub fn collect_anchors(store: &LoadedStore) -> Result<RootCertStore, DecodeError> {
    let mut anchors = RootCertStore::empty();

    let trusted = store.trusted_certificates();
    let leaves = store
        .private_keys()
        .filter_map(|entry| entry.leaf().map(|leaf| (entry.alias.as_str(), leaf)));

    for (alias, cert) in trusted.chain(leaves) {
        anchors.add(cert.clone()).map_err(|e| {
            DecodeError::with_source(
                FailureCause::FormatMismatch,
                format!("certificate '{}' is not a usable trust anchor", alias),
                e,
            )
        })?;
    }

    Ok(anchors)
}

/// Load the trust decisions of a trust store
///
/// An unconfigured store yields an empty set without any file access.
pub fn load_trust(
    spec: &StoreSpec,
    provider: &Arc<CryptoProvider>,
) -> Result<TrustDecisionSet, StoreLoadError> {
    let mut set = TrustDecisionSet::new(provider);
    let Some(path) = spec.path.as_deref() else {
        return Ok(set);
    };
    let Some(store) = open_store(spec, StoreRole::TrustStore)? else {
        return Ok(set);
    };

    let trust = collect_anchors(&store)
        .and_then(|anchors| StoreTrust::new(anchors, provider))
        .map_err(|e| StoreLoadError::new(StoreRole::TrustStore, path, e))?;

    if trust.anchor_count() == 0 {
        warn!(
            path = %path.display(),
            "Trust store holds no certificates; every server certificate will be rejected"
        );
    }
    debug!(
        path = %path.display(),
        anchors = trust.anchor_count(),
        "Loaded trust material"
    );

    set.push(TrustDecision::Anchors(trust));
    Ok(set)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rustls::crypto::ring::default_provider;

    fn name() -> ServerName<'static> {
        ServerName::try_from("localhost").unwrap()
    }

    fn garbage() -> CertificateDer<'static> {
        CertificateDer::from(vec![0x30, 0x03, 0x02, 0x01, 0x00])
    }

    #[test]
    fn test_unconfigured_trust_store_is_empty() {
        let provider = Arc::new(default_provider());
        let set = load_trust(&StoreSpec::none().with_password("invalid"), &provider).unwrap();
        assert!(set.is_empty());
        assert!(set.into_present().is_none());
    }

    #[test]
    fn test_empty_anchors_reject_everything() {
        let provider = Arc::new(default_provider());
        let trust = StoreTrust::new(RootCertStore::empty(), &provider).unwrap();
        let mut set = TrustDecisionSet::new(&provider);
        set.push(TrustDecision::Anchors(trust));

        let err = set
            .verify_server_cert(&garbage(), &[], &name(), &[], UnixTime::now())
            .unwrap_err();
        assert_eq!(
            err,
            TlsError::InvalidCertificate(CertificateError::UnknownIssuer)
        );
    }

    #[test]
    fn test_any_accepting_decision_wins() {
        let provider = Arc::new(default_provider());
        let trust = StoreTrust::new(RootCertStore::empty(), &provider).unwrap();
        let mut set = TrustDecisionSet::new(&provider);
        set.push(TrustDecision::Anchors(trust));
        set.push(TrustDecision::AcceptAny(InsecureTrust::new(&provider)));

        assert!(set.is_insecure());
        assert_eq!(set.anchor_count(), 0);
        assert!(set
            .verify_server_cert(&garbage(), &[], &name(), &[], UnixTime::now())
            .is_ok());
    }

    #[test]
    fn test_empty_set_rejects() {
        let set = TrustDecisionSet::new(&default_provider());
        assert!(set
            .verify_server_cert(&garbage(), &[], &name(), &[], UnixTime::now())
            .is_err());
    }
}
