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
//! Context assembly
//!
//! [`build_context`] runs the key loader, the trust loader and the insecure
//! override, then turns whatever is present into a rustls [`ClientConfig`].
//! When neither key nor trust material results, no context is built and the
//! caller keeps its ambient TLS defaults.

use crate::error::{ContextInitError, ContextResult};
use crate::insecure::InsecureTrust;
use crate::keys::{load_credentials, CredentialSet};
use crate::store::StoreSpec;
use crate::trust::{load_trust, TrustDecision, TrustDecisionSet};
use rustls::client::danger::ServerCertVerifier;
use rustls::client::ResolvesClientCert;
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore};
use std::fmt;
use std::sync::Arc;
use tracing::{debug_span, info, warn};

/// An assembled client TLS context
///
/// Hand [`TransportContext::config`] to the connector that opens the
/// socket. Each context owns its own copy of the loaded material.
#[derive(Debug, Clone)]
pub struct TransportContext {
    config: Arc<ClientConfig>,
    credentials: Option<Arc<CredentialSet>>,
    trust: Option<Arc<TrustDecisionSet>>,
    insecure: bool,
}

impl TransportContext {
    /// rustls configuration for client connections
    pub fn config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config)
    }

    /// Client identities, absent for trust-only contexts
    pub fn credentials(&self) -> Option<&CredentialSet> {
        self.credentials.as_deref()
    }

    /// Trust decisions, absent when the bundled web roots are used
    pub fn trust(&self) -> Option<&TrustDecisionSet> {
        self.trust.as_deref()
    }

    /// Whether peer certificate verification is disabled
    pub fn insecure(&self) -> bool {
        self.insecure
    }

    /// Short description of what the context holds
    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            identities: self
                .credentials()
                .map(|c| c.identities().iter().map(|id| id.alias().to_string()).collect())
                .unwrap_or_default(),
            anchors: self.trust().map(TrustDecisionSet::anchor_count).unwrap_or_default(),
            ambient_roots: self.trust.is_none(),
            insecure: self.insecure,
        }
    }
}

/// Diagnostic view of a [`TransportContext`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSummary {
    /// Aliases of the client identities
    pub identities: Vec<String>,
    /// Trust anchors loaded from the trust store
    pub anchors: usize,
    /// Whether the bundled web roots are trusted instead of a trust store
    pub ambient_roots: bool,
    /// Whether any server certificate is accepted
    pub insecure: bool,
}

impl fmt::Display for ContextSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} client identities", self.identities.len())?;
        if self.ambient_roots {
            write!(f, ", bundled web roots")?;
        } else {
            write!(f, ", {} trust anchors", self.anchors)?;
        }
        if self.insecure {
            write!(f, ", certificate verification disabled")?;
        }
        Ok(())
    }
}

/// Build a client TLS context with the `ring` crypto provider
///
/// Returns `Ok(None)` when neither store is configured and `insecure` is
/// false. Setting `insecure` accepts every server certificate, see
/// [`InsecureTrust`].
///
/// # Errors
///
/// Every failure is reported as a [`crate::ConfigurationError`]; its
/// [`cause`](crate::ConfigurationError::cause) tells missing files, wrong
/// formats, wrong passwords, missing algorithms and provider failures apart.
///
/// # Examples
///
/// ```
/// use storetls_context::{build_context, StoreSpec};
///
/// let ctx = build_context(&StoreSpec::none(), &StoreSpec::none(), false).unwrap();
/// assert!(ctx.is_none());
///
/// let ctx = build_context(&StoreSpec::none(), &StoreSpec::none(), true).unwrap();
/// assert!(ctx.unwrap().insecure());
/// ```
pub fn build_context(
    key_store: &StoreSpec,
    trust_store: &StoreSpec,
    insecure: bool,
) -> ContextResult<Option<TransportContext>> {
    build_context_with_provider(
        key_store,
        trust_store,
        insecure,
        Arc::new(rustls::crypto::ring::default_provider()),
    )
}

/// Build a client TLS context with an explicit crypto provider
pub fn build_context_with_provider(
    key_store: &StoreSpec,
    trust_store: &StoreSpec,
    insecure: bool,
    provider: Arc<CryptoProvider>,
) -> ContextResult<Option<TransportContext>> {
    let span = debug_span!(
        "build_context",
        key_store = key_store.is_configured(),
        trust_store = trust_store.is_configured(),
        insecure
    );
    let _enter = span.enter();

    let credentials = load_credentials(key_store, &provider)?.into_present();

    let mut trust = load_trust(trust_store, &provider)?;
    if insecure {
        warn!("TLS certificate verification is disabled; any server certificate will be accepted");
        trust.push(TrustDecision::AcceptAny(InsecureTrust::new(&provider)));
    }
    let trust = trust.into_present();

    if credentials.is_none() && trust.is_none() {
        return Ok(None);
    }

    let context = assemble(
        credentials.map(Arc::new),
        trust.map(Arc::new),
        insecure,
        provider,
    )?;

    info!(summary = %context.summary(), "Built TLS context");
    Ok(Some(context))
}

fn assemble(
    credentials: Option<Arc<CredentialSet>>,
    trust: Option<Arc<TrustDecisionSet>>,
    insecure: bool,
    provider: Arc<CryptoProvider>,
) -> Result<TransportContext, ContextInitError> {
    let mut probe = [0u8; 32];
    provider.secure_random.fill(&mut probe).map_err(|e| {
        ContextInitError::new("secure random source is unavailable", rustls::Error::from(e))
    })?;

    let builder = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ContextInitError::new("crypto provider supports no safe protocol version", e))?;

    let builder = match &trust {
        Some(trust) => {
            let verifier: Arc<dyn ServerCertVerifier> = Arc::<TrustDecisionSet>::clone(trust);
            builder.dangerous().with_custom_certificate_verifier(verifier)
        }
        None => builder.with_root_certificates(ambient_roots()),
    };

    let config = match &credentials {
        Some(credentials) => {
            let resolver: Arc<dyn ResolvesClientCert> = Arc::<CredentialSet>::clone(credentials);
            builder.with_client_cert_resolver(resolver)
        }
        None => builder.with_no_client_auth(),
    };

    Ok(TransportContext {
        config: Arc::new(config),
        credentials,
        trust,
        insecure,
    })
}

fn ambient_roots() -> RootCertStore {
    RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_configured_is_no_context() {
        let ctx = build_context(&StoreSpec::none(), &StoreSpec::none(), false).unwrap();
        assert!(ctx.is_none());
    }

    #[test]
    fn test_insecure_alone_builds_context() {
        let ctx = build_context(&StoreSpec::none(), &StoreSpec::none(), true)
            .unwrap()
            .unwrap();
        assert!(ctx.insecure());
        assert!(ctx.credentials().is_none());

        let trust = ctx.trust().unwrap();
        assert_eq!(trust.len(), 1);
        assert!(trust.is_insecure());

        let summary = ctx.summary();
        assert!(summary.identities.is_empty());
        assert!(!summary.ambient_roots);
        assert!(summary.to_string().contains("verification disabled"));
    }

    #[test]
    fn test_ambient_roots_not_empty() {
        assert!(!ambient_roots().is_empty());
    }
}
