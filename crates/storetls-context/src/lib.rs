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
//! Client TLS contexts built from key store and trust store files
//!
//! This crate turns a key store (client identity), a trust store (accepted
//! server CAs) and an explicit "trust any certificate" flag into a rustls
//! [`rustls::ClientConfig`].
//!
//! # Features
//!
//! - PKCS#12, JKS and PEM containers, with password checks on each
//! - No context at all when nothing is configured, so callers keep their defaults
//! - A single [`ConfigurationError`] with a closed [`FailureCause`] for every failure
//! - An opt-in [`InsecureTrust`] override for test and lab environments
//!
//! # Example
//!
//! ```no_run
//! use storetls_context::{build_context, StoreSpec};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key_store = StoreSpec::new("keystore.p12")
//!         .with_type("PKCS12")
//!         .with_password("password");
//!     let trust_store = StoreSpec::new("truststore.jks")
//!         .with_type("JKS")
//!         .with_password("password");
//!
//!     if let Some(ctx) = build_context(&key_store, &trust_store, false)? {
//!         println!("TLS context: {}", ctx.summary());
//!     }
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod error;
pub mod insecure;
pub mod keys;
pub mod store;
pub mod trust;

// Re-export commonly used items
pub use context::{build_context, build_context_with_provider, ContextSummary, TransportContext};
pub use error::{
    ConfigurationError, ContextInitError, ContextResult, DecodeError, FailureCause,
    StoreLoadError, StoreRole,
};
pub use insecure::InsecureTrust;
pub use keys::{load_credentials, ClientIdentity, CredentialSet};
pub use store::{open_store, LoadedStore, StoreEntry, StoreSpec, StoreType};
pub use trust::{load_trust, StoreTrust, TrustDecision, TrustDecisionSet};
