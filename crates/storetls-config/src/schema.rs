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
use crate::error::ConfigResult;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use storetls_context::{build_context, StoreSpec, TransportContext};

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TLS store settings
    pub tls: TlsSettings,

    /// Observability settings
    pub observability: ObservabilitySettings,
}

/// Key store, trust store and verification settings
///
/// Every field is optional; an empty section means "no TLS customisation".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlsSettings {
    /// Key store file holding the client identity
    pub key_store: Option<PathBuf>,

    /// Key store container format (PKCS12 when unset)
    pub key_store_type: Option<String>,

    /// Key store password, also used for its private keys
    pub key_store_password: Option<SecretString>,

    /// Trust store file holding the accepted CAs
    pub trust_store: Option<PathBuf>,

    /// Trust store container format (PKCS12 when unset)
    pub trust_store_type: Option<String>,

    /// Trust store password
    pub trust_store_password: Option<SecretString>,

    /// Accept any server certificate
    pub tls_insecure: bool,
}

impl TlsSettings {
    /// Key store parameters for the context builder
    pub fn key_store_spec(&self) -> StoreSpec {
        StoreSpec {
            path: self.key_store.clone(),
            store_type: self.key_store_type.clone(),
            password: self.key_store_password.clone(),
        }
    }

    /// Trust store parameters for the context builder
    pub fn trust_store_spec(&self) -> StoreSpec {
        StoreSpec {
            path: self.trust_store.clone(),
            store_type: self.trust_store_type.clone(),
            password: self.trust_store_password.clone(),
        }
    }

    /// Whether any TLS customisation is configured
    pub fn is_configured(&self) -> bool {
        self.key_store.is_some() || self.trust_store.is_some() || self.tls_insecure
    }

    /// Build the client TLS context these settings describe
    pub fn build_context(&self) -> ConfigResult<Option<TransportContext>> {
        Ok(build_context(
            &self.key_store_spec(),
            &self.trust_store_spec(),
            self.tls_insecure,
        )?)
    }

    /// Resolve relative store paths against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.key_store, &mut self.trust_store].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ObservabilitySettings {
    /// Logging level
    pub log_level: String,

    /// Log format (pretty, compact, json)
    pub log_format: String,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        ObservabilitySettings {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
