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
use crate::error::{ConfigError, ConfigResult};
use crate::schema::{Config, ObservabilitySettings, TlsSettings};
use std::path::Path;
use tracing::warn;

/// Validator for configuration settings
pub trait Validator {
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.tls.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Validator for TlsSettings {
    fn validate(&self) -> ConfigResult<()> {
        validate_store(
            "key_store",
            self.key_store.as_deref(),
            self.key_store_type.as_deref(),
            self.key_store_password.is_some(),
        )?;
        validate_store(
            "trust_store",
            self.trust_store.as_deref(),
            self.trust_store_type.as_deref(),
            self.trust_store_password.is_some(),
        )?;

        if self.tls_insecure {
            warn!("tls.tls_insecure is set; server certificates will not be verified");
        }

        Ok(())
    }
}

// Store types are checked when the context is built, not here
fn validate_store(
    name: &str,
    path: Option<&Path>,
    store_type: Option<&str>,
    has_password: bool,
) -> ConfigResult<()> {
    if path.is_some_and(|p| p.as_os_str().is_empty()) {
        return Err(ConfigError::invalid_value(
            format!("tls.{}", name),
            "path must not be empty",
        ));
    }

    if store_type.is_some_and(|t| t.trim().is_empty()) {
        return Err(ConfigError::invalid_value(
            format!("tls.{}_type", name),
            "store type must not be empty",
        ));
    }

    if path.is_none() && (store_type.is_some() || has_password) {
        warn!(
            "tls.{}_type or tls.{}_password is set without tls.{}; they are ignored",
            name, name, name
        );
    }

    Ok(())
}

impl Validator for ObservabilitySettings {
    fn validate(&self) -> ConfigResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}
