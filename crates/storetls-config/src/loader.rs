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
//! Reading settings files and applying `STORETLS_*` overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::schema::Config;
use crate::validation::Validator;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Settings file syntax, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` or `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Pick the syntax from the file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return Err(ConfigError::MissingExtension(path.to_path_buf()));
        };
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Ok(ConfigFormat::Toml),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }

    fn parse(self, content: &str) -> ConfigResult<Config> {
        match self {
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::parse(self.name(), e))
            }
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::parse(self.name(), e))
            }
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::parse(self.name(), e))
            }
        }
    }
}

/// Loads [`Config`] from files or strings
///
/// Validation runs after parsing and again after overrides, unless the
/// loader was built with [`ConfigLoader::without_validation`].
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Loader that validates what it reads
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Loader that skips validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Read a settings file
    ///
    /// Relative store paths are resolved against the directory of the file.
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        let read_error = |source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        };

        if !fs::try_exists(path).await.map_err(read_error)? {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await.map_err(read_error)?;
        debug!(path = %path.display(), format = format.name(), "read settings file");

        let mut config = self.load_from_string(&content, format)?;
        if let Some(base) = path.parent() {
            config.tls.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse settings held in memory
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config = format.parse(content)?;
        self.check(&config)?;
        Ok(config)
    }

    /// [`load_file`](Self::load_file) followed by the environment overrides
    pub async fn load_with_overrides<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let mut config = self.load_file(path).await?;
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        self.apply_overrides(config, |name| std::env::var(name).ok())
    }

    /// Apply `STORETLS_*` overrides taken from `lookup`
    pub fn apply_overrides<F>(&self, config: &mut Config, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tls = &mut config.tls;
        override_store(
            &lookup,
            "STORETLS_KEY_STORE",
            &mut tls.key_store,
            &mut tls.key_store_type,
            &mut tls.key_store_password,
        );
        override_store(
            &lookup,
            "STORETLS_TRUST_STORE",
            &mut tls.trust_store,
            &mut tls.trust_store_type,
            &mut tls.trust_store_password,
        );
        if let Some(value) = lookup("STORETLS_TLS_INSECURE") {
            tls.tls_insecure = parse_bool("STORETLS_TLS_INSECURE", &value)?;
        }

        let observability = &mut config.observability;
        if let Some(value) = lookup("STORETLS_LOG_LEVEL") {
            observability.log_level = value;
        }
        if let Some(value) = lookup("STORETLS_LOG_FORMAT") {
            observability.log_format = value;
        }

        self.check(config)
    }

    fn check(&self, config: &Config) -> ConfigResult<()> {
        if self.validate {
            config.validate()?;
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `<prefix>`, `<prefix>_TYPE` and `<prefix>_PASSWORD` for one store
fn override_store<F>(
    lookup: &F,
    prefix: &str,
    path: &mut Option<PathBuf>,
    store_type: &mut Option<String>,
    password: &mut Option<SecretString>,
) where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(prefix) {
        *path = Some(PathBuf::from(value));
    }
    if let Some(value) = lookup(&format!("{}_TYPE", prefix)) {
        *store_type = Some(value);
    }
    if let Some(value) = lookup(&format!("{}_PASSWORD", prefix)) {
        *password = Some(SecretString::new(value));
    }
}

fn parse_bool(variable: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_env_var(
            variable,
            value,
            "expected true/false, yes/no, 1/0 or on/off",
        )),
    }
}
