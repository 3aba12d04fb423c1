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
use std::path::PathBuf;
use storetls_context::ConfigurationError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while loading settings or building the context from them
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file is missing
    #[error("configuration file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// The settings file exists but could not be read
    #[error("cannot read configuration file {}: {source}", .path.display())]
    Read {
        /// File being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid for its format
    #[error("cannot parse {format} configuration: {source}")]
    Parse {
        /// Format name, such as "TOML"
        format: &'static str,
        /// Parser error
        #[source]
        source: BoxError,
    },

    /// The file extension names no known format
    #[error("unsupported configuration extension '.{0}', expected toml, yaml, yml or json")]
    UnsupportedFormat(String),

    /// The file has no extension
    #[error("cannot tell the format of {}: no file extension", .0.display())]
    MissingExtension(PathBuf),

    /// An override variable could not be applied
    #[error("{variable}={value} is not valid: {reason}")]
    InvalidEnvVar {
        /// Variable name
        variable: String,
        /// Value as set in the environment
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A settings value failed validation
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the field
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// Building the TLS context failed
    #[error(transparent)]
    Context(#[from] ConfigurationError),
}

impl ConfigError {
    pub(crate) fn parse(format: &'static str, source: impl Into<BoxError>) -> Self {
        ConfigError::Parse {
            format,
            source: source.into(),
        }
    }

    pub(crate) fn invalid_env_var(variable: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidEnvVar {
            variable: variable.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The TLS configuration error, when building the context failed
    pub fn context_error(&self) -> Option<&ConfigurationError> {
        match self {
            ConfigError::Context(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for settings operations
pub type ConfigResult<T> = Result<T, ConfigError>;
