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
//! Error taxonomy for context construction.
//!
//! Loaders raise [`StoreLoadError`], final initialisation raises
//! [`ContextInitError`], and both are folded into [`ConfigurationError`],
//! the only error that leaves [`crate::build_context`].

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed low-level cause carried through the error chain
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed set of reasons a context could not be built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCause {
    /// Store file missing or unreadable
    NotFound,

    /// Container bytes do not match the declared or default format
    FormatMismatch,

    /// Password wrong for the container or for an entry inside it
    PasswordIncorrect,

    /// No algorithm available to decode the container or use its keys
    AlgorithmUnavailable,

    /// Crypto provider refused to initialise the context
    InitFailed,
}

impl FailureCause {
    /// Short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            FailureCause::NotFound => "file not found",
            FailureCause::FormatMismatch => "invalid store format",
            FailureCause::PasswordIncorrect => "password incorrect",
            FailureCause::AlgorithmUnavailable => "algorithm unavailable",
            FailureCause::InitFailed => "initialisation failed",
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which store a [`StoreLoadError`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRole {
    /// Identity presented to the peer
    KeyStore,

    /// Anchors used to validate the peer
    TrustStore,
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreRole::KeyStore => f.write_str("key store"),
            StoreRole::TrustStore => f.write_str("trust store"),
        }
    }
}

/// Failure while decoding store bytes, before the file it came from is known
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DecodeError {
    cause: FailureCause,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl DecodeError {
    /// Create a decode error without an underlying cause
    pub fn new(cause: FailureCause, message: impl Into<String>) -> Self {
        Self {
            cause,
            message: message.into(),
            source: None,
        }
    }

    /// Create a decode error wrapping a lower-level error
    pub fn with_source(
        cause: FailureCause,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            cause,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::new(FailureCause::FormatMismatch, message)
    }

    pub(crate) fn password(message: impl Into<String>) -> Self {
        Self::new(FailureCause::PasswordIncorrect, message)
    }

    /// Classification of this failure
    pub fn cause(&self) -> FailureCause {
        self.cause
    }
}

/// A key store or trust store could not be loaded
#[derive(Debug, Error)]
#[error("failed to load {role} {}: {}", .path.display(), .inner)]
pub struct StoreLoadError {
    role: StoreRole,
    path: PathBuf,
    #[source]
    inner: DecodeError,
}

impl StoreLoadError {
    /// Attach the store role and file to a decode failure
    pub fn new(role: StoreRole, path: impl AsRef<Path>, inner: DecodeError) -> Self {
        Self {
            role,
            path: path.as_ref().to_path_buf(),
            inner,
        }
    }

    /// Store the failure came from
    pub fn role(&self) -> StoreRole {
        self.role
    }

    /// File that failed to load
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Classification of this failure
    pub fn cause(&self) -> FailureCause {
        self.inner.cause
    }
}

/// The crypto provider rejected the assembled material
#[derive(Debug, Error)]
#[error("failed to initialise TLS context: {message}")]
pub struct ContextInitError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ContextInitError {
    /// Create an initialisation error wrapping a provider error
    pub fn new(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Originating error of a [`ConfigurationError`]
#[derive(Debug, Error)]
pub enum ConfigurationSource {
    /// A store failed to load
    #[error(transparent)]
    Store(#[from] StoreLoadError),

    /// The context failed to initialise
    #[error(transparent)]
    Init(#[from] ContextInitError),
}

/// Fatal, non-retryable TLS configuration problem
///
/// This is the only error returned by [`crate::build_context`]. Callers
/// branch on [`ConfigurationError::cause`]; the original error stays
/// reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("invalid TLS configuration ({cause}): {message}")]
pub struct ConfigurationError {
    cause: FailureCause,
    message: String,
    #[source]
    source: ConfigurationSource,
}

impl ConfigurationError {
    /// Classification of the failure
    pub fn cause(&self) -> FailureCause {
        self.cause
    }

    /// Diagnostic text of the originating error
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The store error, when a loader failed
    pub fn store_error(&self) -> Option<&StoreLoadError> {
        match &self.source {
            ConfigurationSource::Store(err) => Some(err),
            ConfigurationSource::Init(_) => None,
        }
    }
}

impl From<StoreLoadError> for ConfigurationError {
    fn from(err: StoreLoadError) -> Self {
        Self {
            cause: err.cause(),
            message: err.to_string(),
            source: ConfigurationSource::Store(err),
        }
    }
}

impl From<ContextInitError> for ConfigurationError {
    fn from(err: ContextInitError) -> Self {
        Self {
            cause: FailureCause::InitFailed,
            message: err.to_string(),
            source: ConfigurationSource::Init(err),
        }
    }
}

/// Result alias for context construction
pub type ContextResult<T> = Result<T, ConfigurationError>;
