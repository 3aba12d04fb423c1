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
//! Logging configuration types.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while setting up logging
#[derive(Error, Debug)]
pub enum LogError {
    /// The filter directive does not parse
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// Directive as given
        filter: String,
        /// Parser message
        reason: String,
    },

    /// The format name is unknown
    #[error("Unknown log format: {0}. Expected one of: pretty, compact, json")]
    InvalidFormat(String),

    /// `init_tracing` was already called in this process
    #[error("A global logger is already installed")]
    AlreadyInitialized,
}

/// Event rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, for people at a terminal
    #[default]
    Pretty,

    /// One line per event
    Compact,

    /// One JSON object per event
    Json,
}

impl LogFormat {
    const ALL: [LogFormat; 3] = [LogFormat::Pretty, LogFormat::Compact, LogFormat::Json];

    /// Name used in settings files
    pub fn name(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LogError::InvalidFormat(s.to_string()))
    }
}

/// Where events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// Standard error
    #[default]
    Stderr,
    /// Standard output
    Stdout,
}

/// Settings for the subscriber built by [`crate::build_subscriber`]
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Event rendering
    pub format: LogFormat,

    /// `EnvFilter` directive such as "info" or "storetls_context=debug".
    /// Falls back to `RUST_LOG`, then "info".
    pub level: Option<String>,

    /// ANSI colours; never used for JSON
    pub use_color: bool,

    /// Prefix events with a timestamp
    pub use_timestamps: bool,

    /// Print the module path of each event
    pub include_targets: bool,

    /// Destination stream
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::default(),
            level: None,
            use_color: true,
            use_timestamps: true,
            include_targets: true,
            output: LogOutput::default(),
        }
    }
}

impl LogConfig {
    /// Pretty output on stderr at the `RUST_LOG` level
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event rendering
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the filter directive
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Enable or disable ANSI colours
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.use_color = enabled;
        self
    }

    /// Enable or disable timestamps
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.use_timestamps = enabled;
        self
    }

    /// Enable or disable event targets
    pub fn with_targets(mut self, enabled: bool) -> Self {
        self.include_targets = enabled;
        self
    }

    /// Set the destination stream
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Filter directive actually applied
    pub fn effective_level(&self) -> String {
        self.effective_level_with(std::env::var("RUST_LOG").ok())
    }

    pub(crate) fn effective_level_with(&self, rust_log: Option<String>) -> String {
        match (&self.level, rust_log) {
            (Some(level), _) => level.clone(),
            (None, Some(env)) if !env.trim().is_empty() => env,
            _ => "info".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_names_round_trip() {
        for format in LogFormat::ALL {
            assert_eq!(format.name().parse::<LogFormat>().unwrap(), format);
        }
        assert_eq!(" COMPACT ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!(matches!(
            "text".parse::<LogFormat>(),
            Err(LogError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_effective_level_precedence() {
        let config = LogConfig::new();
        assert_eq!(config.effective_level_with(None), "info");
        assert_eq!(config.effective_level_with(Some(String::new())), "info");
        assert_eq!(config.effective_level_with(Some("trace".to_string())), "trace");

        let config = LogConfig::new().with_level("warn");
        assert_eq!(config.effective_level_with(Some("trace".to_string())), "warn");
    }
}
