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
//! Logging initialization and setup.
//!
//! [`build_subscriber`] assembles a subscriber without installing it, which
//! lets tests scope it with `tracing::subscriber::with_default`.
//! [`init_tracing_with_config`] installs it process-wide.

use crate::config::{LogConfig, LogError, LogFormat, LogOutput};
use std::io;
use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize tracing with the specified format and optional level.
///
/// # Example
///
/// ```ignore
/// use storetls_observability::{init_tracing, LogFormat};
///
/// init_tracing(LogFormat::Compact, Some("debug")).unwrap();
/// tracing::info!("Application started");
/// ```
pub fn init_tracing(format: LogFormat, level: Option<&str>) -> Result<(), LogError> {
    let mut config = LogConfig::new().with_format(format);
    if let Some(level) = level {
        config = config.with_level(level);
    }
    init_tracing_with_config(&config)
}

/// Initialize tracing with a detailed configuration.
///
/// Fails with [`LogError::AlreadyInitialized`] when a global subscriber is
/// already installed.
pub fn init_tracing_with_config(config: &LogConfig) -> Result<(), LogError> {
    let subscriber = build_subscriber(config)?;
    tracing::subscriber::set_global_default(subscriber).map_err(|_| LogError::AlreadyInitialized)
}

/// Build the subscriber described by `config` without installing it.
pub fn build_subscriber(config: &LogConfig) -> Result<impl Subscriber + Send + Sync, LogError> {
    let env_filter = build_env_filter(config)?;
    Ok(Registry::default()
        .with(format_layer(config))
        .with(env_filter))
}

fn format_layer(config: &LogConfig) -> BoxedLayer {
    let base = fmt::layer()
        .with_writer(make_writer(config.output))
        .with_target(config.include_targets);

    match config.format {
        LogFormat::Pretty => {
            let layer = base
                .with_ansi(config.use_color)
                .with_thread_names(true)
                .with_span_events(FmtSpan::ACTIVE)
                .pretty();
            if config.use_timestamps {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
        LogFormat::Compact => {
            let layer = base
                .with_ansi(config.use_color)
                .with_span_events(FmtSpan::CLOSE)
                .compact();
            if config.use_timestamps {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
        LogFormat::Json => {
            let layer = base
                .with_ansi(false)
                .with_span_events(FmtSpan::FULL)
                .json();
            if config.use_timestamps {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
    }
}

fn make_writer(output: LogOutput) -> BoxMakeWriter {
    match output {
        LogOutput::Stderr => BoxMakeWriter::new(io::stderr),
        LogOutput::Stdout => BoxMakeWriter::new(io::stdout),
    }
}

/// Build an environment filter for the given configuration
fn build_env_filter(config: &LogConfig) -> Result<EnvFilter, LogError> {
    let filter = config.effective_level();

    EnvFilter::try_new(&filter).map_err(|e| LogError::InvalidFilter {
        filter,
        reason: e.to_string(),
    })
}
