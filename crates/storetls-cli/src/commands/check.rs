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
use super::{init_logging, GlobalOptions};
use crate::output;
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use storetls_config::{ConfigLoader, TlsSettings};
use storetls_context::{StoreType, TransportContext};
use tracing::debug;

/// Load a configuration file and build the TLS context it describes
#[derive(Args, Debug)]
pub struct CheckCmd {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Ignore STORETLS_* environment overrides
    #[arg(long)]
    pub no_env: bool,

    /// Format as JSON
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable result of `check`
#[derive(Debug, Serialize)]
struct CheckReport {
    configured: bool,
    key_store: Option<String>,
    trust_store: Option<String>,
    identities: Vec<String>,
    anchors: usize,
    bundled_roots: bool,
    insecure: bool,
}

impl CheckReport {
    fn new(settings: &TlsSettings, context: Option<&TransportContext>) -> Self {
        let summary = context.map(TransportContext::summary);
        Self {
            configured: summary.is_some(),
            key_store: store_label(settings.key_store.as_deref(), settings.key_store_type.as_deref()),
            trust_store: store_label(
                settings.trust_store.as_deref(),
                settings.trust_store_type.as_deref(),
            ),
            identities: summary
                .as_ref()
                .map(|s| s.identities.clone())
                .unwrap_or_default(),
            anchors: summary.as_ref().map_or(0, |s| s.anchors),
            bundled_roots: summary.as_ref().is_some_and(|s| s.ambient_roots),
            insecure: summary.as_ref().is_some_and(|s| s.insecure),
        }
    }
}

fn store_label(path: Option<&Path>, declared: Option<&str>) -> Option<String> {
    let path = path?;
    let kind = StoreType::resolve(declared)
        .map(|t| t.name().to_string())
        .unwrap_or_else(|e| e.0);
    Some(format!("{} ({})", path.display(), kind))
}

impl CheckCmd {
    /// Load, build and report
    pub async fn execute(&self, options: &GlobalOptions) -> Result<()> {
        let loader = ConfigLoader::new();
        let config = if self.no_env {
            loader.load_file(&self.config).await
        } else {
            loader.load_with_overrides(&self.config).await
        }
        .with_context(|| format!("failed to load {}", self.config.display()))?;

        init_logging(options, &config.observability)?;
        debug!(config = %self.config.display(), "building TLS context");

        let context = config.tls.build_context()?;
        let report = CheckReport::new(&config.tls, context.as_ref());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        if options.quiet {
            return Ok(());
        }

        output::header(&format!("TLS context for {}", self.config.display()));
        if !report.configured {
            output::info("Nothing configured, connections use the default TLS settings");
            return Ok(());
        }

        if let Some(key_store) = &report.key_store {
            output::detail("Key store", key_store);
        }
        if let Some(trust_store) = &report.trust_store {
            output::detail("Trust store", trust_store);
        }

        let identities = if report.identities.is_empty() {
            "none".to_string()
        } else {
            report.identities.join(", ")
        };
        output::detail("Client identities", &identities);

        let trust = if report.bundled_roots {
            "bundled web roots".to_string()
        } else {
            format!("{} anchors", report.anchors)
        };
        output::detail("Trust", &trust);

        if report.insecure {
            output::detail("Certificate verification", "disabled");
            output::warning("tls_insecure accepts any server certificate");
        } else {
            output::detail("Certificate verification", "enabled");
        }

        output::success("TLS context built");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_label_defaults_to_pkcs12() {
        let label = store_label(Some(Path::new("/etc/keystore.p12")), None);
        assert_eq!(label.as_deref(), Some("/etc/keystore.p12 (PKCS12)"));
        assert_eq!(store_label(None, Some("JKS")), None);
    }

    #[test]
    fn test_empty_report() {
        let report = CheckReport::new(&TlsSettings::default(), None);
        assert!(!report.configured);
        assert!(report.identities.is_empty());
        assert!(!report.insecure);
    }
}
