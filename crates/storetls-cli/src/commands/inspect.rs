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
use anyhow::{anyhow, Result};
use clap::Args;
use console::style;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::CertificateDer;
use serde::Serialize;
use std::path::PathBuf;
use storetls_config::ObservabilitySettings;
use storetls_context::store::PrivateKeyEntry;
use storetls_context::{
    open_store, ClientIdentity, ConfigurationError, StoreEntry, StoreRole, StoreSpec,
};
use x509_parser::prelude::*;

/// List the entries of a key store or trust store
#[derive(Args, Debug)]
pub struct InspectCmd {
    /// Store file
    #[arg(value_name = "STORE")]
    pub store: PathBuf,

    /// Container format: PKCS12, JKS or PEM
    #[arg(long = "type", value_name = "TYPE")]
    pub store_type: Option<String>,

    /// Store password
    #[arg(long, env = "STORETLS_STORE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Format as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StoreReport {
    path: String,
    store_type: &'static str,
    entries: Vec<EntryReport>,
}

#[derive(Debug, Serialize)]
struct EntryReport {
    alias: String,
    kind: &'static str,
    subject: String,
    issuer: String,
    not_after: String,
    currently_valid: bool,
    chain_length: usize,
    key: Option<String>,
}

/// Subject, issuer and validity of one certificate
struct CertificateDetails {
    subject: String,
    issuer: String,
    not_after: String,
    currently_valid: bool,
}

fn describe(alias: &str, der: &CertificateDer<'_>) -> Result<CertificateDetails> {
    let (_, cert) = X509Certificate::from_der(der.as_ref())
        .map_err(|e| anyhow!("certificate of entry '{}' cannot be parsed: {}", alias, e))?;
    Ok(CertificateDetails {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        not_after: cert.validity().not_after.to_string(),
        currently_valid: cert.validity().is_valid(),
    })
}

fn key_status(entry: &PrivateKeyEntry, password: Option<&str>, provider: &CryptoProvider) -> String {
    match ClientIdentity::from_entry(entry, password, provider) {
        Ok(_) => "usable".to_string(),
        Err(e) => format!("unusable ({}): {}", e.cause(), e),
    }
}

impl EntryReport {
    fn new(entry: &StoreEntry, password: Option<&str>, provider: &CryptoProvider) -> Result<Self> {
        let (kind, leaf, chain_length, key) = match entry {
            StoreEntry::PrivateKey(key_entry) => {
                let leaf = key_entry
                    .leaf()
                    .ok_or_else(|| anyhow!("private key '{}' has no certificate", key_entry.alias))?;
                (
                    "private key",
                    leaf,
                    key_entry.chain.len(),
                    Some(key_status(key_entry, password, provider)),
                )
            }
            StoreEntry::TrustedCertificate { certificate, .. } => {
                ("trusted certificate", certificate, 1, None)
            }
        };

        let details = describe(entry.alias(), leaf)?;
        Ok(Self {
            alias: entry.alias().to_string(),
            kind,
            subject: details.subject,
            issuer: details.issuer,
            not_after: details.not_after,
            currently_valid: details.currently_valid,
            chain_length,
            key,
        })
    }

    fn print(&self) {
        println!("{} {}", style(self.kind).bold(), style(&self.alias).green());
        output::detail("Subject", &self.subject);
        output::detail("Issuer", &self.issuer);
        let expiry = if self.currently_valid {
            self.not_after.clone()
        } else {
            format!("{} (not currently valid)", self.not_after)
        };
        output::detail("Expires", &expiry);
        if self.chain_length > 1 {
            output::detail("Chain length", &self.chain_length.to_string());
        }
        if let Some(key) = &self.key {
            output::detail("Key", key);
        }
    }
}

impl InspectCmd {
    /// Decode the store and print its entries
    pub fn execute(&self, options: &GlobalOptions) -> Result<()> {
        init_logging(options, &ObservabilitySettings::default())?;

        let mut spec = StoreSpec::new(&self.store);
        if let Some(store_type) = &self.store_type {
            spec = spec.with_type(store_type.as_str());
        }
        if let Some(password) = &self.password {
            spec = spec.with_password(password.as_str());
        }

        let Some(store) = open_store(&spec, StoreRole::KeyStore).map_err(ConfigurationError::from)?
        else {
            return Err(anyhow!("no store path given"));
        };

        let provider = rustls::crypto::ring::default_provider();
        let entries = store
            .entries
            .iter()
            .map(|entry| EntryReport::new(entry, self.password.as_deref(), &provider))
            .collect::<Result<Vec<_>>>()?;

        let report = StoreReport {
            path: self.store.display().to_string(),
            store_type: store.store_type.name(),
            entries,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        if options.quiet {
            return Ok(());
        }

        output::header(&format!(
            "{} ({}, {} entries)",
            report.path,
            report.store_type,
            report.entries.len()
        ));
        if report.entries.is_empty() {
            output::warning("The store holds no entries");
        }
        for entry in &report.entries {
            println!();
            entry.print();
        }
        Ok(())
    }
}
