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
#![allow(clippy::unwrap_used)]

use std::path::Path;
use storetls_config::{ConfigError, ConfigLoader};
use storetls_context::FailureCause;
use storetls_test_utils::TestFixtures;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn mutual_tls_toml(password: &str) -> String {
    format!(
        r#"
[tls]
key_store = "{}"
key_store_type = "PKCS12"
key_store_password = "{}"
trust_store = "{}"
trust_store_type = "JKS"
trust_store_password = "password"
"#,
        TestFixtures::keystore_p12().display(),
        password,
        TestFixtures::truststore_jks().display(),
    )
}

#[tokio::test]
async fn test_load_toml_and_build_context() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "storetls.toml", &mutual_tls_toml("password"));

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    let ctx = config.tls.build_context().unwrap().unwrap();

    assert_eq!(ctx.summary().identities.len(), 1);
    assert_eq!(ctx.summary().anchors, 1);
    assert!(!ctx.insecure());
}

#[tokio::test]
async fn test_wrong_password_surfaces_as_context_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "storetls.toml", &mutual_tls_toml("wrong-password"));

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    let err = config.tls.build_context().unwrap_err();

    let context = err.context_error().expect("context error");
    assert_eq!(context.cause(), FailureCause::PasswordIncorrect);
    assert!(err.to_string().contains("password"));
}

#[tokio::test]
async fn test_load_yaml_with_relative_paths() {
    let dir = TempDir::new().unwrap();
    std::fs::copy(TestFixtures::ca_pem(), dir.path().join("ca.pem")).unwrap();
    let path = write_config(
        &dir,
        "storetls.yaml",
        "tls:\n  trust_store: ca.pem\n  trust_store_type: PEM\n",
    );

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    assert_eq!(
        config.tls.trust_store.as_deref(),
        Some(dir.path().join("ca.pem").as_path())
    );

    let ctx = config.tls.build_context().unwrap().unwrap();
    assert_eq!(ctx.summary().anchors, 1);
}

#[tokio::test]
async fn test_load_json_insecure_only() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "storetls.json", r#"{"tls": {"tls_insecure": true}}"#);

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    let ctx = config.tls.build_context().unwrap().unwrap();
    assert!(ctx.insecure());
}

#[tokio::test]
async fn test_empty_config_builds_no_context() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "storetls.toml", "");

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    assert!(config.tls.build_context().unwrap().is_none());
}

#[tokio::test]
async fn test_missing_store_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "storetls.toml",
        "[tls]\ntrust_store = \"/no/such/file\"\n",
    );

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    let err = config.tls.build_context().unwrap_err();
    assert_eq!(err.context_error().unwrap().cause(), FailureCause::NotFound);
}

#[tokio::test]
async fn test_missing_config_file() {
    let err = ConfigLoader::new()
        .load_file(Path::new("/no/such/storetls.toml"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[tokio::test]
async fn test_unsupported_config_format() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "storetls.ini", "[tls]");

    let err = ConfigLoader::new().load_file(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
}

#[tokio::test]
async fn test_invalid_log_level_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "storetls.toml",
        "[observability]\nlog_level = \"verbose\"\n",
    );

    let err = ConfigLoader::new().load_file(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[tokio::test]
async fn test_password_not_in_debug_output() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "storetls.toml", &mutual_tls_toml("s3cr3t-value"));

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    assert!(!format!("{:?}", config).contains("s3cr3t-value"));
}
