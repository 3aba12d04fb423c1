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

//! CLI command helpers for testing the storetls binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// Get a Command for the storetls binary.
///
/// # Example
/// ```ignore
/// use storetls_test_utils::storetls;
///
/// storetls()
///     .arg("check")
///     .arg("storetls.toml")
///     .assert()
///     .success();
/// ```
#[allow(deprecated)] // cargo_bin is deprecated but still works for our use case
pub fn storetls() -> Command {
    let mut cmd = Command::cargo_bin("storetls").expect("storetls binary not found");
    // Keep test output independent of the caller's environment
    for var in [
        "RUST_LOG",
        "STORETLS_KEY_STORE",
        "STORETLS_KEY_STORE_TYPE",
        "STORETLS_KEY_STORE_PASSWORD",
        "STORETLS_TRUST_STORE",
        "STORETLS_TRUST_STORE_TYPE",
        "STORETLS_TRUST_STORE_PASSWORD",
        "STORETLS_TLS_INSECURE",
        "STORETLS_LOG_LEVEL",
        "STORETLS_LOG_FORMAT",
        "STORETLS_STORE_PASSWORD",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Fluent API wrapper for common storetls command patterns.
pub struct StoretlsCommand {
    cmd: Command,
}

impl StoretlsCommand {
    /// Create a new StoretlsCommand.
    pub fn new() -> Self {
        Self { cmd: storetls() }
    }

    /// Set the working directory for the command.
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cmd.current_dir(dir);
        self
    }

    /// Add an argument to the command.
    pub fn arg(mut self, arg: &str) -> Self {
        self.cmd.arg(arg);
        self
    }

    /// Add multiple arguments to the command.
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Set an environment variable for the command.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Execute the command and assert success.
    pub fn run_success(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert().success()
    }

    /// Execute the command and assert failure.
    pub fn run_failure(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert().failure()
    }

    /// Get the underlying Command for custom assertions.
    pub fn into_inner(self) -> Command {
        self.cmd
    }

    /// Run `check` on a config file and assert it succeeds.
    pub fn check_ok(config: &Path) -> assert_cmd::assert::Assert {
        storetls()
            .arg("check")
            .arg(config)
            .assert()
            .success()
    }

    /// Run `check` on a config file and assert it fails with `cause` in stderr.
    pub fn check_fails_with(config: &Path, cause: &str) -> assert_cmd::assert::Assert {
        storetls()
            .arg("check")
            .arg(config)
            .assert()
            .failure()
            .stderr(predicate::str::contains(cause))
    }
}

impl Default for StoretlsCommand {
    fn default() -> Self {
        Self::new()
    }
}
