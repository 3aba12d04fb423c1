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
//! Subcommands of the `storetls` binary.

mod check;
mod inspect;

pub use check::CheckCmd;
pub use inspect::InspectCmd;

use anyhow::{Context, Result};
use storetls_config::ObservabilitySettings;
use storetls_observability::{init_tracing_with_config, LogConfig, LogFormat};

/// Flags shared by every subcommand
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalOptions {
    /// Raise the log level to debug
    pub verbose: bool,

    /// Suppress logging and result output
    pub quiet: bool,
}

/// Install the process-wide subscriber described by `settings`
///
/// `--quiet` installs nothing and `--verbose` overrides the level.
pub fn init_logging(options: &GlobalOptions, settings: &ObservabilitySettings) -> Result<()> {
    if options.quiet {
        return Ok(());
    }

    let format: LogFormat = settings.log_format.parse()?;
    let level = if options.verbose {
        "debug"
    } else {
        settings.log_level.as_str()
    };

    let config = LogConfig::new()
        .with_format(format)
        .with_level(level)
        .with_color(console::colors_enabled_stderr())
        .with_timestamps(false)
        .with_targets(options.verbose);

    init_tracing_with_config(&config).context("failed to initialise logging")
}
