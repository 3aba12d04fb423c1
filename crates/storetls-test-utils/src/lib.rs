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

//! # storetls Test Utilities
//!
//! Shared test utilities for storetls crates providing:
//! - Checked-in key store and trust store fixtures
//! - Freshly generated self-signed, expired and rogue-CA certificates
//! - An in-memory rustls handshake driver
//! - CLI command helpers for testing the `storetls` binary

pub mod certs;
pub mod cli;
pub mod fixtures;
pub mod handshake;

// Re-export commonly used items at crate root
pub use certs::{GeneratedIdentity, TestCertificates};
pub use cli::{storetls, StoretlsCommand};
pub use fixtures::{TestFixtures, FIXTURE_PASSWORD};
pub use handshake::{complete_handshake, fixture_server_config, server_config, HandshakeOutcome};
