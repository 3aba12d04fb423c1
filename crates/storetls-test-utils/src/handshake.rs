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

//! In-memory TLS handshakes.
//!
//! Client and server records are shuttled through byte buffers, so trust
//! and identity behaviour can be checked without opening sockets.

use crate::fixtures::TestFixtures;
use rustls::crypto::ring::default_provider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::server::WebPkiClientVerifier;
use rustls::{ClientConfig, ClientConnection, Connection, RootCertStore, ServerConfig, ServerConnection};
use std::sync::Arc;

const MAX_ROUNDS: usize = 16;

/// What the server saw once the handshake finished
#[derive(Debug)]
pub struct HandshakeOutcome {
    /// Chain presented by the client, if any
    pub client_chain: Option<Vec<CertificateDer<'static>>>,
}

/// Server configuration over the given identity
///
/// With `client_ca` set, the server requests a client certificate issued
/// by that CA; otherwise no client authentication is requested.
pub fn server_config(
    chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
    client_ca: Option<CertificateDer<'static>>,
) -> Result<Arc<ServerConfig>, rustls::Error> {
    let provider = Arc::new(default_provider());
    let builder = ServerConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()?;

    let builder = match client_ca {
        Some(ca) => {
            let mut roots = RootCertStore::empty();
            roots.add(ca)?;
            let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
                .build()
                .map_err(|e| rustls::Error::General(e.to_string()))?;
            builder.with_client_cert_verifier(verifier)
        }
        None => builder.with_no_client_auth(),
    };

    Ok(Arc::new(builder.with_single_cert(chain, key)?))
}

/// Server configuration for the `localhost` fixture identity
pub fn fixture_server_config(require_client_auth: bool) -> Arc<ServerConfig> {
    let client_ca = require_client_auth.then(TestFixtures::ca_certificate);
    server_config(TestFixtures::server_chain(), TestFixtures::server_key(), client_ca)
        .expect("fixture server config")
}

/// Run a full handshake between a client and a server configuration
///
/// The first error raised by either side is returned.
pub fn complete_handshake(
    client: Arc<ClientConfig>,
    server: Arc<ServerConfig>,
    server_name: &str,
) -> Result<HandshakeOutcome, rustls::Error> {
    let name = ServerName::try_from(server_name.to_string())
        .map_err(|e| rustls::Error::General(e.to_string()))?;
    let mut client = Connection::Client(ClientConnection::new(client, name)?);
    let mut server = Connection::Server(ServerConnection::new(server)?);

    for _ in 0..MAX_ROUNDS {
        if !client.is_handshaking() && !server.is_handshaking() {
            return Ok(HandshakeOutcome {
                client_chain: server.peer_certificates().map(|chain| chain.to_vec()),
            });
        }
        transfer(&mut client, &mut server)?;
        transfer(&mut server, &mut client)?;
    }

    Err(rustls::Error::General("handshake did not complete".to_string()))
}

fn transfer(from: &mut Connection, to: &mut Connection) -> Result<(), rustls::Error> {
    let mut buf = Vec::new();
    while from.wants_write() {
        from.write_tls(&mut buf)
            .map_err(|e| rustls::Error::General(e.to_string()))?;
    }

    let mut pending = buf.as_slice();
    while !pending.is_empty() {
        to.read_tls(&mut pending)
            .map_err(|e| rustls::Error::General(e.to_string()))?;
        to.process_new_packets()?;
    }
    Ok(())
}
