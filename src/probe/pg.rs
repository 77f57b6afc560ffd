use std::net::IpAddr;
use std::time::Duration;

use log::debug;
use postgres::config::SslMode;
use postgres::error::SqlState;
use postgres::{Config, NoTls};

use super::types::{Credentials, ProbeOutcome};

/// Run a PostgreSQL startup handshake against `ip:port`.
///
/// A completed login is ready. So is a login the server rejects for
/// authentication reasons: the server is up and answering the wire protocol,
/// only the credentials are off. Anything else (refused connection, timeout,
/// "the database system is starting up") is not ready.
///
/// `connect_timeout` bounds the TCP connect only, not the startup exchange.
pub fn probe(
    ip: IpAddr,
    port: u16,
    credentials: &Credentials,
    connect_timeout: Duration,
) -> ProbeOutcome {
    let mut config = Config::new();
    config
        .host(&ip.to_string())
        .port(port)
        .user(&credentials.user)
        .dbname(&credentials.database)
        .ssl_mode(SslMode::Disable)
        .connect_timeout(connect_timeout)
        .application_name("wait-for-port")
        // Sent even when empty: without one the client aborts on a password
        // challenge before the server can reject the login.
        .password(&credentials.password);

    match config.connect(NoTls) {
        Ok(_client) => ProbeOutcome::Ready,
        Err(e) => match e.code() {
            Some(code) if is_auth_rejection(code) => {
                debug!(
                    "postgres at {ip}:{port} rejected login for '{}' ({}), port is open",
                    credentials.user,
                    code.code()
                );
                ProbeOutcome::Ready
            }
            _ => {
                debug!("postgres handshake with {ip}:{port} failed: {e}");
                ProbeOutcome::NotReady(e.to_string())
            }
        },
    }
}

/// SQLSTATE class 28: invalid authorization specification.
pub(crate) fn is_auth_rejection(code: &SqlState) -> bool {
    code.code().starts_with("28")
}
