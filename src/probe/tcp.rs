use std::net::{IpAddr, SocketAddr, TcpStream};
use std::time::Duration;

use log::debug;

use super::types::ProbeOutcome;

/// Plain TCP connect. Ready iff the connection completes within `connect_timeout`.
pub fn probe(ip: IpAddr, port: u16, connect_timeout: Duration) -> ProbeOutcome {
    let addr = SocketAddr::new(ip, port);
    match TcpStream::connect_timeout(&addr, connect_timeout) {
        Ok(_) => ProbeOutcome::Ready,
        Err(e) => {
            debug!("tcp connect to {addr} failed: {e}");
            ProbeOutcome::NotReady(e.to_string())
        }
    }
}
