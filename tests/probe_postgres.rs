//! Handshake probe against a scripted stand-in for a PostgreSQL server.
//!
//! The fake reads the client's startup packet, then plays a script of
//! canned replies, reading one client message between consecutive replies,
//! and holds the socket until the client hangs up.

use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use wait_for_port::probe::{Credentials, Probe, ProbeOutcome, Prober, pg};

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Serve one connection with a single `reply`; returns the bound port.
fn serve_once(reply: Vec<u8>) -> u16 {
    serve_script(vec![reply])
}

/// Serve one connection, answering each client message with the next reply.
fn serve_script(replies: Vec<Vec<u8>>) -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).expect("bind fake server");
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        if read_sized(&mut stream).is_err() {
            return;
        }
        for (i, reply) in replies.iter().enumerate() {
            if i > 0 && read_message(&mut stream).is_err() {
                return;
            }
            if stream.write_all(reply).is_err() {
                return;
            }
        }
        let mut rest = Vec::new();
        let _ = stream.read_to_end(&mut rest);
    });

    port
}

/// Int32 length (including itself), then the body. The startup packet is
/// exactly this; every later message has a tag byte in front.
fn read_sized(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut len = [0u8; 4];
    stream.read_exact(&mut len)?;
    let mut body = vec![0u8; (u32::from_be_bytes(len) as usize).saturating_sub(4)];
    stream.read_exact(&mut body)
}

/// Regular frontend message: Byte1 tag, Int32 length, body.
fn read_message(stream: &mut TcpStream) -> std::io::Result<u8> {
    let mut tag = [0u8; 1];
    stream.read_exact(&mut tag)?;
    read_sized(stream)?;
    Ok(tag[0])
}

fn message(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend_from_slice(&((body.len() + 4) as u32).to_be_bytes());
    out.extend_from_slice(body);
    out
}

/// AuthenticationOk followed by ReadyForQuery (idle).
fn login_accepted() -> Vec<u8> {
    let mut out = message(b'R', &0u32.to_be_bytes());
    out.extend(message(b'Z', b"I"));
    out
}

/// AuthenticationMD5Password with a fixed salt.
fn md5_challenge() -> Vec<u8> {
    let mut body = 5u32.to_be_bytes().to_vec();
    body.extend_from_slice(&[0x01, 0x02, 0x03, 0x04]);
    message(b'R', &body)
}

/// AuthenticationSASL offering SCRAM-SHA-256 only.
fn scram_challenge() -> Vec<u8> {
    let mut body = 10u32.to_be_bytes().to_vec();
    body.extend_from_slice(b"SCRAM-SHA-256\0\0");
    message(b'R', &body)
}

fn password_rejected() -> Vec<u8> {
    error_response(
        "28P01",
        "password authentication failed for user \"postgres\"",
    )
}

fn error_response(code: &str, text: &str) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, value) in [(b'S', "FATAL"), (b'V', "FATAL"), (b'C', code), (b'M', text)] {
        body.push(field);
        body.extend_from_slice(value.as_bytes());
        body.push(0);
    }
    body.push(0);
    message(b'E', &body)
}

fn probe(port: u16) -> ProbeOutcome {
    pg::probe(LOCALHOST, port, &Credentials::default(), CONNECT_TIMEOUT)
}

#[test]
fn completed_login_is_ready() {
    let port = serve_once(login_accepted());
    assert_eq!(probe(port), ProbeOutcome::Ready);
}

#[test]
fn rejected_password_still_counts_as_ready() {
    let port = serve_once(password_rejected());
    assert_eq!(probe(port), ProbeOutcome::Ready);
}

#[test]
fn md5_challenge_without_password_is_ready() {
    let port = serve_script(vec![md5_challenge(), password_rejected()]);
    assert_eq!(probe(port), ProbeOutcome::Ready);
}

#[test]
fn scram_challenge_without_password_is_ready() {
    let port = serve_script(vec![scram_challenge(), password_rejected()]);
    assert_eq!(probe(port), ProbeOutcome::Ready);
}

#[test]
fn unknown_role_still_counts_as_ready() {
    let port = serve_once(error_response("28000", "role \"nobody\" does not exist"));
    let creds = Credentials {
        user: "nobody".into(),
        ..Credentials::default()
    };
    assert!(pg::probe(LOCALHOST, port, &creds, CONNECT_TIMEOUT).is_ready());
}

#[test]
fn server_still_starting_is_not_ready() {
    let port = serve_once(error_response("57P03", "the database system is starting up"));
    assert!(!probe(port).is_ready());
}

#[test]
fn refused_connection_is_not_ready() {
    let port = {
        let listener = TcpListener::bind((LOCALHOST, 0)).unwrap();
        listener.local_addr().unwrap().port()
    };
    assert!(!probe(port).is_ready());
}

#[test]
fn prober_dispatches_through_the_uniform_contract() {
    let port = serve_once(login_accepted());
    let prober = Prober::Postgres {
        credentials: Credentials::default(),
        connect_timeout: CONNECT_TIMEOUT,
    };
    assert!(prober.probe(LOCALHOST, port).is_ready());
}
