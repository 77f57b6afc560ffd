//! Port probes — bare TCP connect or a PostgreSQL startup handshake.
pub mod pg;
mod strategy;
pub mod tcp;
mod types;

pub use strategy::{DEFAULT_CONNECT_TIMEOUT, POSTGRES_PORT, Probe, Prober};
pub use types::{Credentials, DEFAULT_PG_DATABASE, DEFAULT_PG_USER, ProbeOutcome};
