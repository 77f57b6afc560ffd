pub mod args;
pub mod config;
pub mod docker;
pub mod logging;
pub mod probe;
pub mod signal;
pub mod wait;
