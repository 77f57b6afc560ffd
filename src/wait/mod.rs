pub mod orchestrator;
mod types;

pub use orchestrator::{CancellableSleep, Sleeper, WaitLoop};
pub use types::{DEFAULT_GRACE_PERIOD, DEFAULT_INTERVAL, ProbeTarget, WaitOutcome};
