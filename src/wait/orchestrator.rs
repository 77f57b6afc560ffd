use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::docker::{InspectError, Runtime};
use crate::probe::{Probe, ProbeOutcome};
use crate::signal::CancelToken;

use super::types::{ProbeTarget, WaitOutcome};

const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Pause between poll ticks.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Real sleeper. Sleeps in short slices and returns early once `cancel` fires.
#[derive(Debug, Clone)]
pub struct CancellableSleep {
    cancel: CancelToken,
}

impl CancellableSleep {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

impl Sleeper for CancellableSleep {
    fn sleep(&mut self, duration: Duration) {
        // A deadline past what `Instant` can represent means "until cancelled".
        let deadline = Instant::now().checked_add(duration);
        while !self.cancel.is_cancelled() {
            let nap = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    SLEEP_SLICE.min(deadline - now)
                }
                None => SLEEP_SLICE,
            };
            std::thread::sleep(nap);
        }
    }
}

/// Polls a container until its port answers, it dies, or time runs out.
///
/// Progress goes to `out` as `Waiting for <name>....` followed by `ready.` or
/// `failed!` and a diagnostic line. Elapsed time is the sum of poll intervals
/// slept, not wall-clock time.
pub struct WaitLoop<'a, R, P, S, W> {
    runtime: &'a R,
    prober: &'a P,
    sleeper: S,
    out: W,
    cancel: CancelToken,
}

impl<'a, R, P, S, W> WaitLoop<'a, R, P, S, W>
where
    R: Runtime,
    P: Probe,
    S: Sleeper,
    W: Write,
{
    pub fn new(runtime: &'a R, prober: &'a P, sleeper: S, out: W, cancel: CancelToken) -> Self {
        Self {
            runtime,
            prober,
            sleeper,
            out,
            cancel,
        }
    }

    pub fn into_parts(self) -> (S, W) {
        (self.sleeper, self.out)
    }

    pub fn run(&mut self, target: &ProbeTarget) -> WaitOutcome {
        self.emit(format_args!("Waiting for {}", target.container()));

        // The only failure that skips the polling loop entirely.
        if let Err(e) = self.runtime.ping() {
            return self.finish(WaitOutcome::RuntimeUnreachable(e.to_string()));
        }

        let mut elapsed = Duration::ZERO;
        while elapsed < target.timeout() {
            if self.cancel.is_cancelled() {
                return self.finish(WaitOutcome::Interrupted);
            }
            self.emit(format_args!("."));

            let past_grace = elapsed > target.grace_period();
            let state = match self.runtime.inspect(target.container()) {
                Ok(state) => Some(state),
                Err(InspectError::NotFound(msg)) if past_grace => {
                    debug!("container '{}' is gone: {msg}", target.container());
                    return self.container_down(target);
                }
                Err(e) if e.is_fatal() => {
                    warn!("lost contact with the container runtime, retrying: {e}");
                    None
                }
                Err(e) => {
                    debug!(
                        "unable to find container or extract IP address for '{}': {e}",
                        target.container()
                    );
                    None
                }
            };

            if past_grace && state.as_ref().is_some_and(|s| !s.running) {
                return self.container_down(target);
            }

            if let Some(ip) = state.and_then(|s| s.ip_address) {
                match self.prober.probe(ip, target.port()) {
                    ProbeOutcome::Ready => return self.finish(WaitOutcome::Ready),
                    ProbeOutcome::NotReady(reason) => {
                        debug!("{ip}:{} not ready yet: {reason}", target.port());
                    }
                }
            }

            elapsed = elapsed.saturating_add(target.interval());
            self.sleeper.sleep(target.interval());
        }

        if self.cancel.is_cancelled() {
            return self.finish(WaitOutcome::Interrupted);
        }
        self.finish(WaitOutcome::TimedOut {
            port: target.port(),
        })
    }

    fn container_down(&mut self, target: &ProbeTarget) -> WaitOutcome {
        self.finish(WaitOutcome::ContainerDown {
            container: target.container().to_string(),
        })
    }

    fn finish(&mut self, outcome: WaitOutcome) -> WaitOutcome {
        if outcome.is_success() {
            self.emit(format_args!("ready.\n"));
        } else {
            self.emit(format_args!("failed!\n{outcome}\n"));
        }
        info!("wait finished: {outcome}");
        outcome
    }

    // Progress output is best effort; a closed stdout must not end the wait.
    fn emit(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
        let _ = self.out.flush();
    }
}
