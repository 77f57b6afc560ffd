use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Cooperative cancellation token backed by an `AtomicBool`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

static INTERRUPT: OnceLock<CancelToken> = OnceLock::new();

/// Route SIGINT and SIGTERM to `token`.
///
/// The first signal cancels the token and restores the default disposition,
/// so a second one terminates the process outright. Returns `false` if a
/// token was already installed.
#[cfg(unix)]
pub fn install(token: &CancelToken) -> bool {
    if INTERRUPT.set(token.clone()).is_err() {
        return false;
    }

    let handler = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only touches an already-initialised OnceLock and an
    // atomic flag, and calls signal(2), which is async-signal-safe.
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }
    true
}

#[cfg(not(unix))]
pub fn install(token: &CancelToken) -> bool {
    INTERRUPT.set(token.clone()).is_ok()
}

#[cfg(unix)]
extern "C" fn on_interrupt(signal: libc::c_int) {
    if let Some(token) = INTERRUPT.get() {
        token.cancel();
    }
    // SAFETY: see `install`.
    unsafe {
        libc::signal(signal, libc::SIG_DFL);
    }
}
