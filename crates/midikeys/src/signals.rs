//! Termination signal handling
//!
//! The translation loop spends its life blocked in `read(2)`, and signal-hook
//! installs its handlers with `SA_RESTART`, so a flag set from a handler is
//! not seen until the next key event arrives. Signals are therefore consumed
//! on a separate watcher thread, which raises the shutdown flag and then runs
//! an exit action without waiting for the loop.

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use std::ffi::c_int;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Signals that stop the client
pub const TERMINATION_SIGNALS: [c_int; 2] = [SIGINT, SIGTERM];

/// Watch `signals` on a background thread.
///
/// On the first delivery `shutdown` is set and `on_signal` runs with the
/// signal number. The returned handle stops the watcher when closed.
pub fn watch_signals<F>(signals: &[c_int], shutdown: Arc<AtomicBool>, on_signal: F) -> io::Result<Handle>
where
    F: FnOnce(c_int) + Send + 'static,
{
    let mut signals = Signals::new(signals)?;
    let handle = signals.handle();

    thread::Builder::new()
        .name("midikeys-signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                shutdown.store(true, Ordering::Relaxed);
                on_signal(signal);
            }
        })?;

    Ok(handle)
}

/// Exit the process on SIGINT or SIGTERM, even while the loop is blocked
pub fn exit_on_termination(shutdown: Arc<AtomicBool>) -> io::Result<Handle> {
    watch_signals(&TERMINATION_SIGNALS, shutdown, |signal| {
        log::info!("Received signal {}, exiting", signal);
        std::process::exit(128 + signal);
    })
}
