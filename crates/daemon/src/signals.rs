// crates/daemon/src/signals.rs
#![allow(unsafe_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{
    SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal, sigaction, signal, sigprocmask,
};

static KEEP_STRESSING: AtomicBool = AtomicBool::new(true);

extern "C" fn handle_stop(_signum: libc::c_int) {
    KEEP_STRESSING.store(false, Ordering::SeqCst);
}

/// Whether no stop request has been received by this process.
pub fn keep_stressing_flag() -> bool {
    KEEP_STRESSING.load(Ordering::SeqCst)
}

/// Clears the keep-running flag as if a stop signal had arrived.
pub fn request_stop() {
    KEEP_STRESSING.store(false, Ordering::SeqCst);
}

/// Re-arms the keep-running flag for a new run in the same process.
pub fn reset_stop_flag() {
    KEEP_STRESSING.store(true, Ordering::SeqCst);
}

/// Installs a handler that clears the keep-running flag when `sig` arrives.
///
/// The handler is installed without `SA_RESTART` so blocking reads and
/// sleeps return `EINTR` and their callers get to observe the flag.
pub fn stop_on_signal(sig: Signal) -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handle_stop),
        SaFlags::empty(),
        SigSet::empty(),
    );
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
    unsafe { sigaction(sig, &action) }?;
    tracing::trace!(target: "debug::signal", %sig, "stop handler installed");
    Ok(())
}

/// Restores the default disposition of every signal the host knows about.
///
/// Signals that cannot be caught are skipped; per-signal failures are
/// ignored since a partially reset table is still usable.
pub fn reset_dispositions() {
    for sig in Signal::iterator() {
        if matches!(sig, Signal::SIGKILL | Signal::SIGSTOP) {
            continue;
        }
        // SAFETY: restoring SIG_DFL installs no Rust code as a handler.
        let _ = unsafe { signal(sig, SigHandler::SigDfl) };
    }
    reset_realtime_dispositions();
    tracing::trace!(target: "debug::signal", "signal dispositions reset");
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn reset_realtime_dispositions() {
    for signum in libc::SIGRTMIN()..=libc::SIGRTMAX() {
        // SAFETY: see `reset_dispositions`.
        unsafe { libc::signal(signum, libc::SIG_DFL) };
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn reset_realtime_dispositions() {}

/// Unblocks every signal for the calling thread.
pub fn clear_signal_mask() -> nix::Result<()> {
    sigprocmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::empty()), None)
}

#[cfg(test)]
static INTERRUPTS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

#[cfg(test)]
extern "C" fn count_interrupt(_signum: libc::c_int) {
    INTERRUPTS.fetch_add(1, Ordering::SeqCst);
}

/// Number of `SIGUSR1` interruptions delivered by [`interrupt_after`].
#[cfg(test)]
pub(crate) fn interrupts() -> usize {
    INTERRUPTS.load(Ordering::SeqCst)
}

/// Sends `sig` to the calling thread after `delay`, from a helper thread.
///
/// `SIGUSR1` gets a handler that leaves the stop flag alone, so blocked calls
/// see `EINTR` while the run is still active.
#[cfg(test)]
pub(crate) fn interrupt_after(
    sig: Signal,
    delay: std::time::Duration,
) -> std::thread::JoinHandle<()> {
    use nix::sys::pthread::{pthread_kill, pthread_self};

    if sig == Signal::SIGUSR1 {
        let action = SigAction::new(
            SigHandler::Handler(count_interrupt),
            SaFlags::empty(),
            SigSet::empty(),
        );
        // SAFETY: the handler only touches an atomic.
        unsafe { sigaction(sig, &action) }.unwrap();
    }
    let target = pthread_self();
    std::thread::spawn(move || {
        std::thread::sleep(delay);
        pthread_kill(target, sig).unwrap();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;
    use serial_test::serial;

    #[test]
    #[serial]
    fn request_and_reset() {
        reset_stop_flag();
        assert!(keep_stressing_flag());
        request_stop();
        assert!(!keep_stressing_flag());
        reset_stop_flag();
        assert!(keep_stressing_flag());
    }

    #[test]
    #[serial]
    fn signal_clears_flag() {
        reset_stop_flag();
        stop_on_signal(Signal::SIGUSR2).unwrap();
        raise(Signal::SIGUSR2).unwrap();
        assert!(!keep_stressing_flag());
        reset_stop_flag();
    }

    #[test]
    fn uncatchable_signals_are_rejected() {
        assert!(stop_on_signal(Signal::SIGKILL).is_err());
    }
}
