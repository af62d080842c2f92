// crates/daemon/src/os.rs
#![allow(unsafe_code)]

use std::fs::OpenOptions;
use std::io;
use std::os::fd::AsRawFd;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::stat::{Mode, umask};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, chdir, fork, setsid};

/// Fork the current process.
///
/// # Safety
/// This wrapper is safe because it performs the raw `fork(2)` and returns
/// immediately without touching shared state in the child. The caller is
/// responsible for keeping the child to work that is sound after a fork.
pub(crate) fn fork_process() -> nix::Result<ForkResult> {
    #[cfg(test)]
    if let Some(res) = MOCK_FORK.with(|m| m.borrow_mut().pop_front()) {
        return res;
    }
    // SAFETY: see the `Safety` section above.
    unsafe { fork() }
}

/// Starts a new session with the calling process as its leader.
pub(crate) fn new_session() -> io::Result<()> {
    setsid().map(drop).map_err(io::Error::from)
}

/// Points stdin, stdout and stderr at `/dev/null`.
///
/// The device is opened once and duplicated onto the three standard slots;
/// `dup2` closes whatever they referred to before, and the temporary
/// descriptor is released when this function returns.
pub(crate) fn redirect_stdio_to_null() -> io::Result<()> {
    let null = OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/null")?;
    for slot in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
        // SAFETY: both descriptors are valid for the duration of the call.
        Errno::result(unsafe { libc::dup2(null.as_raw_fd(), slot) })?;
    }
    Ok(())
}

/// Drops every inherited environment variable.
pub(crate) fn clear_environment() {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    // SAFETY: called in a freshly forked, single-threaded worker.
    unsafe {
        libc::clearenv();
    }
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    for (key, _) in std::env::vars_os() {
        // SAFETY: called in a freshly forked, single-threaded worker.
        unsafe { std::env::remove_var(key) };
    }
}

/// Moves a new daemon to `/` and lifts its file-creation mask.
pub(crate) fn enter_root() -> io::Result<()> {
    #[cfg(test)]
    if let Some(res) = MOCK_ROOT.with(|m| m.borrow_mut().pop_front()) {
        return res.map_err(io::Error::from);
    }
    chdir("/").map_err(io::Error::from)?;
    umask(Mode::empty());
    Ok(())
}

/// Blocks until `pid` terminates, retrying when a signal interrupts the wait.
///
/// Returns `None` when the child cannot be waited for, e.g. it was already
/// reaped or is not ours.
pub(crate) fn wait_child(pid: Pid) -> Option<WaitStatus> {
    loop {
        match waitpid(pid, None) {
            Err(Errno::EINTR) => continue,
            Err(e) => {
                tracing::debug!(target: "debug::exit", %pid, "waitpid failed: {e}");
                return None;
            }
            Ok(status) => {
                tracing::trace!(target: "debug::exit", ?status, "child reaped");
                return Some(status);
            }
        }
    }
}

/// Sleeps for `dur`, returning early if a signal handler runs.
pub(crate) fn sleep_interruptible(dur: Duration) {
    let req = libc::timespec {
        tv_sec: dur.as_secs() as libc::time_t,
        tv_nsec: dur.subsec_nanos() as libc::c_long,
    };
    // SAFETY: `req` is a valid timespec and the remainder pointer may be null.
    unsafe { libc::nanosleep(&req, std::ptr::null_mut()) };
}

/// Terminates the calling process without running exit handlers.
///
/// Forked workers and daemons must not flush buffers or run destructors that
/// belong to the process they were copied from.
pub fn exit_now(code: i32) -> ! {
    // SAFETY: `_exit` never returns and is async-signal-safe.
    unsafe { libc::_exit(code) }
}

#[cfg(test)]
thread_local! {
    static MOCK_FORK: std::cell::RefCell<std::collections::VecDeque<nix::Result<ForkResult>>> =
        const { std::cell::RefCell::new(std::collections::VecDeque::new()) };
    static MOCK_ROOT: std::cell::RefCell<std::collections::VecDeque<nix::Result<()>>> =
        const { std::cell::RefCell::new(std::collections::VecDeque::new()) };
}

#[cfg(test)]
pub(crate) fn mock_forks<I: IntoIterator<Item = nix::Result<ForkResult>>>(results: I) {
    MOCK_FORK.with(|m| m.borrow_mut().extend(results));
}

#[cfg(test)]
pub(crate) fn mocked_forks_left() -> usize {
    MOCK_FORK.with(|m| m.borrow().len())
}

#[cfg(test)]
pub(crate) fn mock_enter_root<I: IntoIterator<Item = nix::Result<()>>>(results: I) {
    MOCK_ROOT.with(|m| m.borrow_mut().extend(results));
}

#[cfg(test)]
pub(crate) fn clear_mocks() {
    MOCK_FORK.with(|m| m.borrow_mut().clear());
    MOCK_ROOT.with(|m| m.borrow_mut().clear());
}
