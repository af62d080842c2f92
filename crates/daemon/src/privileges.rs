// crates/daemon/src/privileges.rs

use std::io;

#[cfg(target_os = "linux")]
use caps::CapSet;

/// Gives up every capability the calling process holds and forbids
/// regaining privileges through `execve`.
///
/// Callers treat a failure as a diagnostic only.
#[cfg(target_os = "linux")]
pub fn drop_capabilities() -> io::Result<()> {
    for set in [CapSet::Effective, CapSet::Permitted, CapSet::Inheritable] {
        caps::clear(None, set).map_err(|e| io::Error::other(format!("clear {set:?}: {e}")))?;
    }
    if let Err(e) = caps::clear(None, CapSet::Ambient) {
        tracing::trace!(target: "debug::exit", "ambient capabilities unavailable: {e}");
    }
    nix::sys::prctl::set_no_new_privs().map_err(io::Error::from)
}

#[cfg(not(target_os = "linux"))]
pub fn drop_capabilities() -> io::Result<()> {
    Ok(())
}
