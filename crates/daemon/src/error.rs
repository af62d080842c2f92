// crates/daemon/src/error.rs
use nix::errno::Errno;
use thiserror::Error;

/// Structural failures that end a stressor run.
///
/// Transient fork failures, lost descendants and interrupted I/O are absorbed
/// where they happen and never surface here.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StressError {
    #[error("failed to install stop handler for {signal}: {errno}")]
    Signal {
        signal: nix::sys::signal::Signal,
        errno: Errno,
    },
    #[error("pipe failed: {0}")]
    Channel(Errno),
    #[error("fork failed: {0}")]
    Fork(Errno),
}

impl StressError {
    pub fn errno(&self) -> Errno {
        match self {
            StressError::Signal { errno, .. } => *errno,
            StressError::Channel(e) | StressError::Fork(e) => *e,
        }
    }
}

pub type Result<T> = std::result::Result<T, StressError>;
