// crates/daemon/src/daemonizer.rs

use std::io;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::unistd::{ForkResult, Pid};

use crate::backoff::Backoff;
use crate::channel::SentinelWriter;
use crate::harness::RunControl;
use crate::{os, signals};

/// Signal that asks the daemonizer loop to stop.
pub const STOP_SIGNAL: Signal = Signal::SIGALRM;

/// Whether a parent blocks on its direct child or leaves it to `init`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaitPolicy {
    #[default]
    ReapByInit,
    WaitChild,
}

impl From<bool> for WaitPolicy {
    fn from(daemon_wait: bool) -> Self {
        if daemon_wait {
            WaitPolicy::WaitChild
        } else {
            WaitPolicy::ReapByInit
        }
    }
}

#[derive(Debug)]
enum State {
    Init,
    Spawning,
    Backoff,
    ChildWrite,
    DoneParent(Pid),
    Aborted(Abort),
}

/// Why a process of the daemon lineage gave up without signaling.
#[derive(Debug)]
pub enum Abort {
    StopHandler(Errno),
    Detach(io::Error),
    Fork(Errno),
    EnterRoot(io::Error),
    Signal(io::Error),
}

/// How the daemonizer loop ended in the calling process.
#[derive(Debug)]
pub enum Exit {
    /// This process forked the next daemon and is done.
    Parent(Pid),
    /// The keep-running flag was cleared.
    Stopped,
    Aborted(Abort),
}

/// Drives one process of the daemon lineage through the detach, fork and
/// signal cycle.
///
/// Every daemon that successfully announces itself re-enters the loop and
/// becomes the intermediate parent of the next one, so a single worker yields
/// a chain of daemons, each with at most one live child.
pub struct Daemonizer<'a, R: RunControl> {
    args: &'a R,
    writer: SentinelWriter,
    wait: WaitPolicy,
    backoff: Backoff,
}

impl<'a, R: RunControl> Daemonizer<'a, R> {
    pub fn new(args: &'a R, writer: SentinelWriter, wait: WaitPolicy) -> Self {
        Self {
            args,
            writer,
            wait,
            backoff: Backoff::new(),
        }
    }

    /// Runs the full state machine, starting with session detachment.
    ///
    /// Consumes the daemonizer so the channel write end is closed on every
    /// way out.
    pub fn run(self) -> Exit {
        self.run_from(State::Init)
    }

    fn run_from(mut self, mut state: State) -> Exit {
        loop {
            state = match state {
                State::Init => match self.detach() {
                    Ok(()) => State::Spawning,
                    Err(abort) => State::Aborted(abort),
                },
                State::Spawning => {
                    if !self.args.keep_stressing_flag() {
                        return Exit::Stopped;
                    }
                    match os::fork_process() {
                        Ok(ForkResult::Child) => State::ChildWrite,
                        Ok(ForkResult::Parent { child }) => State::DoneParent(child),
                        Err(e @ (Errno::EAGAIN | Errno::ENOMEM)) => {
                            tracing::trace!(target: "debug::fork", "fork: {e}, backing off");
                            State::Backoff
                        }
                        Err(e) => State::Aborted(Abort::Fork(e)),
                    }
                }
                State::Backoff => {
                    self.args.sleep_interruptible(self.backoff.delay());
                    self.backoff.advance();
                    tracing::trace!(
                        target: "debug::backoff",
                        delay_us = self.backoff.delay_us(),
                        "next fork attempt"
                    );
                    State::Spawning
                }
                State::ChildWrite => match self.announce() {
                    Ok(()) => {
                        self.backoff.reset();
                        State::Spawning
                    }
                    Err(abort) => State::Aborted(abort),
                },
                State::DoneParent(child) => {
                    if self.wait == WaitPolicy::WaitChild {
                        os::wait_child(child);
                    }
                    return Exit::Parent(child);
                }
                State::Aborted(abort) => {
                    tracing::debug!(target: "debug::exit", ?abort, "daemon attempt abandoned");
                    return Exit::Aborted(abort);
                }
            };
        }
    }

    fn detach(&mut self) -> Result<(), Abort> {
        self.args
            .stop_on_signal(STOP_SIGNAL)
            .map_err(Abort::StopHandler)?;
        os::new_session().map_err(Abort::Detach)?;
        os::redirect_stdio_to_null().map_err(Abort::Detach)?;
        signals::reset_dispositions();
        signals::clear_signal_mask()
            .map_err(|e| Abort::Detach(io::Error::from(e)))?;
        self.args
            .stop_on_signal(STOP_SIGNAL)
            .map_err(Abort::StopHandler)?;
        os::clear_environment();
        Ok(())
    }

    fn announce(&mut self) -> Result<(), Abort> {
        os::enter_root().map_err(Abort::EnterRoot)?;
        if let Err(e) = self.args.drop_capabilities() {
            tracing::warn!(stressor = self.args.name(), "failed to drop capabilities: {e}");
        }
        self.writer.signal().map_err(Abort::Signal)
    }
}
