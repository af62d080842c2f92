// crates/daemon/src/harness.rs

use std::fs::File;
use std::io::{self, Write};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::Signal;

use crate::{os, privileges, signals};

/// Lifecycle of a stressor instance, reported for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    Init,
    Run,
    Deinit,
}

/// Everything the stressor needs from the process that drives it.
///
/// The provided methods are backed by the process-wide stop flag and the
/// host primitives in this crate; embedders and tests override them.
pub trait RunControl {
    /// Stable name used in diagnostics.
    fn name(&self) -> &str;

    /// Number of completed operations so far.
    fn counter(&self) -> u64;

    fn inc_counter(&mut self);

    /// Whether the run should continue: no stop request and the op limit
    /// not yet reached.
    fn keep_stressing(&self) -> bool;

    /// Whether no stop request has arrived, ignoring the op limit.
    fn keep_stressing_flag(&self) -> bool {
        signals::keep_stressing_flag()
    }

    fn stop_on_signal(&self, sig: Signal) -> nix::Result<()> {
        signals::stop_on_signal(sig)
    }

    fn sleep_interruptible(&self, dur: Duration) {
        if self.keep_stressing_flag() {
            os::sleep_interruptible(dur);
        }
    }

    fn drop_capabilities(&self) -> io::Result<()> {
        privileges::drop_capabilities()
    }

    /// Whether a failed fork is worth another immediate attempt.
    fn redo_fork(&self, err: Errno) -> bool {
        if self.keep_stressing_flag() && matches!(err, Errno::EAGAIN | Errno::EINTR | Errno::ENOMEM)
        {
            std::thread::yield_now();
            return true;
        }
        false
    }

    fn report_failure(&self, what: &str, err: Errno) {
        tracing::error!(
            stressor = self.name(),
            errno = err as i32,
            "{}: {what} failed, errno={} ({})",
            self.name(),
            err as i32,
            err.desc()
        );
    }

    fn set_state(&self, state: ProcState) {
        tracing::debug!(stressor = self.name(), ?state, "state change");
    }

    /// Closes harness resources the worker lineage must not inherit.
    ///
    /// Called in the worker right after it is forked, before any daemon
    /// is detached.
    fn release_for_worker(&mut self) {}
}

/// Run control for one stressor instance of the bundled harness.
#[derive(Debug)]
pub struct StressArgs {
    name: String,
    instance: u32,
    max_ops: u64,
    counter: u64,
    report: Option<File>,
}

impl StressArgs {
    /// `max_ops == 0` means no op limit.
    pub fn new(name: impl Into<String>, instance: u32, max_ops: u64) -> Self {
        Self {
            name: name.into(),
            instance,
            max_ops,
            counter: 0,
            report: None,
        }
    }

    /// Sends the final counter to `report` once the run is over.
    pub fn with_report(mut self, report: File) -> Self {
        self.report = Some(report);
        self
    }

    /// Writes the counter as 8 little-endian bytes and closes the report.
    ///
    /// Does nothing when no report is attached or it was already released.
    pub fn report_counter(&mut self) -> io::Result<()> {
        let Some(mut report) = self.report.take() else {
            return Ok(());
        };
        tracing::debug!(
            target: "debug::channel",
            instance = self.instance,
            ops = self.counter,
            "reporting ops"
        );
        report.write_all(&self.counter.to_le_bytes())
    }
}

impl RunControl for StressArgs {
    fn name(&self) -> &str {
        &self.name
    }

    fn counter(&self) -> u64 {
        self.counter
    }

    fn inc_counter(&mut self) {
        self.counter += 1;
    }

    fn keep_stressing(&self) -> bool {
        self.keep_stressing_flag() && (self.max_ops == 0 || self.counter < self.max_ops)
    }

    fn release_for_worker(&mut self) {
        self.report = None;
    }
}
