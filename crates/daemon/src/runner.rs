// crates/daemon/src/runner.rs

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::OwnedFd;
use std::thread::available_parallelism;
use std::time::{Duration, Instant};

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::{ForkResult, Pid, alarm, pipe};

use crate::daemonizer::{STOP_SIGNAL, WaitPolicy};
use crate::harness::{ProcState, RunControl, StressArgs};
use crate::info::STRESS_DAEMON_INFO;
use crate::orchestrator::stress_daemon;
use crate::summary::{InstanceReport, RunSummary};
use crate::{os, signals};

/// How the harness runs the stressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunnerOptions {
    /// Number of instances, `0` for one per online CPU.
    pub instances: u32,
    /// Total op limit shared by all instances, `0` for none.
    pub ops: u64,
    pub wait: WaitPolicy,
    pub timeout: Option<Duration>,
}

/// Resolves `0` to the number of CPUs the process may run on.
pub fn resolve_instances(instances: u32) -> u32 {
    if instances > 0 {
        return instances;
    }
    available_parallelism()
        .map(|n| u32::try_from(n.get()).unwrap_or(u32::MAX))
        .unwrap_or(1)
}

/// Splits `total` ops over `n` instances, handing the remainder to the
/// first ones. With `total == 0` every instance is unlimited.
pub fn split_ops(total: u64, n: u32) -> Vec<u64> {
    if n == 0 {
        return Vec::new();
    }
    let n64 = u64::from(n);
    let (share, extra) = (total / n64, total % n64);
    (0..n64)
        .map(|i| if i < extra { share + 1 } else { share })
        .collect()
}

struct Running {
    instance: u32,
    pid: Pid,
    result: OwnedFd,
}

/// Forks every instance, waits for all of them and aggregates their op
/// counters.
///
/// `SIGINT` in the calling process only asks the run to stop; the runner
/// keeps collecting results so an interrupted run still reports.
///
/// # Errors
///
/// Fails when the interrupt handler cannot be installed or a result pipe
/// cannot be created. A failed fork only marks that instance as failed.
pub fn run_instances(opts: &RunnerOptions) -> io::Result<RunSummary> {
    signals::reset_stop_flag();
    signals::stop_on_signal(Signal::SIGINT)?;

    let n = resolve_instances(opts.instances);
    let shares = split_ops(opts.ops, n);
    tracing::info!(
        target: "info::instance",
        stressor = STRESS_DAEMON_INFO.name,
        instances = n,
        ops = opts.ops,
        "dispatching instances"
    );

    let started = Instant::now();
    let mut running = Vec::with_capacity(shares.len());
    let mut reports = Vec::with_capacity(shares.len());
    for (instance, &share) in (0u32..).zip(shares.iter()) {
        if opts.ops > 0 && share == 0 {
            tracing::debug!(target: "info::instance", instance, "no ops left, not started");
            continue;
        }
        let (rd, wr) = pipe()?;
        match os::fork_process() {
            Ok(ForkResult::Child) => {
                drop(rd);
                os::exit_now(run_instance(instance, share, opts, wr))
            }
            Ok(ForkResult::Parent { child }) => {
                tracing::debug!(target: "debug::fork", instance, pid = %child, "instance started");
                running.push(Running {
                    instance,
                    pid: child,
                    result: rd,
                });
            }
            Err(errno) => {
                tracing::error!(
                    stressor = STRESS_DAEMON_INFO.name,
                    instance,
                    "cannot fork instance: errno={} ({})",
                    errno as i32,
                    errno.desc()
                );
                reports.push(InstanceReport {
                    instance,
                    ops: 0,
                    ok: false,
                });
            }
        }
    }

    for child in running {
        reports.push(collect(child));
    }
    reports.sort_by_key(|r| r.instance);
    let summary = RunSummary::new(STRESS_DAEMON_INFO.name, reports, started.elapsed());
    tracing::info!(
        target: "info::metrics",
        stressor = summary.stressor,
        ops = summary.bogo_ops,
        failed = summary.failed,
        wall_secs = summary.wall_secs,
        "run complete"
    );
    Ok(summary)
}

fn collect(child: Running) -> InstanceReport {
    let mut buf = [0u8; 8];
    let ops = match File::from(child.result).read_exact(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            tracing::debug!(target: "debug::channel", instance = child.instance, "result read failed: {e}");
            0
        }
    };
    let status = os::wait_child(child.pid);
    let ok = matches!(status, Some(WaitStatus::Exited(_, 0)));
    if !ok {
        tracing::warn!(
            stressor = STRESS_DAEMON_INFO.name,
            instance = child.instance,
            ?status,
            "instance failed"
        );
    }
    tracing::info!(target: "info::metrics", instance = child.instance, ops, "instance report");
    InstanceReport {
        instance: child.instance,
        ops,
        ok,
    }
}

/// Body of a forked instance; the return value is its exit status.
///
/// The result pipe travels inside the run control, which releases it in the
/// worker so no daemon of the lineage holds it open.
fn run_instance(instance: u32, max_ops: u64, opts: &RunnerOptions, result: OwnedFd) -> i32 {
    let mut args =
        StressArgs::new(STRESS_DAEMON_INFO.name, instance, max_ops).with_report(File::from(result));
    args.set_state(ProcState::Init);
    for sig in [Signal::SIGINT, STOP_SIGNAL] {
        if let Err(errno) = args.stop_on_signal(sig) {
            args.report_failure("sigaction", errno);
            return 1;
        }
    }
    if let Some(timeout) = opts.timeout {
        let secs = u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX).max(1);
        alarm::set(secs);
    }
    let res = stress_daemon(&mut args, opts.wait);
    alarm::cancel();
    let written = args.report_counter();
    match (res, written) {
        (Ok(()), Ok(())) => 0,
        (Err(e), _) => {
            tracing::debug!(target: "debug::exit", instance, "instance aborted: {e}");
            1
        }
        (_, Err(e)) => {
            tracing::debug!(target: "debug::exit", instance, "cannot report ops: {e}");
            1
        }
    }
}
