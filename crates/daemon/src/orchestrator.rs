// crates/daemon/src/orchestrator.rs

use std::io;

use nix::unistd::ForkResult;

use crate::channel::{self, Recv, SentinelReader};
use crate::daemonizer::{Daemonizer, Exit, STOP_SIGNAL, WaitPolicy};
use crate::error::{Result, StressError};
use crate::harness::{ProcState, RunControl};
use crate::os;

/// Stress the system by repeatedly daemonizing forked processes.
///
/// Forks one worker whose lineage keeps detaching new daemons, and counts
/// the sentinel each daemon writes until the run is told to stop or the op
/// limit of `args` is reached. In the worker this function never returns.
///
/// # Errors
///
/// Returns an error when the stop handler cannot be installed, the channel
/// cannot be created, or the worker cannot be forked for a reason other than
/// transient resource exhaustion.
pub fn stress_daemon<R: RunControl>(args: &mut R, wait: WaitPolicy) -> Result<()> {
    if let Err(errno) = args.stop_on_signal(STOP_SIGNAL) {
        args.report_failure("sigaction", errno);
        return Err(StressError::Signal {
            signal: STOP_SIGNAL,
            errno,
        });
    }

    let (reader, writer) = channel::channel().map_err(|errno| {
        args.report_failure("pipe", errno);
        StressError::Channel(errno)
    })?;

    args.set_state(ProcState::Run);
    let fork = loop {
        match os::fork_process() {
            Ok(res) => break res,
            Err(errno) if args.redo_fork(errno) => continue,
            Err(_) if !args.keep_stressing() => {
                args.set_state(ProcState::Deinit);
                return Ok(());
            }
            Err(errno) => {
                args.report_failure("fork", errno);
                return Err(StressError::Fork(errno));
            }
        }
    };

    match fork {
        ForkResult::Child => {
            drop(reader);
            args.release_for_worker();
            let exit = Daemonizer::new(&*args, writer, wait).run();
            if let Exit::Aborted(abort) = &exit {
                tracing::debug!(target: "debug::exit", ?abort, "worker lineage ended");
            }
            os::exit_now(0)
        }
        ForkResult::Parent { child } => {
            drop(writer);
            tracing::debug!(target: "debug::fork", %child, "worker started");
            count_sentinels(args, reader);
            if wait == WaitPolicy::WaitChild {
                os::wait_child(child);
            }
        }
    }

    args.set_state(ProcState::Deinit);
    Ok(())
}

/// Consumes sentinels until the channel closes or the run should stop.
///
/// The reader is dropped on return, so daemons still trying to announce
/// themselves fail with `EPIPE` instead of blocking forever.
fn count_sentinels<R: RunControl>(args: &mut R, mut reader: SentinelReader) {
    loop {
        match reader.recv() {
            Ok(Recv::Sentinel) => args.inc_counter(),
            Ok(Recv::Malformed(byte)) => {
                tracing::debug!(target: "debug::channel", byte, "ignoring malformed sentinel");
            }
            Ok(Recv::Closed) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                tracing::debug!(
                    target: "debug::channel",
                    "{}: read failed: errno={} ({e})",
                    args.name(),
                    e.raw_os_error().unwrap_or(0)
                );
                break;
            }
        }
        if !args.keep_stressing() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals;
    use nix::errno::Errno;
    use nix::sys::signal::Signal;
    use serial_test::serial;
    use std::cell::RefCell;
    use std::time::{Duration, Instant};

    struct Recorder {
        counter: u64,
        max_ops: u64,
        failures: RefCell<Vec<(String, Errno)>>,
        states: RefCell<Vec<ProcState>>,
    }

    impl Recorder {
        fn new(max_ops: u64) -> Self {
            Self {
                counter: 0,
                max_ops,
                failures: RefCell::new(Vec::new()),
                states: RefCell::new(Vec::new()),
            }
        }
    }

    impl RunControl for Recorder {
        fn name(&self) -> &str {
            "daemon"
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

        fn report_failure(&self, what: &str, err: Errno) {
            self.failures.borrow_mut().push((what.to_string(), err));
        }

        fn set_state(&self, state: ProcState) {
            self.states.borrow_mut().push(state);
        }
    }

    #[test]
    #[serial]
    fn channel_failure_is_fatal_and_forks_nothing() {
        signals::reset_stop_flag();
        os::clear_mocks();
        os::mock_forks([Ok(ForkResult::Child)]);
        channel::mock_pipe_failure(Errno::EMFILE);
        let mut rec = Recorder::new(3);
        let err = stress_daemon(&mut rec, WaitPolicy::ReapByInit).unwrap_err();
        assert_eq!(err, StressError::Channel(Errno::EMFILE));
        assert_eq!(rec.counter(), 0);
        assert_eq!(os::mocked_forks_left(), 1);
        assert_eq!(*rec.failures.borrow(), vec![("pipe".to_string(), Errno::EMFILE)]);
        assert!(rec.states.borrow().is_empty());
        os::clear_mocks();
    }

    #[test]
    #[serial]
    fn unrecoverable_fork_failure_is_fatal() {
        signals::reset_stop_flag();
        os::clear_mocks();
        os::mock_forks([Err(Errno::EPERM)]);
        let mut rec = Recorder::new(3);
        let err = stress_daemon(&mut rec, WaitPolicy::ReapByInit).unwrap_err();
        assert_eq!(err, StressError::Fork(Errno::EPERM));
        assert_eq!(err.errno(), Errno::EPERM);
        assert_eq!(*rec.failures.borrow(), vec![("fork".to_string(), Errno::EPERM)]);
        assert_eq!(*rec.states.borrow(), vec![ProcState::Run]);
    }

    #[test]
    #[serial]
    fn fork_failure_after_stop_is_not_an_error() {
        signals::reset_stop_flag();
        os::clear_mocks();
        os::mock_forks([Err(Errno::EAGAIN), Err(Errno::EPERM)]);
        let mut rec = Recorder::new(0);
        signals::request_stop();
        let res = stress_daemon(&mut rec, WaitPolicy::ReapByInit);
        signals::reset_stop_flag();
        assert!(res.is_ok());
        assert!(rec.failures.borrow().is_empty());
        assert_eq!(os::mocked_forks_left(), 1);
        assert_eq!(*rec.states.borrow(), vec![ProcState::Run, ProcState::Deinit]);
        os::clear_mocks();
    }

    #[test]
    #[serial]
    fn counting_stops_at_limit() {
        signals::reset_stop_flag();
        let (reader, mut writer) = channel::channel().unwrap();
        for _ in 0..6 {
            writer.signal().unwrap();
        }
        let mut rec = Recorder::new(4);
        count_sentinels(&mut rec, reader);
        assert_eq!(rec.counter(), 4);
    }

    #[test]
    #[serial]
    fn counting_ends_when_channel_closes() {
        signals::reset_stop_flag();
        let (reader, mut writer) = channel::channel().unwrap();
        writer.signal().unwrap();
        drop(writer);
        let mut rec = Recorder::new(10);
        count_sentinels(&mut rec, reader);
        assert_eq!(rec.counter(), 1);
    }

    #[test]
    #[serial]
    fn interrupted_read_resumes_while_running() {
        signals::reset_stop_flag();
        let (reader, mut writer) = channel::channel().unwrap();
        let before = signals::interrupts();
        let kicker = signals::interrupt_after(Signal::SIGUSR1, Duration::from_millis(100));
        let feeder = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            for _ in 0..3 {
                writer.signal().unwrap();
            }
        });
        let mut rec = Recorder::new(10);
        count_sentinels(&mut rec, reader);
        kicker.join().unwrap();
        feeder.join().unwrap();
        assert!(signals::interrupts() > before);
        assert_eq!(rec.counter(), 3);
    }

    #[test]
    #[serial]
    fn stop_signal_ends_a_blocked_read() {
        signals::reset_stop_flag();
        signals::stop_on_signal(Signal::SIGUSR2).unwrap();
        let (reader, writer) = channel::channel().unwrap();
        let kicker = signals::interrupt_after(Signal::SIGUSR2, Duration::from_millis(100));
        let mut rec = Recorder::new(0);
        let start = Instant::now();
        count_sentinels(&mut rec, reader);
        kicker.join().unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(rec.counter(), 0);
        drop(writer);
        signals::reset_stop_flag();
    }
}
