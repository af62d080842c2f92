// crates/daemon/src/lib.rs

pub mod backoff;
pub mod channel;
pub mod daemonizer;
pub mod error;
pub mod harness;
pub mod info;
pub mod orchestrator;
pub mod os;
pub mod privileges;
pub mod runner;
pub mod signals;
pub mod summary;

pub use backoff::{Backoff, next_delay};
pub use daemonizer::{STOP_SIGNAL, WaitPolicy};
pub use error::{Result, StressError};
pub use harness::{ProcState, RunControl, StressArgs};
pub use info::{Class, PROGRAM, STRESS_DAEMON_INFO, StressorInfo};
pub use orchestrator::stress_daemon;
pub use runner::{RunnerOptions, run_instances, split_ops};
pub use summary::{InstanceReport, RunSummary};
