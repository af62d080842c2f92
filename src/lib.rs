// src/lib.rs

pub use daemon::{
    InstanceReport, RunControl, RunSummary, RunnerOptions, STRESS_DAEMON_INFO, StressArgs,
    StressError, WaitPolicy, run_instances, stress_daemon,
};
pub use stress_daemon_cli::{StressConfig, StressConfigBuilder, SummaryFormat};

/// Runs the daemon stressor with `cfg` and returns the aggregated result.
///
/// Each instance is a forked process; the call returns once every instance
/// has reported back.
///
/// # Errors
///
/// Fails when logging cannot be set up or no instance can be started.
///
/// # Examples
///
/// ```no_run
/// use stress_daemon::{StressConfig, run};
///
/// let cfg = StressConfig::builder().instances(2).ops(100).build();
/// let summary = run(&cfg).unwrap();
/// assert_eq!(summary.bogo_ops, 100);
/// ```
pub fn run(cfg: &StressConfig) -> Result<RunSummary, stress_daemon_cli::CliError> {
    stress_daemon_cli::run_with_config(cfg)
}
