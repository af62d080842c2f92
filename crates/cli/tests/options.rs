// crates/cli/tests/options.rs
use std::path::PathBuf;
use std::time::Duration;

use clap::FromArgMatches;
use daemon::WaitPolicy;
use logging::{DebugFlag, InfoFlag, LogFormat};
use stress_daemon_cli::{StressConfig, StressOpts, SummaryFormat, cli_command};

fn config_for(args: &[&str]) -> StressConfig {
    let matches = cli_command().try_get_matches_from(args).unwrap();
    let opts = StressOpts::from_arg_matches(&matches).unwrap();
    StressConfig::from(&opts)
}

#[test]
fn defaults() {
    let cfg = config_for(&["stress-daemon"]);
    assert_eq!(cfg.instances, 1);
    assert_eq!(cfg.ops, 0);
    assert_eq!(cfg.wait, WaitPolicy::ReapByInit);
    assert_eq!(cfg.timeout, None);
    assert_eq!(cfg.summary, SummaryFormat::Text);
    assert_eq!(cfg.log_format, LogFormat::Text);
    assert!(cfg.colored);
    assert!(cfg.log_file.is_none());
}

#[test]
fn stressor_options() {
    let cfg = config_for(&[
        "stress-daemon",
        "--daemon",
        "4",
        "--daemon-ops",
        "1000",
        "--daemon-wait",
        "-t",
        "2m",
    ]);
    assert_eq!(cfg.instances, 4);
    assert_eq!(cfg.ops, 1000);
    assert_eq!(cfg.wait, WaitPolicy::WaitChild);
    assert_eq!(cfg.timeout, Some(Duration::from_secs(120)));
    let runner = cfg.runner_options();
    assert_eq!(runner.instances, 4);
    assert_eq!(runner.ops, 1000);
}

#[test]
fn zero_timeout_means_none() {
    let cfg = config_for(&["stress-daemon", "--timeout", "0"]);
    assert_eq!(cfg.timeout, None);
}

#[test]
fn logging_options() {
    let cfg = config_for(&[
        "stress-daemon",
        "-vv",
        "--log-format=json",
        "--log-file",
        "run.log",
        "--log-file-format",
        "%n %m",
        "--info=metrics",
        "--debug=fork,backoff",
        "--no-color",
        "--summary",
        "none",
    ]);
    assert_eq!(cfg.verbose, 2);
    assert_eq!(cfg.log_format, LogFormat::Json);
    assert_eq!(
        cfg.log_file,
        Some((PathBuf::from("run.log"), Some("%n %m".to_string())))
    );
    assert_eq!(cfg.info, vec![InfoFlag::Metrics]);
    assert_eq!(cfg.debug, vec![DebugFlag::Fork, DebugFlag::Backoff]);
    assert!(!cfg.colored);
    assert_eq!(cfg.summary, SummaryFormat::None);

    let sub = cfg.subscriber_config();
    assert_eq!(sub.verbose, 2);
    assert_eq!(sub.debug, vec![DebugFlag::Fork, DebugFlag::Backoff]);
    assert!(!sub.colored);
}

#[test]
fn log_file_format_requires_log_file() {
    let err = cli_command()
        .try_get_matches_from(["stress-daemon", "--log-file-format", "json"])
        .unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn unknown_debug_flag_is_rejected() {
    let err = cli_command()
        .try_get_matches_from(["stress-daemon", "--debug=acl"])
        .unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
}

#[test]
fn builder_matches_parsed_config() {
    let built = StressConfig::builder()
        .instances(2)
        .ops(10)
        .wait(WaitPolicy::WaitChild)
        .timeout(Some(Duration::from_secs(5)))
        .build();
    let parsed = config_for(&[
        "stress-daemon",
        "--daemon=2",
        "--daemon-ops=10",
        "--daemon-wait",
        "--timeout=5",
    ]);
    assert_eq!(built.runner_options(), parsed.runner_options());
}
