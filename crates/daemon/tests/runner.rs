// crates/daemon/tests/runner.rs
use std::time::{Duration, Instant};

use daemon::{RunnerOptions, WaitPolicy, run_instances};
use serial_test::serial;

#[test]
#[serial]
fn op_limit_is_shared_across_instances() {
    let opts = RunnerOptions {
        instances: 2,
        ops: 5,
        wait: WaitPolicy::WaitChild,
        timeout: None,
    };
    let summary = run_instances(&opts).unwrap();
    assert!(summary.success(), "{summary:?}");
    assert_eq!(summary.bogo_ops, 5);
    let ops: Vec<u64> = summary.instances.iter().map(|r| r.ops).collect();
    assert_eq!(ops, vec![3, 2]);
}

#[test]
#[serial]
fn instances_without_a_share_are_not_started() {
    let opts = RunnerOptions {
        instances: 4,
        ops: 2,
        wait: WaitPolicy::ReapByInit,
        timeout: None,
    };
    let summary = run_instances(&opts).unwrap();
    assert_eq!(summary.instances.len(), 2);
    assert_eq!(summary.bogo_ops, 2);
    assert_eq!(summary.failed, 0);
}

#[test]
#[serial]
fn timeout_ends_an_unlimited_run() {
    let opts = RunnerOptions {
        instances: 1,
        ops: 0,
        wait: WaitPolicy::ReapByInit,
        timeout: Some(Duration::from_secs(1)),
    };
    let start = Instant::now();
    let summary = run_instances(&opts).unwrap();
    assert!(start.elapsed() < Duration::from_secs(30));
    assert!(summary.success(), "{summary:?}");
    assert!(summary.bogo_ops > 0);
    assert!(summary.wall_secs >= 1.0);
    assert!(summary.to_string().starts_with("stress-daemon: daemon: "));
}
