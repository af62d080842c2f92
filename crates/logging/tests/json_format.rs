// crates/logging/tests/json_format.rs
use logging::{InfoFlag, LogFormat, SubscriberConfig, subscriber};
use serde_json::Value;
use std::fs;
use tempfile::tempdir;
use tracing::subscriber::with_default;

fn json_lines(emit: impl FnOnce()) -> Vec<Value> {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metrics.json");
    let cfg = SubscriberConfig::builder()
        .format(LogFormat::Json)
        .info([InfoFlag::Metrics])
        .log_file(Some((path.clone(), Some("json".to_string()))))
        .build();
    with_default(subscriber(cfg).unwrap(), emit);
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn instance_report_keys_are_top_level() {
    let lines = json_lines(|| {
        tracing::info!(target: "info::metrics", stressor = "daemon", instance = 1, ops = 42, "instance report");
    });
    assert_eq!(lines.len(), 1);
    let v = &lines[0];
    assert_eq!(v["target"], "info::metrics");
    assert_eq!(v["level"], "INFO");
    assert_eq!(v["stressor"], "daemon");
    assert_eq!(v["instance"], 1);
    assert_eq!(v["ops"], 42);
    assert_eq!(v["msg"], "instance report");
    assert_eq!(v["pid"], std::process::id());
    assert!(v.get("fields").is_none());
    assert!(v["ts"].as_str().is_some_and(|ts| ts.contains('T')));
}

#[test]
fn other_fields_stay_nested() {
    let lines = json_lines(|| {
        tracing::info!(
            target: "info::metrics",
            stressor = "daemon",
            ops = 5,
            failed = 0,
            wall_secs = 1.5,
            "run complete"
        );
    });
    let v = &lines[0];
    assert_eq!(v["ops"], 5);
    assert_eq!(v["fields"]["failed"], 0);
    assert_eq!(v["fields"]["wall_secs"], 1.5);
    assert!(v["fields"].get("ops").is_none());
}
