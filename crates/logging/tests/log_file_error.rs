// crates/logging/tests/log_file_error.rs
use std::io::ErrorKind;

use logging::{SubscriberConfig, subscriber};
use tempfile::tempdir;

#[test]
fn directory_as_log_file_is_rejected() {
    let dir = tempdir().unwrap();
    let cfg = SubscriberConfig::builder()
        .log_file(Some((dir.path().to_path_buf(), Some("%n %m".into()))))
        .build();
    assert!(subscriber(cfg).is_err());
}

#[test]
fn log_file_in_missing_directory_is_not_created() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runs").join("daemon.log");
    let cfg = SubscriberConfig::builder()
        .log_file(Some((path.clone(), Some("json".into()))))
        .build();
    let err = subscriber(cfg).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!path.exists());
}
