// crates/daemon/src/summary.rs

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::info::PROGRAM;

/// What one instance reported back to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstanceReport {
    pub instance: u32,
    pub ops: u64,
    pub ok: bool,
}

/// Aggregated outcome of a run across all instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub stressor: &'static str,
    pub instances: Vec<InstanceReport>,
    pub bogo_ops: u64,
    pub failed: u32,
    pub wall_secs: f64,
    pub ops_per_sec: f64,
}

impl RunSummary {
    pub fn new(stressor: &'static str, instances: Vec<InstanceReport>, wall: Duration) -> Self {
        let bogo_ops = instances.iter().map(|r| r.ops).sum();
        let failed = instances.iter().filter(|r| !r.ok).count() as u32;
        let wall_secs = wall.as_secs_f64();
        let ops_per_sec = if wall_secs > 0.0 {
            bogo_ops as f64 / wall_secs
        } else {
            0.0
        };
        Self {
            stressor,
            instances,
            bogo_ops,
            failed,
            wall_secs,
            ops_per_sec,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PROGRAM}: {}: {} bogo ops in {:.2}s ({:.2} ops/s)",
            self.stressor, self.bogo_ops, self.wall_secs, self.ops_per_sec
        )
    }
}
