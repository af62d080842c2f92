// crates/cli/src/run.rs

use daemon::{RunSummary, run_instances};
use logging::subscriber;
use tracing::subscriber::with_default;

use crate::config::StressConfig;
use crate::error::CliError;

/// Runs the stressor as described by `cfg` under its own log subscriber.
///
/// # Errors
///
/// Fails when the log subscriber cannot be built or the instances cannot
/// be started. Instances that fail on their own are reported in the
/// returned summary instead.
pub fn run_with_config(cfg: &StressConfig) -> Result<RunSummary, CliError> {
    let sub = subscriber(cfg.subscriber_config()).map_err(CliError::Logging)?;
    with_default(sub, || {
        run_instances(&cfg.runner_options()).map_err(|e| {
            tracing::error!("cannot start instances: {e}");
            CliError::Setup(e)
        })
    })
}
