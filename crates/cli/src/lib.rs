// crates/cli/src/lib.rs

use clap::{ArgMatches, FromArgMatches};

pub mod config;
pub mod error;
pub mod exit_code;
pub mod options;
mod print;
mod run;

pub use config::{StressConfig, StressConfigBuilder};
pub use error::CliError;
pub use exit_code::{ExitCode, exit_code_from_error_kind};
pub use options::{StressOpts, SummaryFormat, cli_command};
pub use print::handle_clap_error;
pub use run::run_with_config;

/// Runs the tool for already parsed command line `matches`.
///
/// # Errors
///
/// See [`CliError`]; each variant maps to an exit status through
/// [`CliError::exit_code`].
pub fn run(matches: &ArgMatches) -> Result<ExitCode, CliError> {
    let opts = StressOpts::from_arg_matches(matches)?;
    if opts.list_stressors {
        print::print_stressors();
        return Ok(ExitCode::Ok);
    }
    let cfg = StressConfig::from(&opts);
    let summary = run_with_config(&cfg)?;
    print::print_summary(&summary, cfg.summary)?;
    if summary.success() {
        Ok(ExitCode::Ok)
    } else {
        Ok(ExitCode::InstanceFailed)
    }
}
