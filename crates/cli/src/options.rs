// crates/cli/src/options.rs

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use daemon::PROGRAM;
use daemon::info::{DAEMON_HELP, DAEMON_OPS_HELP, DAEMON_WAIT_HELP};
use logging::{DebugFlag, InfoFlag, LogFormat};

/// How the end-of-run summary is printed on stdout.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum SummaryFormat {
    #[default]
    Text,
    Json,
    None,
}

#[derive(Parser, Debug)]
#[command(
    name = PROGRAM,
    version,
    about = "Stress process creation by repeatedly forking and detaching daemons"
)]
pub struct StressOpts {
    #[arg(long, value_name = "N", default_value_t = 1, help = DAEMON_HELP, help_heading = "Stressor")]
    pub daemon: u32,
    #[arg(
        long = "daemon-ops",
        value_name = "N",
        default_value_t = 0,
        help = DAEMON_OPS_HELP,
        help_heading = "Stressor"
    )]
    pub daemon_ops: u64,
    #[arg(long = "daemon-wait", help = DAEMON_WAIT_HELP, help_heading = "Stressor")]
    pub daemon_wait: bool,
    #[arg(
        short = 't',
        long,
        value_name = "T",
        value_parser = parse_timeout,
        help = "stop after T seconds (suffixes s, m, h, d)",
        help_heading = "Stressor"
    )]
    pub timeout: Option<Duration>,
    #[arg(
        long = "list-stressors",
        help = "describe the stressor and exit",
        help_heading = "Stressor"
    )]
    pub list_stressors: bool,
    #[arg(short, long, action = ArgAction::Count, help_heading = "Output")]
    pub verbose: u8,
    #[arg(short, long, help_heading = "Output")]
    pub quiet: bool,
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "text",
        value_name = "FMT",
        help_heading = "Output"
    )]
    pub log_format: LogFormat,
    #[arg(long = "log-file", value_name = "FILE", help_heading = "Output")]
    pub log_file: Option<PathBuf>,
    #[arg(
        long = "log-file-format",
        value_name = "FMT",
        requires = "log_file",
        help = "json, or a template using %t %p %l %n %m %o",
        help_heading = "Output"
    )]
    pub log_file_format: Option<String>,
    #[arg(
        long,
        value_name = "FLAGS",
        value_delimiter = ',',
        value_enum,
        help_heading = "Output"
    )]
    pub info: Vec<InfoFlag>,
    #[arg(
        long,
        value_name = "FLAGS",
        value_delimiter = ',',
        value_enum,
        help_heading = "Output"
    )]
    pub debug: Vec<DebugFlag>,
    #[arg(long, help_heading = "Output")]
    pub syslog: bool,
    #[arg(long = "no-color", help_heading = "Output")]
    pub no_color: bool,
    #[arg(long, help = "prefix console lines with time and pid", help_heading = "Output")]
    pub timestamps: bool,
    #[arg(
        long,
        value_enum,
        default_value = "text",
        value_name = "FMT",
        help_heading = "Output"
    )]
    pub summary: SummaryFormat,
}

/// Parses a run time in seconds with an optional `s`, `m`, `h` or `d` unit.
pub(crate) fn parse_timeout(s: &str) -> Result<Duration, String> {
    let (digits, scale) = match s.char_indices().last() {
        Some((i, 's')) => (&s[..i], 1),
        Some((i, 'm')) => (&s[..i], 60),
        Some((i, 'h')) => (&s[..i], 3600),
        Some((i, 'd')) => (&s[..i], 86_400),
        _ => (s, 1),
    };
    let n: u64 = digits
        .parse()
        .map_err(|e| format!("invalid timeout '{s}': {e}"))?;
    n.checked_mul(scale)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("timeout '{s}' is too large"))
}

pub fn cli_command() -> clap::Command {
    StressOpts::command()
}
