// crates/logging/src/lib.rs

use std::fs::OpenOptions;
use std::io;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{
    EnvFilter, fmt as tracing_fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

mod flags;
mod formatter;
mod json_format;
mod sink;
#[cfg(all(unix, feature = "syslog"))]
mod syslog;

pub use flags::{
    DebugFlag, InfoFlag, LogFormat, StderrMode, SubscriberConfig, SubscriberConfigBuilder,
};
pub use formatter::{PROGRAM, StressFormatter};
pub use json_format::JsonFormatter;

use crate::sink::{FileWriter, LogWriter};

/// Environment variable naming the syslog datagram socket, `/dev/log` when unset.
pub const SYSLOG_PATH_ENV: &str = "STRESS_DAEMON_SYSLOG_PATH";

fn directive(target: &str, level: &str) -> io::Result<Directive> {
    format!("{target}={level}")
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

/// Console level for a verbosity count, before flags raise it.
pub fn base_level(quiet: bool, verbose: u8) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    }
}

/// Builds the subscriber described by `cfg` without installing it.
///
/// # Errors
///
/// Fails when the log file cannot be opened for appending or a flag
/// directive is rejected by the filter parser.
pub fn subscriber(cfg: SubscriberConfig) -> io::Result<Box<dyn tracing::Subscriber + Send + Sync>> {
    let SubscriberConfig {
        format,
        verbose,
        info,
        debug,
        quiet,
        stderr,
        log_file,
        syslog,
        colored,
        timestamps,
    } = cfg;
    let mut level = base_level(quiet, verbose);
    if !quiet {
        if !debug.is_empty() && level < LevelFilter::DEBUG {
            level = LevelFilter::DEBUG;
        } else if !info.is_empty() && level < LevelFilter::INFO {
            level = LevelFilter::INFO;
        }
    }
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    if !quiet {
        for flag in &info {
            filter = filter.add_directive(directive(flag.target(), "info")?);
        }
        for flag in &debug {
            filter = filter.add_directive(directive(flag.target(), "trace")?);
        }
    }

    let base = tracing_fmt::layer()
        .with_writer(LogWriter { mode: stderr })
        .with_target(false)
        .with_level(false)
        .with_ansi(colored);
    let fmt_layer = match (format, timestamps) {
        (LogFormat::Json, _) => base.event_format(JsonFormatter).boxed(),
        (LogFormat::Text, true) => base
            .event_format(StressFormatter::new(Some("%t [%p] %n: %l: %m".into())))
            .boxed(),
        (LogFormat::Text, false) => base.event_format(StressFormatter::new(None)).boxed(),
    };

    #[cfg(all(unix, feature = "syslog"))]
    let syslog_layer = if syslog {
        syslog::SyslogLayer::connect().ok()
    } else {
        None
    };
    #[cfg(not(all(unix, feature = "syslog")))]
    let syslog_layer: Option<tracing_subscriber::layer::Identity> = {
        let _ = syslog;
        None
    };

    let file_layer = match log_file {
        Some((path, fmt)) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let base = tracing_fmt::layer()
                .with_writer(FileWriter { file })
                .with_ansi(false);
            Some(match fmt.as_deref() {
                Some("json") => base.event_format(JsonFormatter).boxed(),
                Some(template) => base
                    .event_format(StressFormatter::new(Some(template.to_string())))
                    .boxed(),
                None => base.event_format(StressFormatter::new(None)).boxed(),
            })
        }
        None => None,
    };

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(syslog_layer)
        .with(file_layer);
    Ok(Box::new(registry))
}

/// Installs the subscriber described by `cfg` as the global default.
///
/// # Errors
///
/// See [`subscriber`]. Installing twice is also an error.
pub fn init(cfg: SubscriberConfig) -> io::Result<()> {
    subscriber(cfg)?
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}
