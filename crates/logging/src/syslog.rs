// crates/logging/src/syslog.rs

use std::fmt::{self, Write as _};
use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::PathBuf;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::SYSLOG_PATH_ENV;
use crate::formatter::PROGRAM;

const LOG_USER: u8 = 1 << 3;

/// Syslog severity for a tracing level (RFC 5424 numbering).
fn severity(level: Level) -> u8 {
    match level {
        Level::ERROR => 3,
        Level::WARN => 4,
        Level::INFO => 6,
        Level::DEBUG | Level::TRACE => 7,
    }
}

/// Event fields split into the parts of a syslog line.
#[derive(Debug, Default)]
struct Record {
    stressor: Option<String>,
    message: String,
    extra: String,
}

impl Record {
    fn field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        let _ = match name {
            "message" => self.message.write_fmt(value),
            "stressor" => {
                self.stressor = Some(value.to_string());
                Ok(())
            }
            _ => write!(self.extra, " {name}={value}"),
        };
    }

    /// `<pri>stress-daemon[pid]: stressor: message key=value...`
    fn line(&self, level: Level, target: &str, pid: u32) -> String {
        let mut line = format!("<{}>{PROGRAM}[{pid}]: ", LOG_USER + severity(level));
        if let Some(stressor) = &self.stressor {
            line.push_str(stressor);
            line.push_str(": ");
        }
        if self.message.is_empty() {
            line.push_str(target);
        } else {
            line.push_str(&self.message);
        }
        line.push_str(&self.extra);
        line
    }
}

impl Visit for Record {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.field(field.name(), format_args!("{value}"));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.field(field.name(), format_args!("{value:?}"));
    }
}

/// Sends every event as one datagram to the local syslog socket.
pub(crate) struct SyslogLayer {
    sock: UnixDatagram,
}

impl SyslogLayer {
    /// Connects to [`SYSLOG_PATH_ENV`] or `/dev/log`.
    pub(crate) fn connect() -> io::Result<Self> {
        let path = std::env::var_os(SYSLOG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/dev/log"));
        let sock = UnixDatagram::unbound()?;
        sock.connect(path)?;
        Ok(Self { sock })
    }
}

impl<S: Subscriber> Layer<S> for SyslogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut record = Record::default();
        event.record(&mut record);
        let meta = event.metadata();
        let line = record.line(*meta.level(), meta.target(), std::process::id());
        // A full or vanished syslog socket drops the line.
        let _ = self.sock.send(line.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stressor_prefixes_the_message() {
        let record = Record {
            stressor: Some("daemon".into()),
            message: "cannot fork instance".into(),
            extra: " instance=1".into(),
        };
        assert_eq!(
            record.line(Level::ERROR, "daemon::runner", 42),
            "<11>stress-daemon[42]: daemon: cannot fork instance instance=1"
        );
    }

    #[test]
    fn empty_message_falls_back_to_target() {
        let record = Record::default();
        assert_eq!(
            record.line(Level::DEBUG, "debug::fork", 7),
            "<15>stress-daemon[7]: debug::fork"
        );
    }
}
