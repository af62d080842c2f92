// crates/logging/src/formatter.rs
use std::collections::HashMap;
use std::fmt;
use time::{OffsetDateTime, macros::format_description};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, format::Writer};
use tracing_subscriber::registry::LookupSpan;

/// Program name printed in front of every default-format line.
pub const PROGRAM: &str = "stress-daemon";

/// Text formatter for stressor diagnostics.
///
/// Without a template every event renders as `stress-daemon: <level>: [<pid>] <message>`.
/// A template replaces that line; it understands `%t` (local time), `%p`
/// (pid), `%l` (level), `%n` (stressor name), `%m` (message), `%o` (the
/// `ops` field) and `%%`. Unknown tokens are copied through unchanged.
pub struct StressFormatter {
    tokens: Option<Vec<Token>>,
}

impl StressFormatter {
    pub fn new(template: Option<String>) -> Self {
        Self {
            tokens: template.map(|t| parse_tokens(&t)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Lit(String),
    Percent,
    Time,
    Pid,
    Level,
    Stressor,
    Message,
    Ops,
}

fn parse_tokens(fmt: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = fmt.chars();
    let mut lit = String::new();
    while let Some(c) = chars.next() {
        if c != '%' {
            lit.push(c);
            continue;
        }
        let tok = match chars.next() {
            Some('%') => Token::Percent,
            Some('t') => Token::Time,
            Some('p') => Token::Pid,
            Some('l') => Token::Level,
            Some('n') => Token::Stressor,
            Some('m') => Token::Message,
            Some('o') => Token::Ops,
            Some(other) => {
                lit.push('%');
                lit.push(other);
                continue;
            }
            None => {
                lit.push('%');
                continue;
            }
        };
        if !lit.is_empty() {
            tokens.push(Token::Lit(std::mem::take(&mut lit)));
        }
        tokens.push(tok);
    }
    if !lit.is_empty() {
        tokens.push(Token::Lit(lit));
    }
    tokens
}

struct MsgVisitor {
    msg: String,
    fields: HashMap<String, String>,
}

impl MsgVisitor {
    fn new() -> Self {
        Self {
            msg: String::new(),
            fields: HashMap::new(),
        }
    }

    fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

impl Visit for MsgVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            if !self.msg.is_empty() {
                self.msg.push(' ');
            }
            self.msg.push_str(value);
        } else {
            self.fields
                .insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            if !self.msg.is_empty() {
                self.msg.push(' ');
            }
            self.msg.push_str(&format!("{value:?}"));
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{value:?}"));
        }
    }
}

fn format_time() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let fmt = format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");
    now.format(&fmt).unwrap_or_default()
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::ERROR => "error",
        Level::WARN => "warn",
        Level::INFO => "info",
        Level::DEBUG => "debug",
        Level::TRACE => "trace",
    }
}

impl<S, N> FormatEvent<S, N> for StressFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = MsgVisitor::new();
        event.record(&mut visitor);
        let level = level_name(*event.metadata().level());
        let msg = if visitor.msg.is_empty() {
            event.metadata().target()
        } else {
            &visitor.msg
        };
        let Some(tokens) = &self.tokens else {
            writeln!(writer, "{PROGRAM}: {level}: [{}] {msg}", std::process::id())?;
            return Ok(());
        };
        let mut out = String::new();
        for tok in tokens {
            match tok {
                Token::Lit(s) => out.push_str(s),
                Token::Percent => out.push('%'),
                Token::Time => out.push_str(&format_time()),
                Token::Pid => out.push_str(&std::process::id().to_string()),
                Token::Level => out.push_str(level),
                Token::Stressor => out.push_str(visitor.field("stressor")),
                Token::Message => out.push_str(msg),
                Token::Ops => out.push_str(visitor.field("ops")),
            }
        }
        writer.write_str(&out)?;
        writer.write_char('\n')
    }
}
