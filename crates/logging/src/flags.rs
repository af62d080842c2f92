// crates/logging/src/flags.rs
#![allow(missing_docs)]

use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum InfoFlag {
    Instance,
    Metrics,
}

impl InfoFlag {
    pub const fn as_str(self) -> &'static str {
        match self {
            InfoFlag::Instance => "instance",
            InfoFlag::Metrics => "metrics",
        }
    }

    pub const fn target(self) -> &'static str {
        match self {
            InfoFlag::Instance => "info::instance",
            InfoFlag::Metrics => "info::metrics",
        }
    }
}

impl From<&InfoFlag> for InfoFlag {
    fn from(flag: &InfoFlag) -> Self {
        *flag
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum DebugFlag {
    Backoff,
    Channel,
    Exit,
    Fork,
    Signal,
}

impl DebugFlag {
    pub const fn as_str(self) -> &'static str {
        match self {
            DebugFlag::Backoff => "backoff",
            DebugFlag::Channel => "channel",
            DebugFlag::Exit => "exit",
            DebugFlag::Fork => "fork",
            DebugFlag::Signal => "signal",
        }
    }

    pub const fn target(self) -> &'static str {
        match self {
            DebugFlag::Backoff => "debug::backoff",
            DebugFlag::Channel => "debug::channel",
            DebugFlag::Exit => "debug::exit",
            DebugFlag::Fork => "debug::fork",
            DebugFlag::Signal => "debug::signal",
        }
    }
}

impl From<&DebugFlag> for DebugFlag {
    fn from(flag: &DebugFlag) -> Self {
        *flag
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum, Default)]
#[clap(rename_all = "kebab-case")]
pub enum StderrMode {
    #[clap(alias = "e")]
    #[default]
    Errors,
    #[clap(alias = "a")]
    All,
}

#[derive(Clone, Debug)]
pub struct SubscriberConfig {
    pub format: LogFormat,
    pub verbose: u8,
    pub info: Vec<InfoFlag>,
    pub debug: Vec<DebugFlag>,
    pub quiet: bool,
    pub stderr: StderrMode,
    pub log_file: Option<(PathBuf, Option<String>)>,
    pub syslog: bool,
    pub colored: bool,
    pub timestamps: bool,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            verbose: 0,
            info: Vec::new(),
            debug: Vec::new(),
            quiet: false,
            stderr: StderrMode::Errors,
            log_file: None,
            syslog: false,
            colored: true,
            timestamps: false,
        }
    }
}

#[derive(Default)]
pub struct SubscriberConfigBuilder {
    cfg: SubscriberConfig,
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }
}

impl SubscriberConfigBuilder {
    pub fn format(mut self, format: LogFormat) -> Self {
        self.cfg.format = format;
        self
    }

    pub fn verbose(mut self, verbose: u8) -> Self {
        self.cfg.verbose = verbose;
        self
    }

    pub fn info<I>(mut self, info: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<InfoFlag>,
    {
        self.cfg.info = info.into_iter().map(Into::into).collect();
        self
    }

    pub fn debug<I>(mut self, debug: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<DebugFlag>,
    {
        self.cfg.debug = debug.into_iter().map(Into::into).collect();
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.cfg.quiet = quiet;
        self
    }

    pub fn stderr(mut self, stderr: StderrMode) -> Self {
        self.cfg.stderr = stderr;
        self
    }

    pub fn log_file(mut self, log_file: Option<(PathBuf, Option<String>)>) -> Self {
        self.cfg.log_file = log_file;
        self
    }

    pub fn syslog(mut self, syslog: bool) -> Self {
        self.cfg.syslog = syslog;
        self
    }

    pub fn colored(mut self, colored: bool) -> Self {
        self.cfg.colored = colored;
        self
    }

    pub fn timestamps(mut self, timestamps: bool) -> Self {
        self.cfg.timestamps = timestamps;
        self
    }

    pub fn build(self) -> SubscriberConfig {
        self.cfg
    }
}
