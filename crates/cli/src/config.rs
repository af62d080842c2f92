// crates/cli/src/config.rs

use std::path::PathBuf;
use std::time::Duration;

use daemon::{RunnerOptions, WaitPolicy};
use logging::{DebugFlag, InfoFlag, LogFormat, SubscriberConfig};

use crate::options::{StressOpts, SummaryFormat};

/// Configuration for a stress run.
#[derive(Clone, Debug)]
pub struct StressConfig {
    pub instances: u32,
    pub ops: u64,
    pub wait: WaitPolicy,
    pub timeout: Option<Duration>,
    pub summary: SummaryFormat,
    pub log_format: LogFormat,
    pub verbose: u8,
    pub info: Vec<InfoFlag>,
    pub debug: Vec<DebugFlag>,
    pub quiet: bool,
    pub log_file: Option<(PathBuf, Option<String>)>,
    pub syslog: bool,
    pub colored: bool,
    pub timestamps: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            instances: 1,
            ops: 0,
            wait: WaitPolicy::ReapByInit,
            timeout: None,
            summary: SummaryFormat::Text,
            log_format: LogFormat::Text,
            verbose: 0,
            info: Vec::new(),
            debug: Vec::new(),
            quiet: false,
            log_file: None,
            syslog: false,
            colored: true,
            timestamps: false,
        }
    }
}

impl StressConfig {
    /// Create a new builder for [`StressConfig`].
    pub fn builder() -> StressConfigBuilder {
        StressConfigBuilder::default()
    }

    pub fn subscriber_config(&self) -> SubscriberConfig {
        SubscriberConfig::builder()
            .format(self.log_format)
            .verbose(self.verbose)
            .info(&self.info)
            .debug(&self.debug)
            .quiet(self.quiet)
            .log_file(self.log_file.clone())
            .syslog(self.syslog)
            .colored(self.colored)
            .timestamps(self.timestamps)
            .build()
    }

    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            instances: self.instances,
            ops: self.ops,
            wait: self.wait,
            timeout: self.timeout,
        }
    }
}

impl From<&StressOpts> for StressConfig {
    fn from(opts: &StressOpts) -> Self {
        StressConfig::builder()
            .instances(opts.daemon)
            .ops(opts.daemon_ops)
            .wait(WaitPolicy::from(opts.daemon_wait))
            .timeout(opts.timeout)
            .summary(opts.summary)
            .log_format(opts.log_format)
            .verbose(opts.verbose)
            .info(opts.info.clone())
            .debug(opts.debug.clone())
            .quiet(opts.quiet)
            .log_file(
                opts.log_file
                    .clone()
                    .map(|path| (path, opts.log_file_format.clone())),
            )
            .syslog(opts.syslog)
            .colored(!opts.no_color)
            .timestamps(opts.timestamps)
            .build()
    }
}

/// Builder for [`StressConfig`].
#[derive(Debug, Default)]
#[must_use]
pub struct StressConfigBuilder {
    cfg: StressConfig,
}

impl StressConfigBuilder {
    pub fn instances(mut self, instances: u32) -> Self {
        self.cfg.instances = instances;
        self
    }

    pub fn ops(mut self, ops: u64) -> Self {
        self.cfg.ops = ops;
        self
    }

    pub fn wait(mut self, wait: WaitPolicy) -> Self {
        self.cfg.wait = wait;
        self
    }

    /// A zero timeout means no timeout.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.cfg.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn summary(mut self, summary: SummaryFormat) -> Self {
        self.cfg.summary = summary;
        self
    }

    pub fn log_format(mut self, log_format: LogFormat) -> Self {
        self.cfg.log_format = log_format;
        self
    }

    pub fn verbose(mut self, verbose: u8) -> Self {
        self.cfg.verbose = verbose;
        self
    }

    pub fn info(mut self, info: Vec<InfoFlag>) -> Self {
        self.cfg.info = info;
        self
    }

    pub fn debug(mut self, debug: Vec<DebugFlag>) -> Self {
        self.cfg.debug = debug;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.cfg.quiet = quiet;
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

    pub fn build(self) -> StressConfig {
        self.cfg
    }
}
