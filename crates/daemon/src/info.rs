// crates/daemon/src/info.rs

use std::fmt;

/// Category a stressor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Scheduler,
    Os,
}

impl Class {
    pub const fn as_str(self) -> &'static str {
        match self {
            Class::Scheduler => "scheduler",
            Class::Os => "os",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When the harness cross-checks the reported op count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verify {
    Always,
}

/// One line of stressor help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Help {
    pub long: &'static str,
    pub description: &'static str,
}

/// Static declaration of a stressor.
#[derive(Debug, Clone, Copy)]
pub struct StressorInfo {
    pub name: &'static str,
    pub class: &'static [Class],
    pub verify: Verify,
    pub help: &'static [Help],
}

impl StressorInfo {
    pub fn help_for(&self, long: &str) -> Option<&'static str> {
        self.help
            .iter()
            .find(|h| h.long.split_whitespace().next() == Some(long))
            .map(|h| h.description)
    }
}

pub const DAEMON_HELP: &str = "start N workers creating multiple daemons";
pub const DAEMON_OPS_HELP: &str = "stop when N daemons have been created";
pub const DAEMON_WAIT_HELP: &str = "stressor wait for daemon to exit and not init";

/// Name the harness prints in front of its own output.
pub const PROGRAM: &str = "stress-daemon";

pub static STRESS_DAEMON_INFO: StressorInfo = StressorInfo {
    name: "daemon",
    class: &[Class::Scheduler, Class::Os],
    verify: Verify::Always,
    help: &[
        Help {
            long: "daemon N",
            description: DAEMON_HELP,
        },
        Help {
            long: "daemon-ops N",
            description: DAEMON_OPS_HELP,
        },
        Help {
            long: "daemon-wait",
            description: DAEMON_WAIT_HELP,
        },
    ],
};

impl fmt::Display for StressorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let classes: Vec<_> = self.class.iter().map(|c| c.as_str()).collect();
        writeln!(f, "{} ({})", self.name, classes.join(", "))?;
        for h in self.help {
            writeln!(f, "     --{:<18} {}", h.long, h.description)?;
        }
        Ok(())
    }
}
