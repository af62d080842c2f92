// crates/cli/src/error.rs
use std::io;

use thiserror::Error;

use crate::exit_code::ExitCode;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot set up logging: {0}")]
    Logging(io::Error),
    #[error("cannot start instances: {0}")]
    Setup(io::Error),
    #[error("cannot encode summary: {0}")]
    Summary(#[from] serde_json::Error),
    #[error(transparent)]
    Args(#[from] clap::Error),
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Args(_) => ExitCode::SyntaxOrUsage,
            CliError::Logging(_) | CliError::Setup(_) | CliError::Summary(_) => ExitCode::Io,
        }
    }
}
