// crates/cli/src/print.rs
use daemon::{PROGRAM, RunSummary, STRESS_DAEMON_INFO};

use crate::error::CliError;
use crate::exit_code::exit_code_from_error_kind;
use crate::options::SummaryFormat;

/// Reports a command line error the way the rest of the tool reports
/// problems and exits with the matching status.
pub fn handle_clap_error(e: clap::Error) -> ! {
    use clap::error::ErrorKind;
    let kind = e.kind();
    let code = exit_code_from_error_kind(kind);
    if matches!(kind, ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        let _ = e.print();
        std::process::exit(i32::from(code));
    }
    eprintln!("{}", usage_message(&e));
    std::process::exit(i32::from(code));
}

pub(crate) fn usage_message(e: &clap::Error) -> String {
    use clap::error::ErrorKind;
    let rendered = e.to_string();
    let first = rendered.lines().next().unwrap_or("");
    let msg = match e.kind() {
        ErrorKind::UnknownArgument => {
            let arg = first.split('\'').nth(1).unwrap_or("");
            format!("{arg}: unknown option")
        }
        ErrorKind::ValueValidation | ErrorKind::InvalidValue => first
            .strip_prefix("error: invalid value '")
            .and_then(|rest| rest.split_once('\''))
            .and_then(|(val, rest)| {
                let opt = rest.strip_prefix(" for '")?.split_once('\'')?.0;
                let opt = opt.split_whitespace().next().unwrap_or(opt);
                Some(format!("{opt}={val}: invalid value"))
            })
            .unwrap_or_else(|| first.trim_start_matches("error: ").to_string()),
        _ => first.trim_start_matches("error: ").to_string(),
    };
    format!("{PROGRAM}: {msg}")
}

pub(crate) fn print_stressors() {
    print!("{STRESS_DAEMON_INFO}");
}

pub(crate) fn print_summary(summary: &RunSummary, format: SummaryFormat) -> Result<(), CliError> {
    match format {
        SummaryFormat::Text => println!("{summary}"),
        SummaryFormat::Json => println!("{}", summary.to_json()?),
        SummaryFormat::None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::cli_command;

    fn error_for(args: &[&str]) -> clap::Error {
        cli_command().try_get_matches_from(args).unwrap_err()
    }

    #[test]
    fn unknown_option_message() {
        let e = error_for(&["stress-daemon", "--bogus"]);
        assert_eq!(usage_message(&e), "stress-daemon: --bogus: unknown option");
    }

    #[test]
    fn invalid_number_message() {
        let e = error_for(&["stress-daemon", "--daemon-ops", "many"]);
        assert_eq!(
            usage_message(&e),
            "stress-daemon: --daemon-ops=many: invalid value"
        );
    }
}
