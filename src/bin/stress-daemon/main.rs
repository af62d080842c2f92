// src/bin/stress-daemon/main.rs
use daemon::PROGRAM;
use stress_daemon_cli::{cli_command, handle_clap_error};

fn main() {
    let mut cmd = cli_command();
    let matches = cmd
        .try_get_matches_from_mut(std::env::args_os())
        .unwrap_or_else(|e| handle_clap_error(e));
    match stress_daemon_cli::run(&matches) {
        Ok(code) => std::process::exit(i32::from(code)),
        Err(e) => {
            eprintln!("{PROGRAM}: {e}");
            std::process::exit(i32::from(e.exit_code()));
        }
    }
}
