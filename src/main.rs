//! hasse - partial-order analysis for task dependencies

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = hasse_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
