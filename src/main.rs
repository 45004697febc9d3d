//! erxes CLI - deployment tooling for the erxes business suite

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = erxes_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
