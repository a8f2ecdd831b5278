//! Binary entrypoint for the `azcall` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Values from .env fill in AZCALL_* settings not already in the environment.
    let _ = dotenvy::dotenv();

    match azcall::run(std::env::args()) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
