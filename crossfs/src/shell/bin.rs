// Binary entry point for crossfs
// This is a thin wrapper that delegates to the library implementation

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match crossfs::shell::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("crossfs fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
