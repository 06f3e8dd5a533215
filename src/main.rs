use std::process::ExitCode;

use clap::Parser;

use switchboard::cli::{self, Cli};
use switchboard::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose);

    if cli.verbose {
        if let Some(path) = logging::log_file_path() {
            eprintln!("Debug log: {}", path.display());
        }
    }

    match cli::execute(cli.command, cli.config.as_deref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}
