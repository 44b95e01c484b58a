//! Erdwright CLI - Draw entity relationship diagrams for data model classes

mod cli;

use clap::Parser;
use erdwright::core::logging::init_logging;

fn main() {
    let cli_args = cli::Cli::parse();

    // ERDWRIGHT_LOG_LEVEL, RUST_LOG and ERDWRIGHT_LOG_FORMAT override the flags
    let level = cli_args.log_level.as_str();
    let format = cli_args.log_format.as_str();
    if let Err(e) = init_logging(Some(level), Some(format)) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let app = cli::ErdwrightApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
