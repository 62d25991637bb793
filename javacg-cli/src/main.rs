mod app;
mod extract;
mod output;

use std::process::ExitCode;

use clap::Parser;

use crate::app::Cli;

fn main() -> ExitCode {
    if let Err(error) = ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    }) {
        eprintln!("Warning: failed to set Ctrl+C handler: {error}");
    }

    let cli = Cli::parse();

    // Show javacg info+ on stderr; --verbose enables debug; RUST_LOG overrides
    let level = if cli.global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("javacg", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    match extract::run(&cli.extract, &cli.global) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
