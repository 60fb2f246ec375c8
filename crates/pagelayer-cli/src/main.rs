//! pagelayer CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use pagelayer_cli::{Args, error_adapter::ErrorAdapter};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    // Usage errors exit with 1; help and version keep clap's behavior
    let args = Args::try_parse().unwrap_or_else(|err| {
        if !err.use_stderr() {
            err.exit();
        }
        let _ = err.print();
        process::exit(1);
    });

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting pagelayer");
    debug!(args:?; "Parsed arguments");

    // Run the application
    if let Err(err) = pagelayer_cli::run(&args) {
        let reporter = miette::GraphicalReportHandler::new();
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, &ErrorAdapter(&err))
            .expect("Writing to String buffer is infallible");

        error!("Failed\n{writer}");
        process::exit(err.exit_code());
    }

    info!("Completed successfully");
}
