//! pagelayer CLI library
//!
//! This module contains the core CLI logic for the pagelayer tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::path::PathBuf;

use log::info;

use pagelayer::{Exporter, PagelayerError};

/// Run the pagelayer CLI application
///
/// This function exports every input document through the pagelayer
/// pipeline, one after another, and returns the SVG files written.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `PagelayerError` for:
/// - Configuration loading errors
/// - External tool failures
/// - File I/O errors
/// - Documents or images with an unexpected structure
pub fn run(args: &Args) -> Result<Vec<PathBuf>, PagelayerError> {
    info!(
        mode = args.mode.name(),
        files_count = args.files.len();
        "Processing documents"
    );

    // Load configuration
    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(text_to_path) = args.text_to_path {
        app_config = app_config.with_text_to_path(text_to_path != 0);
    }

    // Export documents in argument order
    let exporter = Exporter::new(app_config, args.mode);
    let outputs = exporter.export_files(&args.files)?;

    info!(outputs_count = outputs.len(); "SVG exported successfully");

    Ok(outputs)
}
