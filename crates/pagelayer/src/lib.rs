//! pagelayer - export draw.io pages to SVG with their layers preserved.
//!
//! draw.io's own SVG export flattens a page's layers into anonymous groups.
//! This crate drives the draw.io command line to export every page of a
//! document, then rewrites each SVG so that the layers authored in the
//! diagram become named Inkscape layers, and finally lets Inkscape normalize
//! the result.
//!
//! The pieces can also be used on their own: [`document::get_pages`] splits
//! an uncompressed document into pages, [`layers::get_layers`] reads the
//! layers of a page, and [`inject::inject_layers`] patches an exported image.

pub mod config;
pub mod document;
pub mod export;
pub mod inject;
pub mod layers;
pub mod xml;

mod error;

pub use error::PagelayerError;
pub use export::Mode;

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

use log::{debug, info};

use config::AppConfig;
use document::Page;

/// Drives the export of draw.io documents.
///
/// Documents and their pages are processed strictly one after another; the
/// first error aborts the export.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use pagelayer::{Exporter, Mode, config::AppConfig};
///
/// let exporter = Exporter::new(AppConfig::default(), Mode::All);
/// let outputs = exporter
///     .export_file(Path::new("diagram.drawio"))
///     .expect("Failed to export");
///
/// for output in outputs {
///     println!("{}", output.display());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Exporter {
    config: AppConfig,
    mode: Mode,
}

impl Exporter {
    /// Create a new exporter.
    ///
    /// # Arguments
    ///
    /// * `config` - Tool command lines and export options
    /// * `mode` - Stages to run for every page
    pub fn new(config: AppConfig, mode: Mode) -> Self {
        Self { config, mode }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Export every page of one document.
    ///
    /// Returns the per-page output paths in page order.
    ///
    /// # Errors
    ///
    /// Returns [`PagelayerError`] for the first failing step: a tool that
    /// cannot be launched or exits unsuccessfully, an unreadable or malformed
    /// document or image, or a page or image whose shape is not what draw.io
    /// produces.
    pub fn export_file(&self, input: &Path) -> Result<Vec<PathBuf>, PagelayerError> {
        info!(
            input = input.with_extension("").display().to_string(),
            mode = self.mode.name();
            "Exporting document"
        );

        let pages = self.read_structure(input)?;

        let mut outputs = Vec::with_capacity(pages.len());
        for page in &pages {
            outputs.push(self.export_page(input, page)?);
        }

        Ok(outputs)
    }

    /// Export every document in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`PagelayerError`] encountered.
    pub fn export_files<P: AsRef<Path>>(
        &self,
        inputs: impl IntoIterator<Item = P>,
    ) -> Result<Vec<PathBuf>, PagelayerError> {
        let mut outputs = Vec::new();
        for input in inputs {
            outputs.extend(self.export_file(input.as_ref())?);
        }
        Ok(outputs)
    }

    /// Exports the uncompressed structure of `input` and splits it into pages.
    ///
    /// The structural export lives in a temporary directory that is removed
    /// when this returns, whether splitting succeeded or not.
    fn read_structure(&self, input: &Path) -> Result<Vec<Page>, PagelayerError> {
        let temp_dir = tempfile::Builder::new().prefix("pagelayer-").tempdir()?;
        let mut file_name = input
            .file_stem()
            .map_or_else(|| OsString::from("document"), OsStr::to_os_string);
        file_name.push(".xml");
        let structure = temp_dir.path().join(file_name);

        export::run_tool(
            self.config.tools().renderer(),
            &export::structural_export_args(input, &structure),
            false,
        )?;

        let pages = document::read_pages(&structure)?;
        debug!(pages_count = pages.len(); "Structure exported");
        Ok(pages)
    }

    fn export_page(&self, input: &Path, page: &Page) -> Result<PathBuf, PagelayerError> {
        let output = export::output_path(input, page.name(), page.index());
        info!(
            page_index = page.index(),
            output = output.display().to_string();
            "Exporting page"
        );

        let layers = layers::get_layers(page.tree()).map_err(|source| PagelayerError::Layer {
            path: input.to_path_buf(),
            source,
        })?;

        if self.mode.renders() {
            export::run_tool(
                self.config.tools().renderer(),
                &export::page_export_args(input, page.index(), &output),
                false,
            )?;
        }

        if self.mode.injects() {
            inject::inject_layers(&output, &layers)?;
            // Inkscape's foreignObject and namespace warnings are expected.
            export::run_tool(
                self.config.tools().normalizer(),
                &export::normalize_args(&output, self.config.export().text_to_path()),
                true,
            )?;
        }

        Ok(output)
    }
}
