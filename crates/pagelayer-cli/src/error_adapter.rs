//! Error adapter for converting PagelayerError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error type
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use pagelayer::{PagelayerError, layers::LayerError};

/// Adapter that renders a [`PagelayerError`] as a miette diagnostic.
pub struct ErrorAdapter<'a>(pub &'a PagelayerError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            PagelayerError::Io(_) => "pagelayer::io",
            PagelayerError::Xml { .. } => "pagelayer::xml",
            PagelayerError::Layer {
                source: LayerError::UnexpectedShape(_),
                ..
            } => "pagelayer::shape",
            PagelayerError::Layer {
                source: LayerError::UnknownLayer(_),
                ..
            } => "pagelayer::unknown_layer",
            PagelayerError::ToolSpawn { .. } => "pagelayer::tool_spawn",
            PagelayerError::ToolFailed { .. } => "pagelayer::tool_failed",
            PagelayerError::Config(_) => "pagelayer::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            PagelayerError::Layer {
                source: LayerError::UnexpectedShape(_),
                ..
            } => "the file does not have the structure draw.io exports; check the draw.io version",
            PagelayerError::Layer {
                source: LayerError::UnknownLayer(_),
                ..
            } => "the image was rendered from a different version of the document; re-run with `all`",
            PagelayerError::ToolSpawn { .. } => {
                "check that the tool is installed, or set its command under [tools] in the configuration file"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
