//! Error types for pagelayer operations.
//!
//! This module provides the main error type [`PagelayerError`] which wraps
//! the error conditions that can occur while exporting a document.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{layers::LayerError, xml::XmlError};

/// The main error type for pagelayer operations.
///
/// Every variant is fatal for the whole run. [`PagelayerError::exit_code`]
/// gives the status the process should terminate with.
#[derive(Debug, Error)]
pub enum PagelayerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse {}: {source}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error("{}: {source}", .path.display())]
    Layer {
        path: PathBuf,
        #[source]
        source: LayerError,
    },

    #[error("Failed to launch {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} exited with status {code}")]
    ToolFailed { tool: String, code: i32 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PagelayerError {
    /// Process exit status for this error.
    ///
    /// A failed external tool propagates its own status; everything else
    /// exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolFailed { code, .. } => *code,
            _ => 1,
        }
    }
}
