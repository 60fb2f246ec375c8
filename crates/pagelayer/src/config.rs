//! Configuration types for pagelayer exports.
//!
//! This module provides configuration structures that control which external
//! tools are run and how their output is post-processed. All types implement
//! [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining tool and export settings.
//! - [`ToolsConfig`] - Command lines used to launch the renderer and the normalizer.
//! - [`ExportConfig`] - Post-processing options.
//!
//! # Example
//!
//! ```
//! # use pagelayer::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.tools().renderer().program(), "drawio");
//! assert!(config.export().text_to_path());
//! ```

use std::fmt;

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// External tool section.
    #[serde(default)]
    tools: ToolsConfig,

    /// Export section.
    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(tools: ToolsConfig, export: ExportConfig) -> Self {
        Self { tools, export }
    }

    pub fn tools(&self) -> &ToolsConfig {
        &self.tools
    }

    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Returns the configuration with text flattening switched on or off.
    pub fn with_text_to_path(mut self, text_to_path: bool) -> Self {
        self.export.text_to_path = text_to_path;
        self
    }
}

/// Command lines of the external tools.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    /// draw.io desktop, used for the structural and the per-page export.
    #[serde(default = "ToolsConfig::default_renderer")]
    renderer: ToolCommand,

    /// Inkscape, used to normalize the patched SVG.
    #[serde(default = "ToolsConfig::default_normalizer")]
    normalizer: ToolCommand,
}

impl ToolsConfig {
    /// Creates a new [`ToolsConfig`].
    ///
    /// # Arguments
    ///
    /// * `renderer` - Command used to run draw.io.
    /// * `normalizer` - Command used to run Inkscape.
    pub fn new(renderer: ToolCommand, normalizer: ToolCommand) -> Self {
        Self {
            renderer,
            normalizer,
        }
    }

    pub fn renderer(&self) -> &ToolCommand {
        &self.renderer
    }

    pub fn normalizer(&self) -> &ToolCommand {
        &self.normalizer
    }

    fn default_renderer() -> ToolCommand {
        ToolCommand::new("drawio")
    }

    fn default_normalizer() -> ToolCommand {
        ToolCommand::new("inkscape")
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self::new(Self::default_renderer(), Self::default_normalizer())
    }
}

/// A program followed by the arguments that always precede the ones
/// pagelayer adds, e.g. `["xvfb-run", "-a", "drawio"]`.
///
/// Deserializes from a non-empty list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    /// Command that runs `program` with no leading arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends a leading argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl TryFrom<Vec<String>> for ToolCommand {
    type Error = String;

    fn try_from(mut parts: Vec<String>) -> Result<Self, Self::Error> {
        if parts.is_empty() {
            return Err("tool command must name a program".to_string());
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
        })
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Post-processing options.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Convert text to paths while normalizing.
    #[serde(default = "ExportConfig::default_text_to_path")]
    text_to_path: bool,
}

impl ExportConfig {
    /// Creates a new [`ExportConfig`].
    pub fn new(text_to_path: bool) -> Self {
        Self { text_to_path }
    }

    /// Whether the normalizer flattens text into path geometry.
    pub fn text_to_path(&self) -> bool {
        self.text_to_path
    }

    fn default_text_to_path() -> bool {
        true
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new(Self::default_text_to_path())
    }
}
