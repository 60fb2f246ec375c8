//! External tool invocations and output naming.
//!
//! The renderer is draw.io desktop's command line, the normalizer is
//! Inkscape's. Both are launched through a [`ToolCommand`] so they can be
//! wrapped, e.g. in `xvfb-run` on a headless machine. Every invocation blocks
//! until the tool exits; a non-zero status aborts the run.

use std::{
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    str::FromStr,
};

use log::debug;
use thiserror::Error;

use crate::{PagelayerError, config::ToolCommand};

/// Extension of the per-page output files.
pub const OUTPUT_EXTENSION: &str = "svg";

/// Which stages run for every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Render every page, then inject its layers and normalize it.
    All,
    /// Inject layers into and normalize images rendered by an earlier run.
    Layers,
    /// Only render every page.
    Pages,
}

impl Mode {
    /// Whether pages are rendered to SVG.
    pub fn renders(self) -> bool {
        matches!(self, Self::All | Self::Pages)
    }

    /// Whether layers are injected and the result normalized.
    pub fn injects(self) -> bool {
        matches!(self, Self::All | Self::Layers)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Layers => "layers",
            Self::Pages => "pages",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown [`Mode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode `{0}` (expected one of: all, layers, pages)")]
pub struct UnknownModeError(String);

impl FromStr for Mode {
    type Err = UnknownModeError;

    /// Parses a mode name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::All, Self::Layers, Self::Pages]
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownModeError(s.to_string()))
    }
}

/// Path of the SVG a page is exported to.
///
/// The input's extension is replaced by `-<name>.svg`, or by
/// `-<index>.svg` when the page has no name.
pub fn output_path(input: &Path, page_name: &str, page_index: usize) -> PathBuf {
    let suffix = if page_name.is_empty() {
        page_index.to_string()
    } else {
        page_name.to_string()
    };

    let mut file = input.with_extension("").into_os_string();
    file.push(format!("-{suffix}.{OUTPUT_EXTENSION}"));
    PathBuf::from(file)
}

/// Renderer arguments for an uncompressed XML export of the whole document.
pub fn structural_export_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "--export".into(),
        "--format".into(),
        "xml".into(),
        "--uncompressed".into(),
        "--output".into(),
        output.into(),
        input.into(),
    ]
}

/// Renderer arguments for an SVG export of a single page.
pub fn page_export_args(input: &Path, page_index: usize, output: &Path) -> Vec<OsString> {
    vec![
        "--export".into(),
        "--embed-svg-images".into(),
        "--page-index".into(),
        page_index.to_string().into(),
        "--output".into(),
        output.into(),
        input.into(),
    ]
}

/// Normalizer arguments that rewrite `path` in place.
pub fn normalize_args(path: &Path, text_to_path: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![path.into()];
    if text_to_path {
        args.push("--export-text-to-path".into());
    }
    args.push("--export-filename".into());
    args.push(path.into());
    args
}

/// Runs a tool to completion with its standard output discarded.
///
/// # Errors
///
/// Returns [`PagelayerError::ToolSpawn`] if the program cannot be started and
/// [`PagelayerError::ToolFailed`] if it exits unsuccessfully. A tool killed by
/// a signal is reported with status 1.
pub(crate) fn run_tool(
    tool: &ToolCommand,
    args: &[OsString],
    silence_stderr: bool,
) -> Result<(), PagelayerError> {
    let mut command = Command::new(tool.program());
    command.args(tool.args()).args(args).stdout(Stdio::null());
    if silence_stderr {
        command.stderr(Stdio::null());
    }

    debug!(command:?; "Running external tool");
    let status = command
        .status()
        .map_err(|source| PagelayerError::ToolSpawn {
            tool: tool.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(PagelayerError::ToolFailed {
            tool: tool.program().to_string(),
            code: status.code().unwrap_or(1),
        });
    }
    Ok(())
}
