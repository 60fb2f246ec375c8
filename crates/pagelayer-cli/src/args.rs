//! Command-line argument definitions for the pagelayer CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the export mode and input documents,
//! configuration file selection, text flattening and logging verbosity.

use clap::Parser;

use pagelayer::Mode;

/// Command-line arguments for the pagelayer tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Stages to run for every page: all, layers or pages (case-insensitive)
    pub mode: Mode,

    /// Paths to the draw.io documents
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Convert text to paths while normalizing (0 disables)
    #[arg(long, env = "TEXT_TO_PATH")]
    pub text_to_path: Option<i64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_is_case_insensitive() {
        let args = Args::try_parse_from(["pagelayer", "ALL", "a.drawio", "b.drawio"]).unwrap();

        assert_eq!(args.mode, Mode::All);
        assert_eq!(args.files, ["a.drawio", "b.drawio"]);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Args::try_parse_from(["pagelayer", "svg", "a.drawio"]).is_err());
    }

    #[test]
    fn test_files_are_required() {
        assert!(Args::try_parse_from(["pagelayer", "pages"]).is_err());
        assert!(Args::try_parse_from(["pagelayer"]).is_err());
    }

    #[test]
    fn test_text_to_path_must_be_an_integer() {
        let args =
            Args::try_parse_from(["pagelayer", "layers", "a.drawio", "--text-to-path", "0"]).unwrap();
        assert_eq!(args.text_to_path, Some(0));

        assert!(
            Args::try_parse_from(["pagelayer", "layers", "a.drawio", "--text-to-path", "yes"])
                .is_err()
        );
    }
}
