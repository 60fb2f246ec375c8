//! Configuration file discovery.
//!
//! A `--config` path always wins and must exist. Without one, the first
//! existing file among [`search_paths`] is used, and the built-in defaults
//! apply when there is none.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use pagelayer::{PagelayerError, config::AppConfig};

/// Configuration file name inside every searched directory.
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("configuration file {} does not exist", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for PagelayerError {
    fn from(err: ConfigError) -> Self {
        PagelayerError::Config(err.to_string())
    }
}

/// Implicit configuration locations, most specific first: a `pagelayer`
/// directory next to where the tool runs, then the platform's per-user
/// configuration directory.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![Path::new("pagelayer").join(CONFIG_FILE_NAME)];
    match ProjectDirs::from("com", "pagelayer", "pagelayer") {
        Some(dirs) => paths.push(dirs.config_dir().join(CONFIG_FILE_NAME)),
        None => debug!("No platform configuration directory"),
    }
    paths
}

/// Loads the configuration for a run.
///
/// # Errors
///
/// Returns [`PagelayerError::Config`] if `explicit_path` does not exist or
/// the selected file is not valid configuration, e.g. a tool given as an
/// empty command list.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, PagelayerError> {
    let path = match explicit_path {
        Some(path) => path.as_ref().to_path_buf(),
        None => match search_paths().into_iter().find(|path| path.is_file()) {
            Some(path) => path,
            None => {
                debug!("No configuration file found, using defaults");
                return Ok(AppConfig::default());
            }
        },
    };

    info!(path = path.display().to_string(); "Loading configuration");
    read_config_file(&path)
}

fn read_config_file(path: &Path) -> Result<AppConfig, PagelayerError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|err| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
        .into()
    })
}
