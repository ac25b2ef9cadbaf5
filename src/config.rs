// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the optional configuration file that supplies
//! defaults for the command-line tools. Values given on the command line
//! always take precedence over values from the configuration file.
//!
//! # General Layout
//!
//! ```toml
//! [index]
//! search_root = "~/Pictures"
//! index_root = "~/Documents/__Collect__"
//! group_dates = true
//! exclude = ["_Production_Resources"]
//! ```

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// Configuration file layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Settings for index building.
    pub index: IndexSettings,
}

impl Config {
    /// Load configuration file at target path.
    ///
    /// A missing configuration file is not an error. Defaults are used
    /// instead.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file exists but cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file content is malformed.
    /// - Return [`ConfigError::ShellExpansion`] if a path cannot be expanded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match read_to_string(path) {
            Ok(data) => data.parse(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Read {
                source: err,
                path: path.to_path_buf(),
            }),
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: Config = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on path fields.
        config.index.search_root = config.index.search_root.map(expand).transpose()?;
        config.index.index_root = config.index.index_root.map(expand).transpose()?;

        Ok(config)
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Index building settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Root to search for collect files.
    pub search_root: Option<PathBuf>,

    /// Root of generated index.
    pub index_root: Option<PathBuf>,

    /// Use `Date/YYYY/MM/DD` instead of `Date/YYYY-MM-DD`.
    pub group_dates: bool,

    /// Prune directories whose path contains any of these substrings.
    pub exclude: Vec<String>,
}

fn expand(path: PathBuf) -> Result<PathBuf> {
    shellexpand::full(path.to_string_lossy().as_ref())
        .map(|expanded| PathBuf::from(expanded.into_owned()))
        .map_err(ConfigError::ShellExpansion)
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
