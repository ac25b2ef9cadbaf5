// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, or managed in some way.

use std::path::{Path, PathBuf};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default absolute path to index root.
///
/// Uses `$HOME/Documents/__Collect__` as the default absolute path for the
/// generated index. Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_index_root() -> Result<PathBuf> {
    home_dir().map(|path| path.join("Documents").join("__Collect__"))
}

/// Determine default absolute path to configuration file.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/collect/config.toml` as the
/// default. Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("collect").join("config.toml"))
        .ok_or(NoWayHome)
}

/// Resolve path to absolute form without requiring it to exist.
///
/// Symbolic links are resolved when the path exists. Otherwise, the path is
/// simply made absolute relative to the current working directory.
pub fn resolve(path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    match path.as_ref().canonicalize() {
        Ok(resolved) => Ok(resolved),
        Err(_) => std::path::absolute(path.as_ref()),
    }
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
