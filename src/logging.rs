// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Logging setup for command-line tools.
//!
//! Library code only emits events through [`tracing`]. Each binary installs
//! exactly one subscriber through [`init`] for the lifetime of its single
//! command invocation.

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install global subscriber.
///
/// Reads filter directives from `RUST_LOG` if set. Otherwise, logs at info
/// level, or at debug level for this crate when `verbose` is set. Events go
/// to the terminal unless `log_file` is given, in which case they are
/// appended to that file with timestamps.
///
/// # Errors
///
/// - Return [`LoggingError::OpenLogFile`] if log file cannot be opened.
/// - Return [`LoggingError::Filter`] if filter directives are invalid.
/// - Return [`LoggingError::Init`] if a global subscriber already exists.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default = if verbose { "info,collect=debug" } else { "info" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default)?,
    };

    let (terminal, file) = match log_file {
        None => (
            Some(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .without_time(),
            ),
            None,
        ),
        Some(path) => {
            let writer = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| LoggingError::OpenLogFile {
                    source: err,
                    path: path.to_path_buf(),
                })?;
            (
                None,
                Some(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(writer)),
                ),
            )
        }
    };

    tracing_subscriber::registry()
        .with(terminal)
        .with(file)
        .with(filter)
        .try_init()?;

    Ok(())
}

/// Logging setup error types.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Log file cannot be opened for appending.
    #[error("failed to open log file at {:?}", path.display())]
    OpenLogFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Filter directives are malformed.
    #[error(transparent)]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// Global subscriber could not be installed.
    #[error(transparent)]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Friendly result alias :3
type Result<T, E = LoggingError> = std::result::Result<T, E>;
