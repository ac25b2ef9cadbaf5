// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Collect file discovery.
//!
//! A directory is described by at most one __collect file__. When several
//! candidates exist side by side, hidden beats visible and structured (YAML)
//! beats line-based (TXT):
//!
//! 1. `.collect.yaml`
//! 2. `.collect.yml`
//! 3. `collect.yaml`
//! 4. `collect.yml`
//! 5. `.collect.txt`
//! 6. `collect.txt`
//!
//! Anything lower in the list is ignored once a higher candidate is found.

use crate::scan::TreeScanner;

use std::path::{Path, PathBuf};

/// Collect file candidates from highest to lowest priority.
pub const MARKER_PRIORITY: [(&str, MarkerFormat); 6] = [
    (".collect.yaml", MarkerFormat::Structured),
    (".collect.yml", MarkerFormat::Structured),
    ("collect.yaml", MarkerFormat::Structured),
    ("collect.yml", MarkerFormat::Structured),
    (".collect.txt", MarkerFormat::Line),
    ("collect.txt", MarkerFormat::Line),
];

/// Content format of a collect file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerFormat {
    /// Line-based `Key:value` format.
    Line,

    /// YAML mapping document.
    Structured,
}

/// Located collect file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    path: PathBuf,
    format: MarkerFormat,
}

impl Marker {
    /// Locate highest priority collect file in directory.
    ///
    /// Returns `None` if directory contains no collect file at all.
    pub fn locate(dir: impl AsRef<Path>) -> Option<Self> {
        MARKER_PRIORITY.iter().find_map(|(name, format)| {
            let path = dir.as_ref().join(name);
            path.exists().then_some(Self {
                path,
                format: *format,
            })
        })
    }

    /// Path to collect file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Directory that collect file describes.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Syntax the collect file is written in.
    pub fn format(&self) -> MarkerFormat {
        self.format
    }

    /// Check if collect file name starts with a dot.
    pub fn is_hidden(&self) -> bool {
        self.path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'))
    }

    /// Path collect file would have once hidden.
    ///
    /// Returns `None` if already hidden.
    pub fn hidden_path(&self) -> Option<PathBuf> {
        if self.is_hidden() {
            return None;
        }

        let name = self.path.file_name()?.to_string_lossy();
        Some(self.path.with_file_name(format!(".{name}")))
    }
}

/// Lazily locate collect files in every directory a scanner visits.
pub fn find_markers(scanner: &TreeScanner) -> impl Iterator<Item = Marker> {
    scanner.directories().filter_map(Marker::locate)
}
