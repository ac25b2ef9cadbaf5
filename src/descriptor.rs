// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Collect file parsing.
//!
//! A collect file declares an optional date and any number of categories for
//! the directory it lives in. Two formats are understood.
//!
//! # Line Format
//!
//! One directive per line. Keys are case-insensitive. Blank lines and lines
//! starting with `#` are ignored. Multiple `Category` lines accumulate, and
//! the last `Date` line wins.
//!
//! ```text
//! # Summer trip
//! Date:2024-03-05
//! Category:Travel, Family
//! ```
//!
//! # Structured Format
//!
//! A single YAML mapping. Categories may be a comma-delimited string or a
//! sequence.
//!
//! ```yaml
//! date: 2024-03-05
//! categories: [Travel, Family]
//! ```
//!
//! # Degradation
//!
//! An invalid date never sinks the whole file. It is dropped and reported
//! as a [`DescriptorWarning`], leaving the categories intact. Only a file
//! that cannot be read or understood at all is an error.

pub mod category;

use crate::{
    descriptor::category::{normalize, scalar_to_string, CategorySource},
    marker::{Marker, MarkerFormat},
};

use chrono::NaiveDate;
use serde_yaml::Value;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::PathBuf,
};

/// Normalized contents of a collect file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Declared date.
    pub date: Option<NaiveDate>,

    /// Declared categories without duplicates in declaration order.
    pub categories: Vec<String>,
}

impl Descriptor {
    /// Load and parse located collect file.
    ///
    /// # Errors
    ///
    /// - Return [`DescriptorError::Read`] if file cannot be read.
    /// - Return [`DescriptorError::Yaml`] if structured file is malformed.
    /// - Return [`DescriptorError::NotAMapping`] if structured file is not a
    ///   key-value mapping.
    pub fn load(marker: &Marker) -> Result<Parsed> {
        let content = read_to_string(marker.path()).map_err(|err| DescriptorError::Read {
            source: err,
            path: marker.path().to_path_buf(),
        })?;

        match marker.format() {
            MarkerFormat::Line => Ok(Self::from_line_format(&content)),
            MarkerFormat::Structured => {
                Self::from_structured(&content).map_err(|err| match err {
                    StructuredError::Yaml(source) => DescriptorError::Yaml {
                        source,
                        path: marker.path().to_path_buf(),
                    },
                    StructuredError::NotAMapping => DescriptorError::NotAMapping {
                        path: marker.path().to_path_buf(),
                    },
                })
            }
        }
    }

    /// Parse line format.
    pub fn from_line_format(content: &str) -> Parsed {
        let mut date = None;
        let mut sources = Vec::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(value) = strip_key(line, "date:") {
                date = Some(value.trim().to_owned());
            } else if let Some(value) = strip_key(line, "category:") {
                sources.push(CategorySource::Delimited(value.to_owned()));
            }
        }

        Parsed::new(date, &sources)
    }

    /// Parse structured format.
    ///
    /// An empty document is treated as an empty mapping.
    ///
    /// # Errors
    ///
    /// - Return [`StructuredError::Yaml`] if document is malformed.
    /// - Return [`StructuredError::NotAMapping`] if document is not a
    ///   key-value mapping.
    pub fn from_structured(content: &str) -> Result<Parsed, StructuredError> {
        if content.trim().is_empty() {
            return Ok(Parsed::default());
        }

        let document: Value = serde_yaml::from_str(content)?;
        let mapping = match document {
            Value::Null => return Ok(Parsed::default()),
            Value::Mapping(mapping) => mapping,
            _ => return Err(StructuredError::NotAMapping),
        };

        let date = mapping.get("date").and_then(date_to_string);
        let sources = mapping
            .get("categories")
            .and_then(CategorySource::from_yaml)
            .into_iter()
            .collect::<Vec<_>>();

        Ok(Parsed::new(date, &sources))
    }

    /// Check if there is nothing to index.
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.categories.is_empty()
    }
}

/// Result of a successful parse.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Parsed {
    /// Normalized record.
    pub descriptor: Descriptor,

    /// Problems that were degraded rather than failed on.
    pub warnings: Vec<DescriptorWarning>,
}

impl Parsed {
    fn new(date: Option<String>, sources: &[CategorySource]) -> Self {
        let mut warnings = Vec::new();

        // INVARIANT: Empty date means no date, not an invalid one.
        let date = date.filter(|raw| !raw.is_empty()).and_then(|raw| {
            let parsed = parse_iso_date(&raw);
            if parsed.is_none() {
                warnings.push(DescriptorWarning::InvalidDate { value: raw });
            }
            parsed
        });

        Self {
            descriptor: Descriptor {
                date,
                categories: normalize(sources),
            },
            warnings,
        }
    }
}

/// Non-fatal collect file problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorWarning {
    /// Date is not a valid `YYYY-MM-DD` calendar date.
    InvalidDate { value: String },
}

impl Display for DescriptorWarning {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidDate { value } => write!(
                fmt,
                "invalid ISO date {value:?}, expected YYYY-MM-DD, skipping date"
            ),
        }
    }
}

/// Parse strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    // INVARIANT: Exactly four digit year, two digit month, and two digit day.
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(idx, byte)| idx == 4 || idx == 7 || byte.is_ascii_digit());

    if !shaped {
        return None;
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn strip_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let prefix = line.get(..key.len())?;
    prefix
        .eq_ignore_ascii_case(key)
        .then(|| &line[key.len()..])
}

fn date_to_string(value: &Value) -> Option<String> {
    match value {
        // INVARIANT: Falsy values mean no date at all.
        Value::Null | Value::Bool(false) => None,
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::Sequence(_) | Value::Mapping(_) => Some(
            serde_yaml::to_string(value)
                .map(|yaml| yaml.trim().to_owned())
                .unwrap_or_default(),
        ),
        _ => scalar_to_string(value),
    }
}

/// Structured format parse failure without file context.
#[derive(Debug, thiserror::Error)]
pub enum StructuredError {
    /// Document is not valid YAML.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Document is valid YAML, but not a mapping.
    #[error("document is not a key-value mapping")]
    NotAMapping,
}

/// Collect file error types.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// Collect file cannot be read.
    #[error("failed to read collect file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Structured collect file is not valid YAML.
    #[error("failed to parse YAML collect file at {:?}", path.display())]
    Yaml {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },

    /// Structured collect file is not a key-value mapping.
    #[error("YAML collect file at {:?} is not a key-value mapping", path.display())]
    NotAMapping { path: PathBuf },
}

/// Friendly result alias :3
type Result<T, E = DescriptorError> = std::result::Result<T, E>;
