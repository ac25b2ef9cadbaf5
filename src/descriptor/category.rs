// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Category label normalization.
//!
//! Items of a YAML category sequence are coerced one by one. Strings and
//! numbers keep their text, booleans become `true` or `false`, and `null` or
//! nested sequences and mappings are dropped since they never name a
//! category directory.

use serde_yaml::Value;
use std::collections::HashSet;

/// Raw category input as it appears in a collect file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySource {
    /// Comma-delimited labels, e.g., `"Action, Drama"`.
    Delimited(String),

    /// Sequence of individual labels.
    Sequence(Vec<String>),
}

impl CategorySource {
    /// Interpret a YAML value as a category source.
    ///
    /// Strings are treated as comma-delimited. Sequences have each scalar
    /// item coerced to a string. Anything else carries no categories.
    pub fn from_yaml(value: &Value) -> Option<Self> {
        match value {
            Value::String(labels) => Some(Self::Delimited(labels.clone())),
            Value::Sequence(items) => Some(Self::Sequence(
                items.iter().filter_map(scalar_to_string).collect(),
            )),
            _ => None,
        }
    }

    fn labels(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Self::Delimited(labels) => Box::new(labels.split(',')),
            Self::Sequence(labels) => Box::new(labels.iter().map(String::as_str)),
        }
    }
}

/// Normalize category sources into final label listing.
///
/// # Invariant
///
/// - Labels are trimmed.
/// - No empty labels.
/// - No duplicate labels, first occurrence wins.
pub fn normalize<'a>(sources: impl IntoIterator<Item = &'a CategorySource>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut labels = Vec::new();

    for label in sources.into_iter().flat_map(CategorySource::labels) {
        let label = label.trim();
        if !label.is_empty() && seen.insert(label.to_owned()) {
            labels.push(label.to_owned());
        }
    }

    labels
}

/// Coerce YAML scalar to string.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(string) => Some(string.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
