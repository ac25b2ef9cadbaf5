// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Index removal.
//!
//! The index is a disposable projection of the collect files, so the only
//! repair strategy is to wipe it and build it again.

use crate::index::writer::{IndexOptions, CATEGORY_DIR, DATE_DIR};

use std::{
    fs::{remove_dir_all, symlink_metadata},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Remove `Date/` and `Category/` under index root.
///
/// Missing directories are skipped.
///
/// # Errors
///
/// - Return [`EraseError`] if an existing index directory cannot be removed.
#[instrument(skip(root, options), level = "debug")]
pub fn remove_indexes(root: impl AsRef<Path>, options: IndexOptions) -> Result<()> {
    for sub in [DATE_DIR, CATEGORY_DIR] {
        let path = root.as_ref().join(sub);
        if symlink_metadata(&path).is_err() {
            debug!("not found (skip): {}", path.display());
            continue;
        }

        if options.dry_run {
            info!("[dry-run] rm -rf {}", path.display());
            continue;
        }

        remove_dir_all(&path).map_err(|err| EraseError {
            source: err,
            path: path.clone(),
        })?;
        info!("removed {}", path.display());
    }

    Ok(())
}

/// Index directory cannot be removed.
#[derive(Debug, thiserror::Error)]
#[error("failed to remove index directory {:?}", path.display())]
pub struct EraseError {
    #[source]
    source: std::io::Error,
    path: PathBuf,
}

/// Friendly result alias :3
pub type Result<T, E = EraseError> = std::result::Result<T, E>;
