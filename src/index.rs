// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Date and category index management.
//!
//! The __index__ is a directory tree of symbolic links that groups source
//! directories by the date and categories their collect files declare:
//!
//! ```text
//! <index_root>/
//! ├── Category/
//! │   ├── Action/CURRENT -> /media/Show/Ep01/CURRENT
//! │   └── Drama/CURRENT -> /media/Show/Ep01/CURRENT
//! └── Date/
//!     └── 2023-07-01/CURRENT -> /media/Show/Ep01/CURRENT
//! ```
//!
//! With grouped dates, `Date/2023-07-01/` becomes `Date/2023/07/01/`.
//!
//! Nothing in the index is authoritative. The collect files are. Hence, the
//! index can be removed and rebuilt at any time without losing anything.
//!
//! # See Also
//!
//! 1. [`Descriptor`](crate::descriptor::Descriptor)
//! 2. [`Marker`](crate::marker::Marker)

pub mod eraser;
pub mod writer;

use crate::{
    descriptor::Descriptor,
    index::{
        eraser::remove_indexes,
        writer::{IndexOptions, IndexWriter, LinkTally, WriteError, CATEGORY_DIR, DATE_DIR},
    },
    marker::{find_markers, Marker},
    path::resolve,
    scan::{ExcludeSubstrings, TreeScanner},
};

use std::{
    fs::rename,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, instrument, warn};

/// Outcome of a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    /// Number of collect files that were indexed.
    pub processed: usize,

    /// Link outcomes across all indexed collect files.
    pub links: LinkTally,
}

/// Index management for one command invocation.
///
/// Bundles the search root, the index writer, and the scan exclusions, so
/// every command sees the same settings.
#[derive(Debug, Clone)]
pub struct Indexer {
    search_root: PathBuf,
    writer: IndexWriter,
    exclude: Vec<String>,
}

impl Indexer {
    /// Construct new indexer.
    ///
    /// Both roots are made absolute up front so links always carry absolute
    /// targets.
    ///
    /// # Errors
    ///
    /// - Return [`IndexError::Resolve`] if a root cannot be made absolute.
    pub fn new(
        search_root: impl AsRef<Path>,
        index_root: impl AsRef<Path>,
        options: IndexOptions,
    ) -> Result<Self> {
        let absolute = |path: &Path| {
            resolve(path).map_err(|err| IndexError::Resolve {
                source: err,
                path: path.to_path_buf(),
            })
        };

        Ok(Self {
            search_root: absolute(search_root.as_ref())?,
            writer: IndexWriter::new(absolute(index_root.as_ref())?, options),
            exclude: Vec::new(),
        })
    }

    /// Prune directories whose path contains any of these substrings.
    pub fn with_exclusions(mut self, exclude: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    /// Resolved tree that gets scanned for collect files.
    pub fn search_root(&self) -> &Path {
        self.search_root.as_path()
    }

    /// Resolved directory holding `Date/` and `Category/`.
    pub fn index_root(&self) -> &Path {
        self.writer.root()
    }

    /// Build or update the index from collect files under search root.
    ///
    /// Unreadable or malformed collect files are logged and skipped, as are
    /// collect files that declare nothing.
    ///
    /// # Errors
    ///
    /// - Return [`IndexError::MissingSearchRoot`] if search root is not a
    ///   directory.
    /// - Return [`IndexError::Write`] if the index root directories cannot be
    ///   created.
    #[instrument(skip(self), level = "debug")]
    pub fn build(&self) -> Result<BuildSummary> {
        if !self.search_root.is_dir() {
            return Err(IndexError::MissingSearchRoot {
                path: self.search_root.clone(),
            });
        }

        self.writer.ensure_directory(self.index_root().join(DATE_DIR))?;
        self.writer
            .ensure_directory(self.index_root().join(CATEGORY_DIR))?;

        info!("scanning for collect files in {}", self.search_root.display());
        let mut summary = BuildSummary::default();
        for marker in find_markers(&self.scanner()) {
            let Some(descriptor) = self.read_descriptor(&marker) else {
                continue;
            };

            if descriptor.is_empty() {
                debug!("nothing to index in {}", marker.path().display());
                continue;
            }

            let source_dir = marker.dir();
            summary
                .links
                .merge(self.writer.index_entry(source_dir, &descriptor));
            summary.processed += 1;
        }

        info!(
            "processed {} collect file(s), index at {}",
            summary.processed,
            self.index_root().display()
        );
        debug!("{:?}", summary.links);

        Ok(summary)
    }

    /// Remove `Date/` and `Category/` from index root.
    ///
    /// # Errors
    ///
    /// - Return [`IndexError::Write`] if index root cannot be created.
    /// - Return [`IndexError::Erase`] if index directories cannot be removed.
    #[instrument(skip(self), level = "debug")]
    pub fn remove(&self) -> Result<()> {
        self.writer.ensure_directory(self.index_root())?;
        remove_indexes(self.index_root(), self.writer.options())?;

        Ok(())
    }

    /// Remove the index, then build it again.
    ///
    /// # Errors
    ///
    /// - Return any error of [`Indexer::remove`] or [`Indexer::build`].
    pub fn rebuild(&self) -> Result<BuildSummary> {
        self.remove()?;
        self.build()
    }

    /// Rename visible collect files to their hidden form.
    ///
    /// Returns number of collect files hidden.
    ///
    /// # Errors
    ///
    /// - Return [`IndexError::MissingSearchRoot`] if search root is not a
    ///   directory.
    #[instrument(skip(self), level = "debug")]
    pub fn hide(&self) -> Result<usize> {
        if !self.search_root.is_dir() {
            return Err(IndexError::MissingSearchRoot {
                path: self.search_root.clone(),
            });
        }

        let mut count = 0;
        for marker in find_markers(&self.scanner()) {
            let Some(hidden) = marker.hidden_path() else {
                continue;
            };

            if self.writer.options().dry_run {
                info!("[dry-run] mv {} {}", marker.path().display(), hidden.display());
            } else if let Err(err) = rename(marker.path(), &hidden) {
                error!(
                    "failed to rename {} -> {}: {err}",
                    marker.path().display(),
                    hidden.display()
                );
                continue;
            } else {
                debug!("renamed {} -> {}", marker.path().display(), hidden.display());
            }
            count += 1;
        }

        info!("hid {count} file(s)");

        Ok(count)
    }

    fn scanner(&self) -> TreeScanner {
        TreeScanner::new(&self.search_root).with_policy(ExcludeSubstrings::new(self.exclude.clone()))
    }

    fn read_descriptor(&self, marker: &Marker) -> Option<Descriptor> {
        match Descriptor::load(marker) {
            Ok(parsed) => {
                for warning in &parsed.warnings {
                    warn!("{}: {warning}", marker.path().display());
                }
                debug!(
                    "parsed {}: date={:?}, categories={:?}",
                    marker.path().display(),
                    parsed.descriptor.date,
                    parsed.descriptor.categories
                );
                Some(parsed.descriptor)
            }
            Err(err) => {
                error!("{:#}", anyhow::Error::from(err));
                None
            }
        }
    }
}

/// Index management error types.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Search root does not exist or is not a directory.
    #[error("search root {:?} is not a directory", path.display())]
    MissingSearchRoot { path: PathBuf },

    /// Root path cannot be made absolute.
    #[error("failed to resolve {:?}", path.display())]
    Resolve {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Index directories cannot be written.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Index directories cannot be removed.
    #[error(transparent)]
    Erase(#[from] crate::index::eraser::EraseError),
}

/// Friendly result alias :3
pub type Result<T, E = IndexError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, write};

    #[sealed_test]
    fn build_skips_empty_and_broken_collect_files() -> anyhow::Result<()> {
        create_dir_all("media/empty")?;
        create_dir_all("media/broken")?;
        create_dir_all("media/dated")?;
        write("media/empty/collect.txt", "Date:\nCategory:\n")?;
        write("media/broken/collect.yaml", "categories: [unclosed")?;
        write("media/dated/collect.txt", "Date:2024-03-05\n")?;

        let indexer = Indexer::new("media", "idx", IndexOptions::default())?;
        let summary = indexer.build()?;
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.links.created, 1);
        assert!(Path::new("idx/Date/2024-03-05/dated").exists());
        assert!(Path::new("idx/Category").is_dir());

        Ok(())
    }

    #[sealed_test]
    fn build_honors_exclusions() -> anyhow::Result<()> {
        create_dir_all("media/keep")?;
        create_dir_all("media/_Production_Resources/skip")?;
        write("media/keep/collect.txt", "Category:Show\n")?;
        write("media/_Production_Resources/skip/collect.txt", "Category:Show\n")?;

        let indexer = Indexer::new("media", "idx", IndexOptions::default())?
            .with_exclusions(["_Production_Resources"]);
        let summary = indexer.build()?;
        assert_eq!(summary.processed, 1);
        assert!(Path::new("idx/Category/Show/keep").exists());
        assert!(!Path::new("idx/Category/Show/skip").exists());

        Ok(())
    }

    #[sealed_test]
    fn build_rejects_missing_search_root() -> anyhow::Result<()> {
        let indexer = Indexer::new("nowhere", "idx", IndexOptions::default())?;
        assert!(matches!(
            indexer.build(),
            Err(IndexError::MissingSearchRoot { .. })
        ));
        assert!(!Path::new("idx").exists());

        Ok(())
    }

    #[sealed_test]
    fn hide_renames_visible_collect_files() -> anyhow::Result<()> {
        create_dir_all("media/a")?;
        create_dir_all("media/b")?;
        write("media/a/collect.yaml", "categories: A\n")?;
        write("media/b/.collect.txt", "Category:B\n")?;

        let indexer = Indexer::new("media", "idx", IndexOptions::default())?;
        assert_eq!(indexer.hide()?, 1);
        assert!(Path::new("media/a/.collect.yaml").exists());
        assert!(!Path::new("media/a/collect.yaml").exists());
        assert!(Path::new("media/b/.collect.txt").exists());

        Ok(())
    }
}
