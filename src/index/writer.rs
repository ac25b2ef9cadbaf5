// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Symbolic link index writing.
//!
//! Every write is idempotent. A link that already points where it should is
//! left alone, so building the same index twice changes nothing the second
//! time around. Anything in the way of a link is only replaced when the
//! caller asks for it through [`IndexOptions::force`].

use crate::descriptor::Descriptor;

use chrono::{Datelike, NaiveDate};
use std::{
    fs::{canonicalize, remove_dir_all, remove_file, symlink_metadata},
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, error, info, warn};

/// Name of date index directory under index root.
pub const DATE_DIR: &str = "Date";

/// Name of category index directory under index root.
pub const CATEGORY_DIR: &str = "Category";

/// Behavior switches shared by all index operations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Replace existing links or directories that are in the way.
    pub force: bool,

    /// Only log intended actions, never touch the file system.
    pub dry_run: bool,

    /// Use `Date/YYYY/MM/DD` instead of `Date/YYYY-MM-DD`.
    pub group_dates: bool,
}

/// What happened to a single link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Link did not exist and was created.
    Created,

    /// Link already pointed at target.
    Unchanged,

    /// Something else was in the way and got replaced.
    Replaced,

    /// Something else was in the way and was left alone.
    Skipped,
}

/// Running count of link outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkTally {
    /// Links made fresh.
    pub created: usize,

    /// Links that already pointed at their target.
    pub unchanged: usize,

    /// Wrong entries swapped out under force.
    pub replaced: usize,

    /// Wrong entries left alone without force.
    pub skipped: usize,

    /// Links that could not be written at all.
    pub failed: usize,
}

impl LinkTally {
    /// Count a link outcome.
    pub fn record(&mut self, outcome: LinkOutcome) {
        match outcome {
            LinkOutcome::Created => self.created += 1,
            LinkOutcome::Unchanged => self.unchanged += 1,
            LinkOutcome::Replaced => self.replaced += 1,
            LinkOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Count a failed link.
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Fold another tally into this one.
    pub fn merge(&mut self, other: LinkTally) {
        self.created += other.created;
        self.unchanged += other.unchanged;
        self.replaced += other.replaced;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Writer of `Date/` and `Category/` symbolic link index.
#[derive(Debug, Clone)]
pub struct IndexWriter {
    root: PathBuf,
    options: IndexOptions,
}

impl IndexWriter {
    /// Construct new index writer rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, options: IndexOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    /// Index root every link lands under.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Options the writer was built with.
    pub fn options(&self) -> IndexOptions {
        self.options
    }

    /// Directory that holds links for given date.
    pub fn date_dir(&self, date: NaiveDate) -> PathBuf {
        let dates = self.root.join(DATE_DIR);
        if self.options.group_dates {
            dates
                .join(format!("{:04}", date.year()))
                .join(format!("{:02}", date.month()))
                .join(format!("{:02}", date.day()))
        } else {
            dates.join(date.format("%Y-%m-%d").to_string())
        }
    }

    /// Directory that holds links for given category.
    ///
    /// Returns `None` if category label is not usable as a single directory
    /// name.
    pub fn category_dir(&self, label: &str) -> Option<PathBuf> {
        let mut components = Path::new(label).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == label => {
                Some(self.root.join(CATEGORY_DIR).join(name))
            }
            _ => None,
        }
    }

    /// Create directory and any missing parents.
    ///
    /// # Errors
    ///
    /// - Return [`WriteError::CreateDir`] if directory cannot be created.
    pub fn ensure_directory(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if self.options.dry_run {
            if !path.is_dir() {
                info!("[dry-run] mkdir -p {}", path.display());
            }
            return Ok(());
        }

        if let Some(created) = mkdirp::mkdirp(path).map_err(|err| WriteError::CreateDir {
            source: err,
            path: path.to_path_buf(),
        })? {
            debug!("created directory {}", created.display());
        }

        Ok(())
    }

    /// Make `link` a symbolic link to directory `target`.
    ///
    /// # Errors
    ///
    /// - Return [`WriteError::Inspect`] if existing entry at `link` cannot be
    ///   inspected.
    /// - Return [`WriteError::Remove`] if entry in the way cannot be removed.
    /// - Return [`WriteError::CreateLink`] if link cannot be created.
    pub fn ensure_link(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<LinkOutcome> {
        let (link, target) = (link.as_ref(), target.as_ref());
        let mut outcome = LinkOutcome::Created;

        match symlink_metadata(link) {
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(WriteError::Inspect {
                    source: err,
                    path: link.to_path_buf(),
                })
            }
            Ok(metadata) => {
                if metadata.file_type().is_symlink() && points_at(link, target) {
                    debug!("link ok: {} -> {}", link.display(), target.display());
                    return Ok(LinkOutcome::Unchanged);
                }

                if !self.options.force {
                    info!("exists (use --force to replace): {}", link.display());
                    return Ok(LinkOutcome::Skipped);
                }

                outcome = LinkOutcome::Replaced;
                if self.options.dry_run {
                    info!("[dry-run] rm -rf {}", link.display());
                } else {
                    let removal = if metadata.is_dir() {
                        remove_dir_all(link)
                    } else {
                        remove_file(link)
                    };
                    removal.map_err(|err| WriteError::Remove {
                        source: err,
                        path: link.to_path_buf(),
                    })?;
                }
            }
        }

        if self.options.dry_run {
            info!("[dry-run] ln -s {} {}", target.display(), link.display());
            return Ok(outcome);
        }

        symlink_dir(target, link).map_err(|err| WriteError::CreateLink {
            source: err,
            link: link.to_path_buf(),
            target: target.to_path_buf(),
        })?;
        info!("symlink created: {} -> {}", link.display(), target.display());

        Ok(outcome)
    }

    /// Index source directory by its categories and date.
    ///
    /// Each link is named after the base name of `source_dir`. Failures are
    /// logged and counted, and never stop the remaining links from being
    /// written.
    pub fn index_entry(&self, source_dir: impl AsRef<Path>, descriptor: &Descriptor) -> LinkTally {
        let source_dir = source_dir.as_ref();
        let mut tally = LinkTally::default();

        let Some(name) = source_dir.file_name() else {
            warn!("cannot index {} without a base name", source_dir.display());
            return tally;
        };

        for label in &descriptor.categories {
            let Some(dir) = self.category_dir(label) else {
                warn!(
                    "category {label:?} of {} is not a valid directory name, skipping",
                    source_dir.display()
                );
                tally.record_failure();
                continue;
            };
            self.link_into(&dir, name.as_ref(), source_dir, &mut tally);
        }

        if let Some(date) = descriptor.date {
            let dir = self.date_dir(date);
            self.link_into(&dir, name.as_ref(), source_dir, &mut tally);
        }

        tally
    }

    fn link_into(&self, dir: &Path, name: &Path, target: &Path, tally: &mut LinkTally) {
        let result = self
            .ensure_directory(dir)
            .and_then(|_| self.ensure_link(dir.join(name), target));

        match result {
            Ok(outcome) => tally.record(outcome),
            Err(err) => {
                error!("{:#}", anyhow::Error::from(err));
                tally.record_failure();
            }
        }
    }
}

fn points_at(link: &Path, target: &Path) -> bool {
    match (canonicalize(link), canonicalize(target)) {
        (Ok(current), Ok(wanted)) => current == wanted,
        _ => false,
    }
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

/// Index writing error types.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Directory cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Existing entry cannot be inspected.
    #[error("failed to inspect {:?}", path.display())]
    Inspect {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Entry in the way of a link cannot be removed.
    #[error("failed to remove {:?}", path.display())]
    Remove {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Symbolic link cannot be created.
    #[error("failed to create symlink {:?} -> {:?}", link.display(), target.display())]
    CreateLink {
        #[source]
        source: std::io::Error,
        link: PathBuf,
        target: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = WriteError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, read_link, write};

    fn cwd() -> PathBuf {
        std::env::current_dir().unwrap().canonicalize().unwrap()
    }

    fn writer(options: IndexOptions) -> IndexWriter {
        IndexWriter::new(cwd().join("idx"), options)
    }

    #[test]
    fn date_dir_flat_or_grouped() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();

        let flat = IndexWriter::new("idx", IndexOptions::default());
        assert_eq!(flat.date_dir(date), PathBuf::from("idx/Date/2023-07-01"));

        let grouped = IndexWriter::new(
            "idx",
            IndexOptions {
                group_dates: true,
                ..Default::default()
            },
        );
        assert_eq!(grouped.date_dir(date), PathBuf::from("idx/Date/2023/07/01"));
    }

    #[test]
    fn category_dir_rejects_path_like_labels() {
        let writer = IndexWriter::new("idx", IndexOptions::default());
        assert_eq!(
            writer.category_dir("Action"),
            Some(PathBuf::from("idx/Category/Action"))
        );
        assert_eq!(writer.category_dir(".."), None);
        assert_eq!(writer.category_dir("."), None);
        assert_eq!(writer.category_dir("a/b"), None);
        assert_eq!(writer.category_dir("/etc"), None);
    }

    #[sealed_test]
    fn ensure_link_is_idempotent() -> anyhow::Result<()> {
        create_dir_all("src/trip")?;
        create_dir_all("idx")?;
        let target = cwd().join("src/trip");
        let link = cwd().join("idx/trip");
        let writer = writer(IndexOptions::default());

        assert_eq!(writer.ensure_link(&link, &target)?, LinkOutcome::Created);
        assert_eq!(read_link(&link)?, target);
        assert_eq!(writer.ensure_link(&link, &target)?, LinkOutcome::Unchanged);

        Ok(())
    }

    #[sealed_test]
    fn ensure_link_replaces_only_with_force() -> anyhow::Result<()> {
        create_dir_all("src/right")?;
        create_dir_all("src/wrong")?;
        create_dir_all("idx")?;
        let link = cwd().join("idx/trip");
        symlink_dir(&cwd().join("src/wrong"), &link)?;

        let result = writer(IndexOptions::default()).ensure_link(&link, cwd().join("src/right"))?;
        assert_eq!(result, LinkOutcome::Skipped);
        assert_eq!(read_link(&link)?, cwd().join("src/wrong"));

        let force = IndexOptions {
            force: true,
            ..Default::default()
        };
        let result = writer(force).ensure_link(&link, cwd().join("src/right"))?;
        assert_eq!(result, LinkOutcome::Replaced);
        assert_eq!(read_link(&link)?, cwd().join("src/right"));

        Ok(())
    }

    #[sealed_test]
    fn ensure_link_force_replaces_real_directory() -> anyhow::Result<()> {
        create_dir_all("src/trip")?;
        create_dir_all("idx/trip/stale")?;
        write("idx/trip/stale/file.txt", "old")?;
        let link = cwd().join("idx/trip");
        let force = IndexOptions {
            force: true,
            ..Default::default()
        };

        let result = writer(force).ensure_link(&link, cwd().join("src/trip"))?;
        assert_eq!(result, LinkOutcome::Replaced);
        assert!(symlink_metadata(&link)?.file_type().is_symlink());

        Ok(())
    }

    #[sealed_test]
    fn ensure_link_dry_run_touches_nothing() -> anyhow::Result<()> {
        create_dir_all("src/right")?;
        create_dir_all("src/wrong")?;
        create_dir_all("idx")?;
        let stale = cwd().join("idx/stale");
        symlink_dir(&cwd().join("src/wrong"), &stale)?;
        let options = IndexOptions {
            force: true,
            dry_run: true,
            ..Default::default()
        };
        let writer = writer(options);

        let fresh = cwd().join("idx/fresh");
        assert_eq!(writer.ensure_link(&fresh, cwd().join("src/right"))?, LinkOutcome::Created);
        assert!(symlink_metadata(&fresh).is_err());

        assert_eq!(writer.ensure_link(&stale, cwd().join("src/right"))?, LinkOutcome::Replaced);
        assert_eq!(read_link(&stale)?, cwd().join("src/wrong"));

        writer.ensure_directory(cwd().join("idx/new/nested"))?;
        assert!(!cwd().join("idx/new").exists());

        Ok(())
    }

    #[sealed_test]
    fn index_entry_links_categories_and_date() -> anyhow::Result<()> {
        create_dir_all("src/CURRENT")?;
        let source = cwd().join("src/CURRENT");
        let descriptor = Descriptor {
            date: NaiveDate::from_ymd_opt(2023, 7, 1),
            categories: vec!["Action".into(), "..".into(), "Drama".into()],
        };
        let options = IndexOptions {
            group_dates: true,
            ..Default::default()
        };

        let tally = writer(options).index_entry(&source, &descriptor);
        let expect = LinkTally {
            created: 3,
            ..Default::default()
        };
        assert_eq!(tally, expect);

        for link in [
            "idx/Category/Action/CURRENT",
            "idx/Category/Drama/CURRENT",
            "idx/Date/2023/07/01/CURRENT",
        ] {
            assert_eq!(read_link(cwd().join(link))?, source);
        }

        Ok(())
    }

    #[sealed_test]
    fn index_entry_counts_failures_and_continues() -> anyhow::Result<()> {
        create_dir_all("src/trip")?;
        create_dir_all("idx/Category")?;
        // A plain file where a category directory should go.
        write("idx/Category/Blocked", "")?;
        let descriptor = Descriptor {
            date: None,
            categories: vec!["Blocked".into(), "Open".into()],
        };

        let tally = writer(IndexOptions::default()).index_entry(cwd().join("src/trip"), &descriptor);
        let expect = LinkTally {
            created: 1,
            failed: 1,
            ..Default::default()
        };
        assert_eq!(tally, expect);
        assert!(cwd().join("idx/Category/Open/trip").exists());

        Ok(())
    }

    #[sealed_test]
    fn index_entry_counts_rejected_labels_as_failed() -> anyhow::Result<()> {
        create_dir_all("src/trip")?;
        let descriptor = Descriptor {
            date: None,
            categories: vec!["../escape".into(), "Travel".into()],
        };

        let tally = writer(IndexOptions::default()).index_entry(cwd().join("src/trip"), &descriptor);
        let expect = LinkTally {
            created: 1,
            failed: 1,
            ..Default::default()
        };
        assert_eq!(tally, expect);
        assert!(!cwd().join("idx/escape").exists());
        assert!(cwd().join("idx/Category/Travel/trip").exists());

        Ok(())
    }
}
