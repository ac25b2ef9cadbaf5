// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Collect file seeding.
//!
//! Drops a template `collect.txt` into every directory of a tree that does
//! not have one yet, stamped with the date the directory was created:
//!
//! ```text
//! Date:2024_03_05
//! Category:
//! ```
//!
//! The seeder can instead repair a misspelled collect file name across a
//! whole tree. Both passes leave existing files alone.

use crate::scan::TreeScanner;

use chrono::{DateTime, Local};
use std::{
    fs::{metadata, rename, write},
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, error, info, instrument};

/// File name of seeded template.
pub const TEMPLATE_NAME: &str = "collect.txt";

/// What a seeding pass should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedMode {
    /// Write template collect file into directories lacking one.
    Template,

    /// Rename `misspelled` to `correct` wherever `correct` is missing.
    FixName { misspelled: String, correct: String },
}

/// Seeder of collect files.
#[derive(Debug, Clone)]
pub struct Seeder {
    root: PathBuf,
    dry_run: bool,
}

impl Seeder {
    /// Construct new seeder over every directory below and including `root`.
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    /// Run seeding pass.
    ///
    /// Returns number of directories changed. Failures for individual
    /// directories are logged and skipped.
    ///
    /// # Errors
    ///
    /// - Return [`SeedError::MissingRoot`] if root is not a directory.
    #[instrument(skip(self), level = "debug")]
    pub fn run(&self, mode: &SeedMode) -> Result<usize> {
        if !self.root.is_dir() {
            return Err(SeedError::MissingRoot {
                path: self.root.clone(),
            });
        }

        let mut count = 0;
        for dir in TreeScanner::new(&self.root).include_root(true).directories() {
            let result = match mode {
                SeedMode::Template => self.seed_directory(&dir),
                SeedMode::FixName {
                    misspelled,
                    correct,
                } => self.fix_name(&dir, misspelled, correct),
            };

            match result {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(err) => error!("{:#}", anyhow::Error::from(err)),
            }
        }

        match mode {
            SeedMode::Template => info!("seeded {count} collect file(s)"),
            SeedMode::FixName { .. } => info!("renamed {count} file(s)"),
        }

        Ok(count)
    }

    /// Write template collect file into directory if missing.
    ///
    /// Returns `true` if template was (or would be) written.
    ///
    /// # Errors
    ///
    /// - Return [`SeedError::Metadata`] if directory timestamps cannot be read.
    /// - Return [`SeedError::Write`] if template cannot be written.
    pub fn seed_directory(&self, dir: impl AsRef<Path>) -> Result<bool> {
        let dir = dir.as_ref();
        let path = dir.join(TEMPLATE_NAME);
        if path.exists() {
            debug!("already seeded: {}", path.display());
            return Ok(false);
        }

        let created = creation_time(dir)?;
        let content = template(created.into());
        if self.dry_run {
            info!("[dry-run] write {}", path.display());
            return Ok(true);
        }

        write(&path, content).map_err(|err| SeedError::Write {
            source: err,
            path: path.clone(),
        })?;
        info!("seeded {}", path.display());

        Ok(true)
    }

    /// Rename misspelled file in directory if correct one is missing.
    ///
    /// Returns `true` if file was (or would be) renamed.
    ///
    /// # Errors
    ///
    /// - Return [`SeedError::Rename`] if file cannot be renamed.
    pub fn fix_name(&self, dir: impl AsRef<Path>, misspelled: &str, correct: &str) -> Result<bool> {
        let from = dir.as_ref().join(misspelled);
        let to = dir.as_ref().join(correct);
        if !from.exists() || to.exists() {
            return Ok(false);
        }

        if self.dry_run {
            info!("[dry-run] mv {} {}", from.display(), to.display());
            return Ok(true);
        }

        rename(&from, &to).map_err(|err| SeedError::Rename {
            source: err,
            from: from.clone(),
            to: to.clone(),
        })?;
        info!("renamed {} -> {}", from.display(), to.display());

        Ok(true)
    }
}

/// Render template collect file for directory created at given time.
pub fn template(created: DateTime<Local>) -> String {
    format!("{}\nCategory:\n", created.format("Date:%Y_%m_%d"))
}

// INVARIANT: Not every platform or file system records creation time, so
// fall back to modification time.
fn creation_time(dir: &Path) -> Result<SystemTime> {
    let to_error = |err| SeedError::Metadata {
        source: err,
        path: dir.to_path_buf(),
    };
    let metadata = metadata(dir).map_err(to_error)?;
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map_err(to_error)
}

/// Seeding error types.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Root does not exist or is not a directory.
    #[error("seed root {:?} is not a directory", path.display())]
    MissingRoot { path: PathBuf },

    /// Directory timestamps cannot be read.
    #[error("failed to read timestamps of {:?}", path.display())]
    Metadata {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Template cannot be written.
    #[error("failed to write template to {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be renamed.
    #[error("failed to rename {:?} to {:?}", from.display(), to.display())]
    Rename {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = SeedError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, read_to_string};

    #[test]
    fn template_stamps_creation_date() {
        let created = Local.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(template(created), "Date:2024_03_05\nCategory:\n");
    }

    #[sealed_test]
    fn seed_fills_every_directory_once() -> anyhow::Result<()> {
        create_dir_all("tree/a/b")?;
        create_dir_all("tree/c")?;
        write("tree/c/collect.txt", "Category:Keep\n")?;

        let seeder = Seeder::new("tree", false);
        assert_eq!(seeder.run(&SeedMode::Template)?, 3);
        for dir in ["tree", "tree/a", "tree/a/b"] {
            let content = read_to_string(Path::new(dir).join(TEMPLATE_NAME))?;
            assert!(content.starts_with("Date:"));
            assert!(content.ends_with("Category:\n"));
        }
        assert_eq!(read_to_string("tree/c/collect.txt")?, "Category:Keep\n");

        assert_eq!(seeder.run(&SeedMode::Template)?, 0);

        Ok(())
    }

    #[sealed_test]
    fn seed_dry_run_writes_nothing() -> anyhow::Result<()> {
        create_dir_all("tree/a")?;

        let seeder = Seeder::new("tree", true);
        assert_eq!(seeder.run(&SeedMode::Template)?, 2);
        assert!(!Path::new("tree/collect.txt").exists());
        assert!(!Path::new("tree/a/collect.txt").exists());

        Ok(())
    }

    #[sealed_test]
    fn fix_name_renames_only_where_needed() -> anyhow::Result<()> {
        create_dir_all("tree/a")?;
        create_dir_all("tree/b")?;
        write("tree/a/colect.txt", "Category:A\n")?;
        write("tree/b/colect.txt", "Category:Stale\n")?;
        write("tree/b/collect.txt", "Category:B\n")?;

        let mode = SeedMode::FixName {
            misspelled: "colect.txt".into(),
            correct: "collect.txt".into(),
        };
        assert_eq!(Seeder::new("tree", false).run(&mode)?, 1);
        assert_eq!(read_to_string("tree/a/collect.txt")?, "Category:A\n");
        assert!(!Path::new("tree/a/colect.txt").exists());
        assert_eq!(read_to_string("tree/b/collect.txt")?, "Category:B\n");
        assert!(Path::new("tree/b/colect.txt").exists());
        assert!(!Path::new("tree/collect.txt").exists());

        Ok(())
    }

    #[sealed_test]
    fn seed_rejects_missing_root() {
        let result = Seeder::new("missing", false).run(&SeedMode::Template);
        assert!(matches!(result, Err(SeedError::MissingRoot { .. })));
    }
}
