// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Recursive directory traversal.
//!
//! The scanner only knows how to walk. What gets walked is decided by a
//! [`DescentPolicy`], so pruning rules can be swapped out and tested without
//! touching the traversal itself.
//!
//! Symbolic links are never followed. Thus, a scan never wanders into a
//! generated index that happens to live under the search root.

use ignore::{DirEntry, WalkBuilder};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::warn;

/// Decide whether a directory should be descended into.
pub trait DescentPolicy: Send + Sync + 'static {
    /// Check if directory at `path` and everything below it should be
    /// visited.
    fn should_descend(&self, path: &Path) -> bool;
}

impl<F> DescentPolicy for F
where
    F: Fn(&Path) -> bool + Send + Sync + 'static,
{
    fn should_descend(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Descend into everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescendAll;

impl DescentPolicy for DescendAll {
    fn should_descend(&self, _: &Path) -> bool {
        true
    }
}

/// Prune any directory whose full path contains a sentinel substring.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExcludeSubstrings {
    sentinels: Vec<String>,
}

impl ExcludeSubstrings {
    /// Construct new substring exclusion policy.
    pub fn new(sentinels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            sentinels: sentinels.into_iter().map(Into::into).collect(),
        }
    }
}

impl DescentPolicy for ExcludeSubstrings {
    fn should_descend(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        !self
            .sentinels
            .iter()
            .any(|sentinel| path.contains(sentinel.as_str()))
    }
}

/// Recursive directory scanner.
#[derive(Clone)]
pub struct TreeScanner {
    root: PathBuf,
    include_root: bool,
    policy: Arc<dyn DescentPolicy>,
}

impl TreeScanner {
    /// Construct new scanner over everything below `root`.
    ///
    /// The root itself is not yielded unless [`TreeScanner::include_root`] is
    /// set.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_root: false,
            policy: Arc::new(DescendAll),
        }
    }

    /// Yield the root directory as the first candidate.
    pub fn include_root(mut self, yes: bool) -> Self {
        self.include_root = yes;
        self
    }

    /// Use given descent policy to prune subtrees.
    pub fn with_policy(mut self, policy: impl DescentPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Root of the scan.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Walk directories lazily in traversal order.
    ///
    /// Entries within a directory are visited by file name. Traversal errors
    /// are logged and skipped so one unreadable subtree never stops the rest
    /// of the walk.
    pub fn directories(&self) -> impl Iterator<Item = PathBuf> {
        // INVARIANT: An excluded root means nothing gets visited.
        let root_allowed = self.policy.should_descend(&self.root);

        let policy = Arc::clone(&self.policy);
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|lhs, rhs| lhs.cmp(rhs))
            .filter_entry(move |entry| !is_dir(entry) || policy.should_descend(entry.path()))
            .build();

        let include_root = self.include_root;
        walker
            .take_while(move |_| root_allowed)
            .filter_map(|result| match result {
                Ok(entry) => Some(entry),
                Err(error) => {
                    warn!("skipping unreadable entry: {error}");
                    None
                }
            })
            .filter(move |entry| is_dir(entry) && (include_root || entry.depth() > 0))
            .map(DirEntry::into_path)
    }
}

fn is_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|kind| kind.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, write};

    fn relative(root: &Path, paths: impl IntoIterator<Item = PathBuf>) -> Vec<String> {
        paths
            .into_iter()
            .map(|path| {
                path.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[sealed_test]
    fn scan_yields_nested_directories_only() -> anyhow::Result<()> {
        create_dir_all("root/a/b")?;
        create_dir_all("root/.hidden")?;
        write("root/a/file.txt", "")?;

        let scanner = TreeScanner::new("root");
        let result = relative(Path::new("root"), scanner.directories());
        assert_eq!(result, vec![".hidden", "a", "a/b"]);

        let scanner = TreeScanner::new("root").include_root(true);
        let result = relative(Path::new("root"), scanner.directories());
        assert_eq!(result, vec!["", ".hidden", "a", "a/b"]);

        Ok(())
    }

    #[sealed_test]
    fn scan_prunes_excluded_subtrees() -> anyhow::Result<()> {
        create_dir_all("root/show/_Production_Resources/CURRENT")?;
        create_dir_all("root/show/ep01/CURRENT")?;

        let scanner =
            TreeScanner::new("root").with_policy(ExcludeSubstrings::new(["_Production_Resources"]));
        let result = relative(Path::new("root"), scanner.directories());
        assert_eq!(result, vec!["show", "show/ep01", "show/ep01/CURRENT"]);

        Ok(())
    }

    #[sealed_test]
    fn scan_with_excluded_root_yields_nothing() -> anyhow::Result<()> {
        create_dir_all("skip_me/a")?;

        let scanner = TreeScanner::new("skip_me")
            .include_root(true)
            .with_policy(|path: &Path| !path.to_string_lossy().contains("skip_me"));
        assert_eq!(scanner.directories().count(), 0);

        Ok(())
    }

    #[cfg(unix)]
    #[sealed_test]
    fn scan_does_not_follow_symlinks() -> anyhow::Result<()> {
        create_dir_all("root/real/inner")?;
        create_dir_all("elsewhere/deep")?;
        let elsewhere = std::env::current_dir()?.join("elsewhere");
        std::os::unix::fs::symlink(elsewhere, "root/link")?;

        let scanner = TreeScanner::new("root");
        let result = relative(Path::new("root"), scanner.directories());
        assert_eq!(result, vec!["real", "real/inner"]);

        Ok(())
    }

    #[test]
    fn exclude_substrings_matches_anywhere_in_path() {
        let policy = ExcludeSubstrings::new(["_Production_Resources"]);
        assert!(policy.should_descend(Path::new("/drive/show/ep01")));
        assert!(!policy.should_descend(Path::new("/drive/_Production_Resources")));
        assert!(!policy.should_descend(Path::new("/drive/old_Production_Resources_2/x")));
    }
}
