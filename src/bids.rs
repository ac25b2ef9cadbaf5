// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Bids folder linking for a media production drive.
//!
//! The drive follows a fixed layout where every episode keeps its current
//! bids in a folder whose name contains `CURRENT`:
//!
//! ```text
//! <drive>/<show>/<episode>/<department>/CURRENT
//! ```
//!
//! Each such folder gets linked into one flat bids directory as
//! `<show>_<episode>_Bids`. Anything under `_Production_Resources` is shared
//! material and never linked.

use crate::{
    index::writer::{IndexWriter, LinkTally},
    scan::{ExcludeSubstrings, TreeScanner},
};

use std::{
    ffi::OsStr,
    path::{Component, Path, PathBuf},
};
use tracing::{info, instrument, warn};

/// Folder name fragment that marks a current bids folder.
pub const CURRENT_MARKER: &str = "CURRENT";

/// Path fragment of subtrees that are never searched.
pub const EXCLUDED_SUBTREE: &str = "_Production_Resources";

/// Show and episode a bids folder belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowEpisode {
    /// Show folder name, three levels above the bids folder.
    pub show: String,

    /// Episode folder name, two levels above the bids folder.
    pub episode: String,
}

impl ShowEpisode {
    /// Derive show and episode from position of bids folder in drive layout.
    ///
    /// Returns `None` if folder is not nested deep enough.
    pub fn from_folder(folder: impl AsRef<Path>) -> Option<Self> {
        let parent = folder.as_ref().parent()?;
        let names = parent
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name),
                _ => None,
            })
            .collect::<Vec<&OsStr>>();

        let [.., show, episode, _] = names.as_slice() else {
            return None;
        };

        Some(Self {
            show: show.to_string_lossy().into_owned(),
            episode: episode.to_string_lossy().into_owned(),
        })
    }

    /// Name of link in bids directory.
    pub fn link_name(&self) -> String {
        format!("{}_{}_Bids", self.show, self.episode)
    }
}

/// Find every current bids folder on the drive.
pub fn find_current_folders(drive_root: impl Into<PathBuf>) -> impl Iterator<Item = PathBuf> {
    TreeScanner::new(drive_root)
        .with_policy(ExcludeSubstrings::new([EXCLUDED_SUBTREE]))
        .directories()
        .filter(|dir| {
            dir.file_name()
                .is_some_and(|name| name.to_string_lossy().contains(CURRENT_MARKER))
        })
}

/// Link every current bids folder on the drive into the bids directory.
///
/// Folders that do not fit the drive layout, and links that fail, are logged
/// and skipped.
#[instrument(skip(drive_root, writer), level = "debug")]
pub fn link_current_folders(drive_root: impl AsRef<Path>, writer: &IndexWriter) -> LinkTally {
    let mut tally = LinkTally::default();

    for folder in find_current_folders(drive_root.as_ref()) {
        let Some(show_episode) = ShowEpisode::from_folder(&folder) else {
            warn!("cannot determine show and episode of {}", folder.display());
            tally.record_failure();
            continue;
        };

        let link = writer.root().join(show_episode.link_name());
        match writer.ensure_link(&link, &folder) {
            Ok(outcome) => tally.record(outcome),
            Err(err) => {
                warn!(
                    "error processing folder {}: {:#}",
                    folder.display(),
                    anyhow::Error::from(err)
                );
                tally.record_failure();
            }
        }
    }

    info!(
        "linked {} new bids folder(s) into {}",
        tally.created + tally.replaced,
        writer.root().display()
    );

    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::writer::IndexOptions;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, read_link};

    #[test]
    fn show_episode_from_drive_layout() {
        let result = ShowEpisode::from_folder("/drive/Nature/Ep01/Editorial/CURRENT");
        let expect = ShowEpisode {
            show: "Nature".into(),
            episode: "Ep01".into(),
        };
        assert_eq!(result, Some(expect.clone()));
        assert_eq!(expect.link_name(), "Nature_Ep01_Bids");

        assert_eq!(ShowEpisode::from_folder("/Ep01/CURRENT"), None);
    }

    #[sealed_test]
    fn find_current_folders_prunes_resources() -> anyhow::Result<()> {
        create_dir_all("drive/Nature/Ep01/Editorial/CURRENT")?;
        create_dir_all("drive/Nature/Ep02/Sound/CURRENT_v2")?;
        create_dir_all("drive/Nature/_Production_Resources/Old/CURRENT")?;

        let result = find_current_folders("drive").collect::<Vec<_>>();
        let expect = vec![
            PathBuf::from("drive/Nature/Ep01/Editorial/CURRENT"),
            PathBuf::from("drive/Nature/Ep02/Sound/CURRENT_v2"),
        ];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn link_current_folders_into_bids_dir() -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?.canonicalize()?;
        create_dir_all("drive/Nature/Ep01/Editorial/CURRENT")?;
        create_dir_all("bids")?;
        let writer = IndexWriter::new(cwd.join("bids"), IndexOptions::default());

        let tally = link_current_folders(cwd.join("drive"), &writer);
        assert_eq!(tally.created, 1);
        assert_eq!(
            read_link("bids/Nature_Ep01_Bids")?,
            cwd.join("drive/Nature/Ep01/Editorial/CURRENT")
        );

        let tally = link_current_folders(cwd.join("drive"), &writer);
        assert_eq!(tally.unchanged, 1);

        Ok(())
    }
}
