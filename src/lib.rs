// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Date and category index of directories.
//!
//! Directories describe themselves through small __collect files__ that
//! declare a date and any number of categories. Collect scans a directory
//! tree for these files and materializes an index of symbolic links that
//! groups the described directories by date and by category:
//!
//! ```text
//! Category/<label>/<directory name> -> <directory>
//! Date/<YYYY-MM-DD>/<directory name> -> <directory>
//! ```
//!
//! Two helpers round things off. The seeder drops template collect files into
//! every directory of a tree so there is something to fill in, and the bids
//! linker indexes the `CURRENT` folders of a media production drive.
//!
//! # See Also
//!
//! 1. [`index`]
//! 2. [`descriptor`]
//! 3. [`seed`]

pub mod bids;
pub mod config;
pub mod descriptor;
pub mod index;
pub mod logging;
pub mod marker;
pub mod path;
pub mod scan;
pub mod seed;
