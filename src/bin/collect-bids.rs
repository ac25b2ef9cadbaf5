// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use collect::{
    bids::link_current_folders,
    index::writer::{IndexOptions, IndexWriter},
    logging,
    path::resolve,
};

use anyhow::{Context, Result};
use clap::Parser;
use std::{path::PathBuf, process::exit};
use tracing::error;

/// Link the CURRENT bids folders of a production drive into one directory.
#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "collect-bids [options] <drive_root> <bids_root>",
    version
)]
struct Cli {
    /// Root of production drive to search.
    #[arg(value_name = "drive_root")]
    pub drive_root: PathBuf,

    /// Directory to place bids links into.
    #[arg(value_name = "bids_root")]
    pub bids_root: PathBuf,

    /// Append log to this file instead of printing it.
    #[arg(long, value_name = "file")]
    pub log_file: Option<PathBuf>,

    /// Show actions without changing anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Replace existing links.
    #[arg(short, long)]
    pub force: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn run(self) -> Result<()> {
        let drive_root = resolve(&self.drive_root)
            .with_context(|| format!("cannot resolve {}", self.drive_root.display()))?;
        let bids_root = resolve(&self.bids_root)
            .with_context(|| format!("cannot resolve {}", self.bids_root.display()))?;
        anyhow::ensure!(
            drive_root.is_dir(),
            "drive root {} is not a directory",
            drive_root.display()
        );

        let options = IndexOptions {
            force: self.force,
            dry_run: self.dry_run,
            group_dates: false,
        };
        let writer = IndexWriter::new(bids_root, options);
        writer.ensure_directory(writer.root())?;
        link_current_folders(drive_root, &writer);

        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = logging::init(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("{error}");
        exit(1);
    }

    if let Err(error) = cli.run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}
