// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use collect::{
    config::Config,
    index::{writer::IndexOptions, BuildSummary, Indexer},
    logging,
    path::{default_config_path, default_index_root},
};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, info};

#[derive(Debug, Clone, Parser)]
#[command(
    about = "Build a Date/Category symlink index from collect files (txt or YAML)",
    override_usage = "collect <command> [options]",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn options(&self) -> &CommonOptions {
        match &self.command {
            Command::Build(opts)
            | Command::Remove(opts)
            | Command::Rebuild(opts)
            | Command::Hide(opts) => opts,
        }
    }

    fn run(self) -> Result<()> {
        let indexer = self.options().indexer()?;
        match self.command {
            Command::Build(_) => report(indexer.build()?),
            Command::Remove(_) => indexer.remove()?,
            Command::Rebuild(_) => report(indexer.rebuild()?),
            Command::Hide(_) => {
                indexer.hide()?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Build or update the symlink index.
    #[command(override_usage = "collect build [options]")]
    Build(CommonOptions),

    /// Remove Date/ and Category/ indexes.
    #[command(override_usage = "collect remove [options]")]
    Remove(CommonOptions),

    /// Remove and rebuild the indexes.
    #[command(override_usage = "collect rebuild [options]")]
    Rebuild(CommonOptions),

    /// Rename visible collect files to hidden (prefix with '.').
    #[command(override_usage = "collect hide [options]")]
    Hide(CommonOptions),
}

#[derive(Args, Clone, Debug)]
struct CommonOptions {
    /// Root to search for collect files.
    #[arg(short, long, value_name = "dir")]
    pub path: Option<PathBuf>,

    /// Path to __Collect__ index root.
    #[arg(short, long, value_name = "dir")]
    pub collect: Option<PathBuf>,

    /// Show actions without changing anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Replace existing links/folders when rebuilding.
    #[arg(short, long)]
    pub force: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Use Date/YYYY/MM/DD instead of Date/YYYY-MM-DD.
    #[arg(long)]
    pub group_dates: bool,

    /// Skip directories whose path contains this text.
    #[arg(long, value_name = "text")]
    pub exclude: Vec<String>,

    /// Path to configuration file.
    #[arg(long, value_name = "file")]
    pub config: Option<PathBuf>,
}

impl CommonOptions {
    fn indexer(&self) -> Result<Indexer> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load(default_config_path()?)?,
        };
        let settings = config.index;

        // INVARIANT: Command line beats configuration file beats defaults.
        let search_root = match (&self.path, settings.search_root) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) => path,
            (None, None) => PathBuf::from("."),
        };
        let index_root = match (&self.collect, settings.index_root) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) => path,
            (None, None) => default_index_root()?,
        };
        let options = IndexOptions {
            force: self.force,
            dry_run: self.dry_run,
            group_dates: self.group_dates || settings.group_dates,
        };
        let exclude = settings
            .exclude
            .into_iter()
            .chain(self.exclude.iter().cloned());

        Ok(Indexer::new(search_root, index_root, options)?.with_exclusions(exclude))
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = logging::init(cli.options().verbose, None) {
        eprintln!("{error}");
        exit(1);
    }

    if let Err(error) = cli.run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn report(summary: BuildSummary) {
    let links = summary.links;
    info!(
        "links: {} created, {} unchanged, {} replaced, {} skipped, {} failed",
        links.created, links.unchanged, links.replaced, links.skipped, links.failed
    );
}
