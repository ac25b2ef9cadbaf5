// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use collect::{
    logging,
    seed::{SeedMode, Seeder, TEMPLATE_NAME},
};

use anyhow::Result;
use clap::Parser;
use inquire::Text;
use std::{path::PathBuf, process::exit};
use tracing::error;

/// Seed template collect files into every directory of a tree.
#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "collect-seed [options] [root]",
    version
)]
struct Cli {
    /// Parent directory to add collect files to. Prompted for if missing.
    #[arg(value_name = "root")]
    pub root: Option<PathBuf>,

    /// Rename misspelled file to correct name instead of seeding.
    #[arg(long, num_args = 2, value_names = ["misspelled", "correct"])]
    pub fix: Option<Vec<String>>,

    /// Show actions without changing anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn run(self) -> Result<()> {
        let root = match self.root {
            Some(root) => root,
            None => Text::new(&format!("Parent directory to add {TEMPLATE_NAME} files to:"))
                .prompt()?
                .into(),
        };

        let mode = match self.fix {
            Some(names) => match <[String; 2]>::try_from(names) {
                Ok([misspelled, correct]) => SeedMode::FixName {
                    misspelled,
                    correct,
                },
                Err(names) => anyhow::bail!("--fix expects two names, got {names:?}"),
            },
            None => SeedMode::Template,
        };

        Seeder::new(root, self.dry_run).run(&mode)?;

        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = logging::init(cli.verbose, None) {
        eprintln!("{error}");
        exit(1);
    }

    if let Err(error) = cli.run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}
