// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use xcsort::{InstallProfile, Installer};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  xcsort install [options] <descriptor>\n  xcsort status [options] <descriptor>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Install(opts) => run_install(opts),
            Command::Status(opts) => run_status(opts),
        }
    }

    fn verbose(&self) -> bool {
        match &self.command {
            Command::Install(opts) => opts.verbose,
            Command::Status(opts) => opts.verbose,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Install the sort phase into a project descriptor.
    #[command(override_usage = "xcsort install [options] <descriptor>")]
    Install(InstallOptions),

    /// Show what an install would do, without touching anything.
    #[command(override_usage = "xcsort status [options] <descriptor>")]
    Status(StatusOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InstallOptions {
    /// Path to the project descriptor.
    #[arg(value_name = "descriptor")]
    pub descriptor: PathBuf,

    /// Narrate classification detail while running.
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory holding the ignore file, instead of the descriptor's own.
    #[arg(short, long, value_name = "path")]
    pub root_dir: Option<PathBuf>,

    /// Path to an install profile overriding the canonical names.
    #[arg(short, long, value_name = "path")]
    pub profile: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct StatusOptions {
    /// Path to the project descriptor.
    #[arg(value_name = "descriptor")]
    pub descriptor: PathBuf,

    /// Narrate classification detail while running.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to an install profile overriding the canonical names.
    #[arg(short, long, value_name = "path")]
    pub profile: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let fallback = if cli.verbose() { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = cli.run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run_install(opts: InstallOptions) -> Result<()> {
    let profile = load_profile(opts.profile)?;
    let installer = Installer::new(profile);

    let report = installer.install(&opts.descriptor, opts.root_dir.as_deref())?;
    if report.outcome == xcsort::Outcome::Mutated {
        info!(
            "the next build will sort the project file itself; expect one \
             large project-file change, commit it before making further edits"
        );
    }

    Ok(())
}

fn run_status(opts: StatusOptions) -> Result<()> {
    let profile = load_profile(opts.profile)?;
    let installer = Installer::new(profile);
    installer.survey(&opts.descriptor)?;

    Ok(())
}

fn load_profile(path: Option<PathBuf>) -> Result<InstallProfile> {
    let Some(path) = path else {
        return Ok(InstallProfile::default());
    };

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read install profile at {:?}", path.display()))?;
    let profile = data
        .parse()
        .with_context(|| format!("failed to parse install profile at {:?}", path.display()))?;

    Ok(profile)
}
