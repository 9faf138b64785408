//! CLI argument parsing using clap derive macros

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::commands::{
    build::BuildCommand,
    fetch::{FetchChocoCommand, FetchDocsCommand, FetchNpmCommand, FetchPypiCommand, FetchSourceCommand},
    update::UpdateCommand,
    version::VersionCommand,
};
use crate::config::Config;
use crate::fetch::Fetcher;

const COMMAND_OVERVIEW: &str = "\
Fetch:
  ufetch gh user/repo
  ufetch ghdocs user/repo
  ufetch npm package
  ufetch pypi package
  ufetch choco package

Build:
  ufetch build <file>

Other:
  ufetch update
  ufetch version
  ufetch help";

/// UniFetch - Universal Fetcher
///
/// Download source archives and packages from GitHub, npm, PyPI and
/// Chocolatey, or build a single source file with an installed compiler.
#[derive(Parser, Debug)]
#[command(name = "ufetch")]
#[command(author, version, about, long_about = None)]
#[command(after_help = COMMAND_OVERVIEW)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Branch for GitHub fetches (default: main)
    #[arg(long, global = true, env = "UFETCH_BRANCH")]
    pub branch: Option<String>,

    /// Configuration file (default: ~/.ufetch/config.toml)
    #[arg(long, global = true, env = "UFETCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a GitHub repository's branch archive
    #[command(visible_alias = "gh")]
    FetchSource(FetchSourceCommand),

    /// Download a GitHub repository's README and docs/ files
    #[command(visible_alias = "ghdocs")]
    FetchDocs(FetchDocsCommand),

    /// Download the latest npm package tarball
    #[command(visible_alias = "npm")]
    FetchNpm(FetchNpmCommand),

    /// Download the first file of a PyPI project's latest release
    #[command(visible_alias = "pypi")]
    FetchPypi(FetchPypiCommand),

    /// Download a Chocolatey package
    #[command(visible_alias = "choco")]
    FetchChoco(FetchChocoCommand),

    /// Compile a single source file with an installed compiler
    Build(BuildCommand),

    /// Print the version
    Version(VersionCommand),

    /// Update ufetch (not implemented)
    Update(UpdateCommand),
}

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub verbose: bool,
    pub branch: Option<String>,
    pub config_path: Option<PathBuf>,
}

impl RunContext {
    /// Load configuration, apply `--branch`
    pub fn config(&self) -> Result<Config> {
        Ok(Config::load(self.config_path.as_deref())?.with_branch(self.branch.clone()))
    }

    /// Fetcher working in the current directory
    pub fn fetcher(&self) -> Result<Fetcher> {
        let config = self.config()?;
        let work_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Fetcher::new(config, work_dir, self.verbose)?)
    }
}

impl Cli {
    /// Execute the CLI command, returning the process exit code
    pub fn execute(self) -> Result<i32> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let ctx = RunContext {
            verbose: self.verbose,
            branch: self.branch,
            config_path: self.config,
        };

        // Execute the subcommand
        match self.command {
            Commands::FetchSource(cmd) => cmd.execute(&ctx).map(|_| 0),
            Commands::FetchDocs(cmd) => cmd.execute(&ctx).map(|_| 0),
            Commands::FetchNpm(cmd) => cmd.execute(&ctx).map(|_| 0),
            Commands::FetchPypi(cmd) => cmd.execute(&ctx).map(|_| 0),
            Commands::FetchChoco(cmd) => cmd.execute(&ctx).map(|_| 0),
            Commands::Build(cmd) => cmd.execute(&ctx),
            Commands::Version(cmd) => cmd.execute(&ctx).map(|_| 0),
            Commands::Update(cmd) => cmd.execute(&ctx).map(|_| 0),
        }
    }
}
