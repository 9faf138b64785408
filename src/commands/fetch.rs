//! Fetch commands
//!
//! Usage:
//!   ufetch gh octocat/Hello-World        # branch archive into Hello-World/
//!   ufetch ghdocs octocat/Hello-World    # README.md and docs/ only
//!   ufetch npm left-pad                  # latest tarball into left-pad/
//!   ufetch pypi requests                 # first release file into requests/
//!   ufetch choco git                     # nupkg into git/

use anyhow::Result;
use clap::Args;

use crate::cli::RunContext;
use crate::fetch::{FetchMode, FetchReport, FetchTarget, Service};
use crate::utils::terminal::{print_success, print_warning};

/// Download a GitHub repository's branch archive
#[derive(Args, Debug)]
pub struct FetchSourceCommand {
    /// Repository as owner/repo
    pub repository: String,
}

impl FetchSourceCommand {
    pub fn execute(self, ctx: &RunContext) -> Result<()> {
        run_fetch(ctx, Service::Github, self.repository, FetchMode::Source)
    }
}

/// Download a GitHub repository's README and docs/ files
#[derive(Args, Debug)]
pub struct FetchDocsCommand {
    /// Repository as owner/repo
    pub repository: String,
}

impl FetchDocsCommand {
    pub fn execute(self, ctx: &RunContext) -> Result<()> {
        run_fetch(ctx, Service::Github, self.repository, FetchMode::Docs)
    }
}

/// Download the latest npm package tarball
#[derive(Args, Debug)]
pub struct FetchNpmCommand {
    /// Package name, optionally scoped (@scope/name)
    pub package: String,
}

impl FetchNpmCommand {
    pub fn execute(self, ctx: &RunContext) -> Result<()> {
        run_fetch(ctx, Service::Npm, self.package, FetchMode::Source)
    }
}

/// Download the first file of a PyPI project's latest release
#[derive(Args, Debug)]
pub struct FetchPypiCommand {
    /// Project name
    pub package: String,
}

impl FetchPypiCommand {
    pub fn execute(self, ctx: &RunContext) -> Result<()> {
        run_fetch(ctx, Service::Pypi, self.package, FetchMode::Source)
    }
}

/// Download a Chocolatey package
#[derive(Args, Debug)]
pub struct FetchChocoCommand {
    /// Package id
    pub package: String,
}

impl FetchChocoCommand {
    pub fn execute(self, ctx: &RunContext) -> Result<()> {
        run_fetch(ctx, Service::Choco, self.package, FetchMode::Source)
    }
}

/// Validate, fetch, and summarize
fn run_fetch(ctx: &RunContext, service: Service, identifier: String, mode: FetchMode) -> Result<()> {
    // Identifier problems must surface before any request is made
    let target = FetchTarget::new(service, identifier, mode)?;
    let fetcher = ctx.fetcher()?;

    match fetcher.fetch(&target)? {
        FetchReport::Archive(outcome) => {
            let version = outcome
                .version
                .map(|v| format!(" {}", v))
                .unwrap_or_default();
            print_success(&format!(
                "{}{} extracted into {}/ ({} files)",
                target.identifier,
                version,
                outcome.plan.destination_directory.display(),
                outcome.extracted.files
            ));
        }
        FetchReport::Docs(report) => {
            if !report.readme && report.docs_files == 0 {
                print_warning(&format!("no documentation found for {}", target.identifier));
            } else {
                print_success(&format!(
                    "{}: README {}, {} docs file(s)",
                    target.identifier,
                    if report.readme { "saved" } else { "missing" },
                    report.docs_files
                ));
            }
            if !report.failures.is_empty() {
                print_warning(&format!("{} item(s) could not be fetched", report.failures.len()));
            }
        }
        FetchReport::NothingToFetch(reason) => {
            print_warning(&format!("{}: {}", target.identifier, reason));
        }
    }

    Ok(())
}
