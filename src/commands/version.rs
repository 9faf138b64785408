//! Version command

use anyhow::Result;
use clap::Args;

use crate::cli::RunContext;

/// Print the version
#[derive(Args, Debug)]
pub struct VersionCommand {}

impl VersionCommand {
    pub fn execute(self, _ctx: &RunContext) -> Result<()> {
        println!("{}\n", version_line());
        Ok(())
    }
}

fn version_line() -> String {
    format!("UniFetch version {}", env!("CARGO_PKG_VERSION"))
}
