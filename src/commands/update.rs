//! Update command - self-update placeholder

use anyhow::Result;
use clap::Args;

use crate::cli::RunContext;
use crate::utils::terminal::print_info;

/// Update ufetch (not implemented)
#[derive(Args, Debug)]
pub struct UpdateCommand {}

impl UpdateCommand {
    pub fn execute(self, _ctx: &RunContext) -> Result<()> {
        print_info("Self-update is not implemented yet.");
        println!("   Update manually by installing the latest ufetch release.\n");
        Ok(())
    }
}
