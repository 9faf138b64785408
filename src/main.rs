//! UniFetch - fetch source archives and packages, build single files
//!
//! ## Architecture
//!
//! ```text
//! cli → commands/ → fetch/ (HTTP → archive)   build/ (compiler table → subprocess)
//! ```

mod build;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod fetch;
mod utils;

use clap::Parser;

use cli::Cli;
use error::{UfetchError, EXIT_FAILURE};
use utils::terminal::print_error;

fn main() {
    let cli = Cli::parse();

    let code = match cli.execute() {
        Ok(code) => code,
        Err(err) => match err.downcast_ref::<UfetchError>() {
            Some(ufetch_err) => {
                ufetch_err.display_with_hints();
                ufetch_err.exit_code()
            }
            None => {
                print_error(&format!("{:#}", err));
                EXIT_FAILURE
            }
        },
    };

    std::process::exit(code);
}
