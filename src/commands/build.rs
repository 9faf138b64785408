//! Build command - compile a single source file
//!
//! Usage:
//!   ufetch build main.c        # gcc, falling back to clang
//!   ufetch build app.go        # go build -o app app.go

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::build::{BuildOutcome, Builder};
use crate::cli::RunContext;
use crate::exec::{InheritedRunner, PathLocator};
use crate::utils::terminal::{print_error, print_success, print_warning};

/// Compile a single source file with an installed compiler
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Source file to compile
    pub file: PathBuf,
}

impl BuildCommand {
    /// Execute the build command.
    ///
    /// Returns the compiler's exit code; conditions where nothing could be run
    /// are reported and exit cleanly.
    pub fn execute(self, ctx: &RunContext) -> Result<i32> {
        let mut builder = Builder::new(PathLocator, InheritedRunner, ctx.verbose);
        Ok(report(builder.build(&self.file)?))
    }
}

/// Print the outcome and map it to an exit code
fn report(outcome: BuildOutcome) -> i32 {
    match outcome {
        BuildOutcome::SourceMissing(path) => {
            print_error(&format!("File not found: {}", path.display()));
            0
        }
        BuildOutcome::UnsupportedExtension(ext) => {
            let ext = if ext.is_empty() {
                "(no extension)".to_string()
            } else {
                format!(".{}", ext)
            };
            print_warning(&format!("No compiler found for {}", ext));
            0
        }
        BuildOutcome::NoCompiler {
            extension,
            candidates,
        } => {
            print_warning(&format!(
                "No compiler found for .{} (tried: {})",
                extension,
                candidates.join(", ")
            ));
            0
        }
        BuildOutcome::Finished { compiler, result } => {
            if result.success {
                print_success("Build complete\n");
                0
            } else {
                match result.exit_code {
                    Some(code) => {
                        print_error(&format!("{} exited with status {}", compiler, code));
                        code
                    }
                    None => {
                        print_error(&format!("{} was terminated by a signal", compiler));
                        crate::error::EXIT_FAILURE
                    }
                }
            }
        }
    }
}
