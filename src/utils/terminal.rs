//! Terminal output utilities

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

/// Print an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{}: {}", style("error").red().bold(), message);
}

/// Print a warning message to stderr
pub fn print_warning(message: &str) {
    eprintln!("{}: {}", style("warning").yellow().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{}: {}", style("success").green().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{}: {}", style("info").blue().bold(), message);
}

/// Print a detail line, only in verbose mode
pub fn print_verbose(verbose: bool, message: &str) {
    if verbose {
        println!("   {}", style(message).dim());
    }
}

/// Create a byte progress bar for a download.
///
/// Hidden when the length is unknown or stderr is not a terminal, so piped
/// output stays clean.
pub fn create_download_bar(len: Option<u64>, message: &str) -> ProgressBar {
    let len = match len {
        Some(len) if Term::stderr().is_term() => len,
        _ => return ProgressBar::hidden(),
    };

    let pb = ProgressBar::new(len);
    let bar_style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .map(|s| s.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(bar_style);
    pb.set_message(message.to_string());
    pb
}

/// Human readable byte count
pub fn format_size(size: u64) -> String {
    if size >= 1024 * 1024 {
        format!("{:.2} MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.2} KB", size as f64 / 1024.0)
    } else {
        format!("{} B", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_unknown_length_bar_is_hidden() {
        assert!(create_download_bar(None, "x").is_hidden());
    }
}
