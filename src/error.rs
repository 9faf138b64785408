//! Error types and helpers for user-friendly error messages
//!
//! Every failure a command can hit is mapped to one of these variants so the
//! binary can print an actionable hint and pick a stable exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::Service;

/// Exit code for malformed invocations
pub const EXIT_USAGE: i32 = 2;

/// Exit code for failures while running a command
pub const EXIT_FAILURE: i32 = 1;

/// Custom error types with helpful context and suggestions
#[derive(Error, Debug)]
pub enum UfetchError {
    /// Missing or malformed command arguments
    #[error("Usage error: {message}")]
    Usage { message: String, hint: String },

    /// Transport failure or non-success HTTP status
    #[error("{service} request failed for '{identifier}': {message}")]
    Http {
        service: Service,
        identifier: String,
        url: String,
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Registry answered, but not with the document shape we expect
    #[error("Malformed {service} registry response for '{identifier}': {message}")]
    MalformedResponse {
        service: Service,
        identifier: String,
        message: String,
    },

    /// Archive could not be unpacked
    #[error("Failed to extract {}: {message}", .archive.display())]
    Archive {
        archive: PathBuf,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Filesystem or process spawning failure
    #[error("{message}: {}", .path.display())]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
        hint: Option<String>,
    },
}

impl UfetchError {
    /// Create a usage error with a hint
    pub fn usage(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an HTTP error from a non-success status
    pub fn http_status(
        service: Service,
        identifier: impl Into<String>,
        url: impl Into<String>,
        status: u16,
    ) -> Self {
        Self::Http {
            service,
            identifier: identifier.into(),
            url: url.into(),
            message: format!("HTTP {}", status),
            status: Some(status),
            source: None,
        }
    }

    /// Create an HTTP error from a transport failure
    pub fn http_transport(
        service: Service,
        identifier: impl Into<String>,
        url: impl Into<String>,
        source: reqwest::Error,
    ) -> Self {
        Self::Http {
            service,
            identifier: identifier.into(),
            url: url.into(),
            message: source.to_string(),
            status: source.status().map(|s| s.as_u16()),
            source: Some(source),
        }
    }

    /// Create a malformed registry response error
    pub fn malformed(
        service: Service,
        identifier: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedResponse {
            service,
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Create an archive extraction error
    pub fn archive(
        archive: impl Into<PathBuf>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::Archive {
            archive: archive.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a filesystem error with path context
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config_error(
        message: impl Into<String>,
        path: Option<PathBuf>,
        hint: Option<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            path,
            hint,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            UfetchError::Usage { .. } => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }

    /// Hint shown under the error, if any
    pub fn hint(&self) -> Option<String> {
        match self {
            UfetchError::Usage { hint, .. } => Some(hint.clone()),
            UfetchError::Http { status: Some(404), service, .. } => {
                Some(hints::not_found(*service).to_string())
            }
            UfetchError::Http { url, .. } => Some(format!("Requested URL: {}", url)),
            UfetchError::MalformedResponse { .. } => Some(hints::malformed_response().to_string()),
            UfetchError::Archive { .. } => Some(hints::archive().to_string()),
            UfetchError::Config { hint, path, .. } => match (hint, path) {
                (Some(h), Some(p)) => Some(format!("{}\nFile: {}", h, p.display())),
                (None, Some(p)) => Some(format!("File: {}", p.display())),
                (h, None) => h.clone(),
            },
            UfetchError::Io { .. } => None,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        if let Some(h) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    use crate::fetch::Service;

    /// Get hint for a 404 from a given service
    pub fn not_found(service: Service) -> &'static str {
        match service {
            Service::Github => {
                "The repository or branch does not exist. Check the owner/repo spelling\n\
                 or pass --branch if the default branch is not 'main'."
            }
            Service::Npm => "No such package on the npm registry. Check the package name.",
            Service::Pypi => "No such project on PyPI. Check the package name.",
            Service::Choco => "No such package on the Chocolatey community feed.",
        }
    }

    /// Get hint for an unexpected registry document
    pub fn malformed_response() -> &'static str {
        "The registry returned a document without the expected fields.\n\
         The package may have no published releases, or the registry API changed."
    }

    /// Get hint for extraction failures
    pub fn archive() -> &'static str {
        "The archive type is chosen from the file suffix:\n\
         • .zip, .whl, .nupkg are opened as ZIP\n\
         • anything else is opened as a tar stream, plain or gzip/bzip2/xz compressed\n\
         \n\
         The downloaded file was kept so it can be inspected."
    }

    /// Get hint for an identifier without owner/repo
    pub fn github_identifier() -> &'static str {
        "GitHub targets are written as owner/repo, e.g. ufetch gh octocat/Hello-World"
    }

    /// Get hint for an invalid package name
    pub fn package_name() -> &'static str {
        "Package names may contain letters, digits, '.', '_' and '-'.\n\
         npm names may carry a scope prefix, e.g. @types/node"
    }
}
