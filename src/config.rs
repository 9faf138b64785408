//! ufetch configuration
//!
//! An optional `config.toml` can point the fetchers at mirrors or change the
//! User-Agent and default branch:
//!
//! ```toml
//! user_agent = "Mozilla/5.0"
//! default_branch = "master"
//!
//! [endpoints]
//! github = "https://github.com"
//! npm_registry = "https://registry.npmjs.org"
//! ```
//!
//! Every key is optional; missing keys fall back to the public services.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::UfetchError;

/// Config file name looked up under `~/.ufetch/`
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Branch used for GitHub archives and raw content when none is configured
pub const DEFAULT_BRANCH: &str = "main";

/// Base URLs of every service the fetchers talk to
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    /// Branch archive host (`<github>/<owner>/<repo>/archive/...`)
    pub github: String,
    /// Raw file host (`<raw>/<owner>/<repo>/<branch>/<path>`)
    pub github_raw: String,
    /// REST API host (`<api>/repos/<owner>/<repo>/contents/<path>`)
    pub github_api: String,
    pub npm_registry: String,
    pub pypi: String,
    pub chocolatey: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github: "https://github.com".to_string(),
            github_raw: "https://raw.githubusercontent.com".to_string(),
            github_api: "https://api.github.com".to_string(),
            npm_registry: "https://registry.npmjs.org".to_string(),
            pypi: "https://pypi.org".to_string(),
            chocolatey: "https://community.chocolatey.org".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at one base URL
    #[cfg(test)]
    pub fn all(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            github: base.clone(),
            github_raw: base.clone(),
            github_api: base.clone(),
            npm_registry: base.clone(),
            pypi: base.clone(),
            chocolatey: base,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// User-Agent sent with every request; GitHub's API rejects requests without one
    pub user_agent: String,

    /// Branch used by `fetch-source` and `fetch-docs`
    pub default_branch: String,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment
    pub system_proxy: bool,

    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: format!("Mozilla/5.0 (compatible; ufetch/{})", env!("CARGO_PKG_VERSION")),
            default_branch: DEFAULT_BRANCH.to_string(),
            system_proxy: true,
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `~/.ufetch/config.toml` is
    /// read when present and the built-in defaults are used otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, UfetchError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and parse a specific config file
    pub fn load_from(path: &Path) -> Result<Self, UfetchError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            UfetchError::config_error(
                format!("cannot read {}: {}", path.display(), e),
                Some(path.to_path_buf()),
                Some("Check the --config path or the UFETCH_CONFIG variable".to_string()),
            )
        })?;
        Self::parse(&content).map_err(|e| match e {
            UfetchError::Config { message, hint, .. } => {
                UfetchError::config_error(message, Some(path.to_path_buf()), hint)
            }
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, UfetchError> {
        let config: Config = toml::from_str(content).map_err(|e| {
            UfetchError::config_error(
                format!("invalid TOML: {}", e),
                None,
                Some("Every key is optional; see `ufetch help` for the supported keys".to_string()),
            )
        })?;

        if config.default_branch.trim().is_empty() {
            return Err(UfetchError::config_error(
                "default_branch must not be empty",
                None,
                None,
            ));
        }

        Ok(config)
    }

    /// Replace the branch when one was given on the command line
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        if let Some(branch) = branch.filter(|b| !b.trim().is_empty()) {
            self.default_branch = branch;
        }
        self
    }

    /// `~/.ufetch/config.toml`
    fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".ufetch").join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_branch, "main");
        assert_eq!(config.endpoints.github, "https://github.com");
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.system_proxy);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::parse(
            r#"
default_branch = "master"

[endpoints]
npm_registry = "https://npm.example.com"
"#,
        )
        .unwrap();

        assert_eq!(config.default_branch, "master");
        assert_eq!(config.endpoints.npm_registry, "https://npm.example.com");
        assert_eq!(config.endpoints.pypi, "https://pypi.org");
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::parse("default_branch = [").unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_empty_branch_rejected() {
        assert!(Config::parse("default_branch = \"\"").is_err());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "user_agent = \"test-agent\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.default_branch, "main");
    }

    #[test]
    fn test_with_branch_override() {
        let config = Config::default().with_branch(Some("develop".to_string()));
        assert_eq!(config.default_branch, "develop");

        let config = Config::default().with_branch(Some("  ".to_string()));
        assert_eq!(config.default_branch, "main");
    }

    #[test]
    fn test_endpoints_all_trims_slash() {
        let endpoints = Endpoints::all("http://127.0.0.1:8080/");
        assert_eq!(endpoints.github, "http://127.0.0.1:8080");
        assert_eq!(endpoints.chocolatey, "http://127.0.0.1:8080");
    }
}
