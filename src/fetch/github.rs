//! GitHub repository targets

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{hints, UfetchError};

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("segment pattern is valid"))
}

/// An `owner/repo` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepo {
    pub owner: String,
    pub repo: String,
}

impl GithubRepo {
    /// Parse `owner/repo`.
    ///
    /// Exactly one `/` with a non-empty segment on each side; anything else
    /// is a usage error.
    pub fn parse(identifier: &str) -> Result<Self, UfetchError> {
        let identifier = identifier.trim();
        let mut parts = identifier.split('/');

        let (owner, repo) = match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                (owner, repo)
            }
            _ => {
                return Err(UfetchError::usage(
                    format!("'{}' is not an owner/repo pair", identifier),
                    hints::github_identifier(),
                ))
            }
        };

        for segment in [owner, repo] {
            if !segment_pattern().is_match(segment) || segment == "." || segment == ".." {
                return Err(UfetchError::usage(
                    format!("'{}' is not a valid GitHub name in '{}'", segment, identifier),
                    hints::github_identifier(),
                ));
            }
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// `<host>/<owner>/<repo>/archive/refs/heads/<branch>.zip`
    pub fn archive_url(&self, host: &str, branch: &str) -> String {
        format!(
            "{}/{}/{}/archive/refs/heads/{}.zip",
            host.trim_end_matches('/'),
            self.owner,
            self.repo,
            branch
        )
    }

    /// `<raw>/<owner>/<repo>/<branch>/<path>`
    pub fn raw_url(&self, raw_host: &str, branch: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            raw_host.trim_end_matches('/'),
            self.owner,
            self.repo,
            branch,
            path
        )
    }

    /// `<api>/repos/<owner>/<repo>/contents/<path>`
    pub fn contents_url(&self, api_host: &str, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            api_host.trim_end_matches('/'),
            self.owner,
            self.repo,
            path
        )
    }
}

impl fmt::Display for GithubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// One entry of a contents API directory listing
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContentEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ContentEntry {
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

/// File entries of a directory listing.
///
/// The contents API answers with an object instead of an array when the path
/// is a file; that yields no entries. Directories are skipped, the listing is
/// not recursive.
pub fn listed_files(listing: serde_json::Value) -> Vec<ContentEntry> {
    let serde_json::Value::Array(items) = listing else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<ContentEntry>(item).ok())
        .filter(|entry| entry.is_file() && entry.download_url.is_some())
        .filter(|entry| is_plain_file_name(&entry.name))
        .collect()
}

/// A single path component that cannot escape its directory
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
