//! Fetching source archives and packages
//!
//! Every fetch is the same straight line:
//!
//! ```text
//! FetchTarget → DownloadPlan → download archive → extract → delete archive
//! ```
//!
//! npm and PyPI need one metadata request first to find the file to download.
//! Docs mode is the exception: it downloads loose files and never extracts.

pub mod archive;
pub mod github;
pub mod http;
pub mod registry;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::config::Config;
use crate::error::{hints, UfetchError};
use crate::utils::terminal::{print_info, print_verbose, print_warning};

pub use archive::{extract_archive, ExtractSummary};
pub use github::GithubRepo;
pub use http::HttpClient;

/// Hosting service a target lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Github,
    Npm,
    Pypi,
    Choco,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Github => "GitHub",
            Service::Npm => "npm",
            Service::Pypi => "PyPI",
            Service::Choco => "Chocolatey",
        };
        f.write_str(name)
    }
}

/// Whole archive, or README and docs only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    #[default]
    Source,
    Docs,
}

/// A validated fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub service: Service,
    pub identifier: String,
    pub mode: FetchMode,
}

impl FetchTarget {
    /// Validate `identifier` for `service`.
    ///
    /// Runs before any network or filesystem access, so a bad identifier
    /// never leaves anything behind.
    pub fn new(
        service: Service,
        identifier: impl Into<String>,
        mode: FetchMode,
    ) -> Result<Self, UfetchError> {
        let identifier = identifier.into().trim().to_string();

        match service {
            Service::Github => {
                GithubRepo::parse(&identifier)?;
            }
            _ if mode == FetchMode::Docs => {
                return Err(UfetchError::usage(
                    format!("docs mode is only available for GitHub, not {}", service),
                    hints::github_identifier(),
                ));
            }
            _ => validate_package_name(service, &identifier)?,
        }

        Ok(Self {
            service,
            identifier,
            mode,
        })
    }

    /// Shorthand for a source-mode target
    #[cfg(test)]
    pub fn source(service: Service, identifier: impl Into<String>) -> Result<Self, UfetchError> {
        Self::new(service, identifier, FetchMode::Source)
    }
}

fn package_pattern(service: Service) -> &'static Regex {
    static NPM: OnceLock<Regex> = OnceLock::new();
    static PYPI: OnceLock<Regex> = OnceLock::new();
    static GENERIC: OnceLock<Regex> = OnceLock::new();

    match service {
        Service::Npm => NPM.get_or_init(|| {
            Regex::new(r"^(@[A-Za-z0-9][A-Za-z0-9._-]*/)?[A-Za-z0-9_][A-Za-z0-9._-]*$")
                .expect("npm name pattern is valid")
        }),
        Service::Pypi => PYPI.get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$")
                .expect("PyPI name pattern is valid")
        }),
        Service::Github | Service::Choco => GENERIC.get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("package name pattern is valid")
        }),
    }
}

/// Reject names that are empty or could write outside the working directory
pub fn validate_package_name(service: Service, name: &str) -> Result<(), UfetchError> {
    if name.is_empty() {
        return Err(UfetchError::usage(
            format!("missing {} package name", service),
            hints::package_name(),
        ));
    }

    if !package_pattern(service).is_match(name) || name.split('/').any(|s| s == "..") {
        return Err(UfetchError::usage(
            format!("'{}' is not a valid {} package name", name, service),
            hints::package_name(),
        ));
    }

    Ok(())
}

/// Where to download from and where the result goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub url: String,
    /// Temporary archive, relative to the working directory
    pub local_filename: PathBuf,
    /// Extraction directory, relative to the working directory
    pub destination_directory: PathBuf,
}

/// Result of a completed archive fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub plan: DownloadPlan,
    /// Version picked from registry metadata, when there was a choice
    pub version: Option<String>,
    pub extracted: ExtractSummary,
}

/// Result of a docs fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocsReport {
    pub readme: bool,
    /// Files saved under `<repo>/docs/`
    pub docs_files: usize,
    /// Diagnostics of the steps or files that failed
    pub failures: Vec<String>,
}

/// Either kind of fetch result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchReport {
    Archive(FetchOutcome),
    Docs(DocsReport),
    /// The registry knows the package but lists nothing to download
    NothingToFetch(String),
}

type DocsStep = fn(&Fetcher, &GithubRepo, &Path, &mut DocsReport) -> Result<(), UfetchError>;

/// Runs fetches relative to a working directory
pub struct Fetcher {
    http: HttpClient,
    config: Config,
    work_dir: PathBuf,
    verbose: bool,
}

impl Fetcher {
    pub fn new(config: Config, work_dir: PathBuf, verbose: bool) -> Result<Self, UfetchError> {
        let http = HttpClient::new(&config.user_agent, config.system_proxy, verbose)?;
        Ok(Self {
            http,
            config,
            work_dir,
            verbose,
        })
    }

    /// Dispatch a validated target
    pub fn fetch(&self, target: &FetchTarget) -> Result<FetchReport, UfetchError> {
        let id = target.identifier.as_str();
        match (target.service, target.mode) {
            (Service::Github, FetchMode::Docs) => self.fetch_docs(id).map(FetchReport::Docs),
            (Service::Github, FetchMode::Source) => {
                self.fetch_source_archive(id).map(FetchReport::Archive)
            }
            (Service::Npm, _) => self.fetch_npm(id).map(FetchReport::Archive),
            (Service::Pypi, _) => self.fetch_pypi(id).map(|outcome| {
                outcome.map_or_else(
                    || FetchReport::NothingToFetch("No files found for this PyPI package".to_string()),
                    FetchReport::Archive,
                )
            }),
            (Service::Choco, _) => self.fetch_choco(id).map(FetchReport::Archive),
        }
    }

    /// Download and unpack the configured branch of `owner/repo`
    pub fn fetch_source_archive(&self, identifier: &str) -> Result<FetchOutcome, UfetchError> {
        let repo = GithubRepo::parse(identifier)?;
        print_info(&format!("GitHub fetch: {}", repo));

        let plan = DownloadPlan {
            url: repo.archive_url(&self.config.endpoints.github, &self.config.default_branch),
            local_filename: PathBuf::from(format!("{}.zip", repo.repo)),
            destination_directory: PathBuf::from(&repo.repo),
        };

        self.execute_plan(Service::Github, identifier, plan, None)
    }

    /// Fetch `README.md` and the files directly under `docs/`.
    ///
    /// Both steps are best-effort: a failure is reported and recorded in the
    /// report, never returned.
    pub fn fetch_docs(&self, identifier: &str) -> Result<DocsReport, UfetchError> {
        let repo = GithubRepo::parse(identifier)?;
        print_info(&format!("GitHub docs fetch: {}", repo));

        let dest = self.work_dir.join(&repo.repo);
        std::fs::create_dir_all(&dest)
            .map_err(|e| UfetchError::io(&dest, "Failed to create directory", e))?;

        let steps: [(&str, DocsStep); 2] = [
            ("README.md not found", Self::fetch_readme),
            ("docs/ folder not found", Self::fetch_docs_dir),
        ];

        let mut report = DocsReport::default();
        for (diagnostic, step) in steps {
            if let Err(e) = step(self, &repo, &dest, &mut report) {
                print_warning(&format!("{} ({})", diagnostic, e));
                report.failures.push(format!("{}: {}", diagnostic, e));
            }
        }

        println!("Docs fetch complete\n");
        Ok(report)
    }

    fn fetch_readme(
        &self,
        repo: &GithubRepo,
        dest: &Path,
        report: &mut DocsReport,
    ) -> Result<(), UfetchError> {
        let url = repo.raw_url(
            &self.config.endpoints.github_raw,
            &self.config.default_branch,
            "README.md",
        );
        self.http
            .download(Service::Github, &repo.to_string(), &url, &dest.join("README.md"))?;
        report.readme = true;
        Ok(())
    }

    fn fetch_docs_dir(
        &self,
        repo: &GithubRepo,
        dest: &Path,
        report: &mut DocsReport,
    ) -> Result<(), UfetchError> {
        let identifier = repo.to_string();
        let url = repo.contents_url(&self.config.endpoints.github_api, "docs");
        let listing: serde_json::Value = self.http.get_json(Service::Github, &identifier, &url)?;

        if !listing.is_array() {
            print_verbose(self.verbose, "docs is not a directory, nothing to fetch");
            return Ok(());
        }

        let docs_dir = dest.join("docs");
        std::fs::create_dir_all(&docs_dir)
            .map_err(|e| UfetchError::io(&docs_dir, "Failed to create directory", e))?;

        for entry in github::listed_files(listing) {
            let Some(download_url) = entry.download_url.as_deref() else {
                continue;
            };
            match self
                .http
                .download(Service::Github, &identifier, download_url, &docs_dir.join(&entry.name))
            {
                Ok(_) => report.docs_files += 1,
                Err(e) => {
                    print_warning(&format!("skipping docs/{} ({})", entry.name, e));
                    report.failures.push(format!("docs/{}: {}", entry.name, e));
                }
            }
        }

        Ok(())
    }

    /// Download the tarball of the `latest` dist-tag
    pub fn fetch_npm(&self, package: &str) -> Result<FetchOutcome, UfetchError> {
        validate_package_name(Service::Npm, package)?;
        print_info(&format!("npm fetch: {}", package));

        let meta_url = registry::npm_metadata_url(&self.config.endpoints.npm_registry, package);
        let packument: registry::NpmPackument =
            self.http.get_json(Service::Npm, package, &meta_url)?;
        let release = packument.latest_release(package)?;
        print_verbose(self.verbose, &format!("latest version: {}", release.version));

        let plan = DownloadPlan {
            url: release.tarball,
            local_filename: PathBuf::from(format!("{}.tgz", package.replace('/', "-"))),
            destination_directory: PathBuf::from(package),
        };

        self.execute_plan(Service::Npm, package, plan, Some(release.version))
    }

    /// Download the first file listed for the latest release.
    ///
    /// A release without any files is not an error; `None` is returned and
    /// nothing is written.
    pub fn fetch_pypi(&self, package: &str) -> Result<Option<FetchOutcome>, UfetchError> {
        validate_package_name(Service::Pypi, package)?;
        print_info(&format!("PyPI fetch: {}", package));

        let meta_url = registry::pypi_metadata_url(&self.config.endpoints.pypi, package);
        let project: registry::PypiProject = self.http.get_json(Service::Pypi, package, &meta_url)?;
        let Some(file) = project.first_file() else {
            return Ok(None);
        };
        let filename = file_name_from_url(&file.url).ok_or_else(|| {
            UfetchError::malformed(
                Service::Pypi,
                package,
                format!("cannot derive a file name from {}", file.url),
            )
        })?;

        let plan = DownloadPlan {
            url: file.url.clone(),
            local_filename: PathBuf::from(filename),
            destination_directory: PathBuf::from(package),
        };

        let version = project.version().map(str::to_string);
        self.execute_plan(Service::Pypi, package, plan, version).map(Some)
    }

    /// Download a package from the Chocolatey community feed
    pub fn fetch_choco(&self, package: &str) -> Result<FetchOutcome, UfetchError> {
        validate_package_name(Service::Choco, package)?;
        print_info(&format!("Chocolatey fetch: {}", package));

        let plan = DownloadPlan {
            url: registry::choco_package_url(&self.config.endpoints.chocolatey, package),
            local_filename: PathBuf::from(format!("{}.nupkg", package)),
            destination_directory: PathBuf::from(package),
        };

        self.execute_plan(Service::Choco, package, plan, None)
    }

    /// Download, extract, then delete the archive.
    ///
    /// The archive is only deleted after a complete extraction; on failure it
    /// stays on disk next to whatever was already unpacked.
    fn execute_plan(
        &self,
        service: Service,
        identifier: &str,
        plan: DownloadPlan,
        version: Option<String>,
    ) -> Result<FetchOutcome, UfetchError> {
        let archive_path = self.work_dir.join(&plan.local_filename);
        let dest = self.work_dir.join(&plan.destination_directory);

        self.http.download(service, identifier, &plan.url, &archive_path)?;
        let extracted = extract_archive(&archive_path, &dest)?;

        std::fs::remove_file(&archive_path)
            .map_err(|e| UfetchError::io(&archive_path, "Failed to remove archive", e))?;
        print_verbose(self.verbose, &format!("Removed {}", archive_path.display()));

        Ok(FetchOutcome {
            plan,
            version,
            extracted,
        })
    }
}

/// Last path segment of a URL, ignoring any query string
fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let name = parsed.path_segments()?.last()?.to_string();
    (!name.is_empty() && name != "..").then_some(name)
}
