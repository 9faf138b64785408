//! npm and PyPI metadata documents
//!
//! Only the fields needed to pick a download are modelled. Every field is
//! optional at the serde level so a missing key turns into a
//! `MalformedResponse` naming the key instead of a generic parse error.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::UfetchError;
use crate::fetch::Service;

/// `GET <registry>/<package>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpmPackument {
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,

    #[serde(default)]
    pub versions: HashMap<String, NpmVersion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpmVersion {
    #[serde(default)]
    pub dist: Option<NpmDist>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpmDist {
    #[serde(default)]
    pub tarball: Option<String>,
}

/// A resolved npm release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmRelease {
    pub version: String,
    pub tarball: String,
}

impl NpmPackument {
    /// Tarball of the version tagged `latest`
    pub fn latest_release(&self, package: &str) -> Result<NpmRelease, UfetchError> {
        let version = self
            .dist_tags
            .get("latest")
            .ok_or_else(|| UfetchError::malformed(Service::Npm, package, "missing dist-tags.latest"))?;

        let tarball = self
            .versions
            .get(version)
            .ok_or_else(|| {
                UfetchError::malformed(
                    Service::Npm,
                    package,
                    format!("dist-tags.latest points at {} which is not in versions", version),
                )
            })?
            .dist
            .as_ref()
            .and_then(|dist| dist.tarball.clone())
            .ok_or_else(|| {
                UfetchError::malformed(
                    Service::Npm,
                    package,
                    format!("missing versions[{}].dist.tarball", version),
                )
            })?;

        Ok(NpmRelease {
            version: version.clone(),
            tarball,
        })
    }
}

/// `GET <pypi>/pypi/<package>/json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PypiProject {
    #[serde(default)]
    pub info: Option<PypiInfo>,

    /// Files of the latest release
    #[serde(default)]
    pub urls: Vec<PypiFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PypiInfo {
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PypiFile {
    pub url: String,
}

impl PypiProject {
    /// First listed file of the latest release.
    ///
    /// No preference between wheels and sdists, and no interpreter matching.
    /// `None` when the release has no files at all.
    pub fn first_file(&self) -> Option<&PypiFile> {
        self.urls.first()
    }

    pub fn version(&self) -> Option<&str> {
        self.info.as_ref().and_then(|info| info.version.as_deref())
    }
}

/// `<registry>/<package>`; scoped names keep their `@scope/` prefix
pub fn npm_metadata_url(registry: &str, package: &str) -> String {
    format!("{}/{}", registry.trim_end_matches('/'), package)
}

/// `<pypi>/pypi/<package>/json`
pub fn pypi_metadata_url(pypi: &str, package: &str) -> String {
    format!("{}/pypi/{}/json", pypi.trim_end_matches('/'), package)
}

/// `<chocolatey>/api/v2/package/<package>`
pub fn choco_package_url(chocolatey: &str, package: &str) -> String {
    format!("{}/api/v2/package/{}", chocolatey.trim_end_matches('/'), package)
}
