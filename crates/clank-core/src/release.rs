//! Release feed client and version parsing
//!
//! Fetches the latest published release of a tracked GitHub project and turns
//! its tag into an ordered numeric tuple. Pure network + parse; callers decide
//! what to do with failures, nothing is retried here.

use crate::errors::ManagerError;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

const GITHUB_API_URL: &str = "https://api.github.com";
const FEED_USER_AGENT: &str = "clank-release-feed";
const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// An ordered tuple of the numeric components of a release tag.
///
/// Comparison is strictly positional, component by component. Unequal lengths
/// are compared the same way, with missing trailing components ranking lowest:
/// `(15,0) < (15,0,1)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseVersion(Vec<u64>);

impl ReleaseVersion {
    /// Extract every maximal run of decimal digits in `tag`, left to right.
    ///
    /// `"v15.0.1-rc2"` parses as `(15, 0, 1, 2)`. A tag without any digits is
    /// a `Parse` failure, as is a component too large for `u64`.
    pub fn parse(tag: &str) -> Result<Self, ManagerError> {
        let digits = Regex::new(r"\d+").unwrap();
        let mut components = Vec::new();
        for run in digits.find_iter(tag) {
            let component = run.as_str().parse::<u64>().map_err(|_| ManagerError::Parse {
                tag: tag.to_string(),
            })?;
            components.push(component);
        }
        if components.is_empty() {
            return Err(ManagerError::Parse {
                tag: tag.to_string(),
            });
        }
        Ok(Self(components))
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }

    /// Branch-name-safe rendering, e.g. `15_0_1`
    pub fn underscored(&self) -> String {
        self.0
            .iter()
            .map(|component| component.to_string())
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dotted = self
            .0
            .iter()
            .map(|component| component.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", dotted)
    }
}

/// GitHub release API response
#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
}

/// Client for the latest-release feed of a GitHub repository
#[derive(Debug, Clone)]
pub struct ReleaseFeed {
    client: Client,
    base_url: String,
}

impl ReleaseFeed {
    pub fn new() -> Result<Self, ManagerError> {
        let client = Client::builder()
            .user_agent(FEED_USER_AGENT)
            .timeout(FEED_TIMEOUT)
            .build()
            .map_err(|e| ManagerError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: GITHUB_API_URL.to_string(),
        })
    }

    /// Point the feed at a different API host (used by tests)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Latest release tag for a repository given as `"owner/repo"`
    pub async fn latest_release_tag(&self, repository: &str) -> Result<String, ManagerError> {
        let url = format!("{}/repos/{}/releases/latest", self.base_url, repository);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ManagerError::Network {
                message: format!("release feed returned status {}", response.status()),
            });
        }
        let release: GitHubRelease = response.json().await?;
        Ok(release.tag_name)
    }

    /// Latest release of a repository, parsed into its numeric components
    pub async fn latest_version(&self, repository: &str) -> Result<ReleaseVersion, ManagerError> {
        let tag = self.latest_release_tag(repository).await?;
        ReleaseVersion::parse(&tag)
    }
}
