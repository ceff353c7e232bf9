// src/config.rs
// =============================================================================
// Crawl configuration, read once from a TOML file at startup.
//
// Example site-mirror.toml:
//
//   output_directory = "dist"
//   seed_url = "http://site.test/"
//   blacklist = ["/wp-content/", "/wp-admin/"]
//   max_workers = 100
//
// Everything except output_directory and seed_url has a default. The values
// never change while the crawl runs.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "site-mirror.toml";
pub const DEFAULT_MAX_WORKERS: usize = 100;

/// Errors that make a crawl impossible to start
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },
    #[error("output_directory must not be empty")]
    MissingOutputDirectory,
    #[error("max_workers must be at least 1")]
    NoWorkers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Root of the mirror on disk
    pub output_directory: PathBuf,
    /// Where the crawl starts; also defines which links are internal
    pub seed_url: String,
    /// Substrings that exclude a link from the crawl
    pub blacklist: Vec<String>,
    /// How many fetch cycles may run at once
    pub max_workers: usize,
    /// Per-request timeout in seconds, 0 disables it
    pub request_timeout_secs: u64,
    /// Same-origin redirects followed per request
    pub max_redirects: usize,
    pub user_agent: String,
    /// Collapse whitespace in HTML before writing it
    pub minify: bool,
    /// Resolve relative hrefs against the page URL instead of dropping them
    pub resolve_relative_links: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::new(),
            seed_url: String::new(),
            blacklist: Vec::new(),
            max_workers: DEFAULT_MAX_WORKERS,
            request_timeout_secs: 30,
            max_redirects: 10,
            user_agent: concat!("site-mirror/", env!("CARGO_PKG_VERSION")).to_string(),
            minify: false,
            resolve_relative_links: false,
        }
    }
}

impl MirrorConfig {
    // Reads and validates a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    // Checks everything that would make the crawl fail before it starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.seed()?;
        if self.output_directory.as_os_str().is_empty() {
            return Err(ConfigError::MissingOutputDirectory);
        }
        if self.max_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }

    // The seed as a parsed URL: absolute, http(s), with a host
    pub fn seed(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidSeed {
            url: self.seed_url.clone(),
            reason: reason.to_string(),
        };

        let seed = Url::parse(&self.seed_url).map_err(|e| invalid(&e.to_string()))?;
        if seed.scheme() != "http" && seed.scheme() != "https" {
            return Err(invalid("only http and https are supported"));
        }
        if seed.host_str().is_none() {
            return Err(invalid("URL has no host"));
        }
        Ok(seed)
    }
}
