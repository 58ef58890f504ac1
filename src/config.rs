//! Run configuration.
//!
//! Values come from CLI flags or their environment fallbacks (see
//! [`crate::cli`]); `.env` is loaded beforehand by the binary. The resolved
//! [`Config`] is passed explicitly to the clients that need it.

use std::fmt;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://gql.hashnode.com/";
/// Default directory scanned for markdown files.
pub const DEFAULT_POSTS_DIR: &str = "posts";

/// Page sizes and the pagination cap for publication snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Posts per page.
    pub posts: u32,
    /// Series per page.
    pub series: u32,
    /// Drafts per page.
    pub drafts: u32,
    /// Maximum pages fetched per collection.
    pub max_pages: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self { posts: 50, series: 20, drafts: 50, max_pages: 20 }
    }
}

/// Raw, possibly incomplete configuration values.
#[derive(Debug, Clone, Default)]
pub struct ConfigInput {
    /// Bearer credential.
    pub access_token: Option<String>,
    /// Publication id.
    pub publication_id: Option<String>,
    /// Publication host (domain).
    pub publication_host: Option<String>,
    /// Posts directory.
    pub posts_directory: Option<PathBuf>,
    /// GraphQL endpoint.
    pub api_url: Option<String>,
}

/// Validated configuration for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Bearer credential sent as the `Authorization` header.
    pub access_token: String,
    /// Publication id used by create mutations.
    pub publication_id: String,
    /// Domain used as the query key for the publication.
    pub publication_host: String,
    /// True when the host was derived from the publication id.
    pub host_inferred: bool,
    /// Directory scanned for markdown files.
    pub posts_directory: PathBuf,
    /// GraphQL endpoint.
    pub api_url: String,
    /// Snapshot pagination limits.
    pub pages: PageLimits,
}

impl Config {
    /// Validates raw input, filling in defaults.
    ///
    /// A missing host falls back to `<publication-id>.hashnode.dev`, which
    /// only holds for publications on the default domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the token or publication id is missing or blank,
    /// or the API URL is not an http(s) URL.
    pub fn resolve(input: ConfigInput) -> Result<Self, ConfigError> {
        let access_token = present(input.access_token).ok_or(ConfigError::MissingAccessToken)?;
        let publication_id =
            present(input.publication_id).ok_or(ConfigError::MissingPublicationId)?;

        let (publication_host, host_inferred) = match present(input.publication_host) {
            Some(host) => (host, false),
            None => (format!("{publication_id}.hashnode.dev"), true),
        };

        let api_url = present(input.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        Ok(Self {
            access_token,
            publication_id,
            publication_host,
            host_inferred,
            posts_directory: input
                .posts_directory
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_POSTS_DIR)),
            api_url,
            pages: PageLimits::default(),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"<redacted>")
            .field("publication_id", &self.publication_id)
            .field("publication_host", &self.publication_host)
            .field("host_inferred", &self.host_inferred)
            .field("posts_directory", &self.posts_directory)
            .field("api_url", &self.api_url)
            .field("pages", &self.pages)
            .finish()
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
