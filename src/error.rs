//! Error types for remote calls, configuration and frontmatter parsing.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised by a [`RemoteClient`](crate::ports::RemoteClient) call.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status.
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response carried a GraphQL `errors` list, rendered verbatim.
    #[error("graphql errors: {0}")]
    GraphQl(String),

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The response decoded but a required field was null.
    #[error("response is missing {0}")]
    MissingData(&'static str),

    /// A recorded cassette could not serve the call.
    #[error("replay failed: {0}")]
    Replay(String),
}

impl RemoteError {
    /// Returns true when the remote rejected a create because the entity
    /// already exists (a concurrent run got there first).
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::GraphQl(msg) | Self::Replay(msg) | Self::Status { body: msg, .. } => {
                msg.to_ascii_lowercase().contains("already exists")
            }
            _ => false,
        }
    }
}

/// Fatal configuration problems detected before any file is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No access token was supplied.
    #[error("access-token is required")]
    MissingAccessToken,

    /// No publication id was supplied.
    #[error("publication-id is required")]
    MissingPublicationId,

    /// The API URL is not an absolute http(s) URL.
    #[error("invalid api url: {0}")]
    InvalidApiUrl(String),
}

/// Errors raised while splitting and decoding a frontmatter block.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// An opening `---` fence was found without a closing one.
    #[error("frontmatter block is not terminated by a `---` line")]
    Unterminated,

    /// The block between the fences is not valid YAML for a post.
    #[error("invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
