use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors raised by the GitHub REST client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API rejected the access token (HTTP 401).
    #[error("GitHub rejected the access token: {body}")]
    BadCredentials { body: String },

    /// The resource does not exist or is not visible to the authenticated
    /// identity (HTTP 404).
    #[error("GitHub resource not found: {url}")]
    NotFound { url: String, body: String },

    /// Any other non-success response.
    #[error("GitHub API returned {status} for {url}: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    /// The request never produced a response.
    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
