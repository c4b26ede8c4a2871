use hubstore_github::ApiError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors surfaced by the storage adapter.
///
/// Nothing is retried or suppressed internally. The one deliberate
/// exception is [`size`](crate::Storage::size), which reports a failed
/// probe as an unknown size instead of an error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Missing or empty credentials or repository identifier. Raised
    /// before any network call is made.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// GitHub rejected the access token during initialization.
    #[error("invalid GitHub access token")]
    InvalidCredentials(#[source] ApiError),

    /// The configured repository does not exist or is not visible to the
    /// authenticated identity.
    #[error("storage repository not found: {0}")]
    RepositoryNotFound(String),

    /// No object is stored under the given name. Carries the remote
    /// response body for callers that want the provider's diagnostics.
    #[error("object not found: {name}")]
    NotFound { name: String, body: String },

    /// A direct content request came back with a non-success status other
    /// than 404.
    #[error("HTTP {status} for {url}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
    },

    /// An API call failed for a reason the adapter does not remap.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A direct content request never produced a response.
    #[error("content request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_the_object() {
        let err = StorageError::NotFound {
            name: "a1b2c3d4report.pdf".to_string(),
            body: r#"{"message":"Not Found"}"#.to_string(),
        };
        assert_eq!(err.to_string(), "object not found: a1b2c3d4report.pdf");
    }

    #[test]
    fn api_errors_pass_through_unmodified() {
        let err = StorageError::Api(ApiError::BadCredentials {
            body: "token expired".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "GitHub rejected the access token: token expired"
        );
    }

    #[test]
    fn invalid_credentials_keeps_the_rejection_as_source() {
        let err = StorageError::InvalidCredentials(ApiError::BadCredentials {
            body: "token expired".to_string(),
        });
        assert_eq!(err.to_string(), "invalid GitHub access token");
        assert!(std::error::Error::source(&err).is_some());
    }
}
